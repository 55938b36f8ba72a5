//! Browsing commands: search, page navigation, focus and reload

use crate::catalog::CatalogSource;
use crate::output;
use crate::pagination::PageNumber;
use crate::session::{Session, View};
use crate::RosterError;

type Result<T> = std::result::Result<T, RosterError>;

/// Print a view followed by the pager line
pub fn show<S: CatalogSource + 'static>(session: &Session<S>, view: &View, quiet: bool) {
    for line in output::render_view(view, |id| session.is_favorite(id), quiet) {
        println!("{line}");
    }
    if !quiet {
        println!("{}", output::pager_line(&session.pagination()));
    }
}

/// Change the search term; an empty term lists everything
pub async fn search<S: CatalogSource + 'static>(session: &Session<S>, term: &str, quiet: bool) {
    let view = session.search(term).await;
    show(session, &view, quiet);
}

/// Jump to a page, as a route change would
///
/// # Errors
///
/// Returns `RosterError::PageError` if `page` is not a positive integer.
pub async fn goto<S: CatalogSource + 'static>(session: &Session<S>, page: &str, quiet: bool) -> Result<()> {
    let page: PageNumber = page.parse()?;
    let view = session.navigate(page).await;
    show(session, &view, quiet);
    Ok(())
}

pub async fn next<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) {
    match session.next_page().await {
        Some(view) => show(session, &view, quiet),
        None if !quiet => println!("Already on the last page"),
        None => {}
    }
}

pub async fn previous<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) {
    match session.previous_page().await {
        Some(view) => show(session, &view, quiet),
        None if !quiet => println!("Already on the first page"),
        None => {}
    }
}

/// Revalidate the current page in the background of the shown results
pub async fn focus<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) {
    let view = session.focus().await;
    show(session, &view, quiet);
}

pub async fn reload<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) {
    let view = session.reload().await;
    show(session, &view, quiet);
}
