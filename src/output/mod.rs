//! Output formatting for CLI display
//!
//! Renders session views, character rows, the pager line and the favorites
//! list. Quiet mode drops decoration and color so output can be piped.

use colored::Colorize;

use crate::catalog::Character;
use crate::favorites::Favorites;
use crate::pagination::PaginationState;
use crate::session::View;

/// Text shown while the active key is pending
pub const LOADING_TEXT: &str = "Loading...";

/// Text shown for a resolved page without items
pub const NO_RESULTS_TEXT: &str = "No results";

/// Format a character row; `favorite` adds a marker
#[must_use]
pub fn character_line(item: &Character, favorite: bool, quiet: bool) -> String {
    if quiet {
        return format!("{}\t{}", item.id, item.name);
    }

    let marker = if favorite { "★".yellow().to_string() } else { " ".to_string() };
    format!(
        "{} {:>4}  {}  {}",
        marker,
        item.id.dimmed(),
        item.name.bold(),
        format!("{} · {} · {}", item.species, item.gender, item.status).dimmed()
    )
}

/// Format the pager line for the current pagination state
#[must_use]
pub fn pager_line(state: &PaginationState) -> String {
    let total = state
        .last_page()
        .map_or_else(|| "?".to_string(), |last| last.to_string());
    let prev = if state.previous_page().is_some() { "prev" } else { "    " };
    let next = if state.next_page().is_some() { "next" } else { "    " };
    format!("{prev}  Page {} of {total}  {next}", state.current_page())
}

/// Render a view as lines of text
#[must_use]
pub fn render_view<F>(view: &View, is_favorite: F, quiet: bool) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    match view {
        View::Loading => {
            if quiet {
                Vec::new()
            } else {
                vec![LOADING_TEXT.dimmed().to_string()]
            }
        }
        View::Error { message } => {
            if quiet {
                vec![message.clone()]
            } else {
                vec![
                    message.red().to_string(),
                    "Type 'reload' to try again.".dimmed().to_string(),
                ]
            }
        }
        View::Results(page) if page.is_empty() => {
            if quiet {
                Vec::new()
            } else {
                vec![NO_RESULTS_TEXT.yellow().to_string()]
            }
        }
        View::Results(page) => page
            .items
            .iter()
            .map(|item| character_line(item, is_favorite(&item.id), quiet))
            .collect(),
    }
}

/// Render the favorites collection in insertion order
#[must_use]
pub fn render_favorites(favorites: &Favorites, quiet: bool) -> Vec<String> {
    if favorites.is_empty() && !quiet {
        return vec!["No favorites selected".dimmed().to_string()];
    }
    favorites
        .iter()
        .map(|item| character_line(item, true, quiet))
        .collect()
}
