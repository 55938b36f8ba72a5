//! Command implementations
//!
//! Each interactive command is routed to an execute function that runs it
//! against the session and prints the outcome.

use crate::catalog::CatalogSource;
use crate::cli::SessionCommand;
use crate::session::Session;
use crate::RosterError;

pub mod browse;
pub mod favorites;

type Result<T> = std::result::Result<T, RosterError>;

/// Whether the interactive loop keeps going after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Execute one interactive command
///
/// # Errors
///
/// Returns `RosterError` for invalid input (bad page, unknown id) or when an
/// export cannot be written. Fetch failures are not errors here; they are
/// rendered as the error view.
pub async fn execute<S: CatalogSource + 'static>(
    session: &Session<S>,
    command: SessionCommand,
    quiet: bool,
) -> Result<Flow> {
    match command {
        SessionCommand::Search { term } => {
            browse::search(session, &SessionCommand::join_term(&term), quiet).await;
        }
        SessionCommand::Goto { page } => browse::goto(session, &page, quiet).await?,
        SessionCommand::Next => browse::next(session, quiet).await,
        SessionCommand::Prev => browse::previous(session, quiet).await,
        SessionCommand::Focus => browse::focus(session, quiet).await,
        SessionCommand::Reload => browse::reload(session, quiet).await,
        SessionCommand::Fav { id } => favorites::add(session, &id, quiet)?,
        SessionCommand::Unfav { id } => favorites::remove(session, &id, quiet)?,
        SessionCommand::Toggle { id } => favorites::toggle(session, &id, quiet)?,
        SessionCommand::Favs => favorites::list(session, quiet),
        SessionCommand::Clear => favorites::clear(session, quiet)?,
        SessionCommand::Export { dir } => {
            favorites::export(session, dir, quiet)?;
        }
        SessionCommand::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}
