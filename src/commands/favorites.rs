//! Favorites commands: mark, unmark, list, clear and export

use std::io::{self, IsTerminal};
use std::path::PathBuf;

use colored::Colorize;
use dialoguer::Confirm;

use crate::catalog::{CatalogSource, Character};
use crate::output;
use crate::session::Session;
use crate::RosterError;

type Result<T> = std::result::Result<T, RosterError>;

fn on_page<S: CatalogSource + 'static>(session: &Session<S>, id: &str) -> Result<Character> {
    session
        .find_character(id)
        .ok_or_else(|| RosterError::InvalidInput(format!("No character with id '{id}' on this page")))
}

/// Mark a character of the current page as favorite
///
/// # Errors
///
/// Returns `RosterError::InvalidInput` if the id is not on the current page.
pub fn add<S: CatalogSource + 'static>(session: &Session<S>, id: &str, quiet: bool) -> Result<()> {
    let item = on_page(session, id)?;
    let name = item.name.clone();
    let added = session.add_favorite(item);
    if !quiet {
        if added {
            println!("Added {} to favorites", name.bold());
        } else {
            println!("{name} is already a favorite");
        }
    }
    Ok(())
}

/// Remove a favorite by id; removing a non-member is a no-op
///
/// # Errors
///
/// Never fails; returns `Result` for uniform dispatch.
pub fn remove<S: CatalogSource + 'static>(session: &Session<S>, id: &str, quiet: bool) -> Result<()> {
    let removed = session.remove_favorite(id);
    if !quiet {
        if removed {
            println!("Removed {id} from favorites");
        } else {
            println!("{id} is not a favorite");
        }
    }
    Ok(())
}

/// Toggle a character of the current page
///
/// A favorite that is no longer on the current page can still be removed.
///
/// # Errors
///
/// Returns `RosterError::InvalidInput` if the id is neither a favorite nor
/// on the current page.
pub fn toggle<S: CatalogSource + 'static>(session: &Session<S>, id: &str, quiet: bool) -> Result<()> {
    if !session.is_favorite(id) {
        return add(session, id, quiet);
    }
    remove(session, id, quiet)
}

pub fn list<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) {
    let favorites = session.favorites();
    if !quiet && !favorites.is_empty() {
        println!("Favorites ({}):", favorites.len());
    }
    for line in output::render_favorites(&favorites, quiet) {
        println!("{line}");
    }
}

/// Whether stdin and stdout are attached to a terminal
fn can_prompt() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Deselect all favorites, asking first unless quiet
///
/// Without a terminal to ask on, nothing is cleared unless `quiet` is set.
///
/// # Errors
///
/// Returns `RosterError::InvalidInput` if the confirmation prompt fails.
pub fn clear<S: CatalogSource + 'static>(session: &Session<S>, quiet: bool) -> Result<()> {
    clear_with(session, quiet, can_prompt())
}

fn clear_with<S: CatalogSource + 'static>(
    session: &Session<S>,
    quiet: bool,
    interactive: bool,
) -> Result<()> {
    let count = session.favorites().len();
    if count == 0 {
        if !quiet {
            println!("No favorites selected");
        }
        return Ok(());
    }

    if !quiet {
        if !interactive {
            println!("Not clearing {count} favorite(s) without confirmation; run with -q to skip the prompt.");
            return Ok(());
        }
        let confirmed = Confirm::new()
            .with_prompt(format!("Deselect all {count} favorite(s)?"))
            .default(false)
            .interact()
            .map_err(|e| RosterError::InvalidInput(format!("Failed to get confirmation: {e}")))?;
        if !confirmed {
            println!("Operation cancelled.");
            return Ok(());
        }
    }

    let removed = session.clear_favorites();
    if !quiet {
        println!("Deselected {removed} favorite(s)");
    }
    Ok(())
}

/// Write the CSV export into `dir` (current directory by default)
///
/// # Errors
///
/// Returns `RosterError::ExportError` if serialization or writing fails.
pub fn export<S: CatalogSource + 'static>(
    session: &Session<S>,
    dir: Option<PathBuf>,
    quiet: bool,
) -> Result<PathBuf> {
    let artifact = session.export()?;
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let path = artifact.write_to(&dir)?;
    if quiet {
        println!("{}", path.display());
    } else {
        println!(
            "Exported {} ({}, {} bytes)",
            path.display().to_string().green(),
            artifact.mime,
            artifact.bytes.len()
        );
    }
    Ok(path)
}
