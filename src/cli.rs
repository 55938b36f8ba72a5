//! Command-line interface definitions and parsing
//!
//! Two parsers built with `clap`:
//!
//! - **`Cli`**: process arguments (startup page, config overrides, verbosity)
//! - **`SessionCommand`**: one line typed at the interactive prompt
//!
//! # Interactive commands
//!
//! - **search** `[term...]`: filter by name (no term clears the filter)
//! - **goto** `<page>`: jump to a page, as a route change would
//! - **next** / **prev**: pager controls
//! - **fav** / **unfav** / **toggle** `<id>`: manage favorites
//! - **favs**, **clear**, **export** `[dir]`: favorites list, deselect all, CSV download
//! - **focus**, **reload**: revalidate or retry the current page
//! - **quit**

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Browse a character catalog page by page and collect favorites
#[derive(Parser, Debug)]
#[command(name = "roster", version, about, long_about = None)]
pub struct Cli {
    /// Page to open at startup (the route's page segment)
    #[arg(short, long, value_name = "PAGE")]
    pub page: Option<String>,

    /// Search term to start with, replacing the remembered one
    #[arg(short, long, value_name = "TERM")]
    pub search: Option<String>,

    /// Catalog API base URL
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Directory where the last search term is persisted
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Use this config file instead of the default location
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress prompts and informational output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse process arguments
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// One line of interactive input
#[derive(Parser, Debug)]
#[command(no_binary_name = true, name = "roster", disable_version_flag = true)]
struct SessionLine {
    #[command(subcommand)]
    command: SessionCommand,
}

/// Commands accepted at the interactive prompt
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Search characters by name (no term clears the filter)
    #[command(visible_alias = "s")]
    Search {
        /// Name to search for, taken verbatim from the rest of the line
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        term: Vec<String>,
    },
    /// Jump to a page
    #[command(visible_alias = "g")]
    Goto {
        /// Page number
        page: String,
    },
    /// Next page
    #[command(visible_alias = "n")]
    Next,
    /// Previous page
    #[command(visible_alias = "p")]
    Prev,
    /// Mark a character on the current page as favorite
    #[command(visible_alias = "f")]
    Fav {
        /// Character id
        id: String,
    },
    /// Remove a character from favorites
    #[command(visible_alias = "u")]
    Unfav {
        /// Character id
        id: String,
    },
    /// Toggle a character on the current page
    #[command(visible_alias = "t")]
    Toggle {
        /// Character id
        id: String,
    },
    /// List favorites
    Favs,
    /// Deselect all favorites
    Clear,
    /// Save favorites as `<count>_items.csv`
    #[command(visible_alias = "e")]
    Export {
        /// Target directory (defaults to the current directory)
        dir: Option<PathBuf>,
    },
    /// Revalidate the current page, as when the window regains focus
    Focus,
    /// Retry the current page
    #[command(visible_alias = "r")]
    Reload,
    /// Leave the session
    #[command(visible_alias = "q", alias = "exit")]
    Quit,
}

impl SessionCommand {
    /// Parse one line of interactive input
    ///
    /// A search term is kept exactly as typed after the command word, so
    /// repeated or trailing spaces stay part of the query.
    ///
    /// # Errors
    ///
    /// Returns a `clap::Error` for unknown commands or missing arguments;
    /// `help` is also reported through the error so it can be printed.
    pub fn parse_line(line: &str) -> Result<Self, clap::Error> {
        let command = SessionLine::try_parse_from(line.split_whitespace())?.command;
        Ok(match command {
            Self::Search { .. } => {
                let raw = rest_of_line(line);
                Self::Search {
                    term: if raw.is_empty() { Vec::new() } else { vec![raw.to_string()] },
                }
            }
            other => other,
        })
    }

    /// Search term of a `Search` command
    #[must_use]
    pub fn join_term(words: &[String]) -> String {
        words.concat()
    }
}

/// Everything after the first word, minus the separating whitespace
fn rest_of_line(line: &str) -> &str {
    line.trim_start()
        .split_once(char::is_whitespace)
        .map_or("", |(_, rest)| rest.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["roster", "--page", "3", "-q", "-vv"]).unwrap();
        assert_eq!(cli.page.as_deref(), Some("3"));
        assert!(cli.quiet);
        assert_eq!(cli.verbose, 2);
        assert!(cli.search.is_none());
    }

    #[test]
    fn test_parse_search_with_spaces() {
        let command = SessionCommand::parse_line("search Rick Sanchez").unwrap();
        assert_eq!(
            command,
            SessionCommand::Search {
                term: vec!["Rick Sanchez".into()]
            }
        );
        if let SessionCommand::Search { term } = command {
            assert_eq!(SessionCommand::join_term(&term), "Rick Sanchez");
        }
    }

    #[test]
    fn test_search_term_is_kept_verbatim() {
        let term = |line: &str| match SessionCommand::parse_line(line).unwrap() {
            SessionCommand::Search { term } => SessionCommand::join_term(&term),
            other => panic!("expected search, got {other:?}"),
        };

        assert_eq!(term("search Rick  Sanchez "), "Rick  Sanchez ");
        assert_eq!(term("s -Rick"), "-Rick");
        assert_eq!(term("  search   Mr. Poopybutthole"), "Mr. Poopybutthole");
    }

    #[test]
    fn test_parse_empty_search_clears_filter() {
        let command = SessionCommand::parse_line("s").unwrap();
        assert_eq!(command, SessionCommand::Search { term: vec![] });
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(SessionCommand::parse_line("n").unwrap(), SessionCommand::Next);
        assert_eq!(SessionCommand::parse_line("q").unwrap(), SessionCommand::Quit);
        assert_eq!(SessionCommand::parse_line("exit").unwrap(), SessionCommand::Quit);
        assert_eq!(
            SessionCommand::parse_line("goto 7").unwrap(),
            SessionCommand::Goto { page: "7".into() }
        );
        assert_eq!(
            SessionCommand::parse_line("export /tmp/out").unwrap(),
            SessionCommand::Export {
                dir: Some(PathBuf::from("/tmp/out"))
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(SessionCommand::parse_line("teleport").is_err());
        assert!(SessionCommand::parse_line("fav").is_err());
        assert!(SessionCommand::parse_line("").is_err());
    }
}
