//! Roster CLI application entry point
//!
//! Opens a session over the character catalog and reads commands from
//! stdin until `quit` or end of input.
//!
//! # Usage
//!
//! ```bash
//! # Start on page 1 with the remembered search term
//! roster
//!
//! # Start on page 3 searching for "Rick"
//! roster --page 3 --search Rick
//!
//! # Point at another catalog and log requests
//! roster --api-url http://localhost:8080/api -vv
//!
//! # Script it: quiet mode prints ids and names only
//! printf 'search Morty\nfav 2\nexport /tmp\n' | roster -q
//! ```
//!
//! # Configuration
//!
//! Configuration is stored in the user's config directory
//! (`~/.config/roster/config.toml` on Linux) and created with defaults on
//! first run. Command-line flags override it.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use roster::{
    RosterError,
    catalog::HttpCatalog,
    cli::{Cli, SessionCommand},
    commands::{self, Flow, browse},
    config::RosterConfig,
    pagination::PageNumber,
    session::Session,
    store::SearchStore,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

type Result<T> = std::result::Result<T, RosterError>;

/// Log to stderr; `RUST_LOG` wins over `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the config file and apply command-line overrides
fn load_config(cli: &Cli) -> Result<RosterConfig> {
    let mut config = match &cli.config {
        Some(path) => RosterConfig::load_from(path)?,
        None => RosterConfig::load()?,
    };

    if let Some(url) = &cli.api_url {
        config.api_url.clone_from(url);
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = Some(dir.clone());
    }
    config.quiet |= cli.quiet;

    Ok(config)
}

/// Read commands until `quit` or end of input
async fn run_interactive(session: &Session<HttpCatalog>, quiet: bool) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        if !quiet {
            print!("{} ", "roster>".cyan());
            io::stdout().flush()?;
        }

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match SessionCommand::parse_line(&line) {
            Ok(command) => command,
            // Also covers `help`, which clap reports as an error
            Err(e) => {
                e.print()?;
                continue;
            }
        };

        debug!(?command, "executing");
        match commands::execute(session, command, quiet).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => eprintln!("{} {e}", "Error:".red()),
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let quiet = config.quiet;

    let route_page = cli
        .page
        .as_deref()
        .map(str::parse::<PageNumber>)
        .transpose()?;

    let source = HttpCatalog::new(&config.catalog_config())?;
    let data_dir = config.data_dir();
    info!(api_url = %config.api_url, data_dir = %data_dir.display(), "starting session");

    let session = Session::builder()
        .source(source)
        .store(SearchStore::open(&data_dir))
        .route_page(route_page)
        .cache_config(config.cache_config())
        .build()?;

    if !quiet && !session.is_search_durable() {
        eprintln!(
            "{} search term will not be remembered ({} is not writable)",
            "Warning:".yellow(),
            data_dir.display()
        );
    }

    let view = match cli.search {
        Some(term) => session.search(term).await,
        None => session.refresh().await,
    };
    browse::show(&session, &view, quiet);

    run_interactive(&session, quiet).await
}
