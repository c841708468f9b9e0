use clap::{ArgAction, Parser, Subcommand};
use commands::{browse, clear, config, search, show, watched};
use popcorn_config::PathManager;
use std::path::PathBuf;

mod commands;
mod logging;
mod output;
mod render;

#[derive(Parser)]
#[command(name = "popcorn")]
#[command(about = "usePopcorn - Find movies and keep track of the ones you've watched")]
#[command(version)]
struct Cli {
    /// Enable verbose output (use multiple times for more verbosity: -v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    /// Write logs to this file (rotated daily) instead of stderr
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search movies by title
    #[command(long_about = "Search OMDb for movies matching a title. Queries shorter than 3 characters are not sent.")]
    Search {
        /// Title to search for
        query: String,
    },
    /// Show a movie's details
    Show {
        /// IMDb identifier (e.g. tt0133093)
        id: String,
    },
    /// Add a movie to your watched list
    Add {
        /// IMDb identifier (e.g. tt0133093)
        id: String,

        /// Your rating, 1 to 10
        #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=10))]
        rating: u8,
    },
    /// Remove a movie from your watched list
    Remove {
        /// IMDb identifier (e.g. tt0133093)
        id: String,
    },
    /// List the movies you watched, with a summary
    Watched,
    /// Interactive search session
    #[command(long_about = "Start an interactive session. Every line you type is a search; lines starting with ':' are commands (:help lists them). Logs go to the log directory unless --log-file is given.")]
    Browse,
    /// View or change configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
    /// Delete your watched list
    Clear {
        /// Do not ask for confirmation
        #[arg(long, short, action = ArgAction::SetTrue)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration (masks the API key)
    Show {
        /// Show the API key unmasked
        #[arg(long, action = ArgAction::SetTrue)]
        full: bool,
    },

    /// Save the OMDb API key
    #[command(long_about = "Save the OMDb API key to the credentials file. The POPCORN_OMDB_API_KEY environment variable takes precedence over the saved key.")]
    ApiKey {
        /// API key (if not provided, will prompt)
        #[arg(long)]
        key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The interactive session keeps its logs out of the terminal
    let log_file = match (&cli.command, cli.log_file) {
        (_, Some(path)) => Some(path),
        (Commands::Browse, None) => Some(PathManager::default().browse_log_file()),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Search { query } => search::run_search(query, &output).await,
        Commands::Show { id } => show::run_show(id, &output).await,
        Commands::Add { id, rating } => watched::run_add(id, rating, &output).await,
        Commands::Remove { id } => watched::run_remove(id, &output).await,
        Commands::Watched => watched::run_list(&output).await,
        Commands::Browse => browse::run_browse(&output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output).await,
        Commands::Clear { yes } => clear::run_clear(yes, &output).await,
    }
}
