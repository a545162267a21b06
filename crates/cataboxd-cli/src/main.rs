use clap::{ArgAction, Parser, Subcommand};
use commands::{clear, config, fetch, palette, serve, show};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "cataboxd")]
#[command(about = "Cataboxd - A shelf of film cases from a Letterboxd diary")]
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

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a member's diary and print their shelf
    #[command(long_about = "Load a Letterboxd member's public diary feed and print it as a shelf. A shelf loaded within the freshness window is served from the local cache unless --refresh is given.")]
    Fetch {
        /// Letterboxd username (case-insensitive)
        username: String,

        /// Ignore the cached shelf and fetch again
        #[arg(long, action = ArgAction::SetTrue)]
        refresh: bool,
    },
    /// Show one entry of the cached shelf
    #[command(long_about = "Pull one entry off the cached shelf and print its detail view: rating, watched date, flags, review and palette. Accepts an entry id or its 1-based position on the shelf.")]
    Show {
        /// Entry id, or 1-based position on the shelf
        id: String,
    },
    /// Print the generated palette for a title
    Palette {
        /// Film title
        title: String,
    },
    /// Forget the loaded member and clear the cached shelf
    Clear,
    /// Run the feed relay endpoint
    #[command(long_about = "Serve GET /api/rss?username=<name>, which fetches the member's feed server-side and returns it with CORS headers so browser clients can read it.")]
    Serve {
        /// Address to bind (defaults to the configured address)
        #[arg(long)]
        address: Option<String>,

        /// Port to bind (defaults to the configured port)
        #[arg(long)]
        port: Option<u16>,

        /// Write logs to a daily rolling file instead of stderr (default location when PATH is omitted)
        #[arg(long, value_name = "PATH", num_args = 0..=1)]
        log_file: Option<Option<PathBuf>>,
    },
    /// Show or create the configuration file
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long, action = ArgAction::SetTrue)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // The relay may log to a file; everything else logs to stderr
    let log_file = match &cli.command {
        Commands::Serve { log_file, .. } => log_file.clone().map(serve::log_file_or_default),
        _ => None,
    };
    logging::init_logging_with_file(cli.verbose, cli.quiet, log_file)
        .map_err(|e| color_eyre::eyre::eyre!("{}", e))?;

    let output = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Fetch { username, refresh } => fetch::run_fetch(&username, refresh, &output).await,
        Commands::Show { id } => show::run_show(&id, &output).await,
        Commands::Palette { title } => palette::run_palette(&title, &output),
        Commands::Clear => clear::run_clear(&output),
        Commands::Serve { address, port, .. } => serve::run_serve(address, port, &output).await,
        Commands::Config { cmd } => config::run_config(cmd, &output),
    }
}
