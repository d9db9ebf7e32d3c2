use std::{path::PathBuf, time::Duration};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};
use tracing_subscriber::EnvFilter;

use fangirl::{
    Res, cli,
    config::{self, RunOptions, Settings},
    error, utils,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Log in to Spotify and cache the token
    Auth,

    /// Build a playlist from the albums of followed artists
    Run(RunArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Name of a playlist of recent, unsaved releases
    #[clap(long, conflicts_with = "unliked")]
    pub recent: Option<String>,

    /// Name of a playlist of unsaved albums released before the window
    #[clap(long)]
    pub unliked: Option<String>,

    /// How far back counts as recent, e.g. 31d, 12h
    #[clap(long, value_parser = utils::parse_duration)]
    pub duration: Option<Duration>,

    /// File with one artist name per line to skip
    #[clap(long)]
    pub blacklist: Option<PathBuf>,

    /// Country code the albums must be available in
    #[clap(long)]
    pub market: Option<String>,

    /// Retries per call after the first try
    #[clap(long)]
    pub max_retries: Option<u32>,

    /// Wait between two tries of the same call, e.g. 30s
    #[clap(long, value_parser = utils::parse_duration)]
    pub retry_delay: Option<Duration>,

    /// Wait between two album pages of the same artist, e.g. 1s
    #[clap(long, value_parser = utils::parse_duration)]
    pub page_delay: Option<Duration>,

    /// List the albums that would be imported without creating a playlist
    #[clap(long)]
    pub dry_run: bool,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            recent: args.recent,
            unliked: args.unliked,
            duration: args.duration,
            blacklist_file: args.blacklist,
            market: args.market,
            max_attempts: args.max_retries,
            retry_delay: args.retry_delay,
            page_delay: args.page_delay,
            dry_run: args.dry_run,
        }
    }
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FANGIRL_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(command: Command) -> Res<()> {
    match command {
        Command::Auth => cli::auth().await,
        Command::Run(args) => {
            let settings = Settings::resolve(args.into()).await?;
            cli::run(settings).await
        }
        Command::Completions(opt) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = dispatch(cli.command).await {
        error!("{}", e);
    }
}
