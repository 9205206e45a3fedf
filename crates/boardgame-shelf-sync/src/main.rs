//! shelf-sync: build the board-game shelf data file from BoardGameGeek.

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use boardgame_shelf_sync::config::{ConfigOverrides, SyncConfig};
use boardgame_shelf_sync::{build_catalog, export_collection, logging};

#[derive(Parser)]
#[command(
    name = "shelf-sync",
    about = "Sync a BoardGameGeek collection into a static board-game shelf",
    version
)]
struct Cli {
    /// BGG API token, sent as a bearer token. Also reads BGG_TOKEN.
    #[arg(long, global = true)]
    token: Option<String>,

    /// XML API 2 base URL. Also reads BGG_API_BASE.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Abort the whole run after this many seconds.
    #[arg(long, global = true)]
    deadline_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every game in the manifest and write the shelf data file.
    Build {
        /// Manifest to read. Also reads SHELF_MANIFEST (default games.yaml).
        #[arg(short, long)]
        manifest: Option<String>,

        /// Data file to write. Also reads SHELF_OUTPUT (default site/games.json).
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Overwrite the manifest with the base games a BGG user owns.
    Export {
        /// BGG username.
        username: String,

        /// Manifest to write. Also reads SHELF_MANIFEST (default games.yaml).
        #[arg(short, long)]
        manifest: Option<String>,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell type (bash, zsh, fish, powershell, elvish).
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_json);

    let overrides = ConfigOverrides {
        token: cli.token,
        api_base: cli.base_url,
        timeout_secs: cli.timeout_secs,
        deadline_secs: cli.deadline_secs,
        ..ConfigOverrides::default()
    };

    match cli.command {
        Commands::Build { manifest, output } => {
            let config = SyncConfig::resolve(ConfigOverrides {
                manifest,
                output,
                ..overrides
            });
            let report = build_catalog(&config).await?;
            println!(
                "Wrote {} with {} games.",
                report.output_path.display(),
                report.games
            );
        }

        Commands::Export { username, manifest } => {
            let config = SyncConfig::resolve(ConfigOverrides {
                manifest,
                ..overrides
            });
            let report = export_collection(&config, &username).await?;
            println!(
                "Wrote {} with {} games for user \"{username}\".",
                report.manifest_path.display(),
                report.games
            );
        }

        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "shelf-sync", &mut std::io::stdout());
        }
    }

    Ok(())
}
