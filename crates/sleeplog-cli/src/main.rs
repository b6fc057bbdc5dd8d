use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use sleeplog_cli::cli::commands;
use sleeplog_cli::config::Config;
use sleeplog_cli::render::RendererKind;

#[derive(Parser)]
#[command(name = "sleeplog")]
#[command(author, version, about = "Local cache and reports for Fitbit sleep logs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON)
    #[arg(short, long, global = true, env = "SLEEPLOG_CONFIG")]
    config: Option<PathBuf>,

    /// Output format, overrides the config file
    #[arg(short, long, global = true)]
    format: Option<RendererKind>,

    /// Sleep table path, overrides the config file
    #[arg(long, global = true, env = "SLEEPLOG_TABLE")]
    table: Option<PathBuf>,

    /// Token file path, overrides the config file
    #[arg(long, global = true, env = "SLEEPLOG_TOKENS")]
    tokens: Option<PathBuf>,

    /// OAuth2 client id used to refresh tokens
    #[arg(long, global = true, env = "FITBIT_CLIENT_ID")]
    client_id: Option<String>,

    /// OAuth2 client secret used to refresh tokens
    #[arg(long, global = true, env = "FITBIT_CLIENT_SECRET", hide_env_values = true)]
    client_secret: Option<String>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Token commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Fetch nights missing from the local table
    Sync {
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
    /// Sync, then show efficiency and stage percentages
    Report {
        /// Number of most recent nights to show
        #[arg(long, default_value = "14")]
        days: usize,
        /// Use the local table without syncing
        #[arg(long)]
        offline: bool,
        /// Treat this date as today (YYYY-MM-DD)
        #[arg(long)]
        today: Option<String>,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Store tokens obtained from the Fitbit OAuth2 flow
    Import {
        #[arg(long, env = "FITBIT_ACCESS_TOKEN", hide_env_values = true)]
        access_token: String,
        #[arg(long, env = "FITBIT_REFRESH_TOKEN", hide_env_values = true)]
        refresh_token: String,
        /// Seconds until the access token expires
        #[arg(long, default_value = "28800")]
        expires_in: i64,
        /// Space separated scopes granted to the token
        #[arg(long)]
        scope: Option<String>,
    },
    /// Remove stored tokens
    Logout,
    /// Show token status
    Status,
}

impl Cli {
    fn load_config(&self) -> sleeplog_cli::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;

        if let Some(table) = &self.table {
            config.table_path = table.clone();
        }
        if let Some(tokens) = &self.tokens {
            config.tokens_path = tokens.clone();
        }
        if let Some(id) = &self.client_id {
            config.client_id = Some(id.clone());
        }
        if let Some(secret) = &self.client_secret {
            config.client_secret = Some(secret.clone());
        }
        if let Some(format) = self.format {
            config.format = format;
        }

        Ok(config)
    }
}

async fn dispatch(cli: Cli) -> sleeplog_cli::Result<()> {
    let config = cli.load_config()?;

    match cli.command {
        Commands::Auth { command } => match command {
            AuthCommands::Import {
                access_token,
                refresh_token,
                expires_in,
                scope,
            } => commands::auth_import(&config, access_token, refresh_token, expires_in, scope).await,
            AuthCommands::Logout => commands::logout(&config).await,
            AuthCommands::Status => commands::status(&config).await,
        },
        Commands::Sync { today } => commands::sync_run(&config, today).await,
        Commands::Report {
            days,
            offline,
            today,
        } => commands::report(&config, config.format, days, offline, today).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    sleeplog_cli::logging::init(cli.verbose);

    if let Err(e) = dispatch(cli).await {
        tracing::debug!(error = ?e, "command failed");
        eprintln!("Error: {}", sleeplog_cli::error::format_user_error(&e));
        std::process::exit(1);
    }
}
