use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use setbot::api::{build_router, state::AppState};
use setbot::config::AppConfig;
use setbot::handler::{Compliments, EventHandler, SystemClock};
use setbot::leaderboard::{format_seconds, Leaderboard};
use setbot::models::find_match;
use setbot::slack::events::RecentEvents;
use setbot::slack::signature::SignatureVerifier;
use setbot::slack::SlackClient;

#[derive(Parser)]
#[command(name = "setbot")]
#[command(about = "Slack bot that tracks a daily leaderboard of workout set times")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./setbot.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Also write debug logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the Slack events server
    Serve {
        /// Bind address (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Port number (default from config)
        #[arg(long)]
        port: Option<u16>,

        /// Log all HTTP requests
        #[arg(long)]
        access_log: bool,
    },

    /// Parse a set time out of some text and print it in seconds
    Parse {
        /// Message text
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Load and validate the configuration, then exit
    CheckConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    let log_level = cli
        .log_level
        .clone()
        .or_else(|| config.log_level.clone())
        .unwrap_or_else(|| "info".to_string());
    let _log_guard = init_tracing(&log_level, cli.json_logs, cli.log_file.as_deref())?;

    tracing::info!("Starting setbot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Serve {
            host,
            port,
            access_log,
        } => {
            let signing_secret = config.slack.signing_secret()?;
            let bot_token = config.slack.bot_token();
            if bot_token.is_none() {
                tracing::warn!(
                    "{} is not set; replies and reactions will fail",
                    config.slack.bot_token_env
                );
            }

            let chat = SlackClient::new(&config.slack.api_base, bot_token, config.slack.timeout())
                .context("Failed to build Slack client")?;
            let timezone = config.leaderboard.tz()?;
            let leaderboard = Leaderboard::new(timezone, Utc::now());
            tracing::info!(
                "Leaderboard day is {} ({})",
                leaderboard.current_day(),
                timezone.name()
            );

            let clock = Arc::new(SystemClock);
            let handler = EventHandler::new(
                Arc::new(Mutex::new(leaderboard)),
                Arc::new(chat),
                clock.clone(),
                Compliments::new(),
                config.leaderboard.handler_settings(),
            );
            let state = AppState {
                handler: Arc::new(handler),
                verifier: Arc::new(SignatureVerifier::new(
                    signing_secret,
                    config.slack.max_request_age(),
                )),
                clock,
                recent_events: Arc::new(RecentEvents::default()),
            };

            let app = build_router(state, access_log);
            let addr = format!(
                "{}:{}",
                host.unwrap_or(config.server.host),
                port.unwrap_or(config.server.port)
            );
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?;
            tracing::info!("Listening for Slack events on http://{}/slack/events", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Parse { text } => {
            let text = text.join(" ").to_lowercase();
            match find_match(&text) {
                Some(m) => println!("{}s  (matched \"{}\")", format_seconds(m.to_seconds()), m.text),
                None => println!("no score found"),
            }
        }
        Commands::CheckConfig => {
            config.validate()?;
            println!("Configuration OK");
            println!("  server:      {}:{}", config.server.host, config.server.port);
            println!("  slack api:   {}", config.slack.api_base);
            println!("  timezone:    {}", config.leaderboard.timezone);
            println!(
                "  celebrate:   under {}s with :{}:",
                config.leaderboard.celebration_threshold_seconds,
                config.leaderboard.celebration_reaction
            );
            for (name, present) in [
                (
                    &config.slack.signing_secret_env,
                    config.slack.signing_secret().is_ok(),
                ),
                (&config.slack.bot_token_env, config.slack.bot_token().is_some()),
            ] {
                println!(
                    "  {:<21}{}",
                    format!("{}:", name),
                    if present { "set" } else { "NOT SET" }
                );
            }
        }
    }

    Ok(())
}

/// Console logging filtered by `RUST_LOG` or `level`, plus an optional
/// debug-level file. The returned guard flushes the file on drop.
fn init_tracing(
    level: &str,
    json: bool,
    log_file: Option<&std::path::Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let console = if json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| std::path::Path::new("."));
            let name = path
                .file_name()
                .context("--log-file must name a file")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(tracing_subscriber::EnvFilter::new("debug"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(console.with_filter(filter))
        .with(file_layer)
        .init();

    Ok(guard)
}
