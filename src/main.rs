//! sendspin-mpris - Drive the MPRIS bridge from recorded Sendspin events.
//!
//! `replay` feeds newline-delimited client events from a file or stdin into a
//! running controller, which is useful for exercising desktop integrations
//! without a Sendspin server. `schema` prints the configuration JSON schema.

use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Parser, Subcommand};
use sendspin_mpris::{
    client::{ReplayClient, SendspinClient},
    config::{Config, LogLevel},
    services::MprisController,
    tracing_config,
};
use tokio::{
    fs::File,
    io::{self, AsyncBufRead, BufReader},
};
use tracing::{Instrument, info, info_span, warn};

#[derive(Parser)]
#[command(name = "sendspin-mpris")]
#[command(about = "Expose Sendspin playback as an MPRIS media player")]
struct Cli {
    /// Config file to load instead of the default location
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(short, long, global = true)]
    log_level: Option<LogLevel>,

    /// Also write logs to the rotating log file
    #[arg(long, global = true)]
    log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay newline-delimited client events into the MPRIS bridge
    Replay {
        /// Event file to read; stdin when omitted
        file: Option<PathBuf>,
    },
    /// Print the configuration JSON schema
    Schema,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Schema => {
            let schema = schemars::schema_for!(Config);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
        Commands::Replay { ref file } => {
            let config = match &cli.config {
                Some(path) => Config::load_with_imports(path)?,
                None => Config::load()?,
            };

            let level = cli.log_level.unwrap_or(config.general.log_level);
            if cli.log_file {
                tracing_config::init_with_file(&level)?;
            } else {
                tracing_config::init(&level)?;
            }

            replay(config, file.clone())
                .instrument(info_span!("sendspin_mpris"))
                .await?;
        }
    }

    Ok(())
}

async fn replay(config: Config, file: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let client = Arc::new(ReplayClient::new());
    let mut mpris = MprisController::new(
        Arc::clone(&client) as Arc<dyn SendspinClient>,
        config.mpris,
    );
    mpris.start()?;

    if !mpris.is_running() {
        warn!("MPRIS is not running; events will be read but not published");
    }

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match file {
        Some(path) => Box::new(BufReader::new(File::open(path).await?)),
        None => Box::new(BufReader::new(io::stdin())),
    };

    tokio::select! {
        stats = client.replay(reader) => {
            let stats = stats?;
            info!(dispatched = stats.dispatched, skipped = stats.skipped, "Replay finished");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
        }
    }

    tokio::task::block_in_place(|| mpris.stop());

    for command in client.sent_commands() {
        println!("{}", serde_json::to_string(&command)?);
    }

    Ok(())
}
