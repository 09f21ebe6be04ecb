use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use mediaq_client::{HttpFetcher, MpvLauncher, NotifySend, UdpReceiver, send_link};
use mediaq_core::daemon::{Daemon, TracingDaemonReporter};
use mediaq_core::DaemonConfig;

#[derive(Parser)]
#[command(
    name = "mediaqd",
    version,
    about = "Aggregates bursts of media links into a single player playlist"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the aggregation daemon
    Run {
        /// Local endpoint to listen on for link submissions
        #[arg(
            short,
            long,
            env = "MEDIAQ_LISTEN",
            default_value = "127.0.0.1:8099"
        )]
        listen: SocketAddr,

        /// Seconds of inactivity after the last link before a batch closes
        #[arg(short, long, default_value_t = 2)]
        wait_secs: u64,

        /// Do not recurse into directory-style links to resolve media URIs
        #[arg(short = 'd', long)]
        disable_directory_recursion: bool,

        /// Send a desktop notification when directory enumeration is about
        /// to delay dispatch
        #[arg(short = 'n', long)]
        notify_on_enumerate: bool,
    },

    /// Send one link to a running daemon
    Send {
        /// The link to submit
        link: String,

        /// Daemon endpoint to send to
        #[arg(
            short,
            long,
            env = "MEDIAQ_LISTEN",
            default_value = "127.0.0.1:8099"
        )]
        addr: SocketAddr,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("mediaq_core=info".parse()?)
                .add_directive("mediaq_client=info".parse()?)
                .add_directive("mediaq_cli=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            listen,
            wait_secs,
            disable_directory_recursion,
            notify_on_enumerate,
        } => {
            let config = DaemonConfig::default()
                .with_listen_addr(listen)
                .with_wait_period(Duration::from_secs(wait_secs))
                .with_recurse_directories(!disable_directory_recursion)
                .with_notify_on_enumerate(notify_on_enumerate);
            cmd_run(config).await?;
        }
        Commands::Send { link, addr } => {
            send_link(addr, &link).await.map_err(|e| anyhow::anyhow!(e))?;
        }
    }

    Ok(())
}

async fn cmd_run(config: DaemonConfig) -> Result<()> {
    let receiver = UdpReceiver::bind(config.listen_addr)
        .await
        .map_err(|e| anyhow::anyhow!(e))?;
    let fetcher = HttpFetcher::new().map_err(|e| anyhow::anyhow!(e))?;

    let mut daemon = Daemon::new(
        receiver,
        fetcher,
        MpvLauncher::new(),
        NotifySend,
        config,
    );

    // Graceful shutdown on Ctrl-C.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, shutting down");
            signal_cancel.cancel();
        }
    });

    daemon.run(cancel, &TracingDaemonReporter).await;
    Ok(())
}
