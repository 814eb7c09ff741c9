//! CLI entry and dispatch.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tether_core::api::{Backend, BackendClient, BackendConfig};
use tether_core::config::Config;
use tether_core::controller::{SessionController, Sinks};
use tether_core::stream::{EventChannel, SseChannel};
use tether_core::text::UiText;
use tracing_subscriber::EnvFilter;

use crate::runtime;
use crate::sinks::TerminalSinks;

#[derive(Parser)]
#[command(name = "tether")]
#[command(version)]
#[command(about = "Terminal client for a remote agent backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend base URL (overrides config and TETHER_BASE_URL)
    #[arg(long, global = true, env = "TETHER_BASE_URL")]
    base_url: Option<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Submit a prompt and stream the session until it ends (Ctrl+C stops it)
    Run {
        /// The prompt to send to the agent
        #[arg(short, long)]
        prompt: String,
    },

    /// Print the current workspace listing
    Workspaces,

    /// Print one workspace file's content
    Show {
        /// Workspace-relative file path
        path: String,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load()?;
    let base_url = match &cli.base_url {
        Some(url) => url.clone(),
        None => config.resolve_base_url()?,
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    rt.block_on(dispatch(cli, &config, base_url))
}

/// Logs go to stderr so stdout stays clean for the sinks.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("TETHER_LOG"))
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli, config: &Config, base_url: String) -> Result<()> {
    let mut controller = build_controller(config, base_url);

    match cli.command {
        Commands::Run { prompt } => {
            // Startup refresh, then the session itself.
            controller.load_workspace_files().await;
            runtime::run_session(&mut controller, &prompt, config.refresh_delay()).await
        }
        Commands::Workspaces => {
            controller.load_workspace_files().await;
            Ok(())
        }
        Commands::Show { path } => {
            controller.open_file(&path).await;
            Ok(())
        }
    }
}

fn build_controller(config: &Config, base_url: String) -> SessionController {
    let backend = Arc::new(BackendClient::new(BackendConfig {
        base_url: base_url.clone(),
        request_timeout: config.request_timeout(),
    }));
    let channel = Arc::new(SseChannel::new(base_url));
    let terminal = Arc::new(TerminalSinks::default());

    SessionController::new(
        backend as Arc<dyn Backend>,
        channel as Arc<dyn EventChannel>,
        Sinks {
            chat: Arc::clone(&terminal) as _,
            thinking: Arc::clone(&terminal) as _,
            workspace: Arc::clone(&terminal) as _,
            file_viewer: Arc::clone(&terminal) as _,
            controls: terminal as _,
        },
        UiText::default(),
        config.refresh_delay(),
    )
}
