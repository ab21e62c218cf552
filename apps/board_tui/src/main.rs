mod config;
mod remote;
mod render;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use client_core::{DefaultsStore, InputEvent, RemoteApi};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Project board client running against a seeded in-memory backend.
#[derive(Parser, Debug)]
struct Args {
    /// Username reported by the sandbox backend.
    #[arg(long, default_value = "dev")]
    username: String,
    /// Comma-separated organizations the viewer belongs to.
    #[arg(long, default_value = "")]
    orgs: String,
    /// Override the remembered-defaults file location.
    #[arg(long)]
    defaults_path: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let orgs: Vec<String> = args
        .orgs
        .split(',')
        .filter(|org| !org.is_empty())
        .map(str::to_string)
        .collect();
    let api =
        Arc::new(remote::SandboxRemote::seeded(&args.username, &orgs)) as Arc<dyn RemoteApi>;
    let store =
        Arc::new(config::JsonDefaultsStore::new(args.defaults_path)?) as Arc<dyn DefaultsStore>;

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    tokio::spawn(read_keys(input_tx));

    let mut renderer = render::LineRenderer::new();
    client_core::run(api, store, &mut renderer, input_rx).await?;
    Ok(())
}

/// Each stdin line is one key token ("enter", "ctrl+s", "a", ...); an empty
/// line means enter.
async fn read_keys(tx: mpsc::UnboundedSender<InputEvent>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        let token = if line.is_empty() {
            "enter".to_string()
        } else {
            line
        };
        if tx.send(InputEvent::Key(token)).is_err() {
            break;
        }
    }
}
