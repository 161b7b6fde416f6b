//! merchantdesk main entry point

use anyhow::Context;
use clap::Parser;
use merchantdesk_api::start_server;
use merchantdesk_config::Config;
use merchantdesk_core::{FileMirrorStorage, HttpMerchantRemote, MerchantRemote, OfflineRemote, ResilientStore};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "merchantdesk")]
#[command(author = "merchantdesk contributors")]
#[command(version = "0.1.0")]
#[command(about = "Merchant dashboard backend with an offline mirror", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Never call the merchant service; serve from the local mirror only
    #[arg(long)]
    offline: bool,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let config = Config::load(args.config.clone())
        .map_err(|e| anyhow::anyhow!("{}", e.to_details()))
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.logging.level))
        .init();

    log::info!(
        "Config loaded: remote={}, mirror={}",
        config.remote.effective_base_url().unwrap_or("<none>"),
        config.mirror.path.display()
    );

    let remote: Arc<dyn MerchantRemote> = match config.remote.effective_base_url() {
        Some(base_url) if !args.offline => Arc::new(
            HttpMerchantRemote::new(base_url, Duration::from_secs(config.remote.timeout_secs))
                .context("Failed to build merchant service client")?,
        ),
        _ => {
            log::warn!("Running offline; all requests are served from the local mirror");
            Arc::new(OfflineRemote)
        }
    };

    let rt = Runtime::new()?;
    rt.block_on(async {
        let storage = FileMirrorStorage::new(config.mirror.path.clone());
        let store = Arc::new(ResilientStore::open(remote, Box::new(storage)).await);

        start_server(config, store)
            .await
            .context("Server error")
    })
}
