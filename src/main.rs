// src/main.rs
//! Sanus CLI entry point
use anyhow::{Context, Result};
use clap::Parser;
use sanus_verify::cli::{Cli, Commands};
use sanus_verify::core::config::AppConfig;
use sanus_verify::core::domain::ScanRecord;
use sanus_verify::history::HistoryFilter;
use sanus_verify::pipeline::ScanPipeline;
use sanus_verify::storage::FileStore;
use sanus_verify::verification::classify;
use sanus_verify::wallet::EnvWalletAuthorizer;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::from_env()?,
    };
    info!("Starting sanus v{}", env!("CARGO_PKG_VERSION"));

    let store = FileStore::open(&config.storage.data_dir)
        .await
        .with_context(|| format!("Failed to open data dir {}", config.storage.data_dir.display()))?;
    let pipeline = ScanPipeline::new(&config, Arc::new(store), Arc::new(EnvWalletAuthorizer));

    match cli.command {
        Commands::Scan { payload, scan_type } => match pipeline.run_scan(&payload, scan_type.as_deref()).await {
            Ok(record) => print_record(&record)?,
            Err(e) => {
                let sanus_verify::PipelineError::Session(session_error) = &e;
                eprintln!("{}", session_error.user_message());
                return Err(e.into());
            }
        },
        Commands::History { category, search, recent } => {
            let records = match recent {
                Some(limit) => pipeline.history().recent(limit).await,
                None => pipeline.history().list().await,
            };
            let filter = HistoryFilter { category, search: search.unwrap_or_default() };
            let records = filter.apply(&records);
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Wallet => match pipeline.get_active_wallet_address().await {
            Some(address) => println!("{}", address),
            None => println!("No wallet connected"),
        },
        Commands::Disconnect => {
            pipeline.disconnect_wallet().await;
            println!("Wallet disconnected");
        }
        Commands::ClearHistory => {
            pipeline.clear_history().await?;
            println!("Scan history cleared");
        }
    }

    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

fn print_record(record: &ScanRecord) -> Result<()> {
    let descriptor = classify(record.status());
    let mut output = serde_json::to_value(record)?;
    if let Some(map) = output.as_object_mut() {
        map.insert("verdict".to_string(), serde_json::to_value(descriptor)?);
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
