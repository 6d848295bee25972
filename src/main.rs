use anyhow::{anyhow, Result};
use dyncrab::error::Error::DNSError;
use dyncrab::{Config, Registry, SharedConfig};
use is_terminal::IsTerminal;
use std::future::pending;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_init();

    let mut first_args = std::env::args().take(2);
    let (program_name, config_file) = (
        first_args.next().unwrap_or("dyncrab".to_string()),
        first_args.next(),
    );

    let config = config_init(&program_name, config_file)?;
    let record_store = config.record_store().await?;
    let registry = Arc::new(Registry::from_config(&config.providers, &record_store)?);
    tracing::info!(providers = ?registry, "providers ready");

    let dns_handle = match &config.dns {
        Some(dns_config) => {
            tracing::info!("DNS listening on UDP {}", &dns_config.udp_bind_addr);
            tracing::info!("DNS listening on TCP {}", &dns_config.tcp_bind_addr);
            let dns_server = dyncrab::dns::new(
                dns_config.clone(),
                config.served_zones(),
                record_store.clone(),
            )
            .await?;
            tokio::spawn(dns_server.block_until_done())
        }
        None => {
            tracing::info!("DNS server disabled");
            tokio::spawn(pending())
        }
    };

    tracing::info!("API listening on {}", &config.api_bind_addr);
    let api_server = dyncrab::api::new(config.clone(), registry);
    let api_handle = tokio::spawn(api_server);

    // Update jobs in flight are detached tasks and get dropped with the runtime.
    tokio::select! {
        _ = signal::ctrl_c() => {
            tracing::info!("quitting from signal");
        },
        Ok(dns_res) = dns_handle => {
            if let Err(err) = dns_res {
                return Err(DNSError(err).into())
            }
        }
        Ok(api_res) = api_handle => {
            if let Err(err) = api_res {
                return Err(err.into())
            }
        }
    }
    tracing::info!("goodbye");
    Ok(())
}

fn tracing_init() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(std::io::stdout().is_terminal()))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dyncrab=info".into()),
        )
        .init();
}

fn config_init(program_name: &str, config_file: Option<String>) -> Result<SharedConfig> {
    match config_file {
        None => Err(anyhow!("usage: {program_name} /path/to/config.json")),
        Some(config_file) => {
            let config = Config::try_from_file(&config_file)?;
            tracing::debug!("loaded config from {config_file}");
            Ok(Arc::new(config))
        }
    }
}
