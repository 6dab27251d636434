use crate::config_loader::{load_config, AppConfig};
use crate::errors::ServiceError;
use crate::logging::init_tracing;
use crate::scoring::{FeatureVector, ScoringModel};
use crate::web::{router_from_config, ScoreResponse};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Top-level CLI interface for the SkadiX scoring service
#[derive(Parser, Debug)]
#[command(name = "skadix", version, about = "SkadiX suitability scoring API")]
pub struct Cli {
    /// TOML config file (defaults to ./skadix.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level or full filter directive, overrides `log.level`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Host/IP to bind, overrides `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Port to bind, overrides `server.port`
        #[arg(long)]
        port: Option<u16>,
    },

    /// Score one feature vector and print the result as JSON
    Score {
        #[arg(long, allow_hyphen_values = true)]
        sst: f64,
        #[arg(long, allow_hyphen_values = true)]
        elec_cost: f64,
        #[arg(long, allow_hyphen_values = true)]
        throughput: f64,
    },

    /// Print the effective configuration as TOML
    Config,
}

pub fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
    if cli.log_json {
        config.log.json = true;
    }

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            init_tracing(&config.log.level, config.log.json)?;

            let rt = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .context("failed to build Tokio runtime")?;
            rt.block_on(serve(config))?;
        }
        Commands::Score {
            sst,
            elec_cost,
            throughput,
        } => {
            let model = ScoringModel::new(config.model);
            let score = model.evaluate(&FeatureVector::new(sst, elec_cost, throughput));
            println!("{}", serde_json::to_string(&ScoreResponse { score })?);
        }
        Commands::Config => {
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Bind and serve until Ctrl-C or SIGTERM
pub async fn serve(config: AppConfig) -> Result<(), ServiceError> {
    let app = router_from_config(&config)?;
    let addr = format!("{}:{}", config.server.host, config.server.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ServiceError::bind(addr.clone(), e))?;

    tracing::info!(
        service = %config.service_name,
        cors_any_origin = config.cors.allows_any_origin(),
        "HTTP server listening on http://{addr}"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| ServiceError::Serve { source })?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
