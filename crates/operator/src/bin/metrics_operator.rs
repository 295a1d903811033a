/*
 * 5D Labs Platform - Metrics Operator
 * Copyright (C) 2025 5D Labs
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Metrics Operator - keeps the cluster's metrics-server converged
//!
//! On every resync interval this service:
//! - Applies the metrics-server manifests in dependency order
//! - Removes resources left behind by the retired prometheus-adapter

use anyhow::Context as _;
use clap::Parser;
use metrics_operator::{
    KubeResourceClient, ManifestFactory, MetricsServerTask, OperatorConfig, TaskRunner,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "metrics-operator", version, about)]
struct Args {
    /// Path to the mounted operator configuration
    #[arg(long, env = "OPERATOR_CONFIG", default_value = "/config/config.yaml")]
    config: String,

    /// Namespace override for the monitoring components
    #[arg(long, env = "OPERATOR_NAMESPACE")]
    namespace: Option<String>,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    once: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,metrics_operator=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config(path: &str, namespace: Option<String>) -> anyhow::Result<OperatorConfig> {
    let mut config = match OperatorConfig::from_mounted_file(path) {
        Ok(cfg) => {
            info!("Loaded operator configuration from {}", path);
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration, using defaults: {}", e);
            OperatorConfig::default()
        }
    };
    if let Some(namespace) = namespace {
        config.namespace = namespace;
    }

    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    info!(
        "Starting 5D Labs Metrics Operator v{}",
        env!("CARGO_PKG_VERSION")
    );

    let config = Arc::new(load_config(&args.config, args.namespace)?);

    let client = kube::Client::try_default()
        .await
        .context("Failed to connect to Kubernetes cluster")?;
    info!("Connected to Kubernetes cluster");

    let resource_client = Arc::new(KubeResourceClient::new(client, &config.field_manager));
    let factory = Arc::new(ManifestFactory::new(&config.namespace, config.clone())?);

    let runner = TaskRunner::new().with_task(MetricsServerTask::new(
        &config.namespace,
        resource_client,
        config.metrics_server.enabled,
        factory,
    )?);

    let ctx = CancellationToken::new();
    tokio::spawn(shutdown_signal(ctx.clone()));

    if args.once {
        runner.run_cycle(&ctx).await?;
        info!("Single reconciliation cycle completed");
        return Ok(());
    }

    runner
        .run_until_cancelled(Duration::from_secs(config.resync_interval_seconds), &ctx)
        .await;

    info!("Metrics operator shutting down");
    Ok(())
}

async fn shutdown_signal(ctx: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, shutting down gracefully");
        },
        () = terminate => {
            info!("Received SIGTERM, shutting down gracefully");
        },
    }

    ctx.cancel();
}
