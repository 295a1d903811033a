//! metrics-server reconciliation task
//!
//! When enabled, applies every metrics-server manifest in dependency order and
//! then removes whatever prometheus-adapter left behind. When disabled, a cycle
//! does nothing.

use super::plan::METRICS_SERVER_APPLY_ORDER;
use super::retire::RetiredComponent;
use super::steps;
use super::types::{Error, Result};
use super::Task;
use crate::client::ResourceClient;
use crate::manifests::{Component, Factory};
use async_trait::async_trait;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

pub struct MetricsServerTask {
    client: Arc<dyn ResourceClient>,
    factory: Arc<dyn Factory>,
    namespace: String,
    enabled: bool,
}

impl MetricsServerTask {
    /// Build the task for `namespace`.
    ///
    /// The factory must render into the same namespace, so templated and
    /// residual objects of the retired component are removed from one place.
    pub fn new(
        namespace: impl Into<String>,
        client: Arc<dyn ResourceClient>,
        enabled: bool,
        factory: Arc<dyn Factory>,
    ) -> Result<Self> {
        let namespace = namespace.into();
        if factory.namespace() != namespace {
            return Err(Error::NamespaceMismatch {
                task: namespace,
                factory: factory.namespace().to_string(),
            });
        }

        Ok(Self {
            client,
            factory,
            namespace,
            enabled,
        })
    }

    async fn create(&self, ctx: &CancellationToken) -> Result<()> {
        let (client, factory) = (self.client.as_ref(), self.factory.as_ref());
        for &kind in METRICS_SERVER_APPLY_ORDER {
            steps::apply_manifest(client, factory, ctx, kind).await?;
        }

        self.remove_prometheus_adapter_resources(ctx).await
    }

    async fn remove_prometheus_adapter_resources(&self, ctx: &CancellationToken) -> Result<()> {
        RetiredComponent::prometheus_adapter(&self.namespace)
            .remove(self.client.as_ref(), self.factory.as_ref(), ctx)
            .await
    }
}

#[async_trait]
impl Task for MetricsServerTask {
    fn name(&self) -> &str {
        Component::MetricsServer.name()
    }

    #[instrument(skip_all, fields(namespace = %self.namespace, enabled = self.enabled))]
    async fn run(&self, ctx: &CancellationToken) -> Result<()> {
        if !self.enabled {
            debug!("metrics-server disabled, nothing to reconcile");
            return Ok(());
        }

        self.create(ctx).await?;
        info!("metrics-server reconciled");
        Ok(())
    }
}
