//! Retirement of a replaced component
//!
//! A [`RetiredComponent`] lists what a predecessor left in the cluster: the
//! manifests the factory can still describe, plus residual objects known only
//! by name. Removing it deletes each of them in order. Deletes are always
//! attempted; an object that never existed is skipped by the client as absent.

use super::plan;
use super::steps;
use super::types::Result;
use crate::client::ResourceClient;
use crate::manifests::{Component, DesiredObject, Factory, ManifestKind};
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct RetiredComponent {
    pub component: Component,
    /// Manifests deleted through the factory, in order
    pub manifests: &'static [ManifestKind],
    /// Objects deleted directly after the manifests
    pub residual: Vec<DesiredObject>,
}

impl RetiredComponent {
    /// prometheus-adapter, superseded by metrics-server
    #[must_use]
    pub fn prometheus_adapter(namespace: &str) -> Self {
        // The adapter's deployment template is gone; only its name is known.
        let deployment = Deployment {
            metadata: ObjectMeta {
                name: Some(Component::PrometheusAdapter.name().to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        Self {
            component: Component::PrometheusAdapter,
            manifests: plan::PROMETHEUS_ADAPTER_RETIRE_ORDER,
            residual: vec![DesiredObject::Deployment(deployment)],
        }
    }

    /// Delete every manifest and residual object, stopping at the first failure
    #[instrument(skip_all, fields(component = %self.component))]
    pub async fn remove(
        &self,
        client: &dyn ResourceClient,
        factory: &dyn Factory,
        ctx: &CancellationToken,
    ) -> Result<()> {
        for &kind in self.manifests {
            steps::delete_manifest(client, factory, ctx, kind).await?;
        }
        for object in &self.residual {
            steps::delete_object(client, ctx, object).await?;
        }

        info!("Retired component resources removed");
        Ok(())
    }
}
