//! Template-backed manifest factory
//!
//! Manifests are embedded YAML templates rendered with Handlebars and parsed
//! into typed Kubernetes objects. Settings that are structured (node
//! selectors, tolerations, resources) are applied to the parsed object rather
//! than templated.

use super::kinds::{ManifestKind, ResourceKind};
use super::object::{Desired, DesiredObject};
use super::{Factory, ManifestError};
use crate::config::OperatorConfig;
use handlebars::Handlebars;
use k8s_openapi::api::apps::v1::Deployment;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, trace};

const METRICS_SERVER_CONTAINER: &str = "metrics-server";

pub struct ManifestFactory {
    namespace: String,
    config: Arc<OperatorConfig>,
    templates: Handlebars<'static>,
}

impl ManifestFactory {
    /// Create a factory rendering manifests into `namespace`
    pub fn new(
        namespace: impl Into<String>,
        config: Arc<OperatorConfig>,
    ) -> Result<Self, ManifestError> {
        let mut templates = Handlebars::new();
        templates.set_strict_mode(true);
        templates.register_escape_fn(handlebars::no_escape);

        for kind in ManifestKind::ALL {
            templates
                .register_template_string(kind.template_name(), kind.template())
                .map_err(|e| ManifestError::Template {
                    kind,
                    source: Box::new(e),
                })?;
        }

        Ok(Self {
            namespace: namespace.into(),
            config,
            templates,
        })
    }

    fn render(&self, kind: ManifestKind) -> Result<String, ManifestError> {
        let image = &self.config.metrics_server.image;
        let context = json!({
            "namespace": self.namespace,
            "image": image.reference(),
            "version": image.tag.trim(),
            "replicas": self.config.metrics_server_replicas(),
        });

        let rendered = self
            .templates
            .render(kind.template_name(), &context)
            .map_err(|source| ManifestError::Render { kind, source })?;
        trace!(manifest = %kind, "Rendered manifest:\n{}", rendered);
        Ok(rendered)
    }

    fn customize_deployment(
        &self,
        kind: ManifestKind,
        deployment: &mut Deployment,
    ) -> Result<(), ManifestError> {
        let settings = &self.config.metrics_server;
        let pod_spec = deployment
            .spec
            .as_mut()
            .and_then(|spec| spec.template.spec.as_mut())
            .ok_or_else(|| ManifestError::Invalid {
                kind,
                message: "deployment has no pod template spec".to_string(),
            })?;

        if !settings.node_selector.is_empty() {
            pod_spec.node_selector = Some(settings.node_selector.clone());
        }
        if !settings.tolerations.is_empty() {
            pod_spec.tolerations = Some(settings.tolerations.clone());
        }
        if let Some(resources) = &settings.resources {
            let container = pod_spec
                .containers
                .iter_mut()
                .find(|c| c.name == METRICS_SERVER_CONTAINER)
                .ok_or_else(|| ManifestError::Invalid {
                    kind,
                    message: format!("container {METRICS_SERVER_CONTAINER} not found"),
                })?;
            container.resources = Some(resources.clone());
        }
        Ok(())
    }
}

fn parse<K: DeserializeOwned>(kind: ManifestKind, rendered: &str) -> Result<K, ManifestError> {
    serde_yaml::from_str(rendered).map_err(|source| ManifestError::Parse { kind, source })
}

impl Factory for ManifestFactory {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn produce(&self, kind: ManifestKind) -> Result<Desired, ManifestError> {
        // Disruption budgets only make sense with more than one replica
        if kind.resource_kind() == ResourceKind::PodDisruptionBudget
            && !self.config.high_availability
        {
            debug!(manifest = %kind, "High availability disabled, manifest not configured");
            return Ok(Desired::Absent);
        }

        let rendered = self.render(kind)?;
        let object = match kind.resource_kind() {
            ResourceKind::ServiceAccount => DesiredObject::ServiceAccount(parse(kind, &rendered)?),
            ResourceKind::ClusterRole => DesiredObject::ClusterRole(parse(kind, &rendered)?),
            ResourceKind::ClusterRoleBinding => {
                DesiredObject::ClusterRoleBinding(parse(kind, &rendered)?)
            }
            ResourceKind::RoleBinding => DesiredObject::RoleBinding(parse(kind, &rendered)?),
            ResourceKind::Service => DesiredObject::Service(parse(kind, &rendered)?),
            ResourceKind::Deployment => {
                let mut deployment: Deployment = parse(kind, &rendered)?;
                self.customize_deployment(kind, &mut deployment)?;
                DesiredObject::Deployment(deployment)
            }
            ResourceKind::ServiceMonitor => DesiredObject::ServiceMonitor(parse(kind, &rendered)?),
            ResourceKind::PodDisruptionBudget => {
                DesiredObject::PodDisruptionBudget(parse(kind, &rendered)?)
            }
            ResourceKind::ApiService => DesiredObject::ApiService(parse(kind, &rendered)?),
        };

        Ok(Desired::Present(object))
    }
}
