//! Operator Configuration
//!
//! Configuration for the metrics operator, mounted as YAML into the pod.
//! Every field has a default so a partial (or missing) file still yields a
//! usable configuration.

use k8s_openapi::api::core::v1::{ResourceRequirements, Toleration};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// RFC 1123 label, the format Kubernetes requires for namespace names
static DNS_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("Invalid DNS label pattern")
});

const DNS_LABEL_MAX_LEN: usize = 63;

/// Main operator configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OperatorConfig {
    /// Namespace the monitoring components live in
    #[serde(default = "default_namespace")]
    pub namespace: String,

    /// Seconds between two reconciliation cycles
    #[serde(rename = "resyncIntervalSeconds", default = "default_resync_interval")]
    pub resync_interval_seconds: u64,

    /// Field manager used for server-side apply
    #[serde(rename = "fieldManager", default = "default_field_manager")]
    pub field_manager: String,

    /// Whether the cluster runs highly available infrastructure
    /// (multiple replicas, pod disruption budgets)
    #[serde(rename = "highAvailability", default)]
    pub high_availability: bool,

    /// metrics-server configuration
    #[serde(rename = "metricsServer", default)]
    pub metrics_server: MetricsServerConfig,
}

/// metrics-server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetricsServerConfig {
    /// Whether metrics-server should be deployed
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Container image
    #[serde(default = "default_metrics_server_image")]
    pub image: ImageConfig,

    /// Replica count; derived from `highAvailability` when unset
    #[serde(default)]
    pub replicas: Option<i32>,

    /// Node selector for the metrics-server pods
    #[serde(rename = "nodeSelector", default)]
    pub node_selector: BTreeMap<String, String>,

    /// Tolerations for the metrics-server pods
    #[serde(default)]
    pub tolerations: Vec<Toleration>,

    /// Resource requests and limits for the metrics-server container
    #[serde(default)]
    pub resources: Option<ResourceRequirements>,
}

/// Image configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ImageConfig {
    /// Image repository (e.g., "registry.k8s.io/metrics-server/metrics-server")
    pub repository: String,

    /// Image tag (e.g., "v0.7.2")
    pub tag: String,
}

impl ImageConfig {
    /// Returns `true` when both repository and tag are populated.
    pub fn is_configured(&self) -> bool {
        !self.repository.trim().is_empty() && !self.tag.trim().is_empty()
    }

    /// Full image reference (`repository:tag`)
    #[must_use]
    pub fn reference(&self) -> String {
        format!("{}:{}", self.repository.trim(), self.tag.trim())
    }
}

fn default_namespace() -> String {
    "openshift-monitoring".to_string()
}

fn default_resync_interval() -> u64 {
    300
}

fn default_field_manager() -> String {
    "metrics-operator".to_string()
}

fn default_enabled() -> bool {
    true
}

fn default_metrics_server_image() -> ImageConfig {
    ImageConfig {
        repository: "registry.k8s.io/metrics-server/metrics-server".to_string(),
        tag: "v0.7.2".to_string(),
    }
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            image: default_metrics_server_image(),
            replicas: None,
            node_selector: BTreeMap::new(),
            tolerations: Vec::new(),
            resources: None,
        }
    }
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
            resync_interval_seconds: default_resync_interval(),
            field_manager: default_field_manager(),
            high_availability: false,
            metrics_server: MetricsServerConfig::default(),
        }
    }
}

impl OperatorConfig {
    /// Effective metrics-server replica count
    #[must_use]
    pub fn metrics_server_replicas(&self) -> i32 {
        self.metrics_server
            .replicas
            .unwrap_or(if self.high_availability { 2 } else { 1 })
    }

    /// Validate that the configuration can produce well-formed manifests
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.namespace.trim().is_empty() {
            return Err(anyhow::anyhow!("namespace must not be empty"));
        }

        if self.namespace.len() > DNS_LABEL_MAX_LEN || !DNS_LABEL.is_match(&self.namespace) {
            return Err(anyhow::anyhow!(
                "namespace {:?} is not a valid DNS-1123 label",
                self.namespace
            ));
        }

        if self.resync_interval_seconds == 0 {
            return Err(anyhow::anyhow!(
                "resyncIntervalSeconds must be greater than zero"
            ));
        }

        if self.field_manager.trim().is_empty() {
            return Err(anyhow::anyhow!("fieldManager must not be empty"));
        }

        if self.metrics_server.enabled && !self.metrics_server.image.is_configured() {
            return Err(anyhow::anyhow!(
                "metricsServer.image must specify both repository and tag."
            ));
        }

        if let Some(replicas) = self.metrics_server.replicas {
            if replicas < 1 {
                return Err(anyhow::anyhow!(
                    "metricsServer.replicas must be at least 1, got {replicas}"
                ));
            }
        }

        Ok(())
    }

    /// Load configuration from mounted `ConfigMap` file
    pub fn from_mounted_file(config_path: &str) -> Result<Self, anyhow::Error> {
        let config_str = std::fs::read_to_string(config_path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {config_path}: {e}"))?;

        Self::from_yaml(&config_str)
    }

    pub fn from_yaml(config_str: &str) -> Result<Self, anyhow::Error> {
        serde_yaml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse config YAML: {e}"))
    }
}
