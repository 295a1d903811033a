//! Desired-state objects handed from the factory to the client

use super::kinds::ResourceKind;
use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::{Service, ServiceAccount};
use k8s_openapi::api::policy::v1::PodDisruptionBudget;
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, RoleBinding};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::kube_aggregator::pkg::apis::apiregistration::v1::APIService;
use kube::core::DynamicObject;
use std::fmt;

/// Identity of a cluster object
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectRef {
    pub kind: ResourceKind,
    pub namespace: Option<String>,
    pub name: String,
}

impl ObjectRef {
    pub fn new(kind: ResourceKind, namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            kind,
            namespace: namespace.map(str::to_string),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(namespace) => write!(f, "{} {}/{}", self.kind, namespace, self.name),
            None => write!(f, "{} {}", self.kind, self.name),
        }
    }
}

/// A fully formed desired-state object.
///
/// Each variant carries the typed object for its [`ResourceKind`]. The
/// ServiceMonitor CRD has no typed binding and travels as a [`DynamicObject`].
#[derive(Debug, Clone)]
pub enum DesiredObject {
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    RoleBinding(RoleBinding),
    Service(Service),
    Deployment(Deployment),
    ServiceMonitor(DynamicObject),
    PodDisruptionBudget(PodDisruptionBudget),
    ApiService(APIService),
}

impl DesiredObject {
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::ServiceAccount(_) => ResourceKind::ServiceAccount,
            Self::ClusterRole(_) => ResourceKind::ClusterRole,
            Self::ClusterRoleBinding(_) => ResourceKind::ClusterRoleBinding,
            Self::RoleBinding(_) => ResourceKind::RoleBinding,
            Self::Service(_) => ResourceKind::Service,
            Self::Deployment(_) => ResourceKind::Deployment,
            Self::ServiceMonitor(_) => ResourceKind::ServiceMonitor,
            Self::PodDisruptionBudget(_) => ResourceKind::PodDisruptionBudget,
            Self::ApiService(_) => ResourceKind::ApiService,
        }
    }

    #[must_use]
    pub fn metadata(&self) -> &ObjectMeta {
        match self {
            Self::ServiceAccount(o) => &o.metadata,
            Self::ClusterRole(o) => &o.metadata,
            Self::ClusterRoleBinding(o) => &o.metadata,
            Self::RoleBinding(o) => &o.metadata,
            Self::Service(o) => &o.metadata,
            Self::Deployment(o) => &o.metadata,
            Self::ServiceMonitor(o) => &o.metadata,
            Self::PodDisruptionBudget(o) => &o.metadata,
            Self::ApiService(o) => &o.metadata,
        }
    }

    #[must_use]
    pub fn identity(&self) -> ObjectRef {
        let meta = self.metadata();
        ObjectRef::new(
            self.kind(),
            meta.namespace.as_deref(),
            meta.name.clone().unwrap_or_default(),
        )
    }

    /// JSON rendition of the object, as it would be sent to the API server
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::ServiceAccount(o) => serde_json::to_value(o),
            Self::ClusterRole(o) => serde_json::to_value(o),
            Self::ClusterRoleBinding(o) => serde_json::to_value(o),
            Self::RoleBinding(o) => serde_json::to_value(o),
            Self::Service(o) => serde_json::to_value(o),
            Self::Deployment(o) => serde_json::to_value(o),
            Self::ServiceMonitor(o) => serde_json::to_value(o),
            Self::PodDisruptionBudget(o) => serde_json::to_value(o),
            Self::ApiService(o) => serde_json::to_value(o),
        }
    }
}

/// Result of producing a manifest.
///
/// `Absent` means the manifest is not configured for this cluster (only
/// legitimate for optional kinds); it is never used to signal an error.
#[derive(Debug, Clone)]
pub enum Desired {
    Present(DesiredObject),
    Absent,
}

impl Desired {
    #[must_use]
    pub fn into_option(self) -> Option<DesiredObject> {
        match self {
            Self::Present(object) => Some(object),
            Self::Absent => None,
        }
    }

    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}
