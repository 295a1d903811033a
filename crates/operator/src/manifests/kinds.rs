//! Resource and manifest identifiers
//!
//! [`ResourceKind`] names a class of cluster object. [`ManifestKind`] names one
//! concrete manifest of one component and maps to exactly one template.

use std::fmt;

/// Dependency tier of a resource kind.
///
/// Objects of a lower tier must exist before objects of a higher tier are
/// applied: identities before the permissions granted to them, permissions
/// before the workload that uses them, and the workload before the objects
/// that select or register it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Identity,
    Permissions,
    Workload,
    Dependents,
}

/// Class of cluster object managed by a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    ServiceAccount,
    ClusterRole,
    ClusterRoleBinding,
    RoleBinding,
    Service,
    Deployment,
    ServiceMonitor,
    PodDisruptionBudget,
    ApiService,
}

impl ResourceKind {
    /// Kubernetes `kind` string for this resource
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ServiceAccount => "ServiceAccount",
            Self::ClusterRole => "ClusterRole",
            Self::ClusterRoleBinding => "ClusterRoleBinding",
            Self::RoleBinding => "RoleBinding",
            Self::Service => "Service",
            Self::Deployment => "Deployment",
            Self::ServiceMonitor => "ServiceMonitor",
            Self::PodDisruptionBudget => "PodDisruptionBudget",
            Self::ApiService => "APIService",
        }
    }

    #[must_use]
    pub const fn tier(self) -> Tier {
        match self {
            Self::ServiceAccount => Tier::Identity,
            Self::ClusterRole | Self::ClusterRoleBinding | Self::RoleBinding => Tier::Permissions,
            Self::Service | Self::Deployment => Tier::Workload,
            Self::ServiceMonitor | Self::PodDisruptionBudget | Self::ApiService => Tier::Dependents,
        }
    }

    /// Whether objects of this kind live in a namespace
    #[must_use]
    pub const fn is_namespaced(self) -> bool {
        !matches!(
            self,
            Self::ClusterRole | Self::ClusterRoleBinding | Self::ApiService
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logical component owning a set of manifests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    MetricsServer,
    PrometheusAdapter,
}

impl Component {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::MetricsServer => "metrics-server",
            Self::PrometheusAdapter => "prometheus-adapter",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single manifest produced by the factory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    MetricsServerServiceAccount,
    MetricsServerClusterRole,
    MetricsServerClusterRoleBinding,
    MetricsServerClusterRoleBindingAuthDelegator,
    MetricsServerRoleBindingAuthReader,
    MetricsServerService,
    MetricsServerDeployment,
    MetricsServerServiceMonitor,
    MetricsServerPodDisruptionBudget,
    MetricsServerApiService,
    PrometheusAdapterPodDisruptionBudget,
    PrometheusAdapterServiceMonitor,
    PrometheusAdapterService,
}

impl ManifestKind {
    pub const ALL: [ManifestKind; 13] = [
        Self::MetricsServerServiceAccount,
        Self::MetricsServerClusterRole,
        Self::MetricsServerClusterRoleBinding,
        Self::MetricsServerClusterRoleBindingAuthDelegator,
        Self::MetricsServerRoleBindingAuthReader,
        Self::MetricsServerService,
        Self::MetricsServerDeployment,
        Self::MetricsServerServiceMonitor,
        Self::MetricsServerPodDisruptionBudget,
        Self::MetricsServerApiService,
        Self::PrometheusAdapterPodDisruptionBudget,
        Self::PrometheusAdapterServiceMonitor,
        Self::PrometheusAdapterService,
    ];

    #[must_use]
    pub const fn component(self) -> Component {
        match self {
            Self::PrometheusAdapterPodDisruptionBudget
            | Self::PrometheusAdapterServiceMonitor
            | Self::PrometheusAdapterService => Component::PrometheusAdapter,
            _ => Component::MetricsServer,
        }
    }

    #[must_use]
    pub const fn resource_kind(self) -> ResourceKind {
        match self {
            Self::MetricsServerServiceAccount => ResourceKind::ServiceAccount,
            Self::MetricsServerClusterRole => ResourceKind::ClusterRole,
            Self::MetricsServerClusterRoleBinding
            | Self::MetricsServerClusterRoleBindingAuthDelegator => {
                ResourceKind::ClusterRoleBinding
            }
            Self::MetricsServerRoleBindingAuthReader => ResourceKind::RoleBinding,
            Self::MetricsServerService | Self::PrometheusAdapterService => ResourceKind::Service,
            Self::MetricsServerDeployment => ResourceKind::Deployment,
            Self::MetricsServerServiceMonitor | Self::PrometheusAdapterServiceMonitor => {
                ResourceKind::ServiceMonitor
            }
            Self::MetricsServerPodDisruptionBudget | Self::PrometheusAdapterPodDisruptionBudget => {
                ResourceKind::PodDisruptionBudget
            }
            Self::MetricsServerApiService => ResourceKind::ApiService,
        }
    }

    /// Optional manifests may legitimately produce no object
    #[must_use]
    pub const fn is_optional(self) -> bool {
        matches!(self.resource_kind(), ResourceKind::PodDisruptionBudget)
    }

    /// Template registry key
    #[must_use]
    pub const fn template_name(self) -> &'static str {
        match self {
            Self::MetricsServerServiceAccount => "metrics-server/service-account",
            Self::MetricsServerClusterRole => "metrics-server/cluster-role",
            Self::MetricsServerClusterRoleBinding => "metrics-server/cluster-role-binding",
            Self::MetricsServerClusterRoleBindingAuthDelegator => {
                "metrics-server/cluster-role-binding-auth-delegator"
            }
            Self::MetricsServerRoleBindingAuthReader => "metrics-server/role-binding-auth-reader",
            Self::MetricsServerService => "metrics-server/service",
            Self::MetricsServerDeployment => "metrics-server/deployment",
            Self::MetricsServerServiceMonitor => "metrics-server/service-monitor",
            Self::MetricsServerPodDisruptionBudget => "metrics-server/pod-disruption-budget",
            Self::MetricsServerApiService => "metrics-server/api-service",
            Self::PrometheusAdapterPodDisruptionBudget => {
                "prometheus-adapter/pod-disruption-budget"
            }
            Self::PrometheusAdapterServiceMonitor => "prometheus-adapter/service-monitor",
            Self::PrometheusAdapterService => "prometheus-adapter/service",
        }
    }

    /// Embedded template source
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::MetricsServerServiceAccount => {
                include_str!("../../assets/metrics-server/service-account.yaml")
            }
            Self::MetricsServerClusterRole => {
                include_str!("../../assets/metrics-server/cluster-role.yaml")
            }
            Self::MetricsServerClusterRoleBinding => {
                include_str!("../../assets/metrics-server/cluster-role-binding.yaml")
            }
            Self::MetricsServerClusterRoleBindingAuthDelegator => {
                include_str!("../../assets/metrics-server/cluster-role-binding-auth-delegator.yaml")
            }
            Self::MetricsServerRoleBindingAuthReader => {
                include_str!("../../assets/metrics-server/role-binding-auth-reader.yaml")
            }
            Self::MetricsServerService => include_str!("../../assets/metrics-server/service.yaml"),
            Self::MetricsServerDeployment => {
                include_str!("../../assets/metrics-server/deployment.yaml")
            }
            Self::MetricsServerServiceMonitor => {
                include_str!("../../assets/metrics-server/service-monitor.yaml")
            }
            Self::MetricsServerPodDisruptionBudget => {
                include_str!("../../assets/metrics-server/pod-disruption-budget.yaml")
            }
            Self::MetricsServerApiService => {
                include_str!("../../assets/metrics-server/api-service.yaml")
            }
            Self::PrometheusAdapterPodDisruptionBudget => {
                include_str!("../../assets/prometheus-adapter/pod-disruption-budget.yaml")
            }
            Self::PrometheusAdapterServiceMonitor => {
                include_str!("../../assets/prometheus-adapter/service-monitor.yaml")
            }
            Self::PrometheusAdapterService => {
                include_str!("../../assets/prometheus-adapter/service.yaml")
            }
        }
    }
}

impl fmt::Display for ManifestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.resource_kind();
        match self {
            Self::MetricsServerClusterRoleBindingAuthDelegator => {
                write!(f, "{} {kind} (auth-delegator)", self.component())
            }
            Self::MetricsServerRoleBindingAuthReader => {
                write!(f, "{} {kind} (auth-reader)", self.component())
            }
            _ => write!(f, "{} {kind}", self.component()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn tiers_follow_dependency_direction() {
        assert!(ResourceKind::ServiceAccount.tier() < ResourceKind::ClusterRole.tier());
        assert!(ResourceKind::RoleBinding.tier() < ResourceKind::Deployment.tier());
        assert!(ResourceKind::Deployment.tier() < ResourceKind::ApiService.tier());
        assert_eq!(ResourceKind::Service.tier(), ResourceKind::Deployment.tier());
    }

    #[test]
    fn only_pod_disruption_budgets_are_optional() {
        let optional: Vec<_> = ManifestKind::ALL
            .iter()
            .filter(|kind| kind.is_optional())
            .collect();
        assert_eq!(
            optional,
            vec![
                &ManifestKind::MetricsServerPodDisruptionBudget,
                &ManifestKind::PrometheusAdapterPodDisruptionBudget
            ]
        );
    }

    #[test]
    fn template_names_are_unique() {
        let names: HashSet<_> = ManifestKind::ALL.iter().map(|k| k.template_name()).collect();
        assert_eq!(names.len(), ManifestKind::ALL.len());
    }

    #[test]
    fn display_distinguishes_bindings_of_the_same_kind() {
        assert_eq!(
            ManifestKind::MetricsServerClusterRoleBinding.to_string(),
            "metrics-server ClusterRoleBinding"
        );
        assert_eq!(
            ManifestKind::MetricsServerClusterRoleBindingAuthDelegator.to_string(),
            "metrics-server ClusterRoleBinding (auth-delegator)"
        );
        assert_eq!(
            ManifestKind::PrometheusAdapterService.to_string(),
            "prometheus-adapter Service"
        );
    }

    #[test]
    fn cluster_scoped_kinds() {
        assert!(!ResourceKind::ClusterRole.is_namespaced());
        assert!(!ResourceKind::ApiService.is_namespaced());
        assert!(ResourceKind::RoleBinding.is_namespaced());
        assert!(ResourceKind::ServiceMonitor.is_namespaced());
    }
}
