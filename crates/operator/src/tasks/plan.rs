//! Declared apply and retire orders
//!
//! The order in which manifests are applied encodes their dependencies:
//! identity before permissions, permissions before the workload, the workload
//! before whatever selects or registers it. Retirement walks the tiers the
//! other way. Both orders are checked against [`Tier`].

use crate::manifests::{ManifestKind, Tier};
use std::collections::HashSet;
use thiserror::Error;

/// Manifests applied by the metrics-server task, in order
pub const METRICS_SERVER_APPLY_ORDER: &[ManifestKind] = &[
    ManifestKind::MetricsServerServiceAccount,
    ManifestKind::MetricsServerClusterRole,
    ManifestKind::MetricsServerClusterRoleBinding,
    ManifestKind::MetricsServerClusterRoleBindingAuthDelegator,
    ManifestKind::MetricsServerRoleBindingAuthReader,
    ManifestKind::MetricsServerService,
    ManifestKind::MetricsServerDeployment,
    ManifestKind::MetricsServerServiceMonitor,
    ManifestKind::MetricsServerPodDisruptionBudget,
    ManifestKind::MetricsServerApiService,
];

/// prometheus-adapter manifests deleted once metrics-server is in place, in order
pub const PROMETHEUS_ADAPTER_RETIRE_ORDER: &[ManifestKind] = &[
    ManifestKind::PrometheusAdapterPodDisruptionBudget,
    ManifestKind::PrometheusAdapterServiceMonitor,
    ManifestKind::PrometheusAdapterService,
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    #[error("{later} ({later_tier:?}) is ordered after {earlier} ({earlier_tier:?})")]
    OutOfOrder {
        earlier: ManifestKind,
        earlier_tier: Tier,
        later: ManifestKind,
        later_tier: Tier,
    },

    #[error("{0} is listed more than once")]
    Duplicate(ManifestKind),
}

/// Check that `order` never steps down a dependency tier
pub fn validate_apply_order(order: &[ManifestKind]) -> Result<(), OrderError> {
    validate(order, |earlier, later| earlier <= later)
}

/// Check that `order` never steps up a dependency tier
pub fn validate_retire_order(order: &[ManifestKind]) -> Result<(), OrderError> {
    validate(order, |earlier, later| earlier >= later)
}

fn validate(
    order: &[ManifestKind],
    allowed: impl Fn(Tier, Tier) -> bool,
) -> Result<(), OrderError> {
    let mut seen = HashSet::new();
    for kind in order {
        if !seen.insert(*kind) {
            return Err(OrderError::Duplicate(*kind));
        }
    }

    for pair in order.windows(2) {
        let (earlier, later) = (pair[0], pair[1]);
        let (earlier_tier, later_tier) =
            (earlier.resource_kind().tier(), later.resource_kind().tier());
        if !allowed(earlier_tier, later_tier) {
            return Err(OrderError::OutOfOrder {
                earlier,
                earlier_tier,
                later,
                later_tier,
            });
        }
    }
    Ok(())
}
