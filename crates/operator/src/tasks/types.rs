use crate::client::ClientError;
use crate::manifests::{ManifestError, ManifestKind, ObjectRef, ResourceKind};
use std::fmt;
use thiserror::Error;

/// What a task was doing to an object when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Apply => f.write_str("reconciling"),
            Self::Delete => f.write_str("deleting"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    /// The factory could not produce a well-formed object
    #[error("initializing {kind} failed: {source}")]
    Configuration {
        kind: ManifestKind,
        #[source]
        source: ManifestError,
    },

    /// The cluster rejected an apply or delete
    #[error("{action} {object} failed: {source}")]
    Reconciliation {
        action: Action,
        object: ObjectRef,
        #[source]
        source: ClientError,
    },

    #[error("{action} {object} cancelled")]
    Cancelled { action: Action, object: ObjectRef },

    /// The task and its factory disagree on where the component lives
    #[error("task namespace {task} does not match factory namespace {factory}")]
    NamespaceMismatch { task: String, factory: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    /// Wrap a client failure for `object`, keeping cancellation distinct
    pub(crate) fn from_client(action: Action, object: ObjectRef, source: ClientError) -> Self {
        if source.is_cancelled() {
            Self::Cancelled { action, object }
        } else {
            Self::Reconciliation {
                action,
                object,
                source,
            }
        }
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Identity of the object the failing step acted on
    #[must_use]
    pub fn object(&self) -> Option<&ObjectRef> {
        match self {
            Self::Reconciliation { object, .. } | Self::Cancelled { object, .. } => Some(object),
            Self::Configuration { .. } | Self::NamespaceMismatch { .. } => None,
        }
    }

    /// Resource kind of the failing step
    #[must_use]
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        match self {
            Self::Configuration { kind, .. } => Some(kind.resource_kind()),
            _ => self.object().map(|object| object.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object() -> ObjectRef {
        ObjectRef::new(
            ResourceKind::Service,
            Some("openshift-monitoring"),
            "metrics-server",
        )
    }

    #[test]
    fn cancelled_client_error_becomes_cancelled() {
        let err = Error::from_client(Action::Apply, object(), ClientError::Cancelled);
        assert!(err.is_cancelled());
        assert_eq!(
            err.to_string(),
            "reconciling Service openshift-monitoring/metrics-server cancelled"
        );
    }

    #[test]
    fn reconciliation_error_names_the_object() {
        let err = Error::from_client(Action::Delete, object(), ClientError::MissingName);
        assert!(!err.is_cancelled());
        assert_eq!(err.resource_kind(), Some(ResourceKind::Service));
        assert_eq!(
            err.to_string(),
            "deleting Service openshift-monitoring/metrics-server failed: object has no name"
        );
    }

    #[test]
    fn configuration_error_names_the_manifest() {
        let err = Error::Configuration {
            kind: ManifestKind::MetricsServerApiService,
            source: ManifestError::Invalid {
                kind: ManifestKind::MetricsServerApiService,
                message: "bad".to_string(),
            },
        };
        assert_eq!(err.resource_kind(), Some(ResourceKind::ApiService));
        assert!(err.object().is_none());
        assert!(err
            .to_string()
            .starts_with("initializing metrics-server APIService failed"));
    }
}
