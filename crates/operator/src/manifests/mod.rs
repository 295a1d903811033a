//! Desired-state manifests
//!
//! The [`Factory`] trait is the contract tasks consume: given a
//! [`ManifestKind`] it returns the object the cluster should contain, or
//! [`Desired::Absent`] when an optional manifest is not configured.
//! [`ManifestFactory`] implements it from embedded templates.

pub mod factory;
pub mod kinds;
pub mod object;

pub use factory::ManifestFactory;
pub use kinds::{Component, ManifestKind, ResourceKind, Tier};
pub use object::{Desired, DesiredObject, ObjectRef};

use thiserror::Error;

/// Errors raised while producing a manifest
#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("failed to register template for {kind}: {source}")]
    Template {
        kind: ManifestKind,
        #[source]
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render {kind}: {source}")]
    Render {
        kind: ManifestKind,
        #[source]
        source: handlebars::RenderError,
    },

    #[error("failed to parse rendered {kind}: {source}")]
    Parse {
        kind: ManifestKind,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid {kind} manifest: {message}")]
    Invalid { kind: ManifestKind, message: String },
}

/// Produces desired-state objects
///
/// Implementations are pure with respect to cluster state and deterministic
/// for a given configuration.
pub trait Factory: Send + Sync {
    /// Namespace namespaced manifests are rendered into
    fn namespace(&self) -> &str;

    fn produce(&self, kind: ManifestKind) -> Result<Desired, ManifestError>;
}
