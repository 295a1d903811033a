//! Cluster client contract
//!
//! Tasks talk to the cluster only through [`ResourceClient`]. Both operations
//! are idempotent: `create_or_update` upserts by identity and `delete` of an
//! absent object succeeds. Every call observes the supplied cancellation
//! token and returns [`ClientError::Cancelled`] promptly once it fires.

pub mod kube;

pub use self::kube::KubeResourceClient;

use crate::manifests::{DesiredObject, ResourceKind};
use async_trait::async_trait;
use std::future::Future;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors returned by a [`ResourceClient`]
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("operation cancelled")]
    Cancelled,

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] ::kube::Error),

    #[error("object has no name")]
    MissingName,

    #[error("{0} object has no namespace")]
    MissingNamespace(ResourceKind),
}

impl ClientError {
    /// Whether the API server reported the object as absent
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Kube(::kube::Error::Api(response)) if response.code == 404)
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Create the object, or update it in place if it already exists
    async fn create_or_update(
        &self,
        ctx: &CancellationToken,
        object: &DesiredObject,
    ) -> Result<(), ClientError>;

    /// Delete the object; an absent object is not an error
    async fn delete(&self, ctx: &CancellationToken, object: &DesiredObject)
        -> Result<(), ClientError>;
}

/// Run `call` unless `ctx` is cancelled first.
///
/// An already-cancelled token fails without polling `call` at all.
pub async fn cancellable<F>(ctx: &CancellationToken, call: F) -> Result<(), ClientError>
where
    F: Future<Output = Result<(), ClientError>>,
{
    if ctx.is_cancelled() {
        return Err(ClientError::Cancelled);
    }

    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(ClientError::Cancelled),
        result = call => result,
    }
}
