//! Single reconciliation steps shared by tasks
//!
//! Each step makes at most one client call and maps every failure to an
//! [`Error`] naming the manifest or object it acted on.

use super::types::{Action, Error, Result};
use crate::client::ResourceClient;
use crate::manifests::{Desired, DesiredObject, Factory, ManifestError, ManifestKind};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Produce `kind`, returning `None` when an optional manifest is not configured
pub(crate) fn produce(
    factory: &dyn Factory,
    kind: ManifestKind,
) -> Result<Option<DesiredObject>> {
    match factory.produce(kind) {
        Ok(Desired::Present(object)) => {
            debug_assert_eq!(
                object.kind(),
                kind.resource_kind(),
                "factory produced the wrong object kind for {kind}"
            );
            Ok(Some(object))
        }
        Ok(Desired::Absent) if kind.is_optional() => {
            debug!(manifest = %kind, "Manifest not configured, skipping");
            Ok(None)
        }
        Ok(Desired::Absent) => Err(Error::Configuration {
            kind,
            source: ManifestError::Invalid {
                kind,
                message: "required manifest produced no object".to_string(),
            },
        }),
        Err(source) => Err(Error::Configuration { kind, source }),
    }
}

/// Produce `kind` and upsert it
pub(crate) async fn apply_manifest(
    client: &dyn ResourceClient,
    factory: &dyn Factory,
    ctx: &CancellationToken,
    kind: ManifestKind,
) -> Result<()> {
    let Some(object) = produce(factory, kind)? else {
        return Ok(());
    };

    let identity = object.identity();
    client
        .create_or_update(ctx, &object)
        .await
        .map_err(|e| Error::from_client(Action::Apply, identity.clone(), e))?;
    info!(object = %identity, "Reconciled");
    Ok(())
}

/// Produce `kind` and delete it
pub(crate) async fn delete_manifest(
    client: &dyn ResourceClient,
    factory: &dyn Factory,
    ctx: &CancellationToken,
    kind: ManifestKind,
) -> Result<()> {
    match produce(factory, kind)? {
        Some(object) => delete_object(client, ctx, &object).await,
        None => Ok(()),
    }
}

/// Delete `object`; an object that is already gone counts as deleted
pub(crate) async fn delete_object(
    client: &dyn ResourceClient,
    ctx: &CancellationToken,
    object: &DesiredObject,
) -> Result<()> {
    let identity = object.identity();
    match client.delete(ctx, object).await {
        Ok(()) => {
            info!(object = %identity, "Deleted");
            Ok(())
        }
        Err(e) if e.is_not_found() => {
            debug!(object = %identity, "Already absent");
            Ok(())
        }
        Err(e) => Err(Error::from_client(Action::Delete, identity, e)),
    }
}
