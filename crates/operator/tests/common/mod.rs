//! Shared fakes for task integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use kube::core::ErrorResponse;
use metrics_operator::manifests::{Desired, ManifestError, ObjectRef};
use metrics_operator::{
    ClientError, DesiredObject, Factory, ManifestFactory, ManifestKind, OperatorConfig,
    ResourceClient, ResourceKind,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

pub const NAMESPACE: &str = "openshift-monitoring";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Apply(ObjectRef),
    Delete(ObjectRef),
}

impl Call {
    pub fn object(&self) -> &ObjectRef {
        match self {
            Self::Apply(object) | Self::Delete(object) => object,
        }
    }
}

/// In-memory cluster recording every call it receives
#[derive(Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    state: Mutex<BTreeMap<ObjectRef, Value>>,
    /// Number of applies that changed stored state
    changes: Mutex<usize>,
    fail_apply_of: Option<ResourceKind>,
    fail_delete_of: Option<ResourceKind>,
    /// Report absent objects with a 404 instead of silently succeeding
    strict_delete: bool,
    /// Cancel the token while serving the n-th apply
    cancel_during_apply: Option<(usize, CancellationToken)>,
}

pub fn api_error(code: u16, reason: &str) -> ClientError {
    ClientError::Kube(kube::Error::Api(ErrorResponse {
        status: "Failure".to_string(),
        message: format!("simulated {reason}"),
        reason: reason.to_string(),
        code,
    }))
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_apply_of(kind: ResourceKind) -> Self {
        Self {
            fail_apply_of: Some(kind),
            ..Self::default()
        }
    }

    pub fn failing_delete_of(kind: ResourceKind) -> Self {
        Self {
            fail_delete_of: Some(kind),
            ..Self::default()
        }
    }

    pub fn strict_delete() -> Self {
        Self {
            strict_delete: true,
            ..Self::default()
        }
    }

    /// Client that cancels `ctx` while serving its `nth` apply (1-based).
    ///
    /// That apply still succeeds; every later call observes the cancellation.
    pub fn cancelling_during_apply(nth: usize, ctx: CancellationToken) -> Self {
        Self {
            cancel_during_apply: Some((nth, ctx)),
            ..Self::default()
        }
    }

    pub fn seed(&self, object: &DesiredObject) {
        self.state
            .lock()
            .unwrap()
            .insert(object.identity(), object.to_value().unwrap());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<Call> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }

    pub fn state(&self) -> BTreeMap<ObjectRef, Value> {
        self.state.lock().unwrap().clone()
    }

    pub fn contains(&self, identity: &ObjectRef) -> bool {
        self.state.lock().unwrap().contains_key(identity)
    }

    pub fn take_changes(&self) -> usize {
        std::mem::take(&mut *self.changes.lock().unwrap())
    }
}

#[async_trait]
impl ResourceClient for RecordingClient {
    async fn create_or_update(
        &self,
        ctx: &CancellationToken,
        object: &DesiredObject,
    ) -> Result<(), ClientError> {
        if ctx.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let identity = object.identity();
        let applies = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call::Apply(identity.clone()));
            calls.iter().filter(|call| matches!(call, Call::Apply(_))).count()
        };

        if let Some((nth, token)) = &self.cancel_during_apply {
            if applies == *nth {
                token.cancel();
            }
        }

        if self.fail_apply_of == Some(identity.kind) {
            return Err(api_error(409, "Conflict"));
        }

        let value = object.to_value().expect("object serializes");
        let previous = self.state.lock().unwrap().insert(identity, value.clone());
        if previous.as_ref() != Some(&value) {
            *self.changes.lock().unwrap() += 1;
        }
        Ok(())
    }

    async fn delete(
        &self,
        ctx: &CancellationToken,
        object: &DesiredObject,
    ) -> Result<(), ClientError> {
        if ctx.is_cancelled() {
            return Err(ClientError::Cancelled);
        }
        let identity = object.identity();
        self.calls.lock().unwrap().push(Call::Delete(identity.clone()));

        if self.fail_delete_of == Some(identity.kind) {
            return Err(api_error(403, "Forbidden"));
        }

        let removed = self.state.lock().unwrap().remove(&identity);
        if removed.is_none() && self.strict_delete {
            return Err(api_error(404, "NotFound"));
        }
        Ok(())
    }
}

/// How [`BrokenFactory`] misbehaves for its broken manifest
#[derive(Debug, Clone, Copy)]
pub enum Breakage {
    /// Fail with an invalid-manifest error
    Invalid,
    /// Report the manifest as not configured
    Absent,
}

/// Factory that misbehaves for one manifest and defers to the real one otherwise
pub struct BrokenFactory {
    inner: ManifestFactory,
    broken: ManifestKind,
    breakage: Breakage,
}

impl BrokenFactory {
    pub fn new(config: OperatorConfig, broken: ManifestKind) -> Self {
        Self::with_breakage(config, broken, Breakage::Invalid)
    }

    pub fn absent(config: OperatorConfig, broken: ManifestKind) -> Self {
        Self::with_breakage(config, broken, Breakage::Absent)
    }

    fn with_breakage(config: OperatorConfig, broken: ManifestKind, breakage: Breakage) -> Self {
        Self {
            inner: factory(config),
            broken,
            breakage,
        }
    }
}

impl Factory for BrokenFactory {
    fn namespace(&self) -> &str {
        self.inner.namespace()
    }

    fn produce(&self, kind: ManifestKind) -> Result<Desired, ManifestError> {
        if kind != self.broken {
            return self.inner.produce(kind);
        }
        match self.breakage {
            Breakage::Invalid => Err(ManifestError::Invalid {
                kind,
                message: "template is malformed".to_string(),
            }),
            Breakage::Absent => Ok(Desired::Absent),
        }
    }
}

pub fn factory(config: OperatorConfig) -> ManifestFactory {
    ManifestFactory::new(NAMESPACE, Arc::new(config)).expect("templates register")
}

pub fn high_availability() -> OperatorConfig {
    OperatorConfig {
        high_availability: true,
        ..OperatorConfig::default()
    }
}
