//! [`ResourceClient`] backed by the Kubernetes API
//!
//! Upserts use server-side apply with a forced field manager, so repeated
//! applies of an unchanged object are no-ops on the server. Deletes map a 404
//! to success.

use super::{cancellable, ClientError, ResourceClient};
use crate::manifests::{DesiredObject, ResourceKind};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, DeleteParams, Patch, PatchParams};
use kube::core::{DynamicObject, GroupVersionKind};
use kube::discovery::ApiResource;
use kube::{Client, Resource};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Apply,
    Delete,
}

/// API resource description of the prometheus-operator ServiceMonitor CRD
#[must_use]
pub fn service_monitor_resource() -> ApiResource {
    let gvk = GroupVersionKind::gvk("monitoring.coreos.com", "v1", "ServiceMonitor");
    ApiResource::from_gvk_with_plural(&gvk, "servicemonitors")
}

/// Namespace `object` is addressed in, `None` for cluster-scoped kinds.
///
/// A namespaced object that does not name its namespace is rejected.
fn scope(object: &DesiredObject) -> Result<Option<&str>, ClientError> {
    let kind = object.kind();
    if !kind.is_namespaced() {
        return Ok(None);
    }
    object
        .metadata()
        .namespace
        .as_deref()
        .map(Some)
        .ok_or(ClientError::MissingNamespace(kind))
}

#[derive(Clone)]
pub struct KubeResourceClient {
    client: Client,
    field_manager: String,
}

impl KubeResourceClient {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn namespaced<K>(
        &self,
        namespace: Option<&str>,
        kind: ResourceKind,
    ) -> Result<Api<K>, ClientError>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        let namespace = namespace.ok_or(ClientError::MissingNamespace(kind))?;
        Ok(Api::namespaced(self.client.clone(), namespace))
    }

    fn cluster<K>(&self) -> Api<K>
    where
        K: Resource,
        <K as Resource>::DynamicType: Default,
    {
        Api::all(self.client.clone())
    }

    fn service_monitors(&self, namespace: Option<&str>) -> Result<Api<DynamicObject>, ClientError> {
        let namespace =
            namespace.ok_or(ClientError::MissingNamespace(ResourceKind::ServiceMonitor))?;
        Ok(Api::namespaced_with(
            self.client.clone(),
            namespace,
            &service_monitor_resource(),
        ))
    }

    async fn dispatch(
        &self,
        operation: Operation,
        object: &DesiredObject,
    ) -> Result<(), ClientError> {
        let kind = object.kind();
        let namespace = scope(object)?;

        match object {
            DesiredObject::ServiceAccount(o) => {
                self.execute(self.namespaced(namespace, kind)?, o, operation).await
            }
            DesiredObject::ClusterRole(o) => self.execute(self.cluster(), o, operation).await,
            DesiredObject::ClusterRoleBinding(o) => {
                self.execute(self.cluster(), o, operation).await
            }
            DesiredObject::RoleBinding(o) => {
                self.execute(self.namespaced(namespace, kind)?, o, operation).await
            }
            DesiredObject::Service(o) => {
                self.execute(self.namespaced(namespace, kind)?, o, operation).await
            }
            DesiredObject::Deployment(o) => {
                self.execute(self.namespaced(namespace, kind)?, o, operation).await
            }
            DesiredObject::ServiceMonitor(o) => {
                self.execute(self.service_monitors(namespace)?, o, operation).await
            }
            DesiredObject::PodDisruptionBudget(o) => {
                self.execute(self.namespaced(namespace, kind)?, o, operation).await
            }
            DesiredObject::ApiService(o) => self.execute(self.cluster(), o, operation).await,
        }
    }

    async fn execute<K>(
        &self,
        api: Api<K>,
        object: &K,
        operation: Operation,
    ) -> Result<(), ClientError>
    where
        K: Resource + Clone + Serialize + DeserializeOwned + Debug,
    {
        let name = object.meta().name.as_deref().ok_or(ClientError::MissingName)?;

        match operation {
            Operation::Apply => {
                let params = PatchParams::apply(&self.field_manager).force();
                api.patch(name, &params, &Patch::Apply(object)).await?;
                debug!(%name, "Applied object");
                Ok(())
            }
            Operation::Delete => match api.delete(name, &DeleteParams::background()).await {
                Ok(_) => {
                    debug!(%name, "Deleted object");
                    Ok(())
                }
                Err(kube::Error::Api(response)) if response.code == 404 => {
                    debug!(%name, "Object already absent");
                    Ok(())
                }
                Err(e) => Err(e.into()),
            },
        }
    }
}

#[async_trait]
impl ResourceClient for KubeResourceClient {
    #[instrument(skip_all, fields(object = %object.identity()))]
    async fn create_or_update(
        &self,
        ctx: &CancellationToken,
        object: &DesiredObject,
    ) -> Result<(), ClientError> {
        cancellable(ctx, self.dispatch(Operation::Apply, object)).await
    }

    #[instrument(skip_all, fields(object = %object.identity()))]
    async fn delete(
        &self,
        ctx: &CancellationToken,
        object: &DesiredObject,
    ) -> Result<(), ClientError> {
        cancellable(ctx, self.dispatch(Operation::Delete, object)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::Deployment;
    use k8s_openapi::api::core::v1::Service;
    use k8s_openapi::api::rbac::v1::ClusterRole;
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    #[test]
    fn service_monitor_resource_uses_crd_plural() {
        let resource = service_monitor_resource();
        assert_eq!(resource.group, "monitoring.coreos.com");
        assert_eq!(resource.version, "v1");
        assert_eq!(resource.kind, "ServiceMonitor");
        assert_eq!(resource.plural, "servicemonitors");
        assert_eq!(resource.api_version, "monitoring.coreos.com/v1");
    }

    fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: namespace.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn cluster_scoped_objects_ignore_namespace() {
        let role = DesiredObject::ClusterRole(ClusterRole {
            metadata: meta("system:metrics-server", Some("stray")),
            ..Default::default()
        });
        assert_eq!(scope(&role).unwrap(), None);
    }

    #[test]
    fn namespaced_objects_use_their_namespace() {
        let service = DesiredObject::Service(Service {
            metadata: meta("metrics-server", Some("openshift-monitoring")),
            ..Default::default()
        });
        assert_eq!(scope(&service).unwrap(), Some("openshift-monitoring"));
    }

    #[test]
    fn namespaced_object_without_namespace_is_rejected() {
        let deployment = DesiredObject::Deployment(Deployment {
            metadata: meta("prometheus-adapter", None),
            ..Default::default()
        });
        let err = scope(&deployment).unwrap_err();
        assert!(matches!(err, ClientError::MissingNamespace(ResourceKind::Deployment)));
        assert_eq!(err.to_string(), "Deployment object has no namespace");
    }
}
