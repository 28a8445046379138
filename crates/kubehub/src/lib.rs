//! fluxradar kubehub – ambient client acquisition and dynamic listing

#![forbid(unsafe_code)]

use anyhow::{Context, Result};
use tracing::{debug, info};

use kube::{
    api::{Api, ListParams},
    core::{ApiResource, DynamicObject, GroupVersionKind},
    Client, Config,
};
use radar_core::ResourceTypeDescriptor;

/// Build a client from ambient credentials (in-cluster service account, else kubeconfig).
pub async fn connect() -> Result<Client> {
    let config = Config::infer().await.context("loading ambient kube credentials")?;
    info!(cluster_url = %config.cluster_url, "kube credentials loaded");
    Client::try_from(config).context("building kube client")
}

/// Generic object store: list raw objects for one descriptor, optionally namespace scoped.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn list(&self, descriptor: &ResourceTypeDescriptor, namespace: Option<&str>) -> Result<Vec<serde_json::Value>>;
}

#[async_trait::async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for &T {
    async fn list(&self, descriptor: &ResourceTypeDescriptor, namespace: Option<&str>) -> Result<Vec<serde_json::Value>> {
        (**self).list(descriptor, namespace).await
    }
}

#[async_trait::async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn list(&self, descriptor: &ResourceTypeDescriptor, namespace: Option<&str>) -> Result<Vec<serde_json::Value>> {
        (**self).list(descriptor, namespace).await
    }
}

/// [`ObjectStore`] backed by the kube dynamic API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self { Self { client } }

    fn api_for(&self, descriptor: &ResourceTypeDescriptor, namespace: Option<&str>) -> Api<DynamicObject> {
        let ar = api_resource(descriptor);
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

fn api_resource(d: &ResourceTypeDescriptor) -> ApiResource {
    let gvk = GroupVersionKind::gvk(&d.group, &d.version, &d.kind);
    ApiResource::from_gvk_with_plural(&gvk, &d.plural)
}

fn strip_managed_fields(v: &mut serde_json::Value) {
    if let Some(meta) = v.get_mut("metadata") {
        if let Some(obj) = meta.as_object_mut() {
            obj.remove("managedFields");
        }
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeStore {
    async fn list(&self, descriptor: &ResourceTypeDescriptor, namespace: Option<&str>) -> Result<Vec<serde_json::Value>> {
        let api = self.api_for(descriptor, namespace);
        let list = api
            .list(&ListParams::default())
            .await
            .with_context(|| format!("listing {} in {}", descriptor.gvr_key(), namespace.unwrap_or("all namespaces")))?;
        debug!(gvr = %descriptor.gvr_key(), ns = ?namespace, count = list.items.len(), "listed");
        list.items
            .iter()
            .map(|o| -> Result<serde_json::Value> {
                let mut raw = serde_json::to_value(o).context("serializing DynamicObject")?;
                strip_managed_fields(&mut raw);
                Ok(raw)
            })
            .collect()
    }
}
