//! fluxradar collect: per-cycle collection pass and snapshot assembly

#![forbid(unsafe_code)]

use std::time::Instant;

use metrics::{counter, histogram};
use radar_core::{normalize_with, NamespaceFilter, NormalizedRecord, Registry, ResourceTypeDescriptor, Snapshot};
use radar_kubehub::ObjectStore;
use serde_json::Value;
use tracing::debug;

/// Walks the registry against an [`ObjectStore`] and normalizes whatever it finds.
pub struct Collector<S> {
    store: S,
    registry: Registry,
    namespaces: NamespaceFilter,
}

impl<S: ObjectStore> Collector<S> {
    pub fn new(store: S, registry: Registry, namespaces: NamespaceFilter) -> Self {
        Self { store, registry, namespaces }
    }

    pub fn registry(&self) -> &Registry { &self.registry }
    pub fn namespaces(&self) -> &NamespaceFilter { &self.namespaces }

    /// One full pass: registry order, then namespace order, then listing order.
    ///
    /// A failed query only drops its own `(kind, namespace)` pair.
    pub async fn collect(&self) -> Vec<NormalizedRecord> {
        let started = Instant::now();
        let mut out = Vec::new();
        for descriptor in &self.registry {
            for scope in self.namespaces.scopes() {
                let items = match self.store.list(descriptor, scope).await {
                    Ok(items) => items,
                    Err(e) => {
                        debug!(kind = %descriptor.kind, gvr = %descriptor.gvr_key(), ns = ?scope, error = %e, "query failed; skipping");
                        counter!("radar_query_failures_total", 1u64, "kind" => descriptor.kind.clone());
                        continue;
                    }
                };
                for item in &items {
                    if let Some(rec) = self.record_from(descriptor, item) {
                        out.push(rec);
                    }
                }
            }
        }
        histogram!("radar_collect_ms", started.elapsed().as_secs_f64() * 1000.0);
        counter!("radar_records_total", out.len() as u64);
        out
    }

    fn record_from(&self, descriptor: &ResourceTypeDescriptor, obj: &Value) -> Option<NormalizedRecord> {
        let meta = obj.get("metadata");
        let name = meta.and_then(|m| m.get("name")).and_then(Value::as_str).unwrap_or_default();
        let namespace = meta.and_then(|m| m.get("namespace")).and_then(Value::as_str).unwrap_or_default();
        if !self.namespaces.admits(namespace) {
            debug!(kind = %descriptor.kind, obj = name, ns = namespace, "object outside namespace filter; dropped");
            return None;
        }
        let triple = normalize_with(obj, &descriptor.policy);
        Some(NormalizedRecord::new(&descriptor.kind, descriptor.class, namespace, name, triple))
    }
}

/// Pairs a cycle's records with the configured cluster identity.
#[derive(Debug, Clone)]
pub struct BatchBuilder {
    cluster_identity: String,
}

impl BatchBuilder {
    pub fn new(cluster_identity: impl Into<String>) -> Self {
        Self { cluster_identity: cluster_identity.into() }
    }

    pub fn build(&self, records: Vec<NormalizedRecord>) -> Snapshot {
        Snapshot::new(self.cluster_identity.clone(), records)
    }
}
