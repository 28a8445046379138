//! fluxradar core types: resource registry, normalized records and per-cycle snapshots.

#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};

pub mod namespaces;
pub mod registry;
pub mod status;

pub use namespaces::NamespaceFilter;
pub use registry::{Registry, RegistryError, ResourceTypeDescriptor};
pub use status::{normalize, normalize_with, StatusPolicy, StatusTriple, CONDITIONS_PATH, LAST_TRANSITION_TIME};

/// Whether a kind is served by the cluster itself or installed through a CRD.
///
/// Serialized with the tags the receiving dashboard groups by.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    #[serde(rename = "k8s")]
    ClusterNative,
    #[serde(rename = "flux")]
    Custom,
}

/// One observed object, flattened to the shape delivered downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRecord {
    pub id: String,
    pub kind: String,
    pub resource_type: ResourceClass,
    pub name: String,
    pub namespace: String,
    pub status: String,
    pub message: String,
    pub last_transition_time: String,
}

impl NormalizedRecord {
    /// Build a record for `kind`/`namespace`/`name` carrying an already normalized status.
    pub fn new(kind: &str, class: ResourceClass, namespace: &str, name: &str, triple: StatusTriple) -> Self {
        Self {
            id: record_id(namespace, kind, name),
            kind: kind.to_string(),
            resource_type: class,
            name: name.to_string(),
            namespace: namespace.to_string(),
            status: triple.status,
            message: triple.message,
            last_transition_time: triple.last_transition_time,
        }
    }
}

/// Stable record identifier: `<namespace>-<lowercase kind>-<name>`.
pub fn record_id(namespace: &str, kind: &str, name: &str) -> String {
    format!("{}-{}-{}", namespace, kind.to_lowercase(), name)
}

/// Everything collected during one cycle. Never outlives the cycle that built it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Snapshot {
    #[serde(rename = "clusterName")]
    pub cluster_identity: String,
    #[serde(rename = "resources")]
    pub records: Vec<NormalizedRecord>,
}

impl Snapshot {
    pub fn new(cluster_identity: impl Into<String>, records: Vec<NormalizedRecord>) -> Self {
        Self { cluster_identity: cluster_identity.into(), records }
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
}

pub mod prelude {
    pub use super::{
        NamespaceFilter, NormalizedRecord, Registry, ResourceClass, ResourceTypeDescriptor, Snapshot,
        StatusPolicy, StatusTriple,
    };
}
