//! Static catalog of the resource kinds polled every cycle.

use serde::{Deserialize, Serialize};

use crate::status::LAST_TRANSITION_TIME;
use crate::{ResourceClass, StatusPolicy};

/// Identifies one queryable kind: its logical name plus the group/version/resource to list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResourceTypeDescriptor {
    pub kind: String,
    pub group: String,
    pub version: String,
    pub plural: String,
    pub class: ResourceClass,
    pub policy: StatusPolicy,
}

impl ResourceTypeDescriptor {
    /// A CRD-backed kind normalized with the first-condition policy.
    pub fn custom(kind: &str, group: &str, version: &str, plural: &str) -> Self {
        Self {
            kind: kind.to_string(),
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_string(),
            class: ResourceClass::Custom,
            policy: StatusPolicy::FirstCondition,
        }
    }

    /// A kind served by the API server itself.
    pub fn native(kind: &str, group: &str, version: &str, plural: &str, policy: StatusPolicy) -> Self {
        Self {
            kind: kind.to_string(),
            group: group.to_string(),
            version: version.to_string(),
            plural: plural.to_string(),
            class: ResourceClass::ClusterNative,
            policy,
        }
    }

    pub fn with_policy(mut self, policy: StatusPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// `group/version/plural`, or `version/plural` for the core group.
    pub fn gvr_key(&self) -> String {
        if self.group.is_empty() {
            format!("{}/{}", self.version, self.plural)
        } else {
            format!("{}/{}/{}", self.group, self.version, self.plural)
        }
    }

    pub fn api_version(&self) -> String {
        if self.group.is_empty() { self.version.clone() } else { format!("{}/{}", self.group, self.version) }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate resource {gvr}: registered by both {first} and {second}")]
    Duplicate { gvr: String, first: String, second: String },
}

/// Ordered, immutable list of descriptors. Order here is the order records are emitted in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registry {
    descriptors: Vec<ResourceTypeDescriptor>,
}

impl Registry {
    /// Build a registry, rejecting two descriptors that resolve to the same group/version/resource.
    pub fn new(descriptors: Vec<ResourceTypeDescriptor>) -> Result<Self, RegistryError> {
        for (i, d) in descriptors.iter().enumerate() {
            if let Some(prev) = descriptors[..i].iter().find(|p| p.group == d.group && p.version == d.version && p.plural == d.plural) {
                return Err(RegistryError::Duplicate { gvr: d.gvr_key(), first: prev.kind.clone(), second: d.kind.clone() });
            }
        }
        Ok(Self { descriptors })
    }

    /// The Flux toolkit kinds, optionally followed by the built-in workload kinds.
    pub fn default_catalog(include_native: bool) -> Self {
        let mut descriptors = flux_kinds();
        if include_native {
            descriptors.extend(native_kinds());
        }
        Self { descriptors }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResourceTypeDescriptor> { self.descriptors.iter() }
    pub fn len(&self) -> usize { self.descriptors.len() }
    pub fn is_empty(&self) -> bool { self.descriptors.is_empty() }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a ResourceTypeDescriptor;
    type IntoIter = std::slice::Iter<'a, ResourceTypeDescriptor>;
    fn into_iter(self) -> Self::IntoIter { self.descriptors.iter() }
}

pub fn flux_kinds() -> Vec<ResourceTypeDescriptor> {
    use ResourceTypeDescriptor as D;
    vec![
        D::custom("GitRepository", "source.toolkit.fluxcd.io", "v1", "gitrepositories"),
        D::custom("Kustomization", "kustomize.toolkit.fluxcd.io", "v1", "kustomizations"),
        D::custom("HelmRelease", "helm.toolkit.fluxcd.io", "v2beta1", "helmreleases"),
        D::custom("HelmRepository", "source.toolkit.fluxcd.io", "v1", "helmrepositories"),
        D::custom("OCIRepository", "source.toolkit.fluxcd.io", "v1beta2", "ocirepositories"),
        D::custom("HelmChart", "source.toolkit.fluxcd.io", "v1", "helmcharts"),
        D::custom("ImageAutomation", "image.toolkit.fluxcd.io", "v1beta2", "imageautomations"),
        D::custom("Notification", "notification.toolkit.fluxcd.io", "v1beta3", "alerts"),
    ]
}

fn prefer(wanted: &str, time_field: &str) -> StatusPolicy {
    StatusPolicy::PreferCondition { wanted: wanted.into(), time_field: time_field.into() }
}

fn first_or_unknown(time_field: &str) -> StatusPolicy {
    StatusPolicy::FirstConditionOr { fallback: "Unknown".into(), time_field: time_field.into() }
}

pub fn native_kinds() -> Vec<ResourceTypeDescriptor> {
    use ResourceTypeDescriptor as D;
    vec![
        D::native("Pod", "", "v1", "pods", StatusPolicy::Phase),
        D::native("Service", "", "v1", "services", StatusPolicy::Fixed("Active".into())),
        D::native("Deployment", "apps", "v1", "deployments", prefer("Available", "lastUpdateTime")),
        D::native("StatefulSet", "apps", "v1", "statefulsets", first_or_unknown(LAST_TRANSITION_TIME)),
        D::native("Job", "batch", "v1", "jobs", first_or_unknown("lastProbeTime")),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_unique_gvrs() {
        let full = Registry::default_catalog(true);
        let all: Vec<_> = full.iter().cloned().collect();
        assert_eq!(Registry::new(all).map(|r| r.len()), Ok(13));
        assert_eq!(Registry::default_catalog(false).len(), 8);
    }

    #[test]
    fn catalog_order_is_stable() {
        let kinds: Vec<_> = Registry::default_catalog(true).iter().map(|d| d.kind.clone()).collect();
        assert_eq!(kinds.first().map(String::as_str), Some("GitRepository"));
        assert_eq!(kinds[7], "Notification");
        assert_eq!(kinds[8], "Pod");
    }

    #[test]
    fn duplicate_gvr_is_rejected() {
        let err = Registry::new(vec![
            ResourceTypeDescriptor::custom("Widget", "g1", "v1", "widgets"),
            ResourceTypeDescriptor::custom("Gadget", "g1", "v1", "widgets"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            RegistryError::Duplicate { gvr: "g1/v1/widgets".into(), first: "Widget".into(), second: "Gadget".into() }
        );
    }

    #[test]
    fn same_plural_in_other_version_is_allowed() {
        let reg = Registry::new(vec![
            ResourceTypeDescriptor::custom("Widget", "g1", "v1", "widgets"),
            ResourceTypeDescriptor::custom("WidgetBeta", "g1", "v1beta1", "widgets"),
        ]);
        assert!(reg.is_ok());
    }

    #[test]
    fn core_group_keys() {
        let pods = &native_kinds()[0];
        assert_eq!(pods.gvr_key(), "v1/pods");
        assert_eq!(pods.api_version(), "v1");
        assert_eq!(flux_kinds()[0].api_version(), "source.toolkit.fluxcd.io/v1");
    }
}
