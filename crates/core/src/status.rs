//! Status extraction over schema-less objects.
//!
//! Objects arrive as raw `serde_json::Value`s whose `status` shape is only known by convention.
//! Every accessor here returns `Option` and every public entry point degrades to empty strings,
//! so an oddly shaped object can never abort a collection pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Field path holding the condition list on most cluster resources.
pub const CONDITIONS_PATH: &[&str] = &["status", "conditions"];

/// Condition timestamp reported unless a policy names another one.
pub const LAST_TRANSITION_TIME: &str = "lastTransitionTime";

const UNKNOWN: &str = "Unknown";

/// The uniform `(status, message, lastTransitionTime)` triple.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusTriple {
    pub status: String,
    pub message: String,
    pub last_transition_time: String,
}

impl StatusTriple {
    fn fixed(status: &str) -> Self {
        Self { status: status.to_string(), ..Self::default() }
    }
}

/// How a descriptor turns an object into a [`StatusTriple`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatusPolicy {
    /// First entry of `status.conditions`; later entries are ignored.
    #[default]
    FirstCondition,
    /// Like `FirstCondition`, but the status falls back to `fallback` when there is no condition.
    /// The time is read from the condition's `time_field`.
    FirstConditionOr { fallback: String, time_field: String },
    /// The condition whose `type` is `wanted` (time read from `time_field`), or `Unknown` when absent.
    PreferCondition { wanted: String, time_field: String },
    /// `status.phase` / `status.message`, time from the first condition.
    Phase,
    /// Constant status with no message or time.
    Fixed(String),
}

/// Walk `path` through nested mappings and return the value at its end.
pub fn lookup<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let (last, parents) = path.split_last()?;
    let mut cur: &Map<String, Value> = obj.as_object()?;
    for seg in parents {
        cur = cur.get(*seg)?.as_object()?;
    }
    cur.get(*last)
}

/// The list at `path`, if every parent is a mapping and the leaf is a list.
pub fn nested_list<'a>(obj: &'a Value, path: &[&str]) -> Option<&'a Vec<Value>> {
    lookup(obj, path)?.as_array()
}

/// Render a scalar for display. Missing and `null` become empty, composites become compact JSON.
fn display(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// A condition timestamp is only kept when it already is a string.
fn condition_time(cond: &Map<String, Value>, field: &str) -> String {
    cond.get(field).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn from_condition_at(cond: &Map<String, Value>, time_field: &str) -> StatusTriple {
    StatusTriple {
        status: display(cond.get("type")),
        message: display(cond.get("message")),
        last_transition_time: condition_time(cond, time_field),
    }
}

fn from_condition(cond: &Map<String, Value>) -> StatusTriple {
    from_condition_at(cond, LAST_TRANSITION_TIME)
}

fn first_condition(obj: &Value) -> Option<&Map<String, Value>> {
    nested_list(obj, CONDITIONS_PATH)?.first()?.as_object()
}

/// Generic normalization: the first condition wins.
pub fn normalize(obj: &Value) -> StatusTriple {
    first_condition(obj).map(from_condition).unwrap_or_default()
}

/// Normalize `obj` according to `policy`.
pub fn normalize_with(obj: &Value, policy: &StatusPolicy) -> StatusTriple {
    match policy {
        StatusPolicy::FirstCondition => normalize(obj),
        StatusPolicy::FirstConditionOr { fallback, time_field } => first_condition(obj)
            .map(|c| from_condition_at(c, time_field))
            .unwrap_or_else(|| StatusTriple::fixed(fallback)),
        StatusPolicy::PreferCondition { wanted, time_field } => nested_list(obj, CONDITIONS_PATH)
            .into_iter()
            .flatten()
            .filter_map(Value::as_object)
            .find(|c| c.get("type").and_then(Value::as_str) == Some(wanted.as_str()))
            .map(|c| from_condition_at(c, time_field))
            .unwrap_or_else(|| StatusTriple::fixed(UNKNOWN)),
        StatusPolicy::Phase => StatusTriple {
            status: display(lookup(obj, &["status", "phase"])),
            message: display(lookup(obj, &["status", "message"])),
            last_transition_time: first_condition(obj)
                .map(|c| condition_time(c, LAST_TRANSITION_TIME))
                .unwrap_or_default(),
        },
        StatusPolicy::Fixed(text) => StatusTriple::fixed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn triple(s: &str, m: &str, t: &str) -> StatusTriple {
        StatusTriple { status: s.into(), message: m.into(), last_transition_time: t.into() }
    }

    #[test]
    fn missing_status_is_empty() {
        let obj = json!({ "metadata": { "name": "a" } });
        assert_eq!(normalize(&obj), StatusTriple::default());
    }

    #[test]
    fn non_mapping_parents_are_empty() {
        assert_eq!(normalize(&json!({ "status": "Ready" })), StatusTriple::default());
        assert_eq!(normalize(&json!({ "status": { "conditions": { "type": "Ready" } } })), StatusTriple::default());
        assert_eq!(normalize(&json!({ "status": { "conditions": [] } })), StatusTriple::default());
        assert_eq!(normalize(&json!({ "status": { "conditions": ["Ready"] } })), StatusTriple::default());
        assert_eq!(normalize(&json!(["not", "an", "object"])), StatusTriple::default());
    }

    #[test]
    fn first_condition_wins() {
        let obj = json!({ "status": { "conditions": [
            { "type": "Reconciling", "message": "progressing", "lastTransitionTime": "2024-02-02T00:00:00Z" },
            { "type": "Ready", "message": "ok", "lastTransitionTime": "2024-01-01T00:00:00Z" },
        ] } });
        assert_eq!(normalize(&obj), triple("Reconciling", "progressing", "2024-02-02T00:00:00Z"));
    }

    #[test]
    fn scalars_are_coerced_and_time_requires_string() {
        let obj = json!({ "status": { "conditions": [
            { "type": 3, "message": true, "lastTransitionTime": 1700000000 },
        ] } });
        assert_eq!(normalize(&obj), triple("3", "true", ""));

        let obj = json!({ "status": { "conditions": [ { "type": "Ready", "message": null } ] } });
        assert_eq!(normalize(&obj), triple("Ready", "", ""));
    }

    #[test]
    fn prefer_condition_scans_whole_list() {
        let obj = json!({ "status": { "conditions": [
            { "type": "Progressing", "message": "rolling" },
            { "type": "Available", "message": "minimum replicas", "lastTransitionTime": "2024-03-03T00:00:00Z" },
        ] } });
        let policy = StatusPolicy::PreferCondition { wanted: "Available".into(), time_field: LAST_TRANSITION_TIME.into() };
        assert_eq!(normalize_with(&obj, &policy), triple("Available", "minimum replicas", "2024-03-03T00:00:00Z"));
        assert_eq!(normalize_with(&json!({}), &policy), triple("Unknown", "", ""));
    }

    #[test]
    fn phase_policy_reads_phase_and_first_condition_time() {
        let obj = json!({ "status": {
            "phase": "Running",
            "message": "",
            "conditions": [ { "type": "Initialized", "lastTransitionTime": "2024-04-04T00:00:00Z" } ],
        } });
        assert_eq!(normalize_with(&obj, &StatusPolicy::Phase), triple("Running", "", "2024-04-04T00:00:00Z"));
    }

    #[test]
    fn fixed_and_fallback_policies() {
        assert_eq!(normalize_with(&json!({}), &StatusPolicy::Fixed("Active".into())), triple("Active", "", ""));
        let fallback = StatusPolicy::FirstConditionOr { fallback: "Unknown".into(), time_field: LAST_TRANSITION_TIME.into() };
        assert_eq!(normalize_with(&json!({ "status": {} }), &fallback), triple("Unknown", "", ""));
        let obj = json!({ "status": { "conditions": [ { "type": "Complete", "message": "done" } ] } });
        assert_eq!(normalize_with(&obj, &fallback), triple("Complete", "done", ""));
    }

    #[test]
    fn policies_read_their_own_time_field() {
        let obj = json!({ "status": { "conditions": [
            { "type": "Available", "lastTransitionTime": "2024-01-01T00:00:00Z", "lastUpdateTime": "2024-05-05T00:00:00Z" },
        ] } });
        let prefer = StatusPolicy::PreferCondition { wanted: "Available".into(), time_field: "lastUpdateTime".into() };
        assert_eq!(normalize_with(&obj, &prefer), triple("Available", "", "2024-05-05T00:00:00Z"));

        let job = json!({ "status": { "conditions": [ { "type": "Complete", "lastProbeTime": "2024-06-06T00:00:00Z" } ] } });
        let first = StatusPolicy::FirstConditionOr { fallback: "Unknown".into(), time_field: "lastProbeTime".into() };
        assert_eq!(normalize_with(&job, &first), triple("Complete", "", "2024-06-06T00:00:00Z"));
        assert_eq!(normalize(&job), triple("Complete", "", ""));
    }

    #[test]
    fn lookup_rejects_empty_path() {
        assert!(lookup(&json!({ "a": 1 }), &[]).is_none());
        assert_eq!(lookup(&json!({ "a": { "b": 2 } }), &["a", "b"]), Some(&json!(2)));
    }
}
