//! Parse-with-defaults boundary for agent payloads
//!
//! Agent responses are untrusted: any field may be missing, null, or of the
//! wrong shape. Everything past this module works with a fully populated
//! [`Update`], so every accessor here degrades to a default instead of failing.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::types::{
    ActionItem, Dependency, Feature, OverallSummary, RiskIndicator, TimelineChange, Update,
    UNKNOWN_STATUS,
};

type Record = Map<String, Value>;

/// Last millisecond stamp handed out by [`next_update_id`].
static LAST_ID_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Synthesize a local update id from a strictly increasing millisecond clock.
///
/// Example: "upd-1771929000000"
pub fn next_update_id() -> String {
    let now = Utc::now().timestamp_millis();
    let mut prev = LAST_ID_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_ID_MILLIS.compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
        {
            Ok(_) => return format!("upd-{}", next),
            Err(actual) => prev = actual,
        }
    }
}

/// Current time in the ISO-8601 form the agent uses for `generated_at`.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unwrap a payload into a record.
///
/// Accepts an object directly, or a string holding a JSON object (some agent
/// runtimes return the structured result pre-encoded). Anything else is unusable.
pub fn decode_payload(value: &Value) -> Option<Record> {
    match value {
        Value::Object(map) => Some(map.clone()),
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

/// Coerce a loosely-typed payload into a fully defaulted update.
///
/// `fallback_project` fills `project_name` when the payload has none.
pub fn normalize_update(payload: &Value, fallback_project: &str) -> Update {
    let record = decode_payload(payload).unwrap_or_default();
    normalize_record(&record, fallback_project)
}

fn normalize_record(record: &Record, fallback_project: &str) -> Update {
    let id = identifier(record, "update_id").unwrap_or_else(next_update_id);
    let generated_at = text(record, "generated_at").unwrap_or_else(now_timestamp);
    let project_name =
        text(record, "project_name").unwrap_or_else(|| fallback_project.to_string());

    let summary = match record.get("overall_summary") {
        Some(Value::Object(s)) => OverallSummary {
            completion_percentage: percent(s, "completion_percentage"),
            status: text_or(s, "status", UNKNOWN_STATUS),
            narrative_text: text_or(s, "summary_text", ""),
        },
        _ => OverallSummary::default(),
    };

    Update {
        id,
        generated_at,
        project_name,
        summary,
        features: records(record, "features", normalize_feature),
        timeline_changes: records(record, "timeline_changes", normalize_timeline_change),
        dependencies: records(record, "dependencies", normalize_dependency),
        risk_indicators: records(record, "risk_indicators", normalize_risk),
        action_items: records(record, "action_items", normalize_action_item),
        delivery_status: text(record, "delivery_status"),
    }
}

pub fn normalize_feature(r: &Record) -> Feature {
    Feature {
        name: text_or(r, "name", ""),
        status: text_or(r, "status", UNKNOWN_STATUS),
        progress: percent(r, "progress"),
        last_updated: text_or(r, "last_updated", ""),
        change_note: text_or(r, "changes", ""),
        detail_note: text_or(r, "details", ""),
    }
}

pub fn normalize_timeline_change(r: &Record) -> TimelineChange {
    TimelineChange {
        feature: text_or(r, "feature", ""),
        original_date: text_or(r, "original_date", ""),
        new_date: text_or(r, "new_date", ""),
        reason: text_or(r, "reason", ""),
        impact: text_or(r, "impact", ""),
        severity: text_or(r, "severity", ""),
    }
}

pub fn normalize_dependency(r: &Record) -> Dependency {
    Dependency {
        from_feature: text_or(r, "from_feature", ""),
        to_feature: text_or(r, "to_feature", ""),
        status: text_or(r, "status", UNKNOWN_STATUS),
        is_blocker: flag(r, "is_blocker"),
    }
}

pub fn normalize_risk(r: &Record) -> RiskIndicator {
    RiskIndicator {
        title: text_or(r, "title", ""),
        severity: text_or(r, "severity", ""),
        description: text_or(r, "description", ""),
        mitigation: text_or(r, "mitigation", ""),
    }
}

pub fn normalize_action_item(r: &Record) -> ActionItem {
    ActionItem {
        task: text_or(r, "task", ""),
        assignee: text_or(r, "assignee", ""),
        priority: text_or(r, "priority", ""),
        due_date: text_or(r, "due_date", ""),
    }
}

/// String field, or None when absent or not a string.
pub(crate) fn text(r: &Record, key: &str) -> Option<String> {
    r.get(key).and_then(Value::as_str).map(str::to_string)
}

pub(crate) fn text_or(r: &Record, key: &str, default: &str) -> String {
    text(r, key).unwrap_or_else(|| default.to_string())
}

/// Identifier field: a non-empty string, or a number rendered as text.
fn identifier(r: &Record, key: &str) -> Option<String> {
    match r.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer percentage clamped to 0..=100. Numeric strings are accepted.
fn percent(r: &Record, key: &str) -> u8 {
    let raw = match r.get(key) {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    match raw {
        Some(v) if v.is_finite() => v.round().clamp(0.0, 100.0) as u8,
        _ => 0,
    }
}

fn flag(r: &Record, key: &str) -> bool {
    match r.get(key) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

/// Sequence of records; a non-array value yields an empty sequence and
/// non-object elements are dropped.
fn records<T>(r: &Record, key: &str, normalize: fn(&Record) -> T) -> Vec<T> {
    match r.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(normalize)
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_empty_payload_yields_defaults() {
        let update = normalize_update(&json!({}), "");
        assert!(update.id.starts_with("upd-"));
        assert!(!update.generated_at.is_empty());
        assert_eq!(update.project_name, "");
        assert_eq!(update.summary.completion_percentage, 0);
        assert_eq!(update.summary.status, "Unknown");
        assert_eq!(update.summary.narrative_text, "");
        assert!(update.features.is_empty());
        assert!(update.timeline_changes.is_empty());
        assert!(update.dependencies.is_empty());
        assert!(update.risk_indicators.is_empty());
        assert!(update.action_items.is_empty());
        assert_eq!(update.delivery_status, None);
    }

    #[test]
    fn test_non_object_payload_yields_defaults() {
        for payload in [json!(null), json!(42), json!([1, 2]), json!("not json")] {
            let update = normalize_update(&payload, "Fallback");
            assert_eq!(update.project_name, "Fallback");
            assert!(update.features.is_empty());
        }
    }

    #[test]
    fn test_full_payload_maps_every_field() {
        let payload = json!({
            "update_id": "u1",
            "generated_at": "2026-02-24T10:30:00Z",
            "project_name": "P",
            "overall_summary": {"completion_percentage": 40, "status": "On Track", "summary_text": "ok"},
            "features": [{"name": "Auth", "status": "In Progress", "progress": 85,
                          "last_updated": "2026-02-23", "changes": "c", "details": "d"}],
            "dependencies": [{"from_feature": "A", "to_feature": "B", "status": "Active", "is_blocker": true}],
            "action_items": [{"task": "t", "assignee": "a", "priority": "High", "due_date": "2026-02-26"}],
            "delivery_status": "sent"
        });
        let update = normalize_update(&payload, "ignored");
        assert_eq!(update.id, "u1");
        assert_eq!(update.generated_at, "2026-02-24T10:30:00Z");
        assert_eq!(update.project_name, "P");
        assert_eq!(update.summary.completion_percentage, 40);
        assert_eq!(update.summary.narrative_text, "ok");
        assert_eq!(update.features[0].change_note, "c");
        assert_eq!(update.features[0].detail_note, "d");
        assert!(update.dependencies[0].is_blocker);
        assert_eq!(update.action_items[0].due_date, "2026-02-26");
        assert_eq!(update.delivery_status.as_deref(), Some("sent"));
    }

    #[test]
    fn test_sequence_that_is_not_an_array_becomes_empty() {
        let payload = json!({
            "features": {"name": "not a list"},
            "risk_indicators": "High",
            "action_items": 3
        });
        let update = normalize_update(&payload, "");
        assert!(update.features.is_empty());
        assert!(update.risk_indicators.is_empty());
        assert!(update.action_items.is_empty());
    }

    #[test]
    fn test_elements_are_defaulted_and_non_records_dropped() {
        let payload = json!({
            "features": [{"name": 7}, "stray", null, {"progress": "55"}],
        });
        let update = normalize_update(&payload, "");
        assert_eq!(update.features.len(), 2);
        assert_eq!(update.features[0].name, "");
        assert_eq!(update.features[0].status, "Unknown");
        assert_eq!(update.features[1].progress, 55);
    }

    #[test]
    fn test_percentages_are_rounded_and_clamped() {
        let pct = |v: Value| {
            normalize_update(&json!({"overall_summary": {"completion_percentage": v}}), "")
                .summary
                .completion_percentage
        };
        assert_eq!(pct(json!(67.6)), 68);
        assert_eq!(pct(json!(150)), 100);
        assert_eq!(pct(json!(-5)), 0);
        assert_eq!(pct(json!("40%")), 40);
        assert_eq!(pct(json!(true)), 0);
    }

    #[test]
    fn test_string_encoded_payload_is_decoded() {
        let payload = json!("{\"update_id\":\"u9\",\"project_name\":\"Q\"}");
        let update = normalize_update(&payload, "");
        assert_eq!(update.id, "u9");
        assert_eq!(update.project_name, "Q");
    }

    #[test]
    fn test_blank_or_numeric_ids() {
        let blank = normalize_update(&json!({"update_id": "  "}), "");
        assert!(blank.id.starts_with("upd-"));
        let numeric = normalize_update(&json!({"update_id": 12}), "");
        assert_eq!(numeric.id, "12");
    }

    #[test]
    fn test_synthesized_ids_are_unique() {
        let a = next_update_id();
        let b = next_update_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_serialized_update_renormalizes_to_itself() {
        let update = normalize_update(
            &json!({"update_id": "u2", "generated_at": "x", "project_name": "P",
                    "features": [{"name": "F", "status": "Done", "progress": 100}]}),
            "",
        );
        let encoded = serde_json::to_value(&update).expect("encode");
        assert_eq!(normalize_update(&encoded, ""), update);
    }
}
