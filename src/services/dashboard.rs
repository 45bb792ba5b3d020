// Dashboard service
// Aggregates for the dashboard and the history search. Pure functions of a
// history snapshot; cheap enough to recompute on every keystroke.

use chrono::{DateTime, Utc};

use crate::state::AppState;
use crate::types::Update;
use crate::util::parse_timestamp;

/// Aggregates computed from the most recent update only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub features_count: usize,
    pub in_progress: usize,
    pub risks_count: usize,
    pub overdue_items: usize,
    pub completion: u8,
}

/// Result type for the dashboard
#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum DashboardResult {
    Success {
        stats: DashboardStats,
        latest: Box<Update>,
    },
    Empty {
        message: String,
    },
}

pub fn compute_dashboard_stats(updates: &[Update], now: DateTime<Utc>) -> DashboardStats {
    let Some(latest) = updates.first() else {
        return DashboardStats::default();
    };

    let in_progress = latest
        .features
        .iter()
        .filter(|f| f.status.to_lowercase().contains("in progress"))
        .count();

    // Empty or unparseable due dates never count as overdue.
    let overdue_items = latest
        .action_items
        .iter()
        .filter(|a| parse_timestamp(&a.due_date).is_some_and(|due| due < now))
        .count();

    DashboardStats {
        features_count: latest.features.len(),
        in_progress,
        risks_count: latest.risk_indicators.len(),
        overdue_items,
        completion: latest.summary.completion_percentage,
    }
}

/// Case-insensitive substring search over project name, summary text, and id.
/// A blank query returns everything in order.
pub fn filter_updates<'a>(updates: &'a [Update], query: &str) -> Vec<&'a Update> {
    if query.trim().is_empty() {
        return updates.iter().collect();
    }
    let q = query.to_lowercase();
    updates
        .iter()
        .filter(|u| {
            u.project_name.to_lowercase().contains(&q)
                || u.summary.narrative_text.to_lowercase().contains(&q)
                || u.id.to_lowercase().contains(&q)
        })
        .collect()
}

/// Dashboard view over the displayed history.
pub fn get_dashboard(state: &AppState, now: DateTime<Utc>) -> DashboardResult {
    let updates = state.display_updates();
    match updates.first() {
        Some(latest) => DashboardResult::Success {
            stats: compute_dashboard_stats(&updates, now),
            latest: Box::new(latest.clone()),
        },
        None => DashboardResult::Empty {
            message: "No roadmap updates yet. Generate one to get started.".to_string(),
        },
    }
}

/// History rows matching `query`, most recent first.
pub fn search_history(state: &AppState, query: &str) -> Vec<Update> {
    let updates = state.display_updates();
    filter_updates(&updates, query).into_iter().cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::normalize_update;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 26, 12, 0, 0).unwrap()
    }

    fn update(value: serde_json::Value) -> Update {
        normalize_update(&value, "")
    }

    #[test]
    fn test_empty_history_yields_zeroes() {
        assert_eq!(compute_dashboard_stats(&[], now()), DashboardStats::default());
    }

    #[test]
    fn test_stats_use_latest_entry_only() {
        let latest = update(json!({
            "update_id": "new",
            "overall_summary": {"completion_percentage": 68},
            "features": [
                {"status": "In Progress"}, {"status": "in progress - QA"},
                {"status": "Completed"}, {"status": "Progressing"}
            ],
            "risk_indicators": [{"title": "r1"}, {"title": "r2"}],
            "action_items": [
                {"due_date": "2026-02-25"},
                {"due_date": "2026-02-26T11:59:59Z"},
                {"due_date": "2026-02-26T12:00:00Z"},
                {"due_date": "2026-03-01"},
                {"due_date": ""},
                {"due_date": "soon"}
            ]
        }));
        let older = update(json!({
            "update_id": "old",
            "features": [{}, {}, {}, {}, {}, {}, {}],
            "action_items": [{"due_date": "2020-01-01"}]
        }));

        let stats = compute_dashboard_stats(&[latest, older], now());
        assert_eq!(
            stats,
            DashboardStats {
                features_count: 4,
                in_progress: 2,
                risks_count: 2,
                overdue_items: 2,
                completion: 68,
            }
        );
    }

    #[test]
    fn test_overdue_accepts_free_text_date_shapes() {
        let latest = update(json!({
            "update_id": "u",
            "action_items": [
                {"due_date": "2026/02/20"},
                {"due_date": "02/20/2026"},
                {"due_date": "Feb 20, 2026"},
                {"due_date": "February 20, 2026"},
                {"due_date": "March 1, 2026"}
            ]
        }));
        assert_eq!(compute_dashboard_stats(&[latest], now()).overdue_items, 4);
    }

    #[test]
    fn test_no_action_items_means_no_overdue() {
        let stats = compute_dashboard_stats(&[update(json!({"update_id": "a"}))], now());
        assert_eq!(stats.overdue_items, 0);
    }

    #[test]
    fn test_blank_query_is_identity() {
        let updates = vec![
            update(json!({"update_id": "b"})),
            update(json!({"update_id": "a"})),
        ];
        for query in ["", "   ", "\t"] {
            let ids: Vec<&str> = filter_updates(&updates, query)
                .iter()
                .map(|u| u.id.as_str())
                .collect();
            assert_eq!(ids, vec!["b", "a"]);
        }
    }

    #[test]
    fn test_query_matches_name_summary_and_id() {
        let updates = vec![
            update(json!({"update_id": "u1", "project_name": "Auth Platform"})),
            update(json!({"update_id": "u2", "overall_summary": {"summary_text": "Billing is AUTHorized"}})),
            update(json!({"update_id": "auth-3"})),
            update(json!({"update_id": "u4", "project_name": "Search"})),
        ];
        let ids: Vec<&str> = filter_updates(&updates, "auth")
            .iter()
            .map(|u| u.id.as_str())
            .collect();
        assert_eq!(ids, vec!["u1", "u2", "auth-3"]);
    }

    #[test]
    fn test_query_is_not_trimmed_for_matching() {
        let updates = vec![update(json!({"update_id": "u1", "project_name": "Auth Platform"}))];
        assert_eq!(filter_updates(&updates, "auth p").len(), 1);
        assert!(filter_updates(&updates, "authp").is_empty());
    }
}
