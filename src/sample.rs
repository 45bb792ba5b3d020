//! Built-in sample update shown when sample mode is on and nothing real exists.

use serde_json::json;

use crate::normalizer::normalize_update;
use crate::types::Update;

pub const SAMPLE_UPDATE_ID: &str = "upd-20260224-001";

pub fn sample_update() -> Update {
    normalize_update(&sample_payload(), "")
}

/// The sample in the agent's wire shape, also used as the offline agent's reply.
pub fn sample_payload() -> serde_json::Value {
    json!({
        "update_id": SAMPLE_UPDATE_ID,
        "generated_at": "2026-02-24T10:30:00Z",
        "project_name": "ProductPulse Platform",
        "overall_summary": {
            "completion_percentage": 68,
            "status": "On Track",
            "summary_text": "The project is progressing well with 68% overall completion. The Authentication Module is complete and Dashboard Analytics is in final testing. Two timeline shifts have been identified for the Reporting Engine and Notification System due to API integration complexity."
        },
        "features": [
            {"name": "Authentication Module", "status": "Completed", "progress": 100, "last_updated": "2026-02-20",
             "changes": "OAuth2 flow finalized, SSO integration tested",
             "details": "All authentication flows including MFA, SSO, and password reset are fully implemented and tested."},
            {"name": "Dashboard Analytics", "status": "In Progress", "progress": 85, "last_updated": "2026-02-23",
             "changes": "Added real-time chart updates, performance optimized",
             "details": "Real-time data visualization with WebSocket connections. Final accessibility audit pending."},
            {"name": "Reporting Engine", "status": "In Progress", "progress": 55, "last_updated": "2026-02-22",
             "changes": "PDF export added, CSV generation refactored",
             "details": "Core reporting functionality complete. Custom report builder and scheduling features in development."},
            {"name": "Notification System", "status": "Planning", "progress": 20, "last_updated": "2026-02-18",
             "changes": "Architecture design approved, Slack integration started",
             "details": "Multi-channel notification system supporting email, Slack, and in-app notifications."},
            {"name": "User Management", "status": "In Progress", "progress": 70, "last_updated": "2026-02-21",
             "changes": "Role-based access control implemented",
             "details": "User CRUD, team management, and RBAC are functional. Invitation flow and audit logging remain."}
        ],
        "timeline_changes": [
            {"feature": "Reporting Engine", "original_date": "2026-03-15", "new_date": "2026-03-28",
             "reason": "API integration complexity higher than estimated",
             "impact": "Delays stakeholder demo by 1 week", "severity": "Medium"},
            {"feature": "Notification System", "original_date": "2026-03-20", "new_date": "2026-04-05",
             "reason": "Dependency on Authentication Module completion",
             "impact": "Push notification testing requires auth tokens", "severity": "Low"}
        ],
        "dependencies": [
            {"from_feature": "Authentication Module", "to_feature": "Notification System", "status": "Resolved", "is_blocker": false},
            {"from_feature": "Dashboard Analytics", "to_feature": "Reporting Engine", "status": "Active", "is_blocker": true},
            {"from_feature": "User Management", "to_feature": "Dashboard Analytics", "status": "Active", "is_blocker": false}
        ],
        "risk_indicators": [
            {"title": "API Rate Limiting", "severity": "High",
             "description": "Third-party analytics API has strict rate limits that may affect real-time dashboard performance under load.",
             "mitigation": "Implement caching layer and request batching. Negotiate higher rate limits with provider."},
            {"title": "Database Migration Risk", "severity": "Medium",
             "description": "Schema changes for reporting engine require careful migration strategy to avoid data loss.",
             "mitigation": "Staged migration with rollback scripts. Run dry-run on staging environment first."},
            {"title": "Team Capacity", "severity": "Low",
             "description": "One senior developer on planned leave during final sprint.",
             "mitigation": "Knowledge transfer session scheduled. Junior developer paired for continuity."}
        ],
        "action_items": [
            {"task": "Review API caching strategy document", "assignee": "Sarah Chen", "priority": "High", "due_date": "2026-02-26"},
            {"task": "Approve database migration plan", "assignee": "Mike Johnson", "priority": "High", "due_date": "2026-02-27"},
            {"task": "Schedule stakeholder demo for Dashboard Analytics", "assignee": "Lisa Park", "priority": "Medium", "due_date": "2026-03-01"},
            {"task": "Update project timeline in Jira", "assignee": "David Kim", "priority": "Medium", "due_date": "2026-02-25"},
            {"task": "Complete accessibility audit for Dashboard", "assignee": "Emily Torres", "priority": "Low", "due_date": "2026-03-05"}
        ]
    })
}
