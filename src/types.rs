use serde::{Deserialize, Serialize};

/// Overall project summary carried by every update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallSummary {
    /// Always within 0..=100 once normalized.
    pub completion_percentage: u8,
    pub status: String,
    #[serde(rename = "summary_text")]
    pub narrative_text: String,
}

impl Default for OverallSummary {
    fn default() -> Self {
        Self {
            completion_percentage: 0,
            status: UNKNOWN_STATUS.to_string(),
            narrative_text: String::new(),
        }
    }
}

/// Neutral status literal used when the agent omits one.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// A tracked project feature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub name: String,
    pub status: String,
    pub progress: u8,
    pub last_updated: String,
    #[serde(rename = "changes")]
    pub change_note: String,
    #[serde(rename = "details")]
    pub detail_note: String,
}

/// A shift in a feature's target date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineChange {
    pub feature: String,
    pub original_date: String,
    pub new_date: String,
    pub reason: String,
    pub impact: String,
    pub severity: String,
}

/// A directed relation between two features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    pub from_feature: String,
    pub to_feature: String,
    pub status: String,
    pub is_blocker: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskIndicator {
    pub title: String,
    pub severity: String,
    pub description: String,
    pub mitigation: String,
}

/// A task with assignee, priority, and due date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub task: String,
    pub assignee: String,
    pub priority: String,
    pub due_date: String,
}

/// One generated roadmap report, the unit of history.
///
/// Field names on the wire follow the agent's payload so that the persisted
/// history decodes through the same normalizer as a fresh response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    #[serde(rename = "update_id")]
    pub id: String,
    pub generated_at: String,
    pub project_name: String,
    #[serde(rename = "overall_summary")]
    pub summary: OverallSummary,
    pub features: Vec<Feature>,
    pub timeline_changes: Vec<TimelineChange>,
    pub dependencies: Vec<Dependency>,
    pub risk_indicators: Vec<RiskIndicator>,
    pub action_items: Vec<ActionItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_status: Option<String>,
}

impl Update {
    /// Sequence lengths shown on a history row
    pub fn counts(&self) -> UpdateCounts {
        UpdateCounts {
            features: self.features.len(),
            timeline_changes: self.timeline_changes.len(),
            dependencies: self.dependencies.len(),
            risk_indicators: self.risk_indicators.len(),
            action_items: self.action_items.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCounts {
    pub features: usize,
    pub timeline_changes: usize,
    pub dependencies: usize,
    pub risk_indicators: usize,
    pub action_items: usize,
}

/// One message the delivery agent reports as dispatched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSent {
    pub channel: String,
    pub message_type: String,
    pub status: String,
    pub preview: String,
}

/// Navigation context the presentation layer renders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Screen {
    #[default]
    Dashboard,
    Review,
    History,
    Settings,
}

/// Result of a user-triggered operation, shown as a dismissible banner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Outcome {
    Success { message: String },
    Failure { error: crate::error::OutcomeError },
}

impl Outcome {
    pub fn success(message: impl Into<String>) -> Self {
        Outcome::Success {
            message: message.into(),
        }
    }

    pub fn failure(err: &crate::error::PulseError) -> Self {
        Outcome::Failure { error: err.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Outcome::Success { message } => message,
            Outcome::Failure { error } => &error.message,
        }
    }
}
