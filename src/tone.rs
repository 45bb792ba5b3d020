//! Classify free-text status, severity, and priority labels into tones.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Active,
    Pending,
    Negative,
    Neutral,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Active => "active",
            Tone::Pending => "pending",
            Tone::Negative => "negative",
            Tone::Neutral => "neutral",
        }
    }
}

/// Status labels match by substring, first rule wins.
pub fn status_tone(status: &str) -> Tone {
    let s = status.to_lowercase();
    let has = |words: &[&str]| words.iter().any(|w| s.contains(w));
    if has(&["completed", "resolved", "done", "success"]) {
        Tone::Positive
    } else if has(&["in progress", "active", "on track"]) {
        Tone::Active
    } else if has(&["planning", "pending"]) {
        Tone::Pending
    } else if has(&["blocked", "at risk", "delayed"]) {
        Tone::Negative
    } else {
        Tone::Neutral
    }
}

pub fn severity_tone(severity: &str) -> Tone {
    match severity.trim().to_lowercase().as_str() {
        "high" | "critical" => Tone::Negative,
        "medium" => Tone::Pending,
        "low" => Tone::Positive,
        _ => Tone::Neutral,
    }
}

pub fn priority_tone(priority: &str) -> Tone {
    match priority.trim().to_lowercase().as_str() {
        "high" | "urgent" | "critical" => Tone::Negative,
        "medium" => Tone::Pending,
        "low" => Tone::Positive,
        _ => Tone::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_tone() {
        assert_eq!(status_tone("Completed"), Tone::Positive);
        assert_eq!(status_tone("In Progress"), Tone::Active);
        assert_eq!(status_tone("On Track"), Tone::Active);
        assert_eq!(status_tone("Planning"), Tone::Pending);
        assert_eq!(status_tone("Blocked by infra"), Tone::Negative);
        assert_eq!(status_tone("Unknown"), Tone::Neutral);
    }

    #[test]
    fn test_active_beats_blocked_when_both_present() {
        // Rule order: "active" is checked before "blocked".
        assert_eq!(status_tone("Active (blocked)"), Tone::Active);
    }

    #[test]
    fn test_severity_and_priority() {
        assert_eq!(severity_tone("Critical"), Tone::Negative);
        assert_eq!(severity_tone("urgent"), Tone::Neutral);
        assert_eq!(priority_tone("Urgent"), Tone::Negative);
        assert_eq!(priority_tone(" low "), Tone::Positive);
        assert_eq!(priority_tone(""), Tone::Neutral);
    }
}
