//! Stakeholder delivery: instruction text for the delivery agent and the
//! confirmation it sends back.

use serde_json::{Map, Value};

use crate::normalizer::{text, text_or};
use crate::types::{MessageSent, Update};
use crate::util::pluralize;

pub const MISSING_CHANNEL_MESSAGE: &str = "Please enter a Slack channel name.";
pub const NO_UPDATE_MESSAGE: &str = "No roadmap update to send. Please generate one first.";
pub const DELIVERY_FAILED_MESSAGE: &str = "Failed to send reminders. Please try again.";
/// Stands in for the update when it cannot be encoded.
pub const UNSERIALIZABLE_UPDATE: &str = "Unable to serialize update data.";
pub const DEFAULT_DELIVERY_STATUS: &str = "sent";

/// Confirmation returned by the delivery agent
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReceipt {
    pub delivery_status: Option<String>,
    pub messages_sent: Vec<MessageSent>,
    /// Length of the reported message list, whatever its elements look like.
    pub message_count: usize,
    pub summary: Option<String>,
}

impl DeliveryReceipt {
    pub fn from_record(record: &Map<String, Value>) -> Self {
        let (messages_sent, message_count) = match record.get("messages_sent") {
            Some(Value::Array(items)) => (
                items
                    .iter()
                    .filter_map(Value::as_object)
                    .map(|m| MessageSent {
                        channel: text_or(m, "channel", ""),
                        message_type: text_or(m, "message_type", ""),
                        status: text_or(m, "status", ""),
                        preview: text_or(m, "preview", ""),
                    })
                    .collect(),
                items.len(),
            ),
            _ => (Vec::new(), 0),
        };
        Self {
            delivery_status: text(record, "delivery_status").filter(|s| !s.trim().is_empty()),
            messages_sent,
            message_count,
            summary: text(record, "summary").filter(|s| !s.trim().is_empty()),
        }
    }

    pub fn status_or_default(&self) -> String {
        self.delivery_status
            .clone()
            .unwrap_or_else(|| DEFAULT_DELIVERY_STATUS.to_string())
    }
}

/// Channel name without surrounding whitespace or its leading '#'.
pub fn clean_channel(channel: &str) -> String {
    channel.trim().replacen('#', "", 1)
}

/// Encode the update for embedding in an instruction. Never fails.
pub fn serialize_update(update: &Update) -> String {
    match serde_json::to_string(update) {
        Ok(encoded) => encoded,
        Err(e) => {
            log::warn!("Failed to serialize update {}: {}", update.id, e);
            UNSERIALIZABLE_UPDATE.to_string()
        }
    }
}

/// Instruction for the delivery agent.
pub fn delivery_instruction(channel: &str, note: Option<&str>, update_json: &str) -> String {
    let note = match note.map(str::trim).filter(|n| !n.is_empty()) {
        Some(n) => format!("{}. ", n),
        None => String::new(),
    };
    format!(
        "Send the following roadmap update to Slack channel #{}. {}Here is the update: {}",
        clean_channel(channel),
        note,
        update_json
    )
}

/// "<summary> (N messages sent)"
pub fn delivery_success_message(receipt: &DeliveryReceipt, channel: &str) -> String {
    let summary = receipt
        .summary
        .clone()
        .unwrap_or_else(|| format!("Roadmap update sent to #{}", clean_channel(channel)));
    format!(
        "{} ({} sent)",
        summary,
        pluralize(receipt.message_count, "message")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object")
    }

    #[test]
    fn test_instruction_with_and_without_note() {
        assert_eq!(
            delivery_instruction("#eng", Some("Please review"), "{}"),
            "Send the following roadmap update to Slack channel #eng. Please review. Here is the update: {}"
        );
        assert_eq!(
            delivery_instruction(" eng ", Some("  "), "{}"),
            "Send the following roadmap update to Slack channel #eng. Here is the update: {}"
        );
    }

    #[test]
    fn test_receipt_counts_reported_messages() {
        let receipt = DeliveryReceipt::from_record(&record(json!({
            "delivery_status": "delivered",
            "messages_sent": [{"channel": "#eng", "status": "ok"}, "stray"],
            "summary": "Posted to #eng"
        })));
        assert_eq!(receipt.message_count, 2);
        assert_eq!(receipt.messages_sent.len(), 1);
        assert_eq!(receipt.status_or_default(), "delivered");
        assert_eq!(
            delivery_success_message(&receipt, "#eng"),
            "Posted to #eng (2 messages sent)"
        );
    }

    #[test]
    fn test_malformed_receipt_defaults() {
        let receipt = DeliveryReceipt::from_record(&record(json!({"messages_sent": "lots"})));
        assert_eq!(receipt.message_count, 0);
        assert_eq!(receipt.status_or_default(), "sent");
        assert_eq!(
            delivery_success_message(&receipt, "#eng"),
            "Roadmap update sent to #eng (0 messages sent)"
        );
    }

    #[test]
    fn test_single_message_is_singular() {
        let receipt = DeliveryReceipt::from_record(&record(json!({"messages_sent": [{}], "summary": "Done"})));
        assert_eq!(delivery_success_message(&receipt, "eng"), "Done (1 message sent)");
    }
}
