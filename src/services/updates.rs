// Updates service
// Generation and delivery. Each call runs to completion, records its outcome
// on the state, and always leaves its in-flight slot.

use serde_json::Value;

use crate::agent::{AgentInvoker, AgentResult};
use crate::error::PulseError;
use crate::normalizer::normalize_update;
use crate::notification::{
    delivery_instruction, delivery_success_message, serialize_update, DeliveryReceipt,
    DELIVERY_FAILED_MESSAGE, MISSING_CHANNEL_MESSAGE, NO_UPDATE_MESSAGE,
};
use crate::state::AppState;
use crate::status::InFlight;
use crate::types::{Outcome, Screen, Update};

pub const GENERATED_MESSAGE: &str = "Roadmap update generated successfully.";
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate roadmap update. Please try again.";
pub const CLEARED_MESSAGE: &str = "All stored updates have been cleared.";

/// Instruction sent to the generation agent.
pub fn generation_instruction(project_name: &str) -> String {
    format!(
        "Generate a comprehensive roadmap update for the project \"{}\". Include feature completion status, timeline changes, dependencies, risk indicators, and action items.",
        project_name
    )
}

/// Interpret a generation reply. A usable payload becomes an update; anything
/// else is a declared failure.
fn interpret_generation(
    reply: Result<AgentResult, String>,
    project_name: &str,
) -> Result<Update, PulseError> {
    let result = reply.map_err(PulseError::transport)?;
    match result.payload() {
        Some(record) => Ok(normalize_update(&Value::Object(record), project_name)),
        None => Err(PulseError::DeclaredFailure(
            result.failure_message(GENERATION_FAILED_MESSAGE),
        )),
    }
}

/// Request a new roadmap update for the configured project.
///
/// On success the update is upserted into history, put under review, and the
/// review screen is shown. On failure history is untouched.
pub async fn generate_update(state: &AppState, agent: &dyn AgentInvoker) -> Outcome {
    let project_name = state.settings().project_name;
    state.clear_outcome();
    let flight = InFlight::begin(&state.generation);
    log::info!("Generating roadmap update for \"{}\"", project_name);

    let reply = agent
        .invoke(&generation_instruction(&project_name), &state.agents.generation)
        .await;

    let outcome = match interpret_generation(reply, &project_name) {
        Ok(update) => {
            log::info!(
                "Generated update {} ({} features, {} action items)",
                update.id,
                update.features.len(),
                update.action_items.len()
            );
            state.commit_reviewed(update);
            state.navigate(Screen::Review);
            Outcome::success(GENERATED_MESSAGE)
        }
        Err(e) => {
            log::warn!("Roadmap generation failed: {}", e);
            Outcome::failure(&e)
        }
    };

    flight.settle(&outcome);
    state.set_outcome(outcome.clone());
    outcome
}

/// Interpret a delivery reply into a receipt.
fn interpret_delivery(reply: Result<AgentResult, String>) -> Result<DeliveryReceipt, PulseError> {
    let result = reply.map_err(PulseError::transport)?;
    match result.payload() {
        Some(record) => Ok(DeliveryReceipt::from_record(&record)),
        None => Err(PulseError::DeclaredFailure(
            result.failure_message(DELIVERY_FAILED_MESSAGE),
        )),
    }
}

/// Send the reviewed update to `channel`, with an optional note.
///
/// A blank channel or no reviewed update fails immediately, without calling
/// the agent or touching the in-flight slot. On success the reviewed update
/// is stamped with the delivery status and upserted.
pub async fn send_delivery(
    state: &AppState,
    agent: &dyn AgentInvoker,
    channel: &str,
    note: Option<&str>,
) -> Outcome {
    let precondition = if channel.trim().is_empty() {
        Err(MISSING_CHANNEL_MESSAGE)
    } else {
        state.reviewed_update().ok_or(NO_UPDATE_MESSAGE)
    };
    let update = match precondition {
        Ok(update) => update,
        Err(message) => {
            let outcome = Outcome::failure(&PulseError::Precondition(message.to_string()));
            state.set_outcome(outcome.clone());
            return outcome;
        }
    };

    state.clear_outcome();
    let flight = InFlight::begin(&state.delivery);
    log::info!("Sending update {} to {}", update.id, channel.trim());

    let instruction = delivery_instruction(channel, note, &serialize_update(&update));
    let reply = agent.invoke(&instruction, &state.agents.delivery).await;

    let outcome = match interpret_delivery(reply) {
        Ok(receipt) => {
            let message = delivery_success_message(&receipt, channel);
            // Stamp the stored copy so edits saved while in flight survive.
            let base = state.history.get(&update.id).unwrap_or(update);
            let stamped = Update {
                delivery_status: Some(receipt.status_or_default()),
                ..base
            };
            let channels: Vec<&str> = receipt
                .messages_sent
                .iter()
                .map(|m| m.channel.as_str())
                .filter(|c| !c.is_empty())
                .collect();
            log::info!(
                "Delivered update {} ({} messages) to [{}]",
                stamped.id,
                receipt.message_count,
                channels.join(", ")
            );
            state.commit_reviewed(stamped);
            Outcome::success(message)
        }
        Err(e) => {
            log::warn!("Delivery failed: {}", e);
            Outcome::failure(&e)
        }
    };

    flight.settle(&outcome);
    state.set_outcome(outcome.clone());
    outcome
}

/// Put a displayed update under review and show the review screen.
pub fn view_update(state: &AppState, id: &str) -> Result<Update, PulseError> {
    let update = state
        .display_updates()
        .iter()
        .find(|u| u.id == id)
        .cloned()
        .ok_or_else(|| PulseError::Precondition(format!("Update not found: {}", id)))?;
    state.set_reviewed(update.clone());
    state.navigate(Screen::Review);
    Ok(update)
}

/// Drop all stored updates and the reviewed one.
pub fn clear_history(state: &AppState) -> Outcome {
    let count = state.history.len();
    state.history.clear();
    state.clear_reviewed();
    log::info!("Cleared {} stored updates", count);
    let outcome = Outcome::success(CLEARED_MESSAGE);
    state.set_outcome(outcome.clone());
    outcome
}
