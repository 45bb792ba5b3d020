// Actions service
// Edits to the reviewed update's action items go through the draft buffer and
// only reach history on an explicit save.

use crate::error::PulseError;
use crate::state::AppState;
use crate::types::{ActionItem, Outcome};

pub const DRAFT_SAVED_MESSAGE: &str = "Draft saved successfully.";
pub const NOTHING_TO_SAVE_MESSAGE: &str = "No roadmap update to save.";

/// Flip the completion flag for an item. Never touches history.
pub fn toggle_action_item(state: &AppState, index: usize) -> bool {
    state.with_draft(|draft| draft.toggle(index))
}

pub fn edit_action_item(state: &AppState, index: usize, item: ActionItem) -> Result<(), PulseError> {
    if state.with_draft(|draft| draft.edit(index, item)) {
        Ok(())
    } else {
        Err(PulseError::Precondition(format!(
            "No action item at position {}",
            index + 1
        )))
    }
}

pub fn add_action_item(state: &AppState, item: ActionItem) {
    state.with_draft(|draft| draft.push(item));
}

pub fn remove_action_item(state: &AppState, index: usize) -> Result<ActionItem, PulseError> {
    state
        .with_draft(|draft| draft.remove(index))
        .ok_or_else(|| PulseError::Precondition(format!("No action item at position {}", index + 1)))
}

/// Write the draft's items onto the reviewed update and persist it.
///
/// Completion flags stay in the draft; other history entries are untouched.
pub fn save_draft(state: &AppState) -> Outcome {
    let Some(reviewed) = state.reviewed_update() else {
        let outcome = Outcome::failure(&PulseError::Precondition(
            NOTHING_TO_SAVE_MESSAGE.to_string(),
        ));
        state.set_outcome(outcome.clone());
        return outcome;
    };

    let draft = state.draft();
    let updated = draft.apply_to(&reviewed);
    log::info!(
        "Saving {} action items on update {}",
        updated.action_items.len(),
        updated.id
    );
    state.commit_reviewed(updated);

    let outcome = Outcome::success(DRAFT_SAVED_MESSAGE);
    state.set_outcome(outcome.clone());
    outcome
}
