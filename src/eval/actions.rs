//! Per-action state transitions.
//!
//! Every function takes the previous state by reference and returns a new one. Earlier
//! snapshots stay valid, which the inheritance walk relies on.

use crate::{
    eval::state::SlideState,
    story::model::{
        Action, CharacterPlacement, HideCharacterAction, SayAction, SetBackgroundAction,
        ShowCharacterAction, StoryAssets, Textbox, UpdateCharacterAction,
    },
};

/// Apply one action to `state`.
///
/// `transition` and `wait` have no state effect and return an equal copy.
pub fn apply_action(state: &SlideState, action: &Action, assets: &StoryAssets) -> SlideState {
    match action {
        Action::Say(a) => apply_say(state, a),
        Action::SetBackground(a) => apply_set_background(state, a, assets),
        Action::ShowCharacter(a) => apply_show_character(state, a),
        Action::UpdateCharacter(a) => apply_update_character(state, a),
        Action::HideCharacter(a) => apply_hide_character(state, a),
        Action::Transition(_) | Action::Wait(_) => state.clone(),
    }
}

/// Replace the text; keep the prior speaker when none (or an empty one) is given.
pub fn apply_say(state: &SlideState, action: &SayAction) -> SlideState {
    let speaker = action
        .speaker
        .clone()
        .filter(|s| !s.is_empty())
        .or_else(|| state.speaker().map(str::to_owned));

    SlideState {
        textbox: Some(Textbox {
            speaker,
            text: Some(action.text.clone()),
        }),
        ..state.clone()
    }
}

/// Look the background up by name. Unknown names clear the background rather than failing.
pub fn apply_set_background(
    state: &SlideState,
    action: &SetBackgroundAction,
    assets: &StoryAssets,
) -> SlideState {
    let background = assets.background_url(&action.id).map(str::to_owned);
    if background.is_none() {
        tracing::debug!(id = %action.id, "setBackground references unknown background");
    }

    SlideState {
        background,
        background_blur: action.blur.or(state.background_blur),
        ..state.clone()
    }
}

/// Write the character into its slot, replacing the occupant.
///
/// If the same character already stood in a different slot it is taken out of that slot, so
/// a character id never appears twice.
pub fn apply_show_character(state: &SlideState, action: &ShowCharacterAction) -> SlideState {
    let mut next = state.clone();
    if let Some(prev) = state.slot_of(&action.id) {
        if prev != action.slot {
            next.characters.remove(&prev);
        }
    }
    next.characters.insert(
        action.slot,
        CharacterPlacement {
            id: action.id.clone(),
            pose: action.pose.clone(),
            x: action.x,
            y: action.y,
            z: action.z,
        },
    );
    next
}

/// Merge the given fields into the character found by id; move it when `slot` differs.
///
/// Unknown ids leave the state unchanged.
pub fn apply_update_character(state: &SlideState, action: &UpdateCharacterAction) -> SlideState {
    let Some(current_slot) = state.slot_of(&action.id) else {
        return state.clone();
    };
    let Some(current) = state.characters.get(&current_slot) else {
        return state.clone();
    };

    let updated = CharacterPlacement {
        id: current.id.clone(),
        pose: action.pose.clone().unwrap_or_else(|| current.pose.clone()),
        x: action.x.or(current.x),
        y: action.y.or(current.y),
        z: action.z.or(current.z),
    };

    let target_slot = action.slot.unwrap_or(current_slot);
    let mut next = state.clone();
    if target_slot != current_slot {
        next.characters.remove(&current_slot);
    }
    next.characters.insert(target_slot, updated);
    next
}

/// Remove the character found by id. Unknown ids leave the state unchanged.
pub fn apply_hide_character(state: &SlideState, action: &HideCharacterAction) -> SlideState {
    let mut next = state.clone();
    if let Some(slot) = state.slot_of(&action.id) {
        next.characters.remove(&slot);
    }
    next
}

#[cfg(test)]
#[path = "../../tests/unit/eval/actions.rs"]
mod tests;
