use std::collections::BTreeMap;

use crate::{
    foundation::core::UiSlot,
    story::model::{CharacterPlacement, Textbox},
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Resolved visual state at one cursor position.
///
/// This is the only output of the resolver and the only input of the rendering layer. Values are
/// never mutated after being returned; each resolution builds a new one.
pub struct SlideState {
    /// Resolved background image path, `None` when unset or when the name was unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Background blur level. Sticky until explicitly overridden.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_blur: Option<f64>,
    /// At most one character per slot.
    #[serde(default)]
    pub characters: BTreeMap<UiSlot, CharacterPlacement>,
    /// Textbox contents, `None` when nothing was ever said or set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textbox: Option<Textbox>,
}

impl SlideState {
    /// The empty state: no background, no blur, no characters, no textbox.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Occupant of `slot`.
    pub fn character(&self, slot: UiSlot) -> Option<&CharacterPlacement> {
        self.characters.get(&slot)
    }

    /// Slot currently holding the character `id`, if any.
    pub fn slot_of(&self, id: &str) -> Option<UiSlot> {
        self.characters
            .iter()
            .find(|(_, c)| c.id == id)
            .map(|(slot, _)| *slot)
    }

    /// Current speaker id, if any.
    pub fn speaker(&self) -> Option<&str> {
        self.textbox.as_ref()?.speaker.as_deref()
    }

    /// Current textbox text, if any.
    pub fn text(&self) -> Option<&str> {
        self.textbox.as_ref()?.text.as_deref()
    }
}
