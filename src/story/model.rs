use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::UiSlot;
use crate::foundation::error::{NovellaError, NovellaResult};

/// Only story format version understood by this crate.
pub const STORY_VERSION: &str = "1.0";

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A complete visual novel script.
///
/// A story is a pure data model that can be:
/// - built programmatically (see [`crate::StoryBuilder`])
/// - deserialized from JSON (see [`Story::from_path`])
///
/// It is never mutated by resolution; every call to [`crate::Resolver::resolve`] derives a
/// fresh [`crate::SlideState`] from it.
pub struct Story {
    /// Format version tag, `"1.0"`.
    pub version: String,
    /// Identification and display metadata.
    pub meta: StoryMeta,
    /// Asset table referenced by name from slides and actions.
    #[serde(default)]
    pub assets: StoryAssets,
    /// Ordered scenes.
    pub scenes: Vec<Scene>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Story identification.
pub struct StoryMeta {
    /// Stable story id.
    pub id: String,
    /// Human-readable title.
    pub title: String,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Named assets. Values are asset paths/URLs as authored (e.g. `/bg/room.avif`).
pub struct StoryAssets {
    /// Background name to image path.
    #[serde(default)]
    pub backgrounds: BTreeMap<String, String>,
    /// Character id to character definition.
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterAsset>,
}

impl StoryAssets {
    /// Resolve a background name to its image path.
    pub fn background_url(&self, name: &str) -> Option<&str> {
        self.backgrounds.get(name).map(String::as_str)
    }

    /// Resolve a character pose to its image path.
    pub fn pose_url(&self, character: &str, pose: &str) -> Option<&str> {
        self.characters
            .get(character)?
            .poses
            .get(pose)
            .map(String::as_str)
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A character definition: display name, optional name color, and pose images.
pub struct CharacterAsset {
    /// Display name shown in the textbox.
    pub name: String,
    /// CSS-style color for the speaker name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_color: Option<String>,
    /// Pose name to image path.
    #[serde(default)]
    pub poses: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A narrative unit. Slides inherit from each other only within one scene.
pub struct Scene {
    /// Stable scene id, target of `next.scene` pointers.
    pub id: String,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Ordered slides.
    pub slides: Vec<Slide>,
}

/// One group of actions applied together.
pub type StepGroup = Vec<Action>;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A stateful screen within a scene.
pub struct Slide {
    /// Stable slide id, target of `next.slide` pointers.
    pub id: String,
    /// Overrides applied on top of the inherited (or empty) base state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<SlideInitial>,
    /// Ordered step groups.
    #[serde(default)]
    pub steps: Vec<StepGroup>,
    /// Explicit pointer to the following slide/scene.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<NextPointer>,
}

impl Slide {
    /// Whether this slide starts from the previous slide's final state.
    ///
    /// Only an explicit `inherit: false` disables inheritance.
    pub fn inherits(&self) -> bool {
        self.initial
            .as_ref()
            .and_then(|i| i.inherit)
            .unwrap_or(true)
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-slide initial overrides.
pub struct SlideInitial {
    /// `false` resets the slide to an empty base. Absent means `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inherit: Option<bool>,
    /// Background asset name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    /// Background blur level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_blur: Option<f64>,
    /// Slot occupants that replace whatever the base state holds in those slots.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub characters: BTreeMap<UiSlot, CharacterPlacement>,
    /// Textbox replacement. Replaces speaker and text together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub textbox: Option<Textbox>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A character placed in a slot.
pub struct CharacterPlacement {
    /// Character id (key into `StoryAssets::characters`).
    pub id: String,
    /// Pose name.
    pub pose: String,
    /// Optional horizontal offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    /// Optional vertical offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    /// Optional stacking order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

impl CharacterPlacement {
    /// Placement without explicit offsets.
    pub fn new(id: impl Into<String>, pose: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            pose: pose.into(),
            x: None,
            y: None,
            z: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
/// Textbox contents. `speaker` is a character id (or any free-form name), `None` for narration.
pub struct Textbox {
    /// Speaker id, serialized as `null` when absent.
    #[serde(default)]
    pub speaker: Option<String>,
    /// Text body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Textbox {
    /// Textbox with both fields set.
    pub fn new(speaker: Option<&str>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.map(str::to_owned),
            text: Some(text.into()),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// Explicit progression pointer, by id.
pub struct NextPointer {
    /// Target scene id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Target slide id (inside `scene`, or the current scene when `scene` is absent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slide: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// A single instruction inside a step group.
pub enum Action {
    /// Set textbox text, optionally changing the speaker.
    Say(SayAction),
    /// Change the background and optionally its blur.
    SetBackground(SetBackgroundAction),
    /// Put a character into a slot.
    ShowCharacter(ShowCharacterAction),
    /// Change an already placed character, found by id.
    UpdateCharacter(UpdateCharacterAction),
    /// Remove a character, found by id.
    HideCharacter(HideCharacterAction),
    /// Visual transition; consumed by the renderer only.
    Transition(TransitionAction),
    /// Pure delay; consumed by navigation timing only.
    Wait(WaitAction),
}

impl Action {
    /// Variant tag as written in story documents.
    pub fn kind(&self) -> &'static str {
        match self {
            Action::Say(_) => "say",
            Action::SetBackground(_) => "setBackground",
            Action::ShowCharacter(_) => "showCharacter",
            Action::UpdateCharacter(_) => "updateCharacter",
            Action::HideCharacter(_) => "hideCharacter",
            Action::Transition(_) => "transition",
            Action::Wait(_) => "wait",
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct SayAction {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct SetBackgroundAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct ShowCharacterAction {
    pub slot: UiSlot,
    pub id: String,
    pub pose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct UpdateCharacterAction {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<UiSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct HideCharacterAction {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct TransitionAction {
    pub name: TransitionName,
    pub ms: u32,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[allow(missing_docs)]
pub struct WaitAction {
    pub ms: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum TransitionName {
    Fade,
    Cut,
    Slide,
    Flash,
}

impl Story {
    /// Parse a story from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> NovellaResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| NovellaError::serde(format!("parse story JSON: {e}")))
    }

    /// Parse a story from a JSON string.
    pub fn from_json_str(s: &str) -> NovellaResult<Self> {
        serde_json::from_str(s).map_err(|e| NovellaError::serde(format!("parse story JSON: {e}")))
    }

    /// Parse a story from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> NovellaResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            NovellaError::validation(format!("open story JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f)).map_err(|e| match e {
            NovellaError::Serde(msg) => NovellaError::serde(format!("{}: {msg}", path.display())),
            other => other,
        })
    }

    /// Scene by index.
    pub fn scene(&self, index: usize) -> Option<&Scene> {
        self.scenes.get(index)
    }

    /// Scene index by id.
    pub fn scene_index(&self, id: &str) -> Option<usize> {
        self.scenes.iter().position(|s| s.id == id)
    }

    /// Total number of slides across all scenes.
    pub fn slide_count(&self) -> usize {
        self.scenes.iter().map(|s| s.slides.len()).sum()
    }
}

impl Scene {
    /// Slide index by id.
    pub fn slide_index(&self, id: &str) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/model.rs"]
mod tests;
