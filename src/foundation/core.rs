use std::fmt;

use crate::foundation::error::{NovellaError, NovellaResult};

/// Step position within a slide. `-1` means "initial state, no steps applied".
pub type StepIndex = i64;

/// Step index meaning "initial overrides only".
pub const INITIAL_STEP: StepIndex = -1;

/// One of the three fixed on-screen character positions.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum UiSlot {
    /// Left third of the stage.
    Left,
    /// Center of the stage.
    Center,
    /// Right third of the stage.
    Right,
}

impl UiSlot {
    /// All slots in left-to-right order.
    pub const ALL: [UiSlot; 3] = [UiSlot::Left, UiSlot::Center, UiSlot::Right];

    /// Lowercase name as used in story documents.
    pub fn as_str(self) -> &'static str {
        match self {
            UiSlot::Left => "left",
            UiSlot::Center => "center",
            UiSlot::Right => "right",
        }
    }
}

impl fmt::Display for UiSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UiSlot {
    type Err = NovellaError;

    fn from_str(s: &str) -> NovellaResult<Self> {
        match s {
            "left" => Ok(UiSlot::Left),
            "center" => Ok(UiSlot::Center),
            "right" => Ok(UiSlot::Right),
            other => Err(NovellaError::validation(format!(
                "unknown slot '{other}' (expected left, center or right)"
            ))),
        }
    }
}

/// Narrative position: `(scene, slide, step)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Cursor {
    /// Index into `Story::scenes`.
    pub scene: usize,
    /// Index into `Scene::slides`.
    pub slide: usize,
    /// Step group index, `-1` for the initial state.
    pub step: StepIndex,
}

impl Cursor {
    /// Construct a cursor.
    pub fn new(scene: usize, slide: usize, step: StepIndex) -> Self {
        Self { scene, slide, step }
    }

    /// Cursor at the initial state of a slide.
    pub fn initial(scene: usize, slide: usize) -> Self {
        Self::new(scene, slide, INITIAL_STEP)
    }

    /// Scene/slide pair this cursor points into.
    pub fn slide_key(self) -> SlideKey {
        SlideKey {
            scene: self.scene,
            slide: self.slide,
        }
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.scene, self.slide, self.step)
    }
}

/// Identity of a slide inside a story, by position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlideKey {
    /// Scene index.
    pub scene: usize,
    /// Slide index within the scene.
    pub slide: usize,
}

/// Last valid step index for a slide with `step_count` step groups.
///
/// A slide without steps ends at its initial state.
pub fn final_step(step_count: usize) -> StepIndex {
    step_count as StepIndex - 1
}

/// Clamp a step index into `[-1, step_count - 1]`.
pub fn clamp_step(step: StepIndex, step_count: usize) -> StepIndex {
    step.clamp(INITIAL_STEP, final_step(step_count))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
