use crate::{
    eval::resolver::locate,
    foundation::core::{Cursor, INITIAL_STEP, StepIndex, clamp_step},
    foundation::error::{NovellaError, NovellaResult},
    story::model::{Slide, Story},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Step a cursor lands on when it enters a new slide.
pub enum EntryStep {
    /// Show the slide's initial overrides first (`step = -1`).
    #[default]
    Initial,
    /// Apply the first step group immediately (`step = 0`, or `-1` for step-less slides).
    FirstStep,
}

impl EntryStep {
    /// Entry step index for `slide`.
    pub fn step_for(self, slide: &Slide) -> StepIndex {
        match self {
            EntryStep::Initial => INITIAL_STEP,
            EntryStep::FirstStep if slide.steps.is_empty() => INITIAL_STEP,
            EntryStep::FirstStep => 0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
/// Current narrative position plus the completion flag.
pub struct NavState {
    /// Where the reader is.
    pub cursor: Cursor,
    /// Set once `advance` ran past the last step of the last reachable slide.
    pub is_complete: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// What a call to [`Navigator::advance`] did.
pub enum Advance {
    /// Moved to the next step group of the same slide.
    Step,
    /// Entered another slide in the same scene.
    Slide,
    /// Entered another scene.
    Scene,
    /// Nothing left; the story is (now or already) complete.
    Complete,
}

#[derive(Clone, Copy, Debug, Default)]
/// Single-cursor progression through a story.
///
/// The navigator holds no position itself; it transforms a [`NavState`] owned by the caller.
pub struct Navigator {
    entry: EntryStep,
}

impl Navigator {
    /// Navigator entering slides at `entry`.
    pub fn new(entry: EntryStep) -> Self {
        Self { entry }
    }

    /// Configured entry step.
    pub fn entry(&self) -> EntryStep {
        self.entry
    }

    /// Start of the story: first slide of the first scene at the entry step.
    pub fn start(&self, story: &Story) -> NovellaResult<NavState> {
        let (_, slide) = locate(story, 0, 0)?;
        Ok(NavState {
            cursor: Cursor::new(0, 0, self.entry.step_for(slide)),
            is_complete: false,
        })
    }

    /// Move one unit forward.
    ///
    /// Order: next step of the current slide; then the slide named by `next.slide` (or the next
    /// one by position); then the scene named by `next.scene` (or the next one by position);
    /// otherwise mark complete and leave the cursor where it is. `next.scene` is therefore only
    /// followed from the last slide of a scene.
    #[tracing::instrument(skip(self, story, state), fields(cursor = %state.cursor))]
    pub fn advance(&self, story: &Story, state: &mut NavState) -> NovellaResult<Advance> {
        if state.is_complete {
            return Ok(Advance::Complete);
        }

        let cursor = state.cursor;
        let (scene, slide) = locate(story, cursor.scene, cursor.slide)?;

        if cursor.step.saturating_add(1) < slide.steps.len() as StepIndex {
            state.cursor.step = cursor.step.max(INITIAL_STEP) + 1;
            return Ok(Advance::Step);
        }

        let explicit = slide.next.as_ref();
        let scene_target = explicit.and_then(|n| n.scene.as_deref());
        let slide_target = explicit.and_then(|n| n.slide.as_deref());

        // Next slide: `next.slide` within this scene, else the following slide.
        if scene_target.is_none() {
            if let Some(slide_id) = slide_target {
                match scene.slide_index(slide_id) {
                    Some(target_slide) => {
                        self.enter(story, state, cursor.scene, target_slide)?;
                        return Ok(Advance::Slide);
                    }
                    None => {
                        tracing::warn!(
                            slide = %slide_id,
                            from = %slide.id,
                            "next.slide names an unknown slide, falling back to story order"
                        );
                    }
                }
            }
        }
        if cursor.slide + 1 < scene.slides.len() {
            self.enter(story, state, cursor.scene, cursor.slide + 1)?;
            return Ok(Advance::Slide);
        }

        // Next scene: `next.scene` (entering `next.slide` inside it), else the following scene.
        if let Some(scene_id) = scene_target {
            match story.scene_index(scene_id) {
                Some(target_scene) => {
                    let target_slide = self.slide_in(story, target_scene, slide_target);
                    self.enter(story, state, target_scene, target_slide)?;
                    return Ok(if target_scene == cursor.scene {
                        Advance::Slide
                    } else {
                        Advance::Scene
                    });
                }
                None => {
                    tracing::warn!(
                        scene = %scene_id,
                        from = %slide.id,
                        "next.scene names an unknown scene, falling back to story order"
                    );
                }
            }
        }
        if let Some(target_scene) = (cursor.scene + 1..story.scenes.len())
            .find(|&i| !story.scenes[i].slides.is_empty())
        {
            self.enter(story, state, target_scene, 0)?;
            return Ok(Advance::Scene);
        }

        tracing::debug!("reached end of story");
        state.is_complete = true;
        Ok(Advance::Complete)
    }

    /// Direct navigation. Scene and slide must exist; the step is clamped into
    /// `[-1, steps - 1]`. Clears the completion flag.
    pub fn jump_to(
        &self,
        story: &Story,
        scene: usize,
        slide: usize,
        step: StepIndex,
    ) -> NovellaResult<NavState> {
        let (_, target) = locate(story, scene, slide)
            .map_err(|e| NovellaError::navigation(format!("cannot jump to {scene}/{slide}: {e}")))?;
        Ok(NavState {
            cursor: Cursor::new(scene, slide, clamp_step(step, target.steps.len())),
            is_complete: false,
        })
    }

    fn slide_in(&self, story: &Story, scene: usize, slide_id: Option<&str>) -> usize {
        let Some(slide_id) = slide_id else {
            return 0;
        };
        match story.scenes[scene].slide_index(slide_id) {
            Some(i) => i,
            None => {
                tracing::warn!(
                    slide = %slide_id,
                    scene = %story.scenes[scene].id,
                    "next.slide not found in target scene, entering its first slide"
                );
                0
            }
        }
    }

    fn enter(
        &self,
        story: &Story,
        state: &mut NavState,
        scene: usize,
        slide: usize,
    ) -> NovellaResult<()> {
        let (_, target) = locate(story, scene, slide)?;
        state.cursor = Cursor::new(scene, slide, self.entry.step_for(target));
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/nav/navigator.rs"]
mod tests;
