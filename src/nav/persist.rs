//! Cursor persistence in URL query parameters.
//!
//! A reading position round-trips through `?scene=S&slide=L&step=T[&complete=1]`. Unrelated
//! query parameters are preserved. The beginning of the story is written as "no parameters".

use url::Url;

use crate::{
    eval::resolver::locate,
    foundation::core::{Cursor, StepIndex, clamp_step},
    foundation::error::{NovellaError, NovellaResult},
    nav::navigator::{EntryStep, NavState},
    story::model::Story,
};

const SCENE: &str = "scene";
const SLIDE: &str = "slide";
const STEP: &str = "step";
const COMPLETE: &str = "complete";
const KEYS: [&str; 4] = [SCENE, SLIDE, STEP, COMPLETE];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Position read back from a URL, before it is checked against a story.
pub struct PartialNavState {
    /// Raw scene index; may be out of range or negative.
    pub scene: i64,
    /// Raw slide index; may be out of range or negative.
    pub slide: i64,
    /// Raw step index; `None` when absent or unparsable.
    pub step: Option<StepIndex>,
    /// `complete=1` was present.
    pub is_complete: bool,
}

/// Write `state` into the query of `url`.
///
/// At `start` (and not complete) the cursor keys are removed instead.
pub fn save_to_url(state: &NavState, start: Cursor, url: &mut Url) {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !KEYS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let at_start = !state.is_complete && state.cursor == start;
    if !at_start {
        pairs.push((SCENE.to_string(), state.cursor.scene.to_string()));
        pairs.push((SLIDE.to_string(), state.cursor.slide.to_string()));
        pairs.push((STEP.to_string(), state.cursor.step.to_string()));
        if state.is_complete {
            pairs.push((COMPLETE.to_string(), "1".to_string()));
        }
    }

    if pairs.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }
}

/// Read a position from the query of `url`. `None` when no cursor key is present.
pub fn load_from_url(url: &Url) -> Option<PartialNavState> {
    let mut found = false;
    let mut out = PartialNavState::default();

    for (key, value) in url.query_pairs() {
        let value = value.trim();
        match key.as_ref() {
            SCENE => {
                found = true;
                out.scene = value.parse().unwrap_or(0);
            }
            SLIDE => {
                found = true;
                out.slide = value.parse().unwrap_or(0);
            }
            STEP => {
                found = true;
                out.step = value.parse().ok();
            }
            COMPLETE => {
                found = true;
                out.is_complete = value == "1";
            }
            _ => {}
        }
    }

    found.then_some(out)
}

/// Fit a loaded position into `story`.
///
/// Scene and slide are clamped to existing indices, the step into `[-1, steps - 1]`. A missing
/// step means the slide's entry step.
pub fn clamp(partial: &PartialNavState, story: &Story, entry: EntryStep) -> NovellaResult<NavState> {
    if story.scenes.is_empty() {
        return Err(NovellaError::navigation("story has no scenes"));
    }
    let scene = clamp_index(partial.scene, story.scenes.len());
    let slide_count = story.scenes[scene].slides.len();
    if slide_count == 0 {
        return Err(NovellaError::navigation(format!(
            "scene '{}' has no slides",
            story.scenes[scene].id
        )));
    }
    let slide = clamp_index(partial.slide, slide_count);

    let (_, target) = locate(story, scene, slide)?;
    let step = match partial.step {
        Some(step) => clamp_step(step, target.steps.len()),
        None => entry.step_for(target),
    };

    Ok(NavState {
        cursor: Cursor::new(scene, slide, step),
        is_complete: partial.is_complete,
    })
}

fn clamp_index(raw: i64, len: usize) -> usize {
    usize::try_from(raw.max(0)).unwrap_or(0).min(len - 1)
}

#[cfg(test)]
#[path = "../../tests/unit/nav/persist.rs"]
mod tests;
