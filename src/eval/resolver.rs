use crate::{
    eval::actions::apply_action,
    eval::state::SlideState,
    foundation::core::{Cursor, StepIndex, final_step},
    foundation::error::{NovellaError, NovellaResult},
    story::model::{Scene, Slide, SlideInitial, Story, StoryAssets},
};

/// Stateless slide-state resolver.
///
/// `resolve` is a pure function of the story and the cursor. For repeated queries against the
/// same story, [`crate::ResolveCache`] memoizes the per-slide final states it walks through.
pub struct Resolver;

impl Resolver {
    /// Reconstruct the visual state at `cursor`.
    ///
    /// `cursor.step` may be `-1` (initial overrides only). Step indices past the last group are
    /// clamped. Fails only when the scene or slide index does not exist.
    #[tracing::instrument(skip(story), fields(story_id = %story.meta.id))]
    pub fn resolve(story: &Story, cursor: Cursor) -> NovellaResult<SlideState> {
        let (scene, slide) = locate(story, cursor.scene, cursor.slide)?;

        let root = chain_root(scene, cursor.slide);
        let mut state = SlideState::empty();
        for ancestor in &scene.slides[root..cursor.slide] {
            state = settle_slide(&story.assets, ancestor, &state, final_step(ancestor.steps.len()));
        }

        Ok(settle_slide(&story.assets, slide, &state, cursor.step))
    }
}

/// Free-function form of [`Resolver::resolve`].
pub fn resolve(
    story: &Story,
    scene: usize,
    slide: usize,
    step: StepIndex,
) -> NovellaResult<SlideState> {
    Resolver::resolve(story, Cursor::new(scene, slide, step))
}

pub(crate) fn locate(
    story: &Story,
    scene_index: usize,
    slide_index: usize,
) -> NovellaResult<(&Scene, &Slide)> {
    let scene = story
        .scenes
        .get(scene_index)
        .ok_or_else(|| NovellaError::not_found(format!("scene at index {scene_index} not found")))?;
    let slide = scene.slides.get(slide_index).ok_or_else(|| {
        NovellaError::not_found(format!(
            "slide at index {slide_index} not found in scene {}",
            scene.id
        ))
    })?;
    Ok((scene, slide))
}

/// First slide of the inheritance chain ending at `slide_index`.
///
/// Walks back while the slide at hand inherits; a slide with `inherit: false` (or the first
/// slide of the scene) starts from the empty state.
pub(crate) fn chain_root(scene: &Scene, slide_index: usize) -> usize {
    let mut i = slide_index;
    while i > 0 && scene.slides[i].inherits() {
        i -= 1;
    }
    i
}

/// Apply a slide's initial overrides to `base`, then fold its step groups up to `step`.
pub(crate) fn settle_slide(
    assets: &StoryAssets,
    slide: &Slide,
    base: &SlideState,
    step: StepIndex,
) -> SlideState {
    let mut state = match &slide.initial {
        Some(initial) => apply_initial(base, initial, assets),
        None => base.clone(),
    };

    let applied = usize::try_from(step.saturating_add(1))
        .unwrap_or(0)
        .min(slide.steps.len());
    for group in &slide.steps[..applied] {
        for action in group {
            state = apply_action(&state, action, assets);
        }
    }
    state
}

fn apply_initial(base: &SlideState, initial: &SlideInitial, assets: &StoryAssets) -> SlideState {
    let mut state = base.clone();

    if let Some(name) = initial.background.as_deref().filter(|n| !n.is_empty()) {
        state.background = assets.background_url(name).map(str::to_owned);
    }
    if let Some(blur) = initial.background_blur {
        state.background_blur = Some(blur);
    }
    for (slot, placement) in &initial.characters {
        if let Some(prev) = state.slot_of(&placement.id).filter(|prev| prev != slot) {
            state.characters.remove(&prev);
        }
        state.characters.insert(*slot, placement.clone());
    }
    if let Some(textbox) = &initial.textbox {
        state.textbox = Some(textbox.clone());
    }

    state
}

#[cfg(test)]
#[path = "../../tests/unit/eval/resolver.rs"]
mod tests;
