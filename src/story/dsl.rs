use std::collections::BTreeMap;

use crate::{
    foundation::core::UiSlot,
    foundation::error::{NovellaError, NovellaResult},
    story::model::{
        Action, CharacterAsset, CharacterPlacement, HideCharacterAction, NextPointer,
        STORY_VERSION, SayAction, Scene, SetBackgroundAction, ShowCharacterAction, Slide,
        SlideInitial, StepGroup, Story, StoryAssets, StoryMeta, Textbox, TransitionAction,
        TransitionName, UpdateCharacterAction, WaitAction,
    },
};

/// Programmatic construction of a [`Story`], validated on [`StoryBuilder::build`].
pub struct StoryBuilder {
    id: String,
    title: String,
    backgrounds: BTreeMap<String, String>,
    characters: BTreeMap<String, CharacterAsset>,
    scenes: Vec<Scene>,
}

impl StoryBuilder {
    /// Start a story with its meta id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            backgrounds: BTreeMap::new(),
            characters: BTreeMap::new(),
            scenes: Vec::new(),
        }
    }

    /// Register a background image under `name`.
    pub fn background(
        mut self,
        name: impl Into<String>,
        url: impl Into<String>,
    ) -> NovellaResult<Self> {
        let name = name.into();
        if self.backgrounds.contains_key(&name) {
            return Err(NovellaError::validation(format!(
                "duplicate background '{name}'"
            )));
        }
        self.backgrounds.insert(name, url.into());
        Ok(self)
    }

    /// Register a character definition under `id`.
    pub fn character(mut self, id: impl Into<String>, def: CharacterAsset) -> NovellaResult<Self> {
        let id = id.into();
        if self.characters.contains_key(&id) {
            return Err(NovellaError::validation(format!(
                "duplicate character '{id}'"
            )));
        }
        self.characters.insert(id, def);
        Ok(self)
    }

    /// Append a scene.
    pub fn scene(mut self, scene: Scene) -> Self {
        self.scenes.push(scene);
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> NovellaResult<Story> {
        let story = Story {
            version: STORY_VERSION.to_string(),
            meta: StoryMeta {
                id: self.id,
                title: self.title,
            },
            assets: StoryAssets {
                backgrounds: self.backgrounds,
                characters: self.characters,
            },
            scenes: self.scenes,
        };
        story.validate()?;
        Ok(story)
    }
}

/// Build a [`CharacterAsset`] from a display name and `(pose, url)` pairs.
pub fn character_asset<'a>(
    name: impl Into<String>,
    poses: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> CharacterAsset {
    CharacterAsset {
        name: name.into(),
        speaker_color: None,
        poses: poses
            .into_iter()
            .map(|(p, u)| (p.to_string(), u.to_string()))
            .collect(),
    }
}

/// Builder for a [`Scene`].
pub struct SceneBuilder {
    id: String,
    label: Option<String>,
    slides: Vec<Slide>,
}

impl SceneBuilder {
    /// Start a scene.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            slides: Vec::new(),
        }
    }

    /// Set the display label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Append a slide.
    pub fn slide(mut self, slide: Slide) -> Self {
        self.slides.push(slide);
        self
    }

    /// Finish the scene.
    pub fn build(self) -> NovellaResult<Scene> {
        if self.id.trim().is_empty() {
            return Err(NovellaError::validation("scene id must be non-empty"));
        }
        Ok(Scene {
            id: self.id,
            label: self.label,
            slides: self.slides,
        })
    }
}

/// Builder for a [`Slide`].
pub struct SlideBuilder {
    id: String,
    initial: SlideInitial,
    has_initial: bool,
    steps: Vec<StepGroup>,
    next: Option<NextPointer>,
}

impl SlideBuilder {
    /// Start a slide. Inherits by default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            initial: SlideInitial::default(),
            has_initial: false,
            steps: Vec::new(),
            next: None,
        }
    }

    fn initial_mut(&mut self) -> &mut SlideInitial {
        self.has_initial = true;
        &mut self.initial
    }

    /// Set `initial.inherit`.
    pub fn inherit(mut self, inherit: bool) -> Self {
        self.initial_mut().inherit = Some(inherit);
        self
    }

    /// Set `initial.background`.
    pub fn background(mut self, name: impl Into<String>) -> Self {
        self.initial_mut().background = Some(name.into());
        self
    }

    /// Set `initial.backgroundBlur`.
    pub fn blur(mut self, blur: f64) -> Self {
        self.initial_mut().background_blur = Some(blur);
        self
    }

    /// Place a character in `slot` initially.
    pub fn character(mut self, slot: UiSlot, placement: CharacterPlacement) -> Self {
        self.initial_mut().characters.insert(slot, placement);
        self
    }

    /// Set the initial textbox.
    pub fn textbox(mut self, speaker: Option<&str>, text: impl Into<String>) -> Self {
        self.initial_mut().textbox = Some(Textbox::new(speaker, text));
        self
    }

    /// Append one step group.
    pub fn step(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.steps.push(actions.into_iter().collect());
        self
    }

    /// Point `next` at a slide id in the same scene.
    pub fn next_slide(mut self, slide: impl Into<String>) -> Self {
        self.next = Some(NextPointer {
            scene: None,
            slide: Some(slide.into()),
        });
        self
    }

    /// Point `next` at a scene, optionally at a specific slide in it.
    pub fn next_scene(mut self, scene: impl Into<String>, slide: Option<&str>) -> Self {
        self.next = Some(NextPointer {
            scene: Some(scene.into()),
            slide: slide.map(str::to_owned),
        });
        self
    }

    /// Finish the slide.
    pub fn build(self) -> NovellaResult<Slide> {
        if self.id.trim().is_empty() {
            return Err(NovellaError::validation("slide id must be non-empty"));
        }
        Ok(Slide {
            id: self.id,
            initial: self.has_initial.then_some(self.initial),
            steps: self.steps,
            next: self.next,
        })
    }
}

/// `say` without a speaker.
pub fn say(text: impl Into<String>) -> Action {
    Action::Say(SayAction {
        text: text.into(),
        speaker: None,
    })
}

/// `say` with a speaker.
pub fn say_as(speaker: impl Into<String>, text: impl Into<String>) -> Action {
    Action::Say(SayAction {
        text: text.into(),
        speaker: Some(speaker.into()),
    })
}

/// `setBackground`, optionally with a blur level.
pub fn set_background(id: impl Into<String>, blur: Option<f64>) -> Action {
    Action::SetBackground(SetBackgroundAction {
        id: id.into(),
        blur,
    })
}

/// `showCharacter` without offsets.
pub fn show(slot: UiSlot, id: impl Into<String>, pose: impl Into<String>) -> Action {
    Action::ShowCharacter(ShowCharacterAction {
        slot,
        id: id.into(),
        pose: pose.into(),
        x: None,
        y: None,
        z: None,
    })
}

/// `updateCharacter` changing only the pose.
pub fn pose(id: impl Into<String>, pose: impl Into<String>) -> Action {
    Action::UpdateCharacter(UpdateCharacterAction {
        id: id.into(),
        pose: Some(pose.into()),
        slot: None,
        x: None,
        y: None,
        z: None,
    })
}

/// `updateCharacter` moving to another slot.
pub fn move_to(id: impl Into<String>, slot: UiSlot) -> Action {
    Action::UpdateCharacter(UpdateCharacterAction {
        id: id.into(),
        pose: None,
        slot: Some(slot),
        x: None,
        y: None,
        z: None,
    })
}

/// `hideCharacter`.
pub fn hide(id: impl Into<String>) -> Action {
    Action::HideCharacter(HideCharacterAction { id: id.into() })
}

/// `transition`.
pub fn transition(name: TransitionName, ms: u32) -> Action {
    Action::Transition(TransitionAction { name, ms })
}

/// `wait`.
pub fn wait(ms: u32) -> Action {
    Action::Wait(WaitAction { ms })
}

#[cfg(test)]
#[path = "../../tests/unit/story/dsl.rs"]
mod tests;
