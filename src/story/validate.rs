use std::collections::BTreeSet;
use std::fmt;

use crate::foundation::error::{NovellaError, NovellaResult};
use crate::story::model::{Action, STORY_VERSION, Slide, Story, StoryAssets};

/// Structural checks for a loaded story.
///
/// The resolver never calls this; it only bounds-checks indices. Loaders and tooling call it to
/// reject scripts whose ids or `next` pointers cannot work.
pub fn validate_story(story: &Story) -> NovellaResult<()> {
    if story.version != STORY_VERSION {
        return Err(NovellaError::validation(format!(
            "unsupported story version '{}' (expected '{STORY_VERSION}')",
            story.version
        )));
    }
    if story.meta.id.trim().is_empty() {
        return Err(NovellaError::validation("story meta.id must be non-empty"));
    }
    if story.scenes.is_empty() {
        return Err(NovellaError::validation("story must contain at least one scene"));
    }

    let mut scene_ids = BTreeSet::new();
    for (scene_index, scene) in story.scenes.iter().enumerate() {
        if scene.id.trim().is_empty() {
            return Err(NovellaError::validation(format!(
                "scene at index {scene_index} has an empty id"
            )));
        }
        if !scene_ids.insert(scene.id.as_str()) {
            return Err(NovellaError::validation(format!(
                "duplicate scene id '{}'",
                scene.id
            )));
        }
        if scene.slides.is_empty() {
            return Err(NovellaError::validation(format!(
                "scene '{}' has no slides",
                scene.id
            )));
        }

        let mut slide_ids = BTreeSet::new();
        for (slide_index, slide) in scene.slides.iter().enumerate() {
            if slide.id.trim().is_empty() {
                return Err(NovellaError::validation(format!(
                    "slide at index {slide_index} in scene '{}' has an empty id",
                    scene.id
                )));
            }
            if !slide_ids.insert(slide.id.as_str()) {
                return Err(NovellaError::validation(format!(
                    "duplicate slide id '{}' in scene '{}'",
                    slide.id, scene.id
                )));
            }
        }
    }

    for scene in &story.scenes {
        for slide in &scene.slides {
            validate_next(story, &scene.id, slide)?;
        }
    }
    validate_flow(story)?;

    Ok(())
}

fn validate_next(story: &Story, scene_id: &str, slide: &Slide) -> NovellaResult<()> {
    let Some(next) = &slide.next else {
        return Ok(());
    };

    let target_scene = match &next.scene {
        Some(id) => story.scenes.iter().find(|s| &s.id == id).ok_or_else(|| {
            NovellaError::validation(format!(
                "slide '{scene_id}/{}' points to unknown scene '{id}'",
                slide.id
            ))
        })?,
        None => story
            .scenes
            .iter()
            .find(|s| s.id == scene_id)
            .ok_or_else(|| NovellaError::validation(format!("unknown scene '{scene_id}'")))?,
    };

    if let Some(slide_id) = &next.slide {
        if target_scene.slide_index(slide_id).is_none() {
            return Err(NovellaError::validation(format!(
                "slide '{scene_id}/{}' points to unknown slide '{slide_id}' in scene '{}'",
                slide.id, target_scene.id
            )));
        }
    }

    Ok(())
}

/// Slide that playback moves to once `(scene, slide)` runs out of steps, or `None` at the end
/// of the story. Pointers are assumed to be checked already.
fn successor(story: &Story, scene: usize, slide: usize) -> Option<(usize, usize)> {
    let current = &story.scenes[scene];
    let next = current.slides[slide].next.as_ref();
    let scene_target = next.and_then(|n| n.scene.as_deref());
    let slide_target = next.and_then(|n| n.slide.as_deref());

    if scene_target.is_none() {
        if let Some(target) = slide_target.and_then(|id| current.slide_index(id)) {
            return Some((scene, target));
        }
    }
    if slide + 1 < current.slides.len() {
        return Some((scene, slide + 1));
    }
    if let Some(target_scene) = scene_target.and_then(|id| story.scene_index(id)) {
        let target_slide = slide_target
            .and_then(|id| story.scenes[target_scene].slide_index(id))
            .unwrap_or(0);
        return Some((target_scene, target_slide));
    }
    (scene + 1..story.scenes.len())
        .find(|&i| !story.scenes[i].slides.is_empty())
        .map(|i| (i, 0))
}

/// Rejects `next` pointers that send playback around a loop, which would never complete.
fn validate_flow(story: &Story) -> NovellaResult<()> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unseen,
        OnPath,
        Done,
    }

    let offsets: Vec<usize> = story
        .scenes
        .iter()
        .scan(0, |acc, scene| {
            let start = *acc;
            *acc += scene.slides.len();
            Some(start)
        })
        .collect();
    let flat = |(scene, slide): (usize, usize)| offsets[scene] + slide;
    let mut marks = vec![Mark::Unseen; story.slide_count()];

    for (scene_index, scene) in story.scenes.iter().enumerate() {
        for slide_index in 0..scene.slides.len() {
            let mut path = Vec::new();
            let mut at = Some((scene_index, slide_index));
            while let Some(node) = at {
                match marks[flat(node)] {
                    Mark::Done => break,
                    Mark::OnPath => {
                        let (s, i) = node;
                        return Err(NovellaError::validation(format!(
                            "next pointers form a cycle through slide '{}/{}'",
                            story.scenes[s].id, story.scenes[s].slides[i].id
                        )));
                    }
                    Mark::Unseen => {
                        marks[flat(node)] = Mark::OnPath;
                        path.push(node);
                        at = successor(story, node.0, node.1);
                    }
                }
            }
            for node in path {
                marks[flat(node)] = Mark::Done;
            }
        }
    }
    Ok(())
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
/// A reference to an asset name that the story's asset table does not define.
///
/// These never fail resolution (the value just resolves to nothing), so they are reported
/// separately from [`validate_story`] errors.
pub struct AssetWarning {
    /// `scene/slide` or `scene/slide#step` where the reference occurs.
    pub location: String,
    /// What is missing.
    pub kind: AssetWarningKind,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum AssetWarningKind {
    UnknownBackground { name: String },
    UnknownCharacter { id: String },
    UnknownPose { character: String, pose: String },
}

impl fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            AssetWarningKind::UnknownBackground { name } => {
                write!(f, "{}: unknown background '{name}'", self.location)
            }
            AssetWarningKind::UnknownCharacter { id } => {
                write!(f, "{}: unknown character '{id}'", self.location)
            }
            AssetWarningKind::UnknownPose { character, pose } => {
                write!(f, "{}: unknown pose '{pose}' for '{character}'", self.location)
            }
        }
    }
}

/// Collect every asset reference that does not resolve against `story.assets`.
pub fn lint_assets(story: &Story) -> Vec<AssetWarning> {
    let assets = &story.assets;
    let mut out = Vec::new();

    for scene in &story.scenes {
        for slide in &scene.slides {
            let here = format!("{}/{}", scene.id, slide.id);

            if let Some(initial) = &slide.initial {
                if let Some(name) = initial.background.as_deref().filter(|n| !n.is_empty()) {
                    check_background(assets, name, &here, &mut out);
                }
                for placement in initial.characters.values() {
                    check_pose(assets, &placement.id, Some(&placement.pose), &here, &mut out);
                }
            }

            for (step_index, group) in slide.steps.iter().enumerate() {
                let at = format!("{here}#{step_index}");
                for action in group {
                    match action {
                        Action::SetBackground(a) => check_background(assets, &a.id, &at, &mut out),
                        Action::ShowCharacter(a) => {
                            check_pose(assets, &a.id, Some(&a.pose), &at, &mut out)
                        }
                        Action::UpdateCharacter(a) => {
                            check_pose(assets, &a.id, a.pose.as_deref(), &at, &mut out)
                        }
                        Action::Say(_)
                        | Action::HideCharacter(_)
                        | Action::Transition(_)
                        | Action::Wait(_) => {}
                    }
                }
            }
        }
    }

    out
}

fn check_background(assets: &StoryAssets, name: &str, at: &str, out: &mut Vec<AssetWarning>) {
    if assets.background_url(name).is_none() {
        out.push(AssetWarning {
            location: at.to_string(),
            kind: AssetWarningKind::UnknownBackground {
                name: name.to_string(),
            },
        });
    }
}

fn check_pose(
    assets: &StoryAssets,
    character: &str,
    pose: Option<&str>,
    at: &str,
    out: &mut Vec<AssetWarning>,
) {
    let Some(def) = assets.characters.get(character) else {
        out.push(AssetWarning {
            location: at.to_string(),
            kind: AssetWarningKind::UnknownCharacter {
                id: character.to_string(),
            },
        });
        return;
    };
    if let Some(pose) = pose {
        if !def.poses.contains_key(pose) {
            out.push(AssetWarning {
                location: at.to_string(),
                kind: AssetWarningKind::UnknownPose {
                    character: character.to_string(),
                    pose: pose.to_string(),
                },
            });
        }
    }
}

impl Story {
    /// Structural validation; see [`validate_story`].
    pub fn validate(&self) -> NovellaResult<()> {
        validate_story(self)
    }

    /// Unresolvable asset references; see [`lint_assets`].
    pub fn lint_assets(&self) -> Vec<AssetWarning> {
        lint_assets(self)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/story/validate.rs"]
mod tests;
