use std::path::PathBuf;

use crate::{
    assets::catalog::AssetCatalog,
    eval::state::SlideState,
    foundation::core::UiSlot,
    story::model::Story,
};

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Draw-ready projection of a [`SlideState`].
///
/// Everything a renderer needs without consulting the story again: files on disk, display
/// names, and a list of references that could not be satisfied.
pub struct RenderView {
    /// Background layer, absent when the state has no background.
    pub background: Option<BackgroundView>,
    /// Character sprites in left-to-right slot order.
    pub sprites: Vec<SpriteView>,
    /// Textbox contents with the speaker's display name.
    pub dialogue: Option<DialogueView>,
    /// Unresolved references encountered while projecting.
    pub missing: Vec<MissingAsset>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct BackgroundView {
    pub source: String,
    pub file: Option<PathBuf>,
    pub blur: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct SpriteView {
    pub slot: UiSlot,
    pub character: String,
    pub pose: String,
    pub source: Option<String>,
    pub file: Option<PathBuf>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
/// Textbox as displayed.
pub struct DialogueView {
    /// Speaker id from the state.
    pub speaker: Option<String>,
    /// Character display name, or the raw speaker id for speakers without a definition.
    pub speaker_name: Option<String>,
    /// Name color from the character definition.
    pub speaker_color: Option<String>,
    /// Text body; empty when the textbox only carries a speaker.
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// A reference the projection could not satisfy.
pub enum MissingAsset {
    /// The story defines no image for this character pose.
    UnknownPose {
        /// Character id.
        character: String,
        /// Pose name.
        pose: String,
    },
    /// The story names a file the catalog does not hold.
    MissingFile {
        /// Asset path as written in the story.
        source: String,
    },
}

impl RenderView {
    /// Project `state` through the story's character table and `catalog`.
    pub fn project(story: &Story, state: &SlideState, catalog: &AssetCatalog) -> Self {
        let mut missing = Vec::new();

        let background = state.background.as_ref().map(|source| BackgroundView {
            source: source.clone(),
            file: locate_file(catalog, source, &mut missing),
            blur: state.background_blur.unwrap_or(0.0),
        });

        let sprites = UiSlot::ALL
            .iter()
            .filter_map(|slot| state.character(*slot).map(|c| (*slot, c)))
            .map(|(slot, placement)| {
                let source = story
                    .assets
                    .pose_url(&placement.id, &placement.pose)
                    .map(str::to_owned);
                let file = match &source {
                    Some(source) => locate_file(catalog, source, &mut missing),
                    None => {
                        missing.push(MissingAsset::UnknownPose {
                            character: placement.id.clone(),
                            pose: placement.pose.clone(),
                        });
                        None
                    }
                };
                SpriteView {
                    slot,
                    character: placement.id.clone(),
                    pose: placement.pose.clone(),
                    source,
                    file,
                    x: placement.x.unwrap_or(0.0),
                    y: placement.y.unwrap_or(0.0),
                    z: placement.z.unwrap_or(0.0),
                }
            })
            .collect();

        let dialogue = state.textbox.as_ref().map(|tb| {
            let def = tb
                .speaker
                .as_deref()
                .and_then(|id| story.assets.characters.get(id));
            DialogueView {
                speaker: tb.speaker.clone(),
                speaker_name: def.map(|d| d.name.clone()).or_else(|| tb.speaker.clone()),
                speaker_color: def.and_then(|d| d.speaker_color.clone()),
                text: tb.text.clone().unwrap_or_default(),
            }
        });

        for m in &missing {
            tracing::warn!(missing = ?m, "unresolved asset while projecting slide state");
        }

        Self {
            background,
            sprites,
            dialogue,
            missing,
        }
    }
}

fn locate_file(
    catalog: &AssetCatalog,
    source: &str,
    missing: &mut Vec<MissingAsset>,
) -> Option<PathBuf> {
    let file = catalog.resolve(source).map(|p| p.to_path_buf());
    if file.is_none() {
        missing.push(MissingAsset::MissingFile {
            source: source.to_string(),
        });
    }
    file
}

#[cfg(test)]
#[path = "../../tests/unit/render/view.rs"]
mod tests;
