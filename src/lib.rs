//! Novella resolves visual novel scripts into the exact visual state at any narrative position.
//!
//! A [`Story`] is a tree of scenes, slides and step groups. Any position in it is addressed by a
//! [`Cursor`] `(scene, slide, step)`, and [`Resolver::resolve`] reconstructs the [`SlideState`]
//! (background, blur, characters per slot, textbox) visible there.
//!
//! # Pipeline overview
//!
//! 1. **Load**: JSON -> [`Story`] (optionally [`Story::validate`] and [`Story::lint_assets`])
//! 2. **Navigate**: [`Navigator`] moves a [`NavState`] forward or jumps it around
//! 3. **Resolve**: `Story + Cursor -> SlideState`, walking slide inheritance back to its root
//! 4. **Project** (optional): [`RenderView::project`] maps the state onto files in an
//!    [`AssetCatalog`]
//!
//! [`Session`] bundles the last three for a single reader, with memoization via
//! [`ResolveCache`] and URL persistence via [`persist`].
//!
//! Resolution is deterministic and never mutates the story. Unknown asset names resolve to
//! absent values; only out-of-range scene or slide indices are errors.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod eval;
mod foundation;
mod nav;
mod render;
mod session;
mod story;

pub use assets::catalog::{AssetCatalog, normalize_asset_path};
pub use eval::actions::{
    apply_action, apply_hide_character, apply_say, apply_set_background, apply_show_character,
    apply_update_character,
};
pub use eval::cache::{CacheStats, ResolveCache};
pub use eval::resolver::{Resolver, resolve};
pub use eval::state::SlideState;
pub use foundation::core::{
    Cursor, INITIAL_STEP, SlideKey, StepIndex, UiSlot, clamp_step, final_step,
};
pub use foundation::error::{NovellaError, NovellaResult};
pub use nav::navigator::{Advance, EntryStep, NavState, Navigator};
pub use nav::persist;
pub use render::view::{BackgroundView, DialogueView, MissingAsset, RenderView, SpriteView};
pub use session::{Session, SessionOpts};
pub use story::dsl::{
    SceneBuilder, SlideBuilder, StoryBuilder, character_asset, hide, move_to, pose, say, say_as,
    set_background, show, transition, wait,
};
pub use story::model::{
    Action, CharacterAsset, CharacterPlacement, HideCharacterAction, NextPointer, STORY_VERSION,
    SayAction, Scene, SetBackgroundAction, ShowCharacterAction, Slide, SlideInitial, StepGroup,
    Story, StoryAssets, StoryMeta, Textbox, TransitionAction, TransitionName,
    UpdateCharacterAction, WaitAction,
};
pub use story::validate::{AssetWarning, AssetWarningKind, lint_assets, validate_story};
