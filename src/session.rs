use std::sync::Arc;

use url::Url;

use crate::{
    assets::catalog::AssetCatalog,
    eval::cache::{CacheStats, ResolveCache},
    eval::resolver::Resolver,
    eval::state::SlideState,
    foundation::core::{Cursor, StepIndex},
    foundation::error::NovellaResult,
    nav::navigator::{Advance, EntryStep, NavState, Navigator},
    nav::persist,
    render::view::RenderView,
    story::model::Story,
};

#[derive(Clone, Copy, Debug)]
/// Options for [`Session::new`].
pub struct SessionOpts {
    /// Step a cursor lands on when it enters a slide.
    pub entry: EntryStep,
    /// Memoize per-slide final states across queries.
    pub memoize: bool,
}

impl Default for SessionOpts {
    fn default() -> Self {
        Self {
            entry: EntryStep::Initial,
            memoize: true,
        }
    }
}

/// One reader's progress through a story.
///
/// Owns the story handle, the navigation state, and (optionally) a [`ResolveCache`]. All
/// mutation goes through `&mut self`; share a story between readers by cloning the `Arc`.
pub struct Session {
    story: Arc<Story>,
    navigator: Navigator,
    nav: NavState,
    cache: Option<ResolveCache>,
}

impl Session {
    /// Start at the beginning of `story`.
    pub fn new(story: Arc<Story>, opts: SessionOpts) -> NovellaResult<Self> {
        let navigator = Navigator::new(opts.entry);
        let nav = navigator.start(&story)?;
        let cache = opts.memoize.then(|| ResolveCache::new(Arc::clone(&story)));
        Ok(Self {
            story,
            navigator,
            nav,
            cache,
        })
    }

    /// The story being read.
    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    /// Current cursor.
    pub fn cursor(&self) -> Cursor {
        self.nav.cursor
    }

    /// Whether the reader went past the end.
    pub fn is_complete(&self) -> bool {
        self.nav.is_complete
    }

    /// Current navigation state.
    pub fn nav_state(&self) -> NavState {
        self.nav
    }

    /// Resolved state at the current cursor.
    pub fn state(&mut self) -> NovellaResult<SlideState> {
        let cursor = self.nav.cursor;
        match &mut self.cache {
            Some(cache) => cache.resolve(cursor),
            None => Resolver::resolve(&self.story, cursor),
        }
    }

    /// Render projection of [`Session::state`].
    pub fn view(&mut self, catalog: &AssetCatalog) -> NovellaResult<RenderView> {
        let state = self.state()?;
        Ok(RenderView::project(&self.story, &state, catalog))
    }

    /// Move one unit forward; see [`Navigator::advance`].
    pub fn advance(&mut self) -> NovellaResult<Advance> {
        self.navigator.advance(&self.story, &mut self.nav)
    }

    /// Jump to a position; see [`Navigator::jump_to`].
    pub fn jump_to(&mut self, scene: usize, slide: usize, step: StepIndex) -> NovellaResult<()> {
        self.nav = self.navigator.jump_to(&self.story, scene, slide, step)?;
        Ok(())
    }

    /// Back to the beginning.
    pub fn restart(&mut self) -> NovellaResult<()> {
        self.nav = self.navigator.start(&self.story)?;
        Ok(())
    }

    /// Write the current position into `url`'s query.
    pub fn to_url(&self, url: &mut Url) -> NovellaResult<()> {
        let start = self.navigator.start(&self.story)?.cursor;
        persist::save_to_url(&self.nav, start, url);
        Ok(())
    }

    /// Restore a position from `url`'s query.
    ///
    /// Returns `false` (and keeps the current position) when the URL carries no position.
    pub fn restore_from_url(&mut self, url: &Url) -> NovellaResult<bool> {
        let Some(partial) = persist::load_from_url(url) else {
            return Ok(false);
        };
        self.nav = persist::clamp(&partial, &self.story, self.navigator.entry())?;
        tracing::debug!(
            cursor = %self.nav.cursor,
            complete = self.nav.is_complete,
            "restored position from url"
        );
        Ok(true)
    }

    /// Replace the story, keeping the position when it still exists.
    ///
    /// A position that no longer fits is clamped the same way a restored URL is.
    pub fn replace_story(&mut self, story: Arc<Story>) -> NovellaResult<()> {
        let partial = persist::PartialNavState {
            scene: self.nav.cursor.scene as i64,
            slide: self.nav.cursor.slide as i64,
            step: Some(self.nav.cursor.step),
            is_complete: self.nav.is_complete,
        };
        self.nav = persist::clamp(&partial, &story, self.navigator.entry())?;
        if let Some(cache) = &mut self.cache {
            cache.rebind(Arc::clone(&story));
        }
        self.story = story;
        Ok(())
    }

    /// Memo counters, `None` when memoization is off.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(ResolveCache::stats)
    }
}

#[cfg(test)]
#[path = "../tests/unit/session.rs"]
mod tests;
