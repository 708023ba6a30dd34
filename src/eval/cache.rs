use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    eval::resolver::{locate, settle_slide},
    eval::state::SlideState,
    foundation::core::{Cursor, SlideKey, final_step},
    foundation::error::NovellaResult,
    story::model::Story,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
/// Counters for [`ResolveCache`].
pub struct CacheStats {
    /// Final states served from the memo.
    pub hits: u64,
    /// Final states computed and inserted.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
}

/// Memo of per-slide final states for one story.
///
/// Resolving slide `n` of a long inheriting chain recomputes every ancestor from scratch;
/// the cache stores each ancestor's final state by `(scene, slide)` so the walk-back stops at
/// the nearest memoized slide. Results are structurally equal to [`crate::Resolver::resolve`].
#[derive(Debug)]
pub struct ResolveCache {
    story: Arc<Story>,
    finals: HashMap<SlideKey, SlideState>,
    stats: CacheStats,
}

impl ResolveCache {
    /// Empty cache bound to `story`.
    pub fn new(story: Arc<Story>) -> Self {
        Self {
            story,
            finals: HashMap::new(),
            stats: CacheStats::default(),
        }
    }

    /// The story this cache resolves against.
    pub fn story(&self) -> &Arc<Story> {
        &self.story
    }

    /// Bind to another story. Clears the memo unless it is the same allocation.
    pub fn rebind(&mut self, story: Arc<Story>) {
        if !Arc::ptr_eq(&self.story, &story) {
            tracing::debug!(entries = self.finals.len(), "story changed, clearing resolve cache");
            self.finals.clear();
            self.story = story;
        }
    }

    /// Drop all memoized states.
    pub fn clear(&mut self) {
        self.finals.clear();
    }

    /// Hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.finals.len(),
            ..self.stats
        }
    }

    /// Memoizing equivalent of [`crate::Resolver::resolve`].
    #[tracing::instrument(skip(self))]
    pub fn resolve(&mut self, cursor: Cursor) -> NovellaResult<SlideState> {
        let story = Arc::clone(&self.story);
        let (scene, slide) = locate(&story, cursor.scene, cursor.slide)?;

        // Walk back to the chain root, stopping early at a memoized predecessor.
        let mut start = cursor.slide;
        let mut base = None;
        while start > 0 && scene.slides[start].inherits() {
            let key = SlideKey {
                scene: cursor.scene,
                slide: start - 1,
            };
            if let Some(hit) = self.finals.get(&key) {
                self.stats.hits += 1;
                base = Some(hit.clone());
                break;
            }
            start -= 1;
        }

        let mut state = base.unwrap_or_default();
        for index in start..cursor.slide {
            let ancestor = &scene.slides[index];
            state = settle_slide(&story.assets, ancestor, &state, final_step(ancestor.steps.len()));
            let key = SlideKey {
                scene: cursor.scene,
                slide: index,
            };
            self.insert_final(key, &state);
        }

        let resolved = settle_slide(&story.assets, slide, &state, cursor.step);
        if cursor.step >= final_step(slide.steps.len()) {
            self.insert_final(cursor.slide_key(), &resolved);
        }
        Ok(resolved)
    }

    fn insert_final(&mut self, key: SlideKey, state: &SlideState) {
        if !self.finals.contains_key(&key) {
            self.stats.misses += 1;
            self.finals.insert(key, state.clone());
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/eval/cache.rs"]
mod tests;
