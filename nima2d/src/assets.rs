//! Fan-out/fan-in of external asset resolution.
//!
//! After decoding, every atlas (and, when enabled, every nested actor asset) is handed
//! to an [`AssetResolver`] together with a one-shot resolution ticket. Resolvers may
//! complete tickets synchronously, later, or from other threads. The actor is handed
//! to the completion callback exactly once, after the last ticket resolves.

use crate::{Actor, AtlasSource, NestedActorAsset};
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Decoded atlas image supplied by the host. The crate never looks inside it.
#[derive(Clone)]
pub struct AtlasImage(Arc<dyn Any + Send + Sync>);

impl AtlasImage {
    pub fn new<T: Any + Send + Sync>(image: T) -> Self {
        Self(Arc::new(image))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref()
    }
}

impl fmt::Debug for AtlasImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AtlasImage(..)")
    }
}

/// Host collaborator that turns declared assets into usable ones.
pub trait AssetResolver {
    /// Decodes atlas `index`. Complete or drop `resolution` when done; dropping it
    /// without completing counts as a failed atlas.
    fn resolve_atlas(&self, index: usize, source: AtlasSource, resolution: AtlasResolution);

    /// Loads a nested actor. The default declines, leaving the asset empty.
    fn resolve_nested_actor(&self, asset: &NestedActorAsset, resolution: NestedActorResolution) {
        log::debug!("nested actor '{}' ({}) not resolved", asset.name, asset.id);
        resolution.decline();
    }
}

type Completion = Box<dyn FnOnce(Actor) + Send>;

struct JoinState {
    actor: Option<Actor>,
    on_complete: Option<Completion>,
}

pub(crate) struct AssetJoin {
    outstanding: AtomicUsize,
    state: Mutex<JoinState>,
}

impl AssetJoin {
    /// A join waiting for `outstanding` arrivals. With nothing outstanding the actor is
    /// delivered immediately.
    pub(crate) fn start(actor: Actor, outstanding: usize, on_complete: Completion) -> Arc<Self> {
        let join = Arc::new(Self {
            outstanding: AtomicUsize::new(outstanding),
            state: Mutex::new(JoinState {
                actor: Some(actor),
                on_complete: Some(on_complete),
            }),
        });
        if outstanding == 0 {
            join.finish();
        }
        join
    }

    fn lock(&self) -> MutexGuard<'_, JoinState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_actor(&self, f: impl FnOnce(&mut Actor)) {
        if let Some(actor) = self.lock().actor.as_mut() {
            f(actor);
        }
    }

    fn arrive(&self) {
        if self.outstanding.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.finish();
        }
    }

    fn finish(&self) {
        let (actor, on_complete) = {
            let mut state = self.lock();
            (state.actor.take(), state.on_complete.take())
        };
        if let (Some(actor), Some(on_complete)) = (actor, on_complete) {
            on_complete(actor);
        }
    }
}

/// One-shot ticket for a single atlas.
pub struct AtlasResolution {
    join: Option<Arc<AssetJoin>>,
    index: usize,
}

impl AtlasResolution {
    pub(crate) fn new(join: Arc<AssetJoin>, index: usize) -> Self {
        Self {
            join: Some(join),
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn complete(mut self, image: AtlasImage) {
        if let Some(join) = self.join.take() {
            let index = self.index;
            join.with_actor(|actor| {
                if let Some(atlas) = actor.atlases.get_mut(index) {
                    atlas.image = Some(image);
                }
            });
            join.arrive();
        }
    }

    /// Gives up on this atlas; the actor is still delivered.
    pub fn fail(mut self, reason: &str) {
        if let Some(join) = self.join.take() {
            log::warn!("atlas {} failed to resolve: {reason}", self.index);
            join.arrive();
        }
    }
}

impl Drop for AtlasResolution {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            log::warn!("atlas {} resolution dropped without completing", self.index);
            join.arrive();
        }
    }
}

/// One-shot ticket for a single nested actor asset.
pub struct NestedActorResolution {
    join: Option<Arc<AssetJoin>>,
    index: usize,
}

impl NestedActorResolution {
    pub(crate) fn new(join: Arc<AssetJoin>, index: usize) -> Self {
        Self {
            join: Some(join),
            index,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn complete(mut self, nested: Actor) {
        if let Some(join) = self.join.take() {
            let index = self.index;
            join.with_actor(|actor| {
                if let Some(asset) = actor.nested_actor_assets.get_mut(index) {
                    asset.actor = Some(Box::new(nested));
                }
            });
            join.arrive();
        }
    }

    /// Leaves the asset unresolved without treating it as a failure.
    pub fn decline(mut self) {
        if let Some(join) = self.join.take() {
            join.arrive();
        }
    }
}

impl Drop for NestedActorResolution {
    fn drop(&mut self) {
        if let Some(join) = self.join.take() {
            log::warn!("nested actor {} resolution dropped without completing", self.index);
            join.arrive();
        }
    }
}
