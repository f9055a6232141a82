//! Ledger of every geometry and material the scene has created.
//!
//! The scene never frees anything itself; it records ids here. Once a GPU
//! mirror is attached, released ids queue up until the mirror drains them
//! and destroys the matching buffers, so a resource is destroyed at most
//! once and a superseded one never lingers. Without a mirror nothing holds
//! GPU memory and released ids are dropped on the spot.

use rustc_hash::FxHashMap;

/// Opaque handle for a scene resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(u64);

impl ResourceId {
    /// Raw numeric id.
    #[must_use]
    pub fn raw(self) -> u64 {
        self.0
    }
}

/// What a resource id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    /// Vertex/index data.
    Geometry,
    /// Shading parameters.
    Material,
}

/// Live and pending-release resource ids.
#[derive(Debug, Default)]
pub struct ResourcePool {
    next_id: u64,
    live: FxHashMap<ResourceId, ResourceKind>,
    released: Vec<(ResourceId, ResourceKind)>,
    mirrored: bool,
}

impl ResourcePool {
    /// Empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new resource.
    pub fn acquire(&mut self, kind: ResourceKind) -> ResourceId {
        let id = ResourceId(self.next_id);
        self.next_id += 1;
        let _ = self.live.insert(id, kind);
        id
    }

    /// Start queueing released ids for [`ResourcePool::drain_released`].
    /// Everything live at this point is still owned by the scene; earlier
    /// releases were never uploaded and are not replayed.
    pub fn attach_mirror(&mut self) {
        self.mirrored = true;
    }

    /// Whether a mirror is draining this pool.
    #[must_use]
    pub fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    /// Mark `id` as released. Returns `false` (and changes nothing) when the
    /// id is unknown or already released.
    pub fn release(&mut self, id: ResourceId) -> bool {
        match self.live.remove(&id) {
            Some(kind) => {
                if self.mirrored {
                    self.released.push((id, kind));
                }
                true
            }
            None => {
                log::warn!("resource {} released twice", id.0);
                false
            }
        }
    }

    /// Take the ids released since the last drain.
    pub fn drain_released(&mut self) -> Vec<(ResourceId, ResourceKind)> {
        std::mem::take(&mut self.released)
    }

    /// Released ids waiting for the mirror.
    #[must_use]
    pub fn pending_release_count(&self) -> usize {
        self.released.len()
    }

    /// Whether `id` is currently live.
    #[must_use]
    pub fn is_live(&self, id: ResourceId) -> bool {
        self.live.contains_key(&id)
    }

    /// Number of live resources.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Number of live resources of one kind.
    #[must_use]
    pub fn live_of(&self, kind: ResourceKind) -> usize {
        self.live.values().filter(|k| **k == kind).count()
    }

    /// Total ids ever handed out.
    #[must_use]
    pub fn acquired_total(&self) -> u64 {
        self.next_id
    }
}
