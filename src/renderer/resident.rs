//! GPU residency bookkeeping keyed by scene resource ids.

use rustc_hash::FxHashMap;

use crate::scene::ResourceId;

/// GPU objects uploaded for scene resources.
#[derive(Debug)]
pub struct ResidentSet<T> {
    items: FxHashMap<ResourceId, T>,
}

impl<T> Default for ResidentSet<T> {
    fn default() -> Self {
        Self {
            items: FxHashMap::default(),
        }
    }
}

impl<T> ResidentSet<T> {
    /// Whether `id` has been uploaded.
    #[must_use]
    pub fn contains(&self, id: ResourceId) -> bool {
        self.items.contains_key(&id)
    }

    /// Uploaded object for `id`.
    #[must_use]
    pub fn get(&self, id: ResourceId) -> Option<&T> {
        self.items.get(&id)
    }

    /// Upload `id` with `make` unless already resident.
    pub fn ensure(&mut self, id: ResourceId, make: impl FnOnce() -> T) -> &T {
        self.items.entry(id).or_insert_with(make)
    }

    /// Remove every id in `released`, handing each removed object to
    /// `destroy`. Returns how many were removed.
    pub fn evict(
        &mut self,
        released: impl IntoIterator<Item = ResourceId>,
        mut destroy: impl FnMut(T),
    ) -> usize {
        let mut n = 0;
        for id in released {
            if let Some(item) = self.items.remove(&id) {
                destroy(item);
                n += 1;
            }
        }
        n
    }

    /// Number of resident objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether nothing is resident.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::metrics::tests::shell;
    use crate::options::Options;
    use crate::scene::{ResourceKind, SceneAnimator};

    /// Mirror the scene's clouds the way the renderer does and count
    /// destroyed uploads.
    fn mirror(
        scene: &mut SceneAnimator,
        resident: &mut ResidentSet<usize>,
        destroyed: &mut usize,
    ) {
        let released = scene.pool_mut().drain_released();
        let _ = resident.evict(
            released
                .into_iter()
                .filter(|(_, k)| *k == ResourceKind::Geometry)
                .map(|(id, _)| id),
            |_| *destroyed += 1,
        );
        for cloud in &scene.state().clouds {
            let _ = resident.ensure(cloud.geometry_id, || cloud.data.len());
        }
    }

    #[test]
    fn every_superseded_cloud_is_destroyed() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut scene = SceneAnimator::create(&Options::default(), 640, 480);
        scene.pool_mut().attach_mirror();
        let mut resident = ResidentSet::default();
        let mut destroyed = 0;
        let shells = [shell(4.0, 20.0, 98.0, 300), shell(2.0, 9.0, 80.0, 90)];
        for _ in 0..20 {
            scene.update(&shells, &mut rng);
            mirror(&mut scene, &mut resident, &mut destroyed);
            assert_eq!(resident.len(), 2);
        }
        assert_eq!(destroyed, 38);
        scene.update(&[], &mut rng);
        mirror(&mut scene, &mut resident, &mut destroyed);
        assert!(resident.is_empty());
        assert_eq!(destroyed, 40);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut pool = crate::scene::ResourcePool::new();
        let a = pool.acquire(ResourceKind::Geometry);
        let b = pool.acquire(ResourceKind::Geometry);
        let mut resident = ResidentSet::default();
        let _ = resident.ensure(a, || 1);
        let mut seen = Vec::new();
        assert_eq!(resident.evict([b, a, a], |v| seen.push(v)), 1);
        assert_eq!(seen, vec![1]);
    }
}
