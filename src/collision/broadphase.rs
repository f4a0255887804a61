use std::collections::HashMap;

use crate::geometry::Aabb;
use crate::handle::FixtureHandle;
use crate::math::Vector2;

/// Sweep-and-prune broad phase over fixture AABBs.
///
/// A cheap incremental index that tolerates dynamic insert/remove/move;
/// sweep-and-prune is used instead of fixed buckets so fixtures never get
/// silently dropped when a bucket overflows.
pub struct BroadPhase {
    margin: f64,
    entries: HashMap<FixtureHandle, Aabb>,
    /// Handles sorted by their fattened AABB's minimum x, re-sorted lazily.
    order: Vec<FixtureHandle>,
    dirty: bool,
}

impl BroadPhase {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            entries: HashMap::new(),
            order: Vec::new(),
            dirty: false,
        }
    }

    /// Insert or update a fixture's tight AABB; it is stored fattened by the
    /// configured margin so small moves don't require a re-insert.
    pub fn insert(&mut self, handle: FixtureHandle, tight_aabb: Aabb) {
        let fat = tight_aabb.expanded(self.margin);
        if self.entries.insert(handle, fat).is_none() {
            self.order.push(handle);
        }
        self.dirty = true;
    }

    /// Update a fixture's AABB, re-fattening only if it has moved outside
    /// its existing fat AABB.
    pub fn r#move(&mut self, handle: FixtureHandle, tight_aabb: Aabb) {
        if let Some(existing) = self.entries.get(&handle) {
            if existing.contains(&tight_aabb) {
                return;
            }
        }
        self.insert(handle, tight_aabb);
    }

    pub fn remove(&mut self, handle: FixtureHandle) {
        if self.entries.remove(&handle).is_some() {
            self.order.retain(|h| *h != handle);
            self.dirty = true;
        }
    }

    pub fn aabb(&self, handle: FixtureHandle) -> Option<Aabb> {
        self.entries.get(&handle).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn ensure_sorted(&mut self) {
        if !self.dirty {
            return;
        }
        let entries = &self.entries;
        self.order
            .sort_by(|a, b| entries[a].min.x().partial_cmp(&entries[b].min.x()).unwrap());
        self.dirty = false;
    }

    /// Candidate overlapping pairs, `(a, b)` with `a` preceding `b` in
    /// creation order so identity order is stable across calls. May include
    /// pairs reported in a previous call; callers are expected to
    /// deduplicate against their own live constraint set.
    pub fn candidate_pairs(&mut self) -> Vec<(FixtureHandle, FixtureHandle)> {
        self.ensure_sorted();

        let mut pairs = Vec::new();
        for i in 0..self.order.len() {
            let a = self.order[i];
            let a_aabb = self.entries[&a];
            for b in self.order.iter().skip(i + 1) {
                let b_aabb = self.entries[b];
                if b_aabb.min.x() > a_aabb.max.x() {
                    break;
                }
                if a_aabb.overlaps(&b_aabb) {
                    pairs.push(order_pair(a, *b));
                }
            }
        }
        pairs
    }

    /// Fixtures whose fat AABB overlaps `query`.
    pub fn query_aabb(&self, query: Aabb) -> Vec<FixtureHandle> {
        self.entries
            .iter()
            .filter(|(_, aabb)| aabb.overlaps(&query))
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Fixtures whose fat AABB contains `point`.
    pub fn query_point(&self, point: Vector2) -> Vec<FixtureHandle> {
        self.entries
            .iter()
            .filter(|(_, aabb)| aabb.contains_point(point))
            .map(|(handle, _)| *handle)
            .collect()
    }

    /// Fixtures whose fat AABB the ray from `origin` along `direction`
    /// crosses within `max_fraction`, paired with their entry fraction,
    /// sorted ascending by fraction.
    pub fn raycast(
        &self,
        origin: Vector2,
        direction: Vector2,
        max_fraction: f64,
    ) -> Vec<(FixtureHandle, f64)> {
        let mut hits: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(handle, aabb)| {
                aabb.raycast(origin, direction, max_fraction)
                    .map(|t| (*handle, t))
            })
            .collect();
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        hits
    }
}

/// Order two fixture handles so pairs are reported with a stable identity
/// order regardless of discovery order.
fn order_pair(a: FixtureHandle, b: FixtureHandle) -> (FixtureHandle, FixtureHandle) {
    if handle_key(a) <= handle_key(b) {
        (a, b)
    } else {
        (b, a)
    }
}

fn handle_key(handle: FixtureHandle) -> (u64, usize) {
    use slotmap::Key;
    (handle.body.data().as_ffi(), handle.fixture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::Body;

    fn h(index: u32) -> FixtureHandle {
        let mut bodies: slotmap::SlotMap<crate::handle::BodyHandle, Body> = slotmap::SlotMap::with_key();
        let mut last = None;
        for _ in 0..=index {
            last = Some(bodies.insert(Body::new(Default::default())));
        }
        FixtureHandle::new(last.unwrap(), 0)
    }

    #[test]
    fn overlapping_aabbs_are_reported() {
        let mut bp = BroadPhase::new(0.0);
        let a = h(0);
        let b = h(1);
        bp.insert(a, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)));
        bp.insert(b, Aabb::new(Vector2::new(0.5, 0.0), Vector2::new(1.5, 1.0)));

        let pairs = bp.candidate_pairs();
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn disjoint_aabbs_are_not_reported() {
        let mut bp = BroadPhase::new(0.0);
        let a = h(0);
        let b = h(1);
        bp.insert(a, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)));
        bp.insert(b, Aabb::new(Vector2::new(10.0, 0.0), Vector2::new(11.0, 1.0)));

        assert!(bp.candidate_pairs().is_empty());
    }

    #[test]
    fn small_move_within_fat_aabb_does_not_mark_dirty_sort() {
        let mut bp = BroadPhase::new(0.2);
        let a = h(0);
        bp.insert(a, Aabb::new(Vector2::new(0.0, 0.0), Vector2::new(1.0, 1.0)));
        let fat_before = bp.aabb(a).unwrap();
        bp.r#move(a, Aabb::new(Vector2::new(0.01, 0.0), Vector2::new(1.01, 1.0)));
        assert_eq!(bp.aabb(a).unwrap(), fat_before);
    }

    #[test]
    fn remove_drops_the_fixture() {
        let mut bp = BroadPhase::new(0.0);
        let a = h(0);
        bp.insert(a, Aabb::new(Vector2::ZERO, Vector2::new(1.0, 1.0)));
        bp.remove(a);
        assert!(bp.is_empty());
    }
}
