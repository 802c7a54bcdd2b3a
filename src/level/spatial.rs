//! Spatial indexing for waypoint radius queries.
//!
//! Uses an R-tree over waypoint positions. Results are returned sorted by
//! waypoint id so callers iterate in a stable order.

use glam::Vec3;
use rstar::{AABB, PointDistance, RTree, RTreeObject};

use super::waypoint::WaypointId;

/// A waypoint position stored in the R-tree.
#[derive(Clone, Copy, Debug, PartialEq)]
struct IndexedWaypoint {
    position: [f32; 3],
    id: WaypointId,
}

impl IndexedWaypoint {
    fn new(id: WaypointId, position: Vec3) -> Self {
        Self {
            position: position.to_array(),
            id,
        }
    }
}

impl RTreeObject for IndexedWaypoint {
    type Envelope = AABB<[f32; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedWaypoint {
    fn distance_2(&self, point: &[f32; 3]) -> f32 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        let dz = self.position[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index over waypoint positions.
#[derive(Clone, Default)]
pub struct SpatialIndex {
    tree: RTree<IndexedWaypoint>,
}

impl SpatialIndex {
    /// Create an empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Bulk load an index from `(id, position)` pairs.
    pub fn from_points(points: impl IntoIterator<Item = (WaypointId, Vec3)>) -> Self {
        let items: Vec<IndexedWaypoint> = points
            .into_iter()
            .map(|(id, p)| IndexedWaypoint::new(id, p))
            .collect();
        Self {
            tree: RTree::bulk_load(items),
        }
    }

    /// Number of indexed waypoints.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Insert a waypoint.
    pub fn insert(&mut self, id: WaypointId, position: Vec3) {
        self.tree.insert(IndexedWaypoint::new(id, position));
    }

    /// Remove a waypoint indexed at `position`. Returns false if absent.
    pub fn remove(&mut self, id: WaypointId, position: Vec3) -> bool {
        self.tree.remove(&IndexedWaypoint::new(id, position)).is_some()
    }

    /// All waypoints within `radius` of `center`, sorted by id.
    pub fn within_radius(&self, center: Vec3, radius: f32) -> Vec<WaypointId> {
        let mut ids: Vec<WaypointId> = self
            .tree
            .locate_within_distance(center.to_array(), radius * radius)
            .map(|w| w.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Nearest waypoint to `point`.
    pub fn nearest(&self, point: Vec3) -> Option<WaypointId> {
        self.tree.nearest_neighbor(&point.to_array()).map(|w| w.id)
    }

    /// Remove everything.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }
}

impl std::fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("waypoints", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> SpatialIndex {
        SpatialIndex::from_points(
            (0..10).map(|i| (WaypointId(i), Vec3::new(i as f32 * 100.0, 0.0, 0.0))),
        )
    }

    #[test]
    fn test_within_radius_sorted() {
        let index = grid();
        let ids = index.within_radius(Vec3::new(450.0, 0.0, 0.0), 160.0);
        assert_eq!(ids, vec![WaypointId(3), WaypointId(4), WaypointId(5), WaypointId(6)]);
    }

    #[test]
    fn test_remove() {
        let mut index = grid();
        assert!(index.remove(WaypointId(4), Vec3::new(400.0, 0.0, 0.0)));
        assert!(!index.remove(WaypointId(4), Vec3::new(400.0, 0.0, 0.0)));
        assert_eq!(index.len(), 9);
        assert_eq!(index.nearest(Vec3::new(360.0, 0.0, 0.0)), Some(WaypointId(3)));
    }

    #[test]
    fn test_empty() {
        let index = SpatialIndex::new();
        assert!(index.is_empty());
        assert!(index.within_radius(Vec3::ZERO, 1000.0).is_empty());
        assert_eq!(index.nearest(Vec3::ZERO), None);
    }
}
