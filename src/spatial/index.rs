use crate::core::{bounds::Bounds, geo::Point};

use rstar::{RTree, RTreeObject, AABB};

/// A spatial item that can be indexed via an R-tree
#[derive(Debug, Clone)]
pub struct SpatialItem<T> {
    pub bounds: Bounds,
    pub data: T,
}

impl<T> SpatialItem<T> {
    pub fn new(bounds: Bounds, data: T) -> Self {
        Self { bounds, data }
    }
}

// --- rstar integration -------------------------------------------------------------------------

impl<T> RTreeObject for SpatialItem<T> {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bounds)
    }
}

fn envelope_of(bounds: &Bounds) -> AABB<[f64; 2]> {
    AABB::from_corners([bounds.min.x, bounds.min.y], [bounds.max.x, bounds.max.y])
}

/// Read-only R-tree over bounding boxes, bulk loaded once
pub struct SpatialIndex<T> {
    rtree: RTree<SpatialItem<T>>,
    bounds: Option<Bounds>,
}

impl<T> SpatialIndex<T> {
    pub fn bulk_load(items: Vec<SpatialItem<T>>) -> Self {
        let bounds = items.iter().fold(None, |acc: Option<Bounds>, item| {
            let mut b = acc.unwrap_or(item.bounds);
            b.extend(&item.bounds.min);
            b.extend(&item.bounds.max);
            Some(b)
        });

        Self {
            rtree: RTree::bulk_load(items),
            bounds,
        }
    }

    /// Items whose bounding boxes intersect `bounds`
    pub fn query(&self, bounds: &Bounds) -> impl Iterator<Item = &SpatialItem<T>> {
        self.rtree
            .locate_in_envelope_intersecting(&envelope_of(bounds))
    }

    /// Items whose bounding boxes come within `radius` of `center`
    pub fn query_near(&self, center: &Point, radius: f64) -> impl Iterator<Item = &SpatialItem<T>> {
        let area = Bounds::new(*center, *center).expanded(radius.max(0.0));
        self.query(&area)
    }

    /// Union of all indexed bounding boxes
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.rtree.size() == 0
    }

    pub fn len(&self) -> usize {
        self.rtree.size()
    }
}
