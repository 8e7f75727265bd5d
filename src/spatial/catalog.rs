//! Read-only cache of region geometry supplied by the map data provider.
//!
//! The catalog is built once when a map loads and shared behind an `Arc`; the
//! pointer never mutates it. Geometry errors surface here, at the loading
//! boundary, and nowhere else.

use crate::core::{bounds::Bounds, geo::Point};
use crate::spatial::index::{SpatialIndex, SpatialItem};
use crate::{PointerError, Result};
use fxhash::FxHashMap;
use geo::{BoundingRect, Centroid, Contains, EuclideanDistance};
use geo_types::{MultiPolygon, Polygon};

/// Immutable description of one selectable map region, in content space
#[derive(Debug, Clone)]
pub struct RegionDescriptor {
    pub id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
    pub bounding_box: Bounds,
    pub center: Point,
}

impl RegionDescriptor {
    /// Builds a descriptor, deriving bounding box and center from the geometry
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Result<Self> {
        let id = id.into();
        let rect = geometry
            .bounding_rect()
            .ok_or_else(|| PointerError::InvalidGeometry(format!("region {id} has no geometry")))?;
        let bounding_box = Bounds::from(rect);
        if !bounding_box.min.is_finite() || !bounding_box.max.is_finite() {
            return Err(PointerError::InvalidGeometry(format!(
                "region {id} has non-finite coordinates"
            )));
        }
        let center = geometry
            .centroid()
            .map(|c| Point::new(c.x(), c.y()))
            .filter(Point::is_finite)
            .unwrap_or_else(|| bounding_box.center());

        Ok(Self {
            id,
            name: name.into(),
            geometry,
            bounding_box,
            center,
        })
    }

    pub fn from_polygon(
        id: impl Into<String>,
        name: impl Into<String>,
        polygon: Polygon<f64>,
    ) -> Result<Self> {
        Self::new(id, name, MultiPolygon::new(vec![polygon]))
    }

    /// Axis-aligned rectangular region; handy for tiny island markers
    pub fn from_bounds(id: impl Into<String>, name: impl Into<String>, bounds: Bounds) -> Result<Self> {
        let rect = geo_types::Rect::new(
            geo_types::coord! { x: bounds.min.x, y: bounds.min.y },
            geo_types::coord! { x: bounds.max.x, y: bounds.max.y },
        );
        Self::from_polygon(id, name, rect.to_polygon())
    }

    /// Provider-supplied label anchor instead of the centroid
    pub fn with_center(mut self, center: Point) -> Self {
        self.center = center;
        self
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.bounding_box.contains(point) && self.geometry.contains(&geo_types::Point::from(*point))
    }

    /// Distance from `point` to the region outline; zero inside
    pub fn distance_to(&self, point: &Point) -> f64 {
        if self.contains(point) {
            return 0.0;
        }
        geo_types::Point::from(*point).euclidean_distance(&self.geometry)
    }
}

pub struct RegionCatalog {
    regions: Vec<RegionDescriptor>,
    by_id: FxHashMap<String, usize>,
    index: SpatialIndex<usize>,
}

impl RegionCatalog {
    pub fn from_regions(regions: Vec<RegionDescriptor>) -> Result<Self> {
        let mut by_id = FxHashMap::default();
        for (idx, region) in regions.iter().enumerate() {
            if by_id.insert(region.id.clone(), idx).is_some() {
                return Err(PointerError::DuplicateRegion(region.id.clone()));
            }
        }

        let items = regions
            .iter()
            .enumerate()
            .map(|(idx, region)| SpatialItem::new(region.bounding_box, idx))
            .collect();

        log::debug!("region catalog loaded: {} regions", regions.len());

        Ok(Self {
            regions,
            by_id,
            index: SpatialIndex::bulk_load(items),
        })
    }

    pub fn get(&self, id: &str) -> Option<&RegionDescriptor> {
        self.by_id.get(id).map(|&idx| &self.regions[idx])
    }

    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|region| region.name.as_str())
    }

    /// Regions whose bounding box comes within `radius` content units of `point`
    pub fn candidates_near(&self, point: &Point, radius: f64) -> impl Iterator<Item = &RegionDescriptor> {
        self.index
            .query_near(point, radius)
            .map(move |item| &self.regions[item.data])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionDescriptor> {
        self.regions.iter()
    }

    /// Union of every region's bounding box
    pub fn extent(&self) -> Option<Bounds> {
        self.index.bounds()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
