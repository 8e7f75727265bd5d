pub mod catalog;
pub mod index;

pub use catalog::{RegionCatalog, RegionDescriptor};
pub use index::{SpatialIndex, SpatialItem};
