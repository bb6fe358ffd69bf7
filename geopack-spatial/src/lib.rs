//! # GeoPack Spatial - Feature Table Indexing for GeoPack
//!
//! This crate provides the geometry index extension for GeoPackage feature
//! tables: one stored envelope row per feature, queried by bounding box with
//! floating point tolerance. The index is a thin layer over ordinary indexed
//! columns, deliberately not an R-tree, so it works against any store that
//! can answer plain range predicates.
//!
//! ## Features
//!
//! - **Incremental and forced rebuilds**: stale tables are detected by
//!   comparing the last-indexed time against the table's content change time
//! - **Transactional rebuilds**: a failed pass rolls back to the previous,
//!   still-valid index state
//! - **Tolerance queries**: range predicates buffered by a configurable
//!   epsilon, over X/Y always and Z/M when the query carries them
//! - **Cascade deletion**: removing a table's index removes its rows, its
//!   table record, and its extension marker in one unit of work
//! - **Narrow persistence contract**: storage is addressed through row CRUD
//!   and unit-of-work traits; an in-memory store is included
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use geopack::BoundingBox;
//! use geopack_spatial::{FeatureTableIndex, MemoryFeatureTable, MemoryIndexStore};
//!
//! # fn main() -> Result<(), geopack::GeoPackageError> {
//! let store = MemoryIndexStore::new();
//! let features = MemoryFeatureTable::new("places", "geom", 4326);
//! let index = FeatureTableIndex::new(Arc::new(store), Arc::new(features));
//!
//! index.index()?;
//! for entry in index.query_bounding_box(&BoundingBox::new(0.0, 0.0, 10.0, 10.0))? {
//!     println!("feature {}", entry.feature_id);
//! }
//! # Ok(())
//! # }
//! ```

pub mod entities;
pub mod feature_index;
pub mod filter;
pub mod projection;
pub mod store;

// Re-export entity types and contract names
pub use entities::{
    GeometryIndexEntry, GeometryIndexKey, TableIndexRecord, EXTENSION_AUTHOR,
    EXTENSION_DEFINITION, EXTENSION_NAME, GEOMETRY_INDEX_TABLE, TABLE_INDEX_TABLE,
};

// Re-export the index and its cursor
pub use feature_index::{FeatureTableIndex, IndexEntryCursor, DEFAULT_CHUNK_LIMIT};

// Re-export the query predicate
pub use filter::{BoundsQuery, DEFAULT_TOLERANCE};

// Re-export the projection seam
pub use projection::{IdentityTransform, ProjectionTransform};

// Re-export the persistence contract and the in-memory store
pub use store::{
    FeatureRow, FeatureSource, IndexStore, MemoryFeatureTable, MemoryIndexStore,
};
