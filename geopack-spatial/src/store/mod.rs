//! The narrow persistence contract the feature table index is built on.
//!
//! The index addresses storage only through "does this table exist",
//! "create/read/update/delete row", and "run in one unit of work"; no SQL
//! dialect detail is part of this contract. [`memory::MemoryIndexStore`]
//! implements it over in-memory B-tree maps; SQL-backed stores implement it
//! over ordinary indexed columns.

pub mod memory;

use chrono::{DateTime, Utc};
use geopack::{BoundingBox, GeoPackageResult};

use crate::entities::{GeometryIndexEntry, GeometryIndexKey, TableIndexRecord};
use crate::filter::BoundsQuery;

pub use memory::{MemoryFeatureTable, MemoryIndexStore};

/// A lazily produced sequence of geometry index rows. Each producing call
/// returns a fresh iterator, so sequences are restartable per call.
pub type EntryIterator = Box<dyn Iterator<Item = GeometryIndexEntry> + Send>;

/// A lazily produced sequence of feature rows.
pub type FeatureRowIterator = Box<dyn Iterator<Item = GeoPackageResult<FeatureRow>> + Send>;

/// One row of a feature table as seen by the index: the row id and the raw
/// geometry blob, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    /// Feature row id
    pub feature_id: i64,
    /// Encoded geometry blob, absent for rows without geometry
    pub geometry: Option<Vec<u8>>,
}

impl FeatureRow {
    pub fn new(feature_id: i64, geometry: Option<Vec<u8>>) -> Self {
        FeatureRow {
            feature_id,
            geometry,
        }
    }
}

/// Read access to the feature table being indexed.
///
/// `last_change` is the externally maintained, table-granularity staleness
/// signal: it is bumped on structural change to the table's metadata, not on
/// every row write.
pub trait FeatureSource: Send + Sync {
    /// Name of the feature table.
    fn table_name(&self) -> String;

    /// Name of the table's geometry column.
    fn geometry_column(&self) -> String;

    /// Spatial reference system id of the table's geometries.
    fn srs_id(&self) -> GeoPackageResult<i32>;

    /// When the table's content metadata last changed.
    fn last_change(&self) -> GeoPackageResult<DateTime<Utc>>;

    /// Number of rows in the table.
    fn row_count(&self) -> GeoPackageResult<usize>;

    /// Iterates all rows of the table.
    fn rows(&self) -> GeoPackageResult<FeatureRowIterator>;
}

/// Storage for the table index rows, geometry index rows, and extension
/// markers, plus the unit-of-work boundary.
///
/// # Thread Safety
///
/// Implementers must be `Send + Sync` for safe use in concurrent contexts.
pub trait IndexStore: Send + Sync {
    /// Checks if the store rejects mutation.
    fn is_read_only(&self) -> GeoPackageResult<bool>;

    /// Checks if the backing index tables have been created.
    fn index_tables_exist(&self) -> GeoPackageResult<bool>;

    /// Creates the backing index tables if absent.
    fn create_index_tables(&self) -> GeoPackageResult<()>;

    /// Reads the table index row for a feature table.
    fn table_index(&self, table_name: &str) -> GeoPackageResult<Option<TableIndexRecord>>;

    /// Inserts or replaces a table index row.
    fn put_table_index(&self, record: TableIndexRecord) -> GeoPackageResult<()>;

    /// Deletes the table index row for a feature table, reporting whether a
    /// row was removed.
    fn delete_table_index(&self, table_name: &str) -> GeoPackageResult<bool>;

    /// Inserts or replaces a geometry index row.
    fn put_entry(&self, entry: GeometryIndexEntry) -> GeoPackageResult<()>;

    /// Deletes at most one geometry index row by composite key.
    fn delete_entry(&self, key: &GeometryIndexKey) -> GeoPackageResult<bool>;

    /// Deletes every geometry index row of a feature table, returning how
    /// many were removed.
    fn clear_entries(&self, table_name: &str) -> GeoPackageResult<usize>;

    /// Number of geometry index rows stored for a feature table.
    fn entry_count(&self, table_name: &str) -> GeoPackageResult<usize>;

    /// Scans the geometry index rows of a table matching a bounds predicate.
    fn query_entries(
        &self,
        table_name: &str,
        query: &BoundsQuery,
    ) -> GeoPackageResult<EntryIterator>;

    /// Counts matching rows without materializing them.
    fn count_entries(&self, table_name: &str, query: &BoundsQuery) -> GeoPackageResult<usize>;

    /// Scans every geometry index row of a table.
    fn all_entries(&self, table_name: &str) -> GeoPackageResult<EntryIterator>;

    /// Aggregates the stored X/Y bounds of a table in one MIN/MAX pass,
    /// `None` when the table has no rows.
    fn entry_bounds(&self, table_name: &str) -> GeoPackageResult<Option<BoundingBox>>;

    /// Drops the supporting indexes on the bound columns ahead of a bulk
    /// insert. A throughput optimization, not a correctness requirement.
    fn drop_bounds_indexes(&self) -> GeoPackageResult<()>;

    /// Recreates the supporting indexes on the bound columns.
    fn create_bounds_indexes(&self) -> GeoPackageResult<()>;

    /// Checks if the geometry index extension is registered for a table and
    /// geometry column.
    fn has_extension(&self, table_name: &str, column_name: &str) -> GeoPackageResult<bool>;

    /// Registers the geometry index extension for a table and geometry
    /// column.
    fn register_extension(&self, table_name: &str, column_name: &str) -> GeoPackageResult<()>;

    /// Removes the extension registration for a table, reporting whether one
    /// was present.
    fn unregister_extension(&self, table_name: &str) -> GeoPackageResult<bool>;

    /// Runs `work` inside one unit of work: either every mutation it makes
    /// is kept, or on error all of them are rolled back and the error is
    /// returned.
    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut() -> GeoPackageResult<()>,
    ) -> GeoPackageResult<()>;
}
