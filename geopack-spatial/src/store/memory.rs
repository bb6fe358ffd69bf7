//! In-memory implementations of the persistence contract.
//!
//! Index rows live in ordinary B-tree maps, so queries are the same linear
//! bounds scans a SQL-backed store performs over its indexed columns. The
//! unit of work snapshots the whole state and restores it when the work
//! fails.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use geopack::errors::{ErrorKind, GeoPackageError};
use geopack::{BoundingBox, GeoPackageResult};
use parking_lot::RwLock;

use crate::entities::{GeometryIndexEntry, GeometryIndexKey, TableIndexRecord};
use crate::filter::BoundsQuery;
use crate::store::{
    EntryIterator, FeatureRow, FeatureRowIterator, FeatureSource, IndexStore,
};

/// In-memory index row storage.
///
/// Cheaply cloneable; clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryIndexStore {
    inner: Arc<RwLock<MemoryIndexState>>,
}

#[derive(Clone, Default)]
struct MemoryIndexState {
    read_only: bool,
    tables_created: bool,
    bounds_indexed: bool,
    table_index: BTreeMap<String, TableIndexRecord>,
    entries: BTreeMap<GeometryIndexKey, GeometryIndexEntry>,
    extensions: BTreeSet<(String, String)>,
}

impl MemoryIndexStore {
    /// Creates an empty writable store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the store read-only or writable.
    pub fn set_read_only(&self, read_only: bool) {
        self.inner.write().read_only = read_only;
    }

    /// True when the supporting bound-column indexes are in place. The
    /// memory store only records the drop/recreate bracket; scans do not
    /// depend on it.
    pub fn bounds_indexed(&self) -> bool {
        self.inner.read().bounds_indexed
    }

    fn check_writable(&self) -> GeoPackageResult<()> {
        if self.inner.read().read_only {
            return Err(GeoPackageError::new(
                "Store is read only",
                ErrorKind::NotWritable,
            ));
        }
        Ok(())
    }

    fn check_tables(&self) -> GeoPackageResult<()> {
        if !self.inner.read().tables_created {
            return Err(GeoPackageError::new(
                "Geometry index tables have not been created",
                ErrorKind::MissingDependency,
            ));
        }
        Ok(())
    }

    fn table_span(table_name: &str) -> (GeometryIndexKey, GeometryIndexKey) {
        (
            GeometryIndexKey::new(table_name, i64::MIN),
            GeometryIndexKey::new(table_name, i64::MAX),
        )
    }

    fn table_range(
        state: &MemoryIndexState,
        table_name: &str,
    ) -> Vec<GeometryIndexEntry> {
        let (start, end) = Self::table_span(table_name);
        state
            .entries
            .range(start..=end)
            .map(|(_, entry)| entry.clone())
            .collect()
    }
}

impl IndexStore for MemoryIndexStore {
    fn is_read_only(&self) -> GeoPackageResult<bool> {
        Ok(self.inner.read().read_only)
    }

    fn index_tables_exist(&self) -> GeoPackageResult<bool> {
        Ok(self.inner.read().tables_created)
    }

    fn create_index_tables(&self) -> GeoPackageResult<()> {
        self.check_writable()?;
        let mut state = self.inner.write();
        if !state.tables_created {
            state.tables_created = true;
            state.bounds_indexed = true;
        }
        Ok(())
    }

    fn table_index(&self, table_name: &str) -> GeoPackageResult<Option<TableIndexRecord>> {
        Ok(self.inner.read().table_index.get(table_name).cloned())
    }

    fn put_table_index(&self, record: TableIndexRecord) -> GeoPackageResult<()> {
        self.check_writable()?;
        self.check_tables()?;
        self.inner
            .write()
            .table_index
            .insert(record.table_name.clone(), record);
        Ok(())
    }

    fn delete_table_index(&self, table_name: &str) -> GeoPackageResult<bool> {
        self.check_writable()?;
        Ok(self.inner.write().table_index.remove(table_name).is_some())
    }

    fn put_entry(&self, entry: GeometryIndexEntry) -> GeoPackageResult<()> {
        self.check_writable()?;
        self.check_tables()?;
        self.inner.write().entries.insert(entry.key(), entry);
        Ok(())
    }

    fn delete_entry(&self, key: &GeometryIndexKey) -> GeoPackageResult<bool> {
        self.check_writable()?;
        Ok(self.inner.write().entries.remove(key).is_some())
    }

    fn clear_entries(&self, table_name: &str) -> GeoPackageResult<usize> {
        self.check_writable()?;
        let mut state = self.inner.write();
        let (start, end) = Self::table_span(table_name);
        let keys: Vec<GeometryIndexKey> = state
            .entries
            .range(start..=end)
            .map(|(key, _)| key.clone())
            .collect();
        for key in &keys {
            state.entries.remove(key);
        }
        Ok(keys.len())
    }

    fn entry_count(&self, table_name: &str) -> GeoPackageResult<usize> {
        let state = self.inner.read();
        let (start, end) = Self::table_span(table_name);
        Ok(state.entries.range(start..=end).count())
    }

    fn query_entries(
        &self,
        table_name: &str,
        query: &BoundsQuery,
    ) -> GeoPackageResult<EntryIterator> {
        self.check_tables()?;
        let query = query.clone();
        let matches: Vec<GeometryIndexEntry> =
            Self::table_range(&self.inner.read(), table_name)
                .into_iter()
                .filter(|entry| query.matches(entry))
                .collect();
        Ok(Box::new(matches.into_iter()))
    }

    fn count_entries(&self, table_name: &str, query: &BoundsQuery) -> GeoPackageResult<usize> {
        self.check_tables()?;
        let state = self.inner.read();
        let (start, end) = Self::table_span(table_name);
        Ok(state
            .entries
            .range(start..=end)
            .filter(|(_, entry)| query.matches(entry))
            .count())
    }

    fn all_entries(&self, table_name: &str) -> GeoPackageResult<EntryIterator> {
        self.check_tables()?;
        let entries = Self::table_range(&self.inner.read(), table_name);
        Ok(Box::new(entries.into_iter()))
    }

    fn entry_bounds(&self, table_name: &str) -> GeoPackageResult<Option<BoundingBox>> {
        self.check_tables()?;
        let state = self.inner.read();
        let (start, end) = Self::table_span(table_name);
        let mut bounds: Option<BoundingBox> = None;
        for (_, entry) in state.entries.range(start..=end) {
            bounds = Some(match bounds {
                Some(current) => BoundingBox::new(
                    current.min_x.min(entry.min_x),
                    current.min_y.min(entry.min_y),
                    current.max_x.max(entry.max_x),
                    current.max_y.max(entry.max_y),
                ),
                None => entry.bounding_box(),
            });
        }
        Ok(bounds)
    }

    fn drop_bounds_indexes(&self) -> GeoPackageResult<()> {
        self.check_writable()?;
        self.inner.write().bounds_indexed = false;
        Ok(())
    }

    fn create_bounds_indexes(&self) -> GeoPackageResult<()> {
        self.check_writable()?;
        self.inner.write().bounds_indexed = true;
        Ok(())
    }

    fn has_extension(&self, table_name: &str, column_name: &str) -> GeoPackageResult<bool> {
        Ok(self
            .inner
            .read()
            .extensions
            .contains(&(table_name.to_string(), column_name.to_string())))
    }

    fn register_extension(&self, table_name: &str, column_name: &str) -> GeoPackageResult<()> {
        self.check_writable()?;
        self.inner
            .write()
            .extensions
            .insert((table_name.to_string(), column_name.to_string()));
        Ok(())
    }

    fn unregister_extension(&self, table_name: &str) -> GeoPackageResult<bool> {
        self.check_writable()?;
        let mut state = self.inner.write();
        let registered: Vec<(String, String)> = state
            .extensions
            .iter()
            .filter(|(table, _)| table == table_name)
            .cloned()
            .collect();
        for marker in &registered {
            state.extensions.remove(marker);
        }
        Ok(!registered.is_empty())
    }

    fn run_in_transaction(
        &self,
        work: &mut dyn FnMut() -> GeoPackageResult<()>,
    ) -> GeoPackageResult<()> {
        let snapshot = self.inner.read().clone();
        match work() {
            Ok(()) => Ok(()),
            Err(err) => {
                *self.inner.write() = snapshot;
                Err(err)
            }
        }
    }
}

/// An in-memory feature table for tests and embedding without a SQL engine.
///
/// Row inserts do not bump `last_change`; the staleness signal is table
/// granularity and is advanced explicitly with [`MemoryFeatureTable::touch`].
#[derive(Clone)]
pub struct MemoryFeatureTable {
    inner: Arc<RwLock<MemoryFeatureState>>,
}

struct MemoryFeatureState {
    table_name: String,
    geometry_column: String,
    srs_id: i32,
    last_change: DateTime<Utc>,
    next_id: i64,
    rows: BTreeMap<i64, Option<Vec<u8>>>,
}

impl MemoryFeatureTable {
    /// Creates an empty feature table.
    pub fn new(table_name: &str, geometry_column: &str, srs_id: i32) -> Self {
        MemoryFeatureTable {
            inner: Arc::new(RwLock::new(MemoryFeatureState {
                table_name: table_name.to_string(),
                geometry_column: geometry_column.to_string(),
                srs_id,
                last_change: Utc::now(),
                next_id: 1,
                rows: BTreeMap::new(),
            })),
        }
    }

    /// Inserts a row with the given geometry blob, returning its id.
    pub fn insert(&self, geometry: Option<Vec<u8>>) -> i64 {
        let mut state = self.inner.write();
        let feature_id = state.next_id;
        state.next_id += 1;
        state.rows.insert(feature_id, geometry);
        feature_id
    }

    /// Deletes a row, reporting whether it existed.
    pub fn delete(&self, feature_id: i64) -> bool {
        self.inner.write().rows.remove(&feature_id).is_some()
    }

    /// Advances the table's content change timestamp to now.
    pub fn touch(&self) {
        self.inner.write().last_change = Utc::now();
    }
}

impl FeatureSource for MemoryFeatureTable {
    fn table_name(&self) -> String {
        self.inner.read().table_name.clone()
    }

    fn geometry_column(&self) -> String {
        self.inner.read().geometry_column.clone()
    }

    fn srs_id(&self) -> GeoPackageResult<i32> {
        Ok(self.inner.read().srs_id)
    }

    fn last_change(&self) -> GeoPackageResult<DateTime<Utc>> {
        Ok(self.inner.read().last_change)
    }

    fn row_count(&self) -> GeoPackageResult<usize> {
        Ok(self.inner.read().rows.len())
    }

    fn rows(&self) -> GeoPackageResult<FeatureRowIterator> {
        let rows: Vec<FeatureRow> = self
            .inner
            .read()
            .rows
            .iter()
            .map(|(feature_id, geometry)| FeatureRow::new(*feature_id, geometry.clone()))
            .collect();
        Ok(Box::new(rows.into_iter().map(Ok)))
    }
}
