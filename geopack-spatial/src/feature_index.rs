//! The feature table index orchestrator.
//!
//! Maintains one geometry index row per feature with an indexable envelope,
//! detects staleness against the feature table's content change timestamp,
//! answers tolerance-buffered range queries, and cascade-deletes its own
//! rows. The index is a plain bounds scan over indexed columns, deliberately
//! not a spatially clustered structure.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use geopack::errors::{ErrorKind, GeoPackageError};
use geopack::{BoundingBox, GeoPackageGeometryData, GeoPackageResult, GeometryEnvelope};

use crate::entities::{GeometryIndexEntry, GeometryIndexKey, TableIndexRecord};
use crate::filter::{BoundsQuery, DEFAULT_TOLERANCE};
use crate::projection::ProjectionTransform;
use crate::store::{EntryIterator, FeatureRow, FeatureSource, IndexStore};

/// Default bound on how many feature ids one downstream fetch-by-id batch
/// requests. A batching knob keeping generated statements within engine
/// limits, not a correctness control.
pub const DEFAULT_CHUNK_LIMIT: usize = 1000;

/// A restartable-per-call sequence of geometry index rows produced by a
/// query. Obtain a fresh cursor by re-running the query.
pub struct IndexEntryCursor {
    iter: EntryIterator,
}

impl IndexEntryCursor {
    fn new(iter: EntryIterator) -> Self {
        IndexEntryCursor { iter }
    }
}

impl Iterator for IndexEntryCursor {
    type Item = GeometryIndexEntry;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.next()
    }
}

/// The spatial index over one feature table.
///
/// State machine per table: unindexed, indexed, stale, indexed again after a
/// rebuild. A table is indexed when its extension marker is registered and
/// its `last_indexed` timestamp is at or after the feature table's
/// `last_change`; bumping `last_change` makes the table stale until the next
/// [`FeatureTableIndex::index`] pass.
///
/// # Examples
///
/// ```rust,ignore
/// use std::sync::Arc;
/// use geopack_spatial::{FeatureTableIndex, MemoryFeatureTable, MemoryIndexStore};
///
/// # fn main() -> Result<(), geopack::GeoPackageError> {
/// let store = MemoryIndexStore::new();
/// let features = MemoryFeatureTable::new("places", "geom", 4326);
/// let index = FeatureTableIndex::new(Arc::new(store), Arc::new(features));
///
/// let indexed = index.index()?;
/// let count = index.count_bounding_box(&geopack::BoundingBox::new(0.0, 0.0, 1.0, 1.0))?;
/// # Ok(())
/// # }
/// ```
pub struct FeatureTableIndex {
    store: Arc<dyn IndexStore>,
    features: Arc<dyn FeatureSource>,
    tolerance: f64,
    chunk_limit: usize,
}

impl FeatureTableIndex {
    /// Creates an index over a feature table with the default tolerance and
    /// chunk limit.
    pub fn new(store: Arc<dyn IndexStore>, features: Arc<dyn FeatureSource>) -> Self {
        FeatureTableIndex {
            store,
            features,
            tolerance: DEFAULT_TOLERANCE,
            chunk_limit: DEFAULT_CHUNK_LIMIT,
        }
    }

    /// Name of the indexed feature table.
    pub fn table_name(&self) -> String {
        self.features.table_name()
    }

    /// Name of the indexed geometry column.
    pub fn geometry_column(&self) -> String {
        self.features.geometry_column()
    }

    /// The floating point tolerance added to query range bounds.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Sets the query tolerance.
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// The feature id batch size for chunked id queries.
    pub fn chunk_limit(&self) -> usize {
        self.chunk_limit
    }

    /// Sets the feature id batch size.
    pub fn set_chunk_limit(&mut self, chunk_limit: usize) {
        self.chunk_limit = chunk_limit;
    }

    /// Indexes the feature table if it is unindexed or stale. Returns the
    /// number of features indexed, 0 when the index was already current.
    pub fn index(&self) -> GeoPackageResult<usize> {
        self.index_force(false)
    }

    /// Indexes the feature table, rebuilding unconditionally when `force` is
    /// set. Returns the number of features indexed.
    ///
    /// The rebuild runs inside one unit of work: registering the extension
    /// marker, creating the backing tables on first use, clearing prior
    /// rows, bulk-inserting one row per feature with an indexable envelope
    /// inside a drop/recreate bracket of the supporting bound-column
    /// indexes, and stamping the table's `last_indexed` time. A failure
    /// rolls the whole pass back, leaving the previous state.
    pub fn index_force(&self, force: bool) -> GeoPackageResult<usize> {
        if !force && self.is_indexed()? {
            log::debug!(
                "Feature table {} is already indexed",
                self.features.table_name()
            );
            return Ok(0);
        }

        if self.store.is_read_only()? {
            return Err(GeoPackageError::new(
                &format!(
                    "Cannot index read-only feature table: {}",
                    self.features.table_name()
                ),
                ErrorKind::NotWritable,
            ));
        }

        let store = Arc::clone(&self.store);
        let features = Arc::clone(&self.features);
        let table_name = features.table_name();
        let column_name = features.geometry_column();
        let mut indexed = 0usize;

        self.store.run_in_transaction(&mut || {
            indexed = 0;

            if !store.has_extension(&table_name, &column_name)? {
                store.register_extension(&table_name, &column_name)?;
            }
            store.create_index_tables()?;
            store.clear_entries(&table_name)?;

            store.drop_bounds_indexes()?;
            for row in features.rows()? {
                let row = row?;
                if index_feature_row(store.as_ref(), &table_name, &row)? {
                    indexed += 1;
                }
            }
            store.create_bounds_indexes()?;

            store.put_table_index(TableIndexRecord::indexed_at(&table_name, Utc::now()))?;
            Ok(())
        })?;

        log::debug!("Indexed {} features in table {}", indexed, table_name);
        Ok(indexed)
    }

    /// Checks if the table is indexed and current. A pure timestamp
    /// comparison; no rows are scanned.
    pub fn is_indexed(&self) -> GeoPackageResult<bool> {
        let table_name = self.features.table_name();
        let column_name = self.features.geometry_column();
        if !self.store.has_extension(&table_name, &column_name)? {
            return Ok(false);
        }
        let record = match self.store.table_index(&table_name)? {
            Some(record) => record,
            None => return Ok(false),
        };
        let last_indexed = match record.last_indexed {
            Some(last_indexed) => last_indexed,
            None => return Ok(false),
        };
        Ok(last_indexed >= self.features.last_change()?)
    }

    /// When the table was last fully indexed, if ever.
    pub fn last_indexed(&self) -> GeoPackageResult<Option<DateTime<Utc>>> {
        Ok(self
            .store
            .table_index(&self.features.table_name())?
            .and_then(|record| record.last_indexed))
    }

    /// Queries index rows whose stored bounds overlap the envelope, within
    /// this index's tolerance.
    pub fn query_envelope(
        &self,
        envelope: &GeometryEnvelope,
    ) -> GeoPackageResult<IndexEntryCursor> {
        let query = BoundsQuery::from_envelope(envelope, self.tolerance);
        let iter = self
            .store
            .query_entries(&self.features.table_name(), &query)?;
        Ok(IndexEntryCursor::new(iter))
    }

    /// Counts index rows matching the envelope without materializing them.
    pub fn count_envelope(&self, envelope: &GeometryEnvelope) -> GeoPackageResult<usize> {
        let query = BoundsQuery::from_envelope(envelope, self.tolerance);
        self.store
            .count_entries(&self.features.table_name(), &query)
    }

    /// Queries index rows overlapping a 2D bounding box in the table's
    /// native projection.
    pub fn query_bounding_box(
        &self,
        bounding_box: &BoundingBox,
    ) -> GeoPackageResult<IndexEntryCursor> {
        self.query_envelope(&bounding_box.to_envelope())
    }

    /// Counts index rows overlapping a 2D bounding box.
    pub fn count_bounding_box(&self, bounding_box: &BoundingBox) -> GeoPackageResult<usize> {
        self.count_envelope(&bounding_box.to_envelope())
    }

    /// Queries with a bounding box in a foreign projection; the box is
    /// transformed into the table's native projection before the predicate
    /// is built.
    pub fn query_bounding_box_in_projection(
        &self,
        bounding_box: &BoundingBox,
        transform: &dyn ProjectionTransform,
    ) -> GeoPackageResult<IndexEntryCursor> {
        let native = transform.transform_bounding_box(bounding_box)?;
        self.query_bounding_box(&native)
    }

    /// Counts with a bounding box in a foreign projection.
    pub fn count_bounding_box_in_projection(
        &self,
        bounding_box: &BoundingBox,
        transform: &dyn ProjectionTransform,
    ) -> GeoPackageResult<usize> {
        let native = transform.transform_bounding_box(bounding_box)?;
        self.count_bounding_box(&native)
    }

    /// Scans every index row of the table.
    pub fn query_all(&self) -> GeoPackageResult<IndexEntryCursor> {
        let iter = self.store.all_entries(&self.features.table_name())?;
        Ok(IndexEntryCursor::new(iter))
    }

    /// Number of index rows stored for the table.
    pub fn entry_count(&self) -> GeoPackageResult<usize> {
        self.store.entry_count(&self.features.table_name())
    }

    /// Feature ids matching the envelope, batched into chunks of at most
    /// the chunk limit for downstream fetch-by-id requests.
    pub fn chunked_feature_ids(
        &self,
        envelope: &GeometryEnvelope,
    ) -> GeoPackageResult<Vec<Vec<i64>>> {
        let mut chunks = Vec::new();
        let mut current = Vec::new();
        for entry in self.query_envelope(envelope)? {
            if current.len() == self.chunk_limit {
                chunks.push(std::mem::take(&mut current));
            }
            current.push(entry.feature_id);
        }
        if !current.is_empty() {
            chunks.push(current);
        }
        Ok(chunks)
    }

    /// The aggregate bounding box of every indexed feature, from a single
    /// MIN/MAX pass. `None` when the table has no index rows.
    pub fn table_bounds(&self) -> GeoPackageResult<Option<BoundingBox>> {
        self.store.entry_bounds(&self.features.table_name())
    }

    /// The aggregate bounding box transformed into a requested projection.
    pub fn table_bounds_in_projection(
        &self,
        transform: &dyn ProjectionTransform,
    ) -> GeoPackageResult<Option<BoundingBox>> {
        match self.table_bounds()? {
            Some(bounds) => Ok(Some(transform.transform_bounding_box(&bounds)?)),
            None => Ok(None),
        }
    }

    /// Removes the table's index rows, its table index row, and its
    /// extension marker, in that order, inside one unit of work. Returns
    /// whether anything was removed.
    pub fn delete_index(&self) -> GeoPackageResult<bool> {
        if self.store.is_read_only()? {
            return Err(GeoPackageError::new(
                &format!(
                    "Cannot delete index of read-only feature table: {}",
                    self.features.table_name()
                ),
                ErrorKind::NotWritable,
            ));
        }

        let store = Arc::clone(&self.store);
        let table_name = self.features.table_name();
        let mut removed = false;

        self.store.run_in_transaction(&mut || {
            let cleared = store.clear_entries(&table_name)?;
            let record_removed = store.delete_table_index(&table_name)?;
            let marker_removed = store.unregister_extension(&table_name)?;

            if store.entry_count(&table_name)? > 0 {
                return Err(GeoPackageError::new(
                    &format!(
                        "Orphaned geometry index rows remain for table {}",
                        table_name
                    ),
                    ErrorKind::IndexInconsistency,
                ));
            }

            removed = cleared > 0 || record_removed || marker_removed;
            Ok(())
        })?;

        if removed {
            log::debug!("Deleted index of feature table {}", table_name);
        }
        Ok(removed)
    }

    /// Removes at most one index row by feature id.
    pub fn delete_feature(&self, feature_id: i64) -> GeoPackageResult<bool> {
        if self.store.is_read_only()? {
            return Err(GeoPackageError::new(
                &format!(
                    "Cannot delete from index of read-only feature table: {}",
                    self.features.table_name()
                ),
                ErrorKind::NotWritable,
            ));
        }
        let key = GeometryIndexKey::new(&self.features.table_name(), feature_id);
        self.store.delete_entry(&key)
    }
}

/// Indexes one feature row, returning whether an entry was written. A row
/// with no geometry, an empty geometry, or no indexable envelope contributes
/// no entry; a blob that fails to decode is logged and skipped so it cannot
/// poison the rest of the pass.
fn index_feature_row(
    store: &dyn IndexStore,
    table_name: &str,
    row: &FeatureRow,
) -> GeoPackageResult<bool> {
    let blob = match &row.geometry {
        Some(blob) => blob,
        None => return Ok(false),
    };

    let data = match GeoPackageGeometryData::from_bytes(blob) {
        Ok(data) => data,
        Err(err) => {
            log::warn!(
                "Failed to index feature {} in table {}: {}",
                row.feature_id,
                table_name,
                err
            );
            return Ok(false);
        }
    };

    let envelope = match data.build_envelope() {
        Some(envelope) => envelope,
        None => return Ok(false),
    };
    if !envelope.is_valid() {
        return Ok(false);
    }

    store.put_entry(GeometryIndexEntry::new(table_name, row.feature_id, &envelope))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FeatureRowIterator, MemoryFeatureTable, MemoryIndexStore};
    use geo_types::{line_string, point, Geometry};
    use geopack::{ByteOrder, GeometryDataConfig};
    use std::time::Duration;

    fn geometry_blob(geometry: Geometry<f64>) -> Vec<u8> {
        let mut data = GeoPackageGeometryData::with_config(GeometryDataConfig {
            srs_id: 4326,
            byte_order: ByteOrder::Little,
        });
        data.set_envelope(GeometryEnvelope::from_geometry(&geometry));
        data.set_geometry(Some(geometry));
        data.to_bytes().expect("encode")
    }

    fn unit_square_blob(i: f64) -> Vec<u8> {
        geometry_blob(Geometry::LineString(line_string![
            (x: i, y: i),
            (x: i + 1.0, y: i + 1.0),
        ]))
    }

    fn empty_blob() -> Vec<u8> {
        let mut data = GeoPackageGeometryData::with_config(GeometryDataConfig {
            srs_id: 4326,
            byte_order: ByteOrder::Little,
        });
        data.to_bytes().expect("encode")
    }

    /// A populated fixture: features 0..n with envelope [i, i, i+1, i+1],
    /// feature id i + 1.
    fn fixture(n: usize) -> (FeatureTableIndex, MemoryIndexStore, MemoryFeatureTable) {
        let store = MemoryIndexStore::new();
        let features = MemoryFeatureTable::new("places", "geom", 4326);
        for i in 0..n {
            features.insert(Some(unit_square_blob(i as f64)));
        }
        let index = FeatureTableIndex::new(
            Arc::new(store.clone()),
            Arc::new(features.clone()),
        );
        (index, store, features)
    }

    #[test]
    fn test_unindexed_table() {
        let (index, _, _) = fixture(3);
        assert!(!index.is_indexed().unwrap());
        assert!(index.last_indexed().unwrap().is_none());
    }

    #[test]
    fn test_index_builds_entries() {
        let (index, store, _) = fixture(6);

        let indexed = index.index().unwrap();
        assert_eq!(indexed, 6);
        assert!(index.is_indexed().unwrap());
        assert!(index.last_indexed().unwrap().is_some());
        assert_eq!(index.entry_count().unwrap(), 6);
        assert!(store.has_extension("places", "geom").unwrap());
        assert!(store.bounds_indexed());
    }

    #[test]
    fn test_index_noop_when_current() {
        let (index, _, _) = fixture(4);
        assert_eq!(index.index().unwrap(), 4);
        assert_eq!(index.index().unwrap(), 0);
        assert_eq!(index.index_force(true).unwrap(), 4);
    }

    #[test]
    fn test_staleness_after_content_change() {
        let (index, _, features) = fixture(3);
        assert_eq!(index.index().unwrap(), 3);
        assert!(index.is_indexed().unwrap());
        let first_pass = index.last_indexed().unwrap().expect("stamped");

        std::thread::sleep(Duration::from_millis(2));
        features.touch();
        assert!(!index.is_indexed().unwrap());

        // new feature picked up by the rebuild
        features.insert(Some(unit_square_blob(10.0)));
        assert_eq!(index.index().unwrap(), 4);
        assert!(index.is_indexed().unwrap());
        assert!(index.last_indexed().unwrap().expect("stamped") >= first_pass);
    }

    #[test]
    fn test_query_unit_square_grid() {
        let (mut index, _, _) = fixture(6);
        index.set_tolerance(0.0);
        index.index().unwrap();

        let query = BoundingBox::new(2.5, 2.5, 4.5, 4.5);
        let mut ids: Vec<i64> = index
            .query_bounding_box(&query)
            .unwrap()
            .map(|entry| entry.feature_id)
            .collect();
        ids.sort();

        // feature ids are 1-based: squares i=2,3,4 are ids 3,4,5
        assert_eq!(ids, vec![3, 4, 5]);
        assert_eq!(index.count_bounding_box(&query).unwrap(), 3);
    }

    #[test]
    fn test_query_is_restartable_per_call() {
        let (index, _, _) = fixture(5);
        index.index().unwrap();

        let query = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let first: Vec<i64> = index
            .query_bounding_box(&query)
            .unwrap()
            .map(|e| e.feature_id)
            .collect();
        let second: Vec<i64> = index
            .query_bounding_box(&query)
            .unwrap()
            .map(|e| e.feature_id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 5);
    }

    #[test]
    fn test_query_tolerance_buffers_bounds() {
        let (mut index, _, _) = fixture(1);
        index.index().unwrap();

        // square 0 spans [0, 1]; the query starts just past its east edge
        let beyond_edge = BoundingBox::new(1.0 + 1e-15, 0.25, 2.0, 0.75);
        index.set_tolerance(0.0);
        assert_eq!(index.count_bounding_box(&beyond_edge).unwrap(), 0);

        index.set_tolerance(DEFAULT_TOLERANCE);
        assert_eq!(index.count_bounding_box(&beyond_edge).unwrap(), 1);
    }

    #[test]
    fn test_rows_without_indexable_geometry_are_skipped() {
        let store = MemoryIndexStore::new();
        let features = MemoryFeatureTable::new("places", "geom", 4326);
        features.insert(Some(unit_square_blob(0.0)));
        features.insert(None); // no geometry column value
        features.insert(Some(empty_blob())); // empty geometry flag
        features.insert(Some(vec![b'X', b'X', 0, 0])); // malformed blob
        let index = FeatureTableIndex::new(Arc::new(store), Arc::new(features));

        // skipped rows are not errors and contribute no entries
        assert_eq!(index.index().unwrap(), 1);
        assert_eq!(index.entry_count().unwrap(), 1);
    }

    #[test]
    fn test_index_read_only_rejected() {
        let (index, store, _) = fixture(2);
        store.set_read_only(true);

        let err = index.index().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotWritable);
        store.set_read_only(false);
        assert!(!index.is_indexed().unwrap());
        assert_eq!(index.entry_count().unwrap(), 0);
    }

    #[test]
    fn test_query_before_index_is_missing_dependency() {
        let (index, _, _) = fixture(2);
        let err = index
            .query_bounding_box(&BoundingBox::new(0.0, 0.0, 1.0, 1.0))
            .err()
            .unwrap();
        assert_eq!(err.kind(), &ErrorKind::MissingDependency);
    }

    struct FailingFeatureSource {
        table: MemoryFeatureTable,
        yield_before_failure: usize,
    }

    impl FeatureSource for FailingFeatureSource {
        fn table_name(&self) -> String {
            self.table.table_name()
        }

        fn geometry_column(&self) -> String {
            self.table.geometry_column()
        }

        fn srs_id(&self) -> GeoPackageResult<i32> {
            self.table.srs_id()
        }

        fn last_change(&self) -> GeoPackageResult<chrono::DateTime<Utc>> {
            self.table.last_change()
        }

        fn row_count(&self) -> GeoPackageResult<usize> {
            self.table.row_count()
        }

        fn rows(&self) -> GeoPackageResult<FeatureRowIterator> {
            let rows: Vec<GeoPackageResult<FeatureRow>> = self
                .table
                .rows()?
                .take(self.yield_before_failure)
                .chain(std::iter::once(Err(GeoPackageError::new(
                    "feature row read failed",
                    ErrorKind::IOError,
                ))))
                .collect();
            Ok(Box::new(rows.into_iter()))
        }
    }

    #[test]
    fn test_failed_rebuild_rolls_back() {
        let store = MemoryIndexStore::new();
        let table = MemoryFeatureTable::new("places", "geom", 4326);
        for i in 0..3 {
            table.insert(Some(unit_square_blob(i as f64)));
        }

        // first pass over the healthy table succeeds
        let healthy = FeatureTableIndex::new(
            Arc::new(store.clone()),
            Arc::new(table.clone()),
        );
        assert_eq!(healthy.index().unwrap(), 3);
        let stamped = healthy.last_indexed().unwrap();

        // a mid-pass row failure rolls the forced rebuild back
        let failing = FeatureTableIndex::new(
            Arc::new(store.clone()),
            Arc::new(FailingFeatureSource {
                table: table.clone(),
                yield_before_failure: 1,
            }),
        );
        let err = failing.index_force(true).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::IOError);

        // the previous, still-valid index state survives
        assert_eq!(healthy.entry_count().unwrap(), 3);
        assert_eq!(healthy.last_indexed().unwrap(), stamped);
        assert!(healthy.is_indexed().unwrap());
    }

    #[test]
    fn test_chunked_feature_ids() {
        let (mut index, _, _) = fixture(5);
        index.set_chunk_limit(2);
        index.index().unwrap();

        let everything = GeometryEnvelope::new(-10.0, 100.0, -10.0, 100.0);
        let chunks = index.chunked_feature_ids(&everything).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 2);
        assert_eq!(chunks[1].len(), 2);
        assert_eq!(chunks[2].len(), 1);

        let total: usize = chunks.iter().map(Vec::len).sum();
        assert_eq!(total, 5);
    }

    #[test]
    fn test_table_bounds() {
        let (index, _, _) = fixture(4);
        index.index().unwrap();

        let bounds = index.table_bounds().unwrap().expect("bounds");
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_table_bounds_in_projection() {
        struct DoubleTransform;
        impl ProjectionTransform for DoubleTransform {
            fn transform_bounding_box(
                &self,
                bounding_box: &BoundingBox,
            ) -> GeoPackageResult<BoundingBox> {
                Ok(BoundingBox::new(
                    bounding_box.min_x * 2.0,
                    bounding_box.min_y * 2.0,
                    bounding_box.max_x * 2.0,
                    bounding_box.max_y * 2.0,
                ))
            }
        }

        let (index, _, _) = fixture(2);
        index.index().unwrap();

        let bounds = index
            .table_bounds_in_projection(&DoubleTransform)
            .unwrap()
            .expect("bounds");
        assert_eq!(bounds, BoundingBox::new(0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn test_query_in_projection_transforms_into_native() {
        struct HalveTransform;
        impl ProjectionTransform for HalveTransform {
            fn transform_bounding_box(
                &self,
                bounding_box: &BoundingBox,
            ) -> GeoPackageResult<BoundingBox> {
                Ok(BoundingBox::new(
                    bounding_box.min_x / 2.0,
                    bounding_box.min_y / 2.0,
                    bounding_box.max_x / 2.0,
                    bounding_box.max_y / 2.0,
                ))
            }
        }

        let (mut index, _, _) = fixture(6);
        index.set_tolerance(0.0);
        index.index().unwrap();

        // foreign box [5, 9] halves into native [2.5, 4.5]
        let foreign = BoundingBox::new(5.0, 5.0, 9.0, 9.0);
        let count = index
            .count_bounding_box_in_projection(&foreign, &HalveTransform)
            .unwrap();
        assert_eq!(count, 3);
    }

    #[test]
    fn test_delete_feature() {
        let (index, _, _) = fixture(3);
        index.index().unwrap();

        assert!(index.delete_feature(2).unwrap());
        assert!(!index.delete_feature(2).unwrap());
        assert_eq!(index.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_delete_index_cascades() {
        let (index, store, _) = fixture(3);
        index.index().unwrap();
        assert_eq!(index.entry_count().unwrap(), 3);

        assert!(index.delete_index().unwrap());
        assert_eq!(index.entry_count().unwrap(), 0);
        assert!(store.table_index("places").unwrap().is_none());
        assert!(!store.has_extension("places", "geom").unwrap());
        assert!(!index.is_indexed().unwrap());

        // nothing left to remove
        assert!(!index.delete_index().unwrap());
    }

    #[test]
    fn test_delete_read_only_rejected() {
        let (index, store, _) = fixture(2);
        index.index().unwrap();
        store.set_read_only(true);

        let err = index.delete_index().unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotWritable);
        let err = index.delete_feature(1).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::NotWritable);

        store.set_read_only(false);
        assert_eq!(index.entry_count().unwrap(), 2);
    }

    #[test]
    fn test_point_features_are_indexed() {
        let store = MemoryIndexStore::new();
        let features = MemoryFeatureTable::new("places", "geom", 4326);
        features.insert(Some(geometry_blob(Geometry::Point(
            point!(x: 1.5, y: -2.5),
        ))));
        let index = FeatureTableIndex::new(Arc::new(store), Arc::new(features));

        assert_eq!(index.index().unwrap(), 1);
        let bounds = index.table_bounds().unwrap().expect("bounds");
        assert_eq!(bounds, BoundingBox::new(1.5, -2.5, 1.5, -2.5));
    }
}
