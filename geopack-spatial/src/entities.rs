//! Index row types and the backing schema contract names.

use chrono::{DateTime, Utc};
use geopack::{BoundingBox, GeometryEnvelope};

/// Name of the backing table holding one row per indexed feature table.
pub const TABLE_INDEX_TABLE: &str = "nga_table_index";

/// Name of the backing table holding one row per indexed feature geometry.
pub const GEOMETRY_INDEX_TABLE: &str = "nga_geometry_index";

/// Extension author recorded in the extension registry.
pub const EXTENSION_AUTHOR: &str = "nga";

/// Extension name recorded in the extension registry for an indexed table.
pub const EXTENSION_NAME: &str = "nga_geometry_index";

/// Definition URL recorded alongside the extension registration.
pub const EXTENSION_DEFINITION: &str =
    "http://ngageoint.github.io/GeoPackage/docs/extensions/geometry-index.html";

/// Composite primary key of a geometry index row: feature table name plus
/// feature row id.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
pub struct GeometryIndexKey {
    /// Feature table name
    pub table_name: String,
    /// Feature row id within the table
    pub feature_id: i64,
}

impl GeometryIndexKey {
    /// Creates a key for a feature row.
    pub fn new(table_name: &str, feature_id: i64) -> Self {
        GeometryIndexKey {
            table_name: table_name.to_string(),
            feature_id,
        }
    }
}

impl std::fmt::Display for GeometryIndexKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.table_name, self.feature_id)
    }
}

/// One row of the geometry index: a feature's envelope bounds keyed by
/// (table, feature id).
///
/// X/Y bounds are always present; Z and M ranges are stored only when the
/// indexed envelope carried them. Rows are owned by the feature table index
/// and never mutated by any other component.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct GeometryIndexEntry {
    /// Feature table name
    pub table_name: String,
    /// Feature row id within the table
    pub feature_id: i64,
    /// Minimum X bound
    pub min_x: f64,
    /// Maximum X bound
    pub max_x: f64,
    /// Minimum Y bound
    pub min_y: f64,
    /// Maximum Y bound
    pub max_y: f64,
    /// Minimum Z bound, when indexed with a Z range
    pub min_z: Option<f64>,
    /// Maximum Z bound, when indexed with a Z range
    pub max_z: Option<f64>,
    /// Minimum M bound, when indexed with an M range
    pub min_m: Option<f64>,
    /// Maximum M bound, when indexed with an M range
    pub max_m: Option<f64>,
}

impl GeometryIndexEntry {
    /// Creates an index row from a feature's envelope.
    pub fn new(table_name: &str, feature_id: i64, envelope: &GeometryEnvelope) -> Self {
        GeometryIndexEntry {
            table_name: table_name.to_string(),
            feature_id,
            min_x: envelope.min_x,
            max_x: envelope.max_x,
            min_y: envelope.min_y,
            max_y: envelope.max_y,
            min_z: envelope.min_z,
            max_z: envelope.max_z,
            min_m: envelope.min_m,
            max_m: envelope.max_m,
        }
    }

    /// The composite key of this row.
    pub fn key(&self) -> GeometryIndexKey {
        GeometryIndexKey::new(&self.table_name, self.feature_id)
    }

    /// Rebuilds the envelope these bounds were indexed from.
    pub fn envelope(&self) -> GeometryEnvelope {
        GeometryEnvelope {
            min_x: self.min_x,
            max_x: self.max_x,
            min_y: self.min_y,
            max_y: self.max_y,
            min_z: self.min_z,
            max_z: self.max_z,
            min_m: self.min_m,
            max_m: self.max_m,
        }
    }

    /// The 2D bounding box of this row.
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::new(self.min_x, self.min_y, self.max_x, self.max_y)
    }
}

/// One row of the table index: a feature table name and the time its
/// geometry index was last fully built.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TableIndexRecord {
    /// Feature table name, the primary key
    pub table_name: String,
    /// When the table was last fully indexed, if ever
    pub last_indexed: Option<DateTime<Utc>>,
}

impl TableIndexRecord {
    /// Creates a record for a table that has not been indexed yet.
    pub fn new(table_name: &str) -> Self {
        TableIndexRecord {
            table_name: table_name.to_string(),
            last_indexed: None,
        }
    }

    /// Creates a record stamped with an indexing time.
    pub fn indexed_at(table_name: &str, last_indexed: DateTime<Utc>) -> Self {
        TableIndexRecord {
            table_name: table_name.to_string(),
            last_indexed: Some(last_indexed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn envelope() -> GeometryEnvelope {
        GeometryEnvelope::new(-1.0, 2.0, -3.0, 4.0)
    }

    #[test]
    fn test_key_equality_and_hash() {
        let key1 = GeometryIndexKey::new("roads", 7);
        let key2 = GeometryIndexKey::new("roads", 7);
        let key3 = GeometryIndexKey::new("roads", 8);
        let key4 = GeometryIndexKey::new("rivers", 7);

        assert_eq!(key1, key2);
        assert_ne!(key1, key3);
        assert_ne!(key1, key4);

        let mut set = HashSet::new();
        set.insert(key1.clone());
        assert!(set.contains(&key2));
        assert!(!set.contains(&key3));
    }

    #[test]
    fn test_key_ordering() {
        let mut keys = vec![
            GeometryIndexKey::new("roads", 2),
            GeometryIndexKey::new("rivers", 9),
            GeometryIndexKey::new("roads", 1),
        ];
        keys.sort();
        assert_eq!(keys[0], GeometryIndexKey::new("rivers", 9));
        assert_eq!(keys[1], GeometryIndexKey::new("roads", 1));
        assert_eq!(keys[2], GeometryIndexKey::new("roads", 2));
    }

    #[test]
    fn test_key_display() {
        let key = GeometryIndexKey::new("roads", 42);
        assert_eq!(format!("{}", key), "roads:42");
    }

    #[test]
    fn test_entry_from_envelope() {
        let entry = GeometryIndexEntry::new("roads", 5, &envelope());
        assert_eq!(entry.table_name, "roads");
        assert_eq!(entry.feature_id, 5);
        assert_eq!(entry.min_x, -1.0);
        assert_eq!(entry.max_x, 2.0);
        assert_eq!(entry.min_y, -3.0);
        assert_eq!(entry.max_y, 4.0);
        assert!(entry.min_z.is_none());
        assert!(entry.min_m.is_none());
        assert_eq!(entry.key(), GeometryIndexKey::new("roads", 5));
    }

    #[test]
    fn test_entry_envelope_round_trip() {
        let mut source = envelope();
        source.min_z = Some(0.0);
        source.max_z = Some(10.0);

        let entry = GeometryIndexEntry::new("roads", 5, &source);
        assert_eq!(entry.envelope(), source);
    }

    #[test]
    fn test_entry_bounding_box() {
        let entry = GeometryIndexEntry::new("roads", 5, &envelope());
        assert_eq!(entry.bounding_box(), BoundingBox::new(-1.0, -3.0, 2.0, 4.0));
    }

    #[test]
    fn test_table_index_record() {
        let record = TableIndexRecord::new("roads");
        assert_eq!(record.table_name, "roads");
        assert!(record.last_indexed.is_none());

        let now = Utc::now();
        let stamped = TableIndexRecord::indexed_at("roads", now);
        assert_eq!(stamped.last_indexed, Some(now));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = GeometryIndexEntry::new("roads", 5, &envelope());
        let json = serde_json::to_string(&entry).unwrap();
        let deserialized: GeometryIndexEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, deserialized);
    }

    #[test]
    fn test_contract_names() {
        assert_eq!(TABLE_INDEX_TABLE, "nga_table_index");
        assert_eq!(GEOMETRY_INDEX_TABLE, "nga_geometry_index");
        assert_eq!(EXTENSION_NAME, "nga_geometry_index");
        assert_eq!(EXTENSION_AUTHOR, "nga");
    }
}
