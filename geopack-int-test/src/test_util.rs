//! Shared builders for integration tests.

use geo_types::{line_string, Geometry};
use geopack::{
    ByteOrder, GeoPackageGeometryData, GeometryDataConfig, GeometryEnvelope,
};
use geopack_spatial::MemoryFeatureTable;

/// Encodes a geometry into a little-endian blob with an attached envelope.
pub fn encode_feature(geometry: Geometry<f64>, srs_id: i32) -> Vec<u8> {
    let mut data = GeoPackageGeometryData::with_config(GeometryDataConfig {
        srs_id,
        byte_order: ByteOrder::Little,
    });
    data.set_envelope(GeometryEnvelope::from_geometry(&geometry));
    data.set_geometry(Some(geometry));
    data.to_bytes().expect("geometry encodes")
}

/// A diagonal line across the unit square anchored at `(i, i)`, giving the
/// feature an envelope of `[i, i, i + 1, i + 1]`.
pub fn unit_square(i: f64) -> Geometry<f64> {
    Geometry::LineString(line_string![
        (x: i, y: i),
        (x: i + 1.0, y: i + 1.0),
    ])
}

/// A feature table named `table_name` holding `count` unit squares with SRS
/// id 4326; feature ids are assigned 1 through `count`.
pub fn populated_table(table_name: &str, count: usize) -> MemoryFeatureTable {
    let table = MemoryFeatureTable::new(table_name, "geom", 4326);
    for i in 0..count {
        table.insert(Some(encode_feature(unit_square(i as f64), 4326)));
    }
    table
}
