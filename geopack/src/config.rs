//! Codec configuration.
//!
//! A [`GeometryDataConfig`] is passed into geometry data construction; the
//! process-wide defaults exist only as the outermost caller's convenience
//! and are read once at construction, never deep inside the codec.

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::geom::geometry_data::ByteOrder;

/// Construction-time configuration for geometry data blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryDataConfig {
    /// Spatial reference system id written into new blobs
    pub srs_id: i32,
    /// Header and envelope byte order of new blobs
    pub byte_order: ByteOrder,
}

impl Default for GeometryDataConfig {
    fn default() -> Self {
        GeometryDataConfig {
            srs_id: 0,
            byte_order: ByteOrder::Big,
        }
    }
}

static DEFAULT_CONFIG: Lazy<RwLock<GeometryDataConfig>> =
    Lazy::new(|| RwLock::new(GeometryDataConfig::default()));

/// The process-wide defaults used by `GeoPackageGeometryData::new`.
pub fn default_config() -> GeometryDataConfig {
    *DEFAULT_CONFIG.read()
}

/// Replaces the process-wide construction defaults.
pub fn set_default_config(config: GeometryDataConfig) {
    *DEFAULT_CONFIG.write() = config;
}

/// The process-wide default SRS id.
pub fn default_srs_id() -> i32 {
    DEFAULT_CONFIG.read().srs_id
}

/// Sets the process-wide default SRS id.
pub fn set_default_srs_id(srs_id: i32) {
    DEFAULT_CONFIG.write().srs_id = srs_id;
}

/// The process-wide default byte order.
pub fn default_byte_order() -> ByteOrder {
    DEFAULT_CONFIG.read().byte_order
}

/// Sets the process-wide default byte order.
pub fn set_default_byte_order(byte_order: ByteOrder) {
    DEFAULT_CONFIG.write().byte_order = byte_order;
}
