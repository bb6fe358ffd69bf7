//! # GeoPack - GeoPackage Geometry Codec for Rust
//!
//! This crate implements the on-disk representation of geometry values in a
//! GeoPackage container: the binary geometry blob codec, the envelope and
//! bounding box value types, and the codec configuration surface. The blob
//! layout is byte-exact with other implementations of the published format,
//! including its rejection rules for reserved flag bits.
//!
//! ## Features
//!
//! - **Binary codec**: magic/version/flags header, byte-order-aware SRS id
//!   and envelope doubles, well-known binary payload
//! - **Strict validation**: bad magic, versions, reserved bits, and envelope
//!   indicators are fatal per blob, never coerced
//! - **Bounding boxes**: overlap, union, containment, and antimeridian-aware
//!   adjustment operations
//! - **Envelope building**: held envelope or computed from the geometry on
//!   demand
//! - **External geometry model**: geometries are `geo_types::Geometry<f64>`;
//!   payloads are read and written with the `wkb` crate
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geopack::{GeoPackageGeometryData, GeometryEnvelope};
//! use geo_types::{point, Geometry};
//!
//! # fn main() -> Result<(), geopack::GeoPackageError> {
//! let geometry = Geometry::Point(point!(x: 1.5, y: -2.5));
//! let mut data = GeoPackageGeometryData::from_geometry(geometry);
//! data.set_srs_id(4326);
//! data.set_envelope(data.build_envelope());
//!
//! let blob = data.to_bytes()?;
//! let decoded = GeoPackageGeometryData::from_bytes(&blob)?;
//! assert_eq!(decoded.srs_id(), 4326);
//! # Ok(())
//! # }
//! ```

pub mod bounding_box;
pub mod config;
pub mod errors;
pub mod geom;

// Re-export bounding box types
pub use bounding_box::{BoundingBox, WEB_MERCATOR_HALF_WORLD_WIDTH, WGS84_HALF_WORLD_LON_WIDTH};

// Re-export codec types
pub use geom::{ByteOrder, GeoPackageGeometryData, GeometryEnvelope};

// Re-export configuration surface
pub use config::{
    default_byte_order, default_config, default_srs_id, set_default_byte_order,
    set_default_config, set_default_srs_id, GeometryDataConfig,
};

// Re-export error types
pub use errors::{ErrorKind, GeoPackageError, GeoPackageResult};
