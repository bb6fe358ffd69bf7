//! Geometry value types and the binary container codec.

pub mod envelope;
pub mod geometry_data;
pub mod wkb_io;

pub use envelope::GeometryEnvelope;
pub use geometry_data::{ByteOrder, GeoPackageGeometryData, GEOMETRY_MAGIC, GEOMETRY_VERSION};
