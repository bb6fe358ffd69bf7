//! The GeoPackage geometry binary container codec.
//!
//! Layout, which must match other implementations of the format byte for
//! byte:
//!
//! ```text
//! offset 0  2 bytes   magic "GP"
//! offset 2  1 byte    version (0)
//! offset 3  1 byte    flags
//! offset 4  4 bytes   SRS id (signed, flag byte order)
//! offset 8  0..64     envelope doubles (per indicator, flag byte order)
//! then                well-known binary payload (absent when empty)
//! ```
//!
//! Flags byte, bit 0 = least significant: bit 0 byte order (0 big, 1
//! little), bits 1-3 envelope indicator (0-4), bit 4 empty geometry, bit 5
//! extended type, bits 6-7 reserved and must be zero.

use geo_types::Geometry;

use crate::config::{self, GeometryDataConfig};
use crate::errors::{ErrorKind, GeoPackageError, GeoPackageResult};
use crate::geom::envelope::GeometryEnvelope;
use crate::geom::wkb_io;

/// The two magic bytes opening every geometry blob.
pub const GEOMETRY_MAGIC: [u8; 2] = *b"GP";

/// The only supported geometry blob version.
pub const GEOMETRY_VERSION: u8 = 0;

const FLAG_BYTE_ORDER: u8 = 0b0000_0001;
const FLAG_ENVELOPE_MASK: u8 = 0b0000_1110;
const FLAG_EMPTY: u8 = 0b0001_0000;
const FLAG_EXTENDED: u8 = 0b0010_0000;
const FLAG_RESERVED_MASK: u8 = 0b1100_0000;

/// Byte order of a blob's header and envelope doubles.
///
/// The WKB payload carries its own per-geometry byte order markers and is
/// independent of this setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Most significant byte first
    Big,
    /// Least significant byte first
    Little,
}

impl ByteOrder {
    fn from_flags(flags: u8) -> ByteOrder {
        if flags & FLAG_BYTE_ORDER != 0 {
            ByteOrder::Little
        } else {
            ByteOrder::Big
        }
    }

    fn flag_bit(self) -> u8 {
        match self {
            ByteOrder::Big => 0,
            ByteOrder::Little => FLAG_BYTE_ORDER,
        }
    }
}

/// Order-aware cursor over a geometry blob.
struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
    order: ByteOrder,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        ByteReader {
            buf,
            pos: 0,
            order: ByteOrder::Big,
        }
    }

    fn set_order(&mut self, order: ByteOrder) {
        self.order = order;
    }

    fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, count: usize) -> GeoPackageResult<&'a [u8]> {
        if self.pos + count > self.buf.len() {
            return Err(GeoPackageError::new(
                "Unexpected end of geometry data",
                ErrorKind::MalformedGeometry,
            ));
        }
        let slice = &self.buf[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    fn read_u8(&mut self) -> GeoPackageResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn read_i32(&mut self) -> GeoPackageResult<i32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().expect("4 byte slice");
        Ok(match self.order {
            ByteOrder::Big => i32::from_be_bytes(bytes),
            ByteOrder::Little => i32::from_le_bytes(bytes),
        })
    }

    fn read_f64(&mut self) -> GeoPackageResult<f64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().expect("8 byte slice");
        Ok(match self.order {
            ByteOrder::Big => f64::from_be_bytes(bytes),
            ByteOrder::Little => f64::from_le_bytes(bytes),
        })
    }
}

/// Order-aware encoder for a geometry blob.
struct ByteWriter {
    buf: Vec<u8>,
    order: ByteOrder,
}

impl ByteWriter {
    fn new(order: ByteOrder) -> Self {
        ByteWriter {
            buf: Vec::new(),
            order,
        }
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn put_i32(&mut self, value: i32) {
        match self.order {
            ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }

    fn put_f64(&mut self, value: f64) {
        match self.order {
            ByteOrder::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
            ByteOrder::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
        }
    }
}

/// A geometry value together with its envelope and SRS id, encodable to and
/// decodable from the fixed binary container.
///
/// A value is constructed either from raw blob bytes
/// ([`GeoPackageGeometryData::from_bytes`]) or from a geometry
/// ([`GeoPackageGeometryData::from_geometry`]). The empty and extended-type
/// flags derive from the held geometry and the envelope indicator derives
/// from the held envelope; none of them is independently settable. Encoding
/// is cached; any setter invalidates the cache.
///
/// # Examples
///
/// ```rust,ignore
/// use geopack::{GeoPackageGeometryData, GeometryEnvelope};
/// use geo_types::{point, Geometry};
///
/// let mut data = GeoPackageGeometryData::from_geometry(
///     Geometry::Point(point!(x: 1.5, y: -2.5)),
/// );
/// data.set_srs_id(4326);
/// let blob = data.to_bytes()?;
/// let decoded = GeoPackageGeometryData::from_bytes(&blob)?;
/// # Ok::<(), geopack::GeoPackageError>(())
/// ```
#[derive(Debug, Clone)]
pub struct GeoPackageGeometryData {
    byte_order: ByteOrder,
    srs_id: i32,
    envelope: Option<GeometryEnvelope>,
    geometry: Option<Geometry<f64>>,
    empty: bool,
    extended: bool,
    bytes: Option<Vec<u8>>,
    wkb_offset: usize,
}

impl GeoPackageGeometryData {
    /// Creates empty geometry data with the process-wide default SRS id and
    /// byte order.
    pub fn new() -> Self {
        Self::with_config(config::default_config())
    }

    /// Creates empty geometry data with an explicit configuration.
    pub fn with_config(config: GeometryDataConfig) -> Self {
        GeoPackageGeometryData {
            byte_order: config.byte_order,
            srs_id: config.srs_id,
            envelope: None,
            geometry: None,
            empty: true,
            extended: false,
            bytes: None,
            wkb_offset: 0,
        }
    }

    /// Creates geometry data holding the given geometry, with the
    /// process-wide default SRS id and byte order.
    pub fn from_geometry(geometry: Geometry<f64>) -> Self {
        let mut data = Self::new();
        data.set_geometry(Some(geometry));
        data
    }

    /// Decodes a geometry blob.
    ///
    /// Any header validation failure (bad magic, unsupported version,
    /// reserved flag bits, envelope indicator above 4, truncation) is fatal
    /// for this blob and reported as [`ErrorKind::MalformedGeometry`]; no
    /// partial value is produced.
    pub fn from_bytes(bytes: &[u8]) -> GeoPackageResult<Self> {
        let mut reader = ByteReader::new(bytes);

        let magic = [reader.read_u8()?, reader.read_u8()?];
        if magic != GEOMETRY_MAGIC {
            return Err(GeoPackageError::new(
                &format!(
                    "Unexpected geometry magic: expected {:?}, found {:?}",
                    GEOMETRY_MAGIC, magic
                ),
                ErrorKind::MalformedGeometry,
            ));
        }

        let version = reader.read_u8()?;
        if version != GEOMETRY_VERSION {
            return Err(GeoPackageError::new(
                &format!(
                    "Unsupported geometry version: {}, expected {}",
                    version, GEOMETRY_VERSION
                ),
                ErrorKind::MalformedGeometry,
            ));
        }

        let flags = reader.read_u8()?;
        if flags & FLAG_RESERVED_MASK != 0 {
            return Err(GeoPackageError::new(
                &format!("Reserved geometry flag bits are set: {:#010b}", flags),
                ErrorKind::MalformedGeometry,
            ));
        }
        let byte_order = ByteOrder::from_flags(flags);
        let indicator = (flags & FLAG_ENVELOPE_MASK) >> 1;
        GeometryEnvelope::byte_len_for_indicator(indicator)?;
        let empty = flags & FLAG_EMPTY != 0;
        let extended = flags & FLAG_EXTENDED != 0;

        reader.set_order(byte_order);
        let srs_id = reader.read_i32()?;

        let envelope = if indicator > 0 {
            let mut envelope = GeometryEnvelope::new(
                reader.read_f64()?,
                reader.read_f64()?,
                reader.read_f64()?,
                reader.read_f64()?,
            );
            if indicator == 2 || indicator == 4 {
                envelope.min_z = Some(reader.read_f64()?);
                envelope.max_z = Some(reader.read_f64()?);
            }
            if indicator == 3 || indicator == 4 {
                envelope.min_m = Some(reader.read_f64()?);
                envelope.max_m = Some(reader.read_f64()?);
            }
            Some(envelope)
        } else {
            None
        };

        let wkb_offset = reader.position();
        let geometry = if empty {
            None
        } else {
            Some(wkb_io::read_geometry(&bytes[wkb_offset..])?)
        };

        Ok(GeoPackageGeometryData {
            byte_order,
            srs_id,
            envelope,
            geometry,
            empty,
            extended,
            bytes: Some(bytes.to_vec()),
            wkb_offset,
        })
    }

    /// Encodes this value into its blob form, mirroring the decode layout.
    ///
    /// The encoding is cached until a setter mutates the value.
    pub fn to_bytes(&mut self) -> GeoPackageResult<Vec<u8>> {
        if let Some(bytes) = &self.bytes {
            return Ok(bytes.clone());
        }

        let mut writer = ByteWriter::new(self.byte_order);
        writer.put_u8(GEOMETRY_MAGIC[0]);
        writer.put_u8(GEOMETRY_MAGIC[1]);
        writer.put_u8(GEOMETRY_VERSION);

        let indicator = self.envelope.as_ref().map_or(0, GeometryEnvelope::indicator);
        let mut flags = self.byte_order.flag_bit();
        flags |= indicator << 1;
        if self.empty {
            flags |= FLAG_EMPTY;
        }
        if self.extended {
            flags |= FLAG_EXTENDED;
        }
        writer.put_u8(flags);

        writer.put_i32(self.srs_id);

        if let Some(envelope) = &self.envelope {
            writer.put_f64(envelope.min_x);
            writer.put_f64(envelope.max_x);
            writer.put_f64(envelope.min_y);
            writer.put_f64(envelope.max_y);
            if let (Some(min_z), Some(max_z)) = (envelope.min_z, envelope.max_z) {
                writer.put_f64(min_z);
                writer.put_f64(max_z);
            }
            if let (Some(min_m), Some(max_m)) = (envelope.min_m, envelope.max_m) {
                writer.put_f64(min_m);
                writer.put_f64(max_m);
            }
        }

        let wkb_offset = writer.len();
        let mut buf = writer.buf;
        if let Some(geometry) = &self.geometry {
            buf.extend_from_slice(&wkb_io::write_geometry(geometry)?);
        }

        self.wkb_offset = wkb_offset;
        self.bytes = Some(buf.clone());
        Ok(buf)
    }

    /// The header portion of the encoding: magic, version, flags, SRS id,
    /// and envelope.
    pub fn header_bytes(&mut self) -> GeoPackageResult<Vec<u8>> {
        let bytes = self.to_bytes()?;
        Ok(bytes[..self.wkb_offset].to_vec())
    }

    /// The well-known binary portion of the encoding; empty when the value
    /// holds no geometry.
    pub fn wkb_bytes(&mut self) -> GeoPackageResult<Vec<u8>> {
        let bytes = self.to_bytes()?;
        Ok(bytes[self.wkb_offset..].to_vec())
    }

    /// Byte offset where the WKB payload begins within the encoding.
    pub fn wkb_offset(&self) -> usize {
        self.wkb_offset
    }

    /// The held envelope, or one computed from the held geometry when no
    /// envelope is attached. `None` when neither is available.
    pub fn build_envelope(&self) -> Option<GeometryEnvelope> {
        if let Some(envelope) = &self.envelope {
            return Some(envelope.clone());
        }
        self.geometry.as_ref().and_then(GeometryEnvelope::from_geometry)
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn srs_id(&self) -> i32 {
        self.srs_id
    }

    pub fn envelope(&self) -> Option<&GeometryEnvelope> {
        self.envelope.as_ref()
    }

    pub fn geometry(&self) -> Option<&Geometry<f64>> {
        self.geometry.as_ref()
    }

    /// True when the value holds no geometry.
    pub fn is_empty(&self) -> bool {
        self.empty
    }

    /// True when the blob declared a non-standard extension geometry type.
    ///
    /// The geometry model carries standard types only, so values holding a
    /// geometry encode this as false; the flag survives from decoded
    /// headers.
    pub fn is_extended(&self) -> bool {
        self.extended
    }

    /// Sets the held geometry, re-deriving the empty and extended flags.
    pub fn set_geometry(&mut self, geometry: Option<Geometry<f64>>) {
        self.empty = geometry.is_none();
        self.extended = false;
        self.geometry = geometry;
        self.bytes = None;
    }

    /// Attaches or clears the envelope.
    pub fn set_envelope(&mut self, envelope: Option<GeometryEnvelope>) {
        self.envelope = envelope;
        self.bytes = None;
    }

    pub fn set_srs_id(&mut self, srs_id: i32) {
        self.srs_id = srs_id;
        self.bytes = None;
    }

    pub fn set_byte_order(&mut self, byte_order: ByteOrder) {
        self.byte_order = byte_order;
        self.bytes = None;
    }
}

impl Default for GeoPackageGeometryData {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeometryDataConfig;
    use geo_types::{line_string, point, Geometry};

    fn little_endian_config() -> GeometryDataConfig {
        GeometryDataConfig {
            srs_id: 4326,
            byte_order: ByteOrder::Little,
        }
    }

    fn point_data() -> GeoPackageGeometryData {
        let mut data = GeoPackageGeometryData::with_config(little_endian_config());
        let geometry = Geometry::Point(point!(x: 1.5, y: -2.5));
        data.set_envelope(GeometryEnvelope::from_geometry(&geometry));
        data.set_geometry(Some(geometry));
        data
    }

    #[test]
    fn test_point_blob_layout() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");

        assert_eq!(&bytes[0..2], b"GP");
        assert_eq!(bytes[2], 0);
        // little endian, XY envelope indicator, not empty, not extended
        assert_eq!(bytes[3], 0b0000_0011);
        assert_eq!(&bytes[4..8], &4326i32.to_le_bytes());
        // envelope doubles: min x, max x, min y, max y
        assert_eq!(&bytes[8..16], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[16..24], &1.5f64.to_le_bytes());
        assert_eq!(&bytes[24..32], &(-2.5f64).to_le_bytes());
        assert_eq!(&bytes[32..40], &(-2.5f64).to_le_bytes());
        assert_eq!(data.wkb_offset(), 40);
        assert!(bytes.len() > 40);
    }

    #[test]
    fn test_point_end_to_end() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");

        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.srs_id(), 4326);
        assert_eq!(decoded.byte_order(), ByteOrder::Little);
        assert!(!decoded.is_empty());
        assert!(!decoded.is_extended());
        assert_eq!(
            decoded.geometry(),
            Some(&Geometry::Point(point!(x: 1.5, y: -2.5)))
        );
        let envelope = decoded.envelope().expect("envelope");
        assert_eq!(envelope.indicator(), 1);
        assert_eq!(envelope.min_x, 1.5);
        assert_eq!(envelope.max_y, -2.5);
    }

    #[test]
    fn test_big_endian_round_trip() {
        let geometry = Geometry::LineString(line_string![
            (x: 0.0, y: 0.0),
            (x: 5.0, y: 10.0),
        ]);
        let mut data = GeoPackageGeometryData::with_config(GeometryDataConfig {
            srs_id: -1,
            byte_order: ByteOrder::Big,
        });
        data.set_envelope(GeometryEnvelope::from_geometry(&geometry));
        data.set_geometry(Some(geometry.clone()));

        let bytes = data.to_bytes().expect("encode");
        // byte order bit clear, SRS id big endian
        assert_eq!(bytes[3] & 0b0000_0001, 0);
        assert_eq!(&bytes[4..8], &(-1i32).to_be_bytes());

        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.byte_order(), ByteOrder::Big);
        assert_eq!(decoded.srs_id(), -1);
        assert_eq!(decoded.geometry(), Some(&geometry));
        assert_eq!(
            decoded.envelope(),
            GeometryEnvelope::from_geometry(&geometry).as_ref()
        );
    }

    #[test]
    fn test_round_trip_envelope_equals_built_envelope() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");
        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");

        let built = decoded.build_envelope().expect("built envelope");
        assert_eq!(decoded.envelope(), Some(&built));
    }

    #[test]
    fn test_zm_envelope_round_trip() {
        let geometry = Geometry::Point(point!(x: 1.0, y: 2.0));
        let mut envelope = GeometryEnvelope::from_geometry(&geometry).expect("envelope");
        envelope.min_z = Some(-5.0);
        envelope.max_z = Some(5.0);
        envelope.min_m = Some(0.0);
        envelope.max_m = Some(100.0);

        let mut data = GeoPackageGeometryData::with_config(little_endian_config());
        data.set_envelope(Some(envelope.clone()));
        data.set_geometry(Some(geometry));

        let bytes = data.to_bytes().expect("encode");
        // XYZM indicator
        assert_eq!((bytes[3] & 0b0000_1110) >> 1, 4);
        assert_eq!(data.wkb_offset(), 8 + 64);

        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.envelope(), Some(&envelope));
    }

    #[test]
    fn test_empty_geometry_round_trip() {
        let mut data = GeoPackageGeometryData::with_config(little_endian_config());
        assert!(data.is_empty());

        let bytes = data.to_bytes().expect("encode");
        assert_eq!(bytes.len(), 8);
        assert_ne!(bytes[3] & 0b0001_0000, 0);

        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");
        assert!(decoded.is_empty());
        assert!(decoded.geometry().is_none());
        assert!(decoded.envelope().is_none());
        assert!(decoded.build_envelope().is_none());
    }

    #[test]
    fn test_no_envelope_wkb_offset() {
        let mut data = GeoPackageGeometryData::with_config(little_endian_config());
        data.set_geometry(Some(Geometry::Point(point!(x: 1.0, y: 1.0))));

        let bytes = data.to_bytes().expect("encode");
        assert_eq!((bytes[3] & 0b0000_1110) >> 1, 0);
        assert_eq!(data.wkb_offset(), 8);

        let decoded = GeoPackageGeometryData::from_bytes(&bytes).expect("decode");
        assert_eq!(decoded.wkb_offset(), 8);
        assert!(decoded.envelope().is_none());
        // envelope is still buildable from the geometry
        let built = decoded.build_envelope().expect("built envelope");
        assert_eq!(built.min_x, 1.0);
    }

    #[test]
    fn test_header_and_wkb_byte_accessors() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");
        let header = data.header_bytes().expect("header");
        let wkb = data.wkb_bytes().expect("wkb");

        assert_eq!(header.len(), 40);
        assert_eq!(header, &bytes[..40]);
        assert_eq!(wkb, &bytes[40..]);

        let geometry = crate::geom::wkb_io::read_geometry(&wkb).expect("payload decodes");
        assert_eq!(geometry, Geometry::Point(point!(x: 1.5, y: -2.5)));
    }

    #[test]
    fn test_encoding_cache_invalidated_by_setters() {
        let mut data = point_data();
        let first = data.to_bytes().expect("encode");
        assert_eq!(data.to_bytes().expect("cached"), first);

        data.set_srs_id(3857);
        let second = data.to_bytes().expect("re-encode");
        assert_ne!(first, second);
        assert_eq!(&second[4..8], &3857i32.to_le_bytes());
    }

    #[test]
    fn test_rejects_bad_magic() {
        let mut data = point_data();
        let mut bytes = data.to_bytes().expect("encode");
        bytes[0] = b'X';
        bytes[1] = b'X';

        let err = GeoPackageGeometryData::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedGeometry);
        assert!(err.message().contains("magic"));
    }

    #[test]
    fn test_rejects_bad_version() {
        let mut data = point_data();
        let mut bytes = data.to_bytes().expect("encode");
        bytes[2] = 1;

        let err = GeoPackageGeometryData::from_bytes(&bytes).unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::MalformedGeometry);
        assert!(err.message().contains("version"));
    }

    #[test]
    fn test_rejects_reserved_flag_bits() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");

        for reserved_bit in [0b0100_0000u8, 0b1000_0000u8] {
            let mut mutated = bytes.clone();
            mutated[3] |= reserved_bit;
            let err = GeoPackageGeometryData::from_bytes(&mutated).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedGeometry);
            assert!(err.message().contains("Reserved"));
        }
    }

    #[test]
    fn test_rejects_envelope_indicator_above_four() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");

        for indicator in 5u8..=7 {
            let mut mutated = bytes.clone();
            mutated[3] = (mutated[3] & !0b0000_1110) | (indicator << 1);
            let err = GeoPackageGeometryData::from_bytes(&mutated).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedGeometry);
            assert!(err.message().contains("indicator"));
        }
    }

    #[test]
    fn test_rejects_truncated_header() {
        let mut data = point_data();
        let bytes = data.to_bytes().expect("encode");

        for len in [0, 1, 3, 7, 20] {
            let err = GeoPackageGeometryData::from_bytes(&bytes[..len]).unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::MalformedGeometry);
        }
    }

    #[test]
    fn test_set_geometry_rederives_empty() {
        let mut data = GeoPackageGeometryData::with_config(little_endian_config());
        assert!(data.is_empty());

        data.set_geometry(Some(Geometry::Point(point!(x: 0.0, y: 0.0))));
        assert!(!data.is_empty());

        data.set_geometry(None);
        assert!(data.is_empty());
    }
}
