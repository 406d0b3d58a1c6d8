//! Packed binary payload codec.
//!
//! Each point is laid out as `3 + attribute_count` little-endian f64 values in
//! the order `x, y, z, attrs[0..]`. A payload is the concatenation of its points
//! with no header; the group size and attribute count travel alongside it.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::{error::PayloadError, point::Point};

const FIELD_WIDTH: usize = std::mem::size_of::<f64>();

/// Bytes occupied by one point with `attribute_count` attributes, or `None`
/// when that does not fit in a `usize`.
pub fn stride(attribute_count: usize) -> Option<usize> { attribute_count.checked_add(3)?.checked_mul(FIELD_WIDTH) }

pub fn encode(points: &[Point]) -> Bytes {
    let mut buf = BytesMut::with_capacity(points.iter().map(|p| p.field_count() * FIELD_WIDTH).sum());
    for point in points {
        encode_point(&mut buf, point);
    }
    buf.freeze()
}

pub fn encode_point(buf: &mut impl BufMut, point: &Point) {
    buf.put_f64_le(point.x);
    buf.put_f64_le(point.y);
    buf.put_f64_le(point.z);
    for attr in &point.attrs {
        buf.put_f64_le(*attr);
    }
}

pub fn decode(mut bytes: &[u8], attribute_count: usize) -> Result<Vec<Point>, PayloadError> {
    let stride = stride(attribute_count).ok_or(PayloadError::TooLarge(attribute_count))?;
    if bytes.len() % stride != 0 {
        return Err(PayloadError::Malformed { len: bytes.len(), stride });
    }

    let mut points = Vec::with_capacity(bytes.len() / stride);
    while bytes.has_remaining() {
        let x = bytes.get_f64_le();
        let y = bytes.get_f64_le();
        let z = bytes.get_f64_le();
        let attrs = (0..attribute_count).map(|_| bytes.get_f64_le()).collect();
        points.push(Point { x, y, z, attrs });
    }
    Ok(points)
}

/// One packed-blob row: a group of points encoded into a single payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedBlob {
    pub group_size: i32,
    pub attribute_count: i32,
    pub payload: Bytes,
}

impl PackedBlob {
    /// Packs `points`, all of which must carry `attribute_count` attributes.
    pub fn pack(points: &[Point], attribute_count: usize) -> Result<Self, PayloadError> {
        if let Some(point) = points.iter().find(|p| p.attribute_count() != attribute_count) {
            return Err(PayloadError::AttributeCount { expected: attribute_count, actual: point.attribute_count() });
        }
        let group_size = i32::try_from(points.len()).map_err(|_| PayloadError::TooLarge(points.len()))?;
        let attr_count = i32::try_from(attribute_count).map_err(|_| PayloadError::TooLarge(attribute_count))?;
        Ok(Self { group_size, attribute_count: attr_count, payload: encode(points) })
    }

    pub fn unpack(&self) -> Result<Vec<Point>, PayloadError> {
        let attribute_count = usize::try_from(self.attribute_count)
            .map_err(|_| PayloadError::NegativeHeader { field: "attr_count", value: self.attribute_count })?;
        let group_size =
            usize::try_from(self.group_size).map_err(|_| PayloadError::NegativeHeader { field: "group_size", value: self.group_size })?;
        let points = decode(&self.payload, attribute_count)?;
        if points.len() != group_size {
            return Err(PayloadError::GroupSize { expected: group_size, actual: points.len() });
        }
        Ok(points)
    }

    pub fn len(&self) -> usize { self.payload.len() }

    pub fn is_empty(&self) -> bool { self.payload.is_empty() }
}
