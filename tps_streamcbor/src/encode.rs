/***************************************************************************************************
 * Copyright (c) 2023, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice (including the next
 * paragraph) shall be included in all copies or substantial portions of the
 * Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * CBOR Encoder
 *
 * Serializes a CBOR item as a single top-level wire item. Encoding is synchronous and never
 * suspends; on error the buffer contents are unspecified and should be discarded.
 **************************************************************************************************/
use crate::ast::CBOR;
use crate::constants::*;
use crate::error::{CBORError, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/***************************************************************************************************
 * Encode Buffer
 **************************************************************************************************/

/// An append-oriented byte accumulator, the write half of the codec's byte buffer.
///
/// All multi-byte writes are big-endian. Writes are infallible; the buffer grows as needed.
///
/// ## Example
/// ```
/// use tps_streamcbor::encoder::EncodeBuffer;
/// let mut buf = EncodeBuffer::new();
/// buf.write_u8(0x1d);
/// buf.write_u16(1000);
/// assert_eq!(buf.bytes(), &[0x1d, 0x03, 0xe8]);
/// ```
#[derive(PartialEq, Debug, Clone, Default)]
pub struct EncodeBuffer {
    bytes: Vec<u8>,
}

impl EncodeBuffer {
    /// Construct a new, empty `EncodeBuffer`.
    pub fn new() -> EncodeBuffer {
        EncodeBuffer::default()
    }

    /// Append a single byte.
    #[inline]
    pub fn write_u8(&mut self, v: u8) {
        self.bytes.push(v);
    }

    /// Append an unsigned 16 bit value, big-endian.
    #[inline]
    pub fn write_u16(&mut self, v: u16) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    /// Append an unsigned 32 bit value, big-endian.
    #[inline]
    pub fn write_u32(&mut self, v: u32) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    /// Append an IEEE-754 double, 8 bytes big-endian.
    #[inline]
    pub fn write_f64(&mut self, v: f64) {
        self.bytes.extend_from_slice(&v.to_be_bytes());
    }

    /// Append the UTF8 bytes of a string.
    #[inline]
    pub fn write_str(&mut self, s: &str) {
        self.bytes.extend_from_slice(s.as_bytes());
    }

    /// Append a raw byte sequence.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Append the contents of another buffer.
    pub fn append(&mut self, other: &EncodeBuffer) {
        self.bytes.extend_from_slice(&other.bytes);
    }

    /// The accumulated bytes as a single contiguous sequence.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the buffer, returning the accumulated bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of accumulated bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// `true` if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Discard the accumulated bytes. Callers should do this after a failed pack, as there is
    /// no partial-output contract.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }
}

/***************************************************************************************************
 * Integer framing
 **************************************************************************************************/

/// Write the initial byte and operand for major type `mt` with operand `i`.
///
/// Operands up to 0x1b are carried inline in the initial byte; larger operands use the
/// 1/2/4 byte escapes. Operands above [`MAX_ENCODE_INT`] are refused: the encoder never
/// emits the eight byte escape.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn pack_int(buf: &mut EncodeBuffer, i: u64, mt: u8) -> Result<()> {
    if i <= PAYLOAD_AI_BITS as u64 {
        buf.write_u8((mt << 5) | (i as u8));
    } else if i <= 0xff {
        buf.write_u8((mt << 5) | PAYLOAD_ONE_BYTE);
        buf.write_u8(i as u8);
    } else if i <= 0xffff {
        buf.write_u8((mt << 5) | PAYLOAD_TWO_BYTES);
        buf.write_u16(i as u16);
    } else if i <= MAX_ENCODE_INT {
        buf.write_u8((mt << 5) | PAYLOAD_FOUR_BYTES);
        buf.write_u32(i as u32);
    } else {
        return Err(CBORError::OutOfRange);
    }
    Ok(())
}

/***************************************************************************************************
 * Semantic type registry
 **************************************************************************************************/

/// The composite kinds dispatched through the encoder's semantic type registry.
///
/// `Uri` has a kind but no default entry: packing a `CBOR::Uri` fails with `UnknownType`
/// unless the caller registers an encoder for it.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum SemanticType {
    Array,
    Date,
    Bytes,
    Stream,
    Regexp,
    Simple,
    Uri,
}

/// An encoder registry entry: emits the wire form of one composite kind.
///
/// The [`Encoder`] is passed back in so an entry can recursively pack inner items via
/// [`Encoder::pack_into`].
pub type PackFn = fn(&Encoder, &CBOR, &mut EncodeBuffer) -> Result<()>;

/// Map an item to the registry kind it dispatches under, if any. Items with `None` here are
/// framed directly by the encoder (integers, floats, text, sentinels, tags) or fall through
/// to the generic map encoding.
fn semantic_type_of(value: &CBOR) -> Option<SemanticType> {
    match value {
        CBOR::Array(_) => Some(SemanticType::Array),
        CBOR::DateTime(_) => Some(SemanticType::Date),
        CBOR::Bstr(_) => Some(SemanticType::Bytes),
        CBOR::Stream(_) => Some(SemanticType::Stream),
        CBOR::Regexp(_) => Some(SemanticType::Regexp),
        CBOR::Simple(_) => Some(SemanticType::Simple),
        CBOR::Uri(_) => Some(SemanticType::Uri),
        _ => None,
    }
}

/***************************************************************************************************
 * Encoder
 **************************************************************************************************/

/// The CBOR Encoder: walks an item and emits framed bytes.
///
/// ## Example
/// ```
/// use tps_streamcbor::encoder::Encoder;
/// use tps_streamcbor::error::CBORError;
/// use tps_streamcbor::types::CBOR;
///
/// fn main() -> Result<(), CBORError> {
///     let enc = Encoder::new();
///     assert_eq!(enc.pack(&CBOR::from(255u8))?, &[0x1c, 0xff]);
///     assert_eq!(enc.pack(&CBOR::from(-1))?, &[0x20]);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Encoder {
    types: Vec<(SemanticType, PackFn)>,
}

impl Default for Encoder {
    /// The default registry: Array, Date, Bytes, BufferStream, RegExp, Simple, consulted in
    /// that order.
    fn default() -> Encoder {
        Encoder {
            types: vec![
                (SemanticType::Array, pack_array as PackFn),
                (SemanticType::Date, pack_date as PackFn),
                (SemanticType::Bytes, pack_bytes as PackFn),
                (SemanticType::Stream, pack_stream as PackFn),
                (SemanticType::Regexp, pack_regexp as PackFn),
                (SemanticType::Simple, pack_simple as PackFn),
            ],
        }
    }
}

impl Encoder {
    /// Construct an `Encoder` with the default semantic type registry.
    pub fn new() -> Encoder {
        Encoder::default()
    }

    /// Serialize `value` as one top-level item, returning the encoded bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn pack(&self, value: &CBOR) -> Result<Vec<u8>> {
        let mut buf = EncodeBuffer::new();
        self.pack_item(value, &mut buf)?;
        Ok(buf.into_bytes())
    }

    /// Serialize `value` as one top-level item, appending into a caller-supplied buffer.
    #[cfg_attr(feature = "trace", trace)]
    pub fn pack_into(&self, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
        self.pack_item(value, buf)
    }

    /// Register or replace the encoder for a composite kind, returning the displaced entry
    /// if there was one. New kinds are consulted after all existing registrations.
    pub fn add_semantic_type(&mut self, kind: SemanticType, f: PackFn) -> Option<PackFn> {
        for entry in self.types.iter_mut() {
            if entry.0 == kind {
                return Some(std::mem::replace(&mut entry.1, f));
            }
        }
        self.types.push((kind, f));
        None
    }

    /// Single-item dispatch.
    fn pack_item(&self, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
        match value {
            CBOR::UInt(v) => pack_int(buf, *v, MT_UINT),
            CBOR::NInt(v) => pack_int(buf, *v, MT_NINT),
            CBOR::Float16(v) => pack_float(buf, v.to_f64()),
            CBOR::Float32(v) => pack_float(buf, *v as f64),
            CBOR::Float64(v) => pack_float(buf, *v),
            CBOR::Tstr(s) => {
                pack_int(buf, s.len() as u64, MT_TSTR)?;
                buf.write_str(s);
                Ok(())
            }
            CBOR::False => {
                buf.write_u8(BYTE_FALSE);
                Ok(())
            }
            CBOR::True => {
                buf.write_u8(BYTE_TRUE);
                Ok(())
            }
            CBOR::Null => {
                buf.write_u8(BYTE_NULL);
                Ok(())
            }
            CBOR::Undefined => {
                buf.write_u8(BYTE_UNDEFINED);
                Ok(())
            }
            CBOR::Tag(tag, inner) => {
                pack_int(buf, *tag, MT_TAG)?;
                self.pack_item(inner, buf)
            }
            CBOR::Map(pairs) => self.pack_pairs(pairs, buf),
            _ => {
                if let Some(kind) = semantic_type_of(value) {
                    for (registered, f) in &self.types {
                        if *registered == kind {
                            return f(self, value, buf);
                        }
                    }
                }
                Err(CBORError::UnknownType)
            }
        }
    }

    /// The generic map encoding: pair count under major type 5, then each key and value in
    /// written order. No key ordering or canonicalization is applied.
    fn pack_pairs(&self, pairs: &[(CBOR, CBOR)], buf: &mut EncodeBuffer) -> Result<()> {
        pack_int(buf, pairs.len() as u64, MT_MAP)?;
        for (key, value) in pairs {
            self.pack_item(key, buf)?;
            self.pack_item(value, buf)?;
        }
        Ok(())
    }
}

/// Floats are always written as a big-endian IEEE-754 double behind the float64 marker. No
/// downcast to half or single precision is attempted.
fn pack_float(buf: &mut EncodeBuffer, v: f64) -> Result<()> {
    buf.write_u8(BYTE_FLOAT64);
    buf.write_f64(v);
    Ok(())
}

/***************************************************************************************************
 * Default semantic encoders
 **************************************************************************************************/

/// Array: element count under major type 4, then each element.
pub fn pack_array(enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::Array(items) = value {
        pack_int(buf, items.len() as u64, MT_ARRAY)?;
        for item in items {
            enc.pack_into(item, buf)?;
        }
        Ok(())
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// Date: tag 11, then the UNIX epoch offset in seconds as a number. Whole-second dates take
/// the integer framing; fractional seconds are written as a float.
pub fn pack_date(enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::DateTime(dt) = value {
        pack_int(buf, TAG_DATE, MT_TAG)?;
        let secs = dt.timestamp_millis() as f64 / 1000.0;
        enc.pack_into(&CBOR::from(secs), buf)
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// Bytes: length under major type 2, then the raw bytes.
pub fn pack_bytes(_enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::Bstr(bytes) = value {
        pack_int(buf, bytes.len() as u64, MT_BSTR)?;
        buf.write_bytes(bytes);
        Ok(())
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// BufferStream: identical to Bytes after flattening the accumulated buffer.
pub fn pack_stream(_enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::Stream(stream) = value {
        pack_int(buf, stream.len() as u64, MT_BSTR)?;
        buf.write_bytes(stream.bytes());
        Ok(())
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// RegExp: tag 23, then the pattern source as text.
pub fn pack_regexp(_enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::Regexp(re) = value {
        pack_int(buf, TAG_REGEXP, MT_TAG)?;
        pack_int(buf, re.as_str().len() as u64, MT_TSTR)?;
        buf.write_str(re.as_str());
        Ok(())
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// Simple: the value framed under major type 6.
///
/// Values 24..=27 take the inline form, which on the wire coincides with the
/// false/true/null/undefined sentinels and therefore does not round-trip. Values 28..=255
/// use the one byte escape and round-trip exactly.
pub fn pack_simple(_enc: &Encoder, value: &CBOR, buf: &mut EncodeBuffer) -> Result<()> {
    if let CBOR::Simple(v) = value {
        pack_int(buf, *v as u64, MT_SIMPLE)
    } else {
        Err(CBORError::IncompatibleType)
    }
}

/// Serialize `value` with the default registry. Equivalent to `Encoder::new().pack(value)`.
pub fn pack(value: &CBOR) -> Result<Vec<u8>> {
    Encoder::new().pack(value)
}
