/***************************************************************************************************
 * Copyright (c) 2023, Qualcomm Innovation Center, Inc. All rights reserved.
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy of this software
 * and associated documentation files (the “Software”), to deal in the Software without
 * restriction, including without limitation the rights to use, copy, modify, merge, publish,
 * distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all copies or
 * substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
 * BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
 * NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
 * DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
 **************************************************************************************************/
/***************************************************************************************************
 * tps_streamcbor wire format constants
 *
 * The wire format implemented here uses the additional information escape values 0x1c..0x1f
 * rather than the 24..27 of RFC8949, and places the simple/float space on major type 6 and
 * tags on major type 7. It is therefore NOT bit-compatible with an RFC8949 codec.
 **************************************************************************************************/

/// Mask selecting the additional information bits of an initial byte.
pub(crate) const AI_MASK: u8 = 0x1f;

/// Largest additional information value carrying its operand inline.
pub(crate) const PAYLOAD_AI_BITS: u8 = 0x1b;

/// Additional information escape: operand in the next byte.
pub(crate) const PAYLOAD_ONE_BYTE: u8 = 0x1c;
/// Additional information escape: operand in the next two bytes, big-endian.
pub(crate) const PAYLOAD_TWO_BYTES: u8 = 0x1d;
/// Additional information escape: operand in the next four bytes, big-endian.
pub(crate) const PAYLOAD_FOUR_BYTES: u8 = 0x1e;
/// Additional information escape: operand in the next eight bytes, big-endian.
pub(crate) const PAYLOAD_EIGHT_BYTES: u8 = 0x1f;

// Major types
pub(crate) const MT_UINT: u8 = 0;
pub(crate) const MT_NINT: u8 = 1;
pub(crate) const MT_BSTR: u8 = 2;
pub(crate) const MT_TSTR: u8 = 3;
pub(crate) const MT_ARRAY: u8 = 4;
pub(crate) const MT_MAP: u8 = 5;
pub(crate) const MT_SIMPLE: u8 = 6;
pub(crate) const MT_TAG: u8 = 7;

// Additional information values in the simple/float space (major type 6)
pub(crate) const AI_FALSE: u8 = 24;
pub(crate) const AI_TRUE: u8 = 25;
pub(crate) const AI_NULL: u8 = 26;
pub(crate) const AI_UNDEFINED: u8 = 27;
pub(crate) const AI_SIMPLE_BYTE: u8 = 28;
pub(crate) const AI_FLOAT16: u8 = 29;
pub(crate) const AI_FLOAT32: u8 = 30;
pub(crate) const AI_FLOAT64: u8 = 31;

// Distinctive initial bytes
pub(crate) const BYTE_FALSE: u8 = 0xd8;
pub(crate) const BYTE_TRUE: u8 = 0xd9;
pub(crate) const BYTE_NULL: u8 = 0xda;
pub(crate) const BYTE_UNDEFINED: u8 = 0xdb;
pub(crate) const BYTE_FLOAT64: u8 = 0xdf;

/// Largest integer operand the encoder will frame. Anything larger fails with
/// [`crate::error::CBORError::OutOfRange`].
pub const MAX_ENCODE_INT: u64 = 0x7fff_ffff;

// Semantic tag numbers with default decoders
pub(crate) const TAG_DATE: u64 = 11;
pub(crate) const TAG_URI: u64 = 15;
pub(crate) const TAG_REGEXP: u64 = 23;
