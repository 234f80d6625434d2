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
 * CBOR Abstract Syntax Tree
 *
 * A CBOR encoder and decoder with incremental decoding of streamed input. Decoded items are
 * fully owned: their lifetime is independent of the buffer they were parsed from, which may be
 * a transient window over a byte stream.
 **************************************************************************************************/
use crate::encode::EncodeBuffer;
use crate::error::{CBORError, Result};
use crate::tag::{Regexp, Uri};

use std::convert::TryFrom;

use chrono::{DateTime, FixedOffset};
use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// The data type for CBOR items.
///
/// CBOR item representations are as follows:
///
/// - Positive and negative integers are stored as a u64 with enum tags used to distinguish
///   positive (UInt) and negative (NInt) numbers. A negative number -n is stored as n - 1,
///   matching its wire representation.
/// - The bstr and tstr types own their payload, as do arrays and maps.
/// - Maps preserve the order in which pairs were written. Duplicate keys are permitted; see
///   [`CBOR::lookup`] for the resolution rule.
/// - Simple types are stored as a u8.
/// - Tagged items carry the tag value and a boxed inner item. Items produced by a registered
///   tag decoder use the richer variants (`DateTime`, `Uri`, `Regexp`) instead.
#[derive(PartialEq, Debug, Clone)]
pub enum CBOR {
    UInt(u64),
    NInt(u64),
    Float64(f64),
    Float32(f32),
    Float16(f16),
    Bstr(Vec<u8>),
    Tstr(String),
    Array(Vec<CBOR>),
    Map(Vec<(CBOR, CBOR)>),
    Tag(u64, Box<CBOR>),
    Simple(u8),
    False,
    True,
    Null,
    Undefined,
    DateTime(DateTime<FixedOffset>),
    Uri(Uri),
    Regexp(Regexp),
    Stream(EncodeBuffer),
}

impl CBOR {
    /// Construct a simple value, checking that it lies in the encodable domain 0..=255.
    #[cfg_attr(feature = "trace", trace)]
    pub fn simple(v: i64) -> Result<CBOR> {
        if (0..=255).contains(&v) {
            Ok(CBOR::Simple(v as u8))
        } else {
            Err(CBORError::BadSimpleValue)
        }
    }

    /// Look up `key` in a map item. Pairs are scanned from the most recently written
    /// backwards, so a duplicated key resolves to the last value written, as it would when
    /// reconstructing the map into an associative container.
    ///
    /// Returns `None` for a missing key and for items which are not maps.
    #[cfg_attr(feature = "trace", trace)]
    pub fn lookup(&self, key: &CBOR) -> Option<&CBOR> {
        if let CBOR::Map(pairs) = self {
            pairs.iter().rev().find(|(k, _)| k == key).map(|(_, v)| v)
        } else {
            None
        }
    }
}

/***************************************************************************************************
 * Standard Trait Implementations: From value to CBOR. Always succeeds
 **************************************************************************************************/

/// Convert a bool into CBOR
impl From<bool> for CBOR {
    #[inline(always)]
    fn from(v: bool) -> Self {
        if v {
            Self::True
        } else {
            Self::False
        }
    }
}

/// Convert a u8 into CBOR
impl From<u8> for CBOR {
    #[inline(always)]
    fn from(v: u8) -> Self {
        Self::UInt(v as u64)
    }
}

/// Convert a u16 into CBOR
impl From<u16> for CBOR {
    #[inline(always)]
    fn from(v: u16) -> Self {
        Self::UInt(v as u64)
    }
}

/// Convert a u32 into CBOR
impl From<u32> for CBOR {
    #[inline(always)]
    fn from(v: u32) -> Self {
        Self::UInt(v as u64)
    }
}

/// Convert a u64 into CBOR
impl From<u64> for CBOR {
    #[inline(always)]
    fn from(v: u64) -> Self {
        Self::UInt(v)
    }
}

/// Convert an i8 into CBOR
impl From<i8> for CBOR {
    #[inline]
    fn from(v: i8) -> Self {
        if v < 0 {
            Self::NInt((-1 - (v as i64)) as u64)
        } else {
            Self::UInt(v as u64)
        }
    }
}

/// Convert an i16 into CBOR
impl From<i16> for CBOR {
    #[inline]
    fn from(v: i16) -> Self {
        if v < 0 {
            Self::NInt((-1 - (v as i64)) as u64)
        } else {
            Self::UInt(v as u64)
        }
    }
}

/// Convert an i32 into CBOR
impl From<i32> for CBOR {
    #[inline]
    fn from(v: i32) -> Self {
        if v < 0 {
            Self::NInt((-1 - (v as i64)) as u64)
        } else {
            Self::UInt(v as u64)
        }
    }
}

/// Convert an i64 into CBOR
impl From<i64> for CBOR {
    #[inline]
    fn from(v: i64) -> Self {
        if v < 0 {
            Self::NInt((-1 - v) as u64)
        } else {
            Self::UInt(v as u64)
        }
    }
}

/// Convert an f64 into CBOR.
///
/// A finite value equal to its integer truncation becomes an integer item, so that numbers
/// arriving through a floating point channel still take the compact integer framing. NaN and
/// the infinities stay floats.
impl From<f64> for CBOR {
    fn from(v: f64) -> Self {
        if v.is_finite() && v.trunc() == v {
            if (0.0..=u64::MAX as f64).contains(&v) {
                return Self::UInt(v as u64);
            }
            let n = -1.0 - v;
            if v < 0.0 && n <= u64::MAX as f64 {
                return Self::NInt(n as u64);
            }
        }
        Self::Float64(v)
    }
}

/// Convert an f32 into CBOR, with the same integer dispatch as `f64`.
impl From<f32> for CBOR {
    fn from(v: f32) -> Self {
        if v.is_finite() && v.trunc() == v {
            match CBOR::from(v as f64) {
                f @ (CBOR::UInt(_) | CBOR::NInt(_)) => f,
                _ => Self::Float32(v),
            }
        } else {
            Self::Float32(v)
        }
    }
}

/// Convert an f16 into CBOR
impl From<f16> for CBOR {
    #[inline(always)]
    fn from(v: f16) -> Self {
        Self::Float16(v)
    }
}

/// Convert an &str into CBOR. The payload is copied.
impl From<&str> for CBOR {
    #[inline]
    fn from(v: &str) -> Self {
        Self::Tstr(v.to_owned())
    }
}

/// Convert a String into CBOR
impl From<String> for CBOR {
    #[inline]
    fn from(v: String) -> Self {
        Self::Tstr(v)
    }
}

/// Convert an &[u8] into CBOR. The payload is copied.
impl From<&[u8]> for CBOR {
    #[inline]
    fn from(v: &[u8]) -> Self {
        Self::Bstr(v.to_vec())
    }
}

/// Convert a Vec<u8> into CBOR
impl From<Vec<u8>> for CBOR {
    #[inline]
    fn from(v: Vec<u8>) -> Self {
        Self::Bstr(v)
    }
}

/// Convert a Vec<CBOR> into a CBOR array
impl From<Vec<CBOR>> for CBOR {
    #[inline]
    fn from(v: Vec<CBOR>) -> Self {
        Self::Array(v)
    }
}

/***************************************************************************************************
 * Standard Trait Implementations: Try to convert CBOR into a value. Always fallible
 **************************************************************************************************/

/// Attempt to convert CBOR into bool
impl TryFrom<&CBOR> for bool {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::True => Ok(true),
            CBOR::False => Ok(false),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into u8
impl TryFrom<&CBOR> for u8 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        if let CBOR::UInt(v) = value {
            if *v <= u8::MAX as u64 {
                Ok(*v as u8)
            } else {
                Err(CBORError::OutOfRange)
            }
        } else {
            Err(CBORError::IncompatibleType)
        }
    }
}

/// Attempt to convert CBOR into u16
impl TryFrom<&CBOR> for u16 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        if let CBOR::UInt(v) = value {
            if *v <= u16::MAX as u64 {
                Ok(*v as u16)
            } else {
                Err(CBORError::OutOfRange)
            }
        } else {
            Err(CBORError::IncompatibleType)
        }
    }
}

/// Attempt to convert CBOR into u32
impl TryFrom<&CBOR> for u32 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        if let CBOR::UInt(v) = value {
            if *v <= u32::MAX as u64 {
                Ok(*v as u32)
            } else {
                Err(CBORError::OutOfRange)
            }
        } else {
            Err(CBORError::IncompatibleType)
        }
    }
}

/// Attempt to convert CBOR into u64
impl TryFrom<&CBOR> for u64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        if let CBOR::UInt(v) = value {
            Ok(*v)
        } else {
            Err(CBORError::IncompatibleType)
        }
    }
}

/// Attempt to convert CBOR into i8
///
/// This will fail, for unsigned values, if n > i8::MAX
/// This will fail, for signed values, if n < i8::MIN
impl TryFrom<&CBOR> for i8 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(val) => {
                if *val <= i8::MAX as u64 {
                    Ok(*val as i8)
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            // The stored value n represents -1 - n, so n <= i8::MAX covers down to i8::MIN
            CBOR::NInt(val) => {
                if *val <= i8::MAX as u64 {
                    Ok(-1 - (*val as i8))
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into i16
///
/// This will fail, for unsigned values, if n > i16::MAX
/// This will fail, for signed values, if n < i16::MIN
impl TryFrom<&CBOR> for i16 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(val) => {
                if *val <= i16::MAX as u64 {
                    Ok(*val as i16)
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            CBOR::NInt(val) => {
                if *val <= i16::MAX as u64 {
                    Ok(-1 - (*val as i16))
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into i32
///
/// This will fail, for unsigned values, if n > i32::MAX
/// This will fail, for signed values, if n < i32::MIN
impl TryFrom<&CBOR> for i32 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(val) => {
                if *val <= i32::MAX as u64 {
                    Ok(*val as i32)
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            CBOR::NInt(val) => {
                if *val <= i32::MAX as u64 {
                    Ok(-1 - (*val as i32))
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into i64
///
/// This will fail, for unsigned values, if n > i64::MAX
/// This will fail, for signed values, if n < i64::MIN
impl TryFrom<&CBOR> for i64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(val) => {
                if *val <= i64::MAX as u64 {
                    Ok(*val as i64)
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            CBOR::NInt(val) => {
                if *val <= i64::MAX as u64 {
                    Ok(-1 - (*val as i64))
                } else {
                    Err(CBORError::OutOfRange)
                }
            }
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into i128
///
/// This always succeeds for integer items as CBOR integers fit on 65 bits.
impl TryFrom<&CBOR> for i128 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(v) => Ok(*v as i128),
            CBOR::NInt(v) => Ok(-1 - (*v as i128)),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert CBOR into f64. Integer items convert exactly where f64 can represent
/// them; float items of any width widen losslessly.
impl TryFrom<&CBOR> for f64 {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: &CBOR) -> Result<Self> {
        match value {
            CBOR::UInt(v) => Ok(*v as f64),
            CBOR::NInt(v) => Ok(-1.0 - (*v as f64)),
            CBOR::Float16(v) => Ok(v.to_f64()),
            CBOR::Float32(v) => Ok(*v as f64),
            CBOR::Float64(v) => Ok(*v),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert a CBOR item into a String
impl TryFrom<CBOR> for String {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self> {
        match value {
            CBOR::Tstr(s) => Ok(s),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert a CBOR item into a Vec<u8>
impl TryFrom<CBOR> for Vec<u8> {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self> {
        match value {
            CBOR::Bstr(bytes) => Ok(bytes),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert a CBOR array into its elements
impl TryFrom<CBOR> for Vec<CBOR> {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self> {
        match value {
            CBOR::Array(items) => Ok(items),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}

/// Attempt to convert a CBOR map into its pairs
impl TryFrom<CBOR> for Vec<(CBOR, CBOR)> {
    type Error = CBORError;

    #[cfg_attr(feature = "trace", trace)]
    fn try_from(value: CBOR) -> Result<Self> {
        match value {
            CBOR::Map(pairs) => Ok(pairs),
            _ => Err(CBORError::IncompatibleType),
        }
    }
}
