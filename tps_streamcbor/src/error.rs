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
 * tps_streamcbor Error API
 *
 * A CBOR encoder and decoder with incremental decoding of streamed input.
 **************************************************************************************************/
use std::result;

use thiserror::Error;

/// An alias for Result<T, CBORError> used throughout this crate.
pub type Result<T> = result::Result<T, CBORError>;

/// `CBORError` provides information about errors encoding or decoding CBOR items.
#[derive(Copy, Clone, PartialEq, Eq, Error, Debug)]
pub enum CBORError {
    /// A numeric operand exceeds the encoder's 31 bit limit, or a number conversion has
    /// overflowed or underflowed.
    #[error("Integer out of range")]
    OutOfRange,
    /// The encoder encountered a composite with no registered semantic encoder.
    #[error("Unknown type")]
    UnknownType,
    /// Attempt to convert an item to an incompatible type.
    #[error("Attempt to convert an item of incompatible type")]
    IncompatibleType,
    /// The source does not hold enough bytes to decode the next item. Recoverable for a
    /// streamed source: retry once more bytes have arrived.
    #[error("Buffer insufficient to process the next item")]
    EndOfBuffer,
    /// The input ended while an item was still being decoded.
    #[error("End of file")]
    EndOfFile,
    /// A text string contains an invalid UTF8 sequence.
    #[error("A text string contains an invalid UTF8 sequence")]
    UTF8Error,
    /// Encoding is illegal or unsupported.
    #[error("Encoding is illegal or unsupported")]
    MalformedEncoding,
    /// A tag was applied directly to another tag.
    #[error("Tag must not follow a tag")]
    TagAfterTag,
    /// A simple value lies outside 0..=255.
    #[error("Simple value out of range")]
    BadSimpleValue,
    /// A Date tag held an item which is neither a date/time string nor an epoch offset.
    #[error("Unsupported date type")]
    BadDateTime,
    /// A URI tag held a string which does not parse as a URI.
    #[error("Invalid URI")]
    BadUri,
    /// A RegExp tag held a string which does not compile as a regular expression.
    #[error("Invalid regular expression")]
    BadRegex,
}
