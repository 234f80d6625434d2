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
 * tps_streamcbor module definition
 *
 * A CBOR encoder and decoder with incremental decoding of streamed input.
 **************************************************************************************************/

#![warn(missing_docs)]

//! # TPS_STREAMCBOR
//!
//! The `tps_streamcbor` crate provides a CBOR implementation for applications which receive
//! their input as a byte stream: items arrive in chunks of arbitrary size and each complete
//! top-level item is delivered as soon as its final byte has arrived. Decoded items are fully
//! owned values, so they can outlive the transport buffers they were parsed from.
//!
//! > **Wire format compatibility.** The framing implemented here follows the legacy scheme of
//! > the system this crate interoperates with: the additional information escapes are
//! > 0x1c..0x1f rather than the 24..27 of RFC8949, the false/true/null/undefined sentinels
//! > are the initial bytes 0xd8..0xdb, floats are always carried as a double behind 0xdf, and
//! > tags occupy major type 7. A conforming RFC8949 codec is therefore NOT bit-compatible
//! > with this one. If you are not talking to a peer using this framing, you almost certainly
//! > want an RFC8949 codec instead.
//!
//! ## Features
//!
//! - One-shot encoding of a [`types::CBOR`] item tree to bytes, and one-shot decoding of a
//!   complete buffer.
//! - Incremental decoding over chunked input via [`stream::StreamDecoder`]: one message per
//!   decoded item, errors latch the stream.
//! - An ordered, replaceable semantic type registry on the encode side and tag registry on
//!   the decode side. Tags 11 (Date), 15 (URI) and 23 (RegExp) decode by default into
//!   `chrono` date/times, parsed URI records and compiled `regex` patterns.
//! - Iterative reconstruction of nested arrays and maps: decode depth is bounded by heap,
//!   not control stack, so adversarially nested input cannot overflow the parser.
//!
//! ## Encoding
//!
//! ```
//! use tps_streamcbor::encoder::pack;
//! use tps_streamcbor::error::CBORError;
//! use tps_streamcbor::types::CBOR;
//!
//! fn main() -> Result<(), CBORError> {
//!     let item = CBOR::Array(vec![CBOR::from(1u8), CBOR::from("two")]);
//!     assert_eq!(pack(&item)?, &[0x82, 0x01, 0x63, 0x74, 0x77, 0x6f]);
//!     Ok(())
//! }
//! ```
//!
//! ## Decoding
//!
//! ```
//! use tps_streamcbor::decoder::unpack;
//! use tps_streamcbor::error::CBORError;
//! use tps_streamcbor::types::CBOR;
//!
//! fn main() -> Result<(), CBORError> {
//!     let item = unpack(&[0xa1, 0x61, 0x61, 0x01])?;
//!     assert_eq!(item.lookup(&CBOR::from("a")), Some(&CBOR::UInt(1)));
//!     Ok(())
//! }
//! ```
//!
//! ## Streamed decoding
//!
//! ```
//! use tps_streamcbor::stream::StreamDecoder;
//! use tps_streamcbor::types::CBOR;
//!
//! let encoded = [0x82u8, 0x01, 0x02];
//! let mut stream = StreamDecoder::new();
//! for byte in encoded {
//!     stream.write(&[byte]);
//! }
//! match stream.next_message() {
//!     Some(Ok(CBOR::Array(items))) => assert_eq!(items.len(), 2),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! assert!(stream.finish().is_ok());
//! ```

pub(crate) mod ast;
mod cbor_diag;
pub(crate) mod constants;
pub(crate) mod decode;
pub(crate) mod encode;
pub(crate) mod tag;
pub(crate) mod utils;

/// The `error` module contains error definitions used throughout `tps_streamcbor`.
pub mod error;

/// The `stream` module contains the read-side byte buffer and the stream adapter.
pub mod stream;

/// The `types` module exports the main [`types::CBOR`] structure which represents a single
/// CBOR item, and the host value types produced by the default tag decoders.
pub mod types {
    pub use super::ast::CBOR;
    pub use super::tag::{Regexp, Uri};
}

/// The `encoder` module exports the types, functions and registries for encoding items.
pub mod encoder {
    pub use super::constants::MAX_ENCODE_INT;
    pub use super::encode::{
        pack, pack_array, pack_bytes, pack_date, pack_regexp, pack_simple, pack_stream,
        EncodeBuffer, Encoder, PackFn, SemanticType,
    };
}

/// The `decoder` module exports the types, functions and registries for decoding items.
pub mod decoder {
    pub use super::decode::{unpack, Decoder};
    pub use super::tag::{decode_date, decode_regexp, decode_uri, TagDecodeFn};
}

/// The `debug` module exports the CBOR diagnostic notation formatter.
pub mod debug {
    pub use super::cbor_diag::print_hex;
    pub use super::cbor_diag::{Diag, DiagFormatter};
}
