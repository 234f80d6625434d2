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
 * CBOR Decoder
 *
 * Consumes one top-level CBOR item from a byte source. Composite items are reconstructed
 * iteratively over an explicit frame stack, so nesting depth costs heap rather than control
 * stack and adversarial inputs cannot overflow it. A source which runs out of bytes mid-item
 * fails with `EndOfBuffer`, consuming nothing; for a streamed source this is the suspension
 * point - retry once more bytes have arrived.
 **************************************************************************************************/
use crate::ast::CBOR;
use crate::constants::*;
use crate::error::{CBORError, Result};
use crate::stream::StreamBuffer;
use crate::tag::{default_tags, TagDecodeFn};
use crate::utils::within;

use std::convert::TryInto;
use std::str::from_utf8;

use half::f16;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/***************************************************************************************************
 * Decoder
 **************************************************************************************************/

/// The CBOR Decoder: reconstructs one item per invocation from framed bytes, post-processing
/// tagged items through the semantic tag registry.
///
/// ## Example
/// ```
/// use tps_streamcbor::decoder::Decoder;
/// use tps_streamcbor::error::CBORError;
/// use tps_streamcbor::types::CBOR;
///
/// fn main() -> Result<(), CBORError> {
///     let dec = Decoder::new();
///     assert_eq!(dec.unpack(&[0x82, 0x01, 0x02], 0)?,
///                CBOR::Array(vec![CBOR::UInt(1), CBOR::UInt(2)]));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    tags: Vec<(u64, TagDecodeFn)>,
}

impl Default for Decoder {
    fn default() -> Decoder {
        Decoder {
            tags: default_tags(),
        }
    }
}

impl Decoder {
    /// Construct a `Decoder` with the default tag registry: 11 (Date), 15 (URI), 23 (RegExp).
    pub fn new() -> Decoder {
        Decoder::default()
    }

    /// Register or replace the decoder for a semantic tag, returning the displaced entry if
    /// there was one.
    pub fn add_semantic_tag(&mut self, tag: u64, f: TagDecodeFn) -> Option<TagDecodeFn> {
        for entry in self.tags.iter_mut() {
            if entry.0 == tag {
                return Some(std::mem::replace(&mut entry.1, f));
            }
        }
        self.tags.push((tag, f));
        None
    }

    /// Decode one top-level item from `source`, starting at `offset`. Trailing bytes after
    /// the item are not an error; they belong to the next item, if any.
    #[cfg_attr(feature = "trace", trace)]
    pub fn unpack(&self, source: &[u8], offset: usize) -> Result<CBOR> {
        let (_, item) = self.parse_item(source, offset)?;
        Ok(item)
    }

    /// Decode one top-level item from the unread bytes of a stream buffer.
    ///
    /// On success the item's bytes are consumed. `Ok(None)` means the buffer does not yet
    /// hold a complete item and nothing was consumed: push more bytes and retry. Any other
    /// error is fatal for the stream.
    #[cfg_attr(feature = "trace", trace)]
    pub fn unpack_stream(&self, source: &mut StreamBuffer) -> Result<Option<CBOR>> {
        match self.parse_item(source.unread(), 0) {
            Ok((used, item)) => {
                source.consume(used);
                Ok(Some(item))
            }
            Err(CBORError::EndOfBuffer) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Parse a single item from `buf` starting at `start_index`, returning the index of the
    /// next item along with the parsed value.
    ///
    /// The loop reads one head per iteration. Atomic items complete immediately; a
    /// composite head opens a frame on the stack, and every completed item is fed to the
    /// innermost open frame until no frame completes. A tag head found while the innermost
    /// frame is itself a tag violates the tag depth rule; an element of an enclosed array or
    /// map starts from a fresh innermost frame, so tags within composites within tags are
    /// fine.
    pub(crate) fn parse_item(&self, buf: &[u8], start_index: usize) -> Result<(usize, CBOR)> {
        let mut index = start_index;
        let mut stack: Vec<Frame> = Vec::new();
        loop {
            if !within(buf, index, 1) {
                return Err(CBORError::EndOfBuffer);
            }
            let initial = buf[index];
            let mt = initial >> 5;
            let ai = initial & AI_MASK;
            index += 1;

            let mut completed = match mt {
                MT_UINT => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    index = next_index;
                    Some(CBOR::UInt(num))
                }
                MT_NINT => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    index = next_index;
                    Some(CBOR::NInt(num))
                }
                MT_BSTR => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    let (next_index, bytes) = read_extent(buf, next_index, num as usize)?;
                    index = next_index;
                    Some(CBOR::Bstr(bytes.to_vec()))
                }
                MT_TSTR => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    let (next_index, raw_bytes) = read_extent(buf, next_index, num as usize)?;
                    index = next_index;
                    match from_utf8(raw_bytes) {
                        Ok(s) => Some(CBOR::Tstr(s.to_owned())),
                        Err(_) => return Err(CBORError::UTF8Error),
                    }
                }
                MT_ARRAY => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    index = next_index;
                    if num == 0 {
                        Some(CBOR::Array(Vec::new()))
                    } else {
                        stack.push(Frame::Array {
                            remaining: num as usize,
                            items: Vec::new(),
                        });
                        None
                    }
                }
                MT_MAP => {
                    let (next_index, num) = read_operand(buf, index, ai)?;
                    index = next_index;
                    if num == 0 {
                        Some(CBOR::Map(Vec::new()))
                    } else {
                        stack.push(Frame::Map {
                            remaining: num as usize,
                            key: None,
                            pairs: Vec::new(),
                        });
                        None
                    }
                }
                MT_SIMPLE => {
                    let (next_index, item) = parse_simple(buf, index, ai)?;
                    index = next_index;
                    Some(item)
                }
                MT_TAG => {
                    let (next_index, tag) = read_operand(buf, index, ai)?;
                    index = next_index;
                    if matches!(stack.last(), Some(Frame::Tag { .. })) {
                        return Err(CBORError::TagAfterTag);
                    }
                    stack.push(Frame::Tag { tag });
                    None
                }
                _ => return Err(CBORError::MalformedEncoding),
            };

            // Feed each completed item to the innermost open frame; a frame which closes in
            // turn completes an item for the frame above it.
            while let Some(item) = completed.take() {
                let feed = match stack.last_mut() {
                    None => return Ok((index, item)),
                    // A tag wraps exactly one item, so it closes on the first feed
                    Some(Frame::Tag { .. }) => Feed::CloseTag(item),
                    Some(Frame::Array { remaining, items }) => {
                        items.push(item);
                        *remaining -= 1;
                        if *remaining == 0 {
                            Feed::Close
                        } else {
                            Feed::Open
                        }
                    }
                    Some(Frame::Map {
                        remaining,
                        key,
                        pairs,
                    }) => match key.take() {
                        None => {
                            *key = Some(item);
                            Feed::Open
                        }
                        Some(k) => {
                            pairs.push((k, item));
                            *remaining -= 1;
                            if *remaining == 0 {
                                Feed::Close
                            } else {
                                Feed::Open
                            }
                        }
                    },
                };
                match feed {
                    Feed::Open => (),
                    Feed::Close => match stack.pop() {
                        Some(Frame::Array { items, .. }) => completed = Some(CBOR::Array(items)),
                        Some(Frame::Map { pairs, .. }) => completed = Some(CBOR::Map(pairs)),
                        _ => return Err(CBORError::MalformedEncoding),
                    },
                    Feed::CloseTag(item) => match stack.pop() {
                        Some(Frame::Tag { tag }) => {
                            completed = Some(self.decode_tag(tag, item)?);
                        }
                        _ => return Err(CBORError::MalformedEncoding),
                    },
                }
            }
        }
    }

    /// Post-process a completed tagged item through the registry. Unknown tags deliver the
    /// inner item alongside the tag value so the caller can decide.
    fn decode_tag(&self, tag: u64, inner: CBOR) -> Result<CBOR> {
        for (registered, f) in &self.tags {
            if *registered == tag {
                return f(inner);
            }
        }
        Ok(CBOR::Tag(tag, Box::new(inner)))
    }
}

/// Outcome of feeding one completed item to the innermost open frame.
enum Feed {
    /// The frame still wants more items.
    Open,
    /// The frame closed; pop it and deliver its composite upward.
    Close,
    /// The frame was a tag; pop it and post-process the carried inner item.
    CloseTag(CBOR),
}

/// An open composite during the parse. One frame per unfinished array, map or tag.
#[derive(Debug)]
enum Frame {
    Array {
        remaining: usize,
        items: Vec<CBOR>,
    },
    Map {
        remaining: usize,
        key: Option<CBOR>,
        pairs: Vec<(CBOR, CBOR)>,
    },
    Tag {
        tag: u64,
    },
}

/***************************************************************************************************
 * Operand and payload reading
 **************************************************************************************************/

/// Read the operand selected by the additional information bits. Values up to 0x1b are the
/// operand itself; 0x1c..0x1f select a 1/2/4/8 byte big-endian operand following the initial
/// byte.
#[cfg_attr(feature = "trace", trace)]
pub(crate) fn read_operand(buf: &[u8], index: usize, ai: u8) -> Result<(usize, u64)> {
    match ai {
        0..=PAYLOAD_AI_BITS => Ok((index, ai as u64)),
        PAYLOAD_ONE_BYTE => {
            let (next_index, item_slice) = read_extent(buf, index, 1)?;
            Ok((next_index, item_slice[0] as u64))
        }
        PAYLOAD_TWO_BYTES => {
            let (next_index, item_slice) = read_extent(buf, index, 2)?;
            let bytes: [u8; 2] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, u16::from_be_bytes(bytes) as u64))
        }
        PAYLOAD_FOUR_BYTES => {
            let (next_index, item_slice) = read_extent(buf, index, 4)?;
            let bytes: [u8; 4] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, u32::from_be_bytes(bytes) as u64))
        }
        PAYLOAD_EIGHT_BYTES => {
            let (next_index, item_slice) = read_extent(buf, index, 8)?;
            let bytes: [u8; 8] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, u64::from_be_bytes(bytes)))
        }
        // ai is five bits wide, so this arm is unreachable
        _ => Err(CBORError::MalformedEncoding),
    }
}

/// Decode the simple/float space (major type 6). The additional information selects the
/// concrete primitive: small simple values inline, the four sentinels, an escaped one byte
/// simple value, or a half/single/double precision float payload.
fn parse_simple(buf: &[u8], index: usize, ai: u8) -> Result<(usize, CBOR)> {
    match ai {
        0..=23 => Ok((index, CBOR::Simple(ai))),
        AI_FALSE => Ok((index, CBOR::False)),
        AI_TRUE => Ok((index, CBOR::True)),
        AI_NULL => Ok((index, CBOR::Null)),
        AI_UNDEFINED => Ok((index, CBOR::Undefined)),
        AI_SIMPLE_BYTE => {
            let (next_index, item_slice) = read_extent(buf, index, 1)?;
            Ok((next_index, CBOR::Simple(item_slice[0])))
        }
        AI_FLOAT16 => {
            let (next_index, item_slice) = read_extent(buf, index, 2)?;
            let bytes: [u8; 2] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, CBOR::Float16(f16::from_be_bytes(bytes))))
        }
        AI_FLOAT32 => {
            let (next_index, item_slice) = read_extent(buf, index, 4)?;
            let bytes: [u8; 4] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, CBOR::Float32(f32::from_be_bytes(bytes))))
        }
        AI_FLOAT64 => {
            let (next_index, item_slice) = read_extent(buf, index, 8)?;
            let bytes: [u8; 8] = item_slice
                .try_into()
                .map_err(|_| CBORError::MalformedEncoding)?;
            Ok((next_index, CBOR::Float64(f64::from_be_bytes(bytes))))
        }
        _ => Err(CBORError::MalformedEncoding),
    }
}

/// Return the index of the next item to parse and a slice over the extent within `buf`.
fn read_extent(buf: &[u8], start: usize, length: usize) -> Result<(usize, &[u8])> {
    if within(buf, start, length) {
        Ok((start + length, &buf[start..start + length]))
    } else {
        Err(CBORError::EndOfBuffer)
    }
}

/// Decode one item with the default tag registry. Equivalent to
/// `Decoder::new().unpack(source, 0)`.
pub fn unpack(source: &[u8]) -> Result<CBOR> {
    Decoder::new().unpack(source, 0)
}
