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
 * CBOR Stream decoding
 *
 * The read half of the codec's byte buffer, and the stream adapter built on it. Bytes arrive
 * in chunks of arbitrary size; the adapter yields one decoded item per complete top-level
 * item, in the order their final byte arrived, and latches on the first decode error.
 **************************************************************************************************/
use crate::ast::CBOR;
use crate::decode::Decoder;
use crate::error::{CBORError, Result};

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/***************************************************************************************************
 * Stream Buffer
 **************************************************************************************************/

/// A chunk accumulator serving exact-length reads, the read half of the codec's byte buffer.
///
/// A reader asks for the next `n` bytes with [`StreamBuffer::wait`]; if they have not all
/// arrived yet the answer is `None` and the reader retries after the next
/// [`StreamBuffer::push_chunk`]. Reads are served strictly in request order (there is a
/// single read cursor) and a successful read of `n` bytes is committed by consuming exactly
/// `n` bytes from the front.
#[derive(Debug, Clone, Default)]
pub struct StreamBuffer {
    data: Vec<u8>,
    pos: usize,
}

impl StreamBuffer {
    /// Construct a new, empty `StreamBuffer`.
    pub fn new() -> StreamBuffer {
        StreamBuffer::default()
    }

    /// Construct a `StreamBuffer` already holding `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> StreamBuffer {
        StreamBuffer {
            data: bytes.to_vec(),
            pos: 0,
        }
    }

    /// Append a chunk of incoming bytes.
    #[cfg_attr(feature = "trace", trace)]
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.reclaim();
        self.data.extend_from_slice(chunk);
    }

    /// If at least `n` unread bytes are buffered, return exactly the next `n` without
    /// consuming them; otherwise `None`. Pair with [`StreamBuffer::consume`] to commit.
    pub fn wait(&self, n: usize) -> Option<&[u8]> {
        if self.remaining() >= n {
            Some(&self.data[self.pos..self.pos + n])
        } else {
            None
        }
    }

    /// Consume `n` bytes from the front of the unread window.
    pub fn consume(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.data.len());
    }

    /// The unread bytes.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// `true` if no unread bytes remain.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Reclaim consumed space once it dominates the allocation.
    fn reclaim(&mut self) {
        if self.pos > 0 && self.pos * 2 >= self.data.len() {
            self.data.drain(..self.pos);
            self.pos = 0;
        }
    }
}

/***************************************************************************************************
 * Stream Adapter
 **************************************************************************************************/

/// The stream adapter: feeds incoming chunks to a [`StreamBuffer`] and repeatedly asks the
/// [`Decoder`] for the next top-level item.
///
/// Each complete item is yielded once by [`StreamDecoder::next_message`]; the first decode
/// error is yielded once and latches the adapter, after which it yields nothing. Ending the
/// input while an item is still pending is a truncation, reported by
/// [`StreamDecoder::finish`].
///
/// ## Example
/// ```
/// use tps_streamcbor::stream::StreamDecoder;
/// use tps_streamcbor::types::CBOR;
///
/// let mut dec = StreamDecoder::new();
/// dec.write(&[0x82, 0x01]);
/// assert!(dec.next_message().is_none());      // array of two, one element so far
/// dec.write(&[0x02]);
/// match dec.next_message() {
///     Some(Ok(CBOR::Array(items))) => assert_eq!(items.len(), 2),
///     other => panic!("unexpected: {:?}", other),
/// }
/// assert!(dec.finish().is_ok());
/// ```
#[derive(Debug, Default)]
pub struct StreamDecoder {
    decoder: Decoder,
    buf: StreamBuffer,
    failed: bool,
}

impl StreamDecoder {
    /// Construct a `StreamDecoder` with the default tag registry.
    pub fn new() -> StreamDecoder {
        StreamDecoder::default()
    }

    /// Construct a `StreamDecoder` around a caller-configured [`Decoder`].
    pub fn with_decoder(decoder: Decoder) -> StreamDecoder {
        StreamDecoder {
            decoder,
            buf: StreamBuffer::new(),
            failed: false,
        }
    }

    /// Feed a chunk of incoming bytes. Chunks written after a decode error are discarded.
    #[cfg_attr(feature = "trace", trace)]
    pub fn write(&mut self, chunk: &[u8]) {
        if !self.failed {
            self.buf.push_chunk(chunk);
        }
    }

    /// Yield the next decoded top-level item, if the buffered bytes complete one.
    ///
    /// - `Some(Ok(item))` - one message; call again, more items may already be buffered.
    /// - `Some(Err(e))` - the first decode error; the adapter is now latched.
    /// - `None` - more bytes are needed, or the adapter is latched.
    #[cfg_attr(feature = "trace", trace)]
    pub fn next_message(&mut self) -> Option<Result<CBOR>> {
        if self.failed {
            return None;
        }
        match self.decoder.unpack_stream(&mut self.buf) {
            Ok(Some(item)) => Some(Ok(item)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }

    /// Signal the end of the input. Fails with [`CBORError::EndOfFile`] if bytes of an
    /// unfinished item are still pending.
    pub fn finish(&mut self) -> Result<()> {
        if !self.failed && !self.buf.is_empty() {
            Err(CBORError::EndOfFile)
        } else {
            Ok(())
        }
    }

    /// `true` once a decode error has latched the adapter.
    pub fn is_failed(&self) -> bool {
        self.failed
    }
}

/// One-shot convenience decoder over a chunked byte stream: returns the first decoded item,
/// the first decode error, or [`CBORError::EndOfFile`] if the input ends first. Any further
/// buffered items are ignored.
pub fn decode_first<'a, I>(chunks: I) -> Result<CBOR>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut stream = StreamDecoder::new();
    for chunk in chunks {
        stream.write(chunk);
        if let Some(result) = stream.next_message() {
            return result;
        }
    }
    stream.finish()?;
    Err(CBORError::EndOfFile)
}
