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
 * Test cases for adversarial inputs: pathological nesting, lying length prefixes and
 * truncation at every byte boundary.
 **************************************************************************************************/

extern crate tps_streamcbor;

use tps_streamcbor::decoder::unpack;
use tps_streamcbor::encoder::pack;
use tps_streamcbor::error::CBORError;
use tps_streamcbor::types::CBOR;

/*
 * The decoder reconstructs composites over an explicit frame stack, so nesting depth is
 * bounded by heap rather than control stack. This input would overflow a recursive descent
 * parser.
 */
#[test]
fn deeply_nested_arrays_decode_iteratively() {
    println!("<============ deeply_nested_arrays_decode_iteratively ============>");
    const DEPTH: usize = 100_000;
    let mut bytes = vec![0x81; DEPTH];
    bytes.push(0x00);

    let mut item = unpack(&bytes).unwrap();
    let mut depth = 0;
    loop {
        match item {
            CBOR::Array(mut items) => {
                assert_eq!(items.len(), 1);
                depth += 1;
                item = items.remove(0);
            }
            CBOR::UInt(0) => break,
            other => panic!("unexpected: {:?}", other),
        }
    }
    assert_eq!(depth, DEPTH);
}

#[test]
fn deeply_nested_truncation_fails_cleanly() {
    println!("<============ deeply_nested_truncation_fails_cleanly ============>");
    let bytes = vec![0x81; 100_000];
    assert_eq!(unpack(&bytes), Err(CBORError::EndOfBuffer));
}

/*
 * A length prefix much larger than the buffer must not panic or allocate towards the claimed
 * size. The eight byte operand can claim up to u64::MAX bytes, which also exercises the
 * overflow-checked bounds arithmetic.
 */
#[test]
fn lying_length_prefixes() {
    println!("<===================== lying_length_prefixes ===================>");
    for mt in [0x40u8, 0x60] {
        let mut bytes = vec![mt | 0x1f];
        bytes.extend_from_slice(&u64::MAX.to_be_bytes());
        bytes.push(0x00);
        assert_eq!(unpack(&bytes), Err(CBORError::EndOfBuffer));
    }
    // A huge claimed element count runs out of heads long before it runs out of memory
    let mut bytes = vec![0x80u8 | 0x1e];
    bytes.extend_from_slice(&0x7fff_ffffu32.to_be_bytes());
    bytes.push(0x00);
    assert_eq!(unpack(&bytes), Err(CBORError::EndOfBuffer));
}

/*
 * Every proper prefix of a valid encoding is a truncation, never a panic or a bogus item.
 */
#[test]
fn truncation_at_every_boundary() -> Result<(), CBORError> {
    println!("<================ truncation_at_every_boundary ================>");
    let items = [
        CBOR::from(1000000u32),
        CBOR::Array(vec![
            CBOR::from("ab"),
            CBOR::Map(vec![(CBOR::from(1u8), CBOR::Bstr(vec![1, 2, 3]))]),
        ]),
        CBOR::Float64(1.1),
        CBOR::Tag(99, Box::new(CBOR::from("x"))),
    ];
    for item in &items {
        let bytes = pack(item)?;
        for cut in 0..bytes.len() {
            assert_eq!(unpack(&bytes[..cut]), Err(CBORError::EndOfBuffer));
        }
        assert_eq!(&unpack(&bytes)?, item);
    }
    Ok(())
}

/*
 * The no-tag-on-tag rule applies at any nesting depth, including under a perfectly good
 * outer structure.
 */
#[test]
fn nested_tag_on_tag_fails() {
    println!("<===================== nested_tag_on_tag_fails ===================>");
    // [1, 99(99(0))]
    let bytes = [0x82, 0x01, 0xfc, 0x63, 0xfc, 0x63, 0x00];
    assert_eq!(unpack(&bytes), Err(CBORError::TagAfterTag));
}

#[test]
fn empty_input_is_truncation() {
    println!("<===================== empty_input_is_truncation ===================>");
    assert_eq!(unpack(&[]), Err(CBORError::EndOfBuffer));
}
