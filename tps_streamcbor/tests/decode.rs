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
 * Test cases for decoding: integer and float payloads, composites, the simple/float space,
 * semantic tags and the conversion suite.
 **************************************************************************************************/

extern crate tps_streamcbor;

use std::convert::TryFrom;

use tps_streamcbor::decoder::{unpack, Decoder};
use tps_streamcbor::encoder::pack;
use tps_streamcbor::error::CBORError;
use tps_streamcbor::types::CBOR;

fn decode_hex(s: &str) -> CBOR {
    match unpack(&hex::decode(s).unwrap()) {
        Ok(item) => item,
        Err(e) => panic!("decode of {} failed: {:?}", s, e),
    }
}

#[test]
fn decode_scenarios() {
    println!("<===================== decode_scenarios ===================>");
    assert_eq!(decode_hex("00"), CBOR::UInt(0));
    assert_eq!(decode_hex("1cff"), CBOR::UInt(255));
    assert_eq!(decode_hex("20"), CBOR::NInt(0));
    assert_eq!(decode_hex("6161"), CBOR::from("a"));
    assert_eq!(
        decode_hex("820102"),
        CBOR::Array(vec![CBOR::UInt(1), CBOR::UInt(2)])
    );
    assert_eq!(
        decode_hex("a1616101"),
        CBOR::Map(vec![(CBOR::from("a"), CBOR::UInt(1))])
    );
    assert_eq!(decode_hex("d8"), CBOR::False);
    assert_eq!(decode_hex("d9"), CBOR::True);
    assert_eq!(decode_hex("da"), CBOR::Null);
    assert_eq!(decode_hex("db"), CBOR::Undefined);
}

#[test]
fn decode_operand_widths() {
    println!("<===================== decode_operand_widths ===================>");
    // Inline, 1, 2, 4 and 8 byte operands
    assert_eq!(decode_hex("17"), CBOR::UInt(23));
    assert_eq!(decode_hex("1b"), CBOR::UInt(27));
    assert_eq!(decode_hex("1c64"), CBOR::UInt(100));
    assert_eq!(decode_hex("1d03e8"), CBOR::UInt(1000));
    assert_eq!(decode_hex("1e000f4240"), CBOR::UInt(1000000));
    assert_eq!(decode_hex("1f000000e8d4a51000"), CBOR::UInt(1000000000000));
    assert_eq!(
        decode_hex("1fffffffffffffffff"),
        CBOR::UInt(u64::MAX)
    );
    // Negative forms of the same ladder
    assert_eq!(decode_hex("3c63"), CBOR::NInt(99));
    assert_eq!(decode_hex("3d03e7"), CBOR::NInt(999));
    let item = decode_hex("3fffffffffffffffff");
    assert_eq!(i128::try_from(&item), Ok(-18446744073709551616i128));
}

#[test]
fn decode_integer_round_trip() -> Result<(), CBORError> {
    println!("<===================== decode_integer_round_trip ===================>");
    // Boundary sweep over the encodable domain [-2^31, 2^31 - 1]
    for i in [
        0i64,
        1,
        23,
        24,
        27,
        28,
        255,
        256,
        65535,
        65536,
        0x7fff_ffff,
        -1,
        -24,
        -25,
        -256,
        -257,
        -65536,
        -65537,
        -0x8000_0000,
    ] {
        println!("<===================== Round trip {} ===================>", i);
        let item = unpack(&pack(&CBOR::from(i))?)?;
        assert_eq!(i64::try_from(&item), Ok(i));
    }
    Ok(())
}

#[test]
fn decode_half_precision() {
    println!("<===================== decode_half_precision ===================>");
    let cases: &[(&str, f32)] = &[
        ("dd3c00", 1.0),
        ("ddc000", -2.0),
        ("dd7bff", 65504.0),
        ("dd0400", 6.103515625e-5),
        ("dd0000", 0.0),
    ];
    for (input, expect) in cases {
        println!("<===================== Decode {} ===================>", input);
        if let CBOR::Float16(v) = decode_hex(input) {
            assert_eq!(v.to_f32(), *expect);
        } else {
            panic!("{} did not decode to a half float", input);
        }
    }
    // Negative zero keeps its sign
    if let CBOR::Float16(v) = decode_hex("dd8000") {
        assert_eq!(v.to_f32(), 0.0);
        assert!(v.is_sign_negative());
    } else {
        panic!("negative zero did not decode to a half float");
    }
    // Infinities and NaN forms
    if let CBOR::Float16(v) = decode_hex("dd7c00") {
        assert_eq!(v.to_f32(), f32::INFINITY);
    } else {
        panic!("infinity did not decode to a half float");
    }
    if let CBOR::Float16(v) = decode_hex("ddfc00") {
        assert_eq!(v.to_f32(), f32::NEG_INFINITY);
    } else {
        panic!("negative infinity did not decode to a half float");
    }
    for nan in ["dd7c01", "dd7e00", "ddfe00", "dd7fff"] {
        if let CBOR::Float16(v) = decode_hex(nan) {
            assert!(v.is_nan());
        } else {
            panic!("{} did not decode to a half float", nan);
        }
    }
}

#[test]
fn decode_single_and_double_precision() {
    println!("<================ decode_single_and_double_precision ================>");
    assert_eq!(decode_hex("de47c35000"), CBOR::Float32(100000.0));
    assert_eq!(decode_hex("df3ff199999999999a"), CBOR::Float64(1.1));
    assert_eq!(decode_hex("deff800000"), CBOR::Float32(f32::NEG_INFINITY));
}

#[test]
fn decode_simple_values() -> Result<(), CBORError> {
    println!("<===================== decode_simple_values ===================>");
    assert_eq!(decode_hex("c0"), CBOR::Simple(0));
    assert_eq!(decode_hex("c5"), CBOR::Simple(5));
    assert_eq!(decode_hex("d7"), CBOR::Simple(23));
    // The one byte escape covers the full 0..=255 domain
    assert_eq!(decode_hex("dc18"), CBOR::Simple(24));
    assert_eq!(decode_hex("dcff"), CBOR::Simple(255));
    // Escaped simple values round trip through the encoder
    for v in [28i64, 100, 255] {
        let item = unpack(&pack(&CBOR::simple(v)?)?)?;
        assert_eq!(item, CBOR::Simple(v as u8));
    }
    Ok(())
}

#[test]
fn decode_buffer_equivalence() -> Result<(), CBORError> {
    println!("<===================== decode_buffer_equivalence ===================>");
    let samples: &[&[u8]] = &[
        &[],
        &[0x00],
        &[0xff; 23],
        &[0xa5; 24],
        &[0x5a; 300],
    ];
    for b in samples {
        let item = unpack(&pack(&CBOR::from(*b))?)?;
        assert_eq!(item, CBOR::Bstr(b.to_vec()));
    }
    Ok(())
}

#[test]
fn decode_text() {
    println!("<===================== decode_text ===================>");
    assert_eq!(decode_hex("60"), CBOR::from(""));
    assert_eq!(decode_hex("6449455446"), CBOR::from("IETF"));
    // Two byte UTF8 sequence
    assert_eq!(decode_hex("62c3bc"), CBOR::from("\u{00fc}"));
    // Invalid UTF8 is rejected
    assert!(matches!(
        unpack(&[0x62, 0xff, 0xff]),
        Err(CBORError::UTF8Error)
    ));
}

#[test]
fn decode_nested_composites() {
    println!("<===================== decode_nested_composites ===================>");
    assert_eq!(
        decode_hex("82820102820304"),
        CBOR::Array(vec![
            CBOR::Array(vec![CBOR::UInt(1), CBOR::UInt(2)]),
            CBOR::Array(vec![CBOR::UInt(3), CBOR::UInt(4)]),
        ])
    );
    assert_eq!(
        decode_hex("a26161016162820203"),
        CBOR::Map(vec![
            (CBOR::from("a"), CBOR::UInt(1)),
            (
                CBOR::from("b"),
                CBOR::Array(vec![CBOR::UInt(2), CBOR::UInt(3)])
            ),
        ])
    );
    assert_eq!(decode_hex("80"), CBOR::Array(Vec::new()));
    assert_eq!(decode_hex("a0"), CBOR::Map(Vec::new()));
}

#[test]
fn decode_map_duplicate_keys() {
    println!("<===================== decode_map_duplicate_keys ===================>");
    // Duplicates are permitted on decode; lookup resolves to the last written value
    let item = decode_hex("a2616101616102");
    assert_eq!(
        item,
        CBOR::Map(vec![
            (CBOR::from("a"), CBOR::UInt(1)),
            (CBOR::from("a"), CBOR::UInt(2)),
        ])
    );
    assert_eq!(item.lookup(&CBOR::from("a")), Some(&CBOR::UInt(2)));
    assert_eq!(item.lookup(&CBOR::from("b")), None);
}

#[test]
fn decode_offset_and_trailing_bytes() -> Result<(), CBORError> {
    println!("<================ decode_offset_and_trailing_bytes ================>");
    let dec = Decoder::new();
    let bytes = [0xa5u8, 0xa5, 0x1c, 0xff, 0x00];
    // An offset selects the start position within a raw byte source
    assert_eq!(dec.unpack(&bytes, 2)?, CBOR::UInt(255));
    // Bytes after one complete item are ignored by the one-shot call
    assert_eq!(dec.unpack(&bytes, 4)?, CBOR::UInt(0));
    Ok(())
}

#[test]
fn decode_truncated_input() {
    println!("<===================== decode_truncated_input ===================>");
    for input in [
        &[0x1c][..],               // operand escape with no operand
        &[0x1d, 0x01][..],         // two byte operand, one byte present
        &[0x43, 0x01, 0x02][..],   // three byte bstr, two bytes present
        &[0x82, 0x01][..],         // array of two, one element present
        &[0xa1, 0x61, 0x61][..],   // map with key but no value
        &[0xe1][..],               // tag with no inner item
        &[0xdd, 0x3c][..],         // half float, one payload byte
    ] {
        assert!(matches!(unpack(input), Err(CBORError::EndOfBuffer)));
    }
}

#[test]
fn decode_tag_depth() {
    println!("<===================== decode_tag_depth ===================>");
    // A tag directly on another tag is a protocol error
    assert!(matches!(
        unpack(&[0xe1, 0xe1, 0x00]),
        Err(CBORError::TagAfterTag)
    ));
    // A tag on an element of an enclosed composite is fine, on both sides
    assert_eq!(
        decode_hex("82e100e101"),
        CBOR::Array(vec![
            CBOR::Tag(1, Box::new(CBOR::UInt(0))),
            CBOR::Tag(1, Box::new(CBOR::UInt(1))),
        ])
    );
    assert_eq!(
        decode_hex("e181e100"),
        CBOR::Tag(
            1,
            Box::new(CBOR::Array(vec![CBOR::Tag(1, Box::new(CBOR::UInt(0)))]))
        )
    );
}

#[test]
fn decode_unknown_tag() {
    println!("<===================== decode_unknown_tag ===================>");
    // Unknown tags deliver the inner item alongside the tag value
    assert_eq!(decode_hex("e105"), CBOR::Tag(1, Box::new(CBOR::UInt(5))));
    assert_eq!(
        decode_hex("fd115c6161"),
        CBOR::Tag(4444, Box::new(CBOR::from("a")))
    );
}

#[test]
fn decode_date_tag() -> Result<(), CBORError> {
    println!("<===================== decode_date_tag ===================>");
    // Epoch seconds
    let mut bytes = vec![0xeb];
    bytes.extend_from_slice(&pack(&CBOR::UInt(1_363_896_240))?);
    match unpack(&bytes)? {
        CBOR::DateTime(dt) => assert_eq!(dt.timestamp(), 1_363_896_240),
        other => panic!("unexpected: {:?}", other),
    }

    // Fractional epoch seconds scale to milliseconds
    let mut bytes = vec![0xeb];
    bytes.extend_from_slice(&pack(&CBOR::Float64(1_363_896_240.5))?);
    match unpack(&bytes)? {
        CBOR::DateTime(dt) => assert_eq!(dt.timestamp_millis(), 1_363_896_240_500),
        other => panic!("unexpected: {:?}", other),
    }

    // RFC3339 text
    let mut bytes = vec![0xeb];
    bytes.extend_from_slice(&pack(&CBOR::from("2013-03-21T20:04:00+00:00"))?);
    match unpack(&bytes)? {
        CBOR::DateTime(dt) => assert_eq!(dt.timestamp(), 1_363_896_240),
        other => panic!("unexpected: {:?}", other),
    }

    // Anything else fails
    let mut bytes = vec![0xeb];
    bytes.extend_from_slice(&pack(&CBOR::from(&[0x00u8][..]))?);
    assert!(matches!(unpack(&bytes), Err(CBORError::BadDateTime)));
    Ok(())
}

#[test]
fn decode_uri_tag() -> Result<(), CBORError> {
    println!("<===================== decode_uri_tag ===================>");
    let text = "https://example.com:8080/path?q=a+b&r=%2Fx#frag";
    let mut bytes = vec![0xef];
    bytes.extend_from_slice(&pack(&CBOR::from(text))?);
    match unpack(&bytes)? {
        CBOR::Uri(uri) => {
            assert_eq!(uri.scheme(), "https");
            assert_eq!(uri.host(), "example.com");
            assert_eq!(uri.port(), Some(8080));
            assert_eq!(uri.path(), "/path");
            assert_eq!(
                uri.query(),
                &[
                    ("q".to_owned(), "a b".to_owned()),
                    ("r".to_owned(), "/x".to_owned())
                ][..]
            );
            assert_eq!(uri.fragment(), Some("frag"));
            assert_eq!(uri.as_str(), text);
        }
        other => panic!("unexpected: {:?}", other),
    }

    // A URI without port, query or fragment gets the default path
    let mut bytes = vec![0xef];
    bytes.extend_from_slice(&pack(&CBOR::from("http://example.com"))?);
    match unpack(&bytes)? {
        CBOR::Uri(uri) => {
            assert_eq!(uri.port(), None);
            assert_eq!(uri.path(), "/");
            assert!(uri.query().is_empty());
        }
        other => panic!("unexpected: {:?}", other),
    }

    // Non-text inner items fail
    let mut bytes = vec![0xef];
    bytes.extend_from_slice(&pack(&CBOR::UInt(1))?);
    assert!(matches!(unpack(&bytes), Err(CBORError::IncompatibleType)));

    // Schemeless text fails
    let mut bytes = vec![0xef];
    bytes.extend_from_slice(&pack(&CBOR::from("not a uri"))?);
    assert!(matches!(unpack(&bytes), Err(CBORError::BadUri)));
    Ok(())
}

#[test]
fn decode_regexp_tag() -> Result<(), CBORError> {
    println!("<===================== decode_regexp_tag ===================>");
    let mut bytes = vec![0xf7];
    bytes.extend_from_slice(&pack(&CBOR::from("^a+$"))?);
    match unpack(&bytes)? {
        CBOR::Regexp(re) => {
            assert_eq!(re.as_str(), "^a+$");
            assert!(re.is_match("aaa"));
            assert!(!re.is_match("aab"));
        }
        other => panic!("unexpected: {:?}", other),
    }

    // An uncompilable pattern fails
    let mut bytes = vec![0xf7];
    bytes.extend_from_slice(&pack(&CBOR::from("("))?);
    assert!(matches!(unpack(&bytes), Err(CBORError::BadRegex)));

    // Non-text inner items fail
    let mut bytes = vec![0xf7];
    bytes.extend_from_slice(&pack(&CBOR::UInt(1))?);
    assert!(matches!(unpack(&bytes), Err(CBORError::IncompatibleType)));
    Ok(())
}

/// Replacement decoder for tag 1 used by the registry test.
fn decode_tag_one(inner: CBOR) -> Result<CBOR, CBORError> {
    match inner {
        CBOR::UInt(v) => Ok(CBOR::Tstr(format!("one:{}", v))),
        _ => Err(CBORError::IncompatibleType),
    }
}

#[test]
fn decode_tag_registry() -> Result<(), CBORError> {
    println!("<===================== decode_tag_registry ===================>");
    let mut dec = Decoder::new();
    // A fresh tag registers with no displaced entry
    assert!(dec.add_semantic_tag(1, decode_tag_one).is_none());
    assert_eq!(dec.unpack(&[0xe1, 0x05], 0)?, CBOR::from("one:5"));
    // Re-registering returns the displaced decoder
    assert!(dec.add_semantic_tag(1, decode_tag_one).is_some());
    // Default tags remain registered
    let mut bytes = vec![0xf7];
    bytes.extend_from_slice(&pack(&CBOR::from("b"))?);
    assert!(matches!(dec.unpack(&bytes, 0), Ok(CBOR::Regexp(_))));
    Ok(())
}

#[test]
fn decode_conversions() -> Result<(), CBORError> {
    println!("<===================== decode_conversions ===================>");
    let item = decode_hex("1cff");
    assert_eq!(u8::try_from(&item), Ok(255));
    assert_eq!(u16::try_from(&item), Ok(255));
    assert_eq!(i16::try_from(&item), Ok(255));
    assert!(matches!(i8::try_from(&item), Err(CBORError::OutOfRange)));

    let item = decode_hex("3c80");
    assert_eq!(i16::try_from(&item), Ok(-129));
    assert!(matches!(i8::try_from(&item), Err(CBORError::OutOfRange)));
    assert!(matches!(
        u32::try_from(&item),
        Err(CBORError::IncompatibleType)
    ));

    // i64::MIN survives the NInt representation
    let item = CBOR::from(i64::MIN);
    assert_eq!(item, CBOR::NInt(i64::MAX as u64));
    assert_eq!(i64::try_from(&item), Ok(i64::MIN));

    assert_eq!(bool::try_from(&decode_hex("d9")), Ok(true));
    assert_eq!(f64::try_from(&decode_hex("df3ff199999999999a")), Ok(1.1));
    assert_eq!(
        String::try_from(decode_hex("6161")),
        Ok("a".to_owned())
    );
    assert_eq!(
        Vec::<CBOR>::try_from(decode_hex("820102")),
        Ok(vec![CBOR::UInt(1), CBOR::UInt(2)])
    );
    Ok(())
}
