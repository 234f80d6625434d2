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
/// # diag - CBOR diagnostic style output for structured binary data
///
/// CBOR diagnostic notation is defined in RFC7049 and extended slightly in RFC8610. It is a
/// convenient human-readable rendering for decoded items in tools and "dump to stdout"
/// applications.
///
/// ## Format recap
///
/// - <tag> ( <data> ) is used to denote tags. The richer host values produced by the default
///   tag decoders are rendered under their tag number with their textual form inside.
/// - uint, int and float types are formatted in their natural programming language formats.
/// - true, false, null and undefined mean what you would expect; simple values are written
///   simple(n).
/// - Strings are written "as a string" in double quotes.
/// - Byte strings are written as h'0123456789abcdef'.
use crate::ast::CBOR;

use std::io::Write;

/// Trait for conveniently displaying information in CBOR diagnostic format.
pub trait Diag {
    /// Write the receiver in diagnostic notation.
    fn cbor_diag(&self, outfp: &mut dyn Write) -> Result<(), std::io::Error>;
}

impl Diag for CBOR {
    fn cbor_diag(&self, outfp: &mut dyn Write) -> Result<(), std::io::Error> {
        self.diag(outfp, 0)?;
        writeln!(outfp)
    }
}

/// The DiagFormatter trait should be implemented for any data structure that is intended to
/// be displayed using the CBOR diagnostic format.
pub trait DiagFormatter {
    /// Write the receiver in diagnostic notation at indent level `idt`.
    fn diag(&self, buf: &mut dyn Write, idt: u32) -> Result<(), std::io::Error>;
}

impl DiagFormatter for CBOR {
    fn diag(&self, buf: &mut dyn Write, idt: u32) -> Result<(), std::io::Error> {
        match self {
            CBOR::UInt(v) => write!(buf, "{}", v),
            CBOR::NInt(v) => write!(buf, "{}", -1i128 - (*v as i128)),
            CBOR::Float64(v) => write!(buf, "{}", v),
            CBOR::Float32(v) => write!(buf, "{}", v),
            CBOR::Float16(v) => write!(buf, "{}", v),
            CBOR::Bstr(bytes) => diag_bstr(buf, bytes),
            CBOR::Tstr(s) => write!(buf, "\"{}\"", s),
            CBOR::Array(items) => {
                write!(buf, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(buf, ", ")?;
                    }
                    item.diag(buf, idt + 1)?;
                }
                write!(buf, "]")
            }
            CBOR::Map(pairs) => {
                write!(buf, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(buf, ", ")?;
                    }
                    key.diag(buf, idt + 1)?;
                    write!(buf, ": ")?;
                    value.diag(buf, idt + 1)?;
                }
                write!(buf, "}}")
            }
            CBOR::Tag(tag, inner) => {
                write!(buf, "{}(", tag)?;
                inner.diag(buf, idt + 1)?;
                write!(buf, ")")
            }
            CBOR::Simple(v) => write!(buf, "simple({})", v),
            CBOR::False => write!(buf, "false"),
            CBOR::True => write!(buf, "true"),
            CBOR::Null => write!(buf, "null"),
            CBOR::Undefined => write!(buf, "undefined"),
            CBOR::DateTime(dt) => {
                write!(buf, "11(\"{}\")", dt.format("%Y-%m-%dT%H:%M:%S%z"))
            }
            CBOR::Uri(uri) => write!(buf, "15(\"{}\")", uri),
            CBOR::Regexp(re) => write!(buf, "23(\"{}\")", re),
            CBOR::Stream(stream) => diag_bstr(buf, stream.bytes()),
        }
    }
}

#[inline]
fn diag_bstr(buf: &mut dyn Write, bytes: &[u8]) -> Result<(), std::io::Error> {
    write!(buf, "h'")?;
    for byte in bytes {
        write!(buf, "{}", print_hex(*byte))?;
    }
    write!(buf, "'")
}

/// Print a byte as two hex characters.
///
/// Unfortunately, the #x formatter always puts "0x" in front of a value and we do not want
/// this in diagnostic format, so we implement this manually
pub fn print_hex(b: u8) -> &'static str {
    let table = [
        "00", "01", "02", "03", "04", "05", "06", "07", "08", "09", "0a", "0b", "0c", "0d", "0e",
        "0f", "10", "11", "12", "13", "14", "15", "16", "17", "18", "19", "1a", "1b", "1c", "1d",
        "1e", "1f", "20", "21", "22", "23", "24", "25", "26", "27", "28", "29", "2a", "2b", "2c",
        "2d", "2e", "2f", "30", "31", "32", "33", "34", "35", "36", "37", "38", "39", "3a", "3b",
        "3c", "3d", "3e", "3f", "40", "41", "42", "43", "44", "45", "46", "47", "48", "49", "4a",
        "4b", "4c", "4d", "4e", "4f", "50", "51", "52", "53", "54", "55", "56", "57", "58", "59",
        "5a", "5b", "5c", "5d", "5e", "5f", "60", "61", "62", "63", "64", "65", "66", "67", "68",
        "69", "6a", "6b", "6c", "6d", "6e", "6f", "70", "71", "72", "73", "74", "75", "76", "77",
        "78", "79", "7a", "7b", "7c", "7d", "7e", "7f", "80", "81", "82", "83", "84", "85", "86",
        "87", "88", "89", "8a", "8b", "8c", "8d", "8e", "8f", "90", "91", "92", "93", "94", "95",
        "96", "97", "98", "99", "9a", "9b", "9c", "9d", "9e", "9f", "a0", "a1", "a2", "a3", "a4",
        "a5", "a6", "a7", "a8", "a9", "aa", "ab", "ac", "ad", "ae", "af", "b0", "b1", "b2", "b3",
        "b4", "b5", "b6", "b7", "b8", "b9", "ba", "bb", "bc", "bd", "be", "bf", "c0", "c1", "c2",
        "c3", "c4", "c5", "c6", "c7", "c8", "c9", "ca", "cb", "cc", "cd", "ce", "cf", "d0", "d1",
        "d2", "d3", "d4", "d5", "d6", "d7", "d8", "d9", "da", "db", "dc", "dd", "de", "df", "e0",
        "e1", "e2", "e3", "e4", "e5", "e6", "e7", "e8", "e9", "ea", "eb", "ec", "ed", "ee", "ef",
        "f0", "f1", "f2", "f3", "f4", "f5", "f6", "f7", "f8", "f9", "fa", "fb", "fc", "fd", "fe",
        "ff",
    ];
    table[b as usize]
}
