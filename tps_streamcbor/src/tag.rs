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
 * tps_streamcbor CBOR Tag decoding
 *
 * Default decoders for the semantic tags carried by the wire format (Date, URI, RegExp), and
 * the host value types they produce. A tag decoder transforms the item following the tag into
 * a richer value; unknown tags are delivered untransformed as `CBOR::Tag`.
 **************************************************************************************************/
use crate::ast::CBOR;
use crate::constants::{TAG_DATE, TAG_REGEXP, TAG_URI};
use crate::error::{CBORError, Result};

use std::convert::TryFrom;
use std::fmt;
use std::ops::Deref;

use chrono::{DateTime, FixedOffset, TimeZone};
use percent_encoding::percent_decode_str;
use regex::Regex;

#[cfg(feature = "trace")]
use func_trace::trace;

#[cfg(feature = "trace")]
func_trace::init_depth_var!();

/// A tag decoder: transforms the item which followed the tag into a richer value.
///
/// Decoders registered with [`crate::decoder::Decoder::add_semantic_tag`] run once the inner
/// item has been fully reconstructed. Returning an error fails the whole decode.
pub type TagDecodeFn = fn(CBOR) -> Result<CBOR>;

/// The default tag registry: 11 (Date), 15 (URI), 23 (RegExp), in that order.
pub(crate) fn default_tags() -> Vec<(u64, TagDecodeFn)> {
    vec![
        (TAG_DATE, decode_date as TagDecodeFn),
        (TAG_URI, decode_uri as TagDecodeFn),
        (TAG_REGEXP, decode_regexp as TagDecodeFn),
    ]
}

/// Decoder for the Date tag (11).
///
/// A text inner item is parsed as an RFC3339 date/time. A numeric inner item is a UNIX epoch
/// offset in seconds, possibly fractional. Any other inner item fails.
#[cfg_attr(feature = "trace", trace)]
pub fn decode_date(inner: CBOR) -> Result<CBOR> {
    match &inner {
        CBOR::Tstr(s) => DateTime::parse_from_rfc3339(s)
            .map(CBOR::DateTime)
            .map_err(|_| CBORError::BadDateTime),
        CBOR::UInt(_) | CBOR::NInt(_) | CBOR::Float16(_) | CBOR::Float32(_) | CBOR::Float64(_) => {
            let secs = f64::try_from(&inner)?;
            if !secs.is_finite() {
                return Err(CBORError::BadDateTime);
            }
            let utc = FixedOffset::east_opt(0).ok_or(CBORError::BadDateTime)?;
            utc.timestamp_millis_opt((secs * 1000.0) as i64)
                .single()
                .map(CBOR::DateTime)
                .ok_or(CBORError::BadDateTime)
        }
        _ => Err(CBORError::BadDateTime),
    }
}

/// Decoder for the URI tag (15). The inner item must be text.
#[cfg_attr(feature = "trace", trace)]
pub fn decode_uri(inner: CBOR) -> Result<CBOR> {
    match inner {
        CBOR::Tstr(s) => Uri::parse(&s).map(CBOR::Uri),
        _ => Err(CBORError::IncompatibleType),
    }
}

/// Decoder for the RegExp tag (23). The inner item must be text holding a pattern source.
#[cfg_attr(feature = "trace", trace)]
pub fn decode_regexp(inner: CBOR) -> Result<CBOR> {
    match inner {
        CBOR::Tstr(s) => Regexp::new(&s).map(CBOR::Regexp),
        _ => Err(CBORError::IncompatibleType),
    }
}

/***************************************************************************************************
 * URI host value
 **************************************************************************************************/

/// A parsed URI record, the host value produced by the URI tag.
///
/// The parse splits `scheme://host[:port]path[?query][#fragment]` and percent-decodes the
/// query into key/value pairs. The original text is retained and is what [`fmt::Display`]
/// reproduces; the parse does not normalize.
#[derive(PartialEq, Debug, Clone)]
pub struct Uri {
    text: String,
    scheme: String,
    host: String,
    port: Option<u16>,
    path: String,
    query: Vec<(String, String)>,
    fragment: Option<String>,
}

impl Uri {
    /// Parse a URI from text. Fails with [`CBORError::BadUri`] when the text has no scheme,
    /// an unparseable port, or a query component which is not valid percent-encoded UTF8.
    #[cfg_attr(feature = "trace", trace)]
    pub fn parse(text: &str) -> Result<Uri> {
        let (rest, fragment) = match text.split_once('#') {
            Some((head, frag)) => (head, Some(frag.to_owned())),
            None => (text, None),
        };
        let (rest, raw_query) = match rest.split_once('?') {
            Some((head, q)) => (head, Some(q)),
            None => (rest, None),
        };
        let (scheme, rest) = rest.split_once("://").ok_or(CBORError::BadUri)?;
        match scheme.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => (),
            _ => return Err(CBORError::BadUri),
        }
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(CBORError::BadUri);
        }
        let (authority, path) = match rest.find('/') {
            Some(i) => (&rest[..i], &rest[i..]),
            None => (rest, "/"),
        };
        let (host, port) = match authority.rsplit_once(':') {
            Some((h, p)) => (h, Some(p.parse::<u16>().map_err(|_| CBORError::BadUri)?)),
            None => (authority, None),
        };
        let mut query = Vec::new();
        if let Some(raw) = raw_query {
            for part in raw.split('&').filter(|p| !p.is_empty()) {
                let (k, v) = part.split_once('=').unwrap_or((part, ""));
                query.push((decode_query_component(k)?, decode_query_component(v)?));
            }
        }
        Ok(Uri {
            text: text.to_owned(),
            scheme: scheme.to_owned(),
            host: host.to_owned(),
            port,
            path: path.to_owned(),
            query,
            fragment,
        })
    }

    /// The scheme, e.g. `https`.
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// The host component. May be empty, e.g. for `file:///`.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port, if one was given.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// The path component. Defaults to `/` when the URI has none.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The percent-decoded query pairs, in order of appearance.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// The fragment, if one was given, undecoded.
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// The original text this record was parsed from.
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Decode one `application/x-www-form-urlencoded` component: `+` is a space, `%xx` escapes
/// are resolved, and the result must be valid UTF8.
fn decode_query_component(s: &str) -> Result<String> {
    let plus_decoded = s.replace('+', " ");
    percent_decode_str(&plus_decoded)
        .decode_utf8()
        .map(|c| c.into_owned())
        .map_err(|_| CBORError::BadUri)
}

/***************************************************************************************************
 * RegExp host value
 **************************************************************************************************/

/// A compiled regular expression, the host value produced by the RegExp tag.
///
/// Wraps [`regex::Regex`]; equality is by pattern source, since compiled programs have no
/// useful equality.
#[derive(Debug, Clone)]
pub struct Regexp(Regex);

impl Regexp {
    /// Compile a pattern. Fails with [`CBORError::BadRegex`] when the source does not
    /// compile.
    #[cfg_attr(feature = "trace", trace)]
    pub fn new(pattern: &str) -> Result<Regexp> {
        Regex::new(pattern)
            .map(Regexp)
            .map_err(|_| CBORError::BadRegex)
    }

    /// The pattern source.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl PartialEq for Regexp {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Deref for Regexp {
    type Target = Regex;

    fn deref(&self) -> &Regex {
        &self.0
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
