//!
//! Conversion between flat key-value mappings and `application/x-www-form-urlencoded` bytes,
//! in both directions.
//!
//! Encoding backs every introspection request body. Decoding exists for the other side of the
//! same wire contract: test doubles (and any server-side consumer) need to recover the exact
//! mapping a client encoded, and [`decode`] together with [`encode`] obeys a round-trip law:
//! decoding an encoded mapping yields the original mapping.
//!
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::str;

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

///
/// Failed to decode a form-urlencoded body.
///
#[derive(Debug, thiserror::Error)]
pub enum FormEncodingError {
    ///
    /// The body, or a percent-decoded key or value within it, is not valid UTF-8.
    ///
    #[error("Form-encoded data is not valid UTF-8")]
    InvalidUtf8(#[source] str::Utf8Error),
}

///
/// Serializes the given key-value pairs as an `application/x-www-form-urlencoded` body.
///
pub fn encode<I, K, V>(pairs: I) -> Vec<u8>
where
    I: IntoIterator,
    I::Item: Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
        .into_bytes()
}

///
/// Parses an `application/x-www-form-urlencoded` body back into a flat mapping.
///
/// Pairs are split on `&`, then each pair on the first `=`; a pair with no `=` yields an empty
/// value. Both sides are percent-decoded strictly: unlike the lossy parser in the `url` crate,
/// any UTF-8 violation (in the raw body or in a decoded component) is reported as
/// [`FormEncodingError`] rather than replaced. Control characters that decode cleanly are
/// preserved as-is.
///
pub fn decode(body: &[u8]) -> Result<HashMap<String, String>, FormEncodingError> {
    let body = str::from_utf8(body).map_err(FormEncodingError::InvalidUtf8)?;

    let mut fields = HashMap::new();
    for pair in body.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(decode_component(name)?, decode_component(value)?);
    }

    Ok(fields)
}

fn decode_component(component: &str) -> Result<String, FormEncodingError> {
    // In form encoding, '+' denotes a space; only the remainder is percent-escaped.
    let component = component.replace('+', " ");
    percent_decode_str(&component)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(FormEncodingError::InvalidUtf8)
}
