//! Path decoding and query string reconstruction.

use percent_encoding::percent_decode_str;
use url::form_urlencoded;

/// Percent-decode a request path. `+` stays literal; invalid UTF-8 sequences
/// become U+FFFD.
pub fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

/// Decode one form-encoded component (`+` is a space).
fn decode_component(component: &str) -> String {
    let spaced = component.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

/// Re-encode query parameters as `application/x-www-form-urlencoded`.
///
/// Load balancers forward keys and values still encoded, so `decode_first`
/// decodes each of them before encoding to avoid double-encoding.
pub fn encode_query<'a, I>(params: I, decode_first: bool) -> String
where
    I: IntoIterator<Item = (&'a str, &'a [String])>,
{
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, values) in params {
        for value in values {
            if decode_first {
                serializer.append_pair(&decode_component(key), &decode_component(value));
            } else {
                serializer.append_pair(key, value);
            }
        }
    }
    serializer.finish()
}
