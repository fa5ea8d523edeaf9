// Query string parsing

use std::collections::HashMap;

/// Parse a raw query string (without the leading `?`) into a key/value map.
///
/// Pairs are form-urlencoded: `+` decodes to a space and percent escapes are
/// decoded. A key repeated later in the string overrides the earlier value.
/// Bracketed keys such as `ids[]` are kept literally.
pub fn parse_query(raw: &str) -> HashMap<String, String> {
    url::form_urlencoded::parse(raw.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}
