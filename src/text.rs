//! Whitespace-preserving name rewrites.

/// Split `raw` into (leading whitespace, core, trailing whitespace).
pub fn split_padding(raw: &str) -> (&str, &str, &str) {
    let without_leading = raw.trim_start();
    let leading = &raw[..raw.len() - without_leading.len()];
    let core = without_leading.trim_end();
    let trailing = &without_leading[core.len()..];
    (leading, core, trailing)
}

/// Rebuild a name as `leading + marker + value + marker + trailing`.
///
/// `value` defaults to the existing core, so `respell(raw, None, m)` only wraps
/// the name in markers. An empty marker leaves the padding untouched.
pub fn respell(raw: &str, value: Option<&str>, marker: &str) -> String {
    let (leading, core, trailing) = split_padding(raw);
    let value = value.unwrap_or(core);
    let mut out = String::with_capacity(raw.len() + value.len() + 2 * marker.len());
    out.push_str(leading);
    out.push_str(marker);
    out.push_str(value);
    out.push_str(marker);
    out.push_str(trailing);
    out
}

/// Uppercase the first character, like MediaWiki title normalization.
pub fn ucfirst(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
