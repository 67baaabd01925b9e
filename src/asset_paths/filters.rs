use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

fn remote_scheme() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://").expect("invalid scheme regex"))
}

fn remote_url() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^https?://[^\s/?#]+[^\s]*$").expect("invalid url regex"))
}

/// Determine whether a shorthand reference names a remote asset.
///
/// Only lowercase `http://` and `https://` prefixes count; everything else is treated as a
/// path under the project root.
pub fn is_remote_reference(value: &str) -> bool {
    remote_scheme().is_match(value)
}

/// Check that a remote reference carries a host and no whitespace.
pub fn is_well_formed_url(value: &str) -> bool {
    remote_url().is_match(value)
}

/// Case-insensitive extension check. `expected` is given without the leading dot.
pub fn has_expected_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}
