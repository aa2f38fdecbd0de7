use std::sync::LazyLock;

use regex::Regex;

/// Regex for validating URL-friendly slugs (lowercase alphanumeric with hyphens).
/// Examples: "acme", "north-agency", "studio-23"
pub static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9]+(?:-[a-z0-9]+)*$").unwrap());
