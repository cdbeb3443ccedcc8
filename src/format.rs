//! Formatting helpers shared by entity decoding and listings.

/// Width catalog ids are zero-padded to.
pub const ID_WIDTH: usize = 4;

/// `25` -> `"0025"`. Ids wider than [`ID_WIDTH`] are left as-is.
pub fn pad_id(id: u32) -> String {
    format!("{:0width$}", id, width = ID_WIDTH)
}

/// Uppercases the first character only: `"mr-mime"` -> `"Mr-mime"`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Converts a value in tenths (hectograms, decimetres) to a one-decimal string.
///
/// `60` -> `"6.0"`, `4` -> `"0.4"`.
pub fn tenths(value: u32) -> String {
    format!("{:.1}", f64::from(value) / 10.0)
}

/// Parses a padded or plain numeric id: `"0025"` -> `Some(25)`.
pub fn parse_id(id: &str) -> Option<u32> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Extracts the trailing numeric segment of a resource URL.
///
/// `"https://pokeapi.co/api/v2/pokemon/25/"` -> `Some(25)`.
pub fn id_from_resource_url(url: &str) -> Option<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(parse_id)
}
