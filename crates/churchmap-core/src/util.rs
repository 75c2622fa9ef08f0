/// Takes the second-to-last comma separated token of an address.
///
/// For `"123 Main St, Springfield, IL, USA"` this yields `"IL"`, not the town.
/// Addresses with fewer than two parts yield an empty string.
pub fn extract_city(address: &str) -> String {
    let parts: Vec<&str> = address.split(',').collect();
    if parts.len() >= 2 {
        parts[parts.len() - 2].trim().to_string()
    } else {
        String::new()
    }
}

/// Case-insensitive containment; `needle` must already be lowercase.
pub fn contains_lower(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(needle)
}
