//! CF-004: BLAKE3 hashing for logical ids and template fingerprints.

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Derive the template logical id for a construct.
///
/// Alphanumeric characters of `construct_id`, followed by the first 8 upper-case
/// hex digits of the hash of `"{construct_id}/{child}"`. The stack id is not an
/// input, so renaming a stack never renames its resources.
pub fn logical_id(construct_id: &str, child: &str) -> String {
    let human: String = construct_id
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    let path = format!("{construct_id}/{child}");
    let hex = blake3::hash(path.as_bytes()).to_hex();
    format!("{}{}", human, hex.as_str()[..8].to_ascii_uppercase())
}
