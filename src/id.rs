//! ID generation utilities for Monologue
//!
//! Iteration ids are short and sortable; entity ids (worlds, rooms, messages) are
//! UUID-shaped so they line up with the identifiers the host runtime uses.

use rand::Rng;
use sha2::{Digest, Sha256};

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Generate an iteration ID
///
/// Format: `iter-{timestamp_ms}-{random_hex}`
/// Example: `iter-1738300800123-a1b2`
pub fn generate_iteration_id() -> String {
    let timestamp = now_ms();
    let random: u16 = rand::rng().random();
    format!("iter-{}-{:04x}", timestamp, random)
}

/// Generate a random UUID-shaped identifier.
pub fn generate_entity_id() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    format_uuid(&bytes)
}

/// Derive a stable UUID-shaped identifier from a namespace and seed.
///
/// The same inputs always produce the same id, across processes and restarts.
pub fn derive_entity_id(namespace: &str, seed: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(namespace.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed.as_bytes());
    let digest = hasher.finalize();
    format_uuid(&digest[..16])
}

fn format_uuid(bytes: &[u8]) -> String {
    let hex = hex::encode(bytes);
    format!(
        "{}-{}-{}-{}-{}",
        &hex[0..8],
        &hex[8..12],
        &hex[12..16],
        &hex[16..20],
        &hex[20..32]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_uuid_shape(id: &str) {
        let parts: Vec<&str> = id.split('-').collect();
        let lens: Vec<usize> = parts.iter().map(|p| p.len()).collect();
        assert_eq!(lens, vec![8, 4, 4, 4, 12]);
        assert!(parts.iter().all(|p| p.chars().all(|c| c.is_ascii_hexdigit())));
    }

    #[test]
    fn test_now_ms_returns_reasonable_timestamp() {
        let ts = now_ms();
        assert!(ts > 1577836800000); // 2020-01-01
        assert!(ts < 4102444800000); // 2100-01-01
    }

    #[test]
    fn test_generate_iteration_id_format() {
        let id = generate_iteration_id();
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "iter");
        assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_generate_entity_id_shape_and_uniqueness() {
        let a = generate_entity_id();
        let b = generate_entity_id();
        assert_uuid_shape(&a);
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_entity_id_is_stable() {
        let a = derive_entity_id("room", "agent-1");
        let b = derive_entity_id("room", "agent-1");
        assert_eq!(a, b);
        assert_uuid_shape(&a);
    }

    #[test]
    fn test_derive_entity_id_separates_namespaces() {
        assert_ne!(
            derive_entity_id("room", "agent-1"),
            derive_entity_id("world", "agent-1")
        );
        // The separator keeps ("ab", "c") and ("a", "bc") apart
        assert_ne!(derive_entity_id("ab", "c"), derive_entity_id("a", "bc"));
    }
}
