//! Cache key derivation.

use crate::types::{ClientProfile, Specialist};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Composite key of one cached specialist reply.
///
/// `client` is `"{identity}_{agent}_{profile digest}"` truncated to the
/// configured length; `path` is the specialist route. The store key string is
/// `"{client}_{path}"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub client: String,
    pub path: String,
}

impl CacheKey {
    pub fn new(client: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            client: client.into(),
            path: path.into(),
        }
    }

    /// Leading `_` segment of the composite key (the network identity, unless
    /// the identity itself contains an underscore).
    pub fn client_identity(&self) -> &str {
        self.client.split('_').next().unwrap_or("")
    }

    /// Trailing `/` segment of the specialist path (`"/api/diet"` -> `"diet"`).
    pub fn specialist_label(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or("")
    }

    pub fn specialist(&self) -> Option<Specialist> {
        Specialist::from_label(self.specialist_label())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}", self.client, self.path)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConfig {
    /// Hex characters of the profile digest kept in the key.
    pub digest_len: usize,
    /// Upper bound, in characters, of the client part of the key.
    pub max_client_len: usize,
}

impl Default for KeyConfig {
    fn default() -> Self {
        Self {
            digest_len: 12,
            max_client_len: 150,
        }
    }
}

/// Builds [`CacheKey`]s from client identity and profile.
///
/// Truncation to `max_client_len` may make two long agent strings collide;
/// the only effect is an over-eager hit or miss.
#[derive(Debug, Clone, Default)]
pub struct ProfileKeyBuilder {
    config: KeyConfig,
}

impl ProfileKeyBuilder {
    pub fn new(config: KeyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeyConfig {
        &self.config
    }

    /// Short hex digest of the profile fields that participate in the key.
    pub fn profile_digest(&self, profile: &ClientProfile) -> String {
        let canonical = profile.key_fields().to_string();
        let mut hasher = Sha256::new();
        hasher.update(canonical.as_bytes());
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        hash.chars().take(self.config.digest_len).collect()
    }

    pub fn build_key(
        &self,
        identity: &str,
        agent: &str,
        profile: &ClientProfile,
        specialist_path: &str,
    ) -> CacheKey {
        let digest = self.profile_digest(profile);
        let client: String = format!("{}_{}_{}", identity, agent, digest)
            .chars()
            .take(self.config.max_client_len)
            .collect();
        CacheKey::new(client, specialist_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn profile(v: serde_json::Value) -> ClientProfile {
        serde_json::from_value(v).unwrap()
    }

    fn sample() -> ClientProfile {
        profile(json!({
            "name": "A", "age": 30, "weight": 80, "height": 180,
            "goal": "lose", "activity": "high"
        }))
    }

    #[test]
    fn test_key_is_deterministic() {
        let b = ProfileKeyBuilder::default();
        let k1 = b.build_key("10.0.0.1", "Mozilla/5.0", &sample(), "/api/trainer");
        let k2 = b.build_key("10.0.0.1", "Mozilla/5.0", &sample(), "/api/trainer");
        assert_eq!(k1, k2);
        assert_eq!(k1.to_string(), k2.to_string());
    }

    #[test]
    fn test_any_field_changes_key() {
        let b = ProfileKeyBuilder::default();
        let base = b.build_key("10.0.0.1", "ua", &sample(), "/api/trainer");

        assert_ne!(base, b.build_key("10.0.0.2", "ua", &sample(), "/api/trainer"));
        assert_ne!(base, b.build_key("10.0.0.1", "ua2", &sample(), "/api/trainer"));
        assert_ne!(base, b.build_key("10.0.0.1", "ua", &sample(), "/api/diet"));

        for (field, value) in [
            ("name", json!("B")),
            ("age", json!(31)),
            ("weight", json!(81)),
            ("height", json!(181)),
            ("goal", json!("gain")),
            ("activity", json!("low")),
        ] {
            let mut v = serde_json::to_value(sample()).unwrap();
            v[field] = value;
            let changed = b.build_key("10.0.0.1", "ua", &profile(v), "/api/trainer");
            assert_ne!(base, changed, "changing {field} must change the key");
        }
    }

    #[test]
    fn test_additional_info_does_not_change_key() {
        let b = ProfileKeyBuilder::default();
        let mut with_note = sample();
        with_note.additional_info = Some(json!("bad knee"));
        assert_eq!(
            b.build_key("ip", "ua", &sample(), "/api/energy"),
            b.build_key("ip", "ua", &with_note, "/api/energy")
        );
    }

    #[test]
    fn test_digest_length_and_shape() {
        let b = ProfileKeyBuilder::default();
        let digest = b.profile_digest(&sample());
        assert_eq!(digest.len(), 12);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(b.profile_digest(&ClientProfile::default()).len(), 12);
    }

    #[test]
    fn test_client_part_is_capped() {
        let b = ProfileKeyBuilder::default();
        let agent = "x".repeat(400);
        let key = b.build_key("10.0.0.1", &agent, &sample(), "/api/diet");
        assert_eq!(key.client.chars().count(), 150);
        assert_eq!(key.path, "/api/diet");
    }

    #[test]
    fn test_cap_respects_char_boundaries() {
        let b = ProfileKeyBuilder::new(KeyConfig {
            digest_len: 12,
            max_client_len: 10,
        });
        let key = b.build_key("ip", "ÄÖÜäöüßÄÖÜ", &sample(), "/api/diet");
        assert_eq!(key.client.chars().count(), 10);
        assert!(key.client.starts_with("ip_ÄÖÜ"));
    }

    #[test]
    fn test_key_segments() {
        let key = CacheKey::new("10.0.0.1_Mozilla_abcdef012345", "/api/energy");
        assert_eq!(key.client_identity(), "10.0.0.1");
        assert_eq!(key.specialist_label(), "energy");
        assert_eq!(key.specialist(), Some(Specialist::Energy));
        assert_eq!(key.to_string(), "10.0.0.1_Mozilla_abcdef012345_/api/energy");
    }
}
