use std::collections::HashSet;
use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::crypto_schemes::envelope::{IV_LEN, KEY_LEN};
use crate::crypto_schemes::error::{Result, VotingError};

pub const DEFAULT_COMMUNICATION_KEY_BITS: usize = 1024;
pub const DEFAULT_SIGNING_KEY_BITS: usize = 2048;
pub const DEFAULT_DECOY_BATCHES: usize = 4;
// PKCS#1 v1.5 needs 11 bytes of padding around the wrapped key||IV
const MIN_COMMUNICATION_KEY_BITS: usize = (KEY_LEN + IV_LEN + 11) * 8;
const MIN_SIGNING_KEY_BITS: usize = 256;

fn default_communication_key_bits() -> usize {
    DEFAULT_COMMUNICATION_KEY_BITS
}
fn default_signing_key_bits() -> usize {
    DEFAULT_SIGNING_KEY_BITS
}
fn default_decoy_batches() -> usize {
    DEFAULT_DECOY_BATCHES
}

/// Everything needed to stand up an election authority. Voter ids are expected to already be
/// pseudonymous tokens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionConfig {
    pub voters: Vec<String>,
    pub candidates: Vec<String>,
    #[serde(default = "default_communication_key_bits")]
    pub communication_key_bits: usize,
    #[serde(default = "default_signing_key_bits")]
    pub signing_key_bits: usize,
    #[serde(default = "default_decoy_batches")]
    pub decoy_batches: usize,
}

impl ElectionConfig {
    pub fn new(voters: Vec<String>, candidates: Vec<String>) -> Self {
        ElectionConfig {
            voters,
            candidates,
            communication_key_bits: DEFAULT_COMMUNICATION_KEY_BITS,
            signing_key_bits: DEFAULT_SIGNING_KEY_BITS,
            decoy_batches: DEFAULT_DECOY_BATCHES,
        }
    }

    pub fn with_key_bits(mut self, communication_key_bits: usize, signing_key_bits: usize) -> Self {
        self.communication_key_bits = communication_key_bits;
        self.signing_key_bits = signing_key_bits;
        self
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read(path)
            .map_err(|e| VotingError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: ElectionConfig = serde_json::from_slice(&raw)
            .map_err(|e| VotingError::Config(format!("failed to parse {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| VotingError::Config(e.to_string()))?;
        fs::write(path, serialized)
            .map_err(|e| VotingError::Config(format!("failed to write {}: {}", path.display(), e)))
    }

    pub fn validate(&self) -> Result<()> {
        if self.candidates.is_empty() {
            return Err(VotingError::Config("no candidates".to_string()));
        }
        if self.voters.is_empty() {
            return Err(VotingError::Config("no voters".to_string()));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.voters.iter().find(|v| !seen.insert(v.as_str())) {
            return Err(VotingError::Config(format!("voter {} listed twice", dup)));
        }
        if self.communication_key_bits < MIN_COMMUNICATION_KEY_BITS {
            return Err(VotingError::Config(format!(
                "communication key must be at least {} bits",
                MIN_COMMUNICATION_KEY_BITS
            )));
        }
        if self.signing_key_bits < MIN_SIGNING_KEY_BITS {
            return Err(VotingError::Config(format!(
                "signing key must be at least {} bits",
                MIN_SIGNING_KEY_BITS
            )));
        }
        if self.decoy_batches == 0 {
            return Err(VotingError::Config("at least one decoy batch is required".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ElectionConfig {
        ElectionConfig::new(
            vec!["v1".to_string(), "v2".to_string()],
            vec!["Alice".to_string(), "Bob".to_string()],
        )
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let parsed: ElectionConfig =
            serde_json::from_str(r#"{"voters": ["v1"], "candidates": ["Alice"]}"#).unwrap();
        assert_eq!(parsed.communication_key_bits, 1024);
        assert_eq!(parsed.signing_key_bits, 2048);
        assert_eq!(parsed.decoy_batches, 4);
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn rejects_bad_rosters_and_keys() {
        assert!(config().validate().is_ok());

        let mut bad = config();
        bad.candidates.clear();
        assert!(matches!(bad.validate(), Err(VotingError::Config(_))));

        let mut bad = config();
        bad.voters.push("v1".to_string());
        assert!(matches!(bad.validate(), Err(VotingError::Config(_))));

        assert!(config().with_key_bits(256, 512).validate().is_err());
        assert!(config().with_key_bits(1024, 128).validate().is_err());

        let mut bad = config();
        bad.decoy_batches = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn file_round_trip() {
        let path = std::env::temp_dir().join(format!("election_config_{}.json", std::process::id()));
        let original = config().with_key_bits(1024, 512);
        original.to_file(&path).unwrap();
        assert_eq!(ElectionConfig::from_file(&path).unwrap(), original);
        let _ = fs::remove_file(&path);
    }
}
