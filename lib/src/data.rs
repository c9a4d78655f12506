use std::collections::BTreeMap;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use crate::crypto_schemes::communication::{rsa_decrypt_text, rsa_encrypt};
use crate::crypto_schemes::envelope::SealedEnvelope;
use crate::crypto_schemes::error::Result;
use crate::utils::ballot::Ballot;
use crate::utils::candidate::Candidate;

/// A decoy ballot with each of its three fields RSA-encrypted on its own.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EncryptedBallotFields {
    pub ballot_id: Vec<u8>,
    pub voter_id: Vec<u8>,
    pub candidate: Vec<u8>,
}

impl EncryptedBallotFields {
    pub fn encrypt(ballot: &Ballot, public_key: &RsaPublicKey) -> Result<Self> {
        Ok(EncryptedBallotFields {
            ballot_id: rsa_encrypt(ballot.ballot_id.as_bytes(), public_key)?,
            voter_id: rsa_encrypt(ballot.voter_id.as_bytes(), public_key)?,
            candidate: rsa_encrypt(ballot.candidate.to_string().as_bytes(), public_key)?,
        })
    }

    pub fn decrypt(&self, private_key: &RsaPrivateKey) -> Result<Ballot> {
        let ballot_id = rsa_decrypt_text(&self.ballot_id, private_key)?;
        let voter_id = rsa_decrypt_text(&self.voter_id, private_key)?;
        let candidate = rsa_decrypt_text(&self.candidate, private_key)?;
        Ballot::from_fields(&ballot_id, &voter_id, &candidate)
    }
}

//Sent by the voter to the authority to obtain its one blind signature
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BallotRegistration {
    pub decoy_batches: Vec<Vec<EncryptedBallotFields>>,
    pub blinded_ballot: SealedEnvelope,
}

//Sent by the voter to the authority when revealing the chosen ballot
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub encrypted_ballot: Vec<u8>,
    pub encrypted_signature: SealedEnvelope,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElectionResults {
    pub tally: Vec<Candidate>,
    pub turnout: usize,
    pub ledger: BTreeMap<String, String>,
}

impl ElectionResults {
    /// Candidate with the most votes, the earliest listed one on a tie. `None` before any vote.
    pub fn winner(&self) -> Option<&Candidate> {
        self.tally
            .iter()
            .filter(|c| c.vote_count > 0)
            .fold(None, |best: Option<&Candidate>, c| match best {
                Some(b) if b.vote_count >= c.vote_count => Some(b),
                _ => Some(c),
            })
    }

    pub fn turnout_percentage(&self, voter_count: usize) -> f64 {
        if voter_count == 0 {
            return 0.0;
        }
        self.turnout as f64 / voter_count as f64 * 100.0
    }
}
