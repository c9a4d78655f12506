use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use log::{debug, info, warn};
use rsa::{RsaPrivateKey, RsaPublicKey};
use crate::configs::election::ElectionConfig;
use crate::crypto_schemes::blind_signature::{KeyPair, PublicKey};
use crate::crypto_schemes::communication::{generate_keypair, rsa_decrypt_text};
use crate::crypto_schemes::envelope::{self, SealedEnvelope};
use crate::crypto_schemes::error::{Result, VotingError};
use crate::data::{BallotRegistration, ElectionResults, EncryptedBallotFields, VoteSubmission};
use crate::utils::ballot::Ballot;
use crate::utils::candidate::CandidatePool;

/// Registry, tally and ledger. Only ever touched while holding the authority's lock.
struct AuthorityState {
    registry: HashMap<String, bool>,
    candidates: CandidatePool,
    ledger: BTreeMap<String, String>,
}

impl AuthorityState {
    fn check_eligible(&self, voter_id: &str) -> Result<()> {
        match self.registry.get(voter_id) {
            None => Err(VotingError::UnknownVoter),
            Some(true) => Err(VotingError::AlreadyRegisteredVoter),
            Some(false) => Ok(()),
        }
    }
}

/// The single election authority: validates decoy batches, hands out one blind signature per
/// voter and counts revealed ballots once per ballot id.
///
/// Shared between voter sessions behind an `Arc`. Decryption and modular exponentiation run
/// without the lock; the lock only covers the check-then-set steps on the registry and the
/// ledger.
pub struct ElectionAuthority {
    communication_sk: RsaPrivateKey,
    communication_pk: RsaPublicKey,
    signer: KeyPair,
    candidate_count: usize,
    state: Mutex<AuthorityState>,
}

impl ElectionAuthority {
    pub fn from_config(config: &ElectionConfig) -> Result<Self> {
        config.validate()?;
        Self::with_key_sizes(
            &config.voters,
            &config.candidates,
            config.communication_key_bits,
            config.signing_key_bits,
        )
    }

    pub fn with_key_sizes(
        voters: &[String],
        candidates: &[String],
        communication_key_bits: usize,
        signing_key_bits: usize,
    ) -> Result<Self> {
        let (communication_sk, communication_pk) = generate_keypair(communication_key_bits)?;
        let signer = KeyPair::generate(signing_key_bits)?;
        let registry = voters.iter().map(|v| (v.clone(), false)).collect();
        let candidates: CandidatePool = candidates.iter().collect();
        info!(
            "Election authority ready: {} voters, {} candidates, {}-bit signing key",
            voters.len(),
            candidates.len(),
            signer.public_key().bits()
        );
        Ok(ElectionAuthority {
            communication_sk,
            communication_pk,
            signer,
            candidate_count: candidates.len(),
            state: Mutex::new(AuthorityState {
                registry,
                candidates,
                ledger: BTreeMap::new(),
            }),
        })
    }

    /// Key voters encrypt everything they send to the authority with.
    pub fn communication_key(&self) -> &RsaPublicKey {
        &self.communication_pk
    }

    /// Public half of the blind-signature key, used by voters to blind and unblind.
    pub fn signing_key(&self) -> &PublicKey {
        self.signer.public_key()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    fn state(&self) -> MutexGuard<'_, AuthorityState> {
        // a panic while holding the lock cannot leave half-applied state, every mutation is a
        // single insert or increment
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validates every decoy ballot of every batch, then signs the one blinded ballot and marks
    /// the voter as registered. A voter gets exactly one blind signature over the whole election.
    ///
    /// Nothing is mutated unless the whole request is valid. Decoys are only format-checked and
    /// never signed.
    pub fn register_ballot_batch(
        &self,
        decoy_batches: &[Vec<EncryptedBallotFields>],
        blinded_ballot: &SealedEnvelope,
    ) -> Result<Vec<u8>> {
        self.try_register(decoy_batches, blinded_ballot)
            .map_err(|e| {
                warn!("Ballot registration rejected: {}", e);
                e
            })
    }

    pub fn register(&self, registration: &BallotRegistration) -> Result<Vec<u8>> {
        self.register_ballot_batch(&registration.decoy_batches, &registration.blinded_ballot)
    }

    fn try_register(
        &self,
        decoy_batches: &[Vec<EncryptedBallotFields>],
        blinded_ballot: &SealedEnvelope,
    ) -> Result<Vec<u8>> {
        let voter_id = self.validate_decoys(decoy_batches)?;

        let blinded = envelope::open(blinded_ballot, &self.communication_sk)?;
        let signature = self.signer.sign_blinded(&blinded)?;

        {
            // a concurrent session for the same voter may have won the race since validation
            let mut state = self.state();
            state.check_eligible(&voter_id)?;
            state.registry.insert(voter_id.clone(), true);
        }
        info!("Voter {} registered, blind signature issued", voter_id);
        Ok(signature)
    }

    /// Decrypts and checks all decoys, returning the one voter id they all carry.
    fn validate_decoys(&self, decoy_batches: &[Vec<EncryptedBallotFields>]) -> Result<String> {
        let mut voter_id: Option<String> = None;
        for (batch_index, batch) in decoy_batches.iter().enumerate() {
            for fields in batch {
                let ballot = fields.decrypt(&self.communication_sk)?;
                self.state().check_eligible(&ballot.voter_id)?;
                ballot.check_candidate(self.candidate_count)?;
                let first = voter_id.get_or_insert_with(|| ballot.voter_id.clone());
                if *first != ballot.voter_id {
                    debug!("Decoy batch {} names a second voter", batch_index);
                    return Err(VotingError::MalformedBallotFormat);
                }
            }
        }
        voter_id.ok_or(VotingError::MalformedBallotFormat)
    }

    /// Decrypts a revealed ballot and its unblinded signature, verifies the signature and counts
    /// the vote. A ballot id is counted at most once.
    pub fn count_vote(&self, encrypted_ballot: &[u8], encrypted_signature: &SealedEnvelope) -> Result<()> {
        self.try_count(encrypted_ballot, encrypted_signature)
            .map_err(|e| {
                warn!("Vote rejected: {}", e);
                e
            })
    }

    pub fn submit_vote(&self, submission: &VoteSubmission) -> Result<()> {
        self.count_vote(&submission.encrypted_ballot, &submission.encrypted_signature)
    }

    fn try_count(&self, encrypted_ballot: &[u8], encrypted_signature: &SealedEnvelope) -> Result<()> {
        let text = rsa_decrypt_text(encrypted_ballot, &self.communication_sk)?;
        let signature = envelope::open(encrypted_signature, &self.communication_sk)?;
        if !self.signer.public_key().verify(text.as_bytes(), &signature) {
            return Err(VotingError::SignatureVerificationFailure);
        }
        // voter id is deliberately ignored from here on
        let ballot: Ballot = text.parse()?;

        let mut state = self.state();
        if state.ledger.contains_key(&ballot.ballot_id) {
            return Err(VotingError::DuplicateBallotID(ballot.ballot_id));
        }
        state.candidates.cast_vote(ballot.candidate)?;
        state.ledger.insert(ballot.ballot_id.clone(), text);
        info!("Ballot {} counted", ballot.ballot_id);
        Ok(())
    }

    pub fn get_results(&self) -> ElectionResults {
        let state = self.state();
        ElectionResults {
            tally: state.candidates.candidates().to_vec(),
            turnout: state.ledger.len(),
            ledger: state.ledger.clone(),
        }
    }

    pub fn is_registered(&self, voter_id: &str) -> bool {
        self.state().registry.get(voter_id).copied().unwrap_or(false)
    }

    pub fn voter_count(&self) -> usize {
        self.state().registry.len()
    }
}
