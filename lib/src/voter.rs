use log::debug;
use rsa::RsaPublicKey;
use crate::crypto_schemes::blind_signature::{BlindingFactor, PublicKey};
use crate::crypto_schemes::communication::rsa_encrypt;
use crate::crypto_schemes::envelope::{self, SealedEnvelope};
use crate::crypto_schemes::error::{Result, VotingError};
use crate::data::{BallotRegistration, EncryptedBallotFields, VoteSubmission};
use crate::utils::ballot::Ballot;

/// One blinded anonymous ballot per candidate, index i holding candidate i + 1.
#[derive(Clone, Debug, Default)]
pub struct BlindBallots {
    pub blinded_ballots: Vec<Vec<u8>>,
    pub blinding_factors: Vec<BlindingFactor>,
    pub ballot_texts: Vec<String>,
}

/// Ballot text plus an unblinded authority signature over it, ready to be revealed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CastBallot {
    pub ballot_text: String,
    pub signature: Vec<u8>,
}

/// A voter's side of the protocol for a single session.
pub struct VoterAgent {
    voter_id: String,
    candidate_count: usize,
    signing_key: PublicKey,
    communication_key: RsaPublicKey,
    blind_ballots: BlindBallots,
}

impl VoterAgent {
    /// `signing_key` and `communication_key` are the authority's public keys.
    pub fn new(
        voter_id: &str,
        candidate_count: usize,
        signing_key: PublicKey,
        communication_key: RsaPublicKey,
    ) -> Self {
        VoterAgent {
            voter_id: voter_id.to_string(),
            candidate_count,
            signing_key,
            communication_key,
            blind_ballots: BlindBallots::default(),
        }
    }

    pub fn voter_id(&self) -> &str {
        &self.voter_id
    }

    /// Cut-and-choose decoys: `batch_count` batches, each holding one ballot per candidate
    /// under the voter's real id. They are shown to the authority in the clear and never signed.
    pub fn generate_decoy_batches(&self, batch_count: usize) -> Vec<Vec<Ballot>> {
        (0..batch_count)
            .map(|_| {
                (1..=self.candidate_count)
                    .map(|candidate| Ballot::new(&self.voter_id, candidate))
                    .collect()
            })
            .collect()
    }

    /// Blinds a fresh anonymous ballot for every candidate and keeps the factors and texts for
    /// unblinding later. Replaces any ballots from an earlier call.
    pub fn generate_blind_ballots(&mut self) -> Result<BlindBallots> {
        let mut blind_ballots = BlindBallots::default();
        for candidate in 1..=self.candidate_count {
            let ballot_text = Ballot::anonymous(candidate).to_text();
            let (blinded, factor) = self.signing_key.blind(ballot_text.as_bytes())?;
            blind_ballots.blinded_ballots.push(blinded);
            blind_ballots.blinding_factors.push(factor);
            blind_ballots.ballot_texts.push(ballot_text);
        }
        self.blind_ballots = blind_ballots.clone();
        Ok(blind_ballots)
    }

    pub fn encrypt_decoy_batches(&self, batches: &[Vec<Ballot>]) -> Result<Vec<Vec<EncryptedBallotFields>>> {
        batches
            .iter()
            .map(|batch| {
                batch
                    .iter()
                    .map(|ballot| EncryptedBallotFields::encrypt(ballot, &self.communication_key))
                    .collect()
            })
            .collect()
    }

    fn candidate_index(&self, candidate: usize) -> Result<usize> {
        candidate
            .checked_sub(1)
            .filter(|&i| i < self.blind_ballots.ballot_texts.len())
            .ok_or_else(|| VotingError::InvalidCandidateIndex(candidate.to_string()))
    }

    /// Seals only the chosen candidate's blinded ballot. The others never leave the voter.
    pub fn seal_blind_ballot(&self, candidate: usize) -> Result<SealedEnvelope> {
        let index = self.candidate_index(candidate)?;
        envelope::seal(&self.blind_ballots.blinded_ballots[index], &self.communication_key)
    }

    /// Builds the full registration request: encrypted decoys plus the sealed blinded ballot
    /// for `candidate`.
    pub fn prepare_registration(&mut self, batch_count: usize, candidate: usize) -> Result<BallotRegistration> {
        let decoys = self.generate_decoy_batches(batch_count);
        self.generate_blind_ballots()?;
        Ok(BallotRegistration {
            decoy_batches: self.encrypt_decoy_batches(&decoys)?,
            blinded_ballot: self.seal_blind_ballot(candidate)?,
        })
    }

    /// Unblinds the authority's signature for the chosen candidate's ballot and checks it before
    /// anything is revealed.
    pub fn cast_vote(&self, candidate: usize, blind_signature: &[u8]) -> Result<CastBallot> {
        let index = self.candidate_index(candidate)?;
        let ballot_text = &self.blind_ballots.ballot_texts[index];
        let factor = &self.blind_ballots.blinding_factors[index];

        let signature = self.signing_key.unblind(blind_signature, factor)?;
        if !self.signing_key.verify(ballot_text.as_bytes(), &signature) {
            debug!("Unblinded signature for candidate {} does not verify", candidate);
            return Err(VotingError::SignatureVerificationFailure);
        }
        Ok(CastBallot { ballot_text: ballot_text.clone(), signature })
    }

    pub fn seal_vote(&self, cast: &CastBallot) -> Result<VoteSubmission> {
        Ok(VoteSubmission {
            encrypted_ballot: rsa_encrypt(cast.ballot_text.as_bytes(), &self.communication_key)?,
            encrypted_signature: envelope::seal(&cast.signature, &self.communication_key)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto_schemes::blind_signature::KeyPair;
    use crate::crypto_schemes::communication::generate_keypair;
    use crate::crypto_schemes::envelope;
    use crate::utils::ballot::ANONYMOUS_VOTER;

    fn agent(candidate_count: usize) -> (VoterAgent, KeyPair) {
        let (agent, signer, _) = agent_with_channel(candidate_count);
        (agent, signer)
    }

    fn agent_with_channel(candidate_count: usize) -> (VoterAgent, KeyPair, rsa::RsaPrivateKey) {
        let signer = KeyPair::generate(512).unwrap();
        let (communication_sk, communication_key) = generate_keypair(1024).unwrap();
        let agent = VoterAgent::new("voter-7", candidate_count, signer.public_key().clone(), communication_key);
        (agent, signer, communication_sk)
    }

    #[test]
    fn decoys_carry_real_voter_id_for_every_candidate() {
        let (agent, _) = agent(3);
        let batches = agent.generate_decoy_batches(4);
        assert_eq!(batches.len(), 4);
        for batch in &batches {
            let candidates: Vec<usize> = batch.iter().map(|b| b.candidate).collect();
            assert_eq!(candidates, vec![1, 2, 3]);
            assert!(batch.iter().all(|b| b.voter_id == "voter-7"));
        }
    }

    #[test]
    fn blind_ballots_hide_voter_id() {
        let (mut agent, _) = agent(2);
        let blind = agent.generate_blind_ballots().unwrap();
        assert_eq!(blind.blinded_ballots.len(), 2);
        assert_eq!(blind.blinding_factors.len(), 2);
        for (i, text) in blind.ballot_texts.iter().enumerate() {
            let ballot: Ballot = text.parse().unwrap();
            assert_eq!(ballot.voter_id, ANONYMOUS_VOTER);
            assert_eq!(ballot.candidate, i + 1);
        }
        assert_ne!(blind.ballot_texts[0], blind.ballot_texts[1]);
    }

    #[test]
    fn cast_vote_unblinds_to_a_valid_signature() {
        let (mut agent, signer) = agent(2);
        let blind = agent.generate_blind_ballots().unwrap();
        let blind_signature = signer.sign_blinded(&blind.blinded_ballots[1]).unwrap();
        let cast = agent.cast_vote(2, &blind_signature).unwrap();
        assert_eq!(cast.ballot_text, blind.ballot_texts[1]);
        assert_eq!(cast.signature, signer.sign_direct(cast.ballot_text.as_bytes()).unwrap());
    }

    #[test]
    fn cast_vote_rejects_mismatched_signature_and_bad_index() {
        let (mut agent, signer) = agent(2);
        let blind = agent.generate_blind_ballots().unwrap();
        let for_first = signer.sign_blinded(&blind.blinded_ballots[0]).unwrap();
        assert_eq!(
            agent.cast_vote(2, &for_first).unwrap_err(),
            VotingError::SignatureVerificationFailure
        );
        assert!(matches!(agent.cast_vote(0, &for_first), Err(VotingError::InvalidCandidateIndex(_))));
        assert!(matches!(agent.cast_vote(3, &for_first), Err(VotingError::InvalidCandidateIndex(_))));
    }

    #[test]
    fn registration_carries_only_the_chosen_blinded_ballot() {
        let (mut agent, _, communication_sk) = agent_with_channel(3);
        let registration = agent.prepare_registration(2, 2).unwrap();
        assert_eq!(registration.decoy_batches.len(), 2);
        let blinded = envelope::open(&registration.blinded_ballot, &communication_sk).unwrap();
        assert_eq!(blinded, agent.blind_ballots.blinded_ballots[1]);

        assert!(matches!(agent.prepare_registration(2, 4), Err(VotingError::InvalidCandidateIndex(_))));
        assert!(matches!(agent.seal_blind_ballot(0), Err(VotingError::InvalidCandidateIndex(_))));
    }
}
