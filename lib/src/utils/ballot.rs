use std::fmt;
use std::str::FromStr;
use rand::{thread_rng, Rng};
use serde::{Deserialize, Serialize};
use sha256::digest;
use crate::crypto_schemes::error::{Result, VotingError};

/// Stands in for the voter id on ballots that will be revealed at counting time.
pub const ANONYMOUS_VOTER: &str = "None";
pub const BALLOT_ID_LEN: usize = 10;
const SEPARATOR: char = '|';

/// `ballot_id|voter_id|candidate`, with a 1-based candidate index.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub ballot_id: String,
    pub voter_id: String,
    pub candidate: usize,
}

/// Random lowercase hex token of `len` characters (at most 64), cut from a SHA-256 digest.
pub fn random_token(len: usize) -> String {
    let nonce: u128 = thread_rng().gen();
    let mut token = digest(format!("{:032x}", nonce));
    token.truncate(len);
    token
}

pub fn generate_ballot_id() -> String {
    random_token(BALLOT_ID_LEN)
}

impl Ballot {
    pub fn new(voter_id: &str, candidate: usize) -> Self {
        Ballot {
            ballot_id: generate_ballot_id(),
            voter_id: voter_id.to_string(),
            candidate,
        }
    }

    pub fn anonymous(candidate: usize) -> Self {
        Ballot::new(ANONYMOUS_VOTER, candidate)
    }

    pub fn is_anonymous(&self) -> bool {
        self.voter_id == ANONYMOUS_VOTER
    }

    /// Rebuilds the ballot text from separately transported fields and parses it, so a field
    /// smuggling in an extra separator is caught as a malformed ballot.
    pub fn from_fields(ballot_id: &str, voter_id: &str, candidate: &str) -> Result<Self> {
        let text = format!("{}{}{}{}{}", ballot_id, SEPARATOR, voter_id, SEPARATOR, candidate);
        text.parse()
    }

    pub fn check_candidate(&self, candidate_count: usize) -> Result<()> {
        if self.candidate == 0 || self.candidate > candidate_count {
            return Err(VotingError::InvalidCandidateIndex(self.candidate.to_string()));
        }
        Ok(())
    }

    pub fn to_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Ballot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}{}", self.ballot_id, SEPARATOR, self.voter_id, SEPARATOR, self.candidate)
    }
}

impl FromStr for Ballot {
    type Err = VotingError;

    fn from_str(text: &str) -> Result<Self> {
        let fields: Vec<&str> = text.split(SEPARATOR).collect();
        let [ballot_id, voter_id, candidate] = fields.as_slice() else {
            return Err(VotingError::MalformedBallotFormat);
        };
        if ballot_id.is_empty() || voter_id.is_empty() {
            return Err(VotingError::MalformedBallotFormat);
        }
        Ok(Ballot {
            ballot_id: ballot_id.to_string(),
            voter_id: voter_id.to_string(),
            candidate: parse_candidate(candidate)?,
        })
    }
}

/// Plain base-10 digits only: no sign, no whitespace.
fn parse_candidate(field: &str) -> Result<usize> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VotingError::InvalidCandidateIndex(field.to_string()));
    }
    field
        .parse()
        .map_err(|_| VotingError::InvalidCandidateIndex(field.to_string()))
}
