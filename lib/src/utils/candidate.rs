use serde::{Deserialize, Serialize};
use crate::crypto_schemes::error::{Result, VotingError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub name: String,
    pub vote_count: u64,
}

/// Ordered candidate list with running counts. Candidates are addressed by 1-based index, the
/// same numbering printed on ballots.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CandidatePool {
    pool: Vec<Candidate>,
}

impl CandidatePool {
    pub fn new() -> CandidatePool {
        CandidatePool { pool: Vec::new() }
    }

    pub fn add_candidate(&mut self, name: &str) {
        self.pool.push(Candidate::new(name));
    }

    pub fn get_candidate(&self, index: usize) -> Option<&Candidate> {
        index.checked_sub(1).and_then(|i| self.pool.get(i))
    }

    pub fn cast_vote(&mut self, index: usize) -> Result<()> {
        let candidate = index
            .checked_sub(1)
            .and_then(|i| self.pool.get_mut(i))
            .ok_or_else(|| VotingError::InvalidCandidateIndex(index.to_string()))?;
        candidate.vote_count += 1;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.pool
    }
}

impl<S: AsRef<str>> FromIterator<S> for CandidatePool {
    fn from_iter<I: IntoIterator<Item = S>>(names: I) -> Self {
        let mut pool = CandidatePool::new();
        names.into_iter().for_each(|name| pool.add_candidate(name.as_ref()));
        pool
    }
}

impl Candidate {
    pub fn new(name: &str) -> Candidate {
        Candidate {
            name: String::from(name),
            vote_count: 0,
        }
    }
}
