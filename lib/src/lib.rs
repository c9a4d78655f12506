//! Anonymous voting over RSA blind signatures.
//!
//! A [`VoterAgent`] gets the [`ElectionAuthority`] to sign a blinded ballot, then reveals the
//! unblinded ballot and signature later so the authority cannot link the counted vote to the
//! registration.

pub mod authority;
pub mod configs;
pub mod crypto_schemes;
pub mod data;
pub mod utils;
pub mod voter;

pub use authority::ElectionAuthority;
pub use configs::election::ElectionConfig;
pub use crypto_schemes::error::{Result, VotingError};
pub use data::{BallotRegistration, ElectionResults, VoteSubmission};
pub use voter::{CastBallot, VoterAgent};
