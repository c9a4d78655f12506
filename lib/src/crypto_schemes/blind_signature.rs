use std::fmt;
use num_bigint::BigUint;
use num_prime::RandPrime;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use super::bigint::{random_unit, MinimalBytes, UsefulConstants, UsefulOperations};
use super::error::{Result, VotingError};

pub const PUBLIC_EXPONENT: u32 = 65537;
const MIN_MODULUS_BITS: usize = 64;

/// Public half of the authority's signing key. This is all a voter ever holds: enough to blind,
/// unblind and verify, never to sign.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// Full RSA signing key {n, e, d}, kept by the election authority.
#[derive(Clone)]
pub struct KeyPair {
    public_key: PublicKey,
    d: BigUint,
}

/// Multiplicative mask r, invertible modulo n. Lives only as long as the voter's session.
#[derive(Clone, PartialEq, Eq)]
pub struct BlindingFactor(BigUint);

impl BlindingFactor {
    /// Fails when the key's modulus is too small to hold any factor.
    pub fn random(key: &PublicKey) -> Result<Self> {
        random_unit(&mut thread_rng(), &key.n)
            .map(BlindingFactor)
            .ok_or(VotingError::NonInvertibleFactor)
    }

    pub fn value(&self) -> &BigUint {
        &self.0
    }
}

impl From<BigUint> for BlindingFactor {
    fn from(r: BigUint) -> Self {
        BlindingFactor(r)
    }
}

impl fmt::Debug for BlindingFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BlindingFactor(..)")
    }
}

impl PublicKey {
    /// Interprets the message bytes as a big-endian integer, which must stay below n.
    pub fn encode(&self, message: &[u8]) -> Result<BigUint> {
        let m = BigUint::from_bytes_be(message);
        if m >= self.n {
            return Err(VotingError::EncodingTooLarge);
        }
        Ok(m)
    }

    /// Blinds `message` under a freshly drawn factor: returns (m * r^e mod n, r).
    pub fn blind(&self, message: &[u8]) -> Result<(Vec<u8>, BlindingFactor)> {
        let factor = BlindingFactor::random(self)?;
        let blinded = self.blind_with(message, &factor)?;
        Ok((blinded, factor))
    }

    pub fn blind_with(&self, message: &[u8], factor: &BlindingFactor) -> Result<Vec<u8>> {
        let m = self.encode(message)?;
        if factor.0 < BigUint::two() || factor.0 >= self.n || !factor.0.is_coprime_to(&self.n) {
            return Err(VotingError::NonInvertibleFactor);
        }
        let blinded = (m * factor.0.modpow(&self.e, &self.n)) % &self.n;
        Ok(blinded.to_minimal_bytes())
    }

    /// Strips the mask from a signature over a blinded message: s' * r^-1 mod n.
    pub fn unblind(&self, signed_blinded: &[u8], factor: &BlindingFactor) -> Result<Vec<u8>> {
        let r_inv = factor
            .0
            .modinv(&self.n)
            .ok_or(VotingError::NonInvertibleFactor)?;
        let signed = BigUint::from_bytes_be(signed_blinded);
        let signature = (signed * r_inv) % &self.n;
        Ok(signature.to_minimal_bytes())
    }

    pub fn verify(&self, message: &[u8], signature: &[u8]) -> bool {
        let Ok(m) = self.encode(message) else { return false };
        let s = BigUint::from_bytes_be(signature);
        if s >= self.n {
            return false;
        }
        s.modpow(&self.e, &self.n) == m
    }

    pub fn bits(&self) -> u64 {
        self.n.bits()
    }
}

impl KeyPair {
    /// Generates a fresh modulus of `bits` bits from two random primes with e = 65537.
    pub fn generate(bits: usize) -> Result<Self> {
        if bits < MIN_MODULUS_BITS {
            return Err(VotingError::KeyGeneration(format!(
                "signing modulus must be at least {} bits, got {}",
                MIN_MODULUS_BITS, bits
            )));
        }
        let mut rng = thread_rng();
        let e = BigUint::from(PUBLIC_EXPONENT);
        loop {
            let p: BigUint = rng.gen_prime_exact(bits / 2, None);
            let q: BigUint = rng.gen_prime_exact(bits - bits / 2, None);
            if p == q {
                continue;
            }
            let phi = (&p - BigUint::one()) * (&q - BigUint::one());
            // e must be invertible modulo phi(n), otherwise draw new primes
            if let Some(d) = e.modinv(&phi) {
                let n = p * q;
                return Ok(KeyPair { public_key: PublicKey { n, e }, d });
            }
        }
    }

    pub fn from_components(n: BigUint, e: BigUint, d: BigUint) -> Self {
        KeyPair { public_key: PublicKey { n, e }, d }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Signs an already blinded message: blinded^d mod n. The signer learns nothing about the
    /// message hidden behind the mask.
    pub fn sign_blinded(&self, blinded: &[u8]) -> Result<Vec<u8>> {
        let b = BigUint::from_bytes_be(blinded);
        if b >= self.public_key.n {
            return Err(VotingError::EncodingTooLarge);
        }
        Ok(b.modpow(&self.d, &self.public_key.n).to_minimal_bytes())
    }

    /// Textbook RSA signature over the unblinded message.
    pub fn sign_direct(&self, message: &[u8]) -> Result<Vec<u8>> {
        let m = self.public_key.encode(message)?;
        Ok(m.modpow(&self.d, &self.public_key.n).to_minimal_bytes())
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .finish_non_exhaustive()
    }
}
