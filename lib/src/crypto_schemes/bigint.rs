use num_bigint::{BigUint, RandBigInt};
use rand::Rng;

pub trait UsefulConstants {
    type Output;
    fn one() -> Self::Output;
    fn zero() -> Self::Output;
    fn two() -> Self::Output;
}

impl UsefulConstants for BigUint {
    type Output = BigUint;
    fn one() -> Self::Output {
        BigUint::from(1u8)
    }
    fn zero() -> Self::Output {
        BigUint::from(0u8)
    }
    fn two() -> Self::Output {
        BigUint::from(2u8)
    }
}

pub trait UsefulOperations {
    fn gcd(&self, other: &BigUint) -> BigUint;
    fn is_coprime_to(&self, other: &BigUint) -> bool;
}

impl UsefulOperations for BigUint {
    // Euclid is plenty for the handful of gcds per ballot
    fn gcd(&self, other: &BigUint) -> BigUint {
        let mut a = self.clone();
        let mut b = other.clone();
        while b != BigUint::zero() {
            let r = &a % &b;
            a = b;
            b = r;
        }
        a
    }

    fn is_coprime_to(&self, other: &BigUint) -> bool {
        self.gcd(other) == BigUint::one()
    }
}

/// Big-endian byte encoding with no leading zero bytes, as the ballots travel on the wire.
pub trait MinimalBytes {
    fn to_minimal_bytes(&self) -> Vec<u8>;
}

impl MinimalBytes for BigUint {
    fn to_minimal_bytes(&self) -> Vec<u8> {
        if *self == BigUint::zero() {
            return Vec::new();
        }
        self.to_bytes_be()
    }
}

/// Draws a uniform element of [2, modulo - 1] that is invertible modulo `modulo`.
///
/// Keeps drawing until the gcd check passes; for an RSA modulus a retry is practically never
/// needed but nothing here assumes it. Returns `None` when `modulo <= 2`, where that range is
/// empty.
pub fn random_unit<R: Rng + ?Sized>(rng: &mut R, modulo: &BigUint) -> Option<BigUint> {
    if *modulo <= BigUint::two() {
        return None;
    }
    let mut x = rng.gen_biguint_range(&BigUint::two(), modulo);
    while !x.is_coprime_to(modulo) {
        x = rng.gen_biguint_range(&BigUint::two(), modulo);
    }
    Some(x)
}
