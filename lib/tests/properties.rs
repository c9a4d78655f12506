//! Property-based tests for the blind signature scheme and the hybrid envelope

use std::sync::OnceLock;
use blind_signature_system::crypto_schemes::blind_signature::{BlindingFactor, KeyPair};
use blind_signature_system::crypto_schemes::communication::generate_keypair;
use blind_signature_system::crypto_schemes::envelope::{open, seal};
use num_bigint::BigUint;
use proptest::prelude::*;
use rsa::{RsaPrivateKey, RsaPublicKey};

fn signer() -> &'static KeyPair {
    static SIGNER: OnceLock<KeyPair> = OnceLock::new();
    SIGNER.get_or_init(|| KeyPair::generate(512).unwrap())
}

fn communication_keys() -> &'static (RsaPrivateKey, RsaPublicKey) {
    static KEYS: OnceLock<(RsaPrivateKey, RsaPublicKey)> = OnceLock::new();
    KEYS.get_or_init(|| generate_keypair(1024).unwrap())
}

// Property test: unblinding the signature of a blinded message gives the plain RSA signature
proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]
    #[test]
    fn unblinded_signature_equals_direct_signature(
        message in prop::collection::vec(any::<u8>(), 0..60),
        r_seed in prop::collection::vec(any::<u8>(), 1..64)
    ) {
        let key = signer();
        let public = key.public_key();
        let r = BigUint::from_bytes_be(&r_seed) % &public.n;
        prop_assume!(r >= BigUint::from(2u8));
        prop_assume!(r.modinv(&public.n).is_some());
        let factor = BlindingFactor::from(r);

        let blinded = public.blind_with(&message, &factor).unwrap();
        let signed = key.sign_blinded(&blinded).unwrap();
        let signature = public.unblind(&signed, &factor).unwrap();

        prop_assert_eq!(&signature, &key.sign_direct(&message).unwrap());
        prop_assert!(public.verify(&message, &signature));
    }
}

// Property test: a signature over one message does not verify for another
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn signature_does_not_transfer(
        message in prop::collection::vec(any::<u8>(), 1..40),
        other in prop::collection::vec(any::<u8>(), 1..40)
    ) {
        prop_assume!(BigUint::from_bytes_be(&message) != BigUint::from_bytes_be(&other));
        let key = signer();
        let signature = key.sign_direct(&message).unwrap();
        prop_assert!(!key.public_key().verify(&other, &signature));
    }
}

// Property test: envelopes round-trip payloads of any length
proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]
    #[test]
    fn envelope_round_trip(payload in prop::collection::vec(any::<u8>(), 0..512)) {
        let (private_key, public_key) = communication_keys();
        let envelope = seal(&payload, public_key).unwrap();
        prop_assert_eq!(envelope.ciphertext.len() % 16, 0);
        prop_assert!(envelope.ciphertext.len() > payload.len());
        prop_assert_eq!(open(&envelope, private_key).unwrap(), payload);
    }
}
