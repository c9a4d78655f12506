use aes_gcm::aes::Aes256;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use log::debug;
use rand::{thread_rng, RngCore};
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde::{Deserialize, Serialize};
use super::communication::{rsa_decrypt, rsa_encrypt};
use super::error::{Result, VotingError};

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

pub const KEY_LEN: usize = 32;
pub const IV_LEN: usize = 16;
pub const BLOCK_LEN: usize = 16;

/// Hybrid ciphertext: the payload under AES-256-CBC and the one-time key||IV under RSA.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedEnvelope {
    pub ciphertext: Vec<u8>,
    pub wrapped_key: Vec<u8>,
}

/// Encrypts a payload of any length for the holder of `recipient`'s private key.
pub fn seal(payload: &[u8], recipient: &RsaPublicKey) -> Result<SealedEnvelope> {
    let mut key_iv = [0u8; KEY_LEN + IV_LEN];
    thread_rng().fill_bytes(&mut key_iv);
    let (key, iv) = key_iv.split_at(KEY_LEN);

    let ciphertext = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|_| VotingError::EncryptionFailure("bad AES key or IV length".to_string()))?
        .encrypt_padded_vec_mut::<Pkcs7>(payload);
    let wrapped_key = rsa_encrypt(&key_iv, recipient)?;

    Ok(SealedEnvelope { ciphertext, wrapped_key })
}

/// Reverses [`seal`]. Every failure, whichever step it came from, surfaces as the same
/// `DecryptionFailure`.
pub fn open(envelope: &SealedEnvelope, recipient: &RsaPrivateKey) -> Result<Vec<u8>> {
    let key_iv = rsa_decrypt(&envelope.wrapped_key, recipient)?;
    if key_iv.len() != KEY_LEN + IV_LEN {
        debug!("Unwrapped key material has length {}", key_iv.len());
        return Err(VotingError::DecryptionFailure);
    }
    if envelope.ciphertext.is_empty() || envelope.ciphertext.len() % BLOCK_LEN != 0 {
        debug!("Ciphertext length {} is not a whole number of blocks", envelope.ciphertext.len());
        return Err(VotingError::DecryptionFailure);
    }
    let (key, iv) = key_iv.split_at(KEY_LEN);

    Aes256CbcDec::new_from_slices(key, iv)
        .map_err(|_| VotingError::DecryptionFailure)?
        .decrypt_padded_vec_mut::<Pkcs7>(&envelope.ciphertext)
        .map_err(|_| {
            debug!("Envelope padding check failed");
            VotingError::DecryptionFailure
        })
}
