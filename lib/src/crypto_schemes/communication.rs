use log::debug;
use rand::thread_rng;
use rsa::{Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use super::error::{Result, VotingError};

/// Generates the RSA keypair other parties use to send messages to its holder.
pub fn generate_keypair(bits: usize) -> Result<(RsaPrivateKey, RsaPublicKey)> {
    let mut rng = thread_rng();
    let private_key = RsaPrivateKey::new(&mut rng, bits)?;
    let public_key = RsaPublicKey::from(&private_key);
    Ok((private_key, public_key))
}

/// PKCS#1 v1.5 encryption of a short message. Anything longer than the key allows has to go
/// through a [`SealedEnvelope`](super::envelope::SealedEnvelope) instead.
pub fn rsa_encrypt(message: &[u8], public_key: &RsaPublicKey) -> Result<Vec<u8>> {
    let mut rng = thread_rng();
    public_key
        .encrypt(&mut rng, Pkcs1v15Encrypt, message)
        .map_err(encryption_error)
}

fn encryption_error(e: rsa::Error) -> VotingError {
    debug!("RSA encryption failed: {}", e);
    match e {
        rsa::Error::MessageTooLong => VotingError::EncodingTooLarge,
        other => VotingError::EncryptionFailure(other.to_string()),
    }
}

pub fn rsa_decrypt(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<Vec<u8>> {
    private_key
        .decrypt(Pkcs1v15Encrypt, ciphertext)
        .map_err(|e| {
            debug!("RSA decryption failed: {}", e);
            VotingError::DecryptionFailure
        })
}

pub fn rsa_decrypt_text(ciphertext: &[u8], private_key: &RsaPrivateKey) -> Result<String> {
    let plaintext = rsa_decrypt(ciphertext, private_key)?;
    String::from_utf8(plaintext).map_err(|_| {
        debug!("Decrypted message is not valid UTF-8");
        VotingError::DecryptionFailure
    })
}
