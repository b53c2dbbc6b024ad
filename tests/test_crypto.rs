//! Integration tests for the credential codec (§4.7).

use mcp_exec_daemon::crypto::{hash_for_logging, CredentialCodec, ENCRYPTED_PREFIX};

#[test]
fn round_trips_arbitrary_strings() {
    let codec = CredentialCodec::from_raw_key([7u8; 32]);
    for plaintext in ["", "hello", "a very long secret with spaces and 🔑 unicode"] {
        let ciphertext = codec.encrypt(plaintext);
        assert_eq!(codec.decrypt(&ciphertext).unwrap(), plaintext);
    }
}

#[test]
fn decrypt_strips_the_encrypted_prefix() {
    let codec = CredentialCodec::from_raw_key([3u8; 32]);
    let ciphertext = codec.encrypt("secret-value");
    let prefixed = format!("{ENCRYPTED_PREFIX}{ciphertext}");
    assert_eq!(codec.decrypt(&prefixed).unwrap(), "secret-value");
}

#[test]
fn tampered_ciphertext_fails_to_decrypt() {
    let codec = CredentialCodec::from_raw_key([9u8; 32]);
    let mut ciphertext = codec.encrypt("secret-value").into_bytes();
    let last = ciphertext.len() - 1;
    ciphertext[last] ^= 0xFF;
    let tampered = String::from_utf8(ciphertext).unwrap();
    assert!(codec.decrypt(&tampered).is_err());
}

#[test]
fn hash_for_logging_never_returns_the_secret() {
    let hash = hash_for_logging("super-secret-password");
    assert_eq!(hash.len(), 8);
    assert!(!hash.contains("super"));
}

#[test]
fn different_ciphertexts_for_same_plaintext_due_to_random_nonce() {
    let codec = CredentialCodec::from_raw_key([1u8; 32]);
    let a = codec.encrypt("same");
    let b = codec.encrypt("same");
    assert_ne!(a, b);
}
