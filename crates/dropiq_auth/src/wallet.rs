//! Wallet sign-in: challenge messages and EIP-191 signer recovery.
//!
//! The client signs [`sign_in_message`] with `personal_sign`; the server
//! recovers the signer from the 65-byte `r || s || v` signature and compares
//! it with the claimed address.

use secp256k1::ecdsa::{RecoverableSignature, RecoveryId};
use secp256k1::{Message, Secp256k1};
use tiny_keccak::{Hasher, Keccak};

use crate::error::{AuthError, AuthResult};

/// Validate and lowercase a `0x`-prefixed 20-byte hex address.
pub fn normalize_address(address: &str) -> AuthResult<String> {
    let trimmed = address.trim();
    let hex_part = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .ok_or_else(|| AuthError::InvalidAddress(address.to_string()))?;

    if hex_part.len() != 40 || !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(AuthError::InvalidAddress(address.to_string()));
    }

    Ok(format!("0x{}", hex_part.to_ascii_lowercase()))
}

/// The message a wallet signs to prove ownership.
pub fn sign_in_message(address: &str, nonce: &str) -> String {
    format!(
        "Sign in to DropIQ\n\nWallet: {}\nNonce: {}",
        address.to_lowercase(),
        nonce
    )
}

/// Generate a random alphanumeric nonce.
pub fn generate_nonce() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut out = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut out);
    out
}

/// Hash of a message with the `personal_sign` prefix applied.
pub fn eip191_hash(message: &str) -> [u8; 32] {
    let prefixed = format!("\x19Ethereum Signed Message:\n{}{}", message.len(), message);
    keccak256(prefixed.as_bytes())
}

fn address_of(pubkey: &secp256k1::PublicKey) -> String {
    let uncompressed = pubkey.serialize_uncompressed();
    let hash = keccak256(&uncompressed[1..]);
    format!("0x{}", hex::encode(&hash[12..]))
}

/// Recover the lowercased address that produced a `personal_sign` signature.
pub fn recover_address(message: &str, signature: &str) -> AuthResult<String> {
    let raw = hex::decode(signature.trim().trim_start_matches("0x"))
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;
    if raw.len() != 65 {
        return Err(AuthError::InvalidSignature(format!(
            "expected 65 bytes, got {}",
            raw.len()
        )));
    }

    // Wallets emit v as 27/28; some libraries emit 0/1.
    let v = match raw[64] {
        27 | 28 => raw[64] - 27,
        0 | 1 => raw[64],
        other => {
            return Err(AuthError::InvalidSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };

    let recovery_id = RecoveryId::from_i32(i32::from(v))
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;
    let signature = RecoverableSignature::from_compact(&raw[..64], recovery_id)
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;
    let digest = Message::from_digest_slice(&eip191_hash(message))
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;

    let pubkey = Secp256k1::verification_only()
        .recover_ecdsa(&digest, &signature)
        .map_err(|e| AuthError::InvalidSignature(e.to_string()))?;

    Ok(address_of(&pubkey))
}

/// True if `signature` over `message` was produced by `address`.
///
/// A malformed signature is an error; a valid signature from another key is
/// `Ok(false)`.
pub fn verify_signature(message: &str, signature: &str, address: &str) -> AuthResult<bool> {
    let expected = normalize_address(address)?;
    let recovered = recover_address(message, signature)?;
    Ok(recovered == expected)
}

/// Wallet-side signing, for tests and local tooling.
#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use super::*;
    use secp256k1::SecretKey;

    /// Sign like a wallet would, returning (address, hex signature).
    ///
    /// # Panics
    ///
    /// If `secret` is not a valid secp256k1 scalar (zero or above the curve order).
    pub fn personal_sign(secret: [u8; 32], message: &str) -> (String, String) {
        let secp = Secp256k1::new();
        let key = SecretKey::from_slice(&secret).expect("valid secret key");
        let pubkey = secp256k1::PublicKey::from_secret_key(&secp, &key);
        let digest = Message::from_digest(eip191_hash(message));
        let (recovery_id, compact) = secp
            .sign_ecdsa_recoverable(&digest, &key)
            .serialize_compact();

        let mut raw = compact.to_vec();
        raw.push(recovery_id.to_i32() as u8 + 27);
        (address_of(&pubkey), format!("0x{}", hex::encode(raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::personal_sign;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_normalize_address() {
        assert_eq!(
            normalize_address("0xAbCdEf0123456789abcdef0123456789ABCDEF01").unwrap(),
            "0xabcdef0123456789abcdef0123456789abcdef01"
        );
        assert!(normalize_address("abcdef0123456789abcdef0123456789abcdef01").is_err());
        assert!(normalize_address("0x1234").is_err());
        assert!(normalize_address("0xzzcdef0123456789abcdef0123456789abcdef01").is_err());
    }

    #[test]
    fn test_known_key_address() {
        // Private key 1 has a well-known address.
        let mut secret = [0u8; 32];
        secret[31] = 1;
        let (address, _) = personal_sign(secret, "hello");
        assert_eq!(address, "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf");
    }

    #[test]
    fn test_recover_round_trip() {
        let message = sign_in_message("0x7e5f4552091a69125d5dfcb7b8c2659029395bdf", "abc123");
        let (address, signature) = personal_sign([7u8; 32], &message);
        assert_eq!(recover_address(&message, &signature).unwrap(), address);
        assert!(verify_signature(&message, &signature, &address.to_uppercase().replace("0X", "0x")).unwrap());
    }

    #[test]
    fn test_signature_for_other_message_does_not_match() {
        let (address, signature) = personal_sign([7u8; 32], "message one");
        assert!(!verify_signature("message two", &signature, &address).unwrap());
    }

    #[test]
    fn test_malformed_signature() {
        assert!(matches!(
            recover_address("m", "0x1234"),
            Err(AuthError::InvalidSignature(_))
        ));
        assert!(recover_address("m", "not hex").is_err());
    }

    #[test]
    fn test_nonce_shape() {
        let a = generate_nonce();
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, generate_nonce());
    }
}
