//! RFC 6238 time-based one-time passwords (HMAC-SHA1, 30 s step, 6 digits).

use data_encoding::BASE32_NOPAD;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha1::Sha1;

use crate::error::{AuthError, AuthResult};

type HmacSha1 = Hmac<Sha1>;

const STEP_SECS: u64 = 30;
const DIGITS: u32 = 6;
/// Accept codes from one step before and after the current one.
const SKEW_STEPS: i64 = 1;

/// A TOTP generator bound to one shared secret.
#[derive(Debug, Clone)]
pub struct Totp {
    secret: Vec<u8>,
}

impl Totp {
    /// Create from raw secret bytes.
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Create from a base32 secret as stored and shown to the user.
    pub fn from_base32(encoded: &str) -> AuthResult<Self> {
        let cleaned: String = encoded
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        let secret = BASE32_NOPAD
            .decode(cleaned.trim_end_matches('=').as_bytes())
            .map_err(|_| AuthError::InvalidTotpSecret)?;
        if secret.is_empty() {
            return Err(AuthError::InvalidTotpSecret);
        }
        Ok(Self { secret })
    }

    /// Generate a fresh 160-bit secret.
    pub fn generate() -> Self {
        let mut secret = vec![0u8; 20];
        rand::thread_rng().fill_bytes(&mut secret);
        Self { secret }
    }

    /// The secret as unpadded base32.
    pub fn secret_base32(&self) -> String {
        BASE32_NOPAD.encode(&self.secret)
    }

    /// `otpauth://` provisioning URL for authenticator apps.
    pub fn provisioning_url(&self, issuer: &str, account: &str) -> String {
        let label: String =
            url::form_urlencoded::byte_serialize(format!("{issuer}:{account}").as_bytes())
                .collect();
        let issuer_param: String =
            url::form_urlencoded::byte_serialize(issuer.as_bytes()).collect();
        format!(
            "otpauth://totp/{label}?secret={}&issuer={issuer_param}&algorithm=SHA1&digits={DIGITS}&period={STEP_SECS}",
            self.secret_base32()
        )
    }

    /// Code for a given unix time.
    pub fn code_at(&self, unix_secs: u64) -> String {
        self.code_for_counter(unix_secs / STEP_SECS)
    }

    fn code_for_counter(&self, counter: u64) -> String {
        // HMAC accepts keys of any length.
        let mut mac = match HmacSha1::new_from_slice(&self.secret) {
            Ok(mac) => mac,
            Err(_) => return String::new(),
        };
        mac.update(&counter.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let offset = (digest[digest.len() - 1] & 0x0f) as usize;
        let binary = u32::from_be_bytes([
            digest[offset] & 0x7f,
            digest[offset + 1],
            digest[offset + 2],
            digest[offset + 3],
        ]);
        let code = binary % 10u32.pow(DIGITS);
        format!("{code:0width$}", width = DIGITS as usize)
    }

    /// Check a user-supplied code at `unix_secs`, allowing one step of clock skew.
    pub fn verify_at(&self, code: &str, unix_secs: u64) -> bool {
        let code = code.trim();
        if code.len() != DIGITS as usize || !code.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        let counter = (unix_secs / STEP_SECS) as i64;
        (-SKEW_STEPS..=SKEW_STEPS)
            .filter_map(|delta| u64::try_from(counter + delta).ok())
            .any(|c| constant_time_eq(self.code_for_counter(c).as_bytes(), code.as_bytes()))
    }

    /// Check a code against the current time.
    pub fn verify(&self, code: &str) -> bool {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        self.verify_at(code, now)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
