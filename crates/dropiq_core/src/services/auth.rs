//! Hybrid authentication: email/password, wallet signatures, TOTP second factor.

use chrono::{Duration, Utc};
use dropiq_auth::{
    generate_nonce, hash_password, normalize_address, sign_in_message, verify_password,
    verify_signature, AuthError, TokenService, Totp,
};
use dropiq_db::{queries, DbError, DropiqDb, User, UserRole, Wallet, WalletNonce};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::{CoreError, CoreResult};

const MIN_PASSWORD_CHARS: usize = 8;
const MAX_PASSWORD_CHARS: usize = 256;
const DEFAULT_WALLET_CHAIN: i64 = 1;

/// A signed-in user and their bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Challenge a wallet must sign to sign in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletChallenge {
    pub nonce: String,
    pub message: String,
    pub expires_at: chrono::DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoFactorSetup {
    /// Base32 secret for manual entry
    pub secret: String,
    pub otpauth_url: String,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    db: DropiqDb,
    tokens: TokenService,
    nonce_ttl: Duration,
    totp_issuer: String,
}

fn unauthorized(message: &str) -> CoreError {
    CoreError::Unauthorized(message.to_string())
}

/// Minimal shape check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn validate_email(email: &str) -> CoreResult<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid && email.len() <= 254 {
        Ok(email)
    } else {
        Err(CoreError::validation("email", "must be a valid email address"))
    }
}

fn validate_password(password: &str) -> CoreResult<()> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_CHARS {
        return Err(CoreError::validation(
            "password",
            format!("must be at least {MIN_PASSWORD_CHARS} characters"),
        ));
    }
    if len > MAX_PASSWORD_CHARS {
        return Err(CoreError::validation("password", "is too long"));
    }
    Ok(())
}

fn wallet_address(address: &str) -> CoreResult<String> {
    normalize_address(address).map_err(|_| {
        CoreError::validation("address", "must be a 0x-prefixed 20-byte hex address")
    })
}

impl AuthService {
    pub fn new(db: DropiqDb, config: &AuthConfig) -> Self {
        Self {
            db,
            tokens: TokenService::new(&config.jwt_secret, config.token_ttl_hours),
            nonce_ttl: Duration::minutes(config.nonce_ttl_minutes),
            totp_issuer: config.totp_issuer.clone(),
        }
    }

    fn session(&self, user: User) -> CoreResult<AuthSession> {
        let token = self.tokens.issue(&user.id, &user.role.to_string())?;
        Ok(AuthSession { token, user })
    }

    /// Create an email/password account.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> CoreResult<AuthSession> {
        let email = validate_email(email)?;
        validate_password(password)?;
        let display_name = super::optional_text("display_name", display_name, 64)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: Some(email.clone()),
            password_hash: Some(hash_password(password)?),
            display_name,
            bio: None,
            avatar_url: None,
            role: UserRole::User,
            two_factor_secret: None,
            two_factor_enabled: false,
            created_at: now,
            updated_at: now,
        };

        queries::create_user(self.db.pool(), &user)
            .await
            .map_err(|e| match e {
                DbError::AlreadyExists { .. } => {
                    CoreError::Conflict("email is already registered".to_string())
                }
                other => other.into(),
            })?;

        info!(user_id = %user.id, "User registered");
        self.session(user)
    }

    /// Email/password sign-in, with a TOTP code when 2FA is enabled.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        totp_code: Option<&str>,
    ) -> CoreResult<AuthSession> {
        let user = queries::get_user_by_email(self.db.pool(), email.trim())
            .await?
            .ok_or_else(|| unauthorized("invalid email or password"))?;

        let hash = user
            .password_hash
            .as_deref()
            .ok_or_else(|| unauthorized("invalid email or password"))?;
        if !verify_password(password, hash)? {
            return Err(unauthorized("invalid email or password"));
        }

        if user.two_factor_enabled {
            let code = totp_code.ok_or_else(|| unauthorized("two-factor code required"))?;
            if !self.check_totp(&user, code)? {
                return Err(unauthorized("invalid two-factor code"));
            }
        }

        debug!(user_id = %user.id, "Password login");
        self.session(user)
    }

    /// Issue a single-use sign-in challenge for a wallet.
    pub async fn wallet_challenge(&self, address: &str) -> CoreResult<WalletChallenge> {
        let address = wallet_address(address)?;
        let purged = queries::cleanup_expired_nonces(self.db.pool()).await?;
        if purged > 0 {
            debug!(purged, "Purged expired wallet nonces");
        }

        let nonce = generate_nonce();
        let expires_at = Utc::now() + self.nonce_ttl;

        queries::upsert_wallet_nonce(
            self.db.pool(),
            &WalletNonce {
                address: address.clone(),
                nonce: nonce.clone(),
                expires_at,
            },
        )
        .await?;

        Ok(WalletChallenge {
            message: sign_in_message(&address, &nonce),
            nonce,
            expires_at,
        })
    }

    /// Verify a signed challenge, creating a wallet-only account on first sign-in.
    pub async fn wallet_sign_in(&self, address: &str, signature: &str) -> CoreResult<AuthSession> {
        let address = wallet_address(address)?;
        let challenge = queries::take_wallet_nonce(self.db.pool(), &address)
            .await?
            .ok_or_else(|| unauthorized("no pending sign-in challenge"))?;
        if challenge.expires_at < Utc::now() {
            return Err(unauthorized("sign-in challenge expired"));
        }

        let message = sign_in_message(&address, &challenge.nonce);
        match verify_signature(&message, signature, &address) {
            Ok(true) => {}
            Ok(false) => return Err(unauthorized("signature does not match address")),
            Err(AuthError::InvalidSignature(_)) => return Err(unauthorized("invalid signature")),
            Err(e) => return Err(e.into()),
        }

        let user = match queries::get_user_by_wallet(self.db.pool(), &address).await? {
            Some(user) => user,
            None => self.create_wallet_user(&address).await?,
        };
        self.session(user)
    }

    async fn create_wallet_user(&self, address: &str) -> CoreResult<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: None,
            password_hash: None,
            display_name: None,
            bio: None,
            avatar_url: None,
            role: UserRole::User,
            two_factor_secret: None,
            two_factor_enabled: false,
            created_at: now,
            updated_at: now,
        };
        queries::create_user(self.db.pool(), &user).await?;

        let wallet = Wallet {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            address: address.to_string(),
            chain_id: DEFAULT_WALLET_CHAIN,
            label: None,
            is_primary: true,
            created_at: now,
        };
        match queries::create_wallet(self.db.pool(), &wallet).await {
            Ok(()) => {
                info!(user_id = %user.id, "Wallet user created");
                Ok(user)
            }
            // A concurrent sign-in linked the wallet first; use that account.
            Err(DbError::AlreadyExists { .. }) => {
                queries::get_user_by_wallet(self.db.pool(), address)
                    .await?
                    .ok_or_else(|| CoreError::not_found("User", address))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate(&self, token: &str) -> CoreResult<User> {
        let claims = self
            .tokens
            .verify(token)
            .map_err(|_| unauthorized("invalid or expired token"))?;
        queries::get_user(self.db.pool(), &claims.sub)
            .await?
            .ok_or_else(|| unauthorized("unknown user"))
    }

    fn check_totp(&self, user: &User, code: &str) -> CoreResult<bool> {
        let secret = user
            .two_factor_secret
            .as_deref()
            .ok_or_else(|| CoreError::validation("code", "two-factor setup has not been started"))?;
        Ok(Totp::from_base32(secret)?.verify(code))
    }

    async fn reload(&self, user: &User) -> CoreResult<User> {
        queries::get_user(self.db.pool(), &user.id)
            .await?
            .ok_or_else(|| unauthorized("unknown user"))
    }

    /// Generate and store a TOTP secret. 2FA stays off until confirmed.
    pub async fn setup_two_factor(&self, user: &User) -> CoreResult<TwoFactorSetup> {
        let user = self.reload(user).await?;
        if user.two_factor_enabled {
            return Err(CoreError::Conflict(
                "two-factor authentication is already enabled".to_string(),
            ));
        }

        let totp = Totp::generate();
        let secret = totp.secret_base32();
        queries::set_two_factor_secret(self.db.pool(), &user.id, Some(&secret)).await?;

        let account = user.email.clone().unwrap_or_else(|| user.id.clone());
        Ok(TwoFactorSetup {
            otpauth_url: totp.provisioning_url(&self.totp_issuer, &account),
            secret,
        })
    }

    /// Confirm setup with a valid code.
    pub async fn enable_two_factor(&self, user: &User, code: &str) -> CoreResult<User> {
        let user = self.reload(user).await?;
        if !self.check_totp(&user, code)? {
            return Err(CoreError::validation("code", "invalid two-factor code"));
        }
        queries::set_two_factor_enabled(self.db.pool(), &user.id, true).await?;
        info!(user_id = %user.id, "Two-factor enabled");
        self.reload(&user).await
    }

    /// Turn 2FA off and discard the secret. Requires a valid code.
    pub async fn disable_two_factor(&self, user: &User, code: &str) -> CoreResult<User> {
        let user = self.reload(user).await?;
        if !user.two_factor_enabled {
            return Err(CoreError::validation("code", "two-factor authentication is not enabled"));
        }
        if !self.check_totp(&user, code)? {
            return Err(CoreError::validation("code", "invalid two-factor code"));
        }
        queries::set_two_factor_secret(self.db.pool(), &user.id, None).await?;
        info!(user_id = %user.id, "Two-factor disabled");
        self.reload(&user).await
    }

    /// Grant the admin role by email.
    pub async fn promote_admin(&self, email: &str) -> CoreResult<User> {
        let user = queries::get_user_by_email(self.db.pool(), email.trim())
            .await?
            .ok_or_else(|| CoreError::not_found("User", email))?;
        queries::set_user_role(self.db.pool(), &user.id, UserRole::Admin).await?;
        info!(user_id = %user.id, "User promoted to admin");
        self.reload(&user).await
    }
}
