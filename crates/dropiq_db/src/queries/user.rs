//! User, wallet and wallet-nonce queries.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::{DbError, DbResult};
use crate::models::{User, UserRole, Wallet, WalletNonce};

// ============================================================================
// Users
// ============================================================================

/// Create a new user. A duplicate email yields [`DbError::AlreadyExists`].
pub async fn create_user(pool: &SqlitePool, user: &User) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, password_hash, display_name, bio, avatar_url, role,
                           two_factor_secret, two_factor_enabled, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(&user.bio)
    .bind(&user.avatar_url)
    .bind(user.role)
    .bind(&user.two_factor_secret)
    .bind(user.two_factor_enabled)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await
    .map_err(|e| {
        DbError::from_insert(e, "User", user.email.clone().unwrap_or_else(|| user.id.clone()))
    })?;
    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, id: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Get a user by (lowercased) email.
pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Get the user owning a wallet address.
pub async fn get_user_by_wallet(pool: &SqlitePool, address: &str) -> DbResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN wallets w ON w.user_id = u.id
        WHERE w.address = ?
        "#,
    )
    .bind(address.to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

/// Update profile fields. `None` leaves a field unchanged.
pub async fn update_user_profile(
    pool: &SqlitePool,
    id: &str,
    display_name: Option<&str>,
    bio: Option<&str>,
    avatar_url: Option<&str>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET display_name = COALESCE(?, display_name),
            bio = COALESCE(?, bio),
            avatar_url = COALESCE(?, avatar_url),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(display_name)
    .bind(bio)
    .bind(avatar_url)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Change a user's role.
pub async fn set_user_role(pool: &SqlitePool, id: &str, role: UserRole) -> DbResult<bool> {
    let result = sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
        .bind(role)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Store (or clear) the TOTP secret. Clearing also disables 2FA.
pub async fn set_two_factor_secret(
    pool: &SqlitePool,
    id: &str,
    secret: Option<&str>,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE users
        SET two_factor_secret = ?,
            two_factor_enabled = CASE WHEN ? IS NULL THEN 0 ELSE two_factor_enabled END,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(secret)
    .bind(secret)
    .bind(Utc::now())
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Turn TOTP enforcement on or off.
pub async fn set_two_factor_enabled(pool: &SqlitePool, id: &str, enabled: bool) -> DbResult<bool> {
    let result =
        sqlx::query("UPDATE users SET two_factor_enabled = ?, updated_at = ? WHERE id = ?")
            .bind(enabled)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Wallets
// ============================================================================

/// Link a wallet. A duplicate address yields [`DbError::AlreadyExists`].
pub async fn create_wallet(pool: &SqlitePool, wallet: &Wallet) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO wallets (id, user_id, address, chain_id, label, is_primary, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&wallet.id)
    .bind(&wallet.user_id)
    .bind(wallet.address.to_lowercase())
    .bind(wallet.chain_id)
    .bind(&wallet.label)
    .bind(wallet.is_primary)
    .bind(wallet.created_at)
    .execute(pool)
    .await
    .map_err(|e| DbError::from_insert(e, "Wallet", wallet.address.clone()))?;
    Ok(())
}

/// Get a wallet by address.
pub async fn get_wallet_by_address(pool: &SqlitePool, address: &str) -> DbResult<Option<Wallet>> {
    let wallet = sqlx::query_as::<_, Wallet>("SELECT * FROM wallets WHERE address = ?")
        .bind(address.to_lowercase())
        .fetch_optional(pool)
        .await?;
    Ok(wallet)
}

/// List a user's wallets, primary first.
pub async fn list_wallets(pool: &SqlitePool, user_id: &str) -> DbResult<Vec<Wallet>> {
    let wallets = sqlx::query_as::<_, Wallet>(
        "SELECT * FROM wallets WHERE user_id = ? ORDER BY is_primary DESC, created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(wallets)
}

/// Delete one of a user's wallets.
pub async fn delete_wallet(pool: &SqlitePool, user_id: &str, wallet_id: &str) -> DbResult<bool> {
    let result = sqlx::query("DELETE FROM wallets WHERE id = ? AND user_id = ?")
        .bind(wallet_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

// ============================================================================
// Wallet sign-in nonces
// ============================================================================

/// Issue (or replace) the sign-in nonce for an address.
pub async fn upsert_wallet_nonce(pool: &SqlitePool, nonce: &WalletNonce) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO wallet_nonces (address, nonce, expires_at)
        VALUES (?, ?, ?)
        ON CONFLICT(address) DO UPDATE SET nonce = excluded.nonce, expires_at = excluded.expires_at
        "#,
    )
    .bind(nonce.address.to_lowercase())
    .bind(&nonce.nonce)
    .bind(nonce.expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Remove and return the nonce for an address. Each nonce is usable once.
pub async fn take_wallet_nonce(pool: &SqlitePool, address: &str) -> DbResult<Option<WalletNonce>> {
    let nonce = sqlx::query_as::<_, WalletNonce>(
        "DELETE FROM wallet_nonces WHERE address = ? RETURNING address, nonce, expires_at",
    )
    .bind(address.to_lowercase())
    .fetch_optional(pool)
    .await?;
    Ok(nonce)
}

/// Delete expired nonces, returning how many were removed.
pub async fn cleanup_expired_nonces(pool: &SqlitePool) -> DbResult<u64> {
    let result = sqlx::query("DELETE FROM wallet_nonces WHERE expires_at < ?")
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
