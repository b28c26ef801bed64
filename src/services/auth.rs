use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    auth::Claims,
    user::{LoginResponse, StaffProfile, StaffUser, UserRole},
};

pub struct AuthService;

impl AuthService {
    pub async fn login(
        pool: &PgPool,
        email: &str,
        password: &str,
        jwt_secret: &str,
        access_ttl: u64,
    ) -> anyhow::Result<LoginResponse> {
        let user = sqlx::query_as::<_, StaffUser>(
            "SELECT * FROM staff_users WHERE email = $1 AND is_active = TRUE",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Invalid credentials"))?;

        let valid = bcrypt::verify(password, &user.password_hash)
            .map_err(|_| anyhow::anyhow!("Invalid credentials"))?;
        if !valid {
            anyhow::bail!("Invalid credentials");
        }

        let role: UserRole = user.role.parse().unwrap_or(UserRole::Checkin);
        let access_token = Self::generate_access_token(user.id, role, jwt_secret, access_ttl)?;
        Ok(LoginResponse { access_token, user: user.into() })
    }

    pub fn generate_access_token(
        user_id: Uuid,
        role: UserRole,
        secret: &str,
        ttl_seconds: u64,
    ) -> anyhow::Result<String> {
        let now = Utc::now().timestamp() as usize;
        let claims = Claims {
            sub: user_id.to_string(),
            role,
            iat: now,
            exp: now + ttl_seconds as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )?;
        Ok(token)
    }

    pub async fn profile(pool: &PgPool, user_id: Uuid) -> anyhow::Result<StaffProfile> {
        let user = sqlx::query_as::<_, StaffUser>(
            "SELECT * FROM staff_users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found"))?;
        Ok(user.into())
    }

    /// Change password, verifying the current one first.
    pub async fn change_password(
        pool: &PgPool,
        user_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> anyhow::Result<()> {
        anyhow::ensure!(new_password.len() >= 8, "Password must be at least 8 characters");

        let password_hash: String = sqlx::query_scalar(
            "SELECT password_hash FROM staff_users WHERE id = $1 AND is_active = TRUE",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found"))?;

        let valid = bcrypt::verify(current_password, &password_hash)
            .map_err(|_| anyhow::anyhow!("Current password is incorrect"))?;
        if !valid {
            anyhow::bail!("Current password is incorrect");
        }

        let new_hash = bcrypt::hash(new_password, 12)?;
        sqlx::query("UPDATE staff_users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&new_hash)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(())
    }
}
