// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::json;
use crate::{
    common::error::AppError,
    db::{AuditRepository, UserRepository},
    models::{
        activity::NewAuditLog,
        auth::{AuthResponse, Claims, ClientInfo, Role, User, UserStatus},
    },
};

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    audit_repo: AuditRepository,
    jwt_secret: String,
}

/// Self-registration never grants admin.
pub fn registration_role(requested: Option<Role>) -> Role {
    match requested {
        Some(Role::Admin) | None => Role::Viewer,
        Some(role) => role,
    }
}

impl AuthService {
    pub fn new(user_repo: UserRepository, audit_repo: AuditRepository, jwt_secret: String) -> Self {
        Self {
            user_repo,
            audit_repo,
            jwt_secret,
        }
    }

    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
        requested_role: Option<Role>,
    ) -> Result<AuthResponse, AppError> {
        // 1. Hashing off the async runtime
        let password_clone = password.to_owned();
        let hashed_password =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;

        // 2. Insert (duplicate e-mail → 409)
        let role = registration_role(requested_role);
        let user = self
            .user_repo
            .create_user(self.user_repo.pool(), email, name, &hashed_password, role)
            .await?;

        // 3. Audit, best effort
        self.audit(
            NewAuditLog::new(user.id, "REGISTER", "User", Some(user.id.to_string()))
                .with_details(json!({ "email": user.email, "role": user.role })),
        )
        .await;

        let token = self.create_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
        client: ClientInfo,
    ) -> Result<AuthResponse, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }
        if user.status != UserStatus::Active {
            return Err(AppError::UserInactive);
        }

        self.user_repo.touch_last_login(user.id).await?;

        let mut entry = NewAuditLog::new(user.id, "LOGIN", "User", Some(user.id.to_string()))
            .with_details(json!({ "email": user.email }));
        entry.ip_address = client.ip_address;
        entry.user_agent = client.user_agent;
        self.audit(entry).await;

        let token = self.create_token(&user)?;
        Ok(AuthResponse { user, token })
    }

    pub async fn logout_user(&self, user: &User) {
        self.audit(
            NewAuditLog::new(user.id, "LOGOUT", "User", Some(user.id.to_string()))
                .with_details(json!({ "email": user.email })),
        )
        .await;
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let claims = self.decode_token(token)?;

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if user.status != UserStatus::Active {
            return Err(AppError::UserInactive);
        }
        Ok(user)
    }

    fn decode_token(&self, token: &str) -> Result<Claims, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;
        Ok(token_data.claims)
    }

    fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::hours(TOKEN_TTL_HOURS);

        let claims = Claims {
            sub: user.id,
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    async fn audit(&self, entry: NewAuditLog) {
        if let Err(e) = self.audit_repo.insert(&entry).await {
            tracing::warn!(error = %e, action = %entry.action, "Audit entry could not be stored");
        }
    }

    #[cfg(test)]
    fn for_tokens(jwt_secret: &str, pool: sqlx::PgPool) -> Self {
        Self::new(
            UserRepository::new(pool.clone()),
            AuditRepository::new(pool),
            jwt_secret.to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn admin_cannot_be_self_assigned() {
        assert_eq!(registration_role(Some(Role::Admin)), Role::Viewer);
        assert_eq!(registration_role(None), Role::Viewer);
        assert_eq!(registration_role(Some(Role::Vendor)), Role::Vendor);
    }

    fn sample_user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "ana@example.com".into(),
            name: "Ana".into(),
            password_hash: String::new(),
            role,
            status: UserStatus::Active,
            avatar: None,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn issued_tokens_decode_with_the_same_secret_only() {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/unused")
            .unwrap();
        let service = AuthService::for_tokens("secret-a", pool.clone());
        let user = sample_user(Role::Vendor);

        let token = service.create_token(&user).unwrap();
        let claims = service.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Vendor);
        assert_eq!(claims.exp - claims.iat, (TOKEN_TTL_HOURS * 3600) as usize);

        let other = AuthService::for_tokens("secret-b", pool);
        assert!(matches!(other.decode_token(&token), Err(AppError::InvalidToken)));
    }
}
