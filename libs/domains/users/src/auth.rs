//! Registration and login

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum_helpers::JwtAuth;
use database::Repository;
use database::bson::doc;
use std::sync::Arc;
use tracing::instrument;

use crate::error::{UserError, UserResult};
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, User, normalize_email};

/// Issues tokens for new and returning users
pub struct AuthService<R> {
    repository: Arc<R>,
    jwt: JwtAuth,
}

impl<R> Clone for AuthService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            jwt: self.jwt.clone(),
        }
    }
}

impl<R: Repository<User>> AuthService<R> {
    pub fn new(repository: Arc<R>, jwt: JwtAuth) -> Self {
        Self { repository, jwt }
    }

    /// Create an active `user`-role account and sign a token for it
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);

        if self
            .repository
            .count(doc! { "email": email.as_str() })
            .await?
            > 0
        {
            return Err(UserError::EmailAlreadyRegistered);
        }

        let password_hash = hash_password(&input.password)?;
        let user = self
            .repository
            .create(User::new(&email, &input.name, password_hash))
            .await
            .map_err(|e| {
                // lost a race against a concurrent registration
                if e.is_conflict() {
                    UserError::EmailAlreadyRegistered
                } else {
                    e.into()
                }
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        self.issue(&user)
    }

    #[instrument(skip(self, input))]
    pub async fn login(&self, input: LoginRequest) -> UserResult<AuthResponse> {
        let email = normalize_email(&input.email);

        let user = self
            .repository
            .find_one(doc! { "email": email.as_str() })
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active {
            tracing::info!(user_id = %user.id, "Login attempt on disabled account");
            return Err(UserError::AccountDisabled);
        }

        if !verify_password(&input.password, &user.password_hash)? {
            return Err(UserError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");
        self.issue(&user)
    }

    fn issue(&self, user: &User) -> UserResult<AuthResponse> {
        let token = self
            .jwt
            .create_token(&user.id.to_hex(), &user.email, user.role.as_str())
            .map_err(|e| UserError::Token(e.to_string()))?;

        Ok(AuthResponse {
            token,
            user: user.into(),
        })
    }
}

fn hash_password(password: &str) -> UserResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::PasswordHash(e.to_string()))
}

fn verify_password(password: &str, hash: &str) -> UserResult<bool> {
    let parsed_hash = PasswordHash::new(hash).map_err(|e| UserError::PasswordHash(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use axum_helpers::{JwtConfig, ROLE_USER};
    use database::{InMemoryRepository, MemoryDatabase};

    fn jwt() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    fn service() -> (AuthService<InMemoryRepository<User>>, Arc<InMemoryRepository<User>>) {
        let repo = Arc::new(InMemoryRepository::new(&MemoryDatabase::new()));
        (AuthService::new(repo.clone(), jwt()), repo)
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.into(),
            password: "secret1".into(),
            name: "Jane".into(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("secret1").unwrap();
        assert_ne!(hash, "secret1");
        assert!(verify_password("secret1", &hash).unwrap());
        assert!(!verify_password("secret2", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_malformed_hash() {
        assert!(matches!(
            verify_password("secret1", "plain"),
            Err(UserError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn test_register_issues_token_and_hashes_password() {
        let (service, repo) = service();

        let response = service.register(register_request("Jane@Shop.test")).await.unwrap();
        assert_eq!(response.user.email, "jane@shop.test");
        assert_eq!(response.user.role, Role::User);

        let claims = jwt().verify_token(&response.token).unwrap();
        assert_eq!(claims.sub, response.user.id);
        assert_eq!(claims.role, ROLE_USER);

        let stored = repo.find_by_id(&response.user.id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
        assert!(stored.is_active);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let (service, _) = service();
        service.register(register_request("jane@shop.test")).await.unwrap();

        let err = service
            .register(register_request("JANE@shop.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailAlreadyRegistered));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let (service, repo) = service();
        let registered = service.register(register_request("jane@shop.test")).await.unwrap();

        let ok = service
            .login(login_request("jane@shop.test", "secret1"))
            .await
            .unwrap();
        assert_eq!(ok.user, registered.user);

        let err = service
            .login(login_request("jane@shop.test", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));

        let err = service
            .login(login_request("nobody@shop.test", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::InvalidCredentials));

        repo.update(&registered.user.id, doc! { "isActive": false })
            .await
            .unwrap();
        let err = service
            .login(login_request("jane@shop.test", "secret1"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::AccountDisabled));
    }
}
