use chrono::{DateTime, Utc};
use database::Record;
use database::bson::{self, oid::ObjectId};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;
use validator::Validate;

/// User roles, spelled as the JWT `role` claim (`ROLE_USER`, `ROLE_ADMIN`)
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// User document stored in the `users` collection
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Unique, stored lowercased
    #[validate(email)]
    pub email: String,
    /// Argon2 PHC string; never leaves the domain
    #[serde(rename = "password")]
    #[validate(length(min = 1))]
    pub password_hash: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default = "active")]
    pub is_active: bool,
    pub created_at: bson::DateTime,
    pub updated_at: bson::DateTime,
}

fn active() -> bool {
    true
}

impl Record for User {
    const COLLECTION: &'static str = "users";
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];

    fn id(&self) -> ObjectId {
        self.id
    }
}

impl User {
    /// New active user with the default role
    pub fn new(email: &str, name: &str, password_hash: String) -> Self {
        let now = bson::DateTime::now();
        Self {
            id: ObjectId::new(),
            email: normalize_email(email),
            password_hash,
            name: name.trim().to_string(),
            role: Role::User,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Emails are matched case-insensitively by storing them trimmed and lowercased
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// User response DTO (without password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "665f1c2e8b3e4a0012345678")]
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_hex(),
            email: user.email,
            name: user.name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at.to_chrono(),
            updated_at: user.updated_at.to_chrono(),
        }
    }
}

/// Registration request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "Valid email is required"))]
    #[schema(example = "jane@shop.test")]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
}

/// Login request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Valid email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Identity returned alongside a freshly issued token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthUserInfo {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
}

impl From<&User> for AuthUserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_hex(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role,
        }
    }
}

/// Response of register and login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: AuthUserInfo,
}

/// Profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Valid email is required"))]
    pub email: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_strings_match_token_claims() {
        use axum_helpers::{ROLE_ADMIN, ROLE_USER};
        use std::str::FromStr;

        assert_eq!(Role::User.as_str(), ROLE_USER);
        assert_eq!(Role::Admin.to_string(), ROLE_ADMIN);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), ROLE_ADMIN);
    }

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("  Jane@Shop.TEST ", " Jane ", "hash".into());
        assert_eq!(user.email, "jane@shop.test");
        assert_eq!(user.name, "Jane");
        assert_eq!(user.role, Role::User);
        assert!(user.is_active);
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_user_document_shape() {
        let user = User::new("jane@shop.test", "Jane", "hash".into());
        let doc = bson::to_document(&user).unwrap();
        assert_eq!(doc.get_object_id("_id").unwrap(), user.id);
        assert_eq!(doc.get_str("password").unwrap(), "hash");
        assert_eq!(doc.get_str("role").unwrap(), "user");
        assert!(doc.get_bool("isActive").unwrap());
        assert!(doc.get_datetime("createdAt").is_ok());
    }

    #[test]
    fn test_response_hides_password() {
        let user = User::new("jane@shop.test", "Jane", "secret-hash".into());
        let json = serde_json::to_value(UserResponse::from(user.clone())).unwrap();
        assert_eq!(json["id"], user.id.to_hex());
        assert_eq!(json["isActive"], true);
        assert!(json.get("password").is_none());
        assert!(!json.to_string().contains("secret-hash"));
    }

    #[test]
    fn test_register_validation() {
        let request = RegisterRequest {
            email: "not-an-email".into(),
            password: "12345".into(),
            name: String::new(),
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("name"));
    }

    #[test]
    fn test_update_profile_serializes_present_fields_only() {
        let update = UpdateProfile {
            name: Some("New".into()),
            email: None,
        };
        let doc = bson::to_document(&update).unwrap();
        assert_eq!(doc, bson::doc! { "name": "New" });
    }
}
