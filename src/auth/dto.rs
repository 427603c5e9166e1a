use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for user registration. Fields are optional here so that a
/// missing one yields the taxonomy's 422 with a readable message instead of
/// a deserialization rejection.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Public part of the user returned to clients. The password hash never
/// crosses this boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id.map(|id| id.to_hex()).unwrap_or_default(),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            avatar: user.avatar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User::new(
            "Grace".into(),
            "Hopper".into(),
            "grace@example.com".into(),
            "$argon2id$fake".into(),
            Some("https://example.com/a.png".into()),
        )
    }

    #[test]
    fn public_user_is_camel_case_and_never_leaks_the_hash() {
        let public = PublicUser::from(sample_user());
        let json = serde_json::to_string(&public).expect("serialize");
        assert!(json.contains("firstName"));
        assert!(json.contains("lastName"));
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn missing_avatar_is_omitted() {
        let mut user = sample_user();
        user.avatar = None;
        let json = serde_json::to_string(&PublicUser::from(user)).expect("serialize");
        assert!(!json.contains("avatar"));
    }

    #[test]
    fn register_request_accepts_camel_case_input() {
        let req: RegisterRequest = serde_json::from_str(
            r#"{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"pw"}"#,
        )
        .expect("deserialize");
        assert_eq!(req.first_name.as_deref(), Some("Ada"));
        assert!(req.avatar.is_none());
    }
}
