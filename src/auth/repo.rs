use mongodb::{
    bson::{doc, oid::ObjectId, DateTime},
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// User record as stored in the `users` collection. Records are immutable
/// after registration; there is no update or delete path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(rename = "password")]
    pub password_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl User {
    pub fn new(
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        avatar: Option<String>,
    ) -> Self {
        let now = DateTime::now();
        Self {
            id: None,
            first_name,
            last_name,
            email,
            password_hash,
            avatar,
            created_at: now,
            updated_at: now,
        }
    }

    fn collection(db: &Database) -> Collection<User> {
        db.collection("users")
    }

    pub async fn insert(db: &Database, mut user: User) -> Result<User, mongodb::error::Error> {
        let res = Self::collection(db).insert_one(&user).await?;
        user.id = res.inserted_id.as_object_id();
        Ok(user)
    }

    pub async fn find_by_email(
        db: &Database,
        email: &str,
    ) -> Result<Option<User>, mongodb::error::Error> {
        Self::collection(db).find_one(doc! { "email": email }).await
    }

    pub async fn find_by_id(
        db: &Database,
        id: &ObjectId,
    ) -> Result<Option<User>, mongodb::error::Error> {
        Self::collection(db).find_one(doc! { "_id": id }).await
    }

    /// Batch fetch for creator population on list responses.
    pub async fn find_by_ids(
        db: &Database,
        ids: &[ObjectId],
    ) -> Result<Vec<User>, mongodb::error::Error> {
        use futures::TryStreamExt;
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = Self::collection(db)
            .find(doc! { "_id": { "$in": ids } })
            .await?;
        cursor.try_collect().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_document_uses_source_field_names() {
        let user = User::new(
            "Ada".into(),
            "Lovelace".into(),
            "ada@example.com".into(),
            "$argon2id$fake".into(),
            None,
        );
        let document = mongodb::bson::to_document(&user).expect("to bson");
        assert!(document.get("firstName").is_some());
        assert!(document.get("lastName").is_some());
        assert!(document.get("password").is_some());
        // unset _id and avatar stay out of the document
        assert!(document.get("_id").is_none());
        assert!(document.get("avatar").is_none());
    }
}
