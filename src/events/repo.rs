use futures::TryStreamExt;
use mongodb::{
    bson::{doc, oid::ObjectId, DateTime, Document},
    options::ReturnDocument,
    Collection, Database,
};
use serde::{Deserialize, Serialize};

/// Campaign record in the `events` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub amount_to_raise: f64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_by: ObjectId,
    pub current_amount: f64,
    pub is_active: bool,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Event {
    fn collection(db: &Database) -> Collection<Event> {
        db.collection("events")
    }

    pub async fn insert(db: &Database, mut event: Event) -> Result<Event, mongodb::error::Error> {
        let res = Self::collection(db).insert_one(&event).await?;
        event.id = res.inserted_id.as_object_id();
        Ok(event)
    }

    pub async fn find_by_id(
        db: &Database,
        id: &ObjectId,
    ) -> Result<Option<Event>, mongodb::error::Error> {
        Self::collection(db).find_one(doc! { "_id": id }).await
    }

    /// Filtered page, newest-created-first.
    pub async fn list(
        db: &Database,
        filter: Document,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Event>, mongodb::error::Error> {
        let cursor = Self::collection(db)
            .find(filter)
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .await?;
        cursor.try_collect().await
    }

    pub async fn count(db: &Database, filter: Document) -> Result<u64, mongodb::error::Error> {
        Self::collection(db).count_documents(filter).await
    }

    pub async fn list_by_owner(
        db: &Database,
        owner: &ObjectId,
    ) -> Result<Vec<Event>, mongodb::error::Error> {
        let cursor = Self::collection(db)
            .find(doc! { "createdBy": owner })
            .sort(doc! { "createdAt": -1 })
            .await?;
        cursor.try_collect().await
    }

    /// Applies a `$set` of mutable fields and returns the updated document.
    pub async fn update_fields(
        db: &Database,
        id: &ObjectId,
        set: Document,
    ) -> Result<Option<Event>, mongodb::error::Error> {
        Self::collection(db)
            .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
            .return_document(ReturnDocument::After)
            .await
    }

    pub async fn delete(db: &Database, id: &ObjectId) -> Result<bool, mongodb::error::Error> {
        let res = Self::collection(db).delete_one(doc! { "_id": id }).await?;
        Ok(res.deleted_count > 0)
    }

    /// Overwrites the running total. Callers read the current value first;
    /// two overlapping contributions can therefore lose one update. There is
    /// no compare-and-swap or transaction around this write.
    pub async fn set_current_amount(
        db: &Database,
        id: &ObjectId,
        amount: f64,
    ) -> Result<(), mongodb::error::Error> {
        Self::collection(db)
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "currentAmount": amount, "updatedAt": DateTime::now() } },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_document_uses_source_field_names() {
        let event = Event {
            id: None,
            title: "Well".into(),
            description: "A well".into(),
            amount_to_raise: 1000.0,
            tags: vec!["water".into()],
            uploaded_image: None,
            image_url: None,
            created_by: ObjectId::new(),
            current_amount: 0.0,
            is_active: true,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        let document = mongodb::bson::to_document(&event).expect("to bson");
        assert!(document.get("amountToRaise").is_some());
        assert!(document.get("createdBy").is_some());
        assert!(document.get("currentAmount").is_some());
        assert!(document.get("isActive").is_some());
        assert!(document.get("_id").is_none());
        assert!(document.get("uploadedImage").is_none());
    }

    #[test]
    fn event_roundtrips_through_bson() {
        let event = Event {
            id: Some(ObjectId::new()),
            title: "Well".into(),
            description: "A well".into(),
            amount_to_raise: 1000.0,
            tags: vec!["water".into(), "village".into()],
            uploaded_image: Some("uploads/x.png".into()),
            image_url: None,
            created_by: ObjectId::new(),
            current_amount: 250.0,
            is_active: false,
            created_at: DateTime::now(),
            updated_at: DateTime::now(),
        };
        let document = mongodb::bson::to_document(&event).expect("to bson");
        let back: Event = mongodb::bson::from_document(document).expect("from bson");
        assert_eq!(back.id, event.id);
        assert_eq!(back.tags, event.tags);
        assert_eq!(back.current_amount, 250.0);
        assert!(!back.is_active);
    }
}
