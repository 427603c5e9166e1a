use mongodb::bson::{doc, DateTime, Document};
use serde::{Deserialize, Serialize};

use crate::auth::dto::PublicUser;
use crate::error::{ApiError, ApiResult};
use crate::events::repo::Event;

/// Query surface of `GET /events`. `isActive` is kept as the raw query
/// string and compared against `"true"`, so any other value filters for
/// inactive campaigns; absent means active.
#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    pub tags: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<String>,
}

fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

impl EventListQuery {
    pub fn active(&self) -> bool {
        self.is_active.as_deref().map_or(true, |v| v == "true")
    }

    /// Comma-separated tags, any-of semantics.
    pub fn tag_list(&self) -> Option<Vec<String>> {
        self.tags
            .as_deref()
            .map(|raw| raw.split(',').map(String::from).collect())
    }

    pub fn filter_doc(&self) -> Document {
        let mut filter = doc! { "isActive": self.active() };
        if let Some(tags) = self.tag_list() {
            filter.insert("tags", doc! { "$in": tags });
        }
        filter
    }

    /// Offset for the requested page. Non-positive page numbers are
    /// accepted; the skip saturates at zero rather than reaching the driver
    /// as a negative value.
    pub fn skip(&self) -> u64 {
        ((self.page - 1).max(0) * self.limit.max(0)) as u64
    }

    pub fn limit(&self) -> i64 {
        self.limit.max(0)
    }

    pub fn total_pages(&self, total: u64) -> i64 {
        (total as f64 / self.limit.max(1) as f64).ceil() as i64
    }
}

/// Campaign as returned to clients, with the creator's public fields
/// embedded. A creator whose user record has since been removed comes
/// back as `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub amount_to_raise: f64,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uploaded_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub created_by: Option<PublicUser>,
    pub current_amount: f64,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl EventResponse {
    pub fn from_event(event: Event, creator: Option<PublicUser>) -> Self {
        Self {
            id: event.id.map(|id| id.to_hex()).unwrap_or_default(),
            title: event.title,
            description: event.description,
            amount_to_raise: event.amount_to_raise,
            tags: event.tags,
            uploaded_image: event.uploaded_image,
            image_url: event.image_url,
            created_by: creator,
            current_amount: event.current_amount,
            is_active: event.is_active,
            created_at: rfc3339(event.created_at),
            updated_at: rfc3339(event.updated_at),
        }
    }
}

fn rfc3339(dt: DateTime) -> String {
    dt.try_to_rfc3339_string().unwrap_or_default()
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    pub events: Vec<EventResponse>,
    pub total_pages: i64,
    pub current_page: i64,
    pub total: u64,
}

/// Mutable fields of `PUT /events/:id`. The owner reference and the running
/// total have no representation here, so clients cannot set them.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount_to_raise: Option<f64>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub uploaded_image: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdateEventRequest {
    pub fn validate(&self) -> ApiResult<()> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(ApiError::Validation("Title is required".into()));
            }
        }
        if let Some(description) = &self.description {
            if description.trim().is_empty() {
                return Err(ApiError::Validation("Description is required".into()));
            }
        }
        if let Some(goal) = self.amount_to_raise {
            if goal <= 0.0 {
                return Err(ApiError::Validation(
                    "Fundraising goal must be greater than zero".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn set_doc(&self) -> Document {
        let mut set = doc! { "updatedAt": DateTime::now() };
        if let Some(v) = &self.title {
            set.insert("title", v.as_str());
        }
        if let Some(v) = &self.description {
            set.insert("description", v.as_str());
        }
        if let Some(v) = self.amount_to_raise {
            set.insert("amountToRaise", v);
        }
        if let Some(v) = &self.tags {
            set.insert("tags", v.clone());
        }
        if let Some(v) = &self.image_url {
            set.insert("imageUrl", v.as_str());
        }
        if let Some(v) = &self.uploaded_image {
            set.insert("uploadedImage", v.as_str());
        }
        if let Some(v) = self.is_active {
            set.insert("isActive", v);
        }
        set
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ContributeRequest {
    pub amount: Option<f64>,
}

impl ContributeRequest {
    /// Anything missing, zero or negative is rejected before the campaign
    /// is even looked up.
    pub fn amount(&self) -> ApiResult<f64> {
        match self.amount {
            Some(amount) if amount > 0.0 => Ok(amount),
            _ => Err(ApiError::BadRequest("Invalid contribution amount".into())),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributeResponse {
    pub message: String,
    pub current_amount: f64,
    pub progress: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(raw: &str) -> EventListQuery {
        serde_urlencoded_like(raw)
    }

    // tiny stand-in for query-string parsing in tests: build from parts
    fn serde_urlencoded_like(raw: &str) -> EventListQuery {
        let mut q = EventListQuery {
            page: default_page(),
            limit: default_limit(),
            tags: None,
            is_active: None,
        };
        for pair in raw.split('&').filter(|p| !p.is_empty()) {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            match k {
                "page" => q.page = v.parse().unwrap(),
                "limit" => q.limit = v.parse().unwrap(),
                "tags" => q.tags = Some(v.to_string()),
                "isActive" => q.is_active = Some(v.to_string()),
                _ => {}
            }
        }
        q
    }

    #[test]
    fn defaults_are_page_one_limit_ten_active() {
        let q = query("");
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
        assert!(q.active());
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn is_active_compares_the_raw_string() {
        assert!(query("isActive=true").active());
        assert!(!query("isActive=false").active());
        // anything that is not the literal "true" means inactive
        assert!(!query("isActive=yes").active());
    }

    #[test]
    fn tags_split_on_commas_without_trimming() {
        let q = query("tags=water,school");
        assert_eq!(
            q.tag_list().unwrap(),
            vec!["water".to_string(), "school".to_string()]
        );
        let filter = q.filter_doc();
        assert!(filter.get_document("tags").unwrap().get_array("$in").is_ok());
    }

    #[test]
    fn skip_saturates_for_non_positive_pages() {
        assert_eq!(query("page=0").skip(), 0);
        assert_eq!(query("page=-3").skip(), 0);
        assert_eq!(query("page=3&limit=10").skip(), 20);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = query("limit=10");
        assert_eq!(q.total_pages(0), 0);
        assert_eq!(q.total_pages(10), 1);
        assert_eq!(q.total_pages(11), 2);
    }

    #[test]
    fn update_request_cannot_touch_totals_or_owner() {
        let raw = r#"{"title":"New","currentAmount":9999,"createdBy":"abc"}"#;
        let req: UpdateEventRequest = serde_json::from_str(raw).expect("deserialize");
        let set = req.set_doc();
        assert!(set.get("title").is_some());
        assert!(set.get("currentAmount").is_none());
        assert!(set.get("createdBy").is_none());
    }

    #[test]
    fn update_request_rejects_non_positive_goal() {
        let req = UpdateEventRequest {
            amount_to_raise: Some(0.0),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn contribute_amount_must_be_positive() {
        assert!(ContributeRequest { amount: None }.amount().is_err());
        assert!(ContributeRequest { amount: Some(0.0) }.amount().is_err());
        assert!(ContributeRequest { amount: Some(-5.0) }.amount().is_err());
        assert_eq!(
            ContributeRequest {
                amount: Some(100.0)
            }
            .amount()
            .unwrap(),
            100.0
        );
    }
}
