use std::collections::{HashMap, HashSet};

use axum::extract::Multipart;
use bytes::Bytes;
use mongodb::bson::{oid::ObjectId, DateTime};
use uuid::Uuid;

use crate::auth::dto::PublicUser;
use crate::auth::extractors::Identity;
use crate::auth::repo::User;
use crate::error::{ApiError, ApiResult};
use crate::events::dto::EventResponse;
use crate::events::repo::Event;
use crate::state::AppState;

/// Raw multipart fields of the campaign creation form. `tags` arrives as a
/// JSON array string, the way the browser form submits it.
#[derive(Debug, Default)]
pub struct EventFormFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub amount_to_raise: Option<String>,
    pub image_url: Option<String>,
    pub tags: Option<String>,
    pub upload: Option<UploadedFile>,
}

#[derive(Debug)]
pub struct UploadedFile {
    pub content_type: String,
    pub bytes: Bytes,
}

pub async fn read_event_form(mp: &mut Multipart) -> ApiResult<EventFormFields> {
    let mut form = EventFormFields::default();
    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "title" => form.title = Some(field.text().await.map_err(bad_field)?),
            "description" => form.description = Some(field.text().await.map_err(bad_field)?),
            "amountToRaise" => {
                form.amount_to_raise = Some(field.text().await.map_err(bad_field)?)
            }
            "imageUrl" => form.image_url = Some(field.text().await.map_err(bad_field)?),
            "tags" => form.tags = Some(field.text().await.map_err(bad_field)?),
            "uploadedImage" => {
                let content_type = field
                    .content_type()
                    .map(str::to_string)
                    .unwrap_or_else(|| "application/octet-stream".into());
                let bytes = field.bytes().await.map_err(bad_field)?;
                form.upload = Some(UploadedFile {
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }
    Ok(form)
}

fn bad_field(e: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::Validation(e.to_string())
}

#[derive(Debug)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub amount_to_raise: f64,
    pub tags: Vec<String>,
    pub image_url: Option<String>,
}

pub fn validate_new_event(
    form: EventFormFields,
) -> ApiResult<(NewEvent, Option<UploadedFile>)> {
    let title = form
        .title
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Title is required".into()))?;
    let description = form
        .description
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Description is required".into()))?;
    let raw_goal = form
        .amount_to_raise
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Fundraising goal is required".into()))?;
    let amount_to_raise: f64 = raw_goal
        .trim()
        .parse()
        .map_err(|_| ApiError::Validation("Fundraising goal must be a number".into()))?;
    if amount_to_raise <= 0.0 {
        return Err(ApiError::Validation(
            "Fundraising goal must be greater than zero".into(),
        ));
    }
    let tags = parse_tags(form.tags.as_deref())?;
    let image_url = form.image_url.filter(|v| !v.trim().is_empty());
    Ok((
        NewEvent {
            title,
            description,
            amount_to_raise,
            tags,
            image_url,
        },
        form.upload,
    ))
}

/// Tags arrive as a JSON array string; an absent or empty field means no
/// tags, and anything unparsable is a validation failure.
pub fn parse_tags(raw: Option<&str>) -> ApiResult<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(raw) if raw.is_empty() => Ok(Vec::new()),
        Some(raw) => serde_json::from_str(raw)
            .map_err(|_| ApiError::Validation("Invalid format for tags.".into())),
    }
}

fn ext_from_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        _ => None,
    }
}

/// Writes the upload under a generated name and returns the public path the
/// static file service exposes it at.
pub async fn store_uploaded_image(state: &AppState, upload: UploadedFile) -> ApiResult<String> {
    let ext = ext_from_mime(&upload.content_type).unwrap_or("bin");
    let key = format!("{}.{}", Uuid::new_v4(), ext);
    state.storage.put_object(&key, upload.bytes).await?;
    Ok(format!("uploads/{key}"))
}

pub async fn create_event(
    state: &AppState,
    identity: &Identity,
    mut mp: Multipart,
) -> ApiResult<EventResponse> {
    let form = read_event_form(&mut mp).await?;
    let (new, upload) = validate_new_event(form)?;

    let uploaded_image = match upload {
        Some(upload) => Some(store_uploaded_image(state, upload).await?),
        None => None,
    };

    let now = DateTime::now();
    let event = Event {
        id: None,
        title: new.title,
        description: new.description,
        amount_to_raise: new.amount_to_raise,
        tags: new.tags,
        uploaded_image,
        image_url: new.image_url,
        // owner comes from the verified identity, never from the form
        created_by: identity.user_id,
        current_amount: 0.0,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    let event = Event::insert(&state.db, event).await?;
    let creator = creator_public(state, &identity.user_id).await?;
    Ok(EventResponse::from_event(event, creator))
}

pub async fn creator_public(
    state: &AppState,
    id: &ObjectId,
) -> ApiResult<Option<PublicUser>> {
    Ok(User::find_by_id(&state.db, id)
        .await?
        .map(PublicUser::from))
}

/// Embeds creators into a page of events with one batched user lookup.
pub async fn populate_events(
    state: &AppState,
    events: Vec<Event>,
) -> ApiResult<Vec<EventResponse>> {
    let ids: Vec<ObjectId> = events
        .iter()
        .map(|e| e.created_by)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let users = User::find_by_ids(&state.db, &ids).await?;
    let by_id: HashMap<ObjectId, PublicUser> = users
        .into_iter()
        .filter_map(|u| {
            let id = u.id?;
            Some((id, PublicUser::from(u)))
        })
        .collect();
    Ok(events
        .into_iter()
        .map(|e| {
            let creator = by_id.get(&e.created_by).cloned();
            EventResponse::from_event(e, creator)
        })
        .collect())
}
