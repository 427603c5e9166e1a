use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use mongodb::bson::oid::ObjectId;
use tracing::{info, instrument, warn};

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, ApiResult},
    events::{
        dto::{
            ContributeRequest, ContributeResponse, DeleteResponse, EventListQuery,
            EventListResponse, EventResponse, UpdateEventRequest,
        },
        repo::Event,
        services,
    },
    state::AppState,
};

/// A malformed id can never name a stored campaign, so it gets the same
/// answer as an unknown one.
fn parse_event_id(id: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| ApiError::NotFound("Event not found".into()))
}

fn progress(total: f64, goal: f64) -> f64 {
    (total / goal) * 100.0
}

#[instrument(skip(state))]
pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Json<EventListResponse>> {
    let filter = query.filter_doc();
    let total = Event::count(&state.db, filter.clone()).await?;
    let events = Event::list(&state.db, filter, query.skip(), query.limit()).await?;
    let events = services::populate_events(&state, events).await?;
    Ok(Json(EventListResponse {
        events,
        total_pages: query.total_pages(total),
        current_page: query.page,
        total,
    }))
}

#[instrument(skip(state))]
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EventResponse>> {
    let id = parse_event_id(&id)?;
    let event = Event::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    let creator = services::creator_public(&state, &event.created_by).await?;
    Ok(Json(EventResponse::from_event(event, creator)))
}

#[instrument(skip(state))]
pub async fn my_events(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let events = Event::list_by_owner(&state.db, &identity.user_id).await?;
    let events = services::populate_events(&state, events).await?;
    Ok(Json(events))
}

#[instrument(skip(state, mp))]
pub async fn create_event(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    mp: Multipart,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let response = services::create_event(&state, &identity, mp).await?;
    info!(event_id = %response.id, "event created");
    Ok((StatusCode::CREATED, Json(response)))
}

#[instrument(skip(state, payload))]
pub async fn update_event(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let id = parse_event_id(&id)?;
    let event = Event::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    if event.created_by != identity.user_id {
        warn!(event_id = %id.to_hex(), "update by non-owner");
        return Err(ApiError::Forbidden(
            "Not authorized to update this event".into(),
        ));
    }
    payload.validate()?;
    let updated = Event::update_fields(&state.db, &id, payload.set_doc())
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    let creator = services::creator_public(&state, &updated.created_by).await?;
    Ok(Json(EventResponse::from_event(updated, creator)))
}

#[instrument(skip(state))]
pub async fn delete_event(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let id = parse_event_id(&id)?;
    let event = Event::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;
    if event.created_by != identity.user_id {
        warn!(event_id = %id.to_hex(), "delete by non-owner");
        return Err(ApiError::Forbidden(
            "Not authorized to delete this event".into(),
        ));
    }
    // hard delete; any uploaded image file stays on disk
    Event::delete(&state.db, &id).await?;
    info!(event_id = %id.to_hex(), "event deleted");
    Ok(Json(DeleteResponse {
        message: "Event deleted successfully".into(),
    }))
}

/// Open to any caller, authenticated or not. The handler reads the current
/// total and writes back the sum without a guard, so two overlapping
/// contributions can lose one of the updates.
#[instrument(skip(state, payload))]
pub async fn contribute(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<ContributeRequest>,
) -> ApiResult<Json<ContributeResponse>> {
    let amount = payload.amount()?;
    let id = parse_event_id(&id)?;
    let event = Event::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

    let new_total = event.current_amount + amount;
    Event::set_current_amount(&state.db, &id, new_total).await?;

    info!(event_id = %id.to_hex(), amount, new_total, "contribution recorded");
    Ok(Json(ContributeResponse {
        message: "Donation recorded successfully".into(),
        current_amount: new_total,
        progress: progress(new_total, event.amount_to_raise),
    }))
}
