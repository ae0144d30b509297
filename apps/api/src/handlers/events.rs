use axum::Json;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use eventdesk_application::{AuthorizedCaller, EventFilter, EventPage, EventUpdate, NewEvent};
use eventdesk_core::{EventKey, NonEmptyString};
use eventdesk_domain::AccessTier;

use crate::dto::{
    CreateEventRequest, DeleteEventRequest, EventListQuery, EventResponse, UpdateEventRequest,
    parse_optional_data_url,
};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_events_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthorizedCaller>>,
    Query(query): Query<EventListQuery>,
) -> ApiResult<Json<Vec<EventResponse>>> {
    let caller = super::require_caller(caller)?;

    let key = query.key.map(EventKey::new).transpose()?;
    let filter = EventFilter {
        search: query.search,
        key,
        name_contains: query.event_name,
        description_contains: query.description,
        starts_after: query.from_date,
        ends_before: query.to_date,
        created_after: query.created_at,
        updated_after: query.updated_at,
    };
    let page = EventPage {
        page: query.page.unwrap_or(1).max(1),
        page_size: query.page_size.unwrap_or(10).clamp(1, 100),
    };

    let include_owner = caller.permissions().read_tier() == Some(AccessTier::Elevated);
    let events = state
        .event_service
        .list_events(&caller, &filter, page)
        .await?
        .into_iter()
        .map(|event| EventResponse::from_record(event, include_owner))
        .collect();

    Ok(Json(events))
}

pub async fn create_event_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthorizedCaller>>,
    Json(payload): Json<CreateEventRequest>,
) -> ApiResult<(StatusCode, Json<EventResponse>)> {
    let caller = super::require_caller(caller)?;

    let input = NewEvent {
        name: NonEmptyString::new(payload.event_name)?,
        description: payload.description,
        starts_at: payload.from_date_time,
        ends_at: payload.to_date_time,
        fields: payload.fields,
        additional_fields: payload.additional_fields,
        thumbnail: parse_optional_data_url(payload.thumbnail.as_deref())?,
        banner: parse_optional_data_url(payload.banner.as_deref())?,
    };

    let event = state.event_service.create_event(&caller, input).await?;
    Ok((StatusCode::CREATED, Json(EventResponse::from_record(event, false))))
}

pub async fn update_event_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthorizedCaller>>,
    Json(payload): Json<UpdateEventRequest>,
) -> ApiResult<Json<EventResponse>> {
    let caller = super::require_caller(caller)?;

    let key = EventKey::new(payload.key)?;
    let update = EventUpdate {
        name: payload.event_name.map(NonEmptyString::new).transpose()?,
        description: payload.description,
        starts_at: payload.from_date_time,
        ends_at: payload.to_date_time,
        fields: payload.fields,
        additional_fields: payload.additional_fields,
        thumbnail: parse_optional_data_url(payload.thumbnail.as_deref())?,
        banner: parse_optional_data_url(payload.banner.as_deref())?,
    };

    let event = state
        .event_service
        .update_event(&caller, &key, update)
        .await?;
    Ok(Json(EventResponse::from_record(event, false)))
}

pub async fn delete_event_handler(
    State(state): State<AppState>,
    caller: Option<Extension<AuthorizedCaller>>,
    Json(payload): Json<DeleteEventRequest>,
) -> ApiResult<StatusCode> {
    let caller = super::require_caller(caller)?;

    let key = EventKey::new(payload.key)?;
    state.event_service.delete_event(&caller, &key).await?;

    Ok(StatusCode::NO_CONTENT)
}
