use axum::{
    Form, Json, Router,
    extract::{Path, State},
    response::Response,
    routing::{get, post},
};
use chrono::{Datelike, Utc};

use super::{
    load_topic,
    model::{TopicPage, TopicsPage},
    parse_id,
};
use crate::{
    ApiState,
    auth::{AdminUser, AuthUser},
    error::ApiError,
    response::found,
    session::{FLASH_SUCCESS, Session, SessionData},
    validation::{EventForm, TopicForm, validate_event, validate_topic},
};

pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/topics", get(list_topics).post(create_topic))
        .route("/topics/{id}", get(show_topic))
        .route("/topics/{id}/delete", post(delete_topic))
        .route("/topics/{id}/events", post(create_event))
        .route("/topics/{id}/events/{event_id}/delete", post(delete_event))
}

async fn list_topics(
    State(state): State<ApiState>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<TopicsPage>, ApiError> {
    let topics = state.store.topics().await?;

    Ok(Json(TopicsPage {
        topics,
        session: SessionData::take(&session, user.as_ref()),
    }))
}

async fn show_topic(
    State(state): State<ApiState>,
    Path(id): Path<String>,
    session: Session,
    user: Option<AuthUser>,
) -> Result<Json<TopicPage>, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let topic = load_topic(state.store.as_ref(), topic_id).await?;
    let events = state.store.events_by_topic(topic_id, false).await?;

    Ok(Json(TopicPage {
        topic,
        events,
        session: SessionData::take(&session, user.as_ref()),
    }))
}

async fn create_topic(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    session: Session,
    Form(form): Form<TopicForm>,
) -> Result<Response, ApiError> {
    let new_topic = validate_topic(&form, Utc::now().year()).map_err(|errors| {
        ApiError::Validation {
            redirect: "/topics".to_string(),
            errors,
        }
    })?;

    let topic = state.store.create_topic(new_topic).await?;
    tracing::info!(topic_id = topic.id, admin = %admin.username, "Topic created");

    session.put(FLASH_SUCCESS, &format!("The topic \"{}\" was created.", topic.title))?;
    Ok(found(&format!("/topics/{}", topic.id)))
}

async fn delete_topic(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    session: Session,
) -> Result<Response, ApiError> {
    let topic_id = parse_id(&id, "topic")?;

    if !state.store.delete_topic(topic_id).await? {
        return Err(ApiError::NotFound(format!("topic {topic_id} does not exist")));
    }
    tracing::info!(topic_id, admin = %admin.username, "Topic deleted");

    session.put(FLASH_SUCCESS, &"The topic was deleted.")?;
    Ok(found("/topics"))
}

async fn create_event(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    session: Session,
    Form(form): Form<EventForm>,
) -> Result<Response, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let topic = load_topic(state.store.as_ref(), topic_id).await?;

    let new_event = validate_event(&form, &topic, Utc::now().year()).map_err(|errors| {
        ApiError::Validation {
            redirect: format!("/topics/{topic_id}"),
            errors,
        }
    })?;

    let event = state.store.create_event(new_event).await?;
    tracing::info!(topic_id, event_id = event.id, admin = %admin.username, "Event created");

    session.put(FLASH_SUCCESS, &format!("The event \"{}\" was added.", event.title))?;
    Ok(found(&format!("/topics/{topic_id}")))
}

async fn delete_event(
    State(state): State<ApiState>,
    AdminUser(admin): AdminUser,
    Path((id, event_id)): Path<(String, String)>,
    session: Session,
) -> Result<Response, ApiError> {
    let topic_id = parse_id(&id, "topic")?;
    let event_id = parse_id(&event_id, "event")?;

    if !state.store.delete_event(topic_id, event_id).await? {
        return Err(ApiError::NotFound(format!("event {event_id} does not exist")));
    }
    tracing::info!(topic_id, event_id, admin = %admin.username, "Event deleted");

    session.put(FLASH_SUCCESS, &"The event was deleted.")?;
    Ok(found(&format!("/topics/{topic_id}")))
}
