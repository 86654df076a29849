//! Route handlers.
//!
//! Every handler resolves the caller first, so a request without a usable
//! identity gets 401 before any store work happens.

use super::error::ApiError;
use super::AppState;
use crate::db::categories::{Categories, Category, CategoryInput};
use crate::db::tags::{Tag, TagInput, Tags};
use crate::db::tasks::Tasks;
use crate::db::users::{DailyCheckIn, Profile, Registration, Users};
use crate::libs::stats::Statistics;
use crate::libs::task::{NewTask, Task, TaskFilter, TaskPatch};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Deserialize)]
pub struct DeferRequest {
    pub due_date: NaiveDate,
}

#[derive(Debug, Default, Deserialize)]
pub struct DuplicateRequest {
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

// =============================================================================
// Tasks
// =============================================================================

/// `GET /tasks?date=YYYY-MM-DD&status=pending|completed|recurring|all&category_id=&tag_id=`
pub async fn list_tasks(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<TaskFilter>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let user = state.caller(&headers).await?;
    let tasks = state.with_db(move |db| Tasks::with_db(db).list(&user, &filter)).await?;
    Ok(Json(tasks))
}

pub async fn create_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(fields): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let task = state.with_db(move |db| Tasks::with_db(db).create(&owner, fields)).await?;

    tracing::info!(user = %user, task_id = task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn get_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let user = state.caller(&headers).await?;
    let task = state.with_db(move |db| Tasks::with_db(db).get(&user, id)).await?;
    Ok(Json(task))
}

pub async fn edit_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(patch): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let task = state.with_db(move |db| Tasks::with_db(db).edit(&owner, id, &patch)).await?;

    tracing::info!(user = %user, task_id = id, "task updated");
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    state.with_db(move |db| Tasks::with_db(db).delete(&owner, id)).await?;

    tracing::info!(user = %user, task_id = id, "task deleted");
    Ok(Json(json!({ "message": format!("Task {} deleted", id) })))
}

/// `PATCH /tasks/{id}/complete`: runs the completion processor and returns the task.
pub async fn complete_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Task>, ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let completion = state.with_db(move |db| Tasks::with_db(db).complete(&owner, id)).await?;

    tracing::info!(
        user = %user,
        task_id = id,
        newly_completed = completion.newly_completed,
        xp = completion.gamification.as_ref().map(|g| g.xp),
        next_task_id = completion.next_occurrence.as_ref().map(|t| t.id),
        "task completed"
    );
    Ok(Json(completion.task))
}

pub async fn defer_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(request): Json<DeferRequest>,
) -> Result<Json<Task>, ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let task = state
        .with_db(move |db| Tasks::with_db(db).defer(&owner, id, request.due_date))
        .await?;

    tracing::info!(user = %user, task_id = id, due_date = %task.due_date, "task deferred");
    Ok(Json(task))
}

/// `POST /tasks/{id}/duplicate`; the body is optional.
pub async fn duplicate_task(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    request: Option<Json<DuplicateRequest>>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let due_date = request.and_then(|Json(request)| request.due_date);
    let task = state
        .with_db(move |db| Tasks::with_db(db).duplicate(&owner, id, due_date))
        .await?;

    tracing::info!(user = %user, task_id = id, copy_id = task.id, "task duplicated");
    Ok((StatusCode::CREATED, Json(task)))
}

// =============================================================================
// Streak, statistics and profile
// =============================================================================

pub async fn check_in(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<DailyCheckIn>, ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let outcome = state.with_db(move |db| Users::with_db(db).check_in(&owner)).await?;

    tracing::info!(user = %user, streak = outcome.streak, checked_in = outcome.checked_in, "streak check-in");
    Ok(Json(outcome))
}

pub async fn stats(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Statistics>, ApiError> {
    let user = state.caller(&headers).await?;
    let statistics = state
        .with_db(move |db| Statistics::collect(&db.conn, &user, db.clock.today()))
        .await?;
    Ok(Json(statistics))
}

pub async fn profile(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Profile>, ApiError> {
    let user = state.caller(&headers).await?;
    let profile = state.with_db(move |db| Users::with_db(db).profile(&user)).await?;
    Ok(Json(profile))
}

pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<Profile>), ApiError> {
    let user = state.caller(&headers).await?;
    let owner = user.clone();
    let profile = state
        .with_db(move |db| Users::with_db(db).register(&owner, &registration))
        .await?;

    tracing::info!(user = %user, "profile registered");
    Ok((StatusCode::CREATED, Json(profile)))
}

// =============================================================================
// Categories
// =============================================================================

pub async fn list_categories(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Category>>, ApiError> {
    let user = state.caller(&headers).await?;
    let categories = state.with_db(move |db| Categories::with_db(db).list(&user)).await?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let user = state.caller(&headers).await?;
    let category = state
        .with_db(move |db| Categories::with_db(db).create(&user, &input))
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

pub async fn update_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>, ApiError> {
    let user = state.caller(&headers).await?;
    let category = state
        .with_db(move |db| Categories::with_db(db).update(&user, id, &input))
        .await?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let user = state.caller(&headers).await?;
    state.with_db(move |db| Categories::with_db(db).delete(&user, id)).await?;
    Ok(Json(json!({ "message": format!("Category {} deleted", id) })))
}

// =============================================================================
// Tags
// =============================================================================

pub async fn list_tags(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<Tag>>, ApiError> {
    let user = state.caller(&headers).await?;
    let tags = state.with_db(move |db| Tags::with_db(db).list(&user)).await?;
    Ok(Json(tags))
}

pub async fn create_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(input): Json<TagInput>,
) -> Result<(StatusCode, Json<Tag>), ApiError> {
    let user = state.caller(&headers).await?;
    let tag = state.with_db(move |db| Tags::with_db(db).create(&user, &input)).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

pub async fn update_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, ApiError> {
    let user = state.caller(&headers).await?;
    let tag = state.with_db(move |db| Tags::with_db(db).update(&user, id, &input)).await?;
    Ok(Json(tag))
}

pub async fn delete_tag(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let user = state.caller(&headers).await?;
    state.with_db(move |db| Tags::with_db(db).delete(&user, id)).await?;
    Ok(Json(json!({ "message": format!("Tag {} deleted", id) })))
}
