//! Route handlers.

use super::dto::{
    CommentBody, CommentResponse, CreateTaskBody, ListTasksQuery, PositionResponse, ReorderBody,
    ReorderResponse, TaskDetailResponse, TaskResponse, UpdateTaskBody,
};
use super::{ApiError, AppState, Caller, TaskStorage};
use crate::task::domain::{TaskFilter, TaskId};
use crate::task::services::ReorderRequest;
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;

type ApiResult<T> = Result<T, ApiError>;

/// `GET /health`
pub async fn health() -> &'static str {
    "ok"
}

/// `GET /tasks`
pub async fn list_tasks<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<TaskResponse>>> {
    let Query(query) = query?;
    let filter =
        TaskFilter::try_from(query).map_err(|err| ApiError::bad_request(err.to_string()))?;
    let tasks = state.tasks().list(caller, &filter).await?;
    Ok(Json(tasks.iter().map(TaskResponse::from).collect()))
}

/// `POST /tasks`
pub async fn create_task<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    body: Result<Json<CreateTaskBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TaskResponse>)> {
    let Json(body) = body?;
    let task = state.tasks().create(caller, body.into()).await?;
    Ok((StatusCode::CREATED, Json(TaskResponse::from(&task))))
}

/// `GET /tasks/{id}`
pub async fn get_task<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<TaskDetailResponse>> {
    let Path(id) = id?;
    let task = state.tasks().get(caller, id).await?;
    let comments = state.comments().list(caller, id).await?;
    Ok(Json(TaskDetailResponse {
        task: TaskResponse::from(&task),
        comments: comments.iter().map(CommentResponse::from).collect(),
    }))
}

/// `PATCH /tasks/{id}`
pub async fn update_task<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
    body: Result<Json<UpdateTaskBody>, JsonRejection>,
) -> ApiResult<Json<TaskResponse>> {
    let Path(id) = id?;
    let Json(body) = body?;
    let task = state.tasks().update(caller, id, body.into()).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `DELETE /tasks/{id}`
pub async fn delete_task<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;
    state.tasks().delete(caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /tasks/reorder`
///
/// Every failure is reported as a client error.
pub async fn reorder_tasks<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    body: Result<Json<ReorderBody>, JsonRejection>,
) -> ApiResult<Json<ReorderResponse>> {
    let Json(body) = body.map_err(ApiError::from)?;
    let mut request = ReorderRequest::new(body.order.unwrap_or_default());
    if let Some(status) = body.status {
        request = request.with_status(status);
    }

    let assignments = state
        .reorder()
        .reorder(caller, request)
        .await
        .map_err(|err| ApiError::from(err).into_client_error())?;

    Ok(Json(ReorderResponse {
        success: true,
        positions: assignments.iter().map(PositionResponse::from).collect(),
    }))
}

/// `GET /tasks/{id}/comments`
pub async fn list_comments<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
) -> ApiResult<Json<Vec<CommentResponse>>> {
    let Path(id) = id?;
    let comments = state.comments().list(caller, id).await?;
    Ok(Json(comments.iter().map(CommentResponse::from).collect()))
}

/// `POST /tasks/{id}/comments`
pub async fn add_comment<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
    id: Result<Path<TaskId>, PathRejection>,
    body: Result<Json<CommentBody>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CommentResponse>)> {
    let Path(id) = id?;
    let Json(body) = body?;
    let comment = state.comments().add(caller, id, &body.content).await?;
    Ok((StatusCode::CREATED, Json(CommentResponse::from(&comment))))
}

/// `GET /tags`
pub async fn list_tags<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
) -> ApiResult<Json<Vec<String>>> {
    Ok(Json(state.tasks().tags(caller).await?))
}

/// `DELETE /account/data`
pub async fn purge_account<R: TaskStorage>(
    State(state): State<AppState<R>>,
    Caller(caller): Caller,
) -> ApiResult<StatusCode> {
    state.tasks().purge(caller).await?;
    Ok(StatusCode::NO_CONTENT)
}
