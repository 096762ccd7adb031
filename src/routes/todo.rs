use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::dao::TodoPatch,
    db::entities::todo,
    error::AppError,
    middleware::OwnerGuard,
    response::{ApiResult, JsonApiResponse},
    services::{ServiceContext, todo_service::TodoService},
    state::AppState,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTodoRequest {
    pub text: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTodoRequest {
    pub text: Option<String>,
    pub status: Option<bool>,
    pub background_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReparentTodoRequest {
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetCollapsedRequest {
    pub collapsed: bool,
    #[serde(default)]
    pub recursive: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoResponse {
    pub id: Uuid,
    pub text: String,
    pub status: bool,
    pub parent_id: Option<Uuid>,
    pub children: Vec<Uuid>,
    pub collapsed: bool,
    pub background_color: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Serialize)]
pub struct DeleteTodoResponse {
    pub deleted: u64,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todo", get(list_todos).post(create_todo))
        .route(
            "/todo/{id}",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route("/todo/parent/{id}", post(reparent_todo))
        .route("/todo/collapsed/{id}", post(set_collapsed))
        .with_state(state)
}

async fn create_todo(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Json(body): Json<CreateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let text = normalize_text(&body.text)?;
    let service = todo_service_from_state(state.as_ref());
    let created = service.create_todo(owner.0, text, body.parent_id).await?;
    JsonApiResponse::with_status(StatusCode::CREATED, "created", created.into())
}

async fn list_todos(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
) -> ApiResult<Vec<TodoResponse>> {
    let service = todo_service_from_state(state.as_ref());
    let todos = service.list_todos(owner.0).await?;
    JsonApiResponse::ok(todos.into_iter().map(TodoResponse::from).collect())
}

async fn get_todo(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<TodoResponse> {
    let service = todo_service_from_state(state.as_ref());
    let found = service.get_todo(owner.0, id).await?;
    JsonApiResponse::ok(found.into())
}

async fn update_todo(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateTodoRequest>,
) -> ApiResult<TodoResponse> {
    let UpdateTodoRequest {
        text,
        status,
        background_color,
    } = body;
    let text = match text {
        Some(value) => Some(normalize_text(&value)?.to_string()),
        None => None,
    };
    if text.is_none() && status.is_none() && background_color.is_none() {
        return Err(AppError::bad_request(
            "Text, status or backgroundColor required",
        ));
    }
    let patch = TodoPatch {
        text,
        status,
        background_color,
    };
    let service = todo_service_from_state(state.as_ref());
    let updated = service.update_todo(owner.0, id, patch).await?;
    JsonApiResponse::ok(updated.into())
}

async fn reparent_todo(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<ReparentTodoRequest>,
) -> ApiResult<serde_json::Value> {
    let service = todo_service_from_state(state.as_ref());
    service.reparent_todo(owner.0, id, body.parent_id).await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}

async fn set_collapsed(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Path(id): Path<Uuid>,
    Json(body): Json<SetCollapsedRequest>,
) -> ApiResult<serde_json::Value> {
    let service = todo_service_from_state(state.as_ref());
    service
        .set_collapsed(owner.0, id, body.collapsed, body.recursive)
        .await?;
    JsonApiResponse::ok(serde_json::Value::Null)
}

async fn delete_todo(
    State(state): State<Arc<AppState>>,
    owner: OwnerGuard,
    Path(id): Path<Uuid>,
) -> ApiResult<DeleteTodoResponse> {
    let service = todo_service_from_state(state.as_ref());
    let deleted = service.delete_todo(owner.0, id).await?;
    JsonApiResponse::ok(DeleteTodoResponse { deleted })
}

fn normalize_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::bad_request("Text required"));
    }
    Ok(trimmed)
}

impl From<todo::Model> for TodoResponse {
    fn from(model: todo::Model) -> Self {
        Self {
            id: model.id,
            text: model.text,
            status: model.status,
            parent_id: model.parent_id,
            children: model.children.0,
            collapsed: model.collapsed,
            background_color: model.background_color,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

fn todo_service_from_state(state: &AppState) -> TodoService {
    ServiceContext::from_state(state).todo()
}
