use crate::application::auth_service::AuthService;
use crate::application::task_service::TaskService;
use crate::data::task_repository::InMemoryTaskRepository;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::error::DomainError;
use crate::domain::task::{CreateTask, UpdateTask};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{FromRequest, HttpMessage, HttpResponse, ResponseError, web};
use chrono::Utc;
use serde::Serialize;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

// AppState holding the services
pub struct AppState {
    pub task_service: TaskService<InMemoryTaskRepository>,
    pub auth_service: Arc<AuthService<InMemoryUserRepository>>,
}

// Uniform error response format
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    details: serde_json::Value,
}

// API Error Types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            ApiError::Validation(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        let error_msg = self.to_string();

        let details = match self {
            ApiError::Validation(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Internal(msg) => serde_json::json!({ "message": msg }),
        };

        match self {
            ApiError::Validation(_) => {
                warn!(error = %error_msg, status = %status, "Validation error")
            }
            ApiError::NotFound(_) => {
                warn!(error = %error_msg, status = %status, "Resource not found")
            }
            ApiError::Unauthorized(_) => {
                warn!(error = %error_msg, status = %status, "Unauthorized")
            }
            ApiError::Internal(_) => {
                error!(error = %error_msg, status = %status, "Internal error")
            }
        }

        let error_response = ErrorResponse {
            error: error_msg,
            details,
        };

        HttpResponse::build(status).json(error_response)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<DomainError>() {
            Some(DomainError::Validation(msg)) => ApiError::Validation(msg.clone()),
            Some(DomainError::NotFound(msg)) => ApiError::NotFound(msg.clone()),
            Some(DomainError::Unauthorized(msg)) => ApiError::Unauthorized(msg.clone()),
            Some(DomainError::Internal(msg)) => ApiError::Internal(msg.clone()),
            None => ApiError::Internal(err.to_string()),
        }
    }
}

// AuthenticatedUser extractor
impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let user = req.extensions().get::<AuthenticatedUser>().cloned();
        Box::pin(async move {
            user.ok_or_else(|| ApiError::Unauthorized("User not authenticated".to_string()))
        })
    }
}

// Handlers

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
struct DeletedResponse {
    message: String,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    info!("Health check requested");
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state, caller), fields(user_id = %caller.user_id))]
pub async fn list_tasks(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let tasks = state
        .task_service
        .list_tasks(&caller.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to list tasks");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(tasks))
}

#[instrument(skip(state, caller, req), fields(user_id = %caller.user_id, task_id))]
pub async fn create_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    req: web::Json<CreateTask>,
) -> Result<HttpResponse, ApiError> {
    info!(title = %req.title, "Creating new task");
    let task = state
        .task_service
        .create_task(&caller.user_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to create task");
            ApiError::from(e)
        })?;
    tracing::Span::current().record("task_id", task.id.as_str());
    info!(task_id = %task.id, "Task created successfully");
    Ok(HttpResponse::Created().json(task))
}

#[instrument(skip(state, caller), fields(user_id = %caller.user_id, task_id = %*path))]
pub async fn get_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    let task = state
        .task_service
        .get_task(&caller.user_id, &task_id)
        .await
        .map_err(|e| {
            error!(task_id = %task_id, error = %e, "Failed to get task");
            ApiError::from(e)
        })?;
    Ok(HttpResponse::Ok().json(task))
}

#[instrument(skip(state, caller, req), fields(user_id = %caller.user_id, task_id = %*path))]
pub async fn update_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
    req: web::Json<UpdateTask>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    let task = state
        .task_service
        .update_task(&caller.user_id, &task_id, req.into_inner())
        .await
        .map_err(|e| {
            error!(task_id = %task_id, error = %e, "Failed to update task");
            ApiError::from(e)
        })?;
    info!(task_id = %task.id, "Task updated successfully");
    Ok(HttpResponse::Ok().json(task))
}

#[instrument(skip(state, caller), fields(user_id = %caller.user_id, task_id = %*path))]
pub async fn delete_task(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let task_id = path.into_inner();
    state
        .task_service
        .delete_task(&caller.user_id, &task_id)
        .await
        .map_err(|e| {
            error!(task_id = %task_id, error = %e, "Failed to delete task");
            ApiError::from(e)
        })?;
    info!(task_id = %task_id, "Task deleted successfully");
    Ok(HttpResponse::Ok().json(DeletedResponse {
        message: "Task removed".to_string(),
    }))
}
