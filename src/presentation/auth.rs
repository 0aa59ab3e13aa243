use crate::application::auth_service::AuthService;
use crate::data::user_repository::InMemoryUserRepository;
use crate::domain::user::{CreateUser, LoginRequest};
use crate::presentation::handlers::{ApiError, AppState};
use crate::presentation::middleware::AuthenticatedUser;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{error, info, instrument};

/// Response to signup and signin: the caller identity plus a fresh bearer
/// token, mirroring the wire shape the browser client stores.
#[derive(Serialize)]
pub struct AuthResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub token: String,
}

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

fn auth_service(state: &AppState) -> &AuthService<InMemoryUserRepository> {
    &state.auth_service
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn signup(
    state: web::Data<AppState>,
    req: web::Json<CreateUser>,
) -> Result<HttpResponse, ApiError> {
    info!("Signup request received");

    let (user, token) = auth_service(&state)
        .register(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to register user");
            ApiError::from(e)
        })?;

    info!(user_id = %user.id, "User registered successfully");
    Ok(HttpResponse::Created().json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

#[instrument(skip(state, req), fields(email = %req.email))]
pub async fn signin(
    state: web::Data<AppState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Signin request received");

    let (user, token) = auth_service(&state)
        .login(req.into_inner())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to sign in");
            ApiError::from(e)
        })?;

    info!(user_id = %user.id, "Signin successful");
    Ok(HttpResponse::Ok().json(AuthResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token,
    }))
}

#[instrument(skip(state, caller), fields(user_id = %caller.user_id))]
pub async fn profile(
    state: web::Data<AppState>,
    caller: AuthenticatedUser,
) -> Result<HttpResponse, ApiError> {
    let user = auth_service(&state)
        .profile(&caller.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load profile");
            ApiError::from(e)
        })?;

    Ok(HttpResponse::Ok().json(ProfileResponse {
        id: user.id,
        name: user.name,
        email: user.email,
    }))
}
