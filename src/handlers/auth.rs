// src/handlers/auth.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, UpdateUserPayload, UserProfile},
};

// POST /api/register/
#[utoipa::path(
    post,
    path = "/api/register/",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = UserProfile),
        (status = 400, description = "Dados inválidos ou usuário/e-mail já existente")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.auth_service.register_user(payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

// POST /api/auth/token/
#[utoipa::path(
    post,
    path = "/api/auth/token/",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Token de acesso", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, AppError> {
    let token = app_state.auth_service.login_user(payload).await?;
    Ok(Json(token))
}

// GET /api/users/me/
#[utoipa::path(
    get,
    path = "/api/users/me/",
    tag = "Users",
    responses((status = 200, body = UserProfile)),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<UserProfile> {
    Json(user.into())
}

// GET /api/users/
#[utoipa::path(
    get,
    path = "/api/users/",
    tag = "Users",
    responses((status = 200, body = Vec<UserProfile>)),
    security(("api_jwt" = []))
)]
pub async fn list_users(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = app_state.auth_service.list_users().await?;
    Ok((StatusCode::OK, Json(users)))
}

// PUT /api/users/{id}/
#[utoipa::path(
    put,
    path = "/api/users/{id}/",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = UpdateUserPayload,
    responses(
        (status = 200, body = UserProfile),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.auth_service.update_user(id, payload).await?;
    Ok((StatusCode::OK, Json(profile)))
}

// DELETE /api/users/{id}/ (desativa)
#[utoipa::path(
    delete,
    path = "/api/users/{id}/",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Usuário desativado", body = UserProfile),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_user(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let profile = app_state.auth_service.deactivate_user(id).await?;
    Ok((StatusCode::OK, Json(profile)))
}
