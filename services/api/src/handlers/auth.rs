use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;
use serde_json::{Value, json};

use medworld_auth::cookie::set_auth_cookie;
use medworld_auth::principal::{Principal, bearer_or_cookie};

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::auth::{
    LoginInput, LoginUseCase, LogoutUseCase, MeUseCase, RegisterInput, RegisterUseCase,
};

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    #[serde(rename = "type")]
    pub role: Option<String>,
}

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = RegisterUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
    };
    let session = usecase
        .execute(RegisterInput {
            first_name: body.first_name,
            last_name: body.last_name,
            email: body.email,
            password: body.password,
            password_confirmation: body.password_confirmation,
            phone_number: body.phone_number,
            address: body.address,
            gender: body.gender,
            date_of_birth: body.date_of_birth,
            role: body.role,
        })
        .await?;

    let jar = set_auth_cookie(jar, session.token.clone());
    Ok((
        StatusCode::CREATED,
        jar,
        Json(json!({
            "message": "Registration successful",
            "user": session.user,
            "token": session.token,
        })),
    ))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let usecase = LoginUseCase {
        users: state.user_repo(),
        tokens: state.token_repo(),
    };
    let session = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;

    let jar = set_auth_cookie(jar, session.token.clone());
    Ok((
        jar,
        Json(json!({
            "message": "Login successful",
            "user": session.user,
            "token": session.token,
        })),
    ))
}

// ── POST /auth/logout ────────────────────────────────────────────────────────

/// Revokes the token the request presented. The cookie is left alone; once
/// the row is gone the stale value no longer resolves.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<Json<Value>, ApiError> {
    if let Some(token) = bearer_or_cookie(&headers, &jar) {
        let usecase = LogoutUseCase {
            tokens: state.token_repo(),
        };
        usecase.execute(&token).await?;
    }
    Ok(Json(json!({ "message": "Logout successful" })))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

pub async fn me(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<Value>, ApiError> {
    let usecase = MeUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(principal.user_id).await?;
    Ok(Json(json!({ "user": user })))
}
