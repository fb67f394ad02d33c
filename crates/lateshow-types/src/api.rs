use serde::{Deserialize, Serialize};

// -- JWT Claims --

/// JWT claims issued at login and checked by the auth middleware.
/// `sub` carries the numeric user id as a string, the usual JWT convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

// -- Auth --

/// Fields are optional so that a missing field is reported as invalid
/// input instead of a deserialization failure.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub message: String,
}

/// Extra keys are ignored; login only ever answers 200 or 401.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
}

// -- Appearances --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateAppearanceRequest {
    pub rating: Option<i64>,
    pub guest_id: Option<i64>,
    pub episode_id: Option<i64>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
