use axum::{
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use super::model::{CreateUserRequest, LocationUpdateParams, UserInfo, UserParams};
use crate::AppState;
use crate::error::AppError;
use crate::proximity::UserQuery;
use crate::routes::parse_number;
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    req.validate()?;

    let user = state
        .engine
        .create_user(&req.user_id, &req.user_display_name)
        .await?;
    tracing::info!("Created user: {}", user.user_id);

    Ok((
        StatusCode::CREATED,
        success_to_api_response(UserInfo::from_user(user, state.engine.quantizer())),
    ))
}

/// `PUT /users?userId=&specificLat=&specificLon=`
#[axum::debug_handler]
pub async fn update_location(
    State(state): State<AppState>,
    Query(params): Query<LocationUpdateParams>,
) -> Result<impl IntoResponse, AppError> {
    let (user_id, latitude, longitude) = params.parse()?;
    state
        .engine
        .update_user_location(&user_id, latitude, longitude)
        .await?;

    Ok(success_to_api_response(serde_json::json!({
        "userId": user_id
    })))
}

/// `GET /users`
#[axum::debug_handler]
pub async fn get_users(
    State(state): State<AppState>,
    Query(params): Query<UserParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = UserQuery::try_from(params)?;
    let bucket_query = query.is_bucket_query();
    let users = state.engine.query_users(query).await?;

    // 只有按桶查询的空结果才视为未找到
    if bucket_query && users.is_empty() {
        return Err(AppError::NotFound("No users found".into()));
    }
    let quantizer = *state.engine.quantizer();
    Ok(success_to_api_response(
        users.map(|user| UserInfo::from_user(user, &quantizer)),
    ))
}

/// `GET /users/get/specificRange/{lat}/{lon}`：与给定精确坐标同桶的用户，可能为空列表
#[axum::debug_handler]
pub async fn nearby_users(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let users = state
        .engine
        .nearby_users(parse_number("lat", &lat)?, parse_number("lon", &lon)?)
        .await?;

    let quantizer = state.engine.quantizer();
    let users: Vec<UserInfo> = users
        .into_iter()
        .map(|user| UserInfo::from_user(user, quantizer))
        .collect();
    Ok(success_to_api_response(users))
}
