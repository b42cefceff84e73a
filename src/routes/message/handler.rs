use axum::{
    extract::{Json, Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};

use super::model::{CreateMessageRequest, MessageInfo, MessageParams};
use crate::AppState;
use crate::error::AppError;
use crate::models::NewMessage;
use crate::proximity::MessageQuery;
use crate::routes::parse_number;
use crate::utils::success_to_api_response;

/// `GET /messages`
///
/// 引擎区分"找不到"与"空列表"；按桶查询为空时对客户端表示为未找到，
/// 不带条件的查询总是返回列表（可能为空）。
#[axum::debug_handler]
pub async fn get_messages(
    State(state): State<AppState>,
    Query(params): Query<MessageParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = MessageQuery::try_from(params)?;
    let bucket_query = query.is_bucket_query();
    let messages = state.engine.query_messages(query).await?;

    if bucket_query && messages.is_empty() {
        return Err(AppError::NotFound("No messages found".into()));
    }
    Ok(success_to_api_response(messages.map(MessageInfo::from)))
}

#[axum::debug_handler]
pub async fn create_message(
    State(state): State<AppState>,
    payload: Result<Json<CreateMessageRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(req) = payload.map_err(|e| {
        tracing::warn!("POST /messages: request sent with incorrect data format: {}", e);
        AppError::Validation(e.body_text())
    })?;

    let message = state.engine.create_message(NewMessage::try_from(req)?).await?;
    Ok((
        StatusCode::CREATED,
        success_to_api_response(MessageInfo::from(message)),
    ))
}

/// `GET /messages/get/broad/{lat}/{lon}`：返回给定坐标量化后的结果
#[axum::debug_handler]
pub async fn quantize_coordinates(
    State(state): State<AppState>,
    Path((lat, lon)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let bucket = state
        .engine
        .quantize(parse_number("lat", &lat)?, parse_number("lon", &lon)?)?;
    Ok(success_to_api_response(bucket))
}
