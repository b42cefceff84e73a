use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::{BroadCoordinate, Quantizer};
use crate::models::User;
use crate::proximity::UserQuery;
use crate::routes::{non_empty, parse_bucket, parse_number};

/// 对外返回的用户，只暴露当前位置所在的桶
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: String,
    pub display_name: String,
    pub broad_coordinate: Option<BroadCoordinate>,
    pub last_updated: DateTime<Utc>,
}

impl UserInfo {
    pub fn from_user(user: User, quantizer: &Quantizer) -> Self {
        UserInfo {
            broad_coordinate: user
                .precise_coordinate
                .map(|precise| quantizer.quantize_coordinate(precise)),
            user_id: user.user_id,
            display_name: user.display_name,
            last_updated: user.last_updated,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_id: String,
    pub user_display_name: String,
}

impl CreateUserRequest {
    /// 与 `POST /messages` 相同，用户ID只要求非空
    pub fn validate(&self) -> Result<(), AppError> {
        if self.user_id.trim().is_empty() {
            return Err(AppError::Validation("userId must not be empty".into()));
        }
        if self.user_display_name.trim().is_empty() {
            return Err(AppError::Validation("userDisplayName must not be empty".into()));
        }
        Ok(())
    }
}

/// `PUT /users` 的查询参数
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationUpdateParams {
    pub user_id: Option<String>,
    pub specific_lat: Option<String>,
    pub specific_lon: Option<String>,
}

impl LocationUpdateParams {
    pub fn parse(self) -> Result<(String, f64, f64), AppError> {
        match (
            non_empty(self.user_id),
            non_empty(self.specific_lat),
            non_empty(self.specific_lon),
        ) {
            (Some(user_id), Some(lat), Some(lon)) => Ok((
                user_id,
                parse_number("specificLat", &lat)?,
                parse_number("specificLon", &lon)?,
            )),
            _ => Err(AppError::Validation(
                "userId, specificLat and specificLon are required".into(),
            )),
        }
    }
}

/// `GET /users` 的查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParams {
    pub user_id: Option<String>,
    pub broad_lat: Option<String>,
    pub broad_lon: Option<String>,
    pub seconds_since_update: Option<String>,
}

impl TryFrom<UserParams> for UserQuery {
    type Error = AppError;

    fn try_from(params: UserParams) -> Result<Self, Self::Error> {
        if let Some(user_id) = non_empty(params.user_id) {
            return Ok(UserQuery::ById(user_id));
        }

        let window = non_empty(params.seconds_since_update);
        match (parse_bucket(params.broad_lat, params.broad_lon)?, window) {
            (Some(bucket), Some(raw)) => Ok(UserQuery::ByBucketAndTime(
                bucket,
                parse_number("secondsSinceUpdate", &raw)?,
            )),
            (Some(bucket), None) => Ok(UserQuery::ByBucket(bucket)),
            (None, Some(_)) => Err(AppError::Validation(
                "secondsSinceUpdate requires broadLat and broadLon".into(),
            )),
            (None, None) => Ok(UserQuery::All),
        }
    }
}
