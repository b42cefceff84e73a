use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::geo::BroadCoordinate;
use crate::models::{Message, NewMessage};
use crate::proximity::MessageQuery;
use crate::routes::{non_empty, parse_bucket, parse_number};

/// 对外返回的消息，不包含发送者的精确坐标
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageInfo {
    pub msg_id: String,
    pub user_id: String,
    pub content: String,
    pub broad_coordinate: BroadCoordinate,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageInfo {
    fn from(message: Message) -> Self {
        MessageInfo {
            msg_id: message.msg_id,
            user_id: message.user_id,
            content: message.content,
            broad_coordinate: message.broad_coordinate,
            created_at: message.created_at,
        }
    }
}

/// `GET /messages` 的查询参数，原样接收文本
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageParams {
    pub msg_id: Option<String>,
    pub broad_lat: Option<String>,
    pub broad_lon: Option<String>,
    pub seconds_since_creation: Option<String>,
}

impl TryFrom<MessageParams> for MessageQuery {
    type Error = AppError;

    /// 优先级：msgId > 粗坐标 + 时间窗口 > 粗坐标 > 全部
    fn try_from(params: MessageParams) -> Result<Self, Self::Error> {
        if let Some(msg_id) = non_empty(params.msg_id) {
            return Ok(MessageQuery::ById(msg_id));
        }

        let window = non_empty(params.seconds_since_creation);
        match (parse_bucket(params.broad_lat, params.broad_lon)?, window) {
            (Some(bucket), Some(raw)) => Ok(MessageQuery::ByBucketAndTime(
                bucket,
                parse_number("secondsSinceCreation", &raw)?,
            )),
            (Some(bucket), None) => Ok(MessageQuery::ByBucket(bucket)),
            (None, Some(_)) => Err(AppError::Validation(
                "secondsSinceCreation requires broadLat and broadLon".into(),
            )),
            (None, None) => Ok(MessageQuery::All),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMessageRequest {
    pub user_id: String,
    pub msg_id: String,
    pub msg_content: String,
    pub specific_lat: f64,
    pub specific_lon: f64,
    /// Unix 毫秒时间戳
    pub time_sent: i64,
    pub broad_lat: Option<f64>,
    pub broad_lon: Option<f64>,
}

impl TryFrom<CreateMessageRequest> for NewMessage {
    type Error = AppError;

    fn try_from(req: CreateMessageRequest) -> Result<Self, Self::Error> {
        if req.msg_id.trim().is_empty() || req.user_id.trim().is_empty() {
            return Err(AppError::Validation("msgId and userId must not be empty".into()));
        }

        let created_at = DateTime::from_timestamp_millis(req.time_sent)
            .ok_or_else(|| AppError::Validation(format!("timeSent out of range: {}", req.time_sent)))?;

        let claimed_broad = match (req.broad_lat, req.broad_lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "broadLat and broadLon must be provided together".into(),
                ));
            }
        };

        Ok(NewMessage {
            msg_id: req.msg_id,
            user_id: req.user_id,
            content: req.msg_content,
            latitude: req.specific_lat,
            longitude: req.specific_lon,
            claimed_broad,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> MessageParams {
        let mut params = MessageParams::default();
        for (key, value) in pairs {
            let value = Some(value.to_string());
            match *key {
                "msgId" => params.msg_id = value,
                "broadLat" => params.broad_lat = value,
                "broadLon" => params.broad_lon = value,
                "secondsSinceCreation" => params.seconds_since_creation = value,
                _ => unreachable!(),
            }
        }
        params
    }

    #[test]
    fn test_query_precedence() {
        let bucket = BroadCoordinate { latitude: 1.5, longitude: 2.5 };

        let by_id = MessageQuery::try_from(params(&[("msgId", "m1"), ("broadLat", "1.5"), ("broadLon", "2.5")]));
        assert_eq!(by_id.unwrap(), MessageQuery::ById("m1".into()));

        let timed = MessageQuery::try_from(params(&[
            ("broadLat", "1.5"),
            ("broadLon", "2.5"),
            ("secondsSinceCreation", "30"),
        ]));
        assert_eq!(timed.unwrap(), MessageQuery::ByBucketAndTime(bucket, 30.0));

        let bucket_only = MessageQuery::try_from(params(&[("broadLat", "1.5"), ("broadLon", "2.5")]));
        assert_eq!(bucket_only.unwrap(), MessageQuery::ByBucket(bucket));

        assert_eq!(MessageQuery::try_from(params(&[])).unwrap(), MessageQuery::All);
    }

    #[test]
    fn test_invalid_params() {
        assert!(MessageQuery::try_from(params(&[("broadLat", "north"), ("broadLon", "2")])).is_err());
        assert!(MessageQuery::try_from(params(&[("broadLat", "1")])).is_err());
        assert!(MessageQuery::try_from(params(&[("secondsSinceCreation", "30")])).is_err());
    }

    #[test]
    fn test_create_request_conversion() {
        let req: CreateMessageRequest = serde_json::from_value(serde_json::json!({
            "userId": "u1",
            "msgId": "m1",
            "msgContent": "hello",
            "specificLat": 40.7128,
            "specificLon": -74.006,
            "timeSent": 1_714_564_800_000i64
        }))
        .unwrap();
        let new_message = NewMessage::try_from(req).unwrap();
        assert_eq!(new_message.content, "hello");
        assert_eq!(new_message.created_at.timestamp(), 1_714_564_800);
        assert!(new_message.claimed_broad.is_none());
    }
}
