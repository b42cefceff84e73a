use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::geo::Coordinate;

/// 用户记录
///
/// 位置频繁变化，所以只保存精确坐标，粗坐标在每次查询时现算。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub display_name: String,
    /// 尚未上报位置的新用户为 None
    pub precise_coordinate: Option<Coordinate>,
    pub last_updated: DateTime<Utc>,
}

impl User {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            display_name: display_name.into(),
            precise_coordinate: None,
            last_updated: now,
        }
    }
}

impl Record for User {
    const KIND: &'static str = "user";

    fn id(&self) -> &str {
        &self.user_id
    }
}
