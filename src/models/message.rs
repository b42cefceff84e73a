use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Record;
use crate::geo::{BroadCoordinate, Coordinate};

/// 已存储的消息
///
/// `broad_coordinate` 在创建时由精确坐标粗化得到并冗余保存，查询只比较它，
/// 不会再从 `precise_coordinate` 重新推导。消息创建后不可修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub msg_id: String,
    pub user_id: String,
    pub content: String,
    pub precise_coordinate: Coordinate,
    pub broad_coordinate: BroadCoordinate,
    /// 客户端提供的发送时间，不是服务器时间
    pub created_at: DateTime<Utc>,
}

impl Record for Message {
    const KIND: &'static str = "message";

    fn id(&self) -> &str {
        &self.msg_id
    }
}

/// 创建消息的输入，坐标尚未校验
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub msg_id: String,
    pub user_id: String,
    pub content: String,
    pub latitude: f64,
    pub longitude: f64,
    /// 客户端自行计算的粗坐标（可选），必须与服务端结果一致
    pub claimed_broad: Option<(f64, f64)>,
    pub created_at: DateTime<Utc>,
}
