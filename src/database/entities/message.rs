// 消息实体
// 对应数据库中的 messages 表

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::geo::{BroadCoordinate, Coordinate};
use crate::models::Message;

/// 消息实体，坐标按列展开保存
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    /// 消息ID（客户端生成）
    pub msg_id: String,
    /// 发送者ID
    pub user_id: String,
    /// 消息内容
    pub content: String,
    /// 精确纬度
    pub precise_lat: f64,
    /// 精确经度
    pub precise_lon: f64,
    /// 粗化纬度
    pub broad_lat: f64,
    /// 粗化经度
    pub broad_lon: f64,
    /// 客户端发送时间
    pub created_at: DateTime<Utc>,
}

impl From<MessageEntity> for Message {
    fn from(entity: MessageEntity) -> Self {
        Message {
            msg_id: entity.msg_id,
            user_id: entity.user_id,
            content: entity.content,
            precise_coordinate: Coordinate {
                latitude: entity.precise_lat,
                longitude: entity.precise_lon,
            },
            broad_coordinate: BroadCoordinate {
                latitude: entity.broad_lat,
                longitude: entity.broad_lon,
            },
            created_at: entity.created_at,
        }
    }
}
