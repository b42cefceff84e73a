// 写入操作：量化只在写入时发生一次

use chrono::Utc;

use super::{ProximityQueryEngine, QueryError};
use crate::geo::{BroadCoordinate, Coordinate};
use crate::models::{Message, NewMessage, Record, User};

impl ProximityQueryEngine {
    /// 创建消息，粗坐标在这里由精确坐标计算后一并保存
    pub async fn create_message(&self, new_message: NewMessage) -> Result<Message, QueryError> {
        let precise = Coordinate::new(new_message.latitude, new_message.longitude)?;
        let broad = self.quantizer.quantize_coordinate(precise);

        if let Some((latitude, longitude)) = new_message.claimed_broad {
            let claimed = BroadCoordinate::new(latitude, longitude)?;
            if claimed != broad {
                return Err(QueryError::BroadCoordinateMismatch {
                    claimed,
                    computed: broad,
                });
            }
        }

        let message = Message {
            msg_id: new_message.msg_id,
            user_id: new_message.user_id,
            content: new_message.content,
            precise_coordinate: precise,
            broad_coordinate: broad,
            created_at: new_message.created_at,
        };
        self.messages.insert(message.clone()).await?;

        tracing::info!(
            "Created message {} in bucket ({}, {})",
            message.msg_id,
            broad.latitude,
            broad.longitude
        );
        Ok(message)
    }

    /// 创建尚无位置的新用户
    pub async fn create_user(&self, user_id: &str, display_name: &str) -> Result<User, QueryError> {
        let user = User::new(user_id, display_name, Utc::now());
        self.users.insert(user.clone()).await?;
        Ok(user)
    }

    /// 整体替换用户位置
    pub async fn update_user_location(&self, user_id: &str, latitude: f64, longitude: f64) -> Result<(), QueryError> {
        let location = Coordinate::new(latitude, longitude)?;
        let updated = self
            .users
            .update_location(user_id, location, Utc::now())
            .await?;

        if !updated {
            return Err(QueryError::not_found(User::KIND, user_id));
        }
        tracing::debug!("Updated location for user {}", user_id);
        Ok(())
    }
}
