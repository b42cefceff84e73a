use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::{MessageSource, StoreError, entities::MessageEntity};
use crate::geo::BroadCoordinate;
use crate::models::Message;

/// 基于 Postgres 的消息存储库
#[derive(Clone)]
pub struct PgMessageSource {
    pool: PgPool,
}

impl PgMessageSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageSource for PgMessageSource {
    async fn insert(&self, message: Message) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO messages
                (msg_id, user_id, content, precise_lat, precise_lon, broad_lat, broad_lon, created_at)
            VALUES
                ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (msg_id) DO NOTHING
            "#,
        )
        .bind(&message.msg_id)
        .bind(&message.user_id)
        .bind(&message.content)
        .bind(message.precise_coordinate.latitude)
        .bind(message.precise_coordinate.longitude)
        .bind(message.broad_coordinate.latitude)
        .bind(message.broad_coordinate.longitude)
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        // 没有插入任何行说明ID已存在
        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(message.msg_id));
        }

        tracing::debug!("Stored message: {}", message.msg_id);
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT msg_id, user_id, content, precise_lat, precise_lon, broad_lat, broad_lon, created_at
            FROM messages
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn find_by_id(&self, msg_id: &str) -> Result<Option<Message>, StoreError> {
        let row = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT msg_id, user_id, content, precise_lat, precise_lon, broad_lat, broad_lon, created_at
            FROM messages
            WHERE msg_id = $1
            "#,
        )
        .bind(msg_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Message::from))
    }

    async fn find_by_broad_coordinate(&self, bucket: BroadCoordinate) -> Result<Vec<Message>, StoreError> {
        // 粗坐标由同一个量化器生成，直接做等值匹配
        let rows = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT msg_id, user_id, content, precise_lat, precise_lon, broad_lat, broad_lon, created_at
            FROM messages
            WHERE broad_lat = $1 AND broad_lon = $2
            ORDER BY seq
            "#,
        )
        .bind(bucket.latitude)
        .bind(bucket.longitude)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Message::from).collect())
    }
}
