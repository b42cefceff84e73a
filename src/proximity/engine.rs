use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::{MessageQuery, QueryError, QueryOutput, UserQuery};
use crate::database::{MemoryMessageSource, MemoryUserSource, MessageSource, UserSource};
use crate::geo::{BroadCoordinate, Quantizer, within_window};
use crate::models::{Message, Record, User};

/// 附近查询引擎
///
/// 持有消息和用户两个记录源以及全局唯一的量化器。引擎本身无状态，可以在
/// 多个请求之间共享。
#[derive(Clone)]
pub struct ProximityQueryEngine {
    pub(super) messages: Arc<dyn MessageSource>,
    pub(super) users: Arc<dyn UserSource>,
    pub(super) quantizer: Quantizer,
}

impl ProximityQueryEngine {
    pub fn new(messages: Arc<dyn MessageSource>, users: Arc<dyn UserSource>, quantizer: Quantizer) -> Self {
        Self {
            messages,
            users,
            quantizer,
        }
    }

    /// 使用独立的内存记录源
    pub fn in_memory(quantizer: Quantizer) -> Self {
        Self::new(
            Arc::new(MemoryMessageSource::new()),
            Arc::new(MemoryUserSource::new()),
            quantizer,
        )
    }

    pub fn quantizer(&self) -> &Quantizer {
        &self.quantizer
    }

    pub fn quantize(&self, latitude: f64, longitude: f64) -> Result<BroadCoordinate, QueryError> {
        Ok(self.quantizer.quantize(latitude, longitude)?)
    }

    pub async fn query_messages(&self, query: MessageQuery) -> Result<QueryOutput<Message>, QueryError> {
        let output = match query {
            MessageQuery::All => QueryOutput::Many(self.all_messages().await?),
            MessageQuery::ById(msg_id) => QueryOutput::One(self.message_by_id(&msg_id).await?),
            MessageQuery::ByBucket(bucket) => QueryOutput::Many(self.messages_in_bucket(bucket).await?),
            MessageQuery::ByBucketAndTime(bucket, window_seconds) => {
                QueryOutput::Many(self.recent_messages_in_bucket(bucket, window_seconds).await?)
            }
        };
        Ok(output)
    }

    pub async fn all_messages(&self) -> Result<Vec<Message>, QueryError> {
        tracing::debug!("Query all messages");
        Ok(self.messages.all().await?)
    }

    pub async fn message_by_id(&self, msg_id: &str) -> Result<Message, QueryError> {
        tracing::debug!("Query message by id: {}", msg_id);
        self.messages
            .find_by_id(msg_id)
            .await?
            .ok_or_else(|| QueryError::not_found(Message::KIND, msg_id))
    }

    /// 返回粗坐标与 `bucket` 完全相等的消息；桶内无消息时返回空列表
    pub async fn messages_in_bucket(&self, bucket: BroadCoordinate) -> Result<Vec<Message>, QueryError> {
        tracing::debug!("Query messages in bucket ({}, {})", bucket.latitude, bucket.longitude);
        Ok(self.messages.find_by_broad_coordinate(bucket).await?)
    }

    pub async fn recent_messages_in_bucket(
        &self,
        bucket: BroadCoordinate,
        window_seconds: f64,
    ) -> Result<Vec<Message>, QueryError> {
        // 整个查询只取一次当前时间
        let now = Utc::now();
        self.recent_messages_in_bucket_as_of(bucket, window_seconds, now)
            .await
    }

    pub async fn recent_messages_in_bucket_as_of(
        &self,
        bucket: BroadCoordinate,
        window_seconds: f64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Message>, QueryError> {
        let mut messages = self.messages_in_bucket(bucket).await?;
        messages.retain(|message| within_window(message.created_at, now, window_seconds));
        Ok(messages)
    }

    pub async fn query_users(&self, query: UserQuery) -> Result<QueryOutput<User>, QueryError> {
        let output = match query {
            UserQuery::All => QueryOutput::Many(self.all_users().await?),
            UserQuery::ById(user_id) => QueryOutput::One(self.user_by_id(&user_id).await?),
            UserQuery::ByBucket(bucket) => QueryOutput::Many(self.users_in_bucket(bucket).await?),
            UserQuery::ByBucketAndTime(bucket, window_seconds) => {
                QueryOutput::Many(self.recent_users_in_bucket(bucket, window_seconds).await?)
            }
        };
        Ok(output)
    }

    pub async fn all_users(&self) -> Result<Vec<User>, QueryError> {
        tracing::debug!("Query all users");
        Ok(self.users.all().await?)
    }

    pub async fn user_by_id(&self, user_id: &str) -> Result<User, QueryError> {
        tracing::debug!("Query user by id: {}", user_id);
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| QueryError::not_found(User::KIND, user_id))
    }

    /// 用户的粗坐标不缓存，每次都由当前精确位置重新量化后比较
    pub async fn users_in_bucket(&self, bucket: BroadCoordinate) -> Result<Vec<User>, QueryError> {
        tracing::debug!("Query users in bucket ({}, {})", bucket.latitude, bucket.longitude);
        let users = self.users.all().await?;
        Ok(users
            .into_iter()
            .filter(|user| self.user_in_bucket(user, bucket))
            .collect())
    }

    pub async fn recent_users_in_bucket(
        &self,
        bucket: BroadCoordinate,
        window_seconds: f64,
    ) -> Result<Vec<User>, QueryError> {
        let now = Utc::now();
        let mut users = self.users_in_bucket(bucket).await?;
        users.retain(|user| within_window(user.last_updated, now, window_seconds));
        Ok(users)
    }

    /// 先量化给定的精确坐标，再返回同一个桶里的所有用户
    pub async fn nearby_users(&self, latitude: f64, longitude: f64) -> Result<Vec<User>, QueryError> {
        let bucket = self.quantize(latitude, longitude)?;
        self.users_in_bucket(bucket).await
    }

    fn user_in_bucket(&self, user: &User, bucket: BroadCoordinate) -> bool {
        // 还没上报位置的用户不属于任何桶
        user.precise_coordinate
            .is_some_and(|precise| self.quantizer.quantize_coordinate(precise) == bucket)
    }
}
