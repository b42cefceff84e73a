use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient, aio::MultiplexedConnection};

use crate::cache::keys::{bucket_generation_key, bucket_messages_key};
use crate::database::{MessageSource, StoreError};
use crate::geo::BroadCoordinate;
use crate::models::Message;

/// 带 Redis 缓存的消息记录源
///
/// 只缓存按桶查询的结果。每个桶有一个代数计数器，缓存键里带着读取时的代数；
/// 写入消息后代数自增，之前读到旧数据的请求即使晚些回写，也只会写到不再被
/// 读取的旧键上。Redis 出错时记录日志后直接回落到底层记录源。
pub struct CachedMessageSource {
    inner: Arc<dyn MessageSource>,
    redis: Arc<RedisClient>,
    ttl: Duration,
}

impl CachedMessageSource {
    pub fn new(inner: Arc<dyn MessageSource>, redis: Arc<RedisClient>, ttl: Duration) -> Self {
        Self { inner, redis, ttl }
    }

    async fn connection(&self) -> Option<MultiplexedConnection> {
        match self.redis.get_multiplexed_async_connection().await {
            Ok(conn) => Some(conn),
            Err(e) => {
                tracing::warn!("Redis unavailable, bypassing message cache: {}", e);
                None
            }
        }
    }

    async fn generation(&self, conn: &mut MultiplexedConnection, bucket: BroadCoordinate) -> Option<u64> {
        let key = bucket_generation_key(bucket);
        let generation: redis::RedisResult<Option<u64>> = conn.get(key.as_str()).await;
        match generation {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                tracing::warn!("Failed to read cache generation {}: {}", key, e);
                None
            }
        }
    }

    async fn cached_bucket(&self, conn: &mut MultiplexedConnection, key: &str) -> Option<Vec<Message>> {
        let cached: redis::RedisResult<Option<String>> = conn.get(key).await;
        match cached {
            Ok(Some(json_str)) => match serde_json::from_str::<Vec<Message>>(&json_str) {
                Ok(messages) => {
                    tracing::debug!("Get bucket messages from cache: {}", key);
                    Some(messages)
                }
                Err(e) => {
                    tracing::warn!("Discarding malformed cache entry {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read cache {}: {}", key, e);
                None
            }
        }
    }

    async fn store_bucket(&self, conn: &mut MultiplexedConnection, key: &str, messages: &[Message]) {
        let Ok(json_str) = serde_json::to_string(messages) else {
            return;
        };
        let result: redis::RedisResult<()> = conn.set_ex(key, json_str, self.ttl.as_secs()).await;
        match result {
            Ok(()) => tracing::debug!("Set bucket messages to cache: {}", key),
            Err(e) => tracing::warn!("Failed to write cache {}: {}", key, e),
        }
    }

    async fn bump_generation(&self, bucket: BroadCoordinate) {
        let Some(mut conn) = self.connection().await else {
            return;
        };
        let key = bucket_generation_key(bucket);
        let result: redis::RedisResult<u64> = conn.incr(key.as_str(), 1u64).await;
        if let Err(e) = result {
            tracing::warn!("Failed to bump cache generation {}: {}", key, e);
        }
    }
}

#[async_trait]
impl MessageSource for CachedMessageSource {
    async fn insert(&self, message: Message) -> Result<(), StoreError> {
        let bucket = message.broad_coordinate;
        self.inner.insert(message).await?;
        // 写入成功后才自增代数，之后的读取都会错过旧缓存
        self.bump_generation(bucket).await;
        Ok(())
    }

    async fn all(&self) -> Result<Vec<Message>, StoreError> {
        self.inner.all().await
    }

    async fn find_by_id(&self, msg_id: &str) -> Result<Option<Message>, StoreError> {
        self.inner.find_by_id(msg_id).await
    }

    async fn find_by_broad_coordinate(&self, bucket: BroadCoordinate) -> Result<Vec<Message>, StoreError> {
        let Some(mut conn) = self.connection().await else {
            return self.inner.find_by_broad_coordinate(bucket).await;
        };
        // 代数必须在读取底层记录源之前取得
        let Some(generation) = self.generation(&mut conn, bucket).await else {
            return self.inner.find_by_broad_coordinate(bucket).await;
        };

        let key = bucket_messages_key(bucket, generation);
        if let Some(messages) = self.cached_bucket(&mut conn, &key).await {
            return Ok(messages);
        }

        let messages = self.inner.find_by_broad_coordinate(bucket).await?;
        self.store_bucket(&mut conn, &key, &messages).await;
        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryMessageSource;
    use crate::geo::{Coordinate, Quantizer};
    use chrono::Utc;

    fn unreachable_cache() -> CachedMessageSource {
        // 端口 1 上没有 Redis，所有缓存操作都会失败
        let client = RedisClient::open("redis://127.0.0.1:1").unwrap();
        CachedMessageSource::new(
            Arc::new(MemoryMessageSource::new()),
            Arc::new(client),
            Duration::from_secs(60),
        )
    }

    fn message(msg_id: &str, latitude: f64, longitude: f64) -> Message {
        Message {
            msg_id: msg_id.to_string(),
            user_id: "u1".to_string(),
            content: "hi".to_string(),
            precise_coordinate: Coordinate { latitude, longitude },
            broad_coordinate: Quantizer::default().quantize(latitude, longitude).unwrap(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back_to_inner() {
        let source = unreachable_cache();
        let m1 = message("m1", 48.8566, 2.3522);
        source.insert(m1.clone()).await.unwrap();
        source.insert(message("m2", -33.8688, 151.2093)).await.unwrap();

        let found = source.find_by_broad_coordinate(m1.broad_coordinate).await.unwrap();
        assert_eq!(found, vec![m1.clone()]);

        assert_eq!(source.find_by_id("m1").await.unwrap(), Some(m1));
        assert_eq!(source.all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_unreachable_redis_keeps_duplicate_detection() {
        let source = unreachable_cache();
        source.insert(message("m1", 1.0, 1.0)).await.unwrap();
        let err = source.insert(message("m1", 2.0, 2.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(id) if id == "m1"));
    }
}
