// 数据库模块
// 记录源接口定义，以及内存和 Postgres 两种实现

pub mod entities; // 数据库行结构
pub mod memory; // 内存记录源
pub mod repositories; // Postgres 记录源

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, postgres::PgPoolOptions};
use thiserror::Error;

use crate::geo::{BroadCoordinate, Coordinate};
use crate::models::{Message, User};

pub use memory::{MemoryMessageSource, MemoryUserSource};
pub use repositories::{PgMessageSource, PgUserSource};

/// 持久层错误，原样向上传递，不做重试
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("record source unavailable: {0}")]
    Unavailable(String),
}

/// 消息记录源
///
/// 调用 `insert` 前，调用方负责已经算好 `broad_coordinate`。
#[async_trait]
pub trait MessageSource: Send + Sync {
    async fn insert(&self, message: Message) -> Result<(), StoreError>;

    /// 按创建顺序返回全部消息
    async fn all(&self) -> Result<Vec<Message>, StoreError>;

    async fn find_by_id(&self, msg_id: &str) -> Result<Option<Message>, StoreError>;

    /// 粗坐标精确相等匹配
    async fn find_by_broad_coordinate(&self, bucket: BroadCoordinate) -> Result<Vec<Message>, StoreError>;
}

/// 用户记录源
#[async_trait]
pub trait UserSource: Send + Sync {
    async fn insert(&self, user: User) -> Result<(), StoreError>;

    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError>;

    /// 整体替换位置；用户不存在时返回 false
    async fn update_location(
        &self,
        user_id: &str,
        location: Coordinate,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// 按创建顺序返回全部用户
    async fn all(&self) -> Result<Vec<User>, StoreError>;
}

/// 建立连接池并执行内嵌的迁移脚本
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                conn.execute("SET application_name = 'geodrop_backend';")
                    .await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(pool)
}
