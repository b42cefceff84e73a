use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::database::{StoreError, UserSource, entities::UserEntity};
use crate::geo::Coordinate;
use crate::models::User;

/// 基于 Postgres 的用户存储库
#[derive(Clone)]
pub struct PgUserSource {
    pool: PgPool,
}

impl PgUserSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserSource for PgUserSource {
    async fn insert(&self, user: User) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (user_id, display_name, precise_lat, precise_lon, last_updated)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&user.user_id)
        .bind(&user.display_name)
        .bind(user.precise_coordinate.map(|c| c.latitude))
        .bind(user.precise_coordinate.map(|c| c.longitude))
        .bind(user.last_updated)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Duplicate(user.user_id));
        }

        tracing::info!("Created user: {}", user.user_id);
        Ok(())
    }

    /// 根据ID查找用户
    async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT user_id, display_name, precise_lat, precise_lon, last_updated
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// 更新用户位置
    async fn update_location(
        &self,
        user_id: &str,
        location: Coordinate,
        updated_at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET precise_lat = $1, precise_lon = $2, last_updated = $3
            WHERE user_id = $4
            "#,
        )
        .bind(location.latitude)
        .bind(location.longitude)
        .bind(updated_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn all(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserEntity>(
            r#"
            SELECT user_id, display_name, precise_lat, precise_lon, last_updated
            FROM users
            ORDER BY seq
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }
}
