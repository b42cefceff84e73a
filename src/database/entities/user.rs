use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::geo::Coordinate;
use crate::models::User;

/// 用户数据库实体
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub user_id: String,
    pub display_name: String,
    /// 未上报位置时两列都为 NULL
    pub precise_lat: Option<f64>,
    pub precise_lon: Option<f64>,
    pub last_updated: DateTime<Utc>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        let precise_coordinate = match (entity.precise_lat, entity.precise_lon) {
            (Some(latitude), Some(longitude)) => Some(Coordinate {
                latitude,
                longitude,
            }),
            _ => None,
        };
        User {
            user_id: entity.user_id,
            display_name: entity.display_name,
            precise_coordinate,
            last_updated: entity.last_updated,
        }
    }
}
