//! 附近查询引擎。
//!
//! 消息按写入时保存的粗坐标做等值匹配；用户的粗坐标不落库，每次查询时由当前
//! 精确位置现算。按ID查询找不到时返回 [`QueryError::NotFound`]，而桶查询没有
//! 命中时返回空列表，两者在引擎内部始终区分。

mod engine;
mod error;
mod query;
mod writes;

pub use engine::ProximityQueryEngine;
pub use error::QueryError;
pub use query::{MessageQuery, QueryOutput, UserQuery};
