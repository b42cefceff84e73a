// 缓存模块
// 基于 Redis 的消息桶查询缓存

pub mod keys;
pub mod operations;

pub use operations::message::CachedMessageSource;
