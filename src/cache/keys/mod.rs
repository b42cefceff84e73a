/// 缓存键模块
/// 提供各种缓存键生成函数

// 消息缓存键模块
pub mod message_keys;

pub use message_keys::{bucket_generation_key, bucket_messages_key};
