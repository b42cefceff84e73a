/// 缓存操作
/// 提供缓存操作的功能实现

// 消息缓存操作
pub mod message;

pub use message::CachedMessageSource;
