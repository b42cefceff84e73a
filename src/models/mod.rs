// 领域模型
// 消息与用户记录，以及记录源共用的标识约定

pub mod message;
pub mod user;

pub use message::{Message, NewMessage};
pub use user::User;

/// 可按唯一ID检索的记录
pub trait Record: Clone + Send + Sync + 'static {
    /// 记录种类，用于日志和 NotFound 错误
    const KIND: &'static str;

    fn id(&self) -> &str;
}
