pub mod message;
pub mod user;

pub use message::MessageEntity;
pub use user::UserEntity;
