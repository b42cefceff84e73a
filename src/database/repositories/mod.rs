pub mod message;
pub mod user;

pub use message::PgMessageSource;
pub use user::PgUserSource;
