mod handler;
mod model;

pub use handler::{create_user, get_users, nearby_users, update_location};
pub use model::{CreateUserRequest, LocationUpdateParams, UserInfo, UserParams};
