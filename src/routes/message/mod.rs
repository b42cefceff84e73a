mod handler;
mod model;

pub use handler::{create_message, get_messages, quantize_coordinates};
pub use model::{CreateMessageRequest, MessageInfo, MessageParams};
