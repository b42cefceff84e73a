// 地理坐标核心：坐标值类型、粗化网格与时间窗口

mod coordinate;
mod quantizer;
mod window;

pub use coordinate::{BroadCoordinate, Coordinate, InvalidCoordinate};
pub use quantizer::{DEFAULT_DECIMALS, MAX_DECIMALS, Quantizer};
pub use window::within_window;
