//! 精确坐标到粗坐标的网格吸附。
//!
//! 网格边长为 `10^-decimals` 度。每个轴独立吸附到最近的网格点，恰好落在两个
//! 网格点正中间的值统一向负无穷方向取整（round-half-down），例如精度为 2 时
//! `0.125 -> 0.12`、`-0.125 -> -0.13`。
//!
//! 写入方与查询方必须使用同一精度；修改精度会使所有已存储的粗坐标失效。

use super::{BroadCoordinate, Coordinate, InvalidCoordinate};

/// 默认保留两位小数（约 1.1km 的网格）
pub const DEFAULT_DECIMALS: u32 = 2;
/// 超过 9 位时网格索引会超出 f64 的精确整数范围
pub const MAX_DECIMALS: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantizer {
    decimals: u32,
    scale: f64,
}

impl Default for Quantizer {
    fn default() -> Self {
        Self::new(DEFAULT_DECIMALS)
    }
}

impl Quantizer {
    pub fn new(decimals: u32) -> Self {
        let decimals = decimals.min(MAX_DECIMALS);
        Self {
            decimals,
            scale: 10f64.powi(decimals as i32),
        }
    }

    pub fn decimals(&self) -> u32 {
        self.decimals
    }

    /// 将一对精确经纬度粗化为桶坐标
    pub fn quantize(&self, latitude: f64, longitude: f64) -> Result<BroadCoordinate, InvalidCoordinate> {
        let precise = Coordinate::new(latitude, longitude)?;
        Ok(self.quantize_coordinate(precise))
    }

    /// 已校验过的坐标不会失败
    pub fn quantize_coordinate(&self, precise: Coordinate) -> BroadCoordinate {
        BroadCoordinate {
            latitude: self.snap(precise.latitude),
            longitude: self.snap(precise.longitude),
        }
    }

    fn snap(&self, value: f64) -> f64 {
        // ceil(x - 0.5) 在 .5 处向下取整
        let cell = (value * self.scale - 0.5).ceil() as i64;
        // 从整数还原可避免出现 -0.0
        cell as f64 / self.scale
    }
}
