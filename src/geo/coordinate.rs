use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 纬度取值范围（含边界）
const LATITUDE_LIMIT: f64 = 90.0;
/// 经度取值范围（含边界）
const LONGITUDE_LIMIT: f64 = 180.0;

/// 坐标超出合法范围或不是有限数值
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinate: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

fn validate(latitude: f64, longitude: f64) -> Result<(), InvalidCoordinate> {
    // NaN 与任何数比较都为 false，这里一并拒绝
    let lat_ok = latitude.is_finite() && latitude.abs() <= LATITUDE_LIMIT;
    let lon_ok = longitude.is_finite() && longitude.abs() <= LONGITUDE_LIMIT;
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// 设备上报的精确位置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// 纬度
    pub latitude: f64,
    /// 经度
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        validate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// 粗化后的位置，即附近查询使用的桶键
///
/// 正常情况下只由 [`Quantizer`](super::Quantizer) 产生；查询方也可以直接提交一个
/// 粗坐标作为搜索键，此时只校验范围，不会重新粗化。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BroadCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl BroadCoordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        validate(latitude, longitude)?;
        Ok(Self {
            latitude,
            longitude,
        })
    }
}
