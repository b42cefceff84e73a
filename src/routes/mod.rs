// 路由处理模块
// 查询参数在这里统一解析为强类型，之后不再以字符串形式向下传递

pub mod message;
pub mod user;

use crate::error::AppError;
use crate::geo::BroadCoordinate;

/// 空字符串视为未提供
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn parse_number(field: &str, raw: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(AppError::Validation(format!("{field} must be a number, got {raw:?}"))),
    }
}

/// 解析查询用的粗坐标；两个参数必须同时出现
pub(crate) fn parse_bucket(
    broad_lat: Option<String>,
    broad_lon: Option<String>,
) -> Result<Option<BroadCoordinate>, AppError> {
    match (non_empty(broad_lat), non_empty(broad_lon)) {
        (Some(lat), Some(lon)) => {
            let bucket = BroadCoordinate::new(
                parse_number("broadLat", &lat)?,
                parse_number("broadLon", &lon)?,
            )
            .map_err(|e| AppError::Validation(e.to_string()))?;
            Ok(Some(bucket))
        }
        (None, None) => Ok(None),
        _ => Err(AppError::Validation(
            "broadLat and broadLon must be provided together".into(),
        )),
    }
}
