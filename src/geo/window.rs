use chrono::{DateTime, Utc};

/// 判断记录的创建时间是否落在 `now` 之前 `window_seconds` 秒以内（含边界）
///
/// 比较统一以毫秒进行。负数或 NaN 窗口永远不匹配；晚于 `now` 的记录视为在窗口内。
pub fn within_window(created_at: DateTime<Utc>, now: DateTime<Utc>, window_seconds: f64) -> bool {
    if window_seconds.is_nan() || window_seconds < 0.0 {
        return false;
    }
    let window_ms = window_seconds * 1000.0;
    let elapsed_ms = (now - created_at).num_milliseconds() as f64;
    elapsed_ms <= window_ms
}
