use crate::geo::BroadCoordinate;

/// 桶内消息缓存键前缀
const BUCKET_MESSAGES_PREFIX: &str = "msg:bucket:";
/// 桶代数键前缀，每次写入消息后自增
const BUCKET_GENERATION_PREFIX: &str = "msg:bucket_gen:";

/// `-0.0` 与 `0.0` 是同一个桶
fn normalize(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value }
}

fn bucket_suffix(bucket: BroadCoordinate) -> String {
    // 粗坐标由整数网格还原，Display 输出稳定
    format!("{}:{}", normalize(bucket.latitude), normalize(bucket.longitude))
}

/// 生成桶内消息缓存键，键中带上当前代数
pub fn bucket_messages_key(bucket: BroadCoordinate, generation: u64) -> String {
    format!("{}{}:{}", BUCKET_MESSAGES_PREFIX, bucket_suffix(bucket), generation)
}

/// 生成桶代数键
pub fn bucket_generation_key(bucket: BroadCoordinate) -> String {
    format!("{}{}", BUCKET_GENERATION_PREFIX, bucket_suffix(bucket))
}
