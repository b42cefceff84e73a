use serde::Serialize;

use crate::geo::BroadCoordinate;

/// 消息查询请求，在边界层解析一次后整体传入引擎
#[derive(Debug, Clone, PartialEq)]
pub enum MessageQuery {
    All,
    ById(String),
    ByBucket(BroadCoordinate),
    /// 桶 + 距创建时间的秒数窗口
    ByBucketAndTime(BroadCoordinate, f64),
}

/// 用户查询请求，时间窗口作用于 `last_updated`
#[derive(Debug, Clone, PartialEq)]
pub enum UserQuery {
    All,
    ById(String),
    ByBucket(BroadCoordinate),
    ByBucketAndTime(BroadCoordinate, f64),
}

impl MessageQuery {
    pub fn is_bucket_query(&self) -> bool {
        matches!(self, MessageQuery::ByBucket(_) | MessageQuery::ByBucketAndTime(..))
    }
}

impl UserQuery {
    pub fn is_bucket_query(&self) -> bool {
        matches!(self, UserQuery::ByBucket(_) | UserQuery::ByBucketAndTime(..))
    }
}

/// 查询结果：按ID查询得到单条记录，其余得到列表（可能为空）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryOutput<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> QueryOutput<T> {
    /// 空列表；单条记录永远不为空
    pub fn is_empty(&self) -> bool {
        match self {
            QueryOutput::One(_) => false,
            QueryOutput::Many(records) => records.is_empty(),
        }
    }

    pub fn map<U>(self, f: impl Fn(T) -> U) -> QueryOutput<U> {
        match self {
            QueryOutput::One(record) => QueryOutput::One(f(record)),
            QueryOutput::Many(records) => QueryOutput::Many(records.into_iter().map(f).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_query_kinds() {
        let bucket = BroadCoordinate { latitude: 1.0, longitude: 2.0 };
        assert!(MessageQuery::ByBucket(bucket).is_bucket_query());
        assert!(MessageQuery::ByBucketAndTime(bucket, 5.0).is_bucket_query());
        assert!(!MessageQuery::All.is_bucket_query());
        assert!(!MessageQuery::ById("m1".into()).is_bucket_query());

        assert!(UserQuery::ByBucketAndTime(bucket, 5.0).is_bucket_query());
        assert!(!UserQuery::All.is_bucket_query());
    }
}
