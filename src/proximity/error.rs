use thiserror::Error;

use crate::database::StoreError;
use crate::geo::{BroadCoordinate, InvalidCoordinate};

#[derive(Debug, Error)]
pub enum QueryError {
    #[error(transparent)]
    InvalidCoordinate(#[from] InvalidCoordinate),

    /// 客户端提交的粗坐标与服务端量化结果不一致
    #[error(
        "broad coordinate ({}, {}) does not match computed ({}, {})",
        .claimed.latitude, .claimed.longitude, .computed.latitude, .computed.longitude
    )]
    BroadCoordinateMismatch {
        claimed: BroadCoordinate,
        computed: BroadCoordinate,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("record source failure: {0}")]
    RecordSource(#[from] StoreError),
}

impl QueryError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }
}
