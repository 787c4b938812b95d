//! 코어 에러 타입.

use thiserror::Error;

/// 코어 타입에서 발생하는 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 날짜 형식 에러
    #[error("잘못된 날짜 형식: {0}")]
    Format(String),
}

/// 코어 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, CoreError>;
