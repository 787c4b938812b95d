//! 수집기 에러 타입.

use thiserror::Error;

/// 수집기 에러.
///
/// 여기까지 올라온 에러는 실행을 중단시킨다. 실행 중 복구 계층은
/// 없다. 고장나면 고치고 다시 돌리는 운영 모델이라서다.
#[derive(Debug, Error)]
pub enum CollectorError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 날짜 형식 에러
    #[error(transparent)]
    Date(#[from] krxsnap_core::CoreError),

    /// 데이터 조회/변환/저장 에러
    #[error(transparent)]
    Data(#[from] krxsnap_data::DataError),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

/// 수집 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, CollectorError>;
