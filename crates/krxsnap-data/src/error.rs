//! 데이터 계층 에러 타입.
//!
//! 주말/공휴일/미래 날짜 같은 "데이터가 없는 게 정상"인 상황은 에러가
//! 아니라 제어 흐름이다. 여기 정의된 에러는 전부 실행을 중단시킨다.
//! 스키마가 바뀌었는데 조용히 추측해서 이어가면 금융 데이터가 오염된다.

use thiserror::Error;

/// 데이터 조회/변환 에러.
#[derive(Debug, Error)]
pub enum DataError {
    /// 날짜/수치 형식 에러
    #[error("형식 에러: {0}")]
    Format(String),

    /// 응답 행에 기대한 필드가 없음 (원격 스키마 변경 신호)
    #[error("필드를 찾을 수 없음: {0}")]
    MissingField(String),

    /// 알 수 없는 등락구분 코드 (부호를 추측하지 않는다)
    #[error("알 수 없는 등락구분 코드: {0}")]
    UnknownSign(String),

    /// 원격 조회 실패 (전송/HTTP/디코드). 재시도하지 않는다.
    #[error("조회 실패: {0}")]
    Fetch(String),

    /// CSV 처리 에러
    #[error("CSV 에러: {0}")]
    Csv(String),

    /// 파일 입출력 에러
    #[error("입출력 에러: {0}")]
    Io(#[from] std::io::Error),
}

impl From<krxsnap_core::CoreError> for DataError {
    fn from(err: krxsnap_core::CoreError) -> Self {
        match err {
            krxsnap_core::CoreError::Format(msg) => DataError::Format(msg),
        }
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::Fetch(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::Fetch(err.to_string())
    }
}

impl From<csv::Error> for DataError {
    fn from(err: csv::Error) -> Self {
        DataError::Csv(err.to_string())
    }
}

/// 데이터 작업을 위한 Result 타입.
pub type Result<T> = std::result::Result<T, DataError>;
