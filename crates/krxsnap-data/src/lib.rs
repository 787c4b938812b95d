//! # KrxSnap Data
//!
//! 원격 데이터 조회와 저장을 담당합니다:
//! - KRX 통계 포털 클라이언트 (단일 일자 / 날짜 범위 조회)
//! - KOFIA 펀드 보수비용 공시 클라이언트 (XML)
//! - 원시 행 → 정규화 행 변환
//! - CSV 아티팩트 코덱과 디렉토리 배치

pub mod error;
pub mod normalize;
pub mod provider;
pub mod row;
pub mod schema;
pub mod storage;

pub use error::{DataError, Result};
pub use row::{NormalizedRow, RawRow, Value};
