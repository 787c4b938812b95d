//! 카테고리별 수집 모듈.

pub mod etf;
pub mod etf_history;
pub mod fusion;
pub mod index;
pub mod kofia;
pub mod stock;

use krxsnap_core::CalendarDate;
use krxsnap_data::{DataError, NormalizedRow};

use crate::error::{CollectorError, Result};

/// 정규화 행에서 문자열 열을 꺼낸다. 없으면 스키마 변경으로 보고 실패.
pub(crate) fn text_field<'a>(row: &'a NormalizedRow, column: &str) -> Result<&'a str> {
    row.get(column)
        .and_then(|value| value.as_text())
        .ok_or_else(|| CollectorError::Data(DataError::MissingField(column.to_string())))
}

/// 정규화 행에서 날짜 열을 꺼낸다.
pub(crate) fn date_field(row: &NormalizedRow, column: &str) -> Result<CalendarDate> {
    row.get(column)
        .and_then(|value| value.as_date())
        .ok_or_else(|| CollectorError::Data(DataError::MissingField(column.to_string())))
}
