//! CSV 코덱.
//!
//! 아티팩트는 전부 UTF-8 + BOM. 스프레드시트 앱이 인코딩을 제대로
//! 잡으려면 BOM이 필요하다. 수치 NaN은 "NaN" 리터럴 대신 빈 셀로
//! 내보낸다.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::row::NormalizedRow;

const BOM: char = '\u{feff}';

/// 정규화 행 목록을 CSV 텍스트로 만든다. 헤더는 첫 행의 열 이름.
pub fn encode(rows: &[NormalizedRow]) -> Result<String> {
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(first.columns())?;
    for row in rows {
        let record: Vec<String> = row.values().map(|value| value.render()).collect();
        writer.write_record(&record)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DataError::Csv(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DataError::Csv(e.to_string()))
}

/// BOM을 붙여서 통째로 쓴다. 부분 쓰기는 없다.
pub fn write_artifact(path: &Path, text: &str) -> Result<()> {
    let mut content = String::with_capacity(text.len() + BOM.len_utf8());
    content.push(BOM);
    content.push_str(text);
    fs::write(path, content)?;
    Ok(())
}

/// 헤더를 키로 삼아 행 목록으로 읽는다. 선두 BOM과 빈 줄은 무시.
pub fn read_artifact(path: &Path) -> Result<Vec<HashMap<String, String>>> {
    let text = fs::read_to_string(path)?;
    let text = text.trim_start_matches(BOM).trim_start();

    let mut reader = csv::Reader::from_reader(text.as_bytes());
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}
