//! 원시 행 → 정규화 행 변환.
//!
//! 기대한 필드가 없으면 그 자리에서 실패한다. 원격 스키마가 바뀐 걸
//! 기본값으로 덮으면 눈치채지 못한 채 깨진 데이터가 쌓인다.

use krxsnap_core::CalendarDate;

use crate::error::{DataError, Result};
use crate::row::{NormalizedRow, RawRow, Value};
use crate::schema::{FieldKind, FieldSpec};

fn raw_value<'a>(row: &'a RawRow, key: &str) -> Result<&'a str> {
    row.get(key)
        .map(String::as_str)
        .ok_or_else(|| DataError::MissingField(key.to_string()))
}

/// 문자열 필드.
pub fn as_string(row: &RawRow, key: &str) -> Result<String> {
    raw_value(row, key).map(str::to_string)
}

/// 수치 필드. 천단위 구분자를 벗긴다.
///
/// 비거래일 센티널 "-"와 빈 값은 NaN. 그 외에 파싱이 안 되는 값은
/// 형식 에러다.
pub fn as_decimal(row: &RawRow, key: &str) -> Result<f64> {
    let raw = raw_value(row, key)?;
    parse_decimal(raw).ok_or_else(|| DataError::Format(format!("{}={}", key, raw)))
}

fn parse_decimal(raw: &str) -> Option<f64> {
    if raw == "-" || raw.is_empty() {
        return Some(f64::NAN);
    }
    raw.replace(',', "").parse().ok()
}

/// 날짜 필드.
pub fn as_date(row: &RawRow, key: &str) -> Result<CalendarDate> {
    let raw = raw_value(row, key)?;
    Ok(CalendarDate::parse(raw)?)
}

/// 등락구분 코드 필드를 부호로 변환한다.
///
/// - "1" 상승, "4" 상한 → +1
/// - "2" 하락, "5" 하한 → -1
/// - "0", "3", "" 보합 → 0
///
/// 모르는 코드는 에러. 부호를 잘못 추측하면 대비 값 전체가 오염된다.
pub fn as_sign(row: &RawRow, key: &str) -> Result<f64> {
    let raw = raw_value(row, key)?;
    match raw {
        "1" | "4" => Ok(1.0),
        "2" | "5" => Ok(-1.0),
        "0" | "3" | "" => Ok(0.0),
        other => Err(DataError::UnknownSign(format!("{}={}", key, other))),
    }
}

/// 필드 선언 목록을 순서대로 적용해서 정규화 행을 만든다.
pub fn normalize(fields: &[FieldSpec], raw: &RawRow) -> Result<NormalizedRow> {
    let mut row = NormalizedRow::new();
    for spec in fields {
        let value = match spec.kind {
            FieldKind::Text => Value::Text(as_string(raw, spec.key)?),
            FieldKind::Number => Value::Number(as_decimal(raw, spec.key)?),
            FieldKind::Date => Value::Date(as_date(raw, spec.key)?),
            FieldKind::SignedNumber { sign_key } => {
                let magnitude = as_decimal(raw, spec.key)?.abs();
                Value::Number(magnitude * as_sign(raw, sign_key)?)
            }
        };
        row.push(spec.column, value);
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn raw(entries: &[(&str, &str)]) -> RawRow {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn decimal_strips_thousands_separators() {
        let row = raw(&[("ACC_TRDVOL", "1,234")]);
        assert_eq!(as_decimal(&row, "ACC_TRDVOL").unwrap(), 1234.0);

        let row = raw(&[("MKTCAP", "12,345,678,900")]);
        assert_eq!(as_decimal(&row, "MKTCAP").unwrap(), 12_345_678_900.0);
    }

    #[test]
    fn decimal_sentinel_is_nan() {
        let row = raw(&[("TDD_OPNPRC", "-")]);
        assert!(as_decimal(&row, "TDD_OPNPRC").unwrap().is_nan());
    }

    #[test]
    fn decimal_garbage_is_error() {
        let row = raw(&[("TDD_OPNPRC", "12x4")]);
        assert!(matches!(
            as_decimal(&row, "TDD_OPNPRC"),
            Err(DataError::Format(_))
        ));
    }

    #[test]
    fn missing_field_is_error() {
        let row = raw(&[("ISU_CD", "KR7005930003")]);
        assert!(matches!(
            as_decimal(&row, "TDD_CLSPRC"),
            Err(DataError::MissingField(_))
        ));
        assert!(matches!(
            as_string(&row, "ISU_ABBRV"),
            Err(DataError::MissingField(_))
        ));
    }

    #[test]
    fn sign_code_table() {
        for (code, expected) in [
            ("1", 1.0),
            ("2", -1.0),
            ("3", 0.0),
            ("4", 1.0),
            ("5", -1.0),
            ("0", 0.0),
            ("", 0.0),
        ] {
            let row = raw(&[("FLUC_TP_CD", code)]);
            assert_eq!(as_sign(&row, "FLUC_TP_CD").unwrap(), expected, "code: {code:?}");
        }
    }

    #[test]
    fn sign_unknown_code_is_error() {
        let row = raw(&[("FLUC_TP_CD", "9")]);
        assert!(matches!(
            as_sign(&row, "FLUC_TP_CD"),
            Err(DataError::UnknownSign(_))
        ));
    }

    #[test]
    fn normalize_reconstructs_signed_change() {
        // 대비는 절대값으로 내려오고 부호는 등락구분 코드에 있다
        let entries = vec![
            ("TRD_DD", "2025/01/31"),
            ("TDD_CLSPRC", "114,950"),
            ("CMPPREVDD_PRC", "5"),
            ("FLUC_TP_CD", "2"),
            ("FLUC_RT", "0.00"),
            ("LST_NAV", "114,955.31"),
            ("TDD_OPNPRC", "114,900"),
            ("TDD_HGPRC", "114,990"),
            ("TDD_LWPRC", "114,880"),
            ("ACC_TRDVOL", "1,000"),
            ("ACC_TRDVAL", "114,950,000"),
            ("MKTCAP", "34,485,000,000"),
            ("INVSTASST_NETASST_TOTAMT", "34,486,593,000"),
            ("LIST_SHRS", "300,000"),
            ("IDX_IND_NM", "KIS 물가연동국고채 지수"),
            ("OBJ_STKPRC_IDX", "148.11"),
            ("CMPPREVDD_IDX", "0.02"),
            ("FLUC_TP_CD1", "1"),
            ("IDX_FLUC_RT", "0.01"),
        ];
        let row = raw(&entries);

        let normalized = normalize(schema::ETF_HISTORY.fields, &row).unwrap();
        assert_eq!(normalized.get("대비").unwrap().as_number().unwrap(), -5.0);
        assert_eq!(
            normalized.get("기초지수_대비").unwrap().as_number().unwrap(),
            0.02
        );
        assert_eq!(
            normalized.get("일자").unwrap(),
            &Value::Date(CalendarDate::parse("2025-01-31").unwrap())
        );
    }

    #[test]
    fn normalize_keeps_schema_column_order() {
        let row = raw(&[
            ("IDX_NM", "코스피 200"),
            ("IDX_ENG_NM", "KOSPI 200"),
            ("BAS_TM_CONTN", "1990.01.03"),
            ("ANNC_TM_CONTN", "1994.06.15"),
            ("BAS_IDX_CONTN", "100.00"),
            ("CALC_CYCLE_CONTN", "1초"),
            ("CALC_TM_CONTN", "09:00~15:30"),
            ("COMPST_ISU_CNT", "200"),
            ("IND_TP_CD", "1"),
            ("IDX_IND_CD", "028"),
        ]);

        let normalized = normalize(schema::INDEX_INFO.fields, &row).unwrap();
        let columns: Vec<_> = normalized.columns().collect();
        let expected: Vec<_> = schema::INDEX_INFO.fields.iter().map(|f| f.column).collect();
        assert_eq!(columns, expected);
    }
}
