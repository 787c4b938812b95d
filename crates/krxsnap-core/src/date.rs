//! `YYYY-MM-DD` 달력 날짜 타입.
//!
//! KRX 통계 포털은 날짜를 `YYYYMMDD`, `YYYY.MM.DD`, `YYYY/MM/DD`,
//! `YYYY-MM-DD` 네 가지 표기로 섞어서 돌려준다. 내부에서는 전부
//! `YYYY-MM-DD` 하나로 정규화한다.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Utc, Weekday};
use chrono_tz::Asia::Seoul;

use crate::error::{CoreError, Result};

/// 달력 날짜. 정규형은 `YYYY-MM-DD`.
///
/// 산술은 달력일 기준이고 호스트 타임존과 무관하다.
/// 값 자체가 KST(UTC+9) 민간 달력의 하루를 가리킨다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDate(NaiveDate);

impl CalendarDate {
    /// 네 가지 표기 중 하나를 파싱한다.
    ///
    /// 8글자는 `YYYYMMDD`, 10글자는 `YYYY?MM?DD` (구분자는 `-`, `.`, `/`
    /// 아무거나). 그 외 길이나 존재하지 않는 날짜는 에러.
    pub fn parse(input: &str) -> Result<Self> {
        let digits: Option<(u32, u32, u32)> = match input.len() {
            8 => split_digits(input, None),
            10 => split_digits(input, Some((4, 7))),
            _ => None,
        };

        let (y, m, d) =
            digits.ok_or_else(|| CoreError::Format(input.to_string()))?;
        let date = NaiveDate::from_ymd_opt(y as i32, m, d)
            .ok_or_else(|| CoreError::Format(input.to_string()))?;
        Ok(Self(date))
    }

    /// n일 뒤 (음수면 과거) 날짜.
    pub fn add_days(self, n: i64) -> Self {
        Self(self.0 + Duration::days(n))
    }

    /// `other - self`를 달력일 수로 반환한다. 음수 가능.
    pub fn diff_days(self, other: Self) -> i64 {
        (other.0 - self.0).num_days()
    }

    /// 토요일/일요일 여부. KST 민간 달력의 요일 기준.
    pub fn is_weekend(self) -> bool {
        matches!(self.0.weekday(), Weekday::Sat | Weekday::Sun)
    }

    /// `(연, 월, 일)` 문자열 분해. 연도별 디렉토리 키로 쓴다.
    pub fn split(self) -> (String, String, String) {
        (
            format!("{:04}", self.0.year()),
            format!("{:02}", self.0.month()),
            format!("{:02}", self.0.day()),
        )
    }

    /// 주어진 구분자로 연/월/일을 이어붙인다. `marshal("")`은 `YYYYMMDD`.
    pub fn marshal(self, sep: &str) -> String {
        let (y, m, d) = self.split();
        [y, m, d].join(sep)
    }

    /// 연도 토큰 (`"2025"` 꼴).
    pub fn year_str(self) -> String {
        format!("{:04}", self.0.year())
    }

    /// 연도.
    pub fn year(self) -> i32 {
        self.0.year()
    }

    /// 이번 달 1일.
    pub fn first_of_month(self) -> Self {
        let first = NaiveDate::from_ymd_opt(self.0.year(), self.0.month(), 1);
        Self(first.unwrap_or(self.0))
    }

    /// 오늘 날짜 (KST 기준).
    pub fn today_kst() -> Self {
        Self(Utc::now().with_timezone(&Seoul).date_naive())
    }
}

/// 연/월/일 숫자 추출. `seps`가 있으면 해당 위치가 구분자여야 한다.
fn split_digits(input: &str, seps: Option<(usize, usize)>) -> Option<(u32, u32, u32)> {
    let bytes = input.as_bytes();
    let (y_rng, m_rng, d_rng) = match seps {
        Some((a, b)) => {
            let is_sep = |c: u8| matches!(c, b'-' | b'.' | b'/');
            if !is_sep(bytes[a]) || !is_sep(bytes[b]) {
                return None;
            }
            (0..4, a + 1..a + 3, b + 1..b + 3)
        }
        None => (0..4, 4..6, 6..8),
    };

    let y: u32 = input.get(y_rng)?.parse().ok()?;
    let m: u32 = input.get(m_rng)?.parse().ok()?;
    let d: u32 = input.get(d_rng)?.parse().ok()?;
    Some((y, m, d))
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

impl FromStr for CalendarDate {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_four_formats() {
        for input in ["20120304", "2012.03.04", "2012/03/04", "2012-03-04"] {
            let actual = CalendarDate::parse(input).unwrap();
            assert_eq!(actual.to_string(), "2012-03-04", "input: {input}");
        }
    }

    #[test]
    fn parse_invalid() {
        for input in ["2012-3-4", "201203", "2012-13-01", "20120230", "abcd-ef-gh"] {
            assert!(CalendarDate::parse(input).is_err(), "input: {input}");
        }
    }

    #[test]
    fn split_ok() {
        let date = CalendarDate::parse("2021-12-31").unwrap();
        let (y, m, d) = date.split();
        assert_eq!((y.as_str(), m.as_str(), d.as_str()), ("2021", "12", "31"));
    }

    #[test]
    fn marshal_separators() {
        let date = CalendarDate::parse("2021-12-31").unwrap();
        assert_eq!(date.marshal(""), "20211231");
        assert_eq!(date.marshal("."), "2021.12.31");
    }

    #[test]
    fn add_day_basic() {
        let date = CalendarDate::parse("2012-03-04").unwrap();
        assert_eq!(date.add_days(1).to_string(), "2012-03-05");
    }

    #[test]
    fn add_day_rollover() {
        // 윤년
        let date = CalendarDate::parse("2012-02-28").unwrap();
        assert_eq!(date.add_days(1).to_string(), "2012-02-29");
        assert_eq!(date.add_days(2).to_string(), "2012-03-01");

        // 연 경계
        let date = CalendarDate::parse("2011-12-31").unwrap();
        assert_eq!(date.add_days(1).to_string(), "2012-01-01");
        assert_eq!(date.add_days(1).add_days(-1), date);
    }

    #[test]
    fn add_day_roundtrip() {
        let date = CalendarDate::parse("2005-01-01").unwrap();
        for n in [-400, -1, 0, 1, 365, 730, 10000] {
            assert_eq!(date.add_days(n).add_days(-n), date, "n: {n}");
        }
    }

    #[test]
    fn diff_day_antisymmetric() {
        let a = CalendarDate::parse("2012-03-04").unwrap();
        let b = CalendarDate::parse("2012-03-05").unwrap();
        assert_eq!(a.diff_days(b), 1);
        assert_eq!(b.diff_days(a), -1);

        let far = CalendarDate::parse("2013-03-04").unwrap();
        assert_eq!(a.diff_days(far), 365); // 2012는 윤년, 2/29 이후 구간
    }

    #[test]
    fn weekend_known_week() {
        let friday = CalendarDate::parse("2025-02-07").unwrap();
        let saturday = CalendarDate::parse("2025-02-08").unwrap();
        let sunday = CalendarDate::parse("2025-02-09").unwrap();
        let monday = CalendarDate::parse("2025-02-10").unwrap();

        assert!(!friday.is_weekend());
        assert!(saturday.is_weekend());
        assert!(sunday.is_weekend());
        assert!(!monday.is_weekend());
    }

    #[test]
    fn first_of_month_ok() {
        let date = CalendarDate::parse("2025-03-01").unwrap();
        assert_eq!(date.first_of_month(), date);

        let date = CalendarDate::parse("2024-02-29").unwrap();
        assert_eq!(date.first_of_month().to_string(), "2024-02-01");
        // 전월 말일
        assert_eq!(date.first_of_month().add_days(-1).to_string(), "2024-01-31");
    }

    #[test]
    fn ordering_follows_calendar() {
        let a = CalendarDate::parse("2012-03-04").unwrap();
        let b = CalendarDate::parse("2012-03-05").unwrap();
        assert!(a < b);
        assert!(b <= b);
    }
}
