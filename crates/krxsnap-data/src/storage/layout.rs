//! 아티팩트 디렉토리 배치.
//!
//! 연도 구분 없이 폴더 하나에 다 넣으면 파일 수가 수천 개가 되어버려서
//! 일별 파일은 연도 디렉토리로 나눈다. 연도 디렉토리는 수집 시작 전에
//! 전부 만들어 둔다. 루프 안에서 존재 검증을 안 하려고.

use std::fs;
use std::path::{Path, PathBuf};

use krxsnap_core::CalendarDate;

use crate::error::Result;

/// 일별 전종목 시세가 쌓이는 디렉토리.
pub const DIR_DAILY_QUOTES: &str = "전종목";
/// ETF에서 뜯어낸 기초지수 일별 데이터 디렉토리.
pub const DIR_DAILY_INDEX: &str = "전체지수";
/// 상품별 전체 히스토리 디렉토리.
pub const DIR_PRODUCT_HISTORY: &str = "개별종목";
/// 지수별 전체 히스토리 디렉토리.
pub const DIR_INDEX_HISTORY: &str = "개별지수";

/// 데이터 디렉토리 하나에 대한 경로 계산기.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 전종목 기본정보 요약.
    pub fn summary_info(&self) -> PathBuf {
        self.root.join("전종목_기본정보.csv")
    }

    /// 최신 스냅샷 하나만 유지하는 전종목 시세.
    pub fn latest_quotes(&self) -> PathBuf {
        self.root.join("전종목_시세.csv")
    }

    /// (연도, 날짜)로 버킷된 일별 전종목 시세.
    pub fn daily_quotes(&self, date: CalendarDate) -> PathBuf {
        self.dated(DIR_DAILY_QUOTES, date)
    }

    /// (연도, 날짜)로 버킷된 일별 지수 데이터.
    pub fn daily_index(&self, date: CalendarDate) -> PathBuf {
        self.dated(DIR_DAILY_INDEX, date)
    }

    /// 상품 하나의 전체 히스토리.
    pub fn product_history(&self, ticker: &str, name: &str) -> PathBuf {
        self.root
            .join(DIR_PRODUCT_HISTORY)
            .join(format!("{}_{}.csv", ticker, name))
    }

    /// 전체지수 기본정보 요약.
    pub fn index_summary(&self) -> PathBuf {
        self.root.join("전체지수_기본정보.csv")
    }

    /// 지수 하나의 전체 히스토리.
    ///
    /// "코스피 200 에너지/화학" 같은 이름 때문에 '/'는 제거한다.
    pub fn index_history(&self, ind_idx: &str, ind_idx2: &str, name: &str) -> PathBuf {
        let name = name.replace('/', "");
        self.root
            .join(DIR_INDEX_HISTORY)
            .join(format!("{}_{}_{}.csv", ind_idx, ind_idx2, name))
    }

    /// 펀드 보수비용.
    pub fn fund_fees(&self) -> PathBuf {
        self.root.join("전종목_보수비용.csv")
    }

    /// 기본정보 + 보수비용을 합친 결과물.
    pub fn fused(&self) -> PathBuf {
        self.root.join("전종목_종합.csv")
    }

    fn dated(&self, subdir: &str, date: CalendarDate) -> PathBuf {
        self.root
            .join(subdir)
            .join(date.year_str())
            .join(format!("{}.csv", date))
    }

    /// 연도별 디렉토리를 미리 만든다.
    pub fn prepare_year_dirs(&self, subdirs: &[&str], from_year: i32, to_year: i32) -> Result<()> {
        for subdir in subdirs {
            for year in from_year..=to_year {
                fs::create_dir_all(self.root.join(subdir).join(year.to_string()))?;
            }
        }
        Ok(())
    }

    /// 단일 하위 디렉토리를 만든다.
    pub fn prepare_subdir(&self, subdir: &str) -> Result<PathBuf> {
        let dir = self.root.join(subdir);
        fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dated_paths_bucket_by_year() {
        let layout = DataLayout::new("/data/etf");
        let date = CalendarDate::parse("2025-02-07").unwrap();
        assert_eq!(
            layout.daily_quotes(date),
            PathBuf::from("/data/etf/전종목/2025/2025-02-07.csv")
        );
        assert_eq!(
            layout.daily_index(date),
            PathBuf::from("/data/etf/전체지수/2025/2025-02-07.csv")
        );
    }

    #[test]
    fn index_history_strips_slash() {
        let layout = DataLayout::new("/data/index");
        assert_eq!(
            layout.index_history("1", "028", "코스피 200 에너지/화학"),
            PathBuf::from("/data/index/개별지수/1_028_코스피 200 에너지화학.csv")
        );
    }

    #[test]
    fn prepare_year_dirs_creates_buckets() {
        let dir = tempfile::tempdir().unwrap();
        let layout = DataLayout::new(dir.path());
        layout
            .prepare_year_dirs(&[DIR_DAILY_QUOTES, DIR_DAILY_INDEX], 2002, 2004)
            .unwrap();

        assert!(dir.path().join("전종목/2002").is_dir());
        assert!(dir.path().join("전종목/2004").is_dir());
        assert!(dir.path().join("전체지수/2003").is_dir());
    }
}
