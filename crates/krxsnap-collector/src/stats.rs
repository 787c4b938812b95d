//! 수집 통계 구조체.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::scan::DayOutcome;

/// 수집 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CollectionStats {
    /// 검토한 날짜/항목 수
    pub total: usize,
    /// 저장 횟수
    pub saved: usize,
    /// 건너뛴 횟수 (주말 또는 이미 존재)
    pub skipped: usize,
    /// 빈 데이터 (조회 성공, 결과 없음)
    pub empty: usize,
    /// 휴장일 (결과는 있지만 수치가 전부 센티널)
    pub holiday: usize,
    /// 저장된 총 행 수
    pub total_rows: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl CollectionStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 하루치 스캔 결과 반영
    pub fn record(&mut self, outcome: &DayOutcome) {
        self.total += 1;
        match outcome {
            DayOutcome::Weekend | DayOutcome::Exists => self.skipped += 1,
            DayOutcome::Empty => self.empty += 1,
            DayOutcome::Holiday { .. } => self.holiday += 1,
            DayOutcome::Saved { count } => {
                self.saved += 1;
                self.total_rows += count;
            }
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            saved = self.saved,
            skipped = self.skipped,
            empty = self.empty,
            holiday = self.holiday,
            total_rows = self.total_rows,
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "수집 완료"
        );
    }
}
