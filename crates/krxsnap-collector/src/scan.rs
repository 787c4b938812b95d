//! 날짜 범위 스캔 오케스트레이터.
//!
//! 하루 단위 수집은 카테고리가 달라도 상태기계가 같다:
//! 주말이면 요청 없이 스킵, 아티팩트가 이미 있으면 스킵(덮어쓰기
//! 플래그가 없는 한), 조회 결과가 비면 미래/미공개 날짜, 행은 있는데
//! 선두 수치가 센티널이면 휴장일, 그 외에는 저장. 진행 방향과
//! 단락(첫 저장에서 멈춤) 여부만 정책으로 갈라진다.
//!
//! 아티팩트 존재 여부가 유일한 체크포인트다. 같은 범위를 다시 돌리면
//! 이미 저장된 날짜는 요청 없이 지나간다.

use std::path::PathBuf;
use std::time::Instant;

use async_trait::async_trait;

use krxsnap_core::CalendarDate;
use krxsnap_data::NormalizedRow;

use crate::error::Result;
use crate::stats::CollectionStats;

/// 스캔 진행 정책.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// 시작일부터 종료일까지 전부 (날짜별 아티팩트용)
    ScanAll,
    /// 종료일부터 거꾸로, 첫 저장에서 중단 (최신 스냅샷 하나만 필요할 때)
    ScanUntilFirstHit,
}

/// 하루치 스캔의 종착 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    /// 주말. 요청하지 않음
    Weekend,
    /// 아티팩트가 이미 있음. 요청하지 않음
    Exists,
    /// 조회 결과 없음. 아마도 미래 날짜
    Empty,
    /// 행은 있지만 수치가 전부 센티널. 휴장일
    Holiday { count: usize },
    /// 저장 완료
    Saved { count: usize },
}

/// 스캔 옵션.
#[derive(Debug, Clone, Copy)]
pub struct ScanOptions {
    pub mode: ScanMode,
    /// 이미 있는 아티팩트도 다시 받아서 통째로 덮어쓴다
    pub overwrite: bool,
}

/// 카테고리별 하루치 수집 작업.
#[async_trait]
pub trait DailyJob: Sync {
    /// 존재 검사 대상이 되는 대표 아티팩트 경로.
    fn artifact_path(&self, date: CalendarDate) -> PathBuf;

    /// 휴장일 판정에 쓰는 선두 수치 열.
    ///
    /// 휴장일에는 행 자체는 내려오지만 이 열이 센티널 "-"라서 NaN이 된다.
    fn leading_field(&self) -> &'static str {
        "시가"
    }

    /// 하루치 정규화 행 조회.
    async fn fetch(&self, date: CalendarDate) -> Result<Vec<NormalizedRow>>;

    /// 조회 뒤의 고정 정착 대기.
    fn settle_delay(&self) -> std::time::Duration;

    /// 행 가공(열 버리기, 분리)과 아티팩트 쓰기.
    fn save(&self, date: CalendarDate, rows: Vec<NormalizedRow>) -> Result<()>;
}

/// 날짜 범위를 스캔한다. `start..=end` 전 날짜가 대상이다.
pub async fn scan_dates<J: DailyJob>(
    job: &J,
    start: CalendarDate,
    end: CalendarDate,
    options: ScanOptions,
    label: &str,
) -> Result<CollectionStats> {
    let begun = Instant::now();
    let mut stats = CollectionStats::new();
    let total = start.diff_days(end);

    let (mut cursor, direction) = match options.mode {
        ScanMode::ScanAll => (start, 1),
        ScanMode::ScanUntilFirstHit => (end, -1),
    };

    let mut step: i64 = 1;
    while cursor >= start && cursor <= end {
        let outcome = run_date(job, cursor, options).await?;
        stats.record(&outcome);
        log_outcome(label, step, total, cursor, &outcome);

        if options.mode == ScanMode::ScanUntilFirstHit
            && matches!(outcome, DayOutcome::Saved { .. })
        {
            break;
        }

        cursor = cursor.add_days(direction);
        step += 1;
    }

    stats.elapsed = begun.elapsed();
    Ok(stats)
}

async fn run_date<J: DailyJob>(
    job: &J,
    date: CalendarDate,
    options: ScanOptions,
) -> Result<DayOutcome> {
    // 주말은 장이 안 열리니까 무시. 공휴일을 알아낼 방법이 마땅히
    // 없어서 공휴일은 그냥 요청한다.
    if date.is_weekend() {
        return Ok(DayOutcome::Weekend);
    }

    if !options.overwrite && job.artifact_path(date).exists() {
        // 있으면 스킵. 데이터 갱신이 필요하면 overwrite로 다시 받는다
        return Ok(DayOutcome::Exists);
    }

    let rows = job.fetch(date).await?;
    tokio::time::sleep(job.settle_delay()).await;

    // 미래 날짜 대응
    if rows.is_empty() {
        return Ok(DayOutcome::Empty);
    }

    // 휴장일은 행은 있지만 수치가 전부 "-"
    let leading = rows[0].get(job.leading_field()).and_then(|v| v.as_number());
    if leading.is_some_and(f64::is_nan) {
        return Ok(DayOutcome::Holiday { count: rows.len() });
    }

    let count = rows.len();
    job.save(date, rows)?;
    Ok(DayOutcome::Saved { count })
}

fn log_outcome(label: &str, step: i64, total: i64, date: CalendarDate, outcome: &DayOutcome) {
    let progress = format!("{}/{}", step, total);
    match outcome {
        DayOutcome::Weekend => {
            tracing::info!(label = label, progress = %progress, date = %date, "주말");
        }
        DayOutcome::Exists => {
            tracing::info!(label = label, progress = %progress, date = %date, "이미 있음");
        }
        DayOutcome::Empty => {
            tracing::info!(label = label, progress = %progress, date = %date, count = 0, "데이터 없음");
        }
        DayOutcome::Holiday { count } => {
            tracing::info!(label = label, progress = %progress, date = %date, count = *count, "휴장");
        }
        DayOutcome::Saved { count } => {
            tracing::info!(label = label, progress = %progress, date = %date, count = *count, "저장");
        }
    }
}
