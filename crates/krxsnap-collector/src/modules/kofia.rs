//! KOFIA 펀드 보수비용 수집 모듈.
//!
//! 2025-03-01에 조회했을 때 지난달 말일(2025-02-28)로는 결과가 안
//! 나오고 2025-01-31로 조회해야 나온다. 공시가 달 단위로 밀리는 걸
//! 피하려고 월말 기준일을 과거로 거슬러 가며 여러 번 시도한다.
//! 몇 달까지 거슬러 갈지는 운영 경험값이라 설정으로 조절한다.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use krxsnap_core::CalendarDate;
use krxsnap_data::provider::KofiaClient;
use krxsnap_data::storage::{csv, DataLayout};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::stats::CollectionStats;

/// kofia 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct KofiaOptions {
    pub data_dir: PathBuf,
    /// 설정값 대신 쓸 조회 한도 (개월)
    pub lookback_months: Option<u32>,
}

/// 보수비용 수집 실행.
pub async fn run(config: &CollectorConfig, options: &KofiaOptions) -> Result<CollectionStats> {
    let begun = Instant::now();
    let layout = DataLayout::new(&options.data_dir);
    fs::create_dir_all(layout.root())?;

    let client = KofiaClient::new();
    let lookback = options.lookback_months.unwrap_or(config.kofia.lookback_months);

    let mut stats = CollectionStats::new();
    let mut cursor = CalendarDate::today_kst();

    for _ in 0..lookback {
        // 직전 달의 말일로 이동
        let month_end = cursor.first_of_month().add_days(-1);
        cursor = month_end;

        stats.total += 1;
        let rows = client
            .fetch_fund_fees(month_end, &config.kofia.fund_type)
            .await?;
        tracing::info!(date = %month_end, count = rows.len(), "보수비용 조회");

        if rows.is_empty() {
            stats.empty += 1;
            continue;
        }

        let mut records = rows;
        for row in &mut records {
            row.remove("운용회사");
        }

        // 늦게 올라온 공시 반영은 부분 수정이 아니라 통째로 다시 쓴다
        let text = csv::encode(&records)?;
        csv::write_artifact(&layout.fund_fees(), &text)?;

        stats.saved += 1;
        stats.total_rows += records.len();
        stats.elapsed = begun.elapsed();
        return Ok(stats);
    }

    tracing::warn!(lookback = lookback, "조회되는 월말 기준일을 찾지 못함");
    stats.elapsed = begun.elapsed();
    Ok(stats)
}
