//! ETF 상품별 전체 히스토리 백필 모듈.
//!
//! 상품마다 상장일부터 종료일까지를 윈도 분할 범위 조회로 한 번에
//! 받아서 상품별 아티팩트를 만든다. 이미 받아둔 상품은 건너뛰므로
//! 중단돼도 다시 돌리면 이어진다.

use std::path::PathBuf;
use std::time::Instant;

use krxsnap_core::CalendarDate;
use krxsnap_data::normalize::normalize;
use krxsnap_data::provider::KrxClient;
use krxsnap_data::schema::{ETF_HISTORY, ETF_INFO};
use krxsnap_data::storage::layout::DIR_PRODUCT_HISTORY;
use krxsnap_data::storage::{csv, DataLayout};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::modules::{date_field, text_field};
use crate::stats::CollectionStats;

/// etf-history 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct EtfHistoryOptions {
    pub data_dir: PathBuf,
    pub end_date: CalendarDate,
}

/// ETF 상품별 히스토리 백필 실행.
pub async fn run(config: &CollectorConfig, options: &EtfHistoryOptions) -> Result<CollectionStats> {
    let begun = Instant::now();
    let layout = DataLayout::new(&options.data_dir);
    layout.prepare_subdir(DIR_PRODUCT_HISTORY)?;

    let client = KrxClient::with_config(config.fetch.krx_client_config());

    let raws = client.fetch_rows(&ETF_INFO, &[]).await?;
    tokio::time::sleep(config.fetch.settle_delay()).await;

    let catalog = raws
        .iter()
        .map(|raw| normalize(ETF_INFO.fields, raw))
        .collect::<krxsnap_data::Result<Vec<_>>>()?;
    tracing::info!(count = catalog.len(), "ETF 전종목 기본정보");

    let mut stats = CollectionStats::new();
    let total = catalog.len();

    for (idx, row) in catalog.iter().enumerate() {
        stats.total += 1;
        let progress = format!("{}/{}", idx + 1, total);

        let ticker = text_field(row, "단축코드")?;
        let name = text_field(row, "한글종목약명")?;
        let isin = text_field(row, "표준코드")?;

        let path = layout.product_history(ticker, name);
        if path.exists() {
            stats.skipped += 1;
            tracing::info!(progress = %progress, name = name, ticker = ticker, "스킵");
            continue;
        }

        let listed = date_field(row, "상장일")?;
        let history_raws = client
            .fetch_range(
                &ETF_HISTORY,
                &[("isuCd", isin.to_string())],
                listed,
                options.end_date,
            )
            .await?;
        tokio::time::sleep(config.fetch.settle_delay()).await;

        let history = history_raws
            .iter()
            .map(|raw| normalize(ETF_HISTORY.fields, raw))
            .collect::<krxsnap_data::Result<Vec<_>>>()?;

        let text = csv::encode(&history)?;
        csv::write_artifact(&path, &text)?;

        stats.saved += 1;
        stats.total_rows += history.len();
        tracing::info!(
            progress = %progress,
            name = name,
            ticker = ticker,
            count = history.len(),
            "저장"
        );
    }

    stats.elapsed = begun.elapsed();
    Ok(stats)
}
