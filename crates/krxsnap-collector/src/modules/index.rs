//! 주가지수 수집 모듈.
//!
//! 계열(KRX/KOSPI/KOSDAQ/테마)별 전체지수 기본정보를 합쳐서 요약 한
//! 장을 만들고, 지수마다 전체 히스토리를 범위 조회로 받는다.
//!
//! 계열별 기본정보 조회는 개수가 정해진 싸고 독립적인 요청이라 유일하게
//! 동시에 내보낸다. 히스토리 조회는 다른 수집과 같이 순차 + 대기.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use futures::future::join_all;

use krxsnap_core::CalendarDate;
use krxsnap_data::normalize::normalize;
use krxsnap_data::provider::KrxClient;
use krxsnap_data::schema::{IndexFamily, INDEX_HISTORY, INDEX_INFO};
use krxsnap_data::storage::layout::DIR_INDEX_HISTORY;
use krxsnap_data::storage::{csv, DataLayout};
use krxsnap_data::{NormalizedRow, RawRow, Value};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::modules::text_field;
use crate::stats::CollectionStats;

/// index 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct IndexOptions {
    pub data_dir: PathBuf,
    pub end_date: CalendarDate,
}

// "코스피 200"은 1975년 데이터도 있지만 전체지수 기본정보로는 시작일을
// 정확히 알 수 없다. ETF의 시작점(2002-10-14)과 맞춘다.
const HISTORY_START: &str = "2002-10-14";

/// 주가지수 수집 실행.
pub async fn run(config: &CollectorConfig, options: &IndexOptions) -> Result<CollectionStats> {
    let begun = Instant::now();
    let layout = DataLayout::new(&options.data_dir);
    fs::create_dir_all(layout.root())?;
    layout.prepare_subdir(DIR_INDEX_HISTORY)?;

    let client = KrxClient::with_config(config.fetch.krx_client_config());

    let summary = fetch_summary(&client, config).await?;
    let text = csv::encode(&summary)?;
    csv::write_artifact(&layout.index_summary(), &text)?;

    let mut stats = CollectionStats::new();
    let total = summary.len();
    let start = CalendarDate::parse(HISTORY_START)?;

    for (idx, row) in summary.iter().enumerate() {
        stats.total += 1;
        let progress = format!("{}/{}", idx + 1, total);

        let ind_idx = text_field(row, "indIdx")?;
        let ind_idx2 = text_field(row, "indIdx2")?;
        let name = text_field(row, "지수명")?;

        let path = layout.index_history(ind_idx, ind_idx2, name);
        if path.exists() {
            stats.skipped += 1;
            tracing::info!(progress = %progress, name = name, id = format!("{}/{}", ind_idx, ind_idx2), "스킵");
            continue;
        }

        let history_raws = client
            .fetch_range(
                &INDEX_HISTORY,
                &[
                    ("indIdx", ind_idx.to_string()),
                    ("indIdx2", ind_idx2.to_string()),
                ],
                start,
                options.end_date,
            )
            .await?;
        tokio::time::sleep(config.fetch.settle_delay()).await;

        let history = history_raws
            .iter()
            .map(|raw| normalize(INDEX_HISTORY.fields, raw))
            .collect::<krxsnap_data::Result<Vec<_>>>()?;

        let text = csv::encode(&history)?;
        csv::write_artifact(&path, &text)?;

        stats.saved += 1;
        stats.total_rows += history.len();
        tracing::info!(
            progress = %progress,
            name = name,
            id = format!("{}/{}", ind_idx, ind_idx2),
            count = history.len(),
            "저장"
        );
    }

    stats.elapsed = begun.elapsed();
    Ok(stats)
}

/// 네 계열의 기본정보를 동시에 받아서 계열구분 열을 붙여 합친다.
async fn fetch_summary(
    client: &KrxClient,
    config: &CollectorConfig,
) -> Result<Vec<NormalizedRow>> {
    let tasks = IndexFamily::ALL.into_iter().map(|family| {
        let client = client.clone();
        let settle = config.fetch.settle_delay();
        async move {
            let raws = client
                .fetch_rows(
                    &INDEX_INFO,
                    &[("idxIndMidclssCd", family.mid_class_code().to_string())],
                )
                .await?;
            tokio::time::sleep(settle).await;
            tracing::info!(family = family.label(), count = raws.len(), "전체지수 기본정보");
            Ok::<(IndexFamily, Vec<RawRow>), crate::error::CollectorError>((family, raws))
        }
    });

    let mut rows = Vec::new();
    for result in join_all(tasks).await {
        let (family, raws) = result?;
        for raw in &raws {
            let mut row = normalize(INDEX_INFO.fields, raw)?;
            row.push("계열구분", Value::Text(family.label().to_string()));
            rows.push(row);
        }
    }
    Ok(rows)
}
