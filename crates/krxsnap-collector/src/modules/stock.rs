//! 주식 전종목 수집 모듈.
//!
//! 기본정보 요약 한 장과 최신 전종목 시세 한 장을 만든다. 시세는 최신
//! 스냅샷 하나만 필요해서 종료일부터 거꾸로 훑다가 첫 거래일에서
//! 멈춘다. 매 실행마다 전체 히스토리를 걷는 건 낭비라서다.

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;

use krxsnap_core::CalendarDate;
use krxsnap_data::normalize::normalize;
use krxsnap_data::provider::KrxClient;
use krxsnap_data::schema::{STOCK_INFO, STOCK_QUOTES};
use krxsnap_data::storage::{csv, DataLayout};
use krxsnap_data::NormalizedRow;

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::scan::{scan_dates, DailyJob, ScanMode, ScanOptions};
use crate::stats::CollectionStats;

/// 시장 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Market {
    Kospi,
    Kosdaq,
}

impl Market {
    /// 요청 파라미터 `mktId` 값.
    pub fn mkt_id(self) -> &'static str {
        match self {
            Market::Kospi => "STK",
            Market::Kosdaq => "KSQ",
        }
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "kospi" => Ok(Market::Kospi),
            "kosdaq" => Ok(Market::Kosdaq),
            other => Err(format!("알 수 없는 시장: {}", other)),
        }
    }
}

/// stock 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct StockOptions {
    pub data_dir: PathBuf,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub market: Market,
    pub overwrite: bool,
}

/// 주식 수집 실행.
pub async fn run(config: &CollectorConfig, options: &StockOptions) -> Result<CollectionStats> {
    let layout = DataLayout::new(&options.data_dir);
    fs::create_dir_all(layout.root())?;

    let client = KrxClient::with_config(config.fetch.krx_client_config());

    fetch_summary(&client, &layout, options.market, config).await?;

    let job = QuotesJob {
        client,
        layout,
        market: options.market,
        settle: config.fetch.settle_delay(),
    };
    let scan = ScanOptions {
        mode: ScanMode::ScanUntilFirstHit,
        overwrite: options.overwrite,
    };
    scan_dates(&job, options.start_date, options.end_date, scan, "stock").await
}

/// 표준코드 때문에 전체 목록을 한 번 읽어야 한다.
async fn fetch_summary(
    client: &KrxClient,
    layout: &DataLayout,
    market: Market,
    config: &CollectorConfig,
) -> Result<()> {
    let raws = client
        .fetch_rows(&STOCK_INFO, &[("mktId", market.mkt_id().to_string())])
        .await?;
    tokio::time::sleep(config.fetch.settle_delay()).await;

    let mut rows = raws
        .iter()
        .map(|raw| normalize(STOCK_INFO.fields, raw))
        .collect::<krxsnap_data::Result<Vec<_>>>()?;
    tracing::info!(count = rows.len(), "주식 전종목 기본정보");

    // 생각보다 상장주식수가 자주 바뀐다. 매일 3~4개 종목에서 변경되는데
    // 일자별 데이터에 들어있으니 요약에서 버려도 유도할 수 있다.
    for row in &mut rows {
        row.remove("상장주식수");
    }

    let text = csv::encode(&rows)?;
    csv::write_artifact(&layout.summary_info(), &text)?;
    Ok(())
}

struct QuotesJob {
    client: KrxClient,
    layout: DataLayout,
    market: Market,
    settle: Duration,
}

#[async_trait]
impl DailyJob for QuotesJob {
    fn artifact_path(&self, _date: CalendarDate) -> PathBuf {
        // 최신 스냅샷 하나만 유지한다. 날짜와 무관하게 같은 파일
        self.layout.latest_quotes()
    }

    async fn fetch(&self, date: CalendarDate) -> Result<Vec<NormalizedRow>> {
        let raws = self
            .client
            .fetch_rows(
                &STOCK_QUOTES,
                &[
                    ("mktId", self.market.mkt_id().to_string()),
                    ("trdDd", date.marshal("")),
                ],
            )
            .await?;
        let rows = raws
            .iter()
            .map(|raw| normalize(STOCK_QUOTES.fields, raw))
            .collect::<krxsnap_data::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn settle_delay(&self) -> Duration {
        self.settle
    }

    fn save(&self, _date: CalendarDate, mut rows: Vec<NormalizedRow>) -> Result<()> {
        for row in &mut rows {
            row.remove("표준코드");
        }
        let text = csv::encode(&rows)?;
        csv::write_artifact(&self.layout.latest_quotes(), &text)?;
        Ok(())
    }
}
