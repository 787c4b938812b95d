//! ETF 전종목 수집 모듈.
//!
//! 기본정보 요약 한 장 + 날짜별 시세 아티팩트. 시세 행에는 기초지수가
//! 끼워져 내려오는데, 기초지수를 따로 크롤링할 마땅한 곳을 못 찾아서
//! 개별 데이터에서 뜯어내 별도 아티팩트로 쌓는다.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use krxsnap_core::CalendarDate;
use krxsnap_data::normalize::normalize;
use krxsnap_data::provider::KrxClient;
use krxsnap_data::schema::{ETF_INFO, ETF_QUOTES};
use krxsnap_data::storage::layout::{DIR_DAILY_INDEX, DIR_DAILY_QUOTES};
use krxsnap_data::storage::{csv, DataLayout};
use krxsnap_data::{NormalizedRow, Value};

use crate::config::CollectorConfig;
use crate::error::Result;
use crate::scan::{scan_dates, DailyJob, ScanMode, ScanOptions};
use crate::stats::CollectionStats;

/// etf 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct EtfOptions {
    pub data_dir: PathBuf,
    pub start_date: CalendarDate,
    pub end_date: CalendarDate,
    pub overwrite: bool,
}

/// ETF 수집 실행.
pub async fn run(config: &CollectorConfig, options: &EtfOptions) -> Result<CollectionStats> {
    let layout = DataLayout::new(&options.data_dir);

    // 연도별 디렉토리 미리 만들기. 루프 안에서 검증 안 하려고
    let today = CalendarDate::today_kst();
    layout.prepare_year_dirs(
        &[DIR_DAILY_QUOTES, DIR_DAILY_INDEX],
        config.layout.first_year,
        today.year(),
    )?;

    let client = KrxClient::with_config(config.fetch.krx_client_config());

    fetch_summary(&client, &layout, config).await?;

    let job = QuotesJob {
        client,
        layout,
        settle: config.fetch.settle_delay(),
    };
    let scan = ScanOptions {
        mode: ScanMode::ScanAll,
        overwrite: options.overwrite,
    };
    scan_dates(&job, options.start_date, options.end_date, scan, "ETF").await
}

async fn fetch_summary(
    client: &KrxClient,
    layout: &DataLayout,
    config: &CollectorConfig,
) -> Result<()> {
    let raws = client.fetch_rows(&ETF_INFO, &[]).await?;
    tokio::time::sleep(config.fetch.settle_delay()).await;

    let mut rows = raws
        .iter()
        .map(|raw| normalize(ETF_INFO.fields, raw))
        .collect::<krxsnap_data::Result<Vec<_>>>()?;
    tracing::info!(count = rows.len(), "ETF 전종목 기본정보");

    // 자주 바뀌는 필드 버리기. 요약 정보에는 없어도 될 것 같아서
    for row in &mut rows {
        row.remove("상장좌수");
    }

    let text = csv::encode(&rows)?;
    csv::write_artifact(&layout.summary_info(), &text)?;
    Ok(())
}

struct QuotesJob {
    client: KrxClient,
    layout: DataLayout,
    settle: Duration,
}

#[async_trait]
impl DailyJob for QuotesJob {
    fn artifact_path(&self, date: CalendarDate) -> PathBuf {
        // 존재 검사는 ETF 쪽 파일 기준. 둘은 항상 같이 쓰인다
        self.layout.daily_quotes(date)
    }

    async fn fetch(&self, date: CalendarDate) -> Result<Vec<NormalizedRow>> {
        let raws = self
            .client
            .fetch_rows(&ETF_QUOTES, &[("trdDd", date.marshal(""))])
            .await?;
        let rows = raws
            .iter()
            .map(|raw| normalize(ETF_QUOTES.fields, raw))
            .collect::<krxsnap_data::Result<Vec<_>>>()?;
        Ok(rows)
    }

    fn settle_delay(&self) -> Duration {
        self.settle
    }

    fn save(&self, date: CalendarDate, rows: Vec<NormalizedRow>) -> Result<()> {
        let (etf_rows, index_rows) = split_rows(rows);

        let text = csv::encode(&etf_rows)?;
        csv::write_artifact(&self.layout.daily_quotes(date), &text)?;

        let text = csv::encode(&index_rows)?;
        csv::write_artifact(&self.layout.daily_index(date), &text)?;
        Ok(())
    }
}

/// 시세 행을 ETF 레코드와 기초지수 레코드로 나눈다.
///
/// 코스피200을 기초지수로 쓰는 ETF는 여러 개라서 기초지수는 지수명
/// 기준으로 중복을 걸러낸다.
fn split_rows(rows: Vec<NormalizedRow>) -> (Vec<NormalizedRow>, Vec<NormalizedRow>) {
    let mut etf_rows = Vec::with_capacity(rows.len());
    let mut index_rows = Vec::new();
    let mut seen = HashSet::new();

    for mut row in rows {
        let index_name = row.remove("기초지수_지수명");
        let index_close = row.remove("기초지수_종가");
        let index_change = row.remove("기초지수_대비");
        let index_rate = row.remove("기초지수_등락률");

        row.remove("종목코드");
        // 순자산총액은 하루 밀려서 올라온다. 당일 값은 0이라 버린다
        row.remove("순자산총액");

        if let Some(Value::Text(name)) = index_name {
            if seen.insert(name.clone()) {
                let nan = || Value::Number(f64::NAN);
                let mut index_row = NormalizedRow::new();
                index_row.push("지수명", Value::Text(name));
                index_row.push("종가", index_close.unwrap_or_else(nan));
                index_row.push("대비", index_change.unwrap_or_else(nan));
                index_row.push("등락률", index_rate.unwrap_or_else(nan));
                index_rows.push(index_row);
            }
        }

        etf_rows.push(row);
    }

    (etf_rows, index_rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote_row(ticker: &str, index_name: &str) -> NormalizedRow {
        let mut row = NormalizedRow::new();
        row.push("단축코드", Value::Text(ticker.to_string()));
        row.push("종목코드", Value::Text(format!("KR7{}002", ticker)));
        row.push("종가", Value::Number(10000.0));
        row.push("순자산총액", Value::Number(0.0));
        row.push("기초지수_지수명", Value::Text(index_name.to_string()));
        row.push("기초지수_종가", Value::Number(330.0));
        row.push("기초지수_대비", Value::Number(-1.5));
        row.push("기초지수_등락률", Value::Number(-0.45));
        row
    }

    #[test]
    fn split_drops_embedded_and_volatile_columns() {
        let (etf_rows, _) = split_rows(vec![quote_row("069500", "코스피 200")]);
        let columns: Vec<_> = etf_rows[0].columns().collect();
        assert_eq!(columns, vec!["단축코드", "종가"]);
    }

    #[test]
    fn split_dedupes_secondary_by_name() {
        let rows = vec![
            quote_row("069500", "코스피 200"),
            quote_row("278530", "코스피 200"),
            quote_row("069660", "코스닥 150"),
        ];
        let (etf_rows, index_rows) = split_rows(rows);

        assert_eq!(etf_rows.len(), 3);
        assert_eq!(index_rows.len(), 2);
        let names: Vec<_> = index_rows
            .iter()
            .map(|row| row.get("지수명").unwrap().as_text().unwrap().to_string())
            .collect();
        assert_eq!(names, vec!["코스피 200", "코스닥 150"]);
    }
}
