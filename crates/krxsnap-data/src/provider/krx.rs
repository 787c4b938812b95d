//! KRX 통계 포털 클라이언트.
//!
//! 한국거래소 정보데이터시스템(data.krx.co.kr)의 통계 리포트를
//! 조회합니다. 단일 일자 조회와 긴 날짜 범위의 윈도 분할 조회를
//! 지원합니다.
//!
//! # 요청 형태
//!
//! POST + URL 인코딩 폼. `bld`로 리포트를 고르고 나머지 파라미터는
//! 리포트별 필터다. 응답은 JSON이고 행 배열이 담기는 키는 리포트마다
//! 다르다 (`output` 또는 `OutBlock_1`).
//!
//! # 실패 정책
//!
//! 전송/HTTP/디코드 실패는 그대로 [`DataError::Fetch`]로 올라간다.
//! 재시도는 하지 않는다. 조용한 재시도는 스키마 변경을 가릴 수 있다.

use std::time::Duration;

use rand::Rng;

use krxsnap_core::CalendarDate;

use crate::error::{DataError, Result};
use crate::row::RawRow;
use crate::schema::ReportSchema;

/// KRX 클라이언트 튜닝 값.
#[derive(Debug, Clone)]
pub struct KrxClientConfig {
    /// 포털 베이스 URL
    pub base_url: String,
    /// 범위 조회 윈도 크기 (달력일). 응답 크기 제한을 넘지 않기 위한 값
    pub window_days: i64,
    /// 직전 윈도에 결과가 있었을 때의 최소 대기 (밀리초)
    pub busy_delay_min_ms: u64,
    /// 직전 윈도에 결과가 있었을 때의 최대 대기 (밀리초)
    pub busy_delay_max_ms: u64,
    /// 직전 윈도가 비었을 때의 대기 (밀리초)
    pub idle_delay_ms: u64,
}

impl Default for KrxClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://data.krx.co.kr".to_string(),
            // 2년 단위. 365*2 = 730
            window_days: 730,
            busy_delay_min_ms: 500,
            busy_delay_max_ms: 1000,
            idle_delay_ms: 100,
        }
    }
}

/// KRX 통계 포털 클라이언트.
#[derive(Debug, Clone)]
pub struct KrxClient {
    config: KrxClientConfig,
    client: reqwest::Client,
}

impl Default for KrxClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KrxClient {
    pub fn new() -> Self {
        Self::with_config(KrxClientConfig::default())
    }

    pub fn with_config(config: KrxClientConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
        }
    }

    /// 리포트 한 페이지 조회.
    pub async fn fetch_rows(
        &self,
        schema: &ReportSchema,
        params: &[(&str, String)],
    ) -> Result<Vec<RawRow>> {
        let url = format!("{}/comm/bldAttendant/getJsonData.cmd", self.config.base_url);

        let mut form: Vec<(&str, &str)> = params
            .iter()
            .map(|(key, value)| (*key, value.as_str()))
            .collect();
        form.push(("bld", schema.bld));

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .header("User-Agent", "Mozilla/5.0")
            .header("Referer", "http://data.krx.co.kr/")
            .form(&form)
            .send()
            .await?
            .error_for_status()?;

        let json: serde_json::Value = response.json().await?;

        if let Some(datetime) = json.get("CURRENT_DATETIME").and_then(|v| v.as_str()) {
            tracing::debug!(bld = schema.bld, server_time = datetime, "응답 수신");
        }

        let list = json
            .get(schema.list_key)
            .and_then(|v| v.as_array())
            .ok_or_else(|| {
                DataError::Fetch(format!(
                    "응답에 {} 키가 없음 (bld={})",
                    schema.list_key, schema.bld
                ))
            })?;

        list.iter().map(json_to_raw_row).collect()
    }

    /// 날짜 범위 조회. 윈도 단위로 잘라서 요청한다.
    ///
    /// 윈도는 과거부터 순서대로 요청하지만, 각 응답이 최신순이므로 새
    /// 윈도를 기존 목록 앞에 붙여서 전체를 최신순으로 유지한다.
    /// 기존 아티팩트들이 전부 최신 데이터를 위에 두는 관례라서다.
    pub async fn fetch_range(
        &self,
        schema: &ReportSchema,
        params: &[(&str, String)],
        start: CalendarDate,
        end: CalendarDate,
    ) -> Result<Vec<RawRow>> {
        let mut list: Vec<RawRow> = Vec::new();

        // 윈도 양끝이 모두 포함되므로 한 윈도가 range+1일을 읽는다.
        // remain에서 range+1을 빼는 이유.
        let mut remain = start.diff_days(end);
        let mut cursor = start;

        while remain > 0 {
            let range = remain.min(self.config.window_days);
            let cursor_end = cursor.add_days(range);

            let mut form = params.to_vec();
            form.push(("strtDd", cursor.marshal("")));
            form.push(("endDd", cursor_end.marshal("")));

            let mut rows = self.fetch_rows(schema, &form).await?;
            let count = rows.len();
            tracing::info!(
                bld = schema.bld,
                window_start = %cursor,
                window_end = %cursor_end,
                count,
                "범위 조회"
            );

            rows.append(&mut list);
            list = rows;

            remain -= range + 1;
            cursor = cursor_end.add_days(1);

            if remain > 0 {
                // 대기 시간은 고정하고 싶지 않아서
                let millis = if count > 0 {
                    let mut rng = rand::thread_rng();
                    rng.gen_range(self.config.busy_delay_min_ms..self.config.busy_delay_max_ms)
                } else {
                    // 검색 결과가 없을 때는 짧게 대기해도 되지 않을까?
                    self.config.idle_delay_ms
                };
                tokio::time::sleep(Duration::from_millis(millis)).await;
            }
        }

        Ok(list)
    }
}

fn json_to_raw_row(value: &serde_json::Value) -> Result<RawRow> {
    let object = value
        .as_object()
        .ok_or_else(|| DataError::Fetch("행이 객체가 아님".to_string()))?;

    let mut row = RawRow::new();
    for (key, value) in object {
        let text = match value {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        row.insert(key.clone(), text);
    }
    Ok(row)
}
