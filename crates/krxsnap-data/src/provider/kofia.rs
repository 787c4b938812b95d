//! KOFIA 펀드 보수비용 공시 클라이언트.
//!
//! 금융투자협회 전자공시(dis.kofia.or.kr)의 "펀드 보수 및 비용" 조회.
//! proframe XML 엔벨로프를 POST하고 XML 응답을 행 목록으로 푼다.
//!
//! 응답의 `selectMeta`는 결과가 하나면 단일 엘리먼트, 여럿이면
//! 반복 엘리먼트다. 두 모양 모두 목록으로 정규화한다.

use quick_xml::events::Event;
use quick_xml::Reader;

use krxsnap_core::CalendarDate;

use crate::error::{DataError, Result};
use crate::normalize::normalize;
use crate::row::{NormalizedRow, RawRow};
use crate::schema::{self, FieldSpec};

/// 보수비용 행의 필드 선언.
///
/// kofia의 "표준코드"는 주식의 표준코드와 다른 값이다.
/// 낚시 방지하려고 펀드코드로 이름을 바꿔서 쓴다.
pub static FUND_FEE_FIELDS: &[FieldSpec] = &[
    schema::text("운용회사", "tmpV1"),
    schema::text("펀드명", "tmpV2"),
    schema::text("펀드유형", "tmpV3"),
    schema::date("설정일", "tmpV4"),
    schema::text("펀드코드", "tmpV15"),
    schema::number("운용보수", "tmpV5"),
    schema::number("판매보수", "tmpV6"),
    schema::number("수탁보수", "tmpV7"),
    schema::number("사무관리보수", "tmpV8"),
    schema::number("보수합계", "tmpV9"),
    schema::number("유사유형평균보수율", "tmpV10"),
    schema::number("기타비용", "tmpV11"),
    schema::number("TER", "tmpV12"),
    schema::number("선취수수료", "tmpV13"),
    schema::number("후취수수료", "tmpV14"),
    schema::number("매매중개수수료율", "tmpV16"),
];

/// KOFIA 공시 클라이언트.
#[derive(Debug, Clone)]
pub struct KofiaClient {
    client: reqwest::Client,
    base_url: String,
}

impl Default for KofiaClient {
    fn default() -> Self {
        Self::new()
    }
}

impl KofiaClient {
    pub fn new() -> Self {
        Self::with_base_url("https://dis.kofia.or.kr")
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()
                .expect("HTTP 클라이언트 생성 실패"),
            base_url: base_url.into(),
        }
    }

    /// 기준일과 펀드유형 필터로 보수비용 목록 조회.
    ///
    /// 기준일은 월말 공시 기준이라 아무 날짜나 넣으면 빈 결과가 나온다.
    /// 폴백 정책은 호출자(collector) 몫이다.
    pub async fn fetch_fund_fees(
        &self,
        date: CalendarDate,
        fund_type: &str,
    ) -> Result<Vec<NormalizedRow>> {
        let url = format!("{}/proframeWeb/XMLSERVICES/", self.base_url);
        let payload = build_payload(&date.marshal(""), fund_type);

        let response = self
            .client
            .post(&url)
            .header("Accept", "text/xml")
            .body(payload)
            .send()
            .await?
            .error_for_status()?;

        let xml = response.text().await?;
        let raws = parse_select_meta(&xml)?;

        raws.iter().map(|raw| normalize(FUND_FEE_FIELDS, raw)).collect()
    }
}

fn build_payload(date: &str, fund_type: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<message>
  <proframeHeader>
    <pfmAppName>FS-DIS2</pfmAppName>
    <pfmSvcName>DISFundFeeCmsSO</pfmSvcName>
    <pfmFnName>select</pfmFnName>
  </proframeHeader>
  <systemHeader></systemHeader>
    <DISCondFuncDTO>
    <tmpV30>{date}</tmpV30>
    <tmpV11></tmpV11>
    <tmpV12>{fund_type}</tmpV12>
    <tmpV3></tmpV3>
    <tmpV5></tmpV5>
    <tmpV4></tmpV4>
</DISCondFuncDTO>
</message>"#
    )
}

/// 응답 XML에서 `selectMeta` 엘리먼트들을 행으로 수집한다.
fn parse_select_meta(xml: &str) -> Result<Vec<RawRow>> {
    let mut reader = Reader::from_str(xml);

    let mut rows: Vec<RawRow> = Vec::new();
    let mut current: Option<RawRow> = None;
    let mut field: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if name == "selectMeta" {
                    current = Some(RawRow::new());
                } else if let Some(row) = current.as_mut() {
                    // 빈 엘리먼트(<tmpV13></tmpV13>)도 빈 문자열 값으로 남긴다
                    row.insert(name.clone(), String::new());
                    field = Some(name);
                }
            }
            Ok(Event::Empty(start)) => {
                let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                if let Some(row) = current.as_mut() {
                    row.insert(name, String::new());
                }
            }
            Ok(Event::Text(text)) => {
                if let (Some(row), Some(key)) = (current.as_mut(), field.as_ref()) {
                    let value = text
                        .unescape()
                        .map_err(|e| DataError::Fetch(format!("XML 파싱 실패: {}", e)))?;
                    row.insert(key.clone(), value.trim().to_string());
                }
            }
            Ok(Event::End(end)) => {
                let name = String::from_utf8_lossy(end.local_name().as_ref()).into_owned();
                if name == "selectMeta" {
                    if let Some(row) = current.take() {
                        rows.push(row);
                    }
                } else {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(DataError::Fetch(format!("XML 파싱 실패: {}", e))),
            Ok(_) => {}
        }
    }

    Ok(rows)
}
