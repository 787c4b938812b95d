//! ETF 일별 수집 통합 테스트
//!
//! mockito로 띄운 가짜 KRX 포털에 대고 수집을 끝까지 돌려본다.
//! 요약/일별/기초지수 아티팩트 생성, 휴장일 분류, 재실행시 스킵까지.

use mockito::Matcher;
use serde_json::json;

use krxsnap_collector::config::{CollectorConfig, FetchConfig, KofiaConfig, LayoutConfig};
use krxsnap_collector::modules::etf::{self, EtfOptions};
use krxsnap_core::CalendarDate;
use krxsnap_data::storage::csv;

fn test_config(base_url: String) -> CollectorConfig {
    CollectorConfig {
        fetch: FetchConfig {
            base_url,
            window_days: 730,
            busy_delay_min_ms: 1,
            busy_delay_max_ms: 2,
            idle_delay_ms: 1,
            settle_delay_ms: 0,
        },
        kofia: KofiaConfig {
            lookback_months: 3,
            fund_type: "상장지수".to_string(),
        },
        layout: LayoutConfig { first_year: 2025 },
    }
}

fn info_body() -> String {
    json!({
        "output": [{
            "ISU_CD": "KR7069500007",
            "ISU_SRT_CD": "069500",
            "ISU_NM": "삼성 KODEX 200증권상장지수투자신탁[주식]",
            "ISU_ABBRV": "KODEX 200",
            "ISU_ENG_NM": "Samsung KODEX200 ETF",
            "LIST_DD": "2002/10/14",
            "ETF_OBJ_IDX_NM": "코스피 200",
            "IDX_CALC_INST_NM1": "한국거래소",
            "IDX_CALC_INST_NM2": "일반",
            "ETF_REPLICA_METHD_TP_CD": "P",
            "IDX_MKT_CLSS_NM": "국내",
            "IDX_ASST_CLSS_NM": "주식",
            "LIST_SHRS": "168,650,000",
            "COM_ABBRV": "삼성자산운용",
            "CU_QTY": "50,000",
            "ETF_TOT_FEE": "0.15",
            "TAX_TP_CD": "배당소득세"
        }],
        "CURRENT_DATETIME": "2025.02.10 AM 09:00:00"
    })
    .to_string()
}

fn quotes_body(traded: bool) -> String {
    let value = |v: &str| if traded { v.to_string() } else { "-".to_string() };
    json!({
        "output": [{
            "ISU_SRT_CD": "069500",
            "ISU_CD": "KR7069500007",
            "ISU_ABBRV": "KODEX 200",
            "TDD_CLSPRC": value("33,105"),
            "CMPPREVDD_PRC": value("205"),
            "FLUC_RT": value("0.62"),
            "NAV": value("33,120.51"),
            "TDD_OPNPRC": value("32,950"),
            "TDD_HGPRC": value("33,150"),
            "TDD_LWPRC": value("32,900"),
            "ACC_TRDVOL": value("4,512,345"),
            "ACC_TRDVAL": value("149,123,456,789"),
            "MKTCAP": value("5,583,114,250,000"),
            "INVSTASST_NETASST_TOTAMT": value("5,586,000,000,000"),
            "LIST_SHRS": value("168,650,000"),
            "IDX_IND_NM": "코스피 200",
            "OBJ_STKPRC_IDX": value("440.25"),
            "CMPPREVDD_IDX": value("2.71"),
            "FLUC_RT1": value("0.62")
        }],
        "CURRENT_DATETIME": "2025.02.10 AM 09:00:00"
    })
    .to_string()
}

#[tokio::test]
async fn etf_daily_scan_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let path = "/comm/bldAttendant/getJsonData.cmd";
    let info_bld = "dbms/MDC/STAT/standard/MDCSTAT04601";
    let quotes_bld = "dbms/MDC/STAT/standard/MDCSTAT04301";

    // 요약은 실행마다 새로 받는다
    let info_mock = server
        .mock("POST", path)
        .match_body(Matcher::UrlEncoded("bld".into(), info_bld.into()))
        .with_body(info_body())
        .expect(2)
        .create_async()
        .await;

    // 2025-02-06(목) 거래일: 첫 실행에서만 조회
    let traded_mock = server
        .mock("POST", path)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("bld".into(), quotes_bld.into()),
            Matcher::UrlEncoded("trdDd".into(), "20250206".into()),
        ]))
        .with_body(quotes_body(true))
        .expect(1)
        .create_async()
        .await;

    // 2025-02-07(금) 휴장일 가정: 아티팩트가 안 생기니 매 실행 조회
    let holiday_mock = server
        .mock("POST", path)
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("bld".into(), quotes_bld.into()),
            Matcher::UrlEncoded("trdDd".into(), "20250207".into()),
        ]))
        .with_body(quotes_body(false))
        .expect(2)
        .create_async()
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = test_config(server.url());
    let options = EtfOptions {
        data_dir: dir.path().to_path_buf(),
        start_date: CalendarDate::parse("2025-02-06").unwrap(),
        end_date: CalendarDate::parse("2025-02-09").unwrap(),
        overwrite: false,
    };

    // 첫 실행: 목 1건 저장, 금 휴장, 주말 이틀 스킵
    let stats = etf::run(&config, &options).await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.saved, 1);
    assert_eq!(stats.holiday, 1);
    assert_eq!(stats.skipped, 2);

    let etf_artifact = dir.path().join("전종목/2025/2025-02-06.csv");
    let index_artifact = dir.path().join("전체지수/2025/2025-02-06.csv");
    assert!(dir.path().join("전종목_기본정보.csv").exists());
    assert!(etf_artifact.exists());
    assert!(index_artifact.exists());
    assert!(!dir.path().join("전종목/2025/2025-02-07.csv").exists());

    // ETF 아티팩트에서 내장 지수 열과 지연 필드는 빠져야 한다
    let etf_rows = csv::read_artifact(&etf_artifact).unwrap();
    assert_eq!(etf_rows.len(), 1);
    assert_eq!(etf_rows[0]["종가"], "33105");
    assert!(!etf_rows[0].contains_key("종목코드"));
    assert!(!etf_rows[0].contains_key("순자산총액"));
    assert!(!etf_rows[0].contains_key("기초지수_지수명"));

    // 뜯어낸 기초지수 아티팩트
    let index_rows = csv::read_artifact(&index_artifact).unwrap();
    assert_eq!(index_rows.len(), 1);
    assert_eq!(index_rows[0]["지수명"], "코스피 200");
    assert_eq!(index_rows[0]["종가"], "440.25");

    // 요약에서는 자주 바뀌는 상장좌수가 빠진다
    let summary_rows = csv::read_artifact(&dir.path().join("전종목_기본정보.csv")).unwrap();
    assert!(!summary_rows[0].contains_key("상장좌수"));
    assert_eq!(summary_rows[0]["상장일"], "2002-10-14");

    // 두 번째 실행: 거래일 아티팩트가 있으니 그 날짜는 조회 자체가 없다
    let before = std::fs::read(&etf_artifact).unwrap();
    let stats = etf::run(&config, &options).await.unwrap();
    assert_eq!(stats.saved, 0);
    assert_eq!(stats.skipped, 3); // 주말 이틀 + 이미 있음
    assert_eq!(stats.holiday, 1);
    assert_eq!(std::fs::read(&etf_artifact).unwrap(), before);

    info_mock.assert_async().await;
    traded_mock.assert_async().await;
    holiday_mock.assert_async().await;
}
