//! 기본정보 + 보수비용 결합 모듈.
//!
//! KRX 기본정보와 KOFIA 보수비용 사이에는 공유 식별자가 없다. 둘 다
//! 갖고 있는 건 상품 이름뿐인데 표기 규칙이 서로 달라서, 정해진 순서의
//! 치환 규칙으로 이름을 정규화한 뒤에 맞춘다.
//!
//! 이 정규화는 어디까지나 최선 노력이다. 25/03/01 기준 전체 941개 중
//! 50개는 매칭에 실패했다. 제대로 하려면 KRX 투자설명서에서 펀드코드를
//! 하나씩 찾아야 하는데 그건 너무 노가다라 포기. 못 맞춘 행은 로그만
//! 남기고 결과에서 뺀다.

use std::collections::HashMap;
use std::path::PathBuf;

use krxsnap_data::storage::{csv, DataLayout};
use krxsnap_data::{NormalizedRow, Value};

use crate::error::Result;

/// fusion 서브커맨드 입력.
#[derive(Debug, Clone)]
pub struct FusionOptions {
    pub data_dir: PathBuf,
}

/// 이름 정규화 규칙. 선언된 순서대로 적용된다.
#[derive(Debug, Clone, Copy)]
enum NameRule {
    /// 모든 일치를 치환
    ReplaceAll(&'static str, &'static str),
    /// 첫 일치만 치환
    ReplaceFirst(&'static str, &'static str),
    /// 환헷지 마커 [H]를 이름 맨 뒤로 이동
    MoveHedgeToEnd,
    /// 대문자화
    Uppercase,
}

/// 정규화 규칙 테이블.
///
/// 새 표기 차이가 발견되면 여기에 항목을 추가하면 된다.
static NAME_RULES: &[NameRule] = &[
    // kofia 이름에는 공백이 없는데 krx에는 공백이 들어간다
    NameRule::ReplaceAll(" ", ""),
    // 괄호 정책이 미묘하게 다를 수 있어서 한쪽으로 맞춘다. () -> []
    NameRule::ReplaceAll("(", "["),
    NameRule::ReplaceAll(")", "]"),
    // KBRISE중국본토대형주CSI100증권상장지수자투자신탁(주식) -> 상장지수자투자신탁?
    NameRule::ReplaceFirst("상장지수자투자신탁", "상장지수투자신탁"),
    // 미래에셋TIGER글로벌AI사이버보안INDXX증권상장지수투자신탁(주식) -> INDXX?
    NameRule::ReplaceFirst("INDXX", ""),
    // KRX  : 한화 PLUS KOSPI 증권상장지수투자신탁
    // KOFIA: 한화PLUS코스피증권상장지수투자신탁(주식)
    NameRule::ReplaceFirst("KOSPI", "코스피"),
    // 주식형, 채권형 같은 유형 접미 정규화
    NameRule::ReplaceFirst("-재간접]", "-재간접형]"),
    NameRule::ReplaceFirst("[주식-파생형]", "[파생형]"),
    NameRule::ReplaceFirst("[주식]", "[주식형]"),
    NameRule::ReplaceFirst("[채권]", "[채권형]"),
    // 헷지 마커가 붙는 순서가 소스마다 다르다. 항상 맨 뒤로 보낸다
    NameRule::MoveHedgeToEnd,
    // KRX  : ...증권상장지수투자신탁[주식-파생형](합성 H)
    // KOFIA: ...증권상장지수투자신탁[주식-파생형](합성)(H)
    NameRule::ReplaceFirst("[합성H]", "[합성][H]"),
    // 대소문자 차이 회피 (Big5 vs BIG5 같은 것)
    NameRule::Uppercase,
];

/// 상품 이름을 매칭 키로 정규화한다.
pub fn sanitize_name(name: &str) -> String {
    let mut candidate = name.to_string();
    for rule in NAME_RULES {
        candidate = match rule {
            NameRule::ReplaceAll(from, to) => candidate.replace(from, to),
            NameRule::ReplaceFirst(from, to) => candidate.replacen(from, to, 1),
            NameRule::MoveHedgeToEnd => {
                if candidate.contains("[H]") {
                    format!("{}[H]", candidate.replacen("[H]", "", 1))
                } else {
                    candidate
                }
            }
            NameRule::Uppercase => candidate.to_uppercase(),
        };
    }
    candidate
}

type CsvRow = HashMap<String, String>;

/// fusion 실행. 요약/보수비용 아티팩트를 읽어 결합 아티팩트를 쓴다.
pub fn run(options: &FusionOptions) -> Result<usize> {
    let layout = DataLayout::new(&options.data_dir);

    let fee_rows = csv::read_artifact(&layout.fund_fees())?;
    let info_rows = csv::read_artifact(&layout.summary_info())?;

    let records = fuse(&info_rows, &fee_rows);
    tracing::info!(count = records.len(), "fusion");

    let text = csv::encode(&records)?;
    csv::write_artifact(&layout.fused(), &text)?;
    Ok(records.len())
}

/// 기본정보 행과 보수비용 행을 정규화 이름으로 결합한다.
///
/// 출력 순서는 기본정보 순서를 따른다. 매칭 결과 자체는 입력 순서와
/// 무관하게 결정적이다.
pub fn fuse(info_rows: &[CsvRow], fee_rows: &[CsvRow]) -> Vec<NormalizedRow> {
    let fee_table: HashMap<String, &CsvRow> = fee_rows
        .iter()
        .map(|row| (sanitize_name(field(row, "펀드명")), row))
        .collect();

    let mut records = Vec::new();
    for info in info_rows {
        let candidate = sanitize_name(field(info, "한글종목명"));
        let Some(fee) = fee_table.get(&candidate) else {
            tracing::info!(
                ticker = field(info, "단축코드"),
                name = field(info, "한글종목명"),
                "보수 정보 못 찾음"
            );
            continue;
        };
        records.push(combine(info, fee));
    }
    records
}

fn combine(info: &CsvRow, fee: &CsvRow) -> NormalizedRow {
    let total_fee = parse_csv_number(field(info, "총보수"));
    let ter = parse_csv_number(field(fee, "TER"));
    let trading_fee = parse_csv_number(field(fee, "매매중개수수료율"));
    let real_cost = ter + trading_fee;

    let mut row = NormalizedRow::new();
    row.push("단축코드", Value::Text(field(info, "단축코드").to_string()));
    row.push("한글종목약명", Value::Text(field(info, "한글종목약명").to_string()));
    row.push("기초지수명", Value::Text(field(info, "기초지수명").to_string()));
    row.push("기초시장분류", Value::Text(field(info, "기초시장분류").to_string()));
    row.push("기초자산분류", Value::Text(field(info, "기초자산분류").to_string()));
    row.push("총보수", Value::Text(format!("{:.4}", total_fee)));
    row.push("TER", Value::Text(format!("{:.4}", ter)));
    row.push("실부담비용률", Value::Text(format!("{:.4}", real_cost)));
    row.push("과세유형", Value::Text(field(info, "과세유형").to_string()));
    row.push("표준코드", Value::Text(field(info, "표준코드").to_string()));
    row.push("펀드코드", Value::Text(field(fee, "펀드코드").to_string()));
    row
}

fn field<'a>(row: &'a CsvRow, key: &str) -> &'a str {
    row.get(key).map(String::as_str).unwrap_or("")
}

/// CSV 셀의 수치 파싱. 빈 셀은 0으로 본다.
fn parse_csv_number(raw: &str) -> f64 {
    if raw.is_empty() {
        return 0.0;
    }
    raw.replace(',', "").parse().unwrap_or(f64::NAN)
}
