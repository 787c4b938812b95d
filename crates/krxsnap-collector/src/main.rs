//! KRX/KOFIA 스냅샷 수집 CLI.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use krxsnap_collector::modules::{etf, etf_history, fusion, index, kofia, stock};
use krxsnap_collector::CollectorConfig;
use krxsnap_core::logging::{init_logging, LogConfig};
use krxsnap_core::CalendarDate;

#[derive(Parser)]
#[command(name = "krxsnap")]
#[command(about = "KRX/KOFIA 통계 스냅샷 수집기", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 로그 레벨 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 주식: 기본정보 요약 + 최신 전종목 시세
    Stock {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,

        /// 시작일 (KST)
        // 임의로 잡은 시작점. 너무 과거부터 보는 건 의미가 없을 것
        // 같지만 2008년은 범위에 넣고 싶었다
        #[arg(long, value_parser = parse_date, default_value = "2005-01-01")]
        start_date: CalendarDate,

        /// 종료일 (KST)
        #[arg(long, value_parser = parse_date)]
        end_date: CalendarDate,

        /// 시장 (kospi, kosdaq)
        #[arg(long, value_parser = parse_market)]
        market: stock::Market,

        /// 이미 있는 아티팩트도 다시 받는다
        #[arg(long)]
        overwrite: bool,
    },

    /// ETF: 기본정보 요약 + 날짜별 시세 (기초지수 분리 포함)
    Etf {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,

        /// 시작일 (KST)
        // KRX ETF의 시작점
        #[arg(long, value_parser = parse_date, default_value = "2002-10-14")]
        start_date: CalendarDate,

        /// 종료일 (KST)
        #[arg(long, value_parser = parse_date)]
        end_date: CalendarDate,

        /// 이미 있는 아티팩트도 다시 받는다
        #[arg(long)]
        overwrite: bool,
    },

    /// ETF 상품별 전체 히스토리 백필
    EtfHistory {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,

        /// 종료일 (KST). 생략하면 오늘
        #[arg(long, value_parser = parse_date)]
        end_date: Option<CalendarDate>,
    },

    /// 주가지수: 계열별 기본정보 + 지수별 전체 히스토리
    Index {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,

        /// 종료일 (KST). 생략하면 오늘
        #[arg(long, value_parser = parse_date)]
        end_date: Option<CalendarDate>,
    },

    /// KOFIA 펀드 보수비용
    Kofia {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,

        /// 월말 기준일을 몇 달 전까지 시도할지
        #[arg(long)]
        lookback_months: Option<u32>,
    },

    /// 기본정보 + 보수비용 결합
    Fusion {
        /// 데이터 디렉토리
        #[arg(long)]
        data_dir: PathBuf,
    },
}

fn parse_date(s: &str) -> Result<CalendarDate, String> {
    CalendarDate::parse(s).map_err(|e| e.to_string())
}

fn parse_market(s: &str) -> Result<stock::Market, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();

    init_logging(LogConfig::new(format!(
        "krxsnap_collector={level},krxsnap_data={level}",
        level = cli.log_level
    )))?;

    let config = CollectorConfig::from_env();

    match cli.command {
        Commands::Stock {
            data_dir,
            start_date,
            end_date,
            market,
            overwrite,
        } => {
            let options = stock::StockOptions {
                data_dir,
                start_date,
                end_date,
                market,
                overwrite,
            };
            let stats = stock::run(&config, &options).await?;
            stats.log_summary("주식 수집");
        }
        Commands::Etf {
            data_dir,
            start_date,
            end_date,
            overwrite,
        } => {
            let options = etf::EtfOptions {
                data_dir,
                start_date,
                end_date,
                overwrite,
            };
            let stats = etf::run(&config, &options).await?;
            stats.log_summary("ETF 수집");
        }
        Commands::EtfHistory { data_dir, end_date } => {
            let options = etf_history::EtfHistoryOptions {
                data_dir,
                end_date: end_date.unwrap_or_else(CalendarDate::today_kst),
            };
            let stats = etf_history::run(&config, &options).await?;
            stats.log_summary("ETF 히스토리 백필");
        }
        Commands::Index { data_dir, end_date } => {
            let options = index::IndexOptions {
                data_dir,
                end_date: end_date.unwrap_or_else(CalendarDate::today_kst),
            };
            let stats = index::run(&config, &options).await?;
            stats.log_summary("주가지수 수집");
        }
        Commands::Kofia {
            data_dir,
            lookback_months,
        } => {
            let options = kofia::KofiaOptions {
                data_dir,
                lookback_months,
            };
            let stats = kofia::run(&config, &options).await?;
            stats.log_summary("보수비용 수집");
        }
        Commands::Fusion { data_dir } => {
            let options = fusion::FusionOptions { data_dir };
            fusion::run(&options)?;
        }
    }

    Ok(())
}
