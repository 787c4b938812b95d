//! 환경변수 기반 설정 모듈.

use std::time::Duration;

use krxsnap_data::provider::KrxClientConfig;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// KRX 조회 설정
    pub fetch: FetchConfig,
    /// KOFIA 조회 설정
    pub kofia: KofiaConfig,
    /// 아티팩트 배치 설정
    pub layout: LayoutConfig,
}

/// KRX 조회 설정
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// KRX 통계 포털 베이스 URL
    pub base_url: String,
    /// 범위 조회 윈도 크기 (달력일)
    pub window_days: i64,
    /// 결과가 있던 윈도 뒤의 최소 대기 (밀리초)
    pub busy_delay_min_ms: u64,
    /// 결과가 있던 윈도 뒤의 최대 대기 (밀리초)
    pub busy_delay_max_ms: u64,
    /// 빈 윈도 뒤의 대기 (밀리초)
    pub idle_delay_ms: u64,
    /// 단일 일자 조회 뒤의 고정 정착 대기 (밀리초)
    pub settle_delay_ms: u64,
}

/// KOFIA 조회 설정
#[derive(Debug, Clone)]
pub struct KofiaConfig {
    /// 월말 기준일을 몇 달 전까지 거슬러 조회할지
    ///
    /// 공시가 밀리는 기간은 구조적 불변량이 아니라 운영 경험값이라
    /// 설정으로 뺐다.
    pub lookback_months: u32,
    /// 펀드유형 필터
    pub fund_type: String,
}

/// 아티팩트 배치 설정
#[derive(Debug, Clone)]
pub struct LayoutConfig {
    /// 연도별 디렉토리를 만들기 시작하는 연도
    pub first_year: i32,
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    pub fn from_env() -> Self {
        Self {
            fetch: FetchConfig {
                base_url: std::env::var("KRX_BASE_URL")
                    .unwrap_or_else(|_| "http://data.krx.co.kr".to_string()),
                window_days: env_var_parse("KRX_WINDOW_DAYS", 730),
                busy_delay_min_ms: env_var_parse("KRX_BUSY_DELAY_MIN_MS", 500),
                busy_delay_max_ms: env_var_parse("KRX_BUSY_DELAY_MAX_MS", 1000),
                idle_delay_ms: env_var_parse("KRX_IDLE_DELAY_MS", 100),
                settle_delay_ms: env_var_parse("KRX_SETTLE_DELAY_MS", 500),
            },
            kofia: KofiaConfig {
                lookback_months: env_var_parse("KOFIA_LOOKBACK_MONTHS", 3),
                fund_type: std::env::var("KOFIA_FUND_TYPE")
                    .unwrap_or_else(|_| "상장지수".to_string()),
            },
            layout: LayoutConfig {
                first_year: env_var_parse("DATA_FIRST_YEAR", 2002),
            },
        }
    }
}

impl FetchConfig {
    /// KRX 클라이언트 튜닝 값으로 변환
    pub fn krx_client_config(&self) -> KrxClientConfig {
        KrxClientConfig {
            base_url: self.base_url.clone(),
            window_days: self.window_days,
            busy_delay_min_ms: self.busy_delay_min_ms,
            busy_delay_max_ms: self.busy_delay_max_ms,
            idle_delay_ms: self.idle_delay_ms,
        }
    }

    /// 단일 조회 뒤 정착 대기를 Duration으로 반환
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// 환경변수에서 값을 파싱 (실패 시 기본값 사용)
fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
