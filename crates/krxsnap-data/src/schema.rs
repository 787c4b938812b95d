//! 리포트별 필드 맵.
//!
//! KRX 통계 포털의 필드 코드("TDD_CLSPRC" 같은 것)는 리포트별 외부
//! 계약이지 로직이 아니다. 의미 필드 → 원격 키 → 값 종류를 데이터로
//! 선언해두고, 정규화기가 이 테이블을 그대로 소비한다.

/// 필드 값 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// 문자열 그대로
    Text,
    /// 천단위 구분자를 벗긴 수치. 센티널 "-"는 NaN
    Number,
    /// 날짜 (`CalendarDate::parse`가 받는 네 가지 표기)
    Date,
    /// 절대값으로 내려오는 수치. 부호는 별도 등락구분 코드 필드에서 복원
    ///
    /// 개별종목 시세의 대비가 항상 양수로 나오는 업스트림 표시 버그
    /// 대응. 업스트림이 고치면 이 kind를 Number로 바꾸면 끝이다.
    SignedNumber {
        /// 등락구분 코드가 담긴 원격 키
        sign_key: &'static str,
    },
}

/// 의미 필드 하나의 선언.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// CSV 헤더로 쓰이는 의미 필드 이름
    pub column: &'static str,
    /// 원격 응답의 필드 코드
    pub key: &'static str,
    pub kind: FieldKind,
}

/// KRX 통계 리포트 하나의 선언.
#[derive(Debug, Clone, Copy)]
pub struct ReportSchema {
    /// 리포트 식별자 (요청 폼의 `bld` 파라미터)
    pub bld: &'static str,
    /// 응답 JSON에서 행 배열이 담기는 키 (`output` 또는 `OutBlock_1`)
    pub list_key: &'static str,
    pub fields: &'static [FieldSpec],
}

pub(crate) const fn text(column: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec { column, key, kind: FieldKind::Text }
}

pub(crate) const fn number(column: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec { column, key, kind: FieldKind::Number }
}

pub(crate) const fn date(column: &'static str, key: &'static str) -> FieldSpec {
    FieldSpec { column, key, kind: FieldKind::Date }
}

const fn signed(column: &'static str, key: &'static str, sign_key: &'static str) -> FieldSpec {
    FieldSpec { column, key, kind: FieldKind::SignedNumber { sign_key } }
}

/// [12005] 전종목 기본정보 (주식 - 종목정보)
pub static STOCK_INFO: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT01901",
    list_key: "OutBlock_1",
    fields: &[
        text("표준코드", "ISU_CD"),
        text("단축코드", "ISU_SRT_CD"),
        text("한글종목명", "ISU_NM"),
        text("한글종목약명", "ISU_ABBRV"),
        text("영문종목명", "ISU_ENG_NM"),
        date("상장일", "LIST_DD"),
        text("시장구분", "MKT_TP_NM"),
        text("증권구분", "SECUGRP_NM"),
        text("소속부", "SECT_TP_NM"),
        text("주식종류", "KIND_STKCERT_TP_NM"),
        number("액면가", "PARVAL"),
        number("상장주식수", "LIST_SHRS"),
    ],
};

/// [12001] 전종목 시세 (주식 - 종목시세)
pub static STOCK_QUOTES: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT01501",
    list_key: "OutBlock_1",
    fields: &[
        text("단축코드", "ISU_SRT_CD"),
        text("표준코드", "ISU_CD"),
        text("종목명", "ISU_ABBRV"),
        number("종가", "TDD_CLSPRC"),
        number("대비", "CMPPREVDD_PRC"),
        number("등락률", "FLUC_RT"),
        number("시가", "TDD_OPNPRC"),
        number("고가", "TDD_HGPRC"),
        number("저가", "TDD_LWPRC"),
        number("거래량", "ACC_TRDVOL"),
        number("거래대금", "ACC_TRDVAL"),
        number("시가총액", "MKTCAP"),
        number("상장주식수", "LIST_SHRS"),
    ],
};

/// [13104] 전종목 기본정보 (증권상품 - ETF)
pub static ETF_INFO: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT04601",
    list_key: "output",
    fields: &[
        text("표준코드", "ISU_CD"),
        text("단축코드", "ISU_SRT_CD"),
        text("한글종목명", "ISU_NM"),
        text("한글종목약명", "ISU_ABBRV"),
        text("영문종목명", "ISU_ENG_NM"),
        date("상장일", "LIST_DD"),
        text("기초지수명", "ETF_OBJ_IDX_NM"),
        text("지수산출기관", "IDX_CALC_INST_NM1"),
        text("추적배수", "IDX_CALC_INST_NM2"),
        text("복제방법", "ETF_REPLICA_METHD_TP_CD"),
        text("기초시장분류", "IDX_MKT_CLSS_NM"),
        text("기초자산분류", "IDX_ASST_CLSS_NM"),
        number("상장좌수", "LIST_SHRS"),
        text("운용사", "COM_ABBRV"),
        number("CU수량", "CU_QTY"),
        number("총보수", "ETF_TOT_FEE"),
        text("과세유형", "TAX_TP_CD"),
    ],
};

/// [13101] 전종목 시세 (증권상품 - ETF)
///
/// 주말/공휴일에는 목록은 나오지만 수치 필드가 죄다 "-".
/// 미래 날짜는 빈 배열.
pub static ETF_QUOTES: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT04301",
    list_key: "output",
    fields: &[
        text("단축코드", "ISU_SRT_CD"),
        text("종목코드", "ISU_CD"),
        text("종목명", "ISU_ABBRV"),
        number("종가", "TDD_CLSPRC"),
        number("대비", "CMPPREVDD_PRC"),
        number("등락률", "FLUC_RT"),
        number("순자산가치", "NAV"),
        number("시가", "TDD_OPNPRC"),
        number("고가", "TDD_HGPRC"),
        number("저가", "TDD_LWPRC"),
        number("거래량", "ACC_TRDVOL"),
        number("거래대금", "ACC_TRDVAL"),
        number("시가총액", "MKTCAP"),
        number("순자산총액", "INVSTASST_NETASST_TOTAMT"),
        number("상장좌수", "LIST_SHRS"),
        text("기초지수_지수명", "IDX_IND_NM"),
        number("기초지수_종가", "OBJ_STKPRC_IDX"),
        number("기초지수_대비", "CMPPREVDD_IDX"),
        number("기초지수_등락률", "FLUC_RT1"),
    ],
};

/// [13103] 개별종목 시세 추이 (증권상품 - ETF)
///
/// 대비가 항상 양수로 내려온다. 2025-01-31 430500 "KIWOOM 물가채KIS"처럼
/// 등락률이 0으로 반올림되면 등락률에서 부호를 유도할 수도 없어서
/// 등락구분 코드로 부호를 복원한다.
pub static ETF_HISTORY: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT04501",
    list_key: "output",
    fields: &[
        date("일자", "TRD_DD"),
        number("종가", "TDD_CLSPRC"),
        signed("대비", "CMPPREVDD_PRC", "FLUC_TP_CD"),
        number("등락률", "FLUC_RT"),
        number("순자산가치", "LST_NAV"),
        number("시가", "TDD_OPNPRC"),
        number("고가", "TDD_HGPRC"),
        number("저가", "TDD_LWPRC"),
        number("거래량", "ACC_TRDVOL"),
        number("거래대금", "ACC_TRDVAL"),
        number("시가총액", "MKTCAP"),
        number("순자산총액", "INVSTASST_NETASST_TOTAMT"),
        number("상장좌수", "LIST_SHRS"),
        text("기초지수_지수명", "IDX_IND_NM"),
        number("기초지수_종가", "OBJ_STKPRC_IDX"),
        signed("기초지수_대비", "CMPPREVDD_IDX", "FLUC_TP_CD1"),
        number("기초지수_등락률", "IDX_FLUC_RT"),
    ],
};

/// [11004] 전체지수 기본정보 (지수 - 주가지수)
pub static INDEX_INFO: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT00401",
    list_key: "output",
    fields: &[
        text("지수명", "IDX_NM"),
        text("영문지수명", "IDX_ENG_NM"),
        date("기준일", "BAS_TM_CONTN"),
        date("발표일", "ANNC_TM_CONTN"),
        number("기준지수", "BAS_IDX_CONTN"),
        text("산출주기", "CALC_CYCLE_CONTN"),
        text("산출시간", "CALC_TM_CONTN"),
        number("구성종목수", "COMPST_ISU_CNT"),
        text("indIdx", "IND_TP_CD"),
        text("indIdx2", "IDX_IND_CD"),
    ],
};

/// [11003] 개별지수 시세 추이 (지수 - 주가지수)
pub static INDEX_HISTORY: ReportSchema = ReportSchema {
    bld: "dbms/MDC/STAT/standard/MDCSTAT00301",
    list_key: "output",
    fields: &[
        date("일자", "TRD_DD"),
        number("종가", "CLSPRC_IDX"),
        number("대비", "PRV_DD_CMPR"),
        number("등락률", "UPDN_RATE"),
        number("시가", "OPNPRC_IDX"),
        number("고가", "HGPRC_IDX"),
        number("저가", "LWPRC_IDX"),
        number("거래량", "ACC_TRDVOL"),
        number("거래대금", "ACC_TRDVAL"),
        number("상장시가총액", "MKTCAP"),
    ],
};

/// 주가지수 계열 구분.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFamily {
    Krx,
    Kospi,
    Kosdaq,
    /// 테마 지수
    Theme,
}

impl IndexFamily {
    pub const ALL: [IndexFamily; 4] = [
        IndexFamily::Krx,
        IndexFamily::Kospi,
        IndexFamily::Kosdaq,
        IndexFamily::Theme,
    ];

    /// 요청 파라미터 `idxIndMidclssCd` 값.
    pub fn mid_class_code(self) -> &'static str {
        match self {
            IndexFamily::Krx => "01",
            IndexFamily::Kospi => "02",
            IndexFamily::Kosdaq => "03",
            IndexFamily::Theme => "04",
        }
    }

    /// CSV의 계열구분 열에 쓰는 표시 이름.
    pub fn label(self) -> &'static str {
        match self {
            IndexFamily::Krx => "KRX",
            IndexFamily::Kospi => "KOSPI",
            IndexFamily::Kosdaq => "KOSDAQ",
            IndexFamily::Theme => "테마",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_list_keys() {
        // 리포트마다 행 배열 키가 다르다. 주식 계열만 OutBlock_1.
        assert_eq!(STOCK_INFO.list_key, "OutBlock_1");
        assert_eq!(STOCK_QUOTES.list_key, "OutBlock_1");
        assert_eq!(ETF_QUOTES.list_key, "output");
        assert_eq!(INDEX_HISTORY.list_key, "output");
    }

    #[test]
    fn signed_fields_carry_sign_key() {
        let spec = ETF_HISTORY
            .fields
            .iter()
            .find(|f| f.column == "대비")
            .unwrap();
        assert_eq!(spec.kind, FieldKind::SignedNumber { sign_key: "FLUC_TP_CD" });
    }

    #[test]
    fn family_codes() {
        assert_eq!(IndexFamily::Krx.mid_class_code(), "01");
        assert_eq!(IndexFamily::Theme.mid_class_code(), "04");
        assert_eq!(IndexFamily::Theme.label(), "테마");
    }
}
