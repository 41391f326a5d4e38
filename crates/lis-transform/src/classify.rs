//! Keyword classification of medication orders and examination records.

use std::sync::LazyLock;

use lis_map::contains_keyword;
use regex::Regex;

pub const ANTIVIRAL_KEYWORDS: &[&str] = &[
    "利巴韦林",
    "奥司他韦",
    "阿比多尔",
    "洛匹那韦",
    "利托那韦",
    "法匹拉韦",
    "瑞德西韦",
    "干扰素",
    "奈玛特韦",
    "莫诺拉韦",
    "阿兹夫定",
    "Paxlovid",
    "Kaletra",
];

pub const COVID_TEST_KEYWORDS: &[&str] =
    &["新冠", "冠状病毒", "COVID", "SARS-CoV-2", "核酸", "PCR", "抗原"];

static NEGATIVE_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)阴性|未检出|negative").expect("valid negative result regex")
});
static POSITIVE_RESULT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)阳性|检出|positive").expect("valid positive result regex")
});
static NUCLEIC_ACID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)核酸|PCR").expect("valid nucleic acid regex"));
static ANTIGEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)抗原|antigen").expect("valid antigen regex"));
static ANTIBODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)抗体|IgM|IgG").expect("valid antibody regex"));

/// Interpreted examination result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestOutcome {
    Positive,
    Negative,
    Unknown,
}

impl TestOutcome {
    pub fn label(self) -> &'static str {
        match self {
            TestOutcome::Positive => "阳性",
            TestOutcome::Negative => "阴性",
            TestOutcome::Unknown => "未知",
        }
    }

    /// Infection status implied by the result: confirmed, excluded or unknown.
    pub fn infection_status(self) -> &'static str {
        match self {
            TestOutcome::Positive => "确诊",
            TestOutcome::Negative => "排除",
            TestOutcome::Unknown => "未知",
        }
    }
}

pub fn is_antiviral(drug_name: &str) -> bool {
    ANTIVIRAL_KEYWORDS
        .iter()
        .any(|keyword| contains_keyword(drug_name, keyword))
}

pub fn is_covid_test(test_name: &str) -> bool {
    COVID_TEST_KEYWORDS
        .iter()
        .any(|keyword| contains_keyword(test_name, keyword))
}

/// Negative patterns are checked first: `未检出` contains `检出`.
pub fn classify_test_result(result: Option<&str>) -> TestOutcome {
    match result.map(str::trim) {
        Some(text) if NEGATIVE_RESULT.is_match(text) => TestOutcome::Negative,
        Some(text) if POSITIVE_RESULT.is_match(text) => TestOutcome::Positive,
        _ => TestOutcome::Unknown,
    }
}

/// Test method inferred from the examination name.
pub fn infer_test_method(test_name: &str) -> Option<&'static str> {
    if NUCLEIC_ACID.is_match(test_name) {
        Some("核酸检测")
    } else if ANTIGEN.is_match(test_name) {
        Some("抗原检测")
    } else if ANTIBODY.is_match(test_name) {
        Some("抗体检测")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn antiviral_names() {
        assert!(is_antiviral("磷酸奥司他韦胶囊"));
        assert!(is_antiviral("paxlovid"));
        assert!(!is_antiviral("阿莫西林"));
    }

    #[test]
    fn covid_tests() {
        assert!(is_covid_test("新型冠状病毒核酸检测"));
        assert!(is_covid_test("SARS-CoV-2 抗原"));
        assert!(is_covid_test("rt-pcr"));
        assert!(!is_covid_test("血常规"));
    }

    #[test]
    fn result_classification() {
        assert_eq!(classify_test_result(Some("阳性(+)")), TestOutcome::Positive);
        assert_eq!(classify_test_result(Some("检出")), TestOutcome::Positive);
        assert_eq!(classify_test_result(Some("未检出")), TestOutcome::Negative);
        assert_eq!(classify_test_result(Some("Negative")), TestOutcome::Negative);
        assert_eq!(classify_test_result(Some("待复查")), TestOutcome::Unknown);
        assert_eq!(classify_test_result(None), TestOutcome::Unknown);
    }

    #[test]
    fn method_inference() {
        assert_eq!(infer_test_method("新冠病毒核酸检测"), Some("核酸检测"));
        assert_eq!(infer_test_method("新冠抗原快检"), Some("抗原检测"));
        assert_eq!(infer_test_method("新冠IgM抗体"), Some("抗体检测"));
        assert_eq!(infer_test_method("胸部CT"), None);
    }
}
