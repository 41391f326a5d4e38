//! Derived-field rules.
//!
//! Pure functions of already-projected values, plus helpers applying them to
//! the matching columns of a table. Age rules work on the numeric age, never
//! on rendered text.

use lis_map::contains_keyword;
use lis_model::{CellValue, Table, columns};

/// Institution code used when a row carries none.
pub const DEFAULT_HOSPITAL_CODE: &str = "030";

/// Respiratory-syndrome ICD codes.
pub const RS_CODES: &[&str] = &[
    "R50", "J00", "J01", "J02", "J03", "J04", "J05", "J06", "J09", "J10", "J11", "J12", "J13",
    "J14", "J15", "J16", "J17", "J18", "J20", "J21", "J98.414", "J98.802",
];

const COVID_DIAGNOSIS: &str = "新型冠状病毒感染";
const PNEUMONIA_TERMS: &[&str] = &["肺部感染", "肺炎"];
const YES: &str = "是";
const NO: &str = "否";

/// How a diagnosis code is compared against [`RS_CODES`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RsMatchPolicy {
    /// The whole code equals a listed code.
    #[default]
    Exact,
    /// The code contains a listed code anywhere.
    Substring,
}

// Exact matching pending confirmation that J18.9-style subcodes should count.
pub const RS_MATCH_POLICY: RsMatchPolicy = RsMatchPolicy::Exact;

pub fn flag_label(flag: bool) -> &'static str {
    if flag { YES } else { NO }
}

pub fn hospital_code(value: &CellValue) -> CellValue {
    if value.is_blank() {
        CellValue::Text(DEFAULT_HOSPITAL_CODE.to_string())
    } else {
        value.clone()
    }
}

/// `{hospital_code}-{patient_number}`, or `Null` without a patient number.
pub fn patient_key(hospital_code: &CellValue, patient_number: &CellValue) -> CellValue {
    let Some(number) = patient_number.trimmed() else {
        return CellValue::Null;
    };
    let code = hospital_code
        .trimmed()
        .unwrap_or_else(|| DEFAULT_HOSPITAL_CODE.to_string());
    CellValue::Text(format!("{code}-{number}"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitCategory {
    Icu,
    FeverClinic,
    Emergency,
    Outpatient,
    Inpatient,
}

impl VisitCategory {
    pub fn label(self) -> &'static str {
        match self {
            VisitCategory::Icu => "ICU",
            VisitCategory::FeverClinic => "发热门诊(F)",
            VisitCategory::Emergency => "急诊(E)",
            VisitCategory::Outpatient => "门诊(O)",
            VisitCategory::Inpatient => "住院(H)",
        }
    }
}

/// First matching rule wins: ICU department, fever clinic, emergency, then
/// the visit source.
pub fn visit_category(department: Option<&str>, source: Option<&str>) -> Option<VisitCategory> {
    let department = department.unwrap_or_default();
    if contains_keyword(department, "ICU") {
        return Some(VisitCategory::Icu);
    }
    if department.contains("发热") {
        return Some(VisitCategory::FeverClinic);
    }
    if department.contains("急诊") {
        return Some(VisitCategory::Emergency);
    }
    match source.map(str::trim) {
        Some("门急诊") => Some(VisitCategory::Outpatient),
        Some("住院") => Some(VisitCategory::Inpatient),
        _ => None,
    }
}

pub fn covid_positive(diagnosis_text: Option<&str>) -> bool {
    diagnosis_text.is_some_and(|text| text.contains(COVID_DIAGNOSIS))
}

pub fn rs_flag(diagnosis_code: Option<&str>, policy: RsMatchPolicy) -> bool {
    let Some(code) = diagnosis_code.map(|code| code.trim().to_ascii_uppercase()) else {
        return false;
    };
    if code.is_empty() {
        return false;
    }
    match policy {
        RsMatchPolicy::Exact => RS_CODES.contains(&code.as_str()),
        RsMatchPolicy::Substring => RS_CODES.iter().any(|rs| code.contains(rs)),
    }
}

/// Pneumonia comorbidity; always false when the RS flag is false.
pub fn pneumonia_flag(rs: bool, diagnosis_text: Option<&str>) -> bool {
    rs && diagnosis_text
        .is_some_and(|text| PNEUMONIA_TERMS.iter().any(|term| text.contains(term)))
}

/// Numeric age in years. Accepts numbers and text such as `70`, `70岁`,
/// `70 周岁`.
pub fn parse_age(value: &CellValue) -> Option<f64> {
    let age = match value {
        CellValue::Number(age) => *age,
        CellValue::Text(text) => text
            .trim()
            .trim_end_matches("岁")
            .trim_end_matches("周")
            .trim()
            .parse::<f64>()
            .ok()?,
        _ => return None,
    };
    (age.is_finite() && age >= 0.0).then_some(age)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeCohort {
    Infant,
    Preschool,
    Child,
    Adolescent,
    YoungAdult,
    MiddleAge,
    Elderly,
    OldestOld,
    Unknown,
}

impl AgeCohort {
    pub fn label(self) -> &'static str {
        match self {
            AgeCohort::Infant => "婴幼儿(0-2岁)",
            AgeCohort::Preschool => "学龄前(3-5岁)",
            AgeCohort::Child => "儿童(6-11岁)",
            AgeCohort::Adolescent => "青少年(12-17岁)",
            AgeCohort::YoungAdult => "青年(18-34岁)",
            AgeCohort::MiddleAge => "中年(35-59岁)",
            AgeCohort::Elderly => "老年(60-79岁)",
            AgeCohort::OldestOld => "高龄老人(80岁以上)",
            AgeCohort::Unknown => "未知",
        }
    }
}

pub fn age_cohort(age: Option<f64>) -> AgeCohort {
    match age {
        None => AgeCohort::Unknown,
        Some(age) if age < 3.0 => AgeCohort::Infant,
        Some(age) if age < 6.0 => AgeCohort::Preschool,
        Some(age) if age < 12.0 => AgeCohort::Child,
        Some(age) if age < 18.0 => AgeCohort::Adolescent,
        Some(age) if age < 35.0 => AgeCohort::YoungAdult,
        Some(age) if age < 60.0 => AgeCohort::MiddleAge,
        Some(age) if age < 80.0 => AgeCohort::Elderly,
        Some(_) => AgeCohort::OldestOld,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulationCategory {
    Elderly,
    Adult,
    ChildAdolescent,
    Male,
    Female,
    Unclassified,
}

impl PopulationCategory {
    pub fn label(self) -> &'static str {
        match self {
            PopulationCategory::Elderly => "老年人",
            PopulationCategory::Adult => "成年人",
            PopulationCategory::ChildAdolescent => "儿童青少年",
            PopulationCategory::Male => "男性",
            PopulationCategory::Female => "女性",
            PopulationCategory::Unclassified => "未分类",
        }
    }
}

/// Age decides when known; gender is only the fallback for unknown ages.
pub fn population_category(age: Option<f64>, gender: Option<&str>) -> PopulationCategory {
    match age {
        Some(age) if age >= 65.0 => PopulationCategory::Elderly,
        Some(age) if age >= 18.0 => PopulationCategory::Adult,
        Some(_) => PopulationCategory::ChildAdolescent,
        None => match gender.map(|gender| gender.trim().to_ascii_lowercase()).as_deref() {
            Some("男" | "男性" | "m" | "male") => PopulationCategory::Male,
            Some("女" | "女性" | "f" | "female") => PopulationCategory::Female,
            _ => PopulationCategory::Unclassified,
        },
    }
}

fn text_at(row: &[CellValue], index: Option<usize>) -> Option<String> {
    index.and_then(|index| row.get(index)).and_then(CellValue::trimmed)
}

fn set_at(row: &mut [CellValue], index: Option<usize>, value: CellValue) {
    if let Some(cell) = index.and_then(|index| row.get_mut(index)) {
        *cell = value;
    }
}

/// Hospital default, patient unique key and visit category, for whichever
/// of those columns the table has.
pub fn derive_visit_fields(table: &mut Table) {
    let code = table.column_index(columns::HOSPITAL_CODE);
    let number = table.column_index(columns::PATIENT_NUMBER);
    let key = table.column_index(columns::PATIENT_KEY);
    let department = table.column_index(columns::DEPARTMENT);
    let source = table.column_index(columns::SOURCE);
    let category = table.column_index(columns::VISIT_CATEGORY);
    for row in table.rows_mut() {
        let hospital = hospital_code(
            &code
                .and_then(|index| row.get(index).cloned())
                .unwrap_or_default(),
        );
        let patient = number
            .and_then(|index| row.get(index).cloned())
            .unwrap_or_default();
        let derived_key = patient_key(&hospital, &patient);
        let derived_category = visit_category(
            text_at(row, department).as_deref(),
            text_at(row, source).as_deref(),
        )
        .map_or(CellValue::Null, |category| CellValue::from(category.label()));
        set_at(row, code, hospital);
        set_at(row, key, derived_key);
        set_at(row, category, derived_category);
    }
}

/// COVID, RS and pneumonia flags into their canonical columns.
pub fn derive_infection_flags(table: &mut Table, policy: RsMatchPolicy) {
    let text = table.column_index(columns::DIAGNOSIS_TEXT);
    let code = table.column_index(columns::DIAGNOSIS_CODE);
    let covid = table.column_index(columns::COVID_FLAG);
    let rs = table.column_index(columns::RS_FLAG);
    let pneumonia = table.column_index(columns::PNEUMONIA_FLAG);
    for row in table.rows_mut() {
        let diagnosis = text_at(row, text);
        let is_rs = rs_flag(text_at(row, code).as_deref(), policy);
        let has_pneumonia = pneumonia_flag(is_rs, diagnosis.as_deref());
        set_at(
            row,
            covid,
            CellValue::from(flag_label(covid_positive(diagnosis.as_deref()))),
        );
        set_at(row, rs, CellValue::from(flag_label(is_rs)));
        set_at(row, pneumonia, CellValue::from(flag_label(has_pneumonia)));
    }
}

/// Age cohort and population category, reading `age_column` for the age.
pub fn derive_population_fields(table: &mut Table, age_column: &str) {
    let age = table.column_index(age_column);
    let gender = table.column_index(columns::GENDER);
    let cohort = table.column_index(columns::AGE_COHORT);
    let category = table.column_index(columns::POPULATION_CATEGORY);
    for row in table.rows_mut() {
        let years = age.and_then(|index| row.get(index)).and_then(parse_age);
        let sex = text_at(row, gender);
        set_at(row, cohort, CellValue::from(age_cohort(years).label()));
        set_at(
            row,
            category,
            CellValue::from(population_category(years, sex.as_deref()).label()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visit_category_priority() {
        assert_eq!(
            visit_category(Some("急诊科(emergency)"), Some("门急诊")),
            Some(VisitCategory::Emergency)
        );
        assert_eq!(
            visit_category(Some("内科(internal medicine)"), Some("住院")),
            Some(VisitCategory::Inpatient)
        );
        assert_eq!(
            visit_category(Some("急诊icu"), Some("门急诊")),
            Some(VisitCategory::Icu)
        );
        assert_eq!(
            visit_category(Some("发热门诊"), Some("住院")),
            Some(VisitCategory::FeverClinic)
        );
        assert_eq!(
            visit_category(Some("呼吸科"), Some("门急诊")),
            Some(VisitCategory::Outpatient)
        );
        assert_eq!(visit_category(Some("呼吸科"), None), None);
        assert_eq!(visit_category(None, None), None);
    }

    #[test]
    fn rs_policies_differ_on_subcodes() {
        assert!(rs_flag(Some("J18"), RsMatchPolicy::Exact));
        assert!(rs_flag(Some(" j18 "), RsMatchPolicy::Exact));
        assert!(!rs_flag(Some("J18.900"), RsMatchPolicy::Exact));
        assert!(rs_flag(Some("J18.900"), RsMatchPolicy::Substring));
        assert!(!rs_flag(Some("J45"), RsMatchPolicy::Substring));
        assert!(!rs_flag(None, RsMatchPolicy::Exact));
    }

    #[test]
    fn pneumonia_requires_rs() {
        assert!(pneumonia_flag(true, Some("肺部感染(J18)")));
        assert!(!pneumonia_flag(false, Some("肺部感染(J18)")));
        assert!(!pneumonia_flag(true, Some("上呼吸道感染")));
    }

    #[test]
    fn age_cohort_bins() {
        assert_eq!(age_cohort(Some(70.0)).label(), "老年(60-79岁)");
        assert_eq!(age_cohort(Some(2.9)), AgeCohort::Infant);
        assert_eq!(age_cohort(Some(3.0)), AgeCohort::Preschool);
        assert_eq!(age_cohort(Some(80.0)), AgeCohort::OldestOld);
        assert_eq!(age_cohort(None).label(), "未知");
    }

    #[test]
    fn population_falls_back_to_gender() {
        assert_eq!(population_category(Some(65.0), Some("女")), PopulationCategory::Elderly);
        assert_eq!(population_category(Some(17.0), None), PopulationCategory::ChildAdolescent);
        assert_eq!(population_category(None, Some("男")), PopulationCategory::Male);
        assert_eq!(population_category(None, Some("女")), PopulationCategory::Female);
        assert_eq!(population_category(None, None), PopulationCategory::Unclassified);
    }

    #[test]
    fn age_parsing() {
        assert_eq!(parse_age(&CellValue::from("70岁")), Some(70.0));
        assert_eq!(parse_age(&CellValue::from("45 周岁")), Some(45.0));
        assert_eq!(parse_age(&CellValue::Number(3.0)), Some(3.0));
        assert_eq!(parse_age(&CellValue::from("unknown")), None);
        assert_eq!(parse_age(&CellValue::from("-1")), None);
    }

    #[test]
    fn patient_key_uses_default_code() {
        assert_eq!(
            patient_key(&CellValue::Null, &CellValue::from("P001")),
            CellValue::from("030-P001")
        );
        assert_eq!(
            patient_key(&CellValue::from("031"), &CellValue::Number(1001.0)),
            CellValue::from("031-1001")
        );
        assert_eq!(patient_key(&CellValue::from("031"), &CellValue::Null), CellValue::Null);
    }
}
