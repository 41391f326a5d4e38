//! Canonical output sheets and raw source sheets.

use serde::{Deserialize, Serialize};

/// Column names shared by several canonical schemas.
pub mod columns {
    pub const HOSPITAL_CODE: &str = "医院编码";
    pub const HOSPITAL_NAME: &str = "医院名称";
    pub const PATIENT_NUMBER: &str = "患者编号";
    pub const PATIENT_KEY: &str = "患者唯一编码";
    pub const PATIENT_NAME: &str = "姓名";
    pub const SOURCE: &str = "来源";
    pub const AGE_YEARS: &str = "年龄（周岁）";
    pub const AGE: &str = "年龄";
    pub const GENDER: &str = "性别";
    pub const DEPARTMENT: &str = "就诊科室";
    pub const VISIT_CATEGORY: &str = "就诊类别";
    pub const VISIT_START: &str = "就诊日期";
    pub const VISIT_END: &str = "就诊结束日期";
    pub const DIAGNOSIS_CODE: &str = "诊断（ICD编码）";
    pub const DIAGNOSIS_TEXT: &str = "诊断（文字）";
    pub const ADMISSION_DATE: &str = "入院日期";
    pub const DISCHARGE_DATE: &str = "出院日期";
    pub const REGION: &str = "地区";
    pub const BIRTH_DATE: &str = "出生日期";
    pub const CONTACT: &str = "联系方式";
    pub const ADDRESS: &str = "家庭住址";
    pub const COVID_FLAG: &str = "新冠感染";
    pub const RS_FLAG: &str = "RS";
    pub const PNEUMONIA_FLAG: &str = "RS合并肺炎";
    pub const INFECTION_STATUS: &str = "感染状态";
    pub const DETECTION_METHOD: &str = "检测方法";
    pub const DETECTION_RESULT: &str = "检测结果";
    pub const DETECTION_DATE: &str = "检测日期";
    pub const DRUG_NAME: &str = "药物名称";
    pub const DRUG_TYPE: &str = "药物类型";
    pub const TEST_NAME: &str = "检查名称";
    pub const TEST_METHOD: &str = "检查方法";
    pub const TEST_DATE: &str = "检查日期";
    pub const TEST_RESULT: &str = "检查结果";
    pub const RESULT_TYPE: &str = "结果类型";
    pub const AGE_COHORT: &str = "年龄段";
    pub const POPULATION_CATEGORY: &str = "人群类别";
    pub const FIRST_VISIT: &str = "首次就诊日期";
    pub const LAST_VISIT: &str = "最近就诊日期";
    pub const VISIT_COUNT: &str = "就诊次数";
    pub const SOURCE_FILE: &str = "数据来源";
    pub const UPDATED_AT: &str = "数据更新时间";
}

/// Columns appended by the merger; never part of a canonical schema.
pub const PROVENANCE_COLUMNS: [&str; 2] = [columns::SOURCE_FILE, columns::UPDATED_AT];

const VISIT_SCHEMA: &[&str] = &[
    "医院编码",
    "医院名称",
    "患者编号",
    "患者唯一编码",
    "来源",
    "年龄（周岁）",
    "性别",
    "就诊科室",
    "就诊类别",
    "就诊日期",
    "就诊结束日期",
    "诊断（ICD编码）",
    "诊断（文字）",
    "主诉",
    "现病史（临床症状）",
    "既往新冠阳性次数",
    "上次感染日期",
    "疫苗接种次数",
    "末次接种日期",
    "是否收入院",
    "入院日期",
    "出院日期",
    "是否收入ICU",
    "入ICU日期",
    "出ICU日期",
    "是否死亡",
    "死亡诊断",
    "死亡日期",
];

const DIAGNOSIS_SCHEMA: &[&str] = &[
    "医院编码",
    "患者编号",
    "患者唯一编码",
    "姓名",
    "来源",
    "就诊科室",
    "就诊日期",
    "诊断（ICD编码）",
    "诊断（文字）",
    "诊断类型",
    "诊断医生",
];

const INFECTION_SCHEMA: &[&str] = &[
    "患者编号",
    "患者唯一编码",
    "姓名",
    "来源",
    "就诊日期",
    "诊断（ICD编码）",
    "诊断（文字）",
    "新冠感染",
    "RS",
    "RS合并肺炎",
    "感染状态",
    "检测方法",
    "检测结果",
    "检测日期",
];

const ANTIVIRAL_SCHEMA: &[&str] = &[
    "患者编号",
    "患者唯一编码",
    "姓名",
    "药物名称",
    "药物类型",
    "用药日期",
    "剂量",
    "单位",
    "频次",
    "用药途径",
    "用药天数",
    "医嘱医生",
    "医嘱科室",
];

const TESTING_SCHEMA: &[&str] = &[
    "患者编号",
    "患者唯一编码",
    "姓名",
    "检查名称",
    "检查方法",
    "检查日期",
    "检查结果",
    "结果类型",
    "CT值",
    "检查部门",
    "采样部位",
    "备注",
];

const POPULATION_SCHEMA: &[&str] = &[
    "患者编号",
    "患者唯一编码",
    "姓名",
    "年龄",
    "性别",
    "地区",
    "年龄段",
    "人群类别",
    "特殊人群标记",
    "备注",
];

const PATIENT_REGISTRY_SCHEMA: &[&str] = &[
    "患者唯一编码",
    "患者编号",
    "姓名",
    "年龄",
    "性别",
    "出生日期",
    "联系方式",
    "家庭住址",
    "首次就诊日期",
    "最近就诊日期",
    "就诊次数",
];

/// The seven canonical sheets of the reporting workbook, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SheetKind {
    VisitMerge,
    Diagnosis,
    InfectionTracking,
    AntiviralMedication,
    InfectionTesting,
    PopulationSegmentation,
    PatientRegistry,
}

impl SheetKind {
    pub const ALL: [SheetKind; 7] = [
        SheetKind::VisitMerge,
        SheetKind::Diagnosis,
        SheetKind::InfectionTracking,
        SheetKind::AntiviralMedication,
        SheetKind::InfectionTesting,
        SheetKind::PopulationSegmentation,
        SheetKind::PatientRegistry,
    ];

    /// Exact sheet name used in every workbook.
    pub fn sheet_name(self) -> &'static str {
        match self {
            SheetKind::VisitMerge => "Lis01_就诊合并",
            SheetKind::Diagnosis => "Lis02_诊断",
            SheetKind::InfectionTracking => "Lis03_新冠感染",
            SheetKind::AntiviralMedication => "Lis04_抗病毒药物",
            SheetKind::InfectionTesting => "Lis05_新冠检测",
            SheetKind::PopulationSegmentation => "Lis06_人群划分",
            SheetKind::PatientRegistry => "LisA1_唯一患者",
        }
    }

    pub fn from_sheet_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.sheet_name() == name.trim())
    }

    /// Canonical column order. Authoritative for processing and output.
    pub fn schema(self) -> &'static [&'static str] {
        match self {
            SheetKind::VisitMerge => VISIT_SCHEMA,
            SheetKind::Diagnosis => DIAGNOSIS_SCHEMA,
            SheetKind::InfectionTracking => INFECTION_SCHEMA,
            SheetKind::AntiviralMedication => ANTIVIRAL_SCHEMA,
            SheetKind::InfectionTesting => TESTING_SCHEMA,
            SheetKind::PopulationSegmentation => POPULATION_SCHEMA,
            SheetKind::PatientRegistry => PATIENT_REGISTRY_SCHEMA,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SheetKind::VisitMerge => "Outpatient and inpatient visits",
            SheetKind::Diagnosis => "Visit diagnoses",
            SheetKind::InfectionTracking => "COVID infection and respiratory syndrome flags",
            SheetKind::AntiviralMedication => "Antiviral medication orders",
            SheetKind::InfectionTesting => "COVID test results",
            SheetKind::PopulationSegmentation => "Age cohorts and population categories",
            SheetKind::PatientRegistry => "One row per unique patient",
        }
    }

    /// Raw source sheets this canonical sheet cannot be built without.
    pub fn required_sources(self) -> &'static [SourceSheet] {
        match self {
            SheetKind::VisitMerge
            | SheetKind::Diagnosis
            | SheetKind::InfectionTracking
            | SheetKind::PopulationSegmentation
            | SheetKind::PatientRegistry => &[SourceSheet::Outpatient, SourceSheet::Inpatient],
            SheetKind::AntiviralMedication => &[SourceSheet::Medication],
            SheetKind::InfectionTesting => &[SourceSheet::Examination],
        }
    }
}

impl std::fmt::Display for SheetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}

/// Raw sheets found in per-hospital input workbooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceSheet {
    Outpatient,
    Inpatient,
    Medication,
    Examination,
    Statistics,
}

impl SourceSheet {
    pub fn sheet_name(self) -> &'static str {
        match self {
            SourceSheet::Outpatient => "门急诊信息",
            SourceSheet::Inpatient => "住院信息",
            SourceSheet::Medication => "药物医嘱信息",
            SourceSheet::Examination => "检查信息",
            SourceSheet::Statistics => "统计数据",
        }
    }

    /// Literal written to the visit source column for rows from this sheet.
    pub fn source_label(self) -> Option<&'static str> {
        match self {
            SourceSheet::Outpatient => Some("门急诊"),
            SourceSheet::Inpatient => Some("住院"),
            SourceSheet::Examination => Some("检查"),
            SourceSheet::Medication | SourceSheet::Statistics => None,
        }
    }
}

impl std::fmt::Display for SourceSheet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.sheet_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn visit_schema_has_28_columns() {
        assert_eq!(SheetKind::VisitMerge.schema().len(), 28);
    }

    #[test]
    fn schemas_have_unique_columns_and_no_provenance() {
        for kind in SheetKind::ALL {
            let unique: BTreeSet<_> = kind.schema().iter().collect();
            assert_eq!(unique.len(), kind.schema().len(), "{kind}");
            for column in PROVENANCE_COLUMNS {
                assert!(!kind.schema().contains(&column), "{kind}");
            }
        }
    }

    #[test]
    fn sheet_names_round_trip() {
        for kind in SheetKind::ALL {
            assert_eq!(SheetKind::from_sheet_name(kind.sheet_name()), Some(kind));
        }
        assert_eq!(SheetKind::from_sheet_name("Sheet1"), None);
    }
}
