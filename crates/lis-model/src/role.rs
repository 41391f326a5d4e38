//! Semantic roles: abstract field meanings located in arbitrary source
//! headers by keyword containment.

use serde::{Deserialize, Serialize};

/// Keywords selecting the columns the time normalizer rewrites.
pub const DATE_COLUMN_KEYWORDS: &[&str] = &[
    "就诊日期",
    "开始日期",
    "门诊日期",
    "就诊结束日期",
    "结束日期",
    "出院日期",
    "入院日期",
    "住院开始日期",
    "住院结束日期",
    "检查日期",
    "检测日期",
    "用药日期",
    "出生日期",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SemanticRole {
    HospitalCode,
    HospitalName,
    PatientNumber,
    PatientName,
    Age,
    Gender,
    Department,
    VisitStart,
    VisitEnd,
    AdmissionDate,
    DischargeDate,
    DiagnosisCode,
    DiagnosisText,
    Region,
    BirthDate,
    Contact,
    Address,
    TestName,
    TestResult,
    TestDate,
    TestMethod,
    TestDepartment,
    DrugName,
    MedicationDate,
    Dosage,
    Frequency,
    Route,
}

impl SemanticRole {
    /// Ordered keyword list. A column matches when it contains any of them.
    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            SemanticRole::HospitalCode => &["医院编码", "医院代码", "机构编码"],
            SemanticRole::HospitalName => &["医院名称", "机构名称"],
            SemanticRole::PatientNumber => &[
                "患者编号",
                "患者ID",
                "病人ID",
                "病人编号",
                "就诊ID",
                "病历号",
            ],
            SemanticRole::PatientName => &["姓名"],
            SemanticRole::Age => &["年龄"],
            SemanticRole::Gender => &["性别"],
            SemanticRole::Department => &["就诊科室", "科室", "部门"],
            SemanticRole::VisitStart => &["就诊日期", "门诊日期", "开始日期"],
            SemanticRole::VisitEnd => &["就诊结束日期", "结束日期", "出院日期"],
            SemanticRole::AdmissionDate => &["入院日期", "住院开始日期"],
            SemanticRole::DischargeDate => &["出院日期", "住院结束日期"],
            SemanticRole::DiagnosisCode => &["ICD", "诊断编码", "疾病编码"],
            SemanticRole::DiagnosisText => &["诊断", "疾病", "病名"],
            SemanticRole::Region => &["地区", "区域"],
            SemanticRole::BirthDate => &["出生日期", "出生", "生日"],
            SemanticRole::Contact => &["联系方式", "联系", "电话", "手机"],
            SemanticRole::Address => &["家庭住址", "地址", "住址"],
            SemanticRole::TestName => &["检查名称", "检验名称", "项目名称"],
            SemanticRole::TestResult => &["检查结果", "检验结果", "结果"],
            SemanticRole::TestDate => &["检查日期", "检验日期", "采样日期", "日期"],
            SemanticRole::TestMethod => &["检查方法", "检验方法", "方法"],
            SemanticRole::TestDepartment => &["检查部门", "检验部门", "部门", "科室"],
            SemanticRole::DrugName => &["药物名称", "药品名称", "医嘱内容", "药名"],
            SemanticRole::MedicationDate => &["用药日期", "医嘱日期", "开始日期"],
            SemanticRole::Dosage => &["剂量", "单次用量", "用量"],
            SemanticRole::Frequency => &["频次"],
            SemanticRole::Route => &["用药途径", "给药途径", "途径"],
        }
    }

    /// Columns containing any of these never match the role, even when a
    /// keyword is present.
    pub fn excludes(self) -> &'static [&'static str] {
        match self {
            SemanticRole::Age => &["年龄段", "年龄组", "年龄分组"],
            SemanticRole::VisitStart => &["住院开始日期"],
            SemanticRole::VisitEnd => &["住院结束日期"],
            SemanticRole::DiagnosisText => &[
                "ICD",
                "编码",
                "死亡诊断",
                "诊断类型",
                "诊断医生",
                "诊断科室",
            ],
            SemanticRole::TestResult => &["结果类型", "结果判断"],
            SemanticRole::Department => &["医嘱科室", "诊断科室"],
            _ => &[],
        }
    }

    /// Stable kebab-case label used in errors and logs.
    pub fn label(self) -> &'static str {
        match self {
            SemanticRole::HospitalCode => "hospital-code",
            SemanticRole::HospitalName => "hospital-name",
            SemanticRole::PatientNumber => "patient-number",
            SemanticRole::PatientName => "patient-name",
            SemanticRole::Age => "age",
            SemanticRole::Gender => "gender",
            SemanticRole::Department => "department",
            SemanticRole::VisitStart => "visit-start-date",
            SemanticRole::VisitEnd => "visit-end-date",
            SemanticRole::AdmissionDate => "admission-date",
            SemanticRole::DischargeDate => "discharge-date",
            SemanticRole::DiagnosisCode => "diagnosis-code",
            SemanticRole::DiagnosisText => "diagnosis-text",
            SemanticRole::Region => "region",
            SemanticRole::BirthDate => "birth-date",
            SemanticRole::Contact => "contact",
            SemanticRole::Address => "address",
            SemanticRole::TestName => "test-name",
            SemanticRole::TestResult => "test-result",
            SemanticRole::TestDate => "test-date",
            SemanticRole::TestMethod => "test-method",
            SemanticRole::TestDepartment => "test-department",
            SemanticRole::DrugName => "drug-name",
            SemanticRole::MedicationDate => "medication-date",
            SemanticRole::Dosage => "dosage",
            SemanticRole::Frequency => "frequency",
            SemanticRole::Route => "route",
        }
    }
}

impl std::fmt::Display for SemanticRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
