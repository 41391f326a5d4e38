//! Column resolver.
//!
//! A column matches a role when its name contains one of the role's keywords
//! and none of its exclusions. Matching is case-sensitive; keywords made of
//! ASCII letters (ICD, PCR, ...) also match case-insensitively. When several
//! columns match, header order decides.

use lis_model::{LisError, Result, SemanticRole};

/// Substring test with the ASCII case-insensitive fallback.
pub fn contains_keyword(column: &str, keyword: &str) -> bool {
    if column.contains(keyword) {
        return true;
    }
    keyword.is_ascii()
        && keyword.chars().any(|ch| ch.is_ascii_alphabetic())
        && column
            .to_ascii_lowercase()
            .contains(&keyword.to_ascii_lowercase())
}

pub fn column_matches(column: &str, role: SemanticRole) -> bool {
    role.keywords()
        .iter()
        .any(|keyword| contains_keyword(column, keyword))
        && !role
            .excludes()
            .iter()
            .any(|keyword| contains_keyword(column, keyword))
}

/// All columns matching `role`, in header order.
pub fn resolve(header: &[String], role: SemanticRole) -> Vec<&str> {
    header
        .iter()
        .filter(|column| column_matches(column, role))
        .map(String::as_str)
        .collect()
}

/// First column matching `role`; `None` means the role is absent.
pub fn resolve_single(header: &[String], role: SemanticRole) -> Option<&str> {
    header
        .iter()
        .find(|column| column_matches(column, role))
        .map(String::as_str)
}

/// Like [`resolve_single`], but an absent role is a `MissingRequiredRole` error.
pub fn require<'a>(header: &'a [String], role: SemanticRole, table: &str) -> Result<&'a str> {
    resolve_single(header, role).ok_or_else(|| LisError::MissingRequiredRole {
        role,
        table: table.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| (*name).to_string()).collect()
    }

    #[test]
    fn first_match_in_header_order_wins() {
        let header = header(&["门诊日期", "就诊日期", "就诊结束日期"]);
        assert_eq!(resolve_single(&header, SemanticRole::VisitStart), Some("门诊日期"));
        assert_eq!(
            resolve(&header, SemanticRole::VisitStart),
            vec!["门诊日期", "就诊日期"]
        );
    }

    #[test]
    fn ascii_keywords_ignore_case() {
        let header = header(&["患者编号", "诊断icd码"]);
        assert_eq!(
            resolve_single(&header, SemanticRole::DiagnosisCode),
            Some("诊断icd码")
        );
    }

    #[test]
    fn exclusions_keep_diagnosis_text_off_the_code_column() {
        let header = header(&["诊断（ICD编码）", "诊断（文字）", "死亡诊断"]);
        assert_eq!(
            resolve(&header, SemanticRole::DiagnosisText),
            vec!["诊断（文字）"]
        );
    }

    #[test]
    fn missing_required_role_names_role_and_table() {
        let header = header(&["姓名"]);
        let error = require(&header, SemanticRole::PatientNumber, "门急诊信息")
            .expect_err("role is absent");
        assert_eq!(
            error.to_string(),
            "no column in '门急诊信息' matches required role patient-number"
        );
    }
}
