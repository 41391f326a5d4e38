//! Record projector.
//!
//! Every target column is filled from the first applicable source, in this
//! priority order:
//!
//! 1. a literal override (which may be `Null`),
//! 2. the source column resolved for the role bound to the target,
//! 3. a source column with exactly the target's name,
//! 4. `Null`.
//!
//! One output row is produced per input row, in input order, and the output
//! header is the plan's schema exactly.

use lis_model::{CellValue, Result, Row, SemanticRole, Table};

use crate::resolver::{require, resolve_single};

#[derive(Debug, Clone, Default)]
pub struct ProjectionPlan {
    schema: Vec<String>,
    bindings: Vec<(String, SemanticRole)>,
    overrides: Vec<(String, CellValue)>,
    required: Vec<SemanticRole>,
}

impl ProjectionPlan {
    pub fn new(schema: &[&str]) -> Self {
        Self {
            schema: schema.iter().map(|name| (*name).to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    /// Fills `target` from the column resolved for `role`.
    ///
    /// Targets outside the schema are ignored. A later binding for the same
    /// target replaces an earlier one.
    #[must_use]
    pub fn bind(mut self, target: &str, role: SemanticRole) -> Self {
        if self.has_target(target) {
            self.bindings.retain(|(existing, _)| existing != target);
            self.bindings.push((target.to_string(), role));
        }
        self
    }

    /// Sets `target` to the same literal on every row.
    #[must_use]
    pub fn literal(mut self, target: &str, value: impl Into<CellValue>) -> Self {
        if self.has_target(target) {
            self.overrides.retain(|(existing, _)| existing != target);
            self.overrides.push((target.to_string(), value.into()));
        }
        self
    }

    /// Forces `target` to `Null` regardless of the source.
    #[must_use]
    pub fn null(self, target: &str) -> Self {
        self.literal(target, CellValue::Null)
    }

    /// Fails projection when the source has no column for `role`.
    #[must_use]
    pub fn require(mut self, role: SemanticRole) -> Self {
        if !self.required.contains(&role) {
            self.required.push(role);
        }
        self
    }

    pub fn required_roles(&self) -> &[SemanticRole] {
        &self.required
    }

    fn has_target(&self, target: &str) -> bool {
        self.schema.iter().any(|column| column == target)
    }

    fn binding(&self, target: &str) -> Option<SemanticRole> {
        self.bindings
            .iter()
            .find(|(column, _)| column == target)
            .map(|(_, role)| *role)
    }

    fn literal_for(&self, target: &str) -> Option<&CellValue> {
        self.overrides
            .iter()
            .find(|(column, _)| column == target)
            .map(|(_, value)| value)
    }
}

#[derive(Debug, Clone)]
enum Fill {
    Literal(CellValue),
    Column(usize),
    Null,
}

/// Projects `source` onto `plan`'s schema.
///
/// `source_name` identifies the source table in errors.
pub fn project(source: &Table, source_name: &str, plan: &ProjectionPlan) -> Result<Table> {
    let header = source.columns();
    for role in plan.required_roles() {
        require(header, *role, source_name)?;
    }

    let fills: Vec<Fill> = plan
        .schema()
        .iter()
        .map(|target| {
            if let Some(value) = plan.literal_for(target) {
                return Fill::Literal(value.clone());
            }
            let bound = plan
                .binding(target)
                .and_then(|role| resolve_single(header, role))
                .and_then(|column| source.column_index(column));
            match bound.or_else(|| source.column_index(target)) {
                Some(index) => Fill::Column(index),
                None => Fill::Null,
            }
        })
        .collect();

    tracing::trace!(
        source = source_name,
        rows = source.len(),
        filled = fills.iter().filter(|fill| !matches!(fill, Fill::Null)).count(),
        targets = fills.len(),
        "projecting table"
    );

    let mut projected = Table::new(plan.schema().to_vec());
    for row in source.rows() {
        let values: Row = fills
            .iter()
            .map(|fill| match fill {
                Fill::Literal(value) => value.clone(),
                Fill::Column(index) => row.get(*index).cloned().unwrap_or_default(),
                Fill::Null => CellValue::Null,
            })
            .collect();
        projected.push_row(values);
    }
    Ok(projected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Table {
        let mut table = Table::with_schema(&["病人ID", "门诊日期", "性别", "额外"]);
        table.push_row(vec![
            CellValue::from("P001"),
            CellValue::from("2023-01-05"),
            CellValue::from("男"),
            CellValue::from("x"),
        ]);
        table
    }

    #[test]
    fn priority_literal_role_same_name_null() {
        let plan = ProjectionPlan::new(&["患者编号", "就诊日期", "性别", "来源", "主诉"])
            .bind("患者编号", SemanticRole::PatientNumber)
            .bind("就诊日期", SemanticRole::VisitStart)
            .bind("性别", SemanticRole::Gender)
            .literal("来源", "门急诊")
            .literal("性别", CellValue::Null);
        let projected = project(&source(), "门急诊信息", &plan).expect("project");
        assert_eq!(projected.columns(), plan.schema());
        let row = &projected.rows()[0];
        assert_eq!(row[0], CellValue::from("P001"));
        assert_eq!(row[1], CellValue::from("2023-01-05"));
        assert_eq!(row[2], CellValue::Null);
        assert_eq!(row[3], CellValue::from("门急诊"));
        assert_eq!(row[4], CellValue::Null);
    }

    #[test]
    fn unresolved_binding_falls_back_to_same_name() {
        let plan = ProjectionPlan::new(&["额外"]).bind("额外", SemanticRole::Region);
        let projected = project(&source(), "src", &plan).expect("project");
        assert_eq!(projected.value(0, "额外"), Some(&CellValue::from("x")));
    }

    #[test]
    fn missing_required_role_fails() {
        let plan = ProjectionPlan::new(&["入院日期"]).require(SemanticRole::AdmissionDate);
        assert!(project(&source(), "住院信息", &plan).is_err());
    }

    #[test]
    fn bindings_outside_schema_are_ignored() {
        let plan = ProjectionPlan::new(&["性别"]).bind("年龄", SemanticRole::Age);
        let projected = project(&source(), "src", &plan).expect("project");
        assert_eq!(projected.columns(), ["性别"]);
    }
}
