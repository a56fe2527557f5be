// ==========================================
// 业务管理套件 - 校验器
// ==========================================
// 职责: 执行实体规则集，逐行分类 valid / hasWarnings / hasErrors
//       批内重复检测 + 已存在记录检测
// 红线: 必填字段违规为 Error，可选字段违规为 Warning
// 红线: 校验不做冲突处置决定（由 ImportExecutor 按策略处理）
// ==========================================

use crate::domain::{
    ColumnMapping, DuplicateGroup, ExistingMatch, FieldIssue, MappedRow, MappingIssueKind,
    RawRow, RowStatus, Severity, ValidationOutcome,
};
use crate::i18n::{t, t_with_args};
use crate::importer::mappers::{check_mapping, field_label, EntityMapper, ProjectionContext};
use crate::importer::patterns::{self, PHONE, URL};
use crate::importer::rules::{FieldKind, FieldRule, RuleSet};
use crate::importer::transformers::FieldTransformer;
use crate::repository::{RecordStore, RepositoryResult};
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// ==========================================
// Validator
// ==========================================
pub struct Validator<'a> {
    mapper: &'a dyn EntityMapper,
    rules: RuleSet,
    transformer: &'a FieldTransformer,
}

impl<'a> Validator<'a> {
    /// 使用映射器自带规则集
    pub fn new(mapper: &'a dyn EntityMapper, transformer: &'a FieldTransformer) -> Self {
        Self::with_rules(mapper, transformer, mapper.rules())
    }

    /// 使用自定义规则集
    pub fn with_rules(
        mapper: &'a dyn EntityMapper,
        transformer: &'a FieldTransformer,
        rules: RuleSet,
    ) -> Self {
        Self {
            mapper,
            rules,
            transformer,
        }
    }

    /// 校验全部行
    ///
    /// # 流程
    /// 1. 映射检查（必填未映射 / 目标重复映射 / 未知目标）
    /// 2. 逐行: 未映射必填字段 → 每行一条错误；字段规则；行级规则
    /// 3. 批内重复分组
    /// 4. 计算导入开关
    #[instrument(skip_all, fields(entity = %self.mapper.entity_type(), rows = rows.len()))]
    pub fn validate(&self, rows: &[RawRow], mapping: &ColumnMapping) -> ValidationOutcome {
        let mapping_errors = check_mapping(mapping, self.mapper);
        let unmapped_required: Vec<&str> = mapping_errors
            .iter()
            .filter(|issue| issue.kind == MappingIssueKind::RequiredFieldUnmapped)
            .map(|issue| issue.field.as_str())
            .collect();

        let mut outcome = ValidationOutcome {
            total_rows: rows.len(),
            row_statuses: Vec::with_capacity(rows.len()),
            valid_rows: Vec::new(),
            invalid_rows: Vec::new(),
            warning_rows: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            mapping_errors: Vec::new(),
            duplicates: Vec::new(),
            existing: Vec::new(),
            can_import: false,
            can_import_with_skip: false,
        };

        let mapped_rows: Vec<MappedRow> = rows.iter().map(|row| mapping.apply(row)).collect();

        for (row_index, row) in mapped_rows.iter().enumerate() {
            let mut issues = Vec::new();

            for field in &unmapped_required {
                issues.push(FieldIssue {
                    row_index,
                    field: field.to_string(),
                    value: String::new(),
                    message: t_with_args(
                        "validation.required_unmapped",
                        &[("field", field_label(self.mapper, field))],
                    ),
                    severity: Severity::Error,
                });
            }

            for rule in &self.rules.rules {
                if unmapped_required.contains(&rule.field) {
                    continue;
                }
                let value = row.get(rule.field).map(|v| v.trim()).unwrap_or("");
                if let Some(issue) = self.check_field(rule, value, row_index) {
                    issues.push(issue);
                }
            }

            for row_rule in &self.rules.row_rules {
                if !(row_rule.check)(row, self.transformer) {
                    issues.push(FieldIssue {
                        row_index,
                        field: row_rule.field.to_string(),
                        value: row.get(row_rule.field).cloned().unwrap_or_default(),
                        message: t(row_rule.message_key),
                        severity: row_rule.severity,
                    });
                }
            }

            let has_errors = issues.iter().any(|i| i.severity == Severity::Error);
            let has_warnings = issues.iter().any(|i| i.severity == Severity::Warning);
            let status = if has_errors {
                RowStatus::HasErrors
            } else if has_warnings {
                RowStatus::HasWarnings
            } else {
                RowStatus::Valid
            };

            match status {
                RowStatus::HasErrors => outcome.invalid_rows.push(row_index),
                RowStatus::HasWarnings => {
                    outcome.valid_rows.push(row_index);
                    outcome.warning_rows.push(row_index);
                }
                RowStatus::Valid => outcome.valid_rows.push(row_index),
            }
            outcome.row_statuses.push(status);

            for issue in issues {
                match issue.severity {
                    Severity::Error => outcome.errors.push(issue),
                    Severity::Warning => outcome.warnings.push(issue),
                }
            }
        }

        outcome.duplicates = self.find_duplicates(&mapped_rows, mapping);
        outcome.mapping_errors = mapping_errors;
        outcome.refresh_flags();

        info!(
            valid = outcome.valid_rows.len(),
            invalid = outcome.invalid_rows.len(),
            warnings = outcome.warning_rows.len(),
            duplicates = outcome.duplicates.len(),
            mapping_errors = outcome.mapping_errors.len(),
            "校验完成"
        );
        outcome
    }

    /// 单字段检查，返回首个违规
    ///
    /// 顺序: 必填 → 类型 → 数值范围 → 长度 → 正则 → 自定义
    fn check_field(&self, rule: &FieldRule, value: &str, row_index: usize) -> Option<FieldIssue> {
        let issue = |severity: Severity, message: String| FieldIssue {
            row_index,
            field: rule.field.to_string(),
            value: value.to_string(),
            message,
            severity,
        };

        if value.is_empty() {
            return rule.required.then(|| {
                issue(
                    Severity::Error,
                    t_with_args(
                        "validation.required",
                        &[("field", field_label(self.mapper, rule.field))],
                    ),
                )
            });
        }

        let severity = if rule.required {
            Severity::Error
        } else {
            Severity::Warning
        };

        let numeric = match self.check_kind(rule.kind, value) {
            Ok(numeric) => numeric,
            Err(key) => return Some(issue(severity, t(key))),
        };

        if let Some(number) = numeric {
            if let Some(min) = rule.min.filter(|min| number < *min) {
                return Some(issue(
                    severity,
                    t_with_args("validation.below_min", &[("min", format_bound(min).as_str())]),
                ));
            }
            if let Some(max) = rule.max.filter(|max| number > *max) {
                return Some(issue(
                    severity,
                    t_with_args("validation.above_max", &[("max", format_bound(max).as_str())]),
                ));
            }
        }

        let length = value.chars().count();
        if let Some(min_len) = rule.min_len.filter(|min_len| length < *min_len) {
            return Some(issue(
                severity,
                t_with_args("validation.too_short", &[("min", min_len.to_string().as_str())]),
            ));
        }
        if let Some(max_len) = rule.max_len.filter(|max_len| length > *max_len) {
            return Some(issue(
                severity,
                t_with_args("validation.too_long", &[("max", max_len.to_string().as_str())]),
            ));
        }

        if let Some(pattern) = rule.pattern {
            if !patterns::is_match(pattern, value) {
                return Some(issue(severity, t("validation.pattern_mismatch")));
            }
        }

        if let Some(check) = rule.custom {
            if let Some(key) = check(value, self.transformer) {
                return Some(issue(severity, t(key)));
            }
        }

        None
    }

    /// 类型检查
    ///
    /// # 返回
    /// - Ok(Some(n)): 数值型字段的解析值（供范围检查）
    /// - Ok(None): 非数值型字段通过
    /// - Err(key): 失败消息键
    fn check_kind(&self, kind: FieldKind, value: &str) -> Result<Option<f64>, &'static str> {
        let tf = self.transformer;
        let passed = |ok: bool, key: &'static str| -> Result<Option<f64>, &'static str> {
            if ok {
                Ok(None)
            } else {
                Err(key)
            }
        };

        match kind {
            FieldKind::Text => Ok(None),
            FieldKind::Title => passed(
                !FieldTransformer::slugify(value).is_empty(),
                "validation.invalid_title",
            ),
            FieldKind::Email => passed(
                FieldTransformer::normalize_email(value).is_some(),
                "validation.invalid_email",
            ),
            FieldKind::Phone => passed(
                patterns::is_match(&PHONE, value) && tf.normalize_phone(value).is_some(),
                "validation.invalid_phone",
            ),
            FieldKind::CompanyId => passed(
                FieldTransformer::normalize_ico(value).is_some(),
                "validation.invalid_ico",
            ),
            FieldKind::VatId => passed(tf.normalize_dic(value).is_some(), "validation.invalid_dic"),
            FieldKind::Date => passed(tf.parse_date(value).is_some(), "validation.invalid_date"),
            FieldKind::Number => tf
                .parse_number(value)
                .map(Some)
                .ok_or("validation.invalid_number"),
            FieldKind::Money => tf
                .parse_money(value)
                .map(|v| Some(v as f64))
                .ok_or("validation.invalid_money"),
            FieldKind::Duration => FieldTransformer::parse_duration(value)
                .map(|v| Some(f64::from(v)))
                .ok_or("validation.invalid_duration"),
            FieldKind::Gps => passed(
                FieldTransformer::parse_gps(value).is_some(),
                "validation.invalid_gps",
            ),
            FieldKind::Url => passed(patterns::is_match(&URL, value), "validation.invalid_url"),
        }
    }

    // ==========================================
    // 批内重复
    // ==========================================

    /// 按 unique 字段分组（值先规范化再比较），保留首次出现顺序
    fn find_duplicates(&self, rows: &[MappedRow], mapping: &ColumnMapping) -> Vec<DuplicateGroup> {
        let mut groups = Vec::new();

        for field in &self.rules.unique_fields {
            if !mapping.is_mapped(field) {
                continue;
            }
            let kind = self.rules.rule_for(field).map(|r| r.kind);

            let mut order: Vec<String> = Vec::new();
            let mut seen: HashMap<String, (String, Vec<usize>)> = HashMap::new();
            for (row_index, row) in rows.iter().enumerate() {
                let Some(raw) = row.get(*field).map(|v| v.trim()).filter(|v| !v.is_empty())
                else {
                    continue;
                };
                let key = self.comparison_key(kind, raw);
                seen.entry(key.clone())
                    .or_insert_with(|| {
                        order.push(key);
                        (raw.to_string(), Vec::new())
                    })
                    .1
                    .push(row_index);
            }

            for key in order {
                if let Some((value, rows)) = seen.remove(&key) {
                    if rows.len() > 1 {
                        debug!(field = %field, value = %value, count = rows.len(), "批内重复");
                        groups.push(DuplicateGroup {
                            field: field.to_string(),
                            value,
                            rows,
                        });
                    }
                }
            }
        }

        groups
    }

    fn comparison_key(&self, kind: Option<FieldKind>, raw: &str) -> String {
        let tf = self.transformer;
        let normalized = match kind {
            Some(FieldKind::Email) => FieldTransformer::normalize_email(raw),
            Some(FieldKind::Phone) => tf.normalize_phone(raw),
            Some(FieldKind::CompanyId) => FieldTransformer::normalize_ico(raw),
            Some(FieldKind::VatId) => tf.normalize_dic(raw),
            Some(FieldKind::Title) => {
                Some(FieldTransformer::slugify(raw)).filter(|slug| !slug.is_empty())
            }
            _ => None,
        };
        normalized.unwrap_or_else(|| raw.to_lowercase())
    }

    // ==========================================
    // 已存在记录
    // ==========================================

    /// 查询目标存储中的自然键冲突（仅检查无错误行）
    ///
    /// 只报告冲突，不决定处置
    #[instrument(skip_all, fields(entity = %self.mapper.entity_type()))]
    pub async fn detect_existing<S: RecordStore + ?Sized>(
        &self,
        rows: &[RawRow],
        mapping: &ColumnMapping,
        outcome: &ValidationOutcome,
        store: &S,
        ctx: &ProjectionContext<'_>,
    ) -> RepositoryResult<Vec<ExistingMatch>> {
        let entity = self.mapper.entity_type();
        let mut matches = Vec::new();

        for (row_index, raw) in rows.iter().enumerate() {
            let importable = outcome
                .row_statuses
                .get(row_index)
                .is_some_and(|status| status.is_importable());
            if !importable {
                continue;
            }

            let row = mapping.apply(raw);
            let Some(key) = self
                .mapper
                .project(&row, row_index, ctx)
                .and_then(|record| record.natural_key())
            else {
                continue;
            };

            if let Some(existing_id) = store.find_existing(entity, &key).await? {
                matches.push(ExistingMatch {
                    row_index,
                    field: key.field,
                    value: key.value,
                    existing_id,
                });
            }
        }

        info!(existing = matches.len(), "已存在记录检测完成");
        Ok(matches)
    }
}

/// 边界值显示（整数不带小数）
fn format_bound(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::mappers::{
        CustomerCompanyMapper, CustomerPersonMapper, GameMapper, InvoiceMapper, PerformanceMapper,
    };

    fn rows(records: &[&[(&str, &str)]]) -> Vec<RawRow> {
        records
            .iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .collect()
    }

    fn mapping(pairs: &[(&str, &str)]) -> ColumnMapping {
        let mut mapping = ColumnMapping::new();
        for (source, target) in pairs {
            mapping.insert(*source, *target);
        }
        mapping
    }

    #[test]
    fn test_required_empty_is_error_and_blocks_import() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&CustomerCompanyMapper, &tf);
        let data = rows(&[
            &[("Název", "Alfa s.r.o."), ("IČ", "12345678")],
            &[("Název", ""), ("IČ", "87654321")],
            &[("Název", "Gama a.s."), ("IČ", "")],
        ]);

        let outcome = validator.validate(&data, &mapping(&[("Název", "name"), ("IČ", "ico")]));

        assert_eq!(outcome.invalid_rows, vec![1]);
        assert_eq!(outcome.valid_rows, vec![0, 2]);
        assert!(!outcome.can_import);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].field, "name");
    }

    #[test]
    fn test_optional_malformed_is_warning_only() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&CustomerCompanyMapper, &tf);
        let data = rows(&[&[("Název", "Alfa"), ("E-mail", "not-an-email")]]);

        let outcome =
            validator.validate(&data, &mapping(&[("Název", "name"), ("E-mail", "email")]));

        assert!(outcome.errors.is_empty());
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.row_statuses, vec![RowStatus::HasWarnings]);
        assert_eq!(outcome.warning_rows, vec![0]);
        assert_eq!(outcome.valid_rows, vec![0]);
        assert!(outcome.can_import);
    }

    #[test]
    fn test_unmapped_required_field_yields_one_error_per_row() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&InvoiceMapper, &tf);
        let data = rows(&[
            &[("Číslo faktury", "F1")],
            &[("Číslo faktury", "F2")],
        ]);

        let outcome = validator.validate(&data, &mapping(&[("Číslo faktury", "invoice_number")]));

        let total_errors: Vec<&FieldIssue> =
            outcome.errors.iter().filter(|e| e.field == "total").collect();
        assert_eq!(total_errors.len(), 2);
        assert_eq!(total_errors[0].row_index, 0);
        assert_eq!(total_errors[1].row_index, 1);
        assert!(!outcome.can_import);
        assert!(!outcome.can_import_with_skip);
    }

    #[test]
    fn test_duplicate_target_mapping_blocks_import() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&CustomerCompanyMapper, &tf);
        let data = rows(&[&[("A", "Alfa"), ("B", "Beta")]]);

        let outcome = validator.validate(&data, &mapping(&[("A", "name"), ("B", "name")]));

        assert!(outcome.errors.is_empty());
        assert!(outcome
            .mapping_errors
            .iter()
            .any(|m| m.kind == MappingIssueKind::DuplicateTargetMapping));
        assert!(!outcome.can_import);
    }

    #[test]
    fn test_bounds_checked_after_type() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&InvoiceMapper, &tf);
        let data = rows(&[&[("Č", "F1"), ("Celkem", "100"), ("DPH", "121")]]);

        let outcome = validator.validate(
            &data,
            &mapping(&[("Č", "invoice_number"), ("Celkem", "total"), ("DPH", "vat_rate")]),
        );

        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].field, "vat_rate");
        assert!(outcome.warnings[0].message.contains("100"));
    }

    #[test]
    fn test_row_rule_person_without_name_is_error() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&CustomerPersonMapper, &tf);
        let data = rows(&[&[("Jméno", ""), ("E-mail", "a@b.cz")]]);

        let outcome =
            validator.validate(&data, &mapping(&[("Jméno", "first_name"), ("E-mail", "email")]));

        assert_eq!(outcome.invalid_rows, vec![0]);
        assert_eq!(outcome.errors[0].field, "full_name");
    }

    #[test]
    fn test_duplicates_grouped_by_normalized_value() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&CustomerCompanyMapper, &tf);
        let data = rows(&[
            &[("Název", "A"), ("IČ", "1234567")],
            &[("Název", "B"), ("IČ", "99999999")],
            &[("Název", "C"), ("IČ", "01234567")],
        ]);

        let outcome = validator.validate(&data, &mapping(&[("Název", "name"), ("IČ", "ico")]));

        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(outcome.duplicates[0].field, "ico");
        assert_eq!(outcome.duplicates[0].rows, vec![0, 2]);
    }

    #[test]
    fn test_titles_compared_by_slug() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&GameMapper, &tf);
        let data = rows(&[
            &[("Hra", "Klaun!")],
            &[("Hra", "Honzova hra")],
            &[("Hra", "  klaun ")],
        ]);

        let outcome = validator.validate(&data, &mapping(&[("Hra", "title")]));

        assert_eq!(outcome.duplicates.len(), 1);
        assert_eq!(outcome.duplicates[0].field, "title");
        assert_eq!(outcome.duplicates[0].rows, vec![0, 2]);
    }

    #[test]
    fn test_symbol_only_title_is_error() {
        let tf = FieldTransformer::default();
        let validator = Validator::new(&PerformanceMapper, &tf);
        let data = rows(&[&[("Název", "???")], &[("Název", "Pohádka o Řepě")]]);

        let outcome = validator.validate(&data, &mapping(&[("Název", "title")]));

        assert_eq!(outcome.invalid_rows, vec![0]);
        assert_eq!(outcome.valid_rows, vec![1]);
        assert_eq!(outcome.errors[0].field, "title");
        assert_eq!(outcome.errors[0].severity, Severity::Error);
    }
}
