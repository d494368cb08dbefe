//! Column classification and schema compatibility checks.
//!
//! Telemetry exports carry no schema file; everything the pipeline needs to
//! know about a column is inferred from its header name. Classification is
//! an ordered rule list evaluated top-to-bottom, and the rule order is part
//! of the contract: several predicates can match the same name (a column
//! ending in `[Time]` may also start with `Total `), and the first match
//! decides.

use std::collections::HashSet;

use anyhow::{Result, bail};
use itertools::Itertools;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    DateTime,
    GlobalTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Plain passthrough; rows are concatenated untouched.
    None,
    /// Cumulative counter that must keep increasing across file boundaries.
    Incremental,
    /// Running minimum, replaced by the global minimum over the whole corpus.
    Min,
    /// Running maximum, replaced by the global maximum over the whole corpus.
    Max,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub aggregation: Aggregation,
}

type NameRule = fn(&str) -> bool;

/// First match wins. Priority is load-bearing: `Total Voltage[Time]` is
/// incremental via the `[Time]` suffix even though the `Total ` rule would
/// match as well.
const AGGREGATION_RULES: [(NameRule, Aggregation); 7] = [
    (|name| name.ends_with("[Time]"), Aggregation::Incremental),
    (|name| name == "GlobalTime", Aggregation::Incremental),
    (|name| name.starts_with("Total "), Aggregation::Incremental),
    (|name| name.starts_with("Distance "), Aggregation::Incremental),
    (|name| name.contains("GPSU["), Aggregation::Incremental),
    (|name| name.contains(" Min "), Aggregation::Min),
    (|name| name.contains(" Max "), Aggregation::Max),
];

/// Classifies a header name. Total and pure: every name yields a column.
pub fn classify(name: &str) -> Column {
    Column {
        name: name.to_string(),
        kind: classify_kind(name),
        aggregation: classify_aggregation(name),
    }
}

fn classify_kind(name: &str) -> ColumnKind {
    match name {
        "GlobalTime" => ColumnKind::GlobalTime,
        "DateTime" => ColumnKind::DateTime,
        _ => ColumnKind::Numeric,
    }
}

fn classify_aggregation(name: &str) -> Aggregation {
    AGGREGATION_RULES
        .iter()
        .find(|(rule, _)| rule(name))
        .map(|(_, aggregation)| *aggregation)
        .unwrap_or(Aggregation::None)
}

/// Rejects Min/Max aggregation on non-numeric kinds. `classify` never emits
/// such a pairing, but programmatically built columns might.
pub fn validate_columns(columns: &[Column]) -> Result<()> {
    for column in columns {
        if matches!(column.aggregation, Aggregation::Min | Aggregation::Max)
            && column.kind != ColumnKind::Numeric
        {
            bail!(
                "Column '{}' pairs {:?} aggregation with non-numeric kind {:?}",
                column.name,
                column.aggregation,
                column.kind
            );
        }
    }
    Ok(())
}

/// Checks that `other` carries the same columns as `baseline`: equal count,
/// and an identical name set regardless of order.
pub fn ensure_matching_columns(baseline: &[Column], other: &[Column]) -> Result<()> {
    if other.len() != baseline.len() {
        bail!(
            "Number of header columns does not match ({} vs {})",
            baseline.len(),
            other.len()
        );
    }

    let baseline_names: HashSet<&str> = baseline.iter().map(|c| c.name.as_str()).collect();
    let other_names: HashSet<&str> = other.iter().map(|c| c.name.as_str()).collect();
    let disjunct: Vec<&str> = baseline_names
        .symmetric_difference(&other_names)
        .copied()
        .sorted()
        .collect();
    if !disjunct.is_empty() {
        bail!(
            "Header columns do not match ({})",
            disjunct.iter().join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_kind_recognizes_reserved_names() {
        assert_eq!(classify("GlobalTime").kind, ColumnKind::GlobalTime);
        assert_eq!(classify("DateTime").kind, ColumnKind::DateTime);
        assert_eq!(classify("Voltage").kind, ColumnKind::Numeric);
        assert_eq!(classify("Voltage Min [V]").kind, ColumnKind::Numeric);
    }

    #[test]
    fn classify_aggregation_matches_each_rule() {
        assert_eq!(
            classify("Flight[Time]").aggregation,
            Aggregation::Incremental
        );
        assert_eq!(classify("GlobalTime").aggregation, Aggregation::Incremental);
        assert_eq!(
            classify("Total Ah[Ah]").aggregation,
            Aggregation::Incremental
        );
        assert_eq!(
            classify("Distance Flown[m]").aggregation,
            Aggregation::Incremental
        );
        assert_eq!(classify("GPSU[m]").aggregation, Aggregation::Incremental);
        assert_eq!(classify("Voltage Min [V]").aggregation, Aggregation::Min);
        assert_eq!(classify("Altitude Max [m]").aggregation, Aggregation::Max);
        assert_eq!(classify("Speed").aggregation, Aggregation::None);
    }

    #[test]
    fn aggregation_priority_prefers_earlier_rules() {
        // `[Time]` suffix outranks the `Total ` prefix and ` Min ` infix.
        assert_eq!(
            classify("Total Voltage Min [V][Time]").aggregation,
            Aggregation::Incremental
        );
        // `Total ` prefix outranks ` Min ` infix.
        assert_eq!(
            classify("Total Min [m]").aggregation,
            Aggregation::Incremental
        );
        // ` Min ` outranks ` Max ` when both appear.
        assert_eq!(
            classify("Voltage Min Max [V]").aggregation,
            Aggregation::Min
        );
    }

    #[test]
    fn aggregation_rules_require_exact_literals() {
        // No trailing space after "Min" means no infix match.
        assert_eq!(classify("Voltage Min[V]").aggregation, Aggregation::None);
        assert_eq!(classify("Subtotal Ah").aggregation, Aggregation::None);
        assert_eq!(classify("Time").aggregation, Aggregation::None);
    }

    #[test]
    fn validate_columns_rejects_extrema_on_non_numeric() {
        let mut columns = vec![classify("DateTime"), classify("Voltage Min [V]")];
        assert!(validate_columns(&columns).is_ok());

        columns.push(Column {
            name: "Broken".to_string(),
            kind: ColumnKind::DateTime,
            aggregation: Aggregation::Max,
        });
        let err = validate_columns(&columns).unwrap_err();
        assert!(err.to_string().contains("Broken"));
    }

    #[test]
    fn ensure_matching_columns_reports_symmetric_difference() {
        let left = vec![classify("Speed"), classify("Voltage")];
        let right = vec![classify("Voltage"), classify("Speed")];
        assert!(ensure_matching_columns(&left, &right).is_ok());

        let renamed = vec![classify("Speed"), classify("Current")];
        let err = ensure_matching_columns(&left, &renamed).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Current"));
        assert!(message.contains("Voltage"));
        assert!(!message.contains("Speed"));

        let short = vec![classify("Speed")];
        assert!(ensure_matching_columns(&left, &short).is_err());
    }
}
