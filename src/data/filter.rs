use std::collections::BTreeSet;

use super::model::{CellValue, ResponseTable};

// ---------------------------------------------------------------------------
// Filter predicates: an ordered chain of per-column criteria
// ---------------------------------------------------------------------------

/// What a single column filter accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    /// Rows whose value is one of these. An empty set accepts nothing.
    Categories(BTreeSet<CellValue>),
    /// Rows whose numeric value lies in `[min, max]`. A non-finite bound
    /// falls back to the observed extreme of the rows that reach this filter.
    Range { min: f64, max: f64 },
}

impl Criterion {
    /// A range that resolves to the full observed span.
    pub fn unbounded_range() -> Self {
        Criterion::Range {
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilter {
    pub column: String,
    pub criterion: Criterion,
}

/// Filters in application order; each one sees only the rows the previous
/// ones kept.
pub type FilterChain = Vec<ColumnFilter>;

/// Return indices of respondents that pass every filter in the chain.
///
/// A filter whose column is absent from the table is skipped.
pub fn filtered_indices(table: &ResponseTable, chain: &FilterChain) -> Vec<usize> {
    let mut rows = table.all_rows();
    for filter in chain {
        rows = apply_filter(table, &rows, filter);
    }
    rows
}

/// Apply one filter to an already-narrowed row set.
pub fn apply_filter(table: &ResponseTable, rows: &[usize], filter: &ColumnFilter) -> Vec<usize> {
    if !table.has_column(&filter.column) {
        return rows.to_vec();
    }
    match &filter.criterion {
        Criterion::Categories(selected) => by_categories(table, rows, &filter.column, selected),
        Criterion::Range { min, max } => by_range(table, rows, &filter.column, *min, *max),
    }
}

/// Keep rows whose value is in `selected`.
///
/// An empty selection yields no rows: deselecting everything hides everything.
pub fn by_categories(
    table: &ResponseTable,
    rows: &[usize],
    column: &str,
    selected: &BTreeSet<CellValue>,
) -> Vec<usize> {
    if selected.is_empty() {
        return Vec::new();
    }
    rows.iter()
        .copied()
        .filter(|&i| {
            let value = table.respondents[i].get(column);
            !value.is_null() && selected.contains(value)
        })
        .collect()
}

/// Keep rows whose numeric value lies in the inclusive range.
pub fn by_range(table: &ResponseTable, rows: &[usize], column: &str, min: f64, max: f64) -> Vec<usize> {
    let Some((lo, hi)) = resolve_bounds(table, rows, column, min, max) else {
        // No numeric value at all: nothing can be in range.
        return Vec::new();
    };
    rows.iter()
        .copied()
        .filter(|&i| {
            table.respondents[i]
                .get(column)
                .as_f64()
                .is_some_and(|v| v >= lo && v <= hi)
        })
        .collect()
}

/// Replace non-finite bounds by the observed min / max over `rows`.
pub fn resolve_bounds(
    table: &ResponseTable,
    rows: &[usize],
    column: &str,
    min: f64,
    max: f64,
) -> Option<(f64, f64)> {
    let (obs_min, obs_max) = observed_range(table, rows, column)?;
    let lo = if min.is_finite() { min } else { obs_min };
    let hi = if max.is_finite() { max } else { obs_max };
    Some((lo, hi))
}

/// Min and max of the numeric values of `column` over `rows`.
pub fn observed_range(table: &ResponseTable, rows: &[usize], column: &str) -> Option<(f64, f64)> {
    rows.iter()
        .filter_map(|&i| table.respondents[i].get(column).as_f64())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Distinct non-null values of `column` over `rows`: the options a filter
/// offers after the filters before it have been applied.
pub fn available_values(table: &ResponseTable, rows: &[usize], column: &str) -> BTreeSet<CellValue> {
    table
        .view(rows)
        .distinct_values(column)
        .unwrap_or_default()
}

/// Stable signature of a chain, used to invalidate cached distributions.
pub fn chain_signature(chain: &FilterChain) -> u64 {
    use std::hash::{Hash, Hasher};
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for filter in chain {
        filter.column.hash(&mut hasher);
        match &filter.criterion {
            Criterion::Categories(set) => {
                0u8.hash(&mut hasher);
                set.len().hash(&mut hasher);
                for v in set {
                    v.hash(&mut hasher);
                }
            }
            Criterion::Range { min, max } => {
                1u8.hash(&mut hasher);
                min.to_bits().hash(&mut hasher);
                max.to_bits().hash(&mut hasher);
            }
        }
    }
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{strings, table_of};

    fn ages(values: &[i64]) -> Vec<Option<CellValue>> {
        values.iter().map(|&v| Some(CellValue::Integer(v))).collect()
    }

    fn select(values: &[&str]) -> BTreeSet<CellValue> {
        values.iter().map(|s| CellValue::String(s.to_string())).collect()
    }

    #[test]
    fn test_range_filter_is_inclusive() {
        let table = table_of(&[("Age", ages(&[11, 12, 13, 14, 15, 16]))]);
        let rows = by_range(&table, &table.all_rows(), "Age", 12.0, 15.0);
        let kept: Vec<_> = rows
            .iter()
            .map(|&i| table.respondents[i].get("Age").clone())
            .collect();
        assert_eq!(
            kept,
            vec![
                CellValue::Integer(12),
                CellValue::Integer(13),
                CellValue::Integer(14),
                CellValue::Integer(15)
            ]
        );
    }

    #[test]
    fn test_range_non_finite_bounds_use_observed() {
        let table = table_of(&[("Age", ages(&[11, 12, 13]))]);
        let all = table.all_rows();
        assert_eq!(by_range(&table, &all, "Age", f64::NAN, 12.0), vec![0, 1]);
        assert_eq!(by_range(&table, &all, "Age", 12.0, f64::INFINITY), vec![1, 2]);
        assert_eq!(
            resolve_bounds(&table, &all, "Age", f64::NEG_INFINITY, f64::NAN),
            Some((11.0, 13.0))
        );
    }

    #[test]
    fn test_range_skips_nulls() {
        let table = table_of(&[(
            "Age",
            vec![Some(CellValue::Integer(12)), None, Some(CellValue::Integer(14))],
        )]);
        let rows = by_range(&table, &table.all_rows(), "Age", f64::NAN, f64::NAN);
        assert_eq!(rows, vec![0, 2]);
    }

    #[test]
    fn test_empty_selection_yields_no_rows() {
        let table = table_of(&[("Classe", strings(&["4A", "3B", "4A"]))]);
        let rows = by_categories(&table, &table.all_rows(), "Classe", &BTreeSet::new());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_selection_keeps_exact_members() {
        let table = table_of(&[(
            "Classe",
            vec![
                Some(CellValue::String("4A".into())),
                Some(CellValue::String("3B".into())),
                None,
                Some(CellValue::String("5C".into())),
                Some(CellValue::String("4A".into())),
            ],
        )]);
        let all = table.all_rows();
        assert_eq!(by_categories(&table, &all, "Classe", &select(&["4A"])), vec![0, 4]);
        // Selecting every option still drops rows with no answer.
        assert_eq!(
            by_categories(&table, &all, "Classe", &select(&["4A", "3B", "5C"])),
            vec![0, 1, 3, 4]
        );
    }

    #[test]
    fn test_chain_narrows_options() {
        let table = table_of(&[
            ("Type_etab", strings(&["COLLEGE", "LYCEE GENERAL", "COLLEGE", "LYCEE GENERAL"])),
            ("Departement", strings(&["18", "37", "45", "45"])),
        ]);
        let type_filter = ColumnFilter {
            column: "Type_etab".into(),
            criterion: Criterion::Categories(select(&["COLLEGE"])),
        };
        let after_type = apply_filter(&table, &table.all_rows(), &type_filter);
        assert_eq!(
            available_values(&table, &after_type, "Departement"),
            select(&["18", "45"])
        );

        let chain = vec![
            type_filter,
            ColumnFilter {
                column: "Departement".into(),
                criterion: Criterion::Categories(select(&["45"])),
            },
        ];
        assert_eq!(filtered_indices(&table, &chain), vec![2]);
    }

    #[test]
    fn test_absent_column_is_skipped() {
        let table = table_of(&[("Classe", strings(&["4A", "3B"]))]);
        let chain = vec![ColumnFilter {
            column: "Age".into(),
            criterion: Criterion::Range { min: 12.0, max: 13.0 },
        }];
        assert_eq!(filtered_indices(&table, &chain), vec![0, 1]);
    }

    #[test]
    fn test_signature_changes_with_selection() {
        let a = vec![ColumnFilter {
            column: "Classe".into(),
            criterion: Criterion::Categories(select(&["4A"])),
        }];
        let mut b = a.clone();
        b[0].criterion = Criterion::Categories(select(&["4A", "3B"]));
        assert_ne!(chain_signature(&a), chain_signature(&b));
        assert_eq!(chain_signature(&a), chain_signature(&a.clone()));
    }
}
