use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single answer in a response column
// ---------------------------------------------------------------------------

/// A dynamically-typed answer mirroring common Pandas dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

// Equality follows `cmp`, so `Float(-0.0) != Float(0.0)` and `NaN == NaN`,
// matching the bitwise `Hash` below.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) | Float(_) => 2,
                String(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (String(a), String(b)) => a.cmp(b),
            // Mixed numeric columns (e.g. ages with a stray "12.5") sort by value.
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y).then_with(|| {
                    // Keep Integer(12) and Float(12.0) distinct for Eq consistency.
                    matches!(a, Float(_)).cmp(&matches!(b, Float(_)))
                }),
                _ => std::cmp::Ordering::Equal,
            },
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for range filters and maps.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A chart or filter referenced a column the loaded table does not have.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    #[error("column `{0}` is absent from the table")]
    Missing(String),
}

// ---------------------------------------------------------------------------
// Respondent – one row of the questionnaire export
// ---------------------------------------------------------------------------

/// A single survey participant's answers.
#[derive(Debug, Clone, Default)]
pub struct Respondent {
    /// column_name → answer. Columns the row does not carry read as `Null`.
    pub answers: BTreeMap<String, CellValue>,
}

impl Respondent {
    pub fn get(&self, column: &str) -> &CellValue {
        self.answers.get(column).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// ResponseTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed questionnaire with pre-computed column indices.
#[derive(Debug, Clone, Default)]
pub struct ResponseTable {
    /// All respondents (rows).
    pub respondents: Vec<Respondent>,
    /// Column names in source order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of distinct non-null values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl ResponseTable {
    /// Build column indices from the loaded respondents.
    pub fn from_respondents(column_names: Vec<String>, respondents: Vec<Respondent>) -> Self {
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = column_names
            .iter()
            .map(|c| (c.clone(), BTreeSet::new()))
            .collect();

        for row in &respondents {
            for (col, val) in &row.answers {
                if val.is_null() {
                    continue;
                }
                if let Some(set) = unique_values.get_mut(col) {
                    set.insert(val.clone());
                }
            }
        }

        ResponseTable {
            respondents,
            column_names,
            unique_values,
        }
    }

    /// Number of respondents.
    pub fn len(&self) -> usize {
        self.respondents.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.respondents.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// Indices of every row, i.e. the unfiltered view.
    pub fn all_rows(&self) -> Vec<usize> {
        (0..self.len()).collect()
    }

    pub fn view<'a>(&'a self, rows: &'a [usize]) -> TableView<'a> {
        TableView { table: self, rows }
    }
}

// ---------------------------------------------------------------------------
// TableView – a filtered, borrowed subset of rows
// ---------------------------------------------------------------------------

/// A derived view over a [`ResponseTable`]; filtering never mutates the table.
#[derive(Debug, Clone, Copy)]
pub struct TableView<'a> {
    pub table: &'a ResponseTable,
    pub rows: &'a [usize],
}

impl<'a> TableView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate the column's cells in row order, or fail if the column is absent.
    pub fn column(
        &self,
        column: &str,
    ) -> Result<impl Iterator<Item = &'a CellValue> + 'a, ColumnError> {
        if !self.table.has_column(column) {
            return Err(ColumnError::Missing(column.to_string()));
        }
        let table = self.table;
        let rows = self.rows;
        let column = column.to_string();
        Ok(rows
            .iter()
            .filter_map(move |&i| table.respondents.get(i))
            .map(move |r| r.get(&column)))
    }

    /// Distinct non-null values present in this view.
    pub fn distinct_values(&self, column: &str) -> Result<BTreeSet<CellValue>, ColumnError> {
        Ok(self
            .column(column)?
            .filter(|v| !v.is_null())
            .cloned()
            .collect())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a table from `(column, values)` pairs; `None` cells become `Null`.
    pub(crate) fn table_of(columns: &[(&str, Vec<Option<CellValue>>)]) -> ResponseTable {
        let n_rows = columns.iter().map(|(_, v)| v.len()).max().unwrap_or(0);
        let respondents = (0..n_rows)
            .map(|i| Respondent {
                answers: columns
                    .iter()
                    .map(|(name, values)| {
                        let cell = values.get(i).cloned().flatten().unwrap_or(CellValue::Null);
                        (name.to_string(), cell)
                    })
                    .collect(),
            })
            .collect();
        let names = columns.iter().map(|(n, _)| n.to_string()).collect();
        ResponseTable::from_respondents(names, respondents)
    }

    pub(crate) fn strings(values: &[&str]) -> Vec<Option<CellValue>> {
        values
            .iter()
            .map(|s| Some(CellValue::String(s.to_string())))
            .collect()
    }

    #[test]
    fn test_unique_values_skip_nulls() {
        let table = table_of(&[(
            "Classe",
            vec![
                Some(CellValue::String("4A".into())),
                None,
                Some(CellValue::String("3B".into())),
                Some(CellValue::String("4A".into())),
            ],
        )]);
        let uniques = &table.unique_values["Classe"];
        assert_eq!(uniques.len(), 2);
        assert!(!uniques.contains(&CellValue::Null));
    }

    #[test]
    fn test_equality_agrees_with_hash() {
        use std::collections::HashSet;

        let zeros = [CellValue::Float(0.0), CellValue::Float(-0.0)];
        assert_ne!(zeros[0], zeros[1]);
        assert_eq!(zeros.iter().collect::<HashSet<_>>().len(), 2);

        assert_eq!(CellValue::Float(f64::NAN), CellValue::Float(f64::NAN));
        assert_ne!(CellValue::Integer(12), CellValue::Float(12.0));
        assert_eq!(CellValue::Integer(12), CellValue::Integer(12));
    }

    #[test]
    fn test_view_missing_column() {
        let table = table_of(&[("Age", vec![Some(CellValue::Integer(12))])]);
        let rows = table.all_rows();
        let view = table.view(&rows);
        assert!(matches!(
            view.column("Classe"),
            Err(ColumnError::Missing(c)) if c == "Classe"
        ));
    }

    #[test]
    fn test_numeric_ordering_mixes_int_and_float() {
        let mut values = vec![
            CellValue::Float(12.5),
            CellValue::Integer(13),
            CellValue::Integer(11),
        ];
        values.sort();
        assert_eq!(
            values,
            vec![
                CellValue::Integer(11),
                CellValue::Float(12.5),
                CellValue::Integer(13)
            ]
        );
    }

    #[test]
    fn test_display_forms() {
        assert_eq!(CellValue::Integer(14).to_string(), "14");
        assert_eq!(CellValue::Float(1.5).to_string(), "1.5");
        assert_eq!(CellValue::String("LP".into()).to_string(), "LP");
    }
}
