use std::collections::{BTreeSet, HashMap};

use super::model::{CellValue, ColumnError, TableView};

// ---------------------------------------------------------------------------
// Frequency distributions
// ---------------------------------------------------------------------------

/// How a column's cells are turned into countable answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnswerMode {
    /// One answer per cell.
    Single,
    /// Several answers per cell, joined by `separator`.
    Multi { separator: char },
}

impl AnswerMode {
    pub const DEFAULT_SEPARATOR: char = ',';

    pub fn multi() -> Self {
        AnswerMode::Multi {
            separator: Self::DEFAULT_SEPARATOR,
        }
    }
}

/// One category of a distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub count: usize,
}

/// Category label → count, in descending-count order (ties keep the order
/// in which labels were first seen).
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    pub categories: Vec<Category>,
    /// Percentage denominator: answered rows in single mode, tokens in multi mode.
    pub total: usize,
    pub mode: AnswerMode,
}

impl Distribution {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.categories
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.count)
    }

    /// Share of `count` in the total, rounded to one decimal place.
    pub fn percentage(&self, count: usize) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        round1(count as f64 / self.total as f64 * 100.0)
    }

    /// `(label, percentage)` in distribution order.
    pub fn percentages(&self) -> Vec<(&str, f64)> {
        self.categories
            .iter()
            .map(|c| (c.label.as_str(), self.percentage(c.count)))
            .collect()
    }

    /// Caption for multi-answer charts: the denominator is selections, not
    /// respondents.
    pub fn total_annotation(&self) -> Option<String> {
        match self.mode {
            AnswerMode::Single => None,
            AnswerMode::Multi { .. } => Some(format!("Total: {} réponses", self.total)),
        }
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Count labels, most frequent first.  `sort_by` is stable, so equal counts
/// stay in first-seen order.
pub fn count_labels<I>(labels: I) -> Vec<Category>
where
    I: IntoIterator<Item = String>,
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut categories: Vec<Category> = Vec::new();

    for label in labels {
        match index.get(&label) {
            Some(&pos) => categories[pos].count += 1,
            None => {
                index.insert(label.clone(), categories.len());
                categories.push(Category { label, count: 1 });
            }
        }
    }

    categories.sort_by(|a, b| b.count.cmp(&a.count));
    categories
}

/// Split one multi-answer cell into trimmed tokens.  A trailing or doubled
/// separator yields an empty token, which is counted like any other.
pub fn split_answers(cell: &str, separator: char) -> impl Iterator<Item = &str> {
    cell.split(separator).map(str::trim)
}

/// Distribution of a single-answer column over the view.
/// Missing cells count in neither the categories nor the total.
pub fn single_answer(view: &TableView<'_>, column: &str) -> Result<Distribution, ColumnError> {
    let labels: Vec<String> = view
        .column(column)?
        .filter(|v| !v.is_null())
        .map(CellValue::to_string)
        .collect();
    let total = labels.len();
    Ok(Distribution {
        categories: count_labels(labels),
        total,
        mode: AnswerMode::Single,
    })
}

/// Distribution of a multi-answer column over the view.  Each cell is
/// exploded into its tokens first; the total is the token count.
pub fn multi_answer(
    view: &TableView<'_>,
    column: &str,
    separator: char,
) -> Result<Distribution, ColumnError> {
    let tokens: Vec<String> = view
        .column(column)?
        .filter(|v| !v.is_null())
        .flat_map(|v| {
            let text = v.to_string();
            split_answers(&text, separator)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect();
    let total = tokens.len();
    Ok(Distribution {
        categories: count_labels(tokens),
        total,
        mode: AnswerMode::Multi { separator },
    })
}

pub fn distribution(
    view: &TableView<'_>,
    column: &str,
    mode: AnswerMode,
) -> Result<Distribution, ColumnError> {
    match mode {
        AnswerMode::Single => single_answer(view, column),
        AnswerMode::Multi { separator } => multi_answer(view, column, separator),
    }
}

// ---------------------------------------------------------------------------
// Cross tabulation
// ---------------------------------------------------------------------------

/// Counts of `(row value, column value)` pairs, both axes sorted.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossTab {
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `counts[r][c]` for `row_labels[r]`, `col_labels[c]`.
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Count series for one column label, across every row label.
    pub fn column_series(&self, c: usize) -> Vec<usize> {
        self.counts.iter().map(|row| row[c]).collect()
    }
}

/// Group-by on two columns.  Rows missing either value are left out.
pub fn crosstab(view: &TableView<'_>, rows_by: &str, cols_by: &str) -> Result<CrossTab, ColumnError> {
    let pairs: Vec<(&CellValue, &CellValue)> = view
        .column(rows_by)?
        .zip(view.column(cols_by)?)
        .filter(|(a, b)| !a.is_null() && !b.is_null())
        .collect();

    let row_values: BTreeSet<&CellValue> = pairs.iter().map(|(a, _)| *a).collect();
    let col_values: BTreeSet<&CellValue> = pairs.iter().map(|(_, b)| *b).collect();
    let row_pos: HashMap<&CellValue, usize> =
        row_values.iter().enumerate().map(|(i, v)| (*v, i)).collect();
    let col_pos: HashMap<&CellValue, usize> =
        col_values.iter().enumerate().map(|(i, v)| (*v, i)).collect();

    let mut counts = vec![vec![0usize; col_values.len()]; row_values.len()];
    for (a, b) in &pairs {
        counts[row_pos[a]][col_pos[b]] += 1;
    }

    Ok(CrossTab {
        row_labels: row_values.iter().map(|v| v.to_string()).collect(),
        col_labels: col_values.iter().map(|v| v.to_string()).collect(),
        counts,
    })
}

// ---------------------------------------------------------------------------
// Metrics and coordinates
// ---------------------------------------------------------------------------

/// Number of distinct non-null values.
pub fn distinct_count(view: &TableView<'_>, column: &str) -> Result<usize, ColumnError> {
    Ok(view.distinct_values(column)?.len())
}

/// `[longitude, latitude]` for every row with two numeric coordinates.
pub fn geo_points(view: &TableView<'_>, lat: &str, lon: &str) -> Result<Vec<[f64; 2]>, ColumnError> {
    Ok(view
        .column(lat)?
        .zip(view.column(lon)?)
        .filter_map(|(la, lo)| Some([lo.as_f64()?, la.as_f64()?]))
        .filter(|[x, y]| x.is_finite() && y.is_finite())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{strings, table_of};
    use crate::data::model::ResponseTable;

    fn dist_of(table: &ResponseTable, column: &str, mode: AnswerMode) -> Distribution {
        let rows = table.all_rows();
        distribution(&table.view(&rows), column, mode).unwrap()
    }

    #[test]
    fn test_multi_answer_example() {
        let table = table_of(&[("Q", strings(&["A", "B", "A", "A,C", "B"]))]);
        let dist = dist_of(&table, "Q", AnswerMode::multi());

        assert_eq!(dist.total, 6);
        assert_eq!(
            dist.categories,
            vec![
                Category { label: "A".into(), count: 3 },
                Category { label: "B".into(), count: 2 },
                Category { label: "C".into(), count: 1 },
            ]
        );
        assert_eq!(dist.percentages(), vec![("A", 50.0), ("B", 33.3), ("C", 16.7)]);
        assert_eq!(dist.total_annotation().as_deref(), Some("Total: 6 réponses"));
    }

    #[test]
    fn test_single_answer_excludes_missing() {
        let table = table_of(&[(
            "grille",
            vec![
                Some(CellValue::String("Oui".into())),
                None,
                Some(CellValue::String("Non".into())),
                Some(CellValue::String("Oui".into())),
            ],
        )]);
        let dist = dist_of(&table, "grille", AnswerMode::Single);

        assert_eq!(dist.total, 3);
        assert_eq!(dist.get("Oui"), Some(2));
        assert_eq!(dist.get("Non"), Some(1));
        assert_eq!(dist.percentage(2), 66.7);
        assert!(dist.total_annotation().is_none());
    }

    #[test]
    fn test_single_answer_keeps_commas() {
        let table = table_of(&[("Q", strings(&["A,C", "A"]))]);
        let dist = dist_of(&table, "Q", AnswerMode::Single);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("A,C"), Some(1));
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let table = table_of(&[("Q", strings(&["Non", "Oui", "Peut-être", "Oui", "Non"]))]);
        let dist = dist_of(&table, "Q", AnswerMode::Single);
        let labels: Vec<_> = dist.categories.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Non", "Oui", "Peut-être"]);
    }

    #[test]
    fn test_counts_sum_to_total() {
        let table = table_of(&[(
            "Q",
            strings(&["x, y", " z ,x", "y", "x,y,z", "w"]),
        )]);
        let dist = dist_of(&table, "Q", AnswerMode::multi());
        assert_eq!(dist.len(), 4);
        let sum: usize = dist.categories.iter().map(|c| c.count).sum();
        assert_eq!(sum, dist.total);
        assert_eq!(dist.total, 9);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let table = table_of(&[(
            "Q",
            strings(&["a", "b", "c", "a", "b", "d", "e", "f", "g"]),
        )]);
        let dist = dist_of(&table, "Q", AnswerMode::Single);
        let sum: f64 = dist.percentages().iter().map(|(_, p)| p).sum();
        assert!((sum - 100.0).abs() <= dist.len() as f64 * 0.05 + 1e-9);
    }

    #[test]
    fn test_split_trims_and_keeps_empty_tokens() {
        let tokens: Vec<_> = split_answers(" Avant , Pendant,, Après ,", ',').collect();
        assert_eq!(tokens, vec!["Avant", "Pendant", "", "Après", ""]);

        // Already-clean tokens are left untouched.
        let joined = tokens.join(",");
        let again: Vec<_> = split_answers(&joined, ',').collect();
        assert_eq!(again, tokens);
    }

    #[test]
    fn test_empty_tokens_count_in_total() {
        let table = table_of(&[("Q", strings(&["A,", "B, ,C"]))]);
        let dist = dist_of(&table, "Q", AnswerMode::multi());

        assert_eq!(dist.total, 5);
        assert_eq!(dist.get(""), Some(2));
        assert_eq!(dist.get("A"), Some(1));
        assert_eq!(dist.percentage(2), 40.0);
    }

    #[test]
    fn test_multi_answer_skips_missing_cells() {
        let table = table_of(&[(
            "Peur",
            vec![
                Some(CellValue::String("Mauvaise note, Jugement".into())),
                None,
                Some(CellValue::String("Jugement".into())),
                None,
                None,
            ],
        )]);
        let dist = dist_of(&table, "Peur", AnswerMode::multi());

        assert_eq!(dist.total, 3);
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("Jugement"), Some(2));
        assert_eq!(dist.get("Mauvaise note"), Some(1));
        assert_eq!(dist.get(""), None);
        assert_eq!(dist.get("NA"), None);
        assert_eq!(dist.total_annotation().as_deref(), Some("Total: 3 réponses"));
    }

    #[test]
    fn test_custom_separator() {
        let table = table_of(&[("Q", strings(&["a;b", "b"]))]);
        let dist = dist_of(&table, "Q", AnswerMode::Multi { separator: ';' });
        assert_eq!(dist.get("b"), Some(2));
        assert_eq!(dist.total, 3);
    }

    #[test]
    fn test_empty_view() {
        let table = table_of(&[("Q", strings(&["a"]))]);
        let dist = distribution(&table.view(&[]), "Q", AnswerMode::Single).unwrap();
        assert!(dist.is_empty());
        assert_eq!(dist.total, 0);
        assert_eq!(dist.percentage(0), 0.0);
    }

    #[test]
    fn test_missing_column_is_typed_error() {
        let table = table_of(&[("Q", strings(&["a"]))]);
        let rows = table.all_rows();
        let err = distribution(&table.view(&rows), "Peur", AnswerMode::multi()).unwrap_err();
        assert_eq!(err, ColumnError::Missing("Peur".into()));
    }

    #[test]
    fn test_crosstab_sorted_axes() {
        let table = table_of(&[
            ("Type_etab", strings(&["LYCEE", "COLLEGE", "COLLEGE", "LYCEE"])),
            (
                "Departement",
                vec![
                    Some(CellValue::Integer(45)),
                    Some(CellValue::Integer(18)),
                    Some(CellValue::Integer(45)),
                    None,
                ],
            ),
        ]);
        let rows = table.all_rows();
        let tab = crosstab(&table.view(&rows), "Type_etab", "Departement").unwrap();

        assert_eq!(tab.row_labels, vec!["COLLEGE", "LYCEE"]);
        assert_eq!(tab.col_labels, vec!["18", "45"]);
        assert_eq!(tab.counts, vec![vec![1, 1], vec![0, 1]]);
        assert_eq!(tab.column_series(1), vec![1, 1]);
    }

    #[test]
    fn test_geo_points_skip_missing() {
        let table = table_of(&[
            (
                "latitude",
                vec![Some(CellValue::Float(47.9)), None, Some(CellValue::Float(47.4))],
            ),
            (
                "longitude",
                vec![Some(CellValue::Float(1.9)), Some(CellValue::Float(0.7)), Some(CellValue::Float(0.7))],
            ),
        ]);
        let rows = table.all_rows();
        let points = geo_points(&table.view(&rows), "latitude", "longitude").unwrap();
        assert_eq!(points, vec![[1.9, 47.9], [0.7, 47.4]]);
    }

    #[test]
    fn test_distinct_count() {
        let table = table_of(&[("UAI", strings(&["0450001A", "0370002B", "0450001A"]))]);
        let rows = table.all_rows();
        assert_eq!(distinct_count(&table.view(&rows), "UAI").unwrap(), 2);
    }
}
