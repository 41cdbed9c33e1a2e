use crate::chart::ChartKind;
use crate::color::PaletteId;
use crate::data::aggregate::AnswerMode;
use crate::data::model::ResponseTable;

// ---------------------------------------------------------------------------
// Field presence
// ---------------------------------------------------------------------------

/// Whether the columns a widget needs exist in the loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    Present,
    Absent(&'static str),
}

impl FieldStatus {
    pub fn of(table: &ResponseTable, columns: &[&'static str]) -> Self {
        columns
            .iter()
            .find(|c| !table.has_column(c))
            .map_or(FieldStatus::Present, |c| FieldStatus::Absent(*c))
    }

    pub fn is_present(self) -> bool {
        self == FieldStatus::Present
    }
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

/// One category chart on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub column: &'static str,
    /// `None` uses the generated "Répartition par …" title.
    pub title: Option<&'static str>,
    pub mode: AnswerMode,
    /// Initial display kind.
    pub kind: ChartKind,
    /// `None` uses the configured default palette.
    pub palette: Option<PaletteId>,
    /// Show a pie / bar switch above the chart.
    pub toggle: bool,
}

impl ChartSpec {
    pub fn single(column: &'static str, title: &'static str) -> Self {
        ChartSpec {
            column,
            title: Some(title),
            mode: AnswerMode::Single,
            kind: ChartKind::Pie,
            palette: None,
            toggle: false,
        }
    }

    pub fn multi(column: &'static str, title: &'static str) -> Self {
        ChartSpec {
            mode: AnswerMode::multi(),
            ..Self::single(column, title)
        }
    }

    pub fn bar(self) -> Self {
        ChartSpec {
            kind: ChartKind::Bar,
            ..self
        }
    }

    pub fn palette(self, palette: PaletteId) -> Self {
        ChartSpec {
            palette: Some(palette),
            ..self
        }
    }

    pub fn toggleable(self) -> Self {
        ChartSpec {
            toggle: true,
            ..self
        }
    }

    /// Key for per-chart UI state and distribution caching.
    pub fn key(&self) -> String {
        format!("{}:{:?}", self.column, self.mode)
    }

    pub fn status(&self, table: &ResponseTable) -> FieldStatus {
        FieldStatus::of(table, &[self.column])
    }
}

// ---------------------------------------------------------------------------
// Page blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Metric {
    /// Number of visible respondents.
    RowCount { label: &'static str },
    /// Distinct non-null values of a column among visible respondents.
    Distinct {
        label: &'static str,
        column: &'static str,
    },
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::RowCount { label } | Metric::Distinct { label, .. } => *label,
        }
    }
}

/// Laid out top to bottom inside a tab.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading(&'static str),
    Metrics(Vec<Metric>),
    /// Respondent locations, collapsed by default.
    Map {
        latitude: &'static str,
        longitude: &'static str,
    },
    /// Stacked bars of `rows` broken down by `stack`.
    CrossTab {
        rows: &'static str,
        stack: &'static str,
        title: &'static str,
        x_title: &'static str,
        legend_title: &'static str,
    },
    /// Charts side by side.
    Row(Vec<ChartSpec>),
    /// A full-width chart.
    Chart(ChartSpec),
    /// Free-text answers grouped by hand.
    Note {
        heading: &'static str,
        items: Vec<&'static str>,
    },
}

impl Block {
    /// Columns the block cannot be drawn without.
    pub fn required_columns(&self) -> Vec<&'static str> {
        match self {
            Block::Heading(_) | Block::Note { .. } => Vec::new(),
            Block::Metrics(metrics) => metrics
                .iter()
                .filter_map(|m| match m {
                    Metric::Distinct { column, .. } => Some(*column),
                    Metric::RowCount { .. } => None,
                })
                .collect(),
            Block::Map {
                latitude,
                longitude,
            } => vec![*latitude, *longitude],
            Block::CrossTab { rows, stack, .. } => vec![*rows, *stack],
            Block::Row(charts) => charts.iter().map(|c| c.column).collect(),
            Block::Chart(chart) => vec![chart.column],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabLayout {
    pub title: &'static str,
    pub blocks: Vec<Block>,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Named group of values a categorical filter can jump to.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub label: &'static str,
    pub values: &'static [&'static str],
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterKind {
    Categories { presets: Vec<Preset> },
    Range,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub column: &'static str,
    pub label: &'static str,
    pub kind: FilterKind,
}

// ---------------------------------------------------------------------------
// Page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub filters: Vec<FilterSpec>,
    pub tabs: Vec<TabLayout>,
}

impl PageLayout {
    /// Every chart on the page, in reading order.
    #[cfg(test)]
    pub fn charts(&self) -> impl Iterator<Item = &ChartSpec> {
        self.tabs.iter().flat_map(|t| &t.blocks).flat_map(|b| match b {
            Block::Row(charts) => charts.iter().collect::<Vec<_>>(),
            Block::Chart(chart) => vec![chart],
            _ => Vec::new(),
        })
    }

    /// Columns referenced by the page that `table` lacks, deduplicated.
    pub fn absent_columns(&self, table: &ResponseTable) -> Vec<&'static str> {
        let mut absent: Vec<&'static str> = self
            .filters
            .iter()
            .map(|f| f.column)
            .chain(
                self.tabs
                    .iter()
                    .flat_map(|t| &t.blocks)
                    .flat_map(Block::required_columns),
            )
            .filter(|c| !table.has_column(c))
            .collect();
        absent.sort_unstable();
        absent.dedup();
        absent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{strings, table_of};

    #[test]
    fn test_field_status() {
        let table = table_of(&[("Classe", strings(&["4A"]))]);
        assert_eq!(FieldStatus::of(&table, &["Classe"]), FieldStatus::Present);
        assert_eq!(
            FieldStatus::of(&table, &["Classe", "Niveau"]),
            FieldStatus::Absent("Niveau")
        );
        assert!(!ChartSpec::single("Peur", "t").status(&table).is_present());
    }

    #[test]
    fn test_chart_builders() {
        let spec = ChartSpec::multi("Freq_eval", "t")
            .palette(PaletteId::Pastel)
            .bar()
            .toggleable();
        assert_eq!(spec.mode, AnswerMode::multi());
        assert_eq!(spec.kind, ChartKind::Bar);
        assert_eq!(spec.palette, Some(PaletteId::Pastel));
        assert!(spec.toggle);
        assert_ne!(spec.key(), ChartSpec::single("Freq_eval", "t").key());
    }

    #[test]
    fn test_absent_columns_dedup() {
        let page = PageLayout {
            title: "t",
            subtitle: "s",
            filters: vec![FilterSpec {
                column: "Age",
                label: "Age",
                kind: FilterKind::Range,
            }],
            tabs: vec![TabLayout {
                title: "tab",
                blocks: vec![
                    Block::Chart(ChartSpec::single("Classe", "t")),
                    Block::Row(vec![ChartSpec::single("Peur", "a"), ChartSpec::multi("Peur", "b")]),
                    Block::Note {
                        heading: "n",
                        items: vec!["x"],
                    },
                ],
            }],
        };
        let table = table_of(&[("Classe", strings(&["4A"]))]);
        assert_eq!(page.absent_columns(&table), vec!["Age", "Peur"]);
        assert_eq!(page.charts().count(), 3);
    }
}
