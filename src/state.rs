use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use anyhow::Result;

use crate::chart::ChartKind;
use crate::config::{DashboardConfig, DatasetSource};
use crate::data::aggregate::{self, AnswerMode, Distribution};
use crate::data::filter::{
    self, ColumnFilter, Criterion, FilterChain, apply_filter, available_values, chain_signature,
    filtered_indices, observed_range,
};
use crate::data::loader;
use crate::data::model::{CellValue, ColumnError, ResponseTable, TableView};
use crate::survey::Cohort;
use crate::survey::layout::{ChartSpec, FilterKind, PageLayout, Preset};

// ---------------------------------------------------------------------------
// Distribution cache
// ---------------------------------------------------------------------------

/// Distributions of the current filtered view, keyed by (column, mode).
/// Cleared whenever the filter chain's signature changes.
#[derive(Debug, Default)]
pub struct DistributionCache {
    signature: Option<u64>,
    entries: HashMap<(String, AnswerMode), Result<Distribution, ColumnError>>,
}

impl DistributionCache {
    /// Drop every entry if the filters changed since the last call.
    pub fn sync(&mut self, signature: u64) {
        if self.signature != Some(signature) {
            self.entries.clear();
            self.signature = Some(signature);
        }
    }

    pub fn get_or_compute(
        &mut self,
        column: &str,
        mode: AnswerMode,
        compute: impl FnOnce() -> Result<Distribution, ColumnError>,
    ) -> &Result<Distribution, ColumnError> {
        self.entries
            .entry((column.to_string(), mode))
            .or_insert_with(compute)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Per-cohort state
// ---------------------------------------------------------------------------

/// One questionnaire page: its table, filters and view settings.
pub struct CohortState {
    pub cohort: Cohort,
    pub layout: PageLayout,
    pub source: DatasetSource,

    /// Loaded table (None until a load succeeds).
    pub table: Option<ResponseTable>,

    /// One entry per layout filter whose column exists, in layout order.
    pub filters: FilterChain,

    /// Indices of respondents passing the current filters (cached).
    pub visible_rows: Vec<usize>,

    /// Pie / bar choice per chart key, when the user switched it.
    pub chart_kinds: HashMap<String, ChartKind>,

    pub active_tab: usize,

    /// Last load failure, shown in place of the page.
    pub load_error: Option<String>,

    cache: DistributionCache,
}

impl CohortState {
    pub fn new(cohort: Cohort, source: DatasetSource) -> Self {
        Self {
            cohort,
            layout: cohort.layout(),
            source,
            table: None,
            filters: FilterChain::new(),
            visible_rows: Vec::new(),
            chart_kinds: HashMap::new(),
            active_tab: 0,
            load_error: None,
            cache: DistributionCache::default(),
        }
    }

    /// Read the configured source file.
    pub fn load(&mut self) -> Result<()> {
        let table = loader::load_file(&self.source.path, &self.source.load_options())?;
        self.set_table(table);
        Ok(())
    }

    /// Load and record the outcome instead of returning it.
    pub fn reload(&mut self) {
        if let Err(e) = self.load() {
            log::error!("Failed to load {}: {e:#}", self.source.path.display());
            self.load_error = Some(format!("Erreur: {e:#}"));
        }
    }

    /// Ingest a newly loaded table, initialise filters with everything selected.
    pub fn set_table(&mut self, table: ResponseTable) {
        for column in self.layout.absent_columns(&table) {
            log::debug!("{}: column `{column}` absent, dependent widgets skipped", self.cohort.label());
        }

        self.filters = self
            .layout
            .filters
            .iter()
            .filter(|spec| table.has_column(spec.column))
            .map(|spec| ColumnFilter {
                column: spec.column.to_string(),
                criterion: match spec.kind {
                    FilterKind::Categories { .. } => Criterion::Categories(
                        table.unique_values.get(spec.column).cloned().unwrap_or_default(),
                    ),
                    FilterKind::Range => Criterion::unbounded_range(),
                },
            })
            .collect();

        self.table = Some(table);
        self.load_error = None;
        // A new table can share the old filter signature.
        self.cache = DistributionCache::default();
        self.refilter();
    }

    /// Recompute `visible_rows` after a filter change.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.visible_rows = filtered_indices(table, &self.filters);
            self.cache.sync(chain_signature(&self.filters));
        }
    }

    pub fn total_rows(&self) -> usize {
        self.table.as_ref().map_or(0, ResponseTable::len)
    }

    pub fn view(&self) -> Option<TableView<'_>> {
        self.table.as_ref().map(|t| t.view(&self.visible_rows))
    }

    /// Rows that reach filter `idx`, i.e. after the filters before it.
    pub fn rows_before(&self, idx: usize) -> Vec<usize> {
        let Some(table) = &self.table else {
            return Vec::new();
        };
        self.filters[..idx.min(self.filters.len())]
            .iter()
            .fold(table.all_rows(), |rows, f| apply_filter(table, &rows, f))
    }

    /// Values filter `idx` can offer, given the filters before it.
    pub fn filter_options(&self, idx: usize) -> BTreeSet<CellValue> {
        match (&self.table, self.filters.get(idx)) {
            (Some(table), Some(f)) => available_values(table, &self.rows_before(idx), &f.column),
            _ => BTreeSet::new(),
        }
    }

    /// Observed numeric span at filter `idx`.
    pub fn filter_span(&self, idx: usize) -> Option<(f64, f64)> {
        let table = self.table.as_ref()?;
        let f = self.filters.get(idx)?;
        observed_range(table, &self.rows_before(idx), &f.column)
    }

    fn selection_mut(&mut self, idx: usize) -> Option<&mut BTreeSet<CellValue>> {
        match self.filters.get_mut(idx) {
            Some(ColumnFilter {
                criterion: Criterion::Categories(selected),
                ..
            }) => Some(selected),
            _ => None,
        }
    }

    /// Toggle a single value in a categorical filter.
    pub fn toggle_value(&mut self, idx: usize, value: &CellValue) {
        if let Some(selected) = self.selection_mut(idx) {
            if !selected.remove(value) {
                selected.insert(value.clone());
            }
        }
        self.refilter();
    }

    /// Select every value currently offered.
    pub fn select_all(&mut self, idx: usize) {
        let options = self.filter_options(idx);
        self.replace_selection(idx, options);
    }

    /// Deselect everything: the page then shows no respondent.
    pub fn select_none(&mut self, idx: usize) {
        self.replace_selection(idx, BTreeSet::new());
    }

    /// Select the preset's values that are currently offered.
    pub fn apply_preset(&mut self, idx: usize, preset: &Preset) {
        let chosen = self
            .filter_options(idx)
            .into_iter()
            .filter(|v| preset.values.contains(&v.to_string().as_str()))
            .collect();
        self.replace_selection(idx, chosen);
    }

    fn replace_selection(&mut self, idx: usize, values: BTreeSet<CellValue>) {
        if let Some(selected) = self.selection_mut(idx) {
            *selected = values;
        }
        self.refilter();
    }

    pub fn set_range(&mut self, idx: usize, min: f64, max: f64) {
        if let Some(ColumnFilter {
            criterion: Criterion::Range { min: lo, max: hi },
            ..
        }) = self.filters.get_mut(idx)
        {
            *lo = min;
            *hi = max;
        }
        self.refilter();
    }

    /// The inclusive bounds filter `idx` currently applies.
    pub fn effective_range(&self, idx: usize) -> Option<(f64, f64)> {
        let table = self.table.as_ref()?;
        match self.filters.get(idx)? {
            ColumnFilter {
                column,
                criterion: Criterion::Range { min, max },
            } => filter::resolve_bounds(table, &self.rows_before(idx), column, *min, *max),
            _ => None,
        }
    }

    /// Distribution of a column over the visible rows, memoised until the
    /// filters change.
    pub fn distribution(&mut self, column: &str, mode: AnswerMode) -> Option<Result<Distribution, ColumnError>> {
        let table = self.table.as_ref()?;
        let rows = &self.visible_rows;
        let result = self
            .cache
            .get_or_compute(column, mode, || aggregate::distribution(&table.view(rows), column, mode));
        Some(result.clone())
    }

    pub fn chart_kind(&self, spec: &ChartSpec) -> ChartKind {
        self.chart_kinds.get(&spec.key()).copied().unwrap_or(spec.kind)
    }

    pub fn set_chart_kind(&mut self, spec: &ChartSpec, kind: ChartKind) {
        self.chart_kinds.insert(spec.key(), kind);
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Survey(Cohort),
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,
    pub page: Page,
    pub teachers: CohortState,
    pub students: CohortState,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            teachers: CohortState::new(Cohort::Teachers, config.data.teachers.clone()),
            students: CohortState::new(Cohort::Students, config.data.students.clone()),
            config,
            page: Page::Home,
            status_message: None,
        }
    }

    /// Load both tables once, at start-up.
    pub fn load_all(&mut self) {
        for cohort in Cohort::ALL {
            self.cohort_mut(cohort).reload();
        }
    }

    pub fn cohort_mut(&mut self, cohort: Cohort) -> &mut CohortState {
        match cohort {
            Cohort::Teachers => &mut self.teachers,
            Cohort::Students => &mut self.students,
        }
    }

    /// Replace a cohort's source with a user-picked file and load it.
    pub fn open_file(&mut self, cohort: Cohort, path: PathBuf) {
        let state = self.cohort_mut(cohort);
        state.source.path = path;
        state.reload();
        let error = state.load_error.clone();
        self.status_message = error;
        if self.status_message.is_none() {
            self.page = Page::Survey(cohort);
        }
    }

    /// Distinct establishments (`UAI`) among all teacher answers.
    pub fn establishment_count(&self) -> Option<usize> {
        let table = self.teachers.table.as_ref()?;
        let rows = table.all_rows();
        aggregate::distinct_count(&table.view(&rows), "UAI").ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{strings, table_of};

    fn students() -> CohortState {
        let table = table_of(&[
            ("Classe", strings(&["4A", "3B", "4A", "5C", "3B", "4A"])),
            (
                "Age",
                [11, 12, 13, 14, 15, 16]
                    .iter()
                    .map(|&a| Some(CellValue::Integer(a)))
                    .collect(),
            ),
            ("Peur", strings(&["Oui", "Non", "Oui, Parfois", "Non", "Parfois", "Oui"])),
        ]);
        let mut state = CohortState::new(Cohort::Students, DashboardConfig::default().data.students);
        state.set_table(table);
        state
    }

    fn class(s: &str) -> CellValue {
        CellValue::String(s.into())
    }

    #[test]
    fn test_initial_state_shows_everything() {
        let state = students();
        assert_eq!(state.filters.len(), 2);
        assert_eq!(state.visible_rows, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(state.effective_range(1), Some((11.0, 16.0)));
    }

    #[test]
    fn test_select_none_empties_view() {
        let mut state = students();
        state.select_none(0);
        assert!(state.visible_rows.is_empty());
        // Nothing reaches the age filter, so it has no span.
        assert_eq!(state.filter_span(1), None);

        state.select_all(0);
        assert_eq!(state.visible_rows.len(), 6);
    }

    #[test]
    fn test_toggle_and_range() {
        let mut state = students();
        state.toggle_value(0, &class("4A"));
        assert_eq!(state.visible_rows, vec![1, 3, 4]);

        // Age options follow the class filter.
        assert_eq!(state.filter_span(1), Some((12.0, 15.0)));

        state.set_range(1, 13.0, 15.0);
        assert_eq!(state.visible_rows, vec![3, 4]);

        state.toggle_value(0, &class("4A"));
        assert_eq!(state.visible_rows, vec![2, 3, 4]);
    }

    #[test]
    fn test_preset_keeps_offered_values_only() {
        let mut state = students();
        let preset = Preset {
            label: "Quatrièmes",
            values: &["4A", "4B"],
        };
        state.apply_preset(0, &preset);
        assert_eq!(state.visible_rows, vec![0, 2, 5]);
        match &state.filters[0].criterion {
            Criterion::Categories(set) => assert_eq!(set.len(), 1),
            other => panic!("unexpected criterion {other:?}"),
        }
    }

    #[test]
    fn test_distribution_cache_follows_filters() {
        let mut state = students();
        let all = state.distribution("Peur", AnswerMode::multi()).unwrap().unwrap();
        assert_eq!(all.total, 7);
        assert_eq!(state.cache.len(), 1);

        state.toggle_value(0, &class("4A"));
        assert_eq!(state.cache.len(), 0);
        let some = state.distribution("Peur", AnswerMode::multi()).unwrap().unwrap();
        assert_eq!(some.total, 3);

        let missing = state.distribution("Motiv_comm", AnswerMode::multi()).unwrap();
        assert!(missing.is_err());
    }

    #[test]
    fn test_new_table_discards_cached_distributions() {
        let mut state = CohortState::new(Cohort::Students, DashboardConfig::default().data.students);
        state.set_table(table_of(&[
            ("Classe", strings(&["4A", "3B"])),
            ("Peur", strings(&["Oui", "Oui"])),
        ]));
        let before = state.distribution("Peur", AnswerMode::multi()).unwrap().unwrap();
        assert_eq!(before.get("Oui"), Some(2));

        // Same filter values, so the same chain signature.
        state.set_table(table_of(&[
            ("Classe", strings(&["4A", "3B"])),
            ("Peur", strings(&["Non", "Non"])),
        ]));
        let after = state.distribution("Peur", AnswerMode::multi()).unwrap().unwrap();
        assert_eq!(after.get("Non"), Some(2));
        assert_eq!(after.get("Oui"), None);
    }

    #[test]
    fn test_chart_kind_override() {
        let mut state = students();
        let spec = ChartSpec::single("Classe", "t").bar();
        assert_eq!(state.chart_kind(&spec), ChartKind::Bar);
        state.set_chart_kind(&spec, ChartKind::Pie);
        assert_eq!(state.chart_kind(&spec), ChartKind::Pie);
    }

    #[test]
    fn test_missing_file_sets_error() {
        let mut state = CohortState::new(
            Cohort::Teachers,
            DatasetSource {
                path: PathBuf::from("does/not/exist.csv"),
                delimiter: ',',
                index_column: true,
            },
        );
        state.reload();
        assert!(state.table.is_none());
        assert!(state.load_error.is_some());
    }
}
