use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::Color32;
use serde::{Deserialize, Serialize};

use crate::color::{ColorMap, PaletteId};
use crate::data::aggregate::{AnswerMode, CrossTab, Distribution};

// ---------------------------------------------------------------------------
// Chart model: what to draw, independent of egui_plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartKind {
    #[default]
    Pie,
    Bar,
}

impl ChartKind {
    pub fn toggled(self) -> Self {
        match self {
            ChartKind::Pie => ChartKind::Bar,
            ChartKind::Bar => ChartKind::Pie,
        }
    }
}

/// One pie wedge.  Turns run clockwise from 12 o'clock, `0.0..=1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub label: String,
    pub count: usize,
    pub percentage: f64,
    pub start_turn: f64,
    pub end_turn: f64,
    pub color: Color32,
    pub hover: String,
}

impl Slice {
    /// Outline of the wedge on the unit circle, centre first, cut into
    /// pieces of at most a quarter turn so each one is convex.
    pub fn outlines(&self, steps_per_turn: usize) -> Vec<Vec<[f64; 2]>> {
        let sweep = self.end_turn - self.start_turn;
        if sweep <= 0.0 {
            return Vec::new();
        }
        let pieces = (sweep / 0.25).ceil().max(1.0) as usize;
        let piece_sweep = sweep / pieces as f64;
        let steps = ((piece_sweep * steps_per_turn as f64).ceil() as usize).max(2);

        (0..pieces)
            .map(|p| {
                let start = self.start_turn + piece_sweep * p as f64;
                let mut points = Vec::with_capacity(steps + 2);
                points.push([0.0, 0.0]);
                for i in 0..=steps {
                    let t = start + piece_sweep * i as f64 / steps as f64;
                    points.push(turn_to_point(t, 1.0));
                }
                points
            })
            .collect()
    }

    /// Where the in-slice text goes.
    pub fn label_anchor(&self) -> [f64; 2] {
        turn_to_point((self.start_turn + self.end_turn) / 2.0, 0.65)
    }

    /// Overlay text: percentage and name.
    pub fn label_text(&self) -> String {
        format!("{:.1}%\n{}", self.percentage, self.label)
    }
}

fn turn_to_point(turn: f64, radius: f64) -> [f64; 2] {
    let angle = FRAC_PI_2 - turn * TAU;
    [radius * angle.cos(), radius * angle.sin()]
}

#[derive(Debug, Clone, PartialEq)]
pub struct BarItem {
    pub label: String,
    pub x: f64,
    pub count: usize,
    pub percentage: f64,
    pub color: Color32,
    pub hover: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Marks {
    Pie(Vec<Slice>),
    Bar(Vec<BarItem>),
}

/// A renderable category chart.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    /// Column name with underscores replaced, for the x axis / legend title.
    pub axis_title: String,
    pub marks: Marks,
    /// On-canvas note, set for multi-answer distributions.
    pub annotation: Option<String>,
}

impl Chart {
    pub fn kind(&self) -> ChartKind {
        match self.marks {
            Marks::Pie(_) => ChartKind::Pie,
            Marks::Bar(_) => ChartKind::Bar,
        }
    }

    pub fn show_legend(&self) -> bool {
        self.kind() == ChartKind::Pie
    }

    pub fn is_empty(&self) -> bool {
        match &self.marks {
            Marks::Pie(s) => s.is_empty(),
            Marks::Bar(b) => b.is_empty(),
        }
    }

    /// Index of the wedge under `[x, y]`, if any.
    pub fn slice_at(&self, point: [f64; 2]) -> Option<usize> {
        let Marks::Pie(slices) = &self.marks else {
            return None;
        };
        let [x, y] = point;
        if x * x + y * y > 1.0 {
            return None;
        }
        let turn = ((FRAC_PI_2 - y.atan2(x)) / TAU).rem_euclid(1.0);
        slices
            .iter()
            .position(|s| turn >= s.start_turn && turn < s.end_turn)
    }
}

/// Hover description shared by pies and bars.
pub fn hover_text(label: &str, count: usize, percentage: f64) -> String {
    format!("{label}\nNombre: {count}\nPourcentage: {percentage:.1}%")
}

/// `Répartition par <column>`, flagged when answers are multiple.
pub fn default_title(column: &str, mode: AnswerMode) -> String {
    let base = format!("Répartition par {}", humanize(column).to_lowercase());
    match mode {
        AnswerMode::Single => base,
        AnswerMode::Multi { .. } => format!("{base} (réponses multiples)"),
    }
}

pub fn humanize(column: &str) -> String {
    column.replace('_', " ")
}

/// Turn a distribution into a pie or bar chart.
pub fn build_chart(
    dist: &Distribution,
    column: &str,
    title: Option<&str>,
    kind: ChartKind,
    palette: PaletteId,
) -> Chart {
    let colors = palette.colors(dist.len());
    let title = title
        .map(str::to_string)
        .unwrap_or_else(|| default_title(column, dist.mode));

    let marks = match kind {
        ChartKind::Pie => {
            let total = dist.total.max(1) as f64;
            let mut cursor = 0usize;
            let slices = dist
                .categories
                .iter()
                .zip(colors)
                .map(|(cat, color)| {
                    let start_turn = cursor as f64 / total;
                    cursor += cat.count;
                    let percentage = dist.percentage(cat.count);
                    Slice {
                        label: cat.label.clone(),
                        count: cat.count,
                        percentage,
                        start_turn,
                        end_turn: cursor as f64 / total,
                        color,
                        hover: hover_text(&cat.label, cat.count, percentage),
                    }
                })
                .collect();
            Marks::Pie(slices)
        }
        ChartKind::Bar => {
            let bars = dist
                .categories
                .iter()
                .zip(colors)
                .enumerate()
                .map(|(i, (cat, color))| {
                    let percentage = dist.percentage(cat.count);
                    BarItem {
                        label: cat.label.clone(),
                        x: i as f64,
                        count: cat.count,
                        percentage,
                        color,
                        hover: hover_text(&cat.label, cat.count, percentage),
                    }
                })
                .collect();
            Marks::Bar(bars)
        }
    };

    Chart {
        title,
        axis_title: humanize(column),
        marks,
        annotation: dist.total_annotation(),
    }
}

// ---------------------------------------------------------------------------
// Stacked bars from a cross tabulation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct StackSeries {
    pub name: String,
    pub color: Color32,
    pub counts: Vec<usize>,
}

/// One bar per row label, one stacked segment per column label.
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBars {
    pub title: String,
    pub x_title: String,
    pub legend_title: String,
    pub x_labels: Vec<String>,
    pub series: Vec<StackSeries>,
}

impl StackedBars {
    pub fn from_crosstab(tab: &CrossTab, title: &str, x_title: &str, legend_title: &str) -> Self {
        let colors = ColorMap::new(&tab.col_labels, PaletteId::Plotly);
        let series = colors
            .legend_entries()
            .into_iter()
            .enumerate()
            .map(|(c, (name, color))| StackSeries {
                name,
                color,
                counts: tab.column_series(c),
            })
            .collect();
        StackedBars {
            title: title.to_string(),
            x_title: x_title.to_string(),
            legend_title: legend_title.to_string(),
            x_labels: tab.row_labels.clone(),
            series,
        }
    }

    /// Height of the tallest stack.
    pub fn max_total(&self) -> usize {
        (0..self.x_labels.len())
            .map(|i| self.series.iter().map(|s| s.counts[i]).sum::<usize>())
            .max()
            .unwrap_or(0)
    }
}
