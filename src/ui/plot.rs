use eframe::egui::{Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, Corner, GridMark, Legend, Plot, PlotPoint, PlotPoints, Points, Polygon, Text,
    uniform_grid_spacer,
};

use crate::chart::{BarItem, Chart, Marks, Slice, StackedBars};

const STEPS_PER_TURN: usize = 180;

// ---------------------------------------------------------------------------
// Category chart (pie or bar)
// ---------------------------------------------------------------------------

/// Render a pie or bar chart with its title.
pub fn category_chart(ui: &mut Ui, id: &str, chart: &Chart, height: f32) {
    ui.label(RichText::new(&chart.title).strong());

    if chart.is_empty() {
        ui.label(RichText::new("Aucune réponse pour cette question").weak());
        return;
    }

    match &chart.marks {
        Marks::Pie(slices) => pie(ui, id, chart, slices, height),
        Marks::Bar(bars) => bar(ui, id, chart, bars, height),
    }
}

fn pie(ui: &mut Ui, id: &str, chart: &Chart, slices: &[Slice], height: f32) {
    let mut plot = Plot::new(id)
        .height(height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-1.3)
        .include_x(1.3)
        .include_y(-1.25)
        .include_y(1.1);
    if chart.show_legend() {
        plot = plot.legend(Legend::default().position(Corner::RightTop));
    }

    let response = plot.show(ui, |plot_ui| {
        for slice in slices {
            for piece in slice.outlines(STEPS_PER_TURN) {
                plot_ui.polygon(
                    Polygon::new(PlotPoints::from(piece))
                        .name(&slice.label)
                        .fill_color(slice.color)
                        .stroke(Stroke::new(1.0, slice.color)),
                );
            }
            // Thin wedges get their text from the legend and hover only.
            if slice.percentage >= 4.0 {
                plot_ui.text(
                    Text::new(
                        PlotPoint::from(slice.label_anchor()),
                        RichText::new(slice.label_text()).size(11.0),
                    )
                    .color(Color32::BLACK),
                );
            }
        }
        if let Some(note) = &chart.annotation {
            plot_ui.text(
                Text::new(PlotPoint::new(-1.25, -1.2), RichText::new(note).italics())
                    .anchor(Align2::LEFT_BOTTOM)
                    .color(Color32::GRAY),
            );
        }
        plot_ui
            .pointer_coordinate()
            .and_then(|p| chart.slice_at([p.x, p.y]))
    });

    if let Some(hovered) = response.inner.and_then(|i| slices.get(i)) {
        response.response.on_hover_text_at_pointer(&hovered.hover);
    }
}

fn bar(ui: &mut Ui, id: &str, chart: &Chart, items: &[BarItem], height: f32) {
    let max_count = items.iter().map(|b| b.count).max().unwrap_or(0) as f64;
    let labels: Vec<String> = items.iter().map(|b| b.label.clone()).collect();
    let hovers: Vec<String> = items.iter().map(|b| b.hover.clone()).collect();

    let bars: Vec<Bar> = items
        .iter()
        .map(|b| {
            Bar::new(b.x, b.count as f64)
                .name(&b.label)
                .fill(b.color)
                .width(0.7)
        })
        .collect();

    let bar_chart = BarChart::new(bars).element_formatter(Box::new(move |bar, _chart| {
        hovers
            .get(bar.argument.round() as usize)
            .cloned()
            .unwrap_or_default()
    }));

    Plot::new(id)
        .height(height)
        .x_axis_label(&chart.axis_title)
        .y_axis_label("Nombre de réponses")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range| category_tick(&labels, mark.value))
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.6)
        .include_x(items.len() as f64 - 0.4)
        .include_y(0.0)
        .include_y((max_count * 1.2).max(1.0))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(bar_chart);
            for b in items {
                plot_ui.text(
                    Text::new(
                        PlotPoint::new(b.x, b.count as f64),
                        RichText::new(b.count.to_string()).strong(),
                    )
                    .anchor(Align2::CENTER_BOTTOM),
                );
            }
            if let Some(note) = &chart.annotation {
                plot_ui.text(
                    Text::new(PlotPoint::new(-0.55, (max_count * 1.18).max(1.0)), RichText::new(note).italics())
                        .anchor(Align2::LEFT_TOP)
                        .color(Color32::GRAY),
                );
            }
        });
}

/// Label for an integer tick, blank between categories.
fn category_tick(labels: &[String], value: f64) -> String {
    let i = value.round();
    if (value - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    labels.get(i as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Stacked cross-tab bars
// ---------------------------------------------------------------------------

pub fn stacked_bars(ui: &mut Ui, id: &str, stacked: &StackedBars, height: f32) {
    ui.label(RichText::new(&stacked.title).strong());
    if stacked.x_labels.is_empty() {
        ui.label(RichText::new("Aucune réponse pour cette question").weak());
        return;
    }
    ui.label(RichText::new(format!("Légende : {}", stacked.legend_title)).small());

    let mut charts: Vec<BarChart> = Vec::with_capacity(stacked.series.len());
    for series in &stacked.series {
        let bars: Vec<Bar> = series
            .counts
            .iter()
            .enumerate()
            .map(|(i, &c)| Bar::new(i as f64, c as f64).width(0.7))
            .collect();

        let x_labels = stacked.x_labels.clone();
        let name = series.name.clone();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(&series.name)
            .color(series.color)
            .element_formatter(Box::new(move |bar, _chart| {
                let x = category_tick(&x_labels, bar.argument);
                format!("{x}\n{name}: {}", bar.value)
            }))
            .stack_on(&below);
        charts.push(chart);
    }

    // Segment texts sit in the middle of each stacked piece.
    let mut segment_texts: Vec<(PlotPoint, usize)> = Vec::new();
    for i in 0..stacked.x_labels.len() {
        let mut base = 0usize;
        for series in &stacked.series {
            let c = series.counts[i];
            if c > 0 {
                segment_texts.push((PlotPoint::new(i as f64, base as f64 + c as f64 / 2.0), c));
            }
            base += c;
        }
    }

    let labels = stacked.x_labels.clone();
    let n = stacked.x_labels.len();
    let max_total = stacked.max_total() as f64;

    Plot::new(id)
        .height(height)
        .legend(Legend::default().position(Corner::RightTop))
        .x_axis_label(&stacked.x_title)
        .y_axis_label("Nombre")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark: GridMark, _range| category_tick(&labels, mark.value))
        .show_x(false)
        .show_y(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .include_x(-0.6)
        .include_x(n as f64 - 0.4)
        .include_y(0.0)
        .include_y((max_total * 1.1).max(1.0))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
            for (pos, c) in segment_texts {
                plot_ui.text(Text::new(pos, RichText::new(c.to_string()).small()).color(Color32::WHITE));
            }
        });
}

// ---------------------------------------------------------------------------
// Respondent map
// ---------------------------------------------------------------------------

/// Scatter of `[longitude, latitude]` points.
pub fn respondent_map(ui: &mut Ui, id: &str, points: &[[f64; 2]], height: f32) {
    if points.is_empty() {
        ui.label(RichText::new("Aucune coordonnée à afficher").weak());
        return;
    }

    // A degree of longitude shrinks with latitude.
    let mean_lat = points.iter().map(|p| p[1]).sum::<f64>() / points.len() as f64;
    let aspect = (1.0 / mean_lat.to_radians().cos().max(0.1)) as f32;

    Plot::new(id)
        .height(height)
        .data_aspect(aspect)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(PlotPoints::from(points.to_vec()))
                    .radius(4.0)
                    .color(Color32::from_rgb(0xFF, 0x4B, 0x4B))
                    .name("Répondants"),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_tick() {
        let labels = vec!["Oui".to_string(), "Non".to_string()];
        assert_eq!(category_tick(&labels, 0.0), "Oui");
        assert_eq!(category_tick(&labels, 1.0000000001), "Non");
        assert_eq!(category_tick(&labels, 0.5), "");
        assert_eq!(category_tick(&labels, 2.0), "");
        assert_eq!(category_tick(&labels, -1.0), "");
    }
}
