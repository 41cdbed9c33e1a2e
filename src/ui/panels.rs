use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::chart::{ChartKind, StackedBars, build_chart};
use crate::color::PaletteId;
use crate::data::aggregate;
use crate::data::filter::Criterion;
use crate::data::model::{CellValue, TableView};
use crate::state::{AppState, CohortState, Page};
use crate::survey::Cohort;
use crate::survey::layout::{Block, ChartSpec, FilterKind, Metric, Preset};
use crate::ui::plot;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / page switcher.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Fichier", |ui: &mut Ui| {
            for cohort in Cohort::ALL {
                if ui.button(format!("Ouvrir {}…", cohort.label())).clicked() {
                    open_file_dialog(state, cohort);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Recharger").clicked() {
                state.load_all();
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.page, Page::Home, "Accueil");
        for cohort in Cohort::ALL {
            ui.selectable_value(&mut state.page, Page::Survey(cohort), cohort.label());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, cohort: Cohort) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Ouvrir {}", cohort.label()))
        .add_filter("Fichiers pris en charge", &["csv", "tsv", "txt", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv", "txt"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(cohort, path);
    }
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// A filter edit collected while drawing, applied once the loop is done.
enum FilterAction {
    Toggle(usize, CellValue),
    All(usize),
    None(usize),
    Preset(usize, Preset),
    Range(usize, f64, f64),
}

/// Render the left filter panel for one cohort.
pub fn side_panel(ui: &mut Ui, state: &mut CohortState) {
    ui.heading("Filtres");
    ui.separator();

    if state.table.is_none() {
        ui.label("Aucune donnée chargée.");
        return;
    }

    let mut actions = Vec::new();

    ScrollArea::vertical()
        .id_salt("filters")
        .auto_shrink([false, false])
        .max_height(ui.available_height() - 80.0)
        .show(ui, |ui: &mut Ui| {
            for (idx, filter) in state.filters.iter().enumerate() {
                let Some(spec) = state.layout.filters.iter().find(|f| f.column == filter.column)
                else {
                    continue;
                };
                ui.strong(spec.label);

                match (&filter.criterion, &spec.kind) {
                    (Criterion::Categories(selected), FilterKind::Categories { presets }) => {
                        let options = state.filter_options(idx);

                        ui.horizontal_wrapped(|ui: &mut Ui| {
                            if ui.small_button("Tout").clicked() {
                                actions.push(FilterAction::All(idx));
                            }
                            if ui.small_button("Aucun").clicked() {
                                actions.push(FilterAction::None(idx));
                            }
                            for preset in presets {
                                if ui.small_button(preset.label).clicked() {
                                    actions.push(FilterAction::Preset(idx, preset.clone()));
                                }
                            }
                        });

                        let n_selected = options.iter().filter(|v| selected.contains(v)).count();
                        let header = format!("Sélection  ({n_selected}/{})", options.len());
                        egui::CollapsingHeader::new(header)
                            .id_salt(&filter.column)
                            .default_open(true)
                            .show(ui, |ui: &mut Ui| {
                                for value in &options {
                                    let mut checked = selected.contains(value);
                                    if ui.checkbox(&mut checked, value.to_string()).changed() {
                                        actions.push(FilterAction::Toggle(idx, value.clone()));
                                    }
                                }
                            });

                        if n_selected == 0 {
                            ui.label(
                                RichText::new(format!("⚠ Aucune valeur sélectionnée : {}", spec.label))
                                    .color(Color32::from_rgb(0xE0, 0x9B, 0x00)),
                            );
                        }
                    }
                    (Criterion::Range { .. }, FilterKind::Range) => {
                        let (Some((lo_span, hi_span)), Some((lo, hi))) =
                            (state.filter_span(idx), state.effective_range(idx))
                        else {
                            ui.label(RichText::new("Aucune valeur disponible").weak());
                            continue;
                        };
                        let integral = lo_span.fract() == 0.0 && hi_span.fract() == 0.0;
                        let (mut new_lo, mut new_hi) = (lo, hi);
                        let mut changed = false;
                        for (value, text) in [(&mut new_lo, "min"), (&mut new_hi, "max")] {
                            let mut slider = egui::Slider::new(value, lo_span..=hi_span).text(text);
                            if integral {
                                slider = slider.step_by(1.0);
                            }
                            changed |= ui.add(slider).changed();
                        }
                        if changed {
                            if new_lo > new_hi {
                                std::mem::swap(&mut new_lo, &mut new_hi);
                            }
                            actions.push(FilterAction::Range(idx, new_lo, new_hi));
                        }
                    }
                    _ => {}
                }
                ui.separator();
            }
        });

    for action in actions {
        match action {
            FilterAction::Toggle(idx, value) => state.toggle_value(idx, &value),
            FilterAction::All(idx) => state.select_all(idx),
            FilterAction::None(idx) => state.select_none(idx),
            FilterAction::Preset(idx, preset) => state.apply_preset(idx, &preset),
            FilterAction::Range(idx, lo, hi) => state.set_range(idx, lo, hi),
        }
    }

    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        metric(ui, "Total filtré", state.visible_rows.len().to_string());
        metric(ui, "Total initial", state.total_rows().to_string());
    });
}

fn metric(ui: &mut Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).small());
            ui.label(RichText::new(value).size(22.0).strong());
        });
    });
}

// ---------------------------------------------------------------------------
// Home page
// ---------------------------------------------------------------------------

pub fn home(ui: &mut Ui, state: &AppState) {
    ui.heading("Analyse des questionnaires MotivIA");
    ui.label(RichText::new("Académie d'Orléans-Tours").size(16.0));
    ui.add_space(8.0);

    ui.label(
        "Cette application permet d'analyser les données des questionnaires collectés \
         auprès des professeurs et des élèves.",
    );
    ui.add_space(8.0);
    ui.strong("Navigation");
    ui.label("• Données Professeurs : analyse des réponses des enseignants");
    ui.label("• Données Élèves : analyse des réponses des élèves");
    ui.add_space(8.0);
    ui.strong("Objectifs de l'étude");
    ui.label(
        "Comprendre les pratiques d'évaluation et de feedback dans l'académie, en particulier \
         l'usage des commentaires écrits et oraux, ainsi que les perspectives sur l'utilisation de l'IA.",
    );
    ui.separator();

    match (&state.teachers.table, &state.students.table) {
        (Some(teachers), Some(students)) => {
            ui.horizontal(|ui: &mut Ui| {
                metric(ui, "Total Professeurs", teachers.len().to_string());
                metric(ui, "Total Élèves", students.len().to_string());
                if let Some(n) = state.establishment_count() {
                    metric(ui, "Établissements", n.to_string());
                }
            });
        }
        _ => {
            ui.label(
                RichText::new("Chargez les données pour voir les statistiques globales")
                    .color(Color32::LIGHT_BLUE),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Survey page
// ---------------------------------------------------------------------------

/// Render one cohort page: header, tabs and the active tab's blocks.
pub fn survey_page(ui: &mut Ui, state: &mut CohortState, chart_height: f32, palette: PaletteId) {
    ui.heading(state.layout.title);
    ui.label(RichText::new(state.layout.subtitle).size(16.0));

    if let Some(err) = &state.load_error {
        ui.label(RichText::new(err).color(Color32::RED));
        return;
    }
    let Some(view) = state.view() else {
        ui.label("Aucune donnée chargée.");
        return;
    };
    if view.is_empty() {
        ui.label(
            RichText::new("Aucune donnée ne correspond aux filtres sélectionnés")
                .color(Color32::from_rgb(0xE0, 0x9B, 0x00)),
        );
    }

    egui::CollapsingHeader::new("Données brutes")
        .id_salt((state.cohort, "raw"))
        .default_open(false)
        .show(ui, |ui: &mut Ui| raw_table(ui, &view));

    ui.separator();
    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (i, tab) in state.layout.tabs.iter().enumerate() {
            ui.selectable_value(&mut state.active_tab, i, tab.title);
        }
    });
    ui.separator();

    let Some(tab) = state.layout.tabs.get(state.active_tab).cloned() else {
        return;
    };

    ScrollArea::vertical()
        .id_salt((state.cohort, state.active_tab))
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for block in &tab.blocks {
                draw_block(ui, state, block, chart_height, palette);
                ui.add_space(12.0);
            }
        });
}

fn draw_block(ui: &mut Ui, state: &mut CohortState, block: &Block, height: f32, palette: PaletteId) {
    let Some(table) = &state.table else {
        return;
    };
    let missing = block
        .required_columns()
        .into_iter()
        .any(|c| !table.has_column(c));

    match block {
        Block::Heading(text) => {
            ui.heading(*text);
        }
        Block::Note { heading, items } => {
            ui.label(*heading);
            for item in items {
                ui.label(RichText::new(format!("• {item}")).italics());
            }
        }
        Block::Metrics(metrics) => {
            let view = table.view(&state.visible_rows);
            ui.horizontal(|ui: &mut Ui| {
                for m in metrics {
                    let value = match m {
                        Metric::RowCount { .. } => Some(view.len()),
                        Metric::Distinct { column, .. } => aggregate::distinct_count(&view, column).ok(),
                    };
                    if let Some(value) = value {
                        metric(ui, m.label(), value.to_string());
                    }
                }
            });
        }
        _ if missing => {}
        Block::Map {
            latitude,
            longitude,
        } => {
            let view = table.view(&state.visible_rows);
            let points = aggregate::geo_points(&view, latitude, longitude).unwrap_or_default();
            egui::CollapsingHeader::new("Carte")
                .id_salt((state.cohort, "map"))
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    plot::respondent_map(ui, &format!("{:?}-map", state.cohort), &points, height);
                });
        }
        Block::CrossTab {
            rows,
            stack,
            title,
            x_title,
            legend_title,
        } => {
            let view = table.view(&state.visible_rows);
            if let Ok(tab) = aggregate::crosstab(&view, rows, stack) {
                let stacked = StackedBars::from_crosstab(&tab, title, x_title, legend_title);
                plot::stacked_bars(ui, &format!("{:?}-{rows}-{stack}", state.cohort), &stacked, height);
            }
        }
        Block::Row(specs) => {
            ui.columns(specs.len(), |columns: &mut [Ui]| {
                for (ui, spec) in columns.iter_mut().zip(specs) {
                    chart_cell(ui, state, spec, height, palette);
                }
            });
        }
        Block::Chart(spec) => chart_cell(ui, state, spec, height, palette),
    }
}

/// One category chart with its optional pie / bar switch.
fn chart_cell(ui: &mut Ui, state: &mut CohortState, spec: &ChartSpec, height: f32, palette: PaletteId) {
    let Some(table) = &state.table else {
        return;
    };
    if !spec.status(table).is_present() {
        return;
    }

    let mut kind = state.chart_kind(spec);
    if spec.toggle {
        let mut as_bar = kind == ChartKind::Bar;
        if ui.checkbox(&mut as_bar, "Diagramme en barre").changed() {
            kind = kind.toggled();
            state.set_chart_kind(spec, kind);
        }
    }

    let Some(Ok(dist)) = state.distribution(spec.column, spec.mode) else {
        return;
    };
    let chart = build_chart(&dist, spec.column, spec.title, kind, spec.palette.unwrap_or(palette));
    plot::category_chart(ui, &format!("{:?}-{}", state.cohort, spec.key()), &chart, height);
}

// ---------------------------------------------------------------------------
// Raw data
// ---------------------------------------------------------------------------

fn raw_table(ui: &mut Ui, view: &TableView<'_>) {
    let columns = &view.table.column_names;
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .max_scroll_height(300.0)
        .columns(Column::auto().at_least(60.0).clip(true), columns.len())
        .header(20.0, |mut header| {
            for name in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, view.len(), |mut row| {
                let respondent = &view.table.respondents[view.rows[row.index()]];
                for name in columns {
                    row.col(|ui: &mut Ui| {
                        let cell = respondent.get(name);
                        if !cell.is_null() {
                            ui.label(cell.to_string());
                        }
                    });
                }
            });
        });
}
