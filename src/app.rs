use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::{AppState, Page};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MotiviaApp {
    pub state: AppState,
}

impl MotiviaApp {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(config);
        state.load_all();
        Self { state }
    }
}

impl eframe::App for MotiviaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        let height = self.state.config.charts.height;
        let palette = self.state.config.charts.palette;

        match self.state.page {
            Page::Home => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        panels::home(ui, &self.state);
                    });
                });
            }
            Page::Survey(cohort) => {
                // ---- Left side panel: filters ----
                egui::SidePanel::left(format!("filter_panel_{cohort:?}"))
                    .default_width(260.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        panels::side_panel(ui, self.state.cohort_mut(cohort));
                    });

                // ---- Central panel: tabs and charts ----
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::survey_page(ui, self.state.cohort_mut(cohort), height, palette);
                });
            }
        }
    }
}
