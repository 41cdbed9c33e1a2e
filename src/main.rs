mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod survey;
mod ui;

use app::MotiviaApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::discover().unwrap_or_else(|e| {
        log::error!("{e:#}; falling back to default configuration");
        DashboardConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "MotivIA - Analyse des questionnaires",
        options,
        Box::new(|_cc| Ok(Box::new(MotiviaApp::new(config)))),
    )
}
