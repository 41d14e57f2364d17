mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;
mod view;

use std::path::Path;

use app::MeteorDashboardApp;
use config::{CONFIG_FILE, DashboardConfig};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::load_or_default(Path::new(CONFIG_FILE));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Meteor ML Analysis",
        options,
        Box::new(move |cc| {
            // Image loaders fetch and decode the map tiles.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(MeteorDashboardApp::new(config)))
        }),
    )
}
