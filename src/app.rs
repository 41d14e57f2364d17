use std::time::Duration;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::panels;

/// How often to look for artifacts appearing on disk without user input.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct MeteorDashboardApp {
    pub state: AppState,
}

impl MeteorDashboardApp {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for MeteorDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint_after(POLL_INTERVAL);

        let view = self.state.render.refresh();
        let selected_tab = &mut self.state.selected_tab;

        // ---- Top panel: title, load status, tabs ----
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            panels::header(ui, view, selected_tab);
        });

        // ---- Central panel: selected tab ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(panel) = view.panel(*selected_tab) {
                panels::show_panel(ui, panel);
            }
        });
    }
}
