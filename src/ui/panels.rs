use eframe::egui::{self, Align, Color32, Layout, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::ui::{map, plot};
use crate::view::{
    Block, DashboardView, Notice, PAGE_INTRO, PAGE_TITLE, PanelView, Tab, TableView, Tone,
};

// ---------------------------------------------------------------------------
// Top panel – title, dataset status, tab bar
// ---------------------------------------------------------------------------

/// Render the page header and the tab selector.
pub fn header(ui: &mut Ui, view: &DashboardView, selected_tab: &mut Tab) {
    ui.add_space(6.0);
    ui.heading(RichText::new(PAGE_TITLE).size(24.0).strong());
    ui.label(PAGE_INTRO);
    ui.add_space(4.0);
    notice(ui, &view.status);
    ui.add_space(4.0);
    tab_bar(ui, selected_tab);
    ui.add_space(2.0);
}

fn tab_bar(ui: &mut Ui, selected_tab: &mut Tab) {
    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui
                .selectable_label(*selected_tab == tab, tab.label())
                .clicked()
            {
                *selected_tab = tab;
            }
        }
    });
}

// ---------------------------------------------------------------------------
// Central panel – one tab's blocks, top to bottom
// ---------------------------------------------------------------------------

pub fn show_panel(ui: &mut Ui, panel: &PanelView) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for block in &panel.blocks {
                match block {
                    Block::Subheader(text) => {
                        ui.heading(*text);
                        ui.separator();
                    }
                    Block::Heading(text) => {
                        ui.add_space(10.0);
                        ui.label(RichText::new(*text).size(17.0).strong());
                    }
                    Block::Notice(n) => notice(ui, n),
                    Block::Table(t) => table(ui, t),
                    Block::Map(m) => map::cluster_map(ui, m),
                    Block::Scatter(s) => plot::anomaly_scatter(ui, s),
                }
                ui.add_space(4.0);
            }
        });
}

/// Coloured status banner.
fn notice(ui: &mut Ui, notice: &Notice) {
    let (icon, fg, bg) = match notice.tone {
        Tone::Success => ("✔", Color32::from_rgb(33, 195, 84), Color32::from_rgba_unmultiplied(33, 195, 84, 28)),
        Tone::Info => ("ℹ", Color32::from_rgb(28, 131, 225), Color32::from_rgba_unmultiplied(28, 131, 225, 28)),
        Tone::Warning => ("⚠", Color32::from_rgb(230, 160, 0), Color32::from_rgba_unmultiplied(255, 189, 69, 36)),
    };

    egui::Frame::default()
        .fill(bg)
        .inner_margin(8.0)
        .show(ui, |ui: &mut Ui| {
            ui.set_width(ui.available_width());
            ui.horizontal_wrapped(|ui: &mut Ui| {
                ui.spacing_mut().item_spacing.x = 0.0;
                ui.colored_label(fg, format!("{icon}  {}", notice.text));
                if let Some(strong) = &notice.strong {
                    ui.label(RichText::new(strong).color(fg).strong());
                }
            });
        });
}

/// Striped table with the row labels in a leading column.
fn table(ui: &mut Ui, view: &TableView) {
    ui.push_id(view.id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .vscroll(false)
                .cell_layout(Layout::left_to_right(Align::Center))
                .column(Column::auto())
                .columns(Column::auto().at_least(60.0), view.columns.len())
                .header(20.0, |mut header| {
                    header.col(|_ui| {});
                    for name in &view.columns {
                        header.col(|ui| {
                            ui.strong(name.as_str());
                        });
                    }
                })
                .body(|mut body| {
                    for (label, cells) in view.index.iter().zip(&view.rows) {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(RichText::new(label.as_str()).weak());
                            });
                            for cell in cells {
                                row.col(|ui| {
                                    ui.label(cell.as_str());
                                });
                            }
                        });
                    }
                });
        });
    });
}
