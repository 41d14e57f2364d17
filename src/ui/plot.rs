use std::sync::Arc;

use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Plot, PlotPoints, Points};

use crate::view::{HoverPoint, ScatterView};

const SCATTER_HEIGHT: f32 = 450.0;
const SERIES_NAME: &str = "observations";

// ---------------------------------------------------------------------------
// Anomaly scatter plot
// ---------------------------------------------------------------------------

/// Isolation-forest score against reconstruction error, one marker per row.
pub fn anomaly_scatter(ui: &mut Ui, view: &ScatterView) {
    ui.label(RichText::new(view.title).strong());

    let hover = Arc::clone(&view.hover);

    Plot::new("anomaly_scatter")
        .height(SCATTER_HEIGHT)
        .x_axis_label(view.x_label)
        .y_axis_label(view.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(move |name, value| {
            if name.is_empty() {
                return format!("x = {:.4}\ny = {:.4}", value.x, value.y);
            }
            nearest(&hover, value.x, value.y)
                .map(|h| h.text.clone())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            let points: PlotPoints = view.points.iter().copied().collect();
            plot_ui.points(
                Points::new(points)
                    .color(Color32::from_rgb(99, 110, 250))
                    .radius(3.0)
                    .name(SERIES_NAME),
            );
        });
}

/// Tooltip of the hover target closest to `(x, y)`.
pub fn nearest(points: &[HoverPoint], x: f64, y: f64) -> Option<&HoverPoint> {
    let dist = |p: &HoverPoint| (p.x - x).powi(2) + (p.y - y).powi(2);
    points.iter().min_by(|a, b| dist(a).total_cmp(&dist(b)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(x: f64, y: f64, text: &str) -> HoverPoint {
        HoverPoint {
            x,
            y,
            text: text.to_string(),
        }
    }

    #[test]
    fn nearest_picks_the_closest_target() {
        let points = [target(0.1, 0.2, "a"), target(0.5, 0.9, "b"), target(0.4, 0.1, "c")];
        assert_eq!(nearest(&points, 0.5, 0.9).unwrap().text, "b");
        assert_eq!(nearest(&points, 0.35, 0.12).unwrap().text, "c");
        assert!(nearest(&[], 0.0, 0.0).is_none());
    }
}
