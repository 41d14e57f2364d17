// Cluster map: OpenStreetMap raster tiles drawn as plot images in Web
// Mercator space, with one marker series per cluster label on top.
//
// Plot coordinates cover the world as the unit square, x growing east and
// y growing north, so tile (tx, ty) at zoom z spans
// x ∈ [tx, tx+1] / 2^z and y ∈ [2^z - ty - 1, 2^z - ty] / 2^z.

use std::f64::consts::PI;
use std::sync::Arc;

use eframe::egui::{self, RichText, TextureId, Ui, Vec2};
use eframe::egui::load::{SizeHint, TexturePoll};
use egui_plot::{Legend, Plot, PlotImage, PlotPoint, PlotPoints, Points};

use crate::ui::plot::nearest;
use crate::view::MapView;

/// Latitude where the Web Mercator square ends.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Upper bound on the base layer zoom, keeping the tile count at 4^4.
const MAX_TILE_ZOOM: u8 = 4;

const ATTRIBUTION: &str = "© OpenStreetMap contributors";

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Longitude/latitude in degrees → unit-square plot coordinates.
pub fn project(lon: f64, lat: f64) -> [f64; 2] {
    let phi = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (lon + 180.0) / 360.0;
    let y = 0.5 + (PI / 4.0 + phi / 2.0).tan().ln() / (2.0 * PI);
    [x, y]
}

/// Inverse of [`project`].
pub fn unproject(x: f64, y: f64) -> (f64, f64) {
    let lon = x * 360.0 - 180.0;
    let lat = (2.0 * ((y - 0.5) * 2.0 * PI).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub url: String,
    pub center: [f64; 2],
    pub size: f64,
}

/// Every tile of the base layer at `zoom`.
pub fn tiles(url_template: &str, zoom: u8) -> Vec<Tile> {
    let zoom = zoom.min(MAX_TILE_ZOOM);
    let n = 1u32 << zoom;
    let size = 1.0 / f64::from(n);

    (0..n)
        .flat_map(|ty| (0..n).map(move |tx| (tx, ty)))
        .map(|(tx, ty)| Tile {
            url: url_template
                .replace("{z}", &zoom.to_string())
                .replace("{x}", &tx.to_string())
                .replace("{y}", &ty.to_string()),
            center: [
                (f64::from(tx) + 0.5) * size,
                1.0 - (f64::from(ty) + 0.5) * size,
            ],
            size,
        })
        .collect()
}

/// Tiles whose image is already decoded. Pending tiles show up on a later frame.
fn ready_tiles(ui: &Ui, map: &MapView) -> Vec<(Tile, TextureId)> {
    tiles(&map.tile_url, map.zoom)
        .into_iter()
        .filter_map(|tile| {
            match ui
                .ctx()
                .try_load_texture(&tile.url, egui::TextureOptions::LINEAR, SizeHint::default())
            {
                Ok(TexturePoll::Ready { texture }) => Some((tile, texture.id)),
                Ok(TexturePoll::Pending { .. }) => None,
                Err(e) => {
                    log::debug!("Tile {} unavailable: {e}", tile.url);
                    None
                }
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Map widget
// ---------------------------------------------------------------------------

pub fn cluster_map(ui: &mut Ui, map: &MapView) {
    let tiles = ready_tiles(ui, map);
    let hover = Arc::clone(&map.hover);

    Plot::new("cluster_map")
        .height(map.height)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .include_x(0.0)
        .include_x(1.0)
        .include_y(0.0)
        .include_y(1.0)
        .legend(Legend::default())
        .label_formatter(move |name, value| {
            if name.is_empty() {
                return String::new();
            }
            let (lon, lat) = unproject(value.x, value.y);
            nearest(&hover, lon, lat)
                .map(|h| h.text.clone())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (tile, texture) in &tiles {
                plot_ui.image(PlotImage::new(
                    *texture,
                    PlotPoint::new(tile.center[0], tile.center[1]),
                    Vec2::splat(tile.size as f32),
                ));
            }
            for series in &map.series {
                let points: PlotPoints = series
                    .points
                    .iter()
                    .map(|&[lon, lat]| project(lon, lat))
                    .collect();
                plot_ui.points(
                    Points::new(points)
                        .color(series.color)
                        .radius(3.5)
                        .name(&series.label),
                );
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(format!("{} meteorites plotted", map.marker_count())).weak());
        ui.separator();
        ui.label(RichText::new(ATTRIBUTION).small().weak());
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projection_round_trips_inside_the_mercator_square() {
        for &(lon, lat) in &[(0.0, 0.0), (6.08333, 50.775), (-113.0, 54.21667), (179.0, -80.0)] {
            let [x, y] = project(lon, lat);
            assert!((0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y));
            let (lon2, lat2) = unproject(x, y);
            assert!((lon - lon2).abs() < 1e-9);
            assert!((lat - lat2).abs() < 1e-9);
        }
        let [x, y] = project(0.0, 0.0);
        assert!((x - 0.5).abs() < 1e-12 && (y - 0.5).abs() < 1e-12);
        assert!((project(0.0, 90.0)[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_one_uses_four_tiles() {
        let tiles = tiles("https://tile.openstreetmap.org/{z}/{x}/{y}.png", 1);
        assert_eq!(tiles.len(), 4);
        assert_eq!(tiles[0].url, "https://tile.openstreetmap.org/1/0/0.png");
        assert_eq!(tiles[0].center, [0.25, 0.75]);
        assert_eq!(tiles[3].url, "https://tile.openstreetmap.org/1/1/1.png");
        assert_eq!(tiles[3].center, [0.75, 0.25]);
        assert_eq!(tiles[0].size, 0.5);
    }

    #[test]
    fn base_layer_zoom_is_capped() {
        assert_eq!(tiles("{z}/{x}/{y}", 12).len(), 256);
    }
}
