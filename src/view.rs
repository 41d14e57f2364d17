// The render pass as a pure function: loaded artifacts + config in, a plain
// view tree out. Nothing here touches egui state, so every property of the
// dashboard can be checked without a window.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use eframe::egui::Color32;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::cache::Artifact;
use crate::data::model::{CellValue, Table};
use crate::data::schema::{
    self, ANOMALY_SCHEMA, CLUSTER_LABEL, ISOLATION_SCORE, RECONSTRUCTION_ERROR, SchemaError,
};
use crate::data::stats::{describe, format_stat};

pub const PAGE_TITLE: &str = "Meteor ML Analysis Dashboard";
pub const PAGE_INTRO: &str =
    "View clustering results and anomaly detection outputs from your trained models.";

// ---------------------------------------------------------------------------
// View tree
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dataset,
    Clustering,
    Anomalies,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dataset, Tab::Clustering, Tab::Anomalies];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Dataset => "Dataset Preview",
            Tab::Clustering => "Clustering Results",
            Tab::Anomalies => "Anomaly Detection",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Info,
    Warning,
}

/// A status banner. `strong` is appended to `text` in bold.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
    pub strong: Option<String>,
}

impl Notice {
    fn new(tone: Tone, text: impl Into<String>) -> Self {
        Notice {
            tone,
            text: text.into(),
            strong: None,
        }
    }

    fn with_strong(mut self, strong: impl Into<String>) -> Self {
        self.strong = Some(strong.into());
        self
    }

    /// Banner text with the bold part inlined.
    pub fn plain_text(&self) -> String {
        match &self.strong {
            Some(strong) => format!("{}{strong}", self.text),
            None => self.text.clone(),
        }
    }
}

/// Rendered cells of a table; `index` holds the row labels.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub id: &'static str,
    pub columns: Vec<String>,
    pub index: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Tooltip text attached to a plotted position.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverPoint {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

/// Markers sharing one cluster label. Points are `[lon, lat]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSeries {
    pub label: String,
    pub color: Color32,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub series: Vec<MarkerSeries>,
    /// Hover targets in `[lon, lat]` space.
    pub hover: Arc<[HoverPoint]>,
    pub zoom: u8,
    pub height: f32,
    pub tile_url: String,
}

impl MapView {
    pub fn marker_count(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterView {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
    pub points: Vec<[f64; 2]>,
    pub hover: Arc<[HoverPoint]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Subheader(&'static str),
    Heading(&'static str),
    Notice(Notice),
    Table(TableView),
    Map(MapView),
    Scatter(ScatterView),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelView {
    pub tab: Tab,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    /// Outcome of loading the raw dataset, shown above the tabs.
    pub status: Notice,
    pub panels: Vec<PanelView>,
}

impl DashboardView {
    pub fn panel(&self, tab: Tab) -> Option<&PanelView> {
        self.panels.iter().find(|p| p.tab == tab)
    }
}

/// The three inputs of one render pass.
#[derive(Debug, Clone, Copy)]
pub struct Artifacts<'a> {
    pub dataset: &'a Artifact,
    pub clusters: &'a Artifact,
    pub anomalies: &'a Artifact,
}

// ---------------------------------------------------------------------------
// Render pass
// ---------------------------------------------------------------------------

pub fn render(artifacts: Artifacts<'_>, config: &DashboardConfig) -> DashboardView {
    DashboardView {
        status: dataset_status(artifacts.dataset, &config.dataset_path),
        panels: vec![
            dataset_panel(artifacts.dataset, config),
            cluster_panel(artifacts.clusters, config),
            anomaly_panel(artifacts.anomalies, config),
        ],
    }
}

fn dataset_status(artifact: &Artifact, path: &Path) -> Notice {
    match artifact {
        Artifact::Loaded(table) => {
            Notice::new(Tone::Success, "Loaded dataset: ")
                .with_strong(format!("{} rows", table.len()))
        }
        Artifact::Missing => Notice::new(
            Tone::Info,
            format!("Place `{}` in the working directory", path.display()),
        ),
        Artifact::Unreadable(reason) => Notice::new(
            Tone::Warning,
            format!("Could not read `{}`: {reason}", path.display()),
        ),
    }
}

fn dataset_panel(artifact: &Artifact, config: &DashboardConfig) -> PanelView {
    let mut blocks = vec![Block::Subheader("Dataset Preview")];

    match artifact.table().filter(|t| !t.is_empty()) {
        None => blocks.push(warning("No dataset found.")),
        Some(table) => {
            blocks.push(Block::Table(table_view(
                "dataset_preview",
                table,
                0..table.len().min(config.preview_rows),
            )));
            blocks.push(Block::Heading("Basic Statistics"));
            blocks.push(Block::Table(summary_view(table)));
        }
    }

    PanelView {
        tab: Tab::Dataset,
        blocks,
    }
}

fn cluster_panel(artifact: &Artifact, config: &DashboardConfig) -> PanelView {
    let mut blocks = vec![Block::Subheader("KMeans / DBSCAN / Agglomerative Clustering")];
    let path = config.clusters_path.display();

    match artifact {
        Artifact::Missing => blocks.push(warning(format!(
            "Clustering results not found. Expected: {path}"
        ))),
        Artifact::Unreadable(reason) => blocks.push(warning(format!(
            "Clustering results could not be read from {path}: {reason}"
        ))),
        Artifact::Loaded(table) => {
            blocks.push(Block::Notice(Notice::new(
                Tone::Success,
                "Clustering results loaded.",
            )));
            blocks.push(Block::Heading("Sample of Clustered Data"));
            blocks.push(Block::Table(table_view(
                "cluster_sample",
                table,
                0..table.len().min(config.cluster_sample_rows),
            )));
            blocks.push(Block::Heading("KMeans Cluster Map"));
            blocks.push(match map_view(table, config) {
                Ok(map) => Block::Map(map),
                Err(e) => warning(format!("Cannot draw the cluster map: {e}")),
            });
        }
    }

    PanelView {
        tab: Tab::Clustering,
        blocks,
    }
}

fn anomaly_panel(artifact: &Artifact, config: &DashboardConfig) -> PanelView {
    let mut blocks = vec![Block::Subheader(
        "Anomaly Detection (Isolation Forest + Autoencoder)",
    )];
    let path = config.anomalies_path.display();

    match artifact {
        Artifact::Missing => blocks.push(warning(format!(
            "Anomaly results missing. Expected: {path}"
        ))),
        Artifact::Unreadable(reason) => blocks.push(warning(format!(
            "Anomaly results could not be read from {path}: {reason}"
        ))),
        Artifact::Loaded(table) => {
            blocks.push(Block::Notice(Notice::new(
                Tone::Success,
                "Anomaly scores loaded successfully.",
            )));
            blocks.push(Block::Heading("Top Anomalies (Highest Reconstruction Error)"));
            blocks.push(match top_anomalies(table, config.top_anomalies) {
                Ok(view) => Block::Table(view),
                Err(e) => warning(format!("Cannot rank anomalies: {e}")),
            });
            blocks.push(Block::Heading("Anomaly Scatter Plot"));
            blocks.push(match scatter_view(table) {
                Ok(view) => Block::Scatter(view),
                Err(e) => warning(format!("Cannot draw the anomaly scatter plot: {e}")),
            });
        }
    }

    PanelView {
        tab: Tab::Anomalies,
        blocks,
    }
}

fn warning(text: impl Into<String>) -> Block {
    Block::Notice(Notice::new(Tone::Warning, text))
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Render the given rows, labelled by their position in the file.
fn table_view(id: &'static str, table: &Table, rows: impl IntoIterator<Item = usize>) -> TableView {
    let (index, rows): (Vec<String>, Vec<Vec<String>>) = rows
        .into_iter()
        .map(|row| {
            let cells: Vec<String> = table.row(row).into_iter().map(|v| v.to_string()).collect();
            (row.to_string(), cells)
        })
        .unzip();

    TableView {
        id,
        columns: table.column_names(),
        index,
        rows,
    }
}

fn summary_view(table: &Table) -> TableView {
    let summary = describe(table);
    TableView {
        id: "dataset_statistics",
        columns: summary.columns,
        index: summary.stat_names.iter().map(|s| s.to_string()).collect(),
        rows: summary
            .rows
            .iter()
            .map(|row| row.iter().map(format_stat).collect())
            .collect(),
    }
}

/// Row positions ordered by descending score. The sort is stable and missing
/// scores go last.
pub fn rank_descending(scores: &[Option<f64>]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| match (scores[a], scores[b]) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    order
}

fn top_anomalies(table: &Table, limit: usize) -> Result<TableView, SchemaError> {
    let scores = ANOMALY_SCHEMA.numeric(table, RECONSTRUCTION_ERROR)?;
    let ranked = rank_descending(&scores).into_iter().take(limit);
    Ok(table_view("top_anomalies", table, ranked))
}

// ---------------------------------------------------------------------------
// Charts
// ---------------------------------------------------------------------------

fn map_view(table: &Table, config: &DashboardConfig) -> Result<MapView, SchemaError> {
    let points = schema::cluster_points(table)?;

    let labels: BTreeSet<CellValue> = points.iter().map(|p| p.label.clone()).collect();
    let colors = ColorMap::new(&labels);

    let mut grouped: BTreeMap<&CellValue, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &points {
        grouped.entry(&p.label).or_default().push([p.lon, p.lat]);
    }

    let series = grouped
        .into_iter()
        .map(|(label, points)| MarkerSeries {
            label: format!("{CLUSTER_LABEL}={label}"),
            color: colors.color_for(label),
            points,
        })
        .collect();

    let hover = points
        .iter()
        .map(|p| HoverPoint {
            x: p.lon,
            y: p.lat,
            text: format!(
                "{}\n{CLUSTER_LABEL}={}\nreclat={:.4}\nreclong={:.4}",
                p.id, p.label, p.lat, p.lon
            ),
        })
        .collect();

    Ok(MapView {
        series,
        hover,
        zoom: config.map_zoom,
        height: config.map_height,
        tile_url: config.tile_url.clone(),
    })
}

fn scatter_view(table: &Table) -> Result<ScatterView, SchemaError> {
    let points = schema::anomaly_points(table)?;

    Ok(ScatterView {
        title: "Isolation Forest vs Autoencoder Error",
        x_label: ISOLATION_SCORE,
        y_label: RECONSTRUCTION_ERROR,
        points: points
            .iter()
            .map(|p| [p.isolation_score, p.reconstruction_error])
            .collect(),
        hover: points
            .iter()
            .map(|p| HoverPoint {
                x: p.isolation_score,
                y: p.reconstruction_error,
                text: format!(
                    "id={}\nyear={}\nmass={}\n{ISOLATION_SCORE}={:.4}\n{RECONSTRUCTION_ERROR}={:.4}",
                    p.id, p.year, p.mass, p.isolation_score, p.reconstruction_error
                ),
            })
            .collect(),
    })
}
