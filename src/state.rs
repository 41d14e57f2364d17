use crate::config::DashboardConfig;
use crate::data::cache::CachedArtifact;
use crate::view::{Artifacts, DashboardView, Tab, render};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Tab currently shown in the central panel.
    pub selected_tab: Tab,

    /// Backing files and the view last built from them.
    pub render: RenderCache,
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            selected_tab: Tab::Dataset,
            render: RenderCache::new(config),
        }
    }
}

/// Memoises the render pass: the view is rebuilt only when one of the three
/// artifacts changed on disk since the previous frame.
pub struct RenderCache {
    config: DashboardConfig,
    dataset: CachedArtifact,
    clusters: CachedArtifact,
    anomalies: CachedArtifact,
    view: Option<DashboardView>,
}

impl RenderCache {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            dataset: CachedArtifact::new(&config.dataset_path),
            clusters: CachedArtifact::new(&config.clusters_path),
            anomalies: CachedArtifact::new(&config.anomalies_path),
            config,
            view: None,
        }
    }

    /// Check the artifact files and return the current view.
    pub fn refresh(&mut self) -> &DashboardView {
        let mut changed = false;
        for cached in [&mut self.dataset, &mut self.clusters, &mut self.anomalies] {
            changed |= cached.refresh();
        }

        let view = match self.view.take() {
            Some(view) if !changed => view,
            _ => {
                log::debug!("Rebuilding dashboard view");
                render(
                    Artifacts {
                        dataset: self.dataset.artifact(),
                        clusters: self.clusters.artifact(),
                        anomalies: self.anomalies.artifact(),
                    },
                    &self.config,
                )
            }
        };
        self.view.insert(view)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::Tone;

    #[test]
    fn view_follows_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let config = DashboardConfig {
            dataset_path: dir.path().join("meteor_data.csv"),
            clusters_path: dir.path().join("clusters.parquet"),
            anomalies_path: dir.path().join("anomaly_scores.parquet"),
            ..DashboardConfig::default()
        };
        let mut state = AppState::new(config.clone());
        assert_eq!(state.selected_tab, Tab::Dataset);

        let first = state.render.refresh().clone();
        assert_eq!(first.status.tone, Tone::Info);
        assert_eq!(state.render.refresh(), &first);

        std::fs::write(&config.dataset_path, "id,mass\n1,21\n2,720\n").unwrap();
        let loaded = state.render.refresh();
        assert_eq!(loaded.status.tone, Tone::Success);
        assert_eq!(loaded.status.plain_text(), "Loaded dataset: 2 rows");
    }
}
