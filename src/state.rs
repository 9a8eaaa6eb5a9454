use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::color::ColorMap;
use crate::config::DashboardConfig;
use crate::data::filter::{PieSlice, filtered_indices, success_distribution, success_rate};
use crate::data::loader;
use crate::data::model::{LaunchDataset, LaunchRecord, PayloadRange, Selection, SiteFilter};

// ---------------------------------------------------------------------------
// Input events
// ---------------------------------------------------------------------------

/// A change coming from one of the dashboard controls.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The site dropdown changed.
    SiteChanged(SiteFilter),
    /// The payload slider moved. Bounds may arrive in either order.
    PayloadChanged { low: f64, high: f64 },
}

/// Which cached chart inputs an event recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Refreshed {
    pub pie: bool,
    pub scatter: bool,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct DashboardState {
    pub config: DashboardConfig,

    /// Loaded dataset (None until a file is loaded). Shared read-only.
    pub dataset: Option<Arc<LaunchDataset>>,

    /// Current dropdown + slider selection.
    pub selection: Selection,

    /// Slider handle positions as the user left them (may be inverted).
    pub slider: [f64; 2],

    /// Pie slices for the current site (cached).
    pub pie: Vec<PieSlice>,

    /// Indices of launches shown in the scatter chart (cached).
    pub scatter_indices: Vec<usize>,

    /// Success rate for the selected site.
    pub success_rate: Option<f64>,

    /// Scatter colours per booster version category.
    pub booster_colors: ColorMap,

    /// Pie colours per site, in dataset order.
    pub site_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl DashboardState {
    pub fn new(config: DashboardConfig) -> Self {
        let slider = [config.payload_slider.min, config.payload_slider.max];
        Self {
            config,
            dataset: None,
            selection: Selection {
                site: SiteFilter::All,
                payload: PayloadRange::new(slider[0], slider[1]),
            },
            slider,
            pie: Vec::new(),
            scatter_indices: Vec::new(),
            success_rate: None,
            booster_colors: ColorMap::default(),
            site_colors: ColorMap::default(),
            status_message: None,
        }
    }

    /// Load a file and make it the current dataset.
    pub fn load_path(&mut self, path: &Path) -> Result<()> {
        let dataset = loader::load_file(path)?;
        log::info!(
            "Loaded {} launches from {} ({} sites)",
            dataset.len(),
            path.display(),
            dataset.sites.len()
        );
        self.set_dataset(Arc::new(dataset));
        Ok(())
    }

    /// Ingest a dataset: reset the selection to all sites and the observed
    /// payload span, rebuild colours and recompute both charts.
    pub fn set_dataset(&mut self, dataset: Arc<LaunchDataset>) {
        self.slider = match dataset.payload_bounds {
            Some((lo, hi)) => [lo, hi],
            None => [self.config.payload_slider.min, self.config.payload_slider.max],
        };
        self.selection = Selection {
            site: SiteFilter::All,
            payload: PayloadRange::new(self.slider[0], self.slider[1]),
        };
        self.booster_colors = ColorMap::new(&dataset.booster_categories);
        self.site_colors = ColorMap::from_ordered(dataset.sites.iter().map(String::as_str));

        self.dataset = Some(dataset);
        self.status_message = None;
        self.refresh_pie();
        self.refresh_scatter();
    }

    /// Apply a control change and recompute the charts that depend on it.
    pub fn apply(&mut self, event: SelectionEvent) -> Refreshed {
        match event {
            SelectionEvent::SiteChanged(site) => {
                if site == self.selection.site {
                    return Refreshed::default();
                }
                self.selection.site = site;
                self.refresh_pie();
                self.refresh_scatter();
                Refreshed {
                    pie: true,
                    scatter: true,
                }
            }
            SelectionEvent::PayloadChanged { low, high } => {
                self.slider = [low, high];
                let range = PayloadRange::new(low, high);
                if range == self.selection.payload {
                    return Refreshed::default();
                }
                self.selection.payload = range;
                self.refresh_scatter();
                Refreshed {
                    pie: false,
                    scatter: true,
                }
            }
        }
    }

    fn refresh_pie(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.pie = success_distribution(ds, &self.selection.site);
        self.success_rate = success_rate(ds, &self.selection.site);
        log::debug!(
            "Pie for site {}: {} slices",
            self.selection.site,
            self.pie.len()
        );
    }

    fn refresh_scatter(&mut self) {
        let Some(ds) = &self.dataset else {
            return;
        };
        self.scatter_indices = filtered_indices(ds, self.selection.payload, &self.selection.site);
        log::debug!(
            "Scatter for site {} in [{}, {}] kg: {} launches",
            self.selection.site,
            self.selection.payload.low(),
            self.selection.payload.high(),
            self.scatter_indices.len()
        );
    }

    /// Launches currently shown in the scatter chart.
    pub fn scatter_records(&self) -> Vec<&LaunchRecord> {
        match &self.dataset {
            Some(ds) => self.scatter_indices.iter().map(|&i| &ds.records[i]).collect(),
            None => Vec::new(),
        }
    }

    /// Dropdown entries: "All Sites", the configured sites, then any site
    /// present in the data but missing from the configuration.
    pub fn site_options(&self) -> Vec<(SiteFilter, String)> {
        let mut options = vec![(SiteFilter::All, "All Sites".to_string())];
        options.extend(
            self.config
                .sites
                .iter()
                .map(|s| (SiteFilter::Site(s.value.clone()), s.label.clone())),
        );
        if let Some(ds) = &self.dataset {
            for site in &ds.sites {
                if !self.config.sites.iter().any(|s| &s.value == site) {
                    options.push((SiteFilter::Site(site.clone()), site.clone()));
                }
            }
        }
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Outcome;

    fn rec(site: &str, payload: f64, outcome: Outcome) -> LaunchRecord {
        LaunchRecord {
            flight_number: None,
            launch_site: site.to_string(),
            payload_mass_kg: payload,
            outcome,
            booster_version_category: "FT".to_string(),
        }
    }

    fn loaded() -> DashboardState {
        let mut state = DashboardState::new(DashboardConfig::default());
        state.set_dataset(Arc::new(LaunchDataset::from_records(vec![
            rec("KSC LC-39A", 500.0, Outcome::Success),
            rec("KSC LC-39A", 1500.0, Outcome::Failure),
            rec("VAFB SLC-4E", 800.0, Outcome::Success),
            rec("Boca Chica", 9000.0, Outcome::Success),
        ])));
        state
    }

    #[test]
    fn test_set_dataset_selects_everything() {
        let state = loaded();
        assert_eq!(state.selection.site, SiteFilter::All);
        assert_eq!(state.slider, [500.0, 9000.0]);
        assert_eq!(state.pie.len(), 3);
        assert_eq!(state.scatter_indices, vec![0, 1, 2, 3]);
        assert_eq!(state.success_rate, Some(0.75));
    }

    #[test]
    fn test_site_change_refreshes_both_charts() {
        let mut state = loaded();
        let refreshed = state.apply(SelectionEvent::SiteChanged(SiteFilter::Site(
            "KSC LC-39A".into(),
        )));
        assert_eq!(refreshed, Refreshed { pie: true, scatter: true });
        let labels: Vec<&str> = state.pie.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["0", "1"]);
        assert_eq!(state.scatter_indices, vec![0, 1]);
    }

    #[test]
    fn test_payload_change_refreshes_only_scatter() {
        let mut state = loaded();
        let pie_before = state.pie.clone();
        let refreshed = state.apply(SelectionEvent::PayloadChanged {
            low: 1000.0,
            high: 0.0,
        });
        assert_eq!(refreshed, Refreshed { pie: false, scatter: true });
        assert_eq!(state.slider, [1000.0, 0.0]);
        assert_eq!(state.selection.payload, PayloadRange::new(0.0, 1000.0));
        assert_eq!(state.pie, pie_before);
        let payloads: Vec<f64> = state
            .scatter_records()
            .iter()
            .map(|r| r.payload_mass_kg)
            .collect();
        assert_eq!(payloads, vec![500.0, 800.0]);
    }

    #[test]
    fn test_unchanged_selection_is_a_no_op() {
        let mut state = loaded();
        assert_eq!(
            state.apply(SelectionEvent::SiteChanged(SiteFilter::All)),
            Refreshed::default()
        );
        assert_eq!(
            state.apply(SelectionEvent::PayloadChanged {
                low: 9000.0,
                high: 500.0
            }),
            Refreshed::default()
        );
    }

    #[test]
    fn test_events_without_dataset_are_harmless() {
        let mut state = DashboardState::new(DashboardConfig::default());
        state.apply(SelectionEvent::SiteChanged(SiteFilter::Site("KSC LC-39A".into())));
        assert!(state.pie.is_empty());
        assert!(state.scatter_records().is_empty());
    }

    #[test]
    fn test_site_options_append_unconfigured_sites() {
        let state = loaded();
        let options = state.site_options();
        assert_eq!(options[0], (SiteFilter::All, "All Sites".to_string()));
        assert_eq!(options.len(), 1 + 4 + 1);
        assert_eq!(
            options.last(),
            Some(&(SiteFilter::Site("Boca Chica".into()), "Boca Chica".to_string()))
        );
    }

    #[test]
    fn test_states_share_one_dataset() {
        let mut a = loaded();
        let ds = a.dataset.clone().unwrap();
        let mut b = DashboardState::new(DashboardConfig::default());
        b.set_dataset(Arc::clone(&ds));
        a.apply(SelectionEvent::SiteChanged(SiteFilter::Site("VAFB SLC-4E".into())));
        assert_eq!(a.scatter_indices, vec![2]);
        assert_eq!(b.scatter_indices, vec![0, 1, 2, 3]);
        assert_eq!(Arc::strong_count(&ds), 3);
    }
}
