use std::collections::BTreeMap;

use super::model::{LaunchDataset, LaunchRecord, Outcome, PayloadRange, SiteFilter};

// ---------------------------------------------------------------------------
// Success distribution (pie chart)
// ---------------------------------------------------------------------------

/// One labelled slice of the success pie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PieSlice {
    /// Site name, or the class digit (`"0"` / `"1"`) for a single-site view.
    pub label: String,
    /// Plotted value: successes per site, or launches per outcome class.
    pub count: usize,
    /// Launches that fell into this group.
    pub total: usize,
}

/// Aggregate launch outcomes for the pie chart.
///
/// * [`SiteFilter::All`] → one slice per site in first-appearance order, valued
///   by the number of successful launches (sites without a success keep a
///   zero slice).
/// * [`SiteFilter::Site`] → one slice per outcome class present at that site,
///   failure before success.
///
/// A site with no launches yields an empty vector.
pub fn success_distribution(dataset: &LaunchDataset, site: &SiteFilter) -> Vec<PieSlice> {
    match site {
        SiteFilter::All => dataset
            .sites
            .iter()
            .map(|name| {
                let (count, total) = dataset
                    .records
                    .iter()
                    .filter(|r| &r.launch_site == name)
                    .fold((0, 0), |(ok, n), r| {
                        (ok + usize::from(r.outcome.is_success()), n + 1)
                    });
                PieSlice {
                    label: name.clone(),
                    count,
                    total,
                }
            })
            .collect(),
        SiteFilter::Site(name) => {
            let mut by_outcome: BTreeMap<Outcome, usize> = BTreeMap::new();
            for r in dataset.records.iter().filter(|r| &r.launch_site == name) {
                *by_outcome.entry(r.outcome).or_default() += 1;
            }
            by_outcome
                .into_iter()
                .map(|(outcome, n)| PieSlice {
                    label: outcome.to_string(),
                    count: n,
                    total: n,
                })
                .collect()
        }
    }
}

/// Fraction of successful launches matching `site`, `None` when nothing matches.
pub fn success_rate(dataset: &LaunchDataset, site: &SiteFilter) -> Option<f64> {
    let (ok, n) = dataset
        .records
        .iter()
        .filter(|r| site.matches(&r.launch_site))
        .fold((0usize, 0usize), |(ok, n), r| {
            (ok + usize::from(r.outcome.is_success()), n + 1)
        });
    (n > 0).then(|| ok as f64 / n as f64)
}

// ---------------------------------------------------------------------------
// Payload correlation (scatter chart)
// ---------------------------------------------------------------------------

/// Indices of launches inside `range` (inclusive) and matching `site`, in
/// dataset order.
pub fn filtered_indices(
    dataset: &LaunchDataset,
    range: PayloadRange,
    site: &SiteFilter,
) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| range.contains(r.payload_mass_kg) && site.matches(&r.launch_site))
        .map(|(i, _)| i)
        .collect()
}

/// Launches for the payload/outcome scatter chart.
pub fn payload_scatter<'a>(
    dataset: &'a LaunchDataset,
    range: PayloadRange,
    site: &SiteFilter,
) -> Vec<&'a LaunchRecord> {
    filtered_indices(dataset, range, site)
        .into_iter()
        .map(|i| &dataset.records[i])
        .collect()
}
