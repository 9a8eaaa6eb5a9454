use std::collections::BTreeSet;
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome – the `class` column
// ---------------------------------------------------------------------------

/// Binary launch outcome. Ordered so that failure (0) sorts before success (1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Outcome {
    Failure,
    Success,
}

impl Outcome {
    /// Numeric class value as stored in the source table.
    pub fn class(self) -> u8 {
        match self {
            Outcome::Failure => 0,
            Outcome::Success => 1,
        }
    }

    pub fn is_success(self) -> bool {
        self == Outcome::Success
    }
}

impl TryFrom<i64> for Outcome {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Outcome::Failure),
            1 => Ok(Outcome::Success),
            other => Err(format!("class must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class())
    }
}

// ---------------------------------------------------------------------------
// LaunchRecord – one row of the launch table
// ---------------------------------------------------------------------------

/// A single launch (one row of the source table). Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchRecord {
    /// Sequential flight number, when the source carries one.
    pub flight_number: Option<i64>,
    pub launch_site: String,
    /// Non-negative, finite payload mass in kilograms.
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    /// Only used for colour coding in the scatter chart.
    pub booster_version_category: String,
}

// ---------------------------------------------------------------------------
// LaunchDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed indices.
#[derive(Debug, Clone, Default)]
pub struct LaunchDataset {
    /// All launches in source order.
    pub records: Vec<LaunchRecord>,
    /// Distinct launch sites in first-appearance order.
    pub sites: Vec<String>,
    /// Sorted set of booster version categories.
    pub booster_categories: BTreeSet<String>,
    /// Observed `(min, max)` payload mass, `None` for an empty dataset.
    pub payload_bounds: Option<(f64, f64)>,
}

impl LaunchDataset {
    /// Build the indices from the loaded records.
    pub fn from_records(records: Vec<LaunchRecord>) -> Self {
        let mut sites: Vec<String> = Vec::new();
        let mut booster_categories = BTreeSet::new();
        let mut payload_bounds: Option<(f64, f64)> = None;

        for rec in &records {
            if !sites.iter().any(|s| s == &rec.launch_site) {
                sites.push(rec.launch_site.clone());
            }
            booster_categories.insert(rec.booster_version_category.clone());
            let m = rec.payload_mass_kg;
            payload_bounds = Some(match payload_bounds {
                Some((lo, hi)) => (lo.min(m), hi.max(m)),
                None => (m, m),
            });
        }

        LaunchDataset {
            records,
            sites,
            booster_categories,
            payload_bounds,
        }
    }

    /// Number of launches.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Selection – transient user input
// ---------------------------------------------------------------------------

/// Value the site dropdown uses for "all sites".
pub const ALL_SITES: &str = "ALL";

/// Site dropdown selection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum SiteFilter {
    #[default]
    All,
    Site(String),
}

impl SiteFilter {
    /// The dropdown value for this filter.
    pub fn value(&self) -> &str {
        match self {
            SiteFilter::All => ALL_SITES,
            SiteFilter::Site(s) => s,
        }
    }

    pub fn matches(&self, site: &str) -> bool {
        match self {
            SiteFilter::All => true,
            SiteFilter::Site(s) => s == site,
        }
    }
}

impl fmt::Display for SiteFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.value())
    }
}

/// Inclusive payload interval in kilograms, always stored with `low <= high`.
///
/// Bounds are not clamped to any domain. A NaN bound makes the range match
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayloadRange {
    low: f64,
    high: f64,
}

impl PayloadRange {
    /// Build a range from two bounds in either order.
    pub fn new(a: f64, b: f64) -> Self {
        if a > b {
            PayloadRange { low: b, high: a }
        } else {
            PayloadRange { low: a, high: b }
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    /// Whether `mass` lies within `[low, high]`.
    pub fn contains(&self, mass: f64) -> bool {
        self.low <= mass && mass <= self.high
    }
}

impl Default for PayloadRange {
    fn default() -> Self {
        PayloadRange::new(0.0, 10_000.0)
    }
}

/// Current dropdown + range selection.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Selection {
    pub site: SiteFilter,
    pub payload: PayloadRange,
}
