//! The fixed 50-agent registry.
//!
//! Agent identity is the `A<n>` scheme with n in 1..=50. The category
//! of an agent is a pure function of its numeric suffix, resolved
//! through a sorted range table so the boundaries stay auditable.

use crate::error::CatalogError;
use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Identifier of one of the 50 registered agents.
///
/// Textual form is `A1`..`A50`; construction outside that range fails
/// with [`CatalogError::UnknownAgent`], so a value of this type always
/// maps to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AgentId(u8);

impl AgentId {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 50;

    pub fn new(n: u8) -> Result<Self, CatalogError> {
        if (Self::MIN..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(CatalogError::UnknownAgent { id: n.to_string() })
        }
    }

    /// Numeric suffix, guaranteed in 1..=50.
    pub fn number(self) -> u8 {
        self.0
    }

    pub fn category(self) -> AgentCategory {
        match CATEGORY_RANGES.iter().find(|(range, _)| range.contains(&self.0)) {
            Some((_, category)) => *category,
            // The range table covers 1..=50 and construction rejects
            // everything else.
            None => unreachable!("agent id {} has no category", self.0),
        }
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A{}", self.0)
    }
}

impl FromStr for AgentId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || CatalogError::UnknownAgent { id: s.to_string() };
        let digits = s.strip_prefix('A').ok_or_else(unknown)?;
        let n: u8 = digits.parse().map_err(|_| unknown())?;
        Self::new(n).map_err(|_| unknown())
    }
}

impl Serialize for AgentId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AgentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Display category of an agent, derived from its numeric suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentCategory {
    Sensory,
    Processing,
    Inspection,
    Prediction,
    Decision,
    Communication,
}

/// Inclusive id ranges per category, in ascending order.
const CATEGORY_RANGES: &[(RangeInclusive<u8>, AgentCategory)] = &[
    (1..=10, AgentCategory::Sensory),
    (11..=18, AgentCategory::Processing),
    (19..=30, AgentCategory::Inspection),
    (31..=38, AgentCategory::Prediction),
    (39..=44, AgentCategory::Decision),
    (45..=50, AgentCategory::Communication),
];

impl AgentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentCategory::Sensory => "sensory",
            AgentCategory::Processing => "processing",
            AgentCategory::Inspection => "inspection",
            AgentCategory::Prediction => "prediction",
            AgentCategory::Decision => "decision",
            AgentCategory::Communication => "communication",
        }
    }

    /// Hex color used by dashboards when rendering this category.
    pub fn display_color(&self) -> &'static str {
        match self {
            AgentCategory::Sensory => "#00f3ff",
            AgentCategory::Processing => "#00ff9d",
            AgentCategory::Inspection => "#ffbe00",
            AgentCategory::Prediction => "#7c3aed",
            AgentCategory::Decision => "#ff0055",
            AgentCategory::Communication => "#0070ff",
        }
    }
}

impl fmt::Display for AgentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable description of one registered agent. Only ever built
/// from the static table, so it serializes for display but is never
/// parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDescriptor {
    pub id: AgentId,
    pub name: &'static str,
    pub category: AgentCategory,
    pub display_color: &'static str,
}

/// Display names indexed by id - 1.
const AGENT_NAMES: [&str; 50] = [
    "Visual Acquisition",
    "Thermal Imaging",
    "Acoustic Emission",
    "Vibration Spectrum",
    "Load Distribution",
    "Environmental Context",
    "GPS/Speed Sync",
    "Power Management",
    "Data Integrity",
    "Multi-Spectral Fusion",
    "Motion Deblurring",
    "Low-Light Enhancement",
    "Compressed Sensing",
    "Noise Reduction",
    "Super-Resolution",
    "Temporal Interpolation",
    "Data Compression",
    "Anomaly Highlighting",
    "Bearing Wear Predictor",
    "Wheel Flat Detector",
    "Axle Crack Tracker",
    "Brake Pad Estimator",
    "Suspension Health",
    "Coupler Integrity",
    "Rail-Wheel Contact",
    "Lubrication Deficiency",
    "Fastener Looseness",
    "Corrosion Severity",
    "Fatigue Life Estimator",
    "Geometric Distortion",
    "Temporal Failure Predictor",
    "Ensemble Voting",
    "Uncertainty Quantification",
    "Rare Event Detector",
    "Digital Twin Sync",
    "What-If Simulator",
    "Historical Matcher",
    "Transfer Learning",
    "Criticality Assessor",
    "Urgency Scheduler",
    "Maintenance Recommender",
    "Alert Prioritizer",
    "HMI Agent",
    "Voice Alert Synthesizer",
    "Mesh Coordinator",
    "Store-and-Forward",
    "Bandwidth Allocator",
    "Data Sync",
    "Edge-Cloud Orchestrator",
    "Self-Healing Monitor",
];

static CATALOG: Lazy<AgentCatalog> = Lazy::new(|| {
    let entries = AGENT_NAMES
        .iter()
        .enumerate()
        .map(|(index, name)| {
            let id = AgentId(index as u8 + 1);
            let category = id.category();
            AgentDescriptor {
                id,
                name,
                category,
                display_color: category.display_color(),
            }
        })
        .collect();
    AgentCatalog { entries }
});

/// Read-only registry of all 50 agents.
///
/// The table is built once and never mutated, so lookups are safe to
/// call from any task.
#[derive(Debug)]
pub struct AgentCatalog {
    entries: Vec<AgentDescriptor>,
}

impl AgentCatalog {
    pub fn global() -> &'static AgentCatalog {
        &CATALOG
    }

    /// Descriptor for a validated id. Total over [`AgentId`].
    pub fn describe(&self, id: AgentId) -> &AgentDescriptor {
        &self.entries[id.number() as usize - 1]
    }

    /// Descriptor for a raw textual id such as `"A19"`.
    pub fn lookup(&self, raw: &str) -> Result<&AgentDescriptor, CatalogError> {
        let id: AgentId = raw.parse()?;
        Ok(self.describe(id))
    }

    pub fn category_of(&self, id: AgentId) -> AgentCategory {
        id.category()
    }

    /// All descriptors in ascending id order.
    pub fn all(&self) -> impl Iterator<Item = &AgentDescriptor> {
        self.entries.iter()
    }
}
