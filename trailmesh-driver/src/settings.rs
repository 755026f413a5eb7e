//! Ingest configuration — `serde`-derived so a caller can load it from
//! a config file or request body.

use serde::{Deserialize, Serialize};

use trailmesh_common::Distance;
use trailmesh_graph::loader::LocationFilter;

/// `repeat_node_weight` weights `repeat_quality` in the quality formula;
/// projected onto `SearchSettings::repeat_weight` by `to_search_settings`.
/// `min_quality` is part of the recognized configuration surface but
/// unused by the core scoring path; kept so callers can still set it
/// without the config rejecting the field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QualitySettings {
    pub repeat_node_weight: f64,
    #[serde(default = "default_min_quality")]
    pub min_quality: f64,
}

fn default_min_quality() -> f64 {
    0.8
}

impl Default for QualitySettings {
    fn default() -> Self {
        QualitySettings {
            repeat_node_weight: 1.0,
            min_quality: default_min_quality(),
        }
    }
}

/// The full recognized configuration surface. `trailmesh-search`'s
/// `SearchSettings` is the subset the core search loop actually consumes;
/// `to_search_settings` projects onto it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestSettings {
    pub max_concurrent: usize,
    pub max_distance: Distance,
    pub max_segments: usize,
    pub quality_settings: QualitySettings,
    pub location_filter: Option<LocationFilter>,
    #[serde(default = "default_trailhead_distance_threshold")]
    pub trailhead_distance_threshold: Distance,
    #[serde(default = "default_timeout_s")]
    pub timeout_s: u64,
    #[serde(default = "default_stop_searching_cutoff")]
    pub stop_searching_cutoff: Distance,
}

fn default_trailhead_distance_threshold() -> Distance {
    Distance::m(300.0)
}

fn default_timeout_s() -> u64 {
    10
}

fn default_stop_searching_cutoff() -> Distance {
    Distance::mi(8.0)
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings {
            max_concurrent: 50,
            max_distance: Distance::km(20.0),
            max_segments: 100,
            quality_settings: QualitySettings::default(),
            location_filter: None,
            trailhead_distance_threshold: default_trailhead_distance_threshold(),
            timeout_s: default_timeout_s(),
            stop_searching_cutoff: default_stop_searching_cutoff(),
        }
    }
}

impl IngestSettings {
    pub fn to_search_settings(&self) -> trailmesh_search::SearchSettings {
        trailmesh_search::SearchSettings {
            max_distance: self.max_distance,
            max_segments: self.max_segments,
            max_concurrent: self.max_concurrent,
            timeout_s: self.timeout_s,
            stop_searching_cutoff: self.stop_searching_cutoff,
            repeat_weight: self.quality_settings.repeat_node_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_round_trip_through_json() {
        let settings = IngestSettings::default();
        let json = serde_json::to_string(&settings).expect("serialize");
        let back: IngestSettings = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.max_concurrent, settings.max_concurrent);
        assert_eq!(back.max_distance.as_m(), settings.max_distance.as_m());
    }

    #[test]
    fn to_search_settings_projects_the_relevant_fields() {
        let settings = IngestSettings::default();
        let search = settings.to_search_settings();
        assert_eq!(search.max_segments, settings.max_segments);
        assert_eq!(search.max_concurrent, settings.max_concurrent);
    }
}
