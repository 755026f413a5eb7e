//! Per-trailhead summary statistics: loop counts, quality, diversity,
//! length extremes, and ingest timing for one trailhead's final,
//! post-filtered loop set.

use trailmesh_search::Subpath;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailheadMeta {
    pub num_loops: usize,
    pub loop_diversity: f64,
    pub shortest_loop_m: f64,
    pub longest_loop_m: f64,
    pub network_length_km: f64,
    pub loop_quality: f64,
    pub ingest_time_s: f64,
}

/// Summarize a trailhead's final (post-filtered) loop set. An empty set
/// reports all-zero scalar fields rather than `NaN`/panicking on an empty
/// `min`/`max`. `repeat_weight` matches the weight the search and
/// post-filter scored these loops with, so `loop_quality` stays consistent
/// with the ranking that produced the set.
pub fn meta(loops: &[Subpath], network_length_km: f64, ingest_time_s: f64, repeat_weight: f64) -> TrailheadMeta {
    let num_loops = loops.len();
    if num_loops == 0 {
        return TrailheadMeta {
            num_loops: 0,
            loop_diversity: 0.0,
            shortest_loop_m: 0.0,
            longest_loop_m: 0.0,
            network_length_km,
            loop_quality: 0.0,
            ingest_time_s,
        };
    }

    let loop_quality = loops.iter().map(|l| l.quality(repeat_weight)).sum::<f64>() / num_loops as f64;

    let mut pair_count = 0usize;
    let mut diversity_sum = 0.0;
    for i in 0..loops.len() {
        for j in (i + 1)..loops.len() {
            diversity_sum += 1.0 - Subpath::similarity(&loops[i], &loops[j]);
            pair_count += 1;
        }
    }
    let loop_diversity = if pair_count == 0 { 1.0 } else { diversity_sum / pair_count as f64 };

    let longest_loop_m = loops.iter().map(|l| l.length_m()).fold(f64::MIN, f64::max);
    let shortest_loop_m = loops.iter().map(|l| l.length_m()).fold(f64::MAX, f64::min);

    TrailheadMeta {
        num_loops,
        loop_diversity,
        shortest_loop_m,
        longest_loop_m,
        network_length_km,
        loop_quality,
        ingest_time_s,
    }
}
