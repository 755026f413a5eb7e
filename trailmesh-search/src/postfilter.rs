//! Post-search filtering —
//! turns a trailhead's raw yield from `search::find_loops` into the final
//! ranked, deduplicated set shown to a user.

use crate::subpath::Subpath;

/// Rank by quality, drop anything not worth keeping, cap at roughly one
/// loop per 5km of network (times 3, to leave `filter_similar` something to
/// dedup from), then collapse near-duplicates.
///
/// `network_km` is the trailhead's enclosing network's total length —
/// it drives the cap, not the individual loop lengths. `repeat_weight` is
/// `IngestSettings::quality_settings.repeat_node_weight`, the same value
/// threaded into the search via `SearchSettings::repeat_weight`.
pub fn postfilter(mut loops: Vec<Subpath>, network_km: f64, repeat_weight: f64) -> Vec<Subpath> {
    loops.sort_by(|a, b| b.quality(repeat_weight).total_cmp(&a.quality(repeat_weight)));
    loops.retain(|l| l.worth_keeping(repeat_weight));

    let target_loop_number = (network_km / 5.0) as usize;
    let cap = target_loop_number * 3;
    if loops.len() > cap {
        loops.truncate(cap);
    }

    filter_similar(loops, 0.75)
}

/// Drop any loop that's within 20% length of, and more than `max_similarity`
/// similar to, another loop earlier in the list — keeping the earlier
/// (higher-quality, since `loops` arrives pre-sorted) of the pair.
pub fn filter_similar(loops: Vec<Subpath>, max_similarity: f64) -> Vec<Subpath> {
    let n = loops.len();
    let mut dropped = vec![false; n];
    for i in 0..n {
        if dropped[i] {
            continue;
        }
        for j in (i + 1)..n {
            if dropped[j] {
                continue;
            }
            let length_diff = (loops[j].length_m() - loops[i].length_m()).abs() / loops[j].length_m();
            if length_diff < 0.2 && Subpath::similarity(&loops[i], &loops[j]) > max_similarity {
                dropped[j] = true;
            }
        }
    }
    loops
        .into_iter()
        .zip(dropped)
        .filter_map(|(l, was_dropped)| (!was_dropped).then_some(l))
        .collect()
}
