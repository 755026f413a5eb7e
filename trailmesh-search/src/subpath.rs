//! Subpath — a search state: an ordered walk from a trailhead, plus the
//! scoring derived from it.
//!
//! A "fakeroot" sentinel segment at index 0 gives a fresh search state a
//! well-defined `last_node()` before anything real has been walked, so
//! the expansion loop never needs a special case for the first step.

use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use trailmesh_common::Distance;
use trailmesh_graph::NodeIdx;

/// The shortest loop length worth keeping: 3 km. A function
/// rather than a `const` since `Distance::km` isn't `const fn`.
pub fn shortest_loop() -> Distance {
    Distance::km(3.0)
}

#[derive(Debug, Clone)]
pub struct SubpathSegment {
    pub id: String,
    pub name: Option<String>,
    pub length_m: f64,
    pub first_node: NodeIdx,
    pub last_node: NodeIdx,
}

#[derive(Debug, Clone)]
pub struct Subpath {
    segments: Vec<SubpathSegment>,
    length_m: f64,
    unique_length_m: f64,
    segment_dist: HashMap<String, f64>,
    seen_ids: HashSet<String>,
    quality_cache: Cell<Option<f64>>,
}

impl Subpath {
    /// Seed a fresh search state: a sentinel self-loop at `root` with zero
    /// length.
    pub fn root(root: NodeIdx) -> Subpath {
        let fakeroot = SubpathSegment {
            id: "fakeroot".to_string(),
            name: None,
            length_m: 0.0,
            first_node: root,
            last_node: root,
        };
        let mut segment_dist = HashMap::new();
        segment_dist.insert(fakeroot.id.clone(), 0.0);
        let mut seen_ids = HashSet::new();
        seen_ids.insert(fakeroot.id.clone());
        Subpath {
            segments: vec![fakeroot],
            length_m: 0.0,
            unique_length_m: 0.0,
            segment_dist,
            seen_ids,
            quality_cache: Cell::new(None),
        }
    }

    pub fn start_node(&self) -> NodeIdx {
        self.segments[0].first_node
    }

    pub fn last_node(&self) -> NodeIdx {
        self.segments
            .last()
            .expect("a Subpath always has at least the fakeroot segment")
            .last_node
    }

    pub fn last_segment(&self) -> &SubpathSegment {
        self.segments.last().expect("nonempty by construction")
    }

    pub fn segments(&self) -> &[SubpathSegment] {
        &self.segments
    }

    /// Real (non-sentinel) segments, the ones that actually correspond to
    /// a trail walked.
    pub fn real_segments(&self) -> impl Iterator<Item = &SubpathSegment> {
        self.segments.iter().skip(1)
    }

    pub fn length_m(&self) -> f64 {
        self.length_m
    }

    pub fn unique_length_m(&self) -> f64 {
        self.unique_length_m
    }

    pub fn segment_count(&self) -> usize {
        // Real segments only; the fakeroot doesn't count toward
        // `max_segments`.
        self.segments.len() - 1
    }

    pub fn is_complete(&self) -> bool {
        self.segments.len() > 1 && self.last_node() == self.start_node()
    }

    fn push_bookkeeping(&mut self, seg: &SubpathSegment) {
        self.length_m += seg.length_m;
        let entry = self.segment_dist.entry(seg.id.clone()).or_insert(0.0);
        *entry += seg.length_m;
        if self.seen_ids.insert(seg.id.clone()) {
            self.unique_length_m += seg.length_m;
        }
        self.quality_cache.set(None);
    }

    /// Structural-sharing extension: returns a new `Subpath` owning its own
    /// copy of the segment list from this point forward. This is the
    /// default the main expansion loop uses.
    pub fn extended(&self, seg: SubpathSegment) -> Subpath {
        let mut next = self.clone();
        next.segments.push(seg.clone());
        next.push_bookkeeping(&seg);
        next
    }

    /// Mutating extension, reserved for the forced-closure branch of
    /// search — it walks a known shortest path edge by edge and would
    /// otherwise clone the whole segment list once per edge.
    pub fn extend_in_place(&mut self, seg: SubpathSegment) {
        self.segments.push(seg.clone());
        self.push_bookkeeping(&seg);
    }

    pub fn segment_dist(&self) -> &HashMap<String, f64> {
        &self.segment_dist
    }

    /// Pairs of adjacent segments with equal id, counted over the real segments
    /// only.
    pub fn num_spurs(&self) -> usize {
        self.real_segments()
            .collect::<Vec<_>>()
            .windows(2)
            .filter(|w| w[0].id == w[1].id)
            .count()
    }

    /// `{ node -> {trail ids starting or ending there} } \ {start_node}`.
    pub fn intersections(&self) -> HashMap<NodeIdx, HashSet<String>> {
        let mut map: HashMap<NodeIdx, HashSet<String>> = HashMap::new();
        for seg in self.real_segments() {
            map.entry(seg.first_node).or_default().insert(seg.id.clone());
            map.entry(seg.last_node).or_default().insert(seg.id.clone());
        }
        map.remove(&self.start_node());
        map
    }

    /// `quality(p, repeat_weight)`, memoized since it's evaluated many
    /// times per search (sorting and filtering the active frontier).
    pub fn quality(&self, repeat_weight: f64) -> f64 {
        if repeat_weight == 1.0 {
            if let Some(cached) = self.quality_cache.get() {
                return cached;
            }
        }
        let repeat_quality = if self.length_m == 0.0 {
            1.0
        } else {
            self.unique_length_m / self.length_m
        };
        let spur_quality = self.num_spurs() as f64 * -0.1;

        let raw_complexity: f64 = self
            .intersections()
            .values()
            .filter(|ids| ids.len() > 2)
            .map(|ids| -0.1 * (ids.len() as f64 - 2.0))
            .sum();
        let graph_complexity = if raw_complexity < 0.0 {
            (raw_complexity + 0.3).min(0.0)
        } else {
            raw_complexity
        };

        let total = repeat_quality * repeat_weight + spur_quality + graph_complexity;
        debug_assert!(total <= 1.0 + 1e-9, "quality total {total} exceeds 1");
        let clamped = total.clamp(0.0, 1.0);
        if repeat_weight == 1.0 {
            self.quality_cache.set(Some(clamped));
        }
        clamped
    }

    /// Pure out-and-back detector: trail-id sequence is a palindrome
    /// and quality clears the lower bar of 0.49.
    pub fn is_pure_out_and_back(&self, repeat_weight: f64) -> bool {
        let ids: Vec<&str> = self.real_segments().map(|s| s.id.as_str()).collect();
        let reversed: Vec<&str> = ids.iter().rev().copied().collect();
        ids == reversed && self.quality(repeat_weight) > 0.49
    }

    /// `worth_keeping(p)`. `repeat_weight` is `IngestSettings`'s
    /// `quality_settings.repeat_node_weight`, threaded down from the
    /// driver through `SearchSettings`.
    pub fn worth_keeping(&self, repeat_weight: f64) -> bool {
        self.length_m >= shortest_loop().as_m()
            && (self.is_pure_out_and_back(repeat_weight)
                || (self.quality(repeat_weight) > 0.7 && self.num_spurs() < 1))
    }

    /// Multiset symmetric-difference similarity.
    pub fn similarity(a: &Subpath, b: &Subpath) -> f64 {
        let denom = a.length_m + b.length_m;
        if denom == 0.0 {
            return 1.0;
        }
        let mut ids: HashSet<&String> = a.segment_dist.keys().collect();
        ids.extend(b.segment_dist.keys());
        let diff: f64 = ids
            .iter()
            .map(|id| {
                let da = a.segment_dist.get(*id).copied().unwrap_or(0.0);
                let db = b.segment_dist.get(*id).copied().unwrap_or(0.0);
                (da - db).abs()
            })
            .sum();
        1.0 - diff / denom
    }

    /// Hyphen-joined display names of segments whose per-id accumulated
    /// distance exceeds `length_m / 3`, deduplicating consecutive repeats
    /// and skipping unnamed segments.
    pub fn name(&self) -> String {
        let threshold = self.length_m / 3.0;
        let mut parts: Vec<&str> = Vec::new();
        for seg in self.real_segments() {
            let Some(name) = seg.name.as_deref() else {
                continue;
            };
            let total_for_id = self.segment_dist.get(&seg.id).copied().unwrap_or(0.0);
            if total_for_id <= threshold {
                continue;
            }
            if parts.last() != Some(&name) {
                parts.push(name);
            }
        }
        parts.join("-")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, length_m: f64, first: NodeIdx, last: NodeIdx) -> SubpathSegment {
        SubpathSegment {
            id: id.to_string(),
            name: None,
            length_m,
            first_node: first,
            last_node: last,
        }
    }

    /// Trails of length 5, 6, 5 (reusing the first trail's id, i.e. a
    /// spur), 7 metres, successively appended.
    #[test]
    fn running_length_tracks_total_while_unique_length_ignores_repeats() {
        let p = Subpath::root(0);
        let p = p.extended(seg("t1", 5.0, 0, 1));
        assert_eq!((p.length_m(), p.unique_length_m()), (5.0, 5.0));
        let p = p.extended(seg("t2", 6.0, 1, 2));
        assert_eq!((p.length_m(), p.unique_length_m()), (11.0, 11.0));
        let p = p.extended(seg("t1", 5.0, 2, 1));
        assert_eq!((p.length_m(), p.unique_length_m()), (16.0, 11.0));
        let p = p.extended(seg("t4", 7.0, 1, 3));
        assert_eq!((p.length_m(), p.unique_length_m()), (23.0, 18.0));
    }

    #[test]
    fn similarity_is_symmetric_and_order_independent() {
        let t1 = Subpath::root(0).extended(seg("t1", 5.0, 0, 1));
        let t1_t2 = t1.clone().extended(seg("t2", 6.0, 1, 2));
        let t2_t1 = Subpath::root(0)
            .extended(seg("t2", 6.0, 0, 1))
            .extended(seg("t1", 5.0, 1, 2));
        assert_eq!(Subpath::similarity(&t1_t2, &t2_t1), 1.0);

        let only_t1 = Subpath::root(0).extended(seg("t1", 5.0, 0, 1));
        let only_t2 = Subpath::root(0).extended(seg("t2", 6.0, 0, 1));
        assert_eq!(Subpath::similarity(&only_t1, &only_t2), 0.0);

        let t3 = Subpath::root(0)
            .extended(seg("t1", 5.0, 0, 1))
            .extended(seg("t3", 5.0, 1, 2));
        let t2_variant = Subpath::root(0)
            .extended(seg("t1", 5.0, 0, 1))
            .extended(seg("t2", 5.0, 1, 2));
        assert_eq!(Subpath::similarity(&t3, &t2_variant), 0.5);
    }

    /// Path visiting node sequence 1->2->3->4->2->1. The last two edges
    /// (4->2 and 2->1) share a trail id, which collapses node 2's touching
    /// set down to 3 distinct ids instead of 4.
    #[test]
    fn intersections_collapse_shared_trail_ids_at_a_revisited_node() {
        let p = Subpath::root(1)
            .extended(seg("e(1,2)", 10.0, 1, 2))
            .extended(seg("e(2,3)", 10.0, 2, 3))
            .extended(seg("e(3,4)", 10.0, 3, 4))
            .extended(seg("e(4,2)", 10.0, 4, 2))
            .extended(seg("e(4,2)", 10.0, 2, 1));
        let intersections = p.intersections();
        assert_eq!(intersections.len(), 3);
        assert_eq!(
            intersections[&2],
            ["e(1,2)", "e(2,3)", "e(4,2)"]
                .into_iter()
                .map(String::from)
                .collect()
        );
        assert_eq!(
            intersections[&3],
            ["e(2,3)", "e(3,4)"].into_iter().map(String::from).collect()
        );
        assert_eq!(
            intersections[&4],
            ["e(3,4)", "e(4,2)"].into_iter().map(String::from).collect()
        );
        assert!(!intersections.contains_key(&1));
    }

    #[test]
    fn quality_is_always_in_unit_range() {
        let p = Subpath::root(0)
            .extended(seg("a", 100.0, 0, 1))
            .extended(seg("b", 50.0, 1, 2))
            .extended(seg("a", 30.0, 2, 1));
        let q = p.quality(1.0);
        assert!((0.0..=1.0).contains(&q));
    }

    #[test]
    fn empty_loop_has_perfect_repeat_quality() {
        let p = Subpath::root(0);
        assert_eq!(p.quality(1.0), 1.0);
    }

    #[test]
    fn worth_keeping_requires_minimum_length() {
        let short = Subpath::root(0).extended(seg("a", 100.0, 0, 0));
        assert!(!short.worth_keeping(1.0));
    }

    #[test]
    fn name_joins_dominant_segment_names() {
        let mut p = Subpath::root(0);
        p.extend_in_place(SubpathSegment {
            id: "a".into(),
            name: Some("Alpha Trail".into()),
            length_m: 4000.0,
            first_node: 0,
            last_node: 1,
        });
        p.extend_in_place(SubpathSegment {
            id: "b".into(),
            name: Some("Beta Trail".into()),
            length_m: 10.0,
            first_node: 1,
            last_node: 0,
        });
        assert_eq!(p.name(), "Alpha Trail");
    }
}
