//! Top-level pipeline entry point — wires the raw loader through
//! segmentation, road-crossing disconnection, graph assembly and network
//! extraction into the driver. This is the single call a hosting binary
//! makes to turn raw ways/areas into `NetworkResult`s; everything it calls
//! is independently usable too, for a caller that wants to inspect or
//! cache an intermediate stage.
//!
//! Every stage before this one returns a typed (`thiserror`) error; this
//! is the task boundary, so failures are wrapped with `anyhow::Context`
//! instead, matching the split `trailmesh-common::error` documents.

use std::collections::HashSet;

use anyhow::Context;

use trailmesh_common::WayId;
use trailmesh_graph::loader::{self, LocationFilter};
use trailmesh_graph::raw::{RawArea, RawWay};
use trailmesh_graph::{assembler, disconnector, network, Node, Trail};

use crate::driver::{self, NetworkResult};
use crate::elevation::ElevationOracle;
use crate::settings::IngestSettings;

/// A manually-added connector trail, built with an id of
/// `"extra-<a>-<b>"`. Its endpoints are exempt from the road-crossing
/// disconnector's rewrite — the allowlist that module's doc comment
/// refers to is exactly the endpoint set of every `ExtraLink` passed in.
/// Neither this nor `no_road_crossings` on `ingest`/`ingest_single_threaded`
/// is part of `IngestSettings`'s recognized configuration surface, so both
/// are threaded through as explicit call arguments instead.
pub struct ExtraLink {
    pub way_id: WayId,
    pub a: Node,
    pub b: Node,
}

/// Counts for the "one line per skipped way, one line per failed task;
/// final summary with counts" user-visible surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct IngestSummary {
    pub skipped_ways: usize,
    pub skipped_areas: usize,
    pub networks: usize,
    pub total_loops: usize,
}

pub struct IngestOutput {
    pub results: Vec<NetworkResult>,
    pub summary: IngestSummary,
}

/// Run the full pipeline single-threaded — deterministic, for test
/// runners and anywhere byte-identical output matters more than latency.
pub fn ingest_single_threaded(
    ways: impl IntoIterator<Item = RawWay>,
    areas: impl IntoIterator<Item = RawArea>,
    extra_links: &[ExtraLink],
    no_road_crossings: bool,
    settings: &IngestSettings,
    oracle: &dyn ElevationOracle,
) -> anyhow::Result<IngestOutput> {
    run_pipeline(ways, areas, extra_links, no_road_crossings, settings, oracle, false)
}

/// Parallel counterpart of `ingest_single_threaded`, using the driver's
/// `rayon` worker pool — one task per network.
pub fn ingest(
    ways: impl IntoIterator<Item = RawWay>,
    areas: impl IntoIterator<Item = RawArea>,
    extra_links: &[ExtraLink],
    no_road_crossings: bool,
    settings: &IngestSettings,
    oracle: &dyn ElevationOracle,
) -> anyhow::Result<IngestOutput> {
    run_pipeline(ways, areas, extra_links, no_road_crossings, settings, oracle, true)
}

fn run_pipeline(
    ways: impl IntoIterator<Item = RawWay>,
    areas: impl IntoIterator<Item = RawArea>,
    extra_links: &[ExtraLink],
    no_road_crossings: bool,
    settings: &IngestSettings,
    oracle: &dyn ElevationOracle,
    parallel: bool,
) -> anyhow::Result<IngestOutput> {
    let location_filter: Option<LocationFilter> = settings.location_filter;
    let loaded = loader::load(ways, areas, location_filter.as_ref()).context("raw loader failed")?;

    let road_nodes: HashSet<i64> = loaded.non_trail_nodes.keys().copied().collect();
    let mut segmented = trailmesh_graph::segmenter::segment_trails(&loaded.trails, &road_nodes);

    let mut allowlist: HashSet<i64> = HashSet::new();
    for link in extra_links {
        allowlist.insert(link.a.id.osm_id);
        allowlist.insert(link.b.id.osm_id);
        let id = format!("extra-{}-{}", link.a.id.osm_id, link.b.id.osm_id);
        let trail = Trail::new(id, link.way_id, None, vec![link.a.clone(), link.b.clone()])
            .context("failed to build a manually-added extra link")?;
        segmented.push(trail);
    }

    let disconnected = disconnector::disconnect_road_crossings(segmented, &loaded.non_trail_nodes, &allowlist);
    let graph = assembler::assemble_graph(disconnected, &road_nodes, no_road_crossings);

    let mut already_processed = HashSet::new();
    let networks = network::extract_networks(
        &graph,
        &loaded.non_trail_nodes,
        &loaded.parks,
        settings.trailhead_distance_threshold,
        &mut already_processed,
    );
    let network_count = networks.len();

    let results = if parallel {
        driver::run(networks, settings, oracle)
    } else {
        driver::run_single_threaded(networks, settings, oracle)
    };

    let total_loops: usize = results
        .iter()
        .flat_map(|r| r.results.iter())
        .map(|(_, tr)| tr.loops.len())
        .sum();

    log::info!(
        "ingest complete: {network_count} networks, {total_loops} loops, \
         {} ways skipped, {} areas skipped",
        loaded.skipped_ways,
        loaded.skipped_areas
    );

    Ok(IngestOutput {
        results,
        summary: IngestSummary {
            skipped_ways: loaded.skipped_ways,
            skipped_areas: loaded.skipped_areas,
            networks: network_count,
            total_loops,
        },
    })
}
