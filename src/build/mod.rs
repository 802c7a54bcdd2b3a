//! Path building pipeline.
//!
//! [`PathBuilder::build_paths`] turns a level of authored waypoints and
//! cover links into a pruned, network-labelled graph with a derived cover
//! network:
//!
//! ```text
//!   undefine ─► adjust cover ─► ground bases ─► reach edges ─► special edges
//!                                                                   │
//!   ┌───────────────────────────────────────────────────────────────┘
//!   ▼
//!   reconcile ─► basic prune ─► long edges ─► basic prune ─► aggressive prune
//!                                                                   │
//!   ┌───────────────────────────────────────────────────────────────┘
//!   ▼
//!   sort edges ─► network ids ─► cover network ─► review
//! ```
//!
//! Every stage reports through a [`BuildReport`]; nothing here fails hard.

pub mod aggressive;
pub mod diagnostics;
pub mod edges;
pub mod kinds;
pub mod prune;
pub mod reach;
mod review;

pub use aggressive::{AggressivePruner, AggressiveResult};
pub use diagnostics::{BuildReport, BuildStats, Diagnostic, DiagnosticKind, Severity};
pub use edges::{EdgeBuilder, reconcile_symmetric_sizes};
pub use prune::BasicPruner;
pub use reach::{Route, build_network_ids, find_route};
pub use review::review_path;

use log::info;

use crate::config::NavConfig;
use crate::cover::CoverNetworkBuilder;
use crate::level::Level;
use crate::trace::TraceCollaborator;

/// Runs the full build over a level.
#[derive(Clone, Debug, Default)]
pub struct PathBuilder {
    config: NavConfig,
}

impl PathBuilder {
    pub fn new(config: NavConfig) -> Self {
        Self { config }
    }

    #[inline]
    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    /// Rebuild every derived edge, network id and cover link of `level`.
    ///
    /// Previous build results are discarded first, so building twice
    /// yields the same graph.
    pub fn build_paths(&self, level: &mut Level, trace: &dyn TraceCollaborator) -> BuildReport {
        info!(
            "[PathBuilder] Building {} waypoints, {} cover links",
            level.len(),
            level.cover_link_ids().len()
        );
        let mut report = BuildReport::default();
        let cover = CoverNetworkBuilder::new(&self.config.cover, trace);

        self.undefine_paths(level);
        cover.clear(level);
        cover.adjust(level, &mut report);
        level.rebuild_spatial_index();

        let edges = EdgeBuilder::new(&self.config, trace);
        edges.assign_ground_bases(level);
        let ids = level.waypoint_ids();
        for &id in &ids {
            edges.add_reach_edges(level, id, &mut report);
        }
        for &id in &ids {
            edges.add_special_edges(level, id, &mut report);
        }
        reconcile_symmetric_sizes(level);

        let basic = BasicPruner::new(&self.config.pruning);
        report.stats.pruned_basic = basic.prune(level);

        report.stats.long_range_edges = edges.add_long_edges(level);
        if report.stats.long_range_edges > 0 {
            reconcile_symmetric_sizes(level);
            report.stats.pruned_basic += basic.prune(level);
        }

        if self.config.pruning.aggressive {
            let result = AggressivePruner::new(&self.config.pruning, self.config.paths.max_path_distance)
                .prune(level);
            report.stats.pruned_intersect = result.intersect;
            report.stats.pruned_angular = result.angular;
        }

        for wp in level.waypoints_mut() {
            wp.edges
                .sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.end.cmp(&b.end)));
        }
        report.stats.networks = build_network_ids(level);
        info!(
            "[PathBuilder] {} edges in {} networks",
            level.edge_count(),
            report.stats.networks
        );

        cover.build(level, &mut report);

        report.stats.waypoints = level.len();
        report.stats.surviving_edges = level.edges().filter(|e| e.is_traversable()).count();

        if self.config.review.review_after_build {
            for id in level.waypoint_ids() {
                report.extend(review_path(level, id, &self.config));
            }
        }

        info!(
            "[PathBuilder] Done: {} errors, {} warnings",
            report.errors().count(),
            report.warnings().count()
        );
        report
    }

    /// Drop every derived edge and annotation, keeping authored data.
    pub fn undefine_paths(&self, level: &mut Level) {
        for wp in level.waypoints_mut() {
            wp.clear_build_state();
        }
    }
}
