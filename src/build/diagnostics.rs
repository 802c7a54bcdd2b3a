//! Build diagnostics.
//!
//! Nothing in a build is fatal. Problems are collected as [`Diagnostic`]s
//! in a [`BuildReport`] and the build continues with best-effort results.

use std::fmt;

use serde::Serialize;

use crate::cover::CoverRef;
use crate::level::WaypointId;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

/// What a diagnostic is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    MissingGroundBase,
    TooClose,
    ZeroLengthEdge,
    Unreachable,
    UnreachableOmitted,
    SlotAlignmentFailed,
    MissingCounterpart,
    LoneLadder,
    IsolatedWaypoint,
    DisconnectedPlayerStart,
    OrphanSlotMarker,
}

/// A single finding of a build or review.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub waypoint: Option<WaypointId>,
    pub cover: Option<CoverRef>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            waypoint: None,
            cover: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, message)
    }

    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, message)
    }

    /// Attach the waypoint this diagnostic is about.
    pub fn at(mut self, waypoint: WaypointId) -> Self {
        self.waypoint = Some(waypoint);
        self
    }

    /// Attach the cover slot this diagnostic is about.
    pub fn at_slot(mut self, slot: CoverRef) -> Self {
        self.cover = Some(slot);
        self
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {:?}: {}", self.severity, self.kind, self.message)
    }
}

/// Counters gathered while building.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub waypoints: usize,
    pub standard_edges: usize,
    pub forced_edges: usize,
    pub proscribed_stubs: usize,
    pub special_edges: usize,
    pub long_range_edges: usize,
    pub pruned_basic: usize,
    pub pruned_intersect: usize,
    pub pruned_angular: usize,
    pub surviving_edges: usize,
    pub networks: usize,
    pub fire_links: usize,
    pub exposed_fire_links: usize,
    pub danger_links: usize,
}

/// Result of [`PathBuilder::build_paths`](super::PathBuilder::build_paths).
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildReport {
    pub diagnostics: Vec<Diagnostic>,
    pub stats: BuildStats,
}

impl BuildReport {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }
}
