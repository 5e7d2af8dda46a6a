#![forbid(unsafe_code)]
//! tierank-core library.
//!
//! Tiered ranking of entities connected by weighted dominance arcs: exact
//! contiguous tier search under the cut-imbalance objective, bidirectional
//! feedback-arc-set ordering over a pluggable constraint solver, a greedy
//! dominance heuristic and weak ordering of the residual graph.
//!
//! # Conventions
//!
//! - **Errors**: Fallible operations return [`error::Result`]; no partial
//!   results are returned alongside an error.
//! - **Logging**: Use `tracing` macros (`debug!` for solver progress,
//!   `trace!` for per-candidate scores, `warn!` when a limit truncates a
//!   search).
//! - **Determinism**: Every tie is broken by a documented canonical order,
//!   including under parallel evaluation.

pub mod dominance;
pub mod enumerate;
pub mod error;
pub mod fas;
pub mod graph;
pub mod objective;
pub mod partition;
pub mod report;
pub mod solver;
pub mod tiering;
pub mod weak_order;

pub use dominance::{DominanceRanking, dominance_order};
pub use enumerate::{EnumerateConfig, TierSearch, enumerate_tiers, identity_order};
pub use error::{RankError, Result};
pub use fas::{ExhaustiveFas, FasSolution, FractionalRanking, exhaustive_fas, solve_exact, solve_relaxed};
pub use graph::{DegreeMode, WeightedArc, WeightedDigraph};
pub use objective::{Direction, cut_imbalance};
pub use partition::{Partition, balanced_partition};
pub use report::{RankingReport, TierRecord};
pub use solver::{BranchAndBound, ConstraintSolver, LinearSolver};
pub use tiering::{TieringSolution, solve_tiering};
pub use weak_order::{WeakGroup, WeakOrdering, weak_ordering};
