//! Weighted dominance graph model.
//!
//! # Overview
//!
//! Every solver in this crate reads a [`WeightedDigraph`]: `n` named
//! entities and a non-negative weight per ordered pair. An arc `A → B` with
//! weight `w` means "A dominates / sends flow to B with strength `w`".
//!
//! ## Pipeline
//!
//! ```text
//! weight table (CSV / JSON)
//!        ↓  WeightedDigraph::from_matrix()
//! WeightedDigraph
//!        ↓  fas::solve_exact() / dominance::dominance_order()
//! residual graph (feedback arcs removed)
//!        ↓  cycles::residual_cycles()  (precondition check)
//!        ↓  weak_order::weak_ordering()
//! WeakOrdering
//! ```

pub mod cycles;
pub mod digraph;
pub mod generate;

pub use cycles::{find_cycles, is_acyclic, residual_cycles, tied_groups};
pub use digraph::{DegreeMode, WeightedArc, WeightedDigraph};
pub use generate::{TournamentConfig, random_digraph, random_tournament};
