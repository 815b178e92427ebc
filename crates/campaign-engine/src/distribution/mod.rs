//! # Contact Distribution
//!
//! Splits a campaign's contacts between outbound agents and keeps that
//! split stable when the roster changes.
//!
//! ## Components
//!
//! - [`DistributionPlanner`]: first plan for a selection. Contiguous ranges
//!   in selection order, capped at the campaign ceiling.
//! - [`RedistributionEngine`]: supersedes a plan after agents are added or
//!   removed, moving as few contacts as possible.
//! - [`DistributionPlan`]: the immutable result shared by both.
//!
//! ## Modes
//!
//! | Mode | Strategy | Quantities |
//! |------|----------|------------|
//! | single | (automatic) | the one agent gets the effective total |
//! | multiple | automatic | `floor(E / n)` each, remainder per [`RemainderPolicy`] |
//! | multiple | manual | as supplied, validated against `E` |
//!
//! ## Example
//!
//! ```
//! use campaign_engine::distribution::{
//!     DistributionPlanner, DistributionRequest, RedistributionEngine,
//! };
//! use campaign_engine::types::AgentRef;
//!
//! let alice = AgentRef::new("a", "Alice", "1001");
//! let bruno = AgentRef::new("b", "Bruno", "1002");
//! let carla = AgentRef::new("c", "Carla", "1003");
//!
//! let plan = DistributionPlanner::default()
//!     .plan(10_000, &DistributionRequest::automatic(vec![alice.clone(), bruno.clone()]))
//!     .unwrap();
//!
//! let next = RedistributionEngine::default()
//!     .redistribute(&plan, &DistributionRequest::automatic(vec![alice, bruno, carla]), 10_000)
//!     .unwrap();
//!
//! // Carla is fed from the tail; nothing below index 6666 changes hands
//! assert_eq!(next.agent_for(9_999).map(|id| id.as_str()), Some("c"));
//! assert_eq!(next.agent_for(6_665).map(|id| id.as_str()), Some("b"));
//! ```
//!
//! [`RemainderPolicy`]: crate::config::RemainderPolicy

pub mod plan;
pub mod planner;
pub mod redistribution;

pub use plan::{AgentAllocation, AllocationStrategy, DistributionMode, DistributionPlan, IndexRange};
pub use planner::{automatic_quantities, DistributionPlanner, DistributionRequest};
pub use redistribution::{RedistributionEngine, RedistributionMode};
