//! # spark-transition
//!
//! Keyed enter/exit transition reconciler for reactive UI trees.
//!
//! Given a *target* child list (what should be visible next) and a
//! *displayed* child list (what is currently rendered), the reconciler
//! classifies every key as entering, leaving, or persisting and emits an
//! ordered output list annotated with transition instructions: initial
//! pose, target pose, settle hook, layout-pop flag. Leaving children are
//! not dropped immediately - they stay in the output at their original
//! position in an exit pose, and real removal is only scheduled once the
//! external animation engine reports the exit settled.
//!
//! The crate decides *what* transition to apply and *when* a child is
//! logically removed. It does not animate: poses are opaque identifiers
//! handed to an external engine, and elements are opaque handles consumed
//! through the [`TransitionChild`] clone-with-overrides contract.
//!
//! ## Architecture
//!
//! ```text
//! target list change → TransitionGroup::set_children → reconcile
//!     → annotated output list → host renders, engine animates
//!     → exit settles → settle hook queues removal → next pass drops key
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Keys, poses, flags, callback aliases
//! - [`config`] - [`TransitionConfig`]
//! - [`element`] - [`TransitionChild`] contract, [`ChildOverrides`], [`PosedNode`]
//! - [`reconcile`] - The core [`reconcile`](reconcile::reconcile) pass and [`LeavingMap`]
//! - [`group`] - [`TransitionGroup`], the owner loop
//! - [`error`] - [`TransitionError`]
//!
//! ## Example
//!
//! ```ignore
//! use spark_transition::{PosedNode, TransitionConfig, TransitionFlags, TransitionGroup};
//!
//! let mut group: TransitionGroup = TransitionGroup::new(TransitionConfig {
//!     flags: TransitionFlags::ENTER_AFTER_EXIT,
//!     ..Default::default()
//! });
//!
//! let shown = group.set_children(&[PosedNode::new("a"), PosedNode::new("b")])?;
//! // render `shown`; hand each child's poses and settle hook to the engine
//! ```

pub mod config;
pub mod element;
pub mod error;
pub mod group;
pub mod reconcile;
pub mod types;

// Re-export commonly used items
pub use types::{ElementKey, Pose, PoseCompleteHook, RemovalScheduler, TransitionFlags};

pub use config::TransitionConfig;

pub use element::{ChildOverrides, PosedNode, TransitionChild};

pub use error::{ChildList, TransitionError};

pub use reconcile::{LeavingMap, ReconcileOutput, reconcile};

pub use group::TransitionGroup;
