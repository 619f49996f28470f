//! Error types for the transition reconciler.
//!
//! Only two things can fail, and both indicate bugs rather than runtime
//! conditions to recover from:
//! - A child without a key (caller/integration bug upstream - elements must
//!   always be constructed with explicit identity, otherwise entering/leaving
//!   classification is undefined).
//! - A leaving key that cannot be located in the displayed list (internal
//!   invariant violation; should never occur given correct input).
//!
//! Empty lists and zero-enter/zero-leave passes are valid steady states,
//! not errors.

use thiserror::Error;

use crate::types::ElementKey;

/// Which input list a contract violation was detected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildList {
    /// The list the caller wants visible next.
    Target,
    /// The list currently rendered.
    Displayed,
}

impl std::fmt::Display for ChildList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChildList::Target => f.write_str("target"),
            ChildList::Displayed => f.write_str("displayed"),
        }
    }
}

/// Errors produced by [`reconcile`](crate::reconcile::reconcile).
///
/// Both variants are fatal from the reconciler's point of view: the pass is
/// abandoned, no tracking state is guaranteed consistent, and retrying with
/// the same input will fail again.
#[derive(Debug, Error)]
pub enum TransitionError {
    /// A child was supplied without a key. Every child of a transition
    /// group must carry a unique key.
    #[error("child at index {index} of the {list} list has no key; every child of a transition group must be given a unique key")]
    MissingKey {
        /// Which input list the unkeyed child was found in.
        list: ChildList,
        /// Position of the unkeyed child within that list.
        index: usize,
    },

    /// A key classified as leaving could not be found in the displayed
    /// list. Defensive: indicates a broken reconciler invariant, not a
    /// caller mistake.
    #[error("leaving child `{key}` not found in the displayed list")]
    MissingLeavingChild {
        /// The key that was classified as leaving.
        key: ElementKey,
    },
}

// =============================================================================
// Tests
// =============================================================================
