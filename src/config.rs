//! Transition configuration - Pose names, flags, and forwarded props.
//!
//! Construct with struct literal syntax and `..Default::default()`:
//!
//! ```ignore
//! use spark_transition::{TransitionConfig, TransitionFlags};
//!
//! let config: TransitionConfig = TransitionConfig {
//!     flags: TransitionFlags::ENTER_AFTER_EXIT,
//!     ..Default::default()
//! };
//! ```

use crate::types::{Pose, TransitionFlags};

/// Configuration for a transition group.
///
/// Pose names are opaque to the reconciler; they are handed to elements as
/// instructions for the external animation engine. `P` is an arbitrary
/// caller prop type forwarded unchanged to every emitted element.
#[derive(Clone)]
pub struct TransitionConfig<P: Clone = ()> {
    /// Pose an entering element snaps to before animating in.
    pub pre_enter_pose: Pose,
    /// Pose an entering element animates toward.
    pub enter_pose: Pose,
    /// Pose a leaving element animates toward.
    pub exit_pose: Pose,
    /// Behavior flags.
    pub flags: TransitionFlags,
    /// Props forwarded unchanged to every emitted element.
    pub forwarded: P,
}

impl<P: Clone + Default> Default for TransitionConfig<P> {
    fn default() -> Self {
        Self {
            pre_enter_pose: Pose::from("exit"),
            enter_pose: Pose::from("enter"),
            exit_pose: Pose::from("exit"),
            flags: TransitionFlags::NONE,
            forwarded: P::default(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
