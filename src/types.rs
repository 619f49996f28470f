//! Core types - Keys, poses, flags, and callback aliases.
//!
//! Everything here is identity or configuration data shared by the
//! reconciler and the group owner:
//! - [`ElementKey`] - string-normalized element identity
//! - [`Pose`] - opaque pose identifier interpreted by the animation engine
//! - [`TransitionFlags`] - behavior flags as a bitfield
//! - [`PoseCompleteHook`] / [`RemovalScheduler`] - callback types
//!
//! # Key Normalization
//!
//! Keys may originate as strings or integers. Integer keys are normalized
//! to their decimal string form, so `ElementKey::from(42)` and
//! `ElementKey::from("42")` are the same identity. This matters for
//! entering/leaving classification: a child keyed `7` in one pass and
//! `"7"` in the next is the *same* child, not a remove + insert.

use std::fmt;
use std::rc::Rc;

// =============================================================================
// Element Key
// =============================================================================

/// Caller-assigned unique identifier establishing element identity across
/// reconciliation passes.
///
/// Construct via `From`: `ElementKey::from("sidebar")`, `ElementKey::from(3)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementKey(String);

impl ElementKey {
    /// The normalized string form of the key.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ElementKey {
    fn from(key: String) -> Self {
        ElementKey(key)
    }
}

impl From<&str> for ElementKey {
    fn from(key: &str) -> Self {
        ElementKey(key.to_string())
    }
}

// Numeric keys normalize to their decimal string form.
macro_rules! key_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ElementKey {
                fn from(key: $ty) -> Self {
                    ElementKey(key.to_string())
                }
            }
        )*
    };
}

key_from_int!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

// =============================================================================
// Pose
// =============================================================================

/// An opaque visual/animation state identifier.
///
/// The reconciler never interprets poses; it only decides *which* pose slot
/// of an element to fill. The external animation engine gives them meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pose(String);

impl Pose {
    /// The pose name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Pose {
    fn from(name: String) -> Self {
        Pose(name)
    }
}

impl From<&str> for Pose {
    fn from(name: &str) -> Self {
        Pose(name.to_string())
    }
}

// =============================================================================
// Transition Flags (bitflags)
// =============================================================================

bitflags::bitflags! {
    /// Transition behavior flags as a bitfield.
    ///
    /// Combine with bitwise OR:
    /// `TransitionFlags::ANIMATE_ON_MOUNT | TransitionFlags::ENTER_AFTER_EXIT`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TransitionFlags: u8 {
        const NONE = 0;
        /// Apply the pre-enter pose even on the first-ever pass.
        const ANIMATE_ON_MOUNT = 1 << 0;
        /// Defer newly entering elements until all current exits resolve.
        const ENTER_AFTER_EXIT = 1 << 1;
        /// Pop leaving elements out of layout flow immediately on exit.
        const POP_FROM_LAYOUT_ON_EXIT = 1 << 2;
        /// FLIP-style move animation: forces layout-pop on exit and is
        /// forwarded to every element as a measurement flag.
        const FLIP_MOVE = 1 << 3;
    }
}

impl TransitionFlags {
    /// Whether leaving elements should be popped from layout flow.
    ///
    /// True when either `POP_FROM_LAYOUT_ON_EXIT` or `FLIP_MOVE` is set.
    pub fn pops_on_exit(self) -> bool {
        self.intersects(Self::POP_FROM_LAYOUT_ON_EXIT | Self::FLIP_MOVE)
    }
}

// =============================================================================
// Callback Types
// =============================================================================

/// Pose-settle callback attached to a leaving element.
///
/// The external animation engine invokes this at most once, when the exit
/// pose transition has settled. Rc<dyn Fn> rather than Box<dyn FnOnce>
/// because element clones share the hook.
pub type PoseCompleteHook = Rc<dyn Fn()>;

/// Removal-scheduling notification.
///
/// Receives the key of a leaving element whose exit animation settled. The
/// owner of the backing list is expected to drop that key so the next
/// target list omits it.
pub type RemovalScheduler = Rc<dyn Fn(ElementKey)>;

// =============================================================================
// Tests
// =============================================================================
