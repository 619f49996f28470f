//! Element seam - The clone-with-overrides contract and a ready-made node.
//!
//! The reconciler never builds or mutates host elements itself. It works
//! through a narrow contract, [`TransitionChild`]: expose a key, and produce
//! a clone with a transition overlay merged in. The host view tree (or a
//! test double) supplies the implementation.
//!
//! # Shallow Merge Semantics
//!
//! [`ChildOverrides`] is the overlay handed to [`TransitionChild::with_overrides`].
//! Only the slots the overlay names are replaced; every other prop on the
//! element keeps its previous value. There are exactly three overlay shapes,
//! one per lifecycle classification:
//!
//! - [`ChildOverrides::Enter`] - sets the initial-pose slot (possibly
//!   clearing it), sets the target pose, **clears any completion hook**
//!   (entry needs no removal scheduling), and applies measurement flags.
//! - [`ChildOverrides::Persist`] - measurement flags and forwarded props
//!   only. Pose slots are untouched: whatever the caller's own props
//!   specify elsewhere stays in force.
//! - [`ChildOverrides::Exit`] - sets the target pose, attaches the
//!   settle hook, and sets the layout-pop flag. The initial-pose slot and
//!   measurement flags are untouched.
//!
//! [`PosedNode`] is a concrete implementation for hosts without their own
//! element type, and the double the crate's tests reconcile against.

use crate::types::{ElementKey, Pose, PoseCompleteHook};

// =============================================================================
// Child Overrides
// =============================================================================

/// Transition overlay merged into a child when it is cloned into the
/// output list. `P` is the caller's pass-through prop type, forwarded
/// unchanged to every emitted element.
#[derive(Clone)]
pub enum ChildOverrides<P: Clone> {
    /// The child is entering: snap to `initial_pose` (or clear the slot
    /// when `None`), animate toward `pose`, clear any completion hook.
    Enter {
        /// Pose to occupy before the enter animation begins. `None` on
        /// first mount without animate-on-mount: the child appears
        /// directly in the enter pose.
        initial_pose: Option<Pose>,
        /// Pose to animate toward.
        pose: Pose,
        /// FLIP-move measurement flag, forwarded to the element.
        flip_move: bool,
        /// Self-measurement flag (set when exits pop from layout, so
        /// survivors can restore their measured bounds).
        measure_self: bool,
        /// Caller props forwarded unchanged.
        forwarded: P,
    },

    /// The child persists: no pose or lifecycle change imposed.
    Persist {
        /// FLIP-move measurement flag, forwarded to the element.
        flip_move: bool,
        /// Self-measurement flag.
        measure_self: bool,
        /// Caller props forwarded unchanged.
        forwarded: P,
    },

    /// The child is leaving: animate toward `pose`, fire `on_pose_complete`
    /// once settled, optionally pop out of layout flow immediately.
    Exit {
        /// Pose to animate toward.
        pose: Pose,
        /// Invoked by the animation engine when the exit pose settles.
        on_pose_complete: PoseCompleteHook,
        /// Exclude the element from layout flow while it animates out.
        pop_from_layout: bool,
        /// Caller props forwarded unchanged.
        forwarded: P,
    },
}

// =============================================================================
// Transition Child Contract
// =============================================================================

/// A pose-capable element handle the reconciler can classify and clone.
///
/// Implementors must uphold the shallow-merge semantics described in the
/// module docs: overlay slots replace, absent slots keep their values.
///
/// `key()` returns `Option` because keys live on the host's element type;
/// the reconciler turns `None` into a fatal
/// [`MissingKey`](crate::error::TransitionError::MissingKey) error rather
/// than tolerating unkeyed children.
pub trait TransitionChild<P: Clone>: Clone {
    /// The child's identity, if it was given one.
    fn key(&self) -> Option<ElementKey>;

    /// Clone the child with the transition overlay merged in.
    fn with_overrides(&self, overrides: ChildOverrides<P>) -> Self;
}

// =============================================================================
// Posed Node
// =============================================================================

/// A ready-made [`TransitionChild`]: a bag of pose slots plus caller props.
///
/// Hosts with their own element representation implement [`TransitionChild`]
/// directly; everyone else (and this crate's tests) can reconcile
/// `PosedNode`s and read the annotations off the output.
///
/// # Example
///
/// ```ignore
/// use spark_transition::{PosedNode, ElementKey};
///
/// let node: PosedNode = PosedNode::new("sidebar");
/// assert_eq!(node.key, Some(ElementKey::from("sidebar")));
/// assert!(node.pose.is_none()); // no pose until a reconciliation pass
/// ```
#[derive(Clone)]
pub struct PosedNode<P: Clone = ()> {
    /// Element identity. `None` models a caller bug and makes the
    /// reconciler fail the pass.
    pub key: Option<ElementKey>,
    /// Pose to snap to before animating (entering elements only).
    pub initial_pose: Option<Pose>,
    /// Pose the element is currently animating toward.
    pub pose: Option<Pose>,
    /// Settle hook. Populated on leaving elements, cleared on entry.
    pub on_pose_complete: Option<PoseCompleteHook>,
    /// Whether the element is excluded from layout flow.
    pub pop_from_layout: bool,
    /// FLIP-move measurement flag.
    pub flip_move: bool,
    /// Self-measurement flag.
    pub measure_self: bool,
    /// Caller props from the last overlay, if any pass touched this node.
    pub props: Option<P>,
}

impl<P: Clone> PosedNode<P> {
    /// Create a keyed node with empty pose slots.
    pub fn new(key: impl Into<ElementKey>) -> Self {
        Self {
            key: Some(key.into()),
            initial_pose: None,
            pose: None,
            on_pose_complete: None,
            pop_from_layout: false,
            flip_move: false,
            measure_self: false,
            props: None,
        }
    }

    /// Create a node without a key, for exercising the contract-violation
    /// path. Reconciling this node always fails.
    pub fn unkeyed() -> Self {
        Self {
            key: None,
            initial_pose: None,
            pose: None,
            on_pose_complete: None,
            pop_from_layout: false,
            flip_move: false,
            measure_self: false,
            props: None,
        }
    }
}

impl<P: Clone> TransitionChild<P> for PosedNode<P> {
    fn key(&self) -> Option<ElementKey> {
        self.key.clone()
    }

    fn with_overrides(&self, overrides: ChildOverrides<P>) -> Self {
        let mut node = self.clone();
        match overrides {
            ChildOverrides::Enter {
                initial_pose,
                pose,
                flip_move,
                measure_self,
                forwarded,
            } => {
                node.initial_pose = initial_pose;
                node.pose = Some(pose);
                node.on_pose_complete = None;
                node.flip_move = flip_move;
                node.measure_self = measure_self;
                node.props = Some(forwarded);
            }
            ChildOverrides::Persist {
                flip_move,
                measure_self,
                forwarded,
            } => {
                node.flip_move = flip_move;
                node.measure_self = measure_self;
                node.props = Some(forwarded);
            }
            ChildOverrides::Exit {
                pose,
                on_pose_complete,
                pop_from_layout,
                forwarded,
            } => {
                node.pose = Some(pose);
                node.on_pose_complete = Some(on_pose_complete);
                node.pop_from_layout = pop_from_layout;
                node.props = Some(forwarded);
            }
        }
        node
    }
}

// =============================================================================
// Tests
// =============================================================================
