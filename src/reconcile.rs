//! Reconciler - Enter/exit classification and output-list construction.
//!
//! This is the core of the crate: compare the *target* child list (what the
//! caller wants visible next) against the *displayed* child list (what is
//! currently rendered), classify every key as entering, leaving, or
//! persisting, and build the annotated output list. Leaving children are
//! not dropped; they are kept in the output in their original position with
//! an exit overlay, and real removal is deferred until their exit animation
//! settles.
//!
//! # Algorithm
//!
//! 1. Extract key sequences from both lists (order-preserving; an unkeyed
//!    child fails the pass).
//! 2. A target key is *entering* if it is absent from the displayed keys,
//!    or if it is tracked as mid-exit in the [`LeavingMap`] (it reappeared
//!    before its exit finished - the map entry is cleared so it resumes
//!    forward motion instead of restarting).
//! 3. Displayed keys absent from the target are *leaving*, in displayed
//!    order.
//! 4. Traverse the target list: entering children get the enter overlay
//!    (or are omitted this pass when `ENTER_AFTER_EXIT` is set and exits
//!    are in flight), everything else gets the persist overlay.
//! 5. Each leaving child is marked mid-exit, cloned with the exit overlay
//!    (settle hook wraps the caller's removal scheduler), and reinserted
//!    at its original displayed index so the visual order during a
//!    simultaneous enter+leave matches the pre-transition layout.
//!
//! The only side effect is mutation of the caller-owned [`LeavingMap`];
//! given its inputs the function is otherwise referentially transparent.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::config::TransitionConfig;
use crate::element::{ChildOverrides, TransitionChild};
use crate::error::{ChildList, TransitionError};
use crate::types::{ElementKey, PoseCompleteHook, RemovalScheduler, TransitionFlags};

// =============================================================================
// Leaving Map
// =============================================================================

/// Tracking state for children that are mid-exit, keyed by element key.
///
/// Owned by the caller for the lifetime of a transition group and passed
/// `&mut` into every [`reconcile`] call. Entries map keys to booleans:
/// `false` marks a child whose exit animation is in flight. `true` is a
/// reserved transient marker for a key identified as re-entering; the
/// reconciler always deletes it within the same pass, so it is never
/// observable from outside.
///
/// Calls sharing one map must be strictly sequential: the map is mutated in
/// place without synchronization. A single owner loop satisfies this
/// naturally.
#[derive(Debug, Clone, Default)]
pub struct LeavingMap {
    entries: HashMap<ElementKey, bool>,
}

impl LeavingMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `key` is tracked as mid-exit.
    pub fn is_mid_exit(&self, key: &ElementKey) -> bool {
        self.entries.get(key) == Some(&false)
    }

    /// Mark `key` as mid-exit.
    pub fn mark_exiting(&mut self, key: ElementKey) {
        self.entries.insert(key, false);
    }

    /// Drop `key` from tracking. Returns true if an entry was present.
    pub fn remove(&mut self, key: &ElementKey) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Whether any child is tracked at all.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tracked children.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over the tracked keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &ElementKey> {
        self.entries.keys()
    }
}

// =============================================================================
// Reconcile Output
// =============================================================================

/// Result of a reconciliation pass.
pub struct ReconcileOutput<E> {
    /// The annotated output list, in final visual order.
    pub children: Vec<E>,
    /// Updated has-mounted flag; always true after a pass. The caller
    /// stores this and feeds it back into the next call.
    pub has_mounted: bool,
}

// =============================================================================
// Reconcile
// =============================================================================

/// Reconcile the target child list against the displayed child list.
///
/// # Arguments
///
/// * `target` - Children the caller wants visible next; their order defines
///   the final visual order for non-leaving children.
/// * `config` - Pose names, flags, and props forwarded to every child.
/// * `displayed` - Children currently rendered (the previous pass's output,
///   or the initial mount list).
/// * `leaving` - Caller-owned mid-exit tracking state; mutated in place.
/// * `has_mounted` - False only before the first-ever pass; governs whether
///   entering children snap to the pre-enter pose.
/// * `schedule_removal` - Invoked with a leaving child's key when its exit
///   animation settles. The caller is expected to drop that key from the
///   backing data that produces future target lists.
///
/// # Returns
///
/// The annotated output list plus the updated has-mounted flag, or a
/// [`TransitionError`] when a child has no key (caller bug) or a leaving
/// key cannot be located (broken internal invariant). Errors are fatal for
/// the pass; retrying with the same input fails again.
pub fn reconcile<P, E>(
    target: &[E],
    config: &TransitionConfig<P>,
    displayed: &[E],
    leaving: &mut LeavingMap,
    has_mounted: bool,
    schedule_removal: RemovalScheduler,
) -> Result<ReconcileOutput<E>, TransitionError>
where
    P: Clone,
    E: TransitionChild<P>,
{
    let target_keys = collect_keys(target, ChildList::Target)?;
    let displayed_keys = collect_keys(displayed, ChildList::Displayed)?;
    let displayed_key_set: HashSet<&ElementKey> = displayed_keys.iter().collect();

    // Entering: absent from displayed, or reclaimed mid-exit. A reclaimed
    // child resumes forward motion from wherever its exit left it, so its
    // tracking entry is cleared in the same pass.
    let mut entering: HashSet<ElementKey> = HashSet::new();
    let mut seen: HashSet<&ElementKey> = HashSet::new();
    for key in &target_keys {
        if !seen.insert(key) {
            eprintln!(
                "[spark-transition] Duplicate key detected: `{key}`. \
                Keys must be unique. This may cause unexpected behavior."
            );
            continue;
        }

        let is_entering = !displayed_key_set.contains(key) || leaving.is_mid_exit(key);
        if is_entering {
            leaving.remove(key);
            entering.insert(key.clone());
        }
    }

    // Leaving: displayed but no longer targeted. Displayed order (and the
    // original index) is needed for reinsertion below.
    let target_key_set: HashSet<&ElementKey> = target_keys.iter().collect();
    let leaving_keys: Vec<(usize, ElementKey)> = displayed_keys
        .iter()
        .enumerate()
        .filter(|(_, key)| !target_key_set.contains(key))
        .map(|(index, key)| (index, key.clone()))
        .collect();

    let flip_move = config.flags.contains(TransitionFlags::FLIP_MOVE);
    let measure_self = config
        .flags
        .contains(TransitionFlags::POP_FROM_LAYOUT_ON_EXIT);
    let defer_entries =
        config.flags.contains(TransitionFlags::ENTER_AFTER_EXIT) && !leaving_keys.is_empty();

    let mut children: Vec<E> = Vec::with_capacity(target.len() + leaving_keys.len());

    for (child, key) in target.iter().zip(&target_keys) {
        let is_entering = entering.contains(key);

        // Entries are deferred while exits are in flight: the child is
        // omitted this pass and re-evaluated when it appears in a future
        // target list, by which time the exits may have resolved.
        if is_entering && defer_entries {
            continue;
        }

        let overrides = if is_entering {
            ChildOverrides::Enter {
                initial_pose: (config.flags.contains(TransitionFlags::ANIMATE_ON_MOUNT)
                    || has_mounted)
                    .then(|| config.pre_enter_pose.clone()),
                pose: config.enter_pose.clone(),
                flip_move,
                measure_self,
                forwarded: config.forwarded.clone(),
            }
        } else {
            ChildOverrides::Persist {
                flip_move,
                measure_self,
                forwarded: config.forwarded.clone(),
            }
        };

        children.push(child.with_overrides(overrides));
    }

    for (index, key) in leaving_keys {
        leaving.mark_exiting(key.clone());

        let child = displayed
            .get(index)
            .ok_or_else(|| TransitionError::MissingLeavingChild { key: key.clone() })?;

        let hook: PoseCompleteHook = {
            let schedule = schedule_removal.clone();
            let key = key.clone();
            Rc::new(move || schedule(key.clone()))
        };

        let clone = child.with_overrides(ChildOverrides::Exit {
            pose: config.exit_pose.clone(),
            on_pose_complete: hook,
            pop_from_layout: config.flags.pops_on_exit(),
            forwarded: config.forwarded.clone(),
        });

        // Reinsert at the original displayed position so the visual order
        // during a simultaneous enter+leave matches the pre-transition
        // layout. Deferred entries can leave the list shorter than the
        // index, so clamp to the end.
        let at = index.min(children.len());
        children.insert(at, clone);
    }

    Ok(ReconcileOutput {
        children,
        has_mounted: true,
    })
}

/// Extract keys from a child list, order-preserving. An unkeyed child is a
/// fatal contract violation: downstream identity tracking would be
/// undefined.
fn collect_keys<P, E>(children: &[E], list: ChildList) -> Result<Vec<ElementKey>, TransitionError>
where
    P: Clone,
    E: TransitionChild<P>,
{
    children
        .iter()
        .enumerate()
        .map(|(index, child)| {
            child
                .key()
                .ok_or(TransitionError::MissingKey { list, index })
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::PosedNode;
    use crate::types::Pose;
    use std::cell::RefCell;

    fn node(key: &str) -> PosedNode {
        PosedNode::new(key)
    }

    fn keys_of(children: &[PosedNode]) -> Vec<String> {
        children
            .iter()
            .map(|c| c.key.as_ref().unwrap().to_string())
            .collect()
    }

    fn noop_scheduler() -> RemovalScheduler {
        Rc::new(|_| {})
    }

    fn recording_scheduler() -> (RemovalScheduler, Rc<RefCell<Vec<ElementKey>>>) {
        let scheduled: Rc<RefCell<Vec<ElementKey>>> = Rc::new(RefCell::new(Vec::new()));
        let scheduled_hook = scheduled.clone();
        let scheduler: RemovalScheduler =
            Rc::new(move |key| scheduled_hook.borrow_mut().push(key));
        (scheduler, scheduled)
    }

    #[test]
    fn test_noop_pass_keeps_order_and_poses() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let children = vec![node("a"), node("b"), node("c")];

        let out = reconcile(
            &children,
            &config,
            &children,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert_eq!(keys_of(&out.children), ["a", "b", "c"]);
        assert!(out.has_mounted);
        assert!(leaving.is_empty());
        for child in &out.children {
            assert!(child.pose.is_none());
            assert!(child.initial_pose.is_none());
            assert!(child.on_pose_complete.is_none());
            assert!(child.props.is_some()); // forwarded props always applied
        }
    }

    #[test]
    fn test_entering_detection() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a")];
        let target = vec![node("a"), node("b")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert_eq!(keys_of(&out.children), ["a", "b"]);

        let a = &out.children[0];
        assert!(a.pose.is_none()); // persisting: untouched

        let b = &out.children[1];
        assert_eq!(b.initial_pose, Some(Pose::from("exit"))); // pre-enter pose
        assert_eq!(b.pose, Some(Pose::from("enter")));
        assert!(b.on_pose_complete.is_none());
    }

    #[test]
    fn test_leaving_reinserted_at_original_position() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a"), node("b"), node("c")];
        let target = vec![node("a"), node("c")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        // b is reinserted at index 1, not appended.
        assert_eq!(keys_of(&out.children), ["a", "b", "c"]);

        let b = &out.children[1];
        assert_eq!(b.pose, Some(Pose::from("exit")));
        assert!(b.on_pose_complete.is_some());
        assert!(!b.pop_from_layout); // no pop flags set

        assert_eq!(leaving.len(), 1);
        assert!(leaving.is_mid_exit(&ElementKey::from("b")));
    }

    #[test]
    fn test_reentry_reclaims_mid_exit_child() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        leaving.mark_exiting(ElementKey::from("b"));

        // b is still displayed (exit in flight) and reappears in the target.
        let displayed = vec![node("a"), node("b")];
        let target = vec![node("a"), node("b")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert!(leaving.is_empty());

        let b = &out.children[1];
        assert_eq!(b.pose, Some(Pose::from("enter")));
        assert!(b.on_pose_complete.is_none()); // exit hook replaced by no-op
    }

    #[test]
    fn test_enter_after_exit_admits_entry_when_nothing_leaves() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::ENTER_AFTER_EXIT,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a")];
        let target = vec![node("a"), node("b")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        // No exits in flight this pass, so b enters normally.
        assert_eq!(keys_of(&out.children), ["a", "b"]);
    }

    #[test]
    fn test_enter_after_exit_defers_entry_while_exits_in_flight() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::ENTER_AFTER_EXIT,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a"), node("c")];
        let target = vec![node("a"), node("b")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        // c is leaving, so b is omitted this pass; c holds its position.
        assert_eq!(keys_of(&out.children), ["a", "c"]);
        assert!(leaving.is_mid_exit(&ElementKey::from("c")));
    }

    #[test]
    fn test_enter_after_exit_clamps_reinsertion_index() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::ENTER_AFTER_EXIT,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        // Everything displayed leaves; everything targeted is deferred.
        let displayed = vec![node("a"), node("b")];
        let target = vec![node("c")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert_eq!(keys_of(&out.children), ["a", "b"]);
        assert_eq!(out.children[0].pose, Some(Pose::from("exit")));
        assert_eq!(out.children[1].pose, Some(Pose::from("exit")));
    }

    #[test]
    fn test_first_mount_skips_pre_enter_pose() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let target = vec![node("a")];

        let out = reconcile(
            &target,
            &config,
            &[],
            &mut leaving,
            false,
            noop_scheduler(),
        )
        .unwrap();

        let a = &out.children[0];
        assert!(a.initial_pose.is_none()); // appears directly in enter pose
        assert_eq!(a.pose, Some(Pose::from("enter")));
        assert!(out.has_mounted);

        // A later insertion does get the pre-enter pose.
        let displayed = out.children;
        let target = vec![node("a"), node("b")];
        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert_eq!(out.children[1].initial_pose, Some(Pose::from("exit")));
    }

    #[test]
    fn test_animate_on_mount_forces_pre_enter_pose() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::ANIMATE_ON_MOUNT,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let target = vec![node("a")];

        let out = reconcile(
            &target,
            &config,
            &[],
            &mut leaving,
            false,
            noop_scheduler(),
        )
        .unwrap();

        assert_eq!(out.children[0].initial_pose, Some(Pose::from("exit")));
    }

    #[test]
    fn test_removal_scheduled_once_across_multiple_passes() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let (scheduler, scheduled) = recording_scheduler();

        let displayed = vec![node("a"), node("b")];
        let target = vec![node("a")];

        // Two passes while b is leaving; each replaces b's hook.
        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            scheduler.clone(),
        )
        .unwrap();
        let out = reconcile(
            &target,
            &config,
            &out.children,
            &mut leaving,
            true,
            scheduler,
        )
        .unwrap();

        // The engine settles the exit and fires the current hook once.
        out.children[1].on_pose_complete.as_ref().unwrap()();

        assert_eq!(scheduled.borrow().as_slice(), [ElementKey::from("b")]);
    }

    #[test]
    fn test_pop_from_layout_on_exit() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::POP_FROM_LAYOUT_ON_EXIT,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a"), node("b")];
        let target = vec![node("a")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert!(out.children[1].pop_from_layout);
        assert!(out.children[0].measure_self); // survivors measure themselves
        assert!(!out.children[0].flip_move);
    }

    #[test]
    fn test_flip_move_forces_pop_and_forwards_flag() {
        let config: TransitionConfig = TransitionConfig {
            flags: TransitionFlags::FLIP_MOVE,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let displayed = vec![node("a"), node("b")];
        let target = vec![node("a")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        assert!(out.children[1].pop_from_layout);
        assert!(out.children[0].flip_move);
        assert!(!out.children[0].measure_self);
    }

    #[test]
    fn test_forwarded_props_reach_every_child() {
        let config: TransitionConfig<u32> = TransitionConfig {
            forwarded: 7,
            ..Default::default()
        };
        let mut leaving = LeavingMap::new();
        let displayed: Vec<PosedNode<u32>> = vec![PosedNode::new("a"), PosedNode::new("b")];
        let target: Vec<PosedNode<u32>> = vec![PosedNode::new("a"), PosedNode::new("c")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        // Persisting, leaving, and entering clones all carry the props.
        assert_eq!(out.children.len(), 3);
        for child in &out.children {
            assert_eq!(child.props, Some(7));
        }
    }

    #[test]
    fn test_numeric_and_string_keys_share_identity() {
        let config: TransitionConfig = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let displayed = vec![PosedNode::new(1u32)];
        let target = vec![PosedNode::new("1")];

        let out = reconcile(
            &target,
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .unwrap();

        // Same identity: persisting, not a remove + insert.
        assert_eq!(out.children.len(), 1);
        assert!(out.children[0].pose.is_none());
        assert!(leaving.is_empty());
    }

    #[test]
    fn test_unkeyed_target_child_fails_the_pass() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let target = vec![node("a"), PosedNode::unkeyed()];

        let err = reconcile(&target, &config, &[], &mut leaving, true, noop_scheduler())
            .err()
            .expect("unkeyed child must fail");

        match err {
            TransitionError::MissingKey { list, index } => {
                assert_eq!(list, ChildList::Target);
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unkeyed_displayed_child_fails_the_pass() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let displayed = vec![PosedNode::unkeyed()];

        let err = reconcile(
            &[] as &[PosedNode],
            &config,
            &displayed,
            &mut leaving,
            true,
            noop_scheduler(),
        )
        .err()
        .expect("unkeyed child must fail");

        match err {
            TransitionError::MissingKey { list, index } => {
                assert_eq!(list, ChildList::Displayed);
                assert_eq!(index, 0);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_target_exits_everything() {
        let config = TransitionConfig::default();
        let mut leaving = LeavingMap::new();
        let (scheduler, scheduled) = recording_scheduler();
        let displayed = vec![node("a"), node("b")];

        let out = reconcile(&[], &config, &displayed, &mut leaving, true, scheduler).unwrap();

        assert_eq!(keys_of(&out.children), ["a", "b"]);
        assert_eq!(leaving.len(), 2);

        for child in &out.children {
            child.on_pose_complete.as_ref().unwrap()();
        }
        assert_eq!(
            scheduled.borrow().as_slice(),
            [ElementKey::from("a"), ElementKey::from("b")]
        );
    }
}
