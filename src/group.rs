//! Transition group - The owner loop around the reconciler.
//!
//! [`reconcile`] is a pure function over caller-owned state. A
//! `TransitionGroup` is that caller: it owns the displayed list, the
//! [`LeavingMap`], and the has-mounted flag, and it receives the settle
//! notifications that close the deferred-removal loop.
//!
//! # Lifecycle
//!
//! 1. The host calls [`TransitionGroup::set_children`] whenever its target
//!    list changes and renders the returned annotated list.
//! 2. The external animation engine drives exit animations and fires each
//!    leaving child's settle hook, which appends the key to the group's
//!    pending-removal queue (a [`Signal`], so reactive hosts can observe it
//!    and trigger the next pass).
//! 3. The next `set_children` call applies the queued removals - dropping
//!    settled children from the displayed list - before reconciling.
//!
//! A late settle notification for a child that re-entered in the meantime
//! is stale and is dropped, not applied.
//!
//! # Example
//!
//! ```ignore
//! use spark_transition::{PosedNode, TransitionConfig, TransitionGroup};
//!
//! let mut group: TransitionGroup = TransitionGroup::new(TransitionConfig::default());
//!
//! let shown = group.set_children(&[PosedNode::new("a"), PosedNode::new("b")])?;
//! // ... render `shown`, hand poses to the animation engine ...
//!
//! // "b" removed from the target: it stays in the output, exit-annotated.
//! let shown = group.set_children(&[PosedNode::new("a")])?;
//! assert_eq!(shown.len(), 2);
//!
//! // Engine settles b's exit (fires its hook), host re-renders:
//! let shown = group.set_children(&[PosedNode::new("a")])?;
//! assert_eq!(shown.len(), 1);
//! ```
//!
//! Calls on one group must be strictly sequential (single owner loop); the
//! only asynchrony is hook invocation by the animation engine, which only
//! ever appends to the pending queue.

use std::collections::HashSet;

use spark_signals::{Signal, signal};

use crate::config::TransitionConfig;
use crate::element::{PosedNode, TransitionChild};
use crate::error::TransitionError;
use crate::reconcile::{LeavingMap, reconcile};
use crate::types::{ElementKey, RemovalScheduler};

/// Owner of the state a transition reconciliation loop threads between
/// passes.
pub struct TransitionGroup<P: Clone = (), E: TransitionChild<P> = PosedNode<P>> {
    config: TransitionConfig<P>,
    displayed: Vec<E>,
    leaving: LeavingMap,
    has_mounted: bool,
    /// Settle notifications not yet applied by a pass.
    pending: Signal<Vec<ElementKey>>,
    scheduler: RemovalScheduler,
}

impl<P: Clone, E: TransitionChild<P>> TransitionGroup<P, E> {
    /// Create a group with no displayed children.
    pub fn new(config: TransitionConfig<P>) -> Self {
        let pending: Signal<Vec<ElementKey>> = signal(Vec::new());
        let pending_hook = pending.clone();
        let scheduler: RemovalScheduler = std::rc::Rc::new(move |key| {
            let mut queue = pending_hook.get();
            queue.push(key);
            pending_hook.set(queue);
        });

        Self {
            config,
            displayed: Vec::new(),
            leaving: LeavingMap::new(),
            has_mounted: false,
            pending,
            scheduler,
        }
    }

    /// Run a reconciliation pass against a new target list.
    ///
    /// Applies queued settle notifications first (dropping settled children
    /// from the displayed list), then reconciles and stores the annotated
    /// output as the new displayed list.
    ///
    /// # Returns
    ///
    /// The new displayed list, in final visual order, or the reconciler's
    /// error when a child has no key. On error the group's state is left as
    /// it was before the call.
    pub fn set_children(&mut self, target: &[E]) -> Result<&[E], TransitionError> {
        self.apply_pending_removals(target);

        let out = reconcile(
            target,
            &self.config,
            &self.displayed,
            &mut self.leaving,
            self.has_mounted,
            self.scheduler.clone(),
        )?;

        self.displayed = out.children;
        self.has_mounted = out.has_mounted;
        Ok(&self.displayed)
    }

    /// The current annotated output list.
    pub fn children(&self) -> &[E] {
        &self.displayed
    }

    /// Whether a first pass has ever run.
    pub fn has_mounted(&self) -> bool {
        self.has_mounted
    }

    /// Whether `key` is currently mid-exit.
    pub fn is_leaving(&self, key: &ElementKey) -> bool {
        self.leaving.is_mid_exit(key)
    }

    /// Number of children currently mid-exit.
    pub fn leaving_count(&self) -> usize {
        self.leaving.len()
    }

    /// Settle notifications queued since the last pass.
    ///
    /// Reactive hosts can observe this signal to know when another
    /// [`set_children`](Self::set_children) call is due.
    pub fn pending_removals(&self) -> Signal<Vec<ElementKey>> {
        self.pending.clone()
    }

    /// The group's configuration.
    pub fn config(&self) -> &TransitionConfig<P> {
        &self.config
    }

    /// Mutable access to the configuration. Takes effect on the next pass.
    pub fn config_mut(&mut self) -> &mut TransitionConfig<P> {
        &mut self.config
    }

    /// Drain the pending queue and drop settled children.
    ///
    /// A notification is stale - and dropped without effect - when its key
    /// is no longer mid-exit, or when the key reappears in the incoming
    /// target list (the child is simultaneously re-entering; the reconciler
    /// reclaims it instead).
    fn apply_pending_removals(&mut self, target: &[E]) {
        let settled = self.pending.get();
        if settled.is_empty() {
            return;
        }
        self.pending.set(Vec::new());

        let target_keys: HashSet<ElementKey> =
            target.iter().filter_map(|child| child.key()).collect();

        for key in settled {
            if target_keys.contains(&key) || !self.leaving.is_mid_exit(&key) {
                continue;
            }
            self.leaving.remove(&key);
            self.displayed
                .retain(|child| child.key().as_ref() != Some(&key));
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
