//! Publishing snapshots and routing actions back to the host

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use accesskit::{ActionHandler, ActionRequest, ActivationHandler, TreeUpdate};
use tracing::{debug, warn};

use crate::node::{A11yAction, A11yNode};
use crate::tree::{build_tree, PublishedTree, Repairs, ValidationPolicy};
use crate::{A11yError, Result};

/// Host callback for user-triggered actions: `(node_id, action)`
pub type ActionCallback = Rc<dyn Fn(u64, A11yAction)>;

/// Receives every published tree
pub trait AccessibilityHost {
    fn publish(&mut self, tree: &PublishedTree);
}

impl<F> AccessibilityHost for F
where
    F: FnMut(&PublishedTree),
{
    fn publish(&mut self, tree: &PublishedTree) {
        self(tree)
    }
}

/// Result of a successful update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    /// Nodes in the published tree
    pub nodes: usize,
    pub repairs: Repairs,
}

#[derive(Default)]
struct SyncState {
    tree: Option<Rc<PublishedTree>>,
    policy: ValidationPolicy,
    generation: u64,
}

/// Keeps the published accessibility tree for one context.
///
/// All methods take `&self` so the action callback can call back into
/// [`AccessibilitySync::update`] while an action is being delivered. No
/// borrow is held while host code runs.
#[derive(Default)]
pub struct AccessibilitySync {
    state: RefCell<SyncState>,
    host: RefCell<Option<Box<dyn AccessibilityHost>>>,
    callback: RefCell<Option<ActionCallback>>,
    // Set when the stored tree is newer than what the host has seen
    pending: Cell<bool>,
}

impl AccessibilitySync {
    pub fn new(policy: ValidationPolicy) -> Self {
        let sync = Self::default();
        sync.state.borrow_mut().policy = policy;
        sync
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.state
            .try_borrow()
            .map(|state| state.policy)
            .unwrap_or_default()
    }

    pub fn set_policy(&self, policy: ValidationPolicy) -> Result<()> {
        self.state.try_borrow_mut().map_err(|_| A11yError::Busy)?.policy = policy;
        Ok(())
    }

    /// The currently published tree, if any update has succeeded.
    pub fn tree(&self) -> Option<Rc<PublishedTree>> {
        self.state.try_borrow().ok().and_then(|state| state.tree.clone())
    }

    pub fn focus(&self) -> Option<u64> {
        self.tree().map(|tree| tree.focus())
    }

    /// Number of successful updates so far
    pub fn generation(&self) -> u64 {
        self.state.try_borrow().map(|state| state.generation).unwrap_or(0)
    }

    /// Replace the whole published tree with a new snapshot.
    ///
    /// On error the previous tree stays published.
    pub fn update(&self, nodes: Vec<A11yNode>, root: u64, focus: u64) -> Result<UpdateOutcome> {
        let policy = self.state.try_borrow().map_err(|_| A11yError::Busy)?.policy;
        let (tree, repairs) = build_tree(nodes, root, focus, policy)?;
        let outcome = UpdateOutcome {
            nodes: tree.len(),
            repairs,
        };
        {
            let mut state = self.state.try_borrow_mut().map_err(|_| A11yError::Busy)?;
            state.tree = Some(Rc::new(tree));
            state.generation += 1;
        }
        if !repairs.is_clean() {
            debug!("a11y: published tree after repairs {repairs:?}");
        }
        self.pending.set(true);
        self.flush();
        Ok(outcome)
    }

    /// Install the host; it immediately receives the current tree.
    pub fn set_host(&self, host: impl AccessibilityHost + 'static) {
        match self.host.try_borrow_mut() {
            Ok(mut slot) => *slot = Some(Box::new(host)),
            Err(_) => {
                warn!("a11y: host replaced while publishing, ignoring");
                return;
            }
        }
        if self.tree().is_some() {
            self.pending.set(true);
        }
        self.flush();
    }

    /// Only one callback is active; the last registration wins.
    pub fn set_action_callback(&self, callback: Option<ActionCallback>) {
        match self.callback.try_borrow_mut() {
            Ok(mut slot) => *slot = callback,
            Err(_) => warn!("a11y: action callback replaced while in use, ignoring"),
        }
    }

    /// Deliver a platform action for `node` to the host callback.
    ///
    /// Focus moves the stored focus to `node`, Blur on the focused node moves
    /// it back to the root. Returns false when `node` is not in the tree.
    pub fn perform_action(&self, node: u64, action: A11yAction) -> bool {
        {
            let Ok(mut state) = self.state.try_borrow_mut() else {
                warn!("a11y: action {action:?} on node {node} while busy, dropped");
                return false;
            };
            let Some(tree) = state.tree.as_mut() else {
                debug!("a11y: action {action:?} before any tree was published");
                return false;
            };
            if !tree.contains(node) {
                debug!("a11y: action {action:?} on unknown node {node}");
                return false;
            }
            let focus = match action {
                A11yAction::Focus => Some(node),
                A11yAction::Blur if tree.focus() == node => Some(tree.root()),
                _ => None,
            };
            if let Some(focus) = focus.filter(|&focus| focus != tree.focus()) {
                Rc::make_mut(tree).set_focus(focus);
                self.pending.set(true);
            }
        }
        self.flush();

        let callback = self.callback.try_borrow().ok().and_then(|cb| cb.clone());
        if let Some(callback) = callback {
            callback(node, action);
        }
        true
    }

    /// Route an AccessKit request. Unsupported actions are ignored.
    pub fn handle_request(&self, request: &ActionRequest) -> bool {
        match A11yAction::from_accesskit(request.action) {
            Some(action) => self.perform_action(request.target.0, action),
            None => {
                debug!("a11y: unsupported platform action {:?}", request.action);
                false
            }
        }
    }

    // Publish until the host has seen the latest tree. The host is moved out
    // while it runs, so a nested update only marks the tree pending and the
    // outermost flush republishes it.
    fn flush(&self) {
        let host = match self.host.try_borrow_mut() {
            Ok(mut slot) => slot.take(),
            Err(_) => None,
        };
        let Some(mut host) = host else {
            return;
        };
        while self.pending.replace(false) {
            if let Some(tree) = self.tree() {
                host.publish(&tree);
            }
        }
        if let Ok(mut slot) = self.host.try_borrow_mut() {
            // A host installed from inside publish takes precedence
            if slot.is_none() {
                *slot = Some(host);
            }
        }
    }
}

/// Adapter glue for AccessKit platform adapters.
impl ActivationHandler for &AccessibilitySync {
    fn request_initial_tree(&mut self) -> Option<TreeUpdate> {
        self.tree().map(|tree| tree.to_tree_update())
    }
}

impl ActionHandler for &AccessibilitySync {
    fn do_action(&mut self, request: ActionRequest) {
        self.handle_request(&request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::A11yRole;
    use accesskit::NodeId;

    fn snapshot() -> Vec<A11yNode> {
        vec![
            A11yNode::new(1, A11yRole::Window).with_children(vec![2, 3]),
            A11yNode::new(2, A11yRole::Button)
                .with_label("OK")
                .with_action(A11yAction::Click),
            A11yNode::new(3, A11yRole::TextInput).with_action(A11yAction::Focus),
        ]
    }

    #[test]
    fn test_update_publishes_to_host() {
        let sync = AccessibilitySync::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        sync.set_host(move |tree: &PublishedTree| log.borrow_mut().push(tree.len()));

        sync.update(snapshot(), 1, 2).unwrap();
        assert_eq!(*seen.borrow(), vec![3]);
        assert_eq!(sync.focus(), Some(2));
        assert_eq!(sync.generation(), 1);
    }

    #[test]
    fn test_host_set_late_receives_current_tree() {
        let sync = AccessibilitySync::default();
        sync.update(snapshot(), 1, 1).unwrap();
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        sync.set_host(move |_: &PublishedTree| c.set(c.get() + 1));
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_rejected_update_keeps_previous_tree() {
        let sync = AccessibilitySync::new(ValidationPolicy::Reject);
        sync.update(snapshot(), 1, 2).unwrap();
        let bad = vec![A11yNode::new(1, A11yRole::Window).with_children(vec![1])];
        assert!(sync.update(bad, 1, 1).is_err());
        assert_eq!(sync.tree().unwrap().len(), 3);
        assert_eq!(sync.generation(), 1);
    }

    #[test]
    fn test_callback_last_registration_wins() {
        let sync = AccessibilitySync::default();
        sync.update(snapshot(), 1, 1).unwrap();
        let hits = Rc::new(RefCell::new(Vec::new()));
        let first = hits.clone();
        sync.set_action_callback(Some(Rc::new(move |id, _| first.borrow_mut().push(("a", id)))));
        let second = hits.clone();
        sync.set_action_callback(Some(Rc::new(move |id, _| second.borrow_mut().push(("b", id)))));

        assert!(sync.perform_action(2, A11yAction::Click));
        assert!(!sync.perform_action(42, A11yAction::Click));
        assert_eq!(*hits.borrow(), vec![("b", 2)]);
    }

    #[test]
    fn test_focus_and_blur_move_stored_focus() {
        let sync = AccessibilitySync::default();
        sync.update(snapshot(), 1, 1).unwrap();
        sync.perform_action(3, A11yAction::Focus);
        assert_eq!(sync.focus(), Some(3));
        sync.perform_action(2, A11yAction::Blur);
        assert_eq!(sync.focus(), Some(3));
        sync.perform_action(3, A11yAction::Blur);
        assert_eq!(sync.focus(), Some(1));
    }

    #[test]
    fn test_accesskit_requests_are_routed() {
        let sync = AccessibilitySync::default();
        sync.update(snapshot(), 1, 1).unwrap();
        let got = Rc::new(Cell::new(None));
        let g = got.clone();
        sync.set_action_callback(Some(Rc::new(move |id, action| g.set(Some((id, action))))));

        let mut handler = &sync;
        handler.do_action(ActionRequest {
            action: accesskit::Action::Click,
            target: NodeId(2),
            data: None,
        });
        assert_eq!(got.get(), Some((2, A11yAction::Click)));

        let initial = handler.request_initial_tree().unwrap();
        assert_eq!(initial.nodes.len(), 3);
    }
}
