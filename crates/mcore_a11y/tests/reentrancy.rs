//! Host callbacks that call back into the synchronizer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use mcore_a11y::{
    A11yAction, A11yError, A11yNode, A11yRole, AccessibilitySync, PublishedTree, ValidationPolicy,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("mcore_a11y=debug")
        .with_test_writer()
        .try_init();
}

fn form(extra_label: &str) -> Vec<A11yNode> {
    vec![
        A11yNode::new(1, A11yRole::Window).with_children(vec![2, 3]),
        A11yNode::new(2, A11yRole::Button)
            .with_label(extra_label)
            .with_action(A11yAction::Click),
        A11yNode::new(3, A11yRole::TextInput)
            .with_value("")
            .with_action(A11yAction::Focus),
    ]
}

#[test]
fn nested_update_from_action_callback() {
    init_tracing();
    let sync = Rc::new(AccessibilitySync::default());
    let published = Rc::new(RefCell::new(Vec::<String>::new()));
    let log = published.clone();
    sync.set_host(move |tree: &PublishedTree| {
        let label = tree.get(2).map(|n| n.label.clone()).unwrap_or_default();
        log.borrow_mut().push(label);
    });
    sync.update(form("Save"), 1, 1).unwrap();

    // A click rebuilds the UI and pushes a new snapshot from inside the callback
    let weak = Rc::downgrade(&sync);
    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    sync.set_action_callback(Some(Rc::new(move |id, action| {
        assert_eq!((id, action), (2, A11yAction::Click));
        counter.set(counter.get() + 1);
        if let Some(sync) = weak.upgrade() {
            sync.update(form("Saved"), 1, 2).unwrap();
        }
    })));

    assert!(sync.perform_action(2, A11yAction::Click));
    assert_eq!(clicks.get(), 1);
    assert_eq!(sync.tree().unwrap().get(2).unwrap().label, "Saved");
    assert_eq!(sync.focus(), Some(2));
    assert_eq!(published.borrow().last().map(String::as_str), Some("Saved"));
}

#[test]
fn nested_update_from_host_publish_is_republished() {
    let sync = Rc::new(AccessibilitySync::default());
    let weak = Rc::downgrade(&sync);
    let seen = Rc::new(RefCell::new(Vec::<u64>::new()));
    let log = seen.clone();
    sync.set_host(move |tree: &PublishedTree| {
        log.borrow_mut().push(tree.focus());
        // The first publish triggers a follow-up snapshot
        if tree.focus() == 1 {
            if let Some(sync) = weak.upgrade() {
                sync.update(form("Save"), 1, 3).unwrap();
            }
        }
    });

    sync.update(form("Save"), 1, 1).unwrap();
    assert_eq!(*seen.borrow(), vec![1, 3]);
    assert_eq!(sync.generation(), 2);
}

#[test]
fn self_reference_and_missing_child_policy() {
    init_tracing();
    let broken = || {
        vec![
            A11yNode::new(1, A11yRole::Window).with_children(vec![1, 2, 9]),
            A11yNode::new(2, A11yRole::Label).with_label("hello"),
        ]
    };

    let sync = AccessibilitySync::default();
    let outcome = sync.update(broken(), 1, 2).unwrap();
    assert_eq!(outcome.nodes, 2);
    assert_eq!(outcome.repairs.self_references, 1);
    assert_eq!(outcome.repairs.dangling_children, 1);
    assert_eq!(sync.tree().unwrap().get(1).unwrap().children, vec![2]);

    let strict = AccessibilitySync::new(ValidationPolicy::Reject);
    assert_eq!(strict.update(broken(), 1, 2), Err(A11yError::SelfReference(1)));
    assert!(strict.tree().is_none());
}
