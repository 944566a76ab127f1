//! Accessibility entry points

use std::ffi::c_void;
use std::rc::Rc;

use mcore_a11y::{A11yAction, A11yNode, A11yRole, ActionCallback, ActionSet};

use crate::error::Result;

use super::types::{McoreA11yActionCallback, McoreA11yNode, McoreStatus};
use super::{context, guard, slice_arg, status, str_arg, McoreContext};

unsafe fn to_node(node: &McoreA11yNode) -> Result<A11yNode> {
    let value = if node.has_value != 0 {
        Some(str_arg(node.value, node.value_len)?.to_owned())
    } else {
        None
    };
    Ok(A11yNode {
        id: node.id,
        role: A11yRole::from_code(node.role),
        label: str_arg(node.label, node.label_len)?.to_owned(),
        bounds: node.bounds.into(),
        actions: ActionSet::from_bits(node.actions),
        children: slice_arg(node.children, node.child_count)?.to_vec(),
        value,
        text_selection: (node.has_selection != 0)
            .then_some((node.selection_anchor, node.selection_focus)),
    })
}

/// Replace the accessibility tree with a full snapshot.
///
/// Structural problems are repaired or rejected according to the configured
/// validation mode; a missing root always fails and keeps the previous tree.
///
/// # Safety
///
/// `ctx` must be a live context; `nodes` must be valid for `count` elements
/// whose string and child spans are readable.
#[no_mangle]
pub unsafe extern "C" fn mcore_a11y_update(
    ctx: *mut McoreContext,
    nodes: *const McoreA11yNode,
    count: usize,
    root: u64,
    focus: u64,
) -> McoreStatus {
    status("mcore_a11y_update", || {
        let ctx = context(ctx)?;
        let nodes = slice_arg(nodes, count)?
            .iter()
            .map(|node| to_node(node))
            .collect::<Result<Vec<_>>>()?;
        ctx.a11y_update(nodes, root, focus).map(|_| ())
    })
}

/// Register the action callback, replacing any previous one. A null
/// callback clears it.
///
/// The callback runs on the thread that delivered the action, after the
/// engine has released its own state, so it may call back into the context.
///
/// # Safety
///
/// `ctx` must be a live context; `callback` must stay safe to call with
/// `user_data` until it is replaced or the context is destroyed.
#[no_mangle]
pub unsafe extern "C" fn mcore_a11y_set_action_callback(
    ctx: *mut McoreContext,
    callback: McoreA11yActionCallback,
    user_data: *mut c_void,
) {
    guard("mcore_a11y_set_action_callback", (), || {
        let ctx = context(ctx)?;
        let callback = callback.map(|callback| -> ActionCallback {
            Rc::new(move |node: u64, action: A11yAction| {
                // SAFETY: upheld by the caller of `mcore_a11y_set_action_callback`
                unsafe { callback(user_data, node, action.code()) }
            })
        });
        ctx.set_a11y_action_callback(callback);
        Ok(())
    });
}

/// Perform an action as if requested by the platform. Returns 1 if the
/// node exists and the callback was invoked. Unknown action codes are
/// ignored.
///
/// # Safety
///
/// `ctx` must be a live context.
#[no_mangle]
pub unsafe extern "C" fn mcore_a11y_perform_action(
    ctx: *mut McoreContext,
    node_id: u64,
    action: u32,
) -> i32 {
    guard("mcore_a11y_perform_action", 0, || {
        let ctx = context(ctx)?;
        let Some(action) = A11yAction::from_code(action) else {
            tracing::debug!("ignoring unknown accessibility action {action}");
            return Ok(0);
        };
        Ok(i32::from(ctx.a11y_perform_action(node_id, action)))
    })
}
