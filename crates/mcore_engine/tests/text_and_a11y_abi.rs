//! Text input and accessibility through the C entry points.

use std::cell::RefCell;
use std::ffi::c_void;

use mcore_engine::ffi::*;

fn create() -> *mut McoreContext {
    create_with_config("")
}

fn create_with_config(config: &str) -> *mut McoreContext {
    let desc = McoreSurfaceDesc {
        platform: MCORE_PLATFORM_HEADLESS,
        u: McoreSurfaceUnion {
            wayland: McoreWaylandSurface {
                display: std::ptr::null_mut(),
                surface: std::ptr::null_mut(),
            },
        },
        scale_factor: 1.0,
        width_px: 320,
        height_px: 240,
    };
    let ctx = unsafe { mcore_create_with_config(&desc, config.as_ptr(), config.len()) };
    assert!(!ctx.is_null());
    ctx
}

fn event(kind: u32) -> McoreTextEvent {
    McoreTextEvent {
        kind,
        codepoint: 0,
        direction: 0,
        extend: 0,
        position: 0,
        utf8: std::ptr::null(),
        len: 0,
    }
}

fn insert_text(s: &str) -> McoreTextEvent {
    McoreTextEvent {
        utf8: s.as_ptr(),
        len: s.len(),
        ..event(MCORE_EVENT_INSERT_TEXT)
    }
}

fn text_of(ctx: *mut McoreContext, id: u64) -> String {
    let mut buf = [0u8; 64];
    let len = unsafe { mcore_text_input_get_text(ctx, id, buf.as_mut_ptr(), buf.len()) };
    String::from_utf8(buf[..len].to_vec()).unwrap()
}

#[test]
fn editing_through_events() {
    let ctx = create();
    unsafe {
        assert_eq!(mcore_text_input_event(ctx, 1, &insert_text("héllo")), 1);
        let bang = McoreTextEvent {
            codepoint: '!' as u32,
            ..event(MCORE_EVENT_INSERT_CHAR)
        };
        assert_eq!(mcore_text_input_event(ctx, 1, &bang), 1);
        assert_eq!(text_of(ctx, 1), "héllo!");
        assert_eq!(mcore_text_input_get_cursor(ctx, 1), 7);

        // Surrogates are not scalar values
        let surrogate = McoreTextEvent {
            codepoint: 0xD800,
            ..event(MCORE_EVENT_INSERT_CHAR)
        };
        assert_eq!(mcore_text_input_event(ctx, 1, &surrogate), 0);

        let to_e = McoreTextEvent {
            position: 2,
            ..event(MCORE_EVENT_SET_CURSOR)
        };
        mcore_text_input_event(ctx, 1, &to_e);
        // Byte 2 is inside 'é', so the cursor snaps back to 1
        assert_eq!(mcore_text_input_get_cursor(ctx, 1), 1);

        let select_right = McoreTextEvent {
            direction: MCORE_DIRECTION_RIGHT,
            extend: 1,
            ..event(MCORE_EVENT_MOVE_CURSOR)
        };
        mcore_text_input_event(ctx, 1, &select_right);
        let (mut start, mut end) = (0, 0);
        assert_eq!(mcore_text_input_get_selection(ctx, 1, &mut start, &mut end), 1);
        assert_eq!((start, end), (1, 3));

        let mut small = [0u8; 1];
        let len = mcore_text_input_get_selected_text(ctx, 1, small.as_mut_ptr(), small.len());
        assert_eq!(len, 2, "length is reported even when the buffer is too small");
        assert_eq!(small, [0]);

        assert_eq!(mcore_text_input_event(ctx, 1, &event(MCORE_EVENT_BACKSPACE)), 1);
        assert_eq!(text_of(ctx, 1), "hllo!");
        assert_eq!(mcore_text_input_get_selection(ctx, 1, &mut start, &mut end), 0);

        assert_eq!(mcore_text_input_event(ctx, 1, &event(42)), -1);
        assert_eq!(mcore_text_input_event(ctx, 1, std::ptr::null()), -1);
        mcore_destroy(ctx);
    }
}

#[test]
fn selection_and_preedit() {
    let ctx = create();
    unsafe {
        let text = "hello world";
        assert_eq!(
            mcore_text_input_set_text(ctx, 5, text.as_ptr(), text.len()),
            McoreStatus::Ok
        );
        mcore_text_input_set_cursor(ctx, 5, 0, 0);
        mcore_text_input_set_cursor(ctx, 5, 5, 1);
        let mut buf = [0u8; 16];
        let len = mcore_text_input_get_selected_text(ctx, 5, buf.as_mut_ptr(), buf.len());
        assert_eq!(&buf[..len], b"hello");

        mcore_text_input_clear_selection(ctx, 5);
        mcore_text_input_select_all(ctx, 5);
        let (mut start, mut end) = (0, 0);
        mcore_text_input_get_selection(ctx, 5, &mut start, &mut end);
        assert_eq!((start, end), (0, 11));

        mcore_text_input_set_cursor(ctx, 5, 11, 0);
        let kana = "かな";
        assert_eq!(
            mcore_text_input_set_preedit(ctx, 5, kana.as_ptr(), kana.len(), 3),
            McoreStatus::Ok
        );
        let mut cursor = 0;
        let len = mcore_text_input_get_preedit(ctx, 5, buf.as_mut_ptr(), buf.len(), &mut cursor);
        assert_eq!(std::str::from_utf8(&buf[..len]).unwrap(), kana);
        assert_eq!(cursor, 3);
        // Preedit is not part of the committed text
        assert_eq!(text_of(ctx, 5), "hello world");

        let committed = "仮名";
        assert_eq!(
            mcore_text_input_commit(ctx, 5, committed.as_ptr(), committed.len()),
            1
        );
        assert_eq!(text_of(ctx, 5), "hello world仮名");
        assert_eq!(
            mcore_text_input_get_preedit(ctx, 5, buf.as_mut_ptr(), buf.len(), &mut cursor),
            0
        );

        let invalid = [0xffu8, 0xfe];
        assert_eq!(
            mcore_text_input_set_text(ctx, 5, invalid.as_ptr(), invalid.len()),
            McoreStatus::Err
        );
        assert_eq!(text_of(ctx, 5), "hello world仮名");
        mcore_destroy(ctx);
    }
}

#[test]
fn states_are_disposed_and_retained() {
    let ctx = create();
    unsafe {
        for id in [1, 2, 3, 4] {
            mcore_text_input_event(ctx, id, &insert_text("x"));
        }
        assert_eq!(mcore_text_input_count(ctx), 4);
        assert_eq!(mcore_text_input_dispose(ctx, 2), 1);
        assert_eq!(mcore_text_input_dispose(ctx, 2), 0);
        let live = [1u64, 4];
        assert_eq!(mcore_text_input_retain(ctx, live.as_ptr(), live.len()), 1);
        assert_eq!(mcore_text_input_count(ctx), 2);
        mcore_destroy(ctx);
    }
}

#[test]
fn lru_bound_from_configuration() {
    let ctx = create_with_config("[input]\nmax_states = 2\n");
    unsafe {
        for id in [1, 2, 3] {
            mcore_text_input_event(ctx, id, &insert_text("x"));
        }
        assert_eq!(mcore_text_input_count(ctx), 2);
        // The least recently used state was evicted and comes back empty
        assert_eq!(text_of(ctx, 1), "");
        mcore_destroy(ctx);
    }
}

#[test]
fn color_entry_points() {
    let mut out = McoreRgba::default();
    let css = "#ff000080";
    assert_eq!(unsafe { mcore_color_parse(css.as_ptr(), css.len(), &mut out) }, 1);
    assert_eq!(out.r, 1.0);
    assert!((out.a - 128.0 / 255.0).abs() < 1e-6);

    let junk = "not-a-color";
    assert_eq!(unsafe { mcore_color_parse(junk.as_ptr(), junk.len(), &mut out) }, 0);

    let black = McoreRgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    let white = McoreRgba {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    let start = mcore_color_lerp(black, white, 0.0);
    assert!(start.r.abs() < 1e-6 && start.a == 1.0);
    let mid = mcore_color_lerp(black, white, 0.5);
    assert!(mid.r > 0.0 && mid.r < 1.0);
    assert!((mid.r - mid.g).abs() < 1e-4);
}

struct A11yHost {
    ctx: *mut McoreContext,
    actions: Vec<(u64, u32)>,
}

fn node(id: u64, role: u32, label: &'static str, children: &'static [u64]) -> McoreA11yNode {
    McoreA11yNode {
        id,
        role,
        label: label.as_ptr(),
        label_len: label.len(),
        bounds: McoreRect {
            x: 0.0,
            y: 0.0,
            w: 10.0,
            h: 10.0,
        },
        actions: 1 << 1,
        children: children.as_ptr(),
        child_count: children.len(),
        has_value: 0,
        value: std::ptr::null(),
        value_len: 0,
        has_selection: 0,
        selection_anchor: 0,
        selection_focus: 0,
    }
}

unsafe extern "C" fn on_action(user_data: *mut c_void, node_id: u64, action: u32) {
    let host = &*(user_data as *const RefCell<A11yHost>);
    let ctx = {
        let mut host = host.borrow_mut();
        host.actions.push((node_id, action));
        host.ctx
    };
    // Rebuild the UI from inside the callback
    let nodes = [
        node(1, 1, "Window", &[2]),
        node(2, 3, "Saved", &[]),
    ];
    assert_eq!(
        mcore_a11y_update(ctx, nodes.as_ptr(), nodes.len(), 1, 2),
        McoreStatus::Ok
    );
}

#[test]
fn action_callback_may_update_the_tree() {
    let ctx = create();
    let host = RefCell::new(A11yHost {
        ctx,
        actions: Vec::new(),
    });
    unsafe {
        let nodes = [
            node(1, 1, "Window", &[2, 3]),
            node(2, 3, "Save", &[]),
            node(3, 5, "Status", &[]),
        ];
        assert_eq!(
            mcore_a11y_update(ctx, nodes.as_ptr(), nodes.len(), 1, 1),
            McoreStatus::Ok
        );
        mcore_a11y_set_action_callback(
            ctx,
            Some(on_action),
            &host as *const RefCell<A11yHost> as *mut c_void,
        );

        assert_eq!(mcore_a11y_perform_action(ctx, 2, 1), 1);
        assert_eq!(host.borrow().actions, vec![(2, 1)]);

        let sync = (*ctx).render_context().accessibility();
        let tree = sync.tree().unwrap();
        assert_eq!(tree.get(2).unwrap().label, "Saved");
        assert!(!tree.contains(3));
        assert_eq!(tree.focus(), 2);

        // Unknown action codes and nodes are ignored
        assert_eq!(mcore_a11y_perform_action(ctx, 2, 42), 0);
        assert_eq!(mcore_a11y_perform_action(ctx, 99, 0), 0);
        assert_eq!(host.borrow().actions.len(), 1);

        mcore_a11y_set_action_callback(ctx, None, std::ptr::null_mut());
        assert_eq!(mcore_a11y_perform_action(ctx, 2, 1), 1);
        assert_eq!(host.borrow().actions.len(), 1);
        mcore_destroy(ctx);
    }
}

#[test]
fn malformed_trees_follow_validation_mode() {
    let dangling = [node(1, 1, "Window", &[2, 7]), node(2, 3, "Ok", &[])];
    let missing_root = [node(2, 3, "Ok", &[])];

    let ctx = create();
    unsafe {
        assert_eq!(
            mcore_a11y_update(ctx, dangling.as_ptr(), dangling.len(), 1, 1),
            McoreStatus::Ok
        );
        let tree = (*ctx).render_context().accessibility().tree().unwrap();
        assert_eq!(tree.get(1).unwrap().children, vec![2]);

        assert_eq!(
            mcore_a11y_update(ctx, missing_root.as_ptr(), missing_root.len(), 1, 1),
            McoreStatus::Err
        );
        // The previous tree stays published
        assert!((*ctx).render_context().accessibility().tree().unwrap().contains(2));
        mcore_destroy(ctx);
    }

    let ctx = create_with_config("[accessibility]\nvalidation = \"reject\"\n");
    unsafe {
        assert_eq!(
            mcore_a11y_update(ctx, dangling.as_ptr(), dangling.len(), 1, 1),
            McoreStatus::Err
        );
        assert!((*ctx).render_context().accessibility().tree().is_none());
        mcore_destroy(ctx);
    }
}
