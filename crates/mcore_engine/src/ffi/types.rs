//! Fixed-layout boundary types, mirrored in `include/mcore.h`

use std::ffi::{c_ulong, c_void};
use std::num::NonZeroIsize;
use std::ptr::NonNull;

use mcore_paint::{Border, Color, DrawCommand, Point, Rect, RoundedRect, Shadow, TextRun};

use crate::error::{EngineError, Result};
use crate::surface::{SurfaceDesc, SurfaceHandle};

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McoreStatus {
    Ok = 0,
    Err = 1,
}

pub const MCORE_PLATFORM_HEADLESS: u32 = 0;
pub const MCORE_PLATFORM_MACOS: u32 = 1;
pub const MCORE_PLATFORM_WINDOWS: u32 = 2;
pub const MCORE_PLATFORM_X11: u32 = 3;
pub const MCORE_PLATFORM_WAYLAND: u32 = 4;

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreMacSurface {
    /// NSView*
    pub ns_view: *mut c_void,
    /// CAMetalLayer*, may be null
    pub ca_metal_layer: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreWin32Surface {
    pub hwnd: *mut c_void,
    /// May be null
    pub hinstance: *mut c_void,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreX11Surface {
    /// Display*, may be null
    pub display: *mut c_void,
    pub window: c_ulong,
    pub screen: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreWaylandSurface {
    /// wl_display*
    pub display: *mut c_void,
    /// wl_surface*
    pub surface: *mut c_void,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub union McoreSurfaceUnion {
    pub macos: McoreMacSurface,
    pub windows: McoreWin32Surface,
    pub x11: McoreX11Surface,
    pub wayland: McoreWaylandSurface,
}

#[repr(C)]
#[derive(Clone, Copy)]
pub struct McoreSurfaceDesc {
    /// One of the `MCORE_PLATFORM_*` tags
    pub platform: u32,
    pub u: McoreSurfaceUnion,
    pub scale_factor: f32,
    pub width_px: i32,
    pub height_px: i32,
}

fn required(ptr: *mut c_void, what: &str) -> Result<NonNull<c_void>> {
    NonNull::new(ptr).ok_or_else(|| EngineError::InvalidSurface(format!("null {what}")))
}

impl McoreSurfaceDesc {
    /// Read the union member selected by `platform`.
    pub fn to_surface(&self) -> Result<SurfaceDesc> {
        // SAFETY: the tag selects the member the host initialized
        let handle = unsafe {
            match self.platform {
                MCORE_PLATFORM_HEADLESS => SurfaceHandle::Headless,
                MCORE_PLATFORM_MACOS => SurfaceHandle::MacOS {
                    ns_view: required(self.u.macos.ns_view, "NSView")?,
                    metal_layer: NonNull::new(self.u.macos.ca_metal_layer),
                },
                MCORE_PLATFORM_WINDOWS => SurfaceHandle::Windows {
                    hwnd: NonZeroIsize::new(self.u.windows.hwnd as isize)
                        .ok_or_else(|| EngineError::InvalidSurface("null HWND".into()))?,
                    hinstance: NonZeroIsize::new(self.u.windows.hinstance as isize),
                },
                MCORE_PLATFORM_X11 => {
                    if self.u.x11.window == 0 {
                        return Err(EngineError::InvalidSurface("null X11 window".into()));
                    }
                    SurfaceHandle::X11 {
                        display: NonNull::new(self.u.x11.display),
                        window: self.u.x11.window,
                        screen: self.u.x11.screen,
                    }
                }
                MCORE_PLATFORM_WAYLAND => SurfaceHandle::Wayland {
                    display: required(self.u.wayland.display, "wl_display")?,
                    surface: required(self.u.wayland.surface, "wl_surface")?,
                },
                other => {
                    return Err(EngineError::InvalidSurface(format!("unknown platform {other}")))
                }
            }
        };
        Ok(SurfaceDesc::new(
            handle,
            self.width_px.max(0) as u32,
            self.height_px.max(0) as u32,
            self.scale_factor,
        ))
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl From<McoreRgba> for Color {
    fn from(c: McoreRgba) -> Self {
        Color::new(c.r, c.g, c.b, c.a)
    }
}

impl From<Color> for McoreRgba {
    fn from(c: Color) -> Self {
        McoreRgba {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl From<McoreRect> for Rect {
    fn from(r: McoreRect) -> Self {
        Rect::new(r.x, r.y, r.w, r.h)
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreRoundedRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub radius: f32,
    pub fill: McoreRgba,
}

impl McoreRoundedRect {
    pub fn to_command(&self) -> DrawCommand {
        DrawCommand::RoundedRect {
            rect: RoundedRect::new(Rect::new(self.x, self.y, self.w, self.h), self.radius),
            fill: self.fill.into(),
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreBorder {
    pub width: f32,
    pub color: McoreRgba,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur: f32,
    pub color: McoreRgba,
}

/// Rounded rect with an optional border and an optional drop shadow
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreStyledRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub radius: f32,
    pub fill: McoreRgba,
    /// Non-zero when `border` is set
    pub has_border: u32,
    pub border: McoreBorder,
    /// Non-zero when `shadow` is set
    pub has_shadow: u32,
    pub shadow: McoreShadow,
}

impl McoreStyledRect {
    pub fn to_command(&self) -> DrawCommand {
        let border = (self.has_border != 0)
            .then(|| Border::new(self.border.width, self.border.color.into()));
        let shadow = (self.has_shadow != 0).then(|| {
            Shadow::new(
                self.shadow.offset_x,
                self.shadow.offset_y,
                self.shadow.blur,
                self.shadow.color.into(),
            )
        });
        DrawCommand::StyledRect {
            rect: RoundedRect::new(Rect::new(self.x, self.y, self.w, self.h), self.radius),
            fill: self.fill.into(),
            border,
            shadow,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreFontBlob {
    pub data: *const u8,
    pub len: usize,
    /// Optional registration name, may be null
    pub name: *const u8,
    pub name_len: usize,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreTextReq {
    pub utf8: *const u8,
    pub len: usize,
    /// `<= 0` disables wrapping
    pub wrap_width: f32,
    /// `<= 0` uses the configured default size
    pub font_size_px: f32,
    pub font_id: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreTextMetrics {
    pub advance_w: f32,
    pub advance_h: f32,
    pub line_count: i32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct McoreSize {
    pub w: f32,
    pub h: f32,
}

/// A text run drawn with its top-left at `(x, y)`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreTextDraw {
    pub utf8: *const u8,
    pub len: usize,
    pub x: f32,
    pub y: f32,
    pub font_size_px: f32,
    /// `<= 0` disables wrapping
    pub wrap_width: f32,
    pub font_id: i32,
    pub color: McoreRgba,
}

impl McoreTextDraw {
    /// # Safety
    ///
    /// `utf8` must be valid for reads of `len` bytes.
    pub(crate) unsafe fn to_run(&self, default_size: f32) -> Result<TextRun> {
        let text = super::str_arg(self.utf8, self.len)?;
        let font_size = if self.font_size_px > 0.0 {
            self.font_size_px
        } else {
            default_size
        };
        Ok(TextRun {
            text: text.to_owned(),
            origin: Point::new(self.x, self.y),
            // Negative ids never match a registered font
            font_id: u32::try_from(self.font_id).unwrap_or(u32::MAX),
            font_size,
            wrap_width: (self.wrap_width > 0.0).then_some(self.wrap_width),
            color: self.color.into(),
        })
    }
}

pub const MCORE_CMD_ROUNDED_RECT: u32 = 0;
pub const MCORE_CMD_STYLED_RECT: u32 = 1;
pub const MCORE_CMD_TEXT: u32 = 2;
pub const MCORE_CMD_PUSH_CLIP: u32 = 3;
pub const MCORE_CMD_POP_CLIP: u32 = 4;

#[repr(C)]
#[derive(Clone, Copy)]
pub union McoreDrawCmdData {
    pub rounded_rect: McoreRoundedRect,
    pub styled_rect: McoreStyledRect,
    pub text: McoreTextDraw,
    pub clip: McoreRect,
}

/// Tagged draw command for bulk submission
#[repr(C)]
#[derive(Clone, Copy)]
pub struct McoreDrawCmd {
    /// One of the `MCORE_CMD_*` tags
    pub kind: u32,
    pub data: McoreDrawCmdData,
}

impl McoreDrawCmd {
    /// # Safety
    ///
    /// The member selected by `kind` must be initialized, and a text
    /// member's string must be readable.
    pub(crate) unsafe fn to_command(&self, default_size: f32) -> Result<DrawCommand> {
        Ok(match self.kind {
            MCORE_CMD_ROUNDED_RECT => self.data.rounded_rect.to_command(),
            MCORE_CMD_STYLED_RECT => self.data.styled_rect.to_command(),
            MCORE_CMD_TEXT => DrawCommand::Text(self.data.text.to_run(default_size)?),
            MCORE_CMD_PUSH_CLIP => DrawCommand::PushClip {
                rect: self.data.clip.into(),
            },
            MCORE_CMD_POP_CLIP => DrawCommand::PopClip,
            other => {
                return Err(EngineError::InvalidArgument(format!(
                    "unknown draw command kind {other}"
                )))
            }
        })
    }
}

pub const MCORE_EVENT_INSERT_CHAR: u32 = 0;
pub const MCORE_EVENT_BACKSPACE: u32 = 1;
pub const MCORE_EVENT_DELETE: u32 = 2;
pub const MCORE_EVENT_MOVE_CURSOR: u32 = 3;
pub const MCORE_EVENT_SET_CURSOR: u32 = 4;
pub const MCORE_EVENT_INSERT_TEXT: u32 = 5;

pub const MCORE_DIRECTION_LEFT: u32 = 0;
pub const MCORE_DIRECTION_RIGHT: u32 = 1;
pub const MCORE_DIRECTION_HOME: u32 = 2;
pub const MCORE_DIRECTION_END: u32 = 3;

/// A text editing event. Fields not used by `kind` are ignored.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreTextEvent {
    pub kind: u32,
    /// INSERT_CHAR: Unicode scalar value
    pub codepoint: u32,
    /// MOVE_CURSOR: one of `MCORE_DIRECTION_*`
    pub direction: u32,
    /// MOVE_CURSOR: non-zero extends the selection
    pub extend: u32,
    /// SET_CURSOR: byte offset
    pub position: usize,
    /// INSERT_TEXT
    pub utf8: *const u8,
    pub len: usize,
}

/// One accessibility node; strings and children are borrowed for the call
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct McoreA11yNode {
    pub id: u64,
    /// Role code, see `mcore_a11y_role_t`
    pub role: u32,
    pub label: *const u8,
    pub label_len: usize,
    pub bounds: McoreRect,
    /// Bit `n` set for action code `n`
    pub actions: u32,
    pub children: *const u64,
    pub child_count: usize,
    pub has_value: u32,
    pub value: *const u8,
    pub value_len: usize,
    pub has_selection: u32,
    pub selection_anchor: usize,
    pub selection_focus: usize,
}

/// Host callback for accessibility actions
pub type McoreA11yActionCallback =
    Option<unsafe extern "C" fn(user_data: *mut c_void, node_id: u64, action: u32)>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_union_requires_handles() {
        let desc = McoreSurfaceDesc {
            platform: MCORE_PLATFORM_WAYLAND,
            u: McoreSurfaceUnion {
                wayland: McoreWaylandSurface {
                    display: std::ptr::null_mut(),
                    surface: std::ptr::null_mut(),
                },
            },
            scale_factor: 1.0,
            width_px: 10,
            height_px: 10,
        };
        let err = desc.to_surface().unwrap_err();
        assert_eq!(err.to_string(), "invalid surface: null wl_display");

        let unknown = McoreSurfaceDesc { platform: 9, ..desc };
        assert!(unknown.to_surface().is_err());
    }

    #[test]
    fn test_styled_rect_presence_flags() {
        let styled = McoreStyledRect {
            w: 10.0,
            h: 10.0,
            has_shadow: 1,
            shadow: McoreShadow {
                blur: 4.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let DrawCommand::StyledRect { border, shadow, .. } = styled.to_command() else {
            panic!("expected styled rect");
        };
        assert!(border.is_none());
        assert_eq!(shadow.map(|s| s.blur_radius), Some(4.0));
    }

    #[test]
    fn test_negative_font_id_never_matches() {
        let draw = McoreTextDraw {
            utf8: b"hi".as_ptr(),
            len: 2,
            x: 0.0,
            y: 0.0,
            font_size_px: 0.0,
            wrap_width: -1.0,
            font_id: -1,
            color: McoreRgba::default(),
        };
        let run = unsafe { draw.to_run(14.0) }.unwrap();
        assert_eq!(run.font_id, u32::MAX);
        assert_eq!(run.font_size, 14.0);
        assert_eq!(run.wrap_width, None);
    }
}
