//! Host surface descriptions
//!
//! A surface is whatever native view the host renders into. The engine never
//! touches it; backends receive it as `raw-window-handle` handles.

use std::ffi::{c_ulong, c_void};
use std::num::NonZeroIsize;
use std::ptr::NonNull;

use raw_window_handle::{
    AppKitDisplayHandle, AppKitWindowHandle, RawDisplayHandle, RawWindowHandle,
    WaylandDisplayHandle, WaylandWindowHandle, Win32WindowHandle, WindowsDisplayHandle,
    XlibDisplayHandle, XlibWindowHandle,
};

use crate::error::{EngineError, Result};

/// Native handles for one surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceHandle {
    MacOS {
        ns_view: NonNull<c_void>,
        metal_layer: Option<NonNull<c_void>>,
    },
    Windows {
        hwnd: NonZeroIsize,
        hinstance: Option<NonZeroIsize>,
    },
    X11 {
        display: Option<NonNull<c_void>>,
        window: c_ulong,
        screen: i32,
    },
    Wayland {
        display: NonNull<c_void>,
        surface: NonNull<c_void>,
    },
    /// No native surface; the backend consumes the draw list itself
    Headless,
}

impl SurfaceHandle {
    pub fn platform_name(&self) -> &'static str {
        match self {
            SurfaceHandle::MacOS { .. } => "macos",
            SurfaceHandle::Windows { .. } => "windows",
            SurfaceHandle::X11 { .. } => "x11",
            SurfaceHandle::Wayland { .. } => "wayland",
            SurfaceHandle::Headless => "headless",
        }
    }
}

/// A surface plus its pixel size and DPI scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceDesc {
    pub handle: SurfaceHandle,
    pub scale_factor: f32,
    pub width_px: u32,
    pub height_px: u32,
}

impl SurfaceDesc {
    pub fn new(handle: SurfaceHandle, width_px: u32, height_px: u32, scale_factor: f32) -> Self {
        Self {
            handle,
            scale_factor,
            width_px,
            height_px,
        }
    }

    pub fn headless(width_px: u32, height_px: u32) -> Self {
        Self::new(SurfaceHandle::Headless, width_px, height_px, 1.0)
    }

    /// Size in logical points
    pub fn logical_size(&self) -> (f32, f32) {
        (
            self.width_px as f32 / self.scale_factor,
            self.height_px as f32 / self.scale_factor,
        )
    }

    /// Check a descriptor used to create a context.
    pub fn validate(&self) -> Result<()> {
        if self.width_px == 0 || self.height_px == 0 {
            return Err(EngineError::InvalidSurface(format!(
                "zero-sized surface {}x{}",
                self.width_px, self.height_px
            )));
        }
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            return Err(EngineError::InvalidSurface(format!(
                "scale factor {} must be positive",
                self.scale_factor
            )));
        }
        Ok(())
    }

    /// Descriptor for a resize: sizes clamp to one pixel, a bad scale keeps
    /// the previous one.
    pub fn clamped(mut self, previous_scale: f32) -> Self {
        self.width_px = self.width_px.max(1);
        self.height_px = self.height_px.max(1);
        if !(self.scale_factor.is_finite() && self.scale_factor > 0.0) {
            self.scale_factor = previous_scale;
        }
        self
    }

    pub fn raw_window_handle(&self) -> Option<RawWindowHandle> {
        Some(match self.handle {
            SurfaceHandle::MacOS { ns_view, .. } => {
                RawWindowHandle::AppKit(AppKitWindowHandle::new(ns_view))
            }
            SurfaceHandle::Windows { hwnd, hinstance } => {
                let mut handle = Win32WindowHandle::new(hwnd);
                handle.hinstance = hinstance;
                RawWindowHandle::Win32(handle)
            }
            SurfaceHandle::X11 { window, .. } => {
                RawWindowHandle::Xlib(XlibWindowHandle::new(window))
            }
            SurfaceHandle::Wayland { surface, .. } => {
                RawWindowHandle::Wayland(WaylandWindowHandle::new(surface))
            }
            SurfaceHandle::Headless => return None,
        })
    }

    pub fn raw_display_handle(&self) -> Option<RawDisplayHandle> {
        Some(match self.handle {
            SurfaceHandle::MacOS { .. } => RawDisplayHandle::AppKit(AppKitDisplayHandle::new()),
            SurfaceHandle::Windows { .. } => {
                RawDisplayHandle::Windows(WindowsDisplayHandle::new())
            }
            SurfaceHandle::X11 {
                display, screen, ..
            } => RawDisplayHandle::Xlib(XlibDisplayHandle::new(display, screen)),
            SurfaceHandle::Wayland { display, .. } => {
                RawDisplayHandle::Wayland(WaylandDisplayHandle::new(display))
            }
            SurfaceHandle::Headless => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_size_is_rejected_at_creation() {
        assert!(SurfaceDesc::headless(0, 10).validate().is_err());
        assert!(SurfaceDesc::headless(10, 10).validate().is_ok());
        let mut desc = SurfaceDesc::headless(10, 10);
        desc.scale_factor = 0.0;
        assert!(desc.validate().is_err());
    }

    #[test]
    fn test_resize_clamps() {
        let mut desc = SurfaceDesc::headless(0, 0);
        desc.scale_factor = f32::NAN;
        let clamped = desc.clamped(2.0);
        assert_eq!((clamped.width_px, clamped.height_px), (1, 1));
        assert_eq!(clamped.scale_factor, 2.0);
    }

    #[test]
    fn test_raw_handles() {
        let mut view = 0u8;
        let ns_view = NonNull::from(&mut view).cast::<c_void>();
        let desc = SurfaceDesc::new(
            SurfaceHandle::MacOS {
                ns_view,
                metal_layer: None,
            },
            800,
            600,
            2.0,
        );
        assert!(matches!(desc.raw_window_handle(), Some(RawWindowHandle::AppKit(_))));
        assert!(matches!(desc.raw_display_handle(), Some(RawDisplayHandle::AppKit(_))));
        assert_eq!(desc.logical_size(), (400.0, 300.0));

        let headless = SurfaceDesc::headless(1, 1);
        assert!(headless.raw_window_handle().is_none());
    }
}
