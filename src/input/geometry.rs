//! On-screen joystick widget geometry
//!
//! The joysticks never own their layout: they query it through
//! [`WidgetGeometry`] at the moments the gesture needs it (center on
//! pointer-down, radius on every move). [`LiveLayout`] is the hot-reloadable
//! implementation backed by the `layout` section of the config file.

use parking_lot::RwLock;
use std::sync::Arc;

use super::joystick::StickRole;
use super::vector::Point2;
use crate::config::{LayoutConfig, WidgetConfig};

/// Default knob radius subtracted from the widget half-width
pub const KNOB_INSET: f64 = 25.0;

/// Geometry query for one joystick widget
pub trait WidgetGeometry: Send + Sync {
    /// Current on-screen center of the widget
    fn center(&self) -> Point2;

    /// Half of the widget's rendered width
    fn half_width(&self) -> f64;

    /// Radius of the knob drawn inside the widget
    fn knob_inset(&self) -> f64 {
        KNOB_INSET
    }

    /// Maximum displacement magnitude representable by this widget.
    ///
    /// Never negative: a widget narrower than its knob has radius 0.
    fn radius(&self) -> f64 {
        let radius = self.half_width() - self.knob_inset();
        if radius.is_finite() {
            radius.max(0.0)
        } else {
            0.0
        }
    }
}

impl WidgetGeometry for WidgetConfig {
    fn center(&self) -> Point2 {
        self.center
    }

    fn half_width(&self) -> f64 {
        self.width / 2.0
    }
}

/// Shared, hot-reloadable layout for both widgets
#[derive(Clone)]
pub struct LiveLayout {
    inner: Arc<RwLock<LayoutConfig>>,
}

impl LiveLayout {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(layout)),
        }
    }

    /// Replace the layout; live joysticks see it on their next query
    pub fn update(&self, layout: LayoutConfig) {
        *self.inner.write() = layout;
    }

    /// Geometry handle for one widget
    pub fn widget(&self, role: StickRole) -> Arc<dyn WidgetGeometry> {
        Arc::new(LiveWidget {
            layout: self.clone(),
            role,
        })
    }
}

struct LiveWidget {
    layout: LiveLayout,
    role: StickRole,
}

impl LiveWidget {
    fn read<T>(&self, f: impl FnOnce(&WidgetConfig) -> T) -> T {
        let guard = self.layout.inner.read();
        match self.role {
            StickRole::Move => f(&guard.move_stick),
            StickRole::Aim => f(&guard.aim_stick),
        }
    }
}

impl WidgetGeometry for LiveWidget {
    fn center(&self) -> Point2 {
        self.read(|w| w.center)
    }

    fn half_width(&self) -> f64 {
        self.read(|w| w.width / 2.0)
    }

    fn knob_inset(&self) -> f64 {
        self.layout.inner.read().knob_inset
    }
}
