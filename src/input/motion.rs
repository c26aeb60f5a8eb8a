use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::Vector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MotionKey {
    PanUp,
    PanDown,
    PanLeft,
    PanRight,
    RotateClockwise,
    RotateCounterClockwise,
}

impl MotionKey {
    pub const ALL: [Self; 6] = [
        Self::PanUp,
        Self::PanDown,
        Self::PanLeft,
        Self::PanRight,
        Self::RotateClockwise,
        Self::RotateCounterClockwise,
    ];

    /// Unit displacement of the content origin for a pan key.
    ///
    /// Panning up brings content above the view into sight, so the content
    /// itself moves down the screen.
    pub const fn pan_direction(self) -> Option<Vector> {
        match self {
            Self::PanUp => Some(Vector::new(0.0, 1.0)),
            Self::PanDown => Some(Vector::new(0.0, -1.0)),
            Self::PanLeft => Some(Vector::new(1.0, 0.0)),
            Self::PanRight => Some(Vector::new(-1.0, 0.0)),
            Self::RotateClockwise | Self::RotateCounterClockwise => None,
        }
    }

    /// `+1` for clockwise, `-1` for counter-clockwise.
    pub const fn rotation_sign(self) -> Option<f64> {
        match self {
            Self::RotateClockwise => Some(1.0),
            Self::RotateCounterClockwise => Some(-1.0),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::PanUp => "pan-up",
            Self::PanDown => "pan-down",
            Self::PanLeft => "pan-left",
            Self::PanRight => "pan-right",
            Self::RotateClockwise => "rotate-clockwise",
            Self::RotateCounterClockwise => "rotate-counter-clockwise",
        }
    }
}

/// Motion keys currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputMotionState {
    held: BTreeSet<MotionKey>,
}

impl InputMotionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: MotionKey) -> bool {
        self.held.insert(key)
    }

    pub fn release(&mut self, key: MotionKey) -> bool {
        self.held.remove(&key)
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }

    pub fn contains(&self, key: MotionKey) -> bool {
        self.held.contains(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = MotionKey> + '_ {
        self.held.iter().copied()
    }

    /// Sum of the unit vectors of every held pan key.
    pub fn pan_direction(&self) -> Vector {
        let mut direction = Vector::ZERO;
        for key in self.keys() {
            if let Some(unit) = key.pan_direction() {
                direction += unit;
            }
        }
        direction
    }

    /// Net rotation sign; opposing keys cancel out.
    pub fn rotation_sign(&self) -> f64 {
        self.keys().filter_map(MotionKey::rotation_sign).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
    Other(u32),
}

impl PointerButton {
    /// Maps a 1-based platform button number (1 = primary).
    pub const fn from_number(button: u32) -> Self {
        match button {
            1 => Self::Primary,
            2 => Self::Middle,
            3 => Self::Secondary,
            other => Self::Other(other),
        }
    }
}
