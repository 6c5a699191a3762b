//! Orbit-style camera controls constrained to the scene extent.
//!
//! The controller owns the camera pose and the input policy:
//! - free orbit (rotate, dolly, pan) while unlocked
//! - a top-down, pan-only view while locked
//! - camera and target clamped to the framing box after every move

use std::f64::consts::FRAC_PI_2;

use foundation::bounds::BoundingBox;
use foundation::math::Vec3;
use serde::Serialize;
use tracing::debug;

use super::framing::{self, CameraPose, FramingError, PerspectiveCamera};

/// Scene units moved per pan step.
pub const PAN_SPEED: f64 = 0.05;

/// Radians rotated per rotate key press.
pub const ROTATE_SPEED: f64 = 0.025;

/// Directly above the target.
pub const MIN_POLAR_ANGLE: f64 = 0.0;

/// On the horizon.
pub const MAX_POLAR_ANGLE: f64 = FRAC_PI_2;

/// Camera y stays this far inside the southern edge of the box.
pub const SOUTH_EDGE_INSET: f64 = 0.25;

/// Camera lock state. Transitions only through [`OrbitControls::set_locked`]
/// and [`OrbitControls::toggle_lock`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub enum CameraLock {
    #[default]
    Unlocked,
    Locked,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub enum MouseAction {
    Rotate,
    Dolly,
    Pan,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct MouseButtons {
    pub left: MouseAction,
    pub middle: MouseAction,
    pub right: MouseAction,
}

impl MouseButtons {
    /// Mapping before the lock has ever been touched.
    pub const ORBIT: Self = Self {
        left: MouseAction::Rotate,
        middle: MouseAction::Dolly,
        right: MouseAction::Pan,
    };

    pub const LOCKED: Self = Self {
        left: MouseAction::Pan,
        middle: MouseAction::Dolly,
        right: MouseAction::Pan,
    };

    pub const UNLOCKED: Self = Self {
        left: MouseAction::Pan,
        middle: MouseAction::Dolly,
        right: MouseAction::Rotate,
    };
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// Pan north.
    W,
    /// Pan west.
    A,
    /// Pan south.
    S,
    /// Pan east.
    D,
    /// Rotate clockwise.
    R,
    /// Rotate counter-clockwise.
    F,
}

impl Key {
    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'w' => Some(Key::W),
            'a' => Some(Key::A),
            's' => Some(Key::S),
            'd' => Some(Key::D),
            'r' => Some(Key::R),
            'f' => Some(Key::F),
            _ => None,
        }
    }
}

/// On-screen pan buttons.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PanButton {
    Up,
    Down,
    Left,
    Right,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrbitControls {
    pub pose: CameraPose,
    pub camera: PerspectiveCamera,
    pub enable_rotate: bool,
    pub enable_pan: bool,
    pub mouse_buttons: MouseButtons,
    lock: CameraLock,
    #[serde(skip)]
    bounds: Option<BoundingBox>,
}

impl OrbitControls {
    pub fn new(camera: PerspectiveCamera) -> Self {
        Self {
            pose: CameraPose {
                position: Vec3::new(0.0, 0.0, 20.0),
                target: Vec3::ZERO,
                up: Vec3::Z,
            },
            camera,
            enable_rotate: true,
            enable_pan: true,
            mouse_buttons: MouseButtons::ORBIT,
            lock: CameraLock::Unlocked,
            bounds: None,
        }
    }

    /// Adopt `bounds` as the framing and constraint box and move the camera
    /// to the fitted overhead position.
    pub fn frame(&mut self, bounds: BoundingBox) -> Result<(), FramingError> {
        let pose = framing::top_down_pose(&bounds, self.camera.fov_deg)?;
        self.bounds = Some(bounds);
        self.pose = CameraPose { up: Vec3::Z, ..pose };
        self.constrain();
        Ok(())
    }

    pub fn lock_state(&self) -> CameraLock {
        self.lock
    }

    pub fn bounds(&self) -> Option<&BoundingBox> {
        self.bounds.as_ref()
    }

    /// Enter or leave the top-down lock. Requesting the current state again
    /// changes nothing.
    pub fn set_locked(&mut self, locked: bool) -> Result<(), FramingError> {
        let next = if locked {
            CameraLock::Locked
        } else {
            CameraLock::Unlocked
        };
        if next == self.lock {
            return Ok(());
        }

        match next {
            CameraLock::Locked => {
                let bounds = self.bounds.ok_or(FramingError::NoExtent)?;
                self.pose = framing::top_down_pose(&bounds, self.camera.fov_deg)?;
                self.enable_rotate = false;
                self.enable_pan = true;
                self.mouse_buttons = MouseButtons::LOCKED;
            }
            CameraLock::Unlocked => {
                self.pose.up = Vec3::Z;
                self.enable_rotate = true;
                self.enable_pan = true;
                self.mouse_buttons = MouseButtons::UNLOCKED;
            }
        }
        self.lock = next;
        debug!(state = ?next, "camera lock changed");
        Ok(())
    }

    pub fn toggle_lock(&mut self) -> Result<CameraLock, FramingError> {
        self.set_locked(self.lock == CameraLock::Unlocked)?;
        Ok(self.lock)
    }

    /// Move camera and target together by `(dx, dy)` pan steps.
    pub fn pan(&mut self, dx: f64, dy: f64) -> bool {
        if !self.enable_pan {
            return false;
        }
        let delta = Vec3::new(dx * PAN_SPEED, dy * PAN_SPEED, 0.0);
        self.pose.position += delta;
        self.pose.target += delta;
        self.constrain();
        true
    }

    /// Rotate the camera about the world X axis through the target. Rejected
    /// while rotation is disabled or when the result leaves the polar range.
    pub fn rotate(&mut self, angle: f64) -> bool {
        if !self.enable_rotate {
            return false;
        }
        let offset = self.pose.position - self.pose.target;
        let (sin, cos) = angle.sin_cos();
        let rotated = Vec3::new(
            offset.x,
            offset.y * cos - offset.z * sin,
            offset.y * sin + offset.z * cos,
        );
        let polar = rotated.angle_to(Vec3::Z);
        if !(MIN_POLAR_ANGLE..=MAX_POLAR_ANGLE).contains(&polar) {
            return false;
        }
        self.pose.position = self.pose.target + rotated;
        self.constrain();
        true
    }

    pub fn handle_key(&mut self, key: Key) -> bool {
        match key {
            Key::W => self.pan(0.0, 1.0),
            Key::S => self.pan(0.0, -1.0),
            Key::A => self.pan(-1.0, 0.0),
            Key::D => self.pan(1.0, 0.0),
            Key::R => self.rotate(-ROTATE_SPEED),
            Key::F => self.rotate(ROTATE_SPEED),
        }
    }

    pub fn handle_pan_button(&mut self, button: PanButton) -> bool {
        match button {
            PanButton::Up => self.pan(0.0, 1.0),
            PanButton::Down => self.pan(0.0, -1.0),
            PanButton::Left => self.pan(-1.0, 0.0),
            PanButton::Right => self.pan(1.0, 0.0),
        }
    }

    /// Angle between the view offset and straight up, in radians.
    pub fn polar_angle(&self) -> f64 {
        (self.pose.position - self.pose.target).angle_to(Vec3::Z)
    }

    /// Clamp camera and target into the framing box.
    pub fn constrain(&mut self) {
        let Some(b) = self.bounds else {
            return;
        };
        let p = &mut self.pose.position;
        p.x = clamp(p.x, b.min.x, b.max.x);
        p.y = clamp(p.y, b.min.y + SOUTH_EDGE_INSET, b.max.y);
        p.z = clamp(p.z, b.min.z, b.max.z);

        let t = &mut self.pose.target;
        t.x = clamp(t.x, b.min.x, b.max.x);
        t.y = clamp(t.y, b.min.y, b.max.y);
        t.z = clamp(t.z, b.min.z, b.max.z);
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(PerspectiveCamera::default())
    }
}

// Unlike `f64::clamp`, tolerates `lo > hi` (the upper bound wins).
fn clamp(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn framed() -> OrbitControls {
        let mut controls = OrbitControls::default();
        controls
            .frame(BoundingBox::new(
                Vec3::new(-10.0, -10.0, f64::NEG_INFINITY),
                Vec3::new(10.0, 10.0, f64::INFINITY),
            ))
            .expect("frame");
        controls
    }

    #[test]
    fn lock_then_unlock_restores_rotation() {
        let mut controls = framed();
        assert_eq!(controls.lock_state(), CameraLock::Unlocked);

        controls.set_locked(true).expect("lock");
        assert_eq!(controls.lock_state(), CameraLock::Locked);
        assert!(!controls.enable_rotate);
        assert!(controls.enable_pan);
        assert_eq!(controls.mouse_buttons, MouseButtons::LOCKED);
        assert_eq!(controls.pose.up, Vec3::Y);
        assert_eq!(controls.pose.target, Vec3::ZERO);

        controls.set_locked(false).expect("unlock");
        assert_eq!(controls.lock_state(), CameraLock::Unlocked);
        assert!(controls.enable_rotate);
        assert_eq!(controls.mouse_buttons, MouseButtons::UNLOCKED);
    }

    #[test]
    fn locking_twice_is_a_no_op() {
        let mut controls = framed();
        controls.set_locked(true).expect("lock");
        controls.pan(1.0, 0.0);
        let pose = controls.pose;
        controls.set_locked(true).expect("lock again");
        assert_eq!(controls.lock_state(), CameraLock::Locked);
        assert_eq!(controls.pose, pose);
    }

    #[test]
    fn toggle_alternates_states() {
        let mut controls = framed();
        assert_eq!(controls.toggle_lock().expect("toggle"), CameraLock::Locked);
        assert_eq!(controls.toggle_lock().expect("toggle"), CameraLock::Unlocked);
    }

    #[test]
    fn locking_without_extent_fails_and_keeps_state() {
        let mut controls = OrbitControls::default();
        assert_eq!(controls.set_locked(true), Err(FramingError::NoExtent));
        assert_eq!(controls.lock_state(), CameraLock::Unlocked);
        assert!(controls.enable_rotate);
    }

    #[test]
    fn framing_rejects_degenerate_extent() {
        let mut controls = OrbitControls::default();
        let err = controls.frame(BoundingBox::empty()).expect_err("degenerate");
        assert!(matches!(err, FramingError::DegenerateBox { .. }));
        assert!(controls.bounds().is_none());
    }

    #[test]
    fn pan_moves_camera_and_target_and_respects_bounds() {
        let mut controls = framed();
        assert!(controls.handle_key(Key::D));
        assert_close(controls.pose.position.x, PAN_SPEED, 1e-12);
        assert_close(controls.pose.target.x, PAN_SPEED, 1e-12);

        controls.pan(-1000.0, -1000.0);
        assert_eq!(controls.pose.position.x, -10.0);
        assert_eq!(controls.pose.position.y, -10.0 + SOUTH_EDGE_INSET);
        assert_eq!(controls.pose.target.y, -10.0);

        assert!(controls.handle_pan_button(PanButton::Up));
        assert_close(controls.pose.target.y, -10.0 + PAN_SPEED, 1e-12);
    }

    #[test]
    fn rotation_is_bounded_and_disabled_while_locked() {
        let mut controls = framed();
        assert_close(controls.polar_angle(), 0.0, 1e-12);

        // Straight overhead: tilting toward the south stays within range.
        assert!(controls.handle_key(Key::F));
        assert_close(controls.polar_angle(), ROTATE_SPEED, 1e-9);

        // Cannot tip past the horizon.
        assert!(!controls.rotate(MAX_POLAR_ANGLE));

        controls.set_locked(true).expect("lock");
        assert!(!controls.handle_key(Key::R));
        assert!(controls.handle_key(Key::W));
    }

    #[test]
    fn keys_parse_case_insensitively() {
        assert_eq!(Key::from_char('W'), Some(Key::W));
        assert_eq!(Key::from_char('f'), Some(Key::F));
        assert_eq!(Key::from_char('x'), None);
    }
}
