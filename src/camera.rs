//! Perspective camera and orbit controls.
//!
//! The camera only knows where it is, what it looks at and how it projects.
//! Everything interactive lives behind [`CameraControls`], which the frame
//! updater steps once per tick.

use std::f32::consts::PI;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, Rad, Vector3};
use winit::event::{MouseScrollDelta, WindowEvent};

use crate::settings::CameraSettings;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

#[derive(Clone, Debug)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov_y: Rad<f32>,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    projection: Matrix4<f32>,
}

impl PerspectiveCamera {
    pub fn new(settings: &CameraSettings, aspect: f32) -> Self {
        let mut camera = Self {
            position: settings.position.into(),
            target: settings.target.into(),
            up: Vector3::unit_y(),
            fov_y: cgmath::Deg(settings.fov_y_deg).into(),
            aspect,
            near: settings.near,
            far: settings.far,
            projection: Matrix4::from_scale(1.0),
        };
        camera.update_projection_matrix();
        camera
    }

    /// Recomputes the cached projection from `fov_y`, `aspect` and the clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection = OPENGL_TO_WGPU_MATRIX
            * cgmath::perspective(self.fov_y, self.aspect, self.near, self.far);
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn view_proj(&self) -> Matrix4<f32> {
        self.projection * self.view_matrix()
    }
}

/// Camera-control collaborator, stepped once per frame.
pub trait CameraControls {
    fn update(&mut self, camera: &mut PerspectiveCamera);
}

/// Controls that never move the camera.
#[derive(Debug, Default)]
pub struct FixedControls;

impl CameraControls for FixedControls {
    fn update(&mut self, _: &mut PerspectiveCamera) {}
}

/// Orbits the camera around `target` on a sphere.
///
/// Input accumulates into pending deltas; `update` applies them, eased by the
/// damping factor when damping is enabled, and clamps the polar angle to
/// `[min_polar_angle, max_polar_angle]` (measured from +Y).
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub damping: Option<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pending_azimuth: f32,
    pending_polar: f32,
    pending_zoom: f32,
}

impl OrbitControls {
    pub fn new(settings: &CameraSettings) -> Self {
        Self {
            target: settings.target.into(),
            min_polar_angle: settings.min_polar_angle,
            max_polar_angle: settings.max_polar_angle,
            min_distance: 0.5,
            max_distance: settings.far * 0.9,
            damping: settings.damping,
            rotate_speed: 0.005,
            zoom_speed: 0.1,
            pending_azimuth: 0.0,
            pending_polar: 0.0,
            pending_zoom: 0.0,
        }
    }

    /// Drag by `(dx, dy)` pixels.
    pub fn handle_mouse(&mut self, dx: f64, dy: f64) {
        self.pending_azimuth -= dx as f32 * self.rotate_speed;
        self.pending_polar -= dy as f32 * self.rotate_speed;
    }

    pub fn handle_scroll(&mut self, lines: f32) {
        self.pending_zoom -= lines * self.zoom_speed;
    }

    pub fn handle_window_events(&mut self, event: &WindowEvent) {
        if let WindowEvent::MouseWheel { delta, .. } = event {
            let lines = match delta {
                MouseScrollDelta::LineDelta(_, y) => *y,
                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 50.0,
            };
            self.handle_scroll(lines);
        }
    }

    fn take_step(&mut self) -> (f32, f32, f32) {
        match self.damping {
            Some(factor) => {
                let factor = factor.clamp(0.0, 1.0);
                let step = (
                    self.pending_azimuth * factor,
                    self.pending_polar * factor,
                    self.pending_zoom * factor,
                );
                self.pending_azimuth -= step.0;
                self.pending_polar -= step.1;
                self.pending_zoom -= step.2;
                step
            }
            None => {
                let step = (self.pending_azimuth, self.pending_polar, self.pending_zoom);
                self.pending_azimuth = 0.0;
                self.pending_polar = 0.0;
                self.pending_zoom = 0.0;
                step
            }
        }
    }
}

impl CameraControls for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) {
        let (d_azimuth, d_polar, d_zoom) = self.take_step();

        let offset = camera.position - self.target;
        let radius = offset.magnitude();
        if radius <= f32::EPSILON {
            camera.target = self.target;
            return;
        }
        let mut azimuth = offset.x.atan2(offset.z);
        let mut polar = (offset.y / radius).clamp(-1.0, 1.0).acos();

        azimuth += d_azimuth;
        polar += d_polar;
        // keep away from the poles so look_at never degenerates
        let lower = self.min_polar_angle.max(1e-4);
        let upper = self.max_polar_angle.min(PI - 1e-4).max(lower);
        polar = polar.clamp(lower, upper);
        let radius = (radius * (1.0 + d_zoom)).clamp(self.min_distance, self.max_distance);

        let offset = Vector3::new(
            radius * polar.sin() * azimuth.sin(),
            radius * polar.cos(),
            radius * polar.sin() * azimuth.cos(),
        );
        camera.position = Point3::from_vec(self.target.to_vec() + offset);
        camera.target = self.target;
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
    /// Drawing-buffer size in `xy`: logical size times the clamped pixel ratio.
    resolution: [f32; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        use cgmath::SquareMatrix;
        Self {
            view_position: [0.0; 4],
            view: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
            resolution: [1.0, 1.0, 0.0, 0.0],
        }
    }

    pub fn update(&mut self, camera: &PerspectiveCamera, width: u32, height: u32) {
        self.view_position = camera.position.to_homogeneous().into();
        self.view = camera.view_matrix().into();
        self.view_proj = camera.view_proj().into();
        self.resolution = [width.max(1) as f32, height.max(1) as f32, 0.0, 0.0];
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polar_of(camera: &PerspectiveCamera, target: Point3<f32>) -> f32 {
        let offset = camera.position - target;
        (offset.y / offset.magnitude()).acos()
    }

    #[test]
    fn polar_angle_never_dips_below_horizon() {
        let settings = CameraSettings::default();
        let mut camera = PerspectiveCamera::new(&settings, 1.0);
        let mut controls = OrbitControls::new(&CameraSettings {
            damping: None,
            ..settings.clone()
        });
        // drag hard upwards, which pushes the camera under the target
        controls.handle_mouse(0.0, -10_000.0);
        controls.update(&mut camera);
        assert!(polar_of(&camera, controls.target) <= settings.max_polar_angle + 1e-4);
    }

    #[test]
    fn damping_spreads_motion_over_frames() {
        let settings = CameraSettings::default();
        let mut camera = PerspectiveCamera::new(&settings, 1.0);
        let mut controls = OrbitControls::new(&settings);
        controls.handle_mouse(100.0, 0.0);
        let start = camera.position;
        controls.update(&mut camera);
        let first = camera.position;
        controls.update(&mut camera);
        assert_ne!(start, first);
        assert_ne!(first, camera.position);
    }

    #[test]
    fn idle_controls_keep_distance() {
        let settings = CameraSettings::default();
        let mut camera = PerspectiveCamera::new(&settings, 1.0);
        let mut controls = OrbitControls::new(&settings);
        let before = (camera.position - controls.target).magnitude();
        controls.update(&mut camera);
        let after = (camera.position - controls.target).magnitude();
        assert!((before - after).abs() < 1e-3);
    }
}
