//! Per-eye view and projection matrices for the three stereo modes.
//!
//! All projections map view-space depth to `[0, 1]` (wgpu convention) and
//! view space is right-handed with the camera looking down `-Z`.

use crate::camera::OrbitCamera;
use anaglyph_common::{StereoMode, StereoParameters};
use glam::{Mat4, Vec3, Vec4};
use serde::Serialize;

/// Derived camera for one eye, rebuilt every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyeFrame {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

impl EyeFrame {
    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view
    }
}

/// The eyes to render this frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EyeFrames {
    Mono(EyeFrame),
    Stereo { left: EyeFrame, right: EyeFrame },
}

impl EyeFrames {
    /// Left eye, or the single eye in mono.
    pub fn left(&self) -> &EyeFrame {
        match self {
            EyeFrames::Mono(eye) => eye,
            EyeFrames::Stereo { left, .. } => left,
        }
    }

    /// Right eye, or the single eye in mono.
    pub fn right(&self) -> &EyeFrame {
        match self {
            EyeFrames::Mono(eye) => eye,
            EyeFrames::Stereo { right, .. } => right,
        }
    }

    pub fn is_stereo(&self) -> bool {
        matches!(self, EyeFrames::Stereo { .. })
    }
}

/// Compute the eye frames for the camera's current pose.
///
/// With a zero interocular distance both stereo modes return the mono frame
/// for each eye, bit for bit.
pub fn eye_frames(camera: &OrbitCamera, params: &StereoParameters, aspect: f32) -> EyeFrames {
    match params.mode {
        StereoMode::None => EyeFrames::Mono(mono_frame(camera, aspect)),
        _ if params.half_ipd() == 0.0 => {
            let eye = mono_frame(camera, aspect);
            EyeFrames::Stereo {
                left: eye,
                right: eye,
            }
        }
        StereoMode::ToeIn => toe_in_frames(camera, params.half_ipd(), aspect),
        StereoMode::Asymmetric => asymmetric_frames(camera, params.half_ipd(), aspect),
    }
}

/// Single centered eye with a symmetric frustum.
pub fn mono_frame(camera: &OrbitCamera, aspect: f32) -> EyeFrame {
    EyeFrame {
        position: camera.eye,
        view: camera.view_matrix(),
        projection: camera.projection_matrix(aspect),
    }
}

/// Unit vector pointing to the viewer's right; eyes are offset along it.
pub fn shift_vector(camera: &OrbitCamera) -> Vec3 {
    camera.direction().cross(camera.up).normalize()
}

/// Eyes offset sideways, each rotated to aim at the shared target.
///
/// The converging optical axes produce keystone distortion (vertical parallax
/// away from the screen center). That is what this mode demonstrates.
pub fn toe_in_frames(camera: &OrbitCamera, half_ipd: f32, aspect: f32) -> EyeFrames {
    let shift = shift_vector(camera);
    let projection = camera.projection_matrix(aspect);

    let eye = |position: Vec3| EyeFrame {
        position,
        view: Mat4::look_at_rh(position, camera.target, camera.up),
        projection,
    };

    EyeFrames::Stereo {
        left: eye(camera.eye - half_ipd * shift),
        right: eye(camera.eye + half_ipd * shift),
    }
}

/// Parallel eye axes with frustums sheared so they coincide at the target distance.
pub fn asymmetric_frames(camera: &OrbitCamera, half_ipd: f32, aspect: f32) -> EyeFrames {
    let direction = camera.direction();
    let shift = shift_vector(camera);
    let convergence = camera.target_distance();

    let top = camera.near * (camera.fov_radians() / 2.0).tan();
    let bottom = -top;
    let right = aspect * top;
    let left = -right;
    let frustum_shift = half_ipd * camera.near / convergence;

    let eye = |position: Vec3, shear: f32| EyeFrame {
        position,
        view: Mat4::look_at_rh(position, position + direction * convergence, camera.up),
        projection: frustum_rh(
            left + shear,
            right + shear,
            bottom,
            top,
            camera.near,
            camera.far,
        ),
    };

    EyeFrames::Stereo {
        left: eye(camera.eye - half_ipd * shift, frustum_shift),
        right: eye(camera.eye + half_ipd * shift, -frustum_shift),
    }
}

/// Off-axis perspective projection from near-plane bounds.
///
/// Right-handed, depth mapped to `[0, 1]`. With symmetric bounds this matches
/// [`Mat4::perspective_rh`].
pub fn frustum_rh(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = near - far;
    Mat4::from_cols(
        Vec4::new(2.0 * near / width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near / height, 0.0, 0.0),
        Vec4::new(
            (right + left) / width,
            (top + bottom) / height,
            far / depth,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, near * far / depth, 0.0),
    )
}
