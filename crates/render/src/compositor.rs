use crate::RenderResult;
use crate::stereo::{EyeFrame, EyeFrames};
use anaglyph_common::{ColorMask, SceneInstance};
use glam::Mat4;
use serde::Serialize;

/// Framebuffer attachments to clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearBuffers {
    pub color: bool,
    pub depth: bool,
}

impl ClearBuffers {
    pub const ALL: ClearBuffers = ClearBuffers {
        color: true,
        depth: true,
    };
    /// Keeps the color written so far; lets the next pass depth-test on its own.
    pub const DEPTH: ClearBuffers = ClearBuffers {
        color: false,
        depth: true,
    };
}

/// Framebuffer state the compositor drives between draws.
pub trait FrameTarget {
    fn clear(&mut self, buffers: ClearBuffers);
    fn set_color_mask(&mut self, mask: ColorMask);
}

/// A drawable mesh. Draws go to whatever target state is current.
pub trait MeshProvider {
    /// Allocate resources. Calling it again after success is a no-op.
    fn initialize(&mut self) -> RenderResult<()>;
    fn render(&mut self, view_projection: &Mat4, model: &Mat4);
    /// Release resources. Called once at shutdown.
    fn cleanup(&mut self);
}

/// Draw one frame: a plain image in mono, a red/cyan anaglyph in stereo.
///
/// Stereo frames draw the left eye into red only, clear depth while keeping
/// color, then draw the right eye into green and blue only.
pub fn composite<B>(eyes: &EyeFrames, instances: &[SceneInstance], backend: &mut B)
where
    B: FrameTarget + MeshProvider + ?Sized,
{
    let _span = tracing::trace_span!("composite", stereo = eyes.is_stereo()).entered();

    backend.set_color_mask(ColorMask::ALL);
    backend.clear(ClearBuffers::ALL);

    match eyes {
        EyeFrames::Mono(eye) => draw_eye(backend, eye, instances),
        EyeFrames::Stereo { left, right } => {
            backend.set_color_mask(ColorMask::RED);
            draw_eye(backend, left, instances);

            backend.clear(ClearBuffers::DEPTH);

            backend.set_color_mask(ColorMask::CYAN);
            draw_eye(backend, right, instances);
        }
    }
}

fn draw_eye<B>(backend: &mut B, eye: &EyeFrame, instances: &[SceneInstance])
where
    B: MeshProvider + ?Sized,
{
    let vp = eye.view_projection();
    for instance in instances {
        backend.render(&vp, &instance.model);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::OrbitCamera;
    use crate::renderer::{RecordingBackend, RenderOp};
    use crate::stereo::eye_frames;
    use anaglyph_common::{StereoMode, StereoParameters};

    const ASPECT: f32 = 4.0 / 3.0;

    fn instances(n: usize) -> Vec<SceneInstance> {
        (0..n)
            .map(|i| SceneInstance::new(Mat4::from_translation(glam::Vec3::X * i as f32)))
            .collect()
    }

    fn record(mode: StereoMode, ipd: f32, n: usize) -> (EyeFrames, Vec<RenderOp>) {
        let cam = OrbitCamera::default();
        let eyes = eye_frames(&cam, &StereoParameters::new(ipd, mode), ASPECT);
        let mut backend = RecordingBackend::new();
        composite(&eyes, &instances(n), &mut backend);
        (eyes, backend.into_plan().ops)
    }

    #[test]
    fn mono_frame_clears_once_and_draws_everything() {
        let (eyes, ops) = record(StereoMode::None, 20.0, 3);
        let vp = eyes.left().view_projection();

        assert_eq!(ops[0], RenderOp::SetColorMask(ColorMask::ALL));
        assert_eq!(ops[1], RenderOp::Clear(ClearBuffers::ALL));
        assert_eq!(ops.len(), 5);
        for (i, op) in ops[2..].iter().enumerate() {
            assert_eq!(
                *op,
                RenderOp::Draw {
                    view_projection: vp,
                    model: Mat4::from_translation(glam::Vec3::X * i as f32),
                }
            );
        }
    }

    #[test]
    fn stereo_frame_sequence() {
        for mode in [StereoMode::ToeIn, StereoMode::Asymmetric] {
            let (eyes, ops) = record(mode, 20.0, 2);
            let left = eyes.left().view_projection();
            let right = eyes.right().view_projection();
            let draw = |vp: Mat4, i: usize| RenderOp::Draw {
                view_projection: vp,
                model: Mat4::from_translation(glam::Vec3::X * i as f32),
            };

            assert_eq!(
                ops,
                vec![
                    RenderOp::SetColorMask(ColorMask::ALL),
                    RenderOp::Clear(ClearBuffers::ALL),
                    RenderOp::SetColorMask(ColorMask::RED),
                    draw(left, 0),
                    draw(left, 1),
                    RenderOp::Clear(ClearBuffers::DEPTH),
                    RenderOp::SetColorMask(ColorMask::CYAN),
                    draw(right, 0),
                    draw(right, 1),
                ]
            );
        }
    }

    #[test]
    fn only_one_eye_pass_writes_red() {
        for mode in [StereoMode::ToeIn, StereoMode::Asymmetric] {
            let cam = OrbitCamera::default();
            let eyes = eye_frames(&cam, &StereoParameters::new(20.0, mode), ASPECT);
            let mut backend = RecordingBackend::new();
            composite(&eyes, &instances(4), &mut backend);
            let passes = backend.into_plan().passes();

            assert_eq!(passes.len(), 2);
            let (left, right) = (&passes[0], &passes[1]);
            assert_eq!(left.mask, ColorMask::RED);
            assert_eq!(right.mask, ColorMask::CYAN);
            assert!(!left.mask.overlaps(&right.mask));
            assert!(!left.mask.is_empty() && !right.mask.is_empty());
            assert_eq!(passes.iter().filter(|p| p.mask.red).count(), 1);
            assert!(right.cleared_depth_only);
            assert_eq!(left.draws, 4);
            assert_eq!(right.draws, 4);
        }
    }

    #[test]
    fn empty_scene_still_clears() {
        let (_, ops) = record(StereoMode::Asymmetric, 20.0, 0);
        assert!(ops.contains(&RenderOp::Clear(ClearBuffers::ALL)));
        assert!(!ops.iter().any(|op| matches!(op, RenderOp::Draw { .. })));
    }
}
