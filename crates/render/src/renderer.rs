use crate::RenderResult;
use crate::camera::OrbitCamera;
use crate::compositor::{ClearBuffers, FrameTarget, MeshProvider, composite};
use crate::stereo::eye_frames;
use anaglyph_common::{ColorMask, SceneInstance, StereoParameters};
use glam::Mat4;
use serde::Serialize;
use std::fmt::Write as _;

/// One framebuffer command, as issued by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum RenderOp {
    Clear(ClearBuffers),
    SetColorMask(ColorMask),
    Draw { view_projection: Mat4, model: Mat4 },
}

/// Ordered command list for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FramePlan {
    pub ops: Vec<RenderOp>,
}

/// A run of consecutive draws sharing a color mask and view-projection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EyePass {
    pub mask: ColorMask,
    pub view_projection: Mat4,
    pub draws: usize,
    /// The clear preceding this pass kept the color buffer.
    pub cleared_depth_only: bool,
}

impl FramePlan {
    /// Group the draws into passes. A clear or a mask change always starts a new pass.
    pub fn passes(&self) -> Vec<EyePass> {
        let mut passes: Vec<EyePass> = Vec::new();
        let mut mask = ColorMask::ALL;
        let mut last_clear = None;
        let mut split = true;

        for op in &self.ops {
            match *op {
                RenderOp::Clear(buffers) => {
                    last_clear = Some(buffers);
                    split = true;
                }
                RenderOp::SetColorMask(next) => {
                    split |= next != mask;
                    mask = next;
                }
                RenderOp::Draw {
                    view_projection, ..
                } => match passes.last_mut() {
                    Some(pass) if !split && pass.view_projection == view_projection => {
                        pass.draws += 1;
                    }
                    _ => {
                        passes.push(EyePass {
                            mask,
                            view_projection,
                            draws: 1,
                            cleared_depth_only: last_clear == Some(ClearBuffers::DEPTH),
                        });
                        split = false;
                    }
                },
            }
        }
        passes
    }

    pub fn draw_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, RenderOp::Draw { .. }))
            .count()
    }
}

/// Headless backend that records every command instead of drawing.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    ops: Vec<RenderOp>,
    initialized: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn ops(&self) -> &[RenderOp] {
        &self.ops
    }

    pub fn into_plan(self) -> FramePlan {
        FramePlan { ops: self.ops }
    }
}

impl FrameTarget for RecordingBackend {
    fn clear(&mut self, buffers: ClearBuffers) {
        self.ops.push(RenderOp::Clear(buffers));
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.ops.push(RenderOp::SetColorMask(mask));
    }
}

impl MeshProvider for RecordingBackend {
    fn initialize(&mut self) -> RenderResult<()> {
        self.initialized = true;
        Ok(())
    }

    fn render(&mut self, view_projection: &Mat4, model: &Mat4) {
        self.ops.push(RenderOp::Draw {
            view_projection: *view_projection,
            model: *model,
        });
    }

    fn cleanup(&mut self) {
        self.initialized = false;
    }
}

/// Debug text renderer: describes a frame instead of drawing it.
///
/// Useful for CLI output, logging, and testing the compositor without a GPU.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Plan one frame with the recording backend and describe it.
    pub fn render(
        &self,
        camera: &OrbitCamera,
        params: &StereoParameters,
        aspect: f32,
        instances: &[SceneInstance],
    ) -> String {
        let eyes = eye_frames(camera, params, aspect);
        let mut backend = RecordingBackend::new();
        composite(&eyes, instances, &mut backend);
        let plan = backend.into_plan();

        let mut out = String::new();
        let _ = writeln!(
            out,
            "=== Frame (mode={}, ipd={:.2}, instances={}) ===",
            params.mode,
            params.ipd(),
            instances.len()
        );
        let _ = writeln!(
            out,
            "Camera: eye=({:.1}, {:.1}, {:.1}) target=({:.1}, {:.1}, {:.1}) fov={:.0}",
            camera.eye.x,
            camera.eye.y,
            camera.eye.z,
            camera.target.x,
            camera.target.y,
            camera.target.z,
            camera.fov_degrees
        );
        for (name, eye) in [("left", eyes.left()), ("right", eyes.right())] {
            if !eyes.is_stereo() && name == "right" {
                break;
            }
            let p = eye.position;
            let _ = writeln!(out, "  {name} eye=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
        }

        let mut pending_draws = 0usize;
        for op in &plan.ops {
            if !matches!(op, RenderOp::Draw { .. }) && pending_draws > 0 {
                let _ = writeln!(out, "  draw x{pending_draws}");
                pending_draws = 0;
            }
            match op {
                RenderOp::Clear(ClearBuffers { color, depth }) => {
                    let what = match (color, depth) {
                        (true, true) => "color+depth",
                        (true, false) => "color",
                        (false, true) => "depth",
                        (false, false) => "nothing",
                    };
                    let _ = writeln!(out, "  clear {what}");
                }
                RenderOp::SetColorMask(mask) => {
                    let _ = writeln!(out, "  mask {mask}");
                }
                RenderOp::Draw { .. } => pending_draws += 1,
            }
        }
        if pending_draws > 0 {
            let _ = writeln!(out, "  draw x{pending_draws}");
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anaglyph_common::StereoMode;
    use glam::Vec3;

    fn boxes(n: usize) -> Vec<SceneInstance> {
        (0..n)
            .map(|i| SceneInstance::new(Mat4::from_translation(Vec3::Y * i as f32)))
            .collect()
    }

    #[test]
    fn recording_backend_tracks_lifecycle() {
        let mut backend = RecordingBackend::new();
        assert!(!backend.is_initialized());
        backend.initialize().unwrap();
        backend.initialize().unwrap();
        assert!(backend.is_initialized());
        backend.render(&Mat4::IDENTITY, &Mat4::IDENTITY);
        assert_eq!(backend.ops().len(), 1);
        backend.cleanup();
        assert!(!backend.is_initialized());
    }

    #[test]
    fn passes_split_on_mask_change() {
        let vp = Mat4::IDENTITY;
        let plan = FramePlan {
            ops: vec![
                RenderOp::Clear(ClearBuffers::ALL),
                RenderOp::SetColorMask(ColorMask::RED),
                RenderOp::Draw {
                    view_projection: vp,
                    model: Mat4::IDENTITY,
                },
                RenderOp::SetColorMask(ColorMask::CYAN),
                RenderOp::Draw {
                    view_projection: vp,
                    model: Mat4::IDENTITY,
                },
                RenderOp::Draw {
                    view_projection: vp,
                    model: Mat4::IDENTITY,
                },
            ],
        };
        let passes = plan.passes();
        assert_eq!(passes.len(), 2);
        assert_eq!(passes[0].draws, 1);
        assert_eq!(passes[1].draws, 2);
        assert!(!passes[1].cleared_depth_only);
        assert_eq!(plan.draw_count(), 3);
    }

    #[test]
    fn debug_renderer_mono() {
        let camera = OrbitCamera::default();
        let params = StereoParameters::new(20.0, StereoMode::None);
        let output = DebugTextRenderer::new().render(&camera, &params, 4.0 / 3.0, &boxes(1));

        assert!(output.contains("mode=None"));
        assert!(output.contains("clear color+depth"));
        assert!(output.contains("draw x1"));
        assert!(!output.contains("right eye"));
    }

    #[test]
    fn debug_renderer_anaglyph() {
        let camera = OrbitCamera::default();
        let params = StereoParameters::new(20.0, StereoMode::Asymmetric);
        let output = DebugTextRenderer::new().render(&camera, &params, 4.0 / 3.0, &boxes(3));

        assert!(output.contains("mode=Asymmetric view frustum"));
        assert!(output.contains("mask R\n"));
        assert!(output.contains("clear depth\n"));
        assert!(output.contains("mask GB\n"));
        assert_eq!(output.matches("draw x3").count(), 2);
        assert!(output.contains("left eye=(-10.000, 0.000, 100.000)"));
    }
}
