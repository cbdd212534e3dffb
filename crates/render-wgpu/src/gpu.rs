use crate::mesh::{BoxMesh, BoxVertex};
use crate::shaders;
use anaglyph_common::ColorMask;
use anaglyph_render::{ClearBuffers, FrameTarget, MeshProvider, RenderResult};
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::Arc;

/// Upper bound on box draws per frame, summed over both eyes.
const MAX_INSTANCES: u32 = 10_000;

/// Distinct view-projection matrices per frame (one per eye pass in practice).
const MAX_VIEW_SLOTS: usize = 8;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Background of every frame, (163, 227, 255) / 255.
const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 163.0 / 255.0,
    g: 227.0 / 255.0,
    b: 1.0,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
}

/// Consecutive instances drawn with one pipeline and one view-projection slot.
#[derive(Debug, Clone, PartialEq)]
struct DrawRun {
    mask: ColorMask,
    slot: u32,
    instances: Range<u32>,
}

/// Work between two clears; becomes one wgpu render pass.
#[derive(Debug, Clone, PartialEq)]
struct PassRecord {
    clear_color: bool,
    clear_depth: bool,
    runs: Vec<DrawRun>,
}

/// Commands collected between [`WgpuRenderer::end_frame`] calls.
#[derive(Debug, Default)]
struct FrameRecord {
    passes: Vec<PassRecord>,
    mask: ColorMask,
    view_projections: Vec<Mat4>,
    instances: Vec<InstanceData>,
    dropped: usize,
}

impl FrameRecord {
    fn clear(&mut self, buffers: ClearBuffers) {
        self.passes.push(PassRecord {
            clear_color: buffers.color,
            clear_depth: buffers.depth,
            runs: Vec::new(),
        });
    }

    /// Record one instance. Returns false if a per-frame limit was hit.
    fn draw(&mut self, view_projection: Mat4, model: Mat4) -> bool {
        if self.instances.len() >= MAX_INSTANCES as usize {
            self.dropped += 1;
            return false;
        }
        if self.view_projections.last() != Some(&view_projection) {
            if self.view_projections.len() >= MAX_VIEW_SLOTS {
                self.dropped += 1;
                return false;
            }
            self.view_projections.push(view_projection);
        }
        let slot = (self.view_projections.len() - 1) as u32;

        if self.passes.is_empty() {
            // Draw before any clear: keep whatever the attachments hold.
            self.passes.push(PassRecord {
                clear_color: false,
                clear_depth: false,
                runs: Vec::new(),
            });
        }
        let Some(pass) = self.passes.last_mut() else {
            return false;
        };

        let index = self.instances.len() as u32;
        self.instances.push(InstanceData {
            model: model.to_cols_array_2d(),
        });

        let mask = self.mask;
        let runs = &mut pass.runs;
        match runs.last_mut() {
            Some(run) if run.mask == mask && run.slot == slot && run.instances.end == index => {
                run.instances.end += 1;
            }
            _ => runs.push(DrawRun {
                mask,
                slot,
                instances: index..index + 1,
            }),
        }
        true
    }

    fn masks(&self) -> Vec<ColorMask> {
        let mut masks: Vec<ColorMask> = self
            .passes
            .iter()
            .flat_map(|p| p.runs.iter().map(|r| r.mask))
            .collect();
        masks.sort();
        masks.dedup();
        masks
    }
}

fn color_writes(mask: ColorMask) -> wgpu::ColorWrites {
    let mut writes = wgpu::ColorWrites::empty();
    writes.set(wgpu::ColorWrites::RED, mask.red);
    writes.set(wgpu::ColorWrites::GREEN, mask.green);
    writes.set(wgpu::ColorWrites::BLUE, mask.blue);
    writes.set(wgpu::ColorWrites::ALPHA, mask.alpha);
    writes
}

fn align_to(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// wgpu frame target and box mesh provider.
///
/// Clears and mask changes are recorded as they arrive and turned into render
/// passes by [`WgpuRenderer::end_frame`]. A color mask maps to a pipeline whose
/// color target `write_mask` enables the same channels.
pub struct WgpuRenderer {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    surface_format: wgpu::TextureFormat,
    shader: wgpu::ShaderModule,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<ColorMask, wgpu::RenderPipeline>,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    instance_buffer: wgpu::Buffer,
    mesh: Option<BoxMesh>,
    depth_texture: wgpu::TextureView,
    frame: FrameRecord,
}

impl WgpuRenderer {
    pub fn new(
        device: Arc<wgpu::Device>,
        queue: Arc<wgpu::Queue>,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        let uniform_size = std::mem::size_of::<Uniforms>() as u64;
        let uniform_stride = align_to(
            uniform_size,
            device.limits().min_uniform_buffer_offset_alignment as u64,
        );

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("uniform_buffer"),
            size: uniform_stride * MAX_VIEW_SLOTS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("uniform_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(uniform_size),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("uniform_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(uniform_size),
                }),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("box_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::BOX_SHADER.into()),
        });

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: MAX_INSTANCES as u64 * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(&device, width, height);

        let mut renderer = Self {
            device,
            queue,
            surface_format,
            shader,
            pipeline_layout,
            pipelines: HashMap::new(),
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            instance_buffer,
            mesh: None,
            depth_texture,
            frame: FrameRecord::default(),
        };
        for mask in [ColorMask::ALL, ColorMask::RED, ColorMask::CYAN] {
            renderer.ensure_pipeline(mask);
        }
        renderer
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(&self.device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Encode and submit everything recorded since the last call, drawing into `target`.
    pub fn end_frame(&mut self, target: &wgpu::TextureView) {
        let frame = std::mem::take(&mut self.frame);
        if frame.dropped > 0 {
            tracing::warn!("dropped {} draws over the per-frame limit", frame.dropped);
        }

        for mask in frame.masks() {
            self.ensure_pipeline(mask);
        }

        for (slot, vp) in frame.view_projections.iter().enumerate() {
            self.queue.write_buffer(
                &self.uniform_buffer,
                slot as u64 * self.uniform_stride,
                bytemuck::bytes_of(&Uniforms {
                    view_proj: vp.to_cols_array_2d(),
                }),
            );
        }
        if !frame.instances.is_empty() {
            self.queue
                .write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&frame.instances));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("anaglyph_encoder"),
            });

        for record in &frame.passes {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("anaglyph_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: if record.clear_color {
                            wgpu::LoadOp::Clear(CLEAR_COLOR)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: if record.clear_depth {
                            wgpu::LoadOp::Clear(1.0)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let Some(mesh) = &self.mesh else {
                continue;
            };
            if record.runs.is_empty() {
                continue;
            }

            pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            for run in &record.runs {
                pass.set_pipeline(&self.pipelines[&run.mask]);
                pass.set_bind_group(
                    0,
                    &self.uniform_bind_group,
                    &[(run.slot as u64 * self.uniform_stride) as u32],
                );
                pass.draw_indexed(0..mesh.index_count, 0, run.instances.clone());
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn ensure_pipeline(&mut self, mask: ColorMask) {
        if !self.pipelines.contains_key(&mask) {
            let pipeline = self.create_pipeline(mask);
            self.pipelines.insert(mask, pipeline);
        }
    }

    fn create_pipeline(&self, mask: ColorMask) -> wgpu::RenderPipeline {
        tracing::debug!("creating box pipeline for mask {mask}");
        let label = format!("box_pipeline_{mask}");
        self.device
            .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(&label),
                layout: Some(&self.pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &self.shader,
                    entry_point: Some("vs_main"),
                    compilation_options: Default::default(),
                    buffers: &[
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<BoxVertex>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &BoxVertex::ATTRIBUTES,
                        },
                        wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<InstanceData>() as u64,
                            step_mode: wgpu::VertexStepMode::Instance,
                            attributes: &wgpu::vertex_attr_array![
                                2 => Float32x4,
                                3 => Float32x4,
                                4 => Float32x4,
                                5 => Float32x4,
                            ],
                        },
                    ],
                },
                fragment: Some(wgpu::FragmentState {
                    module: &self.shader,
                    entry_point: Some("fs_main"),
                    compilation_options: Default::default(),
                    targets: &[Some(wgpu::ColorTargetState {
                        format: self.surface_format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: color_writes(mask),
                    })],
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    cull_mode: Some(wgpu::Face::Back),
                    ..Default::default()
                },
                depth_stencil: Some(wgpu::DepthStencilState {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: Default::default(),
                    bias: Default::default(),
                }),
                multisample: Default::default(),
                multiview: None,
                cache: None,
            })
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

impl FrameTarget for WgpuRenderer {
    fn clear(&mut self, buffers: ClearBuffers) {
        self.frame.clear(buffers);
    }

    fn set_color_mask(&mut self, mask: ColorMask) {
        self.frame.mask = mask;
    }
}

impl MeshProvider for WgpuRenderer {
    fn initialize(&mut self) -> RenderResult<()> {
        if self.mesh.is_none() {
            self.mesh = Some(BoxMesh::new(&self.device));
            tracing::debug!("box mesh uploaded");
        }
        Ok(())
    }

    fn render(&mut self, view_projection: &Mat4, model: &Mat4) {
        if self.mesh.is_some() {
            self.frame.draw(*view_projection, *model);
        }
    }

    fn cleanup(&mut self) {
        if let Some(mesh) = self.mesh.take() {
            mesh.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn model(i: usize) -> Mat4 {
        Mat4::from_translation(Vec3::X * i as f32)
    }

    #[test]
    fn anaglyph_frame_becomes_two_passes() {
        let left = Mat4::from_translation(Vec3::X);
        let right = Mat4::from_translation(-Vec3::X);
        let mut frame = FrameRecord::default();

        frame.mask = ColorMask::ALL;
        frame.clear(ClearBuffers::ALL);
        frame.mask = ColorMask::RED;
        for i in 0..3 {
            assert!(frame.draw(left, model(i)));
        }
        frame.clear(ClearBuffers::DEPTH);
        frame.mask = ColorMask::CYAN;
        for i in 0..3 {
            assert!(frame.draw(right, model(i)));
        }

        assert_eq!(frame.view_projections, vec![left, right]);
        assert_eq!(
            frame.passes,
            vec![
                PassRecord {
                    clear_color: true,
                    clear_depth: true,
                    runs: vec![DrawRun {
                        mask: ColorMask::RED,
                        slot: 0,
                        instances: 0..3,
                    }],
                },
                PassRecord {
                    clear_color: false,
                    clear_depth: true,
                    runs: vec![DrawRun {
                        mask: ColorMask::CYAN,
                        slot: 1,
                        instances: 3..6,
                    }],
                },
            ]
        );
        assert_eq!(frame.masks(), vec![ColorMask::RED, ColorMask::CYAN]);
    }

    #[test]
    fn draw_without_clear_loads_attachments() {
        let mut frame = FrameRecord::default();
        frame.draw(Mat4::IDENTITY, Mat4::IDENTITY);
        assert_eq!(frame.passes.len(), 1);
        assert!(!frame.passes[0].clear_color);
        assert!(!frame.passes[0].clear_depth);
        assert_eq!(frame.passes[0].runs[0].mask, ColorMask::ALL);
    }

    #[test]
    fn view_slots_are_bounded() {
        let mut frame = FrameRecord::default();
        frame.clear(ClearBuffers::ALL);
        for i in 0..MAX_VIEW_SLOTS {
            assert!(frame.draw(Mat4::from_scale(Vec3::splat(i as f32 + 1.0)), Mat4::IDENTITY));
        }
        assert!(!frame.draw(Mat4::ZERO, Mat4::IDENTITY));
        assert_eq!(frame.dropped, 1);
        assert_eq!(frame.instances.len(), MAX_VIEW_SLOTS);
    }

    #[test]
    fn masks_map_to_color_writes() {
        assert_eq!(color_writes(ColorMask::ALL), wgpu::ColorWrites::ALL);
        assert_eq!(color_writes(ColorMask::RED), wgpu::ColorWrites::RED);
        assert_eq!(
            color_writes(ColorMask::CYAN),
            wgpu::ColorWrites::GREEN | wgpu::ColorWrites::BLUE
        );
        assert!(color_writes(ColorMask::NONE).is_empty());
    }

    #[test]
    fn uniform_stride_respects_alignment() {
        assert_eq!(align_to(64, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(64, 64), 64);
    }
}
