use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub(crate) struct BoxVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl BoxVertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
    ];
}

/// Box from -1 to 1 on every axis, one quad per face, counter-clockwise from outside.
pub(crate) fn box_geometry() -> (Vec<BoxVertex>, Vec<u16>) {
    let p = 1.0_f32;
    #[rustfmt::skip]
    let vertices = vec![
        // +Z face
        BoxVertex { position: [-p, -p,  p], normal: [0.0, 0.0, 1.0] },
        BoxVertex { position: [ p, -p,  p], normal: [0.0, 0.0, 1.0] },
        BoxVertex { position: [ p,  p,  p], normal: [0.0, 0.0, 1.0] },
        BoxVertex { position: [-p,  p,  p], normal: [0.0, 0.0, 1.0] },
        // -Z face
        BoxVertex { position: [ p, -p, -p], normal: [0.0, 0.0, -1.0] },
        BoxVertex { position: [-p, -p, -p], normal: [0.0, 0.0, -1.0] },
        BoxVertex { position: [-p,  p, -p], normal: [0.0, 0.0, -1.0] },
        BoxVertex { position: [ p,  p, -p], normal: [0.0, 0.0, -1.0] },
        // +X face
        BoxVertex { position: [ p, -p,  p], normal: [1.0, 0.0, 0.0] },
        BoxVertex { position: [ p, -p, -p], normal: [1.0, 0.0, 0.0] },
        BoxVertex { position: [ p,  p, -p], normal: [1.0, 0.0, 0.0] },
        BoxVertex { position: [ p,  p,  p], normal: [1.0, 0.0, 0.0] },
        // -X face
        BoxVertex { position: [-p, -p, -p], normal: [-1.0, 0.0, 0.0] },
        BoxVertex { position: [-p, -p,  p], normal: [-1.0, 0.0, 0.0] },
        BoxVertex { position: [-p,  p,  p], normal: [-1.0, 0.0, 0.0] },
        BoxVertex { position: [-p,  p, -p], normal: [-1.0, 0.0, 0.0] },
        // +Y face
        BoxVertex { position: [-p,  p,  p], normal: [0.0, 1.0, 0.0] },
        BoxVertex { position: [ p,  p,  p], normal: [0.0, 1.0, 0.0] },
        BoxVertex { position: [ p,  p, -p], normal: [0.0, 1.0, 0.0] },
        BoxVertex { position: [-p,  p, -p], normal: [0.0, 1.0, 0.0] },
        // -Y face
        BoxVertex { position: [-p, -p, -p], normal: [0.0, -1.0, 0.0] },
        BoxVertex { position: [ p, -p, -p], normal: [0.0, -1.0, 0.0] },
        BoxVertex { position: [ p, -p,  p], normal: [0.0, -1.0, 0.0] },
        BoxVertex { position: [-p, -p,  p], normal: [0.0, -1.0, 0.0] },
    ];
    #[rustfmt::skip]
    let indices: Vec<u16> = vec![
        0,1,2, 2,3,0,       // +Z
        4,5,6, 6,7,4,       // -Z
        8,9,10, 10,11,8,    // +X
        12,13,14, 14,15,12, // -X
        16,17,18, 18,19,16, // +Y
        20,21,22, 22,23,20, // -Y
    ];
    (vertices, indices)
}

/// GPU buffers for the box.
pub(crate) struct BoxMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

impl BoxMesh {
    pub fn new(device: &wgpu::Device) -> Self {
        let (vertices, indices) = box_geometry();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_vertex_buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("box_index_buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn destroy(self) {
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn box_has_six_quads() {
        let (vertices, indices) = box_geometry();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn faces_wind_counter_clockwise_from_outside() {
        let (vertices, indices) = box_geometry();
        for tri in indices.chunks(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(vertices[i as usize].position));
            let normal = Vec3::from(vertices[tri[0] as usize].normal);
            let face_normal = (b - a).cross(c - a);
            assert!(face_normal.dot(normal) > 0.0, "triangle {tri:?} faces inward");
        }
    }
}
