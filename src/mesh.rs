// mesh.rs — 球体网格生成（相机位于球心，渲染内表面）

pub const DEFAULT_RADIUS: f32 = 50.0;
/// Below this the texture shows visible facets.
pub const DEFAULT_SEGMENTS: usize = 50;
pub const MIN_SEGMENTS: usize = 3;
/// Keeps every index of the densest sphere inside `u32`.
pub const MAX_SEGMENTS: usize = 2048;

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SphereVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

impl SphereVertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SphereVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SphereMesh {
    pub positions: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl SphereMesh {
    pub fn vertices(&self) -> Vec<SphereVertex> {
        self.positions
            .iter()
            .zip(&self.uvs)
            .map(|(&position, &uv)| SphereVertex { position, uv })
            .collect()
    }
}

/// `rings` 为纬向分段，`segments` 为经向分段；过小的值会被提升到 3。
pub fn build_sphere(radius: f32, rings: usize, segments: usize) -> SphereMesh {
    let lat = rings.clamp(MIN_SEGMENTS, MAX_SEGMENTS);
    let lon = segments.clamp(MIN_SEGMENTS, MAX_SEGMENTS);

    let mut positions = Vec::with_capacity((lat + 1) * (lon + 1));
    let mut uvs = Vec::with_capacity((lat + 1) * (lon + 1));
    let mut indices = Vec::with_capacity(lat * lon * 6);

    for i in 0..=lat {
        let v = i as f32 / lat as f32;
        let theta = std::f32::consts::PI * v;
        let y = radius * theta.cos();
        let sin_t = theta.sin();

        for j in 0..=lon {
            let t = j as f32 / lon as f32;
            let phi = std::f32::consts::TAU * t;

            // u 反向：从外侧看图像方向正确，从球内看则左右颠倒（由纹理镜像抵消）
            positions.push([radius * phi.cos() * sin_t, y, radius * phi.sin() * sin_t]);
            uvs.push([1.0 - t, v]);
        }
    }

    let stride = (lon + 1) as u32;
    for i in 0..lat as u32 {
        for j in 0..lon as u32 {
            let a = i * stride + j;
            let b = a + stride;

            // 逆时针朝外：正面是球的外侧
            indices.extend_from_slice(&[a, a + 1, b, b, a + 1, b + 1]);
        }
    }

    SphereMesh {
        positions,
        uvs,
        indices,
    }
}
