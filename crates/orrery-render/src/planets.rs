//! Planet and sun spheres drawn as ray-traced impostors.
//!
//! Each body is one camera-facing quad; the fragment stage reconstructs the
//! sphere surface, writes its true depth, and shades it from the sun at the
//! origin. The sun itself is emissive.

use bytemuck::{Pod, Zeroable};
use orrery_catalog::palette::hex_to_linear;
use orrery_sim::{PLANETS, Planet};
use wgpu::util::DeviceExt;

use crate::targets::{DEPTH_COMPARE, DEPTH_FORMAT};

/// Sun marker radius in scene units.
pub const SUN_RADIUS: f32 = 3.0;
/// Sun marker colour.
pub const SUN_HEX: u32 = 0xffddaa;
/// Sun plus the eight planets.
pub const BODY_COUNT: usize = PLANETS.len() + 1;

const PLANET_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    @location(1) center: vec3<f32>,
    @location(2) radius: f32,
    @location(3) color: vec3<f32>,
    @location(4) emissive: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) center: vec3<f32>,
    @location(2) radius: f32,
    @location(3) color: vec3<f32>,
    @location(4) emissive: f32,
};

struct FragmentOutput {
    @location(0) color: vec4<f32>,
    @builtin(frag_depth) depth: f32,
};

@vertex
fn vs_planet(in: VertexInput) -> VertexOutput {
    let world = in.center
        + camera.right.xyz * (in.corner.x * in.radius)
        + camera.up.xyz * (in.corner.y * in.radius);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.uv = in.corner;
    out.center = in.center;
    out.radius = in.radius;
    out.color = in.color;
    out.emissive = in.emissive;
    return out;
}

@fragment
fn fs_planet(in: VertexOutput) -> FragmentOutput {
    let d2 = dot(in.uv, in.uv);
    if d2 > 1.0 {
        discard;
    }
    let right = camera.right.xyz;
    let up = camera.up.xyz;
    let back = cross(right, up);
    let normal = right * in.uv.x + up * in.uv.y + back * sqrt(1.0 - d2);
    let surface = in.center + normal * in.radius;

    var rgb = in.color;
    if in.emissive < 0.5 {
        let to_sun = normalize(-in.center);
        rgb = in.color * (0.15 + 0.85 * max(dot(normal, to_sun), 0.0));
    }

    let clip = camera.view_proj * vec4<f32>(surface, 1.0);
    var out: FragmentOutput;
    out.color = vec4<f32>(rgb, 1.0);
    out.depth = clip.z / clip.w;
    return out;
}
"#;

/// One impostor sphere.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlanetInstance {
    pub center: [f32; 3],
    pub radius: f32,
    /// Linear RGB.
    pub color: [f32; 3],
    /// 1.0 for self-lit bodies.
    pub emissive: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<PlanetInstance>(), 32);

impl PlanetInstance {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<PlanetInstance>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 0,
                shader_location: 1,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 12,
                shader_location: 2,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: 16,
                shader_location: 3,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: 28,
                shader_location: 4,
            },
        ],
    };

    pub fn sun() -> Self {
        let [r, g, b, _] = hex_to_linear(SUN_HEX);
        Self {
            center: [0.0; 3],
            radius: SUN_RADIUS,
            color: [r, g, b],
            emissive: 1.0,
        }
    }

    /// `planet` at simulation time `t` days.
    pub fn planet(planet: &Planet, t: f64) -> Self {
        let [r, g, b, _] = hex_to_linear(planet.color_hex);
        Self {
            center: planet.position_at(t).as_vec3().to_array(),
            radius: planet.display_radius() as f32,
            color: [r, g, b],
            emissive: 0.0,
        }
    }

    /// Sun first, then every planet, at time `t`.
    pub fn scene(t: f64) -> [Self; BODY_COUNT] {
        let mut instances = [Self::sun(); BODY_COUNT];
        for (slot, planet) in instances[1..].iter_mut().zip(PLANETS.iter()) {
            *slot = Self::planet(planet, t);
        }
        instances
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct CornerVertex {
    corner: [f32; 2],
}

impl CornerVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<CornerVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        }],
    };
}

const CORNERS: [CornerVertex; 4] = [
    CornerVertex {
        corner: [-1.0, -1.0],
    },
    CornerVertex {
        corner: [1.0, -1.0],
    },
    CornerVertex { corner: [1.0, 1.0] },
    CornerVertex {
        corner: [-1.0, 1.0],
    },
];

const INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Opaque, depth-writing sphere impostors for the sun and planets.
pub struct PlanetPipeline {
    pipeline: wgpu::RenderPipeline,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl PlanetPipeline {
    pub fn new(
        device: &wgpu::Device,
        camera_buffer: &wgpu::Buffer,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
    ) -> Self {
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("planet-impostor-shader"),
            source: wgpu::ShaderSource::Wgsl(PLANET_SHADER.into()),
        });

        let camera_bgl = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("planet-camera-bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<crate::CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("planet-layout"),
            bind_group_layouts: &[&camera_bgl],
            immediate_size: 0,
        });

        let pipeline = build_pipeline(device, &pipeline_layout, &shader, color_format, sample_count);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("planet-corners"),
            contents: bytemuck::cast_slice(&CORNERS),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("planet-indices"),
            contents: bytemuck::cast_slice(&INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("planet-instances"),
            contents: bytemuck::cast_slice(&PlanetInstance::scene(0.0)),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("planet-camera-bg"),
            layout: &camera_bgl,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        });

        log::info!("Planet pipeline initialized ({BODY_COUNT} bodies)");

        Self {
            pipeline,
            pipeline_layout,
            shader,
            color_format,
            vertex_buffer,
            index_buffer,
            instance_buffer,
            bind_group,
        }
    }

    pub fn set_sample_count(&mut self, device: &wgpu::Device, sample_count: u32) {
        self.pipeline = build_pipeline(
            device,
            &self.pipeline_layout,
            &self.shader,
            self.color_format,
            sample_count,
        );
    }

    /// Move every planet to its position at `t` days.
    pub fn update(&self, queue: &wgpu::Queue, t: f64) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&PlanetInstance::scene(t)),
        );
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..INDICES.len() as u32, 0, 0..BODY_COUNT as u32);
    }
}

fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("planet-pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_planet"),
            buffers: &[CornerVertex::LAYOUT, PlanetInstance::LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: DEPTH_COMPARE,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: Some("fs_planet"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: None,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        multiview_mask: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::targets::tests::create_test_device;

    #[test]
    fn test_scene_starts_with_sun() {
        let scene = PlanetInstance::scene(0.0);
        assert_eq!(scene.len(), 9);
        assert_eq!(scene[0].center, [0.0; 3]);
        assert_eq!(scene[0].radius, 3.0);
        assert_eq!(scene[0].emissive, 1.0);
        assert!(scene[1..].iter().all(|p| p.emissive == 0.0));
    }

    #[test]
    fn test_instances_follow_planet_layer() {
        let t = 412.0;
        let scene = PlanetInstance::scene(t);
        for (instance, planet) in scene[1..].iter().zip(PLANETS.iter()) {
            let expected = planet.position_at(t).as_vec3();
            assert!((glam::Vec3::from(instance.center) - expected).length() < 1e-4);
            assert!((instance.radius as f64 - planet.display_radius()).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pipeline_builds() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let camera = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: std::mem::size_of::<crate::CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let pipeline = PlanetPipeline::new(&device, &camera, wgpu::TextureFormat::Rgba8UnormSrgb, 1);
        pipeline.update(&queue, 10.0);
    }
}
