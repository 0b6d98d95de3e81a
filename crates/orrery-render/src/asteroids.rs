//! Instanced asteroid billboards.
//!
//! The catalog bytes are uploaded once as the instance buffer. Every frame
//! only the 16-byte [`FrameUniform`] changes; the vertex stage evaluates each
//! orbit at `frame.time` and expands a camera-facing quad around it.

use bytemuck::{Pod, Zeroable};
use orrery_catalog::{BodyCatalog, BodyRecord, MAX_CLASSES, Palette, RECORD_STRIDE};
use orrery_orbit::split_shader_time;
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::shader::ShaderLibrary;
use crate::targets::{DEPTH_COMPARE, DEPTH_FORMAT};

const SHADER_NAME: &str = "asteroid-billboard";

const ASTEROID_SHADER: &str = r#"
struct Camera {
    view_proj: mat4x4<f32>,
    right: vec4<f32>,
    up: vec4<f32>,
};

struct Frame {
    time: f32,
    size_scale: f32,
    scene_scale: f32,
    _pad: f32,
};

struct Palette {
    colors: array<vec4<f32>, 32>,
    default_color: vec4<f32>,
};

@group(0) @binding(0) var<uniform> camera: Camera;
@group(0) @binding(1) var<uniform> frame: Frame;
@group(0) @binding(2) var<uniform> palette: Palette;

struct VertexInput {
    @location(0) corner: vec2<f32>,
    // e, q, i, om
    @location(1) orbit_a: vec4<f32>,
    // w, ma, epoch, diameter
    @location(2) orbit_b: vec4<f32>,
    @location(3) class_id: f32,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
    @location(1) color: vec3<f32>,
};

// Rounds like the host lookup; NaN and out-of-range ids take the default.
fn class_color(class_id: f32) -> vec3<f32> {
    let slot = floor(class_id + 0.5);
    if slot >= 0.0 && slot < 32.0 {
        return palette.colors[u32(slot)].rgb;
    }
    return palette.default_color.rgb;
}

@vertex
fn vs_asteroid(in: VertexInput) -> VertexOutput {
    let center = orbit_position(
        in.orbit_a.x, in.orbit_a.y, in.orbit_a.z, in.orbit_a.w,
        in.orbit_b.x, in.orbit_b.y, frame.time,
    ) * frame.scene_scale;
    let size = log(in.orbit_b.w + 1.0) * frame.size_scale;
    let world = center
        + camera.right.xyz * (in.corner.x * size)
        + camera.up.xyz * (in.corner.y * size);

    var out: VertexOutput;
    out.clip_position = camera.view_proj * vec4<f32>(world, 1.0);
    out.uv = in.corner * 2.0;
    out.color = class_color(in.class_id);
    return out;
}

// Piecewise-linear radial glow through (0, 0.48) (0.2, 0.384) (0.5, 0.096) (1, 0).
fn glow(r: f32) -> f32 {
    var a: f32;
    if r < 0.2 {
        a = mix(0.48, 0.384, r / 0.2);
    } else if r < 0.5 {
        a = mix(0.384, 0.096, (r - 0.2) / 0.3);
    } else {
        a = mix(0.096, 0.0, (r - 0.5) / 0.5);
    }
    return a * 0.48;
}

@fragment
fn fs_asteroid(in: VertexOutput) -> @location(0) vec4<f32> {
    let r = length(in.uv);
    if r >= 1.0 {
        discard;
    }
    let g = glow(r);
    return vec4<f32>(in.color * (g * 1.2), g);
}
"#;

/// Per-frame values read by the asteroid vertex stage.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct FrameUniform {
    /// Simulation time in days.
    pub time: f32,
    pub size_scale: f32,
    /// Scene units per AU.
    pub scene_scale: f32,
    pub _pad: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<FrameUniform>(), 16);

/// Class colours plus the fallback, laid out as a WGSL uniform.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PaletteUniform {
    pub colors: [[f32; 4]; MAX_CLASSES],
    pub default_color: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<PaletteUniform>(), 528);

impl From<&Palette> for PaletteUniform {
    fn from(palette: &Palette) -> Self {
        Self {
            colors: palette.colors,
            default_color: palette.default_color,
        }
    }
}

/// Corner of the unit billboard quad, in `[-0.5, 0.5]`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2],
}

impl QuadVertex {
    const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<QuadVertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x2,
            offset: 0,
            shader_location: 0,
        }],
    };
}

const QUAD: [QuadVertex; 4] = [
    QuadVertex {
        corner: [-0.5, -0.5],
    },
    QuadVertex {
        corner: [0.5, -0.5],
    },
    QuadVertex { corner: [0.5, 0.5] },
    QuadVertex {
        corner: [-0.5, 0.5],
    },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 2, 3, 0];

/// Instance layout over the raw 36-byte catalog record.
pub const INSTANCE_LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
    array_stride: RECORD_STRIDE as wgpu::BufferAddress,
    step_mode: wgpu::VertexStepMode::Instance,
    attributes: &[
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 0,
            shader_location: 1,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32x4,
            offset: 16,
            shader_location: 2,
        },
        wgpu::VertexAttribute {
            format: wgpu::VertexFormat::Float32,
            offset: 32,
            shader_location: 3,
        },
    ],
};

/// Renders the catalog as additive, depth-tested, non-depth-writing billboards.
pub struct AsteroidPipeline {
    pipeline: wgpu::RenderPipeline,
    pipeline_layout: wgpu::PipelineLayout,
    shader: Arc<wgpu::ShaderModule>,
    color_format: wgpu::TextureFormat,
    quad_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    frame_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    frame: FrameUniform,
    /// Records as loaded; uploads are re-based copies.
    records: Vec<BodyRecord>,
    epoch: f64,
    instance_count: u32,
    drawn: u32,
}

/// `records` with mean anomalies advanced to `epoch`, as uploaded for a
/// shader time measured from that epoch.
pub fn rebased_instances(records: &[BodyRecord], epoch: f64) -> Vec<BodyRecord> {
    records.iter().map(|r| r.rebased(epoch)).collect()
}

impl AsteroidPipeline {
    pub fn new(
        device: &wgpu::Device,
        shaders: &mut ShaderLibrary,
        camera_buffer: &wgpu::Buffer,
        color_format: wgpu::TextureFormat,
        sample_count: u32,
        catalog: &BodyCatalog,
        size_scale: f32,
    ) -> Self {
        let shader = shaders.load_with_orbit(device, SHADER_NAME, ASTEROID_SHADER);

        let uniform_entry = |binding, size: u64| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size),
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("asteroid-bgl"),
            entries: &[
                uniform_entry(0, std::mem::size_of::<crate::CameraUniform>() as u64),
                uniform_entry(1, std::mem::size_of::<FrameUniform>() as u64),
                uniform_entry(2, std::mem::size_of::<PaletteUniform>() as u64),
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("asteroid-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = build_pipeline(device, &pipeline_layout, &shader, color_format, sample_count);

        let quad_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asteroid-quad"),
            contents: bytemuck::cast_slice(&QUAD),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asteroid-quad-indices"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        // wgpu rejects zero-sized vertex buffers in some backends; keep one
        // zeroed record around for an empty catalog.
        let padding = [0u8; RECORD_STRIDE];
        let instance_bytes = if catalog.is_empty() {
            &padding[..]
        } else {
            catalog.as_bytes()
        };
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asteroid-instances"),
            contents: instance_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let frame = FrameUniform {
            time: 0.0,
            size_scale,
            scene_scale: orrery_orbit::AU_TO_SCENE as f32,
            _pad: 0.0,
        };
        let frame_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asteroid-frame"),
            contents: bytemuck::bytes_of(&frame),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let palette = PaletteUniform::from(&catalog.palette());
        let palette_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("asteroid-palette"),
            contents: bytemuck::bytes_of(&palette),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("asteroid-bg"),
            layout: &bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: frame_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: palette_buffer.as_entire_binding(),
                },
            ],
        });

        let instance_count = catalog.len() as u32;
        log::info!("Asteroid pipeline initialized ({instance_count} instances, {sample_count}x MSAA)");

        Self {
            pipeline,
            pipeline_layout,
            shader,
            color_format,
            quad_buffer,
            index_buffer,
            instance_buffer,
            frame_buffer,
            bind_group,
            frame,
            records: catalog.records().to_vec(),
            epoch: 0.0,
            instance_count,
            drawn: instance_count,
        }
    }

    /// Rebuild the pipeline for a new MSAA sample count.
    pub fn set_sample_count(&mut self, device: &wgpu::Device, sample_count: u32) {
        self.pipeline = build_pipeline(
            device,
            &self.pipeline_layout,
            &self.shader,
            self.color_format,
            sample_count,
        );
    }

    /// Write this frame's time and set how many instances (a catalog
    /// prefix) are drawn. Crossing into a new shader epoch re-uploads the
    /// instances with re-based mean anomalies.
    pub fn update(&mut self, queue: &wgpu::Queue, time_days: f64, drawn: usize) {
        let (epoch, offset) = split_shader_time(time_days);
        if epoch != self.epoch && !self.records.is_empty() {
            let rebased = rebased_instances(&self.records, epoch);
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&rebased));
            log::debug!("Asteroid instances re-based to epoch {epoch} days");
        }
        self.epoch = epoch;
        self.frame.time = offset;
        self.drawn = (drawn as u32).min(self.instance_count);
        queue.write_buffer(&self.frame_buffer, 0, bytemuck::bytes_of(&self.frame));
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass<'_>) {
        if self.drawn == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.quad_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..QUAD_INDICES.len() as u32, 0, 0..self.drawn);
    }

    pub fn instance_count(&self) -> u32 {
        self.instance_count
    }

    pub fn drawn_count(&self) -> u32 {
        self.drawn
    }

    pub fn frame(&self) -> &FrameUniform {
        &self.frame
    }

    /// Start of the shader epoch the uploaded instances are based on.
    pub fn epoch(&self) -> f64 {
        self.epoch
    }
}

/// Additive `(One, One)` colour, depth tested but never written.
pub(crate) fn additive_blend() -> wgpu::BlendState {
    let add = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: add,
        alpha: add,
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
        label: Some("asteroid-pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_asteroid"),
            buffers: &[QuadVertex::LAYOUT, INSTANCE_LAYOUT],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: None,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: false,
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
            entry_point: Some("fs_asteroid"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend: Some(additive_blend()),
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
    use orrery_catalog::synthetic::SyntheticCatalog;

    #[test]
    fn test_instance_layout_matches_record() {
        assert_eq!(INSTANCE_LAYOUT.array_stride, 36);
        let offsets: Vec<_> = INSTANCE_LAYOUT.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, [0, 16, 32]);
        assert_eq!(
            std::mem::offset_of!(orrery_catalog::BodyRecord, argument_of_periapsis),
            16
        );
        assert_eq!(std::mem::offset_of!(orrery_catalog::BodyRecord, class_id), 32);
    }

    #[test]
    fn test_palette_uniform_copies_palette() {
        let palette = Palette::from_classes(&["MBA", "nonsense"]);
        let uniform = PaletteUniform::from(&palette);
        assert_eq!(uniform.colors[0], palette.color_for(0.0));
        assert_eq!(uniform.colors[1], palette.default_color);
        assert_eq!(uniform.default_color, palette.default_color);
    }

    #[test]
    fn test_blend_is_additive() {
        let blend = additive_blend();
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend.color.operation, wgpu::BlendOperation::Add);
    }

    #[test]
    fn test_pipeline_clamps_drawn_prefix() {
        let Some((device, queue)) = create_test_device() else {
            return;
        };
        let catalog = SyntheticCatalog::new(3, 50).generate();
        let camera = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: std::mem::size_of::<crate::CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM,
            mapped_at_creation: false,
        });
        let mut shaders = ShaderLibrary::new();
        let mut pipeline = AsteroidPipeline::new(
            &device,
            &mut shaders,
            &camera,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            1,
            &catalog,
            2.4,
        );
        assert_eq!(pipeline.instance_count(), 50);
        pipeline.update(&queue, 120.0, 20);
        assert_eq!(pipeline.drawn_count(), 20);
        assert_eq!(pipeline.frame().time, 120.0);
        pipeline.update(&queue, 0.0, 10_000);
        assert_eq!(pipeline.drawn_count(), 50);

        pipeline.update(&queue, 1.44e8, 50);
        assert!(pipeline.epoch() > 0.0);
        assert!(pipeline.frame().time < orrery_orbit::SHADER_EPOCH_DAYS as f32);
        assert_eq!(pipeline.epoch() + f64::from(pipeline.frame().time), 1.44e8);
    }

    #[test]
    fn test_rebased_instances_track_host_at_late_times() {
        let catalog = SyntheticCatalog::new(5, 200).generate();
        let t = 1.44e8;
        let (epoch, offset) = split_shader_time(t);
        let uploaded = rebased_instances(catalog.records(), epoch);
        let scale = orrery_orbit::AU_TO_SCENE as f32;
        for (i, record) in uploaded.iter().enumerate() {
            let original = catalog.records()[i];
            if !original.is_elliptical() || original.eccentricity > 0.3 {
                continue;
            }
            let host = original.elements().scene_position_at(t).as_vec3();
            let shader = record.elements().shader_position(offset) * scale;
            // 0.01 scene units, far inside the 4.0 pick radius.
            assert!((host - shader).length() < 1e-2, "body {i}: {host} vs {shader}");
        }
    }
}
