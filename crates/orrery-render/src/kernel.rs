//! Compute kernel that runs the shared orbit WGSL over catalog records and
//! reads the positions back, so GPU and host evaluators can be compared.

use glam::{DVec3, Vec3};
use orrery_catalog::BodyRecord;
use orrery_orbit::{AU_TO_SCENE, split_shader_time};
use std::sync::Arc;
use wgpu::util::DeviceExt;

use crate::asteroids::rebased_instances;
use crate::shader::ShaderLibrary;

const SHADER_NAME: &str = "orbit-kernel";
const WORKGROUP_SIZE: u32 = 64;

/// Deviation above which a parity run is reported as a warning, in scene
/// units.
pub const PARITY_TOLERANCE: f64 = 1e-3 * AU_TO_SCENE;

const KERNEL_SHADER: &str = r#"
struct Params {
    time: f32,
    count: u32,
    scene_scale: f32,
    _pad: f32,
};

@group(0) @binding(0) var<storage, read> records: array<f32>;
@group(0) @binding(1) var<storage, read_write> positions: array<vec4<f32>>;
@group(0) @binding(2) var<uniform> params: Params;

@compute @workgroup_size(64)
fn cs_orbit(@builtin(global_invocation_id) id: vec3<u32>) {
    let i = id.x;
    if i >= params.count {
        return;
    }
    let base = i * 9u;
    let p = orbit_position(
        records[base], records[base + 1u], records[base + 2u],
        records[base + 3u], records[base + 4u], records[base + 5u],
        params.time,
    );
    positions[i] = vec4<f32>(p * params.scene_scale, 1.0);
}
"#;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct KernelParams {
    time: f32,
    count: u32,
    scene_scale: f32,
    _pad: f32,
}

/// Errors from a kernel dispatch and readback.
#[derive(Debug, thiserror::Error)]
pub enum KernelError {
    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("readback mapping failed: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    #[error("readback callback was dropped before completing")]
    Disconnected,
}

/// The orbit compute pipeline.
pub struct OrbitKernel {
    pipeline: wgpu::ComputePipeline,
    bind_group_layout: wgpu::BindGroupLayout,
    _shader: Arc<wgpu::ShaderModule>,
}

impl OrbitKernel {
    pub fn new(device: &wgpu::Device, shaders: &mut ShaderLibrary) -> Self {
        let shader = shaders.load_with_orbit(device, SHADER_NAME, KERNEL_SHADER);

        let storage = |binding, read_only| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::COMPUTE,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("orbit-kernel-bgl"),
            entries: &[
                storage(0, true),
                storage(1, false),
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("orbit-kernel-layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("orbit-kernel-pipeline"),
            layout: Some(&layout),
            module: &shader,
            entry_point: Some("cs_orbit"),
            compilation_options: Default::default(),
            cache: None,
        });

        Self {
            pipeline,
            bind_group_layout,
            _shader: shader,
        }
    }

    /// Scene-space positions of `records` at `t` days, in record order.
    /// Records are re-based to the shader epoch of `t` exactly as the
    /// instance pipeline does. Blocks until the readback completes.
    pub fn evaluate(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        records: &[BodyRecord],
        t: f64,
    ) -> Result<Vec<Vec3>, KernelError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        let (epoch, offset) = split_shader_time(t);
        let uploaded = rebased_instances(records, epoch);
        let count = records.len() as u32;
        let output_size = u64::from(count) * std::mem::size_of::<[f32; 4]>() as u64;

        let record_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orbit-kernel-records"),
            contents: bytemuck::cast_slice(&uploaded),
            usage: wgpu::BufferUsages::STORAGE,
        });
        let output_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orbit-kernel-positions"),
            size: output_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("orbit-kernel-readback"),
            size: output_size,
            usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
            mapped_at_creation: false,
        });
        let params = KernelParams {
            time: offset,
            count,
            scene_scale: AU_TO_SCENE as f32,
            _pad: 0.0,
        };
        let params_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("orbit-kernel-params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("orbit-kernel-bg"),
            layout: &self.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: record_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: output_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: params_buffer.as_entire_binding(),
                },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("orbit-kernel-encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("orbit-kernel-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            pass.dispatch_workgroups(count.div_ceil(WORKGROUP_SIZE), 1, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buffer, 0, &readback_buffer, 0, output_size);
        queue.submit([encoder.finish()]);

        let slice = readback_buffer.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });
        device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        rx.recv().map_err(|_| KernelError::Disconnected)??;

        let positions = {
            let mapped = slice.get_mapped_range();
            bytemuck::cast_slice::<u8, [f32; 4]>(&mapped)
                .iter()
                .map(|p| Vec3::new(p[0], p[1], p[2]))
                .collect()
        };
        readback_buffer.unmap();
        Ok(positions)
    }
}

/// Largest disagreement between GPU and host positions over a sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParityReport {
    pub samples: usize,
    /// Scene units.
    pub max_deviation: f64,
    pub mean_deviation: f64,
    /// Catalog index of the worst sample.
    pub worst_index: Option<usize>,
}

impl ParityReport {
    /// Compare `gpu` positions for `indices` against the host `f64` evaluator
    /// at `t`.
    pub fn compare(
        records: &[BodyRecord],
        indices: &[usize],
        gpu: &[Vec3],
        t: f64,
    ) -> Self {
        let mut report = Self {
            samples: 0,
            max_deviation: 0.0,
            mean_deviation: 0.0,
            worst_index: None,
        };
        let mut total = 0.0;
        for (&index, gpu_pos) in indices.iter().zip(gpu) {
            let Some(record) = records.get(index) else {
                continue;
            };
            let host: DVec3 = record.elements().scene_position_at(t);
            let deviation = (host - gpu_pos.as_dvec3()).length();
            report.samples += 1;
            total += deviation;
            if report.worst_index.is_none() || deviation > report.max_deviation {
                report.max_deviation = deviation;
                report.worst_index = Some(index);
            }
        }
        if report.samples > 0 {
            report.mean_deviation = total / report.samples as f64;
        }
        report
    }

    /// Run `kernel` over up to `max_samples` evenly spaced records and compare.
    pub fn measure(
        kernel: &OrbitKernel,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        records: &[BodyRecord],
        t: f64,
        max_samples: usize,
    ) -> Result<Self, KernelError> {
        let indices = sample_indices(records.len(), max_samples);
        let sample: Vec<BodyRecord> = indices.iter().map(|&i| records[i]).collect();
        let gpu = kernel.evaluate(device, queue, &sample, t)?;
        Ok(Self::compare(records, &indices, &gpu, t))
    }

    pub fn within(&self, tolerance: f64) -> bool {
        self.max_deviation <= tolerance
    }
}

/// Up to `max` indices spread evenly over `0..len`.
fn sample_indices(len: usize, max: usize) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    (0..max).map(|k| k * len / max).collect()
}
