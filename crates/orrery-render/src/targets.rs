//! Offscreen attachments: a reverse-Z depth buffer and, when multisampling,
//! the MSAA colour texture that resolves into the swapchain image.

/// Depth format used by every pipeline.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Reverse-Z clear value: 0.0 is the far plane.
pub const DEPTH_CLEAR: f32 = 0.0;

/// Reverse-Z comparison: closer fragments have larger depth.
pub const DEPTH_COMPARE: wgpu::CompareFunction = wgpu::CompareFunction::GreaterEqual;

/// Depth and optional MSAA colour attachments sized to the surface.
pub struct RenderTargets {
    depth_view: wgpu::TextureView,
    msaa_view: Option<wgpu::TextureView>,
    color_format: wgpu::TextureFormat,
    sample_count: u32,
    width: u32,
    height: u32,
}

impl RenderTargets {
    /// `sample_count` must already be supported by the adapter; see
    /// [`RenderContext::supported_sample_count`](crate::RenderContext::supported_sample_count).
    pub fn new(
        device: &wgpu::Device,
        color_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        sample_count: u32,
    ) -> Self {
        let width = width.max(1);
        let height = height.max(1);
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth-buffer"),
            size,
            mip_level_count: 1,
            sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        let msaa_view = (sample_count > 1).then(|| {
            device
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some("msaa-color"),
                    size,
                    mip_level_count: 1,
                    sample_count,
                    dimension: wgpu::TextureDimension::D2,
                    format: color_format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        });

        log::debug!("Render targets {width}x{height}, {sample_count}x MSAA");

        Self {
            depth_view,
            msaa_view,
            color_format,
            sample_count,
            width,
            height,
        }
    }

    /// Recreate the attachments for a new surface size. No-op if unchanged.
    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.width == width.max(1) && self.height == height.max(1) {
            return;
        }
        *self = Self::new(device, self.color_format, width, height, self.sample_count);
    }

    /// Recreate the attachments with a different sample count (quality toggle).
    pub fn set_sample_count(&mut self, device: &wgpu::Device, sample_count: u32) {
        if self.sample_count != sample_count {
            *self = Self::new(device, self.color_format, self.width, self.height, sample_count);
        }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Multisampled colour view, `None` at one sample per pixel.
    pub fn msaa_view(&self) -> Option<&wgpu::TextureView> {
        self.msaa_view.as_ref()
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Multisample state pipelines must be built with to render into these
    /// targets.
    pub fn multisample_state(&self) -> wgpu::MultisampleState {
        wgpu::MultisampleState {
            count: self.sample_count,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Headless device, or `None` when no adapter is available.
    pub(crate) fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        pollster::block_on(async {
            let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
                backends: wgpu::Backends::all(),
                ..Default::default()
            });

            let adapter = instance
                .request_adapter(&wgpu::RequestAdapterOptions {
                    power_preference: wgpu::PowerPreference::default(),
                    force_fallback_adapter: false,
                    compatible_surface: None,
                })
                .await
                .ok()?;

            adapter
                .request_device(&wgpu::DeviceDescriptor::default())
                .await
                .ok()
        })
    }

    #[test]
    fn test_reverse_z_constants() {
        assert_eq!(DEPTH_FORMAT, wgpu::TextureFormat::Depth32Float);
        assert_eq!(DEPTH_CLEAR, 0.0);
        assert_eq!(DEPTH_COMPARE, wgpu::CompareFunction::GreaterEqual);
    }

    #[test]
    fn test_single_sample_has_no_msaa_view() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let targets =
            RenderTargets::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, 640, 480, 1);
        assert!(targets.msaa_view().is_none());
        assert_eq!(targets.multisample_state().count, 1);
    }

    #[test]
    fn test_resize_and_zero_clamp() {
        let Some((device, _queue)) = create_test_device() else {
            return;
        };
        let mut targets =
            RenderTargets::new(&device, wgpu::TextureFormat::Rgba8UnormSrgb, 640, 480, 1);
        targets.resize(&device, 0, 0);
        assert_eq!(targets.size(), (1, 1));
        targets.resize(&device, 1920, 1080);
        assert_eq!(targets.size(), (1920, 1080));
    }
}
