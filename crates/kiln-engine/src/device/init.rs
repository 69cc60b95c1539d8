/// Parameters for creating the [`Gpu`](super::Gpu).
#[derive(Debug, Clone)]
pub struct GpuInit {
    /// Pick an sRGB surface format when one is offered.
    pub prefer_srgb: bool,

    /// `Fifo` is vsync and is supported everywhere.
    pub present_mode: wgpu::PresentMode,

    /// Falls back to the first supported mode when unset or unsupported.
    pub alpha_mode: Option<wgpu::CompositeAlphaMode>,

    pub required_features: wgpu::Features,
    pub required_limits: wgpu::Limits,

    /// Latency hint; backends may ignore it.
    pub desired_maximum_frame_latency: u32,
}

impl GpuInit {
    /// Same as default but with vsync off where the platform allows it.
    pub fn uncapped() -> Self {
        Self {
            present_mode: wgpu::PresentMode::AutoNoVsync,
            ..Self::default()
        }
    }
}

impl Default for GpuInit {
    fn default() -> Self {
        Self {
            prefer_srgb: true,
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: None,
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            desired_maximum_frame_latency: 2,
        }
    }
}
