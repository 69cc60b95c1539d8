/// A swapchain image acquired for one frame.
///
/// Holding it blocks acquisition of the next image, so present promptly.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
}

impl GpuFrame {
    /// Hands the image back to the compositor.
    pub fn present(self) {
        drop(self.view);
        self.surface_texture.present();
    }
}
