use anyhow::Result;
use glam::Mat4;

use crate::paint::Color;

use super::layout::BufferLayout;
use super::texture::Texture2D;

/// GPU command surface consumed by [`Renderer2D`](super::Renderer2D).
///
/// One implementation drives wgpu; tests substitute a recorder. Calls arrive
/// in submission order and each `draw_indexed` must render with the vertex
/// data, view-projection and texture bindings set before it.
pub trait RenderBackend {
    /// Number of texture bindings one draw can sample from.
    fn max_texture_slots(&self) -> u32;

    /// Allocates an RGBA8 texture. Contents are undefined until written.
    fn create_texture(&mut self, width: u32, height: u32) -> Result<Texture2D>;

    /// Replaces the full contents of `texture`. `data.len()` is exactly
    /// `texture.byte_len()`.
    fn set_texture_data(&mut self, texture: &Texture2D, data: &[u8]) -> Result<()>;

    /// Releases the GPU storage behind `texture`. Unknown handles are ignored.
    fn destroy_texture(&mut self, texture: &Texture2D);

    fn set_clear_color(&mut self, color: Color);

    /// Clears the current target to the clear color.
    fn clear(&mut self);

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32);

    /// Allocates the dynamic vertex buffer for `max_vertices` vertices shaped
    /// by `layout`, and whatever pipeline consumes it.
    fn create_vertex_buffer(&mut self, layout: &BufferLayout, max_vertices: u32) -> Result<()>;

    /// One-time upload of the static index buffer.
    fn upload_index_pattern(&mut self, indices: &[u32]) -> Result<()>;

    /// Writes `bytes` to the start of the vertex buffer.
    fn upload_vertices(&mut self, bytes: &[u8]);

    fn set_view_projection(&mut self, view_projection: &Mat4);

    /// Binds `textures[i]` to sampler slot `i`.
    fn bind_textures(&mut self, textures: &[Texture2D]);

    /// Draws the first `index_count` indices as a triangle list.
    fn draw_indexed(&mut self, index_count: u32);
}

#[cfg(test)]
pub(crate) use recording::{BackendCall, RecordingBackend};
