use std::path::Path;

use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::paint::Color;

use super::backend::RenderBackend;
use super::camera::OrthographicCamera;
use super::layout::{BufferElement, BufferLayout, ShaderDataType};
use super::texture::{ImageData, SubTexture2D, Texture2D};

// ── configuration ─────────────────────────────────────────────────────────

/// Batch capacity of a [`Renderer2D`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Renderer2DConfig {
    /// Quads per draw call before an automatic flush.
    pub max_quads: u32,
    /// Texture slots per draw call, slot 0 included.
    pub max_texture_slots: u32,
}

impl Renderer2DConfig {
    #[inline]
    pub fn max_vertices(&self) -> u32 {
        self.max_quads * 4
    }

    #[inline]
    pub fn max_indices(&self) -> u32 {
        self.max_quads * 6
    }

    fn validate(&self, backend_slots: u32) -> Result<()> {
        anyhow::ensure!(self.max_quads >= 1, "max_quads must be at least 1");
        anyhow::ensure!(
            self.max_quads.checked_mul(6).is_some(),
            "max_quads {} overflows the u32 index range",
            self.max_quads
        );
        anyhow::ensure!(
            self.max_texture_slots >= 2,
            "max_texture_slots must leave room beside the white texture (got {})",
            self.max_texture_slots
        );
        anyhow::ensure!(
            self.max_texture_slots <= backend_slots,
            "max_texture_slots {} exceeds the backend limit of {}",
            self.max_texture_slots,
            backend_slots
        );
        Ok(())
    }
}

impl Default for Renderer2DConfig {
    fn default() -> Self {
        Self {
            max_quads: 10_000,
            max_texture_slots: 16,
        }
    }
}

// ── vertex ────────────────────────────────────────────────────────────────

/// One corner of a batched quad, as laid out in the vertex buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
    pub tex_coord: [f32; 2],
    pub tex_index: f32,
    pub tiling_factor: f32,
}

impl QuadVertex {
    pub fn layout() -> BufferLayout {
        BufferLayout::new([
            BufferElement::new(ShaderDataType::Float3, "a_Position"),
            BufferElement::new(ShaderDataType::Float4, "a_Color"),
            BufferElement::new(ShaderDataType::Float2, "a_TexCoord"),
            BufferElement::new(ShaderDataType::Float, "a_TexIndex"),
            BufferElement::new(ShaderDataType::Float, "a_TilingFactor"),
        ])
    }
}

const QUAD_CORNERS: [Vec3; 4] = [
    Vec3::new(-0.5, -0.5, 0.0),
    Vec3::new(0.5, -0.5, 0.0),
    Vec3::new(0.5, 0.5, 0.0),
    Vec3::new(-0.5, 0.5, 0.0),
];

const FULL_TEX_COORDS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

const WHITE_SLOT: f32 = 0.0;

/// Index buffer contents for `max_quads` quads: two triangles per quad
/// sharing the 0-2 diagonal.
pub fn quad_index_pattern(max_quads: u32) -> Vec<u32> {
    (0..max_quads)
        .flat_map(|quad| {
            let base = quad * 4;
            [base, base + 1, base + 2, base + 2, base + 3, base]
        })
        .collect()
}

// ── draw parameters ───────────────────────────────────────────────────────

/// Anything a quad can be positioned with. 2D positions sit at `z = 0`.
pub trait IntoPosition {
    fn into_position(self) -> Vec3;
}

impl IntoPosition for Vec3 {
    #[inline]
    fn into_position(self) -> Vec3 {
        self
    }
}

impl IntoPosition for Vec2 {
    #[inline]
    fn into_position(self) -> Vec3 {
        self.extend(0.0)
    }
}

impl IntoPosition for [f32; 2] {
    #[inline]
    fn into_position(self) -> Vec3 {
        Vec2::from(self).extend(0.0)
    }
}

impl IntoPosition for [f32; 3] {
    #[inline]
    fn into_position(self) -> Vec3 {
        Vec3::from(self)
    }
}

/// How a texture is applied to a quad.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct QuadTexture {
    /// UV multiplier; `10.0` repeats the texture ten times across the quad.
    pub tiling_factor: f32,
    /// Multiplied with every sampled texel.
    pub tint: Color,
}

impl QuadTexture {
    pub fn tiled(tiling_factor: f32) -> Self {
        Self { tiling_factor, ..Self::default() }
    }

    pub fn tinted(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }
}

impl Default for QuadTexture {
    fn default() -> Self {
        Self {
            tiling_factor: 1.0,
            tint: Color::WHITE,
        }
    }
}

// ── statistics ────────────────────────────────────────────────────────────

/// Counters accumulated since the last [`Renderer2D::reset_stats`].
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Renderer2DStats {
    pub draw_calls: u32,
    pub quad_count: u32,
}

impl Renderer2DStats {
    #[inline]
    pub fn total_vertex_count(&self) -> u32 {
        self.quad_count * 4
    }

    #[inline]
    pub fn total_index_count(&self) -> u32 {
        self.quad_count * 6
    }
}

// ── renderer ──────────────────────────────────────────────────────────────

/// Batching quad renderer.
///
/// Quads drawn between [`begin_scene`](Self::begin_scene) and
/// [`end_scene`](Self::end_scene) are packed into one CPU staging array and
/// submitted with as few indexed draws as capacity allows. A batch is flushed
/// early when it runs out of quads or texture slots.
pub struct Renderer2D {
    backend: Box<dyn RenderBackend>,
    config: Renderer2DConfig,

    staging: Vec<QuadVertex>,
    vertex_cursor: usize,
    quad_index_count: u32,

    white_texture: Texture2D,
    /// `texture_slots[0]` is always the white texture; the length is the slot cursor.
    texture_slots: Vec<Texture2D>,

    stats: Renderer2DStats,
    in_scene: bool,
}

impl Renderer2D {
    pub fn new(mut backend: Box<dyn RenderBackend>, config: Renderer2DConfig) -> Result<Self> {
        crate::profile_scope!("Renderer2D::new");

        config
            .validate(backend.max_texture_slots())
            .context("invalid renderer configuration")?;

        let max_vertices = config.max_vertices();
        backend
            .create_vertex_buffer(&QuadVertex::layout(), max_vertices)
            .context("failed to create quad vertex buffer")?;
        backend
            .upload_index_pattern(&quad_index_pattern(config.max_quads))
            .context("failed to upload quad index buffer")?;

        let white_texture = backend
            .create_texture(1, 1)
            .context("failed to create white texture")?;
        backend.set_texture_data(&white_texture, &[0xff; 4])?;

        let mut texture_slots = Vec::with_capacity(config.max_texture_slots as usize);
        texture_slots.push(white_texture);

        log::debug!(
            "renderer2d: {} quads/batch, {} texture slots",
            config.max_quads,
            config.max_texture_slots
        );

        Ok(Self {
            backend,
            config,
            staging: vec![QuadVertex::default(); max_vertices as usize],
            vertex_cursor: 0,
            quad_index_count: 0,
            white_texture,
            texture_slots,
            stats: Renderer2DStats::default(),
            in_scene: false,
        })
    }

    #[inline]
    pub fn config(&self) -> &Renderer2DConfig {
        &self.config
    }

    /// The 1×1 white texture bound to slot 0.
    #[inline]
    pub fn white_texture(&self) -> &Texture2D {
        &self.white_texture
    }

    // ── render commands ───────────────────────────────────────────────────

    pub fn set_clear_color(&mut self, color: Color) {
        self.backend.set_clear_color(color);
    }

    pub fn clear(&mut self) {
        self.backend.clear();
    }

    pub fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.backend.set_viewport(x, y, width, height);
    }

    /// Forwards a new drawable size to the backend viewport.
    pub fn on_window_resize(&mut self, width: u32, height: u32) {
        self.set_viewport(0, 0, width, height);
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub fn create_texture(&mut self, width: u32, height: u32) -> Result<Texture2D> {
        anyhow::ensure!(width > 0 && height > 0, "texture size {width}x{height} is empty");
        self.backend.create_texture(width, height)
    }

    /// Replaces the texture's pixels. `data` must hold exactly
    /// `width * height` RGBA8 texels.
    pub fn set_texture_data(&mut self, texture: &Texture2D, data: &[u8]) -> Result<()> {
        anyhow::ensure!(
            data.len() == texture.byte_len(),
            "texture data for {} is {} bytes, expected {}",
            texture.id(),
            data.len(),
            texture.byte_len()
        );
        self.backend.set_texture_data(texture, data)
    }

    /// Creates a texture and fills it with `pixels`.
    pub fn create_texture_with_data(&mut self, width: u32, height: u32, pixels: &[u8]) -> Result<Texture2D> {
        let texture = self.create_texture(width, height)?;
        self.set_texture_data(&texture, pixels)?;
        Ok(texture)
    }

    /// Frees `texture`. Inside a scene, a batch that samples it is drawn
    /// first. The handle must not be drawn with afterwards.
    pub fn destroy_texture(&mut self, texture: &Texture2D) -> Result<()> {
        anyhow::ensure!(
            *texture != self.white_texture,
            "the white texture is owned by the renderer"
        );

        if self.in_scene && self.texture_slots[1..].contains(texture) {
            self.next_batch();
        }
        self.backend.destroy_texture(texture);
        Ok(())
    }

    /// Decodes an image file into a new texture.
    pub fn load_texture(&mut self, path: impl AsRef<Path>) -> Result<Texture2D> {
        let path = path.as_ref();
        let image = ImageData::load(path)?;
        let texture = self
            .create_texture_with_data(image.width, image.height, &image.pixels)
            .with_context(|| format!("failed to upload texture {}", path.display()))?;

        log::debug!("loaded {} ({}x{}) as {}", path.display(), image.width, image.height, texture.id());
        Ok(texture)
    }

    // ── scene ─────────────────────────────────────────────────────────────

    pub fn begin_scene(&mut self, camera: &OrthographicCamera) {
        crate::profile_scope!("Renderer2D::begin_scene");
        debug_assert!(!self.in_scene, "begin_scene called twice without end_scene");
        self.in_scene = true;

        self.backend.set_view_projection(&camera.view_projection());
        self.start_batch();
    }

    /// Uploads and draws whatever the current batch holds.
    pub fn end_scene(&mut self) {
        crate::profile_scope!("Renderer2D::end_scene");
        self.submit_batch();
        self.in_scene = false;
    }

    /// Draws the uploaded batch, if it holds any quads.
    pub fn flush(&mut self) {
        if self.quad_index_count == 0 {
            return;
        }
        crate::profile_scope!("Renderer2D::flush");

        self.backend.bind_textures(&self.texture_slots);
        self.backend.draw_indexed(self.quad_index_count);
        self.stats.draw_calls += 1;
    }

    fn start_batch(&mut self) {
        self.vertex_cursor = 0;
        self.quad_index_count = 0;
        self.texture_slots.clear();
        self.texture_slots.push(self.white_texture);
    }

    fn submit_batch(&mut self) {
        if self.vertex_cursor > 0 {
            let written = &self.staging[..self.vertex_cursor];
            self.backend.upload_vertices(bytemuck::cast_slice(written));
        }
        self.flush();
    }

    fn next_batch(&mut self) {
        self.submit_batch();
        self.start_batch();
    }

    fn ensure_quad_capacity(&mut self) {
        if self.quad_index_count >= self.config.max_indices() {
            self.next_batch();
        }
    }

    /// Slot index for `texture` in the current batch, flushing first when the
    /// slot table is full and `texture` is not already in it.
    fn texture_slot(&mut self, texture: &Texture2D) -> f32 {
        if let Some(slot) = self.texture_slots[1..].iter().position(|t| t == texture) {
            return (slot + 1) as f32;
        }

        let max_slots = self.config.max_texture_slots as usize;
        if self.texture_slots.len() >= max_slots {
            self.next_batch();
        }

        if self.texture_slots.len() >= max_slots {
            log::error!("texture slot table still full after flush ({max_slots} slots)");
            panic!("renderer2d: no free texture slot for {}", texture.id());
        }

        self.texture_slots.push(*texture);
        (self.texture_slots.len() - 1) as f32
    }

    fn push_quad(
        &mut self,
        transform: &Mat4,
        color: Color,
        tex_coords: &[Vec2; 4],
        tex_index: f32,
        tiling_factor: f32,
    ) {
        let color = color.to_array();
        let quad = &mut self.staging[self.vertex_cursor..self.vertex_cursor + 4];

        for ((vertex, corner), uv) in quad.iter_mut().zip(QUAD_CORNERS).zip(tex_coords) {
            *vertex = QuadVertex {
                position: transform.transform_point3(corner).to_array(),
                color,
                tex_coord: uv.to_array(),
                tex_index,
                tiling_factor,
            };
        }

        self.vertex_cursor += 4;
        self.quad_index_count += 6;
        self.stats.quad_count += 1;
    }

    // ── draw calls ────────────────────────────────────────────────────────

    /// Draws a solid quad centred on `position`.
    pub fn draw_quad(&mut self, position: impl IntoPosition, size: Vec2, color: Color) {
        let transform = quad_transform(position.into_position(), size, 0.0);
        self.draw_quad_transform(&transform, color);
    }

    /// Draws a solid quad rotated by `rotation` radians around its centre.
    pub fn draw_rotated_quad(&mut self, position: impl IntoPosition, size: Vec2, rotation: f32, color: Color) {
        let transform = quad_transform(position.into_position(), size, rotation);
        self.draw_quad_transform(&transform, color);
    }

    /// Draws the unit quad through an arbitrary transform.
    pub fn draw_quad_transform(&mut self, transform: &Mat4, color: Color) {
        self.ensure_quad_capacity();
        self.push_quad(transform, color, &FULL_TEX_COORDS, WHITE_SLOT, 1.0);
    }

    pub fn draw_textured_quad(
        &mut self,
        position: impl IntoPosition,
        size: Vec2,
        texture: &Texture2D,
        params: QuadTexture,
    ) {
        let transform = quad_transform(position.into_position(), size, 0.0);
        self.draw_textured_transform(&transform, texture, &FULL_TEX_COORDS, params);
    }

    pub fn draw_rotated_textured_quad(
        &mut self,
        position: impl IntoPosition,
        size: Vec2,
        rotation: f32,
        texture: &Texture2D,
        params: QuadTexture,
    ) {
        let transform = quad_transform(position.into_position(), size, rotation);
        self.draw_textured_transform(&transform, texture, &FULL_TEX_COORDS, params);
    }

    pub fn draw_sub_texture(
        &mut self,
        position: impl IntoPosition,
        size: Vec2,
        sub_texture: &SubTexture2D,
        params: QuadTexture,
    ) {
        let transform = quad_transform(position.into_position(), size, 0.0);
        self.draw_textured_transform(&transform, sub_texture.texture(), sub_texture.tex_coords(), params);
    }

    pub fn draw_rotated_sub_texture(
        &mut self,
        position: impl IntoPosition,
        size: Vec2,
        rotation: f32,
        sub_texture: &SubTexture2D,
        params: QuadTexture,
    ) {
        let transform = quad_transform(position.into_position(), size, rotation);
        self.draw_textured_transform(&transform, sub_texture.texture(), sub_texture.tex_coords(), params);
    }

    fn draw_textured_transform(
        &mut self,
        transform: &Mat4,
        texture: &Texture2D,
        tex_coords: &[Vec2; 4],
        params: QuadTexture,
    ) {
        self.ensure_quad_capacity();
        let slot = self.texture_slot(texture);
        self.push_quad(transform, params.tint, tex_coords, slot, params.tiling_factor);
    }

    // ── statistics ────────────────────────────────────────────────────────

    pub fn reset_stats(&mut self) {
        self.stats = Renderer2DStats::default();
    }

    #[inline]
    pub fn stats(&self) -> Renderer2DStats {
        self.stats
    }
}

fn quad_transform(position: Vec3, size: Vec2, rotation: f32) -> Mat4 {
    let scale = Mat4::from_scale(size.extend(1.0));
    if rotation == 0.0 {
        Mat4::from_translation(position) * scale
    } else {
        Mat4::from_translation(position) * Mat4::from_rotation_z(rotation) * scale
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::render::backend::{BackendCall, RecordingBackend};
    use crate::render::texture::TextureId;

    type Calls = Rc<RefCell<Vec<BackendCall>>>;

    fn renderer(max_quads: u32, max_texture_slots: u32) -> (Renderer2D, Calls) {
        let (backend, calls) = RecordingBackend::new(16);
        let config = Renderer2DConfig { max_quads, max_texture_slots };
        let renderer = Renderer2D::new(Box::new(backend), config).unwrap();
        calls.borrow_mut().clear();
        (renderer, calls)
    }

    fn camera() -> OrthographicCamera {
        OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0)
    }

    fn draws(calls: &Calls) -> Vec<u32> {
        calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                BackendCall::DrawIndexed(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    fn bound_slots(calls: &Calls) -> Vec<Vec<TextureId>> {
        bound_slots_in(&calls.borrow())
    }

    fn bound_slots_in(calls: &[BackendCall]) -> Vec<Vec<TextureId>> {
        calls
            .iter()
            .filter_map(|c| match c {
                BackendCall::BindTextures(ids) => Some(ids.clone()),
                _ => None,
            })
            .collect()
    }

    fn uploads(calls: &Calls) -> Vec<usize> {
        calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                BackendCall::UploadVertices { len } => Some(*len),
                _ => None,
            })
            .collect()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_prepares_buffers_and_white_texture() {
        let (backend, calls) = RecordingBackend::new(16);
        let r = Renderer2D::new(Box::new(backend), Renderer2DConfig { max_quads: 2, max_texture_slots: 4 })
            .unwrap();

        let calls = calls.borrow();
        assert_eq!(calls[0], BackendCall::CreateVertexBuffer { stride: 44, max_vertices: 8 });
        assert_eq!(
            calls[1],
            BackendCall::UploadIndexPattern(vec![0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4])
        );
        assert_eq!(calls[2], BackendCall::CreateTexture { width: 1, height: 1 });
        assert_eq!(calls[3], BackendCall::SetTextureData { texture: r.white_texture().id(), len: 4 });
    }

    #[test]
    fn config_rejects_more_slots_than_backend_offers() {
        let (backend, _) = RecordingBackend::new(8);
        let config = Renderer2DConfig { max_quads: 10, max_texture_slots: 16 };
        let err = Renderer2D::new(Box::new(backend), config).err().unwrap();
        assert!(format!("{err:#}").contains("exceeds the backend limit"));
    }

    #[test]
    fn config_rejects_degenerate_values() {
        for config in [
            Renderer2DConfig { max_quads: 0, max_texture_slots: 4 },
            Renderer2DConfig { max_quads: 4, max_texture_slots: 1 },
        ] {
            let (backend, _) = RecordingBackend::new(16);
            assert!(Renderer2D::new(Box::new(backend), config).is_err());
        }
    }

    #[test]
    fn vertex_layout_matches_struct() {
        assert_eq!(QuadVertex::layout().stride() as usize, std::mem::size_of::<QuadVertex>());
    }

    // ── batching ──────────────────────────────────────────────────────────

    #[test]
    fn quads_within_capacity_use_one_draw() {
        let (mut r, calls) = renderer(100, 16);
        r.begin_scene(&camera());
        for i in 0..40 {
            r.draw_quad(Vec2::new(i as f32, 0.0), Vec2::ONE, Color::WHITE);
        }
        r.end_scene();

        assert_eq!(draws(&calls), [240]);
        assert_eq!(uploads(&calls), [40 * 4 * 44]);
        assert_eq!(r.stats(), Renderer2DStats { draw_calls: 1, quad_count: 40 });
        assert_eq!(r.stats().total_vertex_count(), 160);
        assert_eq!(r.stats().total_index_count(), 240);
    }

    #[test]
    fn overflow_splits_into_ceil_batches() {
        let (mut r, calls) = renderer(10, 16);
        r.begin_scene(&camera());
        for _ in 0..25 {
            r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::BLACK);
        }
        r.end_scene();

        let drawn = draws(&calls);
        assert_eq!(drawn, [60, 60, 30]);
        assert_eq!(drawn.iter().sum::<u32>(), 25 * 6);
        assert_eq!(r.stats().draw_calls, 3);
        assert_eq!(r.stats().quad_count, 25);
    }

    #[test]
    fn exact_capacity_flushes_once() {
        let (mut r, calls) = renderer(10, 16);
        r.begin_scene(&camera());
        for _ in 0..10 {
            r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::BLACK);
        }
        r.end_scene();
        assert_eq!(draws(&calls), [60]);
    }

    #[test]
    fn overflow_does_not_reupload_camera() {
        let (mut r, calls) = renderer(1, 16);
        r.begin_scene(&camera());
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::BLACK);
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::BLACK);
        r.end_scene();

        let vp_uploads = calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, BackendCall::SetViewProjection(_)))
            .count();
        assert_eq!(vp_uploads, 1);
    }

    #[test]
    fn empty_scene_draws_nothing() {
        let (mut r, calls) = renderer(10, 16);
        r.begin_scene(&camera());
        r.end_scene();

        assert!(draws(&calls).is_empty());
        assert!(uploads(&calls).is_empty());
        assert_eq!(r.stats(), Renderer2DStats::default());
    }

    #[test]
    fn flush_without_quads_is_a_no_op() {
        let (mut r, calls) = renderer(10, 16);
        r.flush();
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn begin_scene_uploads_camera_view_projection() {
        let (mut r, calls) = renderer(10, 16);
        let cam = OrthographicCamera::new(-4.0, 4.0, -2.0, 2.0);
        r.begin_scene(&cam);
        r.end_scene();
        assert_eq!(calls.borrow()[0], BackendCall::SetViewProjection(cam.view_projection()));
    }

    #[test]
    fn stats_accumulate_across_scenes_until_reset() {
        let (mut r, _) = renderer(10, 16);
        for _ in 0..2 {
            r.begin_scene(&camera());
            r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::WHITE);
            r.end_scene();
        }
        assert_eq!(r.stats(), Renderer2DStats { draw_calls: 2, quad_count: 2 });

        r.reset_stats();
        assert_eq!(r.stats(), Renderer2DStats::default());
    }

    // ── texture slots ─────────────────────────────────────────────────────

    #[test]
    fn repeated_texture_shares_one_slot() {
        let (mut r, calls) = renderer(100, 16);
        let tex = r.create_texture(2, 2).unwrap();
        let white = r.white_texture().id();

        r.begin_scene(&camera());
        for _ in 0..5 {
            r.draw_textured_quad(Vec2::ZERO, Vec2::ONE, &tex, QuadTexture::default());
        }
        r.end_scene();

        assert_eq!(bound_slots(&calls), [vec![white, tex.id()]]);
    }

    #[test]
    fn slot_exhaustion_flushes_before_assigning_slot_one() {
        let (mut r, calls) = renderer(100, 4);
        let textures: Vec<Texture2D> = (0..4).map(|_| r.create_texture(1, 1).unwrap()).collect();
        let white = r.white_texture().id();

        r.begin_scene(&camera());
        for tex in &textures {
            r.draw_textured_quad(Vec2::ZERO, Vec2::ONE, tex, QuadTexture::default());
        }
        r.end_scene();

        assert_eq!(
            bound_slots(&calls),
            [
                vec![white, textures[0].id(), textures[1].id(), textures[2].id()],
                vec![white, textures[3].id()],
            ]
        );
        assert_eq!(draws(&calls), [18, 6]);
        assert_eq!(r.stats().draw_calls, 2);
    }

    #[test]
    fn textured_vertices_carry_slot_tiling_and_tint() {
        let (mut r, _) = renderer(4, 16);
        let tex = r.create_texture(1, 1).unwrap();
        let tint = Color::new(0.9, 1.0, 0.9, 1.0);

        r.begin_scene(&camera());
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::BLACK);
        r.draw_textured_quad(Vec3::new(0.0, 0.0, -0.1), Vec2::ONE, &tex, QuadTexture::tiled(10.0).tinted(tint));

        let flat = r.staging[0];
        assert_eq!(flat.tex_index, 0.0);
        assert_eq!(flat.tiling_factor, 1.0);

        let textured = r.staging[4];
        assert_eq!(textured.tex_index, 1.0);
        assert_eq!(textured.tiling_factor, 10.0);
        assert_eq!(textured.color, tint.to_array());
        assert_eq!(textured.position[2], -0.1);
        r.end_scene();
    }

    #[test]
    fn sub_texture_uvs_reach_vertices() {
        let (mut r, _) = renderer(4, 16);
        let tex = r.create_texture(256, 256).unwrap();
        let sub = SubTexture2D::from_coords(tex, Vec2::new(1.0, 0.0), Vec2::splat(128.0), Vec2::ONE);

        r.begin_scene(&camera());
        r.draw_sub_texture(Vec2::ZERO, Vec2::ONE, &sub, QuadTexture::default());

        let uvs: Vec<[f32; 2]> = r.staging[..4].iter().map(|v| v.tex_coord).collect();
        assert_eq!(uvs, [[0.5, 0.0], [1.0, 0.0], [1.0, 0.5], [0.5, 0.5]]);
        r.end_scene();
    }

    // ── geometry ──────────────────────────────────────────────────────────

    #[test]
    fn quad_corners_are_centred_and_scaled() {
        let (mut r, _) = renderer(4, 16);
        r.begin_scene(&camera());
        r.draw_quad(Vec2::new(1.0, 2.0), Vec2::new(2.0, 4.0), Color::WHITE);

        let corners: Vec<[f32; 3]> = r.staging[..4].iter().map(|v| v.position).collect();
        assert_eq!(
            corners,
            [[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [2.0, 4.0, 0.0], [0.0, 4.0, 0.0]]
        );
        r.end_scene();
    }

    #[test]
    fn rotated_quad_turns_about_its_centre() {
        let (mut r, _) = renderer(4, 16);
        r.begin_scene(&camera());
        r.draw_rotated_quad(Vec2::ZERO, Vec2::ONE, std::f32::consts::FRAC_PI_2, Color::WHITE);

        // Bottom-left corner swings to bottom-right.
        let p = r.staging[0].position;
        assert!((p[0] - 0.5).abs() < 1e-6 && (p[1] + 0.5).abs() < 1e-6);
        r.end_scene();
    }

    #[test]
    fn index_pattern_shares_diagonal() {
        assert_eq!(quad_index_pattern(2), [0, 1, 2, 2, 3, 0, 4, 5, 6, 6, 7, 4]);
        assert_eq!(quad_index_pattern(1000).len(), 6000);
    }

    // ── textures ──────────────────────────────────────────────────────────

    #[test]
    fn set_texture_data_checks_length() {
        let (mut r, _) = renderer(4, 16);
        let tex = r.create_texture(2, 2).unwrap();
        assert!(r.set_texture_data(&tex, &[0; 16]).is_ok());
        assert!(r.set_texture_data(&tex, &[0; 15]).is_err());
    }

    #[test]
    fn destroy_texture_releases_backend_storage() {
        let (mut r, calls) = renderer(4, 16);
        let tex = r.create_texture(2, 2).unwrap();
        calls.borrow_mut().clear();

        r.destroy_texture(&tex).unwrap();
        assert_eq!(*calls.borrow(), [BackendCall::DestroyTexture(tex.id())]);
    }

    #[test]
    fn destroy_texture_refuses_white_texture() {
        let (mut r, calls) = renderer(4, 16);
        let white = *r.white_texture();
        assert!(r.destroy_texture(&white).is_err());
        assert!(calls.borrow().is_empty());
    }

    #[test]
    fn destroying_a_batched_texture_draws_the_batch_first() {
        let (mut r, calls) = renderer(8, 16);
        let tex = r.create_texture(1, 1).unwrap();
        let white = r.white_texture().id();

        r.begin_scene(&camera());
        r.draw_textured_quad(Vec2::ZERO, Vec2::ONE, &tex, QuadTexture::default());
        r.destroy_texture(&tex).unwrap();
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::WHITE);
        r.end_scene();

        let calls = calls.borrow();
        let destroyed = calls
            .iter()
            .position(|c| *c == BackendCall::DestroyTexture(tex.id()))
            .unwrap();
        let first_draw = calls
            .iter()
            .position(|c| *c == BackendCall::DrawIndexed(6))
            .unwrap();
        assert!(first_draw < destroyed);
        assert_eq!(bound_slots_in(&calls), [vec![white, tex.id()], vec![white]]);
    }

    #[test]
    fn destroying_an_unbatched_texture_keeps_the_batch() {
        let (mut r, calls) = renderer(8, 16);
        let tex = r.create_texture(1, 1).unwrap();

        r.begin_scene(&camera());
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::WHITE);
        r.destroy_texture(&tex).unwrap();
        r.draw_quad(Vec2::ZERO, Vec2::ONE, Color::WHITE);
        r.end_scene();

        assert_eq!(draws(&calls), [12]);
    }

    #[test]
    fn create_texture_rejects_empty_size() {
        let (mut r, _) = renderer(4, 16);
        assert!(r.create_texture(0, 4).is_err());
    }
}
