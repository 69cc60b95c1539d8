use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use glam::Vec2;

/// Backend-assigned texture identity.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TextureId(u64);

impl TextureId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

/// Handle to an RGBA8 texture living in a [`RenderBackend`](super::RenderBackend).
///
/// Cheap to copy. Two handles are equal when they name the same backend
/// texture; this is what slot deduplication compares.
#[derive(Debug, Copy, Clone)]
pub struct Texture2D {
    id: TextureId,
    width: u32,
    height: u32,
}

impl Texture2D {
    /// Bytes per pixel of every texture the renderer creates.
    pub const BYTES_PER_PIXEL: u32 = 4;

    pub const fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    #[inline]
    pub fn id(&self) -> TextureId {
        self.id
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Expected length of a full `set_data` upload.
    #[inline]
    pub fn byte_len(&self) -> usize {
        self.width as usize * self.height as usize * Self::BYTES_PER_PIXEL as usize
    }
}

impl PartialEq for Texture2D {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Texture2D {}

/// A rectangular region of a texture, typically one sprite of an atlas.
///
/// Texture coordinates wind counter-clockwise from the bottom-left corner,
/// matching the quad corner order used by the renderer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SubTexture2D {
    texture: Texture2D,
    tex_coords: [Vec2; 4],
}

impl SubTexture2D {
    pub fn new(texture: Texture2D, min: Vec2, max: Vec2) -> Self {
        Self {
            texture,
            tex_coords: [
                Vec2::new(min.x, min.y),
                Vec2::new(max.x, min.y),
                Vec2::new(max.x, max.y),
                Vec2::new(min.x, max.y),
            ],
        }
    }

    /// Region spanning `sprite_size` cells starting at cell `coords`, where the
    /// atlas is a grid of `cell_size` pixel cells counted from the bottom-left.
    pub fn from_coords(texture: Texture2D, coords: Vec2, cell_size: Vec2, sprite_size: Vec2) -> Self {
        let tex_size = texture.size();
        let min = coords * cell_size / tex_size;
        let max = (coords + sprite_size) * cell_size / tex_size;
        Self::new(texture, min, max)
    }

    #[inline]
    pub fn texture(&self) -> &Texture2D {
        &self.texture
    }

    #[inline]
    pub fn tex_coords(&self) -> &[Vec2; 4] {
        &self.tex_coords
    }
}

/// Decoded RGBA8 pixels ready for upload.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl ImageData {
    /// Decodes a PNG or JPEG file.
    ///
    /// Rows are flipped so the first row in memory is the bottom of the image,
    /// which puts UV `(0, 0)` at the bottom-left like the quad corners.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .with_context(|| format!("failed to decode image {}", path.display()))?;

        let rgba = decoded.flipv().into_rgba8();
        let (width, height) = rgba.dimensions();
        anyhow::ensure!(width > 0 && height > 0, "image {} is empty", path.display());

        Ok(Self {
            width,
            height,
            pixels: rgba.into_raw(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atlas() -> Texture2D {
        Texture2D::new(TextureId::from_raw(7), 2560, 1664)
    }

    #[test]
    fn equality_is_by_identity() {
        let a = Texture2D::new(TextureId::from_raw(1), 4, 4);
        let b = Texture2D::new(TextureId::from_raw(1), 8, 8);
        let c = Texture2D::new(TextureId::from_raw(2), 4, 4);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.byte_len(), 64);
    }

    #[test]
    fn sub_texture_uv_winding() {
        let sub = SubTexture2D::new(atlas(), Vec2::new(0.1, 0.2), Vec2::new(0.3, 0.4));
        assert_eq!(
            sub.tex_coords(),
            &[
                Vec2::new(0.1, 0.2),
                Vec2::new(0.3, 0.2),
                Vec2::new(0.3, 0.4),
                Vec2::new(0.1, 0.4),
            ]
        );
    }

    #[test]
    fn from_coords_scales_cells_by_texture_size() {
        let sub = SubTexture2D::from_coords(
            atlas(),
            Vec2::new(2.0, 1.0),
            Vec2::new(128.0, 128.0),
            Vec2::new(1.0, 2.0),
        );
        let [min, _, max, _] = *sub.tex_coords();
        assert_eq!(min, Vec2::new(256.0 / 2560.0, 128.0 / 1664.0));
        assert_eq!(max, Vec2::new(384.0 / 2560.0, 384.0 / 1664.0));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ImageData::load("definitely/not/here.png").unwrap_err();
        assert!(err.to_string().contains("not/here.png"));
    }
}
