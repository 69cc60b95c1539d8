//! Batched 2D rendering.
//!
//! [`Renderer2D`] turns quad draw calls into as few GPU draws as its batch
//! capacity allows. It talks to the GPU only through [`RenderBackend`];
//! [`WgpuBackend`] is the production implementation.
//!
//! Convention: world space is Y-up, quads are centred on their position, and
//! texture coordinate `(0, 0)` is the bottom-left of an image.

pub mod backend;
pub mod camera;
pub mod camera_controller;
pub mod layout;
mod renderer2d;
pub mod texture;
mod wgpu_backend;

pub use backend::RenderBackend;
pub use camera::OrthographicCamera;
pub use camera_controller::{CameraBounds, OrthographicCameraController};
pub use layout::{BufferElement, BufferLayout, ShaderDataType};
pub use renderer2d::{
    quad_index_pattern,
    IntoPosition,
    QuadTexture,
    QuadVertex,
    Renderer2D,
    Renderer2DConfig,
    Renderer2DStats,
};
pub use texture::{ImageData, SubTexture2D, Texture2D, TextureId};
pub use wgpu_backend::{SurfaceTarget, WgpuBackend, WGPU_TEXTURE_SLOTS};
