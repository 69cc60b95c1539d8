use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::rc::Rc;

use anyhow::{Context, Result};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::paint::Color;

use super::backend::RenderBackend;
use super::layout::BufferLayout;
use super::texture::{Texture2D, TextureId};

/// Texture bindings declared by `shaders/quad.wgsl`.
pub const WGPU_TEXTURE_SLOTS: u32 = 16;

const FIRST_TEXTURE_BINDING: u32 = 2;

const CAMERA_UBO_SIZE: NonZeroU64 = match NonZeroU64::new(std::mem::size_of::<[f32; 16]>() as u64) {
    Some(size) => size,
    None => panic!("camera uniform is empty"),
};

struct TargetView {
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

/// The color attachment the backend renders into this frame.
///
/// The runtime sets it after acquiring a swapchain image and clears it before
/// presenting; outside that window passes are skipped.
#[derive(Clone, Default)]
pub struct SurfaceTarget(Rc<RefCell<Option<TargetView>>>);

impl SurfaceTarget {
    pub fn set(&self, view: wgpu::TextureView, width: u32, height: u32) {
        *self.0.borrow_mut() = Some(TargetView { view, width, height });
    }

    pub fn clear(&self) {
        self.0.borrow_mut().take();
    }
}

struct GpuTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

struct QuadPipeline {
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
}

/// [`RenderBackend`] on top of wgpu.
///
/// Every `clear` and `draw_indexed` records and submits its own command
/// buffer. Buffer writes queued before a submit land before it, so vertex
/// uploads interleaved with several draws per frame stay correct.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    target: SurfaceTarget,

    bind_group_layout: wgpu::BindGroupLayout,
    camera_ubo: wgpu::Buffer,
    sampler: wgpu::Sampler,
    quad: Option<QuadPipeline>,
    index_buffer: Option<wgpu::Buffer>,

    textures: HashMap<TextureId, GpuTexture>,
    next_texture: u64,
    /// Bound to slots the current batch does not use.
    fallback: GpuTexture,
    bound: Vec<TextureId>,

    clear_color: Color,
    viewport: Option<(u32, u32, u32, u32)>,
}

impl WgpuBackend {
    pub fn new(
        device: wgpu::Device,
        queue: wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        target: SurfaceTarget,
    ) -> Self {
        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln quad bgl"),
            entries: &bind_group_layout_entries(),
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln camera ubo"),
            size: CAMERA_UBO_SIZE.get(),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kiln quad sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::MipmapFilterMode::Nearest,
            ..Default::default()
        });

        let fallback = create_gpu_texture(&device, 1, 1, "kiln fallback texture");
        write_texture(&queue, &fallback.texture, 1, 1, &[0xff; 4]);

        Self {
            device,
            queue,
            surface_format,
            target,
            bind_group_layout,
            camera_ubo,
            sampler,
            quad: None,
            index_buffer: None,
            textures: HashMap::new(),
            next_texture: 0,
            fallback,
            bound: Vec::new(),
            clear_color: Color::BLACK,
            viewport: None,
        }
    }

    fn build_pipeline(&self, layout: &BufferLayout) -> wgpu::RenderPipeline {
        let shader = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("kiln quad shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/quad.wgsl").into()),
        });

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln quad pipeline layout"),
            bind_group_layouts: &[&self.bind_group_layout],
            immediate_size: 0,
        });

        let attributes = layout.vertex_attributes();
        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: u64::from(layout.stride()),
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        };

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("kiln quad pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[vertex_layout],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        })
    }

    fn texture_view(&self, slot: usize) -> &wgpu::TextureView {
        self.bound
            .get(slot)
            .and_then(|id| self.textures.get(id))
            .map_or(&self.fallback.view, |t| &t.view)
    }

    fn bind_group(&self) -> wgpu::BindGroup {
        let mut entries = Vec::with_capacity(FIRST_TEXTURE_BINDING as usize + WGPU_TEXTURE_SLOTS as usize);
        entries.push(wgpu::BindGroupEntry {
            binding: 0,
            resource: self.camera_ubo.as_entire_binding(),
        });
        entries.push(wgpu::BindGroupEntry {
            binding: 1,
            resource: wgpu::BindingResource::Sampler(&self.sampler),
        });
        for slot in 0..WGPU_TEXTURE_SLOTS {
            entries.push(wgpu::BindGroupEntry {
                binding: FIRST_TEXTURE_BINDING + slot,
                resource: wgpu::BindingResource::TextureView(self.texture_view(slot as usize)),
            });
        }

        self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln quad bind group"),
            layout: &self.bind_group_layout,
            entries: &entries,
        })
    }

    /// Viewport clamped to the target; `None` when nothing is visible.
    fn effective_viewport(&self, target: &TargetView) -> Option<(f32, f32, f32, f32)> {
        let (x, y, w, h) = self.viewport.unwrap_or((0, 0, target.width, target.height));
        let x = x.min(target.width);
        let y = y.min(target.height);
        let w = w.min(target.width - x);
        let h = h.min(target.height - y);
        if w == 0 || h == 0 {
            return None;
        }
        Some((x as f32, y as f32, w as f32, h as f32))
    }

    fn submit_pass(&self, label: &str, load: wgpu::LoadOp<wgpu::Color>, draw: impl FnOnce(&mut wgpu::RenderPass<'_>)) {
        let target = self.target.0.borrow();
        let Some(target) = target.as_ref() else {
            log::debug!("{label}: no render target bound, skipped");
            return;
        };

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some(label),
        });

        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some(label),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            if let Some((x, y, w, h)) = self.effective_viewport(target) {
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);
                draw(&mut rpass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

impl RenderBackend for WgpuBackend {
    fn max_texture_slots(&self) -> u32 {
        WGPU_TEXTURE_SLOTS
    }

    fn create_texture(&mut self, width: u32, height: u32) -> Result<Texture2D> {
        let limit = self.device.limits().max_texture_dimension_2d;
        anyhow::ensure!(
            width <= limit && height <= limit,
            "texture {width}x{height} exceeds device limit {limit}"
        );

        let id = TextureId::from_raw(self.next_texture);
        self.next_texture += 1;

        let gpu = create_gpu_texture(&self.device, width, height, "kiln texture");
        self.textures.insert(id, gpu);
        Ok(Texture2D::new(id, width, height))
    }

    fn set_texture_data(&mut self, texture: &Texture2D, data: &[u8]) -> Result<()> {
        crate::profile_scope!("WgpuBackend::set_texture_data");

        let gpu = self
            .textures
            .get(&texture.id())
            .with_context(|| format!("{} is not a texture of this backend", texture.id()))?;
        write_texture(&self.queue, &gpu.texture, texture.width(), texture.height(), data);
        Ok(())
    }

    fn destroy_texture(&mut self, texture: &Texture2D) {
        let Some(gpu) = self.textures.remove(&texture.id()) else {
            log::debug!("destroy_texture: {} already gone", texture.id());
            return;
        };
        self.bound.retain(|id| *id != texture.id());
        gpu.texture.destroy();
    }

    fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
    }

    fn clear(&mut self) {
        crate::profile_scope!("WgpuBackend::clear");
        self.submit_pass("kiln clear", wgpu::LoadOp::Clear(self.clear_color.to_wgpu()), |_| {});
    }

    fn set_viewport(&mut self, x: u32, y: u32, width: u32, height: u32) {
        self.viewport = Some((x, y, width, height));
    }

    fn create_vertex_buffer(&mut self, layout: &BufferLayout, max_vertices: u32) -> Result<()> {
        anyhow::ensure!(layout.stride() > 0, "vertex layout is empty");

        let size = u64::from(layout.stride()) * u64::from(max_vertices);
        anyhow::ensure!(
            size <= self.device.limits().max_buffer_size,
            "vertex buffer of {size} bytes exceeds device limit"
        );

        let vertex_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("kiln quad vbo"),
            size,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        self.quad = Some(QuadPipeline {
            pipeline: self.build_pipeline(layout),
            vertex_buffer,
        });
        Ok(())
    }

    fn upload_index_pattern(&mut self, indices: &[u32]) -> Result<()> {
        anyhow::ensure!(!indices.is_empty(), "index pattern is empty");
        self.index_buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("kiln quad ibo"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
        Ok(())
    }

    fn upload_vertices(&mut self, bytes: &[u8]) {
        let Some(quad) = self.quad.as_ref() else {
            log::warn!("upload_vertices before create_vertex_buffer, ignored");
            return;
        };
        self.queue.write_buffer(&quad.vertex_buffer, 0, bytes);
    }

    fn set_view_projection(&mut self, view_projection: &Mat4) {
        self.queue
            .write_buffer(&self.camera_ubo, 0, bytemuck::cast_slice(&view_projection.to_cols_array()));
    }

    fn bind_textures(&mut self, textures: &[Texture2D]) {
        self.bound.clear();
        self.bound.extend(textures.iter().take(WGPU_TEXTURE_SLOTS as usize).map(|t| t.id()));
    }

    fn draw_indexed(&mut self, index_count: u32) {
        crate::profile_scope!("WgpuBackend::draw_indexed");

        let (Some(quad), Some(index_buffer)) = (self.quad.as_ref(), self.index_buffer.as_ref()) else {
            log::warn!("draw_indexed before buffers exist, skipped");
            return;
        };

        let bind_group = self.bind_group();
        self.submit_pass("kiln quad pass", wgpu::LoadOp::Load, |rpass| {
            rpass.set_pipeline(&quad.pipeline);
            rpass.set_bind_group(0, &bind_group, &[]);
            rpass.set_vertex_buffer(0, quad.vertex_buffer.slice(..));
            rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..index_count, 0, 0..1);
        });
    }
}

fn bind_group_layout_entries() -> Vec<wgpu::BindGroupLayoutEntry> {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(CAMERA_UBO_SIZE),
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];

    entries.extend((0..WGPU_TEXTURE_SLOTS).map(|slot| wgpu::BindGroupLayoutEntry {
        binding: FIRST_TEXTURE_BINDING + slot,
        visibility: wgpu::ShaderStages::FRAGMENT,
        ty: wgpu::BindingType::Texture {
            sample_type: wgpu::TextureSampleType::Float { filterable: true },
            view_dimension: wgpu::TextureViewDimension::D2,
            multisampled: false,
        },
        count: None,
    }));

    entries
}

fn create_gpu_texture(device: &wgpu::Device, width: u32, height: u32, label: &str) -> GpuTexture {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8UnormSrgb,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    GpuTexture { texture, view }
}

fn write_texture(queue: &wgpu::Queue, texture: &wgpu::Texture, width: u32, height: u32, data: &[u8]) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(width * Texture2D::BYTES_PER_PIXEL),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}
