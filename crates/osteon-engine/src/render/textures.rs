use std::collections::{HashMap, HashSet};

use crate::texture::{TextureId, TextureRegistry};

use super::RenderCtx;

struct GpuPage {
    _texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
    generation: u64,
}

/// Whether a page uploaded at `uploaded` must be (re)uploaded for `current`.
fn needs_upload(uploaded: Option<u64>, current: u64) -> bool {
    uploaded != Some(current)
}

/// GPU copies of registry pages, uploaded on first use.
///
/// A `TextureId` maps to at most one GPU texture at a time. Re-registering a path in
/// the registry replaces that texture on the next [`ensure`](Self::ensure).
#[derive(Default)]
pub(super) struct GpuTextures {
    sampler: Option<wgpu::Sampler>,
    pages: HashMap<TextureId, GpuPage>,
    warned_missing: HashSet<TextureId>,
}

impl GpuTextures {
    /// Drops bind groups built against an old layout.
    pub fn invalidate(&mut self) {
        self.pages.clear();
    }

    pub fn bind_group(&self, id: TextureId) -> Option<&wgpu::BindGroup> {
        self.pages.get(&id).map(|p| &p.bind_group)
    }

    /// Uploads `id` from `registry` unless the resident copy is current. Returns whether
    /// it is resident.
    pub fn ensure(
        &mut self,
        ctx: &RenderCtx<'_>,
        layout: &wgpu::BindGroupLayout,
        registry: &TextureRegistry,
        id: TextureId,
    ) -> bool {
        let Some((image, generation)) = registry.versioned_image(id) else {
            if self.warned_missing.insert(id) {
                log::debug!("texture {id:?} has no pixels in the registry; draws skipped");
            }
            return false;
        };
        if !needs_upload(self.pages.get(&id).map(|p| p.generation), generation) {
            return true;
        }

        let sampler = self.sampler.get_or_insert_with(|| {
            ctx.device.create_sampler(&wgpu::SamplerDescriptor {
                label: Some("osteon page sampler"),
                address_mode_u: wgpu::AddressMode::ClampToEdge,
                address_mode_v: wgpu::AddressMode::ClampToEdge,
                address_mode_w: wgpu::AddressMode::ClampToEdge,
                mag_filter: wgpu::FilterMode::Linear,
                min_filter: wgpu::FilterMode::Linear,
                mipmap_filter: wgpu::MipmapFilterMode::Nearest,
                ..Default::default()
            })
        });

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("osteon page"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 4),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("osteon page bind group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        log::debug!(
            "uploaded texture {id:?} ({}x{}, generation {generation})",
            image.width,
            image.height
        );
        self.pages.insert(
            id,
            GpuPage {
                _texture: texture,
                bind_group,
                generation,
            },
        );
        true
    }
}
