use anyhow::{Context, Result};

use super::Gpu;

#[derive(Debug, Clone)]
pub struct FramebufferConfig {
    pub width: u32,
    pub height: u32,
    /// Must be a 4-byte-per-texel format for readback.
    pub format: wgpu::TextureFormat,
}

impl Default for FramebufferConfig {
    fn default() -> Self {
        Self {
            width: 512,
            height: 512,
            format: wgpu::TextureFormat::Rgba8Unorm,
        }
    }
}

/// Offscreen color target that can be copied back to the CPU.
///
/// Contents are premultiplied alpha.
pub struct Framebuffer {
    texture: wgpu::Texture,
    config: FramebufferConfig,
}

impl Framebuffer {
    pub fn new(gpu: &Gpu, config: FramebufferConfig) -> Result<Self> {
        anyhow::ensure!(
            config.width > 0 && config.height > 0,
            "framebuffer has zero size ({}x{})",
            config.width,
            config.height
        );
        anyhow::ensure!(
            config.format.block_copy_size(None) == Some(4),
            "framebuffer format {:?} is not 4 bytes per texel",
            config.format
        );

        let texture = gpu.device().create_texture(&wgpu::TextureDescriptor {
            label: Some("osteon framebuffer"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        Ok(Self { texture, config })
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn create_view(&self) -> wgpu::TextureView {
        self.texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Copies the current contents into tightly packed RGBA8 rows.
    ///
    /// Blocks until the GPU has finished the copy.
    pub fn read_rgba(&self, gpu: &Gpu) -> Result<Vec<u8>> {
        let (width, height) = self.size();
        let row_bytes = width
            .checked_mul(4)
            .context("framebuffer width overflow")?;
        let padded_row_bytes = align_to(row_bytes, wgpu::COPY_BYTES_PER_ROW_ALIGNMENT);

        let readback = gpu.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("osteon framebuffer readback"),
            size: padded_row_bytes as u64 * height as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = gpu
            .device()
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("osteon readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &readback,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_row_bytes),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        gpu.queue().submit(Some(encoder.finish()));

        let slice = readback.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        gpu.device()
            .poll(wgpu::PollType::wait_indefinitely())
            .context("wgpu poll failed during readback")?;
        rx.recv()
            .context("readback channel closed")?
            .context("readback buffer map failed")?;

        let mapped = slice.get_mapped_range();
        let mut out = Vec::with_capacity(row_bytes as usize * height as usize);
        for row in 0..height as usize {
            let start = row * padded_row_bytes as usize;
            out.extend_from_slice(&mapped[start..start + row_bytes as usize]);
        }
        drop(mapped);
        readback.unmap();

        Ok(out)
    }
}

fn align_to(value: u32, alignment: u32) -> u32 {
    let mask = alignment - 1;
    (value + mask) & !mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_align_to_copy_alignment() {
        assert_eq!(align_to(4, 256), 256);
        assert_eq!(align_to(256, 256), 256);
        assert_eq!(align_to(1028, 256), 1280);
    }
}
