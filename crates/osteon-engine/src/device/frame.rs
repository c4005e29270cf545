/// One offscreen frame in flight: the target view plus an encoder.
///
/// Short-lived; hand it back to [`Gpu::submit`](super::Gpu::submit) promptly.
pub struct GpuFrame {
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
