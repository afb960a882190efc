/// A single acquired wgpu frame.
///
/// Short-lived: it is created by `begin_frame`, recorded into by the passes and
/// consumed by `submit_frame`. Holding it blocks acquisition of the next
/// surface texture.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
