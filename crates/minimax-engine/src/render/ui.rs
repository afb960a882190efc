use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Extent;
use crate::device::{GpuFrame, GraphicsDevice, WgpuDevice};
use crate::error::PassError;

use super::{PassInput, PassKind, RenderPass};

// ── blend ─────────────────────────────────────────────────────────────────

fn premul_alpha_blend() -> wgpu::BlendState {
    let component = wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
        operation: wgpu::BlendOperation::Add,
    };
    wgpu::BlendState {
        color: component,
        alpha: component,
    }
}

// ── gpu types ─────────────────────────────────────────────────────────────

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct ViewportUniform {
    size: [f32; 2],
    _pad: [f32; 2], // 16-byte alignment
}

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadVertex {
    corner: [f32; 2], // 0..1
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x2];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { corner: [0.0, 0.0] },
    QuadVertex { corner: [1.0, 0.0] },
    QuadVertex { corner: [1.0, 1.0] },
    QuadVertex { corner: [0.0, 1.0] },
];

const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// One quad in device pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct QuadInstance {
    origin: [f32; 2],
    size: [f32; 2],
    color: [f32; 4],
}

impl QuadInstance {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        1 => Float32x2, // origin
        2 => Float32x2, // size
        3 => Float32x4  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadInstance>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRS,
        }
    }
}

struct Resources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    viewport_ubo: wgpu::Buffer,
    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,
}

/// Composites the overlay over the geometry pass output.
///
/// Quads arrive in logical pixels and are scaled by the device-pixel-ratio
/// on the CPU, so the shader only ever sees device pixels.
#[derive(Default)]
pub struct UiPass {
    resources: Option<Resources>,
    size: Option<Extent>,

    instance_vbo: Option<wgpu::Buffer>,
    instance_capacity: usize,
}

impl UiPass {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_resources(device: &WgpuDevice) -> Resources {
        let gpu = device.device();

        let shader = gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("minimax ui shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/ui.wgsl").into()),
        });

        let bind_group_layout = gpu.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("minimax ui bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<ViewportUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = gpu.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("minimax ui pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("minimax ui pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout(), QuadInstance::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: device.surface_format(),
                    blend: Some(premul_alpha_blend()),
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
            // Draws into the resolved frame, never the multisampled target.
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        let viewport_ubo = gpu.create_buffer(&wgpu::BufferDescriptor {
            label: Some("minimax ui viewport ubo"),
            size: std::mem::size_of::<ViewportUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("minimax ui bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_ubo.as_entire_binding(),
            }],
        });

        let quad_vbo = gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("minimax ui quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let quad_ibo = gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("minimax ui quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Resources {
            pipeline,
            bind_group,
            viewport_ubo,
            quad_vbo,
            quad_ibo,
        }
    }

    fn ensure_instance_capacity(&mut self, device: &WgpuDevice, required: usize) {
        if required <= self.instance_capacity && self.instance_vbo.is_some() {
            return;
        }

        let new_cap = required.next_power_of_two().max(16);
        self.instance_vbo = Some(device.device().create_buffer(&wgpu::BufferDescriptor {
            label: Some("minimax ui instance vbo"),
            size: (new_cap * std::mem::size_of::<QuadInstance>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        }));
        self.instance_capacity = new_cap;
    }

    fn check_size(device: &WgpuDevice, size: Extent) -> Result<(), PassError> {
        if size.is_empty() || !size.fits_within(device.caps().max_texture_dimension) {
            return Err(PassError::InvalidSize {
                pass: PassKind::Ui,
                size,
            });
        }
        Ok(())
    }
}

impl RenderPass<WgpuDevice> for UiPass {
    fn kind(&self) -> PassKind {
        PassKind::Ui
    }

    fn init(&mut self, device: &WgpuDevice, size: Extent) -> Result<(), PassError> {
        Self::check_size(device, size)?;
        self.resources = Some(Self::create_resources(device));
        self.size = Some(size);
        Ok(())
    }

    fn resize(&mut self, device: &WgpuDevice, size: Extent) -> Result<(), PassError> {
        if self.resources.is_none() {
            return Err(PassError::NotInitialized { pass: PassKind::Ui });
        }
        Self::check_size(device, size)?;
        self.size = Some(size);
        Ok(())
    }

    fn target_size(&self) -> Option<Extent> {
        self.size
    }

    fn execute(
        &mut self,
        device: &WgpuDevice,
        frame: &mut GpuFrame,
        input: &PassInput<'_>,
    ) -> Result<(), PassError> {
        if self.resources.is_none() {
            return Err(PassError::NotInitialized { pass: PassKind::Ui });
        }

        let viewport = input.viewport;
        let dpr = viewport.device_pixel_ratio() as f32;
        let instances: Vec<QuadInstance> = input
            .content
            .overlay
            .quads(viewport.logical())
            .into_iter()
            .filter_map(|q| {
                let r = q.rect.normalized().scaled(dpr);
                (!r.is_empty() && r.is_finite()).then(|| QuadInstance {
                    origin: r.origin.to_array(),
                    size: r.size.to_array(),
                    color: q.color.to_array(),
                })
            })
            .collect();

        if instances.is_empty() {
            return Ok(());
        }

        self.ensure_instance_capacity(device, instances.len());
        let (Some(res), Some(instance_vbo)) = (self.resources.as_ref(), self.instance_vbo.as_ref())
        else {
            return Err(PassError::NotInitialized { pass: PassKind::Ui });
        };

        let physical = viewport.physical();
        let uniform = ViewportUniform {
            size: [physical.width.max(1) as f32, physical.height.max(1) as f32],
            _pad: [0.0; 2],
        };
        let queue = device.queue();
        queue.write_buffer(&res.viewport_ubo, 0, bytemuck::bytes_of(&uniform));
        queue.write_buffer(instance_vbo, 0, bytemuck::cast_slice(&instances));

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("minimax ui pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&res.pipeline);
        rpass.set_bind_group(0, &res.bind_group, &[]);
        rpass.set_vertex_buffer(0, res.quad_vbo.slice(..));
        rpass.set_vertex_buffer(1, instance_vbo.slice(..));
        rpass.set_index_buffer(res.quad_ibo.slice(..), wgpu::IndexFormat::Uint16);
        rpass.draw_indexed(0..6, 0, 0..instances.len() as u32);
        Ok(())
    }
}
