use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::coords::Extent;
use crate::device::{GpuFrame, GraphicsDevice, WgpuDevice};
use crate::error::PassError;
use crate::scene::{Scene, SceneId, Vertex};

use super::{PassInput, PassKind, RenderPass};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct CameraUniform {
    view_proj: [[f32; 4]; 4],
    /// xyz: direction towards the light, w unused.
    light_dir: [f32; 4],
}

/// Size-dependent targets.
struct Targets {
    size: Extent,
    /// Multisampled color target, resolved into the frame. `None` without MSAA.
    msaa_view: Option<wgpu::TextureView>,
    depth_view: wgpu::TextureView,
}

struct GpuMesh {
    vbo: wgpu::Buffer,
    ibo: wgpu::Buffer,
    index_count: u32,
}

struct Resources {
    pipeline: wgpu::RenderPipeline,
    camera_ubo: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    surface_format: wgpu::TextureFormat,
    samples: u32,
    homogeneous_depth: bool,
}

/// Clears color and depth, then draws the scene's meshes.
#[derive(Default)]
pub struct GeometryPass {
    resources: Option<Resources>,
    targets: Option<Targets>,

    uploaded: Option<SceneId>,
    meshes: Vec<GpuMesh>,
}

impl GeometryPass {
    pub fn new() -> Self {
        Self::default()
    }

    fn create_resources(device: &WgpuDevice) -> Resources {
        let caps = device.caps();
        let gpu = device.device();

        let shader = gpu.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("minimax geometry shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/geometry.wgsl").into()),
        });

        let bind_group_layout = gpu.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("minimax geometry bgl"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
        });

        let pipeline_layout = gpu.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("minimax geometry pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let pipeline = gpu.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("minimax geometry pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::layout()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: caps.surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                // glTF assets are not guaranteed to be closed.
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: caps.msaa_samples,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview_mask: None,
            cache: None,
        });

        let camera_ubo = gpu.create_buffer(&wgpu::BufferDescriptor {
            label: Some("minimax camera ubo"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = gpu.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("minimax geometry bind group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        Resources {
            pipeline,
            camera_ubo,
            bind_group,
            surface_format: caps.surface_format,
            samples: caps.msaa_samples,
            homogeneous_depth: caps.homogeneous_depth,
        }
    }

    fn create_targets(
        device: &WgpuDevice,
        res: &Resources,
        size: Extent,
    ) -> Result<Targets, PassError> {
        let max = device.caps().max_texture_dimension;
        if size.is_empty() || !size.fits_within(max) {
            return Err(PassError::InvalidSize {
                pass: PassKind::Geometry,
                size,
            });
        }

        let extent = wgpu::Extent3d {
            width: size.width,
            height: size.height,
            depth_or_array_layers: 1,
        };
        let texture = |label: &str, format: wgpu::TextureFormat| {
            device
                .device()
                .create_texture(&wgpu::TextureDescriptor {
                    label: Some(label),
                    size: extent,
                    mip_level_count: 1,
                    sample_count: res.samples,
                    dimension: wgpu::TextureDimension::D2,
                    format,
                    usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                    view_formats: &[],
                })
                .create_view(&wgpu::TextureViewDescriptor::default())
        };

        let msaa_view =
            (res.samples > 1).then(|| texture("minimax msaa color", res.surface_format));
        let depth_view = texture("minimax depth", DEPTH_FORMAT);

        Ok(Targets {
            size,
            msaa_view,
            depth_view,
        })
    }

    fn upload(&mut self, device: &WgpuDevice, scene: &Scene) {
        if self.uploaded == Some(scene.id()) {
            return;
        }

        let gpu = device.device();
        self.meshes = scene
            .draw_items()
            .map(|mesh| GpuMesh {
                vbo: gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("minimax mesh vbo"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: wgpu::BufferUsages::VERTEX,
                }),
                ibo: gpu.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("minimax mesh ibo"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: wgpu::BufferUsages::INDEX,
                }),
                index_count: mesh.indices.len() as u32,
            })
            .collect();
        self.uploaded = Some(scene.id());
        log::debug!("uploaded {} meshes", self.meshes.len());
    }
}

impl RenderPass<WgpuDevice> for GeometryPass {
    fn kind(&self) -> PassKind {
        PassKind::Geometry
    }

    fn init(&mut self, device: &WgpuDevice, size: Extent) -> Result<(), PassError> {
        let res = Self::create_resources(device);
        let targets = Self::create_targets(device, &res, size)?;
        log::debug!("geometry pass: {size}, msaa x{}", res.samples);

        self.resources = Some(res);
        self.targets = Some(targets);
        self.uploaded = None;
        self.meshes.clear();
        Ok(())
    }

    fn resize(&mut self, device: &WgpuDevice, size: Extent) -> Result<(), PassError> {
        let res = self.resources.as_ref().ok_or(PassError::NotInitialized {
            pass: PassKind::Geometry,
        })?;
        if self.targets.as_ref().is_some_and(|t| t.size == size) {
            return Ok(());
        }
        self.targets = Some(Self::create_targets(device, res, size)?);
        Ok(())
    }

    fn target_size(&self) -> Option<Extent> {
        self.targets.as_ref().map(|t| t.size)
    }

    fn execute(
        &mut self,
        device: &WgpuDevice,
        frame: &mut GpuFrame,
        input: &PassInput<'_>,
    ) -> Result<(), PassError> {
        let not_initialized = PassError::NotInitialized {
            pass: PassKind::Geometry,
        };
        if self.resources.is_none() {
            return Err(not_initialized);
        }
        self.upload(device, input.content.scene);

        let (Some(res), Some(targets)) = (self.resources.as_ref(), self.targets.as_ref()) else {
            return Err(not_initialized);
        };

        let camera = CameraUniform {
            view_proj: input
                .content
                .camera
                .view_projection(input.viewport.aspect(), res.homogeneous_depth)
                .to_cols_array_2d(),
            light_dir: [0.4, 0.8, -0.45, 0.0],
        };
        device
            .queue()
            .write_buffer(&res.camera_ubo, 0, bytemuck::bytes_of(&camera));

        let (view, resolve_target) = match targets.msaa_view.as_ref() {
            Some(msaa) => (msaa, Some(&frame.view)),
            None => (&frame.view, None),
        };

        let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("minimax geometry pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(input.viewport.background().into()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &targets.depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Discard,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(&res.pipeline);
        rpass.set_bind_group(0, &res.bind_group, &[]);
        for mesh in &self.meshes {
            rpass.set_vertex_buffer(0, mesh.vbo.slice(..));
            rpass.set_index_buffer(mesh.ibo.slice(..), wgpu::IndexFormat::Uint32);
            rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
        }
        Ok(())
    }
}
