use crate::mesh::{self, InstanceData, LineVertex, UnitMesh, Vertex};
use crate::shaders;
use crate::shadow::ShadowMap;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use lightbox_common::SurfaceSize;
use lightbox_render::{PerspectiveCamera, RenderInfo};
use lightbox_scene::{Helper, LightKind, Scene};
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const HELPER_COLOR: [f32; 4] = [1.0, 0.85, 0.1, 1.0];

/// Rasterizer depth offset used only while drawing into the shadow map.
///
/// This is separate from `ShadowParams::bias`, which the lit pass subtracts
/// from the receiver depth at comparison time. With a configured bias of 0
/// this slope-scaled offset is what keeps the floor free of acne.
const SHADOW_RASTER_BIAS: wgpu::DepthBiasState = wgpu::DepthBiasState {
    constant: 2,
    slope_scale: 2.0,
    clamp: 0.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Globals {
    view_proj: [[f32; 4]; 4],
    light_view_proj: [[f32; 4]; 4],
    camera_pos: [f32; 4],
    light_dir: [f32; 4],
    light_color: [f32; 4],
    ambient: [f32; 4],
    shadow: [f32; 4],
}

impl Globals {
    fn new(scene: &Scene, camera: &PerspectiveCamera, shadow: Option<&ShadowMap>) -> Self {
        let [ar, ag, ab] = scene.ambient();
        let mut globals = Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            camera_pos: camera.position.extend(1.0).to_array(),
            light_dir: [0.0; 4],
            light_color: [0.0; 4],
            ambient: [ar, ag, ab, 1.0],
            shadow: [0.0; 4],
        };

        let sun = scene
            .shadow_caster()
            .map(|(_, light)| light)
            .or_else(|| {
                scene
                    .lights()
                    .iter()
                    .find(|l| matches!(l.kind, LightKind::Directional { .. }))
            });
        if let Some(light) = sun {
            if let Some(dir) = light.direction_to_light() {
                globals.light_dir = dir.extend(1.0).to_array();
            }
            globals.light_color = light.color.to_linear_scaled(light.intensity);
            if let (Some(params), Some(vp), Some(map)) =
                (light.shadow(), light.shadow_view_projection(), shadow)
            {
                globals.light_view_proj = vp.to_cols_array_2d();
                globals.shadow = [params.bias, 1.0, map.texel_size(), 0.0];
            }
        }
        globals
    }
}

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, (vertices, indices): (Vec<Vertex>, Vec<u16>)) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_vertex_buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label}_index_buffer")),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }
}

/// One queued mesh draw: which unit mesh, which instance slot.
struct Draw {
    unit: UnitMesh,
    instance: u32,
    triangles: u32,
    cast_shadow: bool,
}

/// wgpu scene renderer: shadow pass, lit pass and helper lines, recorded into
/// a caller-supplied encoder.
pub struct WgpuRenderer {
    lit_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    line_pipeline: wgpu::RenderPipeline,
    globals_buffer: wgpu::Buffer,
    globals_bind_group: wgpu::BindGroup,
    shadow_layout: wgpu::BindGroupLayout,
    shadow_map: ShadowMap,
    /// Requested size of the live shadow map; `None` while the 1x1 placeholder is bound.
    shadow_source: Option<u32>,
    shadow_dirty: bool,
    cube: GpuMesh,
    plane: GpuMesh,
    instance_buffer: wgpu::Buffer,
    max_instances: u32,
    line_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    size: SurfaceSize,
    surface_format: wgpu::TextureFormat,
    show_helpers: bool,
}

impl WgpuRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, size: SurfaceSize) -> Self {
        let globals_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globals_buffer"),
            size: std::mem::size_of::<Globals>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let globals_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("globals_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let globals_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globals_bind_group"),
            layout: &globals_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: globals_buffer.as_entire_binding(),
            }],
        });

        let shadow_layout = ShadowMap::bind_group_layout(device);
        let shadow_map = ShadowMap::new(device, &shadow_layout, 1);

        let lit_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("lit_pipeline_layout"),
            bind_group_layouts: &[&globals_layout, &shadow_layout],
            push_constant_ranges: &[],
        });
        let globals_only_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globals_pipeline_layout"),
            bind_group_layouts: &[&globals_layout],
            push_constant_ranges: &[],
        });

        let mesh_buffers = [
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                ],
            },
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<InstanceData>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &wgpu::vertex_attr_array![
                    2 => Float32x4,
                    3 => Float32x4,
                    4 => Float32x4,
                    5 => Float32x4,
                    6 => Float32x4,
                    7 => Float32x4,
                ],
            },
        ];

        // Lit pipeline
        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SCENE_SHADER.into()),
        });

        let lit_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("lit_pipeline"),
            layout: Some(&lit_layout),
            vertex: wgpu::VertexState {
                module: &scene_shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: &scene_shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Shadow pipeline (depth only)
        let shadow_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::SHADOW_SHADER.into()),
        });

        let shadow_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow_pipeline"),
            layout: Some(&globals_only_layout),
            vertex: wgpu::VertexState {
                module: &shadow_shader,
                entry_point: Some("vs_shadow"),
                compilation_options: Default::default(),
                buffers: &mesh_buffers,
            },
            fragment: None,
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: ShadowMap::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::LessEqual,
                stencil: Default::default(),
                bias: SHADOW_RASTER_BIAS,
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        // Helper line pipeline
        let line_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("line_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::LINE_SHADER.into()),
        });

        let line_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("line_pipeline"),
            layout: Some(&globals_only_layout),
            vertex: wgpu::VertexState {
                module: &line_shader,
                entry_point: Some("vs_line"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<LineVertex>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x4,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &line_shader,
                entry_point: Some("fs_line"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::LineList,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: false,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        let cube = GpuMesh::upload(device, "cube", mesh::unit_cube());
        let plane = GpuMesh::upload(device, "plane", mesh::unit_plane());

        let max_instances = 1024u32;
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("instance_buffer"),
            size: (max_instances as u64) * std::mem::size_of::<InstanceData>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let line_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("helper_line_buffer"),
            size: (mesh::FRUSTUM_LINE_VERTICES * std::mem::size_of::<LineVertex>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_texture = Self::create_depth_texture(device, size);

        Self {
            lit_pipeline,
            shadow_pipeline,
            line_pipeline,
            globals_buffer,
            globals_bind_group,
            shadow_layout,
            shadow_map,
            shadow_source: None,
            shadow_dirty: true,
            cube,
            plane,
            instance_buffer,
            max_instances,
            line_buffer,
            depth_texture,
            size,
            surface_format,
            show_helpers: true,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: SurfaceSize) {
        if size.is_degenerate() || size == self.size {
            return;
        }
        self.depth_texture = Self::create_depth_texture(device, size);
        self.size = size;
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    /// Re-render the shadow map on the next frame. The map is otherwise
    /// drawn once and reused.
    pub fn request_shadow_update(&mut self) {
        self.shadow_dirty = true;
    }

    pub fn needs_shadow_update(&self) -> bool {
        self.shadow_dirty
    }

    pub fn shadow_resolution(&self) -> Option<u32> {
        self.shadow_source.map(|_| self.shadow_map.resolution)
    }

    pub fn show_helpers(&self) -> bool {
        self.show_helpers
    }

    pub fn set_show_helpers(&mut self, show: bool) {
        self.show_helpers = show;
    }

    /// Record one frame of `scene` into `encoder`, targeting `view`.
    pub fn encode(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> RenderInfo {
        self.sync_shadow_map(device, scene);
        let has_shadow = self.shadow_source.is_some();

        let globals = Globals::new(scene, camera, has_shadow.then_some(&self.shadow_map));
        queue.write_buffer(&self.globals_buffer, 0, bytemuck::bytes_of(&globals));

        let mut instances = Vec::with_capacity(scene.mesh_count());
        let mut draws = Vec::with_capacity(scene.mesh_count());
        for mesh in scene.meshes().values() {
            if instances.len() >= self.max_instances as usize {
                tracing::warn!(max = self.max_instances, "instance buffer full; skipping meshes");
                break;
            }
            draws.push(Draw {
                unit: UnitMesh::for_geometry(&mesh.geometry),
                instance: instances.len() as u32,
                triangles: mesh.geometry.triangle_count(),
                cast_shadow: mesh.cast_shadow,
            });
            instances.push(InstanceData::from_mesh(mesh));
        }
        if !instances.is_empty() {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let mut info = RenderInfo::default();

        if has_shadow && self.shadow_dirty {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("shadow_pass"),
                color_attachments: &[],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.shadow_map.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });
            pass.set_pipeline(&self.shadow_pipeline);
            pass.set_bind_group(0, &self.globals_bind_group, &[]);
            pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for draw in draws.iter().filter(|d| d.cast_shadow) {
                self.draw_mesh(&mut pass, draw, &mut info);
            }
            self.shadow_dirty = false;
            tracing::trace!("shadow map updated");
        }

        let helper_lines = self.helper_lines(scene);
        if let Some(lines) = &helper_lines {
            queue.write_buffer(&self.line_buffer, 0, bytemuck::cast_slice(lines));
        }

        {
            let [r, g, b] = scene.background().to_linear();
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: r as f64,
                            g: g as f64,
                            b: b as f64,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if !draws.is_empty() {
                pass.set_pipeline(&self.lit_pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                pass.set_bind_group(1, &self.shadow_map.bind_group, &[]);
                pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
                for draw in &draws {
                    self.draw_mesh(&mut pass, draw, &mut info);
                }
            }

            if let Some(lines) = &helper_lines {
                pass.set_pipeline(&self.line_pipeline);
                pass.set_bind_group(0, &self.globals_bind_group, &[]);
                pass.set_vertex_buffer(0, self.line_buffer.slice(..));
                pass.draw(0..lines.len() as u32, 0..1);
                info.draw_calls += 1;
            }
        }

        info
    }

    fn draw_mesh(&self, pass: &mut wgpu::RenderPass<'_>, draw: &Draw, info: &mut RenderInfo) {
        let gpu_mesh = match draw.unit {
            UnitMesh::Cube => &self.cube,
            UnitMesh::Plane => &self.plane,
        };
        pass.set_vertex_buffer(0, gpu_mesh.vertex_buffer.slice(..));
        pass.set_index_buffer(gpu_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        pass.draw_indexed(0..gpu_mesh.index_count, 0, draw.instance..draw.instance + 1);
        info.draw_calls += 1;
        info.triangles += draw.triangles;
    }

    /// Frustum lines for the first visible shadow-camera helper.
    fn helper_lines(&self, scene: &Scene) -> Option<Vec<LineVertex>> {
        if !self.show_helpers {
            return None;
        }
        scene.helpers().iter().find_map(|helper| match helper {
            Helper::ShadowCamera { light_index } => scene
                .lights()
                .get(*light_index)
                .and_then(|light| light.shadow_view_projection())
                .map(|vp| mesh::frustum_lines(vp, HELPER_COLOR)),
        })
    }

    /// Create, resize or drop the shadow map to match the scene's caster.
    fn sync_shadow_map(&mut self, device: &wgpu::Device, scene: &Scene) {
        let wanted = scene
            .shadow_caster()
            .and_then(|(_, light)| light.shadow())
            .map(|params| params.map_size);
        if wanted == self.shadow_source {
            return;
        }
        self.shadow_map = ShadowMap::new(device, &self.shadow_layout, wanted.unwrap_or(1));
        self.shadow_source = wanted;
        self.shadow_dirty = true;
        tracing::debug!(resolution = self.shadow_map.resolution, "shadow map allocated");
    }

    fn create_depth_texture(device: &wgpu::Device, size: SurfaceSize) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: size.width.max(1),
                height: size.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lightbox_scene::{SceneBuilder, SceneSettings, ShadowSettings};

    #[test]
    fn globals_layout_is_uniform_friendly() {
        assert_eq!(std::mem::size_of::<Globals>(), 208);
        assert_eq!(std::mem::size_of::<Globals>() % 16, 0);
    }

    #[test]
    fn shadow_raster_bias_is_separate_from_configured_bias() {
        assert!(SHADOW_RASTER_BIAS.is_enabled());
        assert!(SHADOW_RASTER_BIAS.slope_scale > 0.0);
        // the configured comparison bias stays at its own value
        let scene = SceneBuilder::default().build();
        let (_, sun) = scene.shadow_caster().unwrap();
        assert_eq!(sun.shadow().unwrap().bias, 0.0);
    }

    #[test]
    fn globals_pick_up_sun_and_ambient() {
        let scene = SceneBuilder::default().build();
        let globals = Globals::new(&scene, &PerspectiveCamera::default(), None);
        assert_eq!(globals.light_dir[3], 1.0);
        assert!(globals.light_dir[1] > 0.9);
        assert!((globals.ambient[0] - 0.3).abs() < 1e-6);
        // no map bound yet
        assert_eq!(globals.shadow[1], 0.0);
    }

    #[test]
    fn globals_without_shadows_keep_light() {
        let scene = SceneBuilder::new(SceneSettings {
            shadows: ShadowSettings {
                enabled: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .build();
        let globals = Globals::new(&scene, &PerspectiveCamera::default(), None);
        assert_eq!(globals.light_dir[3], 1.0);
        assert!((globals.light_color[0] - 0.8).abs() < 1e-6);
        assert_eq!(globals.shadow, [0.0; 4]);
    }
}
