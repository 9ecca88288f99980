use crate::camera::OrbitCamera;
use crate::shaders;
use crate::skybox::SkyboxPass;
use crate::upscale::UpscalePass;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use tideview_assets::SkyboxImages;
use tideview_common::Color;
use tideview_scene::{PlaneMesh, WaterSettings};
use wgpu::util::DeviceExt;

pub(crate) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Host-side image of the WGSL `WaterUniforms` block.
///
/// Scalars are packed four to a `vec4` so the layout has no padding rules to
/// get wrong. Colors stay in sRGB; the shader linearizes after blending.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct WaterUniforms {
    pub view_proj: [[f32; 4]; 4],
    pub time_big: [f32; 4],
    pub big_small: [f32; 4],
    pub small_color: [f32; 4],
    pub depth_color: [f32; 4],
    pub surface_color: [f32; 4],
}

impl WaterUniforms {
    pub fn pack(settings: &WaterSettings, view_proj: Mat4, time: f32) -> Self {
        let s = settings;
        let rgba = |c: Color| [c.r, c.g, c.b, 1.0];
        Self {
            view_proj: view_proj.to_cols_array_2d(),
            time_big: [
                time,
                s.big_waves_elevation,
                s.big_waves_frequency.x,
                s.big_waves_frequency.y,
            ],
            big_small: [
                s.big_waves_speed_x,
                s.big_waves_speed_z,
                s.small_waves_elevation,
                s.small_waves_frequency,
            ],
            small_color: [
                s.small_waves_speed,
                s.small_iterations,
                s.color_offset,
                s.color_multiplier,
            ],
            depth_color: rgba(s.depth_color),
            surface_color: rgba(s.surface_color),
        }
    }
}

/// Clear value for an sRGB `color` on a `target` texture. sRGB targets take
/// linear values; other targets take the sRGB components as they are.
pub fn clear_color(color: Color, target: wgpu::TextureFormat) -> wgpu::Color {
    let rgb = if target.is_srgb() {
        color.to_linear()
    } else {
        color.to_vec3()
    };
    wgpu::Color {
        r: rgb.x as f64,
        g: rgb.y as f64,
        b: rgb.z as f64,
        a: 1.0,
    }
}

/// Water fragment entry point for a color `target`.
pub fn water_fragment_entry(target: wgpu::TextureFormat) -> &'static str {
    if target.is_srgb() {
        "fs_water"
    } else {
        "fs_water_unorm"
    }
}

/// wgpu renderer for the water scene: skybox background plus the displaced
/// water plane.
///
/// The scene is drawn at `render_scale` of the surface resolution and
/// stretched onto the surface when that scale is below 1.
pub struct WaterRenderer {
    water_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    skybox: Option<SkyboxPass>,
    depth_texture: wgpu::TextureView,
    upscale: UpscalePass,
    surface_size: (u32, u32),
    render_scale: f32,
    clear_color: wgpu::Color,
}

impl WaterRenderer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        render_scale: f32,
        mesh: &PlaneMesh,
        skybox: Option<&SkyboxImages>,
        background: Color,
    ) -> Self {
        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_uniform_buffer"),
            contents: bytemuck::bytes_of(&WaterUniforms::pack(
                &WaterSettings::default(),
                Mat4::IDENTITY,
                0.0,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("water_bind_group_layout"),
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

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("water_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("water_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let water_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("water_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::WATER_SHADER.into()),
        });

        let water_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("water_pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &water_shader,
                entry_point: Some("vs_water"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &water_shader,
                entry_point: Some(water_fragment_entry(surface_format)),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            // Visible from above and below.
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: None,
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

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_vertex_buffer"),
            contents: bytemuck::cast_slice(&mesh.positions),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("water_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let index_count = mesh.indices.len() as u32;

        let skybox = skybox.map(|images| SkyboxPass::new(device, queue, surface_format, images));
        let mut upscale = UpscalePass::new(device, surface_format);
        let (scene_width, scene_height) = upscale.resize(device, width, height, render_scale);
        let depth_texture = Self::create_depth_texture(device, scene_width, scene_height);

        tracing::info!(
            vertices = mesh.vertex_count(),
            triangles = index_count / 3,
            skybox = skybox.is_some(),
            srgb = surface_format.is_srgb(),
            scene_width,
            scene_height,
            "water renderer ready"
        );

        Self {
            water_pipeline,
            uniform_buffer,
            uniform_bind_group,
            vertex_buffer,
            index_buffer,
            index_count,
            skybox,
            depth_texture,
            upscale,
            surface_size: (width, height),
            render_scale,
            clear_color: clear_color(background, surface_format),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.surface_size = (width, height);
        let (scene_width, scene_height) =
            self.upscale.resize(device, width, height, self.render_scale);
        self.depth_texture = Self::create_depth_texture(device, scene_width, scene_height);
    }

    /// Change the fraction of the surface resolution the scene is drawn at.
    pub fn set_render_scale(&mut self, device: &wgpu::Device, render_scale: f32) {
        self.render_scale = render_scale;
        let (width, height) = self.surface_size;
        self.resize(device, width, height);
    }

    pub fn has_skybox(&self) -> bool {
        self.skybox.is_some()
    }

    /// Render one frame: skybox (or clear color) then the water plane, then
    /// the upscale onto `view` if the scene was drawn smaller.
    pub fn render(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        camera: &OrbitCamera,
        settings: &WaterSettings,
        time: f32,
    ) {
        queue.write_buffer(
            &self.uniform_buffer,
            0,
            bytemuck::bytes_of(&WaterUniforms::pack(
                settings,
                camera.view_projection(),
                time,
            )),
        );
        if let Some(skybox) = &self.skybox {
            skybox.prepare(queue, camera);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("render_encoder"),
        });

        {
            let scene_view = self.upscale.scene_view().unwrap_or(view);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: scene_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
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

            if let Some(skybox) = &self.skybox {
                skybox.draw(&mut pass);
            }

            pass.set_pipeline(&self.water_pipeline);
            pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            pass.draw_indexed(0..self.index_count, 0, 0..1);
        }
        self.upscale.draw(&mut encoder, view);

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn create_depth_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
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
    use glam::Vec2;

    #[test]
    fn uniform_block_is_vec4_aligned() {
        let size = std::mem::size_of::<WaterUniforms>();
        assert_eq!(size, 64 + 5 * 16);
        assert_eq!(size % 16, 0);
    }

    #[test]
    fn pack_places_every_setting() {
        let settings = WaterSettings {
            big_waves_elevation: 0.3,
            big_waves_frequency: Vec2::new(2.0, 3.0),
            big_waves_speed_x: 0.4,
            big_waves_speed_z: 0.5,
            small_waves_elevation: 0.6,
            small_waves_frequency: 0.7,
            small_waves_speed: 0.8,
            small_iterations: 2.0,
            color_offset: 0.9,
            color_multiplier: 1.1,
            ..WaterSettings::default()
        };
        let u = WaterUniforms::pack(&settings, Mat4::IDENTITY, 12.5);
        assert_eq!(u.time_big, [12.5, 0.3, 2.0, 3.0]);
        assert_eq!(u.big_small, [0.4, 0.5, 0.6, 0.7]);
        assert_eq!(u.small_color, [0.8, 2.0, 0.9, 1.1]);
        assert_eq!(u.view_proj, Mat4::IDENTITY.to_cols_array_2d());
    }

    #[test]
    fn pack_keeps_colors_in_srgb() {
        let settings = WaterSettings::default();
        let u = WaterUniforms::pack(&settings, Mat4::IDENTITY, 0.0);
        let depth = settings.depth_color;
        assert_eq!(u.depth_color, [depth.r, depth.g, depth.b, 1.0]);
        assert_eq!(u.surface_color[3], 1.0);
    }

    #[test]
    fn pack_hands_iterations_through_unclamped() {
        // The shader caps the octave loop itself.
        let settings = WaterSettings {
            small_iterations: 20_000_000.0,
            ..WaterSettings::default()
        };
        let u = WaterUniforms::pack(&settings, Mat4::IDENTITY, 0.0);
        assert_eq!(u.small_color[1], 20_000_000.0);
    }

    #[test]
    fn clear_color_is_linearized_for_srgb_targets() {
        let background = Color::from_hex("#262837").unwrap();
        let c = clear_color(background, wgpu::TextureFormat::Bgra8UnormSrgb);
        assert!(c.r < 38.0 / 255.0);
        assert!(c.b > c.r);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn clear_color_stays_srgb_for_unorm_targets() {
        let background = Color::from_hex("#262837").unwrap();
        let c = clear_color(background, wgpu::TextureFormat::Bgra8Unorm);
        assert!((c.r - 38.0 / 255.0).abs() < 1e-6);
        assert!((c.g - 40.0 / 255.0).abs() < 1e-6);
        assert!((c.b - 55.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn fragment_entry_follows_target_encoding() {
        assert_eq!(water_fragment_entry(wgpu::TextureFormat::Bgra8UnormSrgb), "fs_water");
        assert_eq!(water_fragment_entry(wgpu::TextureFormat::Rgba8UnormSrgb), "fs_water");
        assert_eq!(water_fragment_entry(wgpu::TextureFormat::Bgra8Unorm), "fs_water_unorm");
        assert_eq!(water_fragment_entry(wgpu::TextureFormat::Rgba16Float), "fs_water_unorm");
        assert!(crate::shaders::WATER_SHADER.contains("fn fs_water_unorm("));
    }
}
