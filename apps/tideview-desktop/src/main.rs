use anyhow::{Context as _, Result, anyhow};
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tideview_assets::SkyboxImages;
use tideview_input::{Action, Button, Key, PointerTracker};
use tideview_render_wgpu::{OrbitCamera, WaterRenderer};
use tideview_scene::{PlaneMesh, SceneClock, SceneConfig, WaterSettings, frame_delta};
use tideview_tools::{FrameTimer, PanelStats, TweakPanel};
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser, Debug)]
#[command(name = "tideview-desktop", about = "Animated water scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene config file (.yaml, .yml or .json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Asset directory holding the skybox faces
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Initial window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    /// Load the config file (or defaults) and apply command line overrides.
    fn scene_config(&self) -> Result<SceneConfig> {
        let mut config = match &self.config {
            Some(path) => SceneConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => SceneConfig::default(),
        };
        if let Some(dir) = &self.assets {
            config.assets.dir = dir.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width.max(1);
        }
        if let Some(height) = self.height {
            config.window.height = height.max(1);
        }
        Ok(config)
    }
}

/// Application state.
struct AppState {
    config: SceneConfig,
    settings: WaterSettings,
    camera: OrbitCamera,
    pointer: PointerTracker,
    panel: TweakPanel,
    clock: SceneClock,
    timer: FrameTimer,
    skybox: Option<SkyboxImages>,
    last_frame: Instant,
    viewport_height: f32,
}

impl AppState {
    fn new(config: SceneConfig) -> Self {
        let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
        let camera = OrbitCamera::from_config(&config.camera, aspect);
        let panel = TweakPanel::new(config.panel.width, config.panel.visible);

        let skybox = if config.assets.skybox {
            match SkyboxImages::load(&config.assets.dir) {
                Ok(images) => Some(images),
                Err(e) => {
                    tracing::error!("failed to load skybox: {e}");
                    None
                }
            }
        } else {
            tracing::info!("skybox disabled in config");
            None
        };

        Self {
            settings: config.water,
            viewport_height: config.window.height as f32,
            config,
            camera,
            pointer: PointerTracker::new(),
            panel,
            clock: SceneClock::new(),
            timer: FrameTimer::default(),
            skybox,
            last_frame: Instant::now(),
        }
    }

    fn handle_action(&mut self, action: Action) {
        if action.is_camera() {
            self.camera.apply(action, self.viewport_height);
        } else if action == Action::TogglePanel {
            self.panel.toggle();
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.camera.set_aspect(width, height);
        self.viewport_height = height.max(1) as f32;
    }

    /// Advance timing and camera damping. Returns the shader time in seconds.
    fn update(&mut self) -> f32 {
        let now = Instant::now();
        self.timer.record(frame_delta(self.last_frame, now));
        self.last_frame = now;
        self.camera.update();
        self.clock.elapsed_at(now)
    }

    fn draw_ui(&mut self, ctx: &EguiContext, skybox_loaded: bool) {
        let stats = PanelStats {
            fps: self.timer.fps(),
            frame_ms: self.timer.average().as_secs_f32() * 1000.0,
            camera_position: self.camera.position,
            camera_distance: self.camera.distance(),
            skybox_loaded,
        };
        if self.panel.show(ctx, &mut self.settings, &stats) {
            tracing::debug!(settings = ?self.settings, "water settings edited");
        }
    }
}

fn map_button(button: MouseButton) -> Option<Button> {
    match button {
        MouseButton::Left => Some(Button::Primary),
        MouseButton::Right => Some(Button::Secondary),
        MouseButton::Middle => Some(Button::Middle),
        _ => None,
    }
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::ArrowUp => Key::ArrowUp,
        KeyCode::ArrowDown => Key::ArrowDown,
        KeyCode::ArrowLeft => Key::ArrowLeft,
        KeyCode::ArrowRight => Key::ArrowRight,
        KeyCode::ShiftLeft | KeyCode::ShiftRight => Key::Shift,
        KeyCode::KeyH => Key::H,
        KeyCode::KeyR => Key::R,
        _ => Key::Other,
    }
}

/// Wheel delta in lines. Pixel deltas count as one line per event.
fn wheel_lines(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(p) => (p.y as f32).signum(),
    }
}

/// Fraction of the physical resolution that keeps the pixel ratio at or
/// below `max_ratio`. Used as egui's zoom factor and as the scene's render
/// scale.
fn pixel_ratio_scale(scale_factor: f32, max_ratio: f32) -> f32 {
    if scale_factor <= 0.0 {
        return 1.0;
    }
    scale_factor.min(max_ratio.max(1.0)) / scale_factor
}

/// Prefer an sRGB surface. Any other format works, with the shaders writing
/// sRGB values directly.
fn pick_surface_format(formats: &[wgpu::TextureFormat]) -> Option<wgpu::TextureFormat> {
    if let Some(format) = formats.iter().find(|f| f.is_srgb()) {
        return Some(*format);
    }
    let format = formats.first().copied()?;
    tracing::warn!(?format, "surface offers no sRGB format; writing sRGB values directly");
    Some(format)
}

struct GpuApp {
    state: AppState,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    device: Option<wgpu::Device>,
    queue: Option<wgpu::Queue>,
    config: Option<wgpu::SurfaceConfiguration>,
    renderer: Option<WaterRenderer>,
    egui_ctx: EguiContext,
    egui_winit: Option<egui_winit::State>,
    egui_renderer: Option<egui_wgpu::Renderer>,
}

impl GpuApp {
    fn new(config: SceneConfig) -> Self {
        Self {
            state: AppState::new(config),
            window: None,
            surface: None,
            device: None,
            queue: None,
            config: None,
            renderer: None,
            egui_ctx: EguiContext::default(),
            egui_winit: None,
            egui_renderer: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window_config = &self.state.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("tideview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = pick_surface_format(&surface_caps.formats)
            .ok_or_else(|| anyhow!("surface reports no formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        self.state.resize(config.width, config.height);

        let scale = window.scale_factor() as f32;
        let ratio_scale = pixel_ratio_scale(scale, self.state.config.window.max_pixel_ratio);

        let mesh = PlaneMesh::water();
        let skybox = self.state.skybox.take();
        let renderer = WaterRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            ratio_scale,
            &mesh,
            skybox.as_ref(),
            self.state.config.clear_color,
        );

        self.egui_ctx.set_zoom_factor(ratio_scale);
        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(scale),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.device = Some(device);
        self.queue = Some(queue);
        self.config = Some(config);
        self.renderer = Some(renderer);
        self.egui_winit = Some(egui_winit);
        self.egui_renderer = Some(egui_renderer);
        Ok(())
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if let (Some(surface), Some(device), Some(config)) =
            (&self.surface, &self.device, &mut self.config)
        {
            config.width = new_size.width.max(1);
            config.height = new_size.height.max(1);
            surface.configure(device, config);
            self.state.resize(config.width, config.height);
            if let Some(renderer) = &mut self.renderer {
                renderer.resize(device, config.width, config.height);
            }
            tracing::debug!(width = config.width, height = config.height, "resized");
        }
    }

    fn redraw(&mut self) {
        let time = self.state.update();

        let (
            Some(window),
            Some(surface),
            Some(device),
            Some(queue),
            Some(config),
            Some(renderer),
            Some(egui_winit),
            Some(egui_renderer),
        ) = (
            &self.window,
            &self.surface,
            &self.device,
            &self.queue,
            &self.config,
            &self.renderer,
            &mut self.egui_winit,
            &mut self.egui_renderer,
        )
        else {
            return;
        };

        let output = match surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                surface.configure(device, config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        renderer.render(
            device,
            queue,
            &view,
            &self.state.camera,
            &self.state.settings,
            time,
        );

        let skybox_loaded = renderer.has_skybox();
        let raw_input = egui_winit.take_egui_input(window);
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            self.state.draw_ui(ctx, skybox_loaded);
        });
        egui_winit.handle_platform_output(window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [config.width, config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("egui_encoder"),
        });
        egui_renderer.update_buffers(device, queue, &mut encoder, &paint_jobs, &screen_descriptor);
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            egui_renderer.render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            egui_renderer.free_texture(id);
        }

        output.present();
        window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init_gpu(event_loop) {
            tracing::error!("failed to initialize GPU: {e:#}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(egui_winit), Some(window)) = (&mut self.egui_winit, &self.window) {
            let response = egui_winit.on_window_event(window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.resize(new_size);
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let ratio_scale = pixel_ratio_scale(
                    scale_factor as f32,
                    self.state.config.window.max_pixel_ratio,
                );
                self.egui_ctx.set_zoom_factor(ratio_scale);
                if let (Some(renderer), Some(device)) = (&mut self.renderer, &self.device) {
                    renderer.set_render_scale(device, ratio_scale);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        repeat,
                        ..
                    },
                ..
            } => {
                let pressed = key_state == ElementState::Pressed;
                let key = map_key(code);
                // Holding an arrow key keeps panning; other keys fire once.
                let arrow = matches!(
                    key,
                    Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight
                );
                if repeat && !arrow {
                    return;
                }
                let action = self.state.pointer.key(key, pressed);
                self.state.handle_action(action);
            }
            WindowEvent::MouseInput {
                button,
                state: btn_state,
                ..
            } => {
                if let Some(button) = map_button(button) {
                    self.state
                        .pointer
                        .button(button, btn_state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .state
                    .pointer
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
                self.state.handle_action(action);
            }
            WindowEvent::CursorLeft { .. } => {
                self.state.pointer.cursor_left();
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let action = self.state.pointer.wheel(wheel_lines(delta));
                self.state.handle_action(action);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("tideview-desktop starting");

    let config = cli.scene_config()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
