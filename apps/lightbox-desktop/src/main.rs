mod overlay;
mod ui;

use anyhow::Result;
use clap::Parser;
use egui::Context as EguiContext;
use glam::Vec2;
use lightbox_common::SurfaceSize;
use lightbox_input::{Action, PointerButton, PointerTracker, apply_camera_action};
use lightbox_kernel::{
    DeviceContext, FrameLoop, LightboxConfig, ResizeCoordinator, ResizeObserver, StartupError,
    SurfaceBinding, SurfaceHost, SystemClock,
};
use lightbox_render::{OrbitControls, Renderer};
use lightbox_render_wgpu::{GpuContext, GpuOptions, SurfaceRenderer};
use overlay::DebugOverlay;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::{DebugUi, PanelView};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lightbox-desktop", about = "Lightbox 3D demo window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

type Ctx = DeviceContext<SurfaceRenderer<DebugOverlay>, SystemClock>;

/// The window as a surface host. Reads the live inner size every time.
struct WindowHost(Arc<Window>);

impl SurfaceHost for WindowHost {
    fn dimensions(&self) -> SurfaceSize {
        let size = self.0.inner_size();
        SurfaceSize::new(size.width, size.height)
    }
}

/// Everything that exists once the window and GPU are up.
struct Running {
    window: Arc<Window>,
    egui_winit: egui_winit::State,
    ctx: Ctx,
    resize: ResizeCoordinator<WindowHost>,
    frame_loop: FrameLoop,
    controls: OrbitControls,
}

struct App {
    config: LightboxConfig,
    egui_ctx: EguiContext,
    ui: DebugUi,
    pointer: PointerTracker,
    running: Option<Running>,
    startup_error: Option<StartupError>,
}

impl App {
    fn new(config: LightboxConfig) -> Self {
        let ui = DebugUi::new(config.camera.fov_degrees, config.scene.shadow_helper);
        Self {
            config,
            egui_ctx: EguiContext::default(),
            ui,
            pointer: PointerTracker::new(),
            running: None,
            startup_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<Running, StartupError> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| StartupError::Window(e.to_string()))?,
        );

        let binding = SurfaceBinding::new("main-window", WindowHost(window.clone()));
        let target = window.clone();
        let ctx: Ctx = DeviceContext::startup(&binding, &self.config, SystemClock::new(), |size| {
            let gpu = GpuContext::new(target, size, &GpuOptions::default())
                .map_err(|e| StartupError::capability("wgpu", e.to_string()))?;
            let overlay = DebugOverlay::new(&gpu.device, gpu.format());
            Ok(SurfaceRenderer::new(gpu, overlay))
        })?;

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let frame_loop = FrameLoop::new().with_info_interval(Duration::from_millis(
            self.config.render_info_interval_ms,
        ));
        let controls = OrbitControls::from_camera(ctx.camera());

        Ok(Running {
            window,
            egui_winit,
            ctx,
            resize: ResizeCoordinator::new(binding),
            frame_loop,
            controls,
        })
    }

    fn handle_action(&mut self, action: Action) {
        if self.ui.handle_action(&action) || !action.is_camera() {
            return;
        }
        let Some(run) = &mut self.running else {
            return;
        };
        let height = run.ctx.renderer().size().height as f32;
        apply_camera_action(&action, &mut run.controls, run.ctx.camera_mut(), height);
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(run) = &mut self.running else {
            return;
        };
        // Minimized: wait for the next Resized to schedule a frame.
        if !run.resize.can_present() {
            return;
        }

        let raw_input = run.egui_winit.take_egui_input(&run.window);
        let view = PanelView {
            stats: run.frame_loop.stats(),
            info: run.frame_loop.last_info(),
            shadow_resolution: run.ctx.renderer().scene_renderer().shadow_resolution(),
        };
        let mut full_output = self.egui_ctx.run(raw_input, |ctx| self.ui.draw(ctx, &view));
        let platform_output = std::mem::take(&mut full_output.platform_output);
        run.egui_winit
            .handle_platform_output(&run.window, platform_output);
        run.ctx
            .renderer_mut()
            .overlay_mut()
            .prepare(&self.egui_ctx, full_output);

        if let Err(e) = run.frame_loop.tick(&mut run.ctx) {
            if e.is_fatal() {
                tracing::error!("fatal render error: {e}");
                run.frame_loop.cancel_token().cancel();
                event_loop.exit();
                return;
            }
            tracing::warn!("frame dropped: {e}");
        }

        let changes = self.ui.take_changes();
        if !changes.is_empty() {
            if let Some(fov) = changes.fov_degrees {
                let camera = run.ctx.camera_mut();
                camera.fov_degrees = fov;
                camera.update_projection_matrix();
            }
            let scene_renderer = run.ctx.renderer_mut().scene_renderer_mut();
            if let Some(show) = changes.show_helpers {
                scene_renderer.set_show_helpers(show);
            }
            if changes.refresh_shadows {
                scene_renderer.request_shadow_update();
            }
            tracing::debug!(?changes, "panel changes applied");
        }

        run.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.startup_error.is_some() {
            return;
        }

        match self.start(event_loop) {
            Ok(mut run) => {
                run.ctx
                    .renderer_mut()
                    .scene_renderer_mut()
                    .set_show_helpers(self.config.scene.shadow_helper);
                tracing::info!(
                    size = %run.ctx.renderer().size(),
                    meshes = run.ctx.scene().mesh_count(),
                    "lightbox ready"
                );
                run.window.request_redraw();
                self.running = Some(run);
            }
            Err(e) => {
                eprintln!("{}", e.diagnostic());
                tracing::error!("startup failed: {e}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(run) = &mut self.running else {
            return;
        };
        let response = run.egui_winit.on_window_event(&run.window, &event);
        if response.repaint {
            run.window.request_redraw();
        }

        match event {
            WindowEvent::CloseRequested => {
                run.frame_loop.cancel_token().cancel();
                event_loop.exit();
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                let outcome = run.resize.surface_resized(&mut run.ctx);
                tracing::debug!(?outcome, "resize");
                if run.resize.can_present() {
                    run.window.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Middle => PointerButton::Middle,
                    _ => return,
                };
                self.pointer.button_with_ui(
                    button,
                    state == ElementState::Pressed,
                    response.consumed,
                );
            }
            _ if response.consumed => {}
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key,
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let action = match &logical_key {
                    Key::Named(NamedKey::F1) => Action::from_key("F1"),
                    Key::Named(NamedKey::F2) => Action::from_key("F2"),
                    Key::Named(NamedKey::Escape) => {
                        run.frame_loop.cancel_token().cancel();
                        event_loop.exit();
                        return;
                    }
                    Key::Character(c) => Action::from_key(c.as_str()),
                    _ => Action::Noop,
                };
                self.handle_action(action);
            }
            WindowEvent::CursorMoved { position, .. } => {
                let action = self
                    .pointer
                    .moved(Vec2::new(position.x as f32, position.y as f32));
                self.handle_action(action);
            }
            WindowEvent::CursorLeft { .. } => self.pointer.left(),
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / 50.0,
                };
                let action = self.pointer.scrolled(lines);
                self.handle_action(action);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(run) = &self.running {
            if run.frame_loop.cancel_token().is_cancelled() {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = LightboxConfig::load_or_default(cli.config.as_deref())?;
    tracing::info!("lightbox-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    if let Some(err) = app.startup_error {
        return Err(err.into());
    }
    Ok(())
}
