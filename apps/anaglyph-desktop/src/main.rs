mod keymap;

use anaglyph_common::StereoMode;
use anaglyph_input::{AppConfig, AppState, Control};
use anaglyph_render::{MeshProvider, composite};
use anaglyph_render_wgpu::{GpuContext, WgpuRenderer};
use anaglyph_scene::DEFAULT_SEED;
use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "anaglyph-desktop", about = "Red/cyan anaglyph stereo viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Number of boxes in the initial scene (1 = single debug box)
    #[arg(short, long, default_value_t = 1)]
    boxes: usize,

    /// Seed for random box placement
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Interocular distance in world units
    #[arg(long, default_value_t = 20.0)]
    ipd: f32,

    /// Initial stereo mode: none, toe-in or asymmetric
    #[arg(short, long, default_value = "none")]
    mode: StereoMode,

    /// Vertical field of view in degrees
    #[arg(long, default_value_t = 45.0)]
    fov: f32,

    /// Recompute the projection aspect ratio when the window is resized
    #[arg(long)]
    track_resize: bool,
}

impl Cli {
    fn app_config(&self) -> AppConfig {
        AppConfig {
            box_count: self.boxes,
            seed: self.seed,
            ipd: self.ipd,
            mode: self.mode,
            fov_degrees: self.fov,
            width: self.width,
            height: self.height,
        }
    }
}

struct GpuApp {
    state: AppState,
    size: PhysicalSize<u32>,
    track_resize: bool,
    window: Option<Arc<Window>>,
    gpu: Option<GpuContext>,
    renderer: Option<WgpuRenderer>,
    last_frame: Instant,
    init_error: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(cli: &Cli) -> Self {
        Self {
            state: AppState::new(&cli.app_config()),
            size: PhysicalSize::new(cli.width, cli.height),
            track_resize: cli.track_resize,
            window: None,
            gpu: None,
            renderer: None,
            last_frame: Instant::now(),
            init_error: None,
        }
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Anaglyph Rendering")
            .with_inner_size(self.size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to open a window")?,
        );

        let size = window.inner_size();
        let gpu = GpuContext::new(window.clone(), size.width, size.height)
            .context("failed to initialize graphics context")?;

        let mut renderer = WgpuRenderer::new(
            gpu.device.clone(),
            gpu.queue.clone(),
            gpu.format(),
            size.width,
            size.height,
        );
        renderer.initialize()?;

        // The projection aspect is fixed here unless --track-resize is given.
        self.state.set_viewport(size.width, size.height);

        tracing::info!(
            "GPU initialized with {} backend ({:?})",
            gpu.backend_label(),
            gpu.format()
        );
        self.state.log_mode();

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.renderer = Some(renderer);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.state.update(dt);

        let (Some(gpu), Some(renderer)) = (&self.gpu, &mut self.renderer) else {
            return;
        };
        let Some(output) = gpu.acquire() else {
            return;
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let eyes = self.state.eye_frames();
        composite(&eyes, self.state.instances(), renderer);
        renderer.end_frame(&view);

        output.present();
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.init_error.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            tracing::error!("{e:#}");
            self.init_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let (Some(gpu), Some(renderer)) = (&mut self.gpu, &mut self.renderer) {
                    gpu.resize(new_size.width, new_size.height);
                    let (width, height) = gpu.size();
                    renderer.resize(width, height);
                    if self.track_resize {
                        self.state.set_viewport(width, height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat,
                        ..
                    },
                ..
            } => {
                if let Some(action) = keymap::action_for_event(key, repeat) {
                    if self.state.apply(action) == Control::Exit {
                        event_loop.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(renderer) = &mut self.renderer {
            renderer.cleanup();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("anaglyph-desktop starting");

    let event_loop = EventLoop::new().context("failed to initialize windowing system")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(&cli);
    event_loop.run_app(&mut app)?;

    match app.init_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
