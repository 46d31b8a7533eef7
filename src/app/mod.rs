//! Winit Application
//!
//! - [`Viewer`]: window-independent viewer state. It turns key presses into
//!   [`Command`]s and applies them to a [`Renderer`].
//! - [`App`]: builder that opens the window and runs the event loop.
//! - `AppRunner`: the winit [`ApplicationHandler`] driving both.
//!
//! # Key bindings
//!
//! | Key       | Action                                   |
//! |-----------|------------------------------------------|
//! | `1/2/3`   | Forward / Deferred / PBR path            |
//! | `O`       | Toggle SSAO                              |
//! | `B`       | Toggle Blinn-Phong                       |
//! | `L`       | Toggle point / directional light         |
//! | `M`       | Next model                               |
//! | `K`       | Next skybox                              |
//! | `T`       | Next material                            |
//! | `E`       | Stage next environment                   |
//! | `Enter`   | Run the staged environment swap          |
//! | `P`       | Toggle probe sphere                      |
//! | `Escape`  | Quit                                     |
//! | `WASD`, left mouse drag, wheel | Fly camera              |

pub mod input_adapter;

use std::sync::Arc;
use std::time::Instant;

use smallvec::SmallVec;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::assets::ProceduralMeshLoader;
use crate::config::{InitialSelection, ViewerConfig};
use crate::errors::Result;
use crate::renderer::core::{GpuContext, WgpuContext};
use crate::renderer::frame::ShadingPath;
use crate::renderer::{FrameInputs, Renderer};
use crate::resources::input::{InputSnapshot, Key};
use crate::scene::{FlyCamera, ModelTransform};
use crate::utils::FpsCounter;

/// One user action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    SelectPath(ShadingPath),
    ToggleSsao,
    ToggleBlinn,
    ToggleLightMode,
    NextModel,
    NextSkybox,
    NextMaterial,
    StageNextEnvironment,
    AcknowledgeEnvironment,
    ToggleProbeSphere,
    Quit,
}

const BINDINGS: [(Key, Command); 13] = [
    (Key::Key1, Command::SelectPath(ShadingPath::Forward)),
    (Key::Key2, Command::SelectPath(ShadingPath::Deferred)),
    (Key::Key3, Command::SelectPath(ShadingPath::Pbr)),
    (Key::O, Command::ToggleSsao),
    (Key::B, Command::ToggleBlinn),
    (Key::L, Command::ToggleLightMode),
    (Key::M, Command::NextModel),
    (Key::K, Command::NextSkybox),
    (Key::T, Command::NextMaterial),
    (Key::E, Command::StageNextEnvironment),
    (Key::Enter, Command::AcknowledgeEnvironment),
    (Key::P, Command::ToggleProbeSphere),
    (Key::Escape, Command::Quit),
];

/// Commands for the keys that went down this frame, in binding order.
#[must_use]
pub fn commands(input: &InputSnapshot) -> SmallVec<[Command; 4]> {
    BINDINGS
        .iter()
        .filter(|(key, _)| input.get_key_down(*key))
        .map(|(_, command)| *command)
        .collect()
}

/// Everything the viewer tracks besides the renderer.
pub struct Viewer {
    config: ViewerConfig,
    pub camera: FlyCamera,
    pub transform: ModelTransform,
    selection: InitialSelection,
    staged_environment: Option<usize>,
    loader: ProceduralMeshLoader,
    fps: FpsCounter,
}

impl Viewer {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            selection: config.initial,
            config,
            camera: FlyCamera::default(),
            transform: ModelTransform::default(),
            staged_environment: None,
            loader: ProceduralMeshLoader,
            fps: FpsCounter::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    #[must_use]
    pub fn selection(&self) -> InitialSelection {
        self.selection
    }

    /// Binds the initially selected model, skybox, material and environment.
    ///
    /// A slot that fails stays empty and the viewer keeps running. Returns the
    /// number of slots that failed.
    pub fn load_initial(&self, renderer: &mut Renderer, ctx: &GpuContext) -> usize {
        let s = self.selection;
        let results = [
            (
                "model",
                renderer.request_model(ctx, &self.loader, &self.config.models[s.model]),
            ),
            (
                "skybox",
                renderer.request_skybox(ctx, &self.config.skyboxes[s.skybox]),
            ),
            (
                "material",
                renderer.request_material(ctx, &self.config.materials[s.material]),
            ),
            (
                "environment",
                renderer.load_environment(ctx, &self.config.environments[s.environment]),
            ),
        ];

        let mut failed = 0;
        for (slot, result) in results {
            if let Err(err) = result {
                log::warn!("Initial {slot} not loaded, slot left empty: {err}");
                failed += 1;
            }
        }
        failed
    }

    /// Applies one command. Returns `false` when the viewer should quit.
    pub fn execute(&mut self, command: Command, renderer: &mut Renderer, ctx: &GpuContext) -> bool {
        let state = renderer.state_mut();
        match command {
            Command::SelectPath(path) => state.set_path(path),
            Command::ToggleSsao => state.set_ssao_enabled(!state.ssao_enabled()),
            Command::ToggleBlinn => state.set_blinn(!state.blinn()),
            Command::ToggleLightMode => state.set_light_mode(state.light_mode().toggled()),
            Command::ToggleProbeSphere => state.set_probe_sphere(!state.probe_sphere()),
            Command::NextModel => {
                let next = next_index(self.selection.model, self.config.models.len());
                if renderer
                    .request_model(ctx, &self.loader, &self.config.models[next])
                    .is_ok()
                {
                    self.selection.model = next;
                }
            }
            Command::NextSkybox => {
                let next = next_index(self.selection.skybox, self.config.skyboxes.len());
                if renderer
                    .request_skybox(ctx, &self.config.skyboxes[next])
                    .is_ok()
                {
                    self.selection.skybox = next;
                }
            }
            Command::NextMaterial => {
                let next = next_index(self.selection.material, self.config.materials.len());
                if renderer
                    .request_material(ctx, &self.config.materials[next])
                    .is_ok()
                {
                    self.selection.material = next;
                }
            }
            Command::StageNextEnvironment => {
                let from = self.staged_environment.unwrap_or(self.selection.environment);
                let next = next_index(from, self.config.environments.len());
                renderer.request_environment(self.config.environments[next].clone());
                self.staged_environment = Some(next);
            }
            Command::AcknowledgeEnvironment => {
                let staged = self.staged_environment.take();
                let acknowledged = renderer.acknowledge_environment_swap(ctx);
                if let (Ok(true), Some(index)) = (acknowledged, staged) {
                    self.selection.environment = index;
                }
            }
            Command::Quit => return false,
        }
        true
    }

    /// Moves the camera and reports the frame rate once per second.
    pub fn update(&mut self, input: &InputSnapshot, dt: f32) {
        self.camera.update(input, dt);
        if let Some(fps) = self.fps.update() {
            log::debug!("{fps:.1} fps");
        }
    }

    #[must_use]
    pub fn frame_inputs(&self, aspect: f32) -> FrameInputs {
        FrameInputs {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(aspect),
            model: self.transform.matrix(),
            camera_position: self.camera.position,
        }
    }
}

fn next_index(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

/// Application builder.
pub struct App {
    config: ViewerConfig,
}

impl App {
    #[must_use]
    pub fn new(config: ViewerConfig) -> Self {
        Self { config }
    }

    /// Opens the window and blocks until it closes.
    pub fn run(self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut runner = AppRunner::new(self.config);
        event_loop.run_app(&mut runner)?;
        Ok(())
    }
}

struct AppRunner {
    window: Option<Arc<Window>>,
    wgpu: Option<WgpuContext>,
    renderer: Option<Renderer>,
    viewer: Viewer,
    input: InputSnapshot,
    last_frame: Instant,
}

impl AppRunner {
    fn new(config: ViewerConfig) -> Self {
        Self {
            window: None,
            wgpu: None,
            renderer: None,
            viewer: Viewer::new(config),
            input: InputSnapshot::new(),
            last_frame: Instant::now(),
        }
    }

    fn init(&mut self, window: &Arc<Window>) -> Result<()> {
        let settings = self.viewer.config().renderer_settings();
        let size = window.inner_size();
        let wgpu = pollster::block_on(WgpuContext::new(
            window.clone(),
            &settings,
            size.width,
            size.height,
        ))?;
        let (width, height) = wgpu.size();
        let mut renderer = Renderer::new(&wgpu.gpu, settings, wgpu.color_format(), width, height)?;
        let failed = self.viewer.load_initial(&mut renderer, &wgpu.gpu);
        if failed > 0 {
            log::warn!("{failed} of 4 initial assets failed to load");
        }

        self.wgpu = Some(wgpu);
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Returns `false` when a command asked to quit.
    fn update(&mut self) -> bool {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        let (Some(wgpu), Some(renderer)) = (&self.wgpu, &mut self.renderer) else {
            return true;
        };

        let mut running = true;
        for command in commands(&self.input) {
            running &= self.viewer.execute(command, renderer, &wgpu.gpu);
        }
        self.viewer.update(&self.input, dt);
        self.input.start_frame();
        running
    }

    fn render_frame(&mut self) {
        let (Some(wgpu), Some(renderer)) = (&mut self.wgpu, &mut self.renderer) else {
            return;
        };

        let output = match wgpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = wgpu.size();
                wgpu.resize(width, height);
                return;
            }
            Err(e) => {
                log::error!("Render error: {e:?}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (width, height) = wgpu.size();
        let inputs = self.viewer.frame_inputs(width as f32 / height.max(1) as f32);
        if let Err(e) = renderer.render(&wgpu.gpu, &view, &inputs) {
            log::error!("Frame skipped: {e}");
        }
        output.present();
    }

    fn resize(&mut self, width: u32, height: u32) {
        let (Some(wgpu), Some(renderer)) = (&mut self.wgpu, &mut self.renderer) else {
            return;
        };
        wgpu.resize(width, height);
        // Failure keeps the previous targets; already logged.
        let _ = renderer.resize(&wgpu.gpu, width, height);
    }
}

impl ApplicationHandler for AppRunner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_config = &self.viewer.config().window;
        let attributes = Window::default_attributes()
            .with_title(&window_config.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                window_config.width,
                window_config.height,
            ));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        log::info!("Initializing renderer...");
        if let Err(e) = self.init(&window) {
            log::error!("Fatal renderer error: {e}");
            event_loop.exit();
            return;
        }

        self.window = Some(window);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        input_adapter::process_window_event(&mut self.input, &event);

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => self.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                if !self.update() {
                    event_loop.exit();
                    return;
                }
                self.render_frame();
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
