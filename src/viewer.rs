//! Standalone visualization window backed by winit.
//!
//! ```no_run
//! # use xtalview::Viewer;
//! Viewer::builder()
//!     .with_metrics_path("data/metrics.json")
//!     .build()
//!     .run()
//!     .unwrap();
//! ```
//!
//! Redraw requests stand in for vsync: the frame loop asks for a redraw,
//! and each `RedrawRequested` answers the pending request.

use std::path::PathBuf;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use web_time::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowId};

use crate::dashboard::Dashboard;
use crate::error::XtalError;
use crate::gpu::render_context::RenderContext;
use crate::ice::IceAnalysis;
use crate::input::{InputEvent, InputProcessor, KeyBindings, ViewerCommand};
use crate::metrics::MetricsDataset;
use crate::options::Options;
use crate::playback::Playback;
use crate::renderer::SceneRenderer;
use crate::scheduler::{FrameLoop, FrameRequest, VsyncSource};
use crate::viewport::Viewport;

// ── Builder ──────────────────────────────────────────────────────────────

/// Fluent builder for [`Viewer`].
pub struct ViewerBuilder {
    metrics_path: Option<PathBuf>,
    options: Options,
    key_bindings: KeyBindings,
    ice: Option<IceAnalysis>,
    title: String,
}

impl ViewerBuilder {
    fn new() -> Self {
        Self {
            metrics_path: None,
            options: Options::default(),
            key_bindings: KeyBindings::default(),
            ice: None,
            title: "xtalview".into(),
        }
    }

    /// Metrics JSON to display.
    #[must_use]
    pub fn with_metrics_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metrics_path = Some(path.into());
        self
    }

    /// Override the default options.
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Override the default key bindings.
    #[must_use]
    pub fn with_key_bindings(mut self, key_bindings: KeyBindings) -> Self {
        self.key_bindings = key_bindings;
        self
    }

    /// Ice-ring analysis to attach to the session.
    #[must_use]
    pub fn with_ice(mut self, ice: IceAnalysis) -> Self {
        self.ice = Some(ice);
        self
    }

    /// Set the window title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Consume the builder and produce a [`Viewer`].
    #[must_use]
    pub fn build(self) -> Viewer {
        Viewer { config: self }
    }
}

// ── Viewer ───────────────────────────────────────────────────────────────

/// A window showing the reciprocal-space scene for one metrics dataset.
pub struct Viewer {
    config: ViewerBuilder,
}

impl Viewer {
    /// Start a new builder.
    #[must_use]
    pub fn builder() -> ViewerBuilder {
        ViewerBuilder::new()
    }

    /// Load the dataset, open the window and run the event loop. Blocks
    /// until the window is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if no metrics file was given or it cannot be
    /// loaded, if the event loop fails, or if GPU initialisation fails.
    pub fn run(self) -> Result<(), XtalError> {
        let Some(path) = &self.config.metrics_path else {
            return Err(XtalError::Viewer("no metrics file given".into()));
        };
        let dataset = MetricsDataset::load(path)?;
        log::info!(
            "dataset '{}': {} frames",
            dataset.dataset,
            dataset.frame_count()
        );

        let event_loop = EventLoop::new().map_err(|e| XtalError::Viewer(e.to_string()))?;
        event_loop.set_control_flow(ControlFlow::Wait);

        let mut app = ViewerApp {
            config: self.config,
            dataset: Some(dataset),
            session: None,
            error: None,
        };
        event_loop
            .run_app(&mut app)
            .map_err(|e| XtalError::Viewer(e.to_string()))?;
        app.error.map_or(Ok(()), Err)
    }
}

// ── Vsync via redraw requests ────────────────────────────────────────────

/// Frame requests answered by the window's next `RedrawRequested`.
struct RedrawVsync {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<FrameRequest>,
}

impl RedrawVsync {
    fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// The request a redraw should answer, if any.
    fn take(&mut self) -> Option<FrameRequest> {
        self.pending.take()
    }
}

impl VsyncSource for RedrawVsync {
    fn request_frame(&mut self) -> FrameRequest {
        self.next_id += 1;
        let request = FrameRequest(self.next_id);
        self.pending = Some(request);
        self.window.request_redraw();
        request
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        if self.pending == Some(request) {
            self.pending = None;
        }
    }
}

// ── Winit app ────────────────────────────────────────────────────────────

/// Everything that exists while the window is open.
struct Session {
    window: Arc<Window>,
    context: RenderContext,
    renderer: SceneRenderer,
    frame_loop: FrameLoop<Dashboard<StdRng>, RedrawVsync>,
    playback: Playback,
    viewport: Viewport,
    input: InputProcessor,
    last_redraw: Instant,
}

impl Session {
    fn open(
        event_loop: &ActiveEventLoop,
        config: &ViewerBuilder,
        dataset: MetricsDataset,
    ) -> Result<Self, XtalError> {
        let attrs = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 800));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .map_err(|e| XtalError::Viewer(e.to_string()))?,
        );
        let size = window.inner_size();
        let context = pollster::block_on(RenderContext::new(
            window.clone(),
            (size.width, size.height),
        ))?;
        let renderer = SceneRenderer::new(&context);

        let playback = Playback::new(dataset.frame_count(), &config.options.playback);
        let mut dashboard = Dashboard::new(
            dataset,
            config.options.clone(),
            size.width,
            size.height,
            StdRng::from_os_rng(),
        );
        if let Some(ice) = &config.ice {
            dashboard.set_ice(ice.clone());
        }

        let mut frame_loop = FrameLoop::new(dashboard, RedrawVsync::new(window.clone()));
        let now = Instant::now();
        frame_loop.mount(now)?;
        let _ = frame_loop.resize(size.width, size.height);

        let mut session = Self {
            window,
            context,
            renderer,
            frame_loop,
            playback,
            viewport: Viewport::new(),
            input: InputProcessor::with_bindings(config.key_bindings.clone()),
            last_redraw: now,
        };
        session.publish_frame(&config.title);
        Ok(session)
    }

    /// Push the playback position into the loop and reflect it in the title.
    fn publish_frame(&mut self, title: &str) {
        let frame = self.playback.current_frame();
        let input = self.frame_loop.hooks().input_for(frame);
        if self.frame_loop.submit(input) {
            let dashboard = self.frame_loop.hooks();
            self.window.set_title(&format!(
                "{title} | frame {}/{} | {}",
                frame,
                self.playback.total_frames(),
                dashboard.quality_band().label()
            ));
        }
        self.frame_loop.set_playing(self.playback.is_playing());
    }

    /// Hand the image pan and zoom to the ring overlay.
    fn publish_viewport(&mut self) {
        log::trace!("viewport zoom {}%", self.viewport.zoom_percent());
        self.frame_loop.hooks_mut().set_viewport(&self.viewport);
    }

    fn apply(&mut self, command: ViewerCommand, title: &str) {
        let changed = match command {
            ViewerCommand::TogglePlay => {
                self.playback.toggle();
                true
            }
            ViewerCommand::PreviousFrame => self.playback.step_back(),
            ViewerCommand::NextFrame => self.playback.step_forward(),
            ViewerCommand::ResetPlayback => self.playback.reset(),
            ViewerCommand::ZoomIn => self.viewport.zoom_in(),
            ViewerCommand::ZoomOut => self.viewport.zoom_out(),
            ViewerCommand::ResetView => {
                self.viewport.reset();
                true
            }
        };
        if changed {
            self.publish_viewport();
            log::debug!("{command:?}: {:?}", self.playback.view());
            self.publish_frame(title);
        }
    }

    fn redraw(&mut self, title: &str) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last_redraw);
        self.last_redraw = now;
        if self.playback.advance(dt) {
            self.publish_frame(title);
        } else {
            self.frame_loop.set_playing(self.playback.is_playing());
        }

        if let Some(request) = self.frame_loop.vsync_mut().take() {
            let _ = self.frame_loop.on_vsync(request, now);
        }

        self.renderer
            .sync(&self.context, self.frame_loop.hooks_mut().scene_mut());
        match self.context.get_next_frame() {
            Ok(frame) => {
                let view = frame
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                self.renderer.render(
                    &self.context,
                    &view,
                    self.frame_loop.hooks().scene().state(),
                );
                frame.present();
            }
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                log::warn!("surface lost, reconfiguring");
                self.context.reconfigure();
            }
            Err(e) => log::error!("render error: {e:?}"),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if self.context.resize(width, height) {
            log::debug!("surface resized to {width}x{height}");
            let _ = self.frame_loop.resize(width, height);
            let _ = self.renderer.resize(&self.context.device, (width, height));
        }
    }

    fn close(&mut self) {
        let _ = self.frame_loop.unmount();
        self.frame_loop.hooks_mut().scene_mut().dispose();
        self.renderer
            .sync(&self.context, self.frame_loop.hooks_mut().scene_mut());
    }
}

/// Internal winit application handler.
struct ViewerApp {
    config: ViewerBuilder,
    dataset: Option<MetricsDataset>,
    session: Option<Session>,
    error: Option<XtalError>,
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.session.is_some() {
            return;
        }
        let Some(dataset) = self.dataset.take() else {
            return;
        };
        match Session::open(event_loop, &self.config, dataset) {
            Ok(session) => self.session = Some(session),
            Err(e) => {
                log::error!("failed to open viewer: {e}");
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let title = self.config.title.as_str();

        match event {
            WindowEvent::CloseRequested => {
                session.close();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => session.resize(size.width, size.height),
            WindowEvent::RedrawRequested => session.redraw(title),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let PhysicalKey::Code(code) = event.physical_key {
                    if let Some(command) = session.input.handle_key_press(&format!("{code:?}")) {
                        session.apply(command, title);
                    }
                }
            }
            other => {
                if let Some(input) = InputEvent::from_window_event(&other) {
                    if session.input.handle_event(input, &mut session.viewport) {
                        session.publish_viewport();
                    }
                }
            }
        }
    }
}
