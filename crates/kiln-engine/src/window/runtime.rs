use std::path::Path;

use anyhow::{Context, Result};
use ouroboros::self_referencing;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::Application;
use crate::device::{Gpu, GpuInit, SurfaceErrorAction};
use crate::event::WindowResize;
use crate::profile;
use crate::render::{Renderer2D, Renderer2DConfig, SurfaceTarget, WgpuBackend};

use super::config::RuntimeConfig;
use super::translate::translate_window_event;

/// Entry point: owns the winit event loop for one application window.
pub struct Runtime;

impl Runtime {
    /// Opens the window, builds the GPU context, renderer and
    /// [`Application`], hands the application to `setup` to push its layers,
    /// then runs until the application stops or the window closes.
    ///
    /// Errors from window or GPU creation and from `setup` end the loop and
    /// are returned here.
    ///
    /// With [`RuntimeConfig::profile_dir`] set, startup, the running frames
    /// and shutdown are each traced into their own file.
    pub fn run<F>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        renderer_config: Renderer2DConfig,
        setup: F,
    ) -> Result<()>
    where
        F: FnOnce(&mut Application) -> Result<()>,
    {
        profile_phase(config.profile_dir.as_deref(), "Startup");

        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = RuntimeState {
            config,
            gpu_init,
            renderer_config,
            setup: Some(setup),
            session: None,
            error: None,
        };

        let result = event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error");

        if let Err(err) = profile::end_session() {
            log::warn!("{err:#}");
        }
        result?;

        match state.error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Ends the open profiling session and starts `name` in `dir`.
fn profile_phase(dir: Option<&Path>, name: &str) {
    let Some(dir) = dir else {
        return;
    };
    if let Err(err) = profile::end_session() {
        log::warn!("{err:#}");
    }
    let path = dir.join(format!("kiln-{}.json", name.to_lowercase()));
    if let Err(err) = profile::begin_session(name, &path) {
        log::warn!("profiling disabled: {err:#}");
    }
}

#[self_referencing]
struct WindowEntry {
    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

/// Everything that exists while the window is open. `app` is declared first
/// so layers detach before the GPU goes away.
struct Session {
    app: Application,
    target: SurfaceTarget,
    entry: WindowEntry,
}

struct RuntimeState<F> {
    config: RuntimeConfig,
    gpu_init: GpuInit,
    renderer_config: Renderer2DConfig,
    setup: Option<F>,

    session: Option<Session>,
    error: Option<anyhow::Error>,
}

impl<F> RuntimeState<F>
where
    F: FnOnce(&mut Application) -> Result<()>,
{
    fn open(&mut self, event_loop: &ActiveEventLoop) -> Result<Session> {
        crate::profile_scope!("Runtime::open");

        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed")?;

        let target = SurfaceTarget::default();
        let (backend, size) = entry.with_gpu(|gpu| {
            let backend = WgpuBackend::new(
                gpu.device().clone(),
                gpu.queue().clone(),
                gpu.surface_format(),
                target.clone(),
            );
            (backend, gpu.size())
        });

        let renderer = Renderer2D::new(Box::new(backend), self.renderer_config)?;
        let mut app = Application::new(renderer, size.width, size.height);

        if let Some(setup) = self.setup.take() {
            setup(&mut app).context("application setup failed")?;
        }

        log::info!("window opened: \"{}\" {}x{}", self.config.title, size.width, size.height);
        Ok(Session { app, target, entry })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let Session { app, target, entry } = session;

        if app.is_minimized() {
            app.run_frame();
            return;
        }

        crate::profile_scope!("Runtime::redraw");

        let fatal = entry.with_mut(|fields| {
            let frame = match fields.gpu.begin_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    return fields.gpu.handle_surface_error(err) == SurfaceErrorAction::Fatal;
                }
            };

            let size = fields.gpu.size();
            target.set(frame.view.clone(), size.width, size.height);

            app.run_frame();

            target.clear();
            fields.window.pre_present_notify();
            frame.present();
            false
        });

        if fatal {
            self.fail(event_loop, anyhow::anyhow!("surface out of memory"));
        }
    }
}

impl<F> ApplicationHandler for RuntimeState<F>
where
    F: FnOnce(&mut Application) -> Result<()>,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(session) = self.session.as_mut() {
            session.app.reset_clock();
            session.entry.with_window(|w| w.request_redraw());
            return;
        }

        match self.open(event_loop) {
            Ok(session) => {
                session.entry.with_window(|w| w.request_redraw());
                self.session = Some(session);
                profile_phase(self.config.profile_dir.as_deref(), "Runtime");
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match &event {
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }

            WindowEvent::Resized(size) => {
                session.entry.with_gpu_mut(|gpu| gpu.resize(*size));
            }

            WindowEvent::ScaleFactorChanged { .. } => {
                let size = session.entry.with_window(|w| w.inner_size());
                session.entry.with_gpu_mut(|gpu| gpu.resize(size));
                session.app.queue_event(WindowResize {
                    width: size.width,
                    height: size.height,
                });
            }

            WindowEvent::Focused(false) => session.app.release_input(),

            WindowEvent::CursorLeft { .. } => session.app.pointer_left(),

            _ => {}
        }

        if let Some(session) = self.session.as_mut() {
            let Session { app, entry, .. } = session;
            entry.with_window(|window| {
                translate_window_event(window, &event, |kind| app.queue_event(kind));
            });
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        // Minimized windows may never see RedrawRequested; keep events flowing.
        if session.app.is_minimized() {
            session.app.dispatch_pending();
        }

        if !session.app.is_running() {
            log::info!("shutting down");
            profile_phase(self.config.profile_dir.as_deref(), "Shutdown");
            self.session = None;
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);
        session.entry.with_window(|w| w.request_redraw());
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.session = None;
    }
}
