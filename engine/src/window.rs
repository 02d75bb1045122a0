//====================================================================

use std::sync::Arc;

use renderer::tools::Size;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::StartCause,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{CursorGrabMode, Fullscreen, WindowAttributes},
};

use crate::{
    config::Config,
    error::EngineError,
    scene::{InputMode, Scene, SceneContext},
};

use super::State;

//====================================================================

#[derive(Clone)]
pub struct Window(pub Arc<winit::window::Window>);
impl Window {
    pub(super) fn new(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self, EngineError> {
        let mut attributes = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(
                config.window_size.width,
                config.window_size.height,
            ));

        if config.fullscreen {
            attributes = attributes.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        let window = event_loop.create_window(attributes)?;
        log::debug!("Created window '{}'", config.title);

        Ok(Self(Arc::new(window)))
    }

    #[inline]
    pub fn size(&self) -> Size<u32> {
        let window_size = self.0.inner_size();

        Size {
            width: window_size.width,
            height: window_size.height,
        }
    }

    pub fn set_input_mode(&self, mode: InputMode) {
        let (grab, visible) = match mode {
            InputMode::Ui => (CursorGrabMode::None, true),
            InputMode::Captured => (CursorGrabMode::Confined, false),
        };

        // Some platforms only support one of the two grab modes
        let result = self.0.set_cursor_grab(grab).or_else(|_| match grab {
            CursorGrabMode::Confined => self.0.set_cursor_grab(CursorGrabMode::Locked),
            _ => Ok(()),
        });

        if let Err(e) = result {
            log::warn!("Unable to set cursor grab for {:?}: {}", mode, e);
        }

        self.0.set_cursor_visible(visible);
    }
}

//====================================================================

/// Creates every scene once the services exist. The first registered scene
/// starts unless [`Config::first_scene`] names another one.
pub type SceneBuilder =
    Box<dyn FnOnce(&mut SceneContext) -> anyhow::Result<Vec<Box<dyn Scene>>>>;

pub struct Runner {
    config: Config,
    builder: Option<SceneBuilder>,
    state: Option<State>,
    error: Option<anyhow::Error>,
}

impl Runner {
    pub fn run(config: Config, builder: SceneBuilder) -> anyhow::Result<()> {
        let mut runner = Self {
            config,
            builder: Some(builder),
            state: None,
            error: None,
        };

        EventLoop::new()
            .map_err(EngineError::from)?
            .run_app(&mut runner)
            .map_err(EngineError::from)?;

        match runner.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Keep the first error and stop the loop.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);

        if self.error.is_none() {
            self.error = Some(error);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for Runner {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        log::trace!("App Resumed - Creating state.");

        if self.state.is_some() {
            log::warn!("State already exists.");
            return;
        }

        let Some(builder) = self.builder.take() else {
            log::warn!("Scenes have already been built");
            return;
        };

        match State::new(event_loop, &self.config, builder) {
            Ok(state) => {
                state.request_redraw();
                self.state = Some(state);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    #[inline]
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: winit::event::WindowEvent,
    ) {
        let result = match &mut self.state {
            Some(state) => state.window_event(event_loop, window_id, event),
            None => Ok(()),
        };

        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn new_events(&mut self, _event_loop: &ActiveEventLoop, cause: winit::event::StartCause) {
        if let Some(state) = &mut self.state {
            if let StartCause::ResumeTimeReached { .. } = cause {
                state.request_redraw();
            }
        }
    }

    fn exiting(&mut self, event_loop: &ActiveEventLoop) {
        let Some(mut state) = self.state.take() else {
            return;
        };

        if let Err(e) = state.shutdown() {
            self.fail(event_loop, e);
        }
    }
}

//====================================================================
