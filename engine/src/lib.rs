//====================================================================

use std::time::Duration;

use audio::SoundLibrary;
use config::Config;
use graphics::Graphics;
use renderer::Renderer;
use scene::{InputMode, SceneContext, SceneManager, SceneRequests};
use tools::{Input, Time};
use window::{SceneBuilder, Window};
use winit::{
    event::WindowEvent,
    event_loop::ActiveEventLoop,
    keyboard::KeyCode,
    window::WindowId,
};

pub mod audio;
pub mod config;
pub mod error;
pub mod graphics;
pub mod scene;
pub mod tools;
pub mod window;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

//====================================================================

pub struct State {
    inner: StateInner,
    scenes: SceneManager,
    input_mode: InputMode,
}

pub struct StateInner {
    pub fps: Duration,
    pub window: Window,
    pub graphics: Graphics,
    pub audio: SoundLibrary,
    pub keys: Input<KeyCode>,
    pub time: Time,
    pub requests: SceneRequests,
}

impl StateInner {
    pub fn context(&mut self) -> SceneContext<'_> {
        SceneContext {
            audio: &mut self.audio,
            graphics: &mut self.graphics,
            input: &mut self.keys,
            scenes: &mut self.requests,
        }
    }
}

impl State {
    pub fn new(
        event_loop: &ActiveEventLoop,
        config: &Config,
        builder: SceneBuilder,
    ) -> anyhow::Result<Self> {
        let window = Window::new(event_loop, config)?;
        let renderer = Renderer::new(window.0.clone(), window.size())?;
        let audio = SoundLibrary::new(&config.sound_path)?;

        let mut inner = StateInner {
            fps: config.frame_duration(),
            window,
            graphics: Graphics::new(renderer, &config.image_path),
            audio,
            keys: Input::default(),
            time: Time::default(),
            requests: SceneRequests::default(),
        };

        let scenes = builder(&mut inner.context())?;
        log::info!("Built {} scene(s)", scenes.len());

        let mut scenes = SceneManager::new(scenes, config.first_scene.as_deref())?;
        scenes.start(&mut inner.context())?;

        let input_mode = scenes.input_mode();
        inner.window.set_input_mode(input_mode);

        Ok(Self {
            inner,
            scenes,
            input_mode,
        })
    }

    pub fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) -> anyhow::Result<()> {
        match event {
            WindowEvent::Resized(physical_size) => {
                if physical_size.width == 0 || physical_size.height == 0 {
                    log::warn!(
                        "Window resized to invalid size ({}, {})",
                        physical_size.width,
                        physical_size.height
                    );
                    return Ok(());
                }
                let size = (physical_size.width, physical_size.height).into();
                self.inner.graphics.resize(size);
            }

            WindowEvent::CloseRequested => {
                log::info!("Close requested. Closing App");
                event_loop.exit();
            }

            WindowEvent::Destroyed => log::error!("Window was destroyed"),

            WindowEvent::KeyboardInput { event, .. } => {
                if let winit::keyboard::PhysicalKey::Code(key) = event.physical_key {
                    tools::process_inputs(&mut self.inner.keys, key, event.state.is_pressed())
                }
            }

            WindowEvent::RedrawRequested => {
                event_loop.set_control_flow(winit::event_loop::ControlFlow::wait_duration(
                    self.inner.fps,
                ));

                self.tick(event_loop)?;
            }

            _ => {}
        }

        Ok(())
    }

    #[inline]
    pub fn request_redraw(&self) {
        self.inner.window.0.request_redraw();
    }

    pub fn tick(&mut self, event_loop: &ActiveEventLoop) -> anyhow::Result<()> {
        if self.scenes.has_exited() {
            return Ok(());
        }

        tools::tick_time(&mut self.inner.time);
        log::trace!(
            "Frame {} ({:.4}s)",
            self.inner.time.frames(),
            self.inner.time.delta_seconds()
        );

        let delta_seconds = self.inner.time.delta_seconds();
        let rendered = self.scenes.frame(&mut self.inner.context(), delta_seconds)?;

        if rendered {
            self.inner.graphics.present();
        }

        if !self.scenes.has_exited() {
            let input_mode = self.scenes.input_mode();
            if input_mode != self.input_mode {
                self.inner.window.set_input_mode(input_mode);
                self.input_mode = input_mode;
            }
        }

        tools::reset_input(&mut self.inner.keys);

        if self.scenes.has_exited() {
            log::info!("Exit requested by scene '{}'", self.scenes.current());
            event_loop.exit();
        }

        Ok(())
    }

    /// Destroy every scene while the services they hold handles into still
    /// exist.
    pub fn shutdown(&mut self) -> anyhow::Result<()> {
        log::info!("Shutting down");
        self.scenes.destroy_all(&mut self.inner.context())
    }
}

//====================================================================
