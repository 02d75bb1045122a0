//====================================================================

use std::path::PathBuf;

use images::ImageStore;
use renderer::{tools::Size, Renderer};

use crate::error::EngineError;

pub use renderer::{DrawStateId, ProgramId, ProgramSource, Topology};

pub mod images;

//====================================================================

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct ImageHandle(pub u32);

/// Program, draw state and frame recording calls available to scenes.
pub trait RenderService {
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId, EngineError>;
    fn use_program(&mut self, program: ProgramId) -> Result<(), EngineError>;
    fn release_program(&mut self, program: ProgramId) -> Result<(), EngineError>;

    fn create_draw_state(&mut self, label: &str) -> Result<DrawStateId, EngineError>;
    fn bind_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError>;
    fn release_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError>;

    /// Clear the colour target before this frame's draws.
    fn clear(&mut self);
    /// Non-indexed draw of `vertex_count` vertices with the current program,
    /// draw state and bound textures.
    fn draw(&mut self, vertex_count: u32, topology: Topology) -> Result<(), EngineError>;
}

/// Image lifecycle calls available to scenes.
pub trait ImageService {
    /// Read `<name>` from disk into host memory.
    fn load_image(&mut self, name: &str) -> Result<ImageHandle, EngineError>;
    /// Copy the host memory image to the gpu.
    fn upload_image(&mut self, image: ImageHandle) -> Result<(), EngineError>;
    fn free_image_cpu(&mut self, image: ImageHandle) -> Result<(), EngineError>;

    fn bind_image(&mut self, image: ImageHandle, slot: u32) -> Result<(), EngineError>;
    fn unbind_image(&mut self, image: ImageHandle) -> Result<(), EngineError>;
    /// Unbind and free every copy of the image.
    fn release_image(&mut self, image: ImageHandle) -> Result<(), EngineError>;
}

pub trait GraphicsService: RenderService + ImageService {}
impl<T: RenderService + ImageService> GraphicsService for T {}

//====================================================================

pub struct Graphics {
    renderer: Renderer,
    images: ImageStore,
}

impl Graphics {
    pub fn new(renderer: Renderer, image_path: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            images: ImageStore::new(image_path),
        }
    }

    #[inline]
    pub fn resize(&mut self, new_size: Size<u32>) {
        self.renderer.resize(new_size);
    }

    #[inline]
    pub fn present(&mut self) {
        self.renderer.present();
    }
}

impl RenderService for Graphics {
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId, EngineError> {
        Ok(self.renderer.create_program(source)?)
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), EngineError> {
        Ok(self.renderer.use_program(program)?)
    }

    fn release_program(&mut self, program: ProgramId) -> Result<(), EngineError> {
        Ok(self.renderer.release_program(program)?)
    }

    fn create_draw_state(&mut self, label: &str) -> Result<DrawStateId, EngineError> {
        Ok(self.renderer.create_draw_state(label))
    }

    fn bind_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError> {
        Ok(self.renderer.bind_draw_state(draw_state)?)
    }

    fn release_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError> {
        Ok(self.renderer.release_draw_state(draw_state)?)
    }

    #[inline]
    fn clear(&mut self) {
        self.renderer.clear();
    }

    fn draw(&mut self, vertex_count: u32, topology: Topology) -> Result<(), EngineError> {
        Ok(self.renderer.draw(vertex_count, topology)?)
    }
}

impl ImageService for Graphics {
    fn load_image(&mut self, name: &str) -> Result<ImageHandle, EngineError> {
        self.images.load_to_cpu(name)
    }

    fn upload_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.images.load_to_gpu(image, &mut self.renderer)
    }

    fn free_image_cpu(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.images.free_cpu(image)
    }

    fn bind_image(&mut self, image: ImageHandle, slot: u32) -> Result<(), EngineError> {
        self.images.bind(image, slot, &mut self.renderer)
    }

    fn unbind_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.images.unbind(image, &mut self.renderer)
    }

    fn release_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.images.release(image, &mut self.renderer)
    }
}

//====================================================================
