//====================================================================

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc,
};

use program::ShaderProgram;
use rustc_hash::FxHashMap;
use shared::SharedRenderResources;
use slots::TextureSlots;
use texture::{LoadedTexture, Texture};
use tools::Size;
use wgpu::SurfaceTarget;

pub use error::RenderError;
pub use program::{ProgramId, ProgramSource, Topology};
pub use texture::TextureId;

pub mod error;
pub mod program;
pub mod shared;
pub mod slots;
pub mod texture;
pub mod tools;

//====================================================================

static CURRENT_DRAW_STATE_ID: AtomicU32 = AtomicU32::new(0);

/// Handle to the per-draw input state. Draws are only accepted while one is
/// bound. The fullscreen passes this renderer serves pull no vertex buffers,
/// so the state only carries its label.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct DrawStateId(pub u32);

struct DrawCommand {
    pipeline: Arc<wgpu::RenderPipeline>,
    textures: Vec<(u32, Arc<LoadedTexture>)>,
    vertex_count: u32,
}

//====================================================================

pub struct Renderer {
    core: RendererCore,
    shared: SharedRenderResources,

    pub clear_color: wgpu::Color,

    programs: FxHashMap<ProgramId, ShaderProgram>,
    draw_states: FxHashMap<DrawStateId, String>,
    textures: FxHashMap<TextureId, Arc<LoadedTexture>>,

    current_program: Option<ProgramId>,
    current_draw_state: Option<DrawStateId>,
    bound_textures: TextureSlots<Arc<LoadedTexture>>,

    clear_requested: bool,
    commands: Vec<DrawCommand>,
}

impl Renderer {
    pub fn new(
        window: impl Into<SurfaceTarget<'static>>,
        window_size: Size<u32>,
    ) -> Result<Self, RenderError> {
        let core = pollster::block_on(RendererCore::new(window, window_size))?;
        let shared = SharedRenderResources::new(&core.device);

        let clear_color = wgpu::Color {
            r: 0.,
            g: 0.,
            b: 0.,
            a: 1.,
        };

        Ok(Self {
            core,
            shared,
            clear_color,
            programs: FxHashMap::default(),
            draw_states: FxHashMap::default(),
            textures: FxHashMap::default(),
            current_program: None,
            current_draw_state: None,
            bound_textures: TextureSlots::default(),
            clear_requested: false,
            commands: Vec::new(),
        })
    }

    pub fn resize(&mut self, new_size: Size<u32>) {
        self.core.config.width = new_size.width;
        self.core.config.height = new_size.height;
        self.core
            .surface
            .configure(&self.core.device, &self.core.config);
    }
}

//--------------------------------------------------
// Programs and draw state

impl Renderer {
    pub fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId, RenderError> {
        let program =
            ShaderProgram::compile(&self.core.device, &self.core.config, &self.shared, source)?;
        let id = program.id();
        self.programs.insert(id, program);

        Ok(id)
    }

    pub fn use_program(&mut self, id: ProgramId) -> Result<(), RenderError> {
        if !self.programs.contains_key(&id) {
            return Err(RenderError::UnknownProgram(id));
        }
        self.current_program = Some(id);
        Ok(())
    }

    pub fn release_program(&mut self, id: ProgramId) -> Result<(), RenderError> {
        let program = self
            .programs
            .remove(&id)
            .ok_or(RenderError::UnknownProgram(id))?;

        log::debug!("Released program '{}'", program.label());

        if self.current_program == Some(id) {
            self.current_program = None;
        }
        Ok(())
    }

    pub fn create_draw_state(&mut self, label: &str) -> DrawStateId {
        let id = DrawStateId(CURRENT_DRAW_STATE_ID.fetch_add(1, Ordering::Relaxed));
        self.draw_states.insert(id, label.to_string());
        id
    }

    pub fn bind_draw_state(&mut self, id: DrawStateId) -> Result<(), RenderError> {
        if !self.draw_states.contains_key(&id) {
            return Err(RenderError::UnknownDrawState(id));
        }
        self.current_draw_state = Some(id);
        Ok(())
    }

    pub fn release_draw_state(&mut self, id: DrawStateId) -> Result<(), RenderError> {
        self.draw_states
            .remove(&id)
            .ok_or(RenderError::UnknownDrawState(id))?;

        if self.current_draw_state == Some(id) {
            self.current_draw_state = None;
        }
        Ok(())
    }
}

//--------------------------------------------------
// Textures

impl Renderer {
    pub fn create_texture(&mut self, image: &image::DynamicImage, label: &str) -> TextureId {
        let texture = Texture::from_image(
            &self.core.device,
            &self.core.queue,
            image,
            Some(label),
            None,
        );
        let loaded = LoadedTexture::load_texture(&self.core.device, &self.shared, texture, Some(label));
        let id = loaded.id();

        log::debug!(
            "Uploaded texture '{}' ({}x{}) as {:?}",
            label,
            image.width(),
            image.height(),
            id
        );

        self.textures.insert(id, Arc::new(loaded));
        id
    }

    pub fn bind_texture(&mut self, slot: u32, id: TextureId) -> Result<(), RenderError> {
        let texture = self
            .textures
            .get(&id)
            .ok_or(RenderError::UnknownTexture(id))?;

        self.bound_textures.bind(slot, id, texture.clone());
        Ok(())
    }

    /// Empty the slots still holding `id`. Returns how many there were.
    #[inline]
    pub fn unbind_texture(&mut self, id: TextureId) -> usize {
        self.bound_textures.unbind(id)
    }

    #[inline]
    pub fn texture_slots(&self, id: TextureId) -> Vec<u32> {
        self.bound_textures.slots_of(id)
    }

    pub fn release_texture(&mut self, id: TextureId) -> Result<(), RenderError> {
        self.textures
            .remove(&id)
            .ok_or(RenderError::UnknownTexture(id))?;

        self.bound_textures.unbind(id);
        Ok(())
    }
}

//--------------------------------------------------
// Frame recording

impl Renderer {
    #[inline]
    pub fn clear(&mut self) {
        self.clear_requested = true;
    }

    pub fn draw(&mut self, vertex_count: u32, topology: Topology) -> Result<(), RenderError> {
        let program_id = self.current_program.ok_or(RenderError::NoProgram)?;
        if self.current_draw_state.is_none() {
            return Err(RenderError::NoDrawState);
        }

        let program = self
            .programs
            .get_mut(&program_id)
            .ok_or(RenderError::UnknownProgram(program_id))?;

        let pipeline = program.pipeline(&self.core.device, &self.core.config, topology)?;

        let textures = (0..program.texture_slots())
            .map(|slot| match self.bound_textures.get(slot) {
                Some(texture) => Ok((slot, texture.clone())),
                None => Err(RenderError::EmptyTextureSlot {
                    slot,
                    label: program.label().to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.commands.push(DrawCommand {
            pipeline,
            textures,
            vertex_count,
        });

        Ok(())
    }

    /// Encode everything recorded since the last present into a single render
    /// pass and show it.
    pub fn present(&mut self) {
        let commands = std::mem::take(&mut self.commands);
        let clear = std::mem::take(&mut self.clear_requested);

        let mut encoder =
            self.core
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Main command encoder"),
                });

        let (surface_texture, surface_view) = match self.core.surface.get_current_texture() {
            Ok(texture) => {
                let view = texture
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());
                (texture, view)
            }
            Err(_) => {
                log::warn!("Unable to get surface texture - skipping frame");
                return;
            }
        };

        let load = match clear {
            true => wgpu::LoadOp::Clear(self.clear_color),
            false => wgpu::LoadOp::Load,
        };

        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Main Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &surface_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        commands.iter().for_each(|command| {
            render_pass.set_pipeline(&command.pipeline);
            command.textures.iter().for_each(|(slot, texture)| {
                render_pass.set_bind_group(*slot, texture.bind_group(), &[]);
            });
            render_pass.draw(0..command.vertex_count, 0..1);
        });

        std::mem::drop(render_pass);

        self.core.queue.submit(Some(encoder.finish()));
        surface_texture.present();
    }
}

//====================================================================

pub struct RendererCore {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface: wgpu::Surface<'static>,
    pub config: wgpu::SurfaceConfiguration,
}

impl RendererCore {
    pub async fn new(
        window: impl Into<SurfaceTarget<'static>>,
        window_size: Size<u32>,
    ) -> Result<Self, RenderError> {
        log::debug!("Creating core wgpu renderer components.");

        let size = match window_size.is_empty() {
            true => Size::new(450, 400),
            false => window_size,
        };

        log::debug!("Window inner size = {:?}", size);

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(RenderError::NoAdapter)?;

        log::debug!("Chosen device adapter: {:#?}", adapter.get_info());

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await?;

        let surface_capabilities = surface.get_capabilities(&adapter);

        let surface_format = surface_capabilities
            .formats
            .iter()
            .find(|format| format.is_srgb())
            .copied()
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
        };

        surface.configure(&device, &config);

        log::debug!("Successfully created core wgpu components.");

        Ok(Self {
            device,
            queue,
            surface,
            config,
        })
    }
}

//====================================================================
