//====================================================================

use crate::{DrawStateId, ProgramId, TextureId};

//====================================================================

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no compatible graphics adapter found")]
    NoAdapter,

    #[error("failed to request device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("failed to compile program '{label}': {message}")]
    ProgramCompile { label: String, message: String },

    #[error("unknown program {0:?}")]
    UnknownProgram(ProgramId),

    #[error("unknown draw state {0:?}")]
    UnknownDrawState(DrawStateId),

    #[error("unknown texture {0:?}")]
    UnknownTexture(TextureId),

    #[error("draw issued with no program in use")]
    NoProgram,

    #[error("draw issued with no draw state bound")]
    NoDrawState,

    #[error("texture slot {slot} is empty but program '{label}' samples it")]
    EmptyTextureSlot { slot: u32, label: String },
}

//====================================================================
