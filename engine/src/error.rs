//====================================================================

use std::path::PathBuf;

use renderer::RenderError;

use crate::{audio::SoundHandle, graphics::ImageHandle};

//====================================================================

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to open audio output: {0}")]
    AudioOutput(#[from] rodio::StreamError),

    #[error("failed to create audio sink: {0}")]
    AudioSink(#[from] rodio::PlayError),

    #[error("failed to read sound '{path}': {source}")]
    SoundIo {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to decode sound '{path}': {source}")]
    SoundDecode {
        path: PathBuf,
        source: rodio::decoder::DecoderError,
    },

    #[error("sound '{0}' is already loaded")]
    SoundAlreadyLoaded(String),

    #[error("sound '{0}' has not been loaded")]
    UnknownSound(String),

    #[error("unknown sound player {0:?}")]
    UnknownPlayer(SoundHandle),

    #[error("failed to load image '{path}': {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("unknown image {0:?}")]
    UnknownImage(ImageHandle),

    #[error("image '{0}' has no host memory copy")]
    ImageNotOnCpu(String),

    #[error("image '{0}' has not been uploaded to the gpu")]
    ImageNotOnGpu(String),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("event loop failed: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("no scenes were provided")]
    NoScenes,

    #[error("scene '{0}' is registered more than once")]
    DuplicateScene(String),

    #[error("no scene named '{0}'")]
    UnknownScene(String),
}

//====================================================================
