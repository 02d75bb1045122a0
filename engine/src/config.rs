//====================================================================

use std::{path::PathBuf, time::Duration};

use renderer::tools::Size;

//====================================================================

const DEFAULT_FPS: f32 = 75.;

#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub window_size: Size<u32>,
    pub fullscreen: bool,
    /// Target redraw rate. Values below 1 are clamped to 1.
    pub fps: f32,

    /// Directory holding `<name>.ogg` sound files.
    pub sound_path: PathBuf,
    /// Directory holding `<name>.png` image files.
    pub image_path: PathBuf,

    /// Scene activated on start. Defaults to the first registered scene.
    pub first_scene: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "Game".into(),
            window_size: Size::new(800, 600),
            fullscreen: false,
            fps: DEFAULT_FPS,
            sound_path: PathBuf::from("assets/sounds"),
            image_path: PathBuf::from("assets/images"),
            first_scene: None,
        }
    }
}

impl Config {
    #[inline]
    pub fn frame_duration(&self) -> Duration {
        Duration::from_secs_f32(1. / self.fps.max(1.))
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_frame_duration() {
        let config = Config::default();
        let expected = 1. / DEFAULT_FPS;
        assert!((config.frame_duration().as_secs_f32() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_frame_duration_clamps_low_fps() {
        let config = Config {
            fps: 0.,
            ..Default::default()
        };
        assert_eq!(config.frame_duration(), Duration::from_secs(1));
    }
}

//====================================================================
