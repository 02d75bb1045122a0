//====================================================================

use std::path::PathBuf;

use clap::Parser;
use engine::{config::Config, tools::Size};

//====================================================================

#[derive(Parser, Debug, Clone)]
#[command(name = "cogf_demo")]
#[command(about = "Fullscreen image with music that changes pitch every loop", long_about = None)]
pub struct Cli {
    /// Directory holding the .ogg sounds
    #[arg(long, default_value = "assets/sounds")]
    pub sound_path: PathBuf,

    /// Directory holding the .png images
    #[arg(long, default_value = "assets/images")]
    pub image_path: PathBuf,

    #[arg(long, default_value = "COGF Demo")]
    pub title: String,

    #[arg(long, default_value_t = 800)]
    pub width: u32,

    #[arg(long, default_value_t = 600)]
    pub height: u32,

    /// Borderless fullscreen on the current monitor
    #[arg(long)]
    pub fullscreen: bool,

    /// Target frames per second
    #[arg(long, default_value_t = 75.)]
    pub fps: f32,

    /// Seed for the music pitch generator. Random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    pub fn config(&self) -> Config {
        Config {
            title: self.title.clone(),
            window_size: Size::new(self.width, self.height),
            fullscreen: self.fullscreen,
            fps: self.fps,
            sound_path: self.sound_path.clone(),
            image_path: self.image_path.clone(),
            first_scene: None,
        }
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["cogf_demo"]);
        let config = cli.config();

        assert_eq!(config.title, "COGF Demo");
        assert_eq!(config.window_size, Size::new(800, 600));
        assert_eq!(config.sound_path, PathBuf::from("assets/sounds"));
        assert_eq!(config.image_path, PathBuf::from("assets/images"));
        assert!(!config.fullscreen);
        assert_eq!(cli.seed, None);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "cogf_demo",
            "--sound-path",
            "data/audio",
            "--fullscreen",
            "--fps",
            "30",
            "--seed",
            "42",
        ]);
        let config = cli.config();

        assert_eq!(config.sound_path, PathBuf::from("data/audio"));
        assert!(config.fullscreen);
        assert_eq!(config.fps, 30.);
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_rejects_bad_seed() {
        assert!(Cli::try_parse_from(["cogf_demo", "--seed", "soon"]).is_err());
    }
}

//====================================================================
