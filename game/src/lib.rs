//====================================================================

use engine::{
    config::Config,
    scene::{Scene, SceneContext},
    window::Runner,
};
use rand::{rngs::StdRng, SeedableRng};
use scenes::DefaultScene;

pub mod scenes;

//====================================================================

/// Open the window and run [`DefaultScene`] until it asks to exit. Without a
/// seed the music pitches differ on every run.
pub fn run(config: Config, seed: Option<u64>) -> anyhow::Result<()> {
    Runner::run(
        config,
        Box::new(move |ctx: &mut SceneContext| {
            let rng = match seed {
                Some(seed) => {
                    log::info!("Using pitch seed {}", seed);
                    StdRng::seed_from_u64(seed)
                }
                None => StdRng::from_entropy(),
            };

            Ok(vec![
                Box::new(DefaultScene::new(ctx, rng)?) as Box<dyn Scene>
            ])
        }),
    )
}

//====================================================================
