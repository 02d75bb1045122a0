//====================================================================

use std::ops::RangeInclusive;

use engine::{
    audio::{SoundHandle, SoundSettings},
    error::EngineError,
    graphics::{DrawStateId, ImageHandle, ProgramId, ProgramSource, Topology},
    scene::{Scene, SceneContext, SceneData},
    tools::KeyCode,
};
use rand::{rngs::StdRng, Rng};

//====================================================================

pub const SCENE_NAME: &str = "DefaultScene";

const MUSIC: &str = "COGFMusic";
const SFX: &str = "COGFSFX";
const IMAGE: &str = "COGFImage";

const EXIT_KEY: KeyCode = KeyCode::Escape;

pub const PITCH_RANGE: RangeInclusive<f32> = 0.7..=1.3;

const IMAGE_SLOT: u32 = 0;
// The vertex stage only has 3 positions. The other 3 repeat the first one.
const VERTEX_COUNT: u32 = 6;
const TOPOLOGY: Topology = Topology::TriangleList;

const PROGRAM: ProgramSource = ProgramSource {
    label: "Fullscreen image",
    vertex: include_str!("shaders/fullscreen_vert.wgsl"),
    fragment: include_str!("shaders/fullscreen_frag.wgsl"),
    texture_slots: 1,
};

/// Uniform in [`PITCH_RANGE`].
#[inline]
pub fn draw_pitch<R: Rng>(rng: &mut R) -> f32 {
    rng.gen_range(PITCH_RANGE)
}

//====================================================================

/// Plays music and a sound effect over a fullscreen image. The music starts
/// over at a new random pitch each time it ends.
pub struct DefaultScene<R: Rng = StdRng> {
    music: SoundHandle,
    sfx: SoundHandle,

    image: ImageHandle,
    program: ProgramId,
    draw_state: DrawStateId,

    rng: R,
}

impl<R: Rng> DefaultScene<R> {
    pub fn new(ctx: &mut SceneContext, rng: R) -> Result<Self, EngineError> {
        ctx.audio.load_music(MUSIC)?;
        let music = ctx.audio.create_player(MUSIC, SoundSettings::default())?;

        ctx.audio.load_sfx(SFX)?;
        let sfx = ctx.audio.create_player(SFX, SoundSettings::default())?;

        let image = ctx.graphics.load_image(IMAGE)?;
        ctx.graphics.upload_image(image)?;
        ctx.graphics.free_image_cpu(image)?;

        let program = ctx.graphics.create_program(&PROGRAM)?;
        let draw_state = ctx.graphics.create_draw_state(SCENE_NAME)?;

        log::debug!("Created scene '{}'", SCENE_NAME);

        Ok(Self {
            music,
            sfx,
            image,
            program,
            draw_state,
            rng,
        })
    }
}

impl<R: Rng + 'static> Scene for DefaultScene<R> {
    #[inline]
    fn name(&self) -> &str {
        SCENE_NAME
    }

    fn switch_from(
        &mut self,
        ctx: &mut SceneContext,
        _previous: &str,
        _data: Option<SceneData>,
    ) -> anyhow::Result<()> {
        ctx.graphics.use_program(self.program)?;
        ctx.graphics.bind_draw_state(self.draw_state)?;
        ctx.graphics.bind_image(self.image, IMAGE_SLOT)?;

        ctx.audio.play(self.music)?;
        ctx.audio.play(self.sfx)?;

        Ok(())
    }

    fn update(&mut self, ctx: &mut SceneContext, _delta_seconds: f32) -> anyhow::Result<()> {
        if ctx.input.key_just_pressed(EXIT_KEY) {
            log::info!("{:?} pressed, exiting", EXIT_KEY);
            ctx.scenes.exit();
        }

        if !ctx.audio.is_playing(self.music)? {
            let pitch = draw_pitch(&mut self.rng);
            log::debug!("Music ended, restarting at pitch {:.3}", pitch);

            ctx.audio.set_pitch(self.music, pitch)?;
            ctx.audio.stop(self.music)?;
            ctx.audio.play(self.music)?;
        }

        Ok(())
    }

    fn render(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        ctx.graphics.clear();
        ctx.graphics.draw(VERTEX_COUNT, TOPOLOGY)?;
        Ok(())
    }

    fn destroy(&mut self, ctx: &mut SceneContext) -> anyhow::Result<()> {
        ctx.graphics.unbind_image(self.image)?;
        ctx.graphics.release_program(self.program)?;
        ctx.graphics.release_draw_state(self.draw_state)?;
        ctx.graphics.release_image(self.image)?;

        log::debug!("Destroyed scene '{}'", SCENE_NAME);
        Ok(())
    }
}

//====================================================================


//====================================================================
