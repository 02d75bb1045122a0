//====================================================================

use std::{cell::RefCell, io, path::PathBuf, rc::Rc};

use rustc_hash::{FxHashMap, FxHashSet};
use winit::keyboard::KeyCode;

use crate::{
    audio::{AudioService, SoundHandle, SoundSettings},
    error::EngineError,
    graphics::{
        DrawStateId, ImageHandle, ImageService, ProgramId, ProgramSource, RenderService, Topology,
    },
    scene::{SceneContext, SceneRequests},
    tools::InputService,
};

//====================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    LoadSfx(String),
    LoadMusic(String),
    CreatePlayer(String, SoundHandle),
    DeletePlayer(SoundHandle),
    Play(SoundHandle),
    Stop(SoundHandle),
    SetPitch(SoundHandle, f32),
    SetVolume(SoundHandle, f32),

    LoadImage(String, ImageHandle),
    UploadImage(ImageHandle),
    FreeImageCpu(ImageHandle),
    BindImage(ImageHandle, u32),
    UnbindImage(ImageHandle),
    ReleaseImage(ImageHandle),

    CreateProgram(String, ProgramId),
    UseProgram(ProgramId),
    ReleaseProgram(ProgramId),
    CreateDrawState(DrawStateId),
    BindDrawState(DrawStateId),
    ReleaseDrawState(DrawStateId),
    Clear,
    Draw(u32, Topology),
}

#[derive(Clone, Debug, Default)]
pub struct CallLog(Rc<RefCell<Vec<Call>>>);

impl CallLog {
    #[inline]
    pub fn push(&self, call: Call) {
        self.0.borrow_mut().push(call);
    }

    #[inline]
    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().clone()
    }

    /// Return everything logged so far and start over.
    #[inline]
    pub fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

fn missing(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{} does not exist", name))
}

//====================================================================

pub struct MockAudio {
    log: CallLog,
    missing: FxHashSet<String>,
    players: FxHashMap<SoundHandle, bool>,
    next_player: u32,
}

impl MockAudio {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            missing: FxHashSet::default(),
            players: FxHashMap::default(),
            next_player: 0,
        }
    }

    /// Make loading `name` fail as if the file did not exist.
    pub fn set_missing(&mut self, name: &str) {
        self.missing.insert(name.to_string());
    }

    /// Override what `is_playing` reports, e.g. to simulate a track ending.
    pub fn set_playing(&mut self, player: SoundHandle, playing: bool) {
        self.players.insert(player, playing);
    }

    fn load(&mut self, name: &str) -> Result<(), EngineError> {
        match self.missing.contains(name) {
            true => Err(EngineError::SoundIo {
                path: PathBuf::from(name),
                source: missing(name),
            }),
            false => Ok(()),
        }
    }

    fn known(&self, player: SoundHandle) -> Result<(), EngineError> {
        match self.players.contains_key(&player) {
            true => Ok(()),
            false => Err(EngineError::UnknownPlayer(player)),
        }
    }
}

impl AudioService for MockAudio {
    fn load_sfx(&mut self, name: &str) -> Result<(), EngineError> {
        self.log.push(Call::LoadSfx(name.to_string()));
        self.load(name)
    }

    fn load_music(&mut self, name: &str) -> Result<(), EngineError> {
        self.log.push(Call::LoadMusic(name.to_string()));
        self.load(name)
    }

    fn create_player(
        &mut self,
        name: &str,
        _settings: SoundSettings,
    ) -> Result<SoundHandle, EngineError> {
        let player = SoundHandle(self.next_player);
        self.next_player += 1;
        self.players.insert(player, false);

        self.log.push(Call::CreatePlayer(name.to_string(), player));
        Ok(player)
    }

    fn delete_player(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        self.log.push(Call::DeletePlayer(player));
        self.known(player)?;
        self.players.remove(&player);
        Ok(())
    }

    fn play(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        self.log.push(Call::Play(player));
        self.known(player)?;
        self.players.insert(player, true);
        Ok(())
    }

    fn stop(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        self.log.push(Call::Stop(player));
        self.known(player)?;
        self.players.insert(player, false);
        Ok(())
    }

    fn is_playing(&self, player: SoundHandle) -> Result<bool, EngineError> {
        self.players
            .get(&player)
            .copied()
            .ok_or(EngineError::UnknownPlayer(player))
    }

    fn set_pitch(&mut self, player: SoundHandle, pitch: f32) -> Result<(), EngineError> {
        self.log.push(Call::SetPitch(player, pitch));
        self.known(player)
    }

    fn set_volume(&mut self, player: SoundHandle, volume: f32) -> Result<(), EngineError> {
        self.log.push(Call::SetVolume(player, volume));
        self.known(player)
    }
}

//====================================================================

pub struct MockGraphics {
    log: CallLog,
    missing: FxHashSet<String>,
    fail_compile: bool,
    next_id: u32,
}

impl MockGraphics {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            missing: FxHashSet::default(),
            fail_compile: false,
            next_id: 0,
        }
    }

    /// Make loading the image `name` fail as if the file did not exist.
    pub fn set_missing(&mut self, name: &str) {
        self.missing.insert(name.to_string());
    }

    /// Make every program compilation fail.
    pub fn set_fail_compile(&mut self, fail: bool) {
        self.fail_compile = fail;
    }

    fn next(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

impl RenderService for MockGraphics {
    fn create_program(&mut self, source: &ProgramSource) -> Result<ProgramId, EngineError> {
        if self.fail_compile {
            return Err(renderer::RenderError::ProgramCompile {
                label: source.label.to_string(),
                message: "compilation disabled".into(),
            }
            .into());
        }

        let program = ProgramId(self.next());
        self.log
            .push(Call::CreateProgram(source.label.to_string(), program));
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramId) -> Result<(), EngineError> {
        self.log.push(Call::UseProgram(program));
        Ok(())
    }

    fn release_program(&mut self, program: ProgramId) -> Result<(), EngineError> {
        self.log.push(Call::ReleaseProgram(program));
        Ok(())
    }

    fn create_draw_state(&mut self, _label: &str) -> Result<DrawStateId, EngineError> {
        let draw_state = DrawStateId(self.next());
        self.log.push(Call::CreateDrawState(draw_state));
        Ok(draw_state)
    }

    fn bind_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError> {
        self.log.push(Call::BindDrawState(draw_state));
        Ok(())
    }

    fn release_draw_state(&mut self, draw_state: DrawStateId) -> Result<(), EngineError> {
        self.log.push(Call::ReleaseDrawState(draw_state));
        Ok(())
    }

    fn clear(&mut self) {
        self.log.push(Call::Clear);
    }

    fn draw(&mut self, vertex_count: u32, topology: Topology) -> Result<(), EngineError> {
        self.log.push(Call::Draw(vertex_count, topology));
        Ok(())
    }
}

impl ImageService for MockGraphics {
    fn load_image(&mut self, name: &str) -> Result<ImageHandle, EngineError> {
        if self.missing.contains(name) {
            return Err(EngineError::ImageLoad {
                path: PathBuf::from(name),
                source: image::ImageError::IoError(missing(name)),
            });
        }

        let image = ImageHandle(self.next());
        self.log.push(Call::LoadImage(name.to_string(), image));
        Ok(image)
    }

    fn upload_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.log.push(Call::UploadImage(image));
        Ok(())
    }

    fn free_image_cpu(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.log.push(Call::FreeImageCpu(image));
        Ok(())
    }

    fn bind_image(&mut self, image: ImageHandle, slot: u32) -> Result<(), EngineError> {
        self.log.push(Call::BindImage(image, slot));
        Ok(())
    }

    fn unbind_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.log.push(Call::UnbindImage(image));
        Ok(())
    }

    fn release_image(&mut self, image: ImageHandle) -> Result<(), EngineError> {
        self.log.push(Call::ReleaseImage(image));
        Ok(())
    }
}

//====================================================================

#[derive(Default)]
pub struct MockInput {
    pressed: FxHashSet<KeyCode>,
    just_pressed: FxHashSet<KeyCode>,
    released: FxHashSet<KeyCode>,
}

impl MockInput {
    /// Key goes down this frame.
    pub fn press(&mut self, key: KeyCode) {
        if self.pressed.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn release(&mut self, key: KeyCode) {
        if self.pressed.remove(&key) {
            self.released.insert(key);
        }
    }

    /// Move to the next frame, keeping held keys held.
    pub fn next_frame(&mut self) {
        self.just_pressed.clear();
        self.released.clear();
    }
}

impl InputService for MockInput {
    fn key_pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    fn key_released(&self, key: KeyCode) -> bool {
        self.released.contains(&key)
    }

    fn consume(&mut self) {
        self.next_frame();
    }
}

//====================================================================

/// Recording stand-ins for every service a scene is given, usable without a
/// window, gpu or audio device. All of them append to the same [`CallLog`].
pub struct MockServices {
    pub log: CallLog,
    pub audio: MockAudio,
    pub graphics: MockGraphics,
    pub input: MockInput,
    pub requests: SceneRequests,
}

impl MockServices {
    pub fn new() -> Self {
        let log = CallLog::default();
        Self {
            audio: MockAudio::new(log.clone()),
            graphics: MockGraphics::new(log.clone()),
            input: MockInput::default(),
            requests: SceneRequests::default(),
            log,
        }
    }

    pub fn context(&mut self) -> SceneContext<'_> {
        SceneContext {
            audio: &mut self.audio,
            graphics: &mut self.graphics,
            input: &mut self.input,
            scenes: &mut self.requests,
        }
    }
}

impl Default for MockServices {
    fn default() -> Self {
        Self::new()
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_services_share_one_log() {
        let mut services = MockServices::new();
        let mut ctx = services.context();

        ctx.graphics.clear();
        ctx.audio.play(SoundHandle(0)).unwrap_err();
        ctx.graphics.draw(3, Topology::TriangleList).unwrap();

        assert_eq!(
            services.log.take(),
            vec![
                Call::Clear,
                Call::Play(SoundHandle(0)),
                Call::Draw(3, Topology::TriangleList)
            ]
        );
        assert!(services.log.calls().is_empty());
    }

    #[test]
    fn test_input_press_fires_once_while_held() {
        let mut input = MockInput::default();

        input.press(KeyCode::Escape);
        assert!(input.key_just_pressed(KeyCode::Escape));

        input.next_frame();
        input.press(KeyCode::Escape);
        assert!(!input.key_just_pressed(KeyCode::Escape));
        assert!(input.key_pressed(KeyCode::Escape));

        input.release(KeyCode::Escape);
        assert!(input.key_released(KeyCode::Escape));
    }

    #[test]
    fn test_missing_sound_fails_with_io_error() {
        let mut audio = MockAudio::new(CallLog::default());
        audio.set_missing("gone");

        assert!(matches!(
            audio.load_music("gone"),
            Err(EngineError::SoundIo { .. })
        ));
        assert!(audio.load_sfx("here").is_ok());
    }
}

//====================================================================
