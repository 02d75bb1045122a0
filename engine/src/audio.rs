//====================================================================

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use rodio::{source::Buffered, Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use rustc_hash::FxHashMap;

use crate::error::EngineError;

//====================================================================

const SOUND_EXTENSION: &str = "ogg";

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SoundHandle(pub u32);

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SoundSettings {
    /// 0 is silent, 1 is full volume.
    pub volume: f32,
    /// Playback rate multiplier. 1 is normal, above 1 is faster and higher.
    pub pitch: f32,
    /// Start over once the end is reached.
    pub looping: bool,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            volume: 1.,
            pitch: 1.,
            looping: false,
        }
    }
}

//====================================================================

/// Loads sounds by name and hands out players for them. Players belong to
/// the service: they stay valid until deleted or until the service is dropped.
pub trait AudioService {
    /// Fully decode `<name>` into memory. For short effects.
    fn load_sfx(&mut self, name: &str) -> Result<(), EngineError>;
    /// Register `<name>` to be streamed from disk whenever it plays.
    fn load_music(&mut self, name: &str) -> Result<(), EngineError>;

    fn create_player(
        &mut self,
        name: &str,
        settings: SoundSettings,
    ) -> Result<SoundHandle, EngineError>;
    fn delete_player(&mut self, player: SoundHandle) -> Result<(), EngineError>;

    /// Start from the beginning, also when already playing.
    fn play(&mut self, player: SoundHandle) -> Result<(), EngineError>;
    /// Stopping a stopped player does nothing.
    fn stop(&mut self, player: SoundHandle) -> Result<(), EngineError>;
    fn is_playing(&self, player: SoundHandle) -> Result<bool, EngineError>;

    fn set_pitch(&mut self, player: SoundHandle, pitch: f32) -> Result<(), EngineError>;
    fn set_volume(&mut self, player: SoundHandle, volume: f32) -> Result<(), EngineError>;
}

//====================================================================

pub fn sound_file(directory: &Path, name: &str) -> PathBuf {
    directory.join(format!("{}.{}", name, SOUND_EXTENSION))
}

type SfxBuffer = Buffered<Decoder<BufReader<File>>>;

enum SoundData {
    Sfx(SfxBuffer),
    Music(PathBuf),
}

struct SoundPlayer {
    name: String,
    settings: SoundSettings,
    sink: Option<Sink>,
}

pub struct SoundLibrary {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    path: PathBuf,

    sounds: FxHashMap<String, SoundData>,
    players: FxHashMap<SoundHandle, SoundPlayer>,
    next_player: u32,
}

impl SoundLibrary {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, EngineError> {
        let (stream, handle) = OutputStream::try_default()?;
        let path = path.into();

        log::debug!("Opened audio output. Sounds are read from {:?}", path);

        Ok(Self {
            _stream: stream,
            handle,
            path,
            sounds: FxHashMap::default(),
            players: FxHashMap::default(),
            next_player: 0,
        })
    }

    fn insert_sound(&mut self, name: &str, data: SoundData) -> Result<(), EngineError> {
        if self.sounds.contains_key(name) {
            return Err(EngineError::SoundAlreadyLoaded(name.to_string()));
        }
        self.sounds.insert(name.to_string(), data);
        Ok(())
    }

    fn player(&self, player: SoundHandle) -> Result<&SoundPlayer, EngineError> {
        self.players
            .get(&player)
            .ok_or(EngineError::UnknownPlayer(player))
    }

    fn player_mut(&mut self, player: SoundHandle) -> Result<&mut SoundPlayer, EngineError> {
        self.players
            .get_mut(&player)
            .ok_or(EngineError::UnknownPlayer(player))
    }
}

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, EngineError> {
    let file = File::open(path).map_err(|source| EngineError::SoundIo {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|source| EngineError::SoundDecode {
        path: path.to_path_buf(),
        source,
    })
}

fn append(sink: &Sink, source: Box<dyn Source<Item = i16> + Send>, looping: bool) {
    match looping {
        true => sink.append(source.repeat_infinite()),
        false => sink.append(source),
    }
}

impl AudioService for SoundLibrary {
    fn load_sfx(&mut self, name: &str) -> Result<(), EngineError> {
        let path = sound_file(&self.path, name);
        let buffer = open_decoder(&path)?.buffered();

        log::debug!("Loaded sfx '{}' from {:?}", name, path);
        self.insert_sound(name, SoundData::Sfx(buffer))
    }

    fn load_music(&mut self, name: &str) -> Result<(), EngineError> {
        let path = sound_file(&self.path, name);
        // Only the header is decoded here
        open_decoder(&path)?;

        log::debug!("Loaded music '{}' from {:?}", name, path);
        self.insert_sound(name, SoundData::Music(path))
    }

    fn create_player(
        &mut self,
        name: &str,
        settings: SoundSettings,
    ) -> Result<SoundHandle, EngineError> {
        if !self.sounds.contains_key(name) {
            return Err(EngineError::UnknownSound(name.to_string()));
        }

        let handle = SoundHandle(self.next_player);
        self.next_player += 1;

        self.players.insert(
            handle,
            SoundPlayer {
                name: name.to_string(),
                settings,
                sink: None,
            },
        );

        Ok(handle)
    }

    fn delete_player(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        self.players
            .remove(&player)
            .map(|_| ())
            .ok_or(EngineError::UnknownPlayer(player))
    }

    fn play(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        let sound_player = self.player(player)?;
        let data = self
            .sounds
            .get(&sound_player.name)
            .ok_or_else(|| EngineError::UnknownSound(sound_player.name.clone()))?;
        let settings = sound_player.settings;

        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(settings.volume);
        sink.set_speed(settings.pitch);

        match data {
            SoundData::Sfx(buffer) => append(&sink, Box::new(buffer.clone()), settings.looping),
            SoundData::Music(path) => {
                append(&sink, Box::new(open_decoder(path)?), settings.looping)
            }
        }

        log::trace!("Playing '{}' at pitch {}", sound_player.name, settings.pitch);

        // Replacing the old sink drops it, which silences whatever it was playing
        self.player_mut(player)?.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self, player: SoundHandle) -> Result<(), EngineError> {
        self.player_mut(player)?.sink = None;
        Ok(())
    }

    fn is_playing(&self, player: SoundHandle) -> Result<bool, EngineError> {
        Ok(self
            .player(player)?
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.empty() && !sink.is_paused()))
    }

    fn set_pitch(&mut self, player: SoundHandle, pitch: f32) -> Result<(), EngineError> {
        let sound_player = self.player_mut(player)?;
        sound_player.settings.pitch = pitch;
        if let Some(sink) = &sound_player.sink {
            sink.set_speed(pitch);
        }
        Ok(())
    }

    fn set_volume(&mut self, player: SoundHandle, volume: f32) -> Result<(), EngineError> {
        let sound_player = self.player_mut(player)?;
        sound_player.settings.volume = volume;
        if let Some(sink) = &sound_player.sink {
            sink.set_volume(volume);
        }
        Ok(())
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sound_file_appends_extension() {
        let path = sound_file(Path::new("assets/sounds"), "COGFMusic");
        assert_eq!(path, PathBuf::from("assets/sounds/COGFMusic.ogg"));
    }

    #[test]
    fn test_default_settings_are_neutral() {
        let settings = SoundSettings::default();
        assert_eq!(settings.volume, 1.);
        assert_eq!(settings.pitch, 1.);
        assert!(!settings.looping);
    }

    #[test]
    fn test_missing_sound_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = sound_file(dir.path(), "missing");

        match open_decoder(&path) {
            Err(EngineError::SoundIo { path: reported, .. }) => assert_eq!(reported, path),
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("missing file decoded"),
        }
    }
}

//====================================================================
