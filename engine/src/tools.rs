//====================================================================

use std::{
    collections::HashSet,
    hash::{BuildHasherDefault, Hash},
};

use rustc_hash::FxHasher;
use web_time::{Duration, Instant};

pub use renderer::tools::Size;
pub use winit::keyboard::KeyCode;

//====================================================================

type Hasher = BuildHasherDefault<FxHasher>;

//====================================================================

#[derive(Debug)]
pub struct Time {
    elapsed: Instant,

    last_frame: Instant,
    delta: Duration,
    delta_seconds: f32,
    frames: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self {
            elapsed: Instant::now(),
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            delta_seconds: 0.,
            frames: 0,
        }
    }
}

impl Time {
    #[inline]
    pub fn elapsed(&self) -> &Instant {
        &self.elapsed
    }

    #[inline]
    pub fn delta(&self) -> &Duration {
        &self.delta
    }

    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

pub fn tick_time(time: &mut Time) {
    time.delta = time.last_frame.elapsed();
    time.delta_seconds = time.delta.as_secs_f32();
    time.frames += 1;

    time.last_frame = Instant::now();
}

//====================================================================

/// Keyboard queries available to scenes.
pub trait InputService {
    /// Held down this frame.
    fn key_pressed(&self, key: KeyCode) -> bool;
    /// Went from up to down this frame. Holding the key does not fire again.
    fn key_just_pressed(&self, key: KeyCode) -> bool;
    /// Went from down to up this frame.
    fn key_released(&self, key: KeyCode) -> bool;
    /// Drop this frame's edges so a newly activated scene does not see them.
    fn consume(&mut self);
}

#[derive(Debug)]
pub struct Input<T> {
    pressed: HashSet<T, Hasher>,
    just_pressed: HashSet<T, Hasher>,
    released: HashSet<T, Hasher>,
}

impl<T> Default for Input<T> {
    fn default() -> Self {
        Self {
            pressed: HashSet::default(),
            just_pressed: HashSet::default(),
            released: HashSet::default(),
        }
    }
}

impl<T> Input<T>
where
    T: Eq + Hash,
{
    #[inline]
    pub fn pressed(&self, input: T) -> bool {
        self.pressed.contains(&input)
    }

    #[inline]
    pub fn just_pressed(&self, input: T) -> bool {
        self.just_pressed.contains(&input)
    }

    #[inline]
    pub fn released(&self, input: T) -> bool {
        self.released.contains(&input)
    }
}

impl InputService for Input<KeyCode> {
    #[inline]
    fn key_pressed(&self, key: KeyCode) -> bool {
        self.pressed(key)
    }

    #[inline]
    fn key_just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed(key)
    }

    #[inline]
    fn key_released(&self, key: KeyCode) -> bool {
        self.released(key)
    }

    #[inline]
    fn consume(&mut self) {
        reset_input(self);
    }
}

/// Key repeat events arrive as further presses of a held key; only the first
/// one marks the key as just pressed.
pub fn process_inputs<T>(input: &mut Input<T>, val: T, pressed: bool)
where
    T: Eq + Hash + Copy,
{
    match pressed {
        true => {
            if input.pressed.insert(val) {
                input.just_pressed.insert(val);
            }
        }
        false => {
            if input.pressed.remove(&val) {
                input.released.insert(val);
            }
        }
    }
}

pub fn reset_input<T>(input: &mut Input<T>) {
    input.just_pressed.clear();
    input.released.clear();
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_press_is_edge_triggered() {
        let mut keys = Input::default();

        process_inputs(&mut keys, KeyCode::Escape, true);
        assert!(keys.key_just_pressed(KeyCode::Escape));
        assert!(keys.key_pressed(KeyCode::Escape));

        reset_input(&mut keys);
        assert!(!keys.key_just_pressed(KeyCode::Escape));
        assert!(keys.key_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_key_repeat_does_not_refire() {
        let mut keys = Input::default();

        process_inputs(&mut keys, KeyCode::Escape, true);
        reset_input(&mut keys);

        // Held key: the OS keeps sending presses
        (0..5).for_each(|_| {
            process_inputs(&mut keys, KeyCode::Escape, true);
            assert!(!keys.key_just_pressed(KeyCode::Escape));
            reset_input(&mut keys);
        });
    }

    #[test]
    fn test_release_then_press_fires_again() {
        let mut keys = Input::default();

        process_inputs(&mut keys, KeyCode::Escape, true);
        reset_input(&mut keys);

        process_inputs(&mut keys, KeyCode::Escape, false);
        assert!(keys.key_released(KeyCode::Escape));
        assert!(!keys.key_pressed(KeyCode::Escape));
        reset_input(&mut keys);

        process_inputs(&mut keys, KeyCode::Escape, true);
        assert!(keys.key_just_pressed(KeyCode::Escape));
    }

    #[test]
    fn test_release_of_unpressed_key_is_ignored() {
        let mut keys = Input::<KeyCode>::default();
        process_inputs(&mut keys, KeyCode::KeyA, false);
        assert!(!keys.key_released(KeyCode::KeyA));
    }

    #[test]
    fn test_consume_clears_edges_only() {
        let mut keys = Input::default();
        process_inputs(&mut keys, KeyCode::Space, true);

        keys.consume();
        assert!(!keys.key_just_pressed(KeyCode::Space));
        assert!(keys.key_pressed(KeyCode::Space));
    }

    #[test]
    fn test_tick_time_counts_frames() {
        let mut time = Time::default();
        tick_time(&mut time);
        tick_time(&mut time);
        assert_eq!(time.frames(), 2);
        assert!(time.delta_seconds() >= 0.);
    }
}

//====================================================================
