//====================================================================

use rustc_hash::FxHashMap;

use crate::texture::TextureId;

//====================================================================

/// Which texture is bound to each slot. A texture may sit in several slots
/// at once; binding over a slot replaces whatever was there.
#[derive(Debug)]
pub struct TextureSlots<T> {
    slots: FxHashMap<u32, (TextureId, T)>,
}

impl<T> Default for TextureSlots<T> {
    fn default() -> Self {
        Self {
            slots: FxHashMap::default(),
        }
    }
}

impl<T> TextureSlots<T> {
    #[inline]
    pub fn bind(&mut self, slot: u32, id: TextureId, texture: T) {
        self.slots.insert(slot, (id, texture));
    }

    #[inline]
    pub fn get(&self, slot: u32) -> Option<&T> {
        self.slots.get(&slot).map(|(_, texture)| texture)
    }

    #[inline]
    pub fn id_at(&self, slot: u32) -> Option<TextureId> {
        self.slots.get(&slot).map(|(id, _)| *id)
    }

    /// Slots currently holding `id`, lowest first.
    pub fn slots_of(&self, id: TextureId) -> Vec<u32> {
        let mut slots = self
            .slots
            .iter()
            .filter(|(_, (bound, _))| *bound == id)
            .map(|(slot, _)| *slot)
            .collect::<Vec<_>>();
        slots.sort_unstable();
        slots
    }

    /// Empty every slot holding `id`. Slots since rebound to another texture
    /// are left alone. Returns how many slots were emptied.
    pub fn unbind(&mut self, id: TextureId) -> usize {
        let before = self.slots.len();
        self.slots.retain(|_, (bound, _)| *bound != id);
        before - self.slots.len()
    }
}

//====================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const A: TextureId = TextureId(1);
    const B: TextureId = TextureId(2);

    #[test]
    fn test_rebinding_a_slot_replaces_it() {
        let mut slots = TextureSlots::default();
        slots.bind(0, A, "a");
        slots.bind(0, B, "b");

        assert_eq!(slots.get(0), Some(&"b"));
        assert!(slots.slots_of(A).is_empty());
    }

    #[test]
    fn test_unbind_leaves_slot_taken_over_by_other_texture() {
        let mut slots = TextureSlots::default();
        slots.bind(0, A, "a");
        slots.bind(0, B, "b");

        assert_eq!(slots.unbind(A), 0);
        assert_eq!(slots.id_at(0), Some(B));
    }

    #[test]
    fn test_unbind_empties_every_slot_of_texture() {
        let mut slots = TextureSlots::default();
        slots.bind(0, A, "a");
        slots.bind(3, A, "a");
        slots.bind(1, B, "b");

        assert_eq!(slots.slots_of(A), vec![0, 3]);
        assert_eq!(slots.unbind(A), 2);

        assert_eq!(slots.get(0), None);
        assert_eq!(slots.get(3), None);
        assert_eq!(slots.id_at(1), Some(B));
    }
}

//====================================================================
