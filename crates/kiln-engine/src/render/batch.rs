use std::collections::HashMap;

use crate::device::TextureId;

use super::DrawableRef;

/// Drawables sharing one texture (or none).
pub(crate) struct Batch {
    pub texture: Option<TextureId>,
    pub drawables: Vec<DrawableRef>,
}

/// Frame batches keyed by texture, iterated in first-enqueue order.
///
/// Performance characteristics:
/// - `push()` is O(1) amortized
/// - `clear()` keeps the batch vector's capacity for reuse
///
/// Ordering rules:
/// 1) batches: the order their texture was first enqueued this frame
/// 2) drawables inside a batch: enqueue order
#[derive(Default)]
pub(crate) struct BatchList {
    batches: Vec<Batch>,
    index: HashMap<Option<TextureId>, usize>,
}

impl BatchList {
    pub fn push(&mut self, texture: Option<TextureId>, drawable: DrawableRef) {
        let slot = match self.index.get(&texture) {
            Some(&slot) => slot,
            None => {
                log::trace!("new batch for texture {texture:?}");
                self.batches.push(Batch { texture, drawables: Vec::new() });
                self.index.insert(texture, self.batches.len() - 1);
                self.batches.len() - 1
            }
        };
        self.batches[slot].drawables.push(drawable);
    }

    pub fn clear(&mut self) {
        self.batches.clear();
        self.index.clear();
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Batch> {
        self.batches.iter()
    }

    #[inline]
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    pub fn drawable_count(&self) -> usize {
        self.batches.iter().map(|b| b.drawables.len()).sum()
    }
}
