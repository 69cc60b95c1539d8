use std::fmt;

use crate::event::Event;

use super::Layer;

/// Handle returned when a layer is pushed; used to pop it again.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct LayerId(u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

struct Entry {
    id: LayerId,
    layer: Box<dyn Layer>,
}

/// Ordered collection of layers.
///
/// `entries[..insert_index]` are regular layers, `entries[insert_index..]` are
/// overlays. Pushing a layer inserts at the partition boundary, pushing an
/// overlay appends. Dropping the stack detaches whatever is left.
pub struct LayerStack {
    entries: Vec<Entry>,
    insert_index: usize,
    next_id: u64,
}

impl LayerStack {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            insert_index: 0,
            next_id: 0,
        }
    }

    fn allocate_id(&mut self) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Inserts behind all overlays and after previously pushed layers, then
    /// attaches it.
    pub fn push_layer(&mut self, layer: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        self.entries.insert(self.insert_index, Entry { id, layer });
        let index = self.insert_index;
        self.insert_index += 1;

        let entry = &mut self.entries[index];
        log::debug!("layer attached: {} {}", entry.layer.name(), id);
        entry.layer.on_attach();
        id
    }

    /// Appends at the very back, then attaches it.
    pub fn push_overlay(&mut self, overlay: Box<dyn Layer>) -> LayerId {
        let id = self.allocate_id();
        self.entries.push(Entry { id, layer: overlay });

        if let Some(entry) = self.entries.last_mut() {
            log::debug!("overlay attached: {} {}", entry.layer.name(), id);
            entry.layer.on_attach();
        }
        id
    }

    /// Detaches and removes a regular layer. Returns `None` if `id` is not a
    /// regular layer in this stack; overlays are never matched.
    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let index = self.entries[..self.insert_index]
            .iter()
            .position(|e| e.id == id)?;

        let mut entry = self.entries.remove(index);
        self.insert_index -= 1;
        entry.layer.on_detach();
        log::debug!("layer detached: {} {}", entry.layer.name(), id);
        Some(entry.layer)
    }

    /// Detaches and removes an overlay. Returns `None` if `id` is not an
    /// overlay in this stack.
    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        let offset = self.entries[self.insert_index..]
            .iter()
            .position(|e| e.id == id)?;

        let mut entry = self.entries.remove(self.insert_index + offset);
        entry.layer.on_detach();
        log::debug!("overlay detached: {} {}", entry.layer.name(), id);
        Some(entry.layer)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of regular (non-overlay) layers.
    #[inline]
    pub fn layer_count(&self) -> usize {
        self.insert_index
    }

    #[inline]
    pub fn overlay_count(&self) -> usize {
        self.entries.len() - self.insert_index
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Front to back: regular layers in push order, then overlays.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut (dyn Layer + 'static)> {
        self.entries.iter_mut().map(|e| e.layer.as_mut())
    }

    /// Layer names front to back.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.layer.name())
    }

    /// Offers `event` back to front, stopping as soon as it is handled.
    /// An event that arrives already handled reaches nobody.
    pub fn dispatch_event(&mut self, event: &mut Event) {
        for entry in self.entries.iter_mut().rev() {
            if event.handled {
                break;
            }
            entry.layer.on_event(event);
        }
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LayerStack {
    fn drop(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.layer.on_detach();
        }
    }
}
