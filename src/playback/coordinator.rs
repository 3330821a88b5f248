/// Owner of the single active index.
///
/// Coordination is cooperative: changing the active index does not stop
/// anything by itself. Each item compares its own index with `active()` and
/// pauses when it is no longer the one.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Coordinator {
    active: Option<usize>,
}

impl Coordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `index` the active item. Returns the previously active index.
    pub fn request_play(&mut self, index: usize) -> Option<usize> {
        self.active.replace(index)
    }

    /// Clear the active index. Returns the index that was active.
    pub fn request_stop(&mut self) -> Option<usize> {
        self.active.take()
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn is_active(&self, index: usize) -> bool {
        self.active == Some(index)
    }
}
