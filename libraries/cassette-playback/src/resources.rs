//! Source handle bookkeeping
//!
//! Handles such as object URLs pin memory until they are explicitly
//! released. The registry counts every handle the controller accepted and
//! releases each one exactly once: when the last track using it leaves the
//! playlist, or when the registry is dropped with the controller.

use crate::types::SourceHandle;
use std::collections::HashMap;
use tracing::debug;

/// Releases a source handle back to the platform
pub trait SourceReleaser {
    fn release(&mut self, source: &SourceHandle);
}

impl<F> SourceReleaser for F
where
    F: FnMut(&SourceHandle),
{
    fn release(&mut self, source: &SourceHandle) {
        self(source);
    }
}

/// Handles currently owned by the controller
#[derive(Default)]
pub struct SourceRegistry {
    live: HashMap<SourceHandle, usize>,
    releaser: Option<Box<dyn SourceReleaser>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that hands released sources to `releaser`
    pub fn with_releaser(releaser: Box<dyn SourceReleaser>) -> Self {
        Self {
            live: HashMap::new(),
            releaser: Some(releaser),
        }
    }

    /// Replace the releaser used for future releases
    pub fn set_releaser(&mut self, releaser: Box<dyn SourceReleaser>) {
        self.releaser = Some(releaser);
    }

    /// Record one more owner of a handle
    pub fn acquire(&mut self, source: &SourceHandle) {
        *self.live.entry(source.clone()).or_insert(0) += 1;
    }

    /// Drop one owner of a handle, releasing it with the last owner
    ///
    /// Returns true only when the handle was actually released.
    pub fn release(&mut self, source: &SourceHandle) -> bool {
        match self.live.get_mut(source) {
            None => return false,
            Some(count) if *count > 1 => {
                *count -= 1;
                return false;
            }
            Some(_) => {
                self.live.remove(source);
            }
        }

        debug!("Releasing source {}", source);
        if let Some(releaser) = self.releaser.as_mut() {
            releaser.release(source);
        }
        true
    }

    /// Release every owned handle
    pub fn release_all(&mut self) {
        let live: Vec<SourceHandle> = self.live.drain().map(|(source, _)| source).collect();
        for source in &live {
            debug!("Releasing source {}", source);
            if let Some(releaser) = self.releaser.as_mut() {
                releaser.release(source);
            }
        }
    }

    /// Check if a handle is owned
    pub fn contains(&self, source: &SourceHandle) -> bool {
        self.live.contains_key(source)
    }

    /// Number of distinct owned handles
    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl Drop for SourceRegistry {
    fn drop(&mut self) {
        self.release_all();
    }
}
