use crate::api::types::ViewId;
use crate::error::BridgeError;

/// Where the shared player library comes from.
pub trait ScriptSource {
    /// The library is already on the page (another bundle loaded it).
    fn is_present(&self) -> bool;

    /// Insert the loader script. Readiness is reported later through
    /// `LibraryLoader::mark_ready` or `mark_failed`.
    fn request(&mut self, src: &str) -> Result<(), BridgeError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Absent,
    Pending,
    Ready,
    Failed,
}

/// Process-wide latch around the player library.
///
/// The loader script is requested at most once no matter how many views
/// mount; views that mount while the request is in flight are queued and
/// released together on readiness.
pub struct LibraryLoader<S: ScriptSource> {
    source: S,
    src: String,
    state: LoadState,
    waiters: Vec<ViewId>,
    requests: u32,
}

impl<S: ScriptSource> LibraryLoader<S> {
    pub fn new(source: S, src: impl Into<String>) -> Self {
        Self {
            source,
            src: src.into(),
            state: LoadState::Absent,
            waiters: Vec::new(),
            requests: 0,
        }
    }

    /// Make sure the library is loaded or loading. Idempotent.
    ///
    /// Returns `Ready` when `view` can construct its player right away and
    /// `Pending` when it has been queued for `mark_ready`.
    pub fn ensure_loaded(&mut self, view: ViewId) -> LoadState {
        match self.state {
            LoadState::Ready | LoadState::Failed => {}
            LoadState::Pending => {
                if !self.waiters.contains(&view) {
                    self.waiters.push(view);
                }
            }
            LoadState::Absent => {
                if self.source.is_present() {
                    self.state = LoadState::Ready;
                } else {
                    self.requests += 1;
                    match self.source.request(&self.src) {
                        Ok(()) => {
                            log::info!("loader: requested {}", self.src);
                            self.state = LoadState::Pending;
                            self.waiters.push(view);
                        }
                        Err(e) => {
                            log::error!("loader: {e}");
                            self.state = LoadState::Failed;
                        }
                    }
                }
            }
        }
        self.state
    }

    /// The library signalled readiness. Returns the views waiting on it.
    pub fn mark_ready(&mut self) -> Vec<ViewId> {
        if self.state == LoadState::Ready {
            return Vec::new();
        }
        self.state = LoadState::Ready;
        std::mem::take(&mut self.waiters)
    }

    /// The loader script failed. Stays failed for the rest of the session.
    pub fn mark_failed(&mut self) -> Vec<ViewId> {
        self.state = LoadState::Failed;
        std::mem::take(&mut self.waiters)
    }

    /// Drop a view that unmounted before the library became ready.
    pub fn forget(&mut self, view: ViewId) {
        self.waiters.retain(|w| *w != view);
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn src(&self) -> &str {
        &self.src
    }

    /// How many times the loader script was requested.
    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}
