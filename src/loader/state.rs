use serde::Serialize;

/// What a loader currently shows to its observers.
///
/// `loading` is true only while the newest request is in flight. A failure
/// sets `error` but leaves `data` and `loaded` as they were, so a page can
/// keep showing the last good data next to the error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderState<T> {
    pub loading: bool,
    pub loaded: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> Default for LoaderState<T> {
    fn default() -> Self {
        LoaderState {
            loading: false,
            loaded: false,
            error: None,
            data: None,
        }
    }
}

/// A coarse view of a [`LoaderState`], handy for `match`ing in a UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadPhase {
    /// Never fetched.
    Idle,
    Pending,
    Success,
    Failure,
}

impl<T> LoaderState<T> {
    pub fn phase(&self) -> LoadPhase {
        if self.loading {
            LoadPhase::Pending
        } else if self.error.is_some() {
            LoadPhase::Failure
        } else if self.loaded {
            LoadPhase::Success
        } else {
            LoadPhase::Idle
        }
    }
}
