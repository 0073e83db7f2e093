//! Readiness gating for interactive callers.
//!
//! A run needs two things that arrive independently: an initialized
//! counter and a decoded image. Until both are present a trigger does
//! nothing. Overlapping triggers through [`SharedSession`] are dropped
//! while a run is in flight.

use image::DynamicImage;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use tracing::{debug, warn};

use crate::detection::{BoxCounter, preprocessing};
use crate::error::{DetectError, Result};
use crate::models::DetectionResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    AwaitingRuntime,
    AwaitingImage,
    Ready,
}

#[derive(Default)]
pub struct Session {
    runtime: Option<Arc<BoxCounter>>,
    runtime_error: Option<String>,
    image: Option<DynamicImage>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readiness(&self) -> Readiness {
        match (&self.runtime, &self.image) {
            (None, _) => Readiness::AwaitingRuntime,
            (Some(_), None) => Readiness::AwaitingImage,
            (Some(_), Some(_)) => Readiness::Ready,
        }
    }

    /// Whether a run action should be offered to the user
    pub fn can_run(&self) -> bool {
        self.readiness() == Readiness::Ready
    }

    /// Install an initialized counter, clearing any earlier failure
    pub fn attach_runtime(&mut self, counter: Arc<BoxCounter>) {
        debug!("runtime attached");
        self.runtime = Some(counter);
        self.runtime_error = None;
    }

    /// Record that initialization failed. Runs report
    /// `RuntimeUnavailable` until a runtime is attached.
    pub fn runtime_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(%reason, "runtime failed to initialize");
        self.runtime = None;
        self.runtime_error = Some(reason);
    }

    /// Run an initializer and attach or record its outcome
    pub fn init_runtime<F>(&mut self, init: F) -> Result<()>
    where
        F: FnOnce() -> Result<BoxCounter>,
    {
        match init() {
            Ok(counter) => {
                self.attach_runtime(Arc::new(counter));
                Ok(())
            }
            Err(e) => {
                let reason = e.to_string();
                self.runtime_failed(reason.clone());
                Err(DetectError::runtime_unavailable(reason))
            }
        }
    }

    /// Replace the current image. An image with no pixels is refused and
    /// leaves the session without an image.
    pub fn load_image(&mut self, image: DynamicImage) -> Result<()> {
        if let Err(e) = preprocessing::check_dimensions(&image) {
            self.image = None;
            return Err(e);
        }
        debug!(width = image.width(), height = image.height(), "image loaded");
        self.image = Some(image);
        Ok(())
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    /// Count boxes in the current image.
    ///
    /// Returns `Ok(None)` while the session is not ready.
    pub fn run(&mut self) -> Result<Option<DetectionResult>> {
        if let Some(reason) = &self.runtime_error {
            return Err(DetectError::runtime_unavailable(reason.clone()));
        }

        let (Some(counter), Some(image)) = (&self.runtime, &self.image) else {
            debug!(readiness = ?self.readiness(), "run ignored, session not ready");
            return Ok(None);
        };

        counter.count(image).map(Some)
    }
}

/// A session that may be triggered from several threads.
/// A trigger arriving while a run is in progress is dropped.
#[derive(Default)]
pub struct SharedSession {
    inner: Mutex<Session>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Mutex::new(session),
        }
    }

    /// Run unless another run holds the session; a dropped trigger
    /// returns `Ok(None)`.
    pub fn trigger(&self) -> Result<Option<DetectionResult>> {
        let mut guard = match self.inner.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!("run already in progress, trigger dropped");
                return Ok(None);
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        guard.run()
    }

    /// Mutate the session, waiting for any in-flight run to finish
    pub fn with_session<T>(&self, f: impl FnOnce(&mut Session) -> T) -> T {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn readiness(&self) -> Readiness {
        self.with_session(|s| s.readiness())
    }
}
