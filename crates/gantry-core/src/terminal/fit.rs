use tracing::debug;

/// A measured terminal viewport in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    /// Zero columns or rows means the surface has not laid out yet.
    pub fn is_valid(&self) -> bool {
        self.cols > 0 && self.rows > 0
    }
}

/// Cooperative fit scheduler for one terminal surface.
///
/// Driven by explicit frame ticks from whoever owns the render loop; one
/// `on_frame` call corresponds to one paint opportunity. A scheduled fit
/// retries invalid (zero-sized) measurements across frames up to a fixed
/// attempt cap, then gives up silently — the surface is assumed
/// permanently hidden. Each scheduling request yields at most one fit.
///
/// Single-threaded by design: no timers, no blocking, no locks.
pub struct FitScheduler {
    pending: bool,
    attempts: u32,
    max_attempts: u32,
    suspended: bool,
}

impl FitScheduler {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            pending: false,
            attempts: 0,
            max_attempts,
            suspended: false,
        }
    }

    /// Arm a measurement attempt for the next frame.
    pub fn schedule_fit(&mut self) {
        if self.suspended {
            return;
        }
        self.pending = true;
        self.attempts = 0;
    }

    /// Coalesce a burst of resize notifications into at most one armed
    /// attempt: requests while one is pending are dropped.
    pub fn schedule_fit_on_resize(&mut self) {
        if self.suspended || self.pending {
            return;
        }
        self.schedule_fit();
    }

    /// Suspend or resume scheduling. While suspended (e.g. the panel is
    /// being interactively drag-resized) all scheduling and frame work
    /// is skipped.
    pub fn set_suspended(&mut self, suspended: bool) {
        self.suspended = suspended;
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Run one measurement attempt. Returns the viewport to fit to when
    /// the measurement is valid — exactly once per scheduling request.
    pub fn on_frame<F>(&mut self, measure: F) -> Option<Viewport>
    where
        F: FnOnce() -> Option<Viewport>,
    {
        if self.suspended || !self.pending {
            return None;
        }

        match measure() {
            Some(viewport) if viewport.is_valid() => {
                self.pending = false;
                self.attempts = 0;
                Some(viewport)
            }
            _ => {
                self.attempts += 1;
                if self.attempts >= self.max_attempts {
                    debug!(
                        event = "terminal.fit.gave_up",
                        attempts = self.attempts,
                        "Surface never produced a valid size, dropping fit request"
                    );
                    self.pending = false;
                    self.attempts = 0;
                }
                None
            }
        }
    }
}
