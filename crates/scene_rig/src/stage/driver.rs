//! Frame driver state machine

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    /// Created, not started
    Idle,
    /// Producing ticks
    Running,
    /// Stopped for good
    Stopped,
}

/// One animation tick handed to frame callbacks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Zero-based frame number
    pub frame: u64,
    /// Seconds since the previous tick
    pub delta: f32,
    /// Seconds since the driver started
    pub elapsed: f32,
}

/// Smoothed frame statistics
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Exponential moving average of frames per second
    pub fps: f32,
}

impl FrameStats {
    fn record(&mut self, delta: f32) {
        if delta <= 0.0 {
            return;
        }
        let instant = 1.0 / delta;
        self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
    }
}

/// Turns host animation ticks into [`FrameTick`]s while running
#[derive(Debug)]
pub struct FrameDriver {
    state: DriverState,
    frames: u64,
    elapsed: f32,
    stats: FrameStats,
}

impl Default for FrameDriver {
    fn default() -> Self {
        Self {
            state: DriverState::Idle,
            frames: 0,
            elapsed: 0.0,
            stats: FrameStats::default(),
        }
    }
}

impl FrameDriver {
    /// New idle driver
    pub fn new() -> Self {
        Self::default()
    }

    /// Idle -> Running. Returns `false` in any other state.
    pub fn start(&mut self) -> bool {
        if self.state == DriverState::Idle {
            self.state = DriverState::Running;
            log::debug!("Frame driver started");
            true
        } else {
            false
        }
    }

    /// Move to Stopped. Returns `false` if already stopped.
    pub fn stop(&mut self) -> bool {
        if self.state == DriverState::Stopped {
            return false;
        }
        log::debug!("Frame driver stopped after {} frames", self.frames);
        self.state = DriverState::Stopped;
        true
    }

    /// Produce the next tick, `None` unless running
    pub fn advance(&mut self, delta: f32) -> Option<FrameTick> {
        if self.state != DriverState::Running {
            return None;
        }
        let delta = delta.max(0.0);
        self.elapsed += delta;
        self.stats.record(delta);
        let tick = FrameTick {
            frame: self.frames,
            delta,
            elapsed: self.elapsed,
        };
        self.frames += 1;
        Some(tick)
    }

    /// Ticks produced so far
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Smoothed statistics
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Current state
    pub fn state(&self) -> DriverState {
        self.state
    }
}
