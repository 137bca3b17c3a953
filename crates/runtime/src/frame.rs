use foundation::time::Time;

/// Animation frame metadata.
///
/// Deterministic frames (`Frame::new`) derive their time from the index; hosts
/// driven by a real clock use `Frame::at`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Delta time since the previous frame (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    pub fn at(index: u64, dt_s: f64, time: Time) -> Self {
        Self { index, dt_s, time }
    }

    pub fn next(self) -> Self {
        Self::at(self.index + 1, self.dt_s, Time(self.time.0 + self.dt_s))
    }

    pub fn now_ms(&self) -> f64 {
        self.time.as_millis()
    }
}
