use foundation::time::Millis;

/// Deterministic frame metadata.
///
/// Hosts step the animation runtime one frame at a time; the frame's `now` is
/// the only clock the runtime ever sees, so a run can be recorded and replayed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (milliseconds).
    pub dt_ms: u64,
    /// Virtual time at the start of the frame.
    pub now: Millis,
}

impl Frame {
    pub fn new(index: u64, dt_ms: u64) -> Self {
        Self {
            index,
            dt_ms,
            now: Millis(index.saturating_mul(dt_ms)),
        }
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_ms)
    }

    /// Frames covering `[0, until]`, inclusive of the frame that reaches `until`.
    pub fn run_until(dt_ms: u64, until: Millis) -> impl Iterator<Item = Frame> {
        let dt_ms = dt_ms.max(1);
        let last = until.0.div_ceil(dt_ms);
        (0..=last).map(move |index| Frame::new(index, dt_ms))
    }
}
