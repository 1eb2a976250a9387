// src/ransac/window.rs

//! # Sample Window
//!
//! A fixed capacity ring of (predicted, measured) position pairs. Samples
//! are addressed by logical age, newest first, and leave the window only
//! by growing older than `dt_max`; slots are reused when the write cursor
//! wraps around.

/// Default number of slots in the sample ring.
pub const RANSAC_CAPACITY: usize = 20;

/// One pairing of the estimator's prediction with a vision measurement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RansacSample {
    /// Mission time of the sample in seconds.
    pub time: f32,
    /// Predicted x position in meters.
    pub x: f32,
    /// Predicted y position in meters.
    pub y: f32,
    /// Vision-implied x position in meters.
    pub mx: f32,
    /// Vision-implied y position in meters.
    pub my: f32,
}

/// Time windowed ring of vision samples.
#[derive(Debug, Clone, Copy)]
pub struct RansacWindow<const CAP: usize = RANSAC_CAPACITY> {
    samples: [Option<RansacSample>; CAP],
    last_index: usize,
    buf_size: usize,
    dt_max: f32,
}

impl<const CAP: usize> RansacWindow<CAP> {
    /// Creates an empty window keeping samples up to `dt_max` seconds old.
    pub fn new(dt_max: f32) -> Self {
        const { assert!(CAP > 0, "sample window needs at least one slot") };
        Self {
            samples: [None; CAP],
            last_index: CAP - 1,
            buf_size: 0,
            dt_max,
        }
    }

    /// Forgets every sample.
    pub fn reset(&mut self) {
        self.samples = [None; CAP];
        self.last_index = CAP - 1;
        self.buf_size = 0;
    }

    /// Physical number of slots.
    pub const fn capacity(&self) -> usize {
        CAP
    }

    /// Number of consecutive fresh samples as of the last size update.
    pub fn buf_size(&self) -> usize {
        self.buf_size
    }

    /// Maximum sample age in seconds.
    pub fn dt_max(&self) -> f32 {
        self.dt_max
    }

    /// Slot holding the sample `age` pushes before the newest one.
    pub fn get_index(&self, age: usize) -> usize {
        (self.last_index + CAP - age % CAP) % CAP
    }

    /// The sample `age` pushes before the newest one, if that slot has
    /// been written.
    pub fn get(&self, age: usize) -> Option<&RansacSample> {
        self.samples[self.get_index(age)].as_ref()
    }

    /// Stores a sample in the next slot, overwriting the oldest one.
    pub fn push(&mut self, sample: RansacSample) {
        self.last_index = (self.last_index + 1) % CAP;
        self.samples[self.last_index] = Some(sample);
    }

    /// Recounts the fresh samples, newest first, stopping at the first
    /// unwritten or stale slot.
    pub fn update_buffer_size(&mut self, now: f32) -> usize {
        self.buf_size = (0..CAP)
            .map_while(|age| self.get(age))
            .take_while(|sample| now - sample.time <= self.dt_max)
            .count();
        self.buf_size
    }

    /// The fresh samples, newest first.
    pub fn fresh(&self) -> impl Iterator<Item = &RansacSample> + '_ {
        (0..self.buf_size).filter_map(move |age| self.get(age))
    }

    /// Moves every stored prediction by `(-dx, -dy)`, keeping the history
    /// consistent with a correction applied to the live estimate.
    pub fn shift_predictions(&mut self, dx: f32, dy: f32) {
        for sample in self.samples.iter_mut().flatten() {
            sample.x -= dx;
            sample.y -= dy;
        }
    }
}

impl Default for RansacWindow<RANSAC_CAPACITY> {
    fn default() -> Self {
        Self::new(1.0)
    }
}
