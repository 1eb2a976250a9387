// src/vision.rs

//! # Vision Link Hand-off
//!
//! Vision measurements arrive from a different execution context than the
//! control loop (typically a serial-receive interrupt). They cross over
//! through a single-producer single-consumer queue: the writer moves each
//! complete measurement in as one value and the reader takes whole values
//! out, so a displacement can never be paired with a stale counter.
//!
//! ```
//! use free_flight_navigation::{VisionLink, VisionMeasurement};
//!
//! let mut link: VisionLink<4> = VisionLink::new();
//! let (mut writer, mut reader) = link.split();
//!
//! writer.report(0.5, -0.25, 0.0).unwrap();
//! writer.report(0.4, -0.20, 0.0).unwrap();
//!
//! let latest = reader.latest().unwrap();
//! assert_eq!(2, latest.count);
//! assert!(reader.latest().is_none());
//! ```

use crate::{NavigationError, NavigationResult};
use heapless::spsc::{Consumer, Producer, Queue};

/// Default number of queue slots. One slot is always kept free, so this
/// buffers three measurements between control cycles.
pub const VISION_QUEUE_DEPTH: usize = 4;

/// A relative displacement report from the vision pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VisionMeasurement {
    /// Displacement from the vehicle to the gate along x, in meters.
    pub dx: f32,
    /// Displacement from the vehicle to the gate along y, in meters.
    pub dy: f32,
    /// Displacement from the vehicle to the gate along z, in meters.
    pub dz: f32,
    /// Sequence counter, incremented for every new report.
    pub count: u32,
}

/// Storage for the vision hand-off queue.
pub struct VisionLink<const N: usize = VISION_QUEUE_DEPTH> {
    queue: Queue<VisionMeasurement, N>,
}

impl<const N: usize> VisionLink<N> {
    /// Creates an empty link.
    pub const fn new() -> Self {
        Self {
            queue: Queue::new(),
        }
    }

    /// Splits the link into its writing and reading ends.
    pub fn split(&mut self) -> (VisionWriter<'_, N>, VisionReader<'_, N>) {
        let (producer, consumer) = self.queue.split();
        (
            VisionWriter { producer, count: 0 },
            VisionReader { consumer },
        )
    }
}

impl<const N: usize> Default for VisionLink<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Writing end of the vision link, owned by the receive context.
pub struct VisionWriter<'a, const N: usize> {
    producer: Producer<'a, VisionMeasurement, N>,
    count: u32,
}

impl<'a, const N: usize> VisionWriter<'a, N> {
    /// Queues a complete measurement.
    pub fn publish(&mut self, measurement: VisionMeasurement) -> NavigationResult<()> {
        self.producer
            .enqueue(measurement)
            .map_err(NavigationError::VisionLinkFull)
    }

    /// Stamps a displacement with the next sequence number and queues it.
    pub fn report(&mut self, dx: f32, dy: f32, dz: f32) -> NavigationResult<()> {
        let count = self.count.wrapping_add(1);
        self.publish(VisionMeasurement { dx, dy, dz, count })?;
        self.count = count;
        Ok(())
    }
}

/// Reading end of the vision link, owned by the control loop.
pub struct VisionReader<'a, const N: usize> {
    consumer: Consumer<'a, VisionMeasurement, N>,
}

impl<'a, const N: usize> VisionReader<'a, N> {
    /// Drains the queue and returns the newest measurement, if any arrived
    /// since the last call.
    pub fn latest(&mut self) -> Option<VisionMeasurement> {
        let mut latest = None;
        while let Some(measurement) = self.consumer.dequeue() {
            latest = Some(measurement);
        }
        latest
    }
}
