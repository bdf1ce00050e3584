//! Cross-thread handoff for the most recent raw spectrum snapshot.
//!
//! The audio callback publishes a fully computed bar array; the render
//! tick copies it out once per frame. A narrow mutex around the copy keeps
//! reads untorn: the callback never mutates a snapshot the reader is
//! mid-copy on, and a reader at worst sees the previous window.

use parking_lot::Mutex;

#[derive(Debug)]
pub struct SharedSpectrum {
    front: Mutex<Box<[f32]>>,
}

impl SharedSpectrum {
    pub fn new(capacity: usize) -> Self {
        Self {
            front: Mutex::new(vec![0.0; capacity].into_boxed_slice()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.front.lock().len()
    }

    /// Replace the published snapshot. Slots beyond `values` keep their
    /// previous contents, so producers should always publish full arrays.
    pub fn publish(&self, values: &[f32]) {
        let mut front = self.front.lock();
        let len = front.len().min(values.len());
        front[..len].copy_from_slice(&values[..len]);
    }

    /// Copy the published snapshot into `out`.
    pub fn snapshot_into(&self, out: &mut [f32]) {
        let front = self.front.lock();
        let len = front.len().min(out.len());
        out[..len].copy_from_slice(&front[..len]);
    }

    /// Zero the published snapshot (capture stopped or failed).
    pub fn clear(&self) {
        self.front.lock().fill(0.0);
    }
}
