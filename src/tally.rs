use std::sync::Mutex;

/// Consistent view of the tally: both values are read under one lock
/// acquisition so a reader never sees a waiting count from one moment paired
/// with a total from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub waiting: u16,
    pub total_winners: u32,
}

/// Cross-worker state: one "mid-batch" flag per worker slot plus the running
/// winner total. Lock hold time is arithmetic only, never I/O.
#[derive(Debug)]
pub struct Tally {
    state: Mutex<State>,
}

#[derive(Debug)]
struct State {
    processing: Vec<bool>,
    total_winners: u32,
}

impl Tally {
    pub fn new(workers: usize) -> Self {
        Self {
            state: Mutex::new(State {
                processing: vec![false; workers],
                total_winners: 0,
            }),
        }
    }

    /// Mark `slot` (1-based) as mid-batch. The flag is cleared when the
    /// returned guard drops, on every exit path of the batch flow.
    pub fn begin_processing(&self, slot: usize) -> ProcessingGuard<'_> {
        self.state.lock().unwrap().processing[slot - 1] = true;
        ProcessingGuard { tally: self, slot }
    }

    fn end_processing(&self, slot: usize) {
        self.state.lock().unwrap().processing[slot - 1] = false;
    }

    pub fn add_winners(&self, count: u32) {
        self.state.lock().unwrap().total_winners += count;
    }

    pub fn snapshot(&self) -> Snapshot {
        let state = self.state.lock().unwrap();
        Snapshot {
            waiting: state.processing.iter().filter(|flag| **flag).count() as u16,
            total_winners: state.total_winners,
        }
    }
}

pub struct ProcessingGuard<'a> {
    tally: &'a Tally,
    slot: usize,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.tally.end_processing(self.slot);
    }
}
