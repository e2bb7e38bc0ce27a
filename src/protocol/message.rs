use super::contestant::Contestant;

pub mod request_type {
    pub const BATCH: u8 = 0x00;
    pub const RESULTS: u8 = 0x01;
}

pub mod results_marker {
    pub const PENDING: u8 = 0x00;
    pub const FINAL: u8 = 0x01;
}

/// Answer to a BATCH request: the submitted contestants that won, in the
/// order they were submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchResponse {
    pub winners: Vec<Contestant>,
}

/// Answer to a RESULTS request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsResponse {
    /// Some agencies are still mid-batch; the total is tentative and the
    /// client is expected to poll again.
    Pending { waiting: u16, total_winners: u32 },
    /// No agency is mid-batch; the total is authoritative.
    Final { total_winners: u32 },
}
