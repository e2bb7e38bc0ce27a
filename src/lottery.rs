use std::sync::Arc;

use chrono::NaiveDate;

use crate::protocol::contestant::Contestant;

/// The draw predicate as seen by the server. Injected at startup so the
/// actual draw rules can live outside the connection plumbing.
pub type WinnerPredicate = Arc<dyn Fn(&Contestant) -> bool + Send + Sync>;

const BIRTHDATE_FORMAT: &str = "%Y-%m-%d";
const LUCKY_MODULUS: u64 = 17;
const LUCKY_RESIDUE: u64 = 7;

/// Reference draw rule: a contestant wins when their birthdate is a real
/// `YYYY-MM-DD` date and a stable hash of the full record lands on the lucky
/// residue. Pure and deterministic, so replaying a batch re-derives the same
/// winners.
pub fn is_winner(contestant: &Contestant) -> bool {
    if NaiveDate::parse_from_str(&contestant.birthdate, BIRTHDATE_FORMAT).is_err() {
        return false;
    }

    fnv1a(contestant.to_record().as_bytes()) % LUCKY_MODULUS == LUCKY_RESIDUE
}

// 64-bit FNV-1a
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
