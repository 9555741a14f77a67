//! Personal console countdown timer for the end of a workday. Computes an
//! end-of-work time from a start time plus break/overtime/freetime
//! adjustments, keeps a single live-updating status line in the terminal,
//! and appends human-readable entries to a rolling yearly journal file.

pub mod cli;
pub mod journal;
pub mod timer;
pub mod utils;
