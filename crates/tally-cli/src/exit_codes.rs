//! Process exit codes. Part of the CLI contract; scripts branch on them.

use tally_core::TallyError;

pub const SUCCESS: i32 = 0;
/// Nothing to report (no run directory, no section files), or a render job failed.
pub const FAILURE: i32 = 1;
/// Bad configuration, unreadable input, or any unexpected error.
pub const INTERNAL_ERROR: i32 = 2;

pub fn for_error(e: &anyhow::Error) -> i32 {
    e.downcast_ref::<TallyError>()
        .map_or(INTERNAL_ERROR, TallyError::exit_code)
}
