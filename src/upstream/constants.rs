//! Sentinel return codes shared by the `DataSource` and track-output
//! contracts (§6). Most of the crate prefers `Result`/`Option`, but these
//! four polling-loop contracts are kept as the original's signed-integer
//! sentinels because callers interleave them with byte counts on the same
//! return value.

pub const LENGTH_UNBOUNDED: i64 = -1;
pub const RESULT_IO_ERROR: i64 = -2;
pub const RESULT_END_OF_INPUT: i64 = -3;
pub const RESULT_CONTINUE: i64 = -4;

pub const BITS_PER_BYTE: i64 = 8;
