//! The minimal load contract every concrete source (HTTP, in-memory fixture)
//! implements. Native `async fn` in a trait is deliberately not boxed behind
//! `async-trait`: every caller in this crate dispatches against a single
//! concrete type, so the non-`dyn`-safety this trait incurs costs nothing.

use crate::error::Result;
use crate::upstream::cancellation::CancellationFlag;
use crate::upstream::data_spec::DataSpec;

pub trait DataSource {
    /// Opens `spec`. Returns the resolved length (`LENGTH_UNBOUNDED` if
    /// unknown) on success, or a negative `RESULT_*` sentinel otherwise.
    /// Must be paired with exactly one later `close()`, including on error.
    async fn open(&mut self, spec: DataSpec, cancel: CancellationFlag) -> Result<i64>;

    /// Reads into `buf`, returning the byte count, `RESULT_END_OF_INPUT`, or
    /// `RESULT_IO_ERROR`.
    async fn read(&mut self, buf: &mut [u8]) -> i64;

    /// Resets the source to `Idle`. Idempotent.
    fn close(&mut self);
}

impl DataSource for super::http_data_source::HttpDataSource {
    async fn open(&mut self, spec: DataSpec, cancel: CancellationFlag) -> Result<i64> {
        super::http_data_source::HttpDataSource::open(self, spec, cancel).await
    }

    async fn read(&mut self, buf: &mut [u8]) -> i64 {
        super::http_data_source::HttpDataSource::read(self, buf).await
    }

    fn close(&mut self) {
        super::http_data_source::HttpDataSource::close(self)
    }
}
