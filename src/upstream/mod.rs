//! Component D and its supporting types: cancellable byte-range HTTP
//! loading, the request descriptor it consumes, and the transfer-event
//! callback it feeds the bandwidth meter.

pub mod cancellation;
pub mod constants;
pub mod data_source;
pub mod data_spec;
pub mod http_data_source;
pub mod transfer_listener;

pub use cancellation::CancellationFlag;
pub use data_source::DataSource;
pub use data_spec::DataSpec;
pub use http_data_source::{HttpDataSource, HttpDataSourceConfig, HttpError};
pub use transfer_listener::{SharedTransferListener, TransferListener};
