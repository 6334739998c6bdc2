//! Callback contract for data transfer events (§4.C/§4.D). Multiple
//! overlapping transfers may share one listener; the listener is
//! responsible for tracking `stream_count` itself (see
//! [`crate::bandwidth_meter::BandwidthMeter`]).

use std::sync::Arc;

pub trait TransferListener: Send + Sync {
    fn on_transfer_start(&self);
    fn on_bytes_transferred(&self, bytes: u32);
    fn on_transfer_end(&self);
}

impl TransferListener for crate::bandwidth_meter::BandwidthMeter {
    fn on_transfer_start(&self) {
        crate::bandwidth_meter::BandwidthMeter::on_transfer_start(self)
    }
    fn on_bytes_transferred(&self, bytes: u32) {
        crate::bandwidth_meter::BandwidthMeter::on_bytes_transferred(self, bytes)
    }
    fn on_transfer_end(&self) {
        crate::bandwidth_meter::BandwidthMeter::on_transfer_end(self)
    }
}

pub type SharedTransferListener = Arc<dyn TransferListener>;
