//! Component A: URI resolution, duration/timestamp arithmetic and MIME
//! classification shared across the MPD model, parser and evaluator.

pub mod duration;
pub mod mime;
pub mod uri;

pub use duration::{ceil_divide, parse_xs_date_time, parse_xs_duration, scale_large_timestamp};
pub use uri::{decode_query_component, get_query_param, remove_query_param, resolve};

/// Sample flags carried on the track-output contract (§6, bit-exact).
pub mod sample_flags {
    pub const SYNC: u32 = 0x0000_0001;
    pub const ENCRYPTED: u32 = 0x0000_0002;
    pub const DECODE_ONLY: u32 = 0x0800_0000;
}
