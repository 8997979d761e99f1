//! Missing-data lab: simulate random data loss, then impute it back.

pub mod impute;
pub mod metrics;
pub mod simulate;
pub mod table;

pub use impute::*;
pub use metrics::*;
pub use simulate::*;
pub use table::*;
