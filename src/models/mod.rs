pub mod listing;
pub mod metrics;
pub mod record;

pub use listing::*;
pub use metrics::*;
pub use record::*;
