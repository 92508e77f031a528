pub mod angles;
pub mod estimator;
pub mod filter;

pub use angles::{bearing_error, heading_from_mag, normalize_degrees};
pub use estimator::{FeedEvent, HeadingEstimator, IngestHandle, spawn_ingest};
pub use filter::CircularHeadingFilter;
