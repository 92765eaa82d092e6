pub mod assemble;
pub mod dom;
pub mod matchers;
pub mod names;
pub mod segment;

pub use assemble::{capture_date, RecordAssembler};
pub use matchers::{match_email, match_phone};
pub use names::NamePolicy;
pub use segment::{Segment, Segmenter};
