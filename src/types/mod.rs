pub mod legacy;
pub mod plan;
pub mod result;

pub use legacy::{LegacyDayActivity, LegacyTimelineItem};
pub use plan::{Activity, DayPlan, ParseContext, Period, Segment, Weather};
pub use result::{ParseMetadata, ParseQuality, ParseResult};
