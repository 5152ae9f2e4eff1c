pub mod counters;
pub mod follow;
pub mod posts;
pub mod timeline;

pub use counters::CounterService;
pub use follow::FollowService;
pub use posts::PostService;
pub use timeline::{TimelineService, TimelineView};
