pub mod show;
pub mod soundtrack;

pub use show::{ShowDetail, ShowPatch, ShowRecord, WatchStatus};
pub use soundtrack::SoundtrackRecord;
