pub mod config;
pub mod errors;
pub mod refresh;
pub mod spec;
pub mod status;
mod tally;
pub mod watcher;

pub use errors::WaitError;
pub use refresh::{Refresh, RefreshFn, refresh_fn};
pub use spec::{Cadence, PollSchedule, WatchSpec};
pub use status::{Observation, Status};
pub use watcher::wait;
