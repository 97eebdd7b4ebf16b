pub mod launch;
pub mod output;
pub mod progress;

pub use launch::{LaunchContext, StaticLaunchContext, SystemLaunchContext};
pub use output::{OutputFormatter, OutputMode};
pub use progress::{NoopProgress, ProgressManager, ProgressSink};
