mod celebration_handler;

pub use celebration_handler::{CelebrationHandler, CelebrationSink, LogCelebrationSink};
