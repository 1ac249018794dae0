pub mod accumulator;
pub mod deadletter;
pub mod encode;
pub mod loader;

pub use accumulator::{EntityKind, QueryAccumulator};
pub use deadletter::DeadLetter;
pub use loader::BatchLoader;
