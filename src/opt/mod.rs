//! Controller gain tuning and battery size sweeps.

pub mod optimizer;
pub mod search;
pub mod split;
pub mod sweep;
pub mod window;

pub use optimizer::{Optimization, optimize};
pub use search::{GridSearch, SelectionStrategy};
pub use sweep::{SweepPoint, sweep};
