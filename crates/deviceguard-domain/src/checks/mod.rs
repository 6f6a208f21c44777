//! One detector per threat category.
//!
//! Every detector reads only from its providers and returns exactly one [`Indicator`]. Probe
//! failures never escape a detector: root and emulator sub-checks fail open, the tamper check
//! fails closed.
//!
//! [`Indicator`]: crate::model::Indicator

mod debugger;
mod emulator;
mod root;
mod tamper;


pub use debugger::detect_debugger;
pub use emulator::{EMULATOR_RULES, EmulatorRule, FieldMatch, detect_emulator};
pub use root::{TEST_KEYS_TAG, detect_root};
pub use tamper::detect_tamper;
