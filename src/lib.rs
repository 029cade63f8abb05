//! Station-keeping simulation: a control-loop environment in which a policy
//! decides when to fire a thruster to hold a decaying low orbit near its
//! target altitude.
//!
//! The member crates are re-exported here so front-ends (the CLI, training
//! bindings, tests) depend on a single facade.

pub use keeper_config as config;
pub use keeper_core::{constants, time, units, vector};
pub use keeper_env as env;
pub use keeper_export as export;
pub use keeper_orbits as orbits;

/// Returns the version of the library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
