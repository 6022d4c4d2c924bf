pub mod client;
pub mod config;
pub mod refresh;
pub mod status;
pub mod waiters;

/// Default user agent for `navwait` - automatically uses the package version
///
/// All modules should use `client::new(Some(USER_AGENT))` for consistency.
/// User-agent can be overridden via `NAVWAIT_USER_AGENT` environment variable.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
