/// Re-export `Config` from `journeylytics-core` for use within this crate.
///
/// All environment-variable parsing lives in `journeylytics-core` so it can be
/// shared with integration tests without depending on the full server.
pub use journeylytics_core::config::Config;
