//! Profiling utilities based on the `puffin` crate.
//!
//! Scopes are always compiled in and cost next to nothing until
//! [`set_enabled`] turns them on. The `profiling` feature adds the
//! `puffin_http` server so `puffin_viewer` can attach.

pub use puffin::{GlobalProfiler, profile_function, profile_scope};

/// Turn scope collection on or off.
pub fn set_enabled(enabled: bool) {
    puffin::set_scopes_on(enabled);
}

/// Mark the start of a new frame for profiling.
///
/// Call this once per frame in your main loop to organize profiling data by frame.
#[inline]
pub fn new_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(feature = "profiling")]
mod server {
    use std::sync::OnceLock;

    static PROFILING_SERVER: OnceLock<puffin_http::Server> = OnceLock::new();

    /// Start the puffin HTTP server on the default port (8585).
    ///
    /// # Example
    /// ```no_run
    /// umbra_core::profiling::start_server();
    /// ```
    pub fn start_server() {
        super::set_enabled(true);

        match puffin_http::Server::new("0.0.0.0:8585") {
            Ok(server) => {
                tracing::info!("Puffin profiler server started on http://0.0.0.0:8585");
                let _ = PROFILING_SERVER.set(server);
            }
            Err(e) => {
                tracing::error!("Failed to start puffin server: {}", e);
            }
        }
    }
}

#[cfg(feature = "profiling")]
pub use server::start_server;
