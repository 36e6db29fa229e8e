//! Tracing setup for the pkgen CLI.
//!
//! The subscriber is installed before config resolution so config loading is
//! logged under `-verbose`. `verbose: true` in a config file is only known
//! afterwards, so the level filter sits behind a reload handle.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

fn filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { "debug" } else { "info" })
}

/// A reloadable level filter starting at `info`, or `debug` when `verbose`.
pub fn filter_layer(verbose: bool) -> (reload::Layer<EnvFilter, Registry>, FilterHandle) {
    reload::Layer::new(filter(verbose))
}

/// Install the global subscriber. Diagnostics go to stderr.
pub fn init(verbose: bool) -> FilterHandle {
    let (filter, handle) = filter_layer(verbose);
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
    handle
}

/// Switch to `debug` once the resolved config asks for it.
pub fn raise_to_debug(handle: &FilterHandle) {
    if let Err(e) = handle.reload(filter(true)) {
        tracing::warn!(err = %e, "could not raise log level");
    }
}
