use std::env;

/// Initialize `pretty_env_logger`.
///
/// `RUST_LOG` is honoured when set, otherwise everything logs at `info`.
/// Debug mode raises this crate to `debug` on top of either.
pub fn init(debug: bool) {
    let mut builder = pretty_env_logger::formatted_builder();

    match env::var("RUST_LOG") {
        Ok(filters) => builder.parse_filters(&filters),
        Err(_) => builder.parse_filters("info"),
    };

    if debug {
        builder.filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Debug);
    }

    // A logger may already be installed, e.g. when embedded in a test harness
    let _ = builder.try_init();
}
