//! Command: print version information.

/// Print the confit version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    let version = option_env!("CONFIT_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    println!("confit {version}");
}
