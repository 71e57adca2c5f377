//! Background Replacement CLI Tool
//!
//! Command-line interface for replacing image backgrounds using the bgswap
//! library.

#[cfg(feature = "cli")]
use bgswap::cli;

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::main()
}

#[cfg(not(feature = "cli"))]
fn main() {
    panic!("CLI feature not enabled. Please rebuild with --features cli");
}
