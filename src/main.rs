//! # img-convert CLI
//!
//! Command-line interface for the image format converter.
//!
//! ## Usage
//! ```bash
//! img-convert convert ~/Photos/beach.jpg
//! img-convert batch ~/Photos --recursive --to png
//! ```

mod cli;

use image_format_converter::Result;
use std::process::ExitCode;

fn main() -> Result<ExitCode> {
    cli::run()
}
