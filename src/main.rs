//! # photo-organize CLI
//!
//! Command-line interface for the photo organizer.
//!
//! ## Usage
//! ```bash
//! photo-organize organize ~/Unsorted ~/Photos --dry-run
//! photo-organize dedup ~/Photos
//! ```

mod cli;

use photo_organizer::Result;

fn main() -> Result<()> {
    photo_organizer::init_tracing();
    cli::run()
}
