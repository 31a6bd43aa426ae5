//! # people-sort CLI
//!
//! Command-line interface for the people sorter.
//!
//! ## Usage
//! ```bash
//! people-sort run ~/inbox --detector-cmd "python3 ssd_detect.py"
//! people-sort plan ~/inbox --manifest counts.json --format json
//! ```

mod cli;

use people_sorter::Result;

fn main() -> Result<()> {
    people_sorter::init_tracing();
    cli::run()
}
