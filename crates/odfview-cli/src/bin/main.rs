//! odfview binary entry point

use anyhow::Result;
use odfview_cli::run_cli;

fn main() -> Result<()> {
    run_cli()
}
