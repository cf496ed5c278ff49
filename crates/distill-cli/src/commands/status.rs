//! Status command implementation.

use crate::cli::StatusArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::Formatter;
use distill_pipeline::CheckpointStore;

/// Execute the status command.
pub fn execute_status(args: StatusArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let path = args.checkpoint.unwrap_or_else(|| config.paths.checkpoint.clone());
    let store = CheckpointStore::new(&path);

    if !store.exists() {
        println!(
            "{}",
            formatter.info(&format!("No checkpoint at {}; nothing to resume.", path.display()))
        );
        return Ok(());
    }

    let scan = store.scan()?;
    println!("{}", formatter.checkpoint_status(&scan, &path));
    Ok(())
}
