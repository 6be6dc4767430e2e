//! Tables command implementation
//!
//! Lists the reference tables stored for past sessions.

use crate::config::DelilahConfig;
use crate::deidentify::ReferenceTableStore;
use clap::Args;

/// Arguments for the tables command
#[derive(Args, Debug)]
pub struct TablesArgs {
    /// Show the number of placeholders in each table
    #[arg(long)]
    pub counts: bool,
}

impl TablesArgs {
    /// Execute the tables command
    pub fn execute(&self, config: &DelilahConfig) -> anyhow::Result<i32> {
        let store = ReferenceTableStore::new(config.deidentification.table_dir());

        println!("📊 Reference tables in {}", store.dir().display());
        println!();

        let sessions = match store.list_sessions() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to list reference tables");
                println!("   Error: {e}");
                return Ok(5);
            }
        };

        if sessions.is_empty() {
            println!("No reference tables found.");
            println!("Run 'delilah deidentify <FILE>' to create one.");
            return Ok(0);
        }

        for session in &sessions {
            if !self.counts {
                println!("  {session}");
                continue;
            }
            match store.load(session) {
                Ok(table) => println!("  {session}  ({} placeholders)", table.len()),
                Err(e) => println!("  {session}  (unreadable: {e})"),
            }
        }
        println!();
        println!("Total: {} session(s)", sessions.len());
        Ok(0)
    }
}
