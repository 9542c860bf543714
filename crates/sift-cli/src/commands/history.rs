//! History command implementation.

use crate::cli::HistoryArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::store::SessionStore;

/// Execute the history command.
pub fn execute_history(args: HistoryArgs, store: &SessionStore, formatter: &Formatter) -> Result<()> {
    if args.clear {
        store.clear_history()?;
        println!("{}", formatter.success("Instruction history cleared"));
        return Ok(());
    }

    println!("{}", formatter.format_history(&store.instruction_history())?);
    Ok(())
}
