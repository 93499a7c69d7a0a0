use anyhow::Result;
use tracing::info;

use crate::cli::ExportArgs;
use crate::store::DocumentStore;
use crate::util::{print_json_pretty, write_json_pretty};

pub fn run(args: ExportArgs) -> Result<()> {
    let db_path = args.store.db_path();
    let store = DocumentStore::open(&db_path)?;
    let document = store.load()?;

    match &args.output {
        Some(path) => {
            write_json_pretty(path, &document)?;
            info!(
                path = %path.display(),
                tasks = document.tasks.len(),
                subjects = document.grades.len(),
                "tracker exported"
            );
        }
        None => print_json_pretty(&document)?,
    }

    Ok(())
}
