use anyhow::{Context, Result, bail};
use tracing::info;

use crate::cli::RestoreArgs;
use crate::model::DocumentPatch;
use crate::store::DocumentStore;
use crate::util::read_input;

pub fn run(args: RestoreArgs) -> Result<()> {
    let raw = read_input(&args.input)?;
    let patch = parse_backup(&raw)?;
    let fields = patch.provided_fields();

    let db_path = args.store.db_path();
    let mut store = DocumentStore::open(&db_path)?;
    store.update(|document| {
        patch.apply_to(document);
        Ok(())
    })?;

    info!(
        db = %db_path.display(),
        fields = %fields.join(","),
        "backup restored"
    );
    Ok(())
}

fn parse_backup(raw: &str) -> Result<DocumentPatch> {
    let patch: DocumentPatch =
        serde_json::from_str(raw).context("invalid backup format; nothing was restored")?;
    if patch.is_empty() {
        bail!(
            "backup has none of tasks, archivedTasks, grades, events, streak, totalCompleted; nothing was restored"
        );
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackerDocument;

    #[test]
    fn partial_backup_replaces_only_present_collections() {
        let patch = parse_backup(
            r#"{
              "tasks": [
                {
                  "id": 1712345678901,
                  "title": "Science fair board",
                  "category": "project",
                  "dueDate": "",
                  "completed": false,
                  "createdAt": "2026-01-10T12:00:00Z"
                }
              ],
              "streak": 4
            }"#,
        )
        .expect("backup parses");
        assert_eq!(patch.provided_fields(), vec!["tasks", "streak"]);

        let mut store = DocumentStore::open_in_memory().expect("store opens");
        let mut seeded = TrackerDocument::default();
        seeded.total_completed = 9;
        store.save(&seeded).expect("seed save");

        store
            .update(|document| {
                patch.apply_to(document);
                Ok(())
            })
            .expect("restore commits");

        let restored = store.load().expect("document loads");
        assert_eq!(restored.tasks.len(), 1);
        assert_eq!(restored.tasks[0].id, "1712345678901");
        assert!(restored.tasks[0].due_date.is_none());
        assert_eq!(restored.streak, 4);
        assert_eq!(restored.total_completed, 9);
    }

    #[test]
    fn unusable_backups_are_rejected() {
        assert!(parse_backup("{}").is_err());
        assert!(parse_backup(r#"{ "unrelated": true }"#).is_err());
        assert!(parse_backup("[1, 2, 3]").is_err());
        assert!(parse_backup(r#"{ "tasks": "nope" }"#).is_err());
    }
}
