use tracing::debug;

use crate::dedup::DedupPolicy;
use crate::model::{HomeworkTaskDraft, Task};

use super::MergeOutcome;

pub fn merge_homework(
    tasks: &mut Vec<Task>,
    drafts: &[HomeworkTaskDraft],
    policy: &DedupPolicy,
) -> MergeOutcome {
    let mut keys: Vec<String> = tasks
        .iter()
        .map(|task| policy.task_key(&task.title))
        .collect();
    let mut outcome = MergeOutcome::default();

    for draft in drafts {
        let key = policy.task_key(&draft.title);
        if keys
            .iter()
            .any(|existing| policy.task_keys_conflict(existing, &key))
        {
            debug!(title = %draft.title, "skipping homework already on the task list");
            outcome.skipped += 1;
            continue;
        }

        keys.push(key);
        tasks.push(Task::from(draft.clone()));
        outcome.added += 1;
    }

    outcome
}
