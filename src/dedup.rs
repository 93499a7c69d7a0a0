use crate::extract::{normalize, normalized_prefix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DedupPolicy {
    pub draft_prefix_chars: usize,
    pub task_prefix_chars: usize,
    pub fuzzy_min_chars: usize,
    pub fuzzy_prefix_chars: usize,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        Self {
            draft_prefix_chars: 25,
            task_prefix_chars: 30,
            fuzzy_min_chars: 20,
            fuzzy_prefix_chars: 30,
        }
    }
}

impl DedupPolicy {
    pub fn draft_already_seen<'a, I>(&self, accepted_titles: I, title: &str) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        let key = normalized_prefix(title, self.draft_prefix_chars);
        if key.is_empty() {
            return false;
        }
        accepted_titles
            .into_iter()
            .any(|accepted| normalize(accepted).contains(&key))
    }

    pub fn task_key(&self, title: &str) -> String {
        normalized_prefix(title, self.task_prefix_chars)
    }

    pub fn task_keys_conflict(&self, existing_key: &str, candidate_key: &str) -> bool {
        if existing_key.is_empty() || candidate_key.is_empty() {
            return false;
        }
        existing_key.contains(candidate_key) || candidate_key.contains(existing_key)
    }

    pub fn same_assignment_name(&self, left: &str, right: &str) -> bool {
        normalize(left) == normalize(right)
    }

    pub fn is_same_assignment(&self, left: &str, right: &str) -> bool {
        let left = normalize(left);
        let right = normalize(right);

        if left == right {
            return true;
        }
        if left.is_empty() || right.is_empty() {
            return false;
        }
        if left.contains(&right) || right.contains(&left) {
            return true;
        }

        left.len() > self.fuzzy_min_chars
            && right.len() > self.fuzzy_min_chars
            && left
                .chars()
                .take(self.fuzzy_prefix_chars)
                .eq(right.chars().take(self.fuzzy_prefix_chars))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_prefix_match_is_case_and_punctuation_insensitive() {
        let policy = DedupPolicy::default();
        let accepted = ["Read Chapter 5 of the novel and annotate margins (History)"];

        assert!(policy.draft_already_seen(
            accepted.iter().copied(),
            "read chapter 5 of the NOVEL and answer questions"
        ));
        assert!(!policy.draft_already_seen(
            accepted.iter().copied(),
            "Worksheet on fractions page 12"
        ));
    }

    #[test]
    fn title_without_ascii_key_is_never_seen() {
        let policy = DedupPolicy::default();
        let accepted = ["Read Chapter 5 of the textbook (Science)"];

        assert!(!policy.draft_already_seen(
            accepted.iter().copied(),
            "Прочитать главу пять дома"
        ));
        assert!(!policy.draft_already_seen(
            accepted.iter().copied(),
            "!!! ???"
        ));
    }

    #[test]
    fn empty_task_keys_never_conflict() {
        let policy = DedupPolicy::default();
        assert!(!policy.task_keys_conflict("", "readchapter5"));
        assert!(policy.task_keys_conflict(
            "readchapter5science",
            "readchapter5"
        ));
    }

    #[test]
    fn is_same_assignment_covers_three_tiers() {
        let policy = DedupPolicy::default();

        assert!(policy.is_same_assignment("Quiz #3", "quiz 3"));
        assert!(policy.is_same_assignment(
            "Lab Report",
            "Lab Report - Density"
        ));
        assert!(policy.is_same_assignment(
            "Chapter Seven Vocabulary Practice Set A",
            "Chapter Seven Vocabulary Practice Set B"
        ));
        assert!(!policy.is_same_assignment("Unit 1 Test", "Unit 2 Test"));
        assert!(!policy.is_same_assignment("", "Unit 2 Test"));
    }
}
