//! JSON file writer for completed verdicts.
//!
//! Each verdict is written as one pretty-printed JSON file named after
//! its session id. The record is self-contained: re-parsing it yields
//! the identical structure without re-running the deliberation.

use council_application::ports::verdict_store::{StoreError, VerdictStore};
use council_domain::Verdict;
use std::path::{Path, PathBuf};
use tracing::info;

/// Verdict store that writes one JSON file per session
pub struct JsonVerdictStore {
    dir: PathBuf,
}

impl JsonVerdictStore {
    /// Create a store writing into the given directory.
    ///
    /// The directory is created on first save if it doesn't exist.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl VerdictStore for JsonVerdictStore {
    fn save(&self, verdict: &Verdict) -> Result<PathBuf, StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(format!("council-{}.json", verdict.session_id));
        let json = serde_json::to_string_pretty(verdict)?;
        std::fs::write(&path, json)?;

        info!(path = %path.display(), "verdict saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{Anonymizer, MemberId, Opinion, RoundOpinions};
    use std::collections::BTreeMap;

    fn sample_verdict() -> Verdict {
        let mut anon = Anonymizer::new();
        let member = MemberId::new("mistral");
        let anon_id = anon.assign(&member);
        let opinions = vec![Opinion::new(
            member.clone(),
            anon_id.clone(),
            0,
            "ship it",
        )];

        Verdict {
            session_id: "test-42".into(),
            question: "ship?".into(),
            winning_text: "ship it".into(),
            winning_member: member,
            winning_anonymous_id: anon_id.clone(),
            vote_counts: BTreeMap::from([(anon_id, 2)]),
            total_votes: 2,
            opinions_by_round: RoundOpinions::group(&opinions),
            invalid_votes: 0,
            abstentions: 0,
            degraded: vec![],
            excluded: vec![],
        }
    }

    #[test]
    fn test_save_writes_reparseable_json() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonVerdictStore::new(dir.path());
        let verdict = sample_verdict();

        let path = store.save(&verdict).unwrap();
        assert_eq!(path.file_name().unwrap(), "council-test-42.json");

        let contents = std::fs::read_to_string(&path).unwrap();
        let reparsed: Verdict = serde_json::from_str(&contents).unwrap();
        assert_eq!(reparsed, verdict);
    }

    #[test]
    fn test_save_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonVerdictStore::new(dir.path().join("nested/results"));

        let path = store.save(&sample_verdict()).unwrap();
        assert!(path.exists());
    }
}
