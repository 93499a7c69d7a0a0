use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::cli::StoreArgs;
use crate::model::{ImportCounts, ImportRunManifest};
use crate::util::{now_utc_string, sha256_hex, utc_compact_string, write_json_pretty};

const MANIFEST_VERSION: u32 = 1;

pub(crate) struct ImportRun {
    started_ts: DateTime<Utc>,
    started_at: String,
    pub run_id: String,
}

impl ImportRun {
    pub fn start() -> Self {
        let started_ts = Utc::now();
        Self {
            started_ts,
            started_at: now_utc_string(),
            run_id: format!("run-{}", utc_compact_string(started_ts)),
        }
    }

    pub fn manifest_path(
        &self,
        store: &StoreArgs,
        explicit: Option<&Path>,
        prefix: &str,
    ) -> PathBuf {
        match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let file_name = format!("{prefix}_{}.json", utc_compact_string(self.started_ts));
                store.manifest_dir().join(file_name)
            }
        }
    }

    pub fn finish(
        &self,
        command: String,
        report_kind: &str,
        source: &str,
        db_path: &Path,
        counts: ImportCounts,
        warnings: Vec<String>,
    ) -> ImportRunManifest {
        ImportRunManifest {
            manifest_version: MANIFEST_VERSION,
            run_id: self.run_id.clone(),
            command,
            status: "completed".to_string(),
            started_at: self.started_at.clone(),
            updated_at: now_utc_string(),
            report_kind: report_kind.to_string(),
            source_sha256: sha256_hex(source.as_bytes()),
            source_chars: source.chars().count(),
            db_path: db_path.display().to_string(),
            counts,
            warnings,
        }
    }
}

pub(crate) fn write_manifest(path: &Path, manifest: &ImportRunManifest) -> Result<()> {
    write_json_pretty(path, manifest)?;
    info!(path = %path.display(), run_id = %manifest.run_id, "wrote import run manifest");
    Ok(())
}

pub(crate) fn render_store_flags(command: &mut Vec<String>, store: &StoreArgs) {
    command.push("--cache-root".to_string());
    command.push(store.cache_root.display().to_string());
    if let Some(path) = &store.db_path {
        command.push("--db-path".to_string());
        command.push(path.display().to_string());
    }
}
