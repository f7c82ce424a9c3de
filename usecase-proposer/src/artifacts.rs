//! Stage artifact I/O
//!
//! Each pipeline stage writes one text/markdown file at a fixed relative
//! path, overwritten on every run. Reading is best effort: an absent file
//! is a per-artifact warning in the UI, never a run failure.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Fixed (label, file name) pairs for the three stage artifacts,
/// in pipeline order
pub const STAGE_ARTIFACTS: [(&str, &str); 3] = [
    ("Research Findings", "task1output.txt"),
    ("Analysis Results", "task2output.txt"),
    ("Final Proposal", "final_proposal.txt"),
];

/// Read one artifact, `None` when the orchestrator never produced it
pub fn read_artifact(dir: &Path, file_name: &str) -> Option<String> {
    std::fs::read_to_string(dir.join(file_name)).ok()
}

/// Company name made safe for a file name: runs of whitespace and
/// path-hostile characters collapse to a single underscore
pub fn sanitize_company(company: &str) -> String {
    company
        .split(|c: char| !c.is_alphanumeric() && c != '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Download file name for an artifact, e.g. `Tesla_final_proposal.md`
pub fn export_name(company: &str, artifact_file: &str) -> String {
    let stem = Path::new(artifact_file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(artifact_file);
    format!("{}_{}.md", sanitize_company(company), stem)
}

/// Copy a present artifact to its download name inside `dir`
pub fn export_artifact(dir: &Path, artifact_file: &str, company: &str) -> Result<PathBuf> {
    let content = std::fs::read_to_string(dir.join(artifact_file))
        .with_context(|| format!("Artifact '{}' not found", artifact_file))?;
    let target = dir.join(export_name(company, artifact_file));
    std::fs::write(&target, content)
        .with_context(|| format!("Failed to write {}", target.display()))?;
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("proposer_artifacts_{}", name));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup_temp_dir(path: &PathBuf) {
        if path.exists() {
            std::fs::remove_dir_all(path).ok();
        }
    }

    #[test]
    fn sanitize_replaces_spaces() {
        assert_eq!(sanitize_company("Procter & Gamble"), "Procter_Gamble");
        assert_eq!(sanitize_company("  Tesla "), "Tesla");
        assert_eq!(sanitize_company("Rolls-Royce"), "Rolls-Royce");
    }

    #[test]
    fn separator_runs_collapse_to_one_underscore() {
        assert_eq!(sanitize_company("A  &  B"), "A_B");
        assert_eq!(sanitize_company("Ernst & Young / EY"), "Ernst_Young_EY");
    }

    #[test]
    fn export_name_uses_markdown_extension() {
        assert_eq!(
            export_name("Tesla", "final_proposal.txt"),
            "Tesla_final_proposal.md"
        );
        assert_eq!(
            export_name("Air France", "task1output.txt"),
            "Air_France_task1output.md"
        );
    }

    #[test]
    fn read_artifact_missing_is_none() {
        let dir = create_temp_dir("missing");
        assert!(read_artifact(&dir, "task1output.txt").is_none());
        cleanup_temp_dir(&dir);
    }

    #[test]
    fn read_artifact_present_returns_content() {
        let dir = create_temp_dir("present");
        std::fs::write(dir.join("task2output.txt"), "analysis text").unwrap();
        assert_eq!(
            read_artifact(&dir, "task2output.txt").as_deref(),
            Some("analysis text")
        );
        cleanup_temp_dir(&dir);
    }

    #[test]
    fn export_copies_under_sanitized_name() {
        let dir = create_temp_dir("export");
        std::fs::write(dir.join("final_proposal.txt"), "# Proposal").unwrap();

        let target = export_artifact(&dir, "final_proposal.txt", "Acme Corp").unwrap();
        assert!(target.ends_with("Acme_Corp_final_proposal.md"));
        assert_eq!(std::fs::read_to_string(target).unwrap(), "# Proposal");

        cleanup_temp_dir(&dir);
    }

    #[test]
    fn export_missing_artifact_errors() {
        let dir = create_temp_dir("export_missing");
        let result = export_artifact(&dir, "task1output.txt", "Acme");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not found"));
        cleanup_temp_dir(&dir);
    }
}
