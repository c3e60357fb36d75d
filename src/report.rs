use crate::runner::RunSummary;
use anyhow::Result;
use std::fmt::Write;

pub fn render_text(summary: &RunSummary) -> Result<String> {
    let mut out = String::new();
    let stats = &summary.stats;

    for failure in &summary.failures {
        writeln!(out, "Error processing {}: {}", failure.path.display(), failure.error)?;
    }

    writeln!(out, "\nStatistics:")?;
    if summary.dry_run {
        writeln!(out, "DRY RUN MODE: No files were modified")?;
    }
    writeln!(out, "Files processed: {}", stats.files_processed)?;
    writeln!(out, "Files modified: {}", stats.files_modified)?;
    if stats.files_failed > 0 {
        writeln!(out, "Files failed: {}", stats.files_failed)?;
    }
    writeln!(
        out,
        "Blocks removed ({}): {}",
        summary.block_kind, stats.blocks_removed
    )?;
    writeln!(out, "Processing time: {:?}", stats.elapsed)?;

    Ok(out)
}

pub fn render_json(summary: &RunSummary, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(summary)?
    } else {
        serde_json::to_string(summary)?
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::FileFailure;
    use crate::stats::AggregateStats;
    use std::path::PathBuf;

    fn summary(dry_run: bool) -> RunSummary {
        RunSummary {
            root: PathBuf::from("infra"),
            dry_run,
            block_kind: "moved".to_string(),
            files_found: 3,
            stats: AggregateStats {
                files_processed: 2,
                files_modified: 1,
                files_failed: 1,
                blocks_removed: 2,
                ..Default::default()
            },
            failures: vec![FileFailure {
                path: PathBuf::from("infra/bad.tf"),
                error: "error parsing infra/bad.tf: unexpected token".to_string(),
            }],
        }
    }

    #[test]
    fn test_text_report() {
        let text = render_text(&summary(false)).unwrap();
        assert!(text.starts_with("Error processing infra/bad.tf: error parsing"));
        assert!(text.contains("Files processed: 2\n"));
        assert!(text.contains("Files modified: 1\n"));
        assert!(text.contains("Files failed: 1\n"));
        assert!(text.contains("Blocks removed (moved): 2\n"));
        assert!(!text.contains("DRY RUN"));
    }

    #[test]
    fn test_text_report_dry_run_banner() {
        let text = render_text(&summary(true)).unwrap();
        assert!(text.contains("DRY RUN MODE: No files were modified"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&summary(true), false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["dry_run"], true);
        assert_eq!(value["files_modified"], 1);
        assert_eq!(value["blocks_removed"], 2);
        assert_eq!(value["elapsed_ms"], 0);
        assert_eq!(value["failures"][0]["path"], "infra/bad.tf");
    }
}
