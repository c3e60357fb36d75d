use crate::config::Config;
use crate::document::Document;
use crate::error::ProcessError;
use crate::text;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Knobs for a single file's processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOptions {
    pub block_kind: String,
    pub canonical_format: bool,
    pub normalize_whitespace: bool,
    pub dry_run: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            block_kind: crate::config::DEFAULT_BLOCK_KIND.to_string(),
            canonical_format: true,
            normalize_whitespace: true,
            dry_run: false,
        }
    }
}

impl From<&Config> for ProcessOptions {
    fn from(config: &Config) -> Self {
        Self {
            block_kind: config.processing.block_kind.clone(),
            canonical_format: config.processing.canonical_format,
            normalize_whitespace: config.processing.normalize_whitespace,
            dry_run: config.dry_run,
        }
    }
}

/// Per-file outcome. `output` is only present when the file changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    pub modified: bool,
    pub blocks_removed: usize,
    pub output: Option<String>,
}

/// Rewrites one file's source text without touching the filesystem.
///
/// `path` only labels errors. The tree is parsed from LF text and the
/// result is written back in the file's dominant line terminator.
pub fn process_source(
    source: &str,
    path: &Path,
    options: &ProcessOptions,
) -> Result<ProcessingResult, ProcessError> {
    let ending = text::LineEnding::detect(source);
    let mut document =
        Document::parse(&text::to_lf(source)).map_err(|err| ProcessError::parse(path, err))?;
    let extraction = document.extract_blocks(&options.block_kind);

    let mut output = ending.apply(document.render());
    if options.canonical_format {
        output = text::canonicalize(&output);
    }

    // Blank-run collapsing only applies once something has changed; an
    // untouched file must come back byte for byte.
    let changed = extraction.modified() || output != source;
    if options.normalize_whitespace && changed {
        output = text::collapse_blank_runs(&output);
    }

    let modified = extraction.modified() || output != source;
    Ok(ProcessingResult {
        modified,
        blocks_removed: extraction.removed,
        output: modified.then_some(output),
    })
}

pub fn process_bytes(
    bytes: &[u8],
    path: &Path,
    options: &ProcessOptions,
) -> Result<ProcessingResult, ProcessError> {
    let source = std::str::from_utf8(bytes)
        .map_err(|err| ProcessError::parse(path, format!("invalid UTF-8: {}", err)))?;
    process_source(source, path, options)
}

/// Reads, rewrites and (unless dry-running) writes back one file.
pub fn process_file(path: &Path, options: &ProcessOptions) -> Result<ProcessingResult, ProcessError> {
    let bytes = fs::read(path).map_err(|err| ProcessError::read(path, err))?;
    let result = process_bytes(&bytes, path, options)?;

    if let Some(output) = result.output.as_deref() {
        if options.dry_run {
            tracing::debug!("Dry run, not writing {:?}", path);
        } else {
            write_atomically(path, output).map_err(|err| ProcessError::write(path, err))?;
            tracing::debug!("Rewrote {:?}", path);
        }
    }

    Ok(result)
}

/// Replaces `path` with `contents` via a sibling temp file and a rename, so
/// the file is never observed half-written. Original permissions are kept.
fn write_atomically(path: &Path, contents: &str) -> io::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let permissions = fs::metadata(path)?.permissions();

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(contents.as_bytes())?;
    temp.as_file().sync_all()?;
    fs::set_permissions(temp.path(), permissions)?;
    temp.persist(path).map_err(|err| err.error)?;

    Ok(())
}
