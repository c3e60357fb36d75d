use std::io;
use std::path::{Path, PathBuf};

/// Failure while handling a single file. None of these abort a batch run.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("error reading file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid HCL (or not valid UTF-8). It is never written.
    #[error("error parsing {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("error writing file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ProcessError {
    pub(crate) fn read(path: &Path, source: io::Error) -> Self {
        Self::Read {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, message: impl ToString) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub(crate) fn write(path: &Path, source: io::Error) -> Self {
        Self::Write {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Write { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_file() {
        let err = ProcessError::parse(Path::new("modules/vpc.tf"), "unexpected token");
        assert_eq!(
            err.to_string(),
            "error parsing modules/vpc.tf: unexpected token"
        );
        assert_eq!(err.path(), Path::new("modules/vpc.tf"));
    }

    #[test]
    fn test_io_source_is_preserved() {
        let err = ProcessError::read(
            Path::new("main.tf"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("gone"));
    }
}
