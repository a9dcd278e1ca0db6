use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtworkError {
    #[error("artwork reference cannot be empty")]
    Empty,
}

/// Where a reward's artwork lives: a remote URL or a local path.
///
/// Anything that parses as an absolute URL is kept as one; everything else is
/// treated as a path relative to the host's asset root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtworkRef {
    FilePath(PathBuf),
    Url(Url),
}

impl ArtworkRef {
    /// Parse a raw artwork reference.
    ///
    /// # Errors
    ///
    /// Returns `ArtworkError::Empty` if the reference is blank.
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, ArtworkError> {
        let s = raw.as_ref().trim();
        if s.is_empty() {
            return Err(ArtworkError::Empty);
        }
        match Url::parse(s) {
            Ok(url) => Ok(ArtworkRef::Url(url)),
            Err(_) => Ok(ArtworkRef::FilePath(PathBuf::from(s))),
        }
    }

    #[must_use]
    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ArtworkRef::FilePath(p) => Some(p.as_path()),
            ArtworkRef::Url(_) => None,
        }
    }

    #[must_use]
    pub fn as_url(&self) -> Option<&Url> {
        match self {
            ArtworkRef::Url(u) => Some(u),
            ArtworkRef::FilePath(_) => None,
        }
    }
}

impl std::fmt::Display for ArtworkRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtworkRef::FilePath(p) => write!(f, "{}", p.display()),
            ArtworkRef::Url(u) => write!(f, "{u}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_url_is_kept_as_url() {
        let art = ArtworkRef::parse("https://example.com/sticker1.png").unwrap();
        assert_eq!(
            art.as_url().map(Url::as_str),
            Some("https://example.com/sticker1.png")
        );
        assert!(art.as_path().is_none());
    }

    #[test]
    fn relative_reference_is_a_path() {
        let art = ArtworkRef::parse("stickers/star.png").unwrap();
        assert_eq!(art.as_path(), Some(Path::new("stickers/star.png")));
    }

    #[test]
    fn blank_reference_is_rejected() {
        assert_eq!(ArtworkRef::parse("  "), Err(ArtworkError::Empty));
    }
}
