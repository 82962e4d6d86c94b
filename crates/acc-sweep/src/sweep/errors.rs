//! Error accumulation for sweeps

use std::fmt;

/// Every failure collected while sweeping, in the order it happened.
///
/// Empty means success. Nothing pushed into it is ever dropped: the
/// `Display` output lists each error with its full cause chain.
#[derive(Debug, Default)]
pub struct SweepErrors {
    errors: Vec<anyhow::Error>,
}

impl SweepErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: impl Into<anyhow::Error>) {
        self.errors.push(error.into());
    }

    /// Append every error of `other`, flattening instead of nesting.
    pub fn extend(&mut self, other: SweepErrors) {
        self.errors.extend(other.errors);
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &anyhow::Error> {
        self.errors.iter()
    }

    pub fn into_result(self) -> Result<(), SweepErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<anyhow::Error> for SweepErrors {
    fn from(error: anyhow::Error) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

impl IntoIterator for SweepErrors {
    type Item = anyhow::Error;
    type IntoIter = std::vec::IntoIter<anyhow::Error>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for SweepErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            0 => return write!(f, "no errors"),
            1 => write!(f, "1 error occurred:")?,
            n => write!(f, "{n} errors occurred:")?,
        }
        for error in &self.errors {
            write!(f, "\n\t* {error:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for SweepErrors {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn empty_is_ok() {
        assert!(SweepErrors::new().into_result().is_ok());
    }

    #[test]
    fn display_lists_every_error_with_causes() {
        let mut errors = SweepErrors::new();
        errors.push(anyhow!("first"));
        errors.push(
            Err::<(), _>(anyhow!("AccessDenied"))
                .context("deleting S3 Access Point (123:ap)")
                .unwrap_err(),
        );

        let text = errors.to_string();
        assert!(text.starts_with("2 errors occurred:"), "{text}");
        assert!(text.contains("* first"));
        assert!(text.contains("deleting S3 Access Point (123:ap): AccessDenied"));
    }

    #[test]
    fn extend_flattens() {
        let mut a = SweepErrors::from(anyhow!("a"));
        let mut b = SweepErrors::new();
        b.push(anyhow!("b1"));
        b.push(anyhow!("b2"));
        a.extend(b);

        assert_eq!(a.len(), 3);
        let messages: Vec<String> = a.into_iter().map(|e| e.to_string()).collect();
        assert_eq!(messages, ["a", "b1", "b2"]);
    }
}
