use thiserror::Error;

/// Why one analysis attempt failed. Either way the attempt is over and the
/// shell goes back to waiting for a file.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Error loading file: {0:#}")]
    Load(anyhow::Error),
    #[error("Error analyzing file: {0:#}")]
    Analyze(anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn display_carries_category_and_context() {
        let inner: anyhow::Result<()> =
            Err(anyhow::anyhow!("bad header")).context("Failed to probe audio format");
        let err = RunError::Load(inner.unwrap_err());
        assert_eq!(
            err.to_string(),
            "Error loading file: Failed to probe audio format: bad header"
        );

        let err = RunError::Analyze(anyhow::anyhow!("disk full"));
        assert_eq!(err.to_string(), "Error analyzing file: disk full");
    }
}
