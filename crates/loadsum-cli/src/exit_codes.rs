use loadsum_core::LoadsumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// A required input file does not exist.
    MissingInput = 3,

    /// An input exists but could not be parsed (e.g. a summary that is not JSON).
    InvalidInput = 4,

    /// IO or other runtime failure.
    RuntimeError = 5,
}

impl ExitCode {
    #[must_use]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<LoadsumError>() {
            Some(LoadsumError::MissingInput(_)) => Self::MissingInput,
            Some(LoadsumError::InvalidSummary { .. } | LoadsumError::Serde(_) | LoadsumError::Csv(_)) => {
                Self::InvalidInput
            }
            Some(LoadsumError::Io(_)) | None => Self::RuntimeError,
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.as_u8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn missing_input_maps_to_3() {
        let err = anyhow::Error::new(LoadsumError::MissingInput(PathBuf::from("x")))
            .context("load results");
        assert_eq!(ExitCode::from_error(&err), ExitCode::MissingInput);
        assert_eq!(ExitCode::MissingInput.as_u8(), 3);
    }

    #[test]
    fn invalid_summary_maps_to_4() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = anyhow::Error::new(LoadsumError::InvalidSummary {
            path: PathBuf::from("a.json"),
            source,
        });
        assert_eq!(ExitCode::from_error(&err), ExitCode::InvalidInput);
    }

    #[test]
    fn foreign_errors_map_to_runtime() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(ExitCode::from_error(&err), ExitCode::RuntimeError);
    }
}
