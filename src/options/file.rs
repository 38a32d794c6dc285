//! Options-file persistence.

use super::OptionSet;
use crate::errors::{ConfigurationError, OpenAIError, OpenAIResult};
use std::path::Path;
use tracing::debug;

impl OptionSet {
    /// Reads an options file. Unknown keys are ignored.
    pub fn read_from(path: &Path) -> OpenAIResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| OpenAIError::io(path, e))?;
        let options = serde_json::from_str(&contents).map_err(|e| {
            OpenAIError::Configuration(ConfigurationError::InvalidOptionsFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })
        })?;
        debug!(path = %path.display(), "Read options file");
        Ok(options)
    }

    /// Writes the set as pretty-printed JSON, without the API key and the
    /// `json`/`stream` toggles.
    pub fn write_to(&self, path: &Path) -> OpenAIResult<()> {
        let mut contents = serde_json::to_string_pretty(self)
            .map_err(|e| OpenAIError::Serialization(e.to_string()))?;
        contents.push('\n');
        std::fs::write(path, contents).map_err(|e| OpenAIError::io(path, e))?;
        debug!(path = %path.display(), "Wrote options file");
        Ok(())
    }
}
