use midas_core::{UnpackError, UnpackResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Parameters of the custom unpacker stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpackerConfig {
    /// Registry name of the unpacker to build.
    pub unpacker_class: String,
}

impl UnpackerConfig {
    pub fn new(unpacker_class: impl Into<String>) -> Self {
        Self {
            unpacker_class: unpacker_class.into(),
        }
    }

    /// Reads the stage's parameter block. Unrelated keys are ignored.
    pub fn from_parameters(parameters: &Value) -> UnpackResult<Self> {
        let config = Self::deserialize(parameters).map_err(|e| {
            UnpackError::config(format!("missing or invalid 'unpacker_class': {e}"))
        })?;
        config.validate().map_err(UnpackError::config)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.unpacker_class.trim().is_empty() {
            return Err("'unpacker_class' must not be empty".into());
        }
        Ok(())
    }
}
