use jsonschema::{validator_for, Validator};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum SchemaValidationError {
    #[error("Schema parse error: {0}")]
    SchemaParse(#[from] serde_json::Error),
    #[error("Schema compile error: {0}")]
    SchemaCompile(String),
    #[error("{0}")]
    ValidationFailed(String),
}

/// Compiled input schema of a single tool.
pub struct ArgumentSchema {
    validator: Validator,
}

impl ArgumentSchema {
    /// Compile a tool's `inputSchema`.
    pub fn compile(schema: &Value) -> Result<Self, SchemaValidationError> {
        let validator =
            validator_for(schema).map_err(|e| SchemaValidationError::SchemaCompile(e.to_string()))?;
        Ok(Self { validator })
    }

    /// Check call arguments, reporting the first violation.
    pub fn check(&self, arguments: &Value) -> Result<(), SchemaValidationError> {
        self.validator
            .validate(arguments)
            .map_err(|e| SchemaValidationError::ValidationFailed(e.to_string()))
    }
}

impl std::fmt::Debug for ArgumentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArgumentSchema").finish_non_exhaustive()
    }
}

/// Validate a JSON instance against a JSON Schema (draft 2020-12).
/// Returns Ok(()) if valid, Err otherwise.
pub fn validate_json(schema_str: &str, instance_str: &str) -> Result<(), SchemaValidationError> {
    let schema_json: Value = serde_json::from_str(schema_str)?;
    let instance_json: Value = serde_json::from_str(instance_str)?;

    ArgumentSchema::compile(&schema_json)?.check(&instance_json)
}
