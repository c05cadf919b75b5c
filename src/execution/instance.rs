//! Named job definitions

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named, repeatable job definition
///
/// The instance is what operators refer to ("launch acme_product_import");
/// each run of it produces one [`JobExecution`](super::JobExecution). The
/// raw configuration is carried opaquely; validating it against a schema
/// is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInstance {
    code: String,
    label: String,
    job_type: String,
    connector: String,
    raw_configuration: Map<String, Value>,
}

impl JobInstance {
    /// Create a job instance; the label defaults to the code
    pub fn new(code: impl Into<String>, job_type: impl Into<String>) -> Self {
        let code = code.into();
        Self {
            label: code.clone(),
            code,
            job_type: job_type.into(),
            connector: String::new(),
            raw_configuration: Map::new(),
        }
    }

    /// Set a human-readable label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the connector this job belongs to
    pub fn with_connector(mut self, connector: impl Into<String>) -> Self {
        self.connector = connector.into();
        self
    }

    /// Set the raw job configuration
    pub fn with_raw_configuration(mut self, raw_configuration: Map<String, Value>) -> Self {
        self.raw_configuration = raw_configuration;
        self
    }

    /// Unique code operators launch the job by
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable label
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Kind of job, e.g. `import` or `export`
    pub fn job_type(&self) -> &str {
        &self.job_type
    }

    /// Connector the job belongs to
    pub fn connector(&self) -> &str {
        &self.connector
    }

    /// Raw, unvalidated job configuration
    pub fn raw_configuration(&self) -> &Map<String, Value> {
        &self.raw_configuration
    }
}

impl std::fmt::Display for JobInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}]", self.code, self.job_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_label_defaults_to_code() {
        let instance = JobInstance::new("acme_product_import", "import");
        assert_eq!(instance.code(), "acme_product_import");
        assert_eq!(instance.label(), "acme_product_import");
        assert_eq!(instance.job_type(), "import");
        assert!(instance.raw_configuration().is_empty());
    }

    #[test]
    fn test_builder_setters() {
        let mut configuration = Map::new();
        configuration.insert("filePath".to_string(), json!("/tmp/products.csv"));

        let instance = JobInstance::new("acme_product_import", "import")
            .with_label("Acme product import")
            .with_connector("Acme CSV Connector")
            .with_raw_configuration(configuration);

        assert_eq!(instance.label(), "Acme product import");
        assert_eq!(instance.connector(), "Acme CSV Connector");
        assert_eq!(
            instance.raw_configuration().get("filePath"),
            Some(&json!("/tmp/products.csv"))
        );
    }
}
