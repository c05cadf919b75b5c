//! Batch job example demonstrating job construction, execution and reporting

use std::collections::HashMap;
use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use batchline::execution::{JobInstance, StepExecution};
use batchline::job::{Job, Step, StepError};
use batchline::launcher::JobLauncher;
use batchline::notification::LogNotifier;
use batchline::report::ExecutionReport;
use batchline::repository::{InMemoryJobRepository, JobRepository};
use serde_json::json;

/// Reads a small product feed and keeps track of its position in the
/// execution context so a restarted run could pick up where it left off
struct ReadProductsStep;

#[async_trait]
impl Step for ReadProductsStep {
    fn name(&self) -> &str {
        "read_products"
    }

    async fn execute(&self, step_execution: &mut StepExecution) -> Result<(), StepError> {
        let products = ["AKNTS_BPXS", "AKNTS_BPS", "AKNTS_WPXS", "not-a-sku"];

        for (line, sku) in products.iter().enumerate() {
            if step_execution.is_terminate_only() {
                return Ok(());
            }
            step_execution.increment_read_count();

            if !sku.starts_with("AKNTS") {
                step_execution.add_warning(
                    "invalid_sku",
                    "%sku% is not a valid product on line %line%",
                    HashMap::from([
                        ("%sku%".to_string(), sku.to_string()),
                        ("%line%".to_string(), (line + 1).to_string()),
                    ]),
                    &HashMap::from([("sku", *sku)]),
                );
                step_execution.increment_summary_info_by_one("skip");
                continue;
            }

            step_execution.increment_write_count();
            step_execution.increment_summary_info_by_one("create");
            step_execution
                .execution_context_mut()
                .put("last_line", json!(line + 1));
        }

        Ok(())
    }
}

/// Fails on purpose so the demo shows failure capture and reporting
struct PublishStep;

#[async_trait]
impl Step for PublishStep {
    fn name(&self) -> &str {
        "publish"
    }

    async fn execute(&self, _step_execution: &mut StepExecution) -> Result<(), StepError> {
        Err(StepError::Runtime {
            code: 42,
            message: "%channel% refused the publication".to_string(),
            parameters: HashMap::from([("%channel%".to_string(), "ecommerce".to_string())]),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository.clone())
        .with_step(ReadProductsStep)
        .with_step(PublishStep);

    let instance = JobInstance::new("acme_product_import", "import")
        .with_label("Acme product import")
        .with_connector("Acme CSV Connector");

    let launcher = JobLauncher::new().with_notifier(Arc::new(LogNotifier::new()));
    let execution = launcher.launch(&job, &instance).await?;

    println!("\n{}", ExecutionReport::new(&execution));

    println!("Warnings:");
    for step_execution in execution.step_executions() {
        for warning in step_execution.warnings() {
            println!(
                "  {}: {}",
                warning.name(),
                batchline::report::interpolate(warning.reason(), warning.reason_parameters())
            );
        }
    }

    // The record is durable: reload it by id and render the same report
    let reloaded = repository
        .find_job_execution_by_id(execution.id().expect("persisted execution has an id"))
        .await?
        .expect("execution record should be stored");
    println!(
        "Reloaded execution {}: status {}, exit code {}",
        reloaded.id().unwrap_or(0),
        reloaded.status(),
        reloaded.exit_status().exit_code()
    );

    Ok(())
}
