//! Launch and resume entry points

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use batchline::execution::{JobExecution, JobInstance, StepExecution};
use batchline::job::{Job, Step, StepError};
use batchline::launcher::JobLauncher;
use batchline::notification::Notifier;
use batchline::repository::{InMemoryJobRepository, JobRepository, RepositoryError};
use batchline::status::{BatchStatus, ExitCode};
use batchline::BatchError;

struct NoopStep {
    name: String,
}

#[async_trait]
impl Step for NoopStep {
    fn name(&self) -> &str {
        &self.name
    }

    async fn execute(&self, step_execution: &mut StepExecution) -> Result<(), StepError> {
        step_execution.increment_read_count();
        step_execution.increment_write_count();
        Ok(())
    }
}

fn noop(name: &str) -> NoopStep {
    NoopStep {
        name: name.to_string(),
    }
}

#[tokio::test]
async fn test_launch_creates_runs_and_persists() {
    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository.clone()).with_step(noop("copy"));
    let instance = JobInstance::new("acme_product_import", "import");

    let execution = JobLauncher::new().launch(&job, &instance).await.unwrap();

    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(execution.exit_status().exit_code(), ExitCode::Completed);
    assert_eq!(execution.pid(), Some(std::process::id()));
    assert_eq!(
        execution.job_instance().map(|i| i.code()),
        Some("acme_product_import")
    );

    let stored = repository
        .find_job_execution_by_id(execution.id().unwrap())
        .await
        .unwrap()
        .expect("launched execution should be stored");
    assert_eq!(stored.status(), BatchStatus::Completed);
}

#[tokio::test]
async fn test_resume_runs_a_starting_execution() {
    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository.clone()).with_step(noop("copy"));
    let instance = JobInstance::new("acme_product_import", "import");

    // A previously created but never driven execution record
    let pending = repository.create_job_execution(&instance).await.unwrap();
    let id = pending.id().unwrap();

    let execution = JobLauncher::new().resume(&job, id).await.unwrap();

    assert_eq!(execution.id(), Some(id));
    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(execution.step_executions().len(), 1);
}

#[tokio::test]
async fn test_resume_unknown_id_is_a_configuration_error() {
    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository).with_step(noop("copy"));

    match JobLauncher::new().resume(&job, 999).await {
        Err(BatchError::Configuration(message)) => assert!(message.contains("999")),
        other => panic!("expected configuration error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_resume_refuses_non_starting_execution_before_any_step() {
    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository.clone()).with_step(noop("copy"));
    let instance = JobInstance::new("acme_product_import", "import");

    let mut finished = repository.create_job_execution(&instance).await.unwrap();
    finished.upgrade_status(BatchStatus::Completed);
    repository.update_job_execution(&mut finished).await.unwrap();
    let id = finished.id().unwrap();

    match JobLauncher::new().resume(&job, id).await {
        Err(BatchError::Configuration(message)) => {
            assert!(message.contains("invalid status"));
            assert!(message.contains("COMPLETED"));
        }
        other => panic!("expected configuration error, got {other:?}"),
    }

    // No step ran and no state was mutated
    let stored = repository
        .find_job_execution_by_id(id)
        .await
        .unwrap()
        .unwrap();
    assert!(stored.step_executions().is_empty());
    assert_eq!(stored.status(), BatchStatus::Completed);
}

#[tokio::test]
async fn test_notifiers_receive_the_result_and_failures_are_swallowed() {
    struct CountingNotifier {
        delivered: AtomicUsize,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn notify(&self, _job_execution: &JobExecution) -> anyhow::Result<()> {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct BrokenNotifier;

    #[async_trait]
    impl Notifier for BrokenNotifier {
        async fn notify(&self, _job_execution: &JobExecution) -> anyhow::Result<()> {
            anyhow::bail!("smtp connection refused")
        }
    }

    let counting = Arc::new(CountingNotifier {
        delivered: AtomicUsize::new(0),
    });

    let repository = Arc::new(InMemoryJobRepository::new());
    let job = Job::new("product_import", repository).with_step(noop("copy"));
    let instance = JobInstance::new("acme_product_import", "import");

    let launcher = JobLauncher::new()
        .with_notifier(Arc::new(BrokenNotifier))
        .with_notifier(counting.clone());

    // The broken notifier must not fail the launch
    let execution = launcher.launch(&job, &instance).await.unwrap();
    assert_eq!(execution.status(), BatchStatus::Completed);
    assert_eq!(counting.delivered.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_repository_failure_is_fatal() {
    /// Accepts the create call, then refuses every update
    struct BrokenRepository {
        inner: InMemoryJobRepository,
    }

    #[async_trait]
    impl JobRepository for BrokenRepository {
        async fn create_job_execution(
            &self,
            job_instance: &JobInstance,
        ) -> Result<JobExecution, RepositoryError> {
            self.inner.create_job_execution(job_instance).await
        }

        async fn update_job_execution(
            &self,
            _job_execution: &mut JobExecution,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::SaveFailed("connection lost".to_string()))
        }

        async fn find_job_execution_by_id(
            &self,
            id: i64,
        ) -> Result<Option<JobExecution>, RepositoryError> {
            self.inner.find_job_execution_by_id(id).await
        }
    }

    let repository = Arc::new(BrokenRepository {
        inner: InMemoryJobRepository::new(),
    });
    let job = Job::new("product_import", repository).with_step(noop("copy"));
    let instance = JobInstance::new("acme_product_import", "import");

    match JobLauncher::new().launch(&job, &instance).await {
        Err(BatchError::Repository(error)) => {
            assert!(error.to_string().contains("connection lost"));
        }
        other => panic!("expected repository error, got {other:?}"),
    }
}
