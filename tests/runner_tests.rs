// ABOUTME: Integration tests for the task runner core
// ABOUTME: Covers ordering, deduplication, abort semantics, and graph error handling

use futures::FutureExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pipewright::config::Config;
use pipewright::runner::{
    ActionOutput, BuildContext, FnAction, RunStatus, RunnerError, TaskRunner, TaskSet, TaskStatus,
};

type OrderLog = Arc<Mutex<Vec<String>>>;

fn test_context() -> Arc<BuildContext> {
    Arc::new(BuildContext::new(Config::default()))
}

fn record(
    log: &OrderLog,
    name: &'static str,
) -> FnAction<
    impl Fn(Arc<BuildContext>) -> futures::future::BoxFuture<'static, pipewright::runner::Result<ActionOutput>>
        + Send
        + Sync,
> {
    let log = Arc::clone(log);
    FnAction(move |_ctx| {
        let log = Arc::clone(&log);
        async move {
            log.lock().unwrap().push(name.to_string());
            Ok::<_, RunnerError>(ActionOutput::empty())
        }
        .boxed()
    })
}

fn position(log: &[String], name: &str) -> usize {
    log.iter()
        .position(|t| t == name)
        .unwrap_or_else(|| panic!("{} never ran", name))
}

#[tokio::test]
async fn test_prerequisites_run_exactly_once_and_first() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();
    tasks.register("clean", &[], None, record(&log, "clean")).unwrap();
    tasks
        .register("jshint", &[], None, record(&log, "jshint"))
        .unwrap();
    tasks
        .register("htmlhint", &[], None, record(&log, "htmlhint"))
        .unwrap();
    tasks
        .register(
            "compile",
            &["clean", "jshint", "htmlhint"],
            None,
            record(&log, "compile"),
        )
        .unwrap();
    tasks
        .register("extras", &["clean"], None, record(&log, "extras"))
        .unwrap();
    tasks
        .register(
            "build",
            &["clean", "compile", "extras"],
            None,
            record(&log, "build"),
        )
        .unwrap();

    let runner = TaskRunner::new(4);
    let result = runner
        .run(&tasks, &["build".to_string()], test_context())
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Success);
    assert_eq!(result.summary.total_tasks, 6);

    let order = log.lock().unwrap().clone();
    assert_eq!(order.len(), 6, "each task runs exactly once: {order:?}");
    assert!(position(&order, "clean") < position(&order, "compile"));
    assert!(position(&order, "jshint") < position(&order, "compile"));
    assert!(position(&order, "htmlhint") < position(&order, "compile"));
    assert!(position(&order, "clean") < position(&order, "extras"));
    assert!(position(&order, "compile") < position(&order, "build"));
    assert!(position(&order, "extras") < position(&order, "build"));
}

#[tokio::test]
async fn test_duplicate_registration_rejected() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();
    tasks.register("clean", &[], None, record(&log, "clean")).unwrap();

    let err = tasks
        .register("clean", &[], None, record(&log, "clean"))
        .unwrap_err();
    assert!(matches!(err, RunnerError::DuplicateTask { name } if name == "clean"));
}

#[tokio::test]
async fn test_cycle_aborts_before_any_task_runs() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();
    tasks.register("a", &["b"], None, record(&log, "a")).unwrap();
    tasks.register("b", &["c"], None, record(&log, "b")).unwrap();
    tasks.register("c", &["a"], None, record(&log, "c")).unwrap();

    let runner = TaskRunner::new(4);
    let err = runner
        .run(&tasks, &["a".to_string()], test_context())
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::CyclicDependency { .. }));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_target_aborts_before_any_task_runs() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();
    tasks.register("clean", &[], None, record(&log, "clean")).unwrap();

    let runner = TaskRunner::new(4);
    let err = runner
        .run(&tasks, &["dist".to_string()], test_context())
        .await
        .unwrap_err();

    assert!(matches!(err, RunnerError::UnknownTask { name } if name == "dist"));
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_failure_aborts_dependents_but_siblings_finish() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();

    tasks
        .register(
            "jshint",
            &[],
            None,
            FnAction(|_ctx: Arc<BuildContext>| {
                async move {
                    Err::<ActionOutput, _>(RunnerError::LintViolation {
                        tool: "jshint".to_string(),
                        details: "main.js: unexpected token".to_string(),
                    })
                }
                .boxed()
            }),
        )
        .unwrap();

    let slow_log = Arc::clone(&log);
    tasks
        .register(
            "htmlhint",
            &[],
            None,
            FnAction(move |_ctx: Arc<BuildContext>| {
                let log = Arc::clone(&slow_log);
                async move {
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    log.lock().unwrap().push("htmlhint".to_string());
                    Ok::<_, RunnerError>(ActionOutput::empty())
                }
                .boxed()
            }),
        )
        .unwrap();

    tasks
        .register(
            "compile",
            &["jshint", "htmlhint"],
            None,
            record(&log, "compile"),
        )
        .unwrap();

    let runner = TaskRunner::new(4);
    let result = runner
        .run(&tasks, &["compile".to_string()], test_context())
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert!(result
        .error
        .as_deref()
        .unwrap()
        .contains("unexpected token"));

    // The in-flight sibling completed despite the failure.
    assert_eq!(
        result.get_task_result("htmlhint").unwrap().status,
        TaskStatus::Success
    );
    // The dependent never started.
    assert_eq!(
        result.get_task_result("compile").unwrap().status,
        TaskStatus::Skipped
    );
    let order = log.lock().unwrap().clone();
    assert_eq!(order, vec!["htmlhint"]);
}

#[tokio::test]
async fn test_first_error_is_retained() {
    let mut tasks = TaskSet::new();
    tasks
        .register(
            "first",
            &[],
            None,
            FnAction(|_ctx: Arc<BuildContext>| {
                async move { Err::<ActionOutput, _>(RunnerError::action("first failure")) }.boxed()
            }),
        )
        .unwrap();
    tasks
        .register(
            "second",
            &[],
            None,
            FnAction(|_ctx: Arc<BuildContext>| {
                async move {
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Err::<ActionOutput, _>(RunnerError::action("second failure"))
                }
                .boxed()
            }),
        )
        .unwrap();

    let runner = TaskRunner::new(4);
    let result = runner
        .run(
            &tasks,
            &["first".to_string(), "second".to_string()],
            test_context(),
        )
        .await
        .unwrap();

    assert_eq!(result.status, RunStatus::Failed);
    assert!(result.error.as_deref().unwrap().contains("first failure"));
    assert_eq!(result.summary.failed_tasks, 2);
}

#[tokio::test]
async fn test_targets_restrict_the_run() {
    let log: OrderLog = Arc::new(Mutex::new(Vec::new()));
    let mut tasks = TaskSet::new();
    tasks.register("clean", &[], None, record(&log, "clean")).unwrap();
    tasks
        .register("images", &["clean"], None, record(&log, "images"))
        .unwrap();
    tasks
        .register("fonts", &["clean"], None, record(&log, "fonts"))
        .unwrap();

    let runner = TaskRunner::new(4);
    let result = runner
        .run(&tasks, &["images".to_string()], test_context())
        .await
        .unwrap();

    assert_eq!(result.summary.total_tasks, 2);
    assert!(result.get_task_result("fonts").is_none());

    let order = log.lock().unwrap().clone();
    assert_eq!(order, vec!["clean", "images"]);
}

#[tokio::test]
async fn test_concurrency_limit_respected() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let active = Arc::new(AtomicUsize::new(0));
    let peak = Arc::new(AtomicUsize::new(0));
    let mut tasks = TaskSet::new();

    for i in 0..6 {
        let active = Arc::clone(&active);
        let peak = Arc::clone(&peak);
        tasks
            .register(
                &format!("task_{i}"),
                &[],
                None,
                FnAction(move |_ctx: Arc<BuildContext>| {
                    let active = Arc::clone(&active);
                    let peak = Arc::clone(&peak);
                    async move {
                        let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        active.fetch_sub(1, Ordering::SeqCst);
                        Ok::<_, RunnerError>(ActionOutput::empty())
                    }
                    .boxed()
                }),
            )
            .unwrap();
    }

    let targets: Vec<String> = (0..6).map(|i| format!("task_{i}")).collect();
    let runner = TaskRunner::new(2);
    let result = runner.run(&tasks, &targets, test_context()).await.unwrap();

    assert_eq!(result.status, RunStatus::Success);
    assert!(peak.load(Ordering::SeqCst) <= 2);
}
