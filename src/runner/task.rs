// ABOUTME: Task definitions, the uniform action trait, and the registration set
// ABOUTME: Registration is write-once; execution only reads the set

use async_trait::async_trait;
use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::BuildContext;
use super::error::{Result, RunnerError};

/// Output produced by a completed action.
#[derive(Debug, Clone, Default)]
pub struct ActionOutput {
    pub message: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl ActionOutput {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            metadata: HashMap::new(),
        }
    }

    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// The single completion abstraction for task actions: every action is an
/// async unit of work resolving to `Ok(output)` or an error, regardless of
/// whether the underlying work is a subprocess, file IO, or pure computation.
#[async_trait]
pub trait TaskAction: Send + Sync {
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput>;
}

/// Adapter lifting an async closure into a [`TaskAction`].
pub struct FnAction<F>(pub F);

#[async_trait]
impl<F> TaskAction for FnAction<F>
where
    F: Fn(Arc<BuildContext>) -> BoxFuture<'static, Result<ActionOutput>> + Send + Sync,
{
    async fn run(&self, ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        (self.0)(ctx).await
    }
}

/// Action that does nothing; used for aggregate and alias tasks whose only
/// purpose is their prerequisite list.
pub struct NoopAction;

#[async_trait]
impl TaskAction for NoopAction {
    async fn run(&self, _ctx: Arc<BuildContext>) -> Result<ActionOutput> {
        Ok(ActionOutput::empty())
    }
}

#[derive(Clone)]
pub struct Task {
    pub name: String,
    pub prerequisites: Vec<String>,
    pub description: Option<String>,
    pub action: Arc<dyn TaskAction>,
}

/// The set of registered tasks. Registration happens once at startup;
/// afterwards the set is read-only, so execution requires no locking.
/// Registration order is preserved and serves as the tie-break order for
/// concurrently-eligible siblings.
#[derive(Default)]
pub struct TaskSet {
    tasks: IndexMap<String, Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. Fails with `DuplicateTask` if the name is taken.
    pub fn register(
        &mut self,
        name: &str,
        prerequisites: &[&str],
        description: Option<&str>,
        action: impl TaskAction + 'static,
    ) -> Result<()> {
        self.register_arc(name, prerequisites, description, Arc::new(action))
    }

    pub fn register_arc(
        &mut self,
        name: &str,
        prerequisites: &[&str],
        description: Option<&str>,
        action: Arc<dyn TaskAction>,
    ) -> Result<()> {
        if self.tasks.contains_key(name) {
            return Err(RunnerError::DuplicateTask {
                name: name.to_string(),
            });
        }

        self.tasks.insert(
            name.to_string(),
            Task {
                name: name.to_string(),
                prerequisites: prerequisites.iter().map(|s| s.to_string()).collect(),
                description: description.map(|s| s.to_string()),
                action,
            },
        );
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
