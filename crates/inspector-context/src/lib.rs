//! Session-scoped context propagation (C1).
//!
//! Threads a durable session-id through concurrent workflow execution
//! without parameter plumbing. Backed by a `tokio::task_local!` slot: each
//! concurrent task sees an independent copy. Tokio task-locals are *not*
//! inherited across a `tokio::spawn` boundary — the spawned future is
//! polled as its own task, outside the `scope` that set the value — so
//! inheriting into spawned work goes through [`spawn`], which snapshots
//! the caller's id and re-enters `scope` inside the new task.

use std::future::Future;
use std::sync::Arc;

tokio::task_local! {
    static SESSION_ID: Arc<str>;
}

/// Returned by [`get`] when no session-id has been set for the current task.
pub const UNKNOWN: &str = "unknown";

/// Run `fut` with `id` bound as the current task's session-id.
///
/// This is the realization of `set(id)`: the spec models a one-shot set
/// at the root of a workflow, which in an async-task world is naturally
/// expressed as "run the rest of this task's work inside a scope that has
/// the value set" rather than mutating ambient state in place. Calling this
/// from a task that is already inside a scope creates a *nested* scope for
/// the duration of `fut` — replacing an existing id within the same task
/// scope is explicitly undefined by the contract, so callers must call this
/// exactly once per workflow root rather than re-entering it mid-workflow.
pub async fn scope<F, T>(id: impl Into<Arc<str>>, fut: F) -> T
where
    F: Future<Output = T>,
{
    SESSION_ID.scope(id.into(), fut).await
}

/// Get the current task's session-id, or [`UNKNOWN`] if none is set.
/// Never fails.
pub fn get() -> Arc<str> {
    SESSION_ID
        .try_with(|id| id.clone())
        .unwrap_or_else(|_| Arc::from(UNKNOWN))
}

/// Spawn `fut` as a new task that inherits the *caller's* current
/// session-id. A plain `tokio::spawn` would not see it — task-locals are
/// task-scoped, and the spawned future is polled outside the caller's
/// `scope` — so this snapshots [`get`] before spawning and re-enters
/// `scope` inside the new task, making inheritance explicit rather than
/// assuming the runtime gives it for free.
pub fn spawn<F>(fut: F) -> tokio::task::JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let id = get();
    tokio::spawn(scope(id, fut))
}

/// Wrap an async closure so that, when invoked, it runs with the *caller's*
/// current session-id re-entered in its own task. This is the Rust
/// realization of the spec's `bind(fn) -> fn'`: rather than inspecting a
/// target function's formal parameter list at runtime (not expressible in
/// a statically typed language), `bind` captures the session-id at wrap
/// time and threads it through `scope` whenever the wrapped future runs,
/// which is the behavior the spec contract actually cares about —
/// descendant code observing the session-id without explicit plumbing.
pub fn bind<F, Fut, T>(f: F) -> impl Fn() -> futures::future::BoxFuture<'static, T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    move || {
        let id = get();
        let fut = f();
        Box::pin(scope(id, fut))
    }
}
