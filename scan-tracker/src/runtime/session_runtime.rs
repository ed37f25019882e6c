//! Runtime helper for the dedicated broker-session thread.

use crate::observability::events;
use std::future::Future;
use std::io;
use std::thread;
use tokio::runtime::Builder;
use tracing::error;

const COMPONENT: &str = "session_runtime";

/// Runs `run_loop` to completion on a new named thread that owns a
/// current-thread runtime.
///
/// The future is built on the new thread, so it does not need to be `Send`.
pub(crate) fn spawn_session_thread<F, Fut>(name: &str, run_loop: F) -> io::Result<()>
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + 'static,
{
    let thread_name = name.to_string();
    thread::Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            let runtime = match Builder::new_current_thread().enable_all().build() {
                Ok(runtime) => runtime,
                Err(err) => {
                    error!(
                        event = events::SESSION_CONNECT_FAILED,
                        component = COMPONENT,
                        thread = %thread_name,
                        err = %err,
                        "unable to build session runtime"
                    );
                    return;
                }
            };

            runtime.block_on(run_loop());
        })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::spawn_session_thread;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn runs_future_on_named_thread() {
        let (tx, rx) = mpsc::channel();

        spawn_session_thread("session-test", move || async move {
            tokio::task::yield_now().await;
            let name = std::thread::current().name().map(str::to_owned);
            tx.send(name).expect("test receiver alive");
        })
        .expect("thread spawns");

        let name = rx
            .recv_timeout(Duration::from_secs(5))
            .expect("loop ran to completion");
        assert_eq!(name.as_deref(), Some("session-test"));
    }
}
