use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancellable delayed call.
///
/// Each `schedule` cancels the pending timer and starts a new one. Only the
/// waiting phase is cancellable: once the delay elapses the task is built,
/// detached and runs to completion.
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Build and run a task after the delay unless another call supersedes
    /// it. `make` is invoked when the timer fires, not when scheduled.
    pub fn schedule<F, Fut>(&mut self, make: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(make());
        }));
    }

    /// Drop any pending timer and run `task` right away.
    pub fn fire_now<F>(&mut self, task: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        tokio::spawn(task)
    }

    /// Cancel the pending timer. Returns true if one was still waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let waiting = !handle.is_finished();
                handle.abort();
                waiting
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    type Task = std::pin::Pin<Box<dyn Future<Output = ()> + Send>>;
    type MakeTask = Box<dyn FnOnce() -> Task + Send>;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&str) -> MakeTask) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        let make = move |value: &str| -> MakeTask {
            let sink = sink.clone();
            let value = value.to_string();
            Box::new(move || -> Task {
                Box::pin(async move {
                    sink.lock().unwrap().push(value);
                })
            })
        };
        (log, make)
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_last_scheduled_call_runs() {
        let (log, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(make("v"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(make("vi"));
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule(make("villa"));
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(*log.lock().unwrap(), vec!["villa".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_runs_before_delay() {
        let (log, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(make("villa"));
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fire_now_cancels_pending() {
        let (log, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(make("vil"));
        debouncer.fire_now(make("")()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(*log.lock().unwrap(), vec![String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_and_drop() {
        let (log, make) = recorder();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        assert!(!debouncer.cancel());
        debouncer.schedule(make("a"));
        assert!(debouncer.cancel());

        debouncer.schedule(make("b"));
        drop(debouncer);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_is_built_when_timer_fires() {
        let built = Arc::new(Mutex::new(0u32));
        let counter = built.clone();
        let mut debouncer = Debouncer::new(Duration::from_millis(300));

        debouncer.schedule(move || {
            *counter.lock().unwrap() += 1;
            async {}
        });
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*built.lock().unwrap(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*built.lock().unwrap(), 1);
    }
}
