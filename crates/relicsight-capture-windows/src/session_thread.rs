//! Dedicated single-use thread for capture session creation.
//!
//! WGC objects are bound to the apartment of the thread that creates them, so
//! creation never runs on a caller or runtime worker thread. On Windows the
//! thread joins a single-threaded WinRT apartment first; elsewhere it is a
//! plain thread.

use std::sync::{mpsc, Arc};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};

/// Result of a session build that may still be running.
pub struct PendingSession<T> {
    rx: mpsc::Receiver<Result<T>>,
    handle: Option<JoinHandle<()>>,
}

impl<T> PendingSession<T> {
    /// Non-blocking poll. `None` while the build is still running.
    pub fn try_take(&mut self) -> Option<Result<T>> {
        match self.rx.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.join();
                Some(Err(anyhow!("session thread exited without a result")))
            }
        }
    }

    /// Blocks until the build finishes.
    pub fn wait(mut self) -> Result<T> {
        let result = self
            .rx
            .recv()
            .unwrap_or_else(|_| Err(anyhow!("session thread exited without a result")));
        self.join();
        result
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("session thread panicked");
            }
        }
    }
}

/// Runs `build` on a fresh thread named `name`.
pub fn spawn<T, F>(name: &str, build: F) -> Result<PendingSession<T>>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let handle = std::thread::Builder::new()
        .name(name.to_owned())
        .spawn(move || {
            enter_apartment();
            let _ = tx.send(build());
        })
        .with_context(|| format!("spawn {name}"))?;

    Ok(PendingSession { rx, handle: Some(handle) })
}

// ── SessionSupervisor ─────────────────────────────────────────────────────────

type Build<T> = Arc<dyn Fn() -> Result<T> + Send + Sync>;

/// Owns at most one session and rebuilds it on session threads.
///
/// Polling never blocks. A failed build is retried once `backoff` has passed.
pub struct SessionSupervisor<T> {
    name: &'static str,
    build: Build<T>,
    backoff: Duration,
    session: Option<T>,
    pending: Option<PendingSession<T>>,
    retry_at: Option<Instant>,
    attempts: u64,
}

impl<T: Send + 'static> SessionSupervisor<T> {
    /// Starts the first build right away.
    pub fn start<F>(name: &'static str, backoff: Duration, build: F) -> Result<Self>
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
    {
        let mut supervisor = Self {
            name,
            build: Arc::new(build),
            backoff,
            session: None,
            pending: None,
            retry_at: None,
            attempts: 0,
        };
        supervisor.spawn_build()?;
        Ok(supervisor)
    }

    /// Blocks on an in-flight build.
    pub fn wait(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            self.session = Some(pending.wait()?);
        }
        Ok(())
    }

    /// Collects a finished build, starts a retry when one is due, and
    /// returns the live session if there is one.
    pub fn poll(&mut self) -> Option<&mut T> {
        if let Some(pending) = self.pending.as_mut() {
            match pending.try_take() {
                None => {}
                Some(Ok(session)) => {
                    tracing::info!("{} ready after {} attempt(s)", self.name, self.attempts);
                    self.session = Some(session);
                    self.pending = None;
                }
                Some(Err(e)) => {
                    tracing::warn!(
                        "{} build #{} failed, retrying in {:?}: {e:#}",
                        self.name, self.attempts, self.backoff
                    );
                    self.pending = None;
                    self.retry_at = Some(Instant::now() + self.backoff);
                }
            }
        }

        let due = self.retry_at.map_or(true, |at| Instant::now() >= at);
        if self.session.is_none() && self.pending.is_none() && due {
            if let Err(e) = self.spawn_build() {
                tracing::warn!("{}: {e:#}", self.name);
                self.retry_at = Some(Instant::now() + self.backoff);
            }
        }
        self.session.as_mut()
    }

    pub fn session(&self) -> Option<&T> {
        self.session.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Builds started so far, including the first.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Drops the live session; the next [`poll`](Self::poll) rebuilds it.
    pub fn reset(&mut self) {
        self.session = None;
        self.retry_at = None;
    }

    fn spawn_build(&mut self) -> Result<()> {
        let build = Arc::clone(&self.build);
        self.attempts += 1;
        self.retry_at = None;
        self.pending = Some(spawn(self.name, move || build())?);
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn enter_apartment() {
    use windows::Win32::System::WinRT::{RoInitialize, RO_INIT_SINGLETHREADED};
    // S_FALSE / RPC_E_CHANGED_MODE are fine: the thread already has an apartment.
    if let Err(e) = unsafe { RoInitialize(RO_INIT_SINGLETHREADED) } {
        tracing::debug!("RoInitialize: {e}");
    }
}

#[cfg(not(target_os = "windows"))]
fn enter_apartment() {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn wait_returns_the_build_result() {
        let pending = spawn("test-session", || Ok(std::thread::current().name().map(str::to_owned)))
            .unwrap();
        assert_eq!(pending.wait().unwrap().as_deref(), Some("test-session"));
    }

    #[test]
    fn try_take_is_non_blocking() {
        let (go_tx, go_rx) = mpsc::channel::<()>();
        let mut pending = spawn("test-gated", move || {
            go_rx.recv().ok();
            Ok(7)
        })
        .unwrap();

        assert!(pending.try_take().is_none());
        go_tx.send(()).unwrap();

        let mut result = None;
        for _ in 0..200 {
            if let Some(r) = pending.try_take() {
                result = Some(r);
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(result.unwrap().unwrap(), 7);
    }

    fn poll_until<T: Send + 'static>(sup: &mut SessionSupervisor<T>, done: impl Fn(&mut SessionSupervisor<T>) -> bool) {
        for _ in 0..400 {
            if done(sup) {
                return;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        panic!("supervisor never reached the expected state");
    }

    #[test]
    fn failed_build_is_retried_after_backoff() {
        use std::sync::atomic::{AtomicU32, Ordering};

        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let mut sup = SessionSupervisor::start("test-retry", Duration::from_millis(20), move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(anyhow!("window not ready")),
                n => Ok(n),
            }
        })
        .unwrap();

        poll_until(&mut sup, |s| s.poll().is_some());
        assert_eq!(sup.session(), Some(&1));
        assert_eq!(sup.attempts(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn retries_wait_for_the_backoff() {
        let mut sup =
            SessionSupervisor::<()>::start("test-backoff", Duration::from_secs(3600), || Err(anyhow!("no window")))
                .unwrap();

        poll_until(&mut sup, |s| {
            s.poll();
            !s.is_pending()
        });
        for _ in 0..10 {
            assert!(sup.poll().is_none());
        }
        assert_eq!(sup.attempts(), 1);
        assert!(!sup.is_pending());
    }

    #[test]
    fn reset_triggers_a_rebuild() {
        let mut sup = SessionSupervisor::start("test-reset", Duration::from_secs(3600), || Ok(5)).unwrap();
        sup.wait().unwrap();
        assert_eq!(sup.poll().copied(), Some(5));

        sup.reset();
        assert!(sup.session().is_none());
        poll_until(&mut sup, |s| s.poll().is_some());
        assert_eq!(sup.attempts(), 2);
    }

    #[test]
    fn build_errors_are_propagated() {
        let pending = spawn::<(), _>("test-error", || Err(anyhow!("no window"))).unwrap();
        assert_eq!(pending.wait().unwrap_err().to_string(), "no window");
    }
}
