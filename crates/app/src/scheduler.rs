//! Periodic task scheduler with prescaled sub-callbacks.
//!
//! Every registered [`PeriodicTask`] runs as its own tokio task, so a slow
//! callback on one task never delays another. Within a task the base
//! callback fires every `period`, then each prescaler whose divisor divides
//! the tick count fires, in registration order. Missed ticks are skipped,
//! never replayed in a burst.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Future returned by a task callback.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// Callback invoked on every due tick.
pub type TaskFn = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Wrap an async closure into a [`TaskFn`].
pub fn task_fn<F, Fut>(f: F) -> TaskFn
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    Arc::new(move || -> TaskFuture { Box::pin(f()) })
}

/// A sub-callback firing every `divisor`-th base tick.
pub struct Prescaler {
    divisor: u32,
    callback: TaskFn,
}

impl Prescaler {
    /// Whether this prescaler fires on base tick number `tick` (1-based).
    #[must_use]
    pub fn is_due(&self, tick: u64) -> bool {
        tick % u64::from(self.divisor) == 0
    }
}

/// A base callback with its prescalers.
pub struct PeriodicTask {
    name: String,
    period: Duration,
    callback: TaskFn,
    prescalers: Vec<Prescaler>,
}

impl PeriodicTask {
    #[must_use]
    pub fn new(name: impl Into<String>, period: Duration, callback: TaskFn) -> Self {
        Self {
            name: name.into(),
            period: period.max(MIN_PERIOD),
            callback,
            prescalers: Vec::new(),
        }
    }

    /// Register a sub-callback fired every `divisor`-th tick. A divisor of
    /// zero is treated as one.
    #[must_use]
    pub fn with_prescaler(mut self, divisor: u32, callback: TaskFn) -> Self {
        self.prescalers.push(Prescaler {
            divisor: divisor.max(1),
            callback,
        });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn period(&self) -> Duration {
        self.period
    }
}

/// Lifecycle state of the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
}

struct Running {
    stop: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

/// Owns the registered tasks and their running handles.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<Arc<PeriodicTask>>,
    running: Option<Running>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. Tasks registered while running start on the next
    /// [`start`](Self::start).
    pub fn register(&mut self, task: PeriodicTask) {
        tracing::debug!(
            task = %task.name,
            period_ms = task.period.as_millis(),
            prescalers = task.prescalers.len(),
            "task registered"
        );
        self.tasks.push(Arc::new(task));
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.running.is_some() {
            SchedulerState::Running
        } else {
            SchedulerState::Stopped
        }
    }

    /// Start firing every registered task. Prescale counters start at zero.
    pub fn start(&mut self) {
        if self.running.is_some() {
            tracing::debug!("scheduler already running");
            return;
        }
        let (stop, _) = watch::channel(false);
        let handles = self
            .tasks
            .iter()
            .map(|task| tokio::spawn(run_task(Arc::clone(task), stop.subscribe())))
            .collect();
        self.running = Some(Running { stop, handles });
        tracing::info!(tasks = self.tasks.len(), "scheduler started");
    }

    /// Stop every task and wait for in-flight callbacks to finish.
    pub async fn stop(&mut self) {
        let Some(running) = self.running.take() else {
            return;
        };
        running.stop.send_replace(true);
        for handle in running.handles {
            if let Err(err) = handle.await {
                tracing::error!(error = %err, "scheduled task ended abnormally");
            }
        }
        tracing::info!("scheduler stopped");
    }
}

async fn run_task(task: Arc<PeriodicTask>, mut stop: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval_at(Instant::now() + task.period, task.period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = stop.changed() => break,
            _ = ticker.tick() => {}
        }
        tick += 1;
        (task.callback)().await;
        for prescaler in &task.prescalers {
            if prescaler.is_due(tick) {
                (prescaler.callback)().await;
            }
        }
    }
    tracing::debug!(task = %task.name, ticks = tick, "task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(log: &Log, label: &'static str) -> TaskFn {
        let log = Arc::clone(log);
        task_fn(move || {
            let log = Arc::clone(&log);
            async move { log.lock().unwrap().push(label) }
        })
    }

    fn counter(count: &Arc<AtomicU32>) -> TaskFn {
        let count = Arc::clone(count);
        task_fn(move || {
            let count = Arc::clone(&count);
            async move {
                count.fetch_add(1, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn should_fire_prescale_three_on_multiples_of_three() {
        let prescaler = Prescaler {
            divisor: 3,
            callback: task_fn(|| async {}),
        };
        let due: Vec<u64> = (1..=10).filter(|tick| prescaler.is_due(*tick)).collect();
        assert_eq!(due, vec![3, 6, 9]);
    }

    #[test]
    fn should_treat_zero_divisor_as_one() {
        let task = PeriodicTask::new("t", Duration::from_secs(1), task_fn(|| async {}))
            .with_prescaler(0, task_fn(|| async {}));
        assert!(task.prescalers[0].is_due(1));
        assert!(task.prescalers[0].is_due(2));
    }

    #[tokio::test(start_paused = true)]
    async fn should_fire_base_then_prescalers_in_order() {
        let log: Log = Arc::default();
        let mut scheduler = Scheduler::new();
        scheduler.register(
            PeriodicTask::new("t", Duration::from_secs(1), recorder(&log, "base"))
                .with_prescaler(3, recorder(&log, "every3"))
                .with_prescaler(2, recorder(&log, "every2")),
        );
        scheduler.start();
        assert_eq!(scheduler.state(), SchedulerState::Running);

        tokio::time::sleep(Duration::from_millis(6_500)).await;
        scheduler.stop().await;

        let log = log.lock().unwrap().clone();
        assert_eq!(
            log,
            vec![
                "base", // 1
                "base", "every2", // 2
                "base", "every3", // 3
                "base", "every2", // 4
                "base", // 5
                "base", "every3", "every2", // 6
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_fire_after_stop() {
        let count = Arc::new(AtomicU32::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register(PeriodicTask::new(
            "t",
            Duration::from_secs(1),
            counter(&count),
        ));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        scheduler.stop().await;
        assert_eq!(scheduler.state(), SchedulerState::Stopped);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_reset_prescale_counter_on_restart() {
        let base = Arc::new(AtomicU32::new(0));
        let prescaled = Arc::new(AtomicU32::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register(
            PeriodicTask::new("t", Duration::from_secs(1), counter(&base))
                .with_prescaler(3, counter(&prescaled)),
        );

        scheduler.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        scheduler.stop().await;
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(2_500)).await;
        scheduler.stop().await;

        assert_eq!(base.load(Ordering::SeqCst), 4);
        assert_eq!(prescaled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_let_slow_task_delay_another() {
        let fast = Arc::new(AtomicU32::new(0));
        let mut scheduler = Scheduler::new();
        scheduler.register(PeriodicTask::new(
            "slow",
            Duration::from_secs(1),
            task_fn(|| async { tokio::time::sleep(Duration::from_secs(30)).await }),
        ));
        scheduler.register(PeriodicTask::new(
            "fast",
            Duration::from_secs(1),
            counter(&fast),
        ));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(fast.load(Ordering::SeqCst), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn should_skip_missed_ticks_instead_of_bursting() {
        let count = Arc::new(AtomicU32::new(0));
        let slow_count = Arc::clone(&count);
        let mut scheduler = Scheduler::new();
        scheduler.register(PeriodicTask::new(
            "stalled",
            Duration::from_secs(1),
            task_fn(move || {
                let count = Arc::clone(&slow_count);
                async move {
                    // Only the first firing stalls, long enough to miss four ticks.
                    if count.fetch_add(1, Ordering::SeqCst) == 0 {
                        tokio::time::sleep(Duration::from_secs(5)).await;
                    }
                }
            }),
        ));
        scheduler.start();
        tokio::time::sleep(Duration::from_millis(6_500)).await;
        scheduler.stop().await;
        let fired = count.load(Ordering::SeqCst);
        assert!((1..=2).contains(&fired), "fired {fired} times");
    }

    #[tokio::test]
    async fn should_ignore_second_start() {
        let mut scheduler = Scheduler::new();
        scheduler.register(PeriodicTask::new(
            "t",
            Duration::from_secs(60),
            task_fn(|| async {}),
        ));
        scheduler.start();
        scheduler.start();
        assert_eq!(scheduler.running.as_ref().unwrap().handles.len(), 1);
        scheduler.stop().await;
    }
}
