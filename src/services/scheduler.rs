use crate::models::market::CycleOutcome;
use crate::errors::Result;
use crate::config::Config;
use async_trait::async_trait;
use chrono::Local;
use log::{debug, error, info};
use std::time::Duration;
use tokio::time::{sleep, Instant};

/// 调度器每个周期调用的任务
#[async_trait]
pub trait CycleRunner {
    async fn run_cycle(&self) -> Result<CycleOutcome>;
}

/// 轮询式调度器：启动时立即执行一次，此后每隔 `interval` 执行一次。
///
/// The loop wakes every `tick`, compares the clock against the next due
/// instant and awaits the cycle inline, so at most one cycle is in flight.
pub struct Scheduler {
    interval: Duration,
    tick: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration, tick: Duration) -> Self {
        Self { interval, tick }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.poll_interval, config.tick)
    }

    /// 持续运行，直到进程被外部终止
    pub async fn run<R>(&self, runner: &R)
    where
        R: CycleRunner + Sync + ?Sized,
    {
        self.run_cycles(runner, None).await;
    }

    /// Run until `max_cycles` cycles have completed (forever when `None`).
    /// Returns the number of cycles run.
    pub async fn run_cycles<R>(&self, runner: &R, max_cycles: Option<usize>) -> usize
    where
        R: CycleRunner + Sync + ?Sized,
    {
        let mut completed = 0;

        Self::run_guarded(runner).await;
        completed += 1;
        info!("Live update started. Press Ctrl+C to stop.");

        let mut next_due = Instant::now() + self.interval;
        loop {
            if max_cycles.is_some_and(|max| completed >= max) {
                return completed;
            }

            sleep(self.tick).await;

            if Instant::now() >= next_due {
                Self::run_guarded(runner).await;
                completed += 1;
                next_due = Instant::now() + self.interval;
                debug!("Next cycle due in {:?}", self.interval);
            }
        }
    }

    // 周期内的错误只记录日志，不中断循环
    async fn run_guarded<R>(runner: &R)
    where
        R: CycleRunner + Sync + ?Sized,
    {
        info!("Cycle started at {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        match runner.run_cycle().await {
            Ok(CycleOutcome::Written { records }) => debug!("Cycle wrote {} records", records),
            Ok(CycleOutcome::Skipped) => debug!("Cycle skipped"),
            Err(e) => error!("Cycle failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DataHubError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingRunner {
        calls: AtomicUsize,
        started: Mutex<Vec<Instant>>,
        fail: bool,
    }

    impl CountingRunner {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                started: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl CycleRunner for CountingRunner {
        async fn run_cycle(&self) -> Result<CycleOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.started.lock().unwrap().push(Instant::now());
            if self.fail {
                Err(DataHubError::DataError("disk full".to_string()))
            } else {
                Ok(CycleOutcome::Skipped)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_cycle_runs_immediately() {
        let runner = CountingRunner::new(false);
        let scheduler = Scheduler::new(Duration::from_secs(300), Duration::from_secs(1));
        let start = Instant::now();

        assert_eq!(scheduler.run_cycles(&runner, Some(1)).await, 1);
        assert_eq!(runner.started.lock().unwrap()[0], start);
    }

    #[tokio::test(start_paused = true)]
    async fn later_cycles_follow_the_interval() {
        let runner = CountingRunner::new(false);
        let scheduler = Scheduler::new(Duration::from_secs(300), Duration::from_secs(1));

        assert_eq!(scheduler.run_cycles(&runner, Some(3)).await, 3);

        let started = runner.started.lock().unwrap();
        let first_gap = started[1] - started[0];
        let second_gap = started[2] - started[1];
        assert!(first_gap >= Duration::from_secs(300));
        assert!(first_gap < Duration::from_secs(302));
        assert!(second_gap >= Duration::from_secs(300));
        assert!(second_gap < Duration::from_secs(302));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_cycles_do_not_stop_the_loop() {
        let runner = CountingRunner::new(true);
        let scheduler = Scheduler::new(Duration::from_secs(10), Duration::from_secs(1));

        assert_eq!(scheduler.run_cycles(&runner, Some(4)).await, 4);
        assert_eq!(runner.calls.load(Ordering::SeqCst), 4);
    }
}
