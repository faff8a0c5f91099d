use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub const DEFAULT_PERIOD: Duration = Duration::from_secs(5);

/// Which slide is showing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rotator {
    len: usize,
    index: usize,
    paused: bool,
}

impl Rotator {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            index: 0,
            paused: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn next(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.index
    }

    pub fn prev(&mut self) -> usize {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.index
    }

    /// Timer-driven advance; does nothing while paused.
    pub fn tick(&mut self) -> bool {
        if self.paused || self.len == 0 {
            return false;
        }
        self.next();
        true
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    /// New slide list: back to the first slide.
    pub fn reset(&mut self, len: usize) {
        self.len = len;
        self.index = 0;
    }
}

/// Repeating background tick that can be suspended. Dropping the timer
/// cancels the task.
pub struct RotationTimer {
    paused: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl RotationTimer {
    pub fn start<F, Fut>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (paused, mut paused_rx) = watch::channel(false);
        let first_tick = Instant::now() + period;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(first_tick, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = paused_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let is_paused = *paused_rx.borrow();
                        // a resumed rotation waits a full period again
                        if !is_paused {
                            interval.reset();
                        }
                    }
                    _ = interval.tick() => {
                        let is_paused = *paused_rx.borrow();
                        if !is_paused {
                            on_tick().await;
                        }
                    }
                }
            }
        });

        Self { paused, task }
    }

    pub fn pause(&self) {
        self.paused.send_replace(true);
    }

    pub fn resume(&self) {
        self.paused.send_replace(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }
}

impl Drop for RotationTimer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn manual_controls_wrap_both_ways() {
        let mut rotator = Rotator::new(3);
        assert_eq!(rotator.prev(), 2);
        assert_eq!(rotator.next(), 0);
        assert_eq!(rotator.next(), 1);
        assert_eq!(rotator.next(), 2);
        assert_eq!(rotator.next(), 0);
    }

    #[test]
    fn paused_rotator_ignores_ticks_but_not_buttons() {
        let mut rotator = Rotator::new(4);
        rotator.pause();
        assert!(!rotator.tick());
        assert_eq!(rotator.index(), 0);
        assert_eq!(rotator.next(), 1);

        rotator.resume();
        assert!(rotator.tick());
        assert_eq!(rotator.index(), 2);
    }

    #[test]
    fn reset_returns_to_first_slide() {
        let mut rotator = Rotator::new(5);
        rotator.next();
        rotator.next();
        rotator.reset(2);
        assert_eq!(rotator.index(), 0);
        assert_eq!(rotator.len(), 2);
    }

    #[test]
    fn empty_rotator_stays_put() {
        let mut rotator = Rotator::new(0);
        assert_eq!(rotator.next(), 0);
        assert_eq!(rotator.prev(), 0);
        assert!(!rotator.tick());
        assert!(rotator.is_empty());
    }

    fn counting_timer(period: Duration) -> (Arc<AtomicUsize>, RotationTimer) {
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = ticks.clone();
        let timer = RotationTimer::start(period, move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });
        (ticks, timer)
    }

    #[tokio::test(start_paused = true)]
    async fn timer_ticks_once_per_period() {
        let (ticks, _timer) = counting_timer(DEFAULT_PERIOD);

        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
        tokio::time::sleep(DEFAULT_PERIOD).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn paused_timer_waits_a_full_period_after_resume() {
        let (ticks, timer) = counting_timer(DEFAULT_PERIOD);

        timer.pause();
        assert!(timer.is_paused());
        tokio::time::sleep(Duration::from_millis(20_100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        timer.resume();
        tokio::time::sleep(Duration::from_millis(4_900)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_stops_it() {
        let (ticks, timer) = counting_timer(DEFAULT_PERIOD);
        tokio::time::sleep(Duration::from_millis(5_100)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);

        drop(timer);
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(ticks.load(Ordering::SeqCst), 1);
    }
}
