//! ### English
//! Recurring timer backed by a single worker thread (used to drive telemetry sampling).
//!
//! Tasks live in a deadline-ordered heap on the timer thread; schedule/cancel/shutdown requests
//! travel over a channel.
//!
//! ### 中文
//! 由单个工作线程驱动的周期计时器（用于驱动遥测采样）。
//!
//! 任务保存在计时线程上按 deadline 排序的堆中；schedule/cancel/shutdown 请求通过 channel 传递。

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};
use std::thread;
use std::time::{Duration, Instant};

use crossbeam_channel as channel;
use log::debug;

/// ### English
/// Handle for one scheduled task; pass it to `RecurringTimer::cancel`.
///
/// ### 中文
/// 单个已调度任务的句柄；传给 `RecurringTimer::cancel` 以取消。
#[derive(Clone, Debug)]
pub struct TimerHandle {
    id: u64,
    cancelled: Arc<AtomicBool>,
}

impl TimerHandle {
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(AtomicOrdering::Acquire)
    }
}

/// ### English
/// One recurring task stored in the timer heap.
///
/// `BinaryHeap` is a max-heap, so `Ord` is reversed to pop the earliest deadline first.
///
/// ### 中文
/// 存储在计时器堆中的单个周期任务。
///
/// `BinaryHeap` 是最大堆，因此在 `Ord` 中反转排序以便先弹出最早的 deadline。
struct ScheduledTask {
    deadline: Instant,
    /// ### English
    /// Monotonic id, also the heap tiebreaker.
    ///
    /// ### 中文
    /// 单调递增 id，同时作为堆中的平局判定。
    id: u64,
    period: Duration,
    cancelled: Arc<AtomicBool>,
    callback: Box<dyn FnMut() + Send + 'static>,
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.id == other.id
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        match other.deadline.cmp(&self.deadline) {
            Ordering::Equal => other.id.cmp(&self.id),
            ord => ord,
        }
    }
}

enum TimerMsg {
    Schedule(ScheduledTask),
    Cancel(u64),
    Shutdown,
}

/// ### English
/// Recurring timer with explicit cancellation.
///
/// Callbacks run on the timer thread and must not block. Dropping the timer shuts the thread down
/// and joins it (unless dropped from inside one of its own callbacks).
///
/// ### 中文
/// 支持显式取消的周期计时器。
///
/// 回调在计时线程上执行，且不得阻塞。drop 计时器会关闭并 join 线程（在其自身回调中 drop 时除外）。
pub struct RecurringTimer {
    tx: channel::Sender<TimerMsg>,
    next_id: AtomicU64,
    thread_id: thread::ThreadId,
    join: Option<thread::JoinHandle<()>>,
}

impl RecurringTimer {
    /// ### English
    /// Spawns the timer thread.
    ///
    /// ### 中文
    /// 创建计时线程。
    pub fn new(thread_name: &str) -> io::Result<Self> {
        let (tx, rx) = channel::unbounded::<TimerMsg>();
        let join = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || run_timer(rx))?;
        let thread_id = join.thread().id();

        Ok(Self {
            tx,
            next_id: AtomicU64::new(1),
            thread_id,
            join: Some(join),
        })
    }

    /// ### English
    /// Runs `callback` every `period`, first after one period.
    ///
    /// A zero period is bumped to 1 ms. When the thread falls behind, missed ticks are dropped
    /// rather than replayed in a burst.
    ///
    /// ### 中文
    /// 每隔 `period` 执行一次 `callback`，首次在一个周期之后执行。
    ///
    /// 周期为 0 时提升为 1 ms。线程落后时丢弃错过的 tick，而不是集中补发。
    pub fn schedule_repeating<F>(&self, period: Duration, callback: F) -> TimerHandle
    where
        F: FnMut() + Send + 'static,
    {
        let period = period.max(Duration::from_millis(1));
        let id = self.next_id.fetch_add(1, AtomicOrdering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let task = ScheduledTask {
            deadline: Instant::now() + period,
            id,
            period,
            cancelled: cancelled.clone(),
            callback: Box::new(callback),
        };
        let _ = self.tx.send(TimerMsg::Schedule(task));
        TimerHandle { id, cancelled }
    }

    /// ### English
    /// Cancels a task. Once this returns the callback will not start again (a run already in
    /// progress on the timer thread finishes normally).
    ///
    /// ### 中文
    /// 取消任务。返回后回调不会再次开始执行（计时线程上正在执行的那次会正常结束）。
    pub fn cancel(&self, handle: &TimerHandle) {
        handle.cancelled.store(true, AtomicOrdering::Release);
        let _ = self.tx.send(TimerMsg::Cancel(handle.id));
    }

    /// ### English
    /// Stops the timer thread and drops all tasks.
    ///
    /// ### 中文
    /// 停止计时线程并释放所有任务。
    pub fn shutdown(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = self.tx.send(TimerMsg::Shutdown);
            if thread::current().id() != self.thread_id {
                let _ = join.join();
            }
        }
    }
}

impl Drop for RecurringTimer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// ### English
/// Timer thread main loop.
///
/// ### 中文
/// 计时线程主循环。
fn run_timer(rx: channel::Receiver<TimerMsg>) {
    let mut queue: BinaryHeap<ScheduledTask> = BinaryHeap::new();

    loop {
        let now = Instant::now();
        while queue.peek().is_some_and(|next| next.deadline <= now) {
            let Some(mut task) = queue.pop() else {
                break;
            };
            if task.cancelled.load(AtomicOrdering::Acquire) {
                continue;
            }

            (task.callback)();

            task.deadline += task.period;
            if task.deadline <= now {
                task.deadline = now + task.period;
            }
            queue.push(task);
        }

        let timeout = queue
            .peek()
            .map(|task| task.deadline.saturating_duration_since(Instant::now()));

        let msg = match timeout {
            Some(timeout) => match rx.recv_timeout(timeout) {
                Ok(msg) => Some(msg),
                Err(channel::RecvTimeoutError::Timeout) => None,
                Err(channel::RecvTimeoutError::Disconnected) => return,
            },
            None => match rx.recv() {
                Ok(msg) => Some(msg),
                Err(channel::RecvError) => return,
            },
        };

        let Some(msg) = msg else {
            continue;
        };

        match msg {
            TimerMsg::Schedule(task) => {
                debug!("timer task {} scheduled every {:?}", task.id, task.period);
                queue.push(task);
            }
            TimerMsg::Cancel(id) => {
                queue.retain(|task| task.id != id);
                debug!("timer task {id} cancelled");
            }
            TimerMsg::Shutdown => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn fires_repeatedly_until_cancelled() {
        let timer = RecurringTimer::new("test-timer").unwrap();
        let ticks = Arc::new(AtomicUsize::new(0));

        let handle = {
            let ticks = ticks.clone();
            timer.schedule_repeating(Duration::from_millis(5), move || {
                ticks.fetch_add(1, AtomicOrdering::SeqCst);
            })
        };

        let deadline = Instant::now() + Duration::from_secs(5);
        while ticks.load(AtomicOrdering::SeqCst) < 3 {
            assert!(Instant::now() < deadline, "timer never fired three times");
            thread::sleep(Duration::from_millis(1));
        }

        timer.cancel(&handle);
        assert!(handle.is_cancelled());
        thread::sleep(Duration::from_millis(20));
        let after_cancel = ticks.load(AtomicOrdering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(AtomicOrdering::SeqCst), after_cancel);
    }

    #[test]
    fn cancelling_one_task_keeps_the_others() {
        let timer = RecurringTimer::new("test-timer").unwrap();
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let first_handle = {
            let first = first.clone();
            timer.schedule_repeating(Duration::from_millis(5), move || {
                first.fetch_add(1, AtomicOrdering::SeqCst);
            })
        };
        {
            let second = second.clone();
            timer.schedule_repeating(Duration::from_millis(5), move || {
                second.fetch_add(1, AtomicOrdering::SeqCst);
            });
        }
        timer.cancel(&first_handle);

        let deadline = Instant::now() + Duration::from_secs(5);
        while second.load(AtomicOrdering::SeqCst) < 3 {
            assert!(Instant::now() < deadline, "second task never fired");
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(first.load(AtomicOrdering::SeqCst), 0);
    }

    #[test]
    fn drop_joins_the_thread_and_releases_tasks() {
        let token = Arc::new(());
        {
            let timer = RecurringTimer::new("test-timer").unwrap();
            let token = token.clone();
            timer.schedule_repeating(Duration::from_secs(60), move || {
                let _ = &token;
            });
        }
        assert_eq!(Arc::strong_count(&token), 1);
    }

    #[test]
    fn earliest_deadline_pops_first() {
        let now = Instant::now();
        let task = |id, offset_ms| ScheduledTask {
            deadline: now + Duration::from_millis(offset_ms),
            id,
            period: Duration::from_millis(1),
            cancelled: Arc::new(AtomicBool::new(false)),
            callback: Box::new(|| {}),
        };

        let mut heap = BinaryHeap::new();
        heap.push(task(1, 30));
        heap.push(task(2, 10));
        heap.push(task(3, 10));
        heap.push(task(4, 20));

        let order: Vec<u64> = std::iter::from_fn(|| heap.pop().map(|t| t.id)).collect();
        assert_eq!(order, vec![2, 3, 4, 1]);
    }
}
