use std::{collections::VecDeque, sync::Arc};

use scheduled_thread_pool::{JobHandle, ScheduledThreadPool};
use shared_data::Shared;

type UpdateFn = Arc<dyn Fn() + Send + Sync>;

/// A job queue that uses a single thread to process jobs.
///
/// It also keeps the application's message log, which both jobs and
/// the UI thread write to.
pub struct JobQueue {
    runner: ScheduledThreadPool,
    job_status: Shared<JobStatus>,
}

impl JobQueue {
    pub fn new() -> JobQueue {
        JobQueue {
            runner: ScheduledThreadPool::new(1),
            job_status: Shared::new(JobStatus {
                jobs: VecDeque::new(),
                job_progress: None,
                log: VecDeque::new(),
                do_cancel: false,
                update_fn: None,
            }),
        }
    }

    /// Sets a function to be called whenever a job makes progress,
    /// writes to the log, or finishes.  Typically used to request a
    /// UI repaint.
    pub fn set_update_fn<F>(&mut self, update_fn: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.job_status.lock_mut().update_fn = Some(Arc::new(update_fn));
    }

    /// Queues a job.  Returns false, without queueing, while jobs are
    /// being canceled.  The rejection is also logged as a warning, so
    /// callers that can't do anything more useful may ignore it.
    pub fn add_job<F>(&self, name: &str, job: F) -> bool
    where
        F: FnOnce(&Shared<JobStatus>) + Send + std::panic::UnwindSafe + 'static,
    {
        let job_name = name.to_string();
        let mut job_status = self.job_status.lock_mut();
        if job_status.do_cancel {
            // Don't allow adding jobs when in the middle of canceling.
            job_status.log_warning(format!(
                "\"{}\" was skipped: other jobs were being canceled.",
                job_name
            ));
            return false;
        }

        // Add the job.
        let local_job_status = self.job_status.clone_ref();
        job_status.jobs.push_back(self.runner.execute(move || {
            let job_status = local_job_status;

            // Actually run the job.
            if let Err(_) = std::panic::catch_unwind(|| job(&job_status)) {
                job_status
                    .lock_mut()
                    .log_error(format!("Job \"{}\" panicked!", job_name));
            }

            // Cleanup.
            let mut job_status = job_status.lock_mut();
            job_status.jobs.pop_front(); // This job.
            if job_status.do_cancel {
                for job in job_status.jobs.drain(..) {
                    job.cancel();
                }
                job_status.do_cancel = false;
            }
            job_status.clear_progress();
        }));

        true
    }

    pub fn progress(&self) -> Option<(String, f32)> {
        self.job_status.lock().job_progress.clone()
    }

    pub fn job_count(&self) -> usize {
        self.job_status.lock().jobs.len()
    }

    pub fn is_canceling(&self) -> bool {
        self.job_status.lock().do_cancel
    }

    pub fn cancel_all_jobs(&self) {
        let mut job_status = self.job_status.lock_mut();
        if !job_status.jobs.is_empty() {
            job_status.do_cancel = true;
        }
    }

    pub fn log_count(&self) -> usize {
        self.job_status.lock().log.len()
    }

    /// Index zero is the most recent message.
    pub fn get_log(&self, index: usize) -> Option<(String, LogLevel)> {
        self.job_status.lock().log.get(index).cloned()
    }

    pub fn clear_log(&self) {
        self.job_status.lock_mut().log.clear()
    }

    pub fn log_error(&self, message: String) {
        self.job_status.lock_mut().log_error(message);
    }

    pub fn log_warning(&self, message: String) {
        self.job_status.lock_mut().log_warning(message);
    }

    pub fn log_note(&self, message: String) {
        self.job_status.lock_mut().log_note(message);
    }
}

impl Default for JobQueue {
    fn default() -> JobQueue {
        JobQueue::new()
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warning,
    Note,
}

pub struct JobStatus {
    jobs: VecDeque<JobHandle>,
    job_progress: Option<(String, f32)>,
    log: VecDeque<(String, LogLevel)>,
    do_cancel: bool,
    update_fn: Option<UpdateFn>,
}

impl JobStatus {
    pub fn is_canceled(&self) -> bool {
        self.do_cancel
    }

    pub fn set_progress(&mut self, text: String, ratio: f32) {
        self.job_progress = Some((text, ratio));
        self.notify();
    }

    pub fn clear_progress(&mut self) {
        self.job_progress = None;
        self.notify();
    }

    pub fn log_error(&mut self, message: String) {
        self.log.push_front((message, LogLevel::Error));
        self.notify();
    }

    pub fn log_warning(&mut self, message: String) {
        self.log.push_front((message, LogLevel::Warning));
        self.notify();
    }

    pub fn log_note(&mut self, message: String) {
        self.log.push_front((message, LogLevel::Note));
        self.notify();
    }

    fn notify(&self) {
        if let Some(ref f) = self.update_fn {
            f();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn wait_for_jobs(queue: &JobQueue) {
        for _ in 0..1000 {
            if queue.job_count() == 0 {
                return;
            }
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
        panic!("jobs didn't finish in time");
    }

    #[test]
    fn runs_jobs_in_order() {
        let queue = JobQueue::new();
        let out = Shared::new(Vec::new());
        for i in 0..3 {
            let out = out.clone_ref();
            assert!(queue.add_job("push", move |status| {
                status.lock_mut().set_progress(format!("Pushing {}", i), 0.0);
                out.lock_mut().push(i);
            }));
        }
        wait_for_jobs(&queue);
        assert_eq!(*out.lock(), vec![0, 1, 2]);
        assert_eq!(queue.progress(), None);
    }

    #[test]
    fn log_is_newest_first() {
        let queue = JobQueue::new();
        queue.log_note("first".into());
        queue.log_warning("second".into());
        queue.log_error("third".into());
        assert_eq!(queue.log_count(), 3);
        assert_eq!(queue.get_log(0), Some(("third".into(), LogLevel::Error)));
        assert_eq!(queue.get_log(2), Some(("first".into(), LogLevel::Note)));
        assert_eq!(queue.get_log(3), None);

        queue.clear_log();
        assert_eq!(queue.log_count(), 0);
    }

    #[test]
    fn panicking_job_is_logged() {
        let queue = JobQueue::new();
        queue.add_job("Explode", |_| panic!("boom"));
        wait_for_jobs(&queue);
        let (message, level) = queue.get_log(0).unwrap();
        assert_eq!(level, LogLevel::Error);
        assert!(message.contains("Explode"));
    }

    #[test]
    fn rejects_jobs_while_canceling() {
        let queue = JobQueue::new();
        let release = Shared::new(false);
        {
            let release = release.clone_ref();
            assert!(queue.add_job("Wait", move |_| {
                while !*release.lock() {
                    std::thread::sleep(std::time::Duration::from_millis(1));
                }
            }));
        }

        queue.cancel_all_jobs();
        assert!(queue.is_canceling());
        assert!(!queue.add_job("Load LUT", |_| {}));
        let (message, level) = queue.get_log(0).unwrap();
        assert_eq!(level, LogLevel::Warning);
        assert!(message.contains("Load LUT"));

        *release.lock_mut() = true;
        wait_for_jobs(&queue);
        assert!(!queue.is_canceling());
        assert!(queue.add_job("Load LUT", |_| {}));
        wait_for_jobs(&queue);
    }

    #[test]
    fn update_fn_called() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut queue = JobQueue::new();
        {
            let count = Arc::clone(&count);
            queue.set_update_fn(move || {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        queue.add_job("Note", |status| status.lock_mut().log_note("hi".into()));
        wait_for_jobs(&queue);
        // Once for the log message, once for the job finishing.
        assert!(count.load(Ordering::SeqCst) >= 2);
    }
}
