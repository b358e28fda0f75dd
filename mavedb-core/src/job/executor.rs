use crate::config::IngestConfig;
use crate::error::MaveResult;
use rayon::{ThreadPool, ThreadPoolBuilder};

pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Where job pipelines run.
pub trait Executor: Send + Sync {
    fn execute(&self, task: Task);
}

/// Runs each task to completion on the submitting thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct InlineExecutor;

impl Executor for InlineExecutor {
    fn execute(&self, task: Task) {
        task()
    }
}

/// Runs tasks on a dedicated rayon pool.
#[derive(Debug)]
pub struct ThreadPoolExecutor {
    pool: ThreadPool,
}

impl ThreadPoolExecutor {
    /// `threads == 0` lets rayon size the pool.
    pub fn new(threads: usize) -> MaveResult<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("mave-ingest-{i}"))
            .build()?;
        Ok(Self { pool })
    }

    pub fn from_config(config: &IngestConfig) -> MaveResult<Self> {
        Self::new(config.worker_threads)
    }

    pub fn threads(&self) -> usize {
        self.pool.current_num_threads()
    }
}

impl Executor for ThreadPoolExecutor {
    fn execute(&self, task: Task) {
        self.pool.spawn(task)
    }
}
