//! Next-frame task scheduling for the single-threaded event loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

pub type FrameTask = Box<dyn FnOnce()>;

/// Defers work to the next animation frame, after pending layout settles.
pub trait FrameScheduler {
    fn request_frame(&self, task: FrameTask);
}

/// FIFO frame queue driven by the host's event loop.
#[derive(Clone, Default)]
pub struct FrameQueue {
    tasks: Rc<RefCell<VecDeque<FrameTask>>>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    /// Runs the tasks queued before this call. Tasks they schedule wait for the next frame.
    pub fn run_frame(&self) -> usize {
        let batch: Vec<FrameTask> = self.tasks.borrow_mut().drain(..).collect();
        let count = batch.len();
        for task in batch {
            task();
        }
        count
    }

    /// Runs frames until nothing is queued. Returns the number of tasks executed.
    pub fn run_until_idle(&self) -> usize {
        let mut executed = 0;
        loop {
            let ran = self.run_frame();
            if ran == 0 {
                return executed;
            }
            executed += ran;
        }
    }
}

impl FrameScheduler for FrameQueue {
    fn request_frame(&self, task: FrameTask) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl std::fmt::Debug for FrameQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
