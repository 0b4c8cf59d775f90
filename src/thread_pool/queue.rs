use std::collections::VecDeque;

use super::job::Job;

/// FIFO of pending jobs. Only touched while the pool lock is held.
#[derive(Default)]
pub(crate) struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub(crate) fn new() -> Self {
        JobQueue::default()
    }

    pub(crate) fn push(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    pub(crate) fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Removes every pending job, oldest first.
    ///
    /// The caller drops the returned jobs after releasing the lock, since
    /// dropping a job drops whatever its closure captured.
    pub(crate) fn take_all(&mut self) -> Vec<Job> {
        self.jobs.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(id: u64) -> Job {
        Job::new(id, Box::new(|| {}))
    }

    #[test]
    fn pops_in_push_order() {
        let mut queue = JobQueue::new();
        for id in 0..5 {
            queue.push(noop(id));
        }
        assert_eq!(queue.len(), 5);

        let ids: Vec<u64> = std::iter::from_fn(|| queue.pop()).map(|job| job.id()).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
        assert_eq!(queue.len(), 0);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn take_all_empties_the_queue() {
        let mut queue = JobQueue::new();
        queue.push(noop(7));
        queue.push(noop(8));

        let taken = queue.take_all();
        assert_eq!(taken.iter().map(Job::id).collect::<Vec<_>>(), vec![7, 8]);
        assert_eq!(queue.len(), 0);
    }
}
