use std::{future::Future, pin::Pin, sync::Arc, time::Duration};

use log::*;
use tokio::{
    sync::{mpsc, watch},
    task::JoinSet,
};

pub type JobHandler<J> = Arc<dyn Fn(J) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Runs every submitted job once `delay` has passed since its submission.
///
/// Jobs are independent of each other; a slow or failing job never holds up the rest. Nothing is held while a job
/// waits, so thousands of pending jobs only cost a timer each. When the shutdown signal fires, pending jobs are dropped
/// without running.
pub struct DeferredTaskQueue<J: Send + 'static> {
    listener: mpsc::Receiver<J>,
    sender: mpsc::Sender<J>,
    delay: Duration,
}

impl<J: Send + 'static> DeferredTaskQueue<J> {
    pub fn new(buffer_size: usize, delay: Duration) -> Self {
        let (sender, listener) = mpsc::channel(buffer_size);
        Self { listener, sender, delay }
    }

    pub fn producer(&self) -> DeferredTaskProducer<J> {
        DeferredTaskProducer::new(self.sender.clone())
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Processes jobs until `shutdown` flips to `true` or every producer has been dropped.
    ///
    /// On a shutdown signal, jobs that are still waiting are cancelled. When the producers go away instead, jobs that
    /// were already accepted still run to completion.
    pub async fn run(mut self, handler: JobHandler<J>, mut shutdown: watch::Receiver<bool>) {
        debug!("⏰️ Starting deferred task queue with a delay of {}s", self.delay.as_secs());
        // Drop our own sender so that the loop ends once the last producer is dropped
        drop(self.sender);
        let mut jobs = JoinSet::new();
        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("⏰️ Shutdown signal received. Cancelling {} pending jobs", jobs.len());
                        jobs.abort_all();
                        break;
                    }
                },
                job = self.listener.recv() => match job {
                    Some(job) => {
                        let handler = Arc::clone(&handler);
                        let delay = self.delay;
                        trace!("⏰️ Job accepted. It will run in {}s", delay.as_secs());
                        jobs.spawn(async move {
                            tokio::time::sleep(delay).await;
                            (handler)(job).await;
                        });
                    },
                    None => {
                        debug!("⏰️ All producers are gone. Waiting for {} pending jobs", jobs.len());
                        loop {
                            tokio::select! {
                                biased;
                                changed = shutdown.changed() => {
                                    if changed.is_err() || *shutdown.borrow() {
                                        jobs.abort_all();
                                        break;
                                    }
                                },
                                next = jobs.join_next() => if next.is_none() { break },
                            }
                        }
                        break;
                    },
                },
                Some(result) = jobs.join_next(), if !jobs.is_empty() => {
                    if let Err(e) = result {
                        if e.is_panic() {
                            error!("⏰️ A deferred job panicked: {e}");
                        }
                    }
                },
            }
        }
        while jobs.join_next().await.is_some() {}
        debug!("⏰️ Deferred task queue has shut down");
    }
}

#[derive(Clone)]
pub struct DeferredTaskProducer<J: Send> {
    sender: mpsc::Sender<J>,
}

impl<J: Send> DeferredTaskProducer<J> {
    pub fn new(sender: mpsc::Sender<J>) -> Self {
        Self { sender }
    }

    /// Hands the job to the queue without waiting. If the queue is full or gone, the job is dropped and logged.
    pub fn submit(&self, job: J) {
        if let Err(e) = self.sender.try_send(job) {
            error!("⏰️ Could not schedule deferred job: {e}");
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    };

    use super::*;

    fn counting_handler(count: Arc<AtomicU64>) -> JobHandler<u64> {
        Arc::new(move |v: u64| {
            let count = count.clone();
            Box::pin(async move {
                count.fetch_add(v, Ordering::SeqCst);
            }) as Pin<Box<dyn Future<Output = ()> + Send>>
        })
    }

    #[tokio::test(start_paused = true)]
    async fn jobs_wait_for_the_delay() {
        let _ = env_logger::try_init();
        let count = Arc::new(AtomicU64::new(0));
        let queue = DeferredTaskQueue::new(16, Duration::from_secs(300));
        let producer = queue.producer();
        let (_tx, rx) = watch::channel(false);
        let runner = tokio::spawn(queue.run(counting_handler(count.clone()), rx));
        producer.submit(1);
        producer.submit(2);
        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        drop(producer);
        runner.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_cancels_pending_jobs() {
        let count = Arc::new(AtomicU64::new(0));
        let queue = DeferredTaskQueue::new(16, Duration::from_secs(60));
        let producer = queue.producer();
        let (tx, rx) = watch::channel(false);
        let runner = tokio::spawn(queue.run(counting_handler(count.clone()), rx));
        producer.submit(5);
        tokio::time::sleep(Duration::from_secs(10)).await;
        tx.send(true).unwrap();
        runner.await.unwrap();
        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        // The queue is gone, so later submissions are dropped rather than panicking
        producer.submit(7);
    }

    #[tokio::test(start_paused = true)]
    async fn accepted_jobs_finish_after_producers_drop() {
        let count = Arc::new(AtomicU64::new(0));
        let queue = DeferredTaskQueue::new(16, Duration::from_secs(30));
        let producer = queue.producer();
        let (_tx, rx) = watch::channel(false);
        let runner = tokio::spawn(queue.run(counting_handler(count.clone()), rx));
        for v in [10, 20, 30] {
            producer.submit(v);
        }
        drop(producer);
        runner.await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 60);
    }
}
