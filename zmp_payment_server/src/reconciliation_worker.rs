use std::sync::Arc;

use futures::{future::BoxFuture, FutureExt};
use log::*;
use tokio::{sync::watch, task::JoinHandle};
use zmp_payment_engine::{
    scheduler::{DeferredTaskQueue, JobHandler, ReconciliationJob},
    traits::{OrderManagement, PaymentGatewayClient},
    PaymentFlowApi,
};

/// Starts the deferred reconciliation worker.
///
/// Jobs submitted through the queue's producers are handed to [`PaymentFlowApi::run_deferred_check`] once the queue's
/// delay has passed. Flip `shutdown` to `true` to stop the worker; jobs that are still waiting are dropped.
pub fn start_reconciliation_worker<B, G>(
    queue: DeferredTaskQueue<ReconciliationJob>,
    api: Arc<PaymentFlowApi<B, G>>,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()>
where
    B: OrderManagement + 'static,
    G: PaymentGatewayClient + 'static,
{
    info!("⏰️ Reconciliation worker started. Deferred checks run {}s after a notification", queue.delay().as_secs());
    let handler: JobHandler<ReconciliationJob> = Arc::new(move |job: ReconciliationJob| -> BoxFuture<'static, ()> {
        let api = Arc::clone(&api);
        async move {
            debug!("⏰️ Running deferred check for gateway order {}", job.gateway_order_id);
            api.run_deferred_check(job).await;
        }
        .boxed()
    });
    tokio::spawn(queue.run(handler, shutdown))
}
