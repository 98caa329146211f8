use std::{fmt::Debug, sync::Arc};

use log::*;
use zmp_common::{extra_data::decode_order_reference, mac::verify};

use crate::{
    db_types::{Order, OrderId, OrderStatusType, StatusUpdate},
    scheduler::{ReconciliationJob, ReconciliationScheduler},
    traits::{OrderManagement, PaymentGatewayClient, SettlementMethod, SettlementResult},
    zpe_api::{
        errors::PaymentFlowError,
        payment_objects::{
            BankTransferNotification,
            CallbackResponse,
            NotifyCallback,
            OrderCallback,
            PaymentFlowOptions,
            TransitionOutcome,
        },
    },
};

/// How many times a lost compare-and-swap is re-read and retried before giving up.
pub const MAX_STATUS_UPDATE_ATTEMPTS: usize = 5;

/// `PaymentFlowApi` reconciles order status with the payment gateway.
///
/// Callbacks may arrive more than once, in any order, and race with each other and with the deferred status check.
/// All of them funnel through [`Self::transition_order`], which validates the change against the order state machine
/// and writes it with a compare-and-swap, so duplicates are harmless and concurrent writers converge.
pub struct PaymentFlowApi<B, G> {
    db: B,
    gateway: G,
    scheduler: Arc<dyn ReconciliationScheduler>,
    options: PaymentFlowOptions,
}

impl<B, G> Debug for PaymentFlowApi<B, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B, G> PaymentFlowApi<B, G> {
    pub fn new(db: B, gateway: G, scheduler: Arc<dyn ReconciliationScheduler>, options: PaymentFlowOptions) -> Self {
        Self { db, gateway, scheduler, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, G> PaymentFlowApi<B, G>
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    /// Handles the gateway's payment-notify callback, returning the acknowledgement to send back.
    pub async fn process_notify_callback(&self, payload: NotifyCallback) -> CallbackResponse {
        self.handle_notify_callback(payload).into()
    }

    /// Authenticates a payment notification and schedules a deferred status check for it.
    ///
    /// Callbacks for another mini app are refused even when correctly signed. No order is touched here. The gateway order id only becomes useful once the deferred check has fetched the
    /// transaction and its correlation data.
    pub fn handle_notify_callback(&self, payload: NotifyCallback) -> Result<(), PaymentFlowError> {
        let canonical = payload.canonical_string();
        if !verify(&canonical, self.options.notify_key.reveal(), &payload.mac) {
            warn!("🔄️🔔️ Notify callback for {} failed authentication", payload.data.order_id);
            debug!("🔄️🔔️ Signed data: {canonical}");
            return Err(PaymentFlowError::Unauthenticated("mac not equal".to_string()));
        }
        if !self.options.accepts_app_id(&payload.data.app_id) {
            warn!("🔄️🔔️ Notify callback for {} names app {}", payload.data.order_id, payload.data.app_id);
            return Err(PaymentFlowError::Unauthenticated("appId does not match".to_string()));
        }
        if payload.data.order_id.is_empty() {
            return Err(PaymentFlowError::MalformedPayload("The notification has no order id".to_string()));
        }
        info!("🔄️🔔️ Payment notification for gateway order {} via {}", payload.data.order_id, payload.data.method);
        self.scheduler.schedule(ReconciliationJob::new(payload.data.order_id));
        Ok(())
    }

    /// Handles the gateway's order-result callback, returning the acknowledgement to send back.
    pub async fn process_order_callback(&self, payload: OrderCallback) -> CallbackResponse {
        self.handle_order_callback(payload).await.into()
    }

    /// Authenticates an order-result callback and applies the result to the referenced order.
    ///
    /// A completed order is left alone. A result that the state machine rejects (e.g. the order already failed or was
    /// cancelled) is acknowledged without writing anything.
    pub async fn handle_order_callback(&self, payload: OrderCallback) -> Result<TransitionOutcome, PaymentFlowError> {
        let canonical = payload.canonical_string();
        if !verify(&canonical, self.options.order_callback_key.reveal(), &payload.mac) {
            warn!("🔄️💰️ Order callback for {} failed authentication", payload.order_id);
            debug!("🔄️💰️ Signed data: {canonical}");
            return Err(PaymentFlowError::Unauthenticated("mac not equal".to_string()));
        }
        if !self.options.accepts_app_id(&payload.app_id) {
            warn!("🔄️💰️ Order callback for {} names app {}", payload.order_id, payload.app_id);
            return Err(PaymentFlowError::Unauthenticated("appId does not match".to_string()));
        }
        let order_id = OrderId::from(decode_order_reference(&payload.extra_data)?);
        let target = payload.target_status();
        debug!(
            "🔄️💰️ Order callback for {order_id}: gateway order {}, result {}",
            payload.order_id, payload.result_code
        );
        let outcome = self
            .transition_order(&order_id, target, Some(payload.trans_id), Some(payload.order_id))
            .await?;
        log_outcome(&outcome, "order callback");
        Ok(outcome)
    }

    /// Deferred status check. Asks the gateway for the current state of the transaction and applies it to the order
    /// named in its correlation data.
    ///
    /// Returns `None` when the gateway's answer does not call for a change (query error or unknown return code).
    pub async fn reconcile_with_gateway(
        &self,
        gateway_order_id: &str,
    ) -> Result<Option<TransitionOutcome>, PaymentFlowError> {
        debug!("🔄️⏰️ Starting deferred check for gateway order {gateway_order_id}");
        let status = self.gateway.fetch_transaction_status(gateway_order_id).await?;
        if status.error != 0 {
            warn!("🔄️⏰️ Gateway reported error {} for order {gateway_order_id}", status.error);
            return Ok(None);
        }
        let target = match status.return_code {
            1 => OrderStatusType::Completed,
            -1 => OrderStatusType::Failed,
            0 => OrderStatusType::Processing,
            _ if status.is_processing => OrderStatusType::Processing,
            code => {
                warn!("🔄️⏰️ Unknown return code {code} for gateway order {gateway_order_id}. Leaving the order alone.");
                return Ok(None);
            },
        };
        let order_id = OrderId::from(decode_order_reference(&status.extra_data)?);
        let outcome = self
            .transition_order(&order_id, target, Some(status.transaction_id), Some(gateway_order_id.to_string()))
            .await?;
        log_outcome(&outcome, "deferred check");
        Ok(Some(outcome))
    }

    /// Runs [`Self::reconcile_with_gateway`] as a background job. Failures are logged and end the job.
    pub async fn run_deferred_check(&self, job: ReconciliationJob) {
        if let Err(e) = self.reconcile_with_gateway(&job.gateway_order_id).await {
            error!("🔄️⏰️ Deferred check for gateway order {} failed. {e}", job.gateway_order_id);
        }
    }

    /// Handles an incoming bank transfer whose content names an order.
    ///
    /// The order is marked as completed, provided the transfer covers the order total. Short transfers are refused
    /// with `InvalidRequest` and leave the order untouched. If the gateway knows the order, the successful bank settlement is pushed to
    /// it and a deferred status check is scheduled.
    pub async fn process_bank_transfer(
        &self,
        notification: BankTransferNotification,
    ) -> Result<TransitionOutcome, PaymentFlowError> {
        let reference = notification
            .order_reference()
            .ok_or_else(|| PaymentFlowError::InvalidRequest("The transfer content is empty".to_string()))?;
        let order_id = OrderId::from(reference);
        info!("🔄️🏦️ Bank transfer {} of {} received for order {order_id}", notification.id, notification.transfer_amount);
        let order = self.fetch_order(&order_id).await?;
        if notification.transfer_amount < order.total_amount.value() {
            warn!(
                "🔄️🏦️ Bank transfer {} of {} does not cover order {order_id} ({}). The order is left as {}.",
                notification.id, notification.transfer_amount, order.total_amount, order.status
            );
            return Err(PaymentFlowError::InvalidRequest(format!(
                "Transfer of {} does not cover the order total of {}",
                notification.transfer_amount, order.total_amount
            )));
        }
        let outcome = self.transition_order(&order_id, OrderStatusType::Completed, None::<String>, None::<String>).await?;
        log_outcome(&outcome, "bank transfer");
        let order = outcome.order();
        if order.status != OrderStatusType::Completed {
            return Ok(outcome);
        }
        match order.gateway_order_id.as_deref().filter(|s| !s.is_empty()) {
            Some(gateway_order_id) => {
                self.gateway.push_settlement(gateway_order_id, SettlementMethod::Bank, SettlementResult::Success).await?;
                info!("🔄️🏦️ Bank settlement for order {order_id} pushed to the gateway");
                self.scheduler.schedule(ReconciliationJob::new(gateway_order_id));
            },
            None => debug!("🔄️🏦️ Order {order_id} has no gateway order id. No settlement to push."),
        }
        Ok(outcome)
    }

    /// Reports the outcome of a COD or bank payment for `order_id` to the gateway.
    pub async fn push_settlement(
        &self,
        order_id: &OrderId,
        method: SettlementMethod,
        result: SettlementResult,
    ) -> Result<(), PaymentFlowError> {
        let order = self.fetch_order(order_id).await?;
        let gateway_order_id = order.gateway_order_id.filter(|s| !s.is_empty()).ok_or_else(|| {
            PaymentFlowError::InvalidRequest(format!("Order {order_id} has no gateway order id yet"))
        })?;
        self.gateway.push_settlement(&gateway_order_id, method, result).await?;
        info!("🔄️💳️ {method} settlement {} pushed for order {order_id}", result.result_code());
        Ok(())
    }

    /// Cancels an order that has not reached a terminal status yet.
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, PaymentFlowError> {
        let to = OrderStatusType::Cancelled;
        match self.transition_order(order_id, to, None::<String>, None::<String>).await? {
            TransitionOutcome::Applied(order) | TransitionOutcome::Unchanged(order) => {
                info!("🔄️ Order {order_id} is cancelled");
                Ok(order)
            },
            TransitionOutcome::AlreadyCompleted(order) | TransitionOutcome::Rejected { order, .. } => {
                Err(PaymentFlowError::IllegalTransition { order_id: order.id, from: order.status, to })
            },
        }
    }

    async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, PaymentFlowError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| PaymentFlowError::NotFound(format!("Order {order_id}")))
    }

    /// Moves the order to `target` if the state machine allows it.
    ///
    /// The write is conditional on the status that was read. If another writer changes the order in between, the
    /// order is re-read and the decision is made again, up to [`MAX_STATUS_UPDATE_ATTEMPTS`] times.
    /// `transaction_id` and `gateway_order_id` are only stored if the order does not have them yet. That also holds
    /// when the order is already in `target`: the ids are filled in and the outcome is `Applied`.
    pub async fn transition_order<S1, S2>(
        &self,
        order_id: &OrderId,
        target: OrderStatusType,
        transaction_id: Option<S1>,
        gateway_order_id: Option<S2>,
    ) -> Result<TransitionOutcome, PaymentFlowError>
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        let transaction_id = transaction_id.map(Into::into).filter(|s: &String| !s.is_empty());
        let gateway_order_id = gateway_order_id.map(Into::into).filter(|s: &String| !s.is_empty());
        for attempt in 1..=MAX_STATUS_UPDATE_ATTEMPTS {
            let order = self.fetch_order(order_id).await?;
            if order.status == OrderStatusType::Completed {
                return Ok(TransitionOutcome::AlreadyCompleted(order));
            }
            if order.status == target {
                let fills_ids = (transaction_id.is_some() && !order.has_transaction_id()) ||
                    (gateway_order_id.is_some() && !order.has_gateway_order_id());
                if !fills_ids {
                    return Ok(TransitionOutcome::Unchanged(order));
                }
                debug!("🔄️ Order {order_id} is already {target}. Recording the missing gateway ids.");
            } else if !order.status.can_transition_to(target) {
                return Ok(TransitionOutcome::Rejected { order, requested: target });
            }
            let update = StatusUpdate::new(order.status, target)
                .with_transaction_id(transaction_id.clone())
                .with_gateway_order_id(gateway_order_id.clone());
            match self.db.update_order_status(order_id, update).await? {
                Some(updated) => return Ok(TransitionOutcome::Applied(updated)),
                None => {
                    debug!("🔄️ Order {order_id} changed while moving it to {target} (attempt {attempt}). Retrying.");
                },
            }
        }
        Err(PaymentFlowError::Conflict(format!(
            "Order {order_id} kept changing. Gave up after {MAX_STATUS_UPDATE_ATTEMPTS} attempts"
        )))
    }
}

fn log_outcome(outcome: &TransitionOutcome, source: &str) {
    let order = outcome.order();
    match outcome {
        TransitionOutcome::Applied(_) => info!("🔄️ {source}: order {} is now {}", order.id, order.status),
        TransitionOutcome::AlreadyCompleted(_) => {
            debug!("🔄️ {source}: order {} is already completed. Nothing to do.", order.id)
        },
        TransitionOutcome::Unchanged(_) => debug!("🔄️ {source}: order {} is already {}", order.id, order.status),
        TransitionOutcome::Rejected { requested, .. } => {
            warn!("🔄️ {source}: order {} cannot move from {} to {requested}. Ignored.", order.id, order.status)
        },
    }
}
