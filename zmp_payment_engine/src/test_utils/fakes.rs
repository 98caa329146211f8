use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;

use crate::{
    scheduler::{ReconciliationJob, ReconciliationScheduler},
    traits::{GatewayError, GatewayTransactionStatus, PaymentGatewayClient, SettlementMethod, SettlementResult},
};

/// An in-memory payment gateway. Statuses are set up front; settlements are recorded.
#[derive(Clone, Default)]
pub struct FakeGateway {
    statuses: Arc<Mutex<HashMap<String, GatewayTransactionStatus>>>,
    settlements: Arc<Mutex<Vec<(String, SettlementMethod, SettlementResult)>>>,
    offline: Arc<Mutex<bool>>,
}

impl FakeGateway {
    pub fn set_status(&self, gateway_order_id: &str, status: GatewayTransactionStatus) {
        self.statuses.lock().unwrap().insert(gateway_order_id.to_string(), status);
    }

    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn settlements(&self) -> Vec<(String, SettlementMethod, SettlementResult)> {
        self.settlements.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGatewayClient for FakeGateway {
    async fn fetch_transaction_status(&self, gateway_order_id: &str) -> Result<GatewayTransactionStatus, GatewayError> {
        if *self.offline.lock().unwrap() {
            return Err(GatewayError::Unavailable("gateway is offline".into()));
        }
        self.statuses
            .lock()
            .unwrap()
            .get(gateway_order_id)
            .cloned()
            .ok_or_else(|| GatewayError::Rejected(format!("unknown order {gateway_order_id}")))
    }

    async fn push_settlement(
        &self,
        gateway_order_id: &str,
        method: SettlementMethod,
        result: SettlementResult,
    ) -> Result<(), GatewayError> {
        if *self.offline.lock().unwrap() {
            return Err(GatewayError::Unavailable("gateway is offline".into()));
        }
        self.settlements.lock().unwrap().push((gateway_order_id.to_string(), method, result));
        Ok(())
    }
}

/// Collects scheduled jobs instead of running them.
#[derive(Clone, Default)]
pub struct RecordingScheduler {
    jobs: Arc<Mutex<Vec<ReconciliationJob>>>,
}

impl RecordingScheduler {
    pub fn jobs(&self) -> Vec<ReconciliationJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl ReconciliationScheduler for RecordingScheduler {
    fn schedule(&self, job: ReconciliationJob) {
        self.jobs.lock().unwrap().push(job);
    }
}
