use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::db_types::OrderId;

pub const ORDER_ID_PREFIX: &str = "NL";
const RANDOM_SUFFIX_LEN: usize = 8;

/// Generates an order id of the form `NL` + `YYYYMMDDHHMMSS` + 8 random alphanumerics.
///
/// Uniqueness is not checked here. A collision surfaces as a conflict when the order is inserted.
pub fn new_order_id(now: DateTime<Utc>) -> OrderId {
    let suffix = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SUFFIX_LEN)
        .map(char::from)
        .collect::<String>();
    OrderId(format!("{ORDER_ID_PREFIX}{}{suffix}", now.format("%Y%m%d%H%M%S")))
}
