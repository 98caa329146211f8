mod amount;
mod secret;

pub mod extra_data;
pub mod mac;
pub mod op;

pub use amount::{Amount, AmountError, CURRENCY_CODE};
pub use secret::Secret;
