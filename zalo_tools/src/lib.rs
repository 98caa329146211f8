mod api;
mod config;
mod error;

mod data_objects;

pub use api::ZaloPaymentApi;
pub use config::{MacKeyChoice, MacKeyPolicy, MacPurpose, ZaloConfig, DEFAULT_ZALO_API_URL};
pub use data_objects::{
    GetOrderStatusResponse,
    OrderStatusData,
    SettlementChannel,
    UpdateOrderStatusData,
    UpdateOrderStatusRequest,
    UpdateOrderStatusResponse,
};
pub use error::ZaloApiError;
