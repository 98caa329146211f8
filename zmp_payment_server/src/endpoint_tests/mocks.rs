use async_trait::async_trait;
use mockall::mock;
use zmp_payment_engine::{
    db_types::{NewOrder, Order, OrderId, OrderPage, Pagination, Product, StatusUpdate},
    traits::{
        CatalogError,
        GatewayError,
        GatewayTransactionStatus,
        OrderManagement,
        OrderStoreError,
        PaymentGatewayClient,
        ProductCatalog,
        SettlementMethod,
        SettlementResult,
    },
};

mock! {
    pub OrderManager {}
    #[async_trait]
    impl OrderManagement for OrderManager {
        async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderStoreError>;
        async fn fetch_order_by_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderStoreError>;
        async fn fetch_orders(&self, pagination: Pagination) -> Result<OrderPage, OrderStoreError>;
        async fn update_order_status(&self, order_id: &OrderId, update: StatusUpdate) -> Result<Option<Order>, OrderStoreError>;
    }
}

mock! {
    pub ProductCatalog {}
    #[async_trait]
    impl ProductCatalog for ProductCatalog {
        async fn fetch_product(&self, product_id: i64) -> Result<Option<Product>, CatalogError>;
    }
}

mock! {
    pub Gateway {}
    #[async_trait]
    impl PaymentGatewayClient for Gateway {
        async fn fetch_transaction_status(&self, gateway_order_id: &str) -> Result<GatewayTransactionStatus, GatewayError>;
        async fn push_settlement(&self, gateway_order_id: &str, method: SettlementMethod, result: SettlementResult) -> Result<(), GatewayError>;
    }
}
