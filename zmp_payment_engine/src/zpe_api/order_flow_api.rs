use std::fmt::Debug;

use chrono::Utc;
use log::*;
use zmp_common::{
    extra_data::encode_order_reference,
    mac::{sign, CanonicalString},
    Amount,
};

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderItem, OrderPage, Pagination, ProductSnapshot},
    helpers::new_order_id,
    traits::{OrderManagement, ProductCatalog},
    zpe_api::{
        errors::PaymentFlowError,
        order_objects::{
            CheckoutItem,
            CheckoutMethod,
            CheckoutParams,
            CreateOrderRequest,
            OrderCreated,
            OrderFlowOptions,
            PaymentMethod,
        },
    },
};

/// `OrderFlowApi` turns a cart into an order and prepares the gateway checkout for it.
///
/// Every line item is priced from the catalog at creation time and stored as a self-contained snapshot, so later
/// catalog changes never alter an existing order.
pub struct OrderFlowApi<B, C> {
    db: B,
    catalog: C,
    options: OrderFlowOptions,
}

impl<B, C> Debug for OrderFlowApi<B, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B, C> OrderFlowApi<B, C> {
    pub fn new(db: B, catalog: C, options: OrderFlowOptions) -> Self {
        Self { db, catalog, options }
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}

impl<B, C> OrderFlowApi<B, C>
where
    B: OrderManagement,
    C: ProductCatalog,
{
    /// Creates a new order from the cart in `request`.
    ///
    /// Fails with `InvalidRequest` for an empty cart, a non-positive quantity or a total that overflows, and with
    /// `NotFound` if any product does not exist. When a payment method is given, the signed checkout parameters are
    /// returned alongside the order.
    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<OrderCreated, PaymentFlowError> {
        if request.items.is_empty() {
            return Err(PaymentFlowError::InvalidRequest("An order must contain at least one item".to_string()));
        }
        let mut items = Vec::with_capacity(request.items.len());
        let mut line_totals = Vec::with_capacity(request.items.len());
        for cart_item in &request.items {
            let quantity = u32::try_from(cart_item.quantity).ok().filter(|q| *q > 0).ok_or_else(|| {
                PaymentFlowError::InvalidRequest(format!(
                    "Invalid quantity {} for product #{}",
                    cart_item.quantity, cart_item.product_id
                ))
            })?;
            let product = self
                .catalog
                .fetch_product(cart_item.product_id)
                .await?
                .ok_or_else(|| PaymentFlowError::NotFound(format!("Product #{}", cart_item.product_id)))?;
            let item = OrderItem::new(ProductSnapshot::from(&product), quantity);
            line_totals.push(item.unit_price.checked_mul_quantity(quantity)?);
            items.push(item);
        }
        let total_amount = Amount::checked_sum(line_totals)?;
        let order_id = new_order_id(Utc::now());
        let new_order = NewOrder::new(order_id, request.customer_info, total_amount, items);
        let order = self.db.insert_order(new_order).await?;
        info!("🔄️📦️ Order {} created for {} ({} items)", order.id, order.total_amount, order.items.len());
        let payment = match request.payment_method {
            Some(method) => Some(self.checkout_params(&order, &method)?),
            None => None,
        };
        Ok(OrderCreated { order, payment })
    }

    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Order, PaymentFlowError> {
        self.db.fetch_order_by_id(order_id).await?.ok_or_else(|| PaymentFlowError::NotFound(format!("Order {order_id}")))
    }

    pub async fn list_orders(&self, pagination: Pagination) -> Result<OrderPage, PaymentFlowError> {
        let page = self.db.fetch_orders(pagination).await?;
        trace!("🔄️📦️ Fetched {} of {} orders", page.items.len(), page.total);
        Ok(page)
    }

    /// Builds and signs the gateway checkout parameters for `order`.
    pub fn checkout_params(&self, order: &Order, method: &PaymentMethod) -> Result<CheckoutParams, PaymentFlowError> {
        let item = order
            .items
            .iter()
            .map(|i| CheckoutItem {
                id: i.product_snapshot.product_id,
                name: i.product_snapshot.name.clone(),
                price: i.unit_price.value(),
                quantity: i.quantity,
            })
            .collect::<Vec<_>>();
        let method = CheckoutMethod { id: method.0.clone(), is_custom: false };
        let amount = order.total_amount.value();
        let desc = format!("Payment for order {}", order.id.as_str());
        let extradata = encode_order_reference(order.id.as_str());
        let item_json =
            serde_json::to_string(&item).map_err(|e| PaymentFlowError::InvalidRequest(e.to_string()))?;
        let method_json =
            serde_json::to_string(&method).map_err(|e| PaymentFlowError::InvalidRequest(e.to_string()))?;
        let canonical = CanonicalString::new()
            .field("amount", amount)
            .field("desc", &desc)
            .field("extradata", &extradata)
            .field("item", &item_json)
            .field("method", &method_json);
        let mac = sign(&canonical, self.options.checkout_key.reveal())?;
        debug!("🔄️📦️ Checkout parameters prepared for order {}", order.id);
        Ok(CheckoutParams { amount, desc, item, extradata, method, mac })
    }
}
