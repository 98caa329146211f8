//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Any long, non-cpu-bound operation (database access, calls to the
//! payment gateway) is expressed as a future, so async handlers never stall the worker.
use actix_web::{get, web, HttpResponse, Responder};
use log::*;
use zmp_payment_engine::{
    db_types::OrderId,
    order_objects::CreateOrderRequest,
    traits::{OrderManagement, PaymentGatewayClient, ProductCatalog},
    OrderFlowApi,
    PaymentFlowApi,
};

use crate::{data_objects::PageQuery, errors::ServerError};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(create_order => Post "/orders" impl OrderManagement, ProductCatalog);
/// Creates an order from the posted cart and returns it, together with the signed checkout parameters if a payment
/// method was given.
pub async fn create_order<B, C>(
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: ProductCatalog,
{
    let request = body.into_inner();
    debug!("💻️ POST new order with {} cart items", request.items.len());
    let created = api.create_order(request).await?;
    Ok(HttpResponse::Created().json(created))
}

route!(list_orders => Get "/orders" impl OrderManagement, ProductCatalog);
pub async fn list_orders<B, C>(
    query: web::Query<PageQuery>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: ProductCatalog,
{
    let query = query.into_inner();
    trace!("💻️ GET orders page {:?} (size {:?})", query.page, query.size);
    let page = api.list_orders(query.into()).await?;
    Ok(HttpResponse::Ok().json(page))
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement, ProductCatalog);
pub async fn order_by_id<B, C>(
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B, C>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    C: ProductCatalog,
{
    let order_id = path.into_inner();
    trace!("💻️ GET order {order_id}");
    let order = api.fetch_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}

route!(cancel_order => Post "/orders/{order_id}/cancel" impl OrderManagement, PaymentGatewayClient);
pub async fn cancel_order<B, G>(
    path: web::Path<OrderId>,
    api: web::Data<PaymentFlowApi<B, G>>,
) -> Result<HttpResponse, ServerError>
where
    B: OrderManagement,
    G: PaymentGatewayClient,
{
    let order_id = path.into_inner();
    info!("💻️ Cancellation requested for order {order_id}");
    let order = api.cancel_order(&order_id).await?;
    Ok(HttpResponse::Ok().json(order))
}
