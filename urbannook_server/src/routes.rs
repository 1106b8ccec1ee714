//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Every handler answers with the engine's [`urbannook_engine::Envelope`], and the HTTP status always equals the
//! envelope's `statusCode`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database access, signature checks and mail all go through the
//! engine's async API for this reason; never call a blocking function from a handler.
use actix_web::{get, web, HttpRequest, HttpResponse, Responder};
use log::*;
use urbannook_engine::{
    gateway::{RazorpayCallback, SignatureVerifier},
    OrderManagement,
    OrderStatusApi,
    PaymentVerificationApi,
};

use crate::{
    data_objects::StatusChangeParams,
    helpers::{caller_identity, envelope_response},
};

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

//----------------------------------------------   Payments  ----------------------------------------------------
route!(verify_payment => Post "/payments/verify" impl OrderManagement, SignatureVerifier);
/// Route handler for the payment gateway callback.
///
/// The storefront forwards the body it received from Razorpay's checkout as-is. The signed-in customer is identified by
/// the `X-User-Id` header, which the authentication layer in front of this server sets.
///
/// A reported failure, or a success whose signature does not verify, marks the order as `FAILED` and answers with a
/// 400 and a message that can be shown to the customer. A verified payment confirms the order.
pub async fn verify_payment<B, V>(
    req: HttpRequest,
    body: web::Json<RazorpayCallback>,
    api: web::Data<PaymentVerificationApi<B, V>>,
) -> HttpResponse
where
    B: OrderManagement,
    V: SignatureVerifier,
{
    let caller = caller_identity(&req);
    let callback = body.into_inner();
    debug!("💻️ POST payment callback for {:?}", callback.razorpay_order_id);
    let result = api.verify_and_finalize_payment(&caller, callback.into()).await;
    envelope_response(result)
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(update_order_status => Patch "/orders/{order_id}/status" impl OrderManagement);
pub async fn update_order_status<B: OrderManagement>(
    path: web::Path<String>,
    body: web::Json<StatusChangeParams>,
    api: web::Data<OrderStatusApi<B>>,
) -> HttpResponse {
    let order_id = path.into_inner();
    let params = body.into_inner();
    info!("💻️ PATCH status of order {order_id} to {:?}", params.status);
    let result = api.update_order_status(params.into_request(order_id)).await;
    envelope_response(result)
}

route!(order_by_id => Get "/orders/{order_id}" impl OrderManagement);
pub async fn order_by_id<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderStatusApi<B>>,
) -> HttpResponse {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id}");
    envelope_response(api.fetch_order(&order_id).await)
}

route!(orders_for_user => Get "/users/{user_id}/orders" impl OrderManagement);
pub async fn orders_for_user<B: OrderManagement>(
    path: web::Path<String>,
    api: web::Data<OrderStatusApi<B>>,
) -> HttpResponse {
    let user_id = path.into_inner();
    debug!("💻️ GET orders for {user_id}");
    envelope_response(api.fetch_orders_for_user(&user_id).await)
}
