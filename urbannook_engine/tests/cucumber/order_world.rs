use cucumber::World;
use log::*;
use serde_json::Value;
use urbannook_engine::{
    db_types::{Order, OrderId},
    gateway::{RazorpayConfig, RazorpaySignatureVerifier},
    Envelope,
    EventProducers,
    OrderManagement,
    OrderStatusApi,
    PaymentVerificationApi,
    SqliteDatabase,
};

use crate::support::prepare_env::new_database;

pub const GATEWAY_SECRET: &str = "cucumber_s3cr3t";

#[derive(Default, Debug, World)]
pub struct OrderWorld {
    pub system: Option<OrderSystem>,
    pub last_response: Option<Envelope<Value>>,
}

#[derive(Debug)]
pub struct OrderSystem {
    pub db_path: String,
    pub api: PaymentVerificationApi<SqliteDatabase, RazorpaySignatureVerifier>,
}

impl OrderWorld {
    pub fn api(&self) -> &PaymentVerificationApi<SqliteDatabase, RazorpaySignatureVerifier> {
        &self.system.as_ref().expect("Order system not initialised").api
    }

    pub fn db(&self) -> &SqliteDatabase {
        self.api().orders().db()
    }

    pub fn response(&self) -> &Envelope<Value> {
        self.last_response.as_ref().expect("No request has been made yet")
    }

    pub async fn order(&self, order_id: &str) -> Order {
        self.db()
            .fetch_order_by_order_id(&OrderId::from(order_id))
            .await
            .expect("Error fetching order")
            .unwrap_or_else(|| panic!("Order {order_id} does not exist"))
    }
}

pub fn verifier() -> RazorpaySignatureVerifier {
    RazorpaySignatureVerifier::new(&RazorpayConfig::new("rzp_test_cucumber", GATEWAY_SECRET))
}

impl OrderSystem {
    pub async fn new() -> Self {
        let db = new_database().await;
        let db_path = db.url().to_string();
        debug!("🚀️ Created database: {db_path}");
        let api = PaymentVerificationApi::new(OrderStatusApi::new(db, EventProducers::default()), verifier());
        Self { db_path, api }
    }
}
