use urbannook_common::Paise;
use urbannook_engine::db_types::{LineItem, NewOrder, OrderId, ProductSnapshot, ShippingAddress};

pub const CUSTOMER: &str = "ananya@example.com";

pub fn lamp() -> ProductSnapshot {
    ProductSnapshot {
        product_id: "p-lamp-01".into(),
        name: "Rattan Pendant Lamp".into(),
        category: Some("Lighting".into()),
        image_url: Some("https://cdn.urbannook.in/lamp.jpg".into()),
        unit_price: Paise::from_rupees(2_450),
    }
}

pub fn planter() -> ProductSnapshot {
    ProductSnapshot {
        product_id: "p-planter-07".into(),
        name: "Ceramic Planter".into(),
        category: Some("Garden".into()),
        image_url: None,
        unit_price: Paise::from_rupees(799),
    }
}

pub fn address() -> ShippingAddress {
    ShippingAddress {
        name: "Ananya Iyer".into(),
        line1: "22 MG Road".into(),
        line2: Some("Flat 5B".into()),
        city: "Pune".into(),
        state: "MH".into(),
        postal_code: "411001".into(),
        country: "India".into(),
        phone: Some("+91 98200 00000".into()),
    }
}

/// A two-item order for [`CUSTOMER`], linked to `gateway_ref`.
pub fn new_order(order_id: &str, gateway_ref: &str) -> NewOrder {
    NewOrder::new(OrderId::from(order_id), CUSTOMER, gateway_ref)
        .with_item(LineItem::new(lamp(), 1))
        .with_item(LineItem::new(planter(), 2))
        .with_shipping_address(address())
}
