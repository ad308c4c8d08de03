//! The full checkout scenario: merge on add, pricing under the policy,
//! step gates, and the submission contract (failure preserves local state,
//! success clears it).

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use rust_decimal::Decimal;

use aurelle_core::{
    CheckoutMachine, CheckoutStep, LineItem, OrderId, OrderStatus, PaymentEvidence, PaymentStatus,
    PricingBreakdown, ProductId, ShippingDetails, ShippingPolicy, UserId, VariationSelection,
};
use aurelle_storefront::cart::{CartService, ChangeNotifier, MemorySlotStore};
use aurelle_storefront::checkout::{OrderDraft, OrderGateway, SubmitError, SubmitFlowError, submit_order};
use aurelle_storefront::db::Order;

fn service() -> CartService<MemorySlotStore> {
    CartService::new(MemorySlotStore::new(), ChangeNotifier::new())
}

fn policy() -> ShippingPolicy {
    ShippingPolicy {
        standard_shipping_fee: Decimal::new(1500, 2),    // 15.00
        free_shipping_threshold: Decimal::new(50000, 2), // 500.00
    }
}

fn ring(qty: u32) -> LineItem {
    LineItem {
        product_id: ProductId::new("r1"),
        name: "Aurora Ring".into(),
        unit_price: Decimal::new(12000, 2), // 120.00
        image: None,
        quantity: qty,
        selected_variations: VariationSelection::new(),
    }
}

fn shipping_details() -> ShippingDetails {
    ShippingDetails {
        first_name: "Ada".into(),
        last_name: "Byron".into(),
        email: "ada@example.com".into(),
        phone: "+1 555 0100".into(),
        address: "12 Jewel Lane".into(),
        city: "London".into(),
        zip_code: "E1 6AN".into(),
    }
}

/// Gateway that either accepts everything or rejects everything.
struct StubGateway {
    accept: AtomicBool,
    rejection: String,
}

impl StubGateway {
    fn accepting() -> Self {
        Self {
            accept: AtomicBool::new(true),
            rejection: String::new(),
        }
    }

    fn rejecting(message: &str) -> Self {
        Self {
            accept: AtomicBool::new(false),
            rejection: message.to_owned(),
        }
    }
}

impl OrderGateway for StubGateway {
    async fn submit(&self, draft: OrderDraft) -> Result<Order, SubmitError> {
        if self.accept.load(Ordering::SeqCst) {
            Ok(Order {
                id: OrderId::new("order-1"),
                user_id: draft.user_id,
                customer: draft.customer,
                items: draft.items,
                subtotal: draft.subtotal,
                shipping: draft.shipping,
                total: draft.total,
                payment_proof_url: draft.payment_proof_url,
                order_status: OrderStatus::Pending,
                payment_status: PaymentStatus::AwaitingVerification,
                created_at: Utc::now(),
            })
        } else {
            Err(SubmitError::Rejected(self.rejection.clone()))
        }
    }
}

async fn machine_at_review(service: &CartService<MemorySlotStore>) -> CheckoutMachine {
    service.add_item("s1", ring(1)).await.expect("add qty 1");
    service.add_item("s1", ring(2)).await.expect("add qty 2");

    let mut machine = CheckoutMachine::new();
    machine.begin().expect("cart -> shipping");
    machine
        .submit_shipping(shipping_details())
        .expect("shipping -> payment");
    machine
        .attach_evidence(PaymentEvidence::new("https://cdn.example/proof.jpg"))
        .expect("payment -> review");
    machine
}

// =============================================================================
// Scenario: add then checkout
// =============================================================================

#[tokio::test]
async fn add_then_checkout_prices_the_merged_cart() {
    let service = service();

    service.add_item("s1", ring(1)).await.expect("add qty 1");
    service.add_item("s1", ring(2)).await.expect("add qty 2");

    let cart = service.cart("s1").await.expect("load");
    assert_eq!(cart.len(), 1, "same identity merges into one line");
    assert_eq!(cart.items()[0].quantity, 3);

    let pricing = PricingBreakdown::quote(&cart, &policy());
    assert_eq!(pricing.subtotal, Decimal::new(36000, 2)); // 360.00
    assert_eq!(pricing.shipping, Decimal::new(1500, 2)); // below threshold
    assert_eq!(pricing.total, Decimal::new(37500, 2)); // 375.00
}

#[tokio::test]
async fn submission_failure_preserves_cart_and_step() {
    let service = service();
    let mut machine = machine_at_review(&service).await;
    let gateway = StubGateway::rejecting("payment proof unreadable");

    let err = submit_order(
        &mut machine,
        &service,
        &gateway,
        "s1",
        UserId::new("u1"),
        &policy(),
    )
    .await
    .expect_err("gateway rejects");

    match err {
        SubmitFlowError::Submit(SubmitError::Rejected(msg)) => {
            assert_eq!(msg, "payment proof unreadable", "server message verbatim");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // Local state untouched: the customer can retry.
    assert_eq!(machine.step(), CheckoutStep::Review);
    assert!(machine.evidence().is_some());
    assert_eq!(service.cart("s1").await.expect("load").item_count(), 3);
}

#[tokio::test]
async fn submission_success_clears_cart_and_resets_machine() {
    let service = service();
    let mut machine = machine_at_review(&service).await;
    let gateway = StubGateway::accepting();

    let order = submit_order(
        &mut machine,
        &service,
        &gateway,
        "s1",
        UserId::new("u1"),
        &policy(),
    )
    .await
    .expect("gateway accepts");

    assert_eq!(order.total, Decimal::new(37500, 2));
    assert_eq!(order.items.item_count(), 3);

    assert_eq!(machine.step(), CheckoutStep::Cart, "machine reset");
    assert!(machine.shipping().is_none());
    assert!(service.cart("s1").await.expect("load").is_empty(), "cart cleared");
}

#[tokio::test]
async fn submitting_an_emptied_cart_is_refused() {
    let service = service();
    let mut machine = machine_at_review(&service).await;

    // Something cleared the cart out from under the checkout.
    service.clear("s1").await.expect("clear");

    let err = submit_order(
        &mut machine,
        &service,
        &StubGateway::accepting(),
        "s1",
        UserId::new("u1"),
        &policy(),
    )
    .await
    .expect_err("nothing to submit");

    assert!(matches!(err, SubmitFlowError::EmptyCart));
    assert_eq!(machine.step(), CheckoutStep::Review, "machine untouched");
}

// =============================================================================
// Step gates
// =============================================================================

#[tokio::test]
async fn shipping_gate_blocks_each_missing_field() {
    let mut machine = CheckoutMachine::new();
    machine.begin().expect("begin");

    let mut details = shipping_details();
    details.phone = String::new();

    let err = machine.submit_shipping(details).expect_err("gate holds");
    assert!(err.to_string().contains("phone"));
    assert_eq!(machine.step(), CheckoutStep::Shipping);
}

#[tokio::test]
async fn free_shipping_kicks_in_at_the_threshold() {
    let service = service();

    // 5 × 120.00 = 600.00, over the 500.00 threshold.
    service.add_item("s1", ring(5)).await.expect("add");

    let cart = service.cart("s1").await.expect("load");
    let pricing = PricingBreakdown::quote(&cart, &policy());
    assert_eq!(pricing.shipping, Decimal::ZERO);
    assert_eq!(pricing.total, pricing.subtotal);
}
