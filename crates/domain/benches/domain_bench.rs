use chrono::NaiveDate;
use common::UserId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    Address, CheckoutDraft, Money, OrderLine, OrderService, PaymentMethod, PaymentSubmission,
    RequestContext, ShippingMethod, compute_pricing,
};
use order_store::InMemoryOrderStore;

fn bench_lines(count: usize) -> Vec<OrderLine> {
    (0..count)
        .map(|i| {
            OrderLine::new(
                format!("SKU-{i:04}"),
                format!("Product {i}"),
                format!("/images/{i}.jpg"),
                Money::from_rupees(100 + i as i64),
                1 + (i as u32 % 3),
            )
        })
        .collect()
}

fn bench_draft(lines: Vec<OrderLine>) -> CheckoutDraft {
    let pricing = compute_pricing(&lines, ShippingMethod::Standard);
    let address = Address {
        address_id: None,
        street: "42 MG Road".to_string(),
        city: "Bengaluru".to_string(),
        state: "Karnataka".to_string(),
        zip_code: "560001".to_string(),
        country: "India".to_string(),
        phone: None,
    };
    CheckoutDraft {
        order_lines: lines,
        shipping_address: address.clone(),
        billing_address: address,
        shipping_method: ShippingMethod::Standard,
        pricing,
    }
}

fn submission() -> PaymentSubmission {
    PaymentSubmission {
        method: PaymentMethod::CreditCard,
        card_holder_name: "Priya Sharma".to_string(),
        card_number: "4111 1111 1111 1111".to_string(),
        expiry_month: 12,
        expiry_year: 2031,
        cvv: "123".to_string(),
    }
}

fn bench_compute_pricing(c: &mut Criterion) {
    let lines = bench_lines(100);

    c.bench_function("domain/compute_pricing_100_lines", |b| {
        b.iter(|| compute_pricing(&lines, ShippingMethod::Standard));
    });
}

fn bench_payment_validation(c: &mut Criterion) {
    let submission = submission();
    let today = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();

    c.bench_function("domain/payment_validation", |b| {
        b.iter(|| submission.validate(today).unwrap());
    });
}

fn bench_create_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("domain/create_order", |b| {
        b.iter(|| {
            rt.block_on(async {
                let service = OrderService::new(InMemoryOrderStore::new());
                let ctx = RequestContext::user(UserId::new());
                service
                    .create_order(&ctx, bench_draft(bench_lines(5)), submission(), None)
                    .await
                    .unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_compute_pricing,
    bench_payment_validation,
    bench_create_order
);
criterion_main!(benches);
