//! Integration tests exercising the full seven-stage pipeline against the
//! concrete scenarios laid out for the decision engine: missing/invalid
//! loyalty IDs, a first-visit loyalty reward, the manager-card cap, a
//! split-line Marlboro multi-pack, and an unverified age gate.

use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tier3_core::basket::BasketLine;
use tier3_core::clock::FixedClock;
use tier3_persistence::connection::DatabasePool;
use tier3_persistence::Store;
use tier3_pipeline::{AvtStatus, Pipeline, PosRequest};

const DAILY_CAP: i64 = 5;
const DEFAULT_LOYALTY_DISCOUNT_CENTS: i64 = 0;

async fn fresh_store() -> Store {
    let pool = DatabasePool::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory sqlite connects");
    Store::from_pool(pool)
}

fn clock_on(date: &str) -> Arc<FixedClock> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
    let now = Utc.from_utc_datetime(&naive.and_hms_opt(12, 0, 0).unwrap());
    Arc::new(FixedClock::new(now))
}

fn pipeline(store: Store, clock: Arc<FixedClock>) -> Pipeline {
    Pipeline::new(store, clock, DAILY_CAP, DEFAULT_LOYALTY_DISCOUNT_CENTS)
}

fn basket_line(line_number: i64, upc: &str, quantity: i64, unit_price: Decimal) -> BasketLine {
    BasketLine {
        line_number,
        upc: upc.to_string(),
        quantity,
        unit_price,
        description: None,
    }
}

fn request(loyalty_id: &str, avt: AvtStatus, lines: Vec<BasketLine>) -> PosRequest {
    PosRequest {
        store_location_id: "STORE-001".to_string(),
        transaction_id: uuid::Uuid::new_v4().to_string(),
        cashier_id: Some("CASHIER-7".to_string()),
        loyalty_id: loyalty_id.to_string(),
        avt_status: avt,
        lines,
    }
}

/// Seeds one Marlboro SKU resolvable by its pack UPC, plus an active
/// loyalty allowance worth $0.97/transaction (spec.md §4.3/§4.6).
async fn seed_marlboro_pack_with_loyalty_allowance(store: &Store, pack_upc: &str) {
    let DatabasePool::Sqlite(pool) = store.pool() else {
        panic!("test store is always sqlite");
    };

    sqlx::query(
        r#"
        INSERT INTO upc_master
            (skuguid, sku_name, brand, manufacturer, category, program_eligibility,
             carton_upc, carton_suppressed_upc, carton_conversion, carton_is_promotional,
             pack_upc, pack_conversion, pack_is_promotional)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        "#,
    )
    .bind("SKU-MARLBORO-GOLD")
    .bind("Marlboro Gold Pack")
    .bind("MARLBORO")
    .bind("PM USA")
    .bind("CIG")
    .bind(true)
    .bind(Option::<String>::None)
    .bind(Option::<String>::None)
    .bind(dec!(10))
    .bind(false)
    .bind(pack_upc)
    .bind(dec!(1))
    .bind(false)
    .execute(pool)
    .await
    .expect("catalog seed succeeds");

    sqlx::query(
        r#"
        INSERT INTO loyalty_allowances
            (allowance_id, allowance_type, eligible_uoms, min_qty,
             max_allowance_per_transaction, max_daily_transactions_per_loyalty,
             manufacturer_funded_amount, promo_code, promotional_upcs_eligible,
             start_date, end_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind("ALLOW-LOYALTY-1")
    .bind("LOYALTY")
    .bind("PACK")
    .bind(1_i64)
    .bind(Some(dec!(0.97)))
    .bind(Option::<i64>::None)
    .bind(Option::<Decimal>::None)
    .bind(Option::<String>::None)
    .bind(false)
    .bind(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap())
    .bind(NaiveDate::from_ymd_opt(2099, 1, 1).unwrap())
    .execute(pool)
    .await
    .expect("allowance seed succeeds");

    sqlx::query(
        "INSERT INTO loyalty_allowance_skus (allowance_id, skuguid) VALUES ($1, $2)",
    )
    .bind("ALLOW-LOYALTY-1")
    .bind("SKU-MARLBORO-GOLD")
    .execute(pool)
    .await
    .expect("allowance sku seed succeeds");
}

#[tokio::test]
async fn missing_lid_yields_no_rewards_and_ineligible_receipt() {
    let store = fresh_store().await;
    let pipeline = pipeline(store, clock_on("2026-07-28"));

    let result = pipeline
        .run(request(
            "",
            AvtStatus::Verified,
            vec![basket_line(1, "00000000", 1, dec!(7.00))],
        ))
        .await
        .expect("pipeline does not fail on invalid LID");

    assert!(result.rewards.is_empty());
    assert_eq!(result.receipt_lines[0], "*** LOYALTY REWARDS ***");
    assert_eq!(result.receipt_lines[1], "Loyalty ID not eligible");
    assert!(!result.flags.tier3_eligible);
    assert!(!result.flags.cid_fund_eligible);
}

#[tokio::test]
async fn malformed_qr_code_is_rejected_with_reason() {
    let store = fresh_store().await;
    let pipeline = pipeline(store, clock_on("2026-07-28"));

    let bad_qr = "https://rtnsmart.com/rtnsmartapp/?USER_@@@";
    let result = pipeline
        .run(request(bad_qr, AvtStatus::Verified, vec![]))
        .await
        .expect("pipeline does not fail on malformed QR");

    assert!(result.rewards.is_empty());
    assert!(!result.flags.tier3_eligible);
}

#[tokio::test]
async fn first_visit_phone_with_verified_age_earns_loyalty_reward() {
    let store = fresh_store().await;
    seed_marlboro_pack_with_loyalty_allowance(&store, "PACKUPC001").await;
    let pipeline = pipeline(store, clock_on("2026-07-28"));

    let result = pipeline
        .run(request(
            "5551234567",
            AvtStatus::Verified,
            vec![basket_line(1, "PACKUPC001", 1, dec!(7.00))],
        ))
        .await
        .expect("pipeline succeeds");

    assert_eq!(result.rewards.len(), 1);
    assert_eq!(result.rewards[0].value, dec!(0.97));
    assert_eq!(result.rewards[0].reward_id, "1-1-B2_S150");
    assert!(result.flags.tier3_eligible);
    assert!(result.flags.cid_fund_eligible);
    assert!(result.flags.age_verified);

    let receipt = result.receipt_lines.join("\n");
    assert!(receipt.contains("LOYALTY SAVINGS"));
    assert!(receipt.contains("-$0.97"));
    assert!(receipt.contains("TOTAL SAVINGS"));
}

#[tokio::test]
async fn sixth_transaction_of_the_day_is_treated_as_manager_card() {
    let store = fresh_store().await;
    let clock = clock_on("2026-07-28");

    // Five prior transactions for the same loyalty ID today push the
    // sixth over the cap of 5 (spec.md §4.1).
    for _ in 0..5 {
        let pipeline = pipeline(store.clone(), clock.clone());
        pipeline
            .run(request("5559876543", AvtStatus::Verified, vec![]))
            .await
            .expect("warm-up transaction succeeds");
    }

    let pipeline = pipeline(store, clock);
    let result = pipeline
        .run(request(
            "5559876543",
            AvtStatus::Verified,
            vec![basket_line(1, "UNKNOWNUPC", 1, dec!(7.00))],
        ))
        .await
        .expect("sixth transaction still succeeds");

    assert!(result.flags.tier3_eligible);
    assert!(!result.flags.cid_fund_eligible);
    assert_eq!(result.rewards.len(), 0);
}

#[tokio::test]
async fn split_marlboro_pack_lines_merge_and_flag_multi_pack() {
    let store = fresh_store().await;
    seed_marlboro_pack_with_loyalty_allowance(&store, "PACKUPC002").await;
    let pipeline = pipeline(store.clone(), clock_on("2026-07-28"));

    let result = pipeline
        .run(request(
            "5551112222",
            AvtStatus::Verified,
            vec![
                basket_line(1, "PACKUPC002", 1, dec!(7.00)),
                basket_line(2, "PACKUPC002", 1, dec!(7.00)),
            ],
        ))
        .await
        .expect("pipeline succeeds");

    // Both lines merge into one normalized line of quantity 2; the
    // multi-pack bucket never carries an amount (detection only).
    assert_eq!(result.rewards.len(), 1);
    assert_eq!(result.rewards[0].line_number, 1);
}

#[tokio::test]
async fn unverified_age_blocks_every_discount() {
    let store = fresh_store().await;
    seed_marlboro_pack_with_loyalty_allowance(&store, "PACKUPC003").await;
    let pipeline = pipeline(store, clock_on("2026-07-28"));

    let result = pipeline
        .run(request(
            "5553334444",
            AvtStatus::NotVerified,
            vec![basket_line(1, "PACKUPC003", 1, dec!(7.00))],
        ))
        .await
        .expect("pipeline succeeds");

    assert!(result.rewards.is_empty());
    assert!(!result.flags.age_verified);
    assert_eq!(result.receipt_lines[1], "Age verification required");
}

#[tokio::test]
async fn reward_values_sum_to_total_discount() {
    let store = fresh_store().await;
    seed_marlboro_pack_with_loyalty_allowance(&store, "PACKUPC004").await;
    let pipeline = pipeline(store, clock_on("2026-07-28"));

    let result = pipeline
        .run(request(
            "5556667777",
            AvtStatus::Verified,
            vec![
                basket_line(1, "PACKUPC004", 1, dec!(7.00)),
                basket_line(2, "NOMATCH", 1, dec!(4.50)),
            ],
        ))
        .await
        .expect("pipeline succeeds");

    let reward_total: Decimal = result.rewards.iter().map(|r| r.value).sum();
    assert_eq!(reward_total, dec!(0.97));
}
