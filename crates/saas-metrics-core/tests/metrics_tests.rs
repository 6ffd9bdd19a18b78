use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use saas_metrics_core::metrics::{build_metrics, compute_saas_metrics, MetricsInput, MetricsResult};
use saas_metrics_core::revenue::matrix::{CustomerRecord, RevenueMatrix};
use saas_metrics_core::types::{MaybeMoney, Money, MonthKey};

// ===========================================================================
// Fixtures
// ===========================================================================

fn axis(n: usize) -> Vec<MonthKey> {
    let mut months = Vec::with_capacity(n);
    let mut key = MonthKey::new(2022, 1);
    for _ in 0..n {
        months.push(key);
        key = key.next();
    }
    months
}

fn input_from(rows: Vec<Vec<Money>>, net_loss: Option<Vec<MaybeMoney>>) -> MetricsInput {
    let n = rows[0].len();
    MetricsInput {
        customers: rows
            .into_iter()
            .enumerate()
            .map(|(i, r)| CustomerRecord::new(format!("Customer {i}"), r))
            .collect(),
        dates: axis(n),
        net_loss,
    }
}

fn run(rows: Vec<Vec<Money>>, net_loss: Option<Vec<MaybeMoney>>) -> MetricsResult {
    compute_saas_metrics(&input_from(rows, net_loss))
        .unwrap()
        .result
}

/// A deterministic, irregular book: customers join, expand, contract, churn
/// and come back. Values are driven by a small linear congruential sequence.
fn churny_book(customers: usize, months: usize) -> Vec<Vec<Money>> {
    let mut state: u64 = 0x2545_f491;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (state >> 33) as u32
    };
    (0..customers)
        .map(|_| {
            (0..months)
                .map(|_| match next() % 5 {
                    0 => Decimal::ZERO,
                    k => Decimal::from(k * 25 + next() % 50),
                })
                .collect()
        })
        .collect()
}

// ===========================================================================
// Bridge identity and sign invariants
// ===========================================================================

#[test]
fn test_mrr_bridge_identity_on_irregular_book() {
    let r = run(churny_book(15, 30), None);
    for m in 0..r.num_months() {
        assert_eq!(
            r.end_mrr[m],
            r.begin_mrr[m] + r.new_mrr[m] + r.upgrade_mrr[m] + r.downgrade_mrr[m] + r.churn_mrr[m],
            "MRR identity broken at month {m}"
        );
        let expected_begin = if m == 0 { Decimal::ZERO } else { r.end_mrr[m - 1] };
        assert_eq!(r.begin_mrr[m], expected_begin);
    }
}

#[test]
fn test_customer_bridge_identity_on_irregular_book() {
    let r = run(churny_book(15, 30), None);
    for m in 0..r.num_months() {
        assert_eq!(
            r.end_customers[m],
            r.begin_customers[m] + r.new_customers[m] + r.churned_customers[m]
        );
        let expected_begin = if m == 0 { 0 } else { r.end_customers[m - 1] };
        assert_eq!(r.begin_customers[m], expected_begin);
    }
}

#[test]
fn test_sign_invariants() {
    let r = run(churny_book(12, 24), None);
    for m in 0..r.num_months() {
        assert!(r.new_mrr[m] >= Decimal::ZERO);
        assert!(r.upgrade_mrr[m] >= Decimal::ZERO);
        assert!(r.downgrade_mrr[m] <= Decimal::ZERO);
        assert!(r.churn_mrr[m] <= Decimal::ZERO);
        assert!(r.churned_customers[m] <= 0);
    }
}

#[test]
fn test_end_mrr_matches_column_totals() {
    let rows = churny_book(8, 18);
    let totals: Vec<Money> = (0..18)
        .map(|m| rows.iter().map(|r| r[m]).sum())
        .collect();
    let r = run(rows, None);
    assert_eq!(r.end_mrr, totals);
}

// ===========================================================================
// Windows and bounds
// ===========================================================================

#[test]
fn test_null_before_window() {
    let n = 20;
    let r = run(churny_book(10, n), Some(vec![Some(dec!(-250)); n]));
    for m in 0..12 {
        assert_eq!(r.new_arr[m], None);
        assert_eq!(r.yoy_growth[m], None);
        assert_eq!(r.ttm_ndr[m], None);
        assert_eq!(r.ttm_gdr[m], None);
        assert_eq!(r.cohort_ndr[m], None);
        assert_eq!(r.cohort_gdr[m], None);
        assert_eq!(r.customer_growth[m], None);
        assert_eq!(r.gross_customer_retention[m], None);
        assert_eq!(r.ttm_new_arr_over_loss.as_ref().unwrap()[m], None);
        assert_eq!(r.ttm_payback.as_ref().unwrap()[m], None);
    }
    for m in 0..5 {
        assert_eq!(r.six_month_new_arr_over_loss.as_ref().unwrap()[m], None);
        assert_eq!(r.six_month_payback.as_ref().unwrap()[m], None);
    }
    assert!(r.six_month_new_arr_over_loss.as_ref().unwrap()[5].is_some());
}

#[test]
fn test_cohort_gdr_never_exceeds_cohort_ndr() {
    let r = run(churny_book(20, 36), None);
    let mut compared = 0;
    for m in 0..r.num_months() {
        if let (Some(gdr), Some(ndr)) = (r.cohort_gdr[m], r.cohort_ndr[m]) {
            assert!(gdr <= ndr, "month {m}: gdr {gdr} > ndr {ndr}");
            assert!(gdr <= Decimal::ONE);
            compared += 1;
        }
    }
    assert!(compared > 0);
}

#[test]
fn test_ttm_gdr_never_exceeds_ttm_ndr() {
    let r = run(churny_book(20, 36), None);
    for m in 0..r.num_months() {
        if let (Some(gdr), Some(ndr)) = (r.ttm_gdr[m], r.ttm_ndr[m]) {
            assert!(gdr <= ndr);
            assert!(gdr <= Decimal::ONE);
        }
    }
}

#[test]
fn test_short_axis_degrades_to_nulls() {
    let r = run(vec![vec![dec!(10)]], Some(vec![Some(dec!(-5))]));
    assert_eq!(r.num_months(), 1);
    assert_eq!(r.new_mrr, vec![dec!(10)]);
    assert_eq!(r.new_customers, vec![1]);
    assert_eq!(r.ttm_ndr, vec![None]);
    assert_eq!(r.six_month_payback, Some(vec![None]));
}

// ===========================================================================
// Efficiency presence
// ===========================================================================

#[test]
fn test_efficiency_absent_when_net_loss_omitted() {
    let r = run(churny_book(4, 14), None);
    assert_eq!(r.net_loss, None);
    assert_eq!(r.ttm_new_arr_over_loss, None);
    assert_eq!(r.ttm_payback, None);
    assert_eq!(r.six_month_new_arr_over_loss, None);
    assert_eq!(r.six_month_payback, None);
}

#[test]
fn test_all_null_net_loss_treated_as_omitted() {
    let rows = churny_book(4, 14);
    let a = run(rows.clone(), Some(vec![None; 14]));
    let b = run(rows, None);
    assert_eq!(a, b);
    let json = serde_json::to_string(&a).unwrap();
    assert!(!json.contains("payback"));
}

// ===========================================================================
// Scenarios
// ===========================================================================

#[test]
fn test_single_customer_join_and_churn() {
    // [0, 100 x 11, 0]: joins in month 1, churns in month 12
    let mut row = vec![dec!(0)];
    row.extend(vec![dec!(100); 11]);
    row.push(dec!(0));
    let r = run(vec![row], None);

    assert_eq!(r.new_mrr[1], dec!(100));
    assert_eq!(r.new_customers[1], 1);
    assert_eq!(r.end_mrr[1], dec!(100));

    assert_eq!(r.churn_mrr[12], dec!(-100));
    assert_eq!(r.churned_customers[12], -1);
    assert_eq!(r.end_mrr[12], dec!(0));
    assert_eq!(r.end_customers[12], 0);

    // Window [1, 12] opens at begin_mrr[1] = 0
    assert_eq!(r.ttm_ndr[12], None);
    assert_eq!(r.acv[12], None);
}

#[test]
fn test_two_flat_customers() {
    let r = run(vec![vec![dec!(50); 13], vec![dec!(50); 13]], None);
    for m in 0..13 {
        assert_eq!(r.upgrade_mrr[m], dec!(0));
        assert_eq!(r.downgrade_mrr[m], dec!(0));
        assert_eq!(r.churn_mrr[m], dec!(0));
        assert_eq!(r.end_mrr[m], dec!(100));
    }
    assert_eq!(r.ttm_ndr[12], Some(dec!(1)));
    assert_eq!(r.ttm_gdr[12], Some(dec!(1)));
    assert_eq!(r.cohort_ndr[12], Some(dec!(1)));
    assert_eq!(r.gross_customer_retention[12], Some(dec!(1)));
    assert_eq!(r.customer_growth[12], Some(dec!(0)));
    assert_eq!(r.acv[12], Some(dec!(600)));
    assert_eq!(r.max_concentration[12], Some(dec!(0.5)));
    assert_eq!(r.yoy_growth[12], Some(dec!(0)));
    assert_eq!(r.new_arr[12], Some(dec!(0)));
}

#[test]
fn test_expansion_book_end_to_end() {
    // A expands every quarter, B downgrades once, C churns, D joins late.
    let a: Vec<Money> = (0..13).map(|m| dec!(100) + Decimal::from(m / 3) * dec!(10)).collect();
    let mut b = vec![dec!(200); 13];
    for v in b.iter_mut().skip(7) {
        *v = dec!(150);
    }
    let mut c = vec![dec!(50); 13];
    for v in c.iter_mut().skip(4) {
        *v = dec!(0);
    }
    let mut d = vec![dec!(0); 13];
    for v in d.iter_mut().skip(10) {
        *v = dec!(80);
    }
    let mut loss = vec![Some(dec!(-100)); 13];
    loss[2] = None;
    let r = run(vec![a, b, c, d], Some(loss));

    // Month 12: A = 140, B = 150, D = 80
    assert_eq!(r.end_mrr[12], dec!(370));
    assert_eq!(r.end_customers[12], 3);
    assert_eq!(r.arr[12], dec!(4440));
    // 370 - 350
    assert_eq!(r.new_arr[12], Some(dec!(240)));

    // Window [1, 12], base = end_mrr[0] = 350.
    // Upgrades +40, downgrade -50, churn -50
    assert_eq!(r.ttm_ndr[12], Some(dec!(290) / dec!(350)));
    assert_eq!(r.ttm_gdr[12], Some(dec!(250) / dec!(350)));

    // Cohort at month 0: A, B, C (350). Now 140 + 150 + 0
    assert_eq!(r.cohort_ndr[12], Some(dec!(290) / dec!(350)));
    // Capped: 100 + 150 + 0
    assert_eq!(r.cohort_gdr[12], Some(dec!(250) / dec!(350)));

    // Customers: base begin_customers[1] = 3, one churn in the window
    assert_eq!(r.gross_customer_retention[12], Some(dec!(2) / dec!(3)));

    // Event stats in the month B downgrades
    assert_eq!(r.downgrade_count[7], 1);
    assert_eq!(r.max_downgrade[7], Some(dec!(-50)));
    assert_eq!(r.max_churn[4], Some(dec!(-50)));
    assert_eq!(r.max_customer_win[10], Some(dec!(80)));
    assert_eq!(r.upgrade_count[3], 1);

    // TTM efficiency: 11 defined losses in [1, 12] = -1100
    let ttm = r.ttm_new_arr_over_loss.as_ref().unwrap();
    assert_eq!(ttm[12], Some(dec!(240) / dec!(1100)));
    let payback = r.ttm_payback.as_ref().unwrap();
    assert_eq!(payback[12], Some(Decimal::ONE / (dec!(240) / dec!(1100))));
}

// ===========================================================================
// Determinism
// ===========================================================================

#[test]
fn test_engine_is_deterministic() {
    let rows = churny_book(10, 26);
    let loss: Vec<MaybeMoney> = (0..26)
        .map(|m| (m % 3 != 0).then(|| Decimal::from(-(m as i64) * 10)))
        .collect();
    let first = serde_json::to_string(&run(rows.clone(), Some(loss.clone()))).unwrap();
    let second = serde_json::to_string(&run(rows, Some(loss))).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_build_metrics_matches_validated_entry_point() {
    let rows = churny_book(6, 15);
    let input = input_from(rows, None);
    let matrix = RevenueMatrix::from_records(input.customers.clone(), input.dates.len());
    let direct = build_metrics(&matrix, &input.dates, None);
    let wrapped = compute_saas_metrics(&input).unwrap().result;
    assert_eq!(direct, wrapped);
}
