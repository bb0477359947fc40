//! Regulator flags, compliance reports, and the temperature-violation query.

mod common;

use common::*;
use rxl_compliance::{ComplianceConfig, Severity, ViolationKind};
use rxl_contract::PharmaContract;
use rxl_core::OrgRole;
use rxl_ledger::InMemoryLedger;
use rxl_state::BatchStatus;

const YEAR_START: &str = "2026-01-01T00:00:00Z";
const YEAR_END: &str = "2026-12-31T00:00:00Z";

#[test]
fn cold_chain_breach_is_reported_as_violation() {
    let h = harness();
    create(&h, "B1");
    transfer(&h, &manufacturer(), "B1", "distributor1", BatchStatus::InTransit, 1.0).unwrap();

    let err = transfer(&h, &pharmacy(), "B1", "pharmacy1", BatchStatus::Sold, 5.0).unwrap_err();
    assert_eq!(err.kind(), "AUTHORIZATION");

    let hits = h
        .contract
        .get_temperature_violations(&regulator(), YEAR_START, YEAR_END)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id.as_str(), "B1");
}

#[test]
fn violation_window_excludes_boundaries_and_compliant_batches() {
    let h = harness();
    for (id, manufactured, reading) in [
        ("on-start", "2026-01-01T00:00:00Z", 9.0),
        ("inside", "2026-01-10T00:00:00Z", 9.0),
        ("inside-ok", "2026-01-10T00:00:00Z", 5.0),
        ("on-end", "2026-02-01T00:00:00Z", 0.0),
    ] {
        h.contract
            .create_batch(&manufacturer(), create_request(id, manufactured))
            .unwrap();
        transfer(&h, &manufacturer(), id, "distributor1", BatchStatus::InTransit, reading).unwrap();
    }
    let hits = h
        .contract
        .get_temperature_violations(&regulator(), "2026-01-01T00:00:00Z", "2026-02-01T00:00:00Z")
        .unwrap();
    let ids: Vec<&str> = hits.iter().map(|b| b.id.as_str()).collect();
    assert_eq!(ids, vec!["inside"]);
}

#[test]
fn three_batch_report() {
    let h = harness();
    for (id, reading) in [("B1", 5.0), ("B2", 1.0), ("B3", 9.0)] {
        create(&h, id);
        transfer(&h, &manufacturer(), id, "org1", BatchStatus::InTransit, reading).unwrap();
    }
    create(&h, "elsewhere");
    transfer(&h, &manufacturer(), "elsewhere", "org2", BatchStatus::InTransit, 20.0).unwrap();

    let report = h
        .contract
        .generate_compliance_report(&regulator(), YEAR_START, YEAR_END, "org1")
        .unwrap();
    assert_eq!(report.organization_id, "org1");
    assert_eq!(report.total_batches, 3);
    assert_eq!(report.compliant_batches, 1);
    assert_eq!(report.violation_batches, 2);
    assert_eq!(report.report_period.start, ts(YEAR_START));
    assert_eq!(
        report
            .violation(ViolationKind::TemperatureBelowRange)
            .unwrap()
            .count,
        1
    );
    assert_eq!(
        report
            .violation(ViolationKind::TemperatureAboveRange)
            .unwrap()
            .count,
        1
    );
}

#[test]
fn report_window_does_not_filter_holdings() {
    let h = harness();
    create(&h, "B1");
    let report = h
        .contract
        .generate_compliance_report(
            &regulator(),
            "2020-01-01T00:00:00Z",
            "2020-01-02T00:00:00Z",
            "manufacturer1",
        )
        .unwrap();
    assert_eq!(report.total_batches, 1);
    assert_eq!(report.compliant_batches, 1);
}

#[test]
fn report_counts_expired_unsold_stock() {
    let h = harness();
    h.contract
        .create_batch(
            &manufacturer(),
            rxl_contract::CreateBatchRequest {
                expiry_date: "2026-01-20T00:00:00Z".into(),
                ..create_request("old", "2026-01-01T00:00:00Z")
            },
        )
        .unwrap();
    let report = h
        .contract
        .generate_compliance_report(&regulator(), YEAR_START, YEAR_END, "manufacturer1")
        .unwrap();
    assert_eq!(report.compliant_batches, 1);
    assert_eq!(report.violation(ViolationKind::ExpiredStock).unwrap().count, 1);
}

#[test]
fn report_rejects_bad_dates() {
    let h = harness();
    let err = h
        .contract
        .generate_compliance_report(&regulator(), "yesterday", YEAR_END, "org1")
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_ERROR");
    assert!(err.to_string().contains("startDate"));
}

#[test]
fn regulator_only_operations() {
    let h = harness();
    create(&h, "B1");
    for role in [OrgRole::Manufacturer, OrgRole::Distributor, OrgRole::Pharmacy] {
        let who = identity_for(role);
        let c = &h.contract;
        let errors = [
            c.flag_batch(&who, "B1", "r", "HIGH").unwrap_err(),
            c.get_batch_flags(&who, "B1").unwrap_err(),
            c.generate_compliance_report(&who, YEAR_START, YEAR_END, "org1")
                .unwrap_err(),
            c.get_temperature_violations(&who, YEAR_START, YEAR_END)
                .unwrap_err(),
        ];
        for err in errors {
            assert_eq!(err.kind(), "AUTHORIZATION", "role {role}");
        }
    }
    assert_eq!(
        h.contract.read_batch(&regulator(), "B1").unwrap().status(),
        BatchStatus::Manufactured
    );
}

#[test]
fn high_flag_quarantines_and_blocks_transfers() {
    let h = harness();
    let before = batch_in(&h, "B1", BatchStatus::InTransit);
    let flag = h
        .contract
        .flag_batch(&regulator(), "B1", "excursion", "HIGH")
        .unwrap();
    assert_eq!(flag.severity, Severity::High);
    assert_eq!(flag.flagged_by, OrgRole::Regulator);
    assert_eq!(flag.batch_id.as_str(), "B1");
    assert!(flag.id.starts_with("FLAG_B1_"));

    let after = h.contract.read_batch(&pharmacy(), "B1").unwrap();
    assert_eq!(after.status(), BatchStatus::Flagged);
    assert_eq!(after.history(), before.history());
    assert_eq!(after.temperature_readings(), before.temperature_readings());

    let err = transfer(&h, &distributor(), "B1", "p1", BatchStatus::Delivered, 5.0).unwrap_err();
    assert_eq!(err.kind(), "AUTHORIZATION");
}

#[test]
fn low_and_medium_flags_leave_status() {
    let h = harness();
    batch_in(&h, "B1", BatchStatus::Delivered);
    for severity in ["LOW", "MEDIUM"] {
        h.contract
            .flag_batch(&regulator(), "B1", "paperwork", severity)
            .unwrap();
    }
    assert_eq!(
        h.contract.read_batch(&pharmacy(), "B1").unwrap().status(),
        BatchStatus::Delivered
    );
    assert_eq!(h.contract.get_batch_flags(&regulator(), "B1").unwrap().len(), 2);
}

#[test]
fn flagging_missing_batch_or_bad_severity_fails() {
    let h = harness();
    let err = h
        .contract
        .flag_batch(&regulator(), "ghost", "r", "HIGH")
        .unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");

    create(&h, "B1");
    let err = h
        .contract
        .flag_batch(&regulator(), "B1", "r", "CRITICAL")
        .unwrap_err();
    assert_eq!(err.kind(), "VALIDATION_ERROR");
    assert!(h.contract.get_batch_flags(&regulator(), "B1").unwrap().is_empty());
}

#[test]
fn flags_at_one_instant_get_distinct_ids() {
    let h = harness();
    create(&h, "B1");
    h.clock.set("2026-03-01T12:00:00Z");
    h.clock.set_step(0);

    let ids: Vec<String> = (0..3)
        .map(|i| {
            h.contract
                .flag_batch(&regulator(), "B1", &format!("issue {i}"), "LOW")
                .unwrap()
                .id
        })
        .collect();
    assert_eq!(
        ids,
        vec![
            "FLAG_B1_2026-03-01T12:00:00.000000Z".to_string(),
            "FLAG_B1_2026-03-01T12:00:00.000000Z_1".to_string(),
            "FLAG_B1_2026-03-01T12:00:00.000000Z_2".to_string(),
        ]
    );
    let stored = h.contract.get_batch_flags(&regulator(), "B1").unwrap();
    assert_eq!(stored.len(), 3);
}

#[test]
fn batch_flags_are_ordered_and_scoped() {
    let h = harness();
    create(&h, "B1");
    create(&h, "B1_x");
    h.contract.flag_batch(&regulator(), "B1", "first", "LOW").unwrap();
    h.contract.flag_batch(&regulator(), "B1_x", "other", "LOW").unwrap();
    h.contract.flag_batch(&regulator(), "B1", "second", "MEDIUM").unwrap();

    let flags = h.contract.get_batch_flags(&regulator(), "B1").unwrap();
    let reasons: Vec<&str> = flags.iter().map(|f| f.reason.as_str()).collect();
    assert_eq!(reasons, vec!["first", "second"]);
    assert!(flags.windows(2).all(|w| w[0].flagged_at <= w[1].flagged_at));

    let err = h.contract.get_batch_flags(&regulator(), "ghost").unwrap_err();
    assert_eq!(err.kind(), "NOT_FOUND");
}

#[test]
fn custom_bounds_change_classification() {
    init_tracing();
    let clock = std::sync::Arc::new(TestClock::stepping("2026-02-01T00:00:00Z", 1));
    let contract = PharmaContract::with_config(
        InMemoryLedger::with_clock(std::sync::Arc::clone(&clock)),
        clock,
        ComplianceConfig::from_yaml_str("min_celsius: 15.0\nmax_celsius: 25.0\n").unwrap(),
    )
    .unwrap();
    contract
        .create_batch(&manufacturer(), create_request("B1", "2026-01-15T00:00:00Z"))
        .unwrap();
    contract
        .transfer_batch(
            &manufacturer(),
            rxl_contract::TransferRequest {
                id: "B1".into(),
                new_owner: "org1".into(),
                new_status: "InTransit".into(),
                location: "dock".into(),
                temperature: 5.0,
            },
        )
        .unwrap();
    let report = contract
        .generate_compliance_report(&regulator(), YEAR_START, YEAR_END, "org1")
        .unwrap();
    assert_eq!(report.violation_batches, 1);
    assert_eq!(contract.config().min_celsius, 15.0);
}

#[test]
fn medium_threshold_quarantines_medium_flags() {
    init_tracing();
    let clock = std::sync::Arc::new(TestClock::stepping("2026-02-01T00:00:00Z", 1));
    let contract = PharmaContract::with_config(
        InMemoryLedger::with_clock(std::sync::Arc::clone(&clock)),
        clock,
        ComplianceConfig {
            status_override_severity: Severity::Medium,
            ..ComplianceConfig::default()
        },
    )
    .unwrap();
    contract
        .create_batch(&manufacturer(), create_request("B1", "2026-01-15T00:00:00Z"))
        .unwrap();
    contract
        .flag_batch(&regulator(), "B1", "label", "MEDIUM")
        .unwrap();
    assert_eq!(
        contract.read_batch(&regulator(), "B1").unwrap().status(),
        BatchStatus::Flagged
    );
}
