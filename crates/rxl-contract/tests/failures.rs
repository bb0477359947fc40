//! Store and membership failures surface unchanged and write nothing.

mod common;

use std::sync::Arc;

use common::*;
use rxl_contract::{ContractError, PharmaContract};
use rxl_ledger::{
    BatchRepository, HistoryEntry, IdentityError, IdentityProvider, InMemoryLedger, Selector,
    StoreError, VersionedValue, Write,
};
use rxl_state::BatchStatus;

const OUTAGE: &str = "peer unreachable";

/// Point reads succeed; scans, queries, history and commits fail.
struct Degraded {
    inner: InMemoryLedger,
}

fn outage() -> StoreError {
    StoreError::Backend(OUTAGE.to_string())
}

impl BatchRepository for Degraded {
    fn get(&self, key: &str) -> Result<Option<VersionedValue>, StoreError> {
        self.inner.get(key)
    }

    fn commit(&self, _writes: &[Write]) -> Result<(), StoreError> {
        Err(outage())
    }

    fn scan_all(&self) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Err(outage())
    }

    fn query(&self, _selector: &Selector) -> Result<Vec<(String, Vec<u8>)>, StoreError> {
        Err(outage())
    }

    fn history_of(&self, _key: &str) -> Result<Vec<HistoryEntry>, StoreError> {
        Err(outage())
    }
}

/// A membership service that fails on the given attribute lookups.
struct Membership {
    role: Result<String, IdentityError>,
    id: Result<String, IdentityError>,
}

impl IdentityProvider for Membership {
    fn caller_role(&self) -> Result<String, IdentityError> {
        self.role.clone()
    }

    fn caller_id(&self) -> Result<String, IdentityError> {
        self.id.clone()
    }
}

fn degraded(h: &Harness) -> PharmaContract<Degraded, Arc<TestClock>> {
    PharmaContract::with_clock(
        Degraded {
            inner: h.ledger.clone(),
        },
        Arc::clone(&h.clock),
    )
}

fn assert_backend(err: ContractError) {
    assert_eq!(err.kind(), "STORE_ERROR");
    assert_eq!(err.to_string(), outage().to_string());
    match err {
        ContractError::Store(StoreError::Backend(reason)) => assert_eq!(reason, OUTAGE),
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[test]
fn backend_failures_pass_through_reads() {
    let h = harness();
    batch_in(&h, "B1", BatchStatus::InTransit);
    let c = degraded(&h);

    assert_backend(c.list_all_batches(&pharmacy()).unwrap_err());
    assert_backend(
        c.query_batches(&pharmacy(), r#"{"selector": {"status": "InTransit"}}"#)
            .unwrap_err(),
    );
    assert_backend(c.get_batch_history(&regulator(), "B1").unwrap_err());
    assert_backend(
        c.get_temperature_violations(&regulator(), "2026-01-01T00:00:00Z", "2026-12-31T00:00:00Z")
            .unwrap_err(),
    );
}

#[test]
fn backend_failure_on_commit_leaves_batch_unchanged() {
    let h = harness();
    let before = batch_in(&h, "B1", BatchStatus::InTransit);
    let c = degraded(&h);

    let err = transfer_with(&c, "B1", BatchStatus::Delivered).unwrap_err();
    assert_backend(err);
    assert_backend(
        c.flag_batch(&regulator(), "B1", "excursion", "HIGH")
            .unwrap_err(),
    );
    assert_eq!(h.contract.read_batch(&regulator(), "B1").unwrap(), before);
    assert!(h.contract.get_batch_flags(&regulator(), "B1").unwrap().is_empty());
}

fn transfer_with(
    c: &PharmaContract<Degraded, Arc<TestClock>>,
    id: &str,
    status: BatchStatus,
) -> Result<rxl_state::Batch, ContractError> {
    c.transfer_batch(
        &distributor(),
        rxl_contract::TransferRequest {
            id: id.to_string(),
            new_owner: "pharmacy1".to_string(),
            new_status: status.name().to_string(),
            location: "pharmacy1 warehouse".to_string(),
            temperature: 5.0,
        },
    )
}

#[test]
fn membership_failures_surface_as_identity_errors() {
    let h = harness();
    let unavailable = Membership {
        role: Err(IdentityError::Unavailable("ca offline".to_string())),
        id: Ok("manufacturer1".to_string()),
    };
    let no_id = Membership {
        role: Ok("Manufacturer".to_string()),
        id: Err(IdentityError::MissingAttribute("hf.EnrollmentID")),
    };

    for who in [&unavailable, &no_id] {
        let err = h
            .contract
            .create_batch(who, create_request("B1", "2026-01-15T00:00:00Z"))
            .unwrap_err();
        assert_eq!(err.kind(), "IDENTITY_ERROR");
        assert!(matches!(err, ContractError::Identity(_)));
    }
    assert!(h.ledger.is_empty());

    let err = h
        .contract
        .create_batch(&no_id, create_request("B1", "2026-01-15T00:00:00Z"))
        .unwrap_err();
    assert!(err.to_string().contains("hf.EnrollmentID"));
}

#[test]
fn membership_failure_blocks_transfer_and_flag() {
    let h = harness();
    let before = batch_in(&h, "B1", BatchStatus::InTransit);
    let who = Membership {
        role: Err(IdentityError::Unavailable("ca offline".to_string())),
        id: Err(IdentityError::Unavailable("ca offline".to_string())),
    };

    let err = h
        .contract
        .transfer_batch(
            &who,
            rxl_contract::TransferRequest {
                id: "B1".to_string(),
                new_owner: "pharmacy1".to_string(),
                new_status: BatchStatus::Delivered.name().to_string(),
                location: "dock".to_string(),
                temperature: 5.0,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), "IDENTITY_ERROR");

    let err = h
        .contract
        .flag_batch(&who, "B1", "excursion", "HIGH")
        .unwrap_err();
    assert_eq!(err.kind(), "IDENTITY_ERROR");

    assert_eq!(h.contract.read_batch(&regulator(), "B1").unwrap(), before);
    assert_eq!(h.ledger.len(), 1);
}
