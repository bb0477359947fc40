//! Shared fixtures for the contract integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use rxl_contract::{ContractError, CreateBatchRequest, PharmaContract, TransferRequest};
use rxl_core::{Clock, OrgRole, Timestamp};
use rxl_ledger::{InMemoryLedger, StaticIdentity};
use rxl_state::{Batch, BatchStatus};

static TRACING: Once = Once::new();

/// Route `tracing` output to the test harness. Filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Deterministic clock: returns the current instant, then advances by `step`.
#[derive(Debug)]
pub struct TestClock {
    state: Mutex<(DateTime<Utc>, Duration)>,
}

impl TestClock {
    pub fn stepping(start: &str, step_seconds: i64) -> Self {
        Self {
            state: Mutex::new((
                *ts(start).as_datetime(),
                Duration::seconds(step_seconds),
            )),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: &str) {
        self.state.lock().0 = *ts(at).as_datetime();
    }

    /// Stop (0) or resume advancing.
    pub fn set_step(&self, seconds: i64) {
        self.state.lock().1 = Duration::seconds(seconds);
    }
}

impl Clock for TestClock {
    fn now(&self) -> Timestamp {
        let mut state = self.state.lock();
        let now = state.0;
        state.0 = now + state.1;
        Timestamp::from_utc(now)
    }
}

pub fn ts(s: &str) -> Timestamp {
    Timestamp::parse(s).unwrap()
}

pub type Contract = PharmaContract<InMemoryLedger, Arc<TestClock>>;

pub struct Harness {
    pub clock: Arc<TestClock>,
    pub ledger: InMemoryLedger,
    pub contract: Contract,
}

/// A fresh ledger and service sharing one stepping clock starting
/// 2026-02-01, one second per tick.
pub fn harness() -> Harness {
    init_tracing();
    let clock = Arc::new(TestClock::stepping("2026-02-01T00:00:00Z", 1));
    let ledger = InMemoryLedger::with_clock(Arc::clone(&clock));
    let contract = PharmaContract::with_clock(ledger.clone(), Arc::clone(&clock));
    Harness {
        clock,
        ledger,
        contract,
    }
}

pub fn manufacturer() -> StaticIdentity {
    StaticIdentity::of(OrgRole::Manufacturer, "manufacturer1")
}

pub fn distributor() -> StaticIdentity {
    StaticIdentity::of(OrgRole::Distributor, "distributor1")
}

pub fn pharmacy() -> StaticIdentity {
    StaticIdentity::of(OrgRole::Pharmacy, "pharmacy1")
}

pub fn regulator() -> StaticIdentity {
    StaticIdentity::of(OrgRole::Regulator, "regulator1")
}

pub fn identity_for(role: OrgRole) -> StaticIdentity {
    match role {
        OrgRole::Manufacturer => manufacturer(),
        OrgRole::Distributor => distributor(),
        OrgRole::Pharmacy => pharmacy(),
        OrgRole::Regulator => regulator(),
    }
}

pub fn create_request(id: &str, manufactured: &str) -> CreateBatchRequest {
    CreateBatchRequest {
        id: id.to_string(),
        name: "Insulin Glargine".to_string(),
        batch_number: format!("BN-{id}"),
        manufacture_date: manufactured.to_string(),
        expiry_date: "2028-01-01T00:00:00Z".to_string(),
    }
}

/// Create a batch manufactured mid-January 2026.
pub fn create(h: &Harness, id: &str) -> Batch {
    h.contract
        .create_batch(&manufacturer(), create_request(id, "2026-01-15T00:00:00Z"))
        .unwrap()
}

pub fn transfer(
    h: &Harness,
    who: &StaticIdentity,
    id: &str,
    owner: &str,
    status: BatchStatus,
    temperature: f64,
) -> Result<Batch, ContractError> {
    h.contract.transfer_batch(
        who,
        TransferRequest {
            id: id.to_string(),
            new_owner: owner.to_string(),
            new_status: status.name().to_string(),
            location: format!("{owner} warehouse"),
            temperature,
        },
    )
}

/// Drive a fresh batch into `status` through the public operations.
///
/// `Expired` is not reachable through transfers; it is written directly.
pub fn batch_in(h: &Harness, id: &str, status: BatchStatus) -> Batch {
    let path = match status {
        BatchStatus::Manufactured | BatchStatus::Flagged | BatchStatus::Expired => vec![],
        BatchStatus::InTransit => vec![(OrgRole::Manufacturer, "distributor1", BatchStatus::InTransit)],
        BatchStatus::Delivered => vec![
            (OrgRole::Manufacturer, "distributor1", BatchStatus::InTransit),
            (OrgRole::Distributor, "distributor1", BatchStatus::Delivered),
        ],
        BatchStatus::Sold => vec![
            (OrgRole::Manufacturer, "distributor1", BatchStatus::InTransit),
            (OrgRole::Distributor, "pharmacy1", BatchStatus::Delivered),
            (OrgRole::Pharmacy, "customer1", BatchStatus::Sold),
        ],
    };
    let mut batch = create(h, id);
    for (role, owner, next) in path {
        batch = transfer(h, &identity_for(role), id, owner, next, 5.0).unwrap();
    }
    match status {
        BatchStatus::Flagged => {
            h.contract
                .flag_batch(&regulator(), id, "quarantine", "HIGH")
                .unwrap();
        }
        BatchStatus::Expired => {
            let mut json = serde_json::to_value(&batch).unwrap();
            json["status"] = serde_json::json!("Expired");
            rxl_ledger::BatchRepository::put(&h.ledger, id, serde_json::to_vec(&json).unwrap())
                .unwrap();
        }
        _ => {}
    }
    h.contract.read_batch(&regulator(), id).unwrap()
}
