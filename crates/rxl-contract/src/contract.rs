//! # Pharma Contract
//!
//! The operation surface. Every operation resolves the caller through the
//! [`IdentityProvider`] it is handed, reads from the [`BatchRepository`],
//! checks roles and transitions, and commits one write set. The service
//! itself holds no state between invocations beyond its collaborators and
//! configuration.
//!
//! ## Ordering
//!
//! Authorization and validation run before anything is written. A write
//! set either commits whole or not at all, and updates are conditional on
//! the version read, so a concurrent writer surfaces as
//! `StoreError::VersionConflict` rather than a lost update.
//!
//! ## Identifiers
//!
//! Creation validates the batch id strictly. Lookup operations treat an id
//! that could never name a batch (empty, or under the flag prefix) as
//! absent.

use rxl_compliance::{
    ComplianceConfig, ComplianceEngine, ComplianceReport, Flag, ReportPeriod, Severity,
};
use rxl_core::{BatchId, CallerRole, Clock, OrgRole, PartyId, SystemClock, Timestamp};
use rxl_ledger::{
    BatchRepository, IdentityProvider, Precondition, SearchCriteria, Selector, StoreError,
    Version, Write,
};
use rxl_state::{
    latest_record_per_version, require_role, AuthorizationError, AuthorizationGuard, Batch,
    BatchStatus, CustodyRecord, NewBatch, Transfer, TransferError,
};
use serde::{Deserialize, Serialize};

use crate::codec::{decode, decode_batches, encode, is_flag_key};
use crate::error::ContractError;

// ─── Requests ────────────────────────────────────────────────────────

/// Inputs of `create_batch`, as received on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    /// Ledger key for the new batch.
    pub id: String,
    /// Product name.
    pub name: String,
    /// Manufacturer's batch number.
    pub batch_number: String,
    /// RFC 3339 manufacture date.
    pub manufacture_date: String,
    /// RFC 3339 expiry date.
    pub expiry_date: String,
}

/// Inputs of `transfer_batch`, as received on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    /// Batch to transfer.
    pub id: String,
    /// Receiving party.
    pub new_owner: String,
    /// Requested status name.
    pub new_status: String,
    /// Location reported with the handover.
    pub location: String,
    /// Handover temperature in degrees Celsius.
    pub temperature: f64,
}

// ─── Caller ──────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Caller {
    role: CallerRole,
    id: PartyId,
}

fn resolve_caller(identity: &dyn IdentityProvider) -> Result<Caller, ContractError> {
    let role = CallerRole::resolve(&identity.caller_role()?);
    let id = PartyId::new(identity.caller_id()?);
    Ok(Caller { role, id })
}

fn denied(caller: &Caller, err: AuthorizationError) -> ContractError {
    tracing::warn!(caller = %caller.id, role = %caller.role, error = %err, "authorization denied");
    ContractError::Authorization(err)
}

fn authorize(
    caller: &Caller,
    required: OrgRole,
    operation: &'static str,
) -> Result<(), ContractError> {
    require_role(&caller.role, required, operation).map_err(|e| denied(caller, e))
}

fn parse_timestamp(field: &str, raw: &str) -> Result<Timestamp, ContractError> {
    Timestamp::parse(raw).map_err(|e| ContractError::invalid(field, e))
}

// ─── Service ─────────────────────────────────────────────────────────

/// The batch custody and compliance service.
#[derive(Debug, Clone)]
pub struct PharmaContract<R, C = SystemClock> {
    repository: R,
    clock: C,
    guard: AuthorizationGuard,
    engine: ComplianceEngine,
}

impl<R: BatchRepository> PharmaContract<R, SystemClock> {
    /// A service on wall-clock time with the default compliance config.
    pub fn new(repository: R) -> Self {
        Self::with_clock(repository, SystemClock)
    }
}

impl<R: BatchRepository, C: Clock> PharmaContract<R, C> {
    /// A service reading time from `clock`, with the default compliance config.
    pub fn with_clock(repository: R, clock: C) -> Self {
        Self {
            repository,
            clock,
            guard: AuthorizationGuard::standard(),
            engine: ComplianceEngine::default(),
        }
    }

    /// A service with an explicit compliance configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::Validation`] if the config is inconsistent.
    pub fn with_config(
        repository: R,
        clock: C,
        config: ComplianceConfig,
    ) -> Result<Self, ContractError> {
        config.validate()?;
        Ok(Self {
            engine: ComplianceEngine::new(config),
            ..Self::with_clock(repository, clock)
        })
    }

    /// The underlying store.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// The active compliance configuration.
    pub fn config(&self) -> &ComplianceConfig {
        self.engine.config()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Create a batch owned by the calling manufacturer.
    pub fn create_batch(
        &self,
        identity: &dyn IdentityProvider,
        request: CreateBatchRequest,
    ) -> Result<Batch, ContractError> {
        let caller = resolve_caller(identity)?;
        authorize(&caller, OrgRole::Manufacturer, "create a batch")?;

        let id = BatchId::new(request.id).map_err(|e| ContractError::invalid("id", e))?;
        let manufacture_date = parse_timestamp("manufactureDate", &request.manufacture_date)?;
        let expiry_date = parse_timestamp("expiryDate", &request.expiry_date)?;

        if self.repository.get(id.as_str())?.is_some() {
            return Err(ContractError::Conflict(format!("batch {id} already exists")));
        }

        let batch = Batch::create(
            NewBatch {
                id,
                name: request.name,
                batch_number: request.batch_number,
                manufacture_date,
                expiry_date,
            },
            caller.id.clone(),
            self.clock.now(),
        );
        let key = batch.id.as_str();
        self.repository
            .commit(&[Write::create(key, encode(key, &batch)?)])
            .map_err(|e| match e {
                StoreError::VersionConflict {
                    expected: Precondition::Absent,
                    ..
                } => ContractError::Conflict(format!("batch {} already exists", batch.id)),
                other => other.into(),
            })?;

        tracing::info!(batch = %batch.id, caller = %caller.id, "batch created");
        Ok(batch)
    }

    /// Move a batch to a new owner and status, recording a reading.
    pub fn transfer_batch(
        &self,
        identity: &dyn IdentityProvider,
        request: TransferRequest,
    ) -> Result<Batch, ContractError> {
        let caller = resolve_caller(identity)?;
        let new_status = BatchStatus::parse(&request.new_status).ok_or_else(|| {
            ContractError::invalid(
                "newStatus",
                format!("unknown status {:?}", request.new_status),
            )
        })?;
        let (mut batch, version) = self.load(&request.id)?;
        let from = batch.status();

        batch
            .apply_transfer(
                &self.guard,
                &caller.role,
                Transfer {
                    new_owner: PartyId::new(request.new_owner),
                    new_status,
                    location: request.location,
                    temperature: request.temperature,
                },
                self.clock.now(),
            )
            .map_err(|e| match e {
                TransferError::Unauthorized(auth) => denied(&caller, auth),
                other => other.into(),
            })?;

        let key = batch.id.as_str();
        self.repository
            .commit(&[Write::update(key, encode(key, &batch)?, version)])?;

        tracing::info!(
            batch = %batch.id,
            caller = %caller.id,
            from = %from,
            to = %new_status,
            owner = %batch.current_owner(),
            "batch transferred"
        );
        Ok(batch)
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Point lookup.
    pub fn read_batch(
        &self,
        identity: &dyn IdentityProvider,
        id: &str,
    ) -> Result<Batch, ContractError> {
        let caller = resolve_caller(identity)?;
        let (batch, _) = self.load(id)?;
        tracing::debug!(batch = id, caller = %caller.id, "batch read");
        Ok(batch)
    }

    /// Whether a batch exists under `id`.
    pub fn batch_exists(
        &self,
        identity: &dyn IdentityProvider,
        id: &str,
    ) -> Result<bool, ContractError> {
        resolve_caller(identity)?;
        if BatchId::new(id).is_err() {
            return Ok(false);
        }
        Ok(self.repository.get(id)?.is_some())
    }

    /// Every batch in the ledger, in key order.
    pub fn list_all_batches(
        &self,
        identity: &dyn IdentityProvider,
    ) -> Result<Vec<Batch>, ContractError> {
        let caller = resolve_caller(identity)?;
        let batches = self.all_batches()?;
        tracing::debug!(caller = %caller.id, count = batches.len(), "batches listed");
        Ok(batches)
    }

    /// Batches matching a selector predicate.
    pub fn query_batches(
        &self,
        identity: &dyn IdentityProvider,
        predicate: &str,
    ) -> Result<Vec<Batch>, ContractError> {
        let caller = resolve_caller(identity)?;
        let selector = Selector::parse(predicate)?;
        let batches = decode_batches(self.repository.query(&selector)?)?;
        tracing::debug!(caller = %caller.id, count = batches.len(), "batches queried");
        Ok(batches)
    }

    /// Batches matching structured search criteria.
    pub fn search_batches(
        &self,
        identity: &dyn IdentityProvider,
        criteria: &SearchCriteria,
    ) -> Result<Vec<Batch>, ContractError> {
        let caller = resolve_caller(identity)?;
        let batches = decode_batches(self.repository.query(&criteria.to_selector())?)?;
        tracing::debug!(caller = %caller.id, count = batches.len(), "batches searched");
        Ok(batches)
    }

    /// The head custody record of each persisted version of a batch,
    /// oldest first. Deleted versions are skipped.
    pub fn get_batch_history(
        &self,
        identity: &dyn IdentityProvider,
        id: &str,
    ) -> Result<Vec<CustodyRecord>, ContractError> {
        let caller = resolve_caller(identity)?;
        if BatchId::new(id).is_err() {
            return Err(ContractError::batch_not_found(id));
        }
        let versions = self
            .repository
            .history_of(id)?
            .into_iter()
            .filter(|entry| !entry.is_deleted)
            .map(|entry| decode::<Batch>(id, &entry.bytes))
            .collect::<Result<Vec<_>, _>>()?;
        if versions.is_empty() {
            return Err(ContractError::batch_not_found(id));
        }
        let records = latest_record_per_version(&versions);
        tracing::debug!(batch = id, caller = %caller.id, versions = records.len(), "history read");
        Ok(records)
    }

    // ── Compliance ───────────────────────────────────────────────────

    /// Record a regulator flag. A flag at or above the quarantine severity
    /// also sets the batch status to `Flagged`; both writes commit together.
    pub fn flag_batch(
        &self,
        identity: &dyn IdentityProvider,
        batch_id: &str,
        reason: &str,
        severity: &str,
    ) -> Result<Flag, ContractError> {
        let caller = resolve_caller(identity)?;
        authorize(&caller, OrgRole::Regulator, "flag a batch")?;
        let severity = Severity::parse(severity).map_err(|e| ContractError::invalid("severity", e))?;
        let (mut batch, version) = self.load(batch_id)?;

        let flagged_at = self.clock.now();
        let key = self.free_flag_key(&batch.id, &flagged_at)?;
        let flag = Flag::new(
            key,
            batch.id.clone(),
            reason.to_string(),
            severity,
            OrgRole::Regulator,
            flagged_at,
        );

        let mut writes = vec![Write::create(flag.id.as_str(), encode(&flag.id, &flag)?)];
        let quarantined = self.engine.flag_quarantines(severity);
        if quarantined {
            batch.mark_flagged();
            let batch_key = batch.id.as_str();
            writes.push(Write::update(batch_key, encode(batch_key, &batch)?, version));
        }
        self.repository.commit(&writes)?;

        tracing::info!(
            batch = %batch.id,
            flag = %flag.id,
            severity = %severity,
            quarantined,
            caller = %caller.id,
            "batch flagged"
        );
        Ok(flag)
    }

    /// All flags recorded for a batch, oldest first.
    pub fn get_batch_flags(
        &self,
        identity: &dyn IdentityProvider,
        batch_id: &str,
    ) -> Result<Vec<Flag>, ContractError> {
        let caller = resolve_caller(identity)?;
        authorize(&caller, OrgRole::Regulator, "read batch flags")?;
        let (batch, _) = self.load(batch_id)?;

        let mut flags = self
            .repository
            .query(&Selector::field_eq("batchId", batch.id.as_str()))?
            .into_iter()
            .filter(|(key, _)| is_flag_key(key))
            .map(|(key, bytes)| decode::<Flag>(&key, &bytes))
            .collect::<Result<Vec<_>, _>>()?;
        flags.sort_by(|a, b| a.flagged_at.cmp(&b.flagged_at).then_with(|| a.id.cmp(&b.id)));
        tracing::debug!(batch = batch_id, caller = %caller.id, count = flags.len(), "flags read");
        Ok(flags)
    }

    /// Compliance of the batches an organization currently holds.
    ///
    /// The period is validated and echoed in the report; it does not narrow
    /// the selection.
    pub fn generate_compliance_report(
        &self,
        identity: &dyn IdentityProvider,
        start: &str,
        end: &str,
        organization_id: &str,
    ) -> Result<ComplianceReport, ContractError> {
        let caller = resolve_caller(identity)?;
        authorize(&caller, OrgRole::Regulator, "generate a compliance report")?;
        let period = ReportPeriod {
            start: parse_timestamp("startDate", start)?,
            end: parse_timestamp("endDate", end)?,
        };

        let holdings = decode_batches(
            self.repository
                .query(&Selector::field_eq("currentOwner", organization_id))?,
        )?;
        Ok(self
            .engine
            .build_report(organization_id, period, &holdings, &self.clock.now()))
    }

    /// Batches manufactured strictly inside the window with at least one
    /// out-of-range reading.
    pub fn get_temperature_violations(
        &self,
        identity: &dyn IdentityProvider,
        start: &str,
        end: &str,
    ) -> Result<Vec<Batch>, ContractError> {
        let caller = resolve_caller(identity)?;
        authorize(&caller, OrgRole::Regulator, "read temperature violations")?;
        let start = parse_timestamp("startDate", start)?;
        let end = parse_timestamp("endDate", end)?;

        let hits = self
            .engine
            .temperature_violations(self.all_batches()?, &start, &end);
        tracing::debug!(caller = %caller.id, count = hits.len(), "temperature violations read");
        Ok(hits)
    }

    // ── Internals ────────────────────────────────────────────────────

    fn load(&self, id: &str) -> Result<(Batch, Version), ContractError> {
        if BatchId::new(id).is_err() {
            return Err(ContractError::batch_not_found(id));
        }
        let stored = self
            .repository
            .get(id)?
            .ok_or_else(|| ContractError::batch_not_found(id))?;
        Ok((decode(id, &stored.bytes)?, stored.version))
    }

    fn all_batches(&self) -> Result<Vec<Batch>, ContractError> {
        decode_batches(self.repository.scan_all()?)
    }

    fn free_flag_key(&self, batch_id: &BatchId, at: &Timestamp) -> Result<String, ContractError> {
        for key in Flag::key_candidates(batch_id, at) {
            if self.repository.get(&key)?.is_none() {
                return Ok(key);
            }
        }
        Err(ContractError::Conflict(format!(
            "no free flag key for batch {batch_id}"
        )))
    }
}
