use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

static ENTRIES_SUBMITTED: AtomicU64 = AtomicU64::new(0);
static ENTRIES_APPROVED: AtomicU64 = AtomicU64::new(0);
static ENTRIES_REJECTED: AtomicU64 = AtomicU64::new(0);
static ENTRIES_EDITED: AtomicU64 = AtomicU64::new(0);
static ENTRIES_DELETED: AtomicU64 = AtomicU64::new(0);
static PARTICIPANTS_REGISTERED: AtomicU64 = AtomicU64::new(0);
static PARTICIPANTS_DELETED: AtomicU64 = AtomicU64::new(0);
static EXTRACTIONS_RUN: AtomicU64 = AtomicU64::new(0);
static EXTRACTIONS_EMPTY: AtomicU64 = AtomicU64::new(0);
static LAST_ERROR_TS: AtomicI64 = AtomicI64::new(0);

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub entries_submitted: u64,
    pub entries_approved: u64,
    pub entries_rejected: u64,
    pub entries_edited: u64,
    pub entries_deleted: u64,
    pub participants_registered: u64,
    pub participants_deleted: u64,
    pub extractions_run: u64,
    pub extractions_empty: u64,
    pub last_error_ts: i64,
}

pub fn inc_entries_submitted() {
    ENTRIES_SUBMITTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_entries_approved() {
    ENTRIES_APPROVED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_entries_rejected() {
    ENTRIES_REJECTED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_entries_edited() {
    ENTRIES_EDITED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_entries_deleted() {
    ENTRIES_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_participants_registered() {
    PARTICIPANTS_REGISTERED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_participants_deleted() {
    PARTICIPANTS_DELETED.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_extractions_run() {
    EXTRACTIONS_RUN.fetch_add(1, Ordering::Relaxed);
}

pub fn inc_extractions_empty() {
    EXTRACTIONS_EMPTY.fetch_add(1, Ordering::Relaxed);
}

pub fn set_last_error_ts(ts: i64) {
    LAST_ERROR_TS.store(ts, Ordering::Relaxed);
}

pub fn snapshot() -> MetricsSnapshot {
    MetricsSnapshot {
        entries_submitted: ENTRIES_SUBMITTED.load(Ordering::Relaxed),
        entries_approved: ENTRIES_APPROVED.load(Ordering::Relaxed),
        entries_rejected: ENTRIES_REJECTED.load(Ordering::Relaxed),
        entries_edited: ENTRIES_EDITED.load(Ordering::Relaxed),
        entries_deleted: ENTRIES_DELETED.load(Ordering::Relaxed),
        participants_registered: PARTICIPANTS_REGISTERED.load(Ordering::Relaxed),
        participants_deleted: PARTICIPANTS_DELETED.load(Ordering::Relaxed),
        extractions_run: EXTRACTIONS_RUN.load(Ordering::Relaxed),
        extractions_empty: EXTRACTIONS_EMPTY.load(Ordering::Relaxed),
        last_error_ts: LAST_ERROR_TS.load(Ordering::Relaxed),
    }
}
