//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Only compiled for tests or with the `test-support` feature.

use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;
use serde_json::json;

use crate::domain::{Design, DesignDraft, DesignId, NewDesign, UserId};

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

/// Fixed instant used as "now" by fixtures.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).single() {
        Some(ts) => ts,
        None => panic!("valid fixture timestamp"),
    }
}

/// Parse a user id or panic.
pub fn user(raw: &str) -> UserId {
    match UserId::new(raw) {
        Ok(id) => id,
        Err(err) => panic!("invalid fixture user id {raw}: {err}"),
    }
}

/// Parse a design id or panic.
pub fn design_id(raw: &str) -> DesignId {
    match DesignId::new(raw) {
        Ok(id) => id,
        Err(err) => panic!("invalid fixture design id {raw}: {err}"),
    }
}

/// Draft of an empty public vector design owned by `owner`.
pub fn vector_draft(owner: &str, title: &str) -> NewDesign {
    let draft = DesignDraft {
        title: Some(title.to_owned()),
        owner_id: Some(owner.to_owned()),
        design_type: Some("svg".to_owned()),
        components: Some(json!({ "body": "round", "ears": "pointy" })),
        is_public: Some(true),
        ..DesignDraft::default()
    };
    match NewDesign::parse(draft) {
        Ok(design) => design,
        Err(err) => panic!("invalid fixture draft: {err}"),
    }
}

/// Stored vector design with the given id, owner and age in seconds before
/// [`fixture_timestamp`].
pub fn vector_design(id: &str, owner: &str, age_secs: i64) -> Design {
    Design::from_new(
        design_id(id),
        vector_draft(owner, id),
        fixture_timestamp() - TimeDelta::seconds(age_secs),
    )
}
