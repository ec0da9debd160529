//! Petition records and their triage state.
//!
//! The store holds the only mutable copy of each petition; the ledger keeps
//! an immutable snapshot taken at submission time. Status and feedback
//! changes touch the store alone and are never chained.

use std::collections::BTreeMap;

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum PetitionError {
    #[error("unknown petition {id}")]
    UnknownPetition { id: String },
}

/// Broad classification used for triage and dashboards.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PetitionCategory {
    Corruption,
    HumanRights,
    Environmental,
    Fraud,
    Other,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PetitionStatus {
    Submitted,
    Verified,
    Resolved,
}

/// Raw GPS fix captured at submission time.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Administrative location resolved by the front end's lookup tables.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailedLocation {
    pub district: String,
    pub block_or_taluk: String,
    pub panchayat_or_village: String,
}

/// Submission payload accepted from the front end.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PetitionDraft {
    pub title: String,
    pub description: String,
    pub category: PetitionCategory,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub detailed_location: Option<DetailedLocation>,
}

/// A citizen petition with its triage state.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Petition {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: PetitionCategory,
    /// Submission time in Unix milliseconds.
    pub created_at: u64,
    pub status: PetitionStatus,
    pub location: Option<Location>,
    pub detailed_location: Option<DetailedLocation>,
    pub admin_feedback: Option<String>,
}

/// Mutable petition records, keyed by id.
#[derive(Debug, Default)]
pub struct PetitionStore {
    petitions: BTreeMap<String, Petition>,
}

impl PetitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new petition with a fresh id and `Submitted` status.
    ///
    /// The clock is supplied by the caller so submission flows and tests
    /// control it alike.
    pub fn submit(&mut self, draft: PetitionDraft, now_ms: u64) -> Petition {
        let petition = Petition {
            id: fresh_petition_id(now_ms),
            title: draft.title,
            description: draft.description,
            category: draft.category,
            created_at: now_ms,
            status: PetitionStatus::Submitted,
            location: draft.location,
            detailed_location: draft.detailed_location,
            admin_feedback: None,
        };
        self.petitions
            .insert(petition.id.clone(), petition.clone());
        petition
    }

    pub fn update_status(
        &mut self,
        id: &str,
        status: PetitionStatus,
    ) -> Result<(), PetitionError> {
        let petition = self
            .petitions
            .get_mut(id)
            .ok_or_else(|| PetitionError::UnknownPetition { id: id.to_string() })?;
        petition.status = status;
        Ok(())
    }

    pub fn add_feedback(&mut self, id: &str, feedback: &str) -> Result<(), PetitionError> {
        let petition = self
            .petitions
            .get_mut(id)
            .ok_or_else(|| PetitionError::UnknownPetition { id: id.to_string() })?;
        petition.admin_feedback = Some(feedback.to_string());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&Petition> {
        self.petitions.get(id)
    }

    /// Petitions in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &Petition> {
        self.petitions.values()
    }

    pub fn len(&self) -> usize {
        self.petitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.petitions.is_empty()
    }
}

/// `pet-<millis>-<random>` ids, distinct even for same-millisecond
/// submissions.
fn fresh_petition_id(now_ms: u64) -> String {
    let mut suffix = [0u8; 6];
    OsRng.fill_bytes(&mut suffix);
    format!("pet-{}-{}", now_ms, hex::encode(suffix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Ledger;

    fn draft(title: &str) -> PetitionDraft {
        PetitionDraft {
            title: title.to_string(),
            description: "details".to_string(),
            category: PetitionCategory::Corruption,
            location: Some(Location {
                latitude: 11.22,
                longitude: 78.17,
            }),
            detailed_location: None,
        }
    }

    #[test]
    fn submit_assigns_fresh_ids_and_submitted_status() {
        let mut store = PetitionStore::new();
        let first = store.submit(draft("one"), 1_000);
        let second = store.submit(draft("two"), 1_000);
        assert!(first.id.starts_with("pet-1000-"));
        assert_ne!(first.id, second.id);
        assert_eq!(first.status, PetitionStatus::Submitted);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn triage_updates_touch_only_the_addressed_record() {
        let mut store = PetitionStore::new();
        let target = store.submit(draft("one"), 1_000);
        let other = store.submit(draft("two"), 2_000);
        store
            .update_status(&target.id, PetitionStatus::Verified)
            .unwrap();
        store.add_feedback(&target.id, "under review").unwrap();
        assert_eq!(
            store.get(&target.id).unwrap().status,
            PetitionStatus::Verified
        );
        assert_eq!(
            store.get(&target.id).unwrap().admin_feedback.as_deref(),
            Some("under review")
        );
        assert_eq!(store.get(&other.id).unwrap().status, PetitionStatus::Submitted);
        assert_eq!(store.get(&other.id).unwrap().admin_feedback, None);
    }

    #[test]
    fn unknown_ids_are_rejected() {
        let mut store = PetitionStore::new();
        let err = store
            .update_status("pet-missing", PetitionStatus::Resolved)
            .unwrap_err();
        assert!(matches!(err, PetitionError::UnknownPetition { .. }));
        assert!(store.add_feedback("pet-missing", "n/a").is_err());
    }

    #[test]
    fn submitted_petitions_chain_into_the_ledger() {
        let mut store = PetitionStore::new();
        let mut ledger = Ledger::new();
        for (i, title) in ["one", "two", "three"].iter().enumerate() {
            let petition = store.submit(draft(title), 1_000 + i as u64);
            ledger
                .append(&petition.id, petition.created_at, &petition)
                .unwrap();
        }
        assert_eq!(ledger.len(), 3);
        assert!(ledger.verify().valid);
        // Triage afterwards mutates the store but never the chain.
        let id = store.iter().next().unwrap().id.clone();
        store.update_status(&id, PetitionStatus::Resolved).unwrap();
        assert_eq!(ledger.len(), 3);
        assert!(ledger.verify().valid);
    }
}
