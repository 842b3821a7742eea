//! Merging records from another vault.
//!
//! Each incoming record is matched against the existing records with
//! [`Record::is_corresponding`].  Unmatched records are offered as new;
//! matched records are offered only when strictly newer, so ties keep the
//! existing copy.

use std::fmt;

use super::record::Record;
use super::store::Vault;
use crate::errors::{Result, VaultError};

/// Why an incoming record is offered for merging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeReason {
    New,
    UpdatesExisting,
}

impl fmt::Display for MergeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::UpdatesExisting => f.write_str("updates existing"),
        }
    }
}

/// One proposed change: an incoming record and the existing record (by
/// index into the target vault's records) it would replace, if any.
#[derive(Debug, Clone)]
pub struct MergeCandidate {
    pub existing: Option<usize>,
    pub incoming: Record,
    pub reason: MergeReason,
}

impl Vault {
    /// List the records of `other` that are new or newer than their
    /// counterparts in this vault.
    pub fn merge_candidates(&self, other: &Vault) -> Vec<MergeCandidate> {
        let mut candidates = Vec::new();
        for incoming in other.records() {
            let existing = self
                .records()
                .iter()
                .position(|r| r.is_corresponding(incoming));
            match existing {
                None => candidates.push(MergeCandidate {
                    existing: None,
                    incoming: incoming.clone(),
                    reason: MergeReason::New,
                }),
                Some(index) if incoming.is_newer_than(&self.records()[index]) => {
                    candidates.push(MergeCandidate {
                        existing: Some(index),
                        incoming: incoming.clone(),
                        reason: MergeReason::UpdatesExisting,
                    })
                }
                Some(_) => {}
            }
        }
        tracing::debug!(candidates = candidates.len(), "computed merge candidates");
        candidates
    }

    /// Apply one candidate: overwrite the matched record wholesale, or
    /// append the incoming record.
    ///
    /// Candidates hold indices, so apply them against the same vault they
    /// were computed from and before removing any records.
    pub fn apply_merge(&mut self, candidate: &MergeCandidate) -> Result<()> {
        match candidate.existing {
            Some(index) => {
                let target = self.records_mut().get_mut(index).ok_or_else(|| {
                    VaultError::RecordNotFound(candidate.incoming.title().to_string())
                })?;
                target.merge_from(&candidate.incoming);
            }
            None => self.add_record(candidate.incoming.clone()),
        }
        Ok(())
    }

    /// Apply every candidate from `other`; returns how many were applied.
    pub fn merge_all(&mut self, other: &Vault) -> Result<usize> {
        let candidates = self.merge_candidates(other);
        for candidate in &candidates {
            self.apply_merge(candidate)?;
        }
        Ok(candidates.len())
    }
}
