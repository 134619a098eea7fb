//! Update-set planning.
//!
//! The planner turns the change records of one publish cycle into an
//! [`UpdateData`] snapshot for a single scope: which documents to extract
//! and upsert, and which to delete. Dependency chains are expanded here,
//! at planning time, so the extraction context each factory sees is fixed
//! before any worker starts.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use vfsearch_core::{
    ChangeRecord, ChangeState, DependencyChain, DependencyResolver, PlanError, PlannedDocument,
    Repository, ResourceFilter, ResourceRecord, SourceScope, UpdateData, VfsResource,
};

use crate::identity::{identify, TypeRegistry};

/// Plans the update set for one scope from a slice of change records.
///
/// Planning is read-only against the repository and touches the index
/// writer not at all. The only failure mode is an unreadable backing
/// store, surfaced as [`PlanError::Read`]; the caller logs it and moves
/// on to its next scope.
pub struct UpdatePlanner {
    repository: Arc<dyn Repository>,
    resolver: Arc<dyn DependencyResolver>,
    types: TypeRegistry,
}

impl UpdatePlanner {
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository>,
        resolver: Arc<dyn DependencyResolver>,
        types: TypeRegistry,
    ) -> Self {
        Self {
            repository,
            resolver,
            types,
        }
    }

    /// Plan the update set for `scope`.
    ///
    /// Change records outside the scope's roots are ignored. Every chain
    /// member is planned at most once even when several change records
    /// map into the same chain. A chain is always walked in full, even
    /// when the only listed member is the deleted one: the surviving
    /// members must be reindexed so their persisted context drops the
    /// vanished sibling. Deleted members are never extracted and bypass
    /// the scope's type/mime filters; their prior index entries must go
    /// away regardless of what the filters say today.
    pub async fn plan_update(
        &self,
        scope: &SourceScope,
        changes: &[ChangeRecord],
    ) -> Result<UpdateData, PlanError> {
        let in_scope: Vec<&ChangeRecord> =
            changes.iter().filter(|c| scope.contains(&c.path)).collect();

        // Change state by path; chain members without a record default to
        // Modified when classified below.
        let state_by_path: HashMap<PathBuf, ChangeState> = in_scope
            .iter()
            .map(|c| (c.path.clone(), c.state))
            .collect();

        let mut data = UpdateData::empty(scope.name.clone());
        let mut planned: HashSet<PathBuf> = HashSet::new();

        for change in in_scope {
            if planned.contains(&change.path) {
                continue;
            }

            // A deleted resource cannot be read back; a tombstone built
            // from the change record carries enough (the path) for both
            // the delete and the chain lookup.
            let record = if change.state == ChangeState::Deleted {
                tombstone(change)
            } else {
                self.repository
                    .read_resource(&change.path)
                    .await
                    .map_err(|source| PlanError::Read {
                        scope: scope.name.clone(),
                        source,
                    })?
            };

            let chain_records = if change.state == ChangeState::Deleted {
                // The parent folder may be gone along with the file;
                // degrade to the bare tombstone instead of losing the
                // delete with the scope.
                self.expand_chain(scope, &record)
                    .await
                    .unwrap_or_else(|_| vec![record.clone()])
            } else {
                self.expand_chain(scope, &record).await?
            };
            let context = DependencyChain {
                members: chain_records
                    .iter()
                    .filter(|m| state_by_path.get(&m.path()) != Some(&ChangeState::Deleted))
                    .map(|m| identify(m, &self.types))
                    .collect(),
            };

            for member in chain_records {
                let path = member.path();
                if !planned.insert(path.clone()) {
                    continue;
                }
                let identity = identify(&member, &self.types);
                if state_by_path.get(&path) == Some(&ChangeState::Deleted) {
                    data.to_delete.push(identity);
                } else if scope.accepts(&identity) {
                    data.to_update.push(PlannedDocument {
                        record: member,
                        identity,
                        context: context.clone(),
                    });
                }
            }
        }

        debug!(
            scope = %scope.name,
            updates = data.to_update.len(),
            deletes = data.to_delete.len(),
            "planned update set"
        );
        Ok(data)
    }

    /// Expand a changed record into its dependency chain.
    ///
    /// Siblings come from one listing of the parent folder; members the
    /// repository still lists but that this cycle deletes are classified
    /// by the caller, not filtered out here.
    async fn expand_chain(
        &self,
        scope: &SourceScope,
        record: &ResourceRecord,
    ) -> Result<Vec<ResourceRecord>, PlanError> {
        if !self.resolver.supports_dependencies() {
            return Ok(vec![record.clone()]);
        }
        let Some(parent) = record.path().parent().map(PathBuf::from) else {
            return Ok(vec![record.clone()]);
        };

        let listing = self
            .repository
            .list_resources(&parent, &ResourceFilter::files_ignore_expiration())
            .await
            .map_err(|source| PlanError::Read {
                scope: scope.name.clone(),
                source,
            })?;
        let siblings: Vec<ResourceRecord> = listing
            .into_iter()
            .filter(|r| r.path().parent() == Some(parent.as_path()))
            .collect();

        Ok(self.resolver.resolve(record, &siblings))
    }
}

/// Placeholder record for a deleted path. The path drives both the delete
/// and the chain lookup; the type id is a throwaway.
fn tombstone(change: &ChangeRecord) -> ResourceRecord {
    ResourceRecord::Vfs(VfsResource {
        id: change.id,
        path: change.path.clone(),
        type_id: 0,
        is_folder: false,
        released: None,
        expires: None,
    })
}
