//! Full-rebuild traversal.
//!
//! Walks every root of a scope, plans all listed resources (release and
//! expiry windows ignored; a rebuild reconstructs the whole index), and
//! feeds the result through the scheduler. Unreadable roots are skipped
//! with a warning so one dead mount cannot sink the rest of the rebuild.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use vfsearch_core::{
    DependencyChain, DependencyResolver, PlannedDocument, ReportSink, Repository, ResourceFilter,
    ResourceRecord, Severity, SourceScope, UpdateData,
};

use crate::identity::{identify, TypeRegistry};
use crate::scheduler::{IndexScheduler, RunStatistics};

/// Plans and executes a full rebuild of one scope.
pub struct RebuildTraversal {
    repository: Arc<dyn Repository>,
    resolver: Arc<dyn DependencyResolver>,
    types: TypeRegistry,
    report: Arc<dyn ReportSink>,
}

impl RebuildTraversal {
    #[must_use]
    pub fn new(
        repository: Arc<dyn Repository>,
        resolver: Arc<dyn DependencyResolver>,
        types: TypeRegistry,
        report: Arc<dyn ReportSink>,
    ) -> Self {
        Self {
            repository,
            resolver,
            types,
            report,
        }
    }

    /// Rebuild the index for `scope` through `scheduler`.
    ///
    /// Every accepted resource is submitted exactly once, in listing
    /// order, with its dependency context resolved from its folder
    /// siblings. Ends with a flush and a segment merge.
    pub async fn rebuild(&self, scope: &SourceScope, scheduler: &IndexScheduler) -> RunStatistics {
        let mut data = UpdateData::empty(scope.name.clone());
        let mut planned: HashSet<PathBuf> = HashSet::new();

        for root in &scope.roots {
            let listing = match self
                .repository
                .list_resources(root, &ResourceFilter::files_ignore_expiration())
                .await
            {
                Ok(listing) => listing,
                Err(e) => {
                    self.report.println(
                        &format!("skipping unreadable root {}: {e}", root.display()),
                        Severity::Warn,
                    );
                    continue;
                }
            };
            info!(root = %root.display(), resources = listing.len(), "listed rebuild root");

            // Sibling slices come from one pass over the listing
            let by_folder = group_by_folder(&listing);

            for resource in &listing {
                if planned.contains(&resource.path()) {
                    continue;
                }
                let siblings = resource
                    .path()
                    .parent()
                    .and_then(|parent| by_folder.get(parent))
                    .map(Vec::as_slice)
                    .unwrap_or_default();
                let chain = self.resolver.resolve(resource, siblings);
                let context = DependencyChain {
                    members: chain.iter().map(|m| identify(m, &self.types)).collect(),
                };

                for member in chain {
                    if !planned.insert(member.path()) {
                        continue;
                    }
                    let identity = identify(&member, &self.types);
                    if scope.accepts(&identity) {
                        data.to_update.push(PlannedDocument {
                            record: member,
                            identity,
                            context: context.clone(),
                        });
                    }
                }
            }
        }

        let stats = scheduler.run(&data).await;
        scheduler.optimize().await;
        stats
    }
}

fn group_by_folder(listing: &[ResourceRecord]) -> HashMap<PathBuf, Vec<ResourceRecord>> {
    let mut by_folder: HashMap<PathBuf, Vec<ResourceRecord>> = HashMap::new();
    for resource in listing {
        if let Some(parent) = resource.path().parent() {
            by_folder
                .entry(parent.to_path_buf())
                .or_default()
                .push(resource.clone());
        }
    }
    by_folder
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dependency::{LocaleVariantResolver, SingletonResolver};
    use crate::report::CapturingReport;
    use crate::repository::MemoryRepository;
    use crate::scheduler::SchedulerConfig;
    use async_trait::async_trait;
    use chrono::{Duration, Utc};
    use std::path::Path;
    use uuid::Uuid;
    use vfsearch_core::{
        DocumentFactory, DocumentPayload, ExtractError, VfsResource,
    };
    use vfsearch_extract::FactoryRegistry;
    use vfsearch_store::{MemoryIndexWriter, WriteOp};

    struct EchoFactory;

    #[async_trait]
    impl DocumentFactory for EchoFactory {
        fn can_produce(&self, _type_id: u32, _mime: Option<&str>) -> bool {
            true
        }

        async fn produce(
            &self,
            record: &ResourceRecord,
            context: &DependencyChain,
        ) -> Result<DocumentPayload, ExtractError> {
            Ok(DocumentPayload::new()
                .with("content", record.name())
                .with("chain", context.len().to_string()))
        }
    }

    fn vfs(path: &str, type_id: u32) -> ResourceRecord {
        ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from(path),
            type_id,
            is_folder: false,
            released: None,
            expires: None,
        })
    }

    struct Fixture {
        repo: Arc<MemoryRepository>,
        writer: Arc<MemoryIndexWriter>,
        report: Arc<CapturingReport>,
        scheduler: IndexScheduler,
    }

    fn fixture(resolver: Arc<dyn DependencyResolver>) -> (RebuildTraversal, Fixture) {
        let repo = Arc::new(MemoryRepository::new());
        let writer = Arc::new(MemoryIndexWriter::new());
        let report = Arc::new(CapturingReport::new());
        let mut factories = FactoryRegistry::new();
        factories.register("echo", EchoFactory);
        let scheduler = IndexScheduler::new(
            Arc::clone(&writer) as Arc<dyn vfsearch_core::IndexWriter>,
            Arc::new(factories),
            Arc::clone(&report) as Arc<dyn ReportSink>,
            SchedulerConfig::default(),
        );
        let traversal = RebuildTraversal::new(
            Arc::clone(&repo) as Arc<dyn Repository>,
            resolver,
            TypeRegistry::new(),
            Arc::clone(&report) as Arc<dyn ReportSink>,
        );
        (
            traversal,
            Fixture {
                repo,
                writer,
                report,
                scheduler,
            },
        )
    }

    fn scope(roots: &[&str]) -> SourceScope {
        SourceScope::new("site", roots.iter().map(PathBuf::from).collect())
    }

    #[tokio::test]
    async fn test_rebuild_indexes_every_file_across_roots() {
        let (traversal, fx) = fixture(Arc::new(SingletonResolver));
        fx.repo.insert(vfs("/a/one.txt", 1));
        fx.repo.insert(vfs("/a/sub/two.txt", 1));
        fx.repo.insert(vfs("/b/three.txt", 1));

        let stats = traversal
            .rebuild(&scope(&["/a", "/b"]), &fx.scheduler)
            .await;

        assert_eq!(stats.started, 3);
        assert_eq!(stats.returned, 3);
        assert_eq!(fx.writer.doc_count().await, 3);
        // Flush and merge at the end
        let ops = fx.writer.ops().await;
        assert!(ops.contains(&WriteOp::Commit));
        assert_eq!(ops.last(), Some(&WriteOp::Optimize));
    }

    #[tokio::test]
    async fn test_rebuild_includes_expired_resources() {
        let (traversal, fx) = fixture(Arc::new(SingletonResolver));
        fx.repo.insert(ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from("/a/expired.txt"),
            type_id: 1,
            is_folder: false,
            released: None,
            expires: Some(Utc::now() - Duration::hours(1)),
        }));

        let stats = traversal.rebuild(&scope(&["/a"]), &fx.scheduler).await;
        assert_eq!(stats.started, 1);
        assert!(fx
            .writer
            .document(Path::new("/a/expired.txt"))
            .await
            .is_some());
    }

    #[tokio::test]
    async fn test_unreadable_root_is_skipped_with_warning() {
        let (traversal, fx) = fixture(Arc::new(SingletonResolver));
        fx.repo.insert(vfs("/good/one.txt", 1));
        fx.repo.insert(vfs("/bad/two.txt", 1));
        fx.repo.fail_under("/bad");

        let stats = traversal
            .rebuild(&scope(&["/bad", "/good"]), &fx.scheduler)
            .await;

        assert_eq!(stats.started, 1);
        assert!(fx.report.contains("skipping unreadable root"));
        assert!(fx.writer.document(Path::new("/good/one.txt")).await.is_some());
    }

    #[tokio::test]
    async fn test_chained_variants_share_context_and_index_once() {
        let (traversal, fx) = fixture(Arc::new(LocaleVariantResolver));
        fx.repo.insert(vfs("/a/guide.txt", 1));
        fx.repo.insert(vfs("/a/guide_de.txt", 1));
        fx.repo.insert(vfs("/a/guide_en.txt", 1));
        fx.repo.insert(vfs("/a/other.txt", 1));

        let stats = traversal.rebuild(&scope(&["/a"]), &fx.scheduler).await;

        assert_eq!(stats.started, 4);
        assert_eq!(fx.writer.doc_count().await, 4);
        // Each chain member saw the full three-member context
        for name in ["guide.txt", "guide_de.txt", "guide_en.txt"] {
            let doc = fx
                .writer
                .document(&PathBuf::from("/a").join(name))
                .await
                .unwrap();
            assert_eq!(doc.get("chain"), Some("3"));
        }
        let other = fx.writer.document(Path::new("/a/other.txt")).await.unwrap();
        assert_eq!(other.get("chain"), Some("1"));
    }

    #[tokio::test]
    async fn test_type_filter_is_applied() {
        let (traversal, fx) = fixture(Arc::new(SingletonResolver));
        fx.repo.insert(vfs("/a/in.txt", 3));
        fx.repo.insert(vfs("/a/out.txt", 4));

        let mut filtered = scope(&["/a"]);
        filtered.resource_types = vec![3];

        let stats = traversal.rebuild(&filtered, &fx.scheduler).await;
        assert_eq!(stats.started, 1);
        assert!(fx.writer.document(Path::new("/a/in.txt")).await.is_some());
        assert!(fx.writer.document(Path::new("/a/out.txt")).await.is_none());
    }

    #[tokio::test]
    async fn test_rebuild_is_idempotent() {
        let (traversal, fx) = fixture(Arc::new(SingletonResolver));
        fx.repo.insert(vfs("/a/one.txt", 1));
        fx.repo.insert(vfs("/a/two.txt", 1));

        traversal.rebuild(&scope(&["/a"]), &fx.scheduler).await;
        let first: Vec<WriteOp> = fx.writer.ops().await;

        traversal.rebuild(&scope(&["/a"]), &fx.scheduler).await;
        let all = fx.writer.ops().await;

        // The second rebuild replays the exact same writer calls
        assert_eq!(all.len(), first.len() * 2);
        assert_eq!(&all[first.len()..], first.as_slice());
        assert_eq!(fx.writer.doc_count().await, 2);
    }
}
