//! Dependency-chain resolvers.
//!
//! A chain is the ordered set of resources whose indexing must be kept in
//! lock-step. Callers compute sibling slices once per folder (via the
//! traversal's folder lookup map) and hand them in; resolvers never scan
//! the repository themselves.

use std::path::Path;
use vfsearch_core::{DependencyResolver, ResourceRecord};

/// Resolver for indexer variants without dependency support: every chain
/// is the singleton {resource}.
pub struct SingletonResolver;

impl DependencyResolver for SingletonResolver {
    fn resolve(
        &self,
        resource: &ResourceRecord,
        _siblings: &[ResourceRecord],
    ) -> Vec<ResourceRecord> {
        vec![resource.clone()]
    }
}

/// Resolver chaining locale variants of the same item.
///
/// Two file-backed siblings belong to the same chain when their file stems
/// differ only by a `_xx` locale suffix, e.g. `guide.txt`, `guide_en.txt`
/// and `guide_de.txt`. Members are ordered by path, so resolving the chain
/// from any member yields the identical chain.
pub struct LocaleVariantResolver;

impl LocaleVariantResolver {
    /// File stem with any `_xx` locale suffix removed.
    fn base_stem(path: &Path) -> Option<String> {
        let stem = path.file_stem()?.to_str()?;
        match stem.rsplit_once('_') {
            Some((base, suffix)) if is_locale_suffix(suffix) => Some(base.to_string()),
            _ => Some(stem.to_string()),
        }
    }
}

fn is_locale_suffix(suffix: &str) -> bool {
    suffix.len() == 2 && suffix.chars().all(|c| c.is_ascii_lowercase())
}

impl DependencyResolver for LocaleVariantResolver {
    fn supports_dependencies(&self) -> bool {
        true
    }

    fn resolve(
        &self,
        resource: &ResourceRecord,
        siblings: &[ResourceRecord],
    ) -> Vec<ResourceRecord> {
        // Legacy records carry no path-stem semantics
        if !resource.is_file_backed() {
            return vec![resource.clone()];
        }

        let Some(base) = Self::base_stem(&resource.path()) else {
            return vec![resource.clone()];
        };

        let mut chain: Vec<ResourceRecord> = siblings
            .iter()
            .filter(|s| s.is_file() && s.is_file_backed())
            .filter(|s| Self::base_stem(&s.path()).as_deref() == Some(base.as_str()))
            .cloned()
            .collect();

        if !chain.iter().any(|m| m.path() == resource.path()) {
            chain.push(resource.clone());
        }
        chain.sort_by_key(ResourceRecord::path);
        chain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use uuid::Uuid;
    use vfsearch_core::VfsResource;

    fn vfs(path: &str) -> ResourceRecord {
        ResourceRecord::Vfs(VfsResource {
            id: Uuid::new_v4(),
            path: PathBuf::from(path),
            type_id: 1,
            is_folder: false,
            released: None,
            expires: None,
        })
    }

    fn paths(chain: &[ResourceRecord]) -> Vec<PathBuf> {
        chain.iter().map(ResourceRecord::path).collect()
    }

    #[test]
    fn test_singleton_resolver() {
        let resolver = SingletonResolver;
        assert!(!resolver.supports_dependencies());

        let resource = vfs("/site/a.txt");
        let siblings = vec![vfs("/site/a_en.txt"), vfs("/site/b.txt")];
        let chain = resolver.resolve(&resource, &siblings);
        assert_eq!(paths(&chain), vec![PathBuf::from("/site/a.txt")]);
    }

    #[test]
    fn test_locale_variants_are_chained() {
        let resolver = LocaleVariantResolver;
        assert!(resolver.supports_dependencies());

        let en = vfs("/site/guide_en.txt");
        let siblings = vec![
            vfs("/site/guide_de.txt"),
            vfs("/site/guide_en.txt"),
            vfs("/site/guide.txt"),
            vfs("/site/other.txt"),
        ];
        let chain = resolver.resolve(&en, &siblings);
        assert_eq!(
            paths(&chain),
            vec![
                PathBuf::from("/site/guide.txt"),
                PathBuf::from("/site/guide_de.txt"),
                PathBuf::from("/site/guide_en.txt"),
            ]
        );
    }

    #[test]
    fn test_chain_equivalent_from_any_member() {
        let resolver = LocaleVariantResolver;
        let siblings = vec![
            vfs("/site/guide_de.txt"),
            vfs("/site/guide_en.txt"),
            vfs("/site/guide.txt"),
        ];

        let from_de = resolver.resolve(&siblings[0], &siblings);
        let from_en = resolver.resolve(&siblings[1], &siblings);
        let from_base = resolver.resolve(&siblings[2], &siblings);

        assert_eq!(paths(&from_de), paths(&from_en));
        assert_eq!(paths(&from_en), paths(&from_base));
    }

    #[test]
    fn test_resource_outside_sibling_list_is_included() {
        let resolver = LocaleVariantResolver;
        let resource = vfs("/site/guide_fr.txt");
        let chain = resolver.resolve(&resource, &[]);
        assert_eq!(paths(&chain), vec![PathBuf::from("/site/guide_fr.txt")]);
    }

    #[test]
    fn test_long_suffixes_are_not_locales() {
        let resolver = LocaleVariantResolver;
        let resource = vfs("/site/report_final.txt");
        let siblings = vec![vfs("/site/report.txt"), vfs("/site/report_final.txt")];
        // "final" is not a two-letter locale suffix; no chaining
        let chain = resolver.resolve(&resource, &siblings);
        assert_eq!(paths(&chain), vec![PathBuf::from("/site/report_final.txt")]);
    }
}
