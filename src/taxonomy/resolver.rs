//! Path resolution: search-endian name -> classification-endian path

use super::index::{segment_count, TaxonomyIndex};

/// Which rule produced a resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOrigin {
    /// The name already had a primary mapping
    Existing,
    /// Built from declared is_a parents and registered in the taxonomy
    Declared,
    /// Inherited from the document's classification
    Context,
    /// No hierarchy information; classification equals the name
    Flat,
}

/// Dual address of a concept
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub search_path: String,
    pub classification_path: String,
    /// Primary classification followed by any alias classifications
    pub all_paths: Vec<String>,
    /// Canonicalized declared parents, primary first
    pub parents: Vec<String>,
    pub origin: ResolutionOrigin,
}

impl Resolution {
    /// Non-primary classifications
    pub fn aliases(&self) -> &[String] {
        self.all_paths.get(1..).unwrap_or(&[])
    }

    /// Last segment of the classification path
    pub fn local_name(&self) -> &str {
        local_name(&self.classification_path)
    }
}

/// Per-document parsing context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseContext {
    document: String,
    classification: Option<String>,
}

impl ParseContext {
    /// A context with no classification of its own
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            classification: None,
        }
    }

    /// Derive the context from a document id.
    ///
    /// `concepts/institution/financial/bank.md` under content dir `concepts`
    /// yields `institution/financial/bank`. A document id without a
    /// directory component has no classification.
    pub fn for_document(document: &str, content_dir: &str) -> Self {
        let mut context = Self::new(document);
        if document.contains('/') {
            let stem = document.strip_suffix(".md").unwrap_or(document);
            let relative = strip_content_dir(stem, content_dir);
            if !relative.is_empty() {
                context.classification = Some(relative.to_string());
            }
        }
        context
    }

    pub fn with_classification(mut self, classification: impl Into<String>) -> Self {
        self.classification = Some(classification.into());
        self
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    /// File stem of the document (`bank` for `concepts/bank.md`)
    pub fn document_name(&self) -> &str {
        let stem = self.document.strip_suffix(".md").unwrap_or(&self.document);
        local_name(stem)
    }

    pub fn classification(&self) -> Option<&str> {
        self.classification.as_deref()
    }
}

fn strip_content_dir<'a>(path: &'a str, content_dir: &str) -> &'a str {
    let dir = content_dir.trim_matches('/');
    if dir.is_empty() {
        return path;
    }
    let prefix = format!("{dir}/");
    if let Some(rest) = path.strip_prefix(&prefix) {
        return rest;
    }
    match path.find(&format!("/{prefix}")) {
        Some(at) => &path[at + prefix.len() + 1..],
        None => path,
    }
}

/// Last segment of a slash-delimited path
pub fn local_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Assigns classification paths, registering declared hierarchies in the taxonomy
pub struct PathResolver<'t> {
    taxonomy: &'t mut TaxonomyIndex,
}

impl<'t> PathResolver<'t> {
    pub fn new(taxonomy: &'t mut TaxonomyIndex) -> Self {
        Self { taxonomy }
    }

    /// Resolve `search_name` given its declared is_a parents.
    ///
    /// Rules, in order: an existing mapping is returned unchanged; declared
    /// parents build `primary/local_name` (deepest parent wins, ties broken
    /// lexicographically) and the rest become aliases; the document's
    /// context is inherited; otherwise the path is flat.
    /// Never fails.
    pub fn resolve(
        &mut self,
        search_name: &str,
        declared_parents: &[String],
        context: Option<&ParseContext>,
    ) -> Resolution {
        let parents = self.ordered_parents(declared_parents);

        if let Some(existing) = self.taxonomy.classification_of(search_name) {
            let mut all_paths = vec![existing.to_string()];
            all_paths.extend(self.taxonomy.aliases_of(search_name).iter().cloned());
            return Resolution {
                search_path: search_name.to_string(),
                classification_path: existing.to_string(),
                all_paths,
                parents,
                origin: ResolutionOrigin::Existing,
            };
        }

        let local = local_name(search_name);

        if !parents.is_empty() {
            let all_paths: Vec<String> = parents.iter().map(|p| format!("{p}/{local}")).collect();
            let classification_path = all_paths[0].clone();
            self.taxonomy.register(search_name, &classification_path);
            self.taxonomy
                .set_aliases(search_name, all_paths[1..].to_vec());
            return Resolution {
                search_path: search_name.to_string(),
                classification_path,
                all_paths,
                parents,
                origin: ResolutionOrigin::Declared,
            };
        }

        let (classification_path, origin) =
            match context.and_then(ParseContext::classification) {
                Some(context_path) => (format!("{context_path}/{local}"), ResolutionOrigin::Context),
                None => (search_name.to_string(), ResolutionOrigin::Flat),
            };
        Resolution {
            search_path: search_name.to_string(),
            all_paths: vec![classification_path.clone()],
            classification_path,
            parents,
            origin,
        }
    }

    fn ordered_parents(&self, declared: &[String]) -> Vec<String> {
        let mut parents: Vec<String> = declared
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(|p| self.taxonomy.canonical_parent(p))
            .collect();
        parents.sort_by(|a, b| {
            segment_count(b)
                .cmp(&segment_count(a))
                .then_with(|| a.cmp(b))
        });
        parents.dedup();
        parents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parents(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_multi_parent_picks_deepest() {
        let mut taxonomy = TaxonomyIndex::new();
        let resolution = PathResolver::new(&mut taxonomy).resolve("z", &parents(&["x", "x/y"]), None);

        assert_eq!(resolution.classification_path, "x/y/z");
        assert_eq!(resolution.aliases(), ["x/z"]);
        assert_eq!(resolution.parents, ["x/y", "x"]);
        assert_eq!(resolution.origin, ResolutionOrigin::Declared);
        assert_eq!(taxonomy.classification_of("z"), Some("x/y/z"));
        assert_eq!(taxonomy.search_of("x/y/z"), Some("z"));
        assert_eq!(taxonomy.aliases_of("z"), ["x/z"]);
    }

    #[test]
    fn test_equal_depth_parents_tie_break_lexicographically() {
        let mut taxonomy = TaxonomyIndex::new();
        let resolution =
            PathResolver::new(&mut taxonomy).resolve("c", &parents(&["m/b", "k/a"]), None);
        assert_eq!(resolution.classification_path, "k/a/c");
        assert_eq!(resolution.aliases(), ["m/b/c"]);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut taxonomy = TaxonomyIndex::new();
        let first = PathResolver::new(&mut taxonomy).resolve(
            "bank",
            &parents(&["institution/financial"]),
            None,
        );
        let snapshot = taxonomy.clone();
        let second = PathResolver::new(&mut taxonomy).resolve("bank", &parents(&["elsewhere"]), None);

        assert_eq!(second.classification_path, first.classification_path);
        assert_eq!(second.origin, ResolutionOrigin::Existing);
        assert_eq!(taxonomy, snapshot);
    }

    #[test]
    fn test_sense_parent_resolves_against_taxonomy() {
        let mut taxonomy = TaxonomyIndex::new();
        let mut resolver = PathResolver::new(&mut taxonomy);
        resolver.resolve("bank", &parents(&["institution/financial"]), None);
        let credit_union = resolver.resolve("credit_union", &parents(&["bank/financial"]), None);

        assert_eq!(
            credit_union.classification_path,
            "institution/financial/bank/credit_union"
        );
        assert_eq!(credit_union.parents, ["institution/financial/bank"]);
    }

    #[test]
    fn test_context_inheritance() {
        let mut taxonomy = TaxonomyIndex::new();
        let context = ParseContext::for_document("concepts/institution/financial/bank.md", "concepts");
        let resolution = PathResolver::new(&mut taxonomy).resolve("loan", &[], Some(&context));

        assert_eq!(resolution.classification_path, "institution/financial/bank/loan");
        assert_eq!(resolution.origin, ResolutionOrigin::Context);
        // context resolutions are not registered
        assert_eq!(taxonomy.classification_of("loan"), None);
    }

    #[test]
    fn test_single_segment_context_is_inherited() {
        let mut taxonomy = TaxonomyIndex::new();
        let context = ParseContext::for_document("concepts/bank.md", "concepts");
        let resolution = PathResolver::new(&mut taxonomy).resolve("loan", &[], Some(&context));

        assert_eq!(resolution.classification_path, "bank/loan");
        assert_eq!(resolution.origin, ResolutionOrigin::Context);
    }

    #[test]
    fn test_flat_without_directory() {
        let mut taxonomy = TaxonomyIndex::new();
        let context = ParseContext::for_document("bank.md", "concepts");
        let mut resolver = PathResolver::new(&mut taxonomy);

        let top_level = resolver.resolve("loan", &[], Some(&context));
        assert_eq!(top_level.classification_path, "loan");
        assert_eq!(top_level.origin, ResolutionOrigin::Flat);

        // the content dir itself leaves nothing to inherit
        let bare_dir = ParseContext::for_document("concepts/.md", "concepts");
        assert_eq!(resolver.resolve("loan", &[], Some(&bare_dir)).origin, ResolutionOrigin::Flat);

        let without_context = resolver.resolve("loan", &[], None);
        assert_eq!(without_context.all_paths, ["loan"]);
    }

    #[test]
    fn test_local_name_is_last_segment_of_search_name() {
        let mut taxonomy = TaxonomyIndex::new();
        let resolution =
            PathResolver::new(&mut taxonomy).resolve("finance/loan", &parents(&["product"]), None);
        assert_eq!(resolution.classification_path, "product/loan");
    }

    #[test]
    fn test_blank_parents_ignored() {
        let mut taxonomy = TaxonomyIndex::new();
        let resolution = PathResolver::new(&mut taxonomy).resolve("bank", &parents(&["", "  "]), None);
        assert_eq!(resolution.origin, ResolutionOrigin::Flat);
    }

    #[test]
    fn test_context_derivation() {
        let context = ParseContext::for_document("concepts/institution/financial/bank.md", "concepts");
        assert_eq!(context.classification(), Some("institution/financial/bank"));
        assert_eq!(context.document_name(), "bank");

        let nested = ParseContext::for_document("wiki/concepts/a/b.md", "concepts");
        assert_eq!(nested.classification(), Some("a/b"));

        let top_level = ParseContext::for_document("bank.md", "concepts");
        assert_eq!(top_level.classification(), None);

        let other_dir = ParseContext::for_document("notes/a/b.md", "concepts");
        assert_eq!(other_dir.classification(), Some("notes/a/b"));
    }
}
