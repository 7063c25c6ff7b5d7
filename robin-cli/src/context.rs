//! Template variables
//!
//! The context is built once per `create` run and is read-only afterwards.
//! Besides the app identifiers it carries `PageIcon`, a decorative emoji
//! picked at random. Nothing depends on which icon is chosen, so tests that
//! compare whole contexts should drop it with [`VariableContext::without`].

use std::collections::BTreeMap;
use std::path::Path;

use convert_case::{Case, Casing};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;

/// Key of the app identifier
pub const ID_KEY: &str = "Id";
/// Key of the human readable app name
pub const NAME_KEY: &str = "Name";
/// Key of the decorative page icon
pub const PAGE_ICON_KEY: &str = "PageIcon";

/// Candidates for the page icon
pub const PAGE_ICONS: [&str; 7] = ["👋", "🎉", "🎊", "🎈", "🎁", "🎀", "🚀"];

const FALLBACK_ID: &str = "robin-app";

/// Mapping of placeholder names to substitution values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VariableContext(BTreeMap<String, String>);

impl VariableContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `key`, if defined.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Whether `key` is defined.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of defined placeholders
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no placeholder is defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Placeholders in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Copy of this context with `key` removed.
    #[must_use]
    pub fn without(&self, key: &str) -> Self {
        let mut vars = self.0.clone();
        vars.remove(key);
        Self(vars)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Builder for the context of a new app
#[derive(Debug, Clone)]
pub struct ContextBuilder {
    id: String,
    name: String,
    extra: BTreeMap<String, String>,
}

impl ContextBuilder {
    /// Start from explicit identifiers
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Derive the identifiers from the target directory name.
    ///
    /// `my_cool-app` becomes the id `my-cool-app` and the name `My Cool App`.
    #[must_use]
    pub fn for_target(target: &Path) -> Self {
        let stem = target
            .file_name()
            .and_then(|name| name.to_str())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(FALLBACK_ID);

        Self::new(stem.to_case(Case::Kebab), stem.to_case(Case::Title))
    }

    /// Override the app identifier
    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Override the app name
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Define an additional placeholder
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Build the context with a freshly seeded generator for the icon.
    #[must_use]
    pub fn build(self) -> VariableContext {
        self.build_with(&mut StdRng::from_entropy())
    }

    /// Build the context, drawing the icon from `rng`.
    ///
    /// The built-in keys win over extra variables of the same name.
    #[must_use]
    pub fn build_with<R: Rng + ?Sized>(self, rng: &mut R) -> VariableContext {
        let icon = PAGE_ICONS.choose(rng).copied().unwrap_or(PAGE_ICONS[0]);

        let mut vars = self.extra;
        vars.insert(ID_KEY.to_string(), self.id);
        vars.insert(NAME_KEY.to_string(), self.name);
        vars.insert(PAGE_ICON_KEY.to_string(), icon.to_string());
        VariableContext(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_keys_present() {
        let ctx = ContextBuilder::new("test", "Testing").build();
        assert_eq!(ctx.get(ID_KEY), Some("test"));
        assert_eq!(ctx.get(NAME_KEY), Some("Testing"));
        assert!(PAGE_ICONS.contains(&ctx.get(PAGE_ICON_KEY).unwrap()));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_icon_is_excluded_from_equality() {
        let a = ContextBuilder::new("test", "Testing").build();
        let b = ContextBuilder::new("test", "Testing").build();
        assert_eq!(a.without(PAGE_ICON_KEY), b.without(PAGE_ICON_KEY));
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = ContextBuilder::new("x", "X").build_with(&mut StdRng::seed_from_u64(7));
        let b = ContextBuilder::new("x", "X").build_with(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_every_icon_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::BTreeSet::new();
        for _ in 0..500 {
            let ctx = ContextBuilder::new("x", "X").build_with(&mut rng);
            seen.insert(ctx.get(PAGE_ICON_KEY).unwrap().to_string());
        }
        assert_eq!(seen.len(), PAGE_ICONS.len());
    }

    #[test]
    fn test_identifiers_from_target() {
        let ctx = ContextBuilder::for_target(Path::new("/tmp/my_cool-app")).build();
        assert_eq!(ctx.get(ID_KEY), Some("my-cool-app"));
        assert_eq!(ctx.get(NAME_KEY), Some("My Cool App"));

        let ctx = ContextBuilder::for_target(Path::new("/")).build();
        assert_eq!(ctx.get(ID_KEY), Some("robin-app"));
    }

    #[test]
    fn test_overrides_and_extra_vars() {
        let ctx = ContextBuilder::for_target(Path::new("app"))
            .id("custom")
            .name("Custom")
            .var("Version", "0.1.0")
            .var(ID_KEY, "ignored")
            .build();
        assert_eq!(ctx.get(ID_KEY), Some("custom"));
        assert_eq!(ctx.get(NAME_KEY), Some("Custom"));
        assert_eq!(ctx.get("Version"), Some("0.1.0"));
    }

    #[test]
    fn test_collect_context() {
        let ctx: VariableContext = [("Name", "World")].into_iter().collect();
        assert_eq!(ctx.get("Name"), Some("World"));
        assert!(!ctx.contains("Missing"));

        let ctx: VariableContext = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(ctx.iter().collect::<Vec<_>>(), vec![("a", "1"), ("b", "2")]);
    }
}
