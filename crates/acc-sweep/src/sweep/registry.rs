//! Sweeper registry and dependency ordering
//!
//! Each sweeper is registered under a unique name with the names of the
//! sweepers that must finish before it runs. The registry is built once at
//! startup and only read afterwards.

use super::context::SweepContext;
use super::errors::SweepErrors;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

type SweepFn =
    Arc<dyn Fn(Arc<SweepContext>) -> BoxFuture<'static, Result<(), SweepErrors>> + Send + Sync>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("sweeper {0} is already registered")]
    Duplicate(String),

    #[error("dependency cycle between sweepers: {}", .0.join(", "))]
    Cycle(Vec<String>),

    #[error("no sweeper named {0}")]
    UnknownSweeper(String),
}

/// One registered sweeper
#[derive(Clone)]
pub struct SweeperEntry {
    name: String,
    dependencies: Vec<String>,
    run: SweepFn,
}

impl SweeperEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sweepers that must complete first
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn run(&self, ctx: Arc<SweepContext>) -> BoxFuture<'static, Result<(), SweepErrors>> {
        (self.run)(ctx)
    }
}

impl fmt::Debug for SweeperEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SweeperEntry")
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct SweepRegistry {
    entries: BTreeMap<String, SweeperEntry>,
}

impl SweepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F, Fut>(
        &mut self,
        name: impl Into<String>,
        dependencies: &[&str],
        run: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(Arc<SweepContext>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), SweepErrors>> + Send + 'static,
    {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }

        let entry = SweeperEntry {
            name: name.clone(),
            dependencies: dependencies.iter().map(|d| d.to_string()).collect(),
            run: Arc::new(move |ctx| run(ctx).boxed()),
        };
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SweeperEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names of the sweepers to run for a `--run` style filter.
    ///
    /// An empty filter selects everything. Otherwise the named sweepers and,
    /// transitively, everything they depend on. Unregistered dependencies are
    /// ignored here and warned about when ordering.
    pub fn select(&self, filter: &[String]) -> Result<BTreeSet<String>, RegistryError> {
        if filter.is_empty() {
            return Ok(self.entries.keys().cloned().collect());
        }

        let mut selected = BTreeSet::new();
        let mut pending: Vec<&str> = Vec::new();
        for name in filter {
            if !self.entries.contains_key(name) {
                return Err(RegistryError::UnknownSweeper(name.clone()));
            }
            pending.push(name.as_str());
        }

        while let Some(name) = pending.pop() {
            let Some(entry) = self.entries.get(name) else {
                continue;
            };
            if selected.insert(name.to_string()) {
                pending.extend(entry.dependencies.iter().map(String::as_str));
            }
        }
        Ok(selected)
    }

    /// Group the selected sweepers into waves.
    ///
    /// Every sweeper's dependencies are in an earlier wave, so the sweepers
    /// within one wave can run concurrently. Waves and their members are in
    /// name order.
    pub fn waves(
        &self,
        selected: &BTreeSet<String>,
    ) -> Result<Vec<Vec<&SweeperEntry>>, RegistryError> {
        let mut remaining: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for name in selected {
            let entry = self
                .entries
                .get(name)
                .ok_or_else(|| RegistryError::UnknownSweeper(name.clone()))?;

            let mut deps = BTreeSet::new();
            for dep in &entry.dependencies {
                if self.entries.contains_key(dep) {
                    deps.insert(dep.as_str());
                } else {
                    warn!(
                        sweeper = %name,
                        dependency = %dep,
                        "Sweeper dependency is not registered, ignoring"
                    );
                }
            }
            remaining.insert(entry.name.as_str(), deps);
        }

        let mut waves = Vec::new();
        while !remaining.is_empty() {
            let ready: Vec<&str> = remaining
                .iter()
                .filter(|(_, deps)| deps.is_empty())
                .map(|(name, _)| *name)
                .collect();

            if ready.is_empty() {
                return Err(RegistryError::Cycle(
                    remaining.keys().map(|n| n.to_string()).collect(),
                ));
            }

            for name in &ready {
                remaining.remove(name);
            }
            for deps in remaining.values_mut() {
                for name in &ready {
                    deps.remove(name);
                }
            }
            waves.push(ready.iter().filter_map(|n| self.entries.get(*n)).collect());
        }
        Ok(waves)
    }

    /// Every registered sweeper in an order that respects dependencies.
    pub fn execution_order(&self) -> Result<Vec<&SweeperEntry>, RegistryError> {
        let all = self.select(&[])?;
        Ok(self.waves(&all)?.into_iter().flatten().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_ctx: Arc<SweepContext>) -> futures::future::Ready<Result<(), SweepErrors>> {
        futures::future::ready(Ok(()))
    }

    fn registry(entries: &[(&str, &[&str])]) -> SweepRegistry {
        let mut registry = SweepRegistry::new();
        for (name, deps) in entries {
            registry.register(*name, deps, noop).unwrap();
        }
        registry
    }

    fn wave_names(waves: Vec<Vec<&SweeperEntry>>) -> Vec<Vec<&str>> {
        waves
            .into_iter()
            .map(|w| w.into_iter().map(SweeperEntry::name).collect())
            .collect()
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = registry(&[("a", &[])]);
        assert_eq!(
            registry.register("a", &[], noop),
            Err(RegistryError::Duplicate("a".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dependencies_come_first() {
        let registry = registry(&[
            ("access_point", &["object_lambda"]),
            ("object_lambda", &[]),
            ("storage_lens", &[]),
        ]);

        let waves = registry.waves(&registry.select(&[]).unwrap()).unwrap();
        assert_eq!(
            wave_names(waves),
            vec![vec!["object_lambda", "storage_lens"], vec!["access_point"]]
        );
    }

    #[test]
    fn filter_pulls_in_dependencies_transitively() {
        let registry = registry(&[("a", &["b"]), ("b", &["c"]), ("c", &[]), ("d", &[])]);

        let selected = registry.select(&["a".to_string()]).unwrap();
        assert_eq!(
            selected.into_iter().collect::<Vec<_>>(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
    }

    #[test]
    fn unknown_filter_name_is_an_error() {
        let registry = registry(&[("a", &[])]);
        assert_eq!(
            registry.select(&["nope".to_string()]),
            Err(RegistryError::UnknownSweeper("nope".into()))
        );
    }

    #[test]
    fn missing_dependency_is_ignored() {
        let registry = registry(&[("a", &["ghost"])]);
        let waves = registry.waves(&registry.select(&[]).unwrap()).unwrap();
        assert_eq!(wave_names(waves), vec![vec!["a"]]);
    }

    #[test]
    fn cycle_is_detected() {
        let registry = registry(&[("a", &["b"]), ("b", &["a"]), ("c", &[])]);
        let err = registry.execution_order().unwrap_err();
        assert_eq!(err, RegistryError::Cycle(vec!["a".into(), "b".into()]));
    }
}
