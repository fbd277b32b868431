//! `GetAwaiter` extension index for the awaitability rule.

use mirror_meta::{MethodHandle, TypeHandle, TypeShape, Universe};

use crate::rules;

/// Where to look for `GetAwaiter` extension methods.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExtensionScope {
    /// Every declared type in the universe.
    #[default]
    AllLoadedTypes,
    /// Only these containers.
    Containers(Vec<TypeHandle>),
}

/// `GetAwaiter` extensions in scope, with their receiver types, in handle
/// order.
pub(crate) struct ExtensionIndex {
    entries: Vec<(MethodHandle, TypeHandle)>,
}

impl ExtensionIndex {
    #[tracing::instrument(level = "debug", skip_all)]
    pub(crate) fn build(universe: &Universe, scope: &ExtensionScope) -> Self {
        let mut containers: Vec<TypeHandle> = match scope {
            ExtensionScope::AllLoadedTypes => {
                universe.definitions().map(|(handle, _)| handle).collect()
            }
            ExtensionScope::Containers(containers) => containers.clone(),
        };
        containers.sort_unstable();
        containers.dedup();

        let get_awaiter = universe.well_known().get_awaiter;
        let mut entries = Vec::new();
        for &container in &containers {
            let Some(def) = universe.definition(container) else {
                continue;
            };
            for &method in &def.methods {
                let Some(method_def) = universe.method(method) else {
                    continue;
                };
                if method_def.name != get_awaiter
                    || !rules::is_extension_method(universe, method)
                {
                    continue;
                }
                if let Some(receiver) = method_def.params.first() {
                    entries.push((method, receiver.ty));
                }
            }
        }
        tracing::debug!(
            containers = containers.len(),
            extensions = entries.len(),
            "built GetAwaiter extension index"
        );
        Self { entries }
    }

    /// The first in-scope extension whose receiver accepts `ty`.
    pub(crate) fn find(&self, universe: &Universe, ty: TypeHandle) -> Option<MethodHandle> {
        self.entries
            .iter()
            .find(|&&(_, receiver)| rules::receiver_accepts(universe, receiver, ty))
            .map(|&(method, _)| method)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// The awaitability rule over raw handles.
///
/// A generic parameter is awaitable when one of its constraints is.
pub(crate) fn is_awaitable(universe: &Universe, index: &ExtensionIndex, ty: TypeHandle) -> bool {
    let direct = |candidate: TypeHandle| {
        candidate != universe.core().void
            && (rules::is_task_like(universe, candidate)
                || rules::has_instance_get_awaiter(universe, candidate)
                || index.find(universe, candidate).is_some())
    };
    if direct(ty) {
        return true;
    }
    match universe.ty(ty).map(|row| &row.shape) {
        Some(TypeShape::GenericParam(param)) => param.constraints.iter().any(|&c| direct(c)),
        _ => false,
    }
}
