//! Descriptor registry - id/name index over declared classes
//!
//! Descriptors themselves are per-class singletons and need no registry to
//! work; the registry exists for lookups by id or name, instance-free subtype
//! queries and collision auditing. It is an ordinary value, so tests build
//! their own, and [`Registry::global`] offers a lazily built shared one.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::ptr;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::{debug, info, warn};

use crate::config::{CollisionPolicy, RegistryConfig};
use crate::descriptor::TypeDescriptor;
use crate::engine::Class;
use crate::error::{Result, RttiError};
use crate::hash::RttiId;

static GLOBAL: Lazy<Registry> = Lazy::new(Registry::new);

/// A tolerated id collision
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collision {
    pub id: RttiId,
    /// The class that kept the id
    pub existing: &'static str,
    /// The class that was turned away
    pub incoming: &'static str,
}

/// Concurrent index of class descriptors
pub struct Registry {
    by_id: DashMap<RttiId, &'static TypeDescriptor>,
    config: RegistryConfig,
    collisions: Mutex<Vec<Collision>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            by_id: DashMap::new(),
            config,
            collisions: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide registry with default configuration
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register `T` and all of its ancestors
    pub fn register<T: Class + ?Sized>(&self) -> Result<&'static TypeDescriptor> {
        let descriptor = T::descriptor();
        self.register_descriptor(descriptor)?;
        Ok(descriptor)
    }

    /// Register a descriptor and all of its ancestors.
    ///
    /// Registering the same descriptor again is a no-op. A different
    /// descriptor under an already-taken id is handled per
    /// [`CollisionPolicy`]; under `Reject` nothing past the offending class
    /// is registered.
    pub fn register_descriptor(&self, descriptor: &'static TypeDescriptor) -> Result<()> {
        self.insert(descriptor)?;
        for ancestor in descriptor.ancestors() {
            self.insert(ancestor)?;
        }
        Ok(())
    }

    fn insert(&self, descriptor: &'static TypeDescriptor) -> Result<()> {
        let existing = *self.by_id.entry(descriptor.id()).or_insert(descriptor);
        if ptr::eq(existing, descriptor) {
            debug!(class = descriptor.name(), "class registered");
            return Ok(());
        }

        let collision = Collision {
            id: descriptor.id(),
            existing: existing.name(),
            incoming: descriptor.name(),
        };

        match self.config.collision_policy {
            CollisionPolicy::Reject => {
                warn!(
                    id = format_args!("{:#010x}", collision.id),
                    existing = collision.existing,
                    incoming = collision.incoming,
                    "type id collision rejected"
                );
                Err(RttiError::IdCollision {
                    id: collision.id,
                    existing: collision.existing.to_string(),
                    incoming: collision.incoming.to_string(),
                })
            }
            CollisionPolicy::Warn | CollisionPolicy::Allow => {
                if self.config.collision_policy == CollisionPolicy::Warn {
                    warn!(
                        id = format_args!("{:#010x}", collision.id),
                        existing = collision.existing,
                        incoming = collision.incoming,
                        "type id collision, keeping first class"
                    );
                }
                let mut collisions = self.collisions.lock();
                // Re-registering the losing class reports it once
                if !collisions.contains(&collision) {
                    collisions.push(collision);
                }
                Ok(())
            }
        }
    }

    pub fn get(&self, id: RttiId) -> Option<&'static TypeDescriptor> {
        self.by_id.get(&id).map(|entry| *entry)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&'static TypeDescriptor> {
        self.get(crate::hash::fnv1a_32(name))
            .filter(|descriptor| descriptor.name() == name)
    }

    pub fn contains(&self, id: RttiId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Registered descriptors, sorted by name
    pub fn descriptors(&self) -> Vec<&'static TypeDescriptor> {
        let mut all: Vec<_> = self.by_id.iter().map(|entry| *entry.value()).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Whether class `from` derives from class `to`, without an instance.
    ///
    /// `None` when `from` is not registered.
    pub fn is_subtype(&self, from: RttiId, to: RttiId) -> Option<bool> {
        self.get(from).map(|descriptor| descriptor.reaches(to))
    }

    /// Collisions tolerated so far under `Allow` or `Warn`
    pub fn collisions(&self) -> Vec<Collision> {
        self.collisions.lock().clone()
    }

    /// Hierarchy graph: one node per registered class, edges child -> parent
    /// in declaration order.
    pub fn hierarchy_graph(&self) -> DiGraph<&'static TypeDescriptor, usize> {
        let descriptors = self.descriptors();
        let mut graph = DiGraph::with_capacity(descriptors.len(), descriptors.len());
        let mut nodes: HashMap<RttiId, NodeIndex> = HashMap::with_capacity(descriptors.len());

        for descriptor in &descriptors {
            nodes.insert(descriptor.id(), graph.add_node(*descriptor));
        }
        for descriptor in &descriptors {
            let child = nodes[&descriptor.id()];
            for (rank, parent) in descriptor.parents().iter().enumerate() {
                // Parents that lost an id collision are not in the graph
                if let Some(&node) = nodes.get(&parent.id()) {
                    if ptr::eq(graph[node], *parent) {
                        graph.add_edge(child, node, rank);
                    }
                }
            }
        }

        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "hierarchy graph built"
        );
        graph
    }

    /// Graphviz rendering of [`hierarchy_graph`](Self::hierarchy_graph)
    pub fn to_dot(&self) -> String {
        let graph = self.hierarchy_graph();
        let mut out = String::from("digraph rtti {\n    rankdir=BT;\n");
        for index in graph.node_indices() {
            let descriptor = graph[index];
            let _ = writeln!(
                out,
                "    n{} [label=\"{}\\n{:#010x}\"];",
                index.index(),
                descriptor.name(),
                descriptor.id()
            );
        }
        for edge in graph.edge_indices() {
            if let Some((child, parent)) = graph.edge_endpoints(edge) {
                let _ = writeln!(
                    out,
                    "    n{} -> n{} [label=\"{}\"];",
                    child.index(),
                    parent.index(),
                    graph[edge]
                );
            }
        }
        out.push_str("}\n");
        out
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::algo::is_cyclic_directed;

    fn leak(name: &str, parents: &[&'static TypeDescriptor]) -> &'static TypeDescriptor {
        Box::leak(Box::new(TypeDescriptor::new(
            name,
            parents.iter().copied().collect(),
        )))
    }

    #[test]
    fn test_register_pulls_in_ancestors() {
        let root = leak("reg::Root", &[]);
        let mid = leak("reg::Mid", &[root]);
        let leaf = leak("reg::Leaf", &[mid]);

        let registry = Registry::new();
        registry.register_descriptor(leaf).unwrap();

        assert_eq!(registry.len(), 3);
        assert!(registry.contains(root.id()));
        assert_eq!(registry.get_by_name("reg::Mid").map(|d| d.id()), Some(mid.id()));
        assert_eq!(registry.get_by_name("reg::Nope"), None);
    }

    #[test]
    fn test_register_twice_is_noop() {
        let root = leak("reg::Once", &[]);
        let registry = Registry::new();
        registry.register_descriptor(root).unwrap();
        registry.register_descriptor(root).unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry.collisions().is_empty());
    }

    #[test]
    fn test_subtype_queries() {
        let root = leak("reg::SRoot", &[]);
        let leaf = leak("reg::SLeaf", &[root]);
        let registry = Registry::new();
        registry.register_descriptor(leaf).unwrap();

        assert_eq!(registry.is_subtype(leaf.id(), root.id()), Some(true));
        assert_eq!(registry.is_subtype(root.id(), leaf.id()), Some(false));
        assert_eq!(registry.is_subtype(0, root.id()), None);
    }

    #[test]
    fn test_collision_policies() {
        // Same name, different descriptor instance: guaranteed id clash
        let first = leak("reg::Clash", &[]);
        let second = leak("reg::Clash", &[]);

        let allow = Registry::with_config(RegistryConfig {
            collision_policy: CollisionPolicy::Allow,
        });
        allow.register_descriptor(first).unwrap();
        allow.register_descriptor(second).unwrap();
        allow.register_descriptor(second).unwrap();
        assert!(ptr::eq(allow.get(first.id()).unwrap(), first));
        assert_eq!(allow.collisions().len(), 1);

        let reject = Registry::with_config(RegistryConfig {
            collision_policy: CollisionPolicy::Reject,
        });
        reject.register_descriptor(first).unwrap();
        let err = reject.register_descriptor(second).unwrap_err();
        assert!(matches!(err, RttiError::IdCollision { .. }));
        assert!(reject.collisions().is_empty());
    }

    #[test]
    fn test_graph_and_dot() {
        let root = leak("reg::GRoot", &[]);
        let left = leak("reg::GLeft", &[root]);
        let right = leak("reg::GRight", &[root]);
        let leaf = leak("reg::GLeaf", &[left, right]);

        let registry = Registry::new();
        registry.register_descriptor(leaf).unwrap();

        let graph = registry.hierarchy_graph();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);
        assert!(!is_cyclic_directed(&graph));

        let dot = registry.to_dot();
        assert!(dot.starts_with("digraph rtti {"));
        assert!(dot.contains("reg::GLeaf"));
        assert_eq!(dot.matches("->").count(), 4);
    }

    #[test]
    fn test_descriptors_sorted() {
        let b = leak("reg::SortB", &[]);
        let a = leak("reg::SortA", &[]);
        let registry = Registry::new();
        registry.register_descriptor(b).unwrap();
        registry.register_descriptor(a).unwrap();
        let names: Vec<_> = registry.descriptors().iter().map(|d| d.name()).collect();
        assert_eq!(names, vec!["reg::SortA", "reg::SortB"]);
    }
}
