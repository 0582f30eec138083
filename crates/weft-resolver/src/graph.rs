//! Wiring graph construction and rendering for diagnostics.
//!
//! A [`WireGraph`] is a read-only view over an accepted wire set: bundles as
//! nodes, wires as package-labelled edges from importer to provider,
//! expanded transitively through the providers' own established wires.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use weft_core::bundle::{BundleId, Universe};
use weft_core::version::Version;
use weft_core::wire::Wire;

/// A bundle node in the wiring graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BundleNode {
    pub id: BundleId,
    pub symbolic_name: String,
    pub version: Version,
}

impl fmt::Display for BundleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{} (bundle {})", self.symbolic_name, self.version, self.id)
    }
}

/// Edge label: the package a wire binds.
#[derive(Debug, Clone)]
pub struct WireEdge {
    pub package: String,
    pub export_version: Version,
}

impl fmt::Display for WireEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.package, self.export_version)
    }
}

/// A wiring graph rooted at one importing bundle.
pub struct WireGraph {
    graph: DiGraph<BundleNode, WireEdge>,
    index: HashMap<BundleId, NodeIndex>,
    root: NodeIndex,
}

impl WireGraph {
    /// Build the graph from one bundle's accepted wires, following each
    /// provider's own established wires transitively.
    pub fn build(root: BundleId, wires: &[Wire], universe: &Universe) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        let root_idx = add_bundle(&mut graph, &mut index, root, universe);
        let mut pending: Vec<(NodeIndex, Vec<Wire>)> = vec![(root_idx, wires.to_vec())];
        let mut expanded: HashSet<BundleId> = HashSet::new();
        expanded.insert(root);

        while let Some((from, wires)) = pending.pop() {
            for wire in wires {
                let provider = wire.provider();
                let to = add_bundle(&mut graph, &mut index, provider, universe);
                if !graph.edges(from).any(|e| {
                    e.target() == to && e.weight().package == wire.package()
                }) {
                    graph.add_edge(
                        from,
                        to,
                        WireEdge {
                            package: wire.package().to_string(),
                            export_version: wire.export().version().clone(),
                        },
                    );
                }
                if expanded.insert(provider) {
                    if let Some(bundle) = universe.bundle(provider) {
                        if let Some(established) = bundle.established_wires() {
                            pending.push((to, established.to_vec()));
                        }
                    }
                }
            }
        }

        Self {
            graph,
            index,
            root: root_idx,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn wire_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Bundles that import from `id`, with the packages they import.
    pub fn dependents_of(&self, id: BundleId) -> Vec<(&BundleNode, &WireEdge)> {
        let Some(&idx) = self.index.get(&id) else {
            return Vec::new();
        };
        let mut dependents: Vec<(&BundleNode, &WireEdge)> = self
            .graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| (&self.graph[e.source()], e.weight()))
            .collect();
        dependents.sort_by_key(|(node, _)| node.id);
        dependents
    }

    /// The chain of wires from the root importer to the provider of
    /// `package`, or `None` when the root has no path to such a provider.
    pub fn provider_path(&self, package: &str) -> Option<Vec<&BundleNode>> {
        let mut path = Vec::new();
        let mut visited = HashSet::new();
        if self.dfs_path(self.root, package, &mut path, &mut visited) {
            Some(path.iter().map(|&idx| &self.graph[idx]).collect())
        } else {
            None
        }
    }

    fn dfs_path(
        &self,
        current: NodeIndex,
        package: &str,
        path: &mut Vec<NodeIndex>,
        visited: &mut HashSet<NodeIndex>,
    ) -> bool {
        path.push(current);
        if !visited.insert(current) {
            path.pop();
            return false;
        }
        for edge in self.graph.edges(current) {
            if edge.weight().package == package {
                path.push(edge.target());
                return true;
            }
        }
        for edge in self.graph.edges(current) {
            if self.dfs_path(edge.target(), package, path, visited) {
                return true;
            }
        }
        path.pop();
        visited.remove(&current);
        false
    }

    /// Render the wiring as a tree, importer at the root, one line per wire.
    /// Cycles are cut at the repeated bundle.
    pub fn render_tree(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", self.graph[self.root]));
        let mut visited = HashSet::new();
        visited.insert(self.root);

        let edges = self.sorted_edges(self.root);
        let count = edges.len();
        for (i, (target, edge)) in edges.into_iter().enumerate() {
            self.render_subtree(&mut output, target, edge, "", i == count - 1, &mut visited);
        }
        output
    }

    fn render_subtree(
        &self,
        output: &mut String,
        idx: NodeIndex,
        edge: &WireEdge,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<NodeIndex>,
    ) {
        let connector = if is_last { "└── " } else { "├── " };
        output.push_str(&format!(
            "{prefix}{connector}{edge} <- {}\n",
            self.graph[idx]
        ));

        if !visited.insert(idx) {
            return;
        }

        let child_prefix = format!("{prefix}{}", if is_last { "    " } else { "│   " });
        let edges = self.sorted_edges(idx);
        let count = edges.len();
        for (i, (target, edge)) in edges.into_iter().enumerate() {
            self.render_subtree(output, target, edge, &child_prefix, i == count - 1, visited);
        }

        visited.remove(&idx);
    }

    fn sorted_edges(&self, idx: NodeIndex) -> Vec<(NodeIndex, &WireEdge)> {
        let mut edges: Vec<(NodeIndex, &WireEdge)> = self
            .graph
            .edges(idx)
            .map(|e| (e.target(), e.weight()))
            .collect();
        edges.sort_by(|a, b| a.1.package.cmp(&b.1.package));
        edges
    }
}

fn add_bundle(
    graph: &mut DiGraph<BundleNode, WireEdge>,
    index: &mut HashMap<BundleId, NodeIndex>,
    id: BundleId,
    universe: &Universe,
) -> NodeIndex {
    if let Some(&idx) = index.get(&id) {
        return idx;
    }
    let node = match universe.bundle(id) {
        Some(bundle) => BundleNode {
            id,
            symbolic_name: bundle.symbolic_name().to_string(),
            version: bundle.version().clone(),
        },
        // A wire can outlive its provider's presence in a later snapshot;
        // render a placeholder rather than dropping the edge.
        None => BundleNode {
            id,
            symbolic_name: "<unknown>".to_string(),
            version: Version::default(),
        },
    };
    let idx = graph.add_node(node);
    index.insert(id, idx);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use weft_core::bundle::Bundle;
    use weft_core::export::ExportDescription;

    fn provider(id: u64, name: &str, package: &str) -> Arc<Bundle> {
        Arc::new(Bundle::new(
            BundleId(id),
            name.to_string(),
            Version::new(1, 0, 0),
            vec![ExportDescription::builder()
                .package(package)
                .version(Version::new(1, 0, 0))
                .build()
                .unwrap()],
            vec![],
        ))
    }

    fn wire_to(bundle: &Arc<Bundle>, package: &str) -> Wire {
        Wire::new(
            package.to_string(),
            bundle.export_list()[0].clone(),
            bundle.id(),
        )
    }

    #[test]
    fn tree_renders_wires_and_providers() {
        let importer = provider(1, "org.weft.app", "org.weft.app.api");
        let http = provider(2, "org.weft.http", "org.weft.http");
        let io = provider(3, "org.weft.io", "org.weft.io");
        // http itself depends on io
        http.publish_wires(vec![wire_to(&io, "org.weft.io")]).unwrap();

        let universe = Universe::new(vec![importer.clone(), http.clone(), io.clone()]);
        let wires = vec![wire_to(&http, "org.weft.http")];

        let graph = WireGraph::build(importer.id(), &wires, &universe);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.wire_count(), 2);

        let tree = graph.render_tree();
        assert!(tree.contains("org.weft.app@1.0.0"));
        assert!(tree.contains("org.weft.http@1.0.0 <- org.weft.http@1.0.0"));
        assert!(tree.contains("org.weft.io@1.0.0 <- org.weft.io@1.0.0"));
    }

    #[test]
    fn dependents_are_reverse_edges() {
        let importer = provider(1, "org.weft.app", "org.weft.app.api");
        let http = provider(2, "org.weft.http", "org.weft.http");
        let universe = Universe::new(vec![importer.clone(), http.clone()]);
        let wires = vec![wire_to(&http, "org.weft.http")];

        let graph = WireGraph::build(importer.id(), &wires, &universe);
        let dependents = graph.dependents_of(http.id());
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].0.symbolic_name, "org.weft.app");
        assert_eq!(dependents[0].1.package, "org.weft.http");
    }

    #[test]
    fn provider_path_follows_transitive_wires() {
        let importer = provider(1, "org.weft.app", "org.weft.app.api");
        let http = provider(2, "org.weft.http", "org.weft.http");
        let io = provider(3, "org.weft.io", "org.weft.io");
        http.publish_wires(vec![wire_to(&io, "org.weft.io")]).unwrap();

        let universe = Universe::new(vec![importer.clone(), http.clone(), io.clone()]);
        let wires = vec![wire_to(&http, "org.weft.http")];
        let graph = WireGraph::build(importer.id(), &wires, &universe);

        let path = graph.provider_path("org.weft.io").unwrap();
        let names: Vec<&str> = path.iter().map(|n| n.symbolic_name.as_str()).collect();
        assert_eq!(names, ["org.weft.app", "org.weft.http", "org.weft.io"]);

        assert!(graph.provider_path("org.weft.missing").is_none());
    }

    #[test]
    fn cyclic_wires_terminate() {
        let a = provider(1, "org.weft.a", "org.weft.a");
        let b = provider(2, "org.weft.b", "org.weft.b");
        a.publish_wires(vec![wire_to(&b, "org.weft.b")]).unwrap();
        b.publish_wires(vec![wire_to(&a, "org.weft.a")]).unwrap();

        let universe = Universe::new(vec![a.clone(), b.clone()]);
        let wires = vec![wire_to(&b, "org.weft.b")];
        let graph = WireGraph::build(a.id(), &wires, &universe);

        // Must not loop forever; the tree cuts at the repeated bundle.
        let tree = graph.render_tree();
        assert!(tree.contains("org.weft.b"));
    }
}
