use crate::core::db::schema::Relationship;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/*
 * Schema Map Module for Relationship Visualization
 *
 * Builds a directed graph over the foreign-key relationships of a database
 * and renders it either as Graphviz DOT text (the file the CLI writes) or as
 * a terminal relationship overview. Rendering is deterministic: tables and
 * edges are emitted in sorted order.
 */

/// Directed graph over table names; every edge is one foreign-key
/// relationship. Tables appearing in several relationships share one node.
pub struct RelationGraph {
    graph: DiGraph<String, Relationship>,
}

impl RelationGraph {
    pub fn from_relationships(relationships: &[Relationship]) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes: HashMap<String, NodeIndex> = HashMap::new();

        for rel in relationships {
            let from = *nodes
                .entry(rel.from_table.clone())
                .or_insert_with(|| graph.add_node(rel.from_table.clone()));
            let to = *nodes
                .entry(rel.to_table.clone())
                .or_insert_with(|| graph.add_node(rel.to_table.clone()));
            graph.add_edge(from, to, rel.clone());
        }

        RelationGraph { graph }
    }

    pub fn table_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn relationship_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Table names in sorted order.
    pub fn tables(&self) -> Vec<&str> {
        let mut tables: Vec<&str> = self.graph.node_weights().map(String::as_str).collect();
        tables.sort_unstable();
        tables
    }

    /// All relationships in sorted order.
    pub fn relationships(&self) -> Vec<&Relationship> {
        let mut relationships: Vec<&Relationship> = self.graph.edge_weights().collect();
        relationships.sort_unstable();
        relationships
    }

    /// Outgoing relationships of one table, sorted.
    pub fn outgoing(&self, table: &str) -> Vec<&Relationship> {
        let mut outgoing: Vec<&Relationship> = self
            .graph
            .edge_weights()
            .filter(|rel| rel.from_table == table)
            .collect();
        outgoing.sort_unstable();
        outgoing
    }

    /// Number of relationships pointing at one table.
    pub fn referenced_by(&self, table: &str) -> usize {
        self.graph
            .edge_weights()
            .filter(|rel| rel.to_table == table)
            .count()
    }

    /// Groups of tables that reference each other in a cycle, each group
    /// sorted, via Tarjan's strongly-connected-components algorithm.
    pub fn circular_references(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut names: Vec<String> =
                    scc.iter().map(|&ix| self.graph[ix].clone()).collect();
                names.sort_unstable();
                names
            })
            .collect();
        cycles.sort_unstable();
        cycles
    }
}

/// Renders the graph as Graphviz DOT text with the chosen layout engine.
pub fn render_dot(map: &RelationGraph, layout: &str) -> String {
    let mut dot = String::new();

    dot.push_str("digraph relations {\n");
    dot.push_str(&format!("    layout={layout};\n"));
    dot.push_str("    rankdir=LR;\n");
    dot.push_str("    node [shape=box, style=rounded];\n");

    for table in map.tables() {
        dot.push_str(&format!("    \"{}\";\n", escape(table)));
    }
    for rel in map.relationships() {
        dot.push_str(&format!(
            "    \"{}\" -> \"{}\" [label=\"{} -> {}\"];\n",
            escape(&rel.from_table),
            escape(&rel.to_table),
            escape(&rel.from_column),
            escape(&rel.to_column),
        ));
    }

    dot.push_str("}\n");
    dot
}

fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Renders the relationship overview for the terminal.
pub fn render_text(map: &RelationGraph) -> String {
    let mut out = String::new();

    out.push_str("=== Database Relationship Map ===\n\n");

    if map.table_count() == 0 {
        out.push_str("No foreign-key relationships found in the database.\n");
        return out;
    }

    for table in map.tables() {
        out.push_str(&format!("Table: {}\n", table));

        for rel in map.outgoing(table) {
            out.push_str(&format!(
                "  -> {} ({} -> {})\n",
                rel.to_table, rel.from_column, rel.to_column
            ));
        }

        let incoming = map.referenced_by(table);
        if incoming > 0 {
            out.push_str(&format!("  referenced by {} relationship(s)\n", incoming));
        }

        out.push('\n');
    }

    let cycles = map.circular_references();
    if !cycles.is_empty() {
        out.push_str("Circular references:\n");
        for cycle in cycles {
            out.push_str(&format!("  {}\n", cycle.join(" <-> ")));
        }
    }

    out
}
