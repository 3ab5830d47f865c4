//! Terminal output formatting.

use colored::Colorize;
use relata_core::entity::Entity;
use relata_core::relationship::Relationship;
use relata_core::traversal::{CycleReport, GraphStructure, ShortestPath, TraversalNode};
use relata_graph::analytics::AnalyticsResult;
use relata_graph::{
    GraphPath, GraphStats, HealthStatus, QueryResult, SchemaDeclaration, SchemaOutcome,
    SyncReport, TraversalResult,
};

/// Print a single entity.
pub fn print_entity(entity: &Entity) {
    println!(
        "{} {}",
        entity.name.cyan().bold(),
        format!("({})", entity.id).dimmed()
    );
    println!("{}: {}", "Type".bold(), entity.entity_type);
    if !entity.attributes.is_null() && entity.attributes != serde_json::json!({}) {
        println!("{}: {}", "Attributes".bold(), entity.attributes);
    }
}

/// Print entities as a table.
pub fn print_entities_table(entities: &[Entity]) {
    if entities.is_empty() {
        println!("{}", "No entities found.".dimmed());
        return;
    }

    println!("{:<36} {:<16} {:<30}", "ID", "Type", "Name");
    println!("{}", "─".repeat(84));
    for entity in entities {
        println!(
            "{:<36} {:<16} {:<30}",
            entity.id,
            entity.entity_type,
            truncate(&entity.name, 28)
        );
    }
}

/// Print a single relationship.
pub fn print_relationship(rel: &Relationship) {
    println!(
        "{} {} {} {}",
        rel.source_id.cyan(),
        format!("-[{}]->", rel.relationship_type.as_str()).yellow(),
        rel.target_id.cyan(),
        format!("({})", rel.id).dimmed()
    );
    println!("{}: {}", "Cardinality".bold(), rel.cardinality.as_str());
    println!("{}: {}", "Bidirectional".bold(), rel.is_bidirectional);
    let state = if rel.is_active {
        "active".green()
    } else {
        "deleted".red()
    };
    println!("{}: {}", "State".bold(), state);
    println!("{}: {}", "Created".bold(), rel.created_at.dimmed());
}

/// Print relationships as a table.
pub fn print_relationships_table(rels: &[Relationship]) {
    if rels.is_empty() {
        println!("{}", "No relationships found.".dimmed());
        return;
    }

    println!(
        "{:<36} {:<14} {:<14} {:<12} {:<12}",
        "ID", "Source", "Target", "Type", "Cardinality"
    );
    println!("{}", "─".repeat(92));
    for rel in rels {
        println!(
            "{:<36} {:<14} {:<14} {:<12} {:<12}",
            rel.id,
            truncate(&rel.source_id, 12),
            truncate(&rel.target_id, 12),
            rel.relationship_type.as_str(),
            rel.cardinality.as_str()
        );
    }
    println!("\n{} relationships.", rels.len().to_string().bold());
}

/// Print relational traversal nodes, indented by depth.
pub fn print_traversal_nodes(nodes: &[TraversalNode]) {
    if nodes.is_empty() {
        println!("{}", "No nodes reached.".dimmed());
        return;
    }

    for node in nodes {
        let name = node
            .entity
            .as_ref()
            .map(|e| e.name.as_str())
            .unwrap_or("<missing>");
        println!(
            "{}{} {} {}",
            "  ".repeat(node.depth),
            "•".dimmed(),
            node.entity_id.cyan(),
            name.dimmed()
        );
    }
    println!("\n{} nodes visited.", nodes.len().to_string().bold());
}

/// Print a relational shortest path.
pub fn print_shortest_path(path: Option<&ShortestPath>) {
    match path {
        Some(path) => {
            println!("{}", path.path.join(" -> ").cyan());
            println!("{}: {}", "Length".bold(), path.length);
        }
        None => println!("{}", "No path found.".dimmed()),
    }
}

/// Print a cycle-detection report.
pub fn print_cycle_report(report: &CycleReport) {
    if report.has_circular_reference {
        println!("{}", "Circular reference detected".red().bold());
        println!("{}: {}", "Cycle".bold(), report.cycle.join(" -> ").yellow());
        println!("{}: {}", "Length".bold(), report.cycle_length);
    } else {
        println!("{}", "No circular reference found.".green());
    }
}

/// Print a bounded graph snapshot.
pub fn print_graph_structure(structure: &GraphStructure) {
    println!(
        "{} ({} entities, {} relationships)",
        "Graph structure".bold(),
        structure.entities.len(),
        structure.relationships.len()
    );
    println!("{}", "─".repeat(50));
    for entity in &structure.entities {
        println!("  {} {}", "•".dimmed(), entity.id.cyan());
    }
    for rel in &structure.relationships {
        println!(
            "  {} {} {}",
            rel.source_id.dimmed(),
            format!("-[{}]->", rel.relationship_type.as_str()).yellow(),
            rel.target_id.dimmed()
        );
    }
}

/// Print a graph-store traversal result.
pub fn print_traversal_result(result: &TraversalResult) {
    if result.total_vertices == 0 {
        println!("{}", "No vertices found.".dimmed());
        return;
    }

    println!("{} ({}):", "Vertices".bold(), result.total_vertices);
    for vertex in &result.vertices {
        println!(
            "  {} [{}] {}",
            "•".dimmed(),
            vertex.tag.dimmed(),
            vertex.id.cyan()
        );
    }

    if result.total_edges > 0 {
        println!("\n{} ({}):", "Edges".bold(), result.total_edges);
        for edge in &result.edges {
            println!(
                "  {} {} {}",
                edge.source_id.dimmed(),
                format!("-[{}]->", edge.edge_type).yellow(),
                edge.target_id.dimmed()
            );
        }
    }
}

/// Print a single graph-store path.
pub fn print_graph_path(path: Option<&GraphPath>) {
    match path {
        Some(path) => {
            let ids: Vec<&str> = path.vertices.iter().map(|v| v.id.as_str()).collect();
            println!("{}", ids.join(" -> ").cyan());
            println!("{}: {}", "Length".bold(), path.length);
        }
        None => println!("{}", "No path found.".dimmed()),
    }
}

/// Print every discovered path.
pub fn print_graph_paths(paths: &[GraphPath]) {
    if paths.is_empty() {
        println!("{}", "No paths found.".dimmed());
        return;
    }
    for (i, path) in paths.iter().enumerate() {
        let ids: Vec<&str> = path.vertices.iter().map(|v| v.id.as_str()).collect();
        println!(
            "{}: {} {}",
            (i + 1).to_string().dimmed(),
            ids.join(" -> ").cyan(),
            format!("(length {})", path.length).dimmed()
        );
    }
    println!("\n{} paths.", paths.len().to_string().bold());
}

/// Print a raw query result as a table.
pub fn print_query_result(result: &QueryResult) {
    if result.rows.is_empty() {
        println!("{}", "No results.".dimmed());
        println!("{}", format!("({} ms)", result.execution_time_ms).dimmed());
        return;
    }

    println!("{}", result.columns.join(" | ").bold());
    println!("{}", "─".repeat(60));
    for row in &result.rows {
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        println!("{}", cells.join(" | "));
    }
    println!(
        "\n{} rows {}",
        result.row_count.to_string().bold(),
        format!("({} ms)", result.execution_time_ms).dimmed()
    );
}

/// Print an analytics result.
pub fn print_analytics(result: &AnalyticsResult) {
    println!("{}", result.algorithm.bold());
    println!("{}", "─".repeat(50));

    if let Some(error) = result.summary.get("error").and_then(|v| v.as_str()) {
        println!("{} {}", "Degraded:".red().bold(), error);
        return;
    }

    if result.items.is_empty() {
        println!("{}", "No scored vertices.".dimmed());
    } else {
        println!("{:<6} {:<24} {:<14}", "Rank", "Vertex", "Score");
        for item in &result.items {
            println!(
                "{:<6} {:<24} {:<14.6}",
                item.rank,
                truncate(&item.vertex_id, 22),
                item.score
            );
        }
    }

    if !result.summary.is_empty() {
        println!("\n{}", "Summary".bold());
        for (key, value) in &result.summary {
            println!("  {}: {}", key, cell_to_string(value));
        }
    }
}

/// Print a sync report.
pub fn print_sync_report(report: &SyncReport) {
    println!("\n{}", "Sync complete:".green().bold());
    println!("  Entities synced:      {}", report.instances_synced);
    println!("  Relationships synced: {}", report.relationships_synced);
    if !report.errors.is_empty() {
        println!("\n{} ({}):", "Errors".red().bold(), report.errors.len());
        for error in &report.errors {
            println!("  {} {}", "x".red(), error);
        }
    }
}

/// Print graph health.
pub fn print_health(health: &HealthStatus) {
    println!("{}", "Graph Health".bold());
    println!("{}", "─".repeat(40));
    println!("  Connected:    {}", flag(health.connected));
    println!("  Initialized:  {}", flag(health.initialized));
    println!("  Sync enabled: {}", flag(health.sync_enabled));
    println!("  Vertices:     {}", health.vertex_count.to_string().cyan());
    println!("  Edges:        {}", health.edge_count.to_string().cyan());
}

/// Print graph totals.
pub fn print_stats(stats: &GraphStats) {
    println!("{}", "Graph Status".bold());
    println!("{}", "─".repeat(40));
    println!("  Vertices: {}", stats.vertex_count.to_string().cyan());
    println!("  Edges:    {}", stats.edge_count.to_string().cyan());
}

/// Print schema declaration outcomes.
pub fn print_schema(declarations: &[SchemaDeclaration]) {
    println!("{}", "Schema declarations".bold());
    println!("{}", "─".repeat(40));
    for declaration in declarations {
        let outcome = match &declaration.outcome {
            SchemaOutcome::Created => "created".green(),
            SchemaOutcome::AlreadyExists => "exists".dimmed(),
            SchemaOutcome::Failed(e) => format!("failed: {e}").red(),
        };
        println!("  {:<20} {}", declaration.name, outcome);
    }
}

fn flag(on: bool) -> colored::ColoredString {
    if on {
        "yes".green()
    } else {
        "no".red()
    }
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max.saturating_sub(3)])
    }
}
