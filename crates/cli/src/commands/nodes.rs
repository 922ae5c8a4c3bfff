//! `sgctl nodes`

use anyhow::{Context, Result};
use guard_lib::{Gateway, Node};
use tabled::Tabled;

use crate::output::{color_status, print_table, OutputFormat};

#[derive(Tabled)]
struct NodeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn status_text(node: &Node) -> String {
    serde_json::to_value(node.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn rows(nodes: &[Node]) -> Vec<NodeRow> {
    nodes
        .iter()
        .map(|node| NodeRow {
            id: node.id.clone(),
            name: node.name.clone(),
            address: node.address.clone(),
            kind: node.kind.clone(),
            status: color_status(&status_text(node)),
        })
        .collect()
}

pub async fn fetch_nodes(gateway: &dyn Gateway) -> Result<Vec<Node>> {
    gateway.nodes().await.context("Failed to list fleet nodes")
}

pub async fn list_nodes(gateway: &dyn Gateway, format: OutputFormat) -> Result<()> {
    let nodes = fetch_nodes(gateway).await?;
    print_table(rows(&nodes), &nodes, format);
    Ok(())
}
