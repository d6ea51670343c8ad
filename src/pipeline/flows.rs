//! Sankey flow tables: node list plus weighted edges between consecutive stages

use std::collections::HashMap;
use std::ops::Range;

use serde::Serialize;

use super::error::PipelineError;
use super::schema::{Dimension, Record};

/// Nodes and weighted links between categorical stages.
///
/// `sources[k] -> targets[k]` carries `weights[k]` records. Every index
/// refers into `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowTable {
    /// Stage names in order
    pub stages: Vec<String>,
    /// Node labels, stage by stage
    pub labels: Vec<String>,
    /// Stage index of each node
    pub node_stage: Vec<usize>,
    pub sources: Vec<usize>,
    pub targets: Vec<usize>,
    pub weights: Vec<u64>,
}

impl FlowTable {
    pub fn edge_count(&self) -> usize {
        self.sources.len()
    }

    /// Total weight leaving nodes of `stage`
    pub fn outgoing_weight(&self, stage: usize) -> u64 {
        self.sources
            .iter()
            .zip(&self.weights)
            .filter(|(src, _)| self.node_stage[**src] == stage)
            .map(|(_, w)| *w)
            .sum()
    }
}

/// Build a flow table across `stages` (at least two).
///
/// Nodes: the distinct labels of each stage in the order first seen, stages
/// concatenated; equal labels in different stages stay separate nodes.
/// Edges: for each consecutive stage pair, every (source node, target node)
/// combination in node order whose record count is positive.
pub fn build_flows(records: &[&Record], stages: &[Dimension]) -> Result<FlowTable, PipelineError> {
    if stages.len() < 2 {
        return Err(PipelineError::TooFewStages(stages.len()));
    }

    let mut table = FlowTable {
        stages: stages.iter().map(|d| d.name().to_string()).collect(),
        ..Default::default()
    };

    // Pass 1: fixed node numbering
    let mut node_index: Vec<HashMap<&str, usize>> = Vec::with_capacity(stages.len());
    let mut stage_ranges: Vec<Range<usize>> = Vec::with_capacity(stages.len());
    for (stage, dim) in stages.iter().enumerate() {
        let start = table.labels.len();
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for record in records {
            if let Some(label) = dim.label(record) {
                if !seen.contains_key(label) {
                    seen.insert(label, table.labels.len());
                    table.labels.push(label.to_string());
                    table.node_stage.push(stage);
                }
            }
        }
        stage_ranges.push(start..table.labels.len());
        node_index.push(seen);
    }

    // Pass 2: edges between consecutive stages, referencing node indices only
    for pair in 0..stages.len() - 1 {
        let (from, to) = (&stages[pair], &stages[pair + 1]);
        let mut counts: HashMap<(usize, usize), u64> = HashMap::new();

        for record in records {
            let (Some(a), Some(b)) = (from.label(record), to.label(record)) else {
                continue;
            };
            if let (Some(&src), Some(&tgt)) = (node_index[pair].get(a), node_index[pair + 1].get(b)) {
                *counts.entry((src, tgt)).or_insert(0) += 1;
            }
        }

        for src in stage_ranges[pair].clone() {
            for tgt in stage_ranges[pair + 1].clone() {
                if let Some(&count) = counts.get(&(src, tgt)) {
                    if count > 0 {
                        table.sources.push(src);
                        table.targets.push(tgt);
                        table.weights.push(count);
                    }
                }
            }
        }
    }

    Ok(table)
}
