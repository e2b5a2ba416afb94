//! Duplicate and near-duplicate block clustering
//!
//! Two passes over the extracted blocks:
//!
//! 1. exact: blocks sharing a content hash form a cluster with similarity 1.0
//! 2. approximate: every remaining pair is scored with the Jaccard index of
//!    its token sets, pairs at or above the threshold are linked, and the
//!    connected components of those links become clusters
//!
//! The approximate pass is O(n²) in the number of remaining blocks and
//! dominates the run time on large corpora; with `parallel` set it is spread
//! over the rayon pool. Grouping is transitive: A~B and B~C put A, B and C in
//! one cluster even when A~C is below the threshold.
//!
//! Blocks whose token set is empty (for example a fence holding only
//! comments) still take part in the exact pass but never in the
//! approximate one.

use std::collections::{BTreeMap, HashMap};

use petgraph::unionfind::UnionFind;
use rayon::prelude::*;
use repointel_core::{
    ClusterMember, CodeBlock, ContentHash, MatchKind, RedundancyCluster, RedundancyConfig,
    RedundancyReport,
};
use tracing::{debug, info};

pub struct RedundancyClusterer {
    config: RedundancyConfig,
}

/// A cluster before numbering, as indices into the block list.
struct Group {
    kind: MatchKind,
    members: Vec<usize>,
    similarity: f64,
}

/// A linked pair from the approximate pass.
struct Link {
    a: usize,
    b: usize,
    similarity: f64,
}

impl RedundancyClusterer {
    pub fn new(config: RedundancyConfig) -> Self {
        RedundancyClusterer { config }
    }

    pub fn cluster(&self, blocks: &[CodeBlock]) -> RedundancyReport {
        let (mut groups, mut remaining) = exact_groups(blocks);
        let exact = groups.len();

        // Blocks without tokens only ever match exactly.
        remaining.retain(|&idx| !blocks[idx].tokens.is_empty());

        let comparisons = pair_count(remaining.len());
        let links = self.link_pairs(blocks, &remaining);
        groups.extend(connected_groups(&remaining, &links));

        debug!(
            "{} exact groups, {} approximate groups from {} links",
            exact,
            groups.len() - exact,
            links.len()
        );

        groups.sort_by_key(|g| g.members[0]);
        let clusters: Vec<RedundancyCluster> = groups
            .into_iter()
            .enumerate()
            .map(|(i, group)| build_cluster(i + 1, group, blocks))
            .collect();

        let report = RedundancyReport {
            blocks_analyzed: blocks.len(),
            comparisons,
            total_clusters: clusters.len(),
            total_duplicate_blocks: clusters.iter().map(RedundancyCluster::len).sum(),
            total_potential_savings: clusters.iter().map(|c| c.potential_savings_lines).sum(),
            clusters,
        };

        info!(
            "redundancy: {} clusters over {} blocks, {} lines removable",
            report.total_clusters, report.blocks_analyzed, report.total_potential_savings
        );
        report
    }

    /// Score every pair of `candidates` and keep those at or above the threshold.
    fn link_pairs(&self, blocks: &[CodeBlock], candidates: &[usize]) -> Vec<Link> {
        let threshold = self.config.similarity_threshold;
        let pairs_from = move |i: usize| {
            let a = candidates[i];
            candidates[i + 1..].iter().filter_map(move |&b| {
                let similarity = blocks[a].tokens.jaccard(&blocks[b].tokens);
                (similarity >= threshold).then_some(Link { a, b, similarity })
            })
        };

        let mut links: Vec<Link> = if self.config.parallel {
            (0..candidates.len())
                .into_par_iter()
                .flat_map_iter(pairs_from)
                .collect()
        } else {
            (0..candidates.len()).flat_map(pairs_from).collect()
        };

        links.sort_by_key(|l| (l.a, l.b));
        links
    }
}

fn exact_groups(blocks: &[CodeBlock]) -> (Vec<Group>, Vec<usize>) {
    let mut by_hash: HashMap<&ContentHash, usize> = HashMap::new();
    let mut buckets: Vec<Vec<usize>> = Vec::new();

    for (idx, block) in blocks.iter().enumerate() {
        match by_hash.get(&block.content_hash) {
            Some(&bucket) => buckets[bucket].push(idx),
            None => {
                by_hash.insert(&block.content_hash, buckets.len());
                buckets.push(vec![idx]);
            }
        }
    }

    let mut groups = Vec::new();
    let mut remaining = Vec::new();
    for bucket in buckets {
        if bucket.len() >= 2 {
            groups.push(Group {
                kind: MatchKind::Exact,
                members: bucket,
                similarity: 1.0,
            });
        } else {
            remaining.extend(bucket);
        }
    }
    remaining.sort_unstable();

    (groups, remaining)
}

/// Connected components of the link graph over `candidates`.
fn connected_groups(candidates: &[usize], links: &[Link]) -> Vec<Group> {
    let slot: HashMap<usize, usize> =
        candidates.iter().enumerate().map(|(s, &b)| (b, s)).collect();
    let mut sets = UnionFind::<usize>::new(candidates.len());
    for link in links {
        sets.union(slot[&link.a], slot[&link.b]);
    }

    let mut components: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (s, &block) in candidates.iter().enumerate() {
        components.entry(sets.find_mut(s)).or_default().push(block);
    }

    let mut min_similarity: HashMap<usize, f64> = HashMap::new();
    for link in links {
        let root = sets.find_mut(slot[&link.a]);
        let entry = min_similarity.entry(root).or_insert(1.0);
        *entry = entry.min(link.similarity);
    }

    components
        .into_iter()
        .filter(|(_, members)| members.len() >= 2)
        .map(|(root, members)| Group {
            kind: MatchKind::Approximate,
            members,
            similarity: min_similarity.get(&root).copied().unwrap_or(1.0),
        })
        .collect()
}

fn build_cluster(cluster_id: usize, group: Group, blocks: &[CodeBlock]) -> RedundancyCluster {
    let members: Vec<ClusterMember> = group
        .members
        .iter()
        .map(|&idx| ClusterMember::from(&blocks[idx]))
        .collect();

    // The first member stays; every other copy could collapse into it.
    let potential_savings_lines = members
        .iter()
        .skip(1)
        .map(|m| m.line_count.saturating_sub(1))
        .sum();

    let mut cluster = RedundancyCluster {
        cluster_id,
        match_kind: group.kind,
        members,
        similarity_score: group.similarity,
        potential_savings_lines,
        recommendation: String::new(),
    };
    cluster.recommendation = recommendation(&cluster);
    cluster
}

fn recommendation(cluster: &RedundancyCluster) -> String {
    let files = cluster.files();
    match files.iter().next() {
        Some(file) if files.len() == 1 => format!(
            "Multiple code blocks in {} - consider extracting to reusable function",
            file.display()
        ),
        _ => format!(
            "Code appears in {} files - consider creating shared module",
            files.len()
        ),
    }
}

fn pair_count(n: usize) -> u64 {
    let n = n as u64;
    n * n.saturating_sub(1) / 2
}
