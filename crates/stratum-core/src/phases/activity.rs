//! Phase 4: Commit activity per community and for the whole repository.

use log::debug;
use std::collections::{BTreeMap, HashMap};

use crate::aggregate::{Aggregate, Committer, RepositoryActivity};
use crate::config::{AnalysisConfig, AnalyzedFile, Commit};
use crate::graph::node_id::{CommunityId, NodeId};

/// Committers listed in the repository-wide summary.
const TOP_REPOSITORY_COMMITTERS: usize = 3;

/// Run the activity phase: committers and bus factor per community plus the
/// repository-wide summary.
pub fn run_activity_phase(config: &AnalysisConfig, files: &[AnalyzedFile], agg: &mut Aggregate) {
    if let Some(metrics) = agg.community.as_mut() {
        let per_community = community_commit_counts(config, files, &metrics.node_to_community);
        metrics.top_committers.clear();
        metrics.bus_factor.clear();
        for (community, counts) in per_community {
            let committers = rank_committers(counts);
            metrics
                .bus_factor
                .insert(community.clone(), bus_factor(&committers));
            metrics.top_committers.insert(community, committers);
        }
    }

    let repository = repository_activity(config, files);
    debug!(
        "repository bus factor {} across {} committers",
        repository.bus_factor,
        repository.top_committers.len()
    );
    agg.activity = Some(repository);
}

/// Community owning a file: its namespace declaration (or, lacking one, its
/// path) truncated to the analysis depth.
pub fn file_community<'a>(
    config: &AnalysisConfig,
    file: &AnalyzedFile,
    node_to_community: &'a BTreeMap<NodeId, CommunityId>,
) -> Option<&'a CommunityId> {
    let source = file
        .namespace
        .as_deref()
        .filter(|ns| !ns.trim().is_empty())
        .unwrap_or(&file.path);
    let node = NodeId::from_namespace(source, config.namespace_depth)?;
    node_to_community.get(&node)
}

fn counts_author(config: &AnalysisConfig, commit: &Commit) -> bool {
    !commit.author.is_empty() && !config.excluded_authors.contains(&commit.author)
}

/// Commit counts per author for every community that owns at least one file.
pub fn community_commit_counts(
    config: &AnalysisConfig,
    files: &[AnalyzedFile],
    node_to_community: &BTreeMap<NodeId, CommunityId>,
) -> BTreeMap<CommunityId, HashMap<String, usize>> {
    let mut counts: BTreeMap<CommunityId, HashMap<String, usize>> = BTreeMap::new();
    for file in files {
        let Some(community) = file_community(config, file, node_to_community) else {
            continue;
        };
        let table = counts.entry(community.clone()).or_default();
        for commit in file.commits.iter().flatten() {
            if counts_author(config, commit) {
                *table.entry(commit.author.clone()).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Committers sorted by commits descending, ties by name.
pub fn rank_committers(counts: HashMap<String, usize>) -> Vec<Committer> {
    let mut committers: Vec<Committer> = counts
        .into_iter()
        .map(|(name, commits)| Committer { name, commits })
        .collect();
    committers.sort_by(|a, b| b.commits.cmp(&a.commits).then_with(|| a.name.cmp(&b.name)));
    committers
}

/// Smallest number of top committers covering at least half of all commits.
///
/// `committers` must be ranked (see [`rank_committers`]). Returns 0 when
/// nobody committed.
pub fn bus_factor(committers: &[Committer]) -> usize {
    let total: usize = committers.iter().map(|c| c.commits).sum();
    if total == 0 {
        return 0;
    }
    let mut cumulative = 0;
    for (i, committer) in committers.iter().enumerate() {
        cumulative += committer.commits;
        if 2 * cumulative >= total {
            return i + 1;
        }
    }
    committers.len()
}

/// Bus factor and top committers over every file of the repository.
pub fn repository_activity(config: &AnalysisConfig, files: &[AnalyzedFile]) -> RepositoryActivity {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for commit in files.iter().flat_map(|f| f.commits.iter().flatten()) {
        if counts_author(config, commit) {
            *counts.entry(commit.author.clone()).or_insert(0) += 1;
        }
    }
    let mut committers = rank_committers(counts);
    let bus_factor = bus_factor(&committers);
    committers.truncate(TOP_REPOSITORY_COMMITTERS);
    RepositoryActivity {
        bus_factor,
        top_committers: committers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn commit(author: &str) -> Commit {
        Commit {
            hash: format!("h-{author}"),
            author: author.to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    fn file(path: &str, namespace: Option<&str>, authors: &[&str]) -> AnalyzedFile {
        AnalyzedFile {
            path: path.to_string(),
            namespace: namespace.map(str::to_string),
            dependencies: Vec::new(),
            commits: Some(authors.iter().map(|a| commit(a)).collect()),
        }
    }

    fn committers(pairs: &[(&str, usize)]) -> Vec<Committer> {
        pairs
            .iter()
            .map(|(n, c)| Committer {
                name: n.to_string(),
                commits: *c,
            })
            .collect()
    }

    #[test]
    fn bus_factor_single_dominant_author() {
        assert_eq!(
            bus_factor(&committers(&[("alice", 7), ("bob", 2), ("carol", 1)])),
            1
        );
    }

    #[test]
    fn bus_factor_even_split() {
        assert_eq!(
            bus_factor(&committers(&[("a", 3), ("b", 3), ("c", 3), ("d", 3)])),
            2
        );
        assert_eq!(bus_factor(&committers(&[("a", 2), ("b", 2), ("c", 1)])), 2);
    }

    #[test]
    fn bus_factor_without_commits() {
        assert_eq!(bus_factor(&[]), 0);
    }

    #[test]
    fn ranks_by_commits_then_name() {
        let mut counts = HashMap::new();
        counts.insert("zoe".to_string(), 2);
        counts.insert("adam".to_string(), 2);
        counts.insert("max".to_string(), 5);
        let ranked = rank_committers(counts);
        let names: Vec<&str> = ranked.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["max", "adam", "zoe"]);
    }

    #[test]
    fn namespace_wins_over_path() {
        let config = AnalysisConfig::default();
        let mut n2c = BTreeMap::new();
        n2c.insert(NodeId::new("App\\Domain\\Billing"), CommunityId::from("App\\Domain\\Billing"));
        n2c.insert(NodeId::new("src/legacy/tools"), CommunityId::from("src/legacy/tools"));

        let declared = file("src/x.php", Some("App\\Domain\\Billing\\Invoice"), &[]);
        assert_eq!(
            file_community(&config, &declared, &n2c).map(|c| c.as_str()),
            Some("App\\Domain\\Billing")
        );
        let undeclared = file("src/legacy/tools/run.sh", None, &[]);
        assert_eq!(
            file_community(&config, &undeclared, &n2c).map(|c| c.as_str()),
            Some("src/legacy/tools")
        );
        let unmapped = file("vendor/lib.php", None, &[]);
        assert!(file_community(&config, &unmapped, &n2c).is_none());
    }

    #[test]
    fn phase_counts_per_community() {
        let config = AnalysisConfig {
            excluded_authors: vec!["bot".to_string()],
            ..Default::default()
        };
        let mut agg = Aggregate::new();
        let mut metrics = crate::aggregate::CommunityMetrics::default();
        metrics
            .node_to_community
            .insert(NodeId::new("A\\B\\C"), CommunityId::from("A\\B\\C"));
        agg.community = Some(metrics);

        let files = vec![
            file("a.php", Some("A\\B\\C\\D"), &["alice", "alice", "bob", "bot", ""]),
            file("b.php", Some("A\\B\\C"), &["alice"]),
            file("other.php", Some("X\\Y\\Z"), &["carol", "carol", "carol", "carol"]),
        ];
        run_activity_phase(&config, &files, &mut agg);

        let m = agg.community.unwrap();
        let top = &m.top_committers[&CommunityId::from("A\\B\\C")];
        assert_eq!(top, &committers(&[("alice", 3), ("bob", 1)]));
        assert_eq!(m.bus_factor[&CommunityId::from("A\\B\\C")], 1);

        let repo = agg.activity.unwrap();
        assert_eq!(repo.top_committers, committers(&[("carol", 4), ("alice", 3), ("bob", 1)]));
        assert_eq!(repo.bus_factor, 1);
    }

    #[test]
    fn mapped_files_without_commits_get_empty_tables() {
        let config = AnalysisConfig::default();
        let mut n2c = BTreeMap::new();
        n2c.insert(NodeId::new("A\\B\\C"), CommunityId::from("A\\B\\C"));
        let mut f = file("a.php", Some("A\\B\\C"), &[]);
        f.commits = None;
        let counts = community_commit_counts(&config, &[f], &n2c);
        assert!(counts[&CommunityId::from("A\\B\\C")].is_empty());
    }
}
