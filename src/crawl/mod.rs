//! Round-based co-actor expansion from a seed actor.
//!
//! The base round queries the seed's credits and links every billed cast
//! member to the seed. Each further round repeats this for every actor
//! surfaced by the previous round, excluding the actor from their own casts.
//! Frontiers are not deduplicated against earlier rounds, so an actor that
//! resurfaces is queried again.

use std::path::Path;
use std::time::Instant;

use serde::Serialize;

use crate::error::{CoactorError, Result};
use crate::graph::{sanitize_name, Graph, Node};
use crate::tmdb::{CreditsSource, DateWindow};

/// What to crawl and how far.
#[derive(Debug, Clone)]
pub struct CrawlPlan {
    pub seed_id: String,
    pub seed_name: String,
    /// Release-date window applied to every credits query
    pub window: DateWindow,
    /// Top-billed cast members taken per movie
    pub cast_limit: usize,
    /// Expansion rounds after the base round
    pub rounds: usize,
}

/// Counters for one round. Round 0 is the base round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoundReport {
    pub round: usize,
    /// Actors whose credits were queried
    pub actors: usize,
    /// Credits inside the window across those actors
    pub credits: usize,
    /// Cast members surfaced, duplicates included
    pub cast_members: usize,
}

impl CrawlPlan {
    /// Reject plans that cannot produce a meaningful crawl.
    pub fn validate(&self) -> Result<()> {
        if self.seed_id.trim().is_empty() {
            return Err(CoactorError::InvalidInput("seed id must not be empty".to_string()));
        }
        if let (Some(start), Some(end)) = (&self.window.start, &self.window.end) {
            if start > end {
                return Err(CoactorError::InvalidInput(format!(
                    "date window start {} is after end {}",
                    start, end
                )));
            }
        }
        Ok(())
    }
}

/// Summary of a finished crawl.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlReport {
    pub rounds: Vec<RoundReport>,
    pub total_nodes: usize,
    pub total_edges: usize,
    pub elapsed_ms: u128,
}

/// Grow a co-actor graph from `plan.seed_id`.
///
/// Errors from `source` abort the crawl and are returned as-is. A credit
/// whose cast comes back empty contributes nothing and the crawl moves on.
pub async fn expand_graph<S>(source: &S, plan: &CrawlPlan) -> Result<(Graph, CrawlReport)>
where
    S: CreditsSource + ?Sized,
{
    plan.validate()?;

    let start = Instant::now();
    let mut graph = Graph::new();
    graph.add_node(&plan.seed_id, &plan.seed_name);

    let seed = Node {
        id: plan.seed_id.clone(),
        name: sanitize_name(&plan.seed_name),
    };

    let mut report = CrawlReport::default();
    let (mut frontier, base) =
        expand_round(source, &mut graph, plan, std::slice::from_ref(&seed), 0).await?;
    report.rounds.push(base);

    for round in 1..=plan.rounds {
        let (next, stats) = expand_round(source, &mut graph, plan, &frontier, round).await?;
        report.rounds.push(stats);
        frontier = next;
    }

    report.total_nodes = graph.total_nodes();
    report.total_edges = graph.total_edges();
    report.elapsed_ms = start.elapsed().as_millis();

    log::info!(
        "Crawl finished: {} nodes, {} edges in {} ms",
        report.total_nodes,
        report.total_edges,
        report.elapsed_ms
    );

    Ok((graph, report))
}

/// Query every actor in `actors` once per occurrence and link them to
/// their billed co-actors. Returns every cast member surfaced, in order.
async fn expand_round<S>(
    source: &S,
    graph: &mut Graph,
    plan: &CrawlPlan,
    actors: &[Node],
    round: usize,
) -> Result<(Vec<Node>, RoundReport)>
where
    S: CreditsSource + ?Sized,
{
    log::info!("Round {}: expanding {} actor(s)", round, actors.len());

    let mut stats = RoundReport {
        round,
        actors: actors.len(),
        ..RoundReport::default()
    };
    let mut surfaced = Vec::new();

    for actor in actors {
        let credits = source.get_credits(&actor.id, &plan.window).await?;
        stats.credits += credits.len();

        // The seed's own casts are taken unfiltered
        let exclude = if round == 0 {
            Vec::new()
        } else {
            vec![actor.id.clone()]
        };

        for credit in &credits {
            let cast = source
                .get_cast(&credit.id, Some(plan.cast_limit), &exclude)
                .await?;

            if cast.is_empty() {
                log::debug!("No cast for {} ({}), skipping", credit.title, credit.id);
                continue;
            }

            for member in cast {
                graph.add_node(&member.id, &member.name);
                graph.add_edge(&actor.id, &member.id);
                surfaced.push(Node {
                    name: sanitize_name(&member.name),
                    id: member.id,
                });
            }
        }
    }

    stats.cast_members = surfaced.len();
    log::info!(
        "Round {} done: {} credits, {} cast members, graph now {} nodes / {} edges",
        round,
        stats.credits,
        stats.cast_members,
        graph.total_nodes(),
        graph.total_edges()
    );

    Ok((surfaced, stats))
}

/// Run [`expand_graph`] and write the resulting edges and nodes tables.
pub async fn build_coactor_network<S, P, Q>(
    source: &S,
    plan: &CrawlPlan,
    nodes_path: P,
    edges_path: Q,
) -> Result<(Graph, CrawlReport)>
where
    S: CreditsSource + ?Sized,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let (graph, report) = expand_graph(source, plan).await?;
    graph.write_edges(edges_path)?;
    graph.write_nodes(nodes_path)?;
    Ok((graph, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tmdb::{filter_credits, select_cast, CastMember, Credit};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// In-memory credits source that records which people were queried.
    #[derive(Default)]
    struct FakeSource {
        credits: HashMap<String, Vec<Credit>>,
        casts: HashMap<String, Vec<CastMember>>,
        failing_person: Option<String>,
        queried: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn credit(mut self, person: &str, movie: &str, date: &str) -> Self {
            self.credits.entry(person.to_string()).or_default().push(Credit {
                id: movie.to_string(),
                title: format!("Movie {}", movie),
                release_date: Some(date.to_string()),
            });
            self
        }

        /// Cast listed in billing order.
        fn cast(mut self, movie: &str, people: &[(&str, &str)]) -> Self {
            let members = people
                .iter()
                .enumerate()
                .map(|(order, (id, name))| CastMember {
                    id: id.to_string(),
                    name: name.to_string(),
                    character: None,
                    order: Some(order as u32),
                })
                .collect();
            self.casts.insert(movie.to_string(), members);
            self
        }

        fn queries_for(&self, person: &str) -> usize {
            self.queried
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.as_str() == person)
                .count()
        }
    }

    #[async_trait]
    impl CreditsSource for FakeSource {
        async fn get_credits(&self, person_id: &str, window: &DateWindow) -> Result<Vec<Credit>> {
            self.queried.lock().unwrap().push(person_id.to_string());
            if self.failing_person.as_deref() == Some(person_id) {
                return Err(CoactorError::Api("connection refused".to_string()));
            }
            let credits = self.credits.get(person_id).cloned().unwrap_or_default();
            Ok(filter_credits(credits, window))
        }

        async fn get_cast(
            &self,
            movie_id: &str,
            limit: Option<usize>,
            exclude_ids: &[String],
        ) -> Result<Vec<CastMember>> {
            let cast = self.casts.get(movie_id).cloned().unwrap_or_default();
            Ok(select_cast(cast, limit, exclude_ids))
        }
    }

    fn plan(rounds: usize) -> CrawlPlan {
        CrawlPlan {
            seed_id: "2975".to_string(),
            seed_name: "Laurence Fishburne".to_string(),
            window: DateWindow::new("1999-01-01", "1999-12-31"),
            cast_limit: 5,
            rounds,
        }
    }

    #[tokio::test]
    async fn test_base_round_links_seed_to_cast() {
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("6384", "Keanu Reeves"), ("530", "Carrie-Anne Moss"), ("1331", "Hugo Weaving")]);

        let (graph, report) = expand_graph(&source, &plan(0)).await.unwrap();

        assert_eq!(graph.total_nodes(), 4);
        assert_eq!(graph.total_edges(), 3);
        for co_actor in ["6384", "530", "1331"] {
            assert!(graph.contains_edge("2975", co_actor));
        }
        assert!(!graph.contains_edge("6384", "530"));
        assert!(!graph.contains_edge("6384", "1331"));
        assert!(!graph.contains_edge("530", "1331"));
        assert_eq!(
            report.rounds,
            vec![RoundReport { round: 0, actors: 1, credits: 1, cast_members: 3 }]
        );
    }

    #[tokio::test]
    async fn test_credits_outside_window_are_ignored() {
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .credit("2975", "604", "2003-05-15")
            .cast("603", &[("6384", "Keanu Reeves")])
            .cast("604", &[("9999", "Reloaded Only")]);

        let (graph, _) = expand_graph(&source, &plan(0)).await.unwrap();

        assert!(graph.contains_node("6384"));
        assert!(!graph.contains_node("9999"));
    }

    #[tokio::test]
    async fn test_base_round_caps_cast_at_limit() {
        let cast: Vec<(String, String)> = (0..8)
            .map(|i| (format!("p{}", i), format!("Person {}", i)))
            .collect();
        let cast_refs: Vec<(&str, &str)> =
            cast.iter().map(|(id, name)| (id.as_str(), name.as_str())).collect();
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &cast_refs);

        let (graph, _) = expand_graph(&source, &plan(0)).await.unwrap();

        assert_eq!(graph.total_nodes(), 6); // seed + 5
        assert!(!graph.contains_node("p5"));
    }

    #[tokio::test]
    async fn test_expansion_excludes_actor_without_backfill() {
        // In movie 700 actor "a" is billed at order 1; with a limit of 2 and
        // "a" excluded only "top" remains, "third" is not pulled in.
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("a", "Actor A")])
            .credit("a", "700", "1999-08-01")
            .cast("700", &[("top", "Top Billed"), ("a", "Actor A"), ("third", "Third Billed")]);

        let mut plan = plan(1);
        plan.cast_limit = 2;
        let (graph, report) = expand_graph(&source, &plan).await.unwrap();

        assert!(graph.contains_edge("a", "top"));
        assert!(!graph.contains_edge("a", "a"));
        assert!(!graph.contains_node("third"));
        assert_eq!(report.rounds[1].cast_members, 1);
    }

    #[tokio::test]
    async fn test_seed_in_own_cast_creates_self_loop() {
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("6384", "Keanu Reeves"), ("2975", "Laurence Fishburne")]);

        let (graph, _) = expand_graph(&source, &plan(0)).await.unwrap();

        assert_eq!(graph.total_nodes(), 2);
        assert!(graph.contains_edge("2975", "2975"));
        assert_eq!(graph.max_degree_nodes().get("2975"), Some(&3));
    }

    #[tokio::test]
    async fn test_frontier_is_not_deduplicated() {
        // "a" appears in two seed movies, so round 1 queries "a" twice.
        // "a" and "b" share movie 800 and resurface in round 2.
        let source = FakeSource::default()
            .credit("2975", "601", "1999-01-10")
            .credit("2975", "602", "1999-02-10")
            .cast("601", &[("a", "Actor A")])
            .cast("602", &[("a", "Actor A"), ("b", "Actor B")])
            .credit("a", "800", "1999-05-01")
            .credit("b", "800", "1999-05-01")
            .cast("800", &[("a", "Actor A"), ("b", "Actor B")]);

        let (graph, report) = expand_graph(&source, &plan(2)).await.unwrap();

        assert_eq!(source.queries_for("2975"), 1);
        // round 1: a, a, b; round 2: b, b, a
        assert_eq!(source.queries_for("a"), 3);
        assert_eq!(source.queries_for("b"), 3);
        assert_eq!(report.rounds.len(), 3);
        assert_eq!(report.rounds[1].actors, 3);
        assert_eq!(report.rounds[2].actors, 3);

        assert_eq!(graph.total_nodes(), 3);
        assert_eq!(graph.total_edges(), 3);
        assert_eq!(report.total_edges, 3);
    }

    #[tokio::test]
    async fn test_credit_without_cast_is_skipped() {
        let source = FakeSource::default()
            .credit("2975", "111", "1999-01-01")
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("6384", "Keanu Reeves")]);

        let (graph, report) = expand_graph(&source, &plan(0)).await.unwrap();

        assert_eq!(graph.total_nodes(), 2);
        assert_eq!(report.rounds[0].credits, 2);
        assert_eq!(report.rounds[0].cast_members, 1);
    }

    #[tokio::test]
    async fn test_source_error_propagates() {
        let mut source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("6384", "Keanu Reeves")]);
        source.failing_person = Some("6384".to_string());

        let result = expand_graph(&source, &plan(2)).await;
        assert!(matches!(result, Err(CoactorError::Api(_))));
    }

    #[tokio::test]
    async fn test_unusable_plan_is_rejected_before_querying() {
        let source = FakeSource::default();

        let mut blank_seed = plan(1);
        blank_seed.seed_id = "  ".to_string();
        let result = expand_graph(&source, &blank_seed).await;
        assert!(matches!(result, Err(CoactorError::InvalidInput(_))));

        let mut inverted = plan(1);
        inverted.window = DateWindow::new("1999-12-31", "1999-01-01");
        let result = expand_graph(&source, &inverted).await;
        assert!(matches!(result, Err(CoactorError::InvalidInput(_))));

        assert!(source.queried.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_names_with_commas_are_stripped() {
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("1", "Downey, Jr.")]);

        let (graph, _) = expand_graph(&source, &plan(0)).await.unwrap();
        assert_eq!(graph.nodes()[1].name, "Downey Jr.");
    }

    #[tokio::test]
    async fn test_build_writes_tables() {
        let temp = TempDir::new().unwrap();
        let nodes_path = temp.path().join("nodes.csv");
        let edges_path = temp.path().join("edges.csv");
        let source = FakeSource::default()
            .credit("2975", "603", "1999-03-31")
            .cast("603", &[("6384", "Keanu Reeves"), ("530", "Carrie-Anne Moss")])
            .credit("6384", "603", "1999-03-31");

        let (graph, _) = build_coactor_network(&source, &plan(1), &nodes_path, &edges_path)
            .await
            .unwrap();

        let reloaded = Graph::from_files(&nodes_path, &edges_path).unwrap();
        assert_eq!(reloaded.nodes(), graph.nodes());
        assert_eq!(reloaded.edges(), graph.edges());
        // Round 1 adds the Reeves - Moss edge, seed link already exists
        assert_eq!(reloaded.total_edges(), 3);
    }
}
