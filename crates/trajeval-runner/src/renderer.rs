use ascii_tree::{write_tree, Tree};
use std::fmt;
use trajeval_lib::{report::format_ratio, BatchResults, EvaluationRecord, Refinement};

/// Renders a batch of evaluation records as an ASCII tree.
///
/// Scored records show their component scores; failed records show the
/// error kind and message.
pub fn render_batch_as_tree(batch: &BatchResults) -> Result<String, fmt::Error> {
    let mean = batch
        .mean_score()
        .map(|m| format!("{m:.1}"))
        .unwrap_or_else(|| "n/a".to_string());
    let root_label = format!(
        "Evaluated {} trajectories ({} failed, mean score: {mean})",
        batch.len(),
        batch.failed_count()
    );

    let nodes = batch
        .iter()
        .map(|(task_name, record)| render_record_node(task_name, record))
        .collect();

    let mut buffer = String::new();
    write_tree(&mut buffer, &Tree::Node(root_label, nodes))?;
    Ok(buffer)
}

fn render_record_node(task_name: &str, record: &EvaluationRecord) -> Tree {
    match record {
        EvaluationRecord::Scored(evaluation) => {
            let scores = &evaluation.scores;
            let label = format!("✅ {task_name} (Score: {:.1})", scores.efficiency_score);
            Tree::Node(
                label,
                vec![Tree::Leaf(vec![
                    format!(
                        "coverage {:.3} | order {:.3} | length {:.3} | redundancy {:.3}",
                        scores.coverage,
                        scores.order_score,
                        scores.length_efficiency,
                        scores.redundancy_penalty
                    ),
                    format!(
                        "matched {}/{} | ratio {}",
                        scores.matched_steps,
                        scores.golden_path_length,
                        format_ratio(scores.path_length_ratio)
                    ),
                ])],
            )
        }
        EvaluationRecord::Failed(error) => Tree::Node(
            format!("❌ {task_name} ({})", error.kind.as_str()),
            vec![Tree::Leaf(vec![error.error.clone()])],
        ),
    }
}

/// Renders a refinement: each canonical step with its match status, then
/// the parsed actions nothing claimed.
pub fn render_refinement_as_tree(refinement: &Refinement) -> Result<String, fmt::Error> {
    let matched = refinement
        .matches
        .iter()
        .filter(|m| m.matched.is_some())
        .count();
    let root_label = format!(
        "{} ({matched}/{} canonical steps matched, {} parsed actions)",
        refinement.task_name,
        refinement.matches.len(),
        refinement.parsed_action_count
    );

    let mut nodes: Vec<Tree> = refinement
        .matches
        .iter()
        .enumerate()
        .map(|(i, m)| match &m.matched {
            Some(action) => Tree::Node(
                format!("{}. MATCH ({:.2}) {}", i + 1, m.similarity, m.canonical),
                vec![Tree::Leaf(vec![format!("-> {action}")])],
            ),
            None => Tree::Leaf(vec![format!("{}. NO MATCH {}", i + 1, m.canonical)]),
        })
        .collect();

    let unmatched = &refinement.unmatched_parsed_actions;
    if !unmatched.is_empty() {
        nodes.push(Tree::Node(
            format!("Unmatched parsed actions ({})", unmatched.len()),
            vec![Tree::Leaf(unmatched.clone())],
        ));
    }

    let mut buffer = String::new();
    write_tree(&mut buffer, &Tree::Node(root_label, nodes))?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trajeval_lib::{refine_golden_path, Evaluator, GoldenPathRegistry, ScoringConfig};

    #[test]
    fn test_batch_tree_lists_every_record() {
        let registry = GoldenPathRegistry::builtin();
        let evaluator = Evaluator::new(&registry, ScoringConfig::default());

        let mut batch = BatchResults::default();
        let golden = registry.get("qa-escalate-emergency").unwrap().to_vec();
        batch.results.insert(
            "qa-escalate-emergency".to_string(),
            EvaluationRecord::Scored(evaluator.evaluate_paths(
                "qa-escalate-emergency",
                golden.clone(),
                golden,
            )),
        );
        batch.results.insert(
            "mystery".to_string(),
            evaluator.evaluate_agent_path("mystery", vec!["finish()".to_string()]),
        );

        let tree = render_batch_as_tree(&batch).unwrap();
        assert!(tree.contains("Evaluated 2 trajectories (1 failed, mean score: 100.0)"));
        assert!(tree.contains("✅ qa-escalate-emergency (Score: 100.0)"));
        assert!(tree.contains("❌ mystery (unknown_task)"));
        assert!(tree.contains("No golden path found for task: mystery"));
    }

    #[test]
    fn test_refinement_tree() {
        let canonical = vec![
            "read_file(path='/instruction/task.md')".to_string(),
            "write_file(path='/workspace/out.txt')".to_string(),
        ];
        let parsed = vec![
            "read_file(path='/instruction/task.md')".to_string(),
            "execute_bash(command='pwd')".to_string(),
        ];
        let refinement = refine_golden_path("demo", &parsed, &canonical, 0.45);

        let tree = render_refinement_as_tree(&refinement).unwrap();
        assert!(tree.contains("demo (1/2 canonical steps matched, 2 parsed actions)"));
        assert!(tree.contains("1. MATCH (1.00) read_file(path='/instruction/task.md')"));
        assert!(tree.contains("2. NO MATCH write_file(path='/workspace/out.txt')"));
        assert!(tree.contains("Unmatched parsed actions (1)"));
        assert!(tree.contains("execute_bash(command='pwd')"));
    }
}
