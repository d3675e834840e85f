//! Golden path registry.
//!
//! A registry is an immutable task-name → action list table. It is built
//! once (from the built-in table or a YAML file) and handed to the
//! evaluator, so tests can substitute their own paths freely.

use crate::error::GoldenPathError;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Immutable table of golden paths keyed by task name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoldenPathRegistry {
    paths: BTreeMap<String, Vec<String>>,
}

impl GoldenPathRegistry {
    /// Golden paths for the supported TheAgentCompany tasks.
    pub fn builtin() -> Self {
        BUILTIN_GOLDEN_PATHS
            .iter()
            .map(|(task, steps)| {
                (
                    task.to_string(),
                    steps.iter().map(|s| s.to_string()).collect(),
                )
            })
            .collect()
    }

    /// Parses a YAML mapping of task name to a list of action strings.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, GoldenPathError> {
        let paths: BTreeMap<String, Vec<String>> = serde_yaml::from_str(yaml)?;
        if let Some((task, _)) = paths.iter().find(|(_, steps)| steps.is_empty()) {
            return Err(GoldenPathError::EmptyPath(task.clone()));
        }
        Ok(Self { paths })
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, GoldenPathError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| GoldenPathError::IoError {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_yaml_str(&yaml)?;
        info!(
            path = %path.display(),
            tasks = registry.len(),
            "Loaded golden paths"
        );
        Ok(registry)
    }

    /// Golden path for `task_name`, if one is registered.
    pub fn get(&self, task_name: &str) -> Option<&[String]> {
        self.paths.get(task_name).map(|steps| steps.as_slice())
    }

    pub fn contains(&self, task_name: &str) -> bool {
        self.paths.contains_key(task_name)
    }

    /// Registered task names, sorted.
    pub fn task_names(&self) -> Vec<&str> {
        self.paths.keys().map(|k| k.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl FromIterator<(String, Vec<String>)> for GoldenPathRegistry {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        Self {
            paths: iter.into_iter().collect(),
        }
    }
}

const BUILTIN_GOLDEN_PATHS: &[(&str, &[&str])] = &[
    (
        "pm-schedule-meeting-1",
        &[
            "goto_url(url='http://the-agent-company.com:3000/home')",
            "send_message(recipient='Emily Zhou', content='...')",
            "send_message(recipient='Liu Qiang', content='...')",
            "write_file(path='/workspace/conclusion.txt')",
            "finish()",
        ],
    ),
    (
        "sde-run-janusgraph",
        &[
            "execute_bash(command='cd /workspace && git clone http://the-agent-company.com:8929/root/janusgraph')",
            "execute_bash(command='cd /workspace/janusgraph && mvn clean install -DskipTests')",
            "execute_bash(command='cd /workspace/janusgraph && bin/janusgraph.sh start')",
            "finish()",
        ],
    ),
    (
        "hr-new-grad-job-description-3",
        &[
            "read_file(path='/instruction/task.md')",
            "goto_url(url='http://the-agent-company.com:3000/home')",
            "send_message(recipient='Zhang Wei', content='...')",
            "send_message(recipient='Li Ming', content='...')",
            "read_file(path='/instruction/template.md')",
            "goto_url(url='http://the-agent-company.com:8092/')",
            "write_file(path='/Documents/job_description.md')",
            "write_file(path='/workspace/link.txt')",
            "finish()",
        ],
    ),
    (
        "sde-create-new-repo",
        &[
            "goto_url(url='http://the-agent-company.com:3000/')",
            "send_message(recipient='Zhang Wei', content='...')",
            "execute_bash(command='[create new GitLab repository via GitLab API or git commands]')",
            "write_file(path='/workspace/new-storage-project/README.md')",
            "finish()",
        ],
    ),
    (
        "pm-send-hello-message",
        &[
            "goto_url(url='http://the-agent-company.com:3000/home')",
            "goto_url(url='http://the-agent-company.com:3000/channel/general')",
            "send_message(content='[Hi and @active_users]')",
            "finish()",
        ],
    ),
    (
        "finance-qualified-bill-ask-for-reimburse",
        &[
            "goto_url(url='http://the-agent-company.com:8092/')",
            "read_file(path='/Documents/Financials/receipt.jpg')",
            "read_file(path='/Documents/Administrative Specialist/Reimbursement Policy.pdf')",
            "goto_url(url='http://the-agent-company.com:3000/')",
            "send_message(recipient='Mike Chen', content='...')",
            "finish()",
        ],
    ),
    (
        "ds-janusgraph-exercise",
        &[
            "execute_bash(command='cd /workspace && git clone http://the-agent-company.com:8929/root/janusgraph')",
            "execute_bash(command='cd /workspace/janusgraph && bin/janusgraph.sh start')",
            "read_file(path='/workspace/employee_diagram.jpg')",
            "write_file(path='/workspace/create_org_chart.py')",
            "execute_bash(command='cd /workspace && python create_org_chart.py')",
            "finish()",
        ],
    ),
    (
        "ml-generate-gradcam",
        &[
            "goto_url(url='http://the-agent-company.com:8092/')",
            "read_file(path='/Documents/Research/test_image.jpg')",
            "write_file(path='/workspace/gradcam_script.py')",
            "execute_bash(command='cd /workspace && python gradcam_script.py')",
            "write_file(path='/workspace/gradcam_explanation.txt')",
            "finish()",
        ],
    ),
    (
        "research-answer-questions-on-paper",
        &[
            "goto_url(url='http://the-agent-company.com:8092/')",
            "read_file(path='/Documents/Research/Noise Simulation/noise_simulation_paper.pdf')",
            "read_file(path='/Documents/Research/Noise Simulation/noise_simulation_analysis_sheet.txt')",
            "write_file(path='/workspace/noise_simulation_analysis_sheet.txt')",
            "finish()",
        ],
    ),
    (
        "qa-escalate-emergency",
        &[
            "goto_url(url='http://the-agent-company.com:3000/')",
            "send_message(recipient='Zhang Wei', content='...')",
            "send_message(recipient='Sarah Johnson', content='...')",
            "finish()",
        ],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = GoldenPathRegistry::builtin();
        assert_eq!(registry.len(), 10);
        assert_eq!(registry.get("pm-schedule-meeting-1").map(|p| p.len()), Some(5));
        assert!(registry.get("no-such-task").is_none());

        let names = registry.task_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(names.contains(&"qa-escalate-emergency"));
    }

    #[test]
    fn test_yaml_registry() {
        let yaml = r#"
demo-task:
  - "read_file(path='/instruction/task.md')"
  - "finish()"
"#;
        let registry = GoldenPathRegistry::from_yaml_str(yaml).unwrap();
        assert_eq!(registry.task_names(), vec!["demo-task"]);
        assert_eq!(registry.get("demo-task").unwrap()[1], "finish()");
    }

    #[test]
    fn test_yaml_registry_rejects_empty_paths() {
        let err = GoldenPathRegistry::from_yaml_str("broken: []\n").unwrap_err();
        assert!(matches!(err, GoldenPathError::EmptyPath(task) if task == "broken"));
    }
}
