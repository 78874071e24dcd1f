/*
 * plugin_mutator.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Plugin phases against a stubbed plugin process.
 */

use async_trait::async_trait;
use bundle_config::Document;
use bundle_dyn::{Path as ValuePath, Value};
use bundle_mutator::{
    Invocation, MemoryExchange, MutatorError, MutatorOptions, Phase, Pipeline, PluginMutator,
    ProcessRunner, interpreter_path,
};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

const BUNDLE: &str = "\
experimental:
  plugin:
    enabled: true
    venv_path: .venv
resources:
  jobs:
    job0:
      name: job_0
";

/// Stands in for the plugin: records each call and writes the canned output
/// for the requested phase, or hands the input back when `echo` is set.
#[derive(Default)]
struct StubRunner {
    echo: bool,
    outputs: Vec<(&'static str, String)>,
    memory: Option<Arc<MemoryExchange>>,
    failure: Option<String>,
    invocations: Mutex<Vec<Invocation>>,
}

impl StubRunner {
    fn echo() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    fn with_output(phase: &'static str, output: &str) -> Self {
        Self::default().and_output(phase, output)
    }

    fn and_output(mut self, phase: &'static str, output: &str) -> Self {
        self.outputs.push((phase, output.to_string()));
        self
    }

    fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for StubRunner {
    async fn run(
        &self,
        invocation: &Invocation,
        _cancel: &CancellationToken,
    ) -> Result<(), MutatorError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        if let Some(reason) = &self.failure {
            return Err(MutatorError::Process {
                program: invocation.program.clone(),
                reason: reason.clone(),
            });
        }

        if self.echo {
            let input = std::fs::read(invocation.arg_value("--input").unwrap()).unwrap();
            std::fs::write(invocation.arg_value("--output").unwrap(), input).unwrap();
            return Ok(());
        }

        let phase = invocation.arg_value("--phase").unwrap();
        let output = self
            .outputs
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| panic!("no output for phase {phase}"));

        match &self.memory {
            Some(exchange) => exchange.set_output(output),
            None => std::fs::write(invocation.arg_value("--output").unwrap(), output).unwrap(),
        }
        Ok(())
    }
}

struct Project {
    root: TempDir,
    temp_root: TempDir,
}

impl Project {
    /// A project root with an empty interpreter file under `.venv`.
    fn with_venv() -> Self {
        let project = Self {
            root: tempfile::tempdir().unwrap(),
            temp_root: tempfile::tempdir().unwrap(),
        };
        let interpreter = project.interpreter();
        std::fs::create_dir_all(interpreter.parent().unwrap()).unwrap();
        std::fs::write(&interpreter, "").unwrap();
        project
    }

    fn root(&self) -> &Path {
        self.root.path()
    }

    fn interpreter(&self) -> PathBuf {
        interpreter_path(&self.root().join(".venv"))
    }

    fn cache(&self) -> PathBuf {
        self.temp_root.path().join("default").join("plugin")
    }

    fn options(&self) -> MutatorOptions {
        MutatorOptions::default().with_temp_root(self.temp_root.path())
    }

    fn mutator(&self, phase: Phase, runner: &Arc<StubRunner>) -> PluginMutator {
        PluginMutator::new(phase, self.options(), runner.clone())
    }

    fn virtual_path(&self) -> String {
        std::path::absolute(self.root().join("__generated__.yml"))
            .unwrap()
            .display()
            .to_string()
    }
}

fn document(yaml: &str) -> Document {
    Document::new(bundle_yaml::load("bundle.yml", yaml).unwrap())
}

fn at<'a>(document: &'a Document, path: &str) -> &'a Value {
    let path: ValuePath = path.parse().unwrap();
    document.value().get_by_path(&path).unwrap()
}

fn job_names(document: &Document) -> Vec<String> {
    at(document, "resources.jobs")
        .as_mapping()
        .unwrap()
        .keys()
        .cloned()
        .collect()
}

#[tokio::test]
async fn load_phase_adds_jobs() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output(
        "load",
        r#"{
          "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
          "resources": {
            "jobs": {
              "job0": {"name": "job_0"},
              "job1": {"name": "job_1"}
            }
          }
        }"#,
    ));

    let mut doc = document(BUNDLE);
    project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap();

    assert_eq!(job_names(&doc), ["job0", "job1"]);
    assert_eq!(at(&doc, "resources.jobs.job0.name").as_str().unwrap(), "job_0");
    assert_eq!(at(&doc, "resources.jobs.job1.name").as_str().unwrap(), "job_1");
    assert_eq!(
        at(&doc, "resources.jobs.job1").location().file,
        project.virtual_path()
    );
}

#[tokio::test]
async fn plugin_is_invoked_with_phase_and_exchange_files() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output("init", BUNDLE));

    let mut doc = document(BUNDLE);
    project
        .mutator(Phase::Init, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap();

    let input = project.cache().join("input.json");
    let output = project.cache().join("output.json");
    assert_eq!(
        runner.invocations(),
        [Invocation {
            program: project.interpreter(),
            args: vec![
                "-m".to_string(),
                "bundles.build".to_string(),
                "--phase".to_string(),
                "init".to_string(),
                "--input".to_string(),
                input.display().to_string(),
                "--output".to_string(),
                output.display().to_string(),
            ],
            cwd: project.root().to_path_buf(),
        }]
    );

    let written: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&input).unwrap()).unwrap();
    assert_eq!(written, doc.value().to_plain());
}

#[tokio::test]
async fn module_can_be_overridden() {
    let project = Project::with_venv();
    let bundle = BUNDLE.replace("venv_path: .venv", "venv_path: .venv\n    module: my_project.build");
    let runner = Arc::new(StubRunner::with_output("load", &bundle));

    let mut doc = document(&bundle);
    project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap();

    assert_eq!(runner.invocations()[0].args[1], "my_project.build");
}

#[tokio::test]
async fn load_phase_rejects_changes_to_existing_jobs() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output(
        "load",
        r#"{
          "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
          "resources": {
            "jobs": {
              "job0": {"name": "job_0", "description": "job description"}
            }
          }
        }"#,
    ));

    let mut doc = document(BUNDLE);
    let before = doc.clone();
    let err = project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unexpected change at \"resources.jobs.job0.description\" (insert)"
    );
    assert_eq!(doc, before);
}

#[tokio::test]
async fn init_phase_amends_existing_jobs() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output(
        "init",
        r#"{
          "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
          "resources": {
            "jobs": {
              "job0": {"name": "job_0", "description": "my job"}
            }
          }
        }"#,
    ));

    let mut doc = document(BUNDLE);
    project
        .mutator(Phase::Init, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap();

    assert_eq!(job_names(&doc), ["job0"]);

    // Untouched values still point at bundle.yml.
    let name = at(&doc, "resources.jobs.job0.name");
    assert_eq!(name.as_str().unwrap(), "job_0");
    assert_eq!(name.location().file, "bundle.yml");

    let description = at(&doc, "resources.jobs.job0.description");
    assert_eq!(description.as_str().unwrap(), "my job");
    assert_eq!(description.location().file, project.virtual_path());
}

#[tokio::test]
async fn init_phase_rejects_removing_a_job() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output(
        "init",
        r#"{
          "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
          "resources": {"jobs": {}}
        }"#,
    ));

    let mut doc = document(BUNDLE);
    let err = project
        .mutator(Phase::Init, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "unexpected change at \"resources.jobs.job0\" (delete)");
}

#[tokio::test]
async fn init_phase_rejects_clearing_jobs() {
    let project = Project::with_venv();
    let mut doc = document(&format!("{BUNDLE}    job1:\n      name: job_1\n"));
    let before = doc.clone();

    for (resources, path) in [
        (r#"{"jobs": null}"#, "resources.jobs"),
        ("null", "resources"),
    ] {
        let runner = Arc::new(StubRunner::with_output(
            "init",
            &format!(
                r#"{{
                  "experimental": {{"plugin": {{"enabled": true, "venv_path": ".venv"}}}},
                  "resources": {resources}
                }}"#
            ),
        ));
        let err = project
            .mutator(Phase::Init, &runner)
            .apply(&mut doc, project.root())
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            format!("unexpected change at \"{path}\" (update)")
        );
        assert_eq!(doc, before);
    }
}

#[tokio::test]
async fn echoed_document_is_unchanged_in_every_phase() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::echo());

    let mut doc = document(
        "\
experimental:
  plugin:
    enabled: true
    venv_path: .venv
run_as:
  service_principal_name: sp
presets:
  name_prefix: \"[dev] \"
resources:
  jobs:
    job0:
      name: job_0
      queue:
        enabled: true
      git_source:
        git_url: https://example.com/repo.git
        git_provider: gitHub
      tasks:
        - task_key: refresh
          pipeline_task:
            pipeline_id: abc
        - task_key: query
          sql_task:
            warehouse_id: w1
            query:
              query_id: q1
  volumes:
    raw:
      catalog_name: main
      schema_name: bronze
      name: raw
",
    );
    let before = doc.clone();
    Pipeline::new(project.options(), runner.clone())
        .run(&mut doc, project.root())
        .await
        .unwrap();

    assert_eq!(runner.invocations().len(), 2);
    assert_eq!(doc, before);
}

#[tokio::test]
async fn echoed_document_with_coercible_values() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::echo());

    let mut doc = document(&format!("{BUNDLE}      max_concurrent_runs: \"2\"\n"));
    project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap();

    let runs = at(&doc, "resources.jobs.job0.max_concurrent_runs");
    assert_eq!(runs.as_int().unwrap(), 2);
    assert_eq!(runs.location().file, "bundle.yml");
}

#[tokio::test]
async fn warnings_in_plugin_output_are_fatal() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output(
        "load",
        r#"{"resources": {"jobs": {"job0": {"unknown_property": "my job"}}}}"#,
    ));

    let mut doc = document(BUNDLE);
    let err = project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert!(matches!(err, MutatorError::PluginOutput { .. }));
    assert_eq!(
        err.to_string(),
        "failed to normalize plugin output: unknown field: unknown_property"
    );
}

#[tokio::test]
async fn unparseable_plugin_output() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::with_output("load", "resources: [unclosed\n"));

    let mut doc = document(BUNDLE);
    let err = project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert!(matches!(err, MutatorError::OutputParse(_)));
}

#[tokio::test]
async fn disabled_plugin_is_not_run() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::default());

    let mut doc = document("bundle:\n  name: x\n");
    let before = doc.clone();
    for phase in Phase::ALL {
        project
            .mutator(phase, &runner)
            .apply(&mut doc, project.root())
            .await
            .unwrap();
    }

    assert!(runner.invocations().is_empty());
    assert_eq!(doc, before);
}

#[tokio::test]
async fn venv_path_is_required() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::default());

    let mut doc = document("experimental:\n  plugin:\n    enabled: true\n");
    let err = project
        .mutator(Phase::Load, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert!(matches!(err, MutatorError::Config { .. }));
    assert!(runner.invocations().is_empty());
}

#[tokio::test]
async fn missing_interpreter() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner::default());

    let mut doc = document("experimental:\n  plugin:\n    enabled: true\n    venv_path: bad_path\n");
    let err = project
        .mutator(Phase::Init, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    let expected = interpreter_path(&project.root().join("bad_path"));
    assert_eq!(
        err.to_string(),
        format!("can't find \"{}\", check if venv is created", expected.display())
    );
}

#[tokio::test]
async fn failed_process_leaves_document_unchanged() {
    let project = Project::with_venv();
    let runner = Arc::new(StubRunner {
        failure: Some("exit status: 1".to_string()),
        ..StubRunner::default()
    });

    let mut doc = document(BUNDLE);
    let before = doc.clone();
    let err = project
        .mutator(Phase::Init, &runner)
        .apply(&mut doc, project.root())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "plugin process failed: exit status: 1");
    assert_eq!(doc, before);
}

#[tokio::test]
async fn memory_exchange() {
    let project = Project::with_venv();
    let exchange = Arc::new(MemoryExchange::new());
    let runner = Arc::new(StubRunner {
        memory: Some(exchange.clone()),
        ..StubRunner::with_output(
            "load",
            r#"{
              "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
              "resources": {"jobs": {"job0": {"name": "job_0"}, "job1": {"name": "job_1"}}}
            }"#,
        )
    });

    let mut doc = document(BUNDLE);
    let before = doc.value().to_plain();
    project
        .mutator(Phase::Load, &runner)
        .apply_with_exchange(&mut doc, project.root(), exchange.as_ref())
        .await
        .unwrap();

    let args = &runner.invocations()[0].args;
    assert_eq!(args[5], "memory:input");
    assert_eq!(args[7], "memory:output");

    let written: serde_json::Value = serde_json::from_slice(&exchange.input()).unwrap();
    assert_eq!(written, before);
    assert_eq!(job_names(&doc), ["job0", "job1"]);
    assert!(!project.cache().exists());
}

#[tokio::test]
async fn pipeline_runs_load_then_init() {
    let project = Project::with_venv();
    let runner = Arc::new(
        StubRunner::with_output(
            "load",
            r#"{
              "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
              "resources": {"jobs": {"job0": {"name": "job_0"}, "job1": {"name": "job_1"}}}
            }"#,
        )
        .and_output(
            "init",
            r#"{
              "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
              "resources": {"jobs": {
                "job0": {"name": "job_0", "description": "first"},
                "job1": {"name": "job_1", "description": "second"}
              }}
            }"#,
        ),
    );

    let mut doc = document(BUNDLE);
    Pipeline::new(project.options(), runner.clone())
        .run(&mut doc, project.root())
        .await
        .unwrap();

    let phases: Vec<_> = runner
        .invocations()
        .iter()
        .map(|inv| inv.arg_value("--phase").unwrap().to_string())
        .collect();
    assert_eq!(phases, ["load", "init"]);
    assert_eq!(at(&doc, "resources.jobs.job1.description").as_str().unwrap(), "second");
}

#[tokio::test]
async fn pipeline_stops_at_first_failure() {
    let project = Project::with_venv();
    let runner = Arc::new(
        StubRunner::with_output(
            "load",
            r#"{
              "experimental": {"plugin": {"enabled": true, "venv_path": ".venv"}},
              "resources": {"jobs": {"job0": {"name": "renamed"}}}
            }"#,
        )
        .and_output("init", BUNDLE),
    );

    let mut doc = document(BUNDLE);
    let err = Pipeline::new(project.options(), runner.clone())
        .run(&mut doc, project.root())
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "unexpected change at \"resources.jobs.job0.name\" (update)"
    );
    assert_eq!(runner.invocations().len(), 1);
}
