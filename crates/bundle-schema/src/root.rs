/*
 * root.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Schema of a complete bundle document.
//!
//! Sections that are passed through to the deployment backend verbatim
//! (cluster specs, permissions, library lists) are declared [`Schema::Any`];
//! everything the engine itself interprets is spelled out.

use crate::Schema;
use once_cell::sync::Lazy;

static ROOT_SCHEMA: Lazy<Schema> = Lazy::new(build_root_schema);

/// The schema every merged bundle document is normalized against.
pub fn root_schema() -> &'static Schema {
    &ROOT_SCHEMA
}

fn string_map() -> Schema {
    Schema::map(Schema::String)
}

fn any_map() -> Schema {
    Schema::map(Schema::Any)
}

fn run_as() -> Schema {
    Schema::object([
        ("user_name", Schema::String),
        ("service_principal_name", Schema::String),
    ])
}

fn bundle() -> Schema {
    Schema::object([
        ("name", Schema::String),
        ("uuid", Schema::String),
        ("compute_id", Schema::String),
        ("cluster_id", Schema::String),
        ("databricks_cli_version", Schema::String),
        ("deployment", Schema::Any),
        (
            "git",
            Schema::object([
                ("branch", Schema::String),
                ("origin_url", Schema::String),
                ("commit", Schema::String),
                ("actual_branch", Schema::String),
                ("inferred", Schema::Bool),
                ("bundle_root_path", Schema::String),
            ]),
        ),
    ])
}

fn workspace() -> Schema {
    Schema::object([
        ("host", Schema::String),
        ("profile", Schema::String),
        ("auth_type", Schema::String),
        ("account_id", Schema::String),
        ("client_id", Schema::String),
        ("azure_client_id", Schema::String),
        ("azure_tenant_id", Schema::String),
        ("azure_environment", Schema::String),
        ("azure_workspace_resource_id", Schema::String),
        ("azure_use_msi", Schema::Bool),
        ("azure_login_app_id", Schema::String),
        ("google_service_account", Schema::String),
        ("metadata_service_url", Schema::String),
        ("root_path", Schema::String),
        ("file_path", Schema::String),
        ("resource_path", Schema::String),
        ("artifact_path", Schema::String),
        ("state_path", Schema::String),
        ("current_user", Schema::Any),
    ])
}

fn variable() -> Schema {
    Schema::object([
        ("type", Schema::String),
        ("description", Schema::String),
        ("default", Schema::Any),
        ("lookup", Schema::Any),
        ("value", Schema::Any),
    ])
}

fn presets() -> Schema {
    Schema::object([
        ("name_prefix", Schema::String),
        ("pipelines_development", Schema::Bool),
        ("trigger_pause_status", Schema::String),
        ("jobs_max_concurrent_runs", Schema::Int),
        ("tags", string_map()),
        ("source_linked_deployment", Schema::Bool),
        ("artifacts_dynamic_version", Schema::Bool),
    ])
}

fn plugin() -> Schema {
    Schema::object([
        ("enabled", Schema::Bool),
        ("venv_path", Schema::String),
        ("module", Schema::String),
    ])
}

fn experimental() -> Schema {
    Schema::object([
        ("plugin", plugin()),
        ("python_wheel_wrapper", Schema::Bool),
        ("use_legacy_run_as", Schema::Bool),
        ("skip_artifact_cleanup", Schema::Bool),
        ("skip_name_prefix_for_schema", Schema::Bool),
        ("scripts", string_map()),
        ("pydabs", Schema::Any),
        ("python", Schema::Any),
    ])
}

fn sync() -> Schema {
    Schema::object([
        ("include", Schema::sequence(Schema::String)),
        ("exclude", Schema::sequence(Schema::String)),
        ("paths", Schema::sequence(Schema::String)),
    ])
}

fn task() -> Schema {
    Schema::object([
        ("task_key", Schema::String),
        ("description", Schema::String),
        (
            "depends_on",
            Schema::sequence(Schema::object([
                ("task_key", Schema::String),
                ("outcome", Schema::String),
            ])),
        ),
        ("run_if", Schema::String),
        ("existing_cluster_id", Schema::String),
        ("job_cluster_key", Schema::String),
        ("new_cluster", Schema::Any),
        ("compute_key", Schema::String),
        ("environment_key", Schema::String),
        (
            "notebook_task",
            Schema::object([
                ("notebook_path", Schema::String),
                ("base_parameters", string_map()),
                ("source", Schema::String),
                ("warehouse_id", Schema::String),
            ]),
        ),
        ("python_wheel_task", Schema::Any),
        ("spark_python_task", Schema::Any),
        ("spark_jar_task", Schema::Any),
        ("spark_submit_task", Schema::Any),
        ("pipeline_task", Schema::Any),
        ("sql_task", Schema::Any),
        ("dbt_task", Schema::Any),
        ("run_job_task", Schema::Any),
        ("condition_task", Schema::Any),
        ("for_each_task", Schema::Any),
        ("dashboard_task", Schema::Any),
        ("clean_rooms_notebook_task", Schema::Any),
        ("power_bi_task", Schema::Any),
        ("gen_ai_compute_task", Schema::Any),
        ("libraries", Schema::Any),
        ("timeout_seconds", Schema::Int),
        ("max_retries", Schema::Int),
        ("min_retry_interval_millis", Schema::Int),
        ("retry_on_timeout", Schema::Bool),
        ("disable_auto_optimization", Schema::Bool),
        ("email_notifications", Schema::Any),
        ("webhook_notifications", Schema::Any),
        ("notification_settings", Schema::Any),
        ("health", Schema::Any),
    ])
}

fn job() -> Schema {
    Schema::object([
        ("id", Schema::String),
        ("name", Schema::String),
        ("description", Schema::String),
        ("format", Schema::String),
        ("edit_mode", Schema::String),
        ("budget_policy_id", Schema::String),
        ("performance_target", Schema::String),
        ("max_concurrent_runs", Schema::Int),
        ("timeout_seconds", Schema::Int),
        ("tags", string_map()),
        ("run_as", run_as()),
        ("email_notifications", Schema::Any),
        ("webhook_notifications", Schema::Any),
        ("notification_settings", Schema::Any),
        ("health", Schema::Any),
        ("schedule", Schema::Any),
        ("trigger", Schema::Any),
        ("continuous", Schema::Any),
        ("queue", Schema::Any),
        ("git_source", Schema::Any),
        ("deployment", Schema::Any),
        ("environments", Schema::Any),
        ("permissions", Schema::Any),
        ("parameters", Schema::Any),
        ("job_clusters", Schema::Any),
        ("compute", Schema::Any),
        ("tasks", Schema::sequence(task())),
    ])
}

fn pipeline() -> Schema {
    Schema::object([
        ("id", Schema::String),
        ("name", Schema::String),
        ("catalog", Schema::String),
        ("target", Schema::String),
        ("schema", Schema::String),
        ("storage", Schema::String),
        ("root_path", Schema::String),
        ("budget_policy_id", Schema::String),
        ("continuous", Schema::Bool),
        ("development", Schema::Bool),
        ("photon", Schema::Bool),
        ("serverless", Schema::Bool),
        ("allow_duplicate_names", Schema::Bool),
        ("dry_run", Schema::Bool),
        ("channel", Schema::String),
        ("edition", Schema::String),
        ("tags", string_map()),
        ("run_as", run_as()),
        ("libraries", Schema::Any),
        ("clusters", Schema::Any),
        ("configuration", string_map()),
        ("deployment", Schema::Any),
        ("environment", Schema::Any),
        ("event_log", Schema::Any),
        ("filters", Schema::Any),
        ("gateway_definition", Schema::Any),
        ("ingestion_definition", Schema::Any),
        ("notifications", Schema::Any),
        ("restart_window", Schema::Any),
        ("trigger", Schema::Any),
        ("permissions", Schema::Any),
    ])
}

fn resources() -> Schema {
    Schema::object([
        ("jobs", Schema::map(job())),
        ("pipelines", Schema::map(pipeline())),
        ("models", any_map()),
        ("experiments", any_map()),
        ("model_serving_endpoints", any_map()),
        ("registered_models", any_map()),
        ("quality_monitors", any_map()),
        ("schemas", any_map()),
        ("volumes", any_map()),
        ("clusters", any_map()),
        ("dashboards", any_map()),
        ("apps", any_map()),
        ("secret_scopes", any_map()),
        ("sql_warehouses", any_map()),
        ("database_instances", any_map()),
        ("database_catalogs", any_map()),
        ("synced_database_tables", any_map()),
    ])
}

fn build_root_schema() -> Schema {
    Schema::object([
        ("bundle", bundle()),
        ("include", Schema::sequence(Schema::String)),
        ("workspace", workspace()),
        ("variables", Schema::map(variable())),
        ("artifacts", Schema::Any),
        ("sync", sync()),
        ("permissions", Schema::Any),
        ("run_as", run_as()),
        ("presets", presets()),
        ("environments", any_map()),
        ("experimental", experimental()),
        ("targets", any_map()),
        ("resources", resources()),
    ])
}
