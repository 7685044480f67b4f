//! CLI entry point for the FSx-for-Lustre training pipeline.
//!
//! `provision` brings up the stack and the data repository association and
//! writes a provision-result JSON; `train` submits the training job against
//! the provisioned filesystem; `teardown` deletes the stack; `run` chains all
//! three; `status` inspects the association lifecycle once.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use lustre_pipeline::{LustrePipelineService, PipelineConfig, ProvisionResult};

const DEFAULT_STACK_NAME: &str = "fsx-lustre-training";
const DEFAULT_TEMPLATE_FILE: &str = "templates/fsx-lustre-vpc.yaml";
const DEFAULT_PROVISION_FILE: &str = "provision.json";

#[derive(Parser)]
#[command(
    name = "lustre-pipeline",
    version,
    about = "Provision an FSx-for-Lustre backed stack, train through it, tear it down"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct InfraArgs {
    /// Region override; defaults to the SDK provider chain
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
    /// Name of the CloudFormation stack
    #[arg(long, default_value = DEFAULT_STACK_NAME)]
    stack_name: String,
    /// Bucket backing the data repository association
    #[arg(long)]
    s3_bucket: String,
    /// Key prefix for training data and artifacts
    #[arg(long, default_value = "fsx-lustre")]
    s3_prefix: String,
    /// In-filesystem path the association exports
    #[arg(long, default_value = "/fsx")]
    file_system_path: String,
    /// Seconds between readiness polls
    #[arg(long)]
    poll_interval_secs: Option<u64>,
}

#[derive(Args)]
struct TrainingArgs {
    /// Entry-point script, relative to the source directory
    #[arg(long, default_value = "train.py")]
    entry_point: String,
    /// Local directory packaged and uploaded for the job
    #[arg(long)]
    source_dir: PathBuf,
    /// Container image the job runs in
    #[arg(long)]
    training_image: String,
    /// Execution role assumed by the job
    #[arg(long, env = "SAGEMAKER_EXECUTION_ROLE")]
    role_arn: String,
    #[arg(long, default_value = "ml.m5.xlarge")]
    instance_type: String,
    #[arg(long, default_value_t = 1)]
    instance_count: i32,
    #[arg(long, default_value_t = 50)]
    volume_size_gb: i32,
    /// Free-form KEY=VALUE option handed to the entry point; repeatable
    #[arg(long = "hyperparameter", value_name = "KEY=VALUE")]
    hyperparameter: Vec<String>,
    /// Maximum automatic retries for the job
    #[arg(long, default_value_t = 1)]
    max_retry_attempts: i32,
    #[arg(long, default_value_t = 86_400)]
    max_runtime_secs: i32,
    #[arg(long, default_value = "fsx-lustre-train")]
    job_name_prefix: String,
}

#[derive(Subcommand)]
enum Command {
    /// Create the stack, link the filesystem to S3, and wait until ready
    Provision {
        #[command(flatten)]
        infra: InfraArgs,
        /// Availability zone for the subnet and filesystem
        #[arg(long)]
        availability_zone: String,
        /// CloudFormation template for the networking/filesystem stack
        #[arg(long, default_value = DEFAULT_TEMPLATE_FILE)]
        template_file: PathBuf,
        /// Where to write the provision-result JSON
        #[arg(long, default_value = DEFAULT_PROVISION_FILE)]
        out: PathBuf,
    },
    /// Submit the training job against a provisioned filesystem
    Train {
        #[command(flatten)]
        infra: InfraArgs,
        #[command(flatten)]
        training: TrainingArgs,
        /// Provision-result JSON produced by `provision`
        #[arg(long, default_value = DEFAULT_PROVISION_FILE)]
        provision_file: PathBuf,
    },
    /// Delete the stack and everything it owns
    Teardown {
        /// Region override; defaults to the SDK provider chain
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
        /// Name of the CloudFormation stack
        #[arg(long, default_value = DEFAULT_STACK_NAME)]
        stack_name: String,
    },
    /// Provision, train, and tear down in one sequence
    Run {
        #[command(flatten)]
        infra: InfraArgs,
        #[command(flatten)]
        training: TrainingArgs,
        /// Availability zone for the subnet and filesystem
        #[arg(long)]
        availability_zone: String,
        /// CloudFormation template for the networking/filesystem stack
        #[arg(long, default_value = DEFAULT_TEMPLATE_FILE)]
        template_file: PathBuf,
    },
    /// Show the current data repository association status
    Status {
        /// Region override; defaults to the SDK provider chain
        #[arg(long, env = "AWS_REGION")]
        region: Option<String>,
        /// Filesystem whose association to inspect
        #[arg(long)]
        file_system_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Provision {
            infra,
            availability_zone,
            template_file,
            out,
        } => cmd_provision(&infra, availability_zone, &template_file, &out).await,
        Command::Train {
            infra,
            training,
            provision_file,
        } => cmd_train(&infra, &training, &provision_file).await,
        Command::Teardown { region, stack_name } => cmd_teardown(region, stack_name).await,
        Command::Run {
            infra,
            training,
            availability_zone,
            template_file,
        } => cmd_run(&infra, &training, availability_zone, &template_file).await,
        Command::Status {
            region,
            file_system_id,
        } => cmd_status(region, &file_system_id).await,
    }
}

async fn cmd_provision(
    infra: &InfraArgs,
    availability_zone: String,
    template_file: &Path,
    out: &Path,
) -> Result<()> {
    let template_body = read_template(template_file)?;
    let config = pipeline_config(infra, availability_zone, template_body, None)?;
    let service = LustrePipelineService::new(config).await;

    let result = service.provision().await?;
    let json = serde_json::to_string_pretty(&result)?;
    fs::write(out, &json)
        .with_context(|| format!("failed to write provision result to '{}'", out.display()))?;
    log::info!("provision result written to '{}'", out.display());
    println!("{json}");
    Ok(())
}

async fn cmd_train(
    infra: &InfraArgs,
    training: &TrainingArgs,
    provision_file: &Path,
) -> Result<()> {
    let config = pipeline_config(infra, String::new(), String::new(), Some(training))?;
    let provision = read_provision_result(provision_file)?;
    let service = LustrePipelineService::new(config).await;

    let outcome = service.train(&provision).await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_teardown(region: Option<String>, stack_name: String) -> Result<()> {
    let infra = InfraArgs {
        region,
        stack_name,
        s3_bucket: String::new(),
        s3_prefix: String::new(),
        file_system_path: String::new(),
        poll_interval_secs: None,
    };
    let config = pipeline_config(&infra, String::new(), String::new(), None)?;
    let service = LustrePipelineService::new(config).await;
    service.teardown().await?;
    println!("stack deletion requested");
    Ok(())
}

async fn cmd_run(
    infra: &InfraArgs,
    training: &TrainingArgs,
    availability_zone: String,
    template_file: &Path,
) -> Result<()> {
    let template_body = read_template(template_file)?;
    let config = pipeline_config(infra, availability_zone, template_body, Some(training))?;
    let service = LustrePipelineService::new(config).await;

    let provision = service.provision().await?;
    let outcome = service.train(&provision).await?;
    service.teardown().await?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

async fn cmd_status(region: Option<String>, file_system_id: &str) -> Result<()> {
    let infra = InfraArgs {
        region,
        stack_name: DEFAULT_STACK_NAME.to_string(),
        s3_bucket: String::new(),
        s3_prefix: String::new(),
        file_system_path: String::new(),
        poll_interval_secs: None,
    };
    let config = pipeline_config(&infra, String::new(), String::new(), None)?;
    let service = LustrePipelineService::new(config).await;
    println!("{}", service.association_status(file_system_id).await?);
    Ok(())
}

fn read_template(template_file: &Path) -> Result<String> {
    fs::read_to_string(template_file)
        .with_context(|| format!("failed to read template file '{}'", template_file.display()))
}

fn read_provision_result(provision_file: &Path) -> Result<ProvisionResult> {
    let contents = fs::read_to_string(provision_file).with_context(|| {
        format!(
            "failed to read provision file '{}'; run `provision` first",
            provision_file.display()
        )
    })?;
    serde_json::from_str(&contents).with_context(|| {
        format!(
            "provision file '{}' is not a valid provision result",
            provision_file.display()
        )
    })
}

fn pipeline_config(
    infra: &InfraArgs,
    availability_zone: String,
    template_body: String,
    training: Option<&TrainingArgs>,
) -> Result<PipelineConfig> {
    let hyperparameters = match training {
        Some(training) => parse_hyperparameters(&training.hyperparameter)?,
        None => BTreeMap::new(),
    };

    Ok(PipelineConfig {
        region: infra.region.clone(),
        availability_zone,
        stack_name: infra.stack_name.clone(),
        template_body,
        s3_bucket: infra.s3_bucket.clone(),
        s3_prefix: infra.s3_prefix.clone(),
        file_system_path: infra.file_system_path.clone(),
        entry_point: training.map_or_else(|| "train.py".to_string(), |t| t.entry_point.clone()),
        source_dir: training.map_or_else(PathBuf::new, |t| t.source_dir.clone()),
        training_image: training.map_or_else(String::new, |t| t.training_image.clone()),
        role_arn: training.map_or_else(String::new, |t| t.role_arn.clone()),
        instance_type: training.map_or_else(|| "ml.m5.xlarge".to_string(), |t| t.instance_type.clone()),
        instance_count: training.map_or(1, |t| t.instance_count),
        volume_size_gb: training.map_or(50, |t| t.volume_size_gb),
        hyperparameters,
        max_retry_attempts: training.map_or(1, |t| t.max_retry_attempts),
        max_runtime_secs: training.map_or(86_400, |t| t.max_runtime_secs),
        job_name_prefix: training
            .map_or_else(|| "fsx-lustre-train".to_string(), |t| t.job_name_prefix.clone()),
        poll_interval: PipelineConfig::poll_interval_or_default(infra.poll_interval_secs),
    })
}

fn parse_hyperparameters(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut map = BTreeMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .with_context(|| format!("invalid hyperparameter '{entry}', expected KEY=VALUE"))?;
        map.insert(key.to_string(), value.to_string());
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_hyperparameters_valid() {
        let raw = vec!["epochs=5".to_string(), "lr=0.01".to_string()];
        let map = parse_hyperparameters(&raw).expect("should parse");
        assert_eq!(map.get("epochs").map(String::as_str), Some("5"));
        assert_eq!(map.get("lr").map(String::as_str), Some("0.01"));
    }

    #[test]
    fn test_parse_hyperparameters_rejects_missing_separator() {
        let raw = vec!["epochs".to_string()];
        assert!(parse_hyperparameters(&raw).is_err());
    }

    #[test]
    fn test_parse_hyperparameters_keeps_value_equals_signs() {
        let raw = vec!["extra=a=b".to_string()];
        let map = parse_hyperparameters(&raw).expect("should parse");
        assert_eq!(map.get("extra").map(String::as_str), Some("a=b"));
    }
}
