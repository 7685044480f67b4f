use assert_cmd::Command;
use predicates::prelude::*;

fn cli() -> Command {
    Command::cargo_bin("lustre-pipeline").expect("binary should build")
}

#[test]
fn help_lists_subcommands() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("train"))
        .stdout(predicate::str::contains("teardown"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn version_is_reported() {
    cli()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("lustre-pipeline"));
}

#[test]
fn provision_requires_bucket_and_zone() {
    cli()
        .arg("provision")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--s3-bucket"))
        .stderr(predicate::str::contains("--availability-zone"));
}

#[test]
fn provision_fails_on_missing_template_file() {
    let dir = tempfile::tempdir().expect("should create tempdir");
    let missing = dir.path().join("no-such-template.yaml");
    cli()
        .args([
            "provision",
            "--s3-bucket",
            "my-bucket",
            "--availability-zone",
            "us-west-2a",
            "--template-file",
        ])
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("template file"));
}

#[test]
fn train_rejects_malformed_hyperparameter() {
    cli()
        .args([
            "train",
            "--s3-bucket",
            "my-bucket",
            "--source-dir",
            ".",
            "--training-image",
            "123456789012.dkr.ecr.us-west-2.amazonaws.com/pytorch-training:2.3",
            "--role-arn",
            "arn:aws:iam::123456789012:role/SageMakerRole",
            "--hyperparameter",
            "epochs",
        ])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("hyperparameter"));
}

#[test]
fn train_fails_on_missing_provision_file() {
    let dir = tempfile::tempdir().expect("should create tempdir");
    let missing = dir.path().join("no-such-provision.json");
    cli()
        .args([
            "train",
            "--s3-bucket",
            "my-bucket",
            "--source-dir",
            ".",
            "--training-image",
            "123456789012.dkr.ecr.us-west-2.amazonaws.com/pytorch-training:2.3",
            "--role-arn",
            "arn:aws:iam::123456789012:role/SageMakerRole",
            "--provision-file",
        ])
        .arg(&missing)
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("provision file"));
}

#[test]
fn status_requires_file_system_id() {
    cli()
        .arg("status")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("--file-system-id"));
}
