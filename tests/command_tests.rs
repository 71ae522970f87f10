//! Tests for fleetcost commands
//!
//! Drives the built binary and checks:
//! - JSON output is a single parseable document
//! - Exit codes for user, system and config errors
//! - Plan file handling and config fallbacks

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const WORKLOAD: &str = "\
service,quantity,cpu_percent,network_mbps,disk_io_mbps,storage_gb,memory_gb
kafka,3,250,200,60,500,6
api,4,150,100,5,10,3
redis,2,80,120,5,20,6
";

/// Write a config file so runs never pick up a user or working-dir config
fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

fn fleetcost(config: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fleetcost"))
        .arg("--config")
        .arg(config)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to execute fleetcost")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("Invalid JSON output: {}\nOutput: {}", e, stdout))
}

fn plan_args<'a>(csv: &'a str, plan_file: &'a str) -> Vec<&'a str> {
    vec![
        "plan",
        csv,
        "--cores",
        "10.68",
        "--ram",
        "21.28",
        "--net",
        "760",
        "--disk-io",
        "380",
        "--storage",
        "1520",
        "--plan-file",
        plan_file,
    ]
}

#[test]
fn test_monthly_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let output = fleetcost(&config, &["monthly", "1.5", "--output", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["hourly_price"], "1.5");
    assert_eq!(json["monthly_price"].as_f64(), Some(1095.0));
}

#[test]
fn test_monthly_rejects_non_numeric() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    let output = fleetcost(&config, &["monthly", "abc"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("abc"));
}

#[test]
fn test_estimate_demo_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let demo = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos").join("fleet.toml");

    let output = fleetcost(&config, &["estimate", demo.to_str().unwrap(), "--output", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);

    let hourly: f64 = json["outputs"]["hourly_price"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    let monthly = json["outputs"]["monthly_price"].as_f64().unwrap();
    assert!(hourly > 0.0);
    assert!((monthly - hourly * 730.0).abs() < 1e-6);
}

#[test]
fn test_estimate_missing_file_is_system_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let missing = dir.path().join("missing.toml");

    let output = fleetcost(&config, &["estimate", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_unsupported_provider_is_config_error() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "[provider]\nname = \"gcp\"\nregion = \"us-central1\"\n");

    let output = fleetcost(&config, &["monthly", "1.0"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("gcp"));
}

#[test]
fn test_plan_writes_plan_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let csv = dir.path().join("services.csv");
    std::fs::write(&csv, WORKLOAD).unwrap();
    let plan_file = dir.path().join("out").join("plan.json");

    let output = fleetcost(
        &config,
        &plan_args(csv.to_str().unwrap(), plan_file.to_str().unwrap()),
    );
    assert!(output.status.success());
    assert!(plan_file.exists());

    let written: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&plan_file).unwrap()).unwrap();
    // Four api replicas need four servers
    assert!(written["server_count"].as_u64().unwrap() >= 4);
}

#[test]
fn test_plan_seed_falls_back_to_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "[planner]\nseed = 7\npermutation_samples = 5\n");
    let csv = dir.path().join("services.csv");
    std::fs::write(&csv, WORKLOAD).unwrap();
    let plan_file = dir.path().join("plan.json");

    let mut args = plan_args(csv.to_str().unwrap(), plan_file.to_str().unwrap());
    args.extend(["--output", "json"]);
    let output = fleetcost(&config, &args);
    assert!(output.status.success());
    assert_eq!(stdout_json(&output)["plan"]["seed"], 7);

    let mut args = plan_args(csv.to_str().unwrap(), plan_file.to_str().unwrap());
    args.extend(["--seed", "42", "--output", "json"]);
    let output = fleetcost(&config, &args);
    assert_eq!(stdout_json(&output)["plan"]["seed"], 42);
}

#[test]
fn test_plan_with_pricing_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let csv = dir.path().join("services.csv");
    std::fs::write(&csv, WORKLOAD).unwrap();
    let plan_file = dir.path().join("plan.json");

    let mut args = plan_args(csv.to_str().unwrap(), plan_file.to_str().unwrap());
    args.extend(["--instance-type", "m5.4xlarge", "--output", "json"]);
    let output = fleetcost(&config, &args);
    assert!(output.status.success());

    let json = stdout_json(&output);
    let servers = json["plan"]["server_count"].as_u64().unwrap();
    assert_eq!(json["pricing"]["estimate"]["items"][0]["quantity"], servers);
    assert!(json["pricing"]["outputs"]["monthly_price"].as_f64().unwrap() > 0.0);
}

#[test]
fn test_plan_pricing_failure_leaves_no_plan_file() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let csv = dir.path().join("services.csv");
    std::fs::write(&csv, WORKLOAD).unwrap();
    let plan_file = dir.path().join("plan.json");

    let mut args = plan_args(csv.to_str().unwrap(), plan_file.to_str().unwrap());
    args.extend(["--instance-type", "z9.huge"]);
    let output = fleetcost(&config, &args);
    assert_eq!(output.status.code(), Some(1));
    assert!(!plan_file.exists());
}

#[test]
fn test_catalog_json_output() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "[pricing.instance_prices]\n\"x9.custom\" = 1.25\n");

    let output = fleetcost(&config, &["catalog", "--output", "json"]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["instance_prices"]["x9.custom"].as_f64(), Some(1.25));
    assert!(json["regions"].as_array().map_or(false, |r| !r.is_empty()));
}

#[test]
fn test_init_writes_loadable_config() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");
    let target = dir.path().join("fresh.toml");

    let output = fleetcost(&config, &["init", "--output", target.to_str().unwrap()]);
    assert!(output.status.success());

    let content = std::fs::read_to_string(&target).unwrap();
    assert!(content.contains("[provider]"));
    assert!(content.contains("\"aws\""));
}

#[test]
fn test_missing_required_argument() {
    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "");

    // clap usage errors exit with 2 before any command runs
    let output = fleetcost(&config, &["plan", "services.csv"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--cores"));
}
