use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const SHOP_INVOICE: &str = "\
Sold By: Mobile World
TAX INVOICE
Invoice No: MW/1187
Date: 02/11/2024
Customer Name: Kavya Iyer
Redmi Note 14 5g Crimson Art 8gb 256gb   1.00 PCS  17,759.00  15,050.00
IMEI1: 490154203237518 IMEI2: 490154203237526
Grand Total 15,050.00
";

/// The binary with its user config directory pointed at `home`.
fn mobinv(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("mobinv").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.join(".config"))
        .env("HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn validate_accepts_valid_imei() {
    let home = TempDir::new().unwrap();
    mobinv(home.path())
        .args(["validate", "49-015420-323751-8"])
        .assert()
        .success()
        .stdout(predicate::str::contains("490154 203237 518"));
}

#[test]
fn validate_rejects_bad_checksum() {
    let home = TempDir::new().unwrap();
    mobinv(home.path())
        .args(["validate", "490154203237518", "490154203237519"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("checksum"))
        .stderr(predicate::str::contains("1 of 2 IMEIs are invalid"));
}

#[test]
fn validate_json_output() {
    let home = TempDir::new().unwrap();
    let output = mobinv(home.path())
        .args(["validate", "--json", "490154203237518"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["is_valid"], true);
    assert_eq!(json[0]["input"], "490154203237518");
}

#[test]
fn imei_suggests_dual_fields() {
    let home = TempDir::new().unwrap();
    mobinv(home.path())
        .args(["imei", "--text", "IMEI1: 490154203237518 IMEI2: 490154203237526"])
        .assert()
        .success()
        .stdout(predicate::str::contains("490154 203237 518"))
        .stdout(predicate::str::contains("Dual"));
}

#[test]
fn imei_json_reports_field_count() {
    let home = TempDir::new().unwrap();
    let output = mobinv(home.path())
        .args(["imei", "--json", "--text", "IMEI: 490154203237518"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["suggestion"], "single");
    assert_eq!(json["field_count"], 1);
    assert_eq!(json["candidates"][0]["clean_digits"], "490154203237518");
}

#[test]
fn process_extracts_invoice() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice.txt");
    fs::write(&input, SHOP_INVOICE).unwrap();

    let output = mobinv(home.path()).arg("process").arg(&input).output().unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["invoice"]["invoice_number"], "MW/1187");
    assert_eq!(json["invoice"]["vendor_name"], "Mobile World");
    assert_eq!(json["products"][0]["brand"], "Redmi");
    assert_eq!(json["imeis"][0], "490154203237518");
    assert_eq!(json["imeis"][1], "490154203237526");
}

#[test]
fn process_empty_file_fails() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("blank.txt");
    fs::write(&input, "   \n\n").unwrap();

    mobinv(home.path())
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("insufficient_text"));
}

#[test]
fn process_missing_file_fails() {
    let home = TempDir::new().unwrap();
    mobinv(home.path())
        .args(["process", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn process_csv_has_one_row_per_product() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice.txt");
    fs::write(&input, SHOP_INVOICE).unwrap();

    mobinv(home.path())
        .args(["process", "--format", "csv"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("invoice_number,date,vendor_name"))
        .stdout(predicate::str::contains("490154203237518;490154203237526"));
}

#[test]
fn process_reads_ocr_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("ocr.json");
    let document = serde_json::json!({ "text": SHOP_INVOICE });
    fs::write(&input, document.to_string()).unwrap();

    mobinv(home.path())
        .args(["process", "--format", "text"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("Invoice: MW/1187"))
        .stdout(predicate::str::contains("Confidence: 100%"));
}

#[test]
fn batch_writes_summary() {
    let home = TempDir::new().unwrap();
    let inputs = home.path().join("in");
    let outputs = home.path().join("out");
    fs::create_dir_all(&inputs).unwrap();
    fs::write(inputs.join("a.txt"), SHOP_INVOICE).unwrap();
    fs::write(inputs.join("b.txt"), "").unwrap();

    let pattern = inputs.join("*.txt");
    mobinv(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&outputs)
        .arg("--summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful"));

    assert!(outputs.join("a.json").exists());
    let summary = fs::read_to_string(outputs.join("summary.csv")).unwrap();
    assert!(summary.contains("a.txt,success,MW/1187"));
    assert!(summary.contains("b.txt,insufficient_text"));
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.txt");
    mobinv(home.path())
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_writes_defaults() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("mobinv.json");

    mobinv(home.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["detection"]["window_radius"], 40);

    mobinv(home.path())
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[cfg(target_os = "linux")]
#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();

    mobinv(home.path())
        .args(["config", "set", "processing.min_text_length", "25"])
        .assert()
        .success();

    mobinv(home.path())
        .args(["config", "get", "processing.min_text_length"])
        .assert()
        .success()
        .stdout(predicate::str::contains("25"));

    mobinv(home.path())
        .args(["config", "set", "detection.suggestion_threshold", "3.0"])
        .assert()
        .failure();
}

#[test]
fn explicit_config_is_applied() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("strict.json");
    fs::write(&config, r#"{"processing": {"min_text_length": 5000}}"#).unwrap();
    let input = home.path().join("invoice.txt");
    fs::write(&input, SHOP_INVOICE).unwrap();

    mobinv(home.path())
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stdout(predicate::str::contains("insufficient_text"));
}

#[test]
fn process_drops_checksum_invalid_imei() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("invoice.txt");
    fs::write(
        &input,
        "Sold By: Mobile World Pvt Ltd, MG Road Pune\n\
         Invoice No: MW/1190\n\
         Charger, earphones and manual included in box\n\
         IMEI1: 490154203237519 IMEI2: 356938035643809\n\
         Grand Total 9,999.00\n",
    )
    .unwrap();

    let output = mobinv(home.path()).arg("process").arg(&input).output().unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["imeis"], serde_json::json!(["356938035643809"]));
}

#[test]
fn imei_reads_box_only_ocr_json() {
    let home = TempDir::new().unwrap();
    let input = home.path().join("boxes.json");
    let document = serde_json::json!({
        "boxes": [
            { "bbox": [0, 0, 300, 0, 300, 12, 0, 12], "text": "IMEI: 490154203237518", "score": 0.9 }
        ]
    });
    fs::write(&input, document.to_string()).unwrap();

    mobinv(home.path())
        .arg("imei")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("490154 203237 518"))
        .stdout(predicate::str::contains("Single"));
}
