// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{fs::File, io::Write, path::Path};

use serde_json::Value;
use tempfile::TempDir;

use crate::{get_cmd_output, get_test_file, oistructure};

fn read_report(path: &Path) -> Value {
    let file = File::open(path).expect("report wasn't written");
    serde_json::from_reader(file).unwrap()
}

fn labels(value: &Value) -> Vec<&str> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

#[test]
fn test_analyze_report() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("report.json");
    let tables = get_test_file("vlti.toml");

    #[rustfmt::skip]
    let cmd = oistructure()
        .args([
            "analyze",
            "--tables", &tables,
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "analyze failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Table 'vis' (4 rows)"), "{stdout}");
    assert!(stdout.contains("4 granule(s)"), "{stdout}");

    let report = read_report(&output);
    let tables = report["tables"].as_array().unwrap();
    assert_eq!(tables.len(), 3);

    // Two sub-arrays in the visibilities; the closing baseline of the
    // triangle wasn't observed.
    assert_eq!(tables[0]["name"], "vis");
    let vis_configurations = labels(&tables[0]["configurations"]);
    assert_eq!(vis_configurations.len(), 2);
    assert!(vis_configurations.contains(&"A0-B2-C1"));
    assert!(vis_configurations.contains(&"J1-J2"));
    assert_eq!(labels(&tables[0]["missing"]), ["A0-C1"]);

    assert_eq!(labels(&tables[1]["configurations"]), ["A0-B2-C1"]);
    assert!(tables[1]["missing"].as_array().unwrap().is_empty());

    // Without an array, stations are named by their identifiers.
    assert_eq!(labels(&tables[2]["configurations"]), ["4-5"]);
    for table in tables {
        assert_eq!(table["error"], Value::Null);
    }

    // The first orientation seen of each baseline names it.
    let baselines = report["baselines"].as_array().unwrap();
    let a0_b2 = baselines
        .iter()
        .find(|b| b["sorted_name"] == "A0-B2")
        .unwrap();
    assert_eq!(a0_b2["name"], "B2-A0");
    assert_eq!(a0_b2["orientation"], false);
    let triangle = baselines
        .iter()
        .find(|b| b["sorted_name"] == "A0-B2-C1")
        .unwrap();
    assert_eq!(triangle["name"], "A0-B2-C1");
    assert_eq!(triangle["orientation"], true);

    let granules = report["granules"].as_array().unwrap();
    assert_eq!(granules.len(), 4);

    assert_eq!(granules[0]["target"], "HD 1234");
    assert_eq!(granules[0]["ins_mode"], "GRAVITY_SC");
    assert_eq!(granules[0]["night"], 60000);
    assert_eq!(granules[0]["num_rows"], 3);
    assert_eq!(labels(&granules[0]["baselines"]), ["B2-A0", "C1-B2"]);
    assert_eq!(labels(&granules[0]["tables"]), ["vis"]);

    assert_eq!(granules[1]["night"], 60001);
    assert_eq!(labels(&granules[1]["baselines"]), ["J2-J1"]);
    assert_eq!(labels(&granules[1]["configurations"]), ["J1-J2"]);

    // Target 7 isn't described.
    assert_eq!(granules[2]["target"], "UNDEFINED");
    assert_eq!(labels(&granules[2]["tables"]), ["t3"]);

    // A row without stations still belongs to a granule.
    assert_eq!(granules[3]["ins_mode"], "UNDEFINED");
    assert_eq!(granules[3]["num_rows"], 3);
    assert_eq!(labels(&granules[3]["configurations"]), ["4-5"]);
}

#[test]
fn test_analyze_with_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("report.json");
    let arg_file = tmp_dir.path().join("args.toml");
    let mut f = File::create(&arg_file).unwrap();
    writeln!(f, "tables = {:?}", get_test_file("vlti.toml")).unwrap();
    writeln!(f, "undefined_target = \"nobody\"").unwrap();
    writeln!(f, "output = {:?}", output.display().to_string()).unwrap();
    f.flush().unwrap();
    drop(f);

    let cmd = oistructure()
        .args(["analyse", &format!("{}", arg_file.display())])
        .ok();
    assert!(cmd.is_ok(), "analyse failed: {}", cmd.err().unwrap());

    let report = read_report(&output);
    assert_eq!(report["granules"][2]["target"], "nobody");
}

#[test]
fn test_save_toml() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let saved = tmp_dir.path().join("saved.toml");
    let tables = get_test_file("vlti.toml");

    #[rustfmt::skip]
    let cmd = oistructure()
        .args([
            "analyze",
            "--dry-run",
            "--tables", &tables,
            "--max-missing", "2",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());

    let contents = std::fs::read_to_string(&saved).unwrap();
    let saved: toml::Value = toml::from_str(&contents).unwrap();
    assert_eq!(saved["tables"].as_str(), Some(tables.as_str()));
    assert_eq!(saved["max_missing"].as_integer(), Some(2));
}

#[test]
fn test_failed_table_is_reported() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("report.json");
    let tables = get_test_file("mixed_arity.json");

    #[rustfmt::skip]
    let cmd = oistructure()
        .args([
            "analyze",
            "--tables", &tables,
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("couldn't be determined: broken"), "{stderr}");

    // The other table is still analysed and the report is still written.
    let report = read_report(&output);
    assert!(report["tables"][0]["error"]
        .as_str()
        .unwrap()
        .contains("broken"));
    assert_eq!(report["tables"][1]["error"], Value::Null);
    assert_eq!(labels(&report["tables"][1]["configurations"]), ["E1-S1"]);
    assert_eq!(report["granules"][0]["night"], 59000);
}

#[test]
fn test_missing_table_file() {
    let cmd = oistructure()
        .args(["analyze", "--tables", "/does/not/exist.toml"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error: "), "{stderr}");
}

#[test]
fn test_unrecognised_table_extension() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let file = tmp_dir.path().join("tables.yaml");
    File::create(&file).unwrap();
    let cmd = oistructure()
        .args(["analyze", "--tables", &format!("{}", file.display())])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("toml, json"), "{stderr}");
}
