// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, get_test_file, oistructure};

#[test]
fn test_analyze_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let report = tmp_dir.path().join("report.json");
    let tables = get_test_file("vlti.toml");

    #[rustfmt::skip]
    let cmd = oistructure()
        .args([
            "analyze",
            "--tables", &tables,
            "--output", &format!("{}", report.display()),
        ])
        .ok();
    assert!(
        cmd.is_ok(),
        "analyze failed on simple test data: {}",
        cmd.err().unwrap()
    );
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_dry_run_no_stderr() {
    let tables = get_test_file("vlti.toml");
    let cmd = oistructure()
        .args(["analyze", "--dry-run", "--tables", &tables])
        .ok();
    assert!(cmd.is_ok(), "{}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
