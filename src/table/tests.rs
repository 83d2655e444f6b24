// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::indoc;
use tempfile::Builder;

use super::*;

fn write_temp(contents: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const TOML_FILE: &str = indoc! {r#"
    [[arrays]]
    name = "VLTI"
    stations = [
        { id = 1, name = "A0" },
        { id = 2, name = "B2" },
        { id = 3, name = "C1" },
    ]

    [[targets]]
    id = 1
    name = "HD 1234"

    [[tables]]
    name = "vis2"
    kind = "OI_VIS2"
    array = "VLTI"
    ins_mode = "GRAVITY_SC"
    rows = [
        { sta_index = [1, 2], target_id = 1, mjd = 60000.1 },
        { sta_index = [2, 3], target_id = 1, mjd = 60000.2 },
    ]

    [[tables]]
    name = "flux"
    kind = "OI_FLUX"
    rows = [
        { target_id = 1, mjd = 60000.1 },
    ]
"#};

const JSON_FILE: &str = indoc! {r#"
    {
      "arrays": [
        { "name": "VLTI", "stations": [ { "id": 1, "name": "A0" }, { "id": 2, "name": "B2" } ] }
      ],
      "targets": [ { "id": 1, "name": "HD 1234" } ],
      "tables": [
        {
          "name": "vis",
          "kind": "OI_VIS",
          "array": "VLTI",
          "rows": [ { "sta_index": [2, 1], "target_id": 3, "mjd": 60001.0 } ]
        }
      ]
    }
"#};

#[test]
fn test_read_toml() {
    let file = write_temp(TOML_FILE, ".toml");
    let data = OiFileData::read(file.path()).unwrap();
    assert_eq!(data.arrays.len(), 1);
    assert_eq!(data.tables.len(), 2);
    assert_eq!(data.tables[0].kind, TableKind::Vis2);
    assert_eq!(data.tables[1].rows[0].sta_index, None);

    let oi_file = data.into_file().unwrap();
    let tables = oi_file.tables();
    assert_eq!(tables[0].name(), "vis2");
    assert_eq!(tables[0].num_rows(), 2);
    assert_eq!(tables[0].sta_index(1), Some(&StaIndex::from([2, 3])));
    assert_abs_diff_eq!(tables[0].mjd(1), 60000.2);
    assert_eq!(tables[0].ins_mode().name(), "GRAVITY_SC");
    assert_eq!(tables[0].station_names().name(3), "C1");

    // No array or instrument mode.
    assert_eq!(tables[1].ins_mode(), &InstrumentMode::undefined());
    assert_eq!(tables[1].station_names().name(3), "3");
    assert_eq!(tables[1].sta_index(0), None);

    assert_eq!(oi_file.targets()[&1].name(), "HD 1234");
}

#[test]
fn test_read_json() {
    let file = write_temp(JSON_FILE, ".JSON");
    let oi_file = OiFileData::read(file.path())
        .unwrap()
        .into_file()
        .unwrap();
    let table = &oi_file.tables()[0];
    assert_eq!(table.kind(), TableKind::Vis);
    assert_eq!(table.target_id(0), 3);
    assert_eq!(table.sta_index(0), Some(&StaIndex::from([2, 1])));
}

#[test]
fn test_unrecognised_extension() {
    let file = write_temp(JSON_FILE, ".yaml");
    let result = OiFileData::read(file.path());
    assert!(matches!(result, Err(TableError::UnrecognisedExtension(_))));
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains("toml, json"), "{msg}");
}

#[test]
fn test_bad_contents() {
    let file = write_temp(JSON_FILE, ".toml");
    assert!(matches!(
        OiFileData::read(file.path()),
        Err(TableError::Toml { .. })
    ));
    let file = write_temp(TOML_FILE, ".json");
    assert!(matches!(
        OiFileData::read(file.path()),
        Err(TableError::Json { .. })
    ));
}

fn table(kind: TableKind, array: Option<&str>, rows: Vec<RowData>) -> TableData {
    TableData {
        name: "t".to_string(),
        kind,
        array: array.map(|s| s.to_string()),
        ins_mode: None,
        rows,
    }
}

fn row(ids: &[StationId], mjd: f64) -> RowData {
    RowData {
        sta_index: Some(StaIndex::new(ids.to_vec())),
        target_id: 0,
        mjd,
    }
}

#[test]
fn test_validation() {
    let data = OiFileData {
        tables: vec![table(TableKind::Vis, Some("CHARA"), vec![])],
        ..Default::default()
    };
    assert!(matches!(
        data.into_file(),
        Err(TableError::UnknownArray { array, .. }) if array == "CHARA"
    ));

    // Mismatched arities are left for the analysis of the table.
    let data = OiFileData {
        tables: vec![table(TableKind::T3, None, vec![row(&[1, 2, 3], 1.0), row(&[1, 2], 1.0)])],
        ..Default::default()
    };
    let oi_file = data.into_file().unwrap();
    assert_eq!(oi_file.tables()[0].sta_index(1), Some(&StaIndex::from([1, 2])));

    let data = OiFileData {
        tables: vec![table(TableKind::Flux, None, vec![row(&[1], f64::NAN)])],
        ..Default::default()
    };
    assert!(matches!(data.into_file(), Err(TableError::BadMjd { row: 0, .. })));

    let data = OiFileData {
        arrays: vec![ArrayData {
            name: "VLTI".to_string(),
            stations: vec![
                StationData {
                    id: 1,
                    name: "A0".to_string(),
                },
                StationData {
                    id: 1,
                    name: "A1".to_string(),
                },
            ],
        }],
        ..Default::default()
    };
    assert!(matches!(
        data.into_file(),
        Err(TableError::DuplicateStation { id: 1, .. })
    ));

    let data = OiFileData {
        targets: vec![
            TargetData {
                id: 4,
                name: "a".to_string(),
            },
            TargetData {
                id: 4,
                name: "b".to_string(),
            },
        ],
        ..Default::default()
    };
    assert!(matches!(
        data.into_file(),
        Err(TableError::DuplicateTarget { id: 4 })
    ));
}

#[test]
fn test_table_kinds() {
    assert_eq!(TableKind::from_str("OI_T3").unwrap(), TableKind::T3);
    assert_eq!(TableKind::Vis2.to_string(), "OI_VIS2");
    assert_eq!(
        TableKind::iter().map(|k| k.arity()).collect::<Vec<_>>(),
        [2, 2, 3, 1]
    );
}
