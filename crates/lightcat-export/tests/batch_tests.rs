use std::sync::Arc;

use chrono::NaiveDate;
use lightcat_core::{fixture_from_json, ExportSettings, Fixture, Manufacturer, Mode};
use lightcat_export::{
    export_batch, export_to_dir, plugin_by_key, DmxControl3Plugin, ExportError, ExportOptions,
    ExportPlugin,
};

fn options() -> ExportOptions {
    ExportOptions::new(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
}

fn par(manufacturer: &Arc<Manufacturer>, key: &str, name: &str) -> Fixture {
    let json = format!(
        r#"{{
            "name": "{name}",
            "categories": ["Color Changer"],
            "meta": {{ "authors": ["Tester"], "createDate": "2020-01-01", "lastModifyDate": "2020-06-01" }},
            "availableChannels": {{
                "Dimmer": {{ "capability": {{ "type": "Intensity" }} }},
                "Red": {{ "capability": {{ "type": "ColorIntensity", "color": "Red" }} }},
                "Green": {{ "capability": {{ "type": "ColorIntensity", "color": "Green" }} }},
                "Blue": {{ "capability": {{ "type": "ColorIntensity", "color": "Blue" }} }}
            }},
            "modes": [
                {{ "name": "3-channel", "shortName": "3ch", "channels": ["Red", "Green", "Blue"] }},
                {{ "name": "4-channel", "shortName": "4ch", "channels": ["Dimmer", "Red", "Green", "Blue"] }}
            ]
        }}"#
    );
    fixture_from_json(Arc::clone(manufacturer), key, &json).unwrap()
}

fn catalogue() -> Vec<Fixture> {
    let acme = Arc::new(Manufacturer {
        key: "acme".to_string(),
        name: "Acme Lighting".to_string(),
        website: None,
    });
    (1..=12)
        .map(|i| par(&acme, &format!("par-{i:02}"), &format!("PAR {i}")))
        .collect()
}

fn break_mode(fixture: &mut Fixture) {
    let broken = Mode::new(
        "Broken",
        "broken",
        None,
        vec!["Dimmer".to_string(), "Missing".to_string()],
        &fixture.channels,
    );
    fixture.modes.insert(1, broken);
}

#[test]
fn test_batch_preserves_input_order() {
    let fixtures = catalogue();
    let batch = export_batch(&DmxControl3Plugin, &fixtures, &options(), true);

    assert!(batch.is_complete());
    assert_eq!(batch.files.len(), 24);

    let names: Vec<&str> = batch.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names[0], "acme-par-01-3ch.xml");
    assert_eq!(names[1], "acme-par-01-4ch.xml");
    assert_eq!(names[23], "acme-par-12-4ch.xml");
}

#[test]
fn test_parallel_matches_sequential() {
    let fixtures = catalogue();
    let parallel = export_batch(&DmxControl3Plugin, &fixtures, &options(), true);
    let sequential = export_batch(&DmxControl3Plugin, &fixtures, &options(), false);

    assert_eq!(parallel.files, sequential.files);
}

#[test]
fn test_failed_item_does_not_abort_batch() {
    let mut fixtures = catalogue();
    break_mode(&mut fixtures[4]);

    let batch = export_batch(&DmxControl3Plugin, &fixtures, &options(), true);

    assert!(!batch.is_complete());
    assert_eq!(batch.failures.len(), 1);
    assert_eq!(batch.files.len(), 24);

    match &batch.failures[0] {
        ExportError::Item { fixture, mode, .. } => {
            assert_eq!(fixture, "acme/par-05");
            assert_eq!(mode, "broken");
        }
        other => panic!("expected an item error, got {other:?}"),
    }
    assert!(batch.failures[0].to_string().contains("acme/par-05"));
}

#[test]
fn test_export_fails_fast() {
    let mut fixtures = catalogue();
    break_mode(&mut fixtures[0]);

    let result = DmxControl3Plugin.export(&fixtures, &options());
    assert!(matches!(result, Err(ExportError::Item { .. })));
}

#[test]
fn test_export_to_dir() {
    let dir = tempfile::tempdir().unwrap();
    let mut fixtures = catalogue();
    fixtures.truncate(2);
    break_mode(&mut fixtures[1]);

    let settings = ExportSettings {
        output_dir: dir.path().to_path_buf(),
        plugins: vec![DmxControl3Plugin::KEY.to_string()],
        parallel: false,
    };
    let report = export_to_dir(&settings, &fixtures, &options()).unwrap();

    assert_eq!(report.written.len(), 4);
    assert_eq!(report.failures.len(), 1);

    let path = dir.path().join("dmxcontrol3").join("acme-par-02-4ch.xml");
    assert!(report.written.contains(&path));

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(content.contains("<model>PAR 2</model>"));
    assert!(content.contains("<vendor>Acme Lighting</vendor>"));
    assert!(content.contains("ddfversion=\"2020-06-01\""));
}

#[test]
fn test_unknown_plugin_in_settings() {
    let dir = tempfile::tempdir().unwrap();
    let settings = ExportSettings {
        output_dir: dir.path().to_path_buf(),
        plugins: vec!["qlcplus_4.12.2".to_string()],
        parallel: true,
    };

    let result = export_to_dir(&settings, &catalogue(), &options());
    assert!(matches!(result, Err(ExportError::UnknownPlugin(key)) if key == "qlcplus_4.12.2"));
}

#[test]
fn test_plugin_metadata() {
    let plugin = plugin_by_key("dmxcontrol3").unwrap();
    assert_eq!(plugin.name(), "DMXControl 3 (DDF3)");
    assert!(!plugin.version().is_empty());
}
