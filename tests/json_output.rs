use psshbox::boxes::PLAYREADY_SYSTEM_ID;
use psshbox::container::Container;
use psshbox::json_api::{JsonContainer, JsonPssh, analyze_container_file};
use psshbox::pssh::PsshBox;
use psshbox::record::{BlobRecord, RecordTag, TextRecord};
use psshbox::registry::playready_registry;
use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn sample_container() -> Container {
    let mut c = Container::new();
    c.push(TextRecord::rm_header("<WRMHEADER/>"));
    c.push(BlobRecord::with_data(RecordTag(0x0003), vec![0xDE, 0xAD, 0xBE, 0xEF]));
    c
}

#[test]
fn container_serializes_to_json() {
    let bytes = sample_container().serialize().unwrap();
    let parsed = Container::parse(&bytes, &playready_registry()).unwrap();

    let json = JsonContainer::try_from(&parsed).expect("json view");
    assert_eq!(json.length, bytes.len());
    assert_eq!(json.parsed_length, Some(bytes.len() as u32));

    let v: Value = serde_json::to_value(&json).unwrap();
    assert_eq!(v["record_count"], 2);
    assert_eq!(v["records"][0]["name"], "RMHeader");
    assert_eq!(v["records"][0]["text"], "<WRMHEADER/>");
    assert_eq!(v["records"][0]["length"], 24);
    assert!(v["records"][0]["hex"].is_null());
    assert_eq!(v["records"][1]["tag"], 3);
    assert_eq!(v["records"][1]["hex"], "deadbeef");
    assert_eq!(v["records"][1]["raw_length"], 4);
}

#[test]
fn pssh_json_names_the_system() {
    let b = PsshBox::playready(sample_container());
    let v: Value = serde_json::to_value(JsonPssh::try_from(&b).unwrap()).unwrap();

    assert_eq!(v["form"], "Pssh");
    assert_eq!(v["system_id"], PLAYREADY_SYSTEM_ID.to_string());
    assert_eq!(v["system_name"], "PlayReady");
    assert_eq!(v["size"], b.serialize().unwrap().len());
    assert_eq!(v["playready"]["record_count"], 2);
    assert!(v["data_hex"].is_null());
}

fn temp_file(name: &str, bytes: &[u8]) -> PathBuf {
    let path = std::env::temp_dir().join(name);
    let mut f = File::create(&path).unwrap();
    f.write_all(bytes).unwrap();
    path
}

#[test]
fn analyze_container_file_reads_from_disk() {
    let bytes = sample_container().serialize().unwrap();
    let path = temp_file("psshbox_json_output_test.bin", &bytes);

    let json = analyze_container_file(&path).expect("analyze failed");
    assert_eq!(json.record_count, 2);
    assert_eq!(json.records[1].hex.as_deref(), Some("deadbeef"));
}
