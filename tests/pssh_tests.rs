use psshbox::boxes::{FourCC, Guid, PIFF_PSSH_USERTYPE, PLAYREADY_SYSTEM_ID, WIDEVINE_SYSTEM_ID};
use psshbox::container::Container;
use psshbox::error::ParseError;
use psshbox::pssh::{BoxForm, ProtectionData, PsshBox};
use psshbox::record::{BlobRecord, TextRecord};
use psshbox::registry::playready_registry;

fn playready_object() -> Vec<u8> {
    let xml: Vec<u8> = "<WRMHEADER/>"
        .encode_utf16()
        .flat_map(|u| u.to_le_bytes())
        .collect();
    let mut v = Vec::new();
    v.extend_from_slice(&((6 + 4 + xml.len()) as u32).to_be_bytes());
    v.extend_from_slice(&1u16.to_be_bytes());
    v.extend_from_slice(&1u16.to_be_bytes());
    v.extend_from_slice(&(xml.len() as u16).to_be_bytes());
    v.extend_from_slice(&xml);
    v
}

/// [size]['pssh'][version][flags][system id][kids...][data size][data]
fn pssh_box(version: u8, system_id: Guid, kids: &[Guid], data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.push(version);
    body.extend_from_slice(&[0, 0, 0]);
    body.extend_from_slice(&system_id.0);
    if version > 0 {
        body.extend_from_slice(&(kids.len() as u32).to_be_bytes());
        for k in kids {
            body.extend_from_slice(&k.0);
        }
    }
    body.extend_from_slice(&(data.len() as u32).to_be_bytes());
    body.extend_from_slice(data);

    let mut v = Vec::new();
    v.extend_from_slice(&((8 + body.len()) as u32).to_be_bytes());
    v.extend_from_slice(b"pssh");
    v.extend_from_slice(&body);
    v
}

#[test]
fn playready_pssh_v0_round_trips() {
    let data = pssh_box(0, PLAYREADY_SYSTEM_ID, &[], &playready_object());
    let b = PsshBox::parse(&data, &playready_registry()).expect("parse failed");

    assert_eq!(b.form, BoxForm::Pssh);
    assert_eq!(b.version, 0);
    assert_eq!(b.system_id, PLAYREADY_SYSTEM_ID);
    assert_eq!(b.system_id.known_name(), Some("PlayReady"));
    let c = b.container().expect("playready container");
    assert_eq!(c.get::<TextRecord>(0).unwrap().text(), "<WRMHEADER/>");

    assert_eq!(b.serialize().unwrap(), data);
}

#[test]
fn v1_key_ids_and_opaque_data_round_trip() {
    let kids = [Guid([0x11; 16]), Guid([0x22; 16])];
    let data = pssh_box(1, WIDEVINE_SYSTEM_ID, &kids, &[0x08, 0x01, 0x12, 0x00]);
    let b = PsshBox::parse(&data, &playready_registry()).unwrap();

    assert_eq!(b.version, 1);
    assert_eq!(b.key_ids, kids.to_vec());
    assert!(b.container().is_none());
    match &b.data {
        ProtectionData::Opaque(d) => assert_eq!(d, &[0x08, 0x01, 0x12, 0x00]),
        other => panic!("expected opaque data, got {other:?}"),
    }
    assert_eq!(b.serialize().unwrap(), data);
}

#[test]
fn piff_uuid_form_round_trips() {
    let object = playready_object();
    let mut data = Vec::new();
    let size = 8 + 16 + 4 + 16 + 4 + object.len();
    data.extend_from_slice(&(size as u32).to_be_bytes());
    data.extend_from_slice(b"uuid");
    data.extend_from_slice(&PIFF_PSSH_USERTYPE.0);
    data.extend_from_slice(&[0, 0, 0, 0]);
    data.extend_from_slice(&PLAYREADY_SYSTEM_ID.0);
    data.extend_from_slice(&(object.len() as u32).to_be_bytes());
    data.extend_from_slice(&object);

    let b = PsshBox::parse(&data, &playready_registry()).unwrap();
    assert_eq!(b.form, BoxForm::Piff);
    assert!(b.container().is_some());
    assert_eq!(b.serialize().unwrap(), data);
}

#[test]
fn large_size_header_is_preserved() {
    let small = pssh_box(0, WIDEVINE_SYSTEM_ID, &[], &[1, 2, 3]);
    let mut data = Vec::new();
    data.extend_from_slice(&1u32.to_be_bytes());
    data.extend_from_slice(b"pssh");
    data.extend_from_slice(&((small.len() + 8) as u64).to_be_bytes());
    data.extend_from_slice(&small[8..]);

    let b = PsshBox::parse(&data, &playready_registry()).unwrap();
    assert!(b.large_size);
    assert_eq!(b.serialize().unwrap(), data);
}

#[test]
fn built_box_parses_back() {
    let mut c = Container::new();
    c.push(TextRecord::rm_header("<WRMHEADER/>"));
    c.push(BlobRecord::with_data(psshbox::record::EMBEDDED_LICENSE_STORE, vec![9; 5]));
    let b = PsshBox::playready(c).with_key_ids(vec![Guid([0xAB; 16])]);

    let bytes = b.serialize().unwrap();
    let back = PsshBox::parse(&bytes, &playready_registry()).unwrap();
    assert_eq!(back.version, 1);
    assert_eq!(back.key_ids, vec![Guid([0xAB; 16])]);
    let c = back.container().unwrap();
    assert_eq!(c.len(), 2);
    assert_eq!(c.get::<BlobRecord>(1).unwrap().data(), &[9; 5]);
}

#[test]
fn other_box_types_are_rejected() {
    let mut data = pssh_box(0, WIDEVINE_SYSTEM_ID, &[], &[]);
    data[4..8].copy_from_slice(b"moov");
    assert_eq!(
        PsshBox::parse(&data, &playready_registry()).unwrap_err(),
        ParseError::UnexpectedBoxType {
            expected: FourCC(*b"pssh"),
            found: FourCC(*b"moov")
        }
    );
}

#[test]
fn truncated_box_and_data_are_detected() {
    let data = pssh_box(0, WIDEVINE_SYSTEM_ID, &[], &[1, 2, 3, 4]);
    assert!(matches!(
        PsshBox::parse(&data[..data.len() - 2], &playready_registry()),
        Err(ParseError::TruncatedBox { .. })
    ));

    // data_size claims more than the box holds
    let mut lying = data.clone();
    let at = lying.len() - 8;
    lying[at..at + 4].copy_from_slice(&100u32.to_be_bytes());
    assert!(matches!(
        PsshBox::parse(&lying, &playready_registry()),
        Err(ParseError::TruncatedBox { needed: 100, available: 4 })
    ));
}

#[test]
fn playready_payload_must_be_exactly_one_object() {
    let mut object = playready_object();
    object.push(0x00);
    let data = pssh_box(0, PLAYREADY_SYSTEM_ID, &[], &object);
    assert_eq!(
        PsshBox::parse(&data, &playready_registry()).unwrap_err(),
        ParseError::TrailingBytes(1)
    );
}

#[test]
fn guid_hex_formatting() {
    let id = Guid::from_hex("9a04f079-9840-4286-ab92-e65be0885f95").unwrap();
    assert_eq!(id, PLAYREADY_SYSTEM_ID);
    assert_eq!(id.to_string(), "9a04f079-9840-4286-ab92-e65be0885f95");
    assert!(Guid::from_hex("9a04f079").is_none());
    assert_eq!(Guid([0; 16]).known_name(), None);
}

#[test]
fn zero_size_box_runs_to_end_of_buffer() {
    let mut data = pssh_box(0, PLAYREADY_SYSTEM_ID, &[], &playready_object());
    let explicit = data.clone();
    data[0..4].copy_from_slice(&0u32.to_be_bytes());

    let b = PsshBox::parse(&data, &playready_registry()).expect("parse failed");
    assert!(b.container().is_some());
    // written back with the size spelled out
    assert_eq!(b.serialize().unwrap(), explicit);

    // with size 0 nothing may follow the data
    data.push(0x00);
    assert_eq!(
        PsshBox::parse(&data, &playready_registry()).unwrap_err(),
        ParseError::TrailingBytes(1)
    );
}

#[test]
fn data_offset_points_at_the_protection_data() {
    let object = playready_object();
    let registry = playready_registry();

    let v0 = pssh_box(0, PLAYREADY_SYSTEM_ID, &[], &object);
    let b = PsshBox::parse(&v0, &registry).unwrap();
    assert_eq!(b.data_offset().unwrap(), 8 + 4 + 16 + 4);
    assert_eq!(&v0[b.data_offset().unwrap()..], &object[..]);

    let kids = [Guid([0x11; 16]), Guid([0x22; 16])];
    let v1 = pssh_box(1, PLAYREADY_SYSTEM_ID, &kids, &object);
    let b = PsshBox::parse(&v1, &registry).unwrap();
    assert_eq!(b.data_offset().unwrap(), 8 + 4 + 16 + 4 + 32 + 4);
    assert_eq!(&v1[b.data_offset().unwrap()..], &object[..]);

    let mut piff = PsshBox::playready(Container::parse(&object, &registry).unwrap());
    piff.form = BoxForm::Piff;
    piff.large_size = true;
    let out = piff.serialize().unwrap();
    assert_eq!(piff.data_offset().unwrap(), 16 + 16 + 4 + 16 + 4);
    assert_eq!(&out[piff.data_offset().unwrap()..], &object[..]);
}
