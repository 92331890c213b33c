// Crates.io
use chrono::NaiveDate;

// Workspace
use gdsrutils::SerializationFormat::{Json, Yaml};

// Local
use crate::*;

/// Fixed dates for test cases
fn test_dates() -> GdsDateTimes {
    let dt = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 1)
        .unwrap();
    GdsDateTimes::at(dt)
}
/// Create an empty library with known dates
fn empty_lib() -> GdsLibrary {
    let mut lib = GdsLibrary::new("empty");
    lib.dates = test_dates();
    lib
}
/// Encode a sequence of raw records, for hand-built (often invalid) streams
fn encode(records: &[GdsRecord]) -> Vec<u8> {
    let mut bytes = Vec::new();
    {
        let mut wr = GdsWriter::new(&mut bytes);
        for r in records {
            wr.write_record(r).unwrap();
        }
    }
    bytes
}
/// Library-level records leading up to the first struct
fn lib_prelude() -> Vec<GdsRecord> {
    vec![
        GdsRecord::Header { version: 600 },
        GdsRecord::BgnLib {
            dates: test_dates().encode(),
        },
        GdsRecord::LibName("lib".into()),
        GdsRecord::Units(1e-3, 1e-9),
    ]
}
/// A library with one of each element type
fn sample_lib() -> GdsLibrary {
    let mut leaf = GdsStruct::new("leaf");
    leaf.dates = test_dates();
    leaf.elems.push(
        GdsBoundary {
            layer: 1,
            datatype: 2,
            xy: GdsPoint::vec(&[(0, 0), (0, 100), (100, 100), (100, 0), (0, 0)]),
        }
        .into(),
    );
    leaf.elems.push(
        GdsPathBuilder::default()
            .layer(3i16)
            .datatype(0i16)
            .xy(GdsPoint::vec(&[(0, 0), (500, 0), (500, 500)]))
            .width(20)
            .path_type(4i16)
            .begin_extn(5)
            .end_extn(7)
            .build()
            .unwrap()
            .into(),
    );
    leaf.elems.push(
        GdsTextElem {
            string: "odd".into(),
            layer: 5,
            texttype: 0,
            xy: GdsPoint::new(-3, 4),
            presentation: Some(GdsPresentation(0, 0b0110)),
            strans: Some(GdsStrans {
                reflected: true,
                mag: Some(2.0),
                angle: Some(90.0),
                ..Default::default()
            }),
        }
        .into(),
    );
    let mut top = GdsStruct::new("top");
    top.dates = test_dates();
    top.elems.push(
        GdsStructRef {
            name: "leaf".into(),
            xy: GdsPoint::new(1000, 2000),
            strans: None,
        }
        .into(),
    );
    top.elems.push(
        GdsArrayRef {
            name: "leaf".into(),
            xy: [
                GdsPoint::new(0, 0),
                GdsPoint::new(3000, 0),
                GdsPoint::new(0, 2000),
            ],
            cols: 3,
            rows: 2,
            strans: Some(GdsStrans {
                angle: Some(180.0),
                ..Default::default()
            }),
        }
        .into(),
    );
    let mut lib = empty_lib();
    lib.name = "sample".into();
    lib.structs = vec![leaf, top];
    lib
}

#[test]
fn floats() {
    assert_eq!(GdsFloat64::encode(0.0), 0);
    assert_eq!(GdsFloat64::decode(0), 0.0);
    for val in [1.0, 1e-3, 1e-9, 1e-11, -0.69, 90.0, 2.5, -33.33e-33] {
        assert_eq!(GdsFloat64::decode(GdsFloat64::encode(val)), val);
    }
    // Known encoding of 1.0: exponent 65, mantissa 1/16
    assert_eq!(GdsFloat64::encode(1.0), 0x4110_0000_0000_0000);
}
#[test]
fn empty_lib_roundtrip() -> GdsResult<()> {
    roundtrip(&empty_lib())
}
#[test]
fn sample_lib_roundtrip() -> GdsResult<()> {
    roundtrip(&sample_lib())
}
#[test]
fn stats() {
    let stats = sample_lib().stats();
    assert_eq!(
        stats,
        GdsStats {
            libraries: 1,
            structs: 2,
            boundaries: 1,
            paths: 1,
            struct_refs: 1,
            array_refs: 1,
            text_elems: 1,
        }
    );
}
#[test]
fn record_too_long() {
    let mut lib = empty_lib();
    lib.name = "x".repeat(70_000);
    match lib.to_bytes() {
        Err(GdsError::RecordLen(_)) => (),
        other => panic!("Expected a RecordLen error, got {:?}", other),
    }
}
#[test]
fn long_boundaries_span_records() -> GdsResult<()> {
    let mut xy: Vec<GdsPoint> = (0..10_000).map(|i| GdsPoint::new(i, i % 7)).collect();
    xy.push(xy[0]);
    let mut cell = GdsStruct::new("big");
    cell.dates = test_dates();
    cell.elems.push(
        GdsBoundary {
            layer: 0,
            datatype: 0,
            xy,
        }
        .into(),
    );
    let mut lib = empty_lib();
    lib.structs.push(cell);
    roundtrip(&lib)?;

    // Count the XY records in the encoded stream
    let bytes = lib.to_bytes()?;
    let mut rdr = GdsReader::new(&bytes[..]);
    let mut num_xy = 0;
    loop {
        match rdr.read_record()? {
            GdsRecord::EndLib => break,
            GdsRecord::Xy(d) => {
                assert!(d.len() <= 2 * MAX_XY_POINTS);
                num_xy += 1;
            }
            _ => (),
        }
    }
    assert_eq!(num_xy, 2);
    Ok(())
}
#[test]
fn odd_length_strings_are_padded() -> GdsResult<()> {
    let bytes = encode(&[GdsRecord::LibName("abc".into())]);
    assert_eq!(bytes, vec![0x00, 0x08, 0x02, 0x06, b'a', b'b', b'c', 0x00]);
    let mut rdr = GdsReader::new(&bytes[..]);
    assert_eq!(rdr.read_record()?, GdsRecord::LibName("abc".into()));
    Ok(())
}
#[test]
fn unsupported_records_fail() {
    let mut bytes = encode(&lib_prelude());
    bytes.extend(encode(&[
        GdsRecord::BgnStruct {
            dates: test_dates().encode(),
        },
        GdsRecord::StructName("cell".into()),
    ]));
    // A `NODE` element header: valid GDSII, but not supported here
    bytes.extend([0x00, 0x04, 0x15, 0x00]);
    match GdsLibrary::from_bytes(&bytes) {
        Err(GdsError::Unsupported(GdsRecordType::Node, ctx)) => {
            assert_eq!(ctx, vec![GdsContext::Library, GdsContext::Struct]);
        }
        other => panic!("Expected an Unsupported error, got {:?}", other),
    }
}
#[test]
fn invalid_headers_fail() {
    // Odd length
    let bytes = [0x00, 0x05, 0x00, 0x02, 0x00];
    assert!(matches!(
        GdsLibrary::from_bytes(&bytes),
        Err(GdsError::RecordLen(5))
    ));
    // Deprecated record type `SPACING`
    let bytes = [0x00, 0x04, 0x18, 0x00];
    assert!(matches!(
        GdsLibrary::from_bytes(&bytes),
        Err(GdsError::InvalidRecordType(0x18))
    ));
    // `HEADER` with a string data-type
    let bytes = [0x00, 0x06, 0x00, 0x06, b'a', b'b'];
    assert!(matches!(
        GdsLibrary::from_bytes(&bytes),
        Err(GdsError::RecordDecode(GdsRecordType::Header, GdsDataType::Str, 2))
    ));
}
#[test]
fn malformed_structure_fails() {
    // Struct with no name
    let mut records = lib_prelude();
    records.push(GdsRecord::BgnStruct {
        dates: test_dates().encode(),
    });
    records.push(GdsRecord::EndStruct);
    records.push(GdsRecord::EndLib);
    assert!(matches!(
        GdsLibrary::from_bytes(&encode(&records)),
        Err(GdsError::Parse { .. })
    ));

    // Array reference with two corner points
    let mut records = lib_prelude();
    records.extend([
        GdsRecord::BgnStruct {
            dates: test_dates().encode(),
        },
        GdsRecord::StructName("cell".into()),
        GdsRecord::ArrayRef,
        GdsRecord::StructRefName("cell".into()),
        GdsRecord::ColRow { cols: 2, rows: 2 },
        GdsRecord::Xy(vec![0, 0, 10, 0]),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    match GdsLibrary::from_bytes(&encode(&records)) {
        Err(GdsError::Parse { ctx, .. }) => assert_eq!(ctx.last(), Some(&GdsContext::ArrayRef)),
        other => panic!("Expected a Parse error, got {:?}", other),
    }

    // Boundary missing its layer
    let mut records = lib_prelude();
    records.extend([
        GdsRecord::BgnStruct {
            dates: test_dates().encode(),
        },
        GdsRecord::StructName("cell".into()),
        GdsRecord::Boundary,
        GdsRecord::DataType(0),
        GdsRecord::Xy(vec![0, 0, 1, 0, 1, 1, 0, 0]),
        GdsRecord::EndElement,
        GdsRecord::EndStruct,
        GdsRecord::EndLib,
    ]);
    assert!(GdsLibrary::from_bytes(&encode(&records)).is_err());
}
#[test]
fn dates() -> GdsResult<()> {
    let dates = test_dates();
    assert_eq!(dates.modified.year, 70);
    assert_eq!(dates.modified.second, 1);
    let naive = dates.modified.to_naive()?;
    assert_eq!(GdsDateTime::from(naive), dates.modified);
    assert_eq!(GdsDateTimes::decode(&dates.encode()), dates);

    let bad = GdsDateTime::from(&[0, 30, 1, 0, 0, 0]);
    assert!(bad.to_naive().is_err());

    let mut lib = sample_lib();
    let later = NaiveDate::from_ymd_opt(2001, 2, 3)
        .unwrap()
        .and_hms_opt(4, 5, 6)
        .unwrap();
    lib.set_all_dates(later);
    assert_eq!(lib.dates.accessed.year, 101);
    assert!(lib.structs.iter().all(|s| s.dates == lib.dates));
    Ok(())
}
#[test]
fn presentation_bits() {
    let p = GdsPresentation(0, 0b01_10_01);
    assert_eq!(p.font(), 1);
    assert_eq!(p.vertical(), 2);
    assert_eq!(p.horizontal(), 1);
}
#[test]
fn units() {
    let units = GdsUnits::default();
    assert_eq!(units.db_unit(), 1e-9);
    assert!((units.user_unit() - 1e-6).abs() < 1e-18);
}
#[test]
fn text_formats() -> Result<(), gdsrutils::ser::Error> {
    let lib = sample_lib();
    let json = Json.to_string(&lib)?;
    let lib2: GdsLibrary = Json.from_str(&json)?;
    assert_eq!(lib, lib2);
    let yaml = Yaml.to_string(&empty_lib())?;
    let lib3: GdsLibrary = Yaml.from_str(&yaml)?;
    assert_eq!(lib3, empty_lib());
    Ok(())
}
#[test]
fn it_writes_schema() {
    let schema = schemars::schema_for!(GdsLibrary);
    let s = serde_json::to_string(&schema).unwrap();
    assert!(s.contains("GdsLibrary"));
    assert!(s.contains("GdsArrayRef"));
}
