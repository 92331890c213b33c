//!
//! # gdsr unit tests
//!

// Crates.io
use chrono::{NaiveDate, NaiveDateTime};

// Workspace
use gdsrstream::{GdsLibrary, GdsPoint, GdsStruct, GdsStructRef};
use gdsrutils::{Ptr, SerdeFile, SerializationFormat};

use super::*;

/// Fixed timestamp, for byte-stable output
fn test_date() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2001, 2, 3)
        .unwrap()
        .and_hms_opt(4, 5, 6)
        .unwrap()
}
/// Options with pinned dates
fn test_options() -> GdsOptions {
    GdsOptionsBuilder::default()
        .dates(test_date())
        .build()
        .unwrap()
}
fn rect(x0: f64, y0: f64, x1: f64, y1: f64, layer: i32) -> Polygon {
    Polygon::new([(x0, y0), (x1, y0), (x1, y1), (x0, y1)], layer, 0).unwrap()
}
/// A library with a `parent` cell placing a `child`, once and as an array,
/// and with one of each element type.
fn sample_lib() -> LayoutResult<Library> {
    let mut child = Cell::new("child");
    child.add(rect(0., 0., 1., 1., 1));
    child.add(
        Path::new([(0., 0.), (2., 0.), (2., 3.)], 2, 1, Some(PathType::Round), Some(0.25))?,
    );
    child.add(
        Path::new([(0., 0.), (0., 5.)], 2, 2, Some(PathType::Extended), Some(0.5))?
            .with_extensions(Some(0.125), Some(0.375)),
    );
    child.add(
        Text::new("label", (0.5, 0.5), 3)?
            .with_transform(2., 90., true)
            .with_presentation(VerticalPresentation::Top, HorizontalPresentation::Right),
    );

    let mut lib = Library::new("sample");
    let child = lib.add(child, false)?;
    let mut parent = Cell::new("parent");
    parent.add(rect(-1., -1., 10., 10., 0));
    parent.add(Reference::new(&child).with_grid(Grid {
        origin: Point::new(1., 2.),
        angle: 90.,
        ..Default::default()
    }));
    parent.add(
        Reference::new(&child).with_grid(
            GridBuilder::default()
                .origin((3., 4.))
                .columns(3usize)
                .rows(2usize)
                .spacing_x((2., 0.))
                .spacing_y((0., 4.))
                .magnification(2.)
                .x_reflection(true)
                .build()
                .unwrap(),
        ),
    );
    lib.add(parent, false)?;
    Ok(lib)
}

#[test]
fn square_union_inscribed_circle() -> LayoutResult<()> {
    let square = rect(0., 0., 1., 1., 1);
    let circle = Polygon::ellipse(
        &EllipseBuilder::default()
            .centre((0.5, 0.5))
            .horizontal_radius(0.5)
            .layer(1)
            .build()
            .unwrap(),
    )?;
    let union = &square | &circle;
    assert_eq!(union.len(), 1);
    assert!(union[0].looks_like(&square));
    let intersection = &square & &circle;
    assert_eq!(intersection.len(), 1);
    assert!((intersection[0].area() - circle.area()).abs() < 1e-9);
    Ok(())
}
#[test]
fn roundtrip_bytes() -> LayoutResult<()> {
    let lib = sample_lib()?;
    let opts = test_options();
    let bytes = lib.to_gds_bytes(&opts)?;
    // Byte-stable, given pinned dates
    assert_eq!(bytes, lib.to_gds_bytes(&opts)?);
    let lib2 = Library::from_gds_bytes(&bytes, &opts)?;
    assert_eq!(lib, lib2);
    // And stable across a second trip
    assert_eq!(bytes, lib2.to_gds_bytes(&opts)?);
    // Shared cells remain shared
    let parent = lib2.get("parent").unwrap();
    let deps = parent.read_or_recover().dependencies();
    let child = lib2.get("child").unwrap();
    assert!(deps.iter().all(|d| d.ptr_eq(&child)));
    Ok(())
}
#[test]
fn roundtrip_file() -> LayoutResult<()> {
    let lib = sample_lib()?;
    let opts = test_options();
    let dir = tempfile::tempdir()?;
    let fname = dir.path().join("sample.gds");
    lib.to_gds(&fname, &opts)?;
    assert_eq!(Library::from_gds(&fname, &opts)?, lib);

    // Stream-level round-trip of the same content
    let gdslib = lib.to_gds_lib(&opts)?;
    gdsrstream::roundtrip(&gdslib)?;
    assert_eq!(gdslib.dates, gdsrstream::GdsDateTimes::at(test_date()));
    Ok(())
}
#[test]
fn roundtrip_other_units() -> LayoutResult<()> {
    let lib = sample_lib()?;
    let opts = GdsOptions {
        user_unit: 1e-3,
        database_unit: 1e-9,
        ..test_options()
    };
    let gdslib = lib.to_gds_lib(&opts)?;
    assert_eq!(gdslib.units.db_unit(), 1e-9);
    let lib2 = Library::from_gds_lib(&gdslib, &opts)?;
    assert_eq!(lib, lib2);
    Ok(())
}
#[test]
fn cell_to_gds() -> LayoutResult<()> {
    let mut cell = Cell::new("lonely");
    cell.add(rect(0., 0., 1., 2., 4));
    let dir = tempfile::tempdir()?;
    let fname = dir.path().join("lonely.gds");
    cell.to_gds(&fname, &GdsOptions::default())?;
    let lib = Library::from_gds(&fname, &GdsOptions::default())?;
    assert_eq!(lib.name, "library");
    assert_eq!(lib.len(), 1);
    assert_eq!(*lib.get("lonely").unwrap().read_or_recover(), cell);
    Ok(())
}
#[test]
fn non_member_cells_are_written() -> LayoutResult<()> {
    let leaf = Ptr::new(Cell::new("leaf"));
    leaf.write_or_recover().add(rect(0., 0., 1., 1., 1));
    let mut top = Cell::new("top");
    top.add(Reference::new(&leaf));
    let mut lib = Library::new("lib");
    lib += top;
    let lib2 = Library::from_gds_bytes(&lib.to_gds_bytes(&test_options())?, &test_options())?;
    // The leaf becomes a member on import
    assert_eq!(lib2.len(), 2);
    assert!(lib2.contains("leaf"));
    Ok(())
}
#[test]
fn dangling_references() -> LayoutResult<()> {
    let mut gdslib = GdsLibrary::new("lib");
    let mut top = GdsStruct::new("top");
    for name in ["missing", "gone", "missing"] {
        top.elems.push(
            GdsStructRef {
                name: name.into(),
                xy: GdsPoint::new(0, 0),
                strans: None,
            }
            .into(),
        );
    }
    gdslib.structs.push(top);
    let bytes = gdslib.to_bytes()?;
    match Library::from_gds_bytes(&bytes, &GdsOptions::default()) {
        Err(LayoutError::DanglingReferences(names)) => {
            assert_eq!(names, vec!["missing".to_string(), "gone".to_string()]);
        }
        other => panic!("Expected dangling references, got {:?}", other),
    }
    Ok(())
}
#[test]
fn flatten_hierarchy() -> LayoutResult<()> {
    let lib = sample_lib()?;
    let parent = lib.get("parent").unwrap();
    let mut flat = parent.read_or_recover().copy(false)?;
    flat.flatten(None, None)?;
    assert!(flat.references().is_empty());
    // Own rectangle, plus one polygon per placement: one single, six arrayed
    assert_eq!(flat.polygons().len(), 8);
    assert_eq!(flat.paths().len(), 14);
    assert_eq!(flat.texts().len(), 7);
    // Idempotent
    let again = flat.get_elements(None, None)?;
    assert_eq!(again, flat.elements());
    // The source is untouched
    assert_eq!(parent.read_or_recover().references().len(), 2);

    // Filtered to layer 1: own layer-0 rectangle kept, seven placed squares
    let filtered = parent.read_or_recover().get_elements(Some((1, 0)), None)?;
    assert_eq!(filtered.len(), 8);
    Ok(())
}
#[test]
fn copies_share_or_duplicate() -> LayoutResult<()> {
    let lib = sample_lib()?;
    let shallow = lib.copy(false)?;
    let deep = lib.copy(true)?;
    assert_eq!(shallow, lib);
    assert_eq!(deep, lib);
    let child = lib.get("child").unwrap();
    assert!(shallow.get("child").unwrap().ptr_eq(&child));
    assert!(!deep.get("child").unwrap().ptr_eq(&child));

    child.write_or_recover().add(rect(5., 5., 6., 6., 9));
    assert_eq!(shallow, lib);
    assert_ne!(deep, lib);
    Ok(())
}
#[test]
fn name_conflicts() -> LayoutResult<()> {
    let mut lib = sample_lib()?;
    assert!(matches!(
        lib.add(Cell::new("child"), false),
        Err(LayoutError::NameConflict(_))
    ));
    lib += Cell::new("child");
    assert!(lib.get("child").unwrap().read_or_recover().is_empty());
    Ok(())
}
#[test]
fn options_files() -> LayoutResult<()> {
    let opts = test_options();
    let dir = tempfile::tempdir()?;
    for (fmt, fname) in [
        (SerializationFormat::Json, "opts.json"),
        (SerializationFormat::Yaml, "opts.yaml"),
        (SerializationFormat::Toml, "opts.toml"),
    ] {
        let fname = dir.path().join(fname);
        opts.save(fmt, &fname)?;
        assert_eq!(GdsOptions::open(&fname, fmt)?, opts);
    }
    Ok(())
}
