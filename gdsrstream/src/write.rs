//!
//! # GDSII Byte-Encoding and Writing
//!

// Std-Lib
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, WriteBytesExt};
use log::{debug, warn};

// Local
use crate::data::*;

/// # GdsWriter
/// Encodes [GdsLibrary] trees, record by record, onto any [Write] destination.
pub struct GdsWriter<'wr> {
    /// Write Destination
    dest: Box<dyn Write + 'wr>,
    /// Number of records written
    numwritten: usize,
}
impl<'wr> GdsWriter<'wr> {
    /// Create new [GdsWriter] with destination file `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        let file = BufWriter::new(File::create(fname)?);
        Ok(Self::new(file))
    }
    /// Create a new [GdsWriter] to destination `dest`
    pub fn new(dest: impl Write + 'wr) -> Self {
        Self {
            dest: Box::new(dest),
            numwritten: 0,
        }
    }
    /// Write a [GdsLibrary] to the destination
    pub fn write_lib(&mut self, lib: &GdsLibrary) -> GdsResult<()> {
        self.write_records(&[
            GdsRecord::Header {
                version: lib.version,
            },
            GdsRecord::BgnLib {
                dates: lib.dates.encode(),
            },
            GdsRecord::LibName(lib.name.clone()),
            GdsRecord::Units(lib.units.0, lib.units.1),
        ])?;
        for strukt in lib.structs.iter() {
            self.write_struct(strukt)?;
        }
        self.write_record(&GdsRecord::EndLib)?;
        self.dest.flush()?;
        debug!(
            "Wrote GDSII library `{}`: {} structs, {} records",
            lib.name,
            lib.structs.len(),
            self.numwritten
        );
        Ok(())
    }
    /// Write [GdsStruct] `strukt` to the destination
    pub fn write_struct(&mut self, strukt: &GdsStruct) -> GdsResult<()> {
        self.write_records(&[
            GdsRecord::BgnStruct {
                dates: strukt.dates.encode(),
            },
            GdsRecord::StructName(strukt.name.clone()),
        ])?;
        for elem in strukt.elems.iter() {
            self.write_records(&elem.to_records())?;
        }
        self.write_record(&GdsRecord::EndStruct)
    }
    /// Write a sequence of [GdsRecord]s
    fn write_records(&mut self, records: &[GdsRecord]) -> GdsResult<()> {
        for r in records {
            self.write_record(r)?;
        }
        Ok(())
    }
    /// Encode `record` into bytes and write onto `dest`
    pub fn write_record(&mut self, record: &GdsRecord) -> GdsResult<()> {
        // Strings are padded to even length
        let gds_strlen = |s: &str| -> usize { s.len() + s.len() % 2 };
        use GdsDataType::{BitArray, NoData, Str, F64, I16, I32};
        use GdsRecordType as R;
        let (rtype, dtype, len) = match record {
            GdsRecord::Header { .. } => (R::Header, I16, 2),
            GdsRecord::BgnLib { .. } => (R::BgnLib, I16, 24),
            GdsRecord::LibName(s) => (R::LibName, Str, gds_strlen(s)),
            GdsRecord::Units(_, _) => (R::Units, F64, 16),
            GdsRecord::EndLib => (R::EndLib, NoData, 0),
            GdsRecord::BgnStruct { .. } => (R::BgnStruct, I16, 24),
            GdsRecord::StructName(s) => (R::StructName, Str, gds_strlen(s)),
            GdsRecord::StructRefName(s) => (R::StructRefName, Str, gds_strlen(s)),
            GdsRecord::EndStruct => (R::EndStruct, NoData, 0),
            GdsRecord::Boundary => (R::Boundary, NoData, 0),
            GdsRecord::Path => (R::Path, NoData, 0),
            GdsRecord::StructRef => (R::StructRef, NoData, 0),
            GdsRecord::ArrayRef => (R::ArrayRef, NoData, 0),
            GdsRecord::Text => (R::Text, NoData, 0),
            GdsRecord::Layer(_) => (R::Layer, I16, 2),
            GdsRecord::DataType(_) => (R::DataType, I16, 2),
            GdsRecord::Width(_) => (R::Width, I32, 4),
            GdsRecord::Xy(d) => (R::Xy, I32, 4 * d.len()),
            GdsRecord::EndElement => (R::EndElement, NoData, 0),
            GdsRecord::ColRow { .. } => (R::ColRow, I16, 4),
            GdsRecord::TextType(_) => (R::TextType, I16, 2),
            GdsRecord::Presentation(_, _) => (R::Presentation, BitArray, 2),
            GdsRecord::String(s) => (R::String, Str, gds_strlen(s)),
            GdsRecord::Strans(_, _) => (R::Strans, BitArray, 2),
            GdsRecord::Mag(_) => (R::Mag, F64, 8),
            GdsRecord::Angle(_) => (R::Angle, F64, 8),
            GdsRecord::PathType(_) => (R::PathType, I16, 2),
            GdsRecord::BeginExtn(_) => (R::BeginExtn, I32, 4),
            GdsRecord::EndExtn(_) => (R::EndExtn, I32, 4),
        };
        // Header bytes. The length includes them.
        match u16::try_from(len + 4) {
            Ok(val) => self.dest.write_u16::<BigEndian>(val)?,
            Err(_) => return Err(GdsError::RecordLen(len)),
        };
        self.dest.write_u8(rtype as u8)?;
        self.dest.write_u8(dtype as u8)?;

        // Data, organized by data-type
        match record {
            GdsRecord::EndLib
            | GdsRecord::EndStruct
            | GdsRecord::Boundary
            | GdsRecord::Path
            | GdsRecord::StructRef
            | GdsRecord::ArrayRef
            | GdsRecord::Text
            | GdsRecord::EndElement => (),

            GdsRecord::Presentation(d0, d1) | GdsRecord::Strans(d0, d1) => {
                self.dest.write_all(&[*d0, *d1])?;
            }
            GdsRecord::Header { version: d }
            | GdsRecord::Layer(d)
            | GdsRecord::DataType(d)
            | GdsRecord::TextType(d)
            | GdsRecord::PathType(d) => self.dest.write_i16::<BigEndian>(*d)?,

            GdsRecord::Width(d) | GdsRecord::BeginExtn(d) | GdsRecord::EndExtn(d) => {
                self.dest.write_i32::<BigEndian>(*d)?
            }
            GdsRecord::Mag(d) | GdsRecord::Angle(d) => {
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d))?
            }
            GdsRecord::Units(d0, d1) => {
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d0))?;
                self.dest.write_u64::<BigEndian>(GdsFloat64::encode(*d1))?;
            }
            GdsRecord::ColRow { cols, rows } => {
                self.dest.write_i16::<BigEndian>(*cols)?;
                self.dest.write_i16::<BigEndian>(*rows)?;
            }
            GdsRecord::BgnLib { dates: d } | GdsRecord::BgnStruct { dates: d } => {
                for val in d.iter() {
                    self.dest.write_i16::<BigEndian>(*val)?;
                }
            }
            GdsRecord::Xy(d) => {
                for val in d.iter() {
                    self.dest.write_i32::<BigEndian>(*val)?;
                }
            }
            GdsRecord::LibName(s)
            | GdsRecord::StructName(s)
            | GdsRecord::StructRefName(s)
            | GdsRecord::String(s) => {
                self.dest.write_all(s.as_bytes())?;
                if s.len() % 2 != 0 {
                    self.dest.write_u8(0x00)?;
                }
            }
        };
        self.numwritten += 1;
        Ok(())
    }
}

/// # ToRecords
/// Conversion of stream-tree nodes into their ordered record sequences
pub trait ToRecords {
    fn to_records(&self) -> Vec<GdsRecord>;
}

/// Split point-list `xy` into `XY` records of at most [MAX_XY_POINTS] points each
fn xy_records(xy: &[GdsPoint]) -> Vec<GdsRecord> {
    if xy.len() > MAX_XY_POINTS {
        warn!(
            "Splitting {} points across {} XY records",
            xy.len(),
            (xy.len() + MAX_XY_POINTS - 1) / MAX_XY_POINTS
        );
    }
    xy.chunks(MAX_XY_POINTS)
        .map(|chunk| GdsRecord::Xy(GdsPoint::flatten_vec(chunk)))
        .collect()
}

impl ToRecords for GdsStrans {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![GdsRecord::Strans(
            (self.reflected as u8) << 7,
            (self.abs_mag as u8) << 2 | (self.abs_angle as u8) << 1,
        )];
        if let Some(mag) = self.mag {
            records.push(GdsRecord::Mag(mag));
        }
        if let Some(angle) = self.angle {
            records.push(GdsRecord::Angle(angle));
        }
        records
    }
}
impl ToRecords for GdsBoundary {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::Boundary,
            GdsRecord::Layer(self.layer),
            GdsRecord::DataType(self.datatype),
        ];
        records.extend(xy_records(&self.xy));
        records.push(GdsRecord::EndElement);
        records
    }
}
impl ToRecords for GdsPath {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::Path,
            GdsRecord::Layer(self.layer),
            GdsRecord::DataType(self.datatype),
        ];
        if let Some(d) = self.path_type {
            records.push(GdsRecord::PathType(d));
        }
        if let Some(d) = self.width {
            records.push(GdsRecord::Width(d));
        }
        if let Some(d) = self.begin_extn {
            records.push(GdsRecord::BeginExtn(d));
        }
        if let Some(d) = self.end_extn {
            records.push(GdsRecord::EndExtn(d));
        }
        records.extend(xy_records(&self.xy));
        records.push(GdsRecord::EndElement);
        records
    }
}
impl ToRecords for GdsStructRef {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::StructRef,
            GdsRecord::StructRefName(self.name.clone()),
        ];
        if let Some(ref s) = self.strans {
            records.extend(s.to_records());
        }
        records.push(GdsRecord::Xy(vec![self.xy.x, self.xy.y]));
        records.push(GdsRecord::EndElement);
        records
    }
}
impl ToRecords for GdsArrayRef {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::ArrayRef,
            GdsRecord::StructRefName(self.name.clone()),
        ];
        if let Some(ref s) = self.strans {
            records.extend(s.to_records());
        }
        records.push(GdsRecord::ColRow {
            cols: self.cols,
            rows: self.rows,
        });
        records.push(GdsRecord::Xy(GdsPoint::flatten_vec(&self.xy)));
        records.push(GdsRecord::EndElement);
        records
    }
}
impl ToRecords for GdsTextElem {
    fn to_records(&self) -> Vec<GdsRecord> {
        let mut records = vec![
            GdsRecord::Text,
            GdsRecord::Layer(self.layer),
            GdsRecord::TextType(self.texttype),
        ];
        if let Some(ref p) = self.presentation {
            records.push(GdsRecord::Presentation(p.0, p.1));
        }
        if let Some(ref s) = self.strans {
            records.extend(s.to_records());
        }
        records.push(GdsRecord::Xy(vec![self.xy.x, self.xy.y]));
        records.push(GdsRecord::String(self.string.clone()));
        records.push(GdsRecord::EndElement);
        records
    }
}
impl ToRecords for GdsElement {
    fn to_records(&self) -> Vec<GdsRecord> {
        match self {
            GdsElement::GdsBoundary(e) => e.to_records(),
            GdsElement::GdsPath(e) => e.to_records(),
            GdsElement::GdsStructRef(e) => e.to_records(),
            GdsElement::GdsArrayRef(e) => e.to_records(),
            GdsElement::GdsTextElem(e) => e.to_records(),
        }
    }
}
