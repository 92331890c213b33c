//!
//! # GDSII Stream Reading
//!

// Std-Lib
use std::fs::File;
use std::io::{Cursor, Read};
use std::mem;
use std::path::Path;

// Crates.io
use byteorder::{BigEndian, ReadBytesExt};
use log::{debug, trace};
use memmap2::Mmap;
use num_traits::FromPrimitive;

// Local
use crate::data::*;

/// Size (in bytes) of the read/decode buffer. Fits the longest possible record.
const READER_BUFSIZE: usize = 65536;

/// # GdsReader
///
/// Decodes [GdsRecord]s, one at a time, from any in-memory byte source.
/// Files are memory-mapped; byte-slices are read in place.
pub struct GdsReader<B: AsRef<[u8]>> {
    /// Read/conversion buffer
    buf: Vec<u8>,
    /// Data being read
    file: Cursor<B>,
}
impl GdsReader<Mmap> {
    /// Create a [GdsReader], memory-mapping the [File] at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        let file = File::open(fname)?;
        // Our one line of `unsafe`: the mapping is invalid if the file is changed underneath it.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self::new(mmap))
    }
}
impl<B: AsRef<[u8]>> GdsReader<B> {
    /// Create a [GdsReader] of `data`
    pub fn new(data: B) -> Self {
        Self {
            buf: vec![0; READER_BUFSIZE],
            file: Cursor::new(data),
        }
    }
    /// Read the next record-header
    fn read_record_header(&mut self) -> GdsResult<GdsRecordHeader> {
        // Total record length, in bytes, including the four header bytes
        let len = self.file.read_u16::<BigEndian>()?;
        if len < 4 || len % 2 != 0 {
            return Err(GdsError::RecordLen(len.into()));
        }
        let rtype = self.file.read_u8()?;
        let rtype: GdsRecordType =
            FromPrimitive::from_u8(rtype).ok_or(GdsError::InvalidRecordType(rtype))?;
        if !rtype.valid() {
            return Err(GdsError::InvalidRecordType(rtype as u8));
        }
        let dtype = self.file.read_u8()?;
        let dtype: GdsDataType =
            FromPrimitive::from_u8(dtype).ok_or(GdsError::InvalidDataType(dtype))?;
        Ok(GdsRecordHeader {
            rtype,
            dtype,
            len: len - 4,
        })
    }
    /// Read the next [GdsRecord].
    /// Fails if not positioned on a record boundary, or if decoding otherwise fails.
    pub fn read_record(&mut self) -> GdsResult<GdsRecord> {
        let header = self.read_record_header()?;
        if !header.rtype.supported() {
            return Err(GdsError::Unsupported(header.rtype, Vec::new()));
        }
        self.read_record_content(&header)
    }
    fn read_record_content(&mut self, header: &GdsRecordHeader) -> GdsResult<GdsRecord> {
        use GdsDataType::{BitArray, NoData, Str, F64, I16, I32};
        use GdsRecordType as R;
        let len = header.len;
        let record = match (header.rtype, header.dtype, len) {
            // Library-Level Records
            (R::Header, I16, 2) => GdsRecord::Header {
                version: self.read_i16(len)?[0],
            },
            (R::BgnLib, I16, 24) => GdsRecord::BgnLib {
                dates: self.read_dates()?,
            },
            (R::LibName, Str, _) => GdsRecord::LibName(self.read_str(len)?),
            (R::Units, F64, 16) => {
                let v = self.read_f64(len)?;
                GdsRecord::Units(v[0], v[1])
            }
            (R::EndLib, NoData, 0) => GdsRecord::EndLib,

            // Struct-Level Records
            (R::BgnStruct, I16, 24) => GdsRecord::BgnStruct {
                dates: self.read_dates()?,
            },
            (R::StructName, Str, _) => GdsRecord::StructName(self.read_str(len)?),
            (R::StructRefName, Str, _) => GdsRecord::StructRefName(self.read_str(len)?),
            (R::EndStruct, NoData, 0) => GdsRecord::EndStruct,

            // Element-Level Records
            (R::Boundary, NoData, 0) => GdsRecord::Boundary,
            (R::Path, NoData, 0) => GdsRecord::Path,
            (R::StructRef, NoData, 0) => GdsRecord::StructRef,
            (R::ArrayRef, NoData, 0) => GdsRecord::ArrayRef,
            (R::Text, NoData, 0) => GdsRecord::Text,
            (R::Layer, I16, 2) => GdsRecord::Layer(self.read_i16(len)?[0]),
            (R::DataType, I16, 2) => GdsRecord::DataType(self.read_i16(len)?[0]),
            (R::Width, I32, 4) => GdsRecord::Width(self.read_i32(len)?[0]),
            (R::Xy, I32, _) if len % 8 == 0 => GdsRecord::Xy(self.read_i32(len)?),
            (R::EndElement, NoData, 0) => GdsRecord::EndElement,
            (R::ColRow, I16, 4) => {
                let d = self.read_i16(len)?;
                GdsRecord::ColRow {
                    cols: d[0],
                    rows: d[1],
                }
            }
            (R::TextType, I16, 2) => GdsRecord::TextType(self.read_i16(len)?[0]),
            (R::Presentation, BitArray, 2) => {
                let (d0, d1) = self.read_bits()?;
                GdsRecord::Presentation(d0, d1)
            }
            (R::String, Str, _) => GdsRecord::String(self.read_str(len)?),
            (R::Strans, BitArray, 2) => {
                let (d0, d1) = self.read_bits()?;
                GdsRecord::Strans(d0, d1)
            }
            (R::Mag, F64, 8) => GdsRecord::Mag(self.read_f64(len)?[0]),
            (R::Angle, F64, 8) => GdsRecord::Angle(self.read_f64(len)?[0]),
            (R::PathType, I16, 2) => GdsRecord::PathType(self.read_i16(len)?[0]),
            (R::BeginExtn, I32, 4) => GdsRecord::BeginExtn(self.read_i32(len)?[0]),
            (R::EndExtn, I32, 4) => GdsRecord::EndExtn(self.read_i32(len)?[0]),

            // Anything else has a mismatched data-type or length
            _ => return Err(GdsError::RecordDecode(header.rtype, header.dtype, len)),
        };
        Ok(record)
    }
    /// Read `len` bytes and convert to `String`, stripping any trailing NUL padding
    fn read_str(&mut self, len: u16) -> GdsResult<String> {
        let len: usize = len.into();
        self.file.read_exact(&mut self.buf[0..len])?;
        let mut data = &self.buf[0..len];
        if let [rest @ .., 0x00] = data {
            data = rest;
        }
        Ok(std::str::from_utf8(data)?.into())
    }
    /// Read a two-byte bit-array
    fn read_bits(&mut self) -> GdsResult<(u8, u8)> {
        Ok((self.file.read_u8()?, self.file.read_u8()?))
    }
    /// Read the twelve `i16`s of a `BGNLIB` or `BGNSTR` record
    fn read_dates(&mut self) -> GdsResult<[i16; 12]> {
        let mut rv = [0; 12];
        self.file.read_i16_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/2` i16s from `len` bytes
    fn read_i16(&mut self, len: u16) -> GdsResult<Vec<i16>> {
        let mut rv = vec![0; usize::from(len) / 2];
        self.file.read_i16_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/4` i32s from `len` bytes
    fn read_i32(&mut self, len: u16) -> GdsResult<Vec<i32>> {
        let mut rv = vec![0; usize::from(len) / 4];
        self.file.read_i32_into::<BigEndian>(&mut rv)?;
        Ok(rv)
    }
    /// Read `len/8` f64s from `len` bytes, decoding GDSII's float-format along the way
    fn read_f64(&mut self, len: u16) -> GdsResult<Vec<f64>> {
        let mut u64s = vec![0; usize::from(len) / 8];
        self.file.read_u64_into::<BigEndian>(&mut u64s)?;
        Ok(u64s.into_iter().map(GdsFloat64::decode).collect())
    }
    /// Get the current byte position
    fn pos(&self) -> u64 {
        self.file.position()
    }
}

/// # GdsParser
///
/// A peekable iterator over [GdsRecord]s,
/// which assembles them into a [GdsLibrary] tree.
pub struct GdsParser<B: AsRef<[u8]>> {
    /// Record decoder
    rdr: GdsReader<B>,
    /// Next record, stored for peeking
    nxt: GdsRecord,
    /// Number of records read
    numread: usize,
    /// Context Stack
    ctx_stack: Vec<GdsContext>,
}
impl GdsParser<Mmap> {
    /// Create a [GdsParser] for the file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<Self> {
        Self::new(GdsReader::open(fname)?)
    }
}
impl<'b> GdsParser<&'b [u8]> {
    /// Create a [GdsParser] over in-memory `bytes`
    pub fn from_bytes(bytes: &'b [u8]) -> GdsResult<Self> {
        Self::new(GdsReader::new(bytes))
    }
}
impl<B: AsRef<[u8]>> GdsParser<B> {
    /// Create a new [GdsParser], decoding the first record to initialize our peeker
    pub fn new(mut rdr: GdsReader<B>) -> GdsResult<Self> {
        let nxt = rdr.read_record()?;
        Ok(Self {
            rdr,
            nxt,
            numread: 1,
            ctx_stack: Vec::new(),
        })
    }
    /// Advance our iterator and return the next record
    fn next(&mut self) -> GdsResult<GdsRecord> {
        if self.nxt == GdsRecord::EndLib {
            // Once we reach [EndLib], keep returning it forever
            return Ok(GdsRecord::EndLib);
        }
        let mut rv = match self.rdr.read_record() {
            Ok(r) => r,
            Err(GdsError::Unsupported(rtype, _)) => {
                return Err(GdsError::Unsupported(rtype, self.ctx_stack.clone()))
            }
            Err(e) => return Err(e),
        };
        mem::swap(&mut rv, &mut self.nxt);
        self.numread += 1;
        Ok(rv)
    }
    /// Peek at our next record, without advancing
    fn peek(&self) -> &GdsRecord {
        &self.nxt
    }
    /// Parse a [GdsLibrary]. The start-state when reading a GDSII stream.
    pub fn parse_lib(&mut self) -> GdsResult<GdsLibrary> {
        self.ctx_stack.push(GdsContext::Library);
        let mut lib = GdsLibraryBuilder::default();
        let mut structs = Vec::<GdsStruct>::new();
        lib = match self.next()? {
            GdsRecord::Header { version } => lib.version(version),
            r => return self.invalid(r),
        };
        lib = match self.next()? {
            GdsRecord::BgnLib { dates } => lib.dates(GdsDateTimes::decode(&dates)),
            r => return self.invalid(r),
        };
        lib = match self.next()? {
            GdsRecord::LibName(name) => lib.name(name),
            r => return self.invalid(r),
        };
        lib = match self.next()? {
            GdsRecord::Units(d0, d1) => lib.units(GdsUnits(d0, d1)),
            r => return self.invalid(r),
        };
        loop {
            match self.next()? {
                GdsRecord::EndLib => break,
                GdsRecord::BgnStruct { dates } => structs.push(self.parse_struct(&dates)?),
                r => return self.invalid(r),
            };
        }
        debug!(
            "Parsed GDSII library with {} structs from {} records",
            structs.len(),
            self.numread
        );
        lib = lib.structs(structs);
        let lib = lib.build();
        let lib = self.built(lib)?;
        self.ctx_stack.pop();
        Ok(lib)
    }
    /// Parse a [GdsStruct]. Starts after its `BGNSTR` record.
    fn parse_struct(&mut self, dates: &[i16; 12]) -> GdsResult<GdsStruct> {
        self.ctx_stack.push(GdsContext::Struct);
        let mut strukt = GdsStructBuilder::default().dates(GdsDateTimes::decode(dates));
        let name = match self.next()? {
            GdsRecord::StructName(name) => name,
            r => return self.invalid(r),
        };
        trace!("Parsing GDSII struct `{}`", name);
        strukt = strukt.name(name);
        let mut elems = Vec::<GdsElement>::new();
        loop {
            let elem: GdsElement = match self.next()? {
                GdsRecord::EndStruct => break,
                GdsRecord::Boundary => self.parse_boundary()?.into(),
                GdsRecord::Path => self.parse_path()?.into(),
                GdsRecord::Text => self.parse_text_elem()?.into(),
                GdsRecord::StructRef => self.parse_struct_ref()?.into(),
                GdsRecord::ArrayRef => self.parse_array_ref()?.into(),
                r => return self.invalid(r),
            };
            elems.push(elem);
        }
        strukt = strukt.elems(elems);
        let strukt = strukt.build();
        let strukt = self.built(strukt)?;
        self.ctx_stack.pop();
        Ok(strukt)
    }
    /// Parse one or more consecutive `XY` records, starting from the already-read `first`.
    /// Point-lists longer than one record's capacity span several records.
    fn parse_xy(&mut self, first: Vec<i32>) -> GdsResult<Vec<GdsPoint>> {
        let mut xy = GdsPoint::parse_vec(&first)?;
        while let GdsRecord::Xy(_) = self.peek() {
            if let GdsRecord::Xy(more) = self.next()? {
                xy.extend(GdsPoint::parse_vec(&more)?);
            }
        }
        Ok(xy)
    }
    /// Parse a [GdsBoundary]
    fn parse_boundary(&mut self) -> GdsResult<GdsBoundary> {
        self.ctx_stack.push(GdsContext::Boundary);
        let mut b = GdsBoundaryBuilder::default();
        loop {
            b = match self.next()? {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => b.layer(d),
                GdsRecord::DataType(d) => b.datatype(d),
                GdsRecord::Xy(d) => b.xy(self.parse_xy(d)?),
                r => return self.invalid(r),
            };
        }
        let b = b.build();
        let b = self.built(b)?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsPath]
    fn parse_path(&mut self) -> GdsResult<GdsPath> {
        self.ctx_stack.push(GdsContext::Path);
        let mut b = GdsPathBuilder::default();
        loop {
            b = match self.next()? {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => b.layer(d),
                GdsRecord::DataType(d) => b.datatype(d),
                GdsRecord::Xy(d) => b.xy(self.parse_xy(d)?),
                GdsRecord::Width(d) => b.width(d),
                GdsRecord::PathType(d) => b.path_type(d),
                GdsRecord::BeginExtn(d) => b.begin_extn(d),
                GdsRecord::EndExtn(d) => b.end_extn(d),
                r => return self.invalid(r),
            };
        }
        let b = b.build();
        let b = self.built(b)?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsTextElem]
    fn parse_text_elem(&mut self) -> GdsResult<GdsTextElem> {
        self.ctx_stack.push(GdsContext::Text);
        let mut b = GdsTextElemBuilder::default();
        loop {
            b = match self.next()? {
                GdsRecord::EndElement => break,
                GdsRecord::Layer(d) => b.layer(d),
                GdsRecord::TextType(d) => b.texttype(d),
                GdsRecord::Xy(d) => b.xy(GdsPoint::parse(&d)?),
                GdsRecord::String(d) => b.string(d),
                GdsRecord::Presentation(d0, d1) => b.presentation(GdsPresentation(d0, d1)),
                GdsRecord::Strans(d0, d1) => b.strans(Some(self.parse_strans(d0, d1)?)),
                r => return self.invalid(r),
            };
        }
        let b = b.build();
        let b = self.built(b)?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsStructRef]
    fn parse_struct_ref(&mut self) -> GdsResult<GdsStructRef> {
        self.ctx_stack.push(GdsContext::StructRef);
        let mut b = GdsStructRefBuilder::default();
        loop {
            b = match self.next()? {
                GdsRecord::EndElement => break,
                GdsRecord::StructRefName(d) => b.name(d),
                GdsRecord::Xy(d) => b.xy(GdsPoint::parse(&d)?),
                GdsRecord::Strans(d0, d1) => b.strans(self.parse_strans(d0, d1)?),
                r => return self.invalid(r),
            };
        }
        let b = b.build();
        let b = self.built(b)?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsArrayRef]
    fn parse_array_ref(&mut self) -> GdsResult<GdsArrayRef> {
        self.ctx_stack.push(GdsContext::ArrayRef);
        let mut b = GdsArrayRefBuilder::default();
        loop {
            b = match self.next()? {
                GdsRecord::EndElement => break,
                GdsRecord::StructRefName(d) => b.name(d),
                GdsRecord::ColRow { cols, rows } => b.cols(cols).rows(rows),
                GdsRecord::Xy(d) => {
                    // Exactly three corner points, or fail
                    let xy: [GdsPoint; 3] = match GdsPoint::parse_vec(&d)?.try_into() {
                        Ok(xy) => xy,
                        Err(_) => return self.fail("Array reference XY must have three points"),
                    };
                    b.xy(xy)
                }
                GdsRecord::Strans(d0, d1) => b.strans(Some(self.parse_strans(d0, d1)?)),
                r => return self.invalid(r),
            };
        }
        let b = b.build();
        let b = self.built(b)?;
        self.ctx_stack.pop();
        Ok(b)
    }
    /// Parse a [GdsStrans], from its flag bytes `d0`, `d1` and any immediately-following `MAG` and `ANGLE`
    fn parse_strans(&mut self, d0: u8, d1: u8) -> GdsResult<GdsStrans> {
        let mut s = GdsStrans {
            reflected: d0 & 0x80 != 0,
            abs_mag: d1 & 0x04 != 0,
            abs_angle: d1 & 0x02 != 0,
            ..Default::default()
        };
        loop {
            match *self.peek() {
                GdsRecord::Mag(d) => s.mag = Some(d),
                GdsRecord::Angle(d) => s.angle = Some(d),
                _ => break,
            }
            self.next()?;
        }
        Ok(s)
    }
    /// Convert a builder result, failing with our parse context for missing fields
    fn built<T>(&self, res: Result<T, String>) -> GdsResult<T> {
        res.or_else(|msg| self.fail(msg))
    }
    /// Error helper for an out-of-place record
    fn invalid<T>(&self, record: GdsRecord) -> GdsResult<T> {
        Err(GdsError::Parse {
            msg: "Invalid GDSII Record".into(),
            record,
            recordnum: self.numread,
            bytepos: self.rdr.pos(),
            ctx: self.ctx_stack.clone(),
        })
    }
    /// Error helper. Create a Parse error.
    fn err(&self, msg: impl Into<String>) -> GdsError {
        GdsError::Parse {
            msg: msg.into(),
            record: self.peek().clone(),
            recordnum: self.numread,
            bytepos: self.rdr.pos(),
            ctx: self.ctx_stack.clone(),
        }
    }
    /// Return failure
    fn fail<T>(&self, msg: impl Into<String>) -> GdsResult<T> {
        Err(self.err(msg))
    }
}
