//!
//! # GDSII Stream Data Model
//!
//! Records, elements, structs and libraries, stored on GDSII's own terms:
//! integer database-unit coordinates, `i16` layer numbers, raw bit-field flags.
//!

// Std-Lib
use std::io::Write;
use std::path::Path;

// Crates.io
use chrono::{Datelike, NaiveDate, NaiveDateTime, SubsecRound, Timelike, Utc};
use derive_builder::Builder;
use derive_more::{Add, AddAssign, Sub, SubAssign};
use num_derive::FromPrimitive;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// Workspace
use gdsrutils::SerdeFile;

// Local
use crate::read::GdsParser;
use crate::write::GdsWriter;

/// Maximum number of points in a single `XY` record.
/// Longer point-lists are split across consecutive records.
pub const MAX_XY_POINTS: usize = 8190;

///
/// # Gds Record Types
///
/// In the numeric order of the GDSII stream format, for automatic [FromPrimitive] conversions.
///
#[derive(FromPrimitive, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsRecordType {
    Header = 0x00,
    BgnLib,
    LibName,
    Units,
    EndLib,
    BgnStruct,
    StructName, // STRNAME
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer,
    DataType,
    Width,
    Xy,
    EndElement,
    StructRefName, // SNAME
    ColRow,
    TextNode,
    Node,
    TextType,
    Presentation,
    Spacing,
    String,
    Strans,
    Mag,
    Angle,
    Uinteger,
    Ustring,
    RefLibs,
    Fonts,
    PathType,
    Generations,
    AttrTable,
    StypTable,
    StrType,
    ElemFlags,
    ElemKey,
    LinkType,
    LinkKeys,
    Nodetype,
    PropAttr,
    PropValue,
    Box,
    BoxType,
    Plex,
    BeginExtn,
    EndExtn,
    TapeNum,
    TapeCode,
    StrClass,
    Reserved,
    Format,
    Mask,
    EndMasks,
    LibDirSize,
    SrfName,
    LibSecur,
}
impl GdsRecordType {
    /// Boolean indication of valid record types.
    /// Deprecated, discontinued, and never-released record types are invalid.
    pub fn valid(&self) -> bool {
        !matches!(
            self,
            Self::TextNode
                | Self::Spacing
                | Self::Uinteger
                | Self::Ustring
                | Self::StypTable
                | Self::StrType
                | Self::ElemKey
                | Self::LinkType
                | Self::LinkKeys
                | Self::StrClass
                | Self::Reserved
        )
    }
    /// Boolean indication of whether this crate decodes the record type.
    /// Valid but unsupported records (nodes, boxes, properties, and library metadata)
    /// fail decoding with [GdsError::Unsupported].
    pub fn supported(&self) -> bool {
        use GdsRecordType::*;
        matches!(
            self,
            Header
                | BgnLib
                | LibName
                | Units
                | EndLib
                | BgnStruct
                | StructName
                | EndStruct
                | Boundary
                | Path
                | StructRef
                | ArrayRef
                | Text
                | Layer
                | DataType
                | Width
                | Xy
                | EndElement
                | StructRefName
                | ColRow
                | TextType
                | Presentation
                | String
                | Strans
                | Mag
                | Angle
                | PathType
                | BeginExtn
                | EndExtn
        )
    }
}

/// # Gds DataType Enumeration
/// In order as decoded from the fourth byte of each record header
#[derive(FromPrimitive, Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub enum GdsDataType {
    NoData = 0,
    BitArray = 1,
    I16 = 2,
    I32 = 3,
    F32 = 4,
    F64 = 5,
    Str = 6,
}

/// # Gds Record Header
/// Decoded contents of a record's four header bytes.
/// Length `len` excludes the header bytes themselves.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsRecordHeader {
    pub rtype: GdsRecordType,
    pub dtype: GdsDataType,
    pub len: u16,
}

///
/// # Gds Record Enumeration
///
/// Each supported record in relatively raw form,
/// other than checking data-types and converting one-entry arrays into scalars.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GdsRecord {
    Header { version: i16 },
    BgnLib { dates: [i16; 12] },
    LibName(String),
    Units(f64, f64),
    EndLib,
    BgnStruct { dates: [i16; 12] },
    StructName(String),    // STRNAME
    StructRefName(String), // SNAME
    EndStruct,
    Boundary,
    Path,
    StructRef,
    ArrayRef,
    Text,
    Layer(i16),
    DataType(i16),
    Width(i32),
    Xy(Vec<i32>),
    EndElement,
    ColRow { cols: i16, rows: i16 },
    TextType(i16),
    Presentation(u8, u8),
    String(String),
    Strans(u8, u8),
    Mag(f64),
    Angle(f64),
    PathType(i16),
    BeginExtn(i32),
    EndExtn(i32),
}

/// # Gds Floating Point
///
/// GDSII predates IEEE754, and stores its eight-byte reals in an excess-64, base-16 format:
/// one sign bit, a seven-bit exponent of sixteen, and a 56-bit mantissa in the range [1/16, 1).
///
/// [GdsFloat64] is a namespace for conversions between that format (held in a `u64`) and `f64`.
///
pub struct GdsFloat64;
impl GdsFloat64 {
    /// Decode GDSII's eight-byte representation, stored as a `u64`, to `f64`
    pub fn decode(val: u64) -> f64 {
        let neg = (val & 0x8000_0000_0000_0000) != 0;
        let exp: i32 = ((val & 0x7F00_0000_0000_0000) >> 56) as i32 - 64;
        let mantissa = (val & 0x00FF_FFFF_FFFF_FFFF) as f64 / 2f64.powi(56);
        let mag = mantissa * 16f64.powi(exp);
        if neg {
            -mag
        } else {
            mag
        }
    }
    /// Encode `f64` to GDSII's eight bytes, stored as `u64`
    pub fn encode(val: f64) -> u64 {
        if val == 0.0 {
            return 0;
        }
        let (sign, val) = if val < 0.0 { (0x80u8, -val) } else { (0, val) };
        let fexp = 0.25 * val.log2();
        let mut exponent = fexp.ceil() as i32;
        if fexp == fexp.ceil() {
            exponent += 1;
        }
        let mantissa = (val * 16_f64.powi(14 - exponent)).round() as u64;
        let top = sign + (64 + exponent) as u8;
        ((top as u64) << 56) | (mantissa & 0x00FF_FFFF_FFFF_FFFF)
    }
}

/// # Gds Translation Settings
/// Reflection, rotation, and magnification for text-elements and references.
/// As configured by `STRANS`, `MAG`, and `ANGLE` records.
#[derive(Default, Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsStrans {
    /// Reflection about the x-axis. Applied before rotation.
    #[serde(default, skip_serializing_if = "is_false")]
    pub reflected: bool,
    /// Absolute Magnification Setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_mag: bool,
    /// Absolute Angle Setting
    #[serde(default, skip_serializing_if = "is_false")]
    pub abs_angle: bool,
    /// Magnification Factor. Unit-scaling if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mag: Option<f64>,
    /// Angle, in degrees counter-clockwise. Zero if not specified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f64>,
}

/// # Gds Text-Presentation Flags
///
/// Two raw bytes. The second holds the font (bits 4-5),
/// vertical justification (bits 2-3), and horizontal justification (bits 0-1).
#[derive(Default, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsPresentation(pub u8, pub u8);
impl GdsPresentation {
    /// Vertical justification code: 0 = top, 1 = middle, 2 = bottom
    pub fn vertical(&self) -> u8 {
        (self.1 >> 2) & 0x03
    }
    /// Horizontal justification code: 0 = left, 1 = center, 2 = right
    pub fn horizontal(&self) -> u8 {
        self.1 & 0x03
    }
    /// Font number, 0-3
    pub fn font(&self) -> u8 {
        (self.1 >> 4) & 0x03
    }
}

/// # Gds Library Units
///
/// Each GDSII library carries two numbers in its `UNITS` record:
/// the size of a database-unit in user-units, and the size of a database-unit in meters.
/// Every coordinate in the library is an integer count of database-units.
///
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub struct GdsUnits(pub f64, pub f64);
impl GdsUnits {
    /// Create a new [GdsUnits]
    pub fn new(num1: f64, num2: f64) -> Self {
        Self(num1, num2)
    }
    /// Get the database-unit size, in meters. Used for all spatial data.
    pub fn db_unit(&self) -> f64 {
        self.1
    }
    /// Get the user-unit size, in meters
    pub fn user_unit(&self) -> f64 {
        self.1 / self.0
    }
}
impl Default for GdsUnits {
    /// Database-unit of 1nm, user-unit of 1µm
    fn default() -> Self {
        Self(1e-3, 1e-9)
    }
}

/// # Gds Spatial Point
/// Coordinate in (x,y) layout-space, in database-units.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsPoint {
    pub x: i32,
    pub y: i32,
}
impl GdsPoint {
    /// Create a new [GdsPoint]
    pub fn new(x: i32, y: i32) -> Self {
        GdsPoint { x, y }
    }
    /// Create a vector of [GdsPoint] from an array of tuples
    pub fn vec(pts: &[(i32, i32)]) -> Vec<Self> {
        pts.iter().map(|pt| Self::new(pt.0, pt.1)).collect()
    }
    /// Convert from a two-element slice
    pub(crate) fn parse(from: &[i32]) -> GdsResult<Self> {
        match from {
            [x, y] => Ok(Self::new(*x, *y)),
            _ => Err(GdsError::Str(format!(
                "Invalid single-point XY with {} values",
                from.len()
            ))),
        }
    }
    /// Convert a 2n-element slice of `i32` into n [GdsPoint]s
    pub(crate) fn parse_vec(from: &[i32]) -> GdsResult<Vec<GdsPoint>> {
        if from.len() % 2 != 0 {
            return Err(GdsError::Str(format!(
                "Invalid XY with odd number of values {}",
                from.len()
            )));
        }
        Ok(from.chunks_exact(2).map(|c| Self::new(c[0], c[1])).collect())
    }
    /// Flatten a slice of [GdsPoint]s to a 2n-element `i32` vector
    pub(crate) fn flatten_vec(src: &[GdsPoint]) -> Vec<i32> {
        src.iter().flat_map(|p| [p.x, p.y]).collect()
    }
}

///
/// # Gds Path Element
///
/// ```text
/// PATH LAYER DATATYPE [PATHTYPE] [WIDTH] [BGNEXTN] [ENDEXTN] XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsPath {
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Centerline coordinates
    pub xy: Vec<GdsPoint>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub path_type: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub begin_extn: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub end_extn: Option<i32>,
}

///
/// # Gds Boundary Element
///
/// A closed polygon. GDSII requires the final point to repeat the first,
/// so an N-sided polygon has an (N+1)-point `xy` vector.
///
/// ```text
/// BOUNDARY LAYER DATATYPE XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsBoundary {
    /// Layer Number
    pub layer: i16,
    /// DataType ID
    pub datatype: i16,
    /// Vertex coordinates, closed
    pub xy: Vec<GdsPoint>,
}

///
/// # Gds Struct Reference (Cell Instance)
///
/// ```text
/// SREF SNAME [STRANS [MAG] [ANGLE]] XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsStructRef {
    /// Struct (Cell) Name
    pub name: String,
    /// Location
    pub xy: GdsPoint,
    /// Reflection, magnification, and rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub strans: Option<GdsStrans>,
}

///
/// # Gds Array Reference
///
/// A two-dimensional array of struct instances.
/// The three `xy` points are the array origin,
/// the origin displaced by `cols` column-pitches,
/// and the origin displaced by `rows` row-pitches.
///
/// ```text
/// AREF SNAME [STRANS [MAG] [ANGLE]] COLROW XY
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsArrayRef {
    /// Struct (Cell) Name
    pub name: String,
    /// Corner coordinates
    pub xy: [GdsPoint; 3],
    /// Number of columns
    pub cols: i16,
    /// Number of rows
    pub rows: i16,
    /// Reflection, magnification, and rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub strans: Option<GdsStrans>,
}

///
/// # Gds Text Element
///
/// ```text
/// TEXT LAYER TEXTTYPE [PRESENTATION] [STRANS [MAG] [ANGLE]] XY STRING
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsTextElem {
    /// Text Value
    pub string: String,
    /// Layer Number
    pub layer: i16,
    /// Text-Type ID
    pub texttype: i16,
    /// Anchor location
    pub xy: GdsPoint,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default, setter(strip_option))]
    pub presentation: Option<GdsPresentation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub strans: Option<GdsStrans>,
}

///
/// # Gds Element Enumeration
///
/// The polygons, paths, texts, and instances which comprise a [GdsStruct].
///
#[derive(derive_more::From, Debug, Clone, Deserialize, Serialize, JsonSchema, PartialEq)]
pub enum GdsElement {
    GdsBoundary(GdsBoundary),
    GdsPath(GdsPath),
    GdsStructRef(GdsStructRef),
    GdsArrayRef(GdsArrayRef),
    GdsTextElem(GdsTextElem),
}

/// # Gds Summary Stats
/// Counts of structs and of elements by type.
#[derive(
    Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq, Add, AddAssign, Sub, SubAssign,
)]
pub struct GdsStats {
    pub libraries: usize,
    pub structs: usize,
    pub boundaries: usize,
    pub paths: usize,
    pub struct_refs: usize,
    pub array_refs: usize,
    pub text_elems: usize,
}

/// # Gds Date & Time
///
/// Six two-byte fields: year, month, day, hour, minute, second.
/// Years are stored relative to 1900.
///
/// Values read from a stream are kept as-is, without checking that they form a real date.
/// Conversion to [NaiveDateTime] performs that check.
///
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsDateTime {
    pub year: i16,
    pub month: i16,
    pub day: i16,
    pub hour: i16,
    pub minute: i16,
    pub second: i16,
}
impl GdsDateTime {
    /// The current UTC time, rounded to whole seconds as GDSII stores it
    pub fn now() -> Self {
        Utc::now().naive_utc().round_subsecs(0).into()
    }
    /// Encode as six `i16`s, in stream order
    pub fn encode(&self) -> [i16; 6] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        ]
    }
}
impl Default for GdsDateTime {
    fn default() -> Self {
        Self::now()
    }
}
impl From<NaiveDateTime> for GdsDateTime {
    fn from(dt: NaiveDateTime) -> Self {
        Self {
            year: (dt.year() - 1900) as i16,
            month: dt.month() as i16,
            day: dt.day() as i16,
            hour: dt.hour() as i16,
            minute: dt.minute() as i16,
            second: dt.second() as i16,
        }
    }
}
impl From<&[i16; 6]> for GdsDateTime {
    fn from(d: &[i16; 6]) -> Self {
        Self {
            year: d[0],
            month: d[1],
            day: d[2],
            hour: d[3],
            minute: d[4],
            second: d[5],
        }
    }
}
impl GdsDateTime {
    /// Convert to a [NaiveDateTime].
    /// Fails for values which do not form a real date, e.g. month 30 or hour 99.
    pub fn to_naive(&self) -> GdsResult<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32 + 1900, self.month as u32, self.day as u32)
            .and_then(|ymd| ymd.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or_else(|| GdsError::Str(format!("Invalid GDSII date-time {:?}", self)))
    }
}

/// # Gds Modification & Access Dates & Times
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
pub struct GdsDateTimes {
    /// Last Modification Date & Time
    pub modified: GdsDateTime,
    /// Last Access Date & Time
    pub accessed: GdsDateTime,
}
impl GdsDateTimes {
    /// Both modification and access set to `time`
    pub fn at(time: impl Into<GdsDateTime>) -> Self {
        let time = time.into();
        Self {
            modified: time.clone(),
            accessed: time,
        }
    }
    /// Encode in the twelve-`i16` form of `BGNLIB` and `BGNSTR` records
    pub fn encode(&self) -> [i16; 12] {
        let mut rv = [0; 12];
        rv[..6].copy_from_slice(&self.modified.encode());
        rv[6..].copy_from_slice(&self.accessed.encode());
        rv
    }
    /// Decode from the twelve-`i16` record form
    pub fn decode(d: &[i16; 12]) -> Self {
        let mut modified = [0; 6];
        let mut accessed = [0; 6];
        modified.copy_from_slice(&d[..6]);
        accessed.copy_from_slice(&d[6..]);
        Self {
            modified: (&modified).into(),
            accessed: (&accessed).into(),
        }
    }
}
impl Default for GdsDateTimes {
    /// Both dates set by a single call to [GdsDateTime::now], so they match
    fn default() -> Self {
        Self::at(GdsDateTime::now())
    }
}

///
/// # Gds Struct (Cell) Definition
///
/// GDSII's hierarchical unit: a named list of [GdsElement]s.
///
/// ```text
/// BGNSTR STRNAME {<element>}* ENDSTR
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsStruct {
    /// Struct Name
    pub name: String,
    /// Modification & Access Dates & Times
    pub dates: GdsDateTimes,
    /// Elements List
    pub elems: Vec<GdsElement>,
}
impl GdsStruct {
    /// Create a new and empty [GdsStruct]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
    /// Count and return our element statistics
    pub fn stats(&self) -> GdsStats {
        let mut stats = GdsStats {
            structs: 1,
            ..Default::default()
        };
        for elem in &self.elems {
            match elem {
                GdsElement::GdsBoundary(_) => stats.boundaries += 1,
                GdsElement::GdsPath(_) => stats.paths += 1,
                GdsElement::GdsStructRef(_) => stats.struct_refs += 1,
                GdsElement::GdsArrayRef(_) => stats.array_refs += 1,
                GdsElement::GdsTextElem(_) => stats.text_elems += 1,
            };
        }
        stats
    }
}

///
/// # Gds Library
///
/// The root of a GDSII tree, generally one-to-one with a `.gds` file.
/// Primarily a list of [GdsStruct]s, plus the library name, units, version, and dates.
///
/// ```text
/// HEADER BGNLIB LIBNAME UNITS {<structure>}* ENDLIB
/// ```
///
#[derive(Default, Clone, Builder, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[builder(pattern = "owned", setter(into))]
pub struct GdsLibrary {
    /// Library Name
    pub name: String,
    /// Stream Format Version
    pub version: i16,
    /// Modification & Access Dates & Times
    pub dates: GdsDateTimes,
    /// Spatial Units
    pub units: GdsUnits,
    /// Struct Definitions
    pub structs: Vec<GdsStruct>,
}
impl GdsLibrary {
    /// Create a new and empty [GdsLibrary]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: 600,
            ..Default::default()
        }
    }
    /// Read a [GdsLibrary] from the file at path `fname`
    pub fn open(fname: impl AsRef<Path>) -> GdsResult<GdsLibrary> {
        GdsParser::open(fname)?.parse_lib()
    }
    /// Read a [GdsLibrary] from `bytes`
    pub fn from_bytes(bytes: &[u8]) -> GdsResult<GdsLibrary> {
        GdsParser::from_bytes(bytes)?.parse_lib()
    }
    /// Collect and return the library's aggregate statistics
    pub fn stats(&self) -> GdsStats {
        let mut stats = GdsStats {
            libraries: 1,
            ..Default::default()
        };
        for strukt in self.structs.iter() {
            stats += strukt.stats();
        }
        stats
    }
    /// Save to file `fname`
    pub fn save(&self, fname: impl AsRef<Path>) -> GdsResult<()> {
        GdsWriter::open(fname)?.write_lib(self)
    }
    /// Write to `file`
    pub fn write(&self, file: impl Write) -> GdsResult<()> {
        GdsWriter::new(file).write_lib(self)
    }
    /// Encode to a vector of bytes
    pub fn to_bytes(&self) -> GdsResult<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
    /// Set the library's and all its structs' modification and access times
    pub fn set_all_dates(&mut self, time: impl Into<GdsDateTime>) {
        let dates = GdsDateTimes::at(time);
        for strukt in self.structs.iter_mut() {
            strukt.dates = dates.clone();
        }
        self.dates = dates;
    }
}
impl SerdeFile for GdsLibrary {}
impl SerdeFile for GdsStruct {}

/// # Gds Context
/// Each context in which a record can be parsed, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GdsContext {
    Library,
    Struct,
    StructRef,
    ArrayRef,
    Boundary,
    Path,
    Text,
}

/// # GdsResult Type-Alias
pub type GdsResult<T> = Result<T, GdsError>;

/// # Gds Error Enumeration
/// Mostly decoding failures. A valid in-memory [GdsLibrary] generally encodes,
/// other than for records too long to fit the format.
#[derive(Debug)]
pub enum GdsError {
    /// Invalid binary-to-record conversion
    RecordDecode(GdsRecordType, GdsDataType, u16),
    /// Invalid record length
    RecordLen(usize),
    /// Invalid data type
    InvalidDataType(u8),
    /// Invalid record type
    InvalidRecordType(u8),
    /// Valid but unsupported record, and the context in which it was found
    Unsupported(GdsRecordType, Vec<GdsContext>),
    /// Parser Errors
    Parse {
        msg: String,
        record: GdsRecord,
        recordnum: usize,
        bytepos: u64,
        ctx: Vec<GdsContext>,
    },
    /// Boxed (External) Errors
    Boxed(Box<dyn std::error::Error + Send + Sync>),
    /// Other errors
    Str(String),
}
impl std::fmt::Display for GdsError {
    /// Delegate [std::fmt::Display] to the (derived) [std::fmt::Debug] implementation.
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
impl std::error::Error for GdsError {}
impl From<std::io::Error> for GdsError {
    fn from(e: std::io::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<std::str::Utf8Error> for GdsError {
    fn from(e: std::str::Utf8Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}
impl From<String> for GdsError {
    fn from(e: String) -> Self {
        GdsError::Str(e)
    }
}
impl From<&str> for GdsError {
    fn from(e: &str) -> Self {
        GdsError::Str(e.to_string())
    }
}
impl From<gdsrutils::ser::Error> for GdsError {
    fn from(e: gdsrutils::ser::Error) -> Self {
        Self::Boxed(Box::new(e))
    }
}

/// For `#[serde(skip_serializing_if)]` on default-`false` flags
fn is_false(b: &bool) -> bool {
    !b
}

/// Check `lib` matches across a write-read round-trip through a temporary file
#[cfg(any(test, feature = "selftest"))]
pub fn roundtrip(lib: &GdsLibrary) -> GdsResult<()> {
    use std::io::{Read, Seek, SeekFrom};

    let mut file = tempfile::tempfile()?;
    lib.write(&mut file)?;

    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    let lib2 = GdsLibrary::from_bytes(&bytes)?;

    assert_eq!(*lib, lib2);
    Ok(())
}
