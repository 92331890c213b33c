//!
//! # GDSII Import & Export
//!
//! Conversion between [Library] and the stream-level [gdsrstream::GdsLibrary].
//!

// Std-Lib
use std::collections::{HashMap, HashSet};

// Crates.io
use log::{debug, warn};

// Workspace
use gdsrstream as gds;
use gdsrutils::{DepOrder, DepOrderer, ErrorContext, ErrorHelper, Ptr, Unwrapper};

// Local imports
use crate::cell::Cell;
use crate::config::GdsOptions;
use crate::element::Element;
use crate::error::{LayoutError, LayoutResult};
use crate::grid::Grid;
use crate::library::Library;
use crate::path::{Path, PathType};
use crate::point::Point;
use crate::polygon::Polygon;
use crate::reference::{Instance, Reference};
use crate::text::{HorizontalPresentation, Text, VerticalPresentation};

///
/// # Cell Dependency Ordering
///
/// Orders [Cell]s so that each follows every cell it places,
/// failing with [LayoutError::Cycle] on any cell which (indirectly) places itself.
///
pub struct CellOrder;
impl DepOrder for CellOrder {
    type Item = Ptr<Cell>;
    type Error = LayoutError;

    fn process(item: &Ptr<Cell>, orderer: &mut DepOrderer<Self>) -> LayoutResult<()> {
        let deps = item.read_or_recover().dependencies();
        for dep in deps.iter() {
            orderer.push(dep)?;
        }
        Ok(())
    }
    fn fail(item: &Ptr<Cell>) -> LayoutError {
        LayoutError::Cycle(item.read_or_recover().name().to_string())
    }
}

///
/// # GDSII Exporter
///
/// Converts a [Library] into a [gds::GdsLibrary].
///
/// Cells are written in library order, followed by any cells they reference
/// which are not library members, in depth-first discovery order.
///
#[derive(Debug)]
pub struct GdsExporter<'opt> {
    options: &'opt GdsOptions,
    /// Database-units per user-unit
    scale: f64,
    ctx_stack: Vec<ErrorContext>,
}
impl<'opt> GdsExporter<'opt> {
    /// Export `lib` per `options`
    pub fn export(lib: &Library, options: &'opt GdsOptions) -> LayoutResult<gds::GdsLibrary> {
        let mut me = Self {
            options,
            scale: options.scale(),
            ctx_stack: vec![ErrorContext::Library(lib.name.clone())],
        };
        me.export_lib(lib)
    }
    fn export_lib(&mut self, lib: &Library) -> LayoutResult<gds::GdsLibrary> {
        self.ctx_stack.push(ErrorContext::Units);
        let units = self.export_units()?;
        self.ctx_stack.pop();

        let cells = self.discover(lib);
        CellOrder::order(&cells)?;

        let mut gdslib = gds::GdsLibrary::new(&lib.name);
        gdslib.units = units;
        if let Some(dates) = self.options.dates {
            gdslib.dates = gds::GdsDateTimes::at(dates);
        }
        let mut names = HashSet::new();
        for ptr in cells.iter() {
            let cell = ptr.read_or_recover();
            if !names.insert(cell.name().to_string()) {
                warn!("Skipping duplicate cell name `{}` in library `{}`", cell.name(), lib.name);
                continue;
            }
            let mut strukt = self.export_cell(&cell)?;
            strukt.dates = gdslib.dates.clone();
            gdslib.structs.push(strukt);
        }
        debug!("Exported {} struct(s) from library `{}`", gdslib.structs.len(), lib.name);
        Ok(gdslib)
    }
    /// Check and convert our units
    fn export_units(&self) -> LayoutResult<gds::GdsUnits> {
        let user = self.options.user_unit;
        let db = self.options.database_unit;
        self.assert(
            user.is_finite() && db.is_finite() && user > 0. && db > 0.,
            format!("Invalid units: user {:e}, database {:e}", user, db),
        )?;
        Ok(gds::GdsUnits::new(db / user, db))
    }
    /// Library members, then referenced non-members, depth-first
    fn discover(&self, lib: &Library) -> Vec<Ptr<Cell>> {
        let mut seen: HashSet<Ptr<Cell>> = lib.cells().cloned().collect();
        let mut rv: Vec<Ptr<Cell>> = lib.cells().cloned().collect();
        let mut stack: Vec<Ptr<Cell>> = rv.iter().rev().cloned().collect();
        while let Some(ptr) = stack.pop() {
            let deps = ptr.read_or_recover().dependencies();
            for dep in deps.into_iter().rev() {
                if seen.insert(dep.clone()) {
                    rv.push(dep.clone());
                    stack.push(dep);
                }
            }
        }
        rv
    }
    /// Convert a [Cell] to a [gds::GdsStruct]
    fn export_cell(&mut self, cell: &Cell) -> LayoutResult<gds::GdsStruct> {
        self.ctx_stack.push(ErrorContext::Cell(cell.name().to_string()));
        let mut strukt = gds::GdsStruct::new(cell.name());
        for elem in cell.elements().iter() {
            strukt.elems.extend(self.export_element(elem)?);
        }
        self.ctx_stack.pop();
        Ok(strukt)
    }
    /// Convert an [Element] into zero or more [gds::GdsElement]s.
    /// Only references to non-cell instances produce other than one.
    fn export_element(&mut self, elem: &Element) -> LayoutResult<Vec<gds::GdsElement>> {
        Ok(match elem {
            Element::Polygon(x) => vec![self.export_polygon(x)?.into()],
            Element::Path(x) => vec![self.export_path(x)?.into()],
            Element::Text(x) => vec![self.export_text(x)?.into()],
            Element::Reference(x) => self.export_reference(x)?,
        })
    }
    fn export_polygon(&mut self, poly: &Polygon) -> LayoutResult<gds::GdsBoundary> {
        self.ctx_stack.push(ErrorContext::Polygon);
        let mut xy = self.export_points(poly.points())?;
        if xy.first() != xy.last() {
            if let Some(first) = xy.first().copied() {
                xy.push(first);
            }
        }
        let rv = gds::GdsBoundary {
            layer: i16::from(poly.layer()),
            datatype: self.export_data_type(poly.data_type()),
            xy,
        };
        self.ctx_stack.pop();
        Ok(rv)
    }
    fn export_path(&mut self, path: &Path) -> LayoutResult<gds::GdsPath> {
        self.ctx_stack.push(ErrorContext::Path);
        let (begin_extn, end_extn) = match path.path_type() {
            Some(PathType::Extended) => (
                path.begin_extension().map(|v| self.export_length(v)).transpose()?,
                path.end_extension().map(|v| self.export_length(v)).transpose()?,
            ),
            _ => (None, None),
        };
        let width = path.width().map(|w| self.export_length(w)).transpose()?;
        let rv = gds::GdsPath {
            layer: i16::from(path.layer()),
            datatype: self.export_data_type(path.data_type()),
            xy: self.export_points(path.points())?,
            width,
            path_type: path.path_type().map(|p| p.code()),
            begin_extn,
            end_extn,
        };
        self.ctx_stack.pop();
        Ok(rv)
    }
    fn export_text(&mut self, text: &Text) -> LayoutResult<gds::GdsTextElem> {
        self.ctx_stack.push(ErrorContext::Text);
        let rv = gds::GdsTextElem {
            string: text.text().to_string(),
            layer: i16::from(text.layer()),
            texttype: 0,
            xy: self.export_point(text.origin())?,
            presentation: Some(gds::GdsPresentation(0, text.presentation_code())),
            strans: export_strans(text.magnification(), text.angle(), text.x_reflection()),
        };
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Convert a [Reference].
    /// Cell instances become a single SREF or AREF.
    /// Other instances are expanded one level, and their results exported in turn.
    fn export_reference(&mut self, r: &Reference) -> LayoutResult<Vec<gds::GdsElement>> {
        let ptr = match &r.instance {
            Instance::Cell(ptr) => ptr,
            Instance::Element(_) | Instance::Reference(_) => {
                let mut rv = Vec::new();
                for elem in r.flatten(Some(1))?.iter() {
                    rv.extend(self.export_element(elem)?);
                }
                return Ok(rv);
            }
        };
        let name = ptr.read_or_recover().name().to_string();
        let grid = &r.grid;
        self.ctx_stack.push(ErrorContext::Reference(name.clone()));
        self.assert(
            grid.columns >= 1 && grid.rows >= 1,
            format!("Invalid grid dimensions {}x{}", grid.columns, grid.rows),
        )?;
        self.ctx_stack.pop();
        let strans = export_strans(grid.magnification, grid.angle, grid.x_reflection);
        if grid.is_single() {
            self.ctx_stack.push(ErrorContext::Reference(name.clone()));
            let rv = gds::GdsStructRef {
                name,
                xy: self.export_point(grid.origin)?,
                strans,
            };
            self.ctx_stack.pop();
            return Ok(vec![rv.into()]);
        }
        self.ctx_stack.push(ErrorContext::Array(name.clone()));
        let cols = i16::try_from(grid.columns)
            .unwrapper(&*self, format!("Too many columns: {}", grid.columns))?;
        let rows =
            i16::try_from(grid.rows).unwrapper(&*self, format!("Too many rows: {}", grid.rows))?;
        let col_corner = grid.origin + grid.transform(grid.spacing_x * grid.columns as f64);
        let row_corner = grid.origin + grid.transform(grid.spacing_y * grid.rows as f64);
        let rv = gds::GdsArrayRef {
            name,
            xy: [
                self.export_point(grid.origin)?,
                self.export_point(col_corner)?,
                self.export_point(row_corner)?,
            ],
            cols,
            rows,
            strans,
        };
        self.ctx_stack.pop();
        Ok(vec![rv.into()])
    }
    fn export_points(&self, pts: &[Point]) -> LayoutResult<Vec<gds::GdsPoint>> {
        pts.iter().map(|p| self.export_point(*p)).collect()
    }
    fn export_point(&self, pt: Point) -> LayoutResult<gds::GdsPoint> {
        Ok(gds::GdsPoint::new(
            self.export_length(pt.x)?,
            self.export_length(pt.y)?,
        ))
    }
    /// Scale a user-unit distance to integer database units
    fn export_length(&self, val: f64) -> LayoutResult<i32> {
        let scaled = (val * self.scale).round();
        self.assert(
            scaled.is_finite() && scaled >= i32::MIN as f64 && scaled <= i32::MAX as f64,
            format!("Coordinate {} out of range at scale {}", val, self.scale),
        )?;
        Ok(scaled as i32)
    }
    /// Data types occupy the full sixteen bits of DATATYPE, stored as its `i16` bit-pattern
    fn export_data_type(&self, data_type: u16) -> i16 {
        data_type as i16
    }
}
impl ErrorHelper for GdsExporter<'_> {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Export {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        }
    }
}

/// Transformation settings, or `None` if all are defaults
fn export_strans(magnification: f64, angle: f64, reflected: bool) -> Option<gds::GdsStrans> {
    if magnification == 1. && angle == 0. && !reflected {
        return None;
    }
    Some(gds::GdsStrans {
        reflected,
        mag: if magnification != 1. { Some(magnification) } else { None },
        angle: if angle != 0. { Some(angle) } else { None },
        ..Default::default()
    })
}

/// Recover a data type from the bit-pattern of its `i16` DATATYPE
fn import_data_type(datatype: i16) -> i32 {
    i32::from(datatype as u16)
}

///
/// # GDSII Importer
///
/// Converts a [gds::GdsLibrary] into a [Library].
///
/// Structs are first created as empty cells, so that references can be
/// resolved by name regardless of definition order.
/// References to undefined names are collected, and reported together
/// as a single [LayoutError::DanglingReferences].
///
#[derive(Debug)]
pub struct GdsImporter {
    /// User-units per database-unit
    factor: f64,
    /// Number of decimal places in `factor`, if it is an exact power of ten
    decimals: Option<i32>,
    cells: HashMap<String, Ptr<Cell>>,
    dangling: Vec<String>,
    ctx_stack: Vec<ErrorContext>,
}
impl GdsImporter {
    /// Import `gdslib`, converting coordinates to user-units of `options.user_unit`
    pub fn import(gdslib: &gds::GdsLibrary, options: &GdsOptions) -> LayoutResult<Library> {
        let mut me = Self {
            factor: 1.,
            decimals: None,
            cells: HashMap::new(),
            dangling: Vec::new(),
            ctx_stack: vec![ErrorContext::Library(gdslib.name.clone())],
        };
        me.import_lib(gdslib, options)
    }
    fn import_lib(
        &mut self,
        gdslib: &gds::GdsLibrary,
        options: &GdsOptions,
    ) -> LayoutResult<Library> {
        self.import_units(&gdslib.units, options)?;

        // First pass: create every cell, checking for duplicate names
        let mut ptrs = Vec::with_capacity(gdslib.structs.len());
        for strukt in gdslib.structs.iter() {
            if self.cells.contains_key(&strukt.name) {
                return self.fail(format!("Duplicate struct name `{}`", strukt.name));
            }
            let ptr = Ptr::new(Cell::new(&strukt.name));
            self.cells.insert(strukt.name.clone(), ptr.clone());
            ptrs.push(ptr);
        }
        // Second pass: fill in their contents
        for (strukt, ptr) in gdslib.structs.iter().zip(ptrs.iter()) {
            let cell = self.import_cell(strukt)?;
            *ptr.write_or_recover() = cell;
        }
        if !self.dangling.is_empty() {
            return Err(LayoutError::DanglingReferences(self.dangling.clone()));
        }
        CellOrder::order(&ptrs)?;

        let mut lib = Library::new(&gdslib.name);
        for ptr in ptrs.into_iter() {
            lib.add(ptr, false)?;
        }
        debug!("Imported {} cell(s) into library `{}`", lib.len(), lib.name);
        Ok(lib)
    }
    /// Set our scaling from the library's units and the requested user-unit
    fn import_units(&mut self, units: &gds::GdsUnits, options: &GdsOptions) -> LayoutResult<()> {
        self.ctx_stack.push(ErrorContext::Units);
        let db = units.db_unit();
        let user = options.user_unit;
        self.assert(
            db.is_finite() && user.is_finite() && db > 0. && user > 0.,
            format!("Invalid units: database {:e}, user {:e}", db, user),
        )?;
        self.factor = db / user;
        let decimals = (-self.factor.log10()).round();
        if (self.factor * 10f64.powf(decimals) - 1.).abs() < 1e-9 {
            self.decimals = Some(decimals as i32);
        }
        self.ctx_stack.pop();
        Ok(())
    }
    fn import_cell(&mut self, strukt: &gds::GdsStruct) -> LayoutResult<Cell> {
        self.ctx_stack.push(ErrorContext::Cell(strukt.name.clone()));
        let mut cell = Cell::new(&strukt.name);
        for elem in strukt.elems.iter() {
            use gds::GdsElement::*;
            match elem {
                GdsBoundary(x) => {
                    cell.add(self.import_boundary(x)?);
                }
                GdsPath(x) => {
                    cell.add(self.import_path(x)?);
                }
                GdsTextElem(x) => {
                    cell.add(self.import_text(x)?);
                }
                GdsStructRef(x) => {
                    if let Some(r) = self.import_struct_ref(x)? {
                        cell.add(r);
                    }
                }
                GdsArrayRef(x) => {
                    if let Some(r) = self.import_array_ref(x)? {
                        cell.add(r);
                    }
                }
            }
        }
        self.ctx_stack.pop();
        Ok(cell)
    }
    fn import_boundary(&mut self, x: &gds::GdsBoundary) -> LayoutResult<Polygon> {
        self.ctx_stack.push(ErrorContext::Polygon);
        let pts = self.import_points(&x.xy);
        let rv = self.check(Polygon::new(pts, x.layer.into(), import_data_type(x.datatype)))?;
        self.ctx_stack.pop();
        Ok(rv)
    }
    fn import_path(&mut self, x: &gds::GdsPath) -> LayoutResult<Path> {
        self.ctx_stack.push(ErrorContext::Path);
        let path_type = match x.path_type {
            Some(code) => Some(self.check(PathType::from_code(code))?),
            None => None,
        };
        let width = x.width.map(|w| self.import_length(w).abs());
        let pts = self.import_points(&x.xy);
        let mut rv = self.check(Path::new(
            pts,
            x.layer.into(),
            import_data_type(x.datatype),
            path_type,
            width,
        ))?;
        if path_type == Some(PathType::Extended) {
            rv = rv.with_extensions(
                x.begin_extn.map(|v| self.import_length(v)),
                x.end_extn.map(|v| self.import_length(v)),
            );
        }
        self.ctx_stack.pop();
        Ok(rv)
    }
    fn import_text(&mut self, x: &gds::GdsTextElem) -> LayoutResult<Text> {
        self.ctx_stack.push(ErrorContext::Text);
        let (vertical, horizontal) = match &x.presentation {
            Some(p) => (
                self.check(VerticalPresentation::from_code(p.vertical()))?,
                self.check(HorizontalPresentation::from_code(p.horizontal()))?,
            ),
            None => Default::default(),
        };
        let (magnification, angle, reflected) = self.import_strans(&x.strans)?;
        let origin = self.import_point(&x.xy);
        let rv = self
            .check(Text::new(&x.string, origin, x.layer.into()))?
            .with_transform(magnification, angle, reflected)
            .with_presentation(vertical, horizontal);
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Import an SREF. Returns `None`, and records the name, if its target is undefined.
    fn import_struct_ref(&mut self, x: &gds::GdsStructRef) -> LayoutResult<Option<Reference>> {
        self.ctx_stack.push(ErrorContext::Reference(x.name.clone()));
        let (magnification, angle, x_reflection) = self.import_strans(&x.strans)?;
        let rv = self.lookup(&x.name).map(|ptr| {
            Reference::new(ptr).with_grid(Grid {
                origin: self.import_point(&x.xy),
                magnification,
                angle,
                x_reflection,
                ..Default::default()
            })
        });
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Import an AREF, recovering the grid spacing from its corners.
    /// Returns `None`, and records the name, if its target is undefined.
    fn import_array_ref(&mut self, x: &gds::GdsArrayRef) -> LayoutResult<Option<Reference>> {
        self.ctx_stack.push(ErrorContext::Array(x.name.clone()));
        self.assert(
            x.cols > 0 && x.rows > 0,
            format!("Invalid array dimensions {}x{}", x.cols, x.rows),
        )?;
        let (magnification, angle, x_reflection) = self.import_strans(&x.strans)?;
        let mut grid = Grid {
            origin: self.import_point(&x.xy[0]),
            columns: x.cols as usize,
            rows: x.rows as usize,
            magnification,
            angle,
            x_reflection,
            ..Default::default()
        };
        let col_extent = grid
            .inverse_transform(self.import_point(&x.xy[1]) - grid.origin)
            .unwrapper(&*self, "Array with zero magnification")?;
        let row_extent = grid
            .inverse_transform(self.import_point(&x.xy[2]) - grid.origin)
            .unwrapper(&*self, "Array with zero magnification")?;
        grid.spacing_x = col_extent.checked_div(f64::from(x.cols))?;
        grid.spacing_y = row_extent.checked_div(f64::from(x.rows))?;
        let rv = self
            .lookup(&x.name)
            .map(|ptr| Reference::new(ptr).with_grid(grid));
        self.ctx_stack.pop();
        Ok(rv)
    }
    /// Find the cell named `name`, recording it as dangling if there is none
    fn lookup(&mut self, name: &str) -> Option<Ptr<Cell>> {
        match self.cells.get(name) {
            Some(ptr) => Some(ptr.clone()),
            None => {
                if !self.dangling.iter().any(|n| n == name) {
                    self.dangling.push(name.to_string());
                }
                None
            }
        }
    }
    /// Magnification, angle, and reflection from optional transformation settings
    fn import_strans(&self, strans: &Option<gds::GdsStrans>) -> LayoutResult<(f64, f64, bool)> {
        match strans {
            None => Ok((1., 0., false)),
            Some(s) => {
                self.assert(
                    !s.abs_mag && !s.abs_angle,
                    "Unsupported absolute magnification or angle",
                )?;
                let magnification = s.mag.unwrap_or(1.);
                self.assert(magnification != 0., "Invalid zero magnification")?;
                Ok((magnification, s.angle.unwrap_or(0.), s.reflected))
            }
        }
    }
    fn import_points(&self, pts: &[gds::GdsPoint]) -> Vec<Point> {
        pts.iter().map(|p| self.import_point(p)).collect()
    }
    fn import_point(&self, pt: &gds::GdsPoint) -> Point {
        Point::new(self.import_length(pt.x), self.import_length(pt.y))
    }
    /// Scale a database-unit integer to user units.
    /// Divides by exact powers of ten where possible, so that e.g. 1234 nm imports as exactly 1.234 µm.
    fn import_length(&self, val: i32) -> f64 {
        match self.decimals {
            Some(d) if d >= 0 => val as f64 / 10f64.powi(d),
            Some(d) => val as f64 * 10f64.powi(-d),
            None => val as f64 * self.factor,
        }
    }
    /// Convert a [LayoutError::Validation] failure into an import error, with our context
    fn check<T>(&self, result: LayoutResult<T>) -> LayoutResult<T> {
        result.map_err(|e| match e {
            LayoutError::Validation(msg) => self.err(msg),
            other => other,
        })
    }
}
impl ErrorHelper for GdsImporter {
    type Error = LayoutError;
    fn err(&self, msg: impl Into<String>) -> LayoutError {
        LayoutError::Import {
            message: msg.into(),
            stack: self.ctx_stack.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new([(0., 0.), (1., 0.), (1., 1.), (0., 1.)], 1, 2).unwrap()
    }

    #[test]
    fn exports_units_and_boundaries() -> LayoutResult<()> {
        let mut lib = Library::new("lib");
        let mut cell = Cell::new("top");
        cell.add(square());
        lib += cell;
        let gdslib = GdsExporter::export(&lib, &GdsOptions::default())?;
        assert_eq!(gdslib.units.db_unit(), 1e-9);
        assert_eq!(gdslib.structs.len(), 1);
        match &gdslib.structs[0].elems[0] {
            gds::GdsElement::GdsBoundary(b) => {
                assert_eq!(b.layer, 1);
                assert_eq!(b.datatype, 2);
                assert_eq!(b.xy.len(), 5);
                assert_eq!(b.xy[2], gds::GdsPoint::new(1000, 1000));
                assert_eq!(b.xy[0], b.xy[4]);
            }
            other => panic!("Expected a boundary, got {:?}", other),
        }
        Ok(())
    }
    #[test]
    fn exports_non_member_cells() -> LayoutResult<()> {
        let leaf = Ptr::new(Cell::new("leaf"));
        let mut mid = Cell::new("mid");
        mid.add(Reference::new(&leaf));
        let mut top = Cell::new("top");
        top.add(Reference::new(mid));
        let mut lib = Library::new("lib");
        lib += top;
        let gdslib = GdsExporter::export(&lib, &GdsOptions::default())?;
        let names: Vec<&str> = gdslib.structs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["top", "mid", "leaf"]);
        Ok(())
    }
    #[test]
    fn exports_element_instances_inline() -> LayoutResult<()> {
        let mut cell = Cell::new("top");
        cell.add(Reference::new(square()).with_grid(Grid {
            columns: 3,
            spacing_x: Point::new(2., 0.),
            ..Default::default()
        }));
        let mut lib = Library::new("lib");
        lib += cell;
        let gdslib = GdsExporter::export(&lib, &GdsOptions::default())?;
        assert_eq!(gdslib.structs[0].stats().boundaries, 3);
        Ok(())
    }
    #[test]
    fn export_fails_on_cycles_and_range() {
        let a = Ptr::new(Cell::new("a"));
        a.write_or_recover().add(Reference::new(&a));
        let mut lib = Library::new("lib");
        lib += a;
        let result = GdsExporter::export(&lib, &GdsOptions::default());
        assert!(matches!(result, Err(LayoutError::Cycle(_))));

        let mut far = Cell::new("far");
        far.add(Polygon::new([(0., 0.), (1e9, 0.), (0., 1.)], 0, 0).unwrap());
        let mut lib = Library::new("lib");
        lib += far;
        let result = GdsExporter::export(&lib, &GdsOptions::default());
        assert!(matches!(result, Err(LayoutError::Export { .. })));
    }
    #[test]
    fn wide_data_types() -> LayoutResult<()> {
        let mut cell = Cell::new("c");
        cell.add(Polygon::new([(0., 0.), (1., 0.), (0., 1.)], 0, 40000)?);
        cell.add(Path::new([(0., 0.), (1., 0.)], 0, 65535, None, Some(0.5))?);
        let mut lib = Library::new("lib");
        lib += cell;
        let gdslib = GdsExporter::export(&lib, &GdsOptions::default())?;
        match &gdslib.structs[0].elems[0] {
            gds::GdsElement::GdsBoundary(b) => assert_eq!(b.datatype, 40000u16 as i16),
            other => panic!("Expected a boundary, got {:?}", other),
        }
        let lib2 = GdsImporter::import(&gdslib, &GdsOptions::default())?;
        assert_eq!(lib2, lib);
        let c = lib2.get("c").unwrap();
        assert_eq!(c.read_or_recover().polygons()[0].data_type(), 40000);
        assert_eq!(c.read_or_recover().paths()[0].data_type(), 65535);
        Ok(())
    }
    #[test]
    fn export_rejects_empty_grids() {
        let unit = Ptr::new(Cell::new("unit"));
        let mut top = Cell::new("top");
        top.add(Reference::new(&unit).with_grid(Grid {
            columns: 0,
            rows: 2,
            ..Default::default()
        }));
        let mut lib = Library::new("lib");
        lib += top;
        match GdsExporter::export(&lib, &GdsOptions::default()) {
            Err(LayoutError::Export { stack, .. }) => {
                assert_eq!(stack.last(), Some(&ErrorContext::Reference("unit".into())));
            }
            other => panic!("Expected an export error, got {:?}", other),
        }
    }
    #[test]
    fn strans_defaults() {
        assert!(export_strans(1., 0., false).is_none());
        let strans = export_strans(2., 0., true).unwrap();
        assert!(strans.reflected);
        assert_eq!(strans.mag, Some(2.));
        assert_eq!(strans.angle, None);
    }
    #[test]
    fn imports_array_spacing() -> LayoutResult<()> {
        let mut gdslib = gds::GdsLibrary::new("lib");
        gdslib.structs.push(gds::GdsStruct::new("unit"));
        let mut top = gds::GdsStruct::new("top");
        top.elems.push(
            gds::GdsArrayRef {
                name: "unit".into(),
                xy: [
                    gds::GdsPoint::new(0, 0),
                    gds::GdsPoint::new(0, 3000),
                    gds::GdsPoint::new(-4000, 0),
                ],
                cols: 3,
                rows: 2,
                strans: Some(gds::GdsStrans {
                    angle: Some(90.),
                    ..Default::default()
                }),
            }
            .into(),
        );
        gdslib.structs.push(top);
        let lib = GdsImporter::import(&gdslib, &GdsOptions::default())?;
        let top = lib.get("top").unwrap();
        let top = top.read_or_recover();
        let grid = &top.references()[0].grid;
        assert_eq!((grid.columns, grid.rows), (3, 2));
        assert!(grid.spacing_x.is_close(&Point::new(1., 0.)));
        assert!(grid.spacing_y.is_close(&Point::new(0., 2.)));
        assert_eq!(grid.angle, 90.);
        Ok(())
    }
    #[test]
    fn import_failures() {
        let mut gdslib = gds::GdsLibrary::new("lib");
        gdslib.structs.push(gds::GdsStruct::new("a"));
        gdslib.structs.push(gds::GdsStruct::new("a"));
        let result = GdsImporter::import(&gdslib, &GdsOptions::default());
        assert!(matches!(result, Err(LayoutError::Import { .. })));

        let mut gdslib = gds::GdsLibrary::new("lib");
        let mut a = gds::GdsStruct::new("a");
        a.elems.push(
            gds::GdsStructRef {
                name: "a".into(),
                ..Default::default()
            }
            .into(),
        );
        gdslib.structs.push(a);
        let result = GdsImporter::import(&gdslib, &GdsOptions::default());
        assert!(matches!(result, Err(LayoutError::Cycle(_))));

        let mut gdslib = gds::GdsLibrary::new("lib");
        let mut a = gds::GdsStruct::new("a");
        a.elems.push(
            gds::GdsBoundary {
                layer: 300,
                datatype: 0,
                xy: gds::GdsPoint::vec(&[(0, 0), (1, 0), (0, 1), (0, 0)]),
            }
            .into(),
        );
        gdslib.structs.push(a);
        let result = GdsImporter::import(&gdslib, &GdsOptions::default());
        match result {
            Err(LayoutError::Import { stack, .. }) => {
                assert_eq!(stack.last(), Some(&ErrorContext::Polygon));
            }
            other => panic!("Expected an import error, got {:?}", other),
        }
    }
}
