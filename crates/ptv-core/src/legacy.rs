use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::document::ConfigDocument;
use crate::error::{PtvError, Result};

/// Manifest that identifies a legacy parameter directory.
pub const LEGACY_MANIFEST: &str = "ptv.par";

const SEQUENCE_PAR: &str = "sequence.par";
const TRACK_PAR: &str = "track.par";

enum FieldKind {
    Int,
    Float,
}

struct FieldSpec {
    name: &'static str,
    kind: FieldKind,
}

/// Fixed-order numeric tail of `ptv.par`, after the camera count and the
/// per-camera image/calibration path pairs. Schema drift is a change here,
/// not in the parse loop.
const PTV_PAR_TAIL: &[FieldSpec] = &[
    FieldSpec { name: "hp_flag", kind: FieldKind::Int },
    FieldSpec { name: "allcam_flag", kind: FieldKind::Int },
    FieldSpec { name: "tiff_flag", kind: FieldKind::Int },
    FieldSpec { name: "imx", kind: FieldKind::Int },
    FieldSpec { name: "imy", kind: FieldKind::Int },
    FieldSpec { name: "pix_x", kind: FieldKind::Float },
    FieldSpec { name: "pix_y", kind: FieldKind::Float },
    FieldSpec { name: "chfield", kind: FieldKind::Int },
    FieldSpec { name: "mmp_n1", kind: FieldKind::Float },
    FieldSpec { name: "mmp_n2", kind: FieldKind::Float },
    FieldSpec { name: "mmp_n3", kind: FieldKind::Float },
    FieldSpec { name: "mmp_d", kind: FieldKind::Float },
];

/// Fixed-order numeric body of `track.par`.
const TRACK_PAR_FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "dvxmin", kind: FieldKind::Float },
    FieldSpec { name: "dvxmax", kind: FieldKind::Float },
    FieldSpec { name: "dvymin", kind: FieldKind::Float },
    FieldSpec { name: "dvymax", kind: FieldKind::Float },
    FieldSpec { name: "dvzmin", kind: FieldKind::Float },
    FieldSpec { name: "dvzmax", kind: FieldKind::Float },
    FieldSpec { name: "angle", kind: FieldKind::Float },
    FieldSpec { name: "dacc", kind: FieldKind::Float },
    FieldSpec { name: "add", kind: FieldKind::Int },
];

/// Line-by-line reader over a legacy file with field-level error reporting.
struct LineCursor<'a> {
    file: &'a str,
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    fn new(file: &'a str, text: &'a str) -> Self {
        Self {
            file,
            lines: text.lines().map(str::trim).collect(),
            pos: 0,
        }
    }

    fn err(&self, detail: String) -> PtvError {
        PtvError::LegacyParse {
            file: self.file.to_string(),
            detail,
        }
    }

    fn line(&mut self, field: &str) -> Result<&'a str> {
        let line = self
            .lines
            .get(self.pos)
            .copied()
            .ok_or_else(|| self.err(format!("missing line {} ({field})", self.pos + 1)))?;
        self.pos += 1;
        Ok(line)
    }

    fn int(&mut self, field: &str) -> Result<i64> {
        let line = self.line(field)?;
        line.parse().map_err(|_| {
            self.err(format!(
                "field '{field}' (line {}): expected integer, got '{line}'",
                self.pos
            ))
        })
    }

    fn float(&mut self, field: &str) -> Result<f64> {
        let line = self.line(field)?;
        line.parse().map_err(|_| {
            self.err(format!(
                "field '{field}' (line {}): expected number, got '{line}'",
                self.pos
            ))
        })
    }

    fn field(&mut self, spec: &FieldSpec) -> Result<Value> {
        Ok(match spec.kind {
            FieldKind::Int => Value::from(self.int(spec.name)?),
            FieldKind::Float => Value::from(self.float(spec.name)?),
        })
    }
}

/// True when `dir` looks like a legacy parameter directory.
pub fn is_legacy_dir(dir: &Path) -> bool {
    dir.is_dir() && dir.join(LEGACY_MANIFEST).is_file()
}

/// Convert a legacy parameter directory into an equivalent [`ConfigDocument`].
///
/// `ptv.par` is mandatory and drives the camera count and the `ptv` block;
/// `sequence.par` and `track.par` are folded in when present. Conversion is
/// one-directional: nothing in the legacy directory is modified.
pub fn convert_dir(dir: &Path) -> Result<ConfigDocument> {
    let manifest = dir.join(LEGACY_MANIFEST);
    let text = fs::read_to_string(&manifest).map_err(|e| PtvError::LegacyParse {
        file: manifest.display().to_string(),
        detail: format!("cannot read: {e}"),
    })?;

    let mut cur = LineCursor::new(LEGACY_MANIFEST, &text);
    let num_cams = cur.int("num_cams")?;
    if num_cams < 1 {
        return Err(cur.err(format!("camera count must be positive, got {num_cams}")));
    }
    let num_cams = num_cams as usize;

    let mut img_name = Vec::with_capacity(num_cams);
    let mut img_cal = Vec::with_capacity(num_cams);
    for i in 1..=num_cams {
        img_name.push(cur.line(&format!("img_name[{i}]"))?.to_string());
        img_cal.push(cur.line(&format!("img_cal[{i}]"))?.to_string());
    }

    let mut ptv = Mapping::new();
    ptv.insert(Value::from("splitter"), Value::Bool(false));
    ptv.insert(
        Value::from("img_name"),
        Value::Sequence(img_name.iter().map(|s| Value::from(s.as_str())).collect()),
    );
    ptv.insert(
        Value::from("img_cal"),
        Value::Sequence(img_cal.iter().map(|s| Value::from(s.as_str())).collect()),
    );
    for spec in PTV_PAR_TAIL {
        let value = cur.field(spec)?;
        ptv.insert(Value::from(spec.name), value);
    }

    let mut doc = ConfigDocument::new();
    doc.set_camera_count(num_cams);
    doc.set_block("ptv", ptv);

    let sequence = match parse_sequence_par(dir, num_cams)? {
        Some(block) => block,
        None => {
            // No sidecar: seed base names from the manifest's image paths so
            // target derivation works right after conversion.
            let mut block = Mapping::new();
            block.insert(
                Value::from("base_name"),
                Value::Sequence(img_name.iter().map(|s| Value::from(s.as_str())).collect()),
            );
            block
        }
    };
    doc.set_block("sequence", sequence);
    doc.set_block("track", parse_track_par(dir)?.unwrap_or_default());

    debug!(dir = %dir.display(), num_cams, "Converted legacy parameter directory");
    Ok(doc)
}

fn parse_sequence_par(dir: &Path, num_cams: usize) -> Result<Option<Mapping>> {
    let path = dir.join(SEQUENCE_PAR);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| PtvError::LegacyParse {
        file: path.display().to_string(),
        detail: format!("cannot read: {e}"),
    })?;

    let mut cur = LineCursor::new(SEQUENCE_PAR, &text);
    let mut base_names = Vec::with_capacity(num_cams);
    for i in 1..=num_cams {
        base_names.push(Value::from(cur.line(&format!("base_name[{i}]"))?));
    }
    let first = cur.int("first")?;
    let last = cur.int("last")?;

    let mut block = Mapping::new();
    block.insert(Value::from("base_name"), Value::Sequence(base_names));
    block.insert(Value::from("first"), Value::from(first));
    block.insert(Value::from("last"), Value::from(last));
    Ok(Some(block))
}

fn parse_track_par(dir: &Path) -> Result<Option<Mapping>> {
    let path = dir.join(TRACK_PAR);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| PtvError::LegacyParse {
        file: path.display().to_string(),
        detail: format!("cannot read: {e}"),
    })?;

    let mut cur = LineCursor::new(TRACK_PAR, &text);
    let mut block = Mapping::new();
    for spec in TRACK_PAR_FIELDS {
        let value = cur.field(spec)?;
        block.insert(Value::from(spec.name), value);
    }
    Ok(Some(block))
}
