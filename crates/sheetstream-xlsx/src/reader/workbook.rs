//! Workbook manifest and package relationships

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use sheetstream_core::Visibility;

use crate::error::XlsxResult;
use crate::reader::attr_value;

pub(crate) const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
pub(crate) const SHARED_STRINGS_REL: &str = "/sharedStrings";

/// A `<sheet>` entry of the workbook part, in declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestSheet {
    pub name: String,
    pub visibility: Visibility,
    /// Relationship id pointing at the sheet part
    pub rel_id: String,
}

/// One `<Relationship>` of a `.rels` part
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

impl Relationship {
    pub fn has_type(&self, suffix: &str) -> bool {
        self.rel_type.ends_with(suffix)
    }
}

/// Read workbook.xml to get sheet names, visibility and relationship ids
pub(crate) fn read_manifest<B: BufRead>(xml: B) -> XlsxResult<Vec<ManifestSheet>> {
    let mut xml_reader = Reader::from_reader(xml);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut sheets = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"sheet" => {
                let name = attr_value(&e, b"name")?;
                let rel_id = attr_value(&e, b"id")?;
                let visibility = attr_value(&e, b"state")?
                    .map(|s| Visibility::from_xlsx(&s))
                    .unwrap_or_default();

                match (name, rel_id) {
                    (Some(name), Some(rel_id)) => sheets.push(ManifestSheet {
                        name,
                        visibility,
                        rel_id,
                    }),
                    (name, _) => log::warn!("ignoring incomplete <sheet> entry {name:?}"),
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

/// Read a `.rels` part. External targets are left out.
pub(crate) fn read_relationships<B: BufRead>(xml: B) -> XlsxResult<Vec<Relationship>> {
    let mut xml_reader = Reader::from_reader(xml);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf)? {
            Event::Empty(e) | Event::Start(e) if e.local_name().as_ref() == b"Relationship" => {
                let external = attr_value(&e, b"TargetMode")?.as_deref() == Some("External");
                let id = attr_value(&e, b"Id")?;
                let rel_type = attr_value(&e, b"Type")?;
                let target = attr_value(&e, b"Target")?;

                if let (false, Some(id), Some(rel_type), Some(target)) =
                    (external, id, rel_type, target)
                {
                    rels.push(Relationship {
                        id,
                        rel_type,
                        target,
                    });
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Name of the relationships part belonging to `part`
/// (`xl/workbook.xml` → `xl/_rels/workbook.xml.rels`).
pub(crate) fn relationships_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolve a relationship target against the part that owns the
/// relationship. Absolute targets start at the package root.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    let (base, target) = match target.strip_prefix('/') {
        Some(absolute) => ("", absolute),
        None => (
            source_part.rsplit_once('/').map_or("", |(dir, _)| dir),
            target,
        ),
    };

    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
