//! XLSX reader

mod sheet;
mod strings;
mod workbook;

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek};
use std::path::Path;

use quick_xml::events::BytesStart;
use sheetstream_core::{ReadSession, ReadSummary, RowConsumer, SharedStrings, SheetDescriptor};
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use workbook::{
    read_manifest, read_relationships, relationships_part, resolve_target, Relationship,
    OFFICE_DOCUMENT_REL, SHARED_STRINGS_REL,
};

pub use sheet::read_sheet_rows;
pub use strings::read_shared_strings;
pub use workbook::ManifestSheet;

const PACKAGE_RELS: &str = "_rels/.rels";
const DEFAULT_WORKBOOK: &str = "xl/workbook.xml";
const DEFAULT_SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Value of the attribute with the given local name; malformed
/// attributes are errors.
pub(crate) fn attr_value(e: &BytesStart<'_>, local_name: &[u8]) -> XlsxResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        if attr.key.local_name().as_ref() == local_name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Parse a part with `parse`, `None` when the package doesn't contain it
fn read_part<R, T, F>(archive: &mut ZipArchive<R>, name: &str, parse: F) -> XlsxResult<Option<T>>
where
    R: Read + Seek,
    F: FnOnce(&mut dyn BufRead) -> XlsxResult<T>,
{
    if archive.index_for_name(name).is_none() {
        return Ok(None);
    }
    let file = archive.by_name(name)?;
    let mut reader = BufReader::new(file);
    parse(&mut reader).map(Some)
}

/// XLSX package reader.
///
/// Opening the package reads the workbook manifest and the shared strings;
/// worksheet parts are only parsed by [`XlsxReader::read_rows`].
pub struct XlsxReader<R> {
    archive: ZipArchive<R>,
    workbook_part: String,
    sheets: Vec<ManifestSheet>,
    relationships: Vec<Relationship>,
    shared_strings: SharedStrings,
}

impl XlsxReader<BufReader<File>> {
    /// Open an XLSX file from a filesystem path
    pub fn open_file<P: AsRef<Path>>(path: P) -> XlsxResult<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> XlsxReader<R> {
    /// Open an XLSX package from any `Read + Seek` source
    pub fn new(reader: R) -> XlsxResult<Self> {
        let mut archive = ZipArchive::new(reader)?;

        let workbook_part = Self::locate_workbook(&mut archive)?;
        log::debug!("workbook part: {workbook_part}");

        let sheets = match read_part(&mut archive, &workbook_part, |xml| read_manifest(xml))? {
            Some(sheets) => sheets,
            None => return Err(XlsxError::MissingPart(workbook_part)),
        };

        let rels_part = relationships_part(&workbook_part);
        let relationships =
            match read_part(&mut archive, &rels_part, |xml| read_relationships(xml))? {
                Some(rels) => rels,
                None => return Err(XlsxError::MissingPart(rels_part)),
            };

        let strings_part = relationships
            .iter()
            .find(|rel| rel.has_type(SHARED_STRINGS_REL))
            .map(|rel| resolve_target(&workbook_part, &rel.target))
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS.to_string());
        let shared_strings =
            read_part(&mut archive, &strings_part, |xml| read_shared_strings(xml))?
                .unwrap_or_default();

        Ok(Self {
            archive,
            workbook_part,
            sheets,
            relationships,
            shared_strings,
        })
    }

    /// Find the workbook part through the package relationships
    fn locate_workbook(archive: &mut ZipArchive<R>) -> XlsxResult<String> {
        let rels =
            read_part(archive, PACKAGE_RELS, |xml| read_relationships(xml))?.unwrap_or_default();
        Ok(rels
            .iter()
            .find(|rel| rel.has_type(OFFICE_DOCUMENT_REL))
            .map(|rel| resolve_target("", &rel.target))
            .unwrap_or_else(|| DEFAULT_WORKBOOK.to_string()))
    }

    /// Sheets in workbook order, hidden ones included
    pub fn sheets(&self) -> &[ManifestSheet] {
        &self.sheets
    }

    /// The shared strings table of the package
    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Stream every row of every readable sheet to `consumer`.
    pub fn read_rows<C>(&mut self, consumer: &mut C) -> XlsxResult<ReadSummary>
    where
        C: RowConsumer + ?Sized,
    {
        let mut session = ReadSession::new();

        for (index, entry) in self.sheets.iter().enumerate() {
            let descriptor = SheetDescriptor::new(entry.name.clone(), index, entry.visibility);
            if !session.begin_sheet(&descriptor, consumer) {
                continue;
            }

            let part = self
                .relationships
                .iter()
                .find(|rel| rel.id == entry.rel_id)
                .map(|rel| resolve_target(&self.workbook_part, &rel.target))
                .ok_or_else(|| {
                    XlsxError::MissingPart(format!(
                        "relationship {} for sheet '{}'",
                        entry.rel_id, entry.name
                    ))
                })?;
            log::debug!("sheet {index} '{}' started ({part})", entry.name);

            let strings = &self.shared_strings;
            read_part(&mut self.archive, &part, |xml| {
                read_sheet_rows(xml, strings, &mut session, &mut *consumer)
            })?
            .ok_or_else(|| XlsxError::MissingPart(part.clone()))?;
            session.end_sheet();

            if session.is_aborted() {
                break;
            }
        }

        Ok(session.summary())
    }

    /// Give back the underlying source
    pub fn into_inner(self) -> R {
        self.archive.into_inner()
    }
}
