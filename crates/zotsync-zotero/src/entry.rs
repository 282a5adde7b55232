//! Zotero Atom entry parser using quick-xml
//!
//! Produces an [`AtomEntry`] with named accessors (links by `rel`, content
//! table cells by row `class`) instead of positional element lookups.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// `<link rel=".." href=".."/>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub rel: Option<String>,
    pub href: String,
}

/// One `<tr class="..">` row of the XHTML content table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub class: String,
    /// Text of the first `<td>`
    pub value: Option<String>,
}

/// Fields of a single Atom `<entry>`
#[derive(Debug, Default, Clone)]
pub struct AtomEntry {
    pub title: Option<String>,
    pub updated: Option<String>,
    /// `zapi:itemType`; `None` when missing or empty
    pub item_type: Option<String>,
    pub creator_summary: Option<String>,
    /// `zapi:key`
    pub key: Option<String>,
    pub links: Vec<Link>,
    pub rows: Vec<TableRow>,
}

impl AtomEntry {
    /// href of the first link with the given `rel`
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|l| l.rel.as_deref() == Some(rel))
            .map(|l| l.href.as_str())
    }

    /// Cell text of the content table row with the given class
    pub fn table_cell(&self, class: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.class == class)
            .and_then(|r| r.value.as_deref())
    }
}

/// Parse the first `<entry>` of an Atom document.
///
/// Returns `Ok(None)` when the document holds no entry.
pub fn parse_atom_entry(xml: &str) -> Result<Option<AtomEntry>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"entry" => {
                return parse_entry(&mut reader).map(Some);
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
        buf.clear();
    }
}

fn parse_entry(reader: &mut Reader<&[u8]>) -> Result<AtomEntry, quick_xml::Error> {
    let mut entry = AtomEntry::default();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"title" => entry.title = Some(read_text(reader)?),
                b"updated" => entry.updated = Some(read_text(reader)?),
                b"itemType" => {
                    entry.item_type = Some(read_text(reader)?).filter(|t| !t.is_empty())
                }
                b"creatorSummary" => entry.creator_summary = Some(read_text(reader)?),
                b"key" => entry.key = Some(read_text(reader)?),
                b"link" => {
                    if let Some(link) = parse_link(&e)? {
                        entry.links.push(link);
                    }
                }
                b"content" => entry.rows = parse_content(reader)?,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"link" => {
                    if let Some(link) = parse_link(&e)? {
                        entry.links.push(link);
                    }
                }
                b"title" => entry.title = Some(String::new()),
                _ => {}
            },
            Event::End(e) if e.local_name().as_ref() == b"entry" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(entry)
}

fn parse_link(e: &BytesStart<'_>) -> Result<Option<Link>, quick_xml::Error> {
    let rel = attr_value(e, b"rel")?;
    Ok(attr_value(e, b"href")?.map(|href| Link { rel, href }))
}

/// Collect every `<tr class>` row under `<content>`.
fn parse_content(reader: &mut Reader<&[u8]>) -> Result<Vec<TableRow>, quick_xml::Error> {
    let mut rows = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if e.local_name().as_ref() == b"tr" => {
                let class = attr_value(&e, b"class")?;
                let value = parse_row(reader)?;
                if let Some(class) = class {
                    rows.push(TableRow { class, value });
                }
            }
            Event::End(e) if e.local_name().as_ref() == b"content" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rows)
}

/// Returns the first `<td>` text of a row.
fn parse_row(reader: &mut Reader<&[u8]>) -> Result<Option<String>, quick_xml::Error> {
    let mut value = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                let text = read_text(reader)?;
                if e.local_name().as_ref() == b"td" && value.is_none() {
                    value = Some(text);
                }
            }
            Event::Empty(e) if e.local_name().as_ref() == b"td" && value.is_none() => {
                value = Some(String::new());
            }
            Event::End(e) if e.local_name().as_ref() == b"tr" => break,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(value)
}

fn attr_value(e: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, quick_xml::Error> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == name {
            return Ok(Some(attr.unescape_value()?.into_owned()));
        }
    }
    Ok(None)
}

/// Read element text up to its end tag, flattening nested markup.
///
/// Text fragments are trimmed by the reader, so fragments on either side of
/// an inline element are joined with one space.
fn read_text(reader: &mut Reader<&[u8]>) -> Result<String, quick_xml::Error> {
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Text(e) => push_fragment(&mut text, &e.unescape()?),
            Event::CData(e) => push_fragment(&mut text, &String::from_utf8_lossy(&e)),
            Event::End(_) => break,
            Event::Start(_) => {
                // Nested inline elements (<a>, <i>, ...)
                let inner = read_text(reader)?;
                push_fragment(&mut text, &inner);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(text)
}

fn push_fragment(text: &mut String, fragment: &str) {
    if fragment.is_empty() {
        return;
    }
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(fragment);
}
