//! Item records: the seven-field line handed to the external caller

use crate::entry::AtomEntry;

/// Attachment type assumed when an attachment has no `mimeType` row.
///
/// Seen on bare URL attachments.
pub const LINK_ATTACHMENT: &str = "html/text";

/// Columns in a record line
pub const RECORD_FIELDS: usize = 7;

/// Real MIME type of web-page attachments
const HTML_MIME: &str = "text/html";

/// Why an entry could not be turned into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Document had no `<entry>` element
    NoEntry,
    /// Document was not well-formed XML
    Malformed(String),
    MissingItemType,
    MissingTitle,
    MissingKey,
    KeyMismatch { expected: String, found: String },
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoEntry => write!(f, "No entry found in document."),
            Self::Malformed(e) => write!(f, "Malformed entry document: {e}"),
            Self::MissingItemType => write!(f, "No itemtype found for entry."),
            Self::MissingTitle => write!(f, "No title found for entry."),
            Self::MissingKey => write!(f, "No key found for entry."),
            Self::KeyMismatch { expected, found } => {
                write!(f, "Entry key {found} does not match requested key {expected}.")
            }
        }
    }
}

impl std::error::Error for ExtractError {}

/// One synchronized item
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub item_type: String,
    pub key: String,
    pub title: String,
    pub creator_summary: String,
    /// Only for attachments and notes
    pub parent_key: String,
    /// Only for attachments
    pub attachment_type: String,
    /// Only for web pages and HTML attachments
    pub url: String,
    /// Captured, not written to the record line
    pub updated: Option<String>,
}

impl ItemRecord {
    /// Build a record from a parsed entry.
    ///
    /// `requested_key` is the key the entry was fetched for; `item_base` is
    /// the item URL prefix stripped from the parent link.
    pub fn from_entry(
        entry: &AtomEntry,
        requested_key: &str,
        item_base: &str,
    ) -> Result<Self, ExtractError> {
        let item_type = entry
            .item_type
            .clone()
            .ok_or(ExtractError::MissingItemType)?;
        let title = entry.title.clone().ok_or(ExtractError::MissingTitle)?;
        let key = entry.key.clone().ok_or(ExtractError::MissingKey)?;
        if key != requested_key {
            return Err(ExtractError::KeyMismatch {
                expected: requested_key.to_string(),
                found: key,
            });
        }

        let mut record = Self {
            creator_summary: entry.creator_summary.clone().unwrap_or_default(),
            updated: entry.updated.clone(),
            item_type,
            key,
            title,
            ..Default::default()
        };

        if record.is_child() {
            record.parent_key = entry
                .link("up")
                .map(|href| strip_item_base(href, item_base))
                .unwrap_or_default();
        }

        if record.item_type == "attachment" {
            record.attachment_type = entry
                .table_cell("mimeType")
                .unwrap_or(LINK_ATTACHMENT)
                .to_string();
        }

        if record.has_url() {
            record.url = entry.table_cell("url").unwrap_or_default().to_string();
        }

        Ok(record)
    }

    /// Attachments and notes hang under a parent item
    pub fn is_child(&self) -> bool {
        matches!(self.item_type.as_str(), "attachment" | "note")
    }

    fn has_url(&self) -> bool {
        self.item_type == "webpage"
            || matches!(self.attachment_type.as_str(), LINK_ATTACHMENT | HTML_MIME)
    }

    /// Tab-delimited line without trailing newline:
    /// TYPE, ID, TITLE, CREATOR SUMMARY, PARENT ID, ATTACHMENT TYPE, URL
    pub fn to_line(&self) -> String {
        [
            &self.item_type,
            &self.key,
            &self.title,
            &self.creator_summary,
            &self.parent_key,
            &self.attachment_type,
            &self.url,
        ]
        .iter()
        .map(|field| sanitize(field))
        .collect::<Vec<_>>()
        .join("\t")
    }
}

/// Keep one field on one line and inside its column.
fn sanitize(field: &str) -> String {
    field.replace(['\t', '\r', '\n'], " ")
}

/// `https://api.zotero.org/users/1/items/PARENT?x=y` → `PARENT`
fn strip_item_base(href: &str, item_base: &str) -> String {
    let rest = href
        .strip_prefix(item_base)
        .unwrap_or_else(|| href.rsplit('/').next().unwrap_or(href));
    rest.split(['?', '#']).next().unwrap_or(rest).to_string()
}
