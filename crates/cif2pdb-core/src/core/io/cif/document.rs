use super::lexer::{Token, TokenKind, tokenize};
use super::{CifError, CifSyntaxErrorKind};
use std::collections::HashMap;
use std::fmt;
use std::iter::Peekable;

/// A single CIF data value.
#[derive(Debug, Clone, PartialEq)]
pub enum CifValue {
    /// A bare, quoted, or text-field value.
    Text(String),
    /// The `?` placeholder: the value is unknown.
    Unknown,
    /// The `.` placeholder: the item does not apply to this row.
    Inapplicable,
}

impl CifValue {
    /// Returns the text of the value, or `None` for `?` and `.`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CifValue::Text(text) => Some(text),
            CifValue::Unknown | CifValue::Inapplicable => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.as_str().is_none()
    }
}

impl fmt::Display for CifValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CifValue::Text(text) => write!(f, "{}", text),
            CifValue::Unknown => write!(f, "?"),
            CifValue::Inapplicable => write!(f, "."),
        }
    }
}

/// All items of one category within a data block.
///
/// A `loop_` produces one row per packet; plain `_tag value` pairs of the
/// same category collapse into a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct CifTable {
    category: String,
    items: Vec<String>,
    rows: Vec<Vec<CifValue>>,
    looped: bool,
}

impl CifTable {
    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the column position of an item, matched case-insensitively.
    pub fn item_index(&self, item: &str) -> Option<usize> {
        self.items
            .iter()
            .position(|name| name.eq_ignore_ascii_case(item))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CifValue]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn value(&self, row: usize, item: &str) -> Option<&CifValue> {
        let column = self.item_index(item)?;
        self.rows.get(row)?.get(column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CifBlock {
    name: String,
    tables: Vec<CifTable>,
    index: HashMap<String, usize>,
}

impl CifBlock {
    fn new(name: String) -> Self {
        Self {
            name,
            tables: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tables(&self) -> &[CifTable] {
        &self.tables
    }

    /// Looks up a category table, with or without the leading underscore.
    pub fn table(&self, category: &str) -> Option<&CifTable> {
        let category = category.strip_prefix('_').unwrap_or(category);
        let idx = self.index.get(&category.to_ascii_lowercase())?;
        self.tables.get(*idx)
    }

    /// Looks up the first value of a full tag such as `_entry.id`.
    pub fn value(&self, tag: &str) -> Option<&CifValue> {
        let (category, item) = split_tag(&tag.to_ascii_lowercase());
        self.table(&category)?.value(0, &item)
    }

    fn insert_pair(&mut self, tag: &str, value: CifValue, line: usize) -> Result<(), CifError> {
        let (category, item) = split_tag(tag);
        match self.index.get(&category) {
            Some(&idx) => {
                let table = &mut self.tables[idx];
                if table.looped {
                    return Err(syntax_error(
                        line,
                        CifSyntaxErrorKind::DuplicateCategory(category),
                    ));
                }
                if table.item_index(&item).is_some() {
                    return Err(syntax_error(
                        line,
                        CifSyntaxErrorKind::DuplicateItem(tag.to_string()),
                    ));
                }
                table.items.push(item);
                table.rows[0].push(value);
            }
            None => {
                self.index.insert(category.clone(), self.tables.len());
                self.tables.push(CifTable {
                    category,
                    items: vec![item],
                    rows: vec![vec![value]],
                    looped: false,
                });
            }
        }
        Ok(())
    }

    fn insert_loop(&mut self, table: CifTable, line: usize) -> Result<(), CifError> {
        if self.index.contains_key(&table.category) {
            return Err(syntax_error(
                line,
                CifSyntaxErrorKind::DuplicateCategory(table.category),
            ));
        }
        self.index.insert(table.category.clone(), self.tables.len());
        self.tables.push(table);
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CifDocument {
    blocks: Vec<CifBlock>,
}

impl CifDocument {
    pub fn blocks(&self) -> &[CifBlock] {
        &self.blocks
    }
}

fn syntax_error(line: usize, kind: CifSyntaxErrorKind) -> CifError {
    CifError::Syntax { line, kind }
}

/// Splits a lower-cased tag into its category and item names.
///
/// Tags without a `.` (DDL1 style) form a category of their own with an empty item name.
fn split_tag(tag: &str) -> (String, String) {
    let bare = tag.strip_prefix('_').unwrap_or(tag);
    match bare.split_once('.') {
        Some((category, item)) => (category.to_string(), item.to_string()),
        None => (bare.to_string(), String::new()),
    }
}

/// Parses CIF text into data blocks and category tables.
///
/// # Errors
///
/// Returns [`CifError::Syntax`] with the offending line for malformed input.
pub fn parse(input: &str) -> Result<CifDocument, CifError> {
    let mut tokens = tokenize(input)?.into_iter().peekable();
    let mut document = CifDocument::default();

    while let Some(token) = tokens.next() {
        let line = token.line;
        match token.kind {
            TokenKind::DataBlock(name) => document.blocks.push(CifBlock::new(name)),
            TokenKind::Save(name) if !name.is_empty() => skip_save_frame(&mut tokens, name, line)?,
            TokenKind::Save(_) => {
                return Err(syntax_error(
                    line,
                    CifSyntaxErrorKind::Unsupported("save_".into()),
                ));
            }
            TokenKind::Global => {
                return Err(syntax_error(
                    line,
                    CifSyntaxErrorKind::Unsupported("global_".into()),
                ));
            }
            TokenKind::Stop => {
                return Err(syntax_error(
                    line,
                    CifSyntaxErrorKind::Unsupported("stop_".into()),
                ));
            }
            TokenKind::Loop => {
                let table = parse_loop(&mut tokens, line)?;
                let block = document.blocks.last_mut().ok_or_else(|| {
                    syntax_error(
                        line,
                        CifSyntaxErrorKind::OutsideDataBlock(format!("_{}", table.category)),
                    )
                })?;
                block.insert_loop(table, line)?;
            }
            TokenKind::Tag(tag) => {
                let value = match tokens.next() {
                    Some(Token {
                        kind: TokenKind::Value(value),
                        ..
                    }) => value,
                    _ => return Err(syntax_error(line, CifSyntaxErrorKind::MissingValue(tag))),
                };
                let block = document.blocks.last_mut().ok_or_else(|| {
                    syntax_error(line, CifSyntaxErrorKind::OutsideDataBlock(tag.clone()))
                })?;
                block.insert_pair(&tag, value, line)?;
            }
            TokenKind::Value(_) => {
                return Err(syntax_error(line, CifSyntaxErrorKind::ValueWithoutTag));
            }
        }
    }

    Ok(document)
}

fn parse_loop<I>(tokens: &mut Peekable<I>, line: usize) -> Result<CifTable, CifError>
where
    I: Iterator<Item = Token>,
{
    let mut category: Option<String> = None;
    let mut items = Vec::new();
    while let Some(Token {
        kind: TokenKind::Tag(_),
        ..
    }) = tokens.peek()
    {
        let Some(Token {
            kind: TokenKind::Tag(tag),
            line: tag_line,
        }) = tokens.next()
        else {
            break;
        };
        let (tag_category, item) = split_tag(&tag);
        match &category {
            Some(expected) if *expected != tag_category => {
                return Err(syntax_error(
                    tag_line,
                    CifSyntaxErrorKind::MixedLoopCategories {
                        expected: expected.clone(),
                        found: tag_category,
                    },
                ));
            }
            Some(_) => {}
            None => category = Some(tag_category),
        }
        if items.contains(&item) {
            return Err(syntax_error(tag_line, CifSyntaxErrorKind::DuplicateItem(tag)));
        }
        items.push(item);
    }

    let category = category.ok_or_else(|| syntax_error(line, CifSyntaxErrorKind::EmptyLoop))?;

    let mut values = Vec::new();
    while let Some(Token {
        kind: TokenKind::Value(_),
        ..
    }) = tokens.peek()
    {
        if let Some(Token {
            kind: TokenKind::Value(value),
            ..
        }) = tokens.next()
        {
            values.push(value);
        }
    }

    if values.len() % items.len() != 0 {
        return Err(syntax_error(
            line,
            CifSyntaxErrorKind::LoopValueCount {
                tags: items.len(),
                values: values.len(),
            },
        ));
    }

    let mut rows = Vec::with_capacity(values.len() / items.len());
    let mut values = values.into_iter();
    loop {
        let row: Vec<CifValue> = values.by_ref().take(items.len()).collect();
        if row.is_empty() {
            break;
        }
        rows.push(row);
    }

    Ok(CifTable {
        category,
        items,
        rows,
        looped: true,
    })
}

fn skip_save_frame<I>(tokens: &mut I, name: String, line: usize) -> Result<(), CifError>
where
    I: Iterator<Item = Token>,
{
    for token in tokens.by_ref() {
        if matches!(&token.kind, TokenKind::Save(end) if end.is_empty()) {
            return Ok(());
        }
    }
    Err(syntax_error(
        line,
        CifSyntaxErrorKind::UnterminatedSaveFrame(name),
    ))
}
