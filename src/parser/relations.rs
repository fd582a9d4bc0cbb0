//! Relation block bodies: `key: value, key: [a, "b, c", [[d]]]`

use thiserror::Error;

/// Why a relation block was skipped
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("empty relation block")]
    EmptyBlock,

    #[error("relation block has no closing brace")]
    Unclosed,

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("unbalanced brackets")]
    UnbalancedBrackets,

    #[error("entry '{0}' has no 'key:' separator")]
    MissingSeparator(String),

    #[error("invalid relation key '{0}'")]
    InvalidKey(String),

    #[error("relation '{0}' has an empty value")]
    EmptyValue(String),

    #[error("nested array in relation '{0}'")]
    NestedArray(String),
}

/// How a value was written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Bare token: `institution/financial`
    Token,
    /// Quoted string: `"Credit Union"`
    Quoted,
    /// Concept reference: `[[bank]]`
    Reference,
}

/// A single relation value with quoting and brackets removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationValue {
    pub text: String,
    pub kind: ValueKind,
}

impl RelationValue {
    fn new(text: &str, kind: ValueKind) -> Self {
        Self {
            text: text.to_string(),
            kind,
        }
    }
}

/// Relations declared in one block, in declaration order.
///
/// A key declared twice keeps its first position and its last values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Relations {
    entries: Vec<(String, Vec<RelationValue>)>,
}

impl Relations {
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<RelationValue>) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((key, values)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&[RelationValue]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_slice())
    }

    /// Text of every value declared under `key`
    pub fn texts(&self, key: &str) -> Vec<String> {
        self.get(key)
            .unwrap_or(&[])
            .iter()
            .map(|v| v.text.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[RelationValue])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse the text between a block's braces
pub fn parse_relations(body: &str) -> Result<Relations, BlockError> {
    if body.trim().is_empty() {
        return Err(BlockError::EmptyBlock);
    }

    let mut relations = Relations::default();
    for entry in split_top_level(body, ',')? {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let (key, value) = entry
            .split_once(':')
            .ok_or_else(|| BlockError::MissingSeparator(entry.to_string()))?;
        let key = key.trim();
        if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(BlockError::InvalidKey(key.to_string()));
        }
        let values = parse_value(key, value.trim())?;
        relations.insert(key, values);
    }

    if relations.is_empty() {
        return Err(BlockError::EmptyBlock);
    }
    Ok(relations)
}

fn parse_value(key: &str, value: &str) -> Result<Vec<RelationValue>, BlockError> {
    if value.is_empty() {
        return Err(BlockError::EmptyValue(key.to_string()));
    }
    if let Some(reference) = as_reference(value) {
        return Ok(vec![RelationValue::new(reference, ValueKind::Reference)]);
    }
    if let Some(rest) = value.strip_prefix('[') {
        let inner = rest
            .strip_suffix(']')
            .ok_or(BlockError::UnbalancedBrackets)?;
        let mut items = Vec::new();
        for item in split_top_level(inner, ',')? {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            if item.starts_with('[') && as_reference(item).is_none() {
                return Err(BlockError::NestedArray(key.to_string()));
            }
            items.push(parse_scalar(item)?);
        }
        return Ok(items);
    }
    Ok(vec![parse_scalar(value)?])
}

fn parse_scalar(value: &str) -> Result<RelationValue, BlockError> {
    if let Some(reference) = as_reference(value) {
        return Ok(RelationValue::new(reference, ValueKind::Reference));
    }
    if let Some(quote) = value.chars().next().filter(|c| is_quote(*c)) {
        let inner = value[1..]
            .strip_suffix(quote)
            .ok_or(BlockError::UnterminatedQuote)?;
        return Ok(RelationValue::new(inner, ValueKind::Quoted));
    }
    if value.contains(|c: char| c == '[' || c == ']') {
        return Err(BlockError::UnbalancedBrackets);
    }
    Ok(RelationValue::new(value, ValueKind::Token))
}

/// `[[name]]` or `[[name|display]]` -> `name`
fn as_reference(value: &str) -> Option<&str> {
    let inner = value.strip_prefix("[[")?.strip_suffix("]]")?;
    if inner.contains(|c: char| c == '[' || c == ']') {
        return None;
    }
    let name = inner.split('|').next().unwrap_or(inner).trim();
    (!name.is_empty()).then_some(name)
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}

/// Can a quote open after this significant character?
///
/// Quotes only open at the start of a value, so apostrophes inside bare
/// tokens (`bank's`) stay literal.
pub(crate) fn quote_may_open(previous: Option<char>) -> bool {
    matches!(previous, None | Some(':' | ',' | '[' | '{'))
}

/// Split on `separator` outside quotes and brackets
pub(crate) fn split_top_level(text: &str, separator: char) -> Result<Vec<&str>, BlockError> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut depth: usize = 0;
    let mut quote: Option<char> = None;
    let mut previous: Option<char> = None;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
                previous = Some(c);
            }
            continue;
        }
        match c {
            c if is_quote(c) && quote_may_open(previous) => {
                quote = Some(c);
            }
            '[' => depth += 1,
            ']' => depth = depth.checked_sub(1).ok_or(BlockError::UnbalancedBrackets)?,
            c if c == separator && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
        if !c.is_whitespace() {
            previous = Some(c);
        }
    }

    if quote.is_some() {
        return Err(BlockError::UnterminatedQuote);
    }
    if depth != 0 {
        return Err(BlockError::UnbalancedBrackets);
    }
    parts.push(&text[start..]);
    Ok(parts)
}
