use std::collections::HashMap;
use std::path::Path;

use super::entity::EntityId;
use super::value::StepValue;
use crate::error::ParseError;

/// One parsed `#id=TYPE(...)` line.
#[derive(Debug, Clone)]
pub struct StepEntity {
    pub id: EntityId,
    pub entity_type: String,
    pub values: Vec<StepValue>,
}

impl StepEntity {
    /// Follows the reference stored at `index`.
    #[must_use]
    pub fn reference(&self, index: usize) -> Option<EntityId> {
        self.values.get(index).and_then(StepValue::as_reference)
    }

    #[must_use]
    pub fn string(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(StepValue::as_str)
    }
}

/// A STEP file as written by [`crate::step::IfcWriter`]: one entity per line.
#[derive(Debug)]
pub struct StepFile {
    pub entities: HashMap<EntityId, StepEntity>,
    pub schema: String,
    pub file_name: String,
}

impl StepFile {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ParseError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ParseError::FileRead {
            path: path.as_ref().to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ParseError> {
        let mut entities = HashMap::new();
        let mut schema = String::new();
        let mut file_name = String::new();
        let mut in_data = false;
        let mut seen_data = false;

        let mut lines = content.lines().map(str::trim).filter(|line| !line.is_empty());
        if lines.next() != Some("ISO-10303-21;") {
            return Err(ParseError::InvalidStep {
                message: "missing ISO-10303-21 signature".to_string(),
            });
        }

        for line in lines {
            if let Some(args) = line.strip_prefix("FILE_SCHEMA(") {
                schema = first_string(args).unwrap_or_default();
                continue;
            }
            if let Some(args) = line.strip_prefix("FILE_NAME(") {
                file_name = first_string(args).unwrap_or_default();
                continue;
            }

            if line == "DATA;" {
                in_data = true;
                seen_data = true;
                continue;
            }
            if line == "ENDSEC;" {
                in_data = false;
                continue;
            }

            if in_data && line.starts_with('#') {
                let entity = Self::parse_entity_line(line).ok_or_else(|| ParseError::InvalidStep {
                    message: format!("malformed entity line: {line}"),
                })?;
                entities.insert(entity.id, entity);
            }
        }

        if !seen_data {
            return Err(ParseError::InvalidStep {
                message: "missing DATA section".to_string(),
            });
        }

        Ok(StepFile {
            entities,
            schema,
            file_name,
        })
    }

    fn parse_entity_line(line: &str) -> Option<StepEntity> {
        // Format: #123=IFCWALL('guid',#ref,'name',...);
        let line = line.strip_suffix(';')?;

        let eq_pos = line.find('=')?;
        let id: u64 = line[1..eq_pos].trim().parse().ok()?;

        let rest = line[eq_pos + 1..].trim();
        let paren_pos = rest.find('(')?;
        let entity_type = rest[..paren_pos].trim().to_string();

        let values_str = rest[paren_pos + 1..].strip_suffix(')')?;
        let values = Self::parse_values(values_str);

        Some(StepEntity {
            id: EntityId::new(id),
            entity_type,
            values,
        })
    }

    fn parse_values(s: &str) -> Vec<StepValue> {
        let mut values = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut paren_depth = 0;

        for ch in s.chars() {
            match ch {
                // A doubled quote toggles twice and stays inside the string.
                '\'' => {
                    in_string = !in_string;
                    current.push(ch);
                }
                '(' if !in_string => {
                    paren_depth += 1;
                    current.push(ch);
                }
                ')' if !in_string => {
                    paren_depth -= 1;
                    current.push(ch);
                }
                ',' if !in_string && paren_depth == 0 => {
                    values.push(Self::parse_single_value(current.trim()));
                    current.clear();
                }
                _ => current.push(ch),
            }
        }

        if !current.trim().is_empty() {
            values.push(Self::parse_single_value(current.trim()));
        }

        values
    }

    fn parse_single_value(s: &str) -> StepValue {
        let s = s.trim();

        if s == "$" {
            return StepValue::Null;
        }
        if s == "*" {
            return StepValue::Derived;
        }
        if let Some(stripped) = s.strip_prefix('#') {
            if let Ok(id) = stripped.parse::<u64>() {
                return StepValue::Reference(EntityId::new(id));
            }
        }
        if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
            let raw = &s[1..s.len() - 1];
            return StepValue::String(decode_step_string(raw));
        }
        if s.len() >= 2 && s.starts_with('.') && s.ends_with('.') {
            let inner = &s[1..s.len() - 1];
            if inner == "T" {
                return StepValue::Boolean(true);
            }
            if inner == "F" {
                return StepValue::Boolean(false);
            }
            return StepValue::Enum(inner.to_string());
        }
        if s.starts_with('(') && s.ends_with(')') {
            let inner = &s[1..s.len() - 1];
            return StepValue::List(Self::parse_values(inner));
        }
        if let Ok(i) = s.parse::<i64>() {
            return StepValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return StepValue::Real(f);
        }
        // Typed value like IFCTEXT('A1')
        if let Some(paren_pos) = s.find('(') {
            if s.ends_with(')') {
                let inner = &s[paren_pos + 1..s.len() - 1];
                return StepValue::typed(&s[..paren_pos], Self::parse_single_value(inner));
            }
        }

        StepValue::String(s.to_string())
    }

    #[must_use]
    pub fn get_entity(&self, id: EntityId) -> Option<&StepEntity> {
        self.entities.get(&id)
    }

    /// Entities of one (upper-case) type, ordered by id.
    #[must_use]
    pub fn get_entities_by_type(&self, entity_type: &str) -> Vec<&StepEntity> {
        let mut found: Vec<&StepEntity> = self
            .entities
            .values()
            .filter(|e| e.entity_type == entity_type)
            .collect();
        found.sort_by_key(|e| e.id);
        found
    }
}

fn first_string(args: &str) -> Option<String> {
    let start = args.find('\'')?;
    let mut result = String::new();
    let mut chars = args[start + 1..].chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '\'' {
            if chars.peek() == Some(&'\'') {
                chars.next();
                result.push_str("''");
                continue;
            }
            return Some(decode_step_string(&result));
        }
        result.push(ch);
    }
    None
}

/// Decode STEP/IFC encoded strings with Unicode escape sequences.
/// Supports:
/// - `\X2\XXXX\X0\` - 2-byte Unicode (BMP), can have multiple 4-char hex codes
/// - `\X4\XXXXXXXX\X0\` - 4-byte Unicode, can have multiple 8-char hex codes
/// - `\X\XX` - 1-byte ISO 8859-1
/// - `\\` - escaped backslash
/// - `''` - escaped apostrophe
fn decode_step_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.peek() {
                Some('X') => {
                    chars.next(); // consume 'X'
                    match chars.peek().copied() {
                        Some(width @ ('2' | '4')) => {
                            chars.next(); // consume width
                            chars.next(); // consume '\'

                            let mut hex = String::new();
                            while let Some(&c) = chars.peek() {
                                if c == '\\' {
                                    break;
                                }
                                hex.push(c);
                                chars.next();
                            }
                            // Skip \X0\
                            if chars.peek() == Some(&'\\') {
                                chars.next(); // '\'
                                chars.next(); // 'X'
                                chars.next(); // '0'
                                chars.next(); // '\'
                            }
                            let digits = if width == '2' { 4 } else { 8 };
                            for chunk in hex.as_bytes().chunks(digits) {
                                if chunk.len() == digits {
                                    if let Ok(s) = std::str::from_utf8(chunk) {
                                        if let Ok(code) = u32::from_str_radix(s, 16) {
                                            if let Some(c) = char::from_u32(code) {
                                                result.push(c);
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        Some('\\') => {
                            // \X\ followed by 2 hex digits - ISO 8859-1
                            chars.next(); // consume '\'
                            let mut hex = String::new();
                            for _ in 0..2 {
                                if let Some(&c) = chars.peek() {
                                    hex.push(c);
                                    chars.next();
                                }
                            }
                            if let Ok(code) = u8::from_str_radix(&hex, 16) {
                                result.push(char::from(code));
                            }
                        }
                        _ => {
                            result.push('\\');
                            result.push('X');
                        }
                    }
                }
                Some('\\') => {
                    chars.next();
                    result.push('\\');
                }
                _ => result.push('\\'),
            }
        } else if ch == '\'' {
            // '' is escaped apostrophe in STEP
            if chars.peek() == Some(&'\'') {
                chars.next();
            }
            result.push('\'');
        } else {
            result.push(ch);
        }
    }

    result
}
