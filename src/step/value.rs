use std::fmt::Write as _;

use super::entity::EntityId;
use crate::error::ValueError;

/// An attribute value in ISO-10303-21 terms.
///
/// Shared by the writer and the reader, so a written file parses back into
/// the same variants (modulo `Integer`/`Real` for whole numbers).
#[derive(Debug, Clone, PartialEq)]
pub enum StepValue {
    String(String),
    Real(f64),
    Integer(i64),
    Boolean(bool),
    Enum(String),
    Reference(EntityId),
    List(Vec<StepValue>),
    /// Select-type wrapper such as `IFCTEXT('A1')`.
    Typed {
        type_name: String,
        value: Box<StepValue>,
    },
    Null,
    Derived,
}

impl StepValue {
    /// Enumeration token, written as `.TOKEN.`.
    #[must_use]
    pub fn enumeration(token: impl Into<String>) -> Self {
        Self::Enum(token.into())
    }

    /// Typed value, written as `TYPE(value)`.
    #[must_use]
    pub fn typed(type_name: impl Into<String>, value: impl Into<StepValue>) -> Self {
        Self::Typed {
            type_name: type_name.into(),
            value: Box::new(value.into()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Typed { value, .. } => value.as_str(),
            _ => None,
        }
    }

    /// Numeric view; integers widen to `f64`.
    #[must_use]
    pub fn as_real(&self) -> Option<f64> {
        match self {
            Self::Real(f) => Some(*f),
            #[allow(clippy::cast_precision_loss)]
            Self::Integer(i) => Some(*i as f64),
            Self::Typed { value, .. } => value.as_real(),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_reference(&self) -> Option<EntityId> {
        match self {
            Self::Reference(id) => Some(*id),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[StepValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Appends the STEP encoding of this value to `out`.
    pub fn encode_into(&self, out: &mut String) -> Result<(), ValueError> {
        match self {
            Self::Null => out.push('$'),
            Self::Derived => out.push('*'),
            Self::Boolean(true) => out.push_str(".T."),
            Self::Boolean(false) => out.push_str(".F."),
            Self::Integer(i) => {
                let _ = write!(out, "{i}");
            }
            Self::Real(f) => out.push_str(&encode_real(*f)?),
            Self::String(s) => out.push_str(&encode_string(s)),
            Self::Enum(token) => {
                let token = keyword(token).ok_or_else(|| ValueError::InvalidEnumeration {
                    token: token.clone(),
                })?;
                out.push('.');
                out.push_str(&token);
                out.push('.');
            }
            Self::Reference(id) => {
                let _ = write!(out, "{id}");
            }
            Self::Typed { type_name, value } => {
                let name = keyword(type_name).ok_or_else(|| ValueError::InvalidTypeName {
                    name: type_name.clone(),
                })?;
                out.push_str(&name);
                out.push('(');
                value.encode_into(out)?;
                out.push(')');
            }
            Self::List(items) => {
                out.push('(');
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        out.push(',');
                    }
                    item.encode_into(out)?;
                }
                out.push(')');
            }
        }
        Ok(())
    }
}

/// Encodes a single value as STEP text.
pub fn format_value(value: &StepValue) -> Result<String, ValueError> {
    let mut out = String::new();
    value.encode_into(&mut out)?;
    Ok(out)
}

/// Upper-cases a STEP keyword, or `None` if it is not `[A-Za-z0-9_]+`.
pub(crate) fn keyword(name: &str) -> Option<String> {
    let valid = !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_');
    valid.then(|| name.to_ascii_uppercase())
}

/// STEP reals need a decimal point in the mantissa: `1.0`, `1.E-5`.
fn encode_real(value: f64) -> Result<String, ValueError> {
    if !value.is_finite() {
        return Err(ValueError::NonFiniteReal { value });
    }
    // Debug formatting is shortest round-trip and always keeps a fraction
    // unless it switches to exponent form.
    let repr = format!("{value:?}");
    Ok(match repr.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => format!("{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => format!("{mantissa}.E{exponent}"),
        None => repr,
    })
}

/// Quotes a string with STEP escapes: `''`, `\\`, and `\X2\`/`\X4\` for
/// anything outside printable ASCII.
fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');

    let mut chars = s.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => out.push_str("''"),
            '\\' => out.push_str("\\\\"),
            ' '..='~' => out.push(ch),
            _ if u32::from(ch) > 0xFFFF => {
                let _ = write!(out, "\\X4\\{:08X}\\X0\\", u32::from(ch));
            }
            _ => {
                // Consecutive BMP characters share one \X2\ block.
                out.push_str("\\X2\\");
                let _ = write!(out, "{:04X}", u32::from(ch));
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_graphic() || next == ' ' || u32::from(next) > 0xFFFF {
                        break;
                    }
                    let _ = write!(out, "{:04X}", u32::from(next));
                    chars.next();
                }
                out.push_str("\\X0\\");
            }
        }
    }

    out.push('\'');
    out
}

impl From<bool> for StepValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for StepValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for StepValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<u32> for StepValue {
    fn from(value: u32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for StepValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for StepValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for StepValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<EntityId> for StepValue {
    fn from(value: EntityId) -> Self {
        Self::Reference(value)
    }
}

impl<T: Into<StepValue>> From<Vec<T>> for StepValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<StepValue>> From<Option<T>> for StepValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encoded(value: impl Into<StepValue>) -> String {
        format_value(&value.into()).unwrap()
    }

    #[test]
    fn test_scalars() {
        assert_eq!(encoded(StepValue::Null), "$");
        assert_eq!(encoded(StepValue::Derived), "*");
        assert_eq!(encoded(true), ".T.");
        assert_eq!(encoded(false), ".F.");
        assert_eq!(encoded(3), "3");
        assert_eq!(encoded(-17_i64), "-17");
        assert_eq!(encoded(EntityId::new(7)), "#7");
        assert_eq!(encoded(None::<f64>), "$");
    }

    #[test]
    fn test_lists() {
        assert_eq!(encoded(Vec::<i64>::new()), "()");
        assert_eq!(encoded(vec![1, 2, 3]), "(1,2,3)");
        assert_eq!(encoded(vec![1.5, -2.25, 0.0]), "(1.5,-2.25,0.0)");
        assert_eq!(
            encoded(vec![EntityId::new(4), EntityId::new(9)]),
            "(#4,#9)"
        );
        assert_eq!(
            encoded(StepValue::List(vec![
                StepValue::List(vec![EntityId::new(1).into()]),
                StepValue::List(vec![]),
            ])),
            "((#1),())"
        );
    }

    #[test]
    fn test_reals_keep_decimal_point() {
        assert_eq!(encoded(1.0), "1.0");
        assert_eq!(encoded(100.0), "100.0");
        assert_eq!(encoded(0.00001), "1.E-5");
        assert_eq!(encoded(1.5e-7), "1.5E-7");
        assert_eq!(encoded(1e20), "1.E20");
        assert_eq!(encoded(6_543_210.125), "6543210.125");
    }

    #[test]
    fn test_non_finite_reals_fail() {
        assert!(matches!(
            format_value(&StepValue::Real(f64::NAN)),
            Err(ValueError::NonFiniteReal { .. })
        ));
        assert!(format_value(&vec![0.0, f64::INFINITY].into()).is_err());
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(encoded("Survey Point A1"), "'Survey Point A1'");
        assert_eq!(encoded("it's"), "'it''s'");
        assert_eq!(encoded(r"C:\survey"), r"'C:\\survey'");
        assert_eq!(encoded("Bjørvika"), r"'Bj\X2\00F8\X0\rvika'");
        assert_eq!(encoded("æøå"), r"'\X2\00E600F800E5\X0\'");
        assert_eq!(encoded("line\nbreak"), r"'line\X2\000A\X0\break'");
        assert_eq!(encoded("📍"), r"'\X4\0001F4CD\X0\'");
    }

    #[test]
    fn test_enumerations() {
        assert_eq!(encoded(StepValue::enumeration("LENGTHUNIT")), ".LENGTHUNIT.");
        assert_eq!(encoded(StepValue::enumeration("model_view")), ".MODEL_VIEW.");
        assert!(matches!(
            format_value(&StepValue::enumeration("NOT VALID")),
            Err(ValueError::InvalidEnumeration { .. })
        ));
        assert!(format_value(&StepValue::enumeration("")).is_err());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(encoded(StepValue::typed("IfcText", "P-100")), "IFCTEXT('P-100')");
        assert_eq!(encoded(StepValue::typed("IfcReal", 12.5)), "IFCREAL(12.5)");
        assert!(matches!(
            format_value(&StepValue::typed("Ifc Text", "x")),
            Err(ValueError::InvalidTypeName { .. })
        ));
    }
}
