//! PDF object syntax (ISO 32000-1:2008, section 7.3).

use super::object::{Dict, Object};
use std::io::{self, Write};

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Writes [`Object`]s in PDF syntax.
///
/// Dictionary keys are emitted in sorted order, so the same document always
/// serializes to the same bytes.
#[derive(Debug, Clone, Default)]
pub struct ObjectSerializer {
    /// One space between dictionary entries instead of one entry per line
    compact: bool,
}

impl ObjectSerializer {
    /// Serializer that puts every dictionary entry on its own line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializer with single-space separators, as used for file output.
    pub fn compact() -> Self {
        Self { compact: true }
    }

    /// Write `obj` to `w`.
    pub fn write<W: Write>(&self, w: &mut W, obj: &Object) -> io::Result<()> {
        self.emit(w, obj)
    }

    /// Write `obj` as indirect object `id gen obj ... endobj`.
    pub fn write_indirect<W: Write>(&self, w: &mut W, id: u32, gen: u16, obj: &Object) -> io::Result<()> {
        writeln!(w, "{} {} obj", id, gen)?;
        self.emit(w, obj)?;
        w.write_all(b"\nendobj\n")
    }

    /// `obj` in PDF syntax, lossily decoded as UTF-8. Output stops at the
    /// first non-finite real.
    pub fn serialize_to_string(&self, obj: &Object) -> String {
        let mut buf = Vec::new();
        let _ = self.emit(&mut buf, obj);
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn emit<W: Write>(&self, w: &mut W, obj: &Object) -> io::Result<()> {
        match obj {
            Object::Null => w.write_all(b"null"),
            Object::Boolean(true) => w.write_all(b"true"),
            Object::Boolean(false) => w.write_all(b"false"),
            Object::Integer(i) => write!(w, "{}", i),
            Object::Real(r) => match format_real(*r) {
                Some(text) => w.write_all(text.as_bytes()),
                None => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} cannot be written as a PDF number", r),
                )),
            },
            Object::String(bytes) => emit_string(w, bytes),
            Object::Name(name) => emit_name(w, name),
            Object::Array(items) => {
                w.write_all(b"[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        w.write_all(b" ")?;
                    }
                    self.emit(w, item)?;
                }
                w.write_all(b"]")
            },
            Object::Dictionary(dict) => self.emit_dict(w, dict, None),
            Object::Stream { dict, data } => {
                let length = Object::Integer(data.len() as i64);
                self.emit_dict(w, dict, Some(&length))?;
                w.write_all(b"\nstream\n")?;
                w.write_all(data)?;
                w.write_all(b"\nendstream")
            },
            Object::Reference(r) => write!(w, "{}", r),
        }
    }

    /// Dictionary with sorted keys. `length`, when given, replaces any
    /// `/Length` entry of `dict`.
    fn emit_dict<W: Write>(&self, w: &mut W, dict: &Dict, length: Option<&Object>) -> io::Result<()> {
        let mut entries: Vec<(&str, &Object)> = dict
            .iter()
            .filter(|(key, _)| length.is_none() || key.as_str() != "Length")
            .map(|(key, value)| (key.as_str(), value))
            .collect();
        if let Some(length) = length {
            entries.push(("Length", length));
        }
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let separator: &[u8] = if self.compact { b" " } else { b"\n  " };
        w.write_all(b"<<")?;
        for (key, value) in &entries {
            w.write_all(separator)?;
            emit_name(w, key)?;
            w.write_all(b" ")?;
            self.emit(w, value)?;
        }
        if !entries.is_empty() {
            w.write_all(if self.compact { b" " } else { b"\n" })?;
        }
        w.write_all(b">>")
    }
}

/// Literal `(...)` for printable ASCII, hex `<...>` for anything else.
fn emit_string<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    let literal = bytes
        .iter()
        .all(|&b| matches!(b, b'\n' | b'\r' | b'\t' | 0x20..=0x7E));
    if !literal {
        w.write_all(b"<")?;
        for &b in bytes {
            w.write_all(&[HEX[(b >> 4) as usize], HEX[(b & 0x0F) as usize]])?;
        }
        return w.write_all(b">");
    }

    w.write_all(b"(")?;
    for &b in bytes {
        let escaped: &[u8] = match b {
            b'(' => b"\\(",
            b')' => b"\\)",
            b'\\' => b"\\\\",
            b'\n' => b"\\n",
            b'\r' => b"\\r",
            b'\t' => b"\\t",
            _ => {
                w.write_all(&[b])?;
                continue;
            },
        };
        w.write_all(escaped)?;
    }
    w.write_all(b")")
}

/// `/Name`, with delimiters, whitespace and non-ASCII bytes as `#xx`.
fn emit_name<W: Write>(w: &mut W, name: &str) -> io::Result<()> {
    w.write_all(b"/")?;
    for b in name.bytes() {
        let delimiter = matches!(b, b'#' | b'/' | b'%' | b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}');
        if b.is_ascii_graphic() && !delimiter {
            w.write_all(&[b])?;
        } else {
            w.write_all(&[b'#', HEX[(b >> 4) as usize], HEX[(b & 0x0F) as usize]])?;
        }
    }
    Ok(())
}

/// Shortest decimal form with at most five fractional digits; integral
/// values print without a point and `-0` prints as `0`. PDF has no syntax
/// for NaN or infinity, so those yield `None`.
pub(crate) fn format_real(value: f64) -> Option<String> {
    if !value.is_finite() {
        return None;
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return Some((value as i64).to_string());
    }
    let mut text = format!("{:.5}", value);
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text.remove(0);
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compact(obj: &Object) -> String {
        ObjectSerializer::compact().serialize_to_string(obj)
    }

    #[test]
    fn test_scalars() {
        assert_eq!(compact(&Object::Null), "null");
        assert_eq!(compact(&Object::Boolean(false)), "false");
        assert_eq!(compact(&Object::Integer(-123)), "-123");
        assert_eq!(compact(&Object::reference(7)), "7 0 R");
    }

    #[test]
    fn test_reals() {
        assert_eq!(format_real(3.14258).as_deref(), Some("3.14258"));
        assert_eq!(format_real(1.0).as_deref(), Some("1"));
        assert_eq!(format_real(0.5).as_deref(), Some("0.5"));
        assert_eq!(format_real(-0.000001).as_deref(), Some("0"));
        assert_eq!(format_real(-2.25).as_deref(), Some("-2.25"));
    }

    #[test]
    fn test_non_finite_reals_rejected() {
        assert_eq!(format_real(f64::NAN), None);
        assert_eq!(format_real(f64::INFINITY), None);
        assert_eq!(format_real(f64::NEG_INFINITY), None);

        let mut out = Vec::new();
        let rect = Object::Array(vec![Object::Integer(0), Object::Real(f64::NAN)]);
        let err = ObjectSerializer::compact().write(&mut out, &rect).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_string_forms() {
        assert_eq!(compact(&Object::text("Q1 (draft)")), "(Q1 \\(draft\\))");
        assert_eq!(compact(&Object::text("a\\b")), "(a\\\\b)");
        assert_eq!(compact(&Object::String(vec![0x00, 0xFF, 0x3A])), "<00FF3A>");
    }

    #[test]
    fn test_names_escape_delimiters() {
        assert_eq!(compact(&Object::name("Sales Report")), "/Sales#20Report");
        assert_eq!(compact(&Object::name("A#B")), "/A#23B");
        assert_eq!(compact(&Object::name("FlateDecode")), "/FlateDecode");
    }

    #[test]
    fn test_dictionary_keys_sorted() {
        let dict = Object::dict([("Type", Object::name("Page")), ("Count", Object::Integer(1))]);
        assert_eq!(compact(&dict), "<< /Count 1 /Type /Page >>");
        assert_eq!(compact(&Object::Dictionary(Dict::new())), "<<>>");

        let pretty = ObjectSerializer::new().serialize_to_string(&dict);
        assert_eq!(pretty, "<<\n  /Count 1\n  /Type /Page\n>>");
    }

    #[test]
    fn test_indirect_object() {
        let mut buf = Vec::new();
        ObjectSerializer::compact()
            .write_indirect(&mut buf, 4, 0, &Object::Integer(42))
            .unwrap();
        assert_eq!(buf, b"4 0 obj\n42\nendobj\n");
    }

    #[test]
    fn test_stream_length_recomputed() {
        let mut dict = Dict::new();
        dict.insert("Length".to_string(), Object::Integer(999));
        dict.insert("Filter".to_string(), Object::name("FlateDecode"));
        let stream = Object::Stream {
            dict,
            data: bytes::Bytes::from_static(b"0 0 m"),
        };
        assert_eq!(
            compact(&stream),
            "<< /Filter /FlateDecode /Length 5 >>\nstream\n0 0 m\nendstream"
        );
    }

    #[test]
    fn test_rect_array() {
        assert_eq!(compact(&Object::rect(0.0, 0.0, 595.28, 841.89)), "[0 0 595.28 841.89]");
    }
}
