//! CBOR transcoding: encode bbconf trees as CBOR binary data.
//!
//! Mapping from lowered values to CBOR:
//!   - float  -> CBOR float64 (always 9 bytes, never downgraded)
//!   - string -> CBOR text string (determinate length)
//!   - map    -> CBOR map (determinate length, text string keys)

use super::{lower, Plain};
use ciborium::value::Value as CborValue;
use libbbconf::Mapping;

// ---------------------------------------------------------------------------
// Encode
//
// CBOR is written directly rather than through ciborium's Value type because
// ciborium downgrades float64 to float16/float32 when the value fits in
// fewer bytes. Every number stays a CBOR float64 (major type 7, additional
// info 27, 8-byte IEEE 754 payload).
// ---------------------------------------------------------------------------

/// Encode a parsed document as CBOR bytes.
pub fn encode(tree: &Mapping) -> Vec<u8> {
    let mut buf = Vec::new();
    write_map(&mut buf, &lower(tree));
    buf
}

fn write_value(buf: &mut Vec<u8>, value: &Plain<'_>) {
    match value {
        Plain::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Plain::Text(s) => write_text(buf, s),
        Plain::Map(entries) => write_map(buf, entries),
    }
}

fn write_text(buf: &mut Vec<u8>, s: &str) {
    let bytes = s.as_bytes();
    write_head(buf, 3, bytes.len() as u64); // major 3 = text string
    buf.extend_from_slice(bytes);
}

fn write_map(buf: &mut Vec<u8>, entries: &[(&str, Plain<'_>)]) {
    write_head(buf, 5, entries.len() as u64); // major 5 = map
    for (key, value) in entries {
        write_text(buf, key);
        write_value(buf, value);
    }
}

/// Write the head of a data item: major type plus argument, using the
/// shortest of the inline, 1, 2, 4 or 8 byte argument forms.
fn write_head(buf: &mut Vec<u8>, major: u8, arg: u64) {
    let major = major << 5;
    if arg < 24 {
        buf.push(major | arg as u8);
        return;
    }
    let width: usize = match arg {
        0..=0xff => 1,
        0x100..=0xffff => 2,
        0x1_0000..=0xffff_ffff => 4,
        _ => 8,
    };
    // Additional info 24..=27 is 24 + log2(width)
    buf.push(major | (24 + width.trailing_zeros() as u8));
    buf.extend_from_slice(&arg.to_be_bytes()[8 - width..]);
}

// ---------------------------------------------------------------------------
// Diagnostic Notation (CBOR -> human-readable text, RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation (RFC 8949 §8).
///
/// Renders from the CBOR binary rather than the tree, so the output shows
/// the actual wire encoding.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor_value: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    Ok(format!("{}\n", render(&cbor_value, 0)))
}

fn render(val: &CborValue, indent: usize) -> String {
    match val {
        CborValue::Float(f) => render_float(*f),
        // Diagnostic text strings use JSON string syntax
        CborValue::Text(s) => serde_json::Value::from(s.as_str()).to_string(),
        CborValue::Map(pairs) if pairs.is_empty() => "{}".to_string(),
        CborValue::Map(pairs) => {
            let pad = " ".repeat(indent + 2);
            let entries: Vec<String> = pairs
                .iter()
                .map(|(k, v)| {
                    format!("{}{}: {}", pad, render(k, indent + 2), render(v, indent + 2))
                })
                .collect();
            format!("{{\n{}\n{}}}", entries.join(",\n"), " ".repeat(indent))
        }
        other => format!("<?unknown {:?}>", other),
    }
}

/// NaN is reachable through a fraction of two overflowing numbers.
fn render_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        let name = if f > 0.0 { "Infinity" } else { "-Infinity" };
        name.to_string()
    } else {
        // Debug keeps a decimal point or an exponent: 5000.0, 1e300, -0.0
        format!("{:?}", f)
    }
}
