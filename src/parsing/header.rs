use tracing::{debug, warn};

use crate::core::header::{Header, HeaderLine};
use crate::core::reference::Reference;
use crate::error::{Error, Result};
use crate::utils::validation::{normalize_md5, valid_len};

/// Parse a SAM header block.
///
/// Every non-empty line must start with `@` and a two-letter record type.
/// `@SQ` lines populate the reference dictionary in order; all other lines
/// are kept as metadata.
///
/// # Errors
///
/// Returns `Error::InvalidHeader` for malformed lines, a missing `SN`, or an
/// out-of-range `LN`; `Error::DuplicateReference` if a name repeats; or
/// `Error::TooManyReferences` if the limit is exceeded. No partial header
/// is returned.
pub fn parse_header_text(text: &str) -> Result<Header> {
    let mut header = Header::new();
    let mut seen_hd = false;

    for (i, line) in text.lines().enumerate() {
        if line.is_empty() {
            continue;
        }
        let line_no = i + 1;

        let kind = line
            .strip_prefix('@')
            .and_then(|rest| rest.get(..2))
            .filter(|k| k.bytes().all(|b| b.is_ascii_alphabetic()))
            .ok_or_else(|| Error::header(format!("line {line_no}: missing record type")))?;
        let body = &line[3..];

        if kind == "CO" {
            let text = body.strip_prefix('\t').unwrap_or(body);
            header.push_line(HeaderLine::Comment(text.to_string()))?;
            continue;
        }

        let fields = parse_fields(body).map_err(|e| Error::header(format!("line {line_no}: {e}")))?;

        match kind {
            "SQ" => {
                let reference = parse_reference(fields)
                    .map_err(|e| Error::header(format!("line {line_no}: {e}")))?;
                header.add_reference(reference)?;
            }
            "HD" if seen_hd => {
                return Err(Error::header(format!("line {line_no}: duplicate @HD line")));
            }
            _ => {
                seen_hd |= kind == "HD";
                header.push_line(HeaderLine::Tagged {
                    kind: kind.to_string(),
                    fields,
                })?;
            }
        }
    }

    debug!(
        references = header.len(),
        lines = header.lines().len(),
        "Parsed SAM header"
    );

    Ok(header)
}

fn parse_fields(body: &str) -> std::result::Result<Vec<(String, String)>, String> {
    if body.is_empty() {
        return Ok(Vec::new());
    }
    let body = body
        .strip_prefix('\t')
        .ok_or_else(|| "record type must be followed by a tab".to_string())?;

    body.split('\t')
        .map(|field| match field.split_once(':') {
            Some((tag, value)) if tag.len() == 2 && tag.bytes().all(|b| b.is_ascii_alphanumeric()) => {
                Ok((tag.to_string(), value.to_string()))
            }
            _ => Err(format!("malformed field {field:?}")),
        })
        .collect()
}

fn parse_reference(fields: Vec<(String, String)>) -> std::result::Result<Reference, String> {
    let mut name: Option<String> = None;
    let mut reference = Reference::unregistered(String::new());

    for (tag, value) in fields {
        match tag.as_str() {
            "SN" => name = Some(value),
            "LN" => {
                let length: i64 = value
                    .parse()
                    .map_err(|_| format!("invalid LN value {value:?}"))?;
                if !valid_len(length) {
                    return Err(format!("LN out of range: {length}"));
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let length = length as u32;
                reference.length = Some(length);
            }
            "M5" => {
                // Validate and normalize MD5, warn if invalid
                if let Some(normalized) = normalize_md5(&value) {
                    reference.md5 = Some(normalized);
                } else {
                    warn!(md5 = %value, "Invalid MD5 checksum format, ignoring");
                }
            }
            "AS" => reference.assembly = Some(value),
            "UR" => reference.uri = Some(value),
            "SP" => reference.species = Some(value),
            "AN" => {
                // Alternate names (aliases), comma-separated
                reference.aliases = value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
            }
            _ => reference.other.push((tag, value)),
        }
    }

    reference.name = name.ok_or_else(|| "@SQ line without SN tag".to_string())?;
    Ok(reference)
}

/// Render a header as SAM text: `@HD` first, then `@SQ` lines in dictionary
/// order, then remaining metadata in insertion order.
#[must_use]
pub fn format_header_text(header: &Header) -> String {
    let mut out = String::new();

    let (hd, rest): (Vec<&HeaderLine>, Vec<&HeaderLine>) =
        header.lines().iter().partition(|l| l.kind() == "HD");

    for line in hd {
        push_line(&mut out, line);
    }
    for reference in header.references() {
        push_reference(&mut out, reference);
    }
    for line in rest {
        push_line(&mut out, line);
    }

    out
}

fn push_line(out: &mut String, line: &HeaderLine) {
    match line {
        HeaderLine::Tagged { kind, fields } => {
            out.push('@');
            out.push_str(kind);
            for (tag, value) in fields {
                push_field(out, tag, value);
            }
        }
        HeaderLine::Comment(text) => {
            out.push_str("@CO");
            if !text.is_empty() {
                out.push('\t');
                out.push_str(text);
            }
        }
    }
    out.push('\n');
}

fn push_reference(out: &mut String, reference: &Reference) {
    out.push_str("@SQ");
    push_field(out, "SN", &reference.name);
    if let Some(length) = reference.length {
        push_field(out, "LN", &length.to_string());
    }
    if let Some(md5) = &reference.md5 {
        push_field(out, "M5", md5);
    }
    if let Some(assembly) = &reference.assembly {
        push_field(out, "AS", assembly);
    }
    if let Some(uri) = &reference.uri {
        push_field(out, "UR", uri);
    }
    if let Some(species) = &reference.species {
        push_field(out, "SP", species);
    }
    if !reference.aliases.is_empty() {
        push_field(out, "AN", &reference.aliases.join(","));
    }
    for (tag, value) in &reference.other {
        push_field(out, tag, value);
    }
    out.push('\n');
}

fn push_field(out: &mut String, tag: &str, value: &str) {
    out.push('\t');
    out.push_str(tag);
    out.push(':');
    out.push_str(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "@HD\tVN:1.6\tSO:coordinate
@SQ\tSN:chr1\tLN:248956422\tM5:6aef897c3d6ff0c78aff06ac189178dd
@SQ\tSN:chr2\tLN:242193529\tM5:f98db672eb0993dcfdabafe2a882905c
@SQ\tSN:chrM\tLN:16569\tAN:MT,chrMT
@RG\tID:sample1\tSM:NA12878
@PG\tID:bwa\tPN:bwa\tVN:0.7.17
@CO\tfree text: with colons\tand tabs
";

    #[test]
    fn test_parse_header_text() {
        let header = parse_header_text(HEADER).unwrap();
        assert_eq!(header.len(), 3);
        assert_eq!(header.version(), Some("1.6"));
        assert_eq!(header.sort_order(), Some("coordinate"));

        let chr1 = &header.references()[0];
        assert_eq!(chr1.name, "chr1");
        assert_eq!(chr1.length, Some(248_956_422));
        assert_eq!(chr1.index, Some(0));
        assert_eq!(
            chr1.md5,
            Some("6aef897c3d6ff0c78aff06ac189178dd".to_string())
        );

        let chr_m = header.reference("chrM").unwrap();
        assert_eq!(chr_m.index, Some(2));
        assert_eq!(chr_m.aliases, vec!["MT".to_string(), "chrMT".to_string()]);

        assert_eq!(header.lines().len(), 4);
        assert_eq!(
            header.lines()[3],
            HeaderLine::Comment("free text: with colons\tand tabs".to_string())
        );
    }

    #[test]
    fn test_round_trip() {
        let header = parse_header_text(HEADER).unwrap();
        let text = format_header_text(&header);
        assert_eq!(text, HEADER);

        let reparsed = parse_header_text(&text).unwrap();
        assert_eq!(reparsed, header);
    }

    #[test]
    fn test_empty_comment_round_trip() {
        let text = "@HD\tVN:1.6\n@CO\n@CO\tnote\n";
        let header = parse_header_text(text).unwrap();
        assert_eq!(header.lines()[1], HeaderLine::Comment(String::new()));
        assert_eq!(format_header_text(&header), text);
    }

    #[test]
    fn test_hd_written_first() {
        let header = parse_header_text("@SQ\tSN:chr1\tLN:10\n@HD\tVN:1.6\n").unwrap();
        assert_eq!(format_header_text(&header), "@HD\tVN:1.6\n@SQ\tSN:chr1\tLN:10\n");
    }

    #[test]
    fn test_invalid_md5_is_dropped() {
        let header = parse_header_text("@SQ\tSN:chr1\tLN:10\tM5:nope\n").unwrap();
        assert!(header.references()[0].md5.is_none());
    }

    #[test]
    fn test_missing_sn() {
        let err = parse_header_text("@SQ\tLN:10\n").unwrap_err();
        assert!(matches!(err, Error::InvalidHeader(_)));
    }

    #[test]
    fn test_bad_length() {
        assert!(parse_header_text("@SQ\tSN:chr1\tLN:0\n").is_err());
        assert!(parse_header_text("@SQ\tSN:chr1\tLN:2147483648\n").is_err());
        assert!(parse_header_text("@SQ\tSN:chr1\tLN:ten\n").is_err());
    }

    #[test]
    fn test_duplicate_reference() {
        let err = parse_header_text("@SQ\tSN:chr1\tLN:10\n@SQ\tSN:chr1\tLN:20\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateReference(name) if name == "chr1"));
    }

    #[test]
    fn test_malformed_lines() {
        assert!(parse_header_text("HD\tVN:1.6\n").is_err());
        assert!(parse_header_text("@H\n").is_err());
        assert!(parse_header_text("@HD VN:1.6\n").is_err());
        assert!(parse_header_text("@HD\tVN1.6\n").is_err());
        assert!(parse_header_text("@HD\tVN:1.6\n@HD\tVN:1.5\n").is_err());
    }

    #[test]
    fn test_crlf_lines() {
        let header = parse_header_text("@HD\tVN:1.6\r\n@SQ\tSN:chr1\tLN:10\r\n").unwrap();
        assert_eq!(header.references()[0].length, Some(10));
    }
}
