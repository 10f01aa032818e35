use std::sync::Arc;

use crate::core::cigar::Cigar;
use crate::core::flags::{FlagFormat, Flags};
use crate::core::header::Header;
use crate::core::record::{Aux, Record};
use crate::core::reference::{Binding, Reference, UNMAPPED_NAME};
use crate::error::{Error, Result};
use crate::utils::validation::{is_valid_reference_name, valid_pos, valid_tmplt_len};

/// Number of mandatory tab-separated fields on an alignment line.
const MANDATORY_FIELDS: usize = 11;

const MAX_QUAL: u8 = 93;
const QUAL_OFFSET: u8 = 33;

/// Decode one SAM alignment line.
///
/// Format: QNAME FLAG RNAME POS MAPQ CIGAR RNEXT PNEXT TLEN SEQ QUAL [TAGS]
///
/// # Errors
///
/// Returns `Error::InvalidRecord` if any field is malformed or out of range,
/// or if `header` is given and does not contain a named reference.
pub fn decode_record(header: Option<&Header>, line: &[u8]) -> Result<Record> {
    let line = std::str::from_utf8(line).map_err(|_| Error::record("line is not valid UTF-8"))?;
    let fields: Vec<&str> = line.split('\t').collect();

    if fields.len() < MANDATORY_FIELDS {
        return Err(Error::record(format!(
            "expected at least {MANDATORY_FIELDS} fields, found {}",
            fields.len()
        )));
    }

    let name = parse_qname(fields[0])?;
    let flags = Flags::parse(fields[1])?;
    let reference = parse_binding(header, fields[2])?;
    let pos = parse_pos(fields[3], "POS")?;
    let mapq: u8 = fields[4]
        .parse()
        .map_err(|_| Error::record(format!("invalid MAPQ: {:?}", fields[4])))?;
    let cigar = Cigar::parse(fields[5])?;
    let mate_reference = if fields[6] == "=" {
        reference.clone()
    } else {
        parse_binding(header, fields[6])?
    };
    let mate_pos = parse_pos(fields[7], "PNEXT")?;
    let template_len = parse_template_len(fields[8])?;
    let seq = parse_seq(fields[9])?;
    let qual = parse_qual(fields[10])?;

    check_qual_len(&seq, &qual)?;

    let aux = fields[MANDATORY_FIELDS..]
        .iter()
        .map(|f| Aux::parse(f))
        .collect::<Result<Vec<_>>>()?;

    Ok(Record {
        name,
        flags,
        reference,
        pos,
        mapq,
        cigar,
        mate_reference,
        mate_pos,
        template_len,
        seq,
        qual,
        aux,
    })
}

fn parse_qname(s: &str) -> Result<String> {
    if s == "*" {
        return Ok(String::new());
    }
    validate_qname(s)?;
    Ok(s.to_string())
}

/// QNAME grammar: 1 to 254 printable characters, none of them `@`.
fn validate_qname(s: &str) -> Result<()> {
    let valid = (1..=254).contains(&s.len())
        && s.bytes().all(|b| (b'!'..=b'~').contains(&b) && b != b'@');
    if !valid {
        return Err(Error::record(format!("invalid QNAME: {s:?}")));
    }
    Ok(())
}

fn validate_seq(seq: &[u8]) -> Result<()> {
    if !seq.iter().all(|&b| b.is_ascii_alphabetic() || b == b'=' || b == b'.') {
        return Err(Error::record(format!(
            "invalid SEQ: {:?}",
            String::from_utf8_lossy(seq)
        )));
    }
    Ok(())
}

/// QUAL is either absent or one score per base.
fn check_qual_len(seq: &[u8], qual: &[u8]) -> Result<()> {
    if !qual.is_empty() && qual.len() != seq.len() {
        return Err(Error::record(format!(
            "QUAL length {} does not match SEQ length {}",
            qual.len(),
            seq.len()
        )));
    }
    Ok(())
}

fn parse_binding(header: Option<&Header>, name: &str) -> Result<Binding> {
    if name == UNMAPPED_NAME {
        return Ok(Binding::Unmapped);
    }
    match header {
        Some(header) => header
            .reference(name)
            .map(|r| Binding::Mapped(Arc::clone(r)))
            .ok_or_else(|| Error::record(format!("reference {name:?} not found in header"))),
        None => {
            if !is_valid_reference_name(name) {
                return Err(Error::record(format!("invalid reference name: {name:?}")));
            }
            Ok(Binding::Mapped(Arc::new(Reference::unregistered(name))))
        }
    }
}

/// One-based text position to zero-based; `0` becomes `-1`.
fn parse_pos(s: &str, field: &str) -> Result<i32> {
    let pos: i64 = s
        .parse()
        .map_err(|_| Error::record(format!("invalid {field}: {s:?}")))?;
    let pos = pos - 1;
    if !valid_pos(pos) {
        return Err(Error::record(format!("{field} out of range: {s}")));
    }
    #[allow(clippy::cast_possible_truncation)]
    let pos = pos as i32;
    Ok(pos)
}

fn parse_template_len(s: &str) -> Result<i32> {
    let tlen: i64 = s
        .parse()
        .map_err(|_| Error::record(format!("invalid TLEN: {s:?}")))?;
    if !valid_tmplt_len(tlen) {
        return Err(Error::record(format!("TLEN out of range: {s}")));
    }
    #[allow(clippy::cast_possible_truncation)]
    let tlen = tlen as i32;
    Ok(tlen)
}

fn parse_seq(s: &str) -> Result<Vec<u8>> {
    if s == "*" {
        return Ok(Vec::new());
    }
    validate_seq(s.as_bytes())?;
    Ok(s.as_bytes().to_vec())
}

fn parse_qual(s: &str) -> Result<Vec<u8>> {
    if s == "*" {
        return Ok(Vec::new());
    }
    s.bytes()
        .map(|b| {
            if (QUAL_OFFSET..=QUAL_OFFSET + MAX_QUAL).contains(&b) {
                Ok(b - QUAL_OFFSET)
            } else {
                Err(Error::record(format!("invalid QUAL character {:?}", char::from(b))))
            }
        })
        .collect()
}

/// Encode a record as one SAM line, without a line terminator.
///
/// RNEXT is written as `=` when it names the same reference as RNAME.
///
/// # Errors
///
/// Returns `Error::InvalidRecord` for anything [`decode_record`] would
/// reject: an out-of-range position, a QNAME outside the SAM grammar, bases
/// outside the SEQ alphabet, a QUAL/SEQ length mismatch, a quality above 93,
/// or a flag that cannot be rendered in `format`.
pub fn encode_record(record: &Record, format: FlagFormat) -> Result<Vec<u8>> {
    for (field, pos) in [("POS", record.pos), ("PNEXT", record.mate_pos)] {
        if !valid_pos(i64::from(pos)) {
            return Err(Error::record(format!("{field} out of range: {pos}")));
        }
    }
    if !record.name.is_empty() {
        validate_qname(&record.name)?;
    }
    validate_seq(&record.seq)?;
    check_qual_len(&record.seq, &record.qual)?;

    let mut fields: Vec<String> = Vec::with_capacity(MANDATORY_FIELDS + record.aux.len());

    fields.push(if record.name.is_empty() {
        "*".to_string()
    } else {
        record.name.clone()
    });
    fields.push(record.flags.format(format)?);
    fields.push(record.reference.name().to_string());
    fields.push((i64::from(record.pos) + 1).to_string());
    fields.push(record.mapq.to_string());
    fields.push(record.cigar.to_string());
    fields.push(mate_reference_name(record).to_string());
    fields.push((i64::from(record.mate_pos) + 1).to_string());
    fields.push(record.template_len.to_string());
    fields.push(if record.seq.is_empty() {
        "*".to_string()
    } else {
        String::from_utf8_lossy(&record.seq).into_owned()
    });
    fields.push(encode_qual(&record.qual)?);
    fields.extend(record.aux.iter().map(ToString::to_string));

    Ok(fields.join("\t").into_bytes())
}

fn mate_reference_name(record: &Record) -> &str {
    match (&record.reference, &record.mate_reference) {
        (Binding::Mapped(a), Binding::Mapped(b)) if Arc::ptr_eq(a, b) || a.name == b.name => "=",
        (_, mate) => mate.name(),
    }
}

fn encode_qual(qual: &[u8]) -> Result<String> {
    if qual.is_empty() {
        return Ok("*".to_string());
    }
    qual.iter()
        .map(|&q| {
            if q <= MAX_QUAL {
                Ok(char::from(q + QUAL_OFFSET))
            } else {
                Err(Error::record(format!("quality {q} exceeds {MAX_QUAL}")))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cigar::CigarOpKind;
    use crate::core::record::AuxValue;

    fn header() -> Header {
        Header::parse_text("@SQ\tSN:chr1\tLN:1000\n@SQ\tSN:chr2\tLN:2000\n").unwrap()
    }

    const LINE: &[u8] =
        b"read1\t99\tchr1\t100\t60\t4M\t=\t200\t104\tACGT\tIIII\tNM:i:0\tRG:Z:grp1";

    #[test]
    fn test_decode_with_header() {
        let header = header();
        let record = decode_record(Some(&header), LINE).unwrap();

        assert_eq!(record.name, "read1");
        assert_eq!(record.flags, Flags(99));
        assert!(Arc::ptr_eq(
            record.reference.reference().unwrap(),
            header.reference("chr1").unwrap()
        ));
        assert!(record.reference.same_reference(&record.mate_reference));
        assert_eq!(record.pos, 99);
        assert_eq!(record.mapq, 60);
        assert_eq!(record.cigar.ops()[0].kind, CigarOpKind::Match);
        assert_eq!(record.mate_pos, 199);
        assert_eq!(record.template_len, 104);
        assert_eq!(record.seq, b"ACGT");
        assert_eq!(record.qual, vec![40, 40, 40, 40]);
        assert_eq!(record.aux(b"RG"), Some(&AuxValue::String("grp1".to_string())));
    }

    #[test]
    fn test_decode_without_header() {
        let record = decode_record(None, LINE).unwrap();
        let reference = record.reference.reference().unwrap();
        assert_eq!(reference.name, "chr1");
        assert_eq!(reference.index, None);
        assert!(record.reference.same_reference(&record.mate_reference));
    }

    #[test]
    fn test_decode_unknown_reference() {
        let header = header();
        let line = b"r\t0\tchr9\t1\t0\t*\t*\t0\t0\t*\t*";
        assert!(matches!(
            decode_record(Some(&header), line),
            Err(Error::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_decode_unmapped() {
        let record = decode_record(None, b"r\t4\t*\t0\t255\t*\t*\t0\t0\tACGT\t*").unwrap();
        assert_eq!(record.reference, Binding::Unmapped);
        assert_eq!(record.mate_reference, Binding::Unmapped);
        assert_eq!(record.pos, -1);
        assert!(record.qual.is_empty());
    }

    #[test]
    fn test_decode_errors() {
        let header = header();
        let bad: &[&[u8]] = &[
            b"",
            b"r\t0\tchr1\t1\t0\t*\t*\t0\t0\t*",
            b"r\tx\tchr1\t1\t0\t*\t*\t0\t0\t*\t*",
            b"r\t0\tchr1\t-5\t0\t*\t*\t0\t0\t*\t*",
            b"r\t0\tchr1\t2147483648\t0\t*\t*\t0\t0\t*\t*",
            b"r\t0\tchr1\t1\t256\t*\t*\t0\t0\t*\t*",
            b"r\t0\tchr1\t1\t0\t*\t*\t0\t2147483648\t*\t*",
            b"r\t0\tchr1\t1\t0\t*\t*\t0\t0\tAC GT\t*",
            b"r\t0\tchr1\t1\t0\t*\t*\t0\t0\tACGT\tIII",
            b"r\t0\tchr1\t1\t0\t*\t*\t0\t0\t*\t*\tNM:i",
            b"@r\t0\tchr1\t1\t0\t*\t*\t0\t0\t*\t*",
        ];
        for line in bad {
            assert!(
                decode_record(Some(&header), line).is_err(),
                "{}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[test]
    fn test_encode_round_trip() {
        let header = header();
        let record = decode_record(Some(&header), LINE).unwrap();
        let encoded = encode_record(&record, FlagFormat::Decimal).unwrap();
        assert_eq!(encoded, LINE);

        let decoded = decode_record(Some(&header), &encoded).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn test_encode_flag_formats() {
        let header = header();
        let record = decode_record(Some(&header), LINE).unwrap();

        let hex = encode_record(&record, FlagFormat::Hex).unwrap();
        assert!(hex.starts_with(b"read1\t0x63\tchr1"));

        let string = encode_record(&record, FlagFormat::String).unwrap();
        assert!(string.starts_with(b"read1\tpP---R1-----\tchr1"));
        assert_eq!(decode_record(Some(&header), &string).unwrap(), record);
    }

    #[test]
    fn test_encode_distinct_mate() {
        let header = header();
        let line = b"r\t1\tchr1\t10\t30\t2M\tchr2\t50\t0\tAC\t!!";
        let record = decode_record(Some(&header), line).unwrap();
        assert_eq!(encode_record(&record, FlagFormat::Decimal).unwrap(), line);
    }

    #[test]
    fn test_encode_rejects_bad_fields() {
        let record = Record {
            qual: vec![94],
            seq: b"A".to_vec(),
            ..Record::default()
        };
        assert!(encode_record(&record, FlagFormat::Decimal).is_err());

        let record = Record {
            pos: i32::MAX,
            ..Record::default()
        };
        assert!(encode_record(&record, FlagFormat::Decimal).is_err());

        let record = Record {
            flags: Flags(0x1000),
            ..Record::default()
        };
        assert!(encode_record(&record, FlagFormat::String).is_err());
        assert!(encode_record(&record, FlagFormat::Decimal).is_ok());
    }

    #[test]
    fn test_encode_rejects_what_decode_rejects() {
        let bad = [
            Record {
                name: "@rg".to_string(),
                ..Record::default()
            },
            Record {
                name: "a b".to_string(),
                ..Record::default()
            },
            Record {
                name: "x".repeat(255),
                ..Record::default()
            },
            Record {
                seq: b"AC GT".to_vec(),
                ..Record::default()
            },
            Record {
                seq: b"ACGT".to_vec(),
                qual: vec![30; 3],
                ..Record::default()
            },
        ];
        for record in &bad {
            assert!(
                matches!(
                    encode_record(record, FlagFormat::Decimal),
                    Err(Error::InvalidRecord(_))
                ),
                "{record:?}"
            );
        }
    }

    #[test]
    fn test_encoded_records_decode() {
        let record = Record {
            name: "x".repeat(254),
            seq: b"AC=.n".to_vec(),
            qual: vec![0, 10, 20, 30, 93],
            ..Record::default()
        };
        let encoded = encode_record(&record, FlagFormat::Decimal).unwrap();
        assert_eq!(decode_record(None, &encoded).unwrap(), record);

        let record = Record {
            seq: b"ACGT".to_vec(),
            ..Record::default()
        };
        let encoded = encode_record(&record, FlagFormat::Decimal).unwrap();
        assert_eq!(decode_record(None, &encoded).unwrap(), record);
    }

    #[test]
    fn test_encode_default_record() {
        let encoded = encode_record(&Record::default(), FlagFormat::Decimal).unwrap();
        assert_eq!(encoded, b"*\t0\t*\t0\t255\t*\t*\t0\t0\t*\t*");
    }
}
