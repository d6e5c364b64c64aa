use crate::stream::extract::types::{ExtractConfig, FieldDecodeAnomaly};

/// Read the fixed-offset identifier.
///
/// Non-ASCII bytes are dropped and NULs trimmed from both ends. The result is
/// rejected when empty or made only of whitespace.
pub fn extract_identifier(frame: &[u8], cfg: &ExtractConfig) -> Result<String, FieldDecodeAnomaly> {
    let Some(field) = frame.get(cfg.identifier_start..cfg.identifier_end) else {
        return Err(FieldDecodeAnomaly::FrameTooShort { len: frame.len() });
    };

    let ascii: String = field
        .iter()
        .filter(|b| b.is_ascii())
        .map(|&b| char::from(b))
        .collect();
    let trimmed = ascii.trim_matches('\0');

    if trimmed.is_empty() || trimmed.chars().all(is_ascii_space) {
        return Err(FieldDecodeAnomaly::BlankIdentifier);
    }
    Ok(trimmed.to_owned())
}

// Includes the 0x1C..=0x1F separators, which `char::is_whitespace` does not.
#[inline]
fn is_ascii_space(c: char) -> bool {
    matches!(c, ' ' | '\t'..='\r' | '\x1c'..='\x1f')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with_field(field: &[u8; 11]) -> Vec<u8> {
        let mut f = vec![0xBB, 0x0B, 0x00, 0x00, 1, 2, 3, 4, 5];
        f.extend_from_slice(field);
        f
    }

    #[test]
    fn separators_count_as_blank() {
        let f = frame_with_field(b"\x1c\x1d\x1e\x1f \t\n\r\x0b\x0c ");
        assert_eq!(
            extract_identifier(&f, &ExtractConfig::default()),
            Err(FieldDecodeAnomaly::BlankIdentifier)
        );
    }

    #[test]
    fn inner_spaces_are_kept() {
        let f = frame_with_field(b"\0AB 12\0\0\0\0\0");
        assert_eq!(extract_identifier(&f, &ExtractConfig::default()).unwrap(), "AB 12");
    }
}
