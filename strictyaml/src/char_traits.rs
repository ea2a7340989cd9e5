//! Byte-class helpers shared by the scanner and the emitters.

/// Whether `b` starts an end of line (`\n` or `\r`).
#[inline]
pub(crate) fn is_break(b: u8) -> bool {
    b == b'\n' || b == b'\r'
}

/// Whether `b` is an inline blank (space or tab).
#[inline]
pub(crate) fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

/// Whether `scalar` can be written as a literal block and read back unchanged.
///
/// Block lines are reproduced verbatim under the block indent, so a carriage return cannot be
/// represented, a line whose first non-space character is a tab would be read as indentation,
/// and a whitespace-only last line would fall to the strip chomp.
pub(crate) fn is_valid_literal_block_scalar(scalar: &str) -> bool {
    if scalar.contains('\r') {
        return false;
    }
    if scalar
        .split('\n')
        .any(|line| line.trim_start_matches(' ').starts_with('\t'))
    {
        return false;
    }
    if !scalar.ends_with('\n') {
        if let Some(last) = scalar.split('\n').next_back() {
            if !last.is_empty() && last.bytes().all(|b| b == b' ') {
                return false;
            }
        }
    }
    true
}
