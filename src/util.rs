use std::fmt::Write;

/// Classic 16-bytes-per-line hex dump with an ASCII gutter.
///
/// `start_offset` is added to the printed offsets, so a payload can be shown
/// at its position inside the enclosing buffer.
pub fn hex_dump(bytes: &[u8], start_offset: usize) -> String {
    let mut out = String::new();
    for (i, chunk) in bytes.chunks(16).enumerate() {
        let offs = start_offset + i * 16;
        let hexs: String = chunk.iter().map(|b| format!("{:02x} ", b)).collect();
        let ascii: String = chunk
            .iter()
            .map(|&c| if (32..=126).contains(&c) { c as char } else { '.' })
            .collect();
        let _ = writeln!(out, "{:08x}  {:<48}  |{}|", offs, hexs, ascii);
    }
    out
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
pub fn truncate_text(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut t: String = s.chars().take(max.saturating_sub(3)).collect();
    t.push_str("...");
    t
}
