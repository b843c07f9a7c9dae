//! Printable rendering of a hash for the card's text block.

/// Symbols used by [`hash_text`]; each byte selects `SYMBOLS[b % 46]`.
pub const SYMBOLS: &[u8; 46] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ1234567890!@#$%&*?+-";

/// Render `hash` as a roughly square block of space-separated symbols,
/// `floor(sqrt(len))` per line.
pub fn hash_text(hash: &[u8]) -> String {
    if hash.is_empty() {
        return String::new();
    }

    let width = (hash.len() as f64).sqrt() as usize;
    let width = width.max(1);

    hash.chunks(width)
        .map(|row| {
            row.iter()
                .map(|&b| (SYMBOLS[(b as usize) % SYMBOLS.len()] as char).to_string())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
