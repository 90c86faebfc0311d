//! Result printing

use std::io::{self, Write};

use digestmap_core::ResultMap;

/// Lines of `<hexdigest>\t<relative path>`, sorted by path
#[must_use]
pub fn format_lines(map: &ResultMap) -> Vec<String> {
    let mut entries: Vec<_> = map.iter().collect();
    entries.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    entries
        .into_iter()
        .map(|(path, hex)| format!("{hex}\t{path}"))
        .collect()
}

/// Write the sorted result lines
///
/// # Errors
/// Returns an error if writing to `out` fails.
pub fn write_map<W: Write>(out: &mut W, map: &ResultMap) -> io::Result<()> {
    for line in format_lines(map) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
