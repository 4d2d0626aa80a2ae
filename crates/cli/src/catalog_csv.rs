//! Plain CSV sky catalogs: `name,ra_deg,dec_deg[,tags]`
//!
//! Tags are `;`-separated inside the fourth column. Blank lines and lines
//! starting with `#` are skipped, as is a header row whose first column is
//! `name`.

use anyhow::{bail, Context, Result};
use noisetag_algorithms::catalog::SkySource;
use std::fs;
use std::path::Path;

const HEADER: &str = "name,ra_deg,dec_deg,tags";

pub fn read_catalog(path: &Path) -> Result<Vec<SkySource>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog {}", path.display()))?;
    parse_catalog(&text).with_context(|| format!("Malformed catalog {}", path.display()))
}

pub fn write_catalog(path: &Path, sources: &[SkySource]) -> Result<()> {
    fs::write(path, format_catalog(sources))
        .with_context(|| format!("Failed to write catalog {}", path.display()))
}

pub fn parse_catalog(text: &str) -> Result<Vec<SkySource>> {
    let mut sources = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields[0].eq_ignore_ascii_case("name") {
            continue;
        }
        if !(3..=4).contains(&fields.len()) {
            bail!("line {}: expected 3 or 4 columns, found {}", idx + 1, fields.len());
        }
        let ra: f64 = fields[1]
            .parse()
            .with_context(|| format!("line {}: bad RA '{}'", idx + 1, fields[1]))?;
        let dec: f64 = fields[2]
            .parse()
            .with_context(|| format!("line {}: bad Dec '{}'", idx + 1, fields[2]))?;

        let mut source = SkySource::new(fields[0], ra, dec);
        if let Some(tags) = fields.get(3) {
            source.tags = tags
                .split(';')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect();
        }
        sources.push(source);
    }
    Ok(sources)
}

pub fn format_catalog(sources: &[SkySource]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for s in sources {
        out.push_str(&format!("{},{},{},{}\n", s.name, s.ra, s.dec, s.tags.join(";")));
    }
    out
}
