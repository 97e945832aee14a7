//! Output manifest: which runs are stitched into which render.

use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::media::VisualFilter;
use super::parser::RunCode;

/// One output declared in the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    /// Output name, without extension
    pub name: String,

    /// Visual filters applied to every video leg of this output
    pub filters: Vec<VisualFilter>,

    /// Runs to stitch, in playback order
    pub runs: Vec<RunCode>,
}

/// Read an output manifest from disk
pub fn read_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<OutputSpec>> {
    let content = std::fs::read_to_string(path.as_ref())?;
    Ok(parse_manifest(&content))
}

/// Parse alternating `<name> [filters...]` / `<run>,<run>,...` lines
///
/// Blank lines and `#` comments are skipped. Unknown filters and malformed
/// run codes are logged and dropped.
pub fn parse_manifest(content: &str) -> Vec<OutputSpec> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect();

    let mut specs = Vec::with_capacity(lines.len() / 2);
    for pair in lines.chunks(2) {
        let [header, runs] = pair else {
            warn!("Manifest output {:?} has no run list", pair[0]);
            continue;
        };

        let mut fields = header.split_whitespace();
        let Some(name) = fields.next() else {
            continue;
        };

        let filters = fields
            .filter_map(|spec| {
                let filter = VisualFilter::parse(spec);
                if filter.is_none() {
                    warn!("Unknown filter {:?} for output {}", spec, name);
                }
                filter
            })
            .collect();

        let runs = runs
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .filter_map(|code| match code.parse::<RunCode>() {
                Ok(run) => Some(run),
                Err(_) => {
                    warn!("Invalid run code {:?} for output {}", code, name);
                    None
                }
            })
            .collect();

        specs.push(OutputSpec {
            name: name.to_string(),
            filters,
            runs,
        });
    }

    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pairs_with_blank_separators() {
        let content = "\
final_ab
ab1, ab2

final_cd
CD3
";
        let specs = parse_manifest(content);

        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "final_ab");
        assert_eq!(specs[0].runs, vec![RunCode::new("ab", 1), RunCode::new("ab", 2)]);
        assert_eq!(specs[1].runs, vec![RunCode::new("cd", 3)]);
    }

    #[test]
    fn test_filters_on_header_line() {
        let content = "rotated transpose=1 sharpen=2 crop=640:480:0:0\nab1\n";
        let specs = parse_manifest(content);

        assert_eq!(
            specs[0].filters,
            vec![
                VisualFilter::Transpose { dir: 1 },
                VisualFilter::Crop { width: 640, height: 480, x: 0, y: 0 },
            ]
        );
    }

    #[test]
    fn test_invalid_codes_and_dangling_header() {
        let content = "# outputs\nout\nab1,??,12\ndangling\n";
        let specs = parse_manifest(content);

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].runs, vec![RunCode::new("ab", 1)]);
    }

    #[test]
    fn test_read_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        std::fs::write(&path, "out\nab1\n").unwrap();

        assert_eq!(read_manifest(&path).unwrap().len(), 1);
        assert!(read_manifest(dir.path().join("missing.txt")).is_err());
    }
}
