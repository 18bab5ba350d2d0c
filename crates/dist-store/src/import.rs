//! Line-delimited dataset descriptions
//!
//! Each non-blank line is one JSON object describing a piece:
//! `{"pieceCid": "...", "pieceSize": 34359738368, "carSize": 18253611008}`.
//! Imported pieces start with no SP assignments. A CID may appear only
//! once per file.

use crate::error::{StoreError, StoreResult};
use dist_common::{Piece, PieceCid};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct PieceDescription {
    piece_cid: String,
    piece_size: u64,
    car_size: u64,
}

/// Read a piece description file
pub fn import_pieces(path: &Path) -> StoreResult<Vec<Piece>> {
    let file = File::open(path).map_err(|e| StoreError::io(path, e))?;
    let pieces = parse_pieces(BufReader::new(file), path)?;
    debug!(path = %path.display(), pieces = pieces.len(), "imported piece descriptions");
    Ok(pieces)
}

/// Parse piece descriptions from `reader`; `origin` names the source in errors
pub fn parse_pieces<R: BufRead>(reader: R, origin: &Path) -> StoreResult<Vec<Piece>> {
    let mut pieces = Vec::new();
    let mut seen = HashSet::new();
    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line.map_err(|e| StoreError::io(origin, e))?;
        if line.trim().is_empty() {
            continue;
        }
        let desc: PieceDescription =
            serde_json::from_str(&line).map_err(|source| StoreError::Import {
                path: origin.to_path_buf(),
                line: line_no,
                source,
            })?;
        let cid = PieceCid::new(desc.piece_cid).map_err(|source| StoreError::InvalidCid {
            path: origin.to_path_buf(),
            line: line_no,
            source,
        })?;
        if !seen.insert(cid.clone()) {
            return Err(StoreError::DuplicateCid {
                path: origin.to_path_buf(),
                line: line_no,
                cid,
            });
        }
        pieces.push(Piece::new(cid, desc.piece_size, desc.car_size));
    }
    Ok(pieces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(input: &str) -> StoreResult<Vec<Piece>> {
        parse_pieces(Cursor::new(input), Path::new("pieces.txt"))
    }

    #[test]
    fn test_parse_pieces_in_order() {
        let input = concat!(
            r#"{"pieceCid":"baga1","pieceSize":34359738368,"carSize":18253611008}"#,
            "\n\n",
            r#"{"pieceCid":"baga2","pieceSize":17179869184,"carSize":9126805504}"#,
            "\n",
        );
        let pieces = parse(input).unwrap();
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].piece_cid.as_str(), "baga1");
        assert_eq!(pieces[0].piece_size, 34_359_738_368);
        assert_eq!(pieces[1].car_size, 9_126_805_504);
        assert!(pieces.iter().all(|p| p.sp_infos.is_empty()));
    }

    #[test]
    fn test_bad_line_reports_line_number() {
        let input = concat!(
            r#"{"pieceCid":"baga1","pieceSize":1,"carSize":1}"#,
            "\n",
            r#"{"pieceCid":"baga2","pieceSize":1}"#,
        );
        match parse(input).unwrap_err() {
            StoreError::Import { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_repeated_cid_reports_line_number() {
        let input = concat!(
            r#"{"pieceCid":"baga1","pieceSize":1,"carSize":1}"#,
            "\n",
            r#"{"pieceCid":"baga2","pieceSize":1,"carSize":1}"#,
            "\n\n",
            r#"{"pieceCid":"baga1","pieceSize":1,"carSize":1}"#,
        );
        match parse(input).unwrap_err() {
            StoreError::DuplicateCid { line, cid, .. } => {
                assert_eq!(line, 4);
                assert_eq!(cid.as_str(), "baga1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_assignments_in_description_rejected() {
        let input = r#"{"pieceCid":"baga1","pieceSize":1,"carSize":1,"spInfos":[]}"#;
        assert!(matches!(parse(input), Err(StoreError::Import { line: 1, .. })));
    }

    #[test]
    fn test_empty_cid_rejected() {
        let input = r#"{"pieceCid":"","pieceSize":1,"carSize":1}"#;
        assert!(matches!(parse(input), Err(StoreError::InvalidCid { line: 1, .. })));
    }

    #[test]
    fn test_import_missing_file() {
        let err = import_pieces(Path::new("/nonexistent/pieces.txt")).unwrap_err();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
