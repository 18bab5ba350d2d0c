//! Table rendering for the view commands

use dist_common::{Dataset, DatasetCatalog, OrgDirectory, SpId, bytes_to_gib, bytes_to_tib};
use std::io::{self, Write};

/// Write a left-aligned table; columns are as wide as their widest cell,
/// counted in characters.
fn write_table<W: Write>(out: &mut W, headers: &[&str], rows: &[Vec<String>]) -> io::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    writeln!(out, "{}", pad_row(headers.iter().copied(), &widths))?;
    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    writeln!(out, "{}", "-".repeat(total))?;
    for row in rows {
        writeln!(out, "{}", pad_row(row.iter().map(String::as_str), &widths))?;
    }
    Ok(())
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    padded.join("  ").trim_end().to_string()
}

fn sp_list<'a>(sps: impl Iterator<Item = &'a SpId>) -> String {
    serde_json::to_string(&sps.collect::<Vec<_>>()).unwrap_or_default()
}

pub fn orgs<W: Write>(out: &mut W, orgs: &OrgDirectory) -> io::Result<()> {
    if orgs.is_empty() {
        return writeln!(out, "No orgs found");
    }
    let rows: Vec<Vec<String>> = orgs
        .iter()
        .map(|o| vec![o.org.clone(), sp_list(o.sps.iter())])
        .collect();
    write_table(out, &["ORG", "SPS"], &rows)
}

pub fn datasets<W: Write>(out: &mut W, datasets: &DatasetCatalog) -> io::Result<()> {
    if datasets.is_empty() {
        return writeln!(out, "No datasets found");
    }
    let rows: Vec<Vec<String>> = datasets
        .iter()
        .map(|d| {
            vec![
                d.data_set_name.clone(),
                d.duplicate.to_string(),
                d.distinct_sps().to_string(),
                d.pieces.len().to_string(),
                bytes_to_tib(d.total_piece_size()).to_string(),
                bytes_to_tib(d.total_car_size()).to_string(),
            ]
        })
        .collect();
    write_table(
        out,
        &[
            "DATASET",
            "DUPLICATE",
            "SPS",
            "PIECES",
            "PIECE SIZE (TiB)",
            "CAR SIZE (TiB)",
        ],
        &rows,
    )
}

pub fn pieces<W: Write>(out: &mut W, dataset: &Dataset) -> io::Result<()> {
    if dataset.pieces.is_empty() {
        return writeln!(out, "No pieces found in dataset {}", dataset.data_set_name);
    }
    let rows: Vec<Vec<String>> = dataset
        .pieces
        .iter()
        .map(|p| {
            vec![
                p.piece_cid.to_string(),
                bytes_to_gib(p.piece_size).to_string(),
                bytes_to_gib(p.car_size).to_string(),
                sp_list(p.sps()),
            ]
        })
        .collect();
    write_table(
        out,
        &["PIECE CID", "PIECE SIZE (GiB)", "CAR SIZE (GiB)", "SPS"],
        &rows,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dist_common::{GIB, Organization, Piece, PieceCid};

    fn render(f: impl FnOnce(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_orgs_table() {
        let mut dir = OrgDirectory::new();
        dir.add(Organization::new(
            "ORG",
            vec![SpId::new_unchecked("f01"), SpId::new_unchecked("f02")],
        ));
        let text = render(|out| orgs(out, &dir));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ORG  SPS");
        assert_eq!(lines[2], r#"ORG  ["f01","f02"]"#);
    }

    #[test]
    fn test_non_ascii_names_stay_aligned() {
        let mut dir = OrgDirectory::new();
        dir.add(Organization::new("数据联盟", vec![SpId::new_unchecked("f01")]));
        dir.add(Organization::new("ORG", vec![SpId::new_unchecked("f02")]));
        let text = render(|out| orgs(out, &dir));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "ORG   SPS");
        assert_eq!(lines[1], "-".repeat(13));
        assert_eq!(lines[2], r#"数据联盟  ["f01"]"#);
        assert_eq!(lines[3], r#"ORG   ["f02"]"#);
    }

    #[test]
    fn test_empty_views() {
        assert_eq!(render(|out| orgs(out, &OrgDirectory::new())), "No orgs found\n");
        assert_eq!(
            render(|out| datasets(out, &DatasetCatalog::new())),
            "No datasets found\n"
        );
    }

    #[test]
    fn test_pieces_table_sizes_in_gib() {
        let mut ds = Dataset::new("D", 2);
        ds.add(Piece::with_sps(
            PieceCid::new_unchecked("baga1"),
            32 * GIB,
            GIB / 2,
            vec![SpId::new_unchecked("f01")],
        ));
        let text = render(|out| pieces(out, &ds));
        let row = text.lines().nth(2).unwrap();
        let cells: Vec<_> = row.split_whitespace().collect();
        assert_eq!(cells, vec!["baga1", "32", "0.5", r#"["f01"]"#]);
    }
}
