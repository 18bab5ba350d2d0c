//! Command handlers
//!
//! Each handler loads what it needs from the repository, performs one
//! operation, and saves the affected snapshot back when it mutated it.
//! Output goes to `out` so handlers can be exercised against a buffer.

use crate::render;
use anyhow::{Context, Result};
use dist_common::{
    AllocationConfig, Dataset, Error, LinkConfig, Organization, Piece, PieceCid, SpId,
    bytes_to_tib, tib_to_bytes,
};
use dist_placement::{AllocationRequest, allocate};
use dist_store::{Repo, import_pieces};
use std::io::Write;
use std::path::Path;
use tracing::info;

fn confirm(really_do_it: bool) -> Result<()> {
    if really_do_it {
        Ok(())
    } else {
        Err(Error::ConfirmationRequired.into())
    }
}

fn print_json<W: Write, T: serde::Serialize>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

// ---- org ----

pub fn org_view<W: Write>(repo: &Repo, json: bool, out: &mut W) -> Result<()> {
    let orgs = repo.load_orgs()?;
    if json {
        return print_json(out, &orgs);
    }
    render::orgs(out, &orgs)?;
    Ok(())
}

pub fn org_add<W: Write>(repo: &Repo, org: &str, sps: &str, force: bool, out: &mut W) -> Result<()> {
    let sps = SpId::parse_list(sps).map_err(Error::from)?;
    let mut orgs = repo.load_orgs()?;
    let replaced = orgs.insert(Organization::new(org, sps), force)?;
    repo.save_orgs(&orgs)?;
    info!(org, replaced, "saved org");
    writeln!(out, "add user {org} success!")?;
    Ok(())
}

pub fn org_delete<W: Write>(repo: &Repo, org: &str, really_do_it: bool, out: &mut W) -> Result<()> {
    confirm(really_do_it)?;
    let mut orgs = repo.load_orgs()?;
    if orgs.delete(org) {
        repo.save_orgs(&orgs)?;
        writeln!(out, "delete {org} success!")?;
    } else {
        writeln!(out, "delete {org} failed!!")?;
    }
    Ok(())
}

// ---- dataset ----

pub fn dataset_view<W: Write>(repo: &Repo, json: bool, out: &mut W) -> Result<()> {
    let datasets = repo.load_datasets()?;
    if json {
        return print_json(out, &datasets);
    }
    render::datasets(out, &datasets)?;
    Ok(())
}

pub fn dataset_add<W: Write>(
    repo: &Repo,
    name: &str,
    duplicate: u32,
    filepath: &Path,
    force: bool,
    out: &mut W,
) -> Result<()> {
    let mut dataset = Dataset::new(name, duplicate);
    dataset.pieces = import_pieces(filepath)
        .with_context(|| format!("failed to import dataset {name}"))?;

    let mut datasets = repo.load_datasets()?;
    let pieces = dataset.pieces.len();
    let replaced = datasets.insert(dataset, force)?;
    repo.save_datasets(&datasets)?;
    info!(dataset = name, pieces, replaced, "saved dataset");
    writeln!(out, "add dataset {name} success!")?;
    Ok(())
}

pub fn dataset_delete<W: Write>(repo: &Repo, name: &str, really_do_it: bool, out: &mut W) -> Result<()> {
    confirm(really_do_it)?;
    let mut datasets = repo.load_datasets()?;
    if datasets.delete(name) {
        repo.save_datasets(&datasets)?;
        writeln!(out, "delete dataset {name} success!")?;
    } else {
        writeln!(out, "delete dataset {name} failed!!!")?;
    }
    Ok(())
}

/// Inputs of `dataset get`
#[derive(Clone, Debug)]
pub struct GetArgs {
    pub name: String,
    pub sp: String,
    /// Target size in TiB
    pub size: f64,
    pub bounds: AllocationConfig,
    pub links: LinkConfig,
    pub json: bool,
    pub really_do_it: bool,
}

/// Select pieces for an SP, print their download links, and record the
/// assignments when confirmed. The selection is printed either way.
pub fn dataset_get<W: Write>(repo: &Repo, args: &GetArgs, out: &mut W) -> Result<()> {
    let sp = SpId::new(args.sp.as_str()).map_err(Error::from)?;
    let budget = tib_to_bytes(args.size);

    let mut datasets = repo.load_datasets()?;
    let orgs = repo.load_orgs()?;
    let siblings = orgs.siblings(&sp).to_vec();
    if siblings.is_empty() {
        return Err(Error::SpNotInAnyOrg(sp.to_string()).into());
    }

    let dataset = datasets.require_mut(&args.name)?;
    let request = AllocationRequest::new(sp, siblings, budget).with_bounds(args.bounds);
    let plan = allocate(dataset, &request)?;

    if args.json {
        print_json(out, &plan)?;
    } else {
        for cid in plan.cids() {
            writeln!(out, "{}", args.links.link(cid.as_str()))?;
        }
        writeln!(
            out,
            "total pieceSize:{}, total carSize: {}, missing pieceSize:{}",
            bytes_to_tib(plan.piece_size),
            bytes_to_tib(plan.car_size),
            bytes_to_tib(plan.shortfall()),
        )?;
    }

    confirm(args.really_do_it)?;
    repo.save_datasets(&datasets)?;
    Ok(())
}

// ---- piece ----

pub fn piece_view<W: Write>(repo: &Repo, name: &str, json: bool, out: &mut W) -> Result<()> {
    let datasets = repo.load_datasets()?;
    let dataset = datasets.require(name)?;
    if json {
        return print_json(out, dataset);
    }
    render::pieces(out, dataset)?;
    Ok(())
}

/// Inputs of `piece add`
#[derive(Clone, Debug)]
pub struct PieceAddArgs {
    pub name: String,
    pub piece_cid: String,
    pub piece_size: u64,
    pub car_size: u64,
    pub sps: String,
    pub force: bool,
}

pub fn piece_add<W: Write>(repo: &Repo, args: &PieceAddArgs, out: &mut W) -> Result<()> {
    let cid = PieceCid::new(args.piece_cid.as_str()).map_err(Error::from)?;
    let sps = SpId::parse_list(&args.sps).map_err(Error::from)?;
    let piece = Piece::with_sps(cid, args.piece_size, args.car_size, sps);

    let mut datasets = repo.load_datasets()?;
    let replaced = datasets.require_mut(&args.name)?.insert(piece, args.force)?;
    repo.save_datasets(&datasets)?;
    info!(dataset = %args.name, piece = %args.piece_cid, replaced, "saved piece");
    writeln!(out, "add piece {} success!", args.piece_cid)?;
    Ok(())
}

pub fn piece_delete<W: Write>(
    repo: &Repo,
    name: &str,
    piece_cid: &str,
    really_do_it: bool,
    out: &mut W,
) -> Result<()> {
    confirm(really_do_it)?;
    let cid = PieceCid::new_unchecked(piece_cid);
    let mut datasets = repo.load_datasets()?;
    if datasets.require_mut(name)?.delete(&cid) {
        repo.save_datasets(&datasets)?;
        writeln!(out, "delete piece {piece_cid} success!")?;
    } else {
        writeln!(out, "delete piece {piece_cid} failed!!!")?;
    }
    Ok(())
}
