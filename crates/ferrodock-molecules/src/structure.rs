//! Atom coordinates of a selected residue, read from PDB-format files.
//!
//! Only `ATOM`/`HETATM` records are read, using the fixed PDB columns
//! (residue name 18-20, chain 22, x/y/z 31-54). The same layout applies to
//! PDBQT files, so prepared ligands can be read too.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{DockError, Result};

/// A position in ångström.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AtomCoordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl AtomCoordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

/// Residue name plus optional chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueSelector {
    pub name: String,
    pub chain: Option<char>,
}

impl ResidueSelector {
    pub fn new(name: impl Into<String>, chain: Option<char>) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }

    fn matches_name(&self, resn: &str) -> bool {
        resn == self.name
    }
}

impl fmt::Display for ResidueSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chain {
            Some(c) => write!(f, "{}/{}", c, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Read the coordinates of every atom of `selector` from a structure file.
pub async fn extract_ligand_coordinates(path: &Path, selector: &ResidueSelector) -> Result<Vec<AtomCoordinate>> {
    debug!("Reading {} coordinates from {:?}", selector, path);
    let content = tokio::fs::read_to_string(path).await?;
    coordinates_from_pdb(&content, selector)
}

/// Parse PDB text and return the coordinates of `selector`, in file order.
///
/// Without a chain the residue name must occur in exactly one chain,
/// otherwise the selection is ambiguous. Only the first model is read and
/// alternate locations other than blank/`A` are ignored.
pub fn coordinates_from_pdb(content: &str, selector: &ResidueSelector) -> Result<Vec<AtomCoordinate>> {
    // (chain, coordinate) for every matching atom
    let mut matched: Vec<(char, AtomCoordinate)> = Vec::new();

    for (lineno, line) in content.lines().enumerate() {
        if line.starts_with("ENDMDL") {
            break;
        }
        let Some(record) = AtomRecord::parse(line) else {
            continue;
        };
        if !selector.matches_name(record.resn) {
            continue;
        }
        if !matches!(record.alt_loc, ' ' | 'A') {
            continue;
        }
        if let Some(chain) = selector.chain {
            if record.chain != chain {
                continue;
            }
        }
        match record.coordinate() {
            Some(coord) => matched.push((record.chain, coord)),
            None => warn!(line = lineno + 1, "Skipping atom record with unreadable coordinates"),
        }
    }

    if matched.is_empty() {
        return Err(DockError::SelectionNotFound {
            residue: selector.name.clone(),
            chain: selector.chain,
        });
    }

    if selector.chain.is_none() {
        let mut chains: Vec<char> = Vec::new();
        for (chain, _) in &matched {
            if !chains.contains(chain) {
                chains.push(*chain);
            }
        }
        if chains.len() > 1 {
            return Err(DockError::AmbiguousSelection {
                residue: selector.name.clone(),
                chains,
            });
        }
    }

    Ok(matched.into_iter().map(|(_, coord)| coord).collect())
}

/// Borrowed view of one `ATOM`/`HETATM` line.
struct AtomRecord<'a> {
    line: &'a str,
    alt_loc: char,
    resn: &'a str,
    chain: char,
}

impl<'a> AtomRecord<'a> {
    fn parse(line: &'a str) -> Option<Self> {
        if !(line.starts_with("ATOM") || line.starts_with("HETATM")) {
            return None;
        }
        let alt_loc = line.get(16..17)?.chars().next()?;
        let resn = line.get(17..20)?.trim();
        let chain = line.get(21..22)?.chars().next()?;
        Some(Self {
            line,
            alt_loc,
            resn,
            chain,
        })
    }

    fn coordinate(&self) -> Option<AtomCoordinate> {
        let field = |range: std::ops::Range<usize>| -> Option<f64> {
            self.line.get(range)?.trim().parse::<f64>().ok()
        };
        Some(AtomCoordinate::new(field(30..38)?, field(38..46)?, field(46..54)?))
    }
}
