pub mod database;
pub mod decoy;
pub mod digest;
pub mod enzyme;
pub mod fasta;
pub mod floor;
pub mod mass;
pub mod modification;
pub mod peptide;

use std::path::Path;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Enzyme(#[from] enzyme::InvalidEnzymeSpec),
}

/// Read and parse a FASTA file. Record-level problems are returned alongside
/// the parsed proteins rather than failing the whole read.
pub fn read_fasta<P: AsRef<Path>>(
    path: P,
    decoy_tag: &str,
    max_len: usize,
    masses: &mass::MassTable,
) -> Result<(fasta::Fasta, Vec<fasta::Warning>), Error> {
    let contents = std::fs::read_to_string(path)?;
    Ok(fasta::Fasta::parse(&contents, decoy_tag, max_len, masses))
}

pub fn read_json<P, T>(path: P) -> Result<T, Error>
where
    P: AsRef<Path>,
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
