use std::{
    collections::HashMap,
    fmt::{Display, Write},
    str::FromStr,
};

use serde::Serialize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ModificationSpecificity {
    PeptideN,
    PeptideC,
    ProteinN,
    ProteinC,
    Residue(u8),
}

impl ModificationSpecificity {
    /// Position of this specificity in a 128-entry lookup table. Terminal
    /// specificities are stored under their marker characters.
    pub fn key(&self) -> u8 {
        match self {
            ModificationSpecificity::PeptideN => b'^',
            ModificationSpecificity::PeptideC => b'$',
            ModificationSpecificity::ProteinN => b'[',
            ModificationSpecificity::ProteinC => b']',
            ModificationSpecificity::Residue(r) => *r,
        }
    }
}

impl Display for ModificationSpecificity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.key() as char)
    }
}

impl Serialize for ModificationSpecificity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvalidModification {
    Empty,
    InvalidResidue(char),
    TooLong(String),
}

impl FromStr for ModificationSpecificity {
    type Err = InvalidModification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let c = chars.next().ok_or(InvalidModification::Empty)?;
        if chars.next().is_some() {
            return Err(InvalidModification::TooLong(s.into()));
        }
        match c {
            '^' => Ok(ModificationSpecificity::PeptideN),
            '$' => Ok(ModificationSpecificity::PeptideC),
            '[' => Ok(ModificationSpecificity::ProteinN),
            ']' => Ok(ModificationSpecificity::ProteinC),
            c if c.is_ascii_uppercase() => Ok(ModificationSpecificity::Residue(c as u8)),
            c => Err(InvalidModification::InvalidResidue(c)),
        }
    }
}

fn report(kind: &str, err: InvalidModification) {
    match err {
        InvalidModification::Empty => {
            log::error!("Skipping invalid {} string: empty", kind)
        }
        InvalidModification::InvalidResidue(c) => {
            log::error!(
                "Skipping invalid {} string: unrecognized residue ({})",
                kind,
                c
            )
        }
        InvalidModification::TooLong(s) => {
            log::error!("Skipping invalid {} string: {} is too long", kind, s)
        }
    }
}

pub fn validate_mods(input: Option<HashMap<String, f64>>) -> HashMap<ModificationSpecificity, f64> {
    let mut output = HashMap::new();
    if let Some(input) = input {
        for (s, mass) in input {
            match ModificationSpecificity::from_str(&s) {
                Ok(m) => {
                    output.insert(m, mass);
                }
                Err(err) => report("modification", err),
            }
        }
    }
    output
}

/// Residue mass overrides only accept residue specificities
pub fn validate_aa_masses(input: Option<HashMap<String, f64>>) -> HashMap<u8, f64> {
    let mut output = HashMap::new();
    if let Some(input) = input {
        for (s, mass) in input {
            match ModificationSpecificity::from_str(&s) {
                Ok(ModificationSpecificity::Residue(r)) => {
                    output.insert(r, mass);
                }
                Ok(_) => {
                    log::error!("Skipping amino acid mass for terminal marker {}", s)
                }
                Err(err) => report("amino acid", err),
            }
        }
    }
    output
}

/// Positions that are eligible for an adduct or cross-link
///
/// Keyed like the residue mass table: residues by their ASCII code, and the
/// four termini by their marker characters (`^`, `$`, `[`, `]`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdductSites {
    sites: [bool; 128],
}

impl Default for AdductSites {
    fn default() -> Self {
        Self {
            sites: [false; 128],
        }
    }
}

impl AdductSites {
    pub fn new<I: IntoIterator<Item = ModificationSpecificity>>(specificities: I) -> Self {
        let mut sites = Self::default();
        for s in specificities {
            sites.enable(s);
        }
        sites
    }

    pub fn enable(&mut self, specificity: ModificationSpecificity) {
        if let Some(slot) = self.sites.get_mut(specificity.key() as usize) {
            *slot = true;
        }
    }

    pub fn contains(&self, specificity: ModificationSpecificity) -> bool {
        self.sites
            .get(specificity.key() as usize)
            .copied()
            .unwrap_or(false)
    }

    #[inline]
    pub fn residue(&self, aa: u8) -> bool {
        aa != b'^'
            && aa != b'$'
            && aa != b'['
            && aa != b']'
            && self.sites.get(aa as usize).copied().unwrap_or(false)
    }

    /// Every peptide starts with one eligible site if either peptide terminus
    /// can carry an adduct
    pub fn seed(&self) -> u8 {
        (self.contains(ModificationSpecificity::PeptideN)
            || self.contains(ModificationSpecificity::PeptideC)) as u8
    }

    pub fn is_empty(&self) -> bool {
        !self.sites.iter().any(|x| *x)
    }

    pub fn iter(&self) -> impl Iterator<Item = ModificationSpecificity> + '_ {
        self.sites
            .iter()
            .enumerate()
            .filter(|(_, enabled)| **enabled)
            .filter_map(|(key, _)| {
                let key = key as u8;
                (key as char).to_string().parse().ok()
            })
    }
}

impl Serialize for AdductSites {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.iter())
    }
}

pub fn validate_adduct_sites(input: Option<Vec<String>>) -> AdductSites {
    let mut output = AdductSites::default();
    if let Some(input) = input {
        for s in input {
            match ModificationSpecificity::from_str(&s) {
                Ok(m) => output.enable(m),
                Err(err) => report("adduct site", err),
            }
        }
    }
    output
}
