use crate::enzyme::EnzymeParameters;
use crate::mass::{MassTable, H2O};
use crate::modification::{AdductSites, ModificationSpecificity};
use crate::peptide::{Peptide, PeptideLocation};

/// In-silico digestion of single protein sequences
///
/// Peptide masses are exclusive bounds: a peptide is kept if
/// `min_mass < monoisotopic < max_mass`.
pub struct Digester<'a> {
    pub enzyme: &'a EnzymeParameters,
    pub masses: &'a MassTable,
    pub adducts: &'a AdductSites,
    pub min_mass: f64,
    pub max_mass: f64,
}

/// Running state for the peptide currently being extended
struct Extension {
    start: usize,
    mass: f64,
    missed_cleavages: u8,
    protein_nterm: bool,
    protein_cterm: bool,
    adduct_sites: u8,
}

impl<'a> Digester<'a> {
    fn extension(&self, start: usize) -> Extension {
        let mut mass = H2O + self.masses.peptide_nterm;
        if start == 0 {
            mass += self.masses.protein_nterm;
        }
        Extension {
            start,
            mass,
            missed_cleavages: 0,
            protein_nterm: false,
            protein_cterm: false,
            adduct_sites: self.adducts.seed(),
        }
    }

    /// Mark terminal flags for the residue at `pos`, and return whether the
    /// position can carry an adduct
    fn tag(&self, sequence: &[u8], ext: &mut Extension, pos: usize) -> bool {
        let mut eligible = false;
        if pos == 0 || (pos == 1 && ext.start == 1) {
            ext.protein_nterm = true;
            eligible |= self.adducts.contains(ModificationSpecificity::ProteinN);
        }
        if pos + 1 == sequence.len() {
            ext.protein_cterm = true;
            eligible |= self.adducts.contains(ModificationSpecificity::ProteinC);
        }
        eligible || self.adducts.residue(sequence[pos])
    }

    fn emit(&self, ext: &Extension, protein: usize, stop: usize, mass: f64) -> Option<Peptide> {
        let len = stop - ext.start + 1;
        if mass > self.min_mass
            && mass < self.max_mass
            && len >= self.enzyme.min_len
            && ext.missed_cleavages >= self.enzyme.min_missed_cleavages
        {
            Some(Peptide::new(
                PeptideLocation {
                    protein,
                    start: ext.start,
                    stop,
                },
                mass,
                ext.protein_nterm,
                ext.protein_cterm,
                ext.adduct_sites,
                ext.missed_cleavages,
            ))
        } else {
            None
        }
    }

    /// Enumerate all peptides of `sequence` (the protein at index `protein`)
    /// that satisfy the mass, length and missed cleavage bounds.
    ///
    /// The sequence is scanned once, extending a peptide one residue at a time
    /// and emitting it at every cleavage boundary. Once an extension grows too
    /// heavy, too long or spans too many missed cleavages, scanning restarts
    /// after the first cleavage site of that extension.
    pub fn digest(&self, protein: usize, sequence: &[u8]) -> Vec<Peptide> {
        let mut peptides = Vec::new();
        let n = sequence.len();
        if n == 0 {
            return peptides;
        }

        let rules = &self.enzyme.rules;
        let mut ext = self.extension(0);
        let mut pos = 0;

        // An initiator methionine may be removed in vivo, so the residue after
        // it is explored as an alternative start site
        let mut next = match sequence[0] {
            b'M' => Some(0),
            _ => None,
        };

        loop {
            ext.mass += self.masses.residue(sequence[pos]);

            // A residue cleaved on its C-terminal side is counted after the
            // peptide it ends has been emitted
            let eligible = self.tag(sequence, &mut ext, pos);
            let deferred = eligible && rules.cleaves_after(sequence, pos);
            if eligible && !deferred {
                ext.adduct_sites = ext.adduct_sites.saturating_add(1);
            }

            if pos + 1 == n {
                let mass = ext.mass + self.masses.peptide_cterm + self.masses.protein_cterm;
                peptides.extend(self.emit(&ext, protein, pos, mass));
                match next.take() {
                    Some(site) if site + 1 < n => {
                        ext = self.extension(site + 1);
                        pos = site + 1;
                        continue;
                    }
                    _ => break,
                }
            }

            let len = pos - ext.start + 1;
            if rules.cleaves(sequence, pos) {
                if next.is_none() {
                    next = Some(pos);
                }
                // Only the C-terminal peptide may reach `max_len`
                if len < self.enzyme.max_len {
                    let mass = ext.mass + self.masses.peptide_cterm;
                    peptides.extend(self.emit(&ext, protein, pos, mass));
                }
                ext.missed_cleavages = ext.missed_cleavages.saturating_add(1);
            }
            if deferred {
                ext.adduct_sites = ext.adduct_sites.saturating_add(1);
            }

            if ext.mass + self.masses.peptide_cterm > self.max_mass
                || ext.missed_cleavages > self.enzyme.max_missed_cleavages
                || len >= self.enzyme.max_len
            {
                // Restart after the first known cleavage site, or go looking
                // for the next one
                let site = match next.take() {
                    Some(site) => site,
                    None => match (pos + 1..n).find(|&i| rules.cleaves(sequence, i)) {
                        Some(site) => site,
                        None => break,
                    },
                };
                if site + 1 >= n {
                    break;
                }
                ext = self.extension(site + 1);
                pos = site + 1;
            } else {
                pos += 1;
            }
        }

        peptides
    }
}
