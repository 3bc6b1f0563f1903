use crate::modification::ModificationSpecificity;

pub const H2O: f64 = 18.0105633;

/// Residues with a default monoisotopic mass
pub const VALID_AA: [u8; 21] = [
    b'A', b'C', b'D', b'E', b'F', b'G', b'H', b'I', b'K', b'L', b'M', b'N', b'P', b'Q', b'R', b'S',
    b'T', b'U', b'V', b'W', b'Y',
];

pub trait Mass {
    fn monoisotopic(&self) -> f64;
}

impl Mass for u8 {
    /// Default residue masses - anything else is massless until configured
    fn monoisotopic(&self) -> f64 {
        match self {
            b'A' => 71.0371103,
            b'C' => 103.0091803,
            b'D' => 115.0269385,
            b'E' => 129.0425877,
            b'F' => 147.0684087,
            b'G' => 57.0214611,
            b'H' => 137.0589059,
            b'I' => 113.0840579,
            b'K' => 128.0949557,
            b'L' => 113.0840579,
            b'M' => 131.0404787,
            b'N' => 114.0429222,
            b'P' => 97.0527595,
            b'Q' => 128.0585714,
            b'R' => 156.1011021,
            b'S' => 87.0320244,
            b'T' => 101.0476736,
            b'U' => 150.9536303,
            b'V' => 99.0684087,
            b'W' => 186.0793065,
            b'Y' => 163.0633228,
            _ => 0.0,
        }
    }
}

/// Residue masses keyed by 7-bit ASCII, plus the fixed terminal offsets
#[derive(Clone, Debug, PartialEq)]
pub struct MassTable {
    residues: [f64; 128],
    pub peptide_nterm: f64,
    pub peptide_cterm: f64,
    pub protein_nterm: f64,
    pub protein_cterm: f64,
}

impl Default for MassTable {
    fn default() -> Self {
        let mut residues = [0.0; 128];
        for aa in VALID_AA {
            residues[aa as usize] = aa.monoisotopic();
        }
        Self {
            residues,
            peptide_nterm: 0.0,
            peptide_cterm: 0.0,
            protein_nterm: 0.0,
            protein_cterm: 0.0,
        }
    }
}

impl MassTable {
    /// Mass of a single residue. Characters outside the table weigh nothing.
    #[inline]
    pub fn residue(&self, aa: u8) -> f64 {
        self.residues.get(aa as usize).copied().unwrap_or(0.0)
    }

    /// Replace the mass of a residue
    pub fn set_residue(&mut self, aa: u8, mass: f64) {
        if let Some(slot) = self.residues.get_mut(aa as usize) {
            *slot = mass;
        }
    }

    /// Apply a fixed modification: terminal specificities set the offset,
    /// residue specificities are added on top of the current residue mass
    pub fn add_fixed_mod(&mut self, specificity: ModificationSpecificity, mass: f64) {
        match specificity {
            ModificationSpecificity::PeptideN => self.peptide_nterm = mass,
            ModificationSpecificity::PeptideC => self.peptide_cterm = mass,
            ModificationSpecificity::ProteinN => self.protein_nterm = mass,
            ModificationSpecificity::ProteinC => self.protein_cterm = mass,
            ModificationSpecificity::Residue(aa) => {
                if let Some(slot) = self.residues.get_mut(aa as usize) {
                    *slot += mass;
                }
            }
        }
    }

    /// Monoisotopic mass of a full peptide sequence, including water, the
    /// peptide terminal offsets and (if requested) the protein terminal offsets
    pub fn peptide(&self, sequence: &[u8], protein_nterm: bool, protein_cterm: bool) -> f64 {
        let mut mass = H2O + self.peptide_nterm + self.peptide_cterm;
        if protein_nterm {
            mass += self.protein_nterm;
        }
        if protein_cterm {
            mass += self.protein_cterm;
        }
        mass + sequence.iter().map(|aa| self.residue(*aa)).sum::<f64>()
    }
}
