use crate::fasta::Protein;

/// Where a peptide occurs: `start` and `stop` are inclusive offsets into the
/// sequence of `proteins[protein]`
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PeptideLocation {
    pub protein: usize,
    pub start: usize,
    pub stop: usize,
}

impl PeptideLocation {
    pub fn len(&self) -> usize {
        self.stop - self.start + 1
    }

    /// Residues covered by this location. Returns `None` if the location does
    /// not fit inside the protein collection.
    pub fn slice<'p>(&self, proteins: &'p [Protein]) -> Option<&'p str> {
        proteins
            .get(self.protein)
            .and_then(|protein| protein.sequence.get(self.start..=self.stop))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Peptide {
    pub monoisotopic: f64,
    /// Does any location start at the protein N-terminus (after initiator Met removal included)?
    pub protein_nterm: bool,
    /// Does any location end at the protein C-terminus?
    pub protein_cterm: bool,
    /// Number of positions that can carry an adduct or cross-link
    pub adduct_sites: u8,
    pub missed_cleavages: u8,
    locations: Vec<PeptideLocation>,
}

impl Peptide {
    pub fn new(
        location: PeptideLocation,
        monoisotopic: f64,
        protein_nterm: bool,
        protein_cterm: bool,
        adduct_sites: u8,
        missed_cleavages: u8,
    ) -> Self {
        Self {
            monoisotopic,
            protein_nterm,
            protein_cterm,
            adduct_sites,
            missed_cleavages,
            locations: vec![location],
        }
    }

    /// The canonical location, used to reconstruct the sequence
    pub fn location(&self) -> &PeptideLocation {
        &self.locations[0]
    }

    pub fn locations(&self) -> &[PeptideLocation] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.location().len()
    }

    pub fn sequence<'p>(&self, proteins: &'p [Protein]) -> Option<&'p str> {
        self.location().slice(proteins)
    }

    /// Fold a peptide with an identical sequence into `self`
    pub fn merge(&mut self, other: Peptide) {
        self.protein_nterm |= other.protein_nterm;
        self.protein_cterm |= other.protein_cterm;
        self.adduct_sites = self.adduct_sites.max(other.adduct_sites);
        self.locations.extend(other.locations);
    }

    /// Is every protein containing this peptide a decoy?
    pub fn decoy(&self, proteins: &[Protein]) -> bool {
        self.locations
            .iter()
            .all(|loc| proteins.get(loc.protein).map(|p| p.decoy).unwrap_or(false))
    }

    pub fn label(&self, proteins: &[Protein]) -> i32 {
        match self.decoy(proteins) {
            true => -1,
            false => 1,
        }
    }

    /// Names of the distinct proteins containing this peptide, in location order
    pub fn proteins<'p>(&self, proteins: &'p [Protein]) -> Vec<&'p str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.locations.len());
        for loc in &self.locations {
            if let Some(protein) = proteins.get(loc.protein) {
                if !names.contains(&protein.name.as_str()) {
                    names.push(&protein.name);
                }
            }
        }
        names
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn protein(name: &str, sequence: &str, decoy: bool) -> Protein {
        Protein {
            name: name.into(),
            description: String::new(),
            sequence: sequence.into(),
            decoy,
        }
    }

    #[test]
    fn merge() {
        let proteins = vec![
            protein("A", "MPEPTIDEK", false),
            protein("DECOY_A", "PEPTIDEKR", true),
        ];

        let mut a = Peptide::new(
            PeptideLocation {
                protein: 0,
                start: 1,
                stop: 7,
            },
            800.0,
            false,
            false,
            0,
            0,
        );
        let b = Peptide::new(
            PeptideLocation {
                protein: 1,
                start: 0,
                stop: 6,
            },
            800.0,
            true,
            false,
            2,
            0,
        );

        assert_eq!(a.sequence(&proteins), Some("PEPTIDE"));
        assert_eq!(b.sequence(&proteins), Some("PEPTIDE"));
        assert_eq!(b.label(&proteins), -1);

        a.merge(b);
        assert!(a.protein_nterm);
        assert!(!a.protein_cterm);
        assert_eq!(a.adduct_sites, 2);
        assert_eq!(a.locations().len(), 2);
        assert_eq!(a.location().protein, 0);
        assert_eq!(a.len(), 7);
        assert_eq!(a.proteins(&proteins), vec!["A", "DECOY_A"]);

        // Shared between a target and a decoy: not a decoy
        assert!(!a.decoy(&proteins));
        assert_eq!(a.label(&proteins), 1);
    }

    #[test]
    fn out_of_bounds() {
        let proteins = vec![protein("A", "PEPTIDE", false)];
        let loc = PeptideLocation {
            protein: 0,
            start: 3,
            stop: 10,
        };
        assert_eq!(loc.slice(&proteins), None);
        let loc = PeptideLocation {
            protein: 1,
            start: 0,
            stop: 1,
        };
        assert_eq!(loc.slice(&proteins), None);
    }
}
