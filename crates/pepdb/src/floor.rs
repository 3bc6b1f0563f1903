use crate::peptide::Peptide;

/// Number of peptide lengths tracked. Longer peptides share the last entry.
pub const MAX_TRACKED_LEN: usize = 100;

/// Subtracted from each observed mass before it is stored
pub const EPSILON: f64 = 1.0;

const UNOBSERVED: f64 = 1e6;

/// Minimum peptide mass by length
///
/// `floor[L]` is the lightest peptide of length `L` or longer, minus
/// [`EPSILON`]. Entries never decrease with length, so a precursor lighter than
/// `floor[L]` cannot match any peptide of `L` residues or more.
#[derive(Clone, Debug, PartialEq)]
pub struct MassFloor {
    floor: [f64; MAX_TRACKED_LEN],
}

impl Default for MassFloor {
    fn default() -> Self {
        Self {
            floor: [UNOBSERVED; MAX_TRACKED_LEN],
        }
    }
}

impl MassFloor {
    pub fn new<'a, I: IntoIterator<Item = &'a Peptide>>(peptides: I) -> Self {
        peptides
            .into_iter()
            .map(|peptide| (peptide.len(), peptide.monoisotopic))
            .collect()
    }

    fn observe(&mut self, len: usize, mass: f64) {
        let slot = &mut self.floor[len.min(MAX_TRACKED_LEN - 1)];
        *slot = slot.min(mass - EPSILON);
    }

    fn smooth(&mut self) {
        for len in (0..MAX_TRACKED_LEN - 1).rev() {
            self.floor[len] = self.floor[len].min(self.floor[len + 1]);
        }
    }

    /// Lower mass bound for a peptide of `len` residues
    pub fn floor(&self, len: usize) -> f64 {
        self.floor[len.min(MAX_TRACKED_LEN - 1)]
    }

    /// Longest peptide length (between 7 and 60) that a precursor of `mass`
    /// could possibly match, or 6 if none
    pub fn max_peptide_len(&self, mass: f64) -> usize {
        (7..=60)
            .rev()
            .find(|&len| mass > self.floor[len])
            .unwrap_or(6)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.floor.iter().copied().enumerate()
    }
}

impl FromIterator<(usize, f64)> for MassFloor {
    fn from_iter<T: IntoIterator<Item = (usize, f64)>>(iter: T) -> Self {
        let mut floor = MassFloor::default();
        for (len, mass) in iter {
            floor.observe(len, mass);
        }
        floor.smooth();
        floor
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn smoothing() {
        let floor: MassFloor = [(6, 700.0), (8, 900.0), (10, 850.0)].into_iter().collect();
        assert_eq!(floor.floor(6), 699.0);
        assert_eq!(floor.floor(7), 849.0);
        assert_eq!(floor.floor(8), 849.0);
        assert_eq!(floor.floor(10), 849.0);
        assert_eq!(floor.floor(0), 699.0);
        assert_eq!(floor.floor(11), UNOBSERVED);

        for len in 0..MAX_TRACKED_LEN - 1 {
            assert!(floor.floor(len) <= floor.floor(len + 1));
        }
    }

    #[test]
    fn clamping() {
        let floor: MassFloor = [(150, 5000.0), (120, 6000.0)].into_iter().collect();
        assert_eq!(floor.floor(99), 4999.0);
        assert_eq!(floor.floor(500), 4999.0);
        assert_eq!(floor.floor(0), 4999.0);
    }

    #[test]
    fn max_peptide_len() {
        let floor: MassFloor = [(6, 700.0), (8, 900.0), (10, 850.0), (70, 2000.0)]
            .into_iter()
            .collect();
        assert_eq!(floor.max_peptide_len(900.0), 10);
        assert_eq!(floor.max_peptide_len(800.0), 6);
        assert_eq!(floor.max_peptide_len(500.0), 6);
        assert_eq!(floor.max_peptide_len(2500.0), 60);
        assert_eq!(MassFloor::default().max_peptide_len(5000.0), 6);
    }
}
