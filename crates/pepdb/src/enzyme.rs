use std::str::FromStr;

/// The enzyme specification could not be compiled
#[derive(thiserror::Error, Clone, Debug, PartialEq, Eq)]
#[error("invalid enzyme specification `{spec}` at position {position}")]
pub struct InvalidEnzymeSpec {
    pub spec: String,
    pub position: usize,
}

/// Compiled cleavage rules for an enzyme
///
/// Each table is keyed by 7-bit ASCII residue. "before" and "after" are
/// relative to the residue: `cut_after[K]` means cleave C-terminal to K,
/// `cut_before[D]` means cleave N-terminal to D. Exceptions block a cut when
/// they sit on the other side of the cleavage point.
///
/// Specifications are written like `[KR]|{P}`: the part left of the `|`
/// describes the residue preceding the cut, the part right of it the residue
/// following the cut. Square brackets list cut residues, curly braces list
/// exceptions.
#[derive(Clone, PartialEq, Eq)]
pub struct EnzymeRules {
    cut_before: [bool; 128],
    cut_after: [bool; 128],
    exception_before: [bool; 128],
    exception_after: [bool; 128],
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Clause {
    Closed,
    Cut,
    Exception,
}

impl EnzymeRules {
    /// A rule set that never cleaves
    pub fn none() -> Self {
        Self {
            cut_before: [false; 128],
            cut_after: [false; 128],
            exception_before: [false; 128],
            exception_after: [false; 128],
        }
    }

    pub fn compile(spec: &str) -> Result<Self, InvalidEnzymeSpec> {
        let err = |position| InvalidEnzymeSpec {
            spec: spec.into(),
            position,
        };

        let mut rules = Self::none();
        let mut clause = Clause::Closed;
        let mut following = false;

        for (position, ch) in spec.char_indices() {
            match ch {
                '[' if clause == Clause::Closed => clause = Clause::Cut,
                '{' if clause == Clause::Closed => clause = Clause::Exception,
                ']' if clause == Clause::Cut => clause = Clause::Closed,
                '}' if clause == Clause::Exception => clause = Clause::Closed,
                '|' if !following && clause == Clause::Closed => following = true,
                '[' | '{' | ']' | '}' | '|' => return Err(err(position)),
                _ if !ch.is_ascii() || clause == Clause::Closed => return Err(err(position)),
                _ => {
                    let table = match (clause, following) {
                        (Clause::Cut, false) => &mut rules.cut_after,
                        (Clause::Cut, true) => &mut rules.cut_before,
                        (Clause::Exception, false) => &mut rules.exception_after,
                        (Clause::Exception, true) => &mut rules.exception_before,
                        (Clause::Closed, _) => unreachable!("residue outside of clause"),
                    };
                    table[ch as usize] = true;
                }
            }
        }

        if clause != Clause::Closed {
            return Err(err(spec.len()));
        }
        Ok(rules)
    }

    #[inline]
    fn lookup(table: &[bool; 128], aa: u8) -> bool {
        table.get(aa as usize).copied().unwrap_or(false)
    }

    /// Is there a cleavage boundary between `sequence[i]` and `sequence[i + 1]`?
    #[inline]
    pub fn cleaves(&self, sequence: &[u8], i: usize) -> bool {
        if i + 1 >= sequence.len() {
            return false;
        }
        self.cleaves_after(sequence, i)
            || (Self::lookup(&self.cut_before, sequence[i + 1])
                && !Self::lookup(&self.exception_after, sequence[i]))
    }

    /// Is the sequence cleaved between `i` and `i + 1` by the cut-after
    /// clause, i.e. on the C-terminal side of the residue at `i`?
    pub fn cleaves_after(&self, sequence: &[u8], i: usize) -> bool {
        if i + 1 >= sequence.len() {
            return false;
        }
        Self::lookup(&self.cut_after, sequence[i])
            && !Self::lookup(&self.exception_before, sequence[i + 1])
    }

    /// Is this residue named in either cut clause?
    #[inline]
    pub fn is_site(&self, aa: u8) -> bool {
        Self::lookup(&self.cut_before, aa) || Self::lookup(&self.cut_after, aa)
    }

    /// Is this residue named in either exception clause?
    #[inline]
    pub fn is_exception(&self, aa: u8) -> bool {
        Self::lookup(&self.exception_before, aa) || Self::lookup(&self.exception_after, aa)
    }

    /// Positions `i` such that the sequence is cleaved between `i` and `i + 1`
    pub fn cleavage_sites<'s>(&'s self, sequence: &'s [u8]) -> impl Iterator<Item = usize> + 's {
        (0..sequence.len().saturating_sub(1)).filter(move |&i| self.cleaves(sequence, i))
    }
}

impl FromStr for EnzymeRules {
    type Err = InvalidEnzymeSpec;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

impl std::fmt::Debug for EnzymeRules {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let residues = |table: &[bool; 128]| {
            table
                .iter()
                .enumerate()
                .filter(|(_, set)| **set)
                .map(|(aa, _)| aa as u8 as char)
                .collect::<String>()
        };
        f.debug_struct("EnzymeRules")
            .field("cut_before", &residues(&self.cut_before))
            .field("cut_after", &residues(&self.cut_after))
            .field("exception_before", &residues(&self.exception_before))
            .field("exception_after", &residues(&self.exception_after))
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct EnzymeParameters {
    /// Inclusive
    pub min_missed_cleavages: u8,
    /// Inclusive
    pub max_missed_cleavages: u8,
    /// Inclusive
    pub min_len: usize,
    /// Inclusive
    pub max_len: usize,
    pub rules: EnzymeRules,
}
