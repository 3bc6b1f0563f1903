use rand::seq::SliceRandom;
use rand::Rng;

use crate::enzyme::EnzymeRules;
use crate::fasta::{Fasta, Protein};

/// Reverse a protein sequence in place between enzyme cut sites
///
/// Cut-site residues (and the first residue of the protein) stay where they
/// are, so decoy peptides keep the termini of their targets. Each stretch
/// between cut sites is trimmed of exception residues at either end, then
/// reversed. A palindromic stretch longer than two residues has its first and
/// middle residues swapped instead.
///
/// Characters outside of ASCII are never sites or exceptions, and are moved
/// like any other residue.
pub fn reverse(sequence: &str, rules: &EnzymeRules) -> String {
    let mut sequence = sequence.chars().collect::<Vec<_>>();
    for (start, stop) in clips(&sequence, rules) {
        let (mut start, mut stop) = (start, stop);
        while start <= stop && is_exception(rules, sequence[start]) {
            start += 1;
        }
        while stop > start && is_exception(rules, sequence[stop]) {
            stop -= 1;
        }
        if stop <= start {
            continue;
        }

        let span = &mut sequence[start..=stop];
        let original = span.to_vec();
        span.reverse();
        if span.len() > 2 && *span == original[..] {
            let mid = span.len() / 2;
            span.swap(0, mid);
        }
    }
    sequence.into_iter().collect()
}

fn is_site(rules: &EnzymeRules, aa: char) -> bool {
    aa.is_ascii() && rules.is_site(aa as u8)
}

fn is_exception(rules: &EnzymeRules, aa: char) -> bool {
    aa.is_ascii() && rules.is_exception(aa as u8)
}

/// Inclusive spans of non cut-site residues, starting after the first residue
fn clips(sequence: &[char], rules: &EnzymeRules) -> Vec<(usize, usize)> {
    let mut clips = Vec::new();
    let mut start = None;
    for (idx, &aa) in sequence.iter().enumerate().skip(1) {
        match (is_site(rules, aa), start) {
            (true, Some(s)) => {
                clips.push((s, idx - 1));
                start = None;
            }
            (false, None) => start = Some(idx),
            _ => {}
        }
    }
    if let Some(s) = start {
        clips.push((s, sequence.len() - 1));
    }
    clips
}

/// Randomly permute the whole sequence
pub fn shuffle<R: Rng + ?Sized>(sequence: &str, rng: &mut R) -> String {
    let mut sequence = sequence.chars().collect::<Vec<_>>();
    sequence.shuffle(rng);
    sequence.into_iter().collect()
}

fn label(tag: &str, alternate: bool, idx: usize, name: &str) -> String {
    match alternate {
        true => format!("{}{}_{}", tag, idx % 2, name),
        false => format!("{}_{}", tag, name),
    }
}

impl Fasta {
    fn append_synthetic<F>(&mut self, tag: &str, alternate: bool, mut f: F)
    where
        F: FnMut(&Protein) -> String,
    {
        let synthetic = self
            .proteins
            .iter()
            .enumerate()
            .map(|(idx, protein)| {
                let name = label(tag, alternate, idx, &protein.name);
                Protein {
                    decoy: name.contains(self.decoy_tag()),
                    name,
                    description: protein.description.clone(),
                    sequence: f(protein),
                }
            })
            .collect::<Vec<_>>();
        self.proteins.extend(synthetic);
    }

    /// Append one reversed decoy for every protein currently in the collection
    ///
    /// Decoys are named `{tag}_{name}`, or alternately `{tag}0_{name}` and
    /// `{tag}1_{name}` if `alternate` is set.
    pub fn add_decoys(&mut self, tag: &str, rules: &EnzymeRules, alternate: bool) {
        self.append_synthetic(tag, alternate, |protein| reverse(&protein.sequence, rules));
        log::trace!("added decoys: {} proteins", self.len());
    }

    /// Append one shuffled entrapment for every protein currently in the
    /// collection. Entrapments are targets unless `tag` contains the decoy tag.
    pub fn add_entrapments<R: Rng + ?Sized>(&mut self, tag: &str, alternate: bool, rng: &mut R) {
        self.append_synthetic(tag, alternate, |protein| shuffle(&protein.sequence, &mut *rng));
        log::trace!("added entrapments: {} proteins", self.len());
    }
}
