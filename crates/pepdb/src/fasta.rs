use std::io::Write;

use crate::mass::MassTable;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protein {
    /// Accession: header text up to the first whitespace
    pub name: String,
    pub description: String,
    pub sequence: String,
    pub decoy: bool,
}

/// Problems found while parsing a FASTA file. None of these abort parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// Record was skipped: sequence exceeds the configured maximum length
    SequenceTooLong { protein: String, len: usize },
    /// Record was skipped: header without any sequence
    EmptySequence { protein: String },
    /// Whitespace or non-ASCII character inside a sequence line, skipped
    UnexpectedCharacter { protein: String, character: char },
    /// Residue kept in the sequence, but currently has no mass
    ZeroMassResidue { protein: String, residue: char },
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Warning::SequenceTooLong { protein, len } => write!(
                f,
                "{} has a sequence that is too long ({} residues). It will be skipped.",
                protein, len
            ),
            Warning::EmptySequence { protein } => {
                write!(f, "{} has no sequence. It will be skipped.", protein)
            }
            Warning::UnexpectedCharacter { protein, character } => write!(
                f,
                "{} has an unexpected amino acid character or errant white space: {:?}",
                protein, character
            ),
            Warning::ZeroMassResidue { protein, residue } => write!(
                f,
                "{}: mass of '{}' is currently set to 0. Consider revising with the `aa_masses` parameter.",
                protein, residue
            ),
        }
    }
}

pub struct Fasta {
    pub proteins: Vec<Protein>,
    decoy_tag: String,
}

struct Record<'a> {
    name: &'a str,
    description: &'a str,
    sequence: String,
    warnings: Vec<Warning>,
}

impl<'a> Record<'a> {
    fn new(header: &'a str) -> Self {
        let header = header.trim();
        let (name, description) = match header.split_once(char::is_whitespace) {
            Some((name, description)) => (name, description.trim()),
            None => (header, ""),
        };
        Record {
            name,
            description,
            sequence: String::new(),
            warnings: Vec::new(),
        }
    }

    fn push_line(&mut self, line: &str, masses: &MassTable) {
        for ch in line.chars() {
            if ch.is_whitespace() || !ch.is_ascii() {
                self.warnings.push(Warning::UnexpectedCharacter {
                    protein: self.name.into(),
                    character: ch,
                });
                continue;
            }
            let ch = ch.to_ascii_uppercase();
            if masses.residue(ch as u8) == 0.0 {
                let warning = Warning::ZeroMassResidue {
                    protein: self.name.into(),
                    residue: ch,
                };
                if !self.warnings.contains(&warning) {
                    self.warnings.push(warning);
                }
            }
            self.sequence.push(ch);
        }
    }

    fn finish(
        self,
        decoy_tag: &str,
        max_len: usize,
        proteins: &mut Vec<Protein>,
        warnings: &mut Vec<Warning>,
    ) {
        warnings.extend(self.warnings);
        if self.sequence.is_empty() {
            warnings.push(Warning::EmptySequence {
                protein: self.name.into(),
            });
        } else if self.sequence.len() > max_len {
            warnings.push(Warning::SequenceTooLong {
                protein: self.name.into(),
                len: self.sequence.len(),
            });
        } else {
            proteins.push(Protein {
                name: self.name.into(),
                description: self.description.into(),
                decoy: self.name.contains(decoy_tag),
                sequence: self.sequence,
            });
        }
    }
}

impl Fasta {
    pub fn new<S: Into<String>>(proteins: Vec<Protein>, decoy_tag: S) -> Fasta {
        Fasta {
            proteins,
            decoy_tag: decoy_tag.into(),
        }
    }

    /// Parse a string into a fasta database
    ///
    /// Proteins whose name contains `decoy_tag` are marked as decoys. Records
    /// longer than `max_len` residues are dropped. Residue masses are only
    /// consulted to report characters that would not contribute any mass.
    pub fn parse<S: Into<String>>(
        contents: &str,
        decoy_tag: S,
        max_len: usize,
        masses: &MassTable,
    ) -> (Fasta, Vec<Warning>) {
        let decoy_tag = decoy_tag.into();
        let mut proteins = Vec::new();
        let mut warnings = Vec::new();
        let mut record: Option<Record> = None;

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('>') {
                if let Some(done) = record.take() {
                    done.finish(&decoy_tag, max_len, &mut proteins, &mut warnings);
                }
                record = Some(Record::new(header));
            } else if let Some(record) = record.as_mut() {
                record.push_line(line, masses);
            }
        }

        if let Some(done) = record.take() {
            done.finish(&decoy_tag, max_len, &mut proteins, &mut warnings);
        }

        (
            Fasta {
                proteins,
                decoy_tag,
            },
            warnings,
        )
    }

    pub fn decoy_tag(&self) -> &str {
        &self.decoy_tag
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }

    /// Write the collection back out, two lines per record
    pub fn write<W: Write>(&self, mut wtr: W) -> std::io::Result<()> {
        for protein in &self.proteins {
            if protein.description.is_empty() {
                writeln!(wtr, ">{}", protein.name)?;
            } else {
                writeln!(wtr, ">{} {}", protein.name, protein.description)?;
            }
            writeln!(wtr, "{}", protein.sequence)?;
        }
        wtr.flush()
    }
}
