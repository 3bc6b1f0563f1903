use crate::digest::Digester;
use crate::enzyme::{EnzymeParameters, EnzymeRules, InvalidEnzymeSpec};
use crate::fasta::{Fasta, Protein};
use crate::floor::MassFloor;
use crate::mass::MassTable;
use crate::modification::{
    validate_aa_masses, validate_adduct_sites, validate_mods, AdductSites,
    ModificationSpecificity,
};
use crate::peptide::Peptide;
use crate::Error;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct EnzymeBuilder {
    /// Only keep peptides with at least this many missed cleavages
    pub min_missed_cleavages: Option<u8>,
    /// How many missed cleavages to use
    pub missed_cleavages: Option<u8>,
    /// Minimum peptide length
    pub min_len: Option<usize>,
    /// Maximum peptide length
    pub max_len: Option<usize>,
    /// Cleavage rules, e.g. `[KR]|{P}` for trypsin or `|[D]` for Asp-N
    pub cleave_at: Option<String>,
}

impl Default for EnzymeBuilder {
    fn default() -> Self {
        Self {
            min_missed_cleavages: Some(0),
            missed_cleavages: Some(1),
            min_len: Some(6),
            max_len: Some(50),
            cleave_at: Some("[KR]|{P}".into()),
        }
    }
}

impl EnzymeBuilder {
    /// Fill in every unset field with its default
    fn resolve(self) -> Self {
        let default = Self::default();
        Self {
            min_missed_cleavages: self.min_missed_cleavages.or(default.min_missed_cleavages),
            missed_cleavages: self.missed_cleavages.or(default.missed_cleavages),
            min_len: self.min_len.or(default.min_len),
            max_len: self.max_len.or(default.max_len),
            cleave_at: self.cleave_at.or(default.cleave_at),
        }
    }
}

impl TryFrom<EnzymeBuilder> for EnzymeParameters {
    type Error = InvalidEnzymeSpec;

    fn try_from(en: EnzymeBuilder) -> Result<Self, Self::Error> {
        let max_missed_cleavages = en.missed_cleavages.unwrap_or(1);
        Ok(EnzymeParameters {
            min_missed_cleavages: en
                .min_missed_cleavages
                .unwrap_or(0)
                .min(max_missed_cleavages),
            max_missed_cleavages,
            min_len: en.min_len.unwrap_or(6),
            max_len: en.max_len.unwrap_or(50),
            rules: EnzymeRules::compile(en.cleave_at.as_deref().unwrap_or("[KR]|{P}"))?,
        })
    }
}

#[derive(Deserialize, Default)]
/// Parameters used for generating the peptide index
pub struct Builder {
    pub enzyme: Option<EnzymeBuilder>,
    /// Peptides must be heavier than this (Da)
    pub peptide_min_mass: Option<f64>,
    /// Peptides must be lighter than this (Da)
    pub peptide_max_mass: Option<f64>,
    /// Static modifications to add to matching amino acids or termini
    pub static_mods: Option<HashMap<String, f64>>,
    /// Replace the default monoisotopic mass of a residue
    pub aa_masses: Option<HashMap<String, f64>>,
    /// Residues (or terminal markers) that can carry an adduct or cross-link
    pub adduct_sites: Option<Vec<String>>,
    /// Proteins whose name contains this tag are decoys
    pub decoy_tag: Option<String>,
    pub generate_decoys: Option<bool>,
    /// Alternate decoy names between `{tag}0_` and `{tag}1_`
    pub alternate_decoys: Option<bool>,
    pub entrapment_tag: Option<String>,
    pub generate_entrapments: Option<bool>,
    pub alternate_entrapments: Option<bool>,
    /// Skip proteins longer than this
    pub max_protein_len: Option<usize>,
    /// Seed for entrapment shuffling
    pub seed: Option<u64>,
    /// Path to fasta database
    pub fasta: Option<String>,
}

impl Builder {
    pub fn make_parameters(self) -> Result<Parameters, Error> {
        let enzyme = self.enzyme.unwrap_or_default().resolve();
        let enzyme_parameters = EnzymeParameters::try_from(enzyme.clone())?;

        let static_mods = validate_mods(self.static_mods);
        let aa_masses = validate_aa_masses(self.aa_masses)
            .into_iter()
            .map(|(residue, mass)| (ModificationSpecificity::Residue(residue), mass))
            .collect::<HashMap<_, _>>();

        // Overrides replace the default mass, fixed modifications add to it
        let mut masses = MassTable::default();
        for (specificity, mass) in &aa_masses {
            if let ModificationSpecificity::Residue(residue) = specificity {
                masses.set_residue(*residue, *mass);
            }
        }
        for (specificity, mass) in &static_mods {
            masses.add_fixed_mod(*specificity, *mass);
        }

        Ok(Parameters {
            enzyme,
            peptide_min_mass: self.peptide_min_mass.unwrap_or(600.0),
            peptide_max_mass: self.peptide_max_mass.unwrap_or(6000.0),
            static_mods,
            aa_masses,
            adduct_sites: validate_adduct_sites(self.adduct_sites),
            decoy_tag: self.decoy_tag.unwrap_or_else(|| "DECOY".into()),
            generate_decoys: self.generate_decoys.unwrap_or(true),
            alternate_decoys: self.alternate_decoys.unwrap_or(false),
            entrapment_tag: self.entrapment_tag.unwrap_or_else(|| "ENTRAP".into()),
            generate_entrapments: self.generate_entrapments.unwrap_or(false),
            alternate_entrapments: self.alternate_entrapments.unwrap_or(false),
            max_protein_len: self.max_protein_len.unwrap_or(65000),
            seed: self.seed,
            fasta: self.fasta.unwrap_or_default(),
            enzyme_parameters,
            masses,
        })
    }

    pub fn update_fasta(&mut self, fasta: String) {
        self.fasta = Some(fasta)
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Parameters {
    pub enzyme: EnzymeBuilder,
    pub peptide_min_mass: f64,
    pub peptide_max_mass: f64,
    static_mods: HashMap<ModificationSpecificity, f64>,
    aa_masses: HashMap<ModificationSpecificity, f64>,
    pub adduct_sites: AdductSites,
    pub decoy_tag: String,
    pub generate_decoys: bool,
    pub alternate_decoys: bool,
    pub entrapment_tag: String,
    pub generate_entrapments: bool,
    pub alternate_entrapments: bool,
    pub max_protein_len: usize,
    pub seed: Option<u64>,
    pub fasta: String,

    #[serde(skip_serializing)]
    pub enzyme_parameters: EnzymeParameters,
    #[serde(skip_serializing)]
    pub masses: MassTable,
}

impl Parameters {
    /// Append entrapments, then decoys (which also cover the entrapments)
    fn augment(&self, fasta: &mut Fasta) {
        if self.generate_entrapments {
            log::trace!("generating entrapments");
            let mut rng = match self.seed {
                Some(seed) => SmallRng::seed_from_u64(seed),
                None => SmallRng::from_os_rng(),
            };
            fasta.add_entrapments(&self.entrapment_tag, self.alternate_entrapments, &mut rng);
        }
        if self.generate_decoys {
            log::trace!("generating decoys");
            fasta.add_decoys(
                &self.decoy_tag,
                &self.enzyme_parameters.rules,
                self.alternate_decoys,
            );
        }
    }

    fn digest(&self, fasta: &Fasta) -> Vec<Peptide> {
        log::trace!("digesting fasta");
        let digester = Digester {
            enzyme: &self.enzyme_parameters,
            masses: &self.masses,
            adducts: &self.adduct_sites,
            min_mass: self.peptide_min_mass,
            max_mass: self.peptide_max_mass,
        };

        let peptides = fasta
            .proteins
            .par_iter()
            .enumerate()
            .flat_map_iter(|(idx, protein)| digester.digest(idx, protein.sequence.as_bytes()))
            .collect::<Vec<_>>();

        log::trace!("sorting and deduplicating peptides");
        let mut peptides = deduplicate(peptides, &fasta.proteins);

        // Stable, so equal masses stay ordered by sequence
        peptides.par_sort_by(|a, b| b.monoisotopic.total_cmp(&a.monoisotopic));
        peptides
    }

    pub fn build(&self, mut fasta: Fasta) -> IndexedDatabase {
        self.augment(&mut fasta);
        let peptides = self.digest(&fasta);

        log::trace!("computing mass floor");
        let mass_floor = MassFloor::new(&peptides);
        let adduct_peptides = peptides.iter().filter(|p| p.adduct_sites > 0).count();

        IndexedDatabase {
            peptides,
            fasta,
            mass_floor,
            adduct_peptides,
        }
    }
}

/// Merge peptides with identical sequences into the first occurrence
fn deduplicate(peptides: Vec<Peptide>, proteins: &[Protein]) -> Vec<Peptide> {
    let mut keyed = peptides
        .into_par_iter()
        .map(|peptide| (peptide.sequence(proteins).unwrap_or_default(), peptide))
        .collect::<Vec<_>>();
    keyed.par_sort_by(|a, b| a.0.cmp(b.0));

    let mut merged: Vec<(&str, Peptide)> = Vec::with_capacity(keyed.len());
    for (sequence, peptide) in keyed {
        match merged.last_mut() {
            Some((last, keep)) if *last == sequence => keep.merge(peptide),
            _ => merged.push((sequence, peptide)),
        }
    }
    merged.into_iter().map(|(_, peptide)| peptide).collect()
}

#[derive(Hash, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize)]
#[repr(transparent)]
pub struct PeptideIx(pub u32);

/// Deduplicated peptides, sorted by descending monoisotopic mass, together
/// with the (augmented) proteins they were digested from
pub struct IndexedDatabase {
    pub peptides: Vec<Peptide>,
    pub fasta: Fasta,
    pub mass_floor: MassFloor,
    adduct_peptides: usize,
}

impl IndexedDatabase {
    pub fn protein_count(&self) -> usize {
        self.fasta.len()
    }

    pub fn peptide_count(&self) -> usize {
        self.peptides.len()
    }

    /// Number of peptides with at least one adduct site
    pub fn adduct_peptide_count(&self) -> usize {
        self.adduct_peptides
    }

    pub fn proteins(&self) -> &[Protein] {
        &self.fasta.proteins
    }

    pub fn get(&self, index: PeptideIx) -> Option<&Peptide> {
        self.peptides.get(index.0 as usize)
    }

    pub fn sequence(&self, peptide: &Peptide) -> &str {
        peptide.sequence(self.proteins()).unwrap_or_default()
    }

    /// Names of the proteins containing a peptide
    pub fn protein_names(&self, peptide: &Peptide) -> Vec<&str> {
        peptide.proteins(self.proteins())
    }

    pub fn decoy(&self, peptide: &Peptide) -> bool {
        peptide.decoy(self.proteins())
    }

    pub fn max_peptide_len(&self, mass: f64) -> usize {
        self.mass_floor.max_peptide_len(mass)
    }
}

impl std::ops::Index<PeptideIx> for IndexedDatabase {
    type Output = Peptide;

    fn index(&self, index: PeptideIx) -> &Self::Output {
        &self.peptides[index.0 as usize]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn parameters(json: &str) -> Parameters {
        serde_json::from_str::<Builder>(json)
            .unwrap()
            .make_parameters()
            .unwrap()
    }

    fn sequences(db: &IndexedDatabase) -> Vec<&str> {
        db.peptides.iter().map(|p| db.sequence(p)).collect()
    }

    #[test]
    fn digestion() {
        let fasta = r#"
        >sp|AAAAA
        MEWKLEQSMREQALLKAQLTQLK
        >sp|BBBBB
        RMEWKLEQSMREQALLKAQLTQLK
        "#;

        let (fasta, warnings) = Fasta::parse(fasta, "DECOY", 65000, &MassTable::default());
        assert!(warnings.is_empty());

        let params = parameters(
            r#"{
                "enzyme": { "missed_cleavages": 1, "min_len": 6, "max_len": 11 },
                "peptide_min_mass": 150.0,
                "peptide_max_mass": 5000.0,
                "generate_decoys": false
            }"#,
        );
        let db = params.build(fasta);

        assert_eq!(db.protein_count(), 2);
        assert_eq!(
            sequences(&db),
            vec!["MEWKLEQSMR", "EWKLEQSMR", "AQLTQLK", "LEQSMR", "EQALLK"]
        );

        let locations = db
            .peptides
            .iter()
            .map(|p| p.locations().len())
            .collect::<Vec<_>>();
        assert_eq!(locations, vec![2, 1, 2, 2, 2]);

        // The first protein is digested first, so it owns the canonical location
        assert_eq!(db[PeptideIx(0)].location().protein, 0);
        assert_eq!(
            db.protein_names(&db[PeptideIx(0)]),
            vec!["sp|AAAAA", "sp|BBBBB"]
        );
        assert_eq!(db.protein_names(&db[PeptideIx(1)]), vec!["sp|AAAAA"]);
        assert_eq!(db[PeptideIx(1)].missed_cleavages, 1);
        assert!(db[PeptideIx(1)].protein_nterm);
        assert!(db[PeptideIx(2)].protein_cterm);
        assert!(db.get(PeptideIx(5)).is_none());

        assert_eq!(db.adduct_peptide_count(), 0);
        assert_eq!(db.mass_floor.floor(6), db.peptides[4].monoisotopic - 1.0);
    }

    #[test]
    fn decoys() {
        let fasta = ">sp|A\nMADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGN\n";
        let (fasta, _) = Fasta::parse(fasta, "DECOY", 65000, &MassTable::default());
        let params = parameters(
            r#"{
                "enzyme": { "missed_cleavages": 0, "min_len": 2 },
                "peptide_min_mass": 0.0,
                "peptide_max_mass": 10000.0
            }"#,
        );
        let db = params.build(fasta);

        assert_eq!(db.protein_count(), 2);
        assert_eq!(db.proteins()[1].name, "DECOY_sp|A");
        assert!(db.proteins()[1].decoy);

        let decoys = db.peptides.iter().filter(|p| db.decoy(p)).count();
        assert!(decoys > 0);
        assert!(decoys < db.peptide_count());
        for peptide in &db.peptides {
            let decoy = peptide.locations().iter().all(|loc| loc.protein == 1);
            assert_eq!(db.decoy(peptide), decoy);
            assert_eq!(peptide.label(db.proteins()), if decoy { -1 } else { 1 });
        }
        for pair in db.peptides.windows(2) {
            assert!(pair[0].monoisotopic >= pair[1].monoisotopic);
        }
    }

    #[test]
    fn entrapments_before_decoys() {
        let fasta = ">sp|A\nMADEEKLPPGWEKRMSRSSGRVYYFNHITNASQWERPSGN\n";
        let (fasta, _) = Fasta::parse(fasta, "DECOY", 65000, &MassTable::default());
        let params = parameters(r#"{ "generate_entrapments": true, "seed": 7 }"#);
        let db = params.build(fasta);

        let names = db
            .proteins()
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["sp|A", "ENTRAP_sp|A", "DECOY_sp|A", "DECOY_ENTRAP_sp|A"]
        );
        let decoys = db.proteins().iter().map(|p| p.decoy).collect::<Vec<_>>();
        assert_eq!(decoys, vec![false, false, true, true]);
    }

    #[test]
    fn adducts_and_mods() {
        let fasta = ">sp|A\nMAGKEEKPRCCK\n";
        let (fasta, _) = Fasta::parse(fasta, "DECOY", 65000, &MassTable::default());
        let params = parameters(
            r#"{
                "enzyme": { "missed_cleavages": 0, "min_len": 1 },
                "peptide_min_mass": 0.0,
                "static_mods": { "C": 57.021464, "x": 1.0 },
                "aa_masses": { "K": 100.0 },
                "adduct_sites": ["K"],
                "generate_decoys": false
            }"#,
        );
        assert_eq!(params.masses.residue(b'K'), 100.0);
        assert!((params.masses.residue(b'C') - 160.0306443).abs() < 1e-6);

        let db = params.build(fasta);
        assert_eq!(sequences(&db), vec!["EEKPR", "CCK", "MAGK", "AGK"]);
        assert_eq!(db.adduct_peptide_count(), 4);

        let cck = db.peptides.iter().find(|p| db.sequence(p) == "CCK").unwrap();
        let expected = params.masses.peptide(b"CCK", false, true);
        assert!((cck.monoisotopic - expected).abs() < 1e-6);
    }

    #[test]
    fn invalid_enzyme() {
        let builder = serde_json::from_str::<Builder>(r#"{"enzyme": {"cleave_at": "[KR|"}}"#)
            .unwrap();
        match builder.make_parameters() {
            Err(Error::Enzyme(err)) => assert_eq!(err.position, 3),
            _ => panic!("expected an enzyme error"),
        }
    }

    #[test]
    fn defaults() {
        let params = Builder::default().make_parameters().unwrap();
        assert_eq!(params.enzyme.cleave_at.as_deref(), Some("[KR]|{P}"));
        assert_eq!(params.enzyme.missed_cleavages, Some(1));
        assert_eq!(params.enzyme_parameters.min_len, 6);
        assert_eq!(params.enzyme_parameters.max_len, 50);
        assert_eq!(params.peptide_min_mass, 600.0);
        assert_eq!(params.peptide_max_mass, 6000.0);
        assert_eq!(params.decoy_tag, "DECOY");
        assert!(params.generate_decoys);
        assert!(!params.generate_entrapments);
        assert_eq!(params.max_protein_len, 65000);

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["enzyme"]["cleave_at"], "[KR]|{P}");
        assert!(json.get("masses").is_none());
    }
}
