use anyhow::Context;
use pepdb_core::peptide::Peptide;
use rayon::prelude::*;
use std::path::Path;

use crate::Runner;

fn write_bytes(path: &Path, bytes: Vec<u8>) -> anyhow::Result<String> {
    std::fs::write(path, bytes).with_context(|| format!("Failed to write `{}`", path.display()))?;
    Ok(path.display().to_string())
}

impl Runner {
    pub fn serialize_peptide(&self, peptide: &Peptide) -> csv::ByteRecord {
        let proteins = self.database.protein_names(peptide);

        let mut record = csv::ByteRecord::new();
        record.push_field(self.database.sequence(peptide).as_bytes());
        record.push_field(proteins.join(";").as_bytes());
        record.push_field(itoa::Buffer::new().format(proteins.len()).as_bytes());
        record.push_field(ryu::Buffer::new().format(peptide.monoisotopic).as_bytes());
        record.push_field(itoa::Buffer::new().format(peptide.len()).as_bytes());
        record.push_field(
            itoa::Buffer::new()
                .format(peptide.missed_cleavages)
                .as_bytes(),
        );
        record.push_field(itoa::Buffer::new().format(peptide.protein_nterm as u8).as_bytes());
        record.push_field(itoa::Buffer::new().format(peptide.protein_cterm as u8).as_bytes());
        record.push_field(itoa::Buffer::new().format(peptide.adduct_sites).as_bytes());
        record.push_field(
            itoa::Buffer::new()
                .format(peptide.label(self.database.proteins()))
                .as_bytes(),
        );
        record
    }

    /// One row per peptide, in index (descending mass) order
    pub fn write_peptides(&self) -> anyhow::Result<String> {
        let path = self.make_path("peptides.tsv");

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(vec![]);

        let headers = csv::ByteRecord::from(vec![
            "peptide",
            "proteins",
            "num_proteins",
            "monoisotopic",
            "peptide_len",
            "missed_cleavages",
            "protein_nterm",
            "protein_cterm",
            "adduct_sites",
            "label",
        ]);

        wtr.write_byte_record(&headers)?;
        for record in self
            .database
            .peptides
            .par_iter()
            .map(|peptide| self.serialize_peptide(peptide))
            .collect::<Vec<_>>()
        {
            wtr.write_byte_record(&record)?;
        }

        wtr.flush()?;
        let bytes = wtr.into_inner()?;
        write_bytes(&path, bytes)
    }

    pub fn write_mass_floor(&self) -> anyhow::Result<String> {
        let path = self.make_path("mass_floor.tsv");

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(vec![]);
        wtr.write_byte_record(&csv::ByteRecord::from(vec!["peptide_len", "min_mass"]))?;

        for (len, mass) in self.database.mass_floor.iter() {
            let mut record = csv::ByteRecord::new();
            record.push_field(itoa::Buffer::new().format(len).as_bytes());
            record.push_field(ryu::Buffer::new().format(mass).as_bytes());
            wtr.write_byte_record(&record)?;
        }

        wtr.flush()?;
        let bytes = wtr.into_inner()?;
        write_bytes(&path, bytes)
    }

    /// The protein collection after decoys and entrapments were appended
    pub fn write_fasta(&self) -> anyhow::Result<String> {
        let path = self.make_path("proteins.fasta");
        let mut bytes = Vec::new();
        self.database.fasta.write(&mut bytes)?;
        write_bytes(&path, bytes)
    }
}
