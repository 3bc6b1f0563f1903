use pepdb_cli::input::Input;
use pepdb_cli::runner::Runner;
use std::path::Path;

const FASTA: &str = r#">sp|Q99536|VAT1_HUMAN Synaptic vesicle membrane protein VAT-1 homolog
MSDEREVAEAATGEDASSPPPKTEAASDPQHPAASEGAAAAAASPPLLRCLVLTGFGGYD
KVKLQSRPAAPPAPGPGQLTLRLRACGLNFADLMARQGLYDRLPPLPVTPGMEGAGVVIA
VGEGVSDRKAGDRVMVLNRSGMWQEEVTVPSVQTFLIPEAMTFEEAAALLVNYITAYMVL
>sp|EMPTY|no sequence
>sp|ODD|unusual residues
PEPTIDEKXAAGGHR
"#;

fn write_inputs(dir: &Path, parameters: serde_json::Value) -> anyhow::Result<std::path::PathBuf> {
    std::fs::write(dir.join("proteins.fasta.in"), FASTA)?;
    let path = dir.join("parameters.json");
    std::fs::write(&path, serde_json::to_vec(&parameters)?)?;
    Ok(path)
}

#[test]
fn integration() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let output = dir.path().join("out");
    let path = write_inputs(
        dir.path(),
        serde_json::json!({
            "database": {
                "fasta": dir.path().join("proteins.fasta.in"),
                "enzyme": { "missed_cleavages": 1, "min_len": 5 },
                "peptide_min_mass": 500.0,
                "adduct_sites": ["K"],
                "generate_entrapments": true,
                "seed": 42,
            },
            "output_directory": output,
            "export_fasta": true,
        }),
    )?;

    let search = Input::load(&path)?.build()?;
    assert!(search.export_fasta);
    let runner = Runner::new(search)?;

    // The empty record is dropped; the rest gains an entrapment and a decoy
    assert_eq!(runner.database.protein_count(), 8);
    let peptides = runner.database.peptide_count();
    assert!(peptides > 0);

    let search = runner.run()?;
    assert_eq!(search.output_paths.len(), 4);
    for path in &search.output_paths {
        assert!(Path::new(path).exists(), "{}", path);
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .from_path(output.join("peptides.tsv"))?;
    assert_eq!(
        rdr.headers()?.iter().collect::<Vec<_>>(),
        vec![
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
        ]
    );
    let records = rdr.records().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(records.len(), peptides);

    let mut last = f64::MAX;
    for record in &records {
        let mass: f64 = record[3].parse()?;
        assert!(mass <= last);
        assert!(mass > 500.0);
        last = mass;
        assert_eq!(record[0].len(), record[4].parse::<usize>()?);
        assert_eq!(
            record[1].split(';').count(),
            record[2].parse::<usize>()?
        );
        assert!(record[9] == *"1" || record[9] == *"-1");
    }

    let floor = std::fs::read_to_string(output.join("mass_floor.tsv"))?;
    assert_eq!(floor.lines().count(), 101);
    assert!(floor.starts_with("peptide_len\tmin_mass\n"));

    let exported = std::fs::read_to_string(output.join("proteins.fasta"))?;
    assert_eq!(exported.lines().filter(|l| l.starts_with('>')).count(), 8);
    assert!(exported.contains(">DECOY_ENTRAP_sp|Q99536|VAT1_HUMAN"));

    let results: serde_json::Value =
        serde_json::from_slice(&std::fs::read(output.join("results.json"))?)?;
    assert_eq!(results["database"]["seed"], 42);
    assert_eq!(results["database"]["enzyme"]["cleave_at"], "[KR]|{P}");
    assert_eq!(results["output_paths"].as_array().map(Vec::len), Some(4));
    Ok(())
}

#[test]
fn missing_fasta() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_inputs(
        dir.path(),
        serde_json::json!({ "database": {}, "output_directory": dir.path() }),
    )?;
    let err = Input::load(&path)?.build().err().map(|e| e.to_string());
    assert!(err.unwrap_or_default().contains("database.fasta"));
    Ok(())
}

#[test]
fn malformed_enzyme() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_inputs(
        dir.path(),
        serde_json::json!({
            "database": { "fasta": "proteins.fasta", "enzyme": { "cleave_at": "[KR" } },
            "output_directory": dir.path(),
        }),
    )?;
    assert!(Input::load(&path)?.build().is_err());
    Ok(())
}
