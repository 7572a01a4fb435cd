use anyhow::{Context, Result};

use smiles_forge::{DEFAULT_SMILES, ForgeConfig, ForgedMolecule, OUTPUT_FILE, forge, io};

use crate::display::{Context as DisplayContext, Progress, Stage};

pub fn run(ctx: DisplayContext) -> Result<()> {
    let mut progress = Progress::new(ctx.interactive);

    progress.begin(Stage::Generate);
    let forged = forge(DEFAULT_SMILES, &ForgeConfig::default())
        .with_context(|| format!("Structure generation failed for '{DEFAULT_SMILES}'"))?;
    progress.done(Stage::Generate, &generation_details(&forged));

    progress.begin(Stage::Write);
    io::write_mol_file(OUTPUT_FILE, &forged.molecule, forged.conf_id)
        .with_context(|| format!("Failed to write '{OUTPUT_FILE}'"))?;
    progress.done(Stage::Write, &[format!("MOL V2000 → {OUTPUT_FILE}")]);

    progress.finish(OUTPUT_FILE);

    println!("3D structure saved as '{OUTPUT_FILE}'");
    Ok(())
}

fn generation_details(forged: &ForgedMolecule) -> Vec<String> {
    let outcome = forged.optimization;
    vec![
        format!(
            "{} atoms, {} bonds ({})",
            forged.molecule.atom_count(),
            forged.molecule.bond_count(),
            forged.molecule.formula()
        ),
        format!(
            "UFF energy {:.2} → {:.2} kcal/mol in {} iterations{}",
            outcome.initial_energy,
            outcome.final_energy,
            outcome.iterations,
            if outcome.converged { "" } else { " (not converged)" }
        ),
    ]
}
