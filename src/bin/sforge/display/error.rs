use std::io::{self, Write};

use anyhow::Error;
use smiles_forge::{EmbedError, PipelineError, SmilesError, UffError};

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in distinct_causes(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause, 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = collect_hints(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

/// Cause messages below `err`, leaving out any whose text its parent
/// message already quotes.
fn distinct_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut parent = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !parent.contains(&text) {
            causes.push(text.clone());
        }
        parent = text;
        source = cause.source();
    }
    causes
}

fn collect_hints(err: &Error) -> Vec<String> {
    let mut hints = Vec::new();

    if let Some(pipeline_err) = err.downcast_ref::<PipelineError>() {
        match pipeline_err {
            PipelineError::Smiles(e) => smiles_hints(e, &mut hints),
            PipelineError::Embed(e) => embed_hints(e, &mut hints),
            PipelineError::Optimize(e) => uff_hints(e, &mut hints),
            PipelineError::Io(e) => io_hints(e, &mut hints),
        }
    } else if let Some(io_err) = err.downcast_ref::<smiles_forge::io::Error>() {
        io_hints(io_err, &mut hints);
    }

    hints
}

fn smiles_hints(err: &SmilesError, hints: &mut Vec<String>) {
    match err {
        SmilesError::Kekulize { .. } => {
            hints.push("Aromatic ring atoms need a valid alternating bond pattern".into());
            hints.push("Write pyrrole-type nitrogens with an explicit hydrogen, e.g. [nH]".into());
        }
        SmilesError::Valence { .. } => {
            hints.push("An atom has more bonds than its element allows".into());
            hints.push("Use a bracket atom with a formal charge if this is intended".into());
        }
        _ => hints.push("Check the SMILES syntax near the reported position".into()),
    }
}

fn embed_hints(err: &EmbedError, hints: &mut Vec<String>) {
    match err {
        EmbedError::Failed { .. } => {
            hints.push("Coordinate embedding is stochastic; running sforge again may succeed".into());
        }
        EmbedError::InconsistentBounds { .. } => {
            hints.push("Ring or stereo constraints cannot be satisfied together".into());
            hints.push("Check the stereo annotations of small rings".into());
        }
        EmbedError::Uff(e) => uff_hints(e, hints),
        EmbedError::NoAtoms | EmbedError::Model(_) => {}
    }
}

fn uff_hints(err: &UffError, hints: &mut Vec<String>) {
    match err {
        UffError::UntypedAtom { .. } | UffError::MissingParameter { .. } => {
            hints.push("The Universal Force Field has no type for this atom environment".into());
        }
        UffError::ParameterParse(_) => {
            hints.push("The embedded UFF parameter table is corrupt; rebuild the binary".into());
        }
        UffError::NoSuchConformer(_) => {}
    }
}

fn io_hints(err: &smiles_forge::io::Error, hints: &mut Vec<String>) {
    use std::io::ErrorKind;

    let smiles_forge::io::Error::Io { source } = err else {
        return;
    };
    match source.kind() {
        ErrorKind::PermissionDenied => {
            hints.push("The working directory is not writable".into());
            hints.push("Run sforge from a directory you can write to".into());
        }
        ErrorKind::StorageFull | ErrorKind::WriteZero => {
            hints.push("Failed to write data (disk full?)".into());
        }
        _ => hints.push("Check the working directory and available disk space".into()),
    }
}
