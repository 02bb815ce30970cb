//! Aldakit — command-line front end for the Alda toolkit.
//!
//! Subcommands:
//!   aldakit check song.alda [--ast]       parse and report diagnostics
//!   aldakit export song.alda -o out.mid   compile to a Standard MIDI File
//!   aldakit import song.mid               re-notate a MIDI file as Alda

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use aldakit::lang::unparse;
use aldakit::{generate, midi_to_ast, parse, read_smf, write_smf, GenerateOptions};

#[derive(Parser)]
#[command(name = "aldakit", about = "A toolkit for the Alda music notation language")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse an Alda file and report any diagnostic
    Check {
        /// Path to an .alda source file
        file: PathBuf,
        /// Print the parse tree as JSON
        #[arg(long)]
        ast: bool,
    },
    /// Compile an Alda file to a Standard MIDI File
    Export {
        /// Path to an .alda source file
        file: PathBuf,
        /// Output .mid path
        #[arg(short, long)]
        output: PathBuf,
        /// Initial tempo in BPM
        #[arg(long, default_value_t = 120.0)]
        bpm: f64,
        /// Ticks per quarter note
        #[arg(long, default_value_t = 480)]
        tpq: u16,
    },
    /// Re-notate a Standard MIDI File as Alda source on stdout
    Import {
        /// Path to a .mid file
        file: PathBuf,
        /// Quantization grid in beats (0.25 = sixteenth notes, 0 = off)
        #[arg(long, default_value_t = 0.25)]
        grid: f64,
    },
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Check { file, ast } => {
            let source = read_source(&file)?;
            let root = parse(&source, file.to_str()).map_err(|e| e.to_string())?;
            if ast {
                let json = serde_json::to_string_pretty(&root).map_err(|e| e.to_string())?;
                println!("{json}");
            } else {
                println!("{}: ok", file.display());
            }
            Ok(())
        }
        Commands::Export {
            file,
            output,
            bpm,
            tpq,
        } => {
            let source = read_source(&file)?;
            let root = parse(&source, file.to_str()).map_err(|e| e.to_string())?;
            let opts = GenerateOptions {
                bpm,
                ticks_per_quarter: tpq,
                ..GenerateOptions::default()
            };
            let sequence = generate(&root, &opts)
                .map_err(|e| e.with_context(&source, file.to_str()).to_string())?;
            let bytes = write_smf(&sequence, tpq).map_err(|e| e.to_string())?;
            std::fs::write(&output, bytes)
                .map_err(|e| format!("cannot write {}: {e}", output.display()))?;
            eprintln!(
                "wrote {} ({:.2}s, {} notes)",
                output.display(),
                sequence.duration(),
                sequence.notes.len()
            );
            Ok(())
        }
        Commands::Import { file, grid } => {
            let bytes = std::fs::read(&file)
                .map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let (sequence, _tempo_map) = read_smf(&bytes).map_err(|e| e.to_string())?;
            let root = midi_to_ast(&sequence, grid);
            println!("{}", unparse::to_alda(&root));
            Ok(())
        }
    }
}

fn read_source(file: &PathBuf) -> Result<String, String> {
    std::fs::read_to_string(file).map_err(|e| format!("cannot read {}: {e}", file.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parse_check() {
        let cli = Cli::try_parse_from(["aldakit", "check", "song.alda"]).unwrap();
        match cli.command {
            Commands::Check { file, ast } => {
                assert_eq!(file, PathBuf::from("song.alda"));
                assert!(!ast);
            }
            _ => panic!("expected Check command"),
        }
    }

    #[test]
    fn cli_parse_export_with_options() {
        let cli = Cli::try_parse_from([
            "aldakit", "export", "song.alda", "-o", "out.mid", "--bpm", "90", "--tpq", "960",
        ])
        .unwrap();
        match cli.command {
            Commands::Export {
                file,
                output,
                bpm,
                tpq,
            } => {
                assert_eq!(file, PathBuf::from("song.alda"));
                assert_eq!(output, PathBuf::from("out.mid"));
                assert!((bpm - 90.0).abs() < f64::EPSILON);
                assert_eq!(tpq, 960);
            }
            _ => panic!("expected Export command"),
        }
    }

    #[test]
    fn cli_parse_import_defaults() {
        let cli = Cli::try_parse_from(["aldakit", "import", "song.mid"]).unwrap();
        match cli.command {
            Commands::Import { file, grid } => {
                assert_eq!(file, PathBuf::from("song.mid"));
                assert!((grid - 0.25).abs() < f64::EPSILON);
            }
            _ => panic!("expected Import command"),
        }
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["aldakit"]).is_err());
    }
}
