use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use typeray::cache::SignatureCache;
use typeray::checker::FileChecker;
use typeray::diagnostics::{self, DiagnosticLevel};
use typeray::env::GlobalEnv;

/// TypeRay - union-type inference core for PHP static analysis
#[derive(Parser)]
#[command(name = "typeray")]
#[command(about = "Union-type algebra and cast checking for PHP types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check cast-assertion file(s) for failures
    Check {
        /// Assertion file or directory of .types files
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Show detailed output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Watch an assertion file and re-check on changes
    Watch {
        /// Assertion file to watch
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Evaluate one cast between two union type strings
    Cast {
        /// Source union type, e.g. 'int|string'
        from: String,
        /// Target union type, e.g. 'float'
        to: String,
    },

    /// Show the built-in signature(s) of a function
    Signature {
        /// Function name, e.g. 'implode'
        name: String,
    },

    /// Show version information
    Version,

    /// Clear the signature cache
    ClearCache,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { path, verbose } => {
            let success = check_path(&path, verbose)?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Watch { file } => {
            watch_file(&file)?;
        }
        Commands::Cast { from, to } => {
            let castable = evaluate_cast(&from, &to);
            println!("{}", if castable { "castable" } else { "not castable" });
            if !castable {
                std::process::exit(1);
            }
        }
        Commands::Signature { name } => {
            show_signatures(&name)?;
        }
        Commands::Version => {
            println!("TypeRay {}", env!("CARGO_PKG_VERSION"));
        }
        Commands::ClearCache => {
            clear_cache()?;
        }
    }

    Ok(())
}

fn check_path(path: &PathBuf, verbose: bool) -> Result<bool> {
    let checker = FileChecker::with_cached_signatures();

    let diagnostics = if path.is_dir() {
        checker.check_directory(path)?
    } else {
        checker.check_file(path)?
    };

    if diagnostics.is_empty() {
        if verbose {
            println!("{}: no failures found", path.display());
        }
        return Ok(true);
    }

    if path.is_dir() {
        println!("{}", diagnostics::format_diagnostics(&diagnostics));
    } else {
        println!(
            "{}",
            diagnostics::format_diagnostics_with_file(&diagnostics, path)
        );
    }

    let has_errors = diagnostics
        .iter()
        .any(|d| d.level == DiagnosticLevel::Error);
    Ok(!has_errors)
}

fn watch_file(file: &PathBuf) -> Result<()> {
    use notify::{Config, RecommendedWatcher, RecursiveMode, Watcher};
    use std::sync::mpsc::channel;
    use std::time::Duration;

    if !file.exists() {
        anyhow::bail!("File not found: {}", file.display());
    }

    println!(
        "Watching {} for changes (Press Ctrl+C to stop)",
        file.display()
    );
    println!();
    let _ = check_path(file, true);

    let (tx, rx) = channel();
    let mut watcher = RecommendedWatcher::new(
        move |result| {
            if let Ok(event) = result {
                let _ = tx.send(event);
            }
        },
        Config::default().with_poll_interval(Duration::from_millis(500)),
    )?;
    watcher.watch(file.as_ref(), RecursiveMode::NonRecursive)?;

    loop {
        match rx.recv() {
            Ok(event) => {
                if let notify::EventKind::Modify(_) = event.kind {
                    println!("\n--- File changed, re-checking... ---\n");
                    // Editors may still be mid-write when the event fires.
                    std::thread::sleep(Duration::from_millis(100));
                    if let Err(error) = check_path(file, true) {
                        eprintln!("Error during check: {}", error);
                    }
                    println!();
                }
            }
            Err(error) => {
                eprintln!("Watch error: {}", error);
                break;
            }
        }
    }

    Ok(())
}

fn evaluate_cast(from: &str, to: &str) -> bool {
    let mut genv = GlobalEnv::new();
    let from = genv.union_type_from_string(from);
    let to = genv.union_type_from_string(to);
    from.can_cast_to_union_type(&to, &genv.pool)
}

fn show_signatures(name: &str) -> Result<()> {
    let genv = GlobalEnv::with_cached_signatures();

    let signatures = genv.signatures.function_signatures(name);
    if signatures.is_empty() {
        anyhow::bail!("No built-in signature for {}()", name);
    }

    for signature in signatures {
        let parameters: Vec<String> = signature
            .parameters
            .iter()
            .map(|(name, ty)| format!("{} ${}", ty, name))
            .collect();
        println!(
            "{}({}): {}",
            name.to_lowercase(),
            parameters.join(", "),
            signature.return_type
        );
    }

    Ok(())
}

fn clear_cache() -> Result<()> {
    match SignatureCache::cache_path() {
        Ok(path) => {
            if path.exists() {
                std::fs::remove_file(&path)?;
                println!("Cache cleared: {}", path.display());
            } else {
                println!("No cache file found");
            }
        }
        Err(error) => {
            eprintln!("Failed to get cache path: {}", error);
        }
    }

    Ok(())
}
