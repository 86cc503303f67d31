// Command-line front end for zpatch.
//
// Two subcommands: `diff` builds a patch from a source and target game
// file, `apply` either inspects a patch or rebuilds the target from it.

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::error::{FileRole, PatchError};
use crate::io::{apply_file, diff_file, inspect_file};
use crate::patch::Label;

// ---------------------------------------------------------------------------
// Clap CLI definition
// ---------------------------------------------------------------------------

/// XOR patch builder and applier for z-code game files.
#[derive(Parser, Debug)]
#[command(
    name = "zpatch",
    version,
    about = "Build and apply patches between z-code game files",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Force overwrite existing output files.
    #[arg(short = 'f', long, global = true)]
    force: bool,

    /// Quiet mode (suppress non-error output).
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode (use multiple times for more detail).
    #[arg(short = 'v', long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Output stats as JSON to stderr.
    #[arg(long = "json", global = true)]
    json_output: bool,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Produce a patch that turns SOURCE into TARGET.
    Diff(DiffArgs),
    /// Apply a patch to SOURCE, or print its details when given only a patch.
    Apply(ApplyArgs),
}

#[derive(Args, Debug)]
struct DiffArgs {
    /// Source game file (from this).
    #[arg(value_hint = ValueHint::FilePath)]
    source: PathBuf,

    /// Target game file (to this).
    #[arg(value_hint = ValueHint::FilePath)]
    target: PathBuf,

    /// Output patch file.
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Optional game name stored in the patch (max 32 characters).
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    label: Vec<String>,
}

#[derive(Args, Debug)]
struct ApplyArgs {
    /// Patch file to apply.
    #[arg(value_hint = ValueHint::FilePath)]
    patch: PathBuf,

    /// Existing game file to patch.
    #[arg(value_hint = ValueHint::FilePath, requires = "target")]
    source: Option<PathBuf>,

    /// File name for the patched game file.
    #[arg(value_hint = ValueHint::FilePath)]
    target: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// Resolved command + options (flattened from Cli)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Diff,
    Inspect,
    Apply,
}

#[derive(Debug)]
struct Options {
    command: Command,
    force: bool,
    quiet: bool,
    verbose: u8,
    json_output: bool,
    patch_file: Option<PathBuf>,
    source_file: Option<PathBuf>,
    target_file: Option<PathBuf>,
    label: Label,
}

fn resolve_options(cli: Cli) -> Options {
    let base = Options {
        command: Command::Inspect,
        force: cli.force,
        quiet: cli.quiet,
        verbose: cli.verbose.min(2),
        json_output: cli.json_output,
        patch_file: None,
        source_file: None,
        target_file: None,
        label: Label::default(),
    };

    match cli.command {
        Cmd::Diff(args) => Options {
            command: Command::Diff,
            patch_file: Some(args.output),
            source_file: Some(args.source),
            target_file: Some(args.target),
            label: Label::from_words(&args.label),
            ..base
        },
        Cmd::Apply(args) => match (args.source, args.target) {
            (Some(source), Some(target)) => Options {
                command: Command::Apply,
                patch_file: Some(args.patch),
                source_file: Some(source),
                target_file: Some(target),
                ..base
            },
            _ => Options {
                command: Command::Inspect,
                patch_file: Some(args.patch),
                ..base
            },
        },
    }
}

// ---------------------------------------------------------------------------
// Error reporting
// ---------------------------------------------------------------------------

fn path_for(opts: &Options, role: FileRole) -> Option<&Path> {
    match role {
        FileRole::Source => opts.source_file.as_deref(),
        FileRole::Target => opts.target_file.as_deref(),
        FileRole::Patch => opts.patch_file.as_deref(),
        FileRole::Output => match opts.command {
            Command::Diff => opts.patch_file.as_deref(),
            Command::Apply | Command::Inspect => opts.target_file.as_deref(),
        },
    }
}

fn report_error(opts: &Options, err: &PatchError) {
    match err {
        PatchError::NotAGameFile { roles } => {
            for &role in roles {
                match path_for(opts, role) {
                    Some(path) => eprintln!(
                        "zpatch: {role} '{}' is not a valid z-code file",
                        path.display()
                    ),
                    None => eprintln!("zpatch: {role} is not a valid z-code file"),
                }
            }
        }
        PatchError::SourceMismatch {
            label, expected, ..
        } => {
            eprintln!("zpatch: {err}");
            if let Some(source) = path_for(opts, FileRole::Source) {
                eprintln!(
                    "zpatch: make sure source file '{}' is actually version {expected} of \"{label}\"",
                    source.display()
                );
            }
        }
        PatchError::HeaderTooShort { role, .. } | PatchError::DeclaredLengthInconsistency { role, .. } => {
            match path_for(opts, *role) {
                Some(path) => eprintln!("zpatch: {}: {err}", path.display()),
                None => eprintln!("zpatch: {err}"),
            }
        }
        PatchError::InvalidContainer(_) => match path_for(opts, FileRole::Patch) {
            Some(path) => eprintln!("zpatch: {}: {err}", path.display()),
            None => eprintln!("zpatch: {err}"),
        },
        _ => eprintln!("zpatch: {err}"),
    }
}

fn refuse_overwrite(opts: &Options, path: &Path) -> bool {
    if path.exists() && !opts.force {
        eprintln!(
            "zpatch: output file exists, use -f to overwrite: {}",
            path.display()
        );
        return true;
    }
    false
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// ---------------------------------------------------------------------------
// Diff command
// ---------------------------------------------------------------------------

fn cmd_diff(opts: &Options) -> i32 {
    let (Some(source), Some(target), Some(output)) = (
        opts.source_file.as_deref(),
        opts.target_file.as_deref(),
        opts.patch_file.as_deref(),
    ) else {
        eprintln!("zpatch: diff requires source, target and output files");
        return 1;
    };

    if refuse_overwrite(opts, output) {
        return 1;
    }

    let stats = match diff_file(source, target, output, opts.label, |summary| {
        if !opts.quiet {
            println!("{summary}\n");
        }
    }) {
        Ok(stats) => stats,
        Err(e) => {
            report_error(opts, &e);
            return 1;
        }
    };

    if !opts.quiet {
        println!("Patch produced successfully.");
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "zpatch: diff: payload size: {}, patch size: {}, source wraps: {}",
            stats.payload_len, stats.patch_size, stats.source_wraps
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "diff",
            "label": stats.summary.label.to_string(),
            "target": stats.summary.target.to_string(),
            "source": stats.summary.source.to_string(),
            "payload_size": stats.payload_len,
            "patch_size": stats.patch_size,
            "source_wraps": stats.source_wraps,
            "patch_sha256": stats.patch_sha256.as_ref().map(|d| hex(d)),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Apply command
// ---------------------------------------------------------------------------

fn cmd_apply(opts: &Options) -> i32 {
    let (Some(patch), Some(source), Some(target)) = (
        opts.patch_file.as_deref(),
        opts.source_file.as_deref(),
        opts.target_file.as_deref(),
    ) else {
        eprintln!("zpatch: apply requires patch, source and target files");
        return 1;
    };

    if refuse_overwrite(opts, target) {
        return 1;
    }

    let stats = match apply_file(patch, source, target, |summary| {
        if !opts.quiet {
            println!("{summary}\n");
        }
    }) {
        Ok(stats) => stats,
        Err(e) => {
            report_error(opts, &e);
            return 1;
        }
    };

    if !opts.quiet {
        println!("Patch applied successfully.");
    }

    if opts.verbose > 0 && !opts.quiet {
        eprintln!(
            "zpatch: apply: output size: {}, source wraps: {}",
            stats.output_size, stats.source_wraps
        );
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "apply",
            "label": stats.summary.label.to_string(),
            "target": stats.summary.target.to_string(),
            "source": stats.summary.source.to_string(),
            "output_size": stats.output_size,
            "source_wraps": stats.source_wraps,
            "output_sha256": stats.output_sha256.as_ref().map(|d| hex(d)),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Inspect command (apply with only a patch)
// ---------------------------------------------------------------------------

fn cmd_inspect(opts: &Options) -> i32 {
    let Some(patch) = opts.patch_file.as_deref() else {
        eprintln!("zpatch: apply requires a patch file");
        return 1;
    };

    let header = match inspect_file(patch) {
        Ok(header) => header,
        Err(e) => {
            report_error(opts, &e);
            return 1;
        }
    };

    if !opts.quiet {
        println!("Game: {}", header.label);
        println!("Produces version: {}", header.target);
        println!("Requires version: {}", header.source);
    }

    if opts.json_output {
        let json = serde_json::json!({
            "command": "inspect",
            "label": header.label.to_string(),
            "label_raw": hex(header.label.as_bytes()),
            "target": header.target.to_string(),
            "source": header.source.to_string(),
        });
        eprintln!("{json:#}");
    }

    0
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run() -> ! {
    let cli = Cli::parse();
    let opts = resolve_options(cli);

    let default_filter = match (opts.quiet, opts.verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, _) => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();

    let exit_code = match opts.command {
        Command::Diff => cmd_diff(&opts),
        Command::Inspect => cmd_inspect(&opts),
        Command::Apply => cmd_apply(&opts),
    };

    process::exit(exit_code);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
