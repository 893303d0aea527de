use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use piguard_core::{
    analyze_apk, analyze_ir_file, load_config, ScanOutput, DEFAULT_CONFIG_TOML,
};
use piguard_diagnostics::{format_human, format_json};

#[derive(Parser)]
#[command(name = "piguard")]
#[command(about = "Finds mutable PendingIntents wrapping implicit Intents in Android apps")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan an APK (or a pre-extracted IR dump) for unsafe PendingIntents
    Scan {
        /// APK to scan
        apk: Option<PathBuf>,
        /// Platform android.jar handed to the dex bridge
        #[arg(long)]
        android_jar: Option<PathBuf>,
        /// Analyze a pre-extracted IR JSON file instead of an APK
        #[arg(long)]
        ir: Option<PathBuf>,
        /// Output format: human, json
        #[arg(long, default_value = "human")]
        format: String,
        /// Directory to start the piguard.toml search from
        #[arg(long)]
        config_dir: Option<PathBuf>,
    },
    /// Write a default piguard.toml in the current directory
    Init,
}

struct ScanArgs {
    apk: Option<PathBuf>,
    android_jar: Option<PathBuf>,
    ir: Option<PathBuf>,
    format: String,
    config_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Log to stderr so stdout stays clean for machine output
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Scan {
            apk,
            android_jar,
            ir,
            format,
            config_dir,
        } => run_scan(ScanArgs {
            apk,
            android_jar,
            ir,
            format,
            config_dir,
        }),
        Commands::Init => run_init(),
    }
}

fn run_scan(args: ScanArgs) -> ExitCode {
    if args.format != "human" && args.format != "json" {
        eprintln!("Unknown format '{}'; expected human or json", args.format);
        return ExitCode::from(3);
    }

    let start_dir = args
        .config_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = match load_config(&start_dir) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::from(3);
        }
    };

    let result = if let Some(ir) = &args.ir {
        analyze_ir_file(ir, &config)
    } else if let Some(apk) = &args.apk {
        let jar = args
            .android_jar
            .clone()
            .or_else(|| config.piguard.android_jar.as_ref().map(PathBuf::from));
        let Some(jar) = jar else {
            eprintln!("--android-jar is required when scanning an APK (or set it in piguard.toml)");
            return ExitCode::from(3);
        };
        analyze_apk(apk, &jar, &config)
    } else {
        eprintln!("Provide an APK to scan, or --ir FILE for a pre-extracted dump");
        return ExitCode::from(3);
    };

    let output = match result {
        Ok(output) => output,
        Err(e) => {
            eprintln!("scan failed: {e}");
            return ExitCode::from(3);
        }
    };

    match args.format.as_str() {
        "json" => println!("{}", format_json(&output.findings, &output.summary)),
        _ => print!("{}", format_human(&output.findings, &output.summary)),
    }

    exit_code(&output)
}

/// 0 = clean, 1 = unsafe findings, 2 = only unknown findings.
fn exit_code(output: &ScanOutput) -> ExitCode {
    if output.summary.unsafe_count > 0 {
        ExitCode::from(1)
    } else if output.summary.unknown_count > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

fn run_init() -> ExitCode {
    let path = Path::new("piguard.toml");
    if path.exists() {
        eprintln!("piguard.toml already exists");
        return ExitCode::from(3);
    }
    match std::fs::write(path, DEFAULT_CONFIG_TOML) {
        Ok(()) => {
            println!("Created piguard.toml");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to write piguard.toml: {e}");
            ExitCode::from(3)
        }
    }
}
