//! Build a PDF report from a JSON definition
//!
//! Usage:
//!   build_report report.json
//!   build_report report.json --output out/report.pdf --verbose
//!
//! Without `--output` the report is written to `<report_name>.pdf`.

use std::path::PathBuf;
use std::process::ExitCode;

use pdf_report::ReportDefinition;

struct BuildConfig {
    definition: PathBuf,
    output: Option<PathBuf>,
    verbose: bool,
}

impl BuildConfig {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut definition = None;
        let mut output = None;
        let mut verbose = false;

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--output" | "-o" => {
                    i += 1;
                    let path = args.get(i).ok_or("--output needs a file name")?;
                    output = Some(PathBuf::from(path));
                },
                "--verbose" | "-v" => {
                    verbose = true;
                },
                "--help" | "-h" => return Err(usage()),
                other if other.starts_with('-') => {
                    return Err(format!("unknown option '{}'\n{}", other, usage()));
                },
                other => {
                    if definition.replace(PathBuf::from(other)).is_some() {
                        return Err(format!("only one definition file is accepted\n{}", usage()));
                    }
                },
            }
            i += 1;
        }

        Ok(Self {
            definition: definition.ok_or_else(usage)?,
            output,
            verbose,
        })
    }
}

fn usage() -> String {
    "usage: build_report <definition.json> [-o|--output FILE] [-v|--verbose]".to_string()
}

fn run(config: &BuildConfig) -> pdf_report::Result<PathBuf> {
    let definition = ReportDefinition::from_json_file(&config.definition)?;
    let mut report = definition.render()?;
    match &config.output {
        Some(path) => {
            report.output(path)?;
            Ok(path.clone())
        },
        None => report.save(),
    }
}

fn main() -> ExitCode {
    let config = match BuildConfig::from_args() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        },
    };

    let default_level = if config.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match run(&config) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        },
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        },
    }
}
