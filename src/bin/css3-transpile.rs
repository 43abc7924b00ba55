use anyhow::Result;
use cqfill_css3::parser_config::ParserConfig;
use cqfill_css3::transformer::{TranspileOptions, Transpiler};
use cqfill_css3::walker::Walker;
use cqfill_css3::CssParser;
use simple_logger::SimpleLogger;
use std::fs;
use std::io::Read;
use std::process::exit;

fn bail(message: &str) -> ! {
    eprintln!("{message}");
    exit(1);
}

fn main() -> Result<()> {
    let matches = clap::Command::new("Cqfill CSS3 transpiler")
        .version("0.1.0")
        .arg(
            clap::Arg::new("file")
                .help("The CSS file to transpile, or - for stdin")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("base-url")
                .help("Base URL that url() references are resolved against")
                .long("base-url"),
        )
        .arg(
            clap::Arg::new("salt")
                .help("Fixed salt for deterministic output")
                .long("salt"),
        )
        .arg(
            clap::Arg::new("descriptors")
                .help("Print the container query descriptors as JSON on stderr")
                .long("descriptors")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("tree")
                .help("Dump the parse tree instead of transpiling")
                .long("tree")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("debug")
                .help("Enable debug logging")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    if matches.get_flag("debug") {
        SimpleLogger::new().init()?;
    }

    let file: String = matches.get_one::<String>("file").map(String::clone).unwrap_or_default();
    let css = if file == "-" {
        let mut data = String::new();
        std::io::stdin().read_to_string(&mut data)?;
        data
    } else {
        fs::read_to_string(&file)?
    };

    if matches.get_flag("tree") {
        let config = ParserConfig {
            source: Some(file),
            ..Default::default()
        };

        match CssParser::parse_str(css.as_str(), config) {
            Ok(sheet) => Walker::new(&sheet).walk_stdout(),
            Err(err) => bail(&format!("parse error: {err}")),
        }

        return Ok(());
    }

    let mut transpiler = Transpiler::with_options(TranspileOptions {
        base_url: matches.get_one::<String>("base-url").map(String::clone),
        salt: matches.get_one::<String>("salt").map(String::clone),
        ..Default::default()
    });

    let result = transpiler.transpile(css.as_str());

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    if matches.get_flag("descriptors") {
        eprintln!("{}", serde_json::to_string_pretty(&result.descriptors)?);
    }

    println!("{}", result.source);

    Ok(())
}
