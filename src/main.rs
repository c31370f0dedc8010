use anyhow::Context;
use clap::Parser;
use commons_kit::adapters::csv::{CsvOptions, CsvTable};
use commons_kit::adapters::{archive, fs};
use commons_kit::config::cli::parse_variable;
use commons_kit::core::tree::{parenthesize, NamedTreeNode};
use commons_kit::domain::constants::Encoding;
use commons_kit::utils::logger::{self, LogFormat};
use commons_kit::utils::text::fill_string;
use commons_kit::utils::xml::XmlGenerator;
use commons_kit::{
    CliConfig, Command, LiteralTokenizer, PropertyResolver, SystemProcess, Version,
};
use std::io::Read;
use std::path::Path;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let config = CliConfig::parse();

    let format = if config.json_log {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };
    logger::init_logger(config.verbose, format);
    tracing::debug!("CLI config: {:?}", config);

    let lib_config = config
        .lib_config()
        .context("Configuration validation failed")?;
    tracing::debug!("Library settings: {:?}", lib_config);

    match config.command {
        Command::Tokenize {
            text,
            delimiters,
            keep_delimiters,
        } => {
            let delimiters: Vec<&str> = delimiters.iter().map(String::as_str).collect();
            let tokens = LiteralTokenizer::new(&text, &delimiters)
                .with_delimiters_returned(keep_delimiters);
            for token in tokens {
                println!("{}", token);
            }
        }
        Command::Version { versions, json } => {
            let mut parsed = versions
                .iter()
                .map(|text| Version::parse(text))
                .collect::<commons_kit::Result<Vec<_>>>()?;
            parsed.sort();
            if json {
                println!("{}", serde_json::to_string_pretty(&parsed)?);
            } else {
                for version in parsed {
                    println!("{}", version);
                }
            }
        }
        Command::Resolve {
            file,
            properties,
            env,
            sys,
            var_format,
        } => {
            let var_format = var_format.as_deref().unwrap_or(lib_config.var_format());
            let mut resolver = PropertyResolver::new().with_var_format(Some(var_format));
            if let Some(path) = properties {
                let properties = fs::load_properties(&path)
                    .with_context(|| format!("Cannot load {}", path.display()))?;
                resolver = resolver.with_properties(None, &properties);
            }
            if env {
                resolver = resolver.with_environment(None);
            }
            if sys {
                resolver = resolver.with_system_info(None);
            }
            let text = fs::read_text(&file)?;
            print!("{}", resolver.apply(&text)?);
        }
        Command::Tree { file, xml } => {
            let paths = read_paths(file.as_deref())?;
            let root = parenthesize(paths, |path: &String| path.clone());
            if xml {
                let mut generator = XmlGenerator::new(Encoding::Utf8, 2);
                generator.processing_instruction().open_tag("tree", &[]);
                write_xml(&mut generator, &root);
                print!("{}", generator.to_xml());
            } else {
                root.walk(true, &mut |node: &NamedTreeNode<String>| {
                    println!("{}{}", fill_string(2 * (node.level() - 1), ' '), node.name());
                });
            }
        }
        Command::Exec {
            program,
            args,
            timeout_ms,
            variables,
            clean_env,
            cwd,
        } => {
            let mut process = SystemProcess::new(program)
                .inherit_environment(!clean_env)
                .buffer_size(lib_config.buffer_size());
            for variable in &variables {
                let (key, value) = parse_variable(variable)?;
                process = process.with_variable(key, value);
            }
            if let Some(dir) = cwd {
                process = process.working_dir(dir);
            }
            if let Some(millis) = timeout_ms {
                process = process.timeout(Duration::from_millis(millis));
            }
            let exit_code = process.execute_to_console(&args[..])?;
            if exit_code != 0 {
                tracing::warn!("Process finished with exit code {}", exit_code);
                std::process::exit(exit_code);
            }
        }
        Command::Zip { dir, output } => {
            let count = archive::zip_dir(&output, &dir, lib_config.buffer_size())?;
            println!("{} files written to {}", count, output.display());
        }
        Command::Unzip { archive: zip_file, dest } => {
            let files = archive::unzip(&zip_file, &dest, lib_config.buffer_size())?;
            println!("{} files extracted to {}", files.len(), dest.display());
        }
        Command::Csv {
            file,
            delimiter,
            title_row,
            fill,
            max_lines,
        } => {
            let mut builder = CsvOptions::builder()
                .delimiter(delimiter)
                .title_row(title_row)
                .fill_missing_columns(fill);
            if let Some(max_lines) = max_lines {
                builder = builder.max_lines(max_lines);
            }
            let table = CsvTable::load(&file, &builder.build()?)?;
            let records: Vec<serde_json::Map<String, serde_json::Value>> = table
                .rows()
                .iter()
                .map(|row| {
                    table
                        .titles()
                        .iter()
                        .zip(row)
                        .map(|(title, cell)| (title.clone(), serde_json::json!(cell)))
                        .collect()
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Command::List { dir, pattern, dirs } => {
            let filter = pattern
                .as_deref()
                .map(fs::compile_filesystem_pattern)
                .transpose()?;
            for path in fs::list_recursive(&dir, !dirs, dirs, filter.as_ref())? {
                println!("{}", path.display());
            }
        }
    }

    Ok(())
}

fn read_paths(file: Option<&Path>) -> anyhow::Result<Vec<String>> {
    match file {
        Some(path) => Ok(fs::read_lines(path, true, false)?),
        None => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            Ok(content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect())
        }
    }
}

fn write_xml(generator: &mut XmlGenerator, node: &NamedTreeNode<String>) {
    for child in node.children() {
        let mut attributes = vec![("name", child.name())];
        if child.is_artificial() {
            attributes.push(("artificial", "true"));
        }
        if child.children().is_empty() {
            generator.tag("node", None, &attributes);
        } else {
            generator.open_tag("node", &attributes);
            write_xml(generator, child);
            generator.close_tag();
        }
    }
}
