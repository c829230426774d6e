//! counter-forge – command-line HTML → generated-content JSON converter.
//!
//! Usage:
//!   counter-forge <input.html> [output.json] [--title T] [--no-markers]
//!                 [--font path.ttf] [--max-depth N]
//!   counter-forge --demo <name> [output.json]
//!
//! If `output.json` is omitted the tree is written next to the input file
//! with the same stem (e.g. `report.html` → `report.json`).

use std::{env, fs, path::PathBuf, process};

use counter_forge::fonts::GlyphCoverage;
use counter_forge::pipeline::{generate_content, PipelineConfig};
use counter_forge::templates;

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    let mut input_path: Option<PathBuf> = None;
    let mut output_path: Option<PathBuf> = None;
    let mut title: Option<String> = None;
    let mut font_path: Option<PathBuf> = None;
    let mut demo: Option<String> = None;
    let mut config = PipelineConfig::default();
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--title" | "-t" => title = Some(flag_value(&mut iter, arg, &args[0])),
            "--no-markers" => config.list_markers = false,
            "--font" | "-f" => {
                font_path = Some(PathBuf::from(flag_value(&mut iter, arg, &args[0])))
            }
            "--max-depth" => {
                let value = flag_value(&mut iter, arg, &args[0]);
                config.max_depth = match value.parse() {
                    Ok(n) => n,
                    Err(_) => {
                        eprintln!("Error: --max-depth expects a number, got '{value}'");
                        process::exit(1);
                    }
                };
            }
            "--demo" => demo = Some(flag_value(&mut iter, arg, &args[0])),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => {
                eprintln!("Unknown flag: {other}");
                print_usage(&args[0]);
                process::exit(1);
            }
            path => {
                // With --demo the only positional argument is the output.
                if positional == 0 && demo.is_none() {
                    input_path = Some(PathBuf::from(path));
                } else if output_path.is_none() {
                    output_path = Some(PathBuf::from(path));
                } else {
                    eprintln!("Unexpected argument: {path}");
                    print_usage(&args[0]);
                    process::exit(1);
                }
                positional += 1;
            }
        }
    }

    let (html, default_title, output) = match (&demo, input_path) {
        (Some(name), _) => {
            let Some(html) = templates::template(name) else {
                let names: Vec<&str> = templates::all_templates().iter().map(|(n, _)| *n).collect();
                eprintln!("Error: unknown demo '{name}' (available: {})", names.join(", "));
                process::exit(1);
            };
            let output = output_path.unwrap_or_else(|| PathBuf::from(format!("{name}.json")));
            (html.to_string(), name.clone(), output)
        }
        (None, Some(input)) => {
            let html = match fs::read_to_string(&input) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error reading '{}': {e}", input.display());
                    process::exit(1);
                }
            };
            // Default title: stem of the input filename.
            let default_title = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("counter-forge output")
                .to_string();
            // Default output: same directory + same stem as input, but with .json
            let output = output_path.unwrap_or_else(|| {
                let mut o = input.clone();
                o.set_extension("json");
                o
            });
            (html, default_title, output)
        }
        (None, None) => {
            eprintln!("Error: no input file specified.");
            print_usage(&args[0]);
            process::exit(1);
        }
    };
    config.title = title.unwrap_or(default_title);

    let tree = match generate_content(&html, &config) {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("Error generating content: {e}");
            process::exit(1);
        }
    };

    if let Some(path) = font_path {
        let coverage = fs::read(&path)
            .map_err(counter_forge::Error::from)
            .and_then(|bytes| GlyphCoverage::from_font_bytes(&bytes));
        match coverage {
            Ok(coverage) => {
                for style in coverage.uncovered(&tree.glyph_styles) {
                    let missing: String = coverage.missing_glyphs(*style).into_iter().collect();
                    eprintln!(
                        "Warning: font '{}' lacks glyphs for {style} numbering: {missing}",
                        path.display()
                    );
                }
            }
            Err(e) => {
                eprintln!("Error loading font '{}': {e}", path.display());
                process::exit(1);
            }
        }
    }

    // Create output directory if necessary.
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("Error creating output directory: {e}");
                process::exit(1);
            }
        }
    }
    if let Err(e) = fs::write(&output, tree.to_json()) {
        eprintln!("Error writing '{}': {e}", output.display());
        process::exit(1);
    }
    let nodes = tree.node_count();
    let pages = tree.page_counters().len();
    eprintln!(
        "Wrote '{}' ({} node{}, {} page placeholder{})",
        output.display(),
        nodes,
        if nodes == 1 { "" } else { "s" },
        pages,
        if pages == 1 { "" } else { "s" }
    );
}

fn flag_value<'a>(iter: &mut impl Iterator<Item = &'a String>, flag: &str, prog: &str) -> String {
    match iter.next() {
        Some(v) => v.clone(),
        None => {
            eprintln!("Error: {flag} expects a value");
            print_usage(prog);
            process::exit(1);
        }
    }
}

fn print_usage(prog: &str) {
    eprintln!("counter-forge – CSS counter and generated content resolver");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <input.html> [output.json] [--title T] [--no-markers]");
    eprintln!("      [--font path.ttf] [--max-depth N]");
    eprintln!("  {prog} --demo <name> [output.json]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <input.html>   HTML file with <style> blocks and counter properties");
    eprintln!("  [output.json]  Output path (default: same stem as input with .json)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --title, -t    Title recorded in the content tree (default: input filename stem)");
    eprintln!("  --no-markers   Do not generate ::marker boxes for list items");
    eprintln!("  --font, -f     Warn about numbering styles this TTF/OTF font can not render");
    eprintln!("  --max-depth    Maximum element nesting (default: 512)");
    eprintln!("  --demo         Convert a built-in sample: report, nested-lists,");
    eprintln!("                 list-styles, cross-references, minimal");
    eprintln!("  --help         Print this message");
}
