// Copyright 2023 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Convert an OpenOffice.org (SDF) localization file to a Gettext PO
//! localization file.
//!
//! The input is a single SDF file, or a directory of SDF files which
//! are merged into one catalog. Nothing is written when the input
//! yields no translation units.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::{error, info, warn};
use walkdir::WalkDir;

use sdf2po::catalog::DuplicateStyle;
use sdf2po::convert::{infer_source_language, Converter};
use sdf2po::sdf::SdfFile;

/// Key naming for single versus merged inputs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, clap::ValueEnum)]
enum MultifileStyle {
    /// Short keys, suitable for a catalog built from one file.
    #[default]
    Single,
    /// Fully-qualified keys that stay unique when several files are
    /// merged into one catalog.
    Onefile,
}

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// SDF file to read, or a directory of SDF files to merge.
    input: PathBuf,
    /// PO file to write.
    output: PathBuf,
    /// Set target language to extract from the SDF file (e.g. af-ZA).
    #[arg(short = 'l', long = "language", value_name = "LANG")]
    target_language: Option<String>,
    /// Set source language code (default en-US).
    #[arg(long, value_name = "LANG")]
    source_language: Option<String>,
    /// Generate a POT file with blank translations.
    #[arg(short = 'P', long)]
    pot: bool,
    /// What to do with duplicate source strings.
    #[arg(long, value_enum, default_value_t)]
    duplicates: DuplicateStyle,
    /// Key style for single versus merged inputs.
    #[arg(long, value_enum, default_value_t)]
    multifile: MultifileStyle,
    /// Don't recurse into subdirectories when the input is a
    /// directory.
    #[arg(long)]
    nonrecursive_input: bool,
}

/// Read the input into one SDF store, merging all `*.sdf` files when
/// the input is a directory.
fn read_store(input: &Path, recursive: bool) -> anyhow::Result<SdfFile> {
    let mut store = SdfFile::new(input.display().to_string());
    if input.is_dir() {
        let mut walker = WalkDir::new(input).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && entry.path().extension().is_some_and(|ext| ext == "sdf")
            {
                info!("reading {}", entry.path().display());
                let bytes = fs::read(entry.path())
                    .with_context(|| format!("Could not read {}", entry.path().display()))?;
                store.parse(&bytes);
            }
        }
    } else {
        let bytes =
            fs::read(input).with_context(|| format!("Could not read {}", input.display()))?;
        store.parse(&bytes);
    }
    Ok(store)
}

/// Run one conversion. Returns `false` when the catalog came out empty
/// and no output was written.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let store = read_store(&cli.input, !cli.nonrecursive_input)?;
    let source_language = cli.source_language.clone().unwrap_or_else(|| {
        infer_source_language(cli.target_language.as_deref(), &store.languages)
    });
    let converter = Converter::new(
        source_language,
        cli.target_language.clone(),
        cli.pot,
        cli.multifile == MultifileStyle::Onefile,
    );
    let (catalog, diagnostics) = converter.convert_file(&store, cli.duplicates);
    for diagnostic in &diagnostics {
        if diagnostic.is_error() {
            error!("{diagnostic}");
        } else {
            warn!("{diagnostic}");
        }
    }
    if catalog.is_empty() {
        return Ok(false);
    }

    let file = File::create(&cli.output)
        .with_context(|| format!("Could not create {}", cli.output.display()))?;
    let mut writer = BufWriter::new(file);
    catalog
        .write_to(&mut writer)
        .with_context(|| format!("Could not write {}", cli.output.display()))?;
    writer.flush()?;
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().filter_or("RUST_LOG", "info"));
    let cli = Cli::parse();
    if !cli.pot && cli.target_language.is_none() {
        anyhow::bail!("You must specify the target language unless generating POT files (-P)");
    }
    if !run(&cli)? {
        info!(
            "no translatable content found in {}, not writing {}",
            cli.input.display(),
            cli.output.display()
        );
    }
    Ok(())
}
