//! Parse command - Read or rewrite regex-defined fields in a file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{File, FsNode, Parsable};

use super::{parse_key_value, path_attrs};

#[derive(Args)]
pub struct ParseArgs {
    /// File to parse
    pub file: PathBuf,

    /// Field name and the pattern that locates it
    #[arg(
        long = "field",
        value_name = "NAME=REGEX",
        value_parser = parse_key_value,
        required = true
    )]
    pub fields: Vec<(String, String)>,

    /// New value for a field
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Write the changed content back to the file
    #[arg(long, requires = "set")]
    pub save: bool,
}

pub fn execute(args: ParseArgs) -> Result<()> {
    info!("Parsing {:?}", args.file);

    let file = File::new(path_attrs(&args.file)?).context("Invalid file")?;
    if !file.exists() {
        bail!("File not found: {}", file);
    }

    let mut parsable = Parsable::new(file);
    parsable.setup_parsing(
        args.fields
            .iter()
            .map(|(name, pattern)| (name.as_str(), pattern.as_str())),
    )?;

    for (name, value) in &args.set {
        parsable.set(name, value)?;
    }

    let names: Vec<String> = parsable.field_names().map(str::to_string).collect();
    for name in names {
        match parsable.get(&name)? {
            Some(value) => {
                for line in value.values() {
                    println!("{}: {}", name, line);
                }
            }
            None => println!("{}: <unset>", name),
        }
    }

    if args.save {
        let mut file = parsable.into_inner();
        if !file.overwrite(None, None)? {
            bail!("Failed to write {}", file);
        }
        println!("✅ Saved {}", file);
    }
    Ok(())
}
