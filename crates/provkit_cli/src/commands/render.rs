//! Render command - Substitute placeholders in a template.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use tracing::info;

use provkit_files::{ConfirmHandle, File, FsNode, Template};

use super::{parse_key_value, path_attrs};

#[derive(Args)]
pub struct RenderArgs {
    /// Template file
    pub template: PathBuf,

    /// Placeholder and its value, applied in the order given
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub set: Vec<(String, String)>,

    /// Write the result here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn execute(args: RenderArgs, confirm: ConfirmHandle) -> Result<()> {
    info!("Rendering template {:?}", args.template);

    let source = File::new(path_attrs(&args.template)?).context("Invalid template file")?;
    if !source.exists() {
        bail!("Template not found: {}", source);
    }
    let mut template = Template::new(source);
    let rendered = template.apply_using(args.set)?;

    match args.output {
        Some(output) => {
            let mut file = File::new(path_attrs(&output)?)
                .context("Invalid output file")?
                .with_confirm(confirm);
            if !file.create_with(Some(&rendered))? {
                bail!("Failed to write {}", file);
            }
            println!("✅ Rendered {}", file);
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
