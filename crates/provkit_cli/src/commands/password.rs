//! Password command - Generate a random password.

use anyhow::Result;
use clap::Args;

use provkit_input::{generate_pw, CharSet, DEFAULT_LENGTH};

#[derive(Args)]
pub struct PasswordArgs {
    /// Number of characters
    #[arg(short, long, default_value_t = DEFAULT_LENGTH)]
    pub length: usize,
}

pub fn execute(args: PasswordArgs) -> Result<()> {
    println!("{}", generate_pw(args.length, &CharSet::default())?);
    Ok(())
}
