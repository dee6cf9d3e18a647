use anyhow::{Context, Result};
use artifacts::Environment;
use warehouse::{NameOpts, default_registry, qualified_name};

/// Print the table inventory with names qualified for the current
/// environment.
#[allow(clippy::print_stdout)]
pub fn tables_command(project: Option<&str>, staging: bool) -> Result<()> {
    let env = Environment::from_env().context("reading CALITP_ENV")?;
    let opts = NameOpts { project, staging };

    for entry in default_registry().iter() {
        let name = qualified_name(env, entry.dataset, entry.table, opts);
        println!("{name}");
        println!("  {}", entry.description);
    }
    Ok(())
}
