//! List installed applications

use anyhow::Result;
use batis_apps::installed_applications;
use batis_core::SchemeKind;

use super::schemes_for;
use crate::cli::ListArgs;

pub fn run(args: ListArgs, scheme: Option<SchemeKind>) -> Result<()> {
    let apps = installed_applications(&schemes_for(scheme)?)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&apps)?);
        return Ok(());
    }

    let mut names: Vec<&str> = apps.iter().map(|app| app.name.as_str()).collect();
    names.sort_unstable();
    for name in names {
        println!("{}", name);
    }
    Ok(())
}
