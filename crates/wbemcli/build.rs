//! Build script: renders `wbemcli.1` from the clap definitions.
//!
//! The page lands in `target/generated-man/<target>/<profile>` for packaging
//! and is also staged in `OUT_DIR`.

use std::env;
use std::error::Error;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_mangen::Man;
use wbemcli_build_util::{man_page_dir, manual_date, write_man_page};

#[path = "src/cli.rs"]
#[expect(dead_code, reason = "the build script only needs the command definition")]
mod cli;

const WATCHED_VARIABLES: [&str; 4] = ["CARGO_PKG_VERSION", "SOURCE_DATE_EPOCH", "TARGET", "PROFILE"];

fn env_or(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_owned())
}

fn render_page(warnings: &mut Vec<String>) -> Result<(String, Vec<u8>), Box<dyn Error>> {
    let command = cli::Cli::command();
    let binary_name = env_or("CARGO_BIN_NAME", command.get_name());
    let version = env::var("CARGO_PKG_VERSION")
        .map_err(|_| "CARGO_PKG_VERSION is not set; the manual page needs a version")?;
    let date = manual_date(env::var("SOURCE_DATE_EPOCH").ok().as_deref(), warnings);

    let mut page = Vec::new();
    Man::new(command)
        .section("1")
        .source(format!("{binary_name} {version}"))
        .date(date)
        .render(&mut page)?;
    Ok((format!("{binary_name}.1"), page))
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let mut warnings = Vec::new();
    let (page_name, page) = render_page(&mut warnings)?;
    for warning in &warnings {
        println!("cargo:warning={warning}");
    }

    let out_dir = env::var_os("OUT_DIR").map(PathBuf::from);
    let packaged = man_page_dir(
        &env_or("TARGET", "unknown-target"),
        &env_or("PROFILE", "unknown-profile"),
        out_dir.as_deref(),
    );
    write_man_page(&page, &packaged, &page_name)?;

    if let Some(out_dir) = out_dir
        && let Err(error) = write_man_page(&page, &out_dir, &page_name)
    {
        println!(
            "cargo:warning=could not stage {page_name} in {}: {error}",
            out_dir.display()
        );
    }
    Ok(())
}
