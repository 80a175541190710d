use anyhow::Result;
use chronicle::build::{build_site, index_site};
use chronicle::config::Config;
use chronicle::data::{get_path, POSTS_KEY};
use clap::{App, AppSettings, Arg, ArgMatches, SubCommand};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let project = Arg::with_name("project")
        .help("The project directory (or any directory below it)")
        .default_value(".");

    let matches = App::new("chronicle")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Indexes blog posts and renders them with prev/next navigation")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(
            SubCommand::with_name("build")
                .about("Indexes and renders every post")
                .arg(project.clone())
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("_site")
                        .help("The output directory"),
                ),
        )
        .subcommand(
            SubCommand::with_name("index")
                .about("Prints the post index as YAML")
                .arg(project),
        )
        .get_matches();

    match matches.subcommand() {
        ("build", Some(matches)) => build(matches),
        ("index", Some(matches)) => index(matches),
        _ => unreachable!("clap requires a subcommand"),
    }
}

fn load(matches: &ArgMatches, output: &str) -> Result<Config> {
    let project = matches.value_of("project").unwrap_or(".");
    Config::from_directory(&Path::new(project).canonicalize()?, Path::new(output))
}

fn build(matches: &ArgMatches) -> Result<()> {
    let config = load(matches, matches.value_of("output").unwrap_or("_site"))?;
    let index = build_site(&config)?;
    info!(
        posts = index.len(),
        output = %config.output_directory.display(),
        "build complete"
    );
    Ok(())
}

fn index(matches: &ArgMatches) -> Result<()> {
    let config = load(matches, "_site")?;
    let data = index_site(&config)?;
    if let Some(posts) = get_path(&data, POSTS_KEY) {
        print!("{}", serde_yaml::to_string(posts)?);
    }
    Ok(())
}
