//! Inspection entry point.
//!
//! # Responsibility
//! - Verify `morphology_core` linkage and list the shipped presets.
//! - Resolve one artifact through a preset or JSON registry and print a
//!   one-line summary.

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use log::info;
use morphology_core::registry::presets;
use morphology_core::{AdapterKind, AdapterRegistry, LoadedArtifact, RegistryConfig, TriangleMesh};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

fn cli() -> Command {
    Command::new("morphology")
        .version(morphology_core::core_version())
        .about("Inspect path-referenced morphology artifacts")
        .subcommand_required(true)
        .arg(
            Arg::new("log-dir")
                .long("log-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Absolute directory for rolling log files"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .default_value(morphology_core::default_log_level())
                .help("trace|debug|info|warn|error"),
        )
        .subcommand(Command::new("version").about("Print crate version and build features"))
        .subcommand(
            Command::new("presets")
                .about("List shipped registry presets")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print each preset as a registry config"),
                ),
        )
        .subcommand(
            Command::new("inspect")
                .about("Store and load one artifact through a location's adapter")
                .arg(
                    Arg::new("preset")
                        .long("preset")
                        .conflicts_with_all(["config", "adapter"])
                        .required_unless_present_any(["config", "adapter"])
                        .help("Preset registry name"),
                )
                .arg(
                    Arg::new("adapter")
                        .long("adapter")
                        .conflicts_with("config")
                        .value_parser(parse_adapter_kind)
                        .help("Bind the location to this adapter kind only"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON registry config file"),
                )
                .arg(Arg::new("location").required(true).help("Storage location"))
                .arg(
                    Arg::new("path")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Artifact file"),
                ),
        )
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(matches: &ArgMatches) -> Result<(), Box<dyn Error>> {
    if let Some(log_dir) = matches.get_one::<PathBuf>("log-dir") {
        let level = matches
            .get_one::<String>("log-level")
            .map_or(morphology_core::default_log_level(), String::as_str);
        morphology_core::init_logging(level, log_dir)?;
    }

    match matches.subcommand() {
        Some(("version", _)) => {
            println!("morphology_core version={}", morphology_core::core_version());
            println!("morphology_core hdf5={}", morphology_core::hdf5_enabled());
            match morphology_core::logging_status() {
                Some((level, dir)) => {
                    println!("morphology_core logging={level} log_dir={}", dir.display())
                }
                None => println!("morphology_core logging=off"),
            }
        }
        Some(("presets", args)) => print_presets(args.get_flag("json"))?,
        Some(("inspect", args)) => inspect(args)?,
        _ => return Err("missing subcommand".into()),
    }
    Ok(())
}

fn print_presets(json: bool) -> Result<(), Box<dyn Error>> {
    for preset in presets::all() {
        let registry = preset.build()?;
        if json {
            let config = RegistryConfig::from_registry(&registry);
            println!("{}: {}", preset.name, config.to_json_string()?);
            continue;
        }
        println!("{}", preset.name);
        for (location, adapter) in registry.iter() {
            println!("  {location} adapter={} type={}", adapter.kind(), adapter.attribute_type());
        }
    }
    Ok(())
}

fn parse_adapter_kind(value: &str) -> Result<AdapterKind, String> {
    AdapterKind::parse(value).ok_or_else(|| {
        let known: Vec<&str> = AdapterKind::ALL.iter().map(|kind| kind.as_str()).collect();
        format!("unknown adapter `{value}`; expected {}", known.join("|"))
    })
}

fn inspect(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let location = args
        .get_one::<String>("location")
        .ok_or("missing location")?;
    let path = args.get_one::<PathBuf>("path").ok_or("missing path")?;
    let registry = match (
        args.get_one::<String>("preset"),
        args.get_one::<PathBuf>("config"),
        args.get_one::<AdapterKind>("adapter"),
    ) {
        (Some(name), _, _) => presets::by_name(name)?,
        (None, Some(config), _) => RegistryConfig::from_json_file(config)?.build()?,
        (None, None, Some(kind)) => AdapterRegistry::builder().bind(location, *kind)?.build(),
        (None, None, None) => return Err("missing registry source".into()),
    };

    let reference = registry.put(location, path)?;
    let loaded = registry.get(location, &reference)?;
    info!("event=cli_inspect module=cli status=ok location={location}");
    println!("{location} {reference}");
    println!("{loaded}");
    if let LoadedArtifact::Mesh(mesh) = &loaded {
        if let Some(line) = bounds_line(mesh) {
            println!("{line}");
        }
    }
    Ok(())
}

fn bounds_line(mesh: &TriangleMesh) -> Option<String> {
    let (min, max) = mesh.bounds()?;
    Some(format!("bounds min={min:?} max={max:?}"))
}

#[cfg(test)]
mod tests {
    use super::{bounds_line, cli};
    use morphology_core::{AdapterKind, TriangleMesh};

    #[test]
    fn cli_definition_is_consistent() {
        cli().debug_assert();
    }

    #[test]
    fn inspect_requires_registry_source() {
        let result = cli().try_get_matches_from(["morphology", "inspect", "h01_faces", "/tmp/x"]);
        assert!(result.is_err());
    }

    #[test]
    fn inspect_accepts_adapter_kind_as_registry_source() {
        let matches = cli()
            .try_get_matches_from([
                "morphology",
                "inspect",
                "--adapter",
                "numpy",
                "skeletons",
                "/tmp/x.npy",
            ])
            .unwrap();
        let (_, args) = matches.subcommand().unwrap();
        assert_eq!(
            args.get_one::<AdapterKind>("adapter"),
            Some(&AdapterKind::Numpy)
        );

        let unknown = cli().try_get_matches_from([
            "morphology",
            "inspect",
            "--adapter",
            "trimesh",
            "skeletons",
            "/tmp/x.npy",
        ]);
        assert!(unknown.is_err());
    }

    #[test]
    fn bounds_line_skips_empty_meshes() {
        let mesh = TriangleMesh::new(
            vec![[0.0, -1.0, 2.0], [3.0, 1.0, 0.5], [1.0, 0.0, 0.0]],
            vec![[0, 1, 2]],
        );
        assert_eq!(
            bounds_line(&mesh).unwrap(),
            "bounds min=[0.0, -1.0, 0.0] max=[3.0, 1.0, 2.0]"
        );
        assert_eq!(bounds_line(&TriangleMesh::new(Vec::new(), Vec::new())), None);
    }
}
