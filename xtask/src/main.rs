use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use geotree_core::functions::accessors::count_vertices;
use geotree_core::binary::{self, EncodeOptions};
use geotree_core::wkt::{self, WriteOptions};
use geotree_core::GeometryError;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::SubscriberBuilder;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let Some(cmd) = args.next() else {
        print_usage();
        return Err("missing command".to_string());
    };

    match cmd.as_str() {
        "precommit" => {
            let mut full = false;
            for arg in args {
                match arg.as_str() {
                    "--full" => full = true,
                    "--ci" => {}
                    _ => return Err(format!("unknown precommit flag: {arg}")),
                }
            }
            precommit(full)
        }
        "install-hooks" => install_hooks(),
        "roundtrip" => {
            let Some(path) = args.next() else {
                return Err("roundtrip needs a file of WKT lines".to_string());
            };
            let mut opts = WriteOptions::default();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--iso" => opts = WriteOptions::iso(opts.precision),
                    "--extended" => opts = WriteOptions::extended(opts.precision),
                    "--verbose" => SubscriberBuilder::default()
                        .with_max_level(LevelFilter::DEBUG)
                        .with_target(false)
                        .with_writer(io::stderr)
                        .init(),
                    "--precision" => {
                        let value = args
                            .next()
                            .ok_or_else(|| "--precision needs a value".to_string())?;
                        opts.precision = value
                            .parse()
                            .map_err(|_| format!("invalid precision: {value}"))?;
                    }
                    _ => return Err(format!("unknown roundtrip flag: {arg}")),
                }
            }
            roundtrip(Path::new(&path), opts)
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        _ => {
            print_usage();
            Err(format!("unknown command: {cmd}"))
        }
    }
}

fn print_usage() {
    eprintln!("xtask commands:");
    eprintln!("  precommit [--full] [--ci]");
    eprintln!("  install-hooks");
    eprintln!("  roundtrip <file> [--iso|--extended] [--precision N] [--verbose]");
}

fn repo_root() -> Result<PathBuf, String> {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| "xtask must live inside the workspace".to_string())
}

fn precommit(full: bool) -> Result<(), String> {
    let root = repo_root()?;
    let mut steps: Vec<Vec<&str>> = vec![
        vec!["cargo", "fmt", "--all", "--", "--check"],
        vec![
            "cargo",
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
        vec!["cargo", "test", "--workspace"],
    ];

    if full {
        steps.extend([
            vec!["cargo", "test", "-p", "geotree-core", "--release"],
            vec!["cargo", "doc", "-p", "geotree-core", "--no-deps"],
        ]);
    }

    for step in steps {
        run_step(&root, &step)?;
    }
    Ok(())
}

fn run_step(cwd: &Path, args: &[&str]) -> Result<(), String> {
    let (bin, rest) = args
        .split_first()
        .ok_or_else(|| "empty command step".to_string())?;
    eprintln!("+ {}", args.join(" "));

    let status = Command::new(bin)
        .args(rest)
        .current_dir(cwd)
        .status()
        .map_err(io_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("command failed: {}", args.join(" ")))
    }
}

fn install_hooks() -> Result<(), String> {
    let root = repo_root()?;
    let hook_path = root.join(".git/hooks/pre-commit");
    let script = format!(
        "#!/usr/bin/env sh\nset -eu\ncd \"{}\"\ncargo run --quiet -p xtask -- precommit\n",
        root.display()
    );

    if let Some(parent) = hook_path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(&hook_path, script).map_err(io_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&hook_path).map_err(io_err)?.permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&hook_path, perms).map_err(io_err)?;
    }

    println!("installed pre-commit hook at {}", hook_path.display());
    Ok(())
}

/// Parse every non-blank line of `path`, push it through the binary codec and
/// print it back in the requested dialect. Fails on the first line that does
/// not survive the trip unchanged.
fn roundtrip(path: &Path, opts: WriteOptions) -> Result<(), String> {
    let text = fs::read_to_string(path).map_err(io_err)?;
    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let at = |e: GeometryError| format!("{}:{}: {e}", path.display(), lineno + 1);
        let geom = wkt::parse(line).map_err(at)?;
        let buf = binary::encode(&geom, EncodeOptions::new(true, true)).map_err(at)?;
        let back = binary::decode(&buf).map_err(at)?;
        if back != geom {
            return Err(format!(
                "{}:{}: binary round trip changed the geometry",
                path.display(),
                lineno + 1
            ));
        }
        println!(
            "{}\tsrid={}\t{} vertices\t{} bytes\t{}",
            wkt::write(&back, opts),
            back.srid(),
            count_vertices(&back),
            buf.len(),
            binary::to_hex(&buf)
        );
    }
    Ok(())
}

fn io_err(e: io::Error) -> String {
    e.to_string()
}
