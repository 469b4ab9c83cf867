use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{BufReader, Cursor};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::{Args, ValueEnum};
use inferno::collapse::Collapse;
use inferno::collapse::perf::Folder as PerfFolder;
use inferno::flamegraph::{Options, from_reader};
use xshell::{Shell, cmd};

/// Case names of `crates/mathbox/benches/cases.yaml`
const PERF_CASES: &[&str] = &[
    "NestedFractions",
    "ScriptedSum",
    "Radicals",
    "Delimited",
    "Matrix",
];

#[derive(Args)]
pub struct FlamegraphArgs {
    /// Sampling frequency passed to `perf record`.
    #[arg(long, default_value_t = 999)]
    frequency: u32,
    /// Call graph strategy to use when collecting samples.
    #[arg(long, value_enum, default_value_t = CallGraph::Dwarf)]
    call_graph: CallGraph,
    /// Restrict the Criterion benchmark to a single named case.
    #[arg(long, value_name = "NAME")]
    case: Option<String>,
    /// Cargo profile to build the benchmark with.
    #[arg(long, default_value = "profiling")]
    profile: String,
    /// Skip the warm-up build step (`cargo bench --no-run`).
    #[arg(long)]
    skip_build: bool,
    /// Output location for the generated SVG flamegraph.
    #[arg(long)]
    output: Option<Utf8PathBuf>,
    /// Persist the raw `perf.data` capture to this path.
    #[arg(long)]
    perf_data: Option<Utf8PathBuf>,
    /// Override the title rendered at the top of the flamegraph.
    #[arg(long)]
    title: Option<String>,
    /// Extra arguments passed verbatim to Criterion after the `--` separator.
    #[arg(last = true)]
    extra: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum CallGraph {
    Dwarf,
    FramePointer,
    Lbr,
}

impl CallGraph {
    const fn as_flag(self) -> &'static str {
        match self {
            Self::Dwarf => "dwarf",
            Self::FramePointer => "fp",
            Self::Lbr => "lbr",
        }
    }
}

pub fn run(args: FlamegraphArgs) -> Result<()> {
    ensure_command_available("perf")?;
    let root = workspace_root()?;

    let profile = args.profile.as_str();
    if !args.skip_build {
        let sh = Shell::new()?;
        sh.change_dir(&root);
        cmd!(sh, "cargo bench -p mathbox --bench perf --profile {profile} --no-run")
            .run()
            .context("failed to pre-build the benchmark")?;
    }

    let mut command: Vec<OsString> = ["cargo", "bench", "-p", "mathbox", "--bench", "perf"]
        .into_iter()
        .map(OsString::from)
        .collect();
    command.push("--profile".into());
    command.push(profile.into());
    if args.case.is_some() || !args.extra.is_empty() {
        command.push("--".into());
    }
    if let Some(case) = &args.case {
        validate_case(case)?;
        command.push("--bench".into());
        command.push(case.into());
    }
    command.extend(args.extra.iter().map(OsString::from));

    let target = root.join("target/flamegraphs");
    let invocation = PerfInvocation {
        working_dir: root.clone(),
        command,
        frequency: args.frequency,
        call_graph: args.call_graph,
        perf_data: args
            .perf_data
            .unwrap_or_else(|| target.join("layout.perf.data")),
        output: args.output.unwrap_or_else(|| target.join("layout.svg")),
        title: args
            .title
            .unwrap_or_else(|| format!("mathbox layout :: {}", args.case.as_deref().unwrap_or("all"))),
    };
    execute_perf(invocation)
}

fn validate_case(case: &str) -> Result<()> {
    if PERF_CASES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(case))
    {
        Ok(())
    } else {
        bail!(
            "unknown benchmark case `{case}`. Available cases: {}",
            PERF_CASES.join(", ")
        );
    }
}

fn workspace_root() -> Result<Utf8PathBuf> {
    let manifest_dir = Utf8PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    manifest_dir
        .parent()
        .map(Utf8Path::to_owned)
        .ok_or_else(|| anyhow!("failed to determine workspace root"))
}

fn ensure_command_available(program: &str) -> Result<()> {
    let status = Command::new(program)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(status) if status.success() => Ok(()),
        Ok(status) => bail!("command `{program}` exited with status {status}"),
        Err(err) => bail!("failed to execute `{program}`: {err}"),
    }
}

struct PerfInvocation {
    working_dir: Utf8PathBuf,
    command: Vec<OsString>,
    frequency: u32,
    call_graph: CallGraph,
    perf_data: Utf8PathBuf,
    output: Utf8PathBuf,
    title: String,
}

fn execute_perf(invocation: PerfInvocation) -> Result<()> {
    let PerfInvocation {
        working_dir,
        command,
        frequency,
        call_graph,
        perf_data,
        output,
        title,
    } = invocation;

    for path in [&output, &perf_data] {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
    }
    if perf_data.exists() {
        fs::remove_file(&perf_data)?;
    }

    let mut perf = Command::new("perf");
    perf.current_dir(&working_dir)
        .arg("record")
        .arg("-F")
        .arg(frequency.to_string())
        .arg("-g")
        .arg("--call-graph")
        .arg(call_graph.as_flag())
        .arg("-o")
        .arg(&perf_data)
        .arg("--")
        .args(&command);

    println!("[perf] recording {}", format_command(&command));
    run_command(perf).context("perf record failed")?;

    let mut child = Command::new("perf")
        .current_dir(&working_dir)
        .args(["script", "-i"])
        .arg(&perf_data)
        .stdout(Stdio::piped())
        .spawn()
        .context("failed to spawn `perf script`")?;
    let stdout = child
        .stdout
        .take()
        .context("failed to capture perf script output")?;

    let mut collapsed = Vec::new();
    PerfFolder::default()
        .collapse(BufReader::new(stdout), &mut collapsed)
        .context("failed to collapse perf samples")?;

    let status = child.wait()?;
    if !status.success() {
        bail!("`perf script` exited with status {status}");
    }

    let mut options = Options::default();
    options.count_name = "samples".to_owned();
    options.hash = true;
    options.title = title;

    let mut file = File::create(&output)?;
    from_reader(&mut options, Cursor::new(collapsed), &mut file)
        .context("failed to render flamegraph")?;

    println!("Flamegraph written to {output}");
    Ok(())
}

fn run_command(mut command: Command) -> Result<()> {
    let program = command.get_program().to_string_lossy().into_owned();
    let status = command
        .status()
        .with_context(|| format!("failed to spawn `{program}`"))?;
    if !status.success() {
        bail!("`{program}` exited with status {status}");
    }
    Ok(())
}

fn format_command(args: &[OsString]) -> String {
    args.iter()
        .map(|arg| {
            let value = arg.to_string_lossy();
            if value.contains(' ') {
                format!("\"{value}\"")
            } else {
                value.into_owned()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
