//! Arming gate demo on a simulated vehicle.
//!
//! Spawns the requested external authorisers, runs the 1 Hz pre-arm loop
//! until the gate opens, then arms and disarms once over MAVLink.
//!
//! Usage:
//!   cargo run -p armgate_sitl --bin armgate-sitl -- [OPTIONS]
//!
//! Options:
//!   -a, --authorizers <N>    External authorisers to spawn (default: 1)
//!   --approve-after <SECS>   Delay before each authoriser answers (default: 2.5)
//!   --refuse <REASON>        First authoriser refuses with REASON
//!   --imus <N>               Simulated inertial sensors (default: 1)
//!   --cycles <N>             Pre-arm cycles before giving up (default: 30)
//!   --log-level <FILTER>     tracing filter (default: info)

use std::env;
use std::process;
use std::time::Duration;

use armgate_core::arming::{ArmMethod, ArmingSystem};
use armgate_core::parameters::ArmingParams;
use armgate_sitl::{
    spawn_authorizer, FixedDecision, PrearmLoop, SimVehicle, SitlError, TokioTime, TracingSink,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

struct Args {
    authorizers: u8,
    approve_after: Duration,
    refuse: Option<String>,
    imus: u8,
    cycles: u32,
    log_level: String,
}

fn parse_args() -> Args {
    let mut args = Args {
        authorizers: 1,
        approve_after: Duration::from_millis(2_500),
        refuse: None,
        imus: 1,
        cycles: 30,
        log_level: "info".to_string(),
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "-a" | "--authorizers" => {
                i += 1;
                args.authorizers = parse_arg(&raw, i, "authorizers");
            }
            "--approve-after" => {
                i += 1;
                let secs: f64 = parse_arg(&raw, i, "approve-after");
                args.approve_after = Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
                    eprintln!("Error: invalid value for --approve-after");
                    process::exit(1);
                });
            }
            "--refuse" => {
                i += 1;
                args.refuse = Some(parse_arg(&raw, i, "refuse"));
            }
            "--imus" => {
                i += 1;
                args.imus = parse_arg(&raw, i, "imus");
            }
            "--cycles" => {
                i += 1;
                args.cycles = parse_arg(&raw, i, "cycles");
            }
            "--log-level" => {
                i += 1;
                args.log_level = parse_arg(&raw, i, "log-level");
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown option: {other}");
                print_usage();
                process::exit(1);
            }
        }
        i += 1;
    }

    if args.cycles == 0 {
        eprintln!("Error: cycles must be at least 1");
        process::exit(1);
    }

    args
}

fn parse_arg<T: std::str::FromStr>(raw: &[String], i: usize, name: &str) -> T {
    raw.get(i)
        .unwrap_or_else(|| {
            eprintln!("Error: --{name} requires a value");
            process::exit(1);
        })
        .parse()
        .unwrap_or_else(|_| {
            eprintln!("Error: invalid value for --{name}");
            process::exit(1);
        })
}

fn print_usage() {
    eprintln!(
        "Usage: armgate-sitl [OPTIONS]\n\
         \n\
         Options:\n\
         \x20 -a, --authorizers <N>    External authorisers to spawn (default: 1)\n\
         \x20 --approve-after <SECS>   Delay before each authoriser answers (default: 2.5)\n\
         \x20 --refuse <REASON>        First authoriser refuses with REASON\n\
         \x20 --imus <N>               Simulated inertial sensors (default: 1)\n\
         \x20 --cycles <N>             Pre-arm cycles before giving up (default: 30)\n\
         \x20 --log-level <FILTER>     tracing filter (default: info)\n\
         \x20 -h, --help               Show this help"
    );
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run(args: Args) -> Result<(), SitlError> {
    if args.imus == 0 {
        return Err(SitlError::InvalidArgument(
            "--imus must be at least 1".to_string(),
        ));
    }
    let vehicle = SimVehicle::new(args.imus);
    let sink = TracingSink::new();
    let mut gate = ArmingSystem::new(
        ArmingParams::default(),
        TokioTime::new(),
        &sink,
        vehicle.collaborators(),
    );

    let mut handles = Vec::new();
    for n in 0..args.authorizers {
        let name = format!("authoriser-{n}");
        let authorizer = match (&args.refuse, n) {
            (Some(reason), 0) => {
                FixedDecision::refuse_after(name, args.approve_after, Some(reason.clone()))
            }
            _ => FixedDecision::approve_after(name, args.approve_after),
        };
        // A refused slot still blocks arming, so keep going
        match spawn_authorizer(gate.aux_auth(), authorizer) {
            Ok(handle) => handles.push(handle),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    let cycles = PrearmLoop::new()
        .run_until_ready(&mut gate, args.cycles)
        .await?;
    tracing::info!(cycles, "gate open");

    gate.arm(ArmMethod::Mavlink, true)?;
    tokio::time::sleep(Duration::from_secs(1)).await;
    if let Some(ms) = gate.arm_duration_ms() {
        tracing::info!(armed_ms = ms, "armed");
    }
    gate.disarm(ArmMethod::Mavlink, true)?;

    for handle in handles {
        handle.join().await?;
    }
    tracing::info!(events = vehicle.logger.events().len(), "arm events logged");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = parse_args();
    init_tracing(&args.log_level);

    if let Err(e) = run(args).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
