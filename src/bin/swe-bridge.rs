use std::path::PathBuf;

use sweph_bridge::ephemeris::consts::{self, HSYS_PLACIDUS};
use sweph_bridge::ephemeris::{Ephemeris, ANGLES_LEN, CUSPS_LEN, POSITION_LEN};
use sweph_bridge::logging::{self, LogConfig};
use sweph_bridge::{Bridge, Config, GuestMemory, GuestOffset, Request};

/// Scratch guest memory layout
const MEMORY_SIZE: usize = 4096;
const OUT_AT: u32 = 64;
const CUSPS_AT: u32 = 128;
const ASCMC_AT: u32 = 256;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Command {
    Probe,
    Houses,
    PrintConfig,
    Help,
}

#[derive(Debug, Clone)]
struct CliConfig {
    command: Command,
    config_path: Option<PathBuf>,
    library: Option<String>,
    julian_day: Option<f64>,
    latitude: f64,
    longitude: f64,
    hsys: i32,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            command: Command::Probe,
            config_path: None,
            library: None,
            julian_day: None,
            latitude: 47.37,
            longitude: 8.55,
            hsys: HSYS_PLACIDUS,
        }
    }
}

fn usage(program: &str) -> String {
    format!(
        "Usage: {program} [OPTIONS] [probe|houses|config]\n\nOptions:\n  \
         --config PATH   Read settings from PATH instead of searching for swe-bridge.toml\n  \
         --library PATH  Swiss Ephemeris shared library to load\n  \
         --jd DAYS       Julian day (UT) to compute for (default: J2000)\n  \
         --lat DEG       Geographic latitude for houses (default: 47.37)\n  \
         --lon DEG       Geographic longitude for houses (default: 8.55)\n  \
         --hsys LETTER   House system letter (default: P)"
    )
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires an argument"))
}

fn number(args: &[String], i: usize, flag: &str) -> Result<f64, String> {
    value(args, i, flag)?
        .parse()
        .map_err(|_| format!("Invalid value for {flag}"))
}

fn parse_args(args: &[String]) -> Result<CliConfig, String> {
    let program = args.first().map(String::as_str).unwrap_or("swe-bridge");

    let mut config = CliConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => config.command = Command::Help,
            "--config" => {
                i += 1;
                config.config_path = Some(PathBuf::from(value(args, i, "--config")?));
            }
            "--library" => {
                i += 1;
                config.library = Some(value(args, i, "--library")?.to_string());
            }
            "--jd" => {
                i += 1;
                config.julian_day = Some(number(args, i, "--jd")?);
            }
            "--lat" => {
                i += 1;
                config.latitude = number(args, i, "--lat")?;
            }
            "--lon" => {
                i += 1;
                config.longitude = number(args, i, "--lon")?;
            }
            "--hsys" => {
                i += 1;
                let letter = value(args, i, "--hsys")?;
                config.hsys = match letter.as_bytes() {
                    [b] if b.is_ascii_alphabetic() => consts::house_system(*b),
                    _ => return Err(format!("Invalid house system: {letter}")),
                };
            }
            "probe" => config.command = Command::Probe,
            "houses" => config.command = Command::Houses,
            "config" => config.command = Command::PrintConfig,
            other => return Err(format!("Unknown argument: {other}\n\n{}", usage(program))),
        }
        i += 1;
    }

    Ok(config)
}

/// Decode `count` native-endian doubles the bridge wrote at `at`
fn read_f64s(memory: &GuestMemory<'_>, at: u32, count: usize) -> Vec<f64> {
    let start = at as usize;
    memory.as_slice()[start..start + count * 8]
        .chunks_exact(8)
        .map(|chunk| {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(chunk);
            f64::from_ne_bytes(raw)
        })
        .collect()
}

fn julian_day<E: Ephemeris>(bridge: &mut Bridge<E>, cli: &CliConfig) -> f64 {
    cli.julian_day
        .unwrap_or_else(|| bridge.julday(2000, 1, 1, 12.0, consts::GREG_CAL))
}

fn probe<E: Ephemeris>(bridge: &mut Bridge<E>, cli: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut scratch = vec![0u8; MEMORY_SIZE];
    let mut memory = GuestMemory::new(&mut scratch);

    let jd = julian_day(bridge, cli);
    println!("julian day (UT): {jd:.6}");

    let status = bridge
        .handle(
            &mut memory,
            Request::CalcUt {
                tjd_ut: jd,
                body: consts::SUN,
                flags: consts::FLG_SWIEPH | consts::FLG_SPEED,
                out: GuestOffset::new(OUT_AT),
            },
        )?
        .into_wire_i32();

    if status < 0 {
        println!("sun: library reported error {status}");
        return Ok(());
    }

    let xx = read_f64s(&memory, OUT_AT, POSITION_LEN);
    println!(
        "sun: lon {:.6} lat {:.6} dist {:.9} speed {:.6} (flags {status})",
        xx[0], xx[1], xx[2], xx[3]
    );
    println!("obliquity: {:.6}", bridge.obliquity(jd, 0));
    Ok(())
}

fn houses<E: Ephemeris>(bridge: &mut Bridge<E>, cli: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut scratch = vec![0u8; MEMORY_SIZE];
    let mut memory = GuestMemory::new(&mut scratch);

    let jd = julian_day(bridge, cli);
    let status = bridge
        .handle(
            &mut memory,
            Request::Houses {
                tjd_ut: jd,
                geolat: cli.latitude,
                geolon: cli.longitude,
                hsys: cli.hsys,
                cusps: GuestOffset::new(CUSPS_AT),
                ascmc: GuestOffset::new(ASCMC_AT),
            },
        )?
        .into_wire_i32();

    println!(
        "houses at jd {jd:.6}, lat {} lon {} (status {status})",
        cli.latitude, cli.longitude
    );
    let cusps = read_f64s(&memory, CUSPS_AT, CUSPS_LEN);
    for (house, cusp) in cusps.iter().enumerate().skip(1) {
        println!("  {house:>2}: {cusp:.6}");
    }
    let angles = read_f64s(&memory, ASCMC_AT, ANGLES_LEN);
    println!("  asc: {:.6}  mc: {:.6}  armc: {:.6}", angles[0], angles[1], angles[2]);
    Ok(())
}

fn run(cli: CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::PrintConfig => {
            print!("{}", Config::generate_default());
            return Ok(());
        }
        Command::Help => {
            println!("{}", usage("swe-bridge"));
            return Ok(());
        }
        Command::Probe | Command::Houses => {}
    }

    let mut config = match &cli.config_path {
        Some(path) => Config::load(path)?,
        None => Config::discover(),
    };
    logging::init_with_config(LogConfig::from_config(&config.logging).with_env());

    config = config.with_env();
    if let Some(library) = &cli.library {
        config.library.path = library.clone();
    }

    let mut bridge = sweph_bridge::open(&config)?;
    match cli.command {
        Command::Probe => probe(&mut bridge, &cli)?,
        Command::Houses => houses(&mut bridge, &cli)?,
        Command::PrintConfig | Command::Help => {}
    }
    bridge.close();
    Ok(())
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let cli = match parse_args(&args) {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
