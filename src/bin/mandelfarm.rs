extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate mandelfarm;
extern crate num;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use mandelfarm::bitmap::write_image;
use mandelfarm::error::{ConfigError, MandelError};
use mandelfarm::scheduler::STRATEGY_NAMES;
use mandelfarm::{render, RenderConfig, Strategy};
use num::Complex;
use std::env;
use std::path::PathBuf;
use std::process;
use std::str::FromStr;
use std::time::Instant;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn parse_complex(s: &str) -> Option<Complex<f32>> {
    match parse_pair(s, ',') {
        Some((re, im)) => Some(Complex { re, im }),
        None => None,
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ITERATIONS: &str = "iterations";
const ORIGIN: &str = "origin";
const EXTENT: &str = "extent";
const PROCESSES: &str = "processes";
const STRATEGY: &str = "strategy";

fn args<'a>(default_processes: &'a str) -> ArgMatches<'a> {
    App::new("mandelfarm")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot renderer that farms columns out to worker ranks")
        .arg(
            Arg::with_name(OUTPUT)
                .required(false)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .default_value("Mandelbrot.bmp")
                .help("Output file; .pgm or .pnm writes a graymap, anything else a bitmap"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("400")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        16_384,
                        "Could not parse image size",
                        "Image size must be between 1 and 16384",
                    )
                })
                .help("Pixels along each side of the (square) output image"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("255")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        255,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 255",
                    )
                })
                .help("Iteration cap, which is also the brightest grey"),
        )
        .arg(
            Arg::with_name(ORIGIN)
                .required(false)
                .long(ORIGIN)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,-2.0")
                .validator(|s| validate_pair::<f32>(&s, ',', "Could not parse left upper corner"))
                .help("Left upper corner of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(EXTENT)
                .required(false)
                .long(EXTENT)
                .short("e")
                .takes_value(true)
                .default_value("4.0,4.0")
                .validator(|s| validate_pair::<f32>(&s, ',', "Could not parse plane size"))
                .help("Width and height of the mandelbrot space"),
        )
        .arg(
            Arg::with_name(PROCESSES)
                .required(false)
                .long(PROCESSES)
                .short("n")
                .takes_value(true)
                .default_value(default_processes)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1024,
                        "Could not parse process count",
                        "Process count must be at most 1024",
                    )
                })
                .help("Processes in the group, coordinator included"),
        )
        .arg(
            Arg::with_name(STRATEGY)
                .required(false)
                .long(STRATEGY)
                .short("t")
                .takes_value(true)
                .possible_values(&STRATEGY_NAMES)
                .default_value("dynamic")
                .help("How columns are distributed to the workers"),
        )
        .get_matches()
}

fn config_from(matches: &ArgMatches) -> Result<RenderConfig, ConfigError> {
    // The validators have already vetted every one of these.
    let edge = matches
        .value_of(SIZE)
        .and_then(|s| usize::from_str(s).ok())
        .unwrap_or(mandelfarm::config::DEFAULT_EDGE);
    let depth = matches
        .value_of(ITERATIONS)
        .and_then(|s| u32::from_str(s).ok())
        .unwrap_or_else(|| u32::from(mandelfarm::config::DEFAULT_COLOR_DEPTH));
    let origin = matches
        .value_of(ORIGIN)
        .and_then(parse_complex)
        .unwrap_or_else(|| Complex::new(-2.0, -2.0));
    let size = matches
        .value_of(EXTENT)
        .and_then(parse_complex)
        .unwrap_or_else(|| Complex::new(4.0, 4.0));
    let output = PathBuf::from(matches.value_of(OUTPUT).unwrap_or("Mandelbrot.bmp"));
    RenderConfig::new(edge, depth, origin, size, output)
}

fn fail(e: &MandelError) -> ! {
    match e {
        MandelError::Config(_) => println!("ERROR: {}", e),
        _ => println!("Render failure: {}", e),
    }
    process::exit(1);
}

fn main() {
    env_logger::init();
    let default_processes = (num_cpus::get() + 1).to_string();
    let matches = args(&default_processes);

    let config = match config_from(&matches) {
        Ok(config) => config,
        Err(e) => fail(&e.into()),
    };
    let processes = matches
        .value_of(PROCESSES)
        .and_then(|s| usize::from_str(s).ok())
        .unwrap_or(0);
    let strategy = matches
        .value_of(STRATEGY)
        .and_then(|s| Strategy::from_str(s).ok())
        .unwrap_or(Strategy::Dynamic);

    let started = Instant::now();
    let report = match render(strategy, processes, &config) {
        Ok(report) => report,
        Err(e) => fail(&e),
    };

    match write_image(&config.output, &report.pixels, config.edge) {
        Ok(()) => {
            let location = env::current_dir()
                .map(|cwd| cwd.join(&config.output))
                .unwrap_or_else(|_| config.output.clone());
            println!("Image was generated at: {}", location.display());
        }
        Err(e) => {
            warn!("could not write {}: {}", config.output.display(), e);
            println!("Failure: {}", e);
        }
    }

    debug!("columns per worker: {:?}", report.columns_per_worker());
    println!(
        "{}[{} worker(s)]: Run for {:.6}s.",
        strategy,
        report.workers,
        started.elapsed().as_secs_f64()
    );
}
