// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Headless front end: replays a list of gestures against the default
//! view (or one given on the command line), renders the result, and
//! writes it to an image file.

extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
extern crate log;
extern crate mandelbrot;
extern crate num_cpus;

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use log::info;
use mandelbrot::{
    ColorConfig, NavigationConfig, Navigator, PixelBuffer, Raster, RenderConfig, RenderEngine,
    ScopedScheduler, Viewport,
};
use std::fs::File;
use std::path::Path;
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

fn parse_triple<T, U>(s: &str, separator: char) -> Option<(T, T, U)>
where
    T: FromStr,
    U: FromStr,
{
    let index = s.rfind(separator)?;
    let (a, b) = parse_pair::<T>(&s[..index], separator)?;
    let c = U::from_str(&s[index + 1..]).ok()?;
    Some((a, b, c))
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
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
const REAL: &str = "real";
const IMAG: &str = "imag";
const ITERATIONS: &str = "iterations";
const TILE: &str = "tile";
const THREADS: &str = "threads";
const SATURATION: &str = "saturation";
const BRIGHTNESS: &str = "brightness";
const ZOOM: &str = "zoom";
const PAN: &str = "pan";
const RESIZE: &str = "resize";
const SCHEDULER: &str = "scheduler";

const MAX_CLICKS: i32 = 1000;

fn args<'a>() -> ArgMatches<'a> {
    let max_threads = num_cpus::get();

    App::new("explore")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Mandelbrot explorer, rendered to a file")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; .ppm and .pnm are written as binary pixmaps"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("900x900")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse image size"))
                .help("Size of the raster"),
        )
        .arg(
            Arg::with_name(REAL)
                .long(REAL)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2.0,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse real bounds"))
                .help("Left and right edges of the view"),
        )
        .arg(
            Arg::with_name(IMAG)
                .long(IMAG)
                .short("m")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-1.5,1.5")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse imaginary bounds"))
                .help("Bottom and top edges of the view"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000,
                        "Could not parse iteration count",
                        "Iteration count must be between 1 and 100000",
                    )
                })
                .help("Iteration cap per point"),
        )
        .arg(
            Arg::with_name(TILE)
                .long(TILE)
                .short("t")
                .takes_value(true)
                .default_value("64")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096,
                        "Could not parse tile size",
                        "Tile size must be between 1 and 4096",
                    )
                })
                .help("Tile edge in pixels"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("j")
                .takes_value(true)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of worker threads; one per CPU if omitted"),
        )
        .arg(
            Arg::with_name(SATURATION)
                .long(SATURATION)
                .takes_value(true)
                .default_value("0.5")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse saturation",
                        "Saturation must be between 0 and 1",
                    )
                })
                .help("Palette saturation"),
        )
        .arg(
            Arg::with_name(BRIGHTNESS)
                .long(BRIGHTNESS)
                .takes_value(true)
                .default_value("1.2")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        4.0,
                        "Could not parse brightness",
                        "Brightness must be between 0 and 4",
                    )
                })
                .help("Palette brightness; values above 1 clip"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| match parse_triple::<f64, i32>(&s, ',') {
                    Some((_, _, clicks)) if (-MAX_CLICKS..=MAX_CLICKS).contains(&clicks) => Ok(()),
                    Some(_) => Err(format!("Zoom clicks must be between -{0} and {0}", MAX_CLICKS)),
                    None => Err("Could not parse zoom, expected X,Y,CLICKS".to_string()),
                })
                .help("Wheel clicks at a cursor position; positive zooms in"),
        )
        .arg(
            Arg::with_name(PAN)
                .long(PAN)
                .short("p")
                .takes_value(true)
                .multiple(true)
                .number_of_values(1)
                .allow_hyphen_values(true)
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse pan, expected DX,DY"))
                .help("Drag the picture by a pixel offset"),
        )
        .arg(
            Arg::with_name(RESIZE)
                .long(RESIZE)
                .takes_value(true)
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse resize"))
                .help("Resize the raster after the view is set up"),
        )
        .arg(
            Arg::with_name(SCHEDULER)
                .long(SCHEDULER)
                .takes_value(true)
                .possible_values(&["pool", "scoped"])
                .default_value("pool")
                .help("Persistent worker pool, or fresh threads per frame"),
        )
        .get_matches()
}

enum Gesture {
    Zoom(f64, f64, i32),
    Pan(f64, f64),
}

/// Zooms and pans in the order they appeared on the command line.
fn gestures(matches: &ArgMatches) -> Result<Vec<Gesture>, Error> {
    let mut found: Vec<(usize, Gesture)> = vec![];
    if let (Some(values), Some(indices)) = (matches.values_of(ZOOM), matches.indices_of(ZOOM)) {
        for (value, index) in values.zip(indices) {
            let (x, y, clicks) = parse_triple(value, ',')
                .ok_or_else(|| format_err!("Error parsing zoom {}", value))?;
            found.push((index, Gesture::Zoom(x, y, clicks)));
        }
    }
    if let (Some(values), Some(indices)) = (matches.values_of(PAN), matches.indices_of(PAN)) {
        for (value, index) in values.zip(indices) {
            let (dx, dy) =
                parse_pair(value, ',').ok_or_else(|| format_err!("Error parsing pan {}", value))?;
            found.push((index, Gesture::Pan(dx, dy)));
        }
    }
    found.sort_by_key(|&(index, _)| index);
    Ok(found.into_iter().map(|(_, gesture)| gesture).collect())
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format_err!("Error parsing {}", name))
}

fn pair<T: FromStr>(matches: &ArgMatches, name: &str, separator: char) -> Result<(T, T), Error> {
    matches
        .value_of(name)
        .and_then(|s| parse_pair(s, separator))
        .ok_or_else(|| format_err!("Error parsing {}", name))
}

fn write_image(outfile: &str, frame: &PixelBuffer) -> Result<(), Error> {
    let path = Path::new(outfile);
    let (width, height) = (frame.width() as u32, frame.height() as u32);
    let pnm = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => ext.eq_ignore_ascii_case("ppm") || ext.eq_ignore_ascii_case("pnm"),
        None => false,
    };
    if pnm {
        let output = File::create(&path)?;
        let mut encoder =
            PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
        encoder.encode(&frame.to_rgb8()[..], width, height, ColorType::RGB(8))?;
    } else {
        image::save_buffer(path, &frame.to_rgba8(), width, height, ColorType::RGBA(8))
            .map_err(|e| mandelbrot::Error::Image(e.to_string()))?;
    }
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = pair::<usize>(matches, SIZE, 'x')?;
    let (real_min, real_max) = pair::<f64>(matches, REAL, ',')?;
    let (imag_min, imag_max) = pair::<f64>(matches, IMAG, ',')?;

    let config = RenderConfig {
        max_iter: value(matches, ITERATIONS)?,
        tile_edge: value(matches, TILE)?,
        workers: match matches.value_of(THREADS) {
            Some(_) => Some(value(matches, THREADS)?),
            None => None,
        },
        color: ColorConfig {
            saturation: value(matches, SATURATION)?,
            value: value(matches, BRIGHTNESS)?,
        },
    };
    config.validate()?;

    let mut navigator = Navigator::with_viewport(
        Raster::new(width, height)?,
        Viewport::new(real_min, real_max, imag_min, imag_max)?,
        NavigationConfig::default(),
    )?;
    for gesture in gestures(matches)? {
        match gesture {
            Gesture::Zoom(x, y, clicks) => {
                let wheel = f64::from(clicks.signum());
                for _ in 0..clicks.min(MAX_CLICKS).max(-MAX_CLICKS).abs() {
                    navigator.zoom_at(x, y, wheel);
                }
            }
            Gesture::Pan(dx, dy) => navigator.pan(dx, dy),
        }
    }
    if matches.is_present(RESIZE) {
        let (width, height) = pair::<usize>(matches, RESIZE, 'x')?;
        navigator.resize(width, height)?;
    }

    let engine = match matches.value_of(SCHEDULER) {
        Some("scoped") => RenderEngine::with_scheduler(
            config,
            Box::new(ScopedScheduler::new(config.worker_threads())),
        ),
        _ => RenderEngine::new(config)?,
    };

    let request = navigator
        .take_redraw()
        .ok_or_else(|| format_err!("Nothing to render"))?;
    let vp = request.viewport;
    info!(
        "view: real {}..{}, imag {}..{}; {} iterations, {}px tiles",
        vp.real_min,
        vp.real_max,
        vp.imag_min,
        vp.imag_max,
        engine.config().max_iter,
        engine.config().tile_edge
    );

    let started = Instant::now();
    let frame = engine
        .render(request.viewport, request.raster)
        .or_else(|| engine.latest())
        .ok_or_else(|| format_err!("Render produced no frame"))?;
    info!(
        "rendered {}x{} in {:?}",
        frame.width(),
        frame.height(),
        started.elapsed()
    );

    let outfile = matches
        .value_of(OUTPUT)
        .ok_or_else(|| format_err!("No output file"))?;
    write_image(outfile, &frame)
}

fn main() {
    env_logger::init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
