use seamraster::{CarveSettings, GradientKind, Raster};
use std::io;

extern crate clap;
extern crate image;

use clap::{App, Arg};
use image::pnm::{PNMEncoder, PNMSubtype, SampleEncoding};
use image::{ColorType, RgbImage};

fn main() {
    env_logger::init();

    let matches = App::new("seamraster")
        .version("0.1.0")
        .about("Content aware image resizing")
        .arg(
            Arg::with_name("INPUT")
                .help("The image to resize")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("width")
                .short("w")
                .long("width")
                .takes_value(true)
                .help("Target width in pixels"),
        )
        .arg(
            Arg::with_name("height")
                .short("H")
                .long("height")
                .takes_value(true)
                .help("Target height in pixels"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .help("Write here instead of streaming PNM to stdout"),
        )
        .arg(
            Arg::with_name("gradient")
                .short("g")
                .long("gradient")
                .takes_value(true)
                .possible_values(&GradientKind::NAMES)
                .help("Gradient function for the energy map"),
        )
        .arg(
            Arg::with_name("update-energy")
                .long("update-energy")
                .help("Rescore the pixels around each removed seam"),
        )
        .arg(
            Arg::with_name("preserve")
                .long("preserve")
                .takes_value(true)
                .help("Grayscale mask of regions to keep"),
        )
        .arg(
            Arg::with_name("preserve-strength")
                .long("preserve-strength")
                .takes_value(true)
                .default_value("100")
                .help("Weight of the preserve mask, in percent"),
        )
        .arg(
            Arg::with_name("discard")
                .long("discard")
                .takes_value(true)
                .help("Grayscale mask of regions to carve away first"),
        )
        .arg(
            Arg::with_name("discard-strength")
                .long("discard-strength")
                .takes_value(true)
                .default_value("100")
                .help("Weight of the discard mask, in percent"),
        )
        .arg(
            Arg::with_name("energy-map")
                .long("energy-map")
                .takes_value(true)
                .help("Also write the energy map here"),
        )
        .arg(
            Arg::with_name("seam-map")
                .long("seam-map")
                .takes_value(true)
                .help("Also write the seam map here"),
        )
        .get_matches();

    let input = image::open(matches.value_of("INPUT").unwrap())
        .unwrap()
        .to_rgb();
    let (w0, h0) = input.dimensions();

    let settings = CarveSettings {
        gradient: matches
            .value_of("gradient")
            .map(|g| g.parse().unwrap())
            .unwrap_or_default(),
        update_energy: matches.is_present("update-energy"),
    };
    let mut raster = Raster::from_image(&input, settings).unwrap();

    if let Some(path) = matches.value_of("preserve") {
        let mask = image::open(path).unwrap().to_luma();
        let strength: f64 = matches
            .value_of("preserve-strength")
            .unwrap()
            .parse()
            .unwrap();
        raster.add_bias(&mask, (0, 0), strength / 100.0).unwrap();
    }
    if let Some(path) = matches.value_of("discard") {
        let mask = image::open(path).unwrap().to_luma();
        let strength: f64 = matches
            .value_of("discard-strength")
            .unwrap()
            .parse()
            .unwrap();
        raster.add_bias(&mask, (0, 0), -strength / 100.0).unwrap();
    }

    let width = matches.value_of("width").map_or(w0, |v| v.parse().unwrap());
    let height = matches.value_of("height").map_or(h0, |v| v.parse().unwrap());
    raster.resize(width, height).unwrap();

    let out: RgbImage = raster.to_image();
    match matches.value_of("output") {
        Some(path) => out.save(path).unwrap(),
        None => PNMEncoder::new(io::stdout())
            .with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary))
            .encode(
                out.into_flat_samples().as_slice(),
                width,
                height,
                ColorType::RGB(8),
            )
            .unwrap(),
    }

    if let Some(path) = matches.value_of("energy-map") {
        raster.energy_to_image().save(path).unwrap();
    }
    if let Some(path) = matches.value_of("seam-map") {
        raster.seams_to_image().save(path).unwrap();
    }
}
