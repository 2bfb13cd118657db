use argh::FromArgs;
use image::{ImageFormat, RgbImage, RgbaImage};
use qoif::{Header, QoiDecodeContext, QoiEncodeContext};
use std::{fs::File, io::BufReader, str::FromStr};

/// QOI cli encoder and decoder.
#[derive(FromArgs)]
struct Cli {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs)]
#[argh(subcommand)]
enum Command {
    Encode(Encode),
    Decode(Decode),
}

#[derive(Debug)]
enum Format {
    Png,
    Jpg,
    Bmp,
}

impl FromStr for Format {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        #[rustfmt::skip]
        let Some(format) = s.eq_ignore_ascii_case("png").then_some(Format::Png)
               .or_else(|| s.eq_ignore_ascii_case("jpg").then_some(Format::Jpg))
               .or_else(|| s.eq_ignore_ascii_case("bmp").then_some(Format::Bmp))
        else { return Err("invalid string"); };

        Ok(format)
    }
}

impl From<&Format> for ImageFormat {
    fn from(format: &Format) -> Self {
        match format {
            Format::Png => ImageFormat::Png,
            Format::Jpg => ImageFormat::Jpeg,
            Format::Bmp => ImageFormat::Bmp,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli { command } = argh::from_env();

    match command {
        Command::Encode(options) => encode(options),
        Command::Decode(options) => decode(options),
    }
}

/// Encodes an image as QOI.
#[derive(FromArgs)]
#[argh(subcommand, name = "encode")]
struct Encode {
    /// input format, optional (png, jpg, bmp); guessed when omitted
    #[argh(option)]
    format: Option<Format>,

    /// the input file (PNG, JPG, or BMP)
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn encode(options: Encode) -> Result<(), Box<dyn std::error::Error>> {
    let Encode {
        format,
        input,
        output,
    } = options;

    let image = match format {
        Some(format) => image::io::Reader::with_format(
            BufReader::new(File::open(&input)?),
            ImageFormat::from(&format),
        )
        .decode()?,
        None => image::io::Reader::open(input)?
            .with_guessed_format()?
            .decode()?,
    };

    let width = image.width();
    let height = image.height();
    let channels: u8 = if image.color().has_alpha() { 4 } else { 3 };

    println!("Encoding {width}x{height} image ({channels} channels)");

    let raw = if channels == 4 {
        image.into_rgba8().into_raw()
    } else {
        image.into_rgb8().into_raw()
    };

    let mut v = Vec::with_capacity(raw.len());
    if !QoiEncodeContext::encode_to_vec(width, height, channels, 0, &raw, &mut v) {
        return Err("encoding failed".into());
    }

    std::fs::write(&output, &v)?;
    println!("Written {} bytes to `{output}`", v.len());

    Ok(())
}

/// Decodes a QOI image.
#[derive(FromArgs)]
#[argh(subcommand, name = "decode")]
struct Decode {
    /// output format (png, jpg, bmp)
    #[argh(option)]
    format: Format,

    /// the input file
    #[argh(positional)]
    input: String,
    /// the output file
    #[argh(positional)]
    output: String,
}

fn decode(options: Decode) -> Result<(), Box<dyn std::error::Error>> {
    let Decode {
        format,
        input,
        output,
    } = options;

    let qoi_input = std::fs::read(&input)?;

    println!("Decoding `{input}`");

    let mut raw = Vec::with_capacity(1024 * 1024);
    let Header {
        width,
        height,
        channels,
        ..
    } = QoiDecodeContext::decode_to_vec(&qoi_input, &mut raw).map_err(|e| format!("{e:?}"))?;

    if channels == 4 {
        RgbaImage::from_vec(width, height, raw)
            .ok_or("failed to create image")?
            .save_with_format(&output, ImageFormat::from(&format))?;
    } else {
        RgbImage::from_vec(width, height, raw)
            .ok_or("failed to create image")?
            .save_with_format(&output, ImageFormat::from(&format))?;
    }

    println!("Written {width}x{height} image to `{output}`");

    Ok(())
}
