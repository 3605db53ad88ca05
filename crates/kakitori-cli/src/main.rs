use std::path::{Path, PathBuf};
use std::str::FromStr;

use kakitori::WorksheetConfig;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Render(kakitori::Error),
    Raster(kakitori::raster::RasterError),
    NoCharacters,
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Render(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::NoCharacters => write!(f, "No characters given"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<kakitori::Error> for CliError {
    fn from(value: kakitori::Error) -> Self {
        Self::Render(value)
    }
}

impl From<kakitori::raster::RasterError> for CliError {
    fn from(value: kakitori::raster::RasterError) -> Self {
        Self::Raster(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Pdf,
    Svg,
    Png,
}

impl OutputFormat {
    fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        ext.parse().ok()
    }

    fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(Self::Pdf),
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug)]
struct Args {
    characters: Vec<char>,
    out: Option<PathBuf>,
    format: Option<OutputFormat>,
    cache_dir: Option<PathBuf>,
    strength: Option<f64>,
    freq: Option<usize>,
    scale: f32,
}

fn usage() -> &'static str {
    "kakitori\n\
\n\
USAGE:\n\
  kakitori [--out <path>] [--format pdf|svg|png] [--cache-dir <dir>] [--strength <0..1>] [--freq <n>] [--scale <n>] <characters>...\n\
\n\
NOTES:\n\
  - <characters> may be one string (e.g. \u{4e00}\u{4e8c}\u{4e09}) or several arguments; whitespace is ignored.\n\
  - The output format is taken from --format, else from the --out extension, else pdf.\n\
  - The default output path is worksheet.<ext> in the working directory.\n\
  - --strength overrides the tracing fade (0 = full black, 1 = invisible).\n\
  - --freq overrides how often practice cells receive a traced glyph.\n\
  - --scale applies to png output only.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        characters: Vec::new(),
        out: None,
        format: None,
        cache_dir: None,
        strength: None,
        freq: None,
        scale: 2.0,
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(PathBuf::from(out));
            }
            "--format" => {
                let Some(fmt) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.format = Some(
                    fmt.parse::<OutputFormat>()
                        .map_err(|_| CliError::Usage(usage()))?,
                );
            }
            "--cache-dir" => {
                let Some(dir) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.cache_dir = Some(PathBuf::from(dir));
            }
            "--strength" => {
                let Some(s) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let v = s.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(0.0..=1.0).contains(&v) {
                    return Err(CliError::Usage(usage()));
                }
                args.strength = Some(v);
            }
            "--freq" => {
                let Some(n) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let v = n.parse::<usize>().map_err(|_| CliError::Usage(usage()))?;
                if v == 0 {
                    return Err(CliError::Usage(usage()));
                }
                args.freq = Some(v);
            }
            "--scale" => {
                let Some(s) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.scale = s.parse::<f32>().map_err(|_| CliError::Usage(usage()))?;
                if !(args.scale.is_finite() && args.scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            other if other.starts_with("--") => return Err(CliError::Usage(usage())),
            text => args
                .characters
                .extend(text.chars().filter(|c| !c.is_whitespace())),
        }
    }

    Ok(args)
}

fn run(args: Args) -> Result<(), CliError> {
    if args.characters.is_empty() {
        return Err(CliError::NoCharacters);
    }

    let mut config = WorksheetConfig::default();
    if let Some(dir) = &args.cache_dir {
        config.cache_dir = dir.clone();
    }
    if let Some(strength) = args.strength {
        config.tracing_strength = strength;
    }
    if let Some(freq) = args.freq {
        config.tracing_freq = freq;
    }

    let format = args
        .format
        .or_else(|| args.out.as_deref().and_then(OutputFormat::from_extension))
        .unwrap_or(OutputFormat::Pdf);
    let out = args
        .out
        .unwrap_or_else(|| PathBuf::from(format!("worksheet.{}", format.extension())));

    let svg = kakitori::render_worksheet_svg(&args.characters, &config)?;
    match format {
        OutputFormat::Svg => std::fs::write(&out, svg)?,
        OutputFormat::Pdf => std::fs::write(&out, kakitori::raster::svg_to_pdf(&svg)?)?,
        OutputFormat::Png => {
            std::fs::write(&out, kakitori::raster::svg_to_png(&svg, args.scale)?)?
        }
    }
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(CliError::NoCharacters) => {
            eprintln!("{}", CliError::NoCharacters);
            eprintln!("{}", usage());
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        std::iter::once("kakitori")
            .chain(parts.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn characters_flatten_across_arguments() {
        let args = parse_args(&argv(&["一二", "三"])).unwrap();
        assert_eq!(args.characters, vec!['一', '二', '三']);
    }

    #[test]
    fn format_falls_back_to_the_out_extension() {
        let args = parse_args(&argv(&["--out", "page.svg", "一"])).unwrap();
        let format = args
            .format
            .or_else(|| args.out.as_deref().and_then(OutputFormat::from_extension));
        assert_eq!(format, Some(OutputFormat::Svg));
    }

    #[test]
    fn rejects_out_of_range_strength() {
        assert!(matches!(
            parse_args(&argv(&["--strength", "1.5", "一"])),
            Err(CliError::Usage(_))
        ));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(matches!(
            parse_args(&argv(&["--bogus", "一"])),
            Err(CliError::Usage(_))
        ));
    }
}
