use std::fs::{self, File};
use std::path::{Path, PathBuf};

use capmesh::pipeline::{build_glb, build_gltf, build_obj, summarize};
use capmesh::{DecodeOptions, Trace};
use clap::{Parser, ValueEnum};
use memmap2::MmapOptions;
use rootcause::prelude::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Gltf,
    Glb,
    Obj,
    Summary,
    All,
}

/// Extract the dominant mesh from a captured draw-call trace
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trace JSON describing buffers, draw calls and attribute layouts
    trace: PathBuf,

    /// Raw capture blob the trace's byte offsets point into
    buffer: PathBuf,

    #[clap(short, long, value_enum, default_value_t = Format::Glb)]
    format: Format,

    /// Directory generated files are written to
    #[clap(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// JSON file with decode options. Flags below override its values.
    #[clap(long)]
    options: Option<PathBuf>,

    #[clap(long)]
    scale: Option<f32>,

    #[clap(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true)]
    bias: Option<Vec<f32>>,

    #[clap(long)]
    swap_yz: bool,

    #[clap(long)]
    invert_z: bool,

    /// Only print the summary when the raw blob is larger than this many bytes
    #[clap(long, value_name = "BYTES")]
    summary_only_above: Option<u64>,
}

impl Args {
    fn decode_options(&self) -> Result<DecodeOptions, Report> {
        let mut options = match &self.options {
            Some(path) => {
                let data = fs::read(path).context("Failed to read options file")?;
                DecodeOptions::from_json_slice(&data).context("Failed to parse options file")?
            }
            None => DecodeOptions::default(),
        };
        if let Some(scale) = self.scale {
            options.scale = scale;
        }
        if let Some(bias) = &self.bias {
            if let [x, y, z] = bias[..] {
                options.bias = [x, y, z];
            }
        }
        options.swap_yz |= self.swap_yz;
        options.invert_z |= self.invert_z;
        Ok(options)
    }
}

fn write_output(dir: &Path, name: &str, data: &[u8]) -> Result<(), Report> {
    let path = dir.join(name);
    fs::write(&path, data).context("Failed to write output file")?;
    info!(path = %path.display(), bytes = data.len(), "wrote");
    Ok(())
}

fn main() -> Result<(), Report> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let options = args.decode_options()?;

    let trace_json = fs::read(&args.trace).context("Failed to read trace JSON")?;
    let trace = Trace::from_json_slice(&trace_json).context("Failed to parse trace JSON")?;

    let buffer_file = File::open(&args.buffer).context("Failed to open buffer file")?;
    let mmap = unsafe { MmapOptions::new().map(&buffer_file) }
        .context("Failed to map buffer file")?;
    let raw = &mmap[..];

    let summary = summarize(&trace).context("Failed to select a draw call")?;
    let summary = summary.to_json_pretty().context("Failed to serialize summary")?;
    println!("{summary}");

    if args.format == Format::Summary {
        return Ok(());
    }
    if let Some(limit) = args.summary_only_above {
        if raw.len() as u64 > limit {
            info!(bytes = raw.len(), limit, "buffer above threshold, skipping export");
            return Ok(());
        }
    }

    fs::create_dir_all(&args.out_dir).context("Failed to create output directory")?;

    if matches!(args.format, Format::Gltf | Format::All) {
        let built = build_gltf(raw, &trace, &options).context("Failed to build glTF")?;
        let asset = built.asset;
        let json = asset.to_json_string().context("Failed to serialize glTF")?;
        write_output(&args.out_dir, &asset.stamp.gltf_name(), json.as_bytes())?;
        write_output(&args.out_dir, &asset.stamp.bin_name(), &asset.bin)?;
    }
    if matches!(args.format, Format::Glb | Format::All) {
        let built = build_glb(raw, &trace, &options).context("Failed to build GLB")?;
        write_output(&args.out_dir, &built.asset.file_name(), &built.asset.bytes)?;
    }
    if matches!(args.format, Format::Obj | Format::All) {
        let built = build_obj(raw, &trace, &options).context("Failed to build OBJ")?;
        write_output(&args.out_dir, &built.asset.file_name(), built.asset.text.as_bytes())?;
    }

    Ok(())
}
