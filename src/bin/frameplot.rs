use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "frameplot", version)]
struct Cli {
    /// Optional config JSON (server address, cache directory, hwaccel).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend `host:port`, overriding the config.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Cache directory for extracted and rendered artifacts, overriding the
    /// config.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Request a rendered frame from the backend and write it as a PNG.
    Frame(FrameArgs),
    /// Request a rendered video from the backend and write it as an MP4.
    Video(VideoArgs),
    /// Extract a single still from a local video (requires `ffmpeg`).
    Extract(ExtractArgs),
    /// Extract a still and draw marker arrows onto it.
    Overlay(OverlayArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input frame-options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct VideoArgs {
    /// Input video-options JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Source video file.
    #[arg(long)]
    video: PathBuf,

    /// Cache name for the video; defaults to the file stem.
    #[arg(long)]
    name: Option<String>,

    /// Frame index (0-based).
    #[arg(long)]
    index: u64,
}

#[derive(Parser, Debug)]
struct OverlayArgs {
    /// Input markers JSON: `{"frame": {...}, "xs": [...], "ys": [...],
    /// "rots": [...]}`.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => frameplot::Config::from_json_file(path)?,
        None => frameplot::Config::default(),
    };
    if let Some(server) = cli.server {
        cfg.server_address = server;
    }
    if let Some(cache_dir) = cli.cache_dir {
        cfg.cache_dir = cache_dir;
    }

    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Video(args) => cmd_video(&cfg, args),
        Command::Extract(args) => cmd_extract(&cfg, args),
        Command::Overlay(args) => cmd_overlay(&cfg, args),
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> anyhow::Result<T> {
    let f = std::fs::File::open(path)
        .with_context(|| format!("open {what} '{}'", path.display()))?;
    let r = std::io::BufReader::new(f);
    serde_json::from_reader(r).with_context(|| format!("parse {what} JSON"))
}

fn cmd_frame(cfg: &frameplot::Config, args: FrameArgs) -> anyhow::Result<()> {
    let opts: frameplot::FrameOptions = read_json(&args.in_path, "frame options")?;

    let client = frameplot::PlotterClient::new(cfg.server_address.clone());
    let img = client.get_image(&opts)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_video(cfg: &frameplot::Config, args: VideoArgs) -> anyhow::Result<()> {
    let opts: frameplot::VideoOptions = read_json(&args.in_path, "video options")?;

    let client = frameplot::PlotterClient::new(cfg.server_address.clone());
    client.save_video(&opts, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_extract(cfg: &frameplot::Config, args: ExtractArgs) -> anyhow::Result<()> {
    let name = match args.name {
        Some(name) => name,
        None => args
            .video
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string)
            .with_context(|| format!("video path '{}' has no file stem", args.video.display()))?,
    };

    let frame_count = frameplot::media::probe_frame_count(&args.video)?;
    let container = frameplot::FrameContainer {
        video_name: name,
        video_path: args.video,
        frame_count,
    };
    let path = frameplot::media::extract_single_frame(&container.frame(args.index), cfg)?;

    eprintln!("wrote {}", path.display());
    Ok(())
}

#[derive(serde::Deserialize)]
struct MarkerSet {
    frame: frameplot::Frame,
    xs: Vec<f64>,
    ys: Vec<f64>,
    rots: Vec<f64>,
}

fn cmd_overlay(cfg: &frameplot::Config, args: OverlayArgs) -> anyhow::Result<()> {
    let markers: MarkerSet = read_json(&args.in_path, "overlay markers")?;

    let path = frameplot::overlay::plot_frame(
        &markers.frame,
        &markers.xs,
        &markers.ys,
        &markers.rots,
        cfg,
    )?;

    eprintln!("wrote {}", path.display());
    Ok(())
}
