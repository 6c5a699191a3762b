use std::fmt;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use layers::polygons::DEFAULT_STRIDE;
use scene::camera::{dynamic_fov, DEFAULT_FOV_DEG};

use crate::pipeline::PipelineOptions;

#[derive(Parser, Debug)]
#[command(author, version, about = "Build a 3D scene from contour and tower GeoJSON datasets")]
pub struct Args {
    /// Data root: a local directory or an http(s) base URL
    #[arg(long, env = "VIEWER_ROOT", default_value = ".")]
    pub root: String,

    /// Vertical field of view in degrees (overrides the manifest)
    #[arg(long)]
    pub fov: Option<f64>,

    /// Viewport width in pixels; picks the field of view when --fov is absent
    #[arg(long)]
    pub viewport_width: Option<f64>,

    /// Draw every n-th FM contour polygon
    #[arg(long, default_value_t = DEFAULT_STRIDE)]
    pub stride: NonZeroUsize,

    /// Start with the camera locked in the top-down view
    #[arg(long)]
    pub lock: bool,

    /// Write the scene summary to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Include every primitive in the summary
    #[arg(long)]
    pub dump_primitives: bool,
}

impl Args {
    /// Field of view: `--fov`, then `--viewport-width`, then the manifest.
    pub fn fov_deg(&self, manifest_fov: Option<f64>) -> f64 {
        self.fov
            .or_else(|| self.viewport_width.map(dynamic_fov))
            .or(manifest_fov)
            .unwrap_or(DEFAULT_FOV_DEG)
    }

    pub fn pipeline_options(&self, manifest_fov: Option<f64>) -> PipelineOptions {
        PipelineOptions {
            fov_deg: self.fov_deg(manifest_fov),
            stride: self.stride,
            lock: self.lock,
        }
    }
}

/// Where datasets are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataRoot {
    Dir(PathBuf),
    /// Base URL without a trailing slash.
    Url(String),
}

impl DataRoot {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DataRoot::Url(raw.trim_end_matches('/').to_string())
        } else {
            DataRoot::Dir(PathBuf::from(raw))
        }
    }

    /// Human-readable location of `relative` under this root.
    pub fn locate(&self, relative: &str) -> String {
        match self {
            DataRoot::Dir(dir) => dir.join(relative).display().to_string(),
            DataRoot::Url(base) => format!("{base}/{}", relative.trim_start_matches('/')),
        }
    }
}

impl fmt::Display for DataRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataRoot::Dir(dir) => write!(f, "{}", dir.display()),
            DataRoot::Url(base) => f.write_str(base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["viewer", "--root", "data"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("args")
    }

    #[test]
    fn parses_flags_with_defaults() {
        let a = args(&[]);
        assert_eq!(a.root, "data");
        assert_eq!(a.stride, DEFAULT_STRIDE);
        assert!(!a.lock);
        assert!(a.out.is_none());

        let a = args(&["--stride", "3", "--lock", "--dump-primitives"]);
        assert_eq!(a.stride.get(), 3);
        assert!(a.lock);
        assert!(a.dump_primitives);
        assert!(Args::try_parse_from(["viewer", "--stride", "0"]).is_err());
    }

    #[test]
    fn field_of_view_precedence() {
        assert_eq!(args(&[]).fov_deg(None), DEFAULT_FOV_DEG);
        assert_eq!(args(&[]).fov_deg(Some(50.0)), 50.0);
        assert_eq!(args(&["--viewport-width", "600"]).fov_deg(Some(50.0)), 90.0);
        assert_eq!(
            args(&["--fov", "40", "--viewport-width", "600"]).fov_deg(Some(50.0)),
            40.0
        );
    }

    #[test]
    fn data_root_distinguishes_urls_from_directories() {
        assert_eq!(
            DataRoot::parse("https://example.org/scene/"),
            DataRoot::Url("https://example.org/scene".to_string())
        );
        assert_eq!(DataRoot::parse("./data"), DataRoot::Dir(PathBuf::from("./data")));
        assert_eq!(
            DataRoot::parse("http://host").locate("/data/a.geojson"),
            "http://host/data/a.geojson"
        );
    }
}
