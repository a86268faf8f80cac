//! FileSink - writes stereo pairs to disk
//!
//! Layout under the output directory:
//!
//! ```text
//! left/000042.png
//! right/000042.png
//! calibration/000042.json
//! times.txt              "<seq> <stamp seconds>" per frame
//! ```

use contracts::{
    ContractError, DataSink, FrameId, NormalizedEncoding, NormalizedImage, SensorFrame,
    StereoCalibration, Timestamp,
};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Base output directory
    pub base_path: PathBuf,
    /// Write into a fresh `<base_path>/<YYYYmmdd_HHMMSS>` directory
    pub session_dir: bool,
    /// Write per-frame calibration JSON next to the images
    pub write_calibration: bool,
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            base_path: PathBuf::from("./output"),
            session_dir: false,
            write_calibration: true,
        }
    }
}

impl FileSinkConfig {
    /// Create config from params map
    ///
    /// Recognised keys: `base_path`, `session_dir`, `write_calibration`.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            params
                .get(key)
                .map(|v| matches!(v.trim(), "true" | "1" | "yes"))
                .unwrap_or(default)
        };

        Self {
            base_path: params
                .get("base_path")
                .map(PathBuf::from)
                .unwrap_or(defaults.base_path),
            session_dir: flag("session_dir", defaults.session_dir),
            write_calibration: flag("write_calibration", defaults.write_calibration),
        }
    }

    /// Directory frames end up in
    pub fn output_dir(&self) -> PathBuf {
        if self.session_dir {
            let session = chrono::Local::now().format("%Y%m%d_%H%M%S").to_string();
            self.base_path.join(session)
        } else {
            self.base_path.clone()
        }
    }
}

/// Per-frame metadata written as JSON
#[derive(Debug, Serialize)]
struct FrameRecord<'a> {
    seq: u64,
    stamp: Timestamp,
    frame_id: &'a FrameId,
    sensor_frame_id: &'a FrameId,
    left_encoding: NormalizedEncoding,
    right_encoding: NormalizedEncoding,
    calibration: &'a StereoCalibration,
}

/// Sink that writes frames to disk files
pub struct FileSink {
    name: String,
    output_dir: PathBuf,
    write_calibration: bool,
    created_dirs: HashSet<PathBuf>,
    times: BufWriter<File>,
}

impl FileSink {
    /// Create a new FileSink
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        let output_dir = config.output_dir();
        fs::create_dir_all(&output_dir)?;

        let times = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output_dir.join("times.txt"))?;

        let name = name.into();
        info!(sink = %name, dir = %output_dir.display(), "FileSink writing frames");

        Ok(Self {
            name,
            output_dir,
            write_calibration: config.write_calibration,
            created_dirs: HashSet::new(),
            times: BufWriter::new(times),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn subdir(&mut self, name: &str) -> std::io::Result<PathBuf> {
        let dir = self.output_dir.join(name);
        if !self.created_dirs.contains(&dir) {
            fs::create_dir_all(&dir)?;
            self.created_dirs.insert(dir.clone());
        }
        Ok(dir)
    }

    fn write_frame_to_disk(&mut self, frame: &SensorFrame) -> std::io::Result<()> {
        let stem = format!("{:06}", frame.seq);

        let left_dir = self.subdir("left")?;
        save_image(left_dir.join(format!("{stem}.png")), &frame.left)?;
        let right_dir = self.subdir("right")?;
        save_image(right_dir.join(format!("{stem}.png")), &frame.right)?;

        if self.write_calibration {
            let record = FrameRecord {
                seq: frame.seq,
                stamp: frame.stamp,
                frame_id: &frame.frame_id,
                sensor_frame_id: &frame.sensor_frame_id,
                left_encoding: frame.left.encoding,
                right_encoding: frame.right.encoding,
                calibration: &frame.calibration,
            };
            let calib_dir = self.subdir("calibration")?;
            let file = File::create(calib_dir.join(format!("{stem}.json")))?;
            serde_json::to_writer_pretty(file, &record)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        }

        writeln!(self.times, "{} {:.9}", frame.seq, frame.stamp.as_secs_f64())
    }

    fn persist_frame(&mut self, frame: &SensorFrame) -> Result<(), ContractError> {
        self.write_frame_to_disk(frame).map_err(|e| {
            error!(sink = %self.name, seq = frame.seq, error = %e, "Write failed");
            ContractError::sink_write(&self.name, e.to_string())
        })
    }
}

fn save_image(path: PathBuf, image: &NormalizedImage) -> std::io::Result<()> {
    match image.encoding {
        NormalizedEncoding::Mono8 => image::save_buffer(
            path,
            &image.data,
            image.width,
            image.height,
            image::ColorType::L8,
        )
        .map_err(std::io::Error::other),

        NormalizedEncoding::Bgr8 => {
            let mut rgb = image.data.to_vec();
            for px in rgb.chunks_exact_mut(3) {
                px.swap(0, 2);
            }
            image::save_buffer(path, &rgb, image.width, image.height, image::ColorType::Rgb8)
                .map_err(std::io::Error::other)
        }
    }
}

impl DataSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(
        name = "file_sink_write",
        skip(self, frame),
        fields(sink = %self.name, seq = frame.seq)
    )]
    async fn write(&mut self, frame: &SensorFrame) -> Result<(), ContractError> {
        self.persist_frame(frame)
    }

    #[instrument(name = "file_sink_flush", skip(self))]
    async fn flush(&mut self) -> Result<(), ContractError> {
        self.times
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }

    #[instrument(name = "file_sink_close", skip(self))]
    async fn close(&mut self) -> Result<(), ContractError> {
        self.flush().await?;
        debug!(sink = %self.name, "FileSink closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::frame;
    use tempfile::tempdir;

    fn sink_in(dir: &Path, write_calibration: bool) -> FileSink {
        let config = FileSinkConfig {
            base_path: dir.to_path_buf(),
            session_dir: false,
            write_calibration,
        };
        FileSink::new("test_file", config).unwrap()
    }

    #[tokio::test]
    async fn test_file_sink_writes_pair_and_calibration() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path(), true);

        sink.write(&frame(42)).await.unwrap();
        sink.close().await.unwrap();

        let left = image::open(dir.path().join("left/000042.png")).unwrap();
        assert_eq!(left.color(), image::ColorType::Rgb8);
        // first pixel was bgr (0, 0, 255): pure red
        assert_eq!(left.to_rgb8().get_pixel(0, 0).0, [255, 0, 0]);

        let right = image::open(dir.path().join("right/000042.png")).unwrap();
        assert_eq!(right.color(), image::ColorType::L8);
        assert_eq!(right.to_luma8().into_raw(), vec![0, 64, 128, 255]);

        let json = fs::read_to_string(dir.path().join("calibration/000042.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["seq"], 42);
        assert_eq!(value["frame_id"], "base_link");
        assert_eq!(value["calibration"]["baseline"], 0.12);

        let times = fs::read_to_string(dir.path().join("times.txt")).unwrap();
        assert_eq!(times.trim(), "42 3.100000000");
    }

    #[tokio::test]
    async fn test_file_sink_without_calibration() {
        let dir = tempdir().unwrap();
        let mut sink = sink_in(dir.path(), false);

        for seq in 0..3 {
            sink.write(&frame(seq)).await.unwrap();
        }
        sink.flush().await.unwrap();

        assert!(!dir.path().join("calibration").exists());
        let entries = fs::read_dir(dir.path().join("left")).unwrap().count();
        assert_eq!(entries, 3);
        let times = fs::read_to_string(dir.path().join("times.txt")).unwrap();
        assert_eq!(times.lines().count(), 3);
    }

    #[test]
    fn test_config_from_params() {
        let params = HashMap::from([
            ("base_path".to_string(), "/tmp/stereo".to_string()),
            ("write_calibration".to_string(), "false".to_string()),
        ]);
        let config = FileSinkConfig::from_params(&params);
        assert_eq!(config.base_path, PathBuf::from("/tmp/stereo"));
        assert!(!config.write_calibration);
        assert!(!config.session_dir);
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/stereo"));

        let defaults = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(defaults.base_path, PathBuf::from("./output"));
        assert!(defaults.write_calibration);
    }

    #[test]
    fn test_session_dir_nested_under_base() {
        let config = FileSinkConfig {
            base_path: PathBuf::from("/data"),
            session_dir: true,
            write_calibration: true,
        };
        let dir = config.output_dir();
        assert_eq!(dir.parent(), Some(Path::new("/data")));
        assert_eq!(dir.file_name().unwrap().len(), "20260101_120000".len());
    }
}
