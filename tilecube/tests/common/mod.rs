//! Shared fakes for integration tests.
//!
//! Rasters are text files with one `description=mean` line per band; a
//! mean of `NaN` marks a band without valid data. Source rasters start
//! with an `extent min_x min_y max_x max_y` line giving where their data
//! lies. [`Sim`] plays the external tools: it warps, stacks and reads these
//! files, answers `sbatch`/`squeue` like a small scheduler, and runs
//! `tilecube` job commands in-process.

#![allow(dead_code)]

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tilecube::address::CellAddress;
use tilecube::cube::{CubeStacker, LayerCollection};
use tilecube::grid::Bounds;
use tilecube::jobs::{Backend, ClusterConfig};
use tilecube::process::{CommandRunner, ProcessCommand, ProcessError, ProcessOutput};
use tilecube::raster::{
    BandInfo, BandStatistics, RasterEngine, RasterError, RasterFormat, RasterInfo,
};
use tilecube::srs::SpatialReference;

/// Program name `tilecube` job commands are issued with.
pub const PROGRAM: &str = "/opt/tilecube/bin/tilecube";

pub const WGS84_WKT: &str = r#"GEOGCS["WGS 84",DATUM["WGS_1984",SPHEROID["WGS 84",6378137,298.257223563]],PRIMEM["Greenwich",0],UNIT["degree",0.0174532925199433],AUTHORITY["EPSG","4326"]]"#;

/// Something that happened to a warp output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The job producing this path was handed to the backend
    Submitted(PathBuf),
    /// The job producing this path finished and wrote it
    Completed(PathBuf),
}

struct QueuedJob {
    command: ProcessCommand,
    /// Scheduler states reported before the job runs
    states: VecDeque<&'static str>,
    finished: bool,
}

/// Simulated tool chain.
#[derive(Default)]
pub struct Sim {
    events: Mutex<Vec<Event>>,
    commands: Mutex<Vec<ProcessCommand>>,
    queue: Mutex<HashMap<String, QueuedJob>>,
    next_handle: Mutex<u64>,
}

impl Sim {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Every command run, in order, including scheduler traffic.
    pub fn commands(&self) -> Vec<ProcessCommand> {
        self.commands.lock().unwrap().clone()
    }

    pub fn commands_for(&self, program: &str) -> Vec<ProcessCommand> {
        self.commands()
            .into_iter()
            .filter(|c| c.program() == program)
            .collect()
    }

    fn record(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    fn sbatch(&self, command: &ProcessCommand) -> ProcessOutput {
        let job_file = &command.get_args()[0];
        let script = std::fs::read_to_string(job_file).unwrap();
        let line = script.lines().filter(|l| !l.trim().is_empty()).last().unwrap();
        let mut words = line.split_whitespace();
        let job = ProcessCommand::new(words.next().unwrap()).args(words);
        if let Some(output) = warp_output(&job) {
            self.record(Event::Submitted(output));
        }

        let handle = {
            let mut next = self.next_handle.lock().unwrap();
            *next += 1;
            (700_000 + *next).to_string()
        };
        self.queue.lock().unwrap().insert(
            handle.clone(),
            QueuedJob {
                command: job,
                states: VecDeque::from(["PD", "R"]),
                finished: false,
            },
        );
        ProcessOutput::ok(format!("Submitted batch job {}\n", handle))
    }

    async fn squeue(&self, command: &ProcessCommand) -> ProcessOutput {
        let handle = command.get_args()[1].clone();
        let (state, due) = {
            let mut queue = self.queue.lock().unwrap();
            let Some(job) = queue.get_mut(&handle) else {
                return invalid_job_id();
            };
            match job.states.pop_front() {
                Some(state) => (state, None),
                None if !job.finished => {
                    job.finished = true;
                    ("CD", Some(job.command.clone()))
                }
                None => return invalid_job_id(),
            }
        };

        if let Some(job) = due {
            let output = self.execute(&job).await;
            if !output.success() {
                return squeue_row(&handle, "F");
            }
        }
        squeue_row(&handle, state)
    }

    async fn execute(&self, command: &ProcessCommand) -> ProcessOutput {
        match command.program() {
            "gdalwarp" => self.warp(command.get_args()),
            PROGRAM => self.tilecube(command.get_args()).await,
            other => ProcessOutput::failed(127, format!("{}: command not found", other)),
        }
    }

    fn warp(&self, args: &[String]) -> ProcessOutput {
        let te = args.iter().position(|a| a == "-te").unwrap();
        let values: Vec<f64> = args[te + 1..te + 5]
            .iter()
            .map(|v| v.parse().unwrap())
            .collect();
        let bounds = Bounds::new(values[0], values[1], values[2], values[3]);
        let of = args.iter().position(|a| a == "-of").unwrap();
        let (output, sources) = args[of + 2..].split_last().unwrap();

        let mut names = Vec::new();
        let mut valid = false;
        for source in sources {
            let raster = read_raster(Path::new(source));
            if names.is_empty() {
                names = raster.bands.iter().map(|(name, _)| name.clone()).collect();
            }
            valid |= raster.has_data_in(&bounds);
        }
        let mean = if valid { 1.0 } else { f64::NAN };
        let bands: Vec<(String, f64)> = names.into_iter().map(|n| (n, mean)).collect();
        write_bands(Path::new(output), &bands);
        self.record(Event::Completed(PathBuf::from(output)));
        ProcessOutput::ok("")
    }

    async fn tilecube(&self, args: &[String]) -> ProcessOutput {
        match args[0].as_str() {
            "stack-tile" => {
                let address: CellAddress = args[1].parse().unwrap();
                let layers = match LayerCollection::discover(Path::new(&args[2])).await {
                    Ok(layers) => layers,
                    Err(e) => return ProcessOutput::failed(1, e.to_string()),
                };
                let stacker = CubeStacker::new(self, RasterFormat::Kea, 243);
                match stacker
                    .stack_cell(&address, &layers, Path::new(&args[3]))
                    .await
                {
                    Ok(_) => ProcessOutput::ok(""),
                    Err(e) => ProcessOutput::failed(1, e.to_string()),
                }
            }
            // Stands in for a full pyramid build: one face tile per layer
            "tile" => {
                let output = Path::new(&args[2]);
                let categorical = args
                    .windows(2)
                    .any(|w| w[0] == "--resampling" && w[1] == "near");
                let band = if categorical { "class" } else { "value" };
                write_bands(&output.join("N.kea"), &[(band.to_string(), 1.0)]);
                ProcessOutput::ok("")
            }
            other => ProcessOutput::failed(2, format!("unknown subcommand {}", other)),
        }
    }
}

impl CommandRunner for Sim {
    async fn run(&self, command: &ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        self.commands.lock().unwrap().push(command.clone());
        let output = match command.program() {
            "sbatch" => self.sbatch(command),
            "squeue" => self.squeue(command).await,
            _ => {
                if let Some(output) = warp_output(command) {
                    self.record(Event::Submitted(output));
                }
                self.execute(command).await
            }
        };
        Ok(output)
    }
}

impl RasterEngine for Sim {
    async fn raster_info(&self, path: &Path) -> Result<RasterInfo, RasterError> {
        let raster = try_read_raster(path)?;
        Ok(RasterInfo {
            size: (729, 729),
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, -1.0],
            wkt: WGS84_WKT.to_string(),
            bands: raster
                .bands
                .into_iter()
                .map(|(description, _)| BandInfo {
                    description,
                    nodata: None,
                })
                .collect(),
        })
    }

    async fn compute_statistics(&self, path: &Path) -> Result<Vec<BandStatistics>, RasterError> {
        let raster = try_read_raster(path)?;
        Ok(raster
            .bands
            .into_iter()
            .map(|(_, mean)| BandStatistics {
                min: Some(mean),
                max: Some(mean),
                mean: Some(mean),
            })
            .collect())
    }

    async fn vector_extent(&self, path: &Path) -> Result<Bounds, RasterError> {
        try_read_raster(path)?.extent.ok_or_else(|| RasterError::Incomplete {
            tool: "sim",
            path: path.to_path_buf(),
            reason: "no extent line".into(),
        })
    }

    async fn to_geographic(
        &self,
        points: &[(f64, f64)],
        _from: &SpatialReference,
    ) -> Result<Vec<(f64, f64)>, RasterError> {
        Ok(points.to_vec())
    }

    async fn stack_bands(
        &self,
        inputs: &[PathBuf],
        output: &Path,
        _format: RasterFormat,
        _block_size: u32,
    ) -> Result<(), RasterError> {
        let mut bands = Vec::new();
        for input in inputs {
            bands.extend(try_read_raster(input)?.bands);
        }
        // Like gdal_merge, the stacked output carries no band descriptions
        let bands: Vec<(String, f64)> = bands.into_iter().map(|(_, m)| (String::new(), m)).collect();
        write_bands(output, &bands);
        Ok(())
    }

    async fn set_band_descriptions(
        &self,
        path: &Path,
        descriptions: &[String],
    ) -> Result<(), RasterError> {
        let raster = try_read_raster(path)?;
        let bands: Vec<(String, f64)> = raster
            .bands
            .into_iter()
            .zip(descriptions)
            .map(|((_, mean), d)| (d.clone(), mean))
            .collect();
        write_bands(path, &bands);
        Ok(())
    }
}

/// A parsed fake raster.
#[derive(Debug, Clone, Default)]
pub struct FakeRaster {
    pub extent: Option<Bounds>,
    pub bands: Vec<(String, f64)>,
}

impl FakeRaster {
    fn has_data_in(&self, bounds: &Bounds) -> bool {
        let any_valid = self.bands.iter().any(|(_, mean)| !mean.is_nan());
        match &self.extent {
            Some(extent) => any_valid && extent.overlaps(bounds),
            None => any_valid,
        }
    }
}

pub fn read_raster(path: &Path) -> FakeRaster {
    let text = std::fs::read_to_string(path).unwrap();
    let mut raster = FakeRaster::default();
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("extent ") {
            let v: Vec<f64> = rest.split_whitespace().map(|x| x.parse().unwrap()).collect();
            raster.extent = Some(Bounds::new(v[0], v[1], v[2], v[3]));
        } else if let Some((name, mean)) = line.rsplit_once('=') {
            raster.bands.push((name.to_string(), mean.parse().unwrap()));
        }
    }
    raster
}

fn try_read_raster(path: &Path) -> Result<FakeRaster, RasterError> {
    if !path.exists() {
        return Err(RasterError::ToolFailed {
            tool: "sim",
            path: path.to_path_buf(),
            code: Some(1),
            stderr: "No such file or directory".into(),
        });
    }
    Ok(read_raster(path))
}

pub fn write_bands(path: &Path, bands: &[(String, f64)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    let text: String = bands
        .iter()
        .map(|(name, mean)| format!("{}={}\n", name, mean))
        .collect();
    std::fs::write(path, text).unwrap();
}

/// Writes a source raster whose data covers `extent`.
pub fn write_source(path: &Path, extent: Bounds, bands: &[&str]) {
    let mut text = format!(
        "extent {} {} {} {}\n",
        extent.min_x, extent.min_y, extent.max_x, extent.max_y
    );
    for band in bands {
        text.push_str(&format!("{}=1\n", band));
    }
    std::fs::write(path, text).unwrap();
}

/// Writes a layer tile with the given band descriptions, all valid.
pub fn write_tile(path: &Path, bands: &[&str]) {
    let bands: Vec<(String, f64)> = bands.iter().map(|b| (b.to_string(), 1.0)).collect();
    write_bands(path, &bands);
}

/// Relative paths of all files below `root`.
pub fn files_under(root: &Path) -> BTreeSet<PathBuf> {
    fn walk(root: &Path, dir: &Path, out: &mut BTreeSet<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                out.insert(path.strip_prefix(root).unwrap().to_path_buf());
            }
        }
    }
    let mut out = BTreeSet::new();
    walk(root, root, &mut out);
    out
}

/// Pyramid level of a tile path relative to its output root.
///
/// Every selector digit is one level; the face letter is level 0.
pub fn level_of(relative: &Path) -> usize {
    relative
        .with_extension("")
        .to_string_lossy()
        .chars()
        .filter(char::is_ascii_digit)
        .count()
}

/// Cluster backend with its template and job file inside `dir`.
pub fn cluster_backend(dir: &Path) -> Backend {
    let job_template = dir.join("template.sl");
    std::fs::write(&job_template, "#!/bin/bash\n#SBATCH --time=01:00:00\n").unwrap();
    Backend::Cluster(ClusterConfig {
        job_template,
        job_file: dir.join("jobfile.sl"),
        ..ClusterConfig::default()
    })
}

fn warp_output(command: &ProcessCommand) -> Option<PathBuf> {
    (command.program() == "gdalwarp")
        .then(|| command.get_args().last().map(PathBuf::from))
        .flatten()
}

fn squeue_row(handle: &str, state: &str) -> ProcessOutput {
    ProcessOutput::ok(format!(
        "             JOBID PARTITION     NAME     USER ST       TIME  NODES NODELIST(REASON)\n\
         {:>18}     batch  jobfile   tester {:>2}       0:01      1 node001\n",
        handle, state
    ))
}

fn invalid_job_id() -> ProcessOutput {
    ProcessOutput::failed(1, "slurm_load_jobs error: Invalid job id specified")
}
