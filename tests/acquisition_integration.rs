// tests/acquisition_integration.rs
//! End-to-end acquisition sessions against the simulated platform

use rf_acquire::config::{AcquisitionConfig, AcquisitionMode, PlatformSettings, SettingsLoader};
use rf_acquire::hal::simulation::ProbeProfile;
use rf_acquire::hal::simulator::{PlatformCall, PlatformSimulator, SimulatorConfig};
use rf_acquire::hal::FrameObserver;
use rf_acquire::utils::{MockDelay, NoDelay};
use rf_acquire::Orchestrator;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const CONFIG: &str = "50 0 0 +- 60 1\n";

fn write_config(dir: &Path) -> std::path::PathBuf {
    let path = dir.join("acquisition.cfg");
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    path
}

fn settings(output_dir: &Path) -> PlatformSettings {
    PlatformSettings {
        output_dir: output_dir.to_path_buf(),
        ..PlatformSettings::default()
    }
    .without_settling()
}

#[test]
fn test_single_rx_session_writes_every_scanline() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::linear_l14_5()));
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay);

    let report = orchestrator
        .run(AcquisitionMode::SingleChannelReceive, &config_path)
        .unwrap();

    assert_eq!(report.scanlines_saved, 65);
    assert_eq!(report.raw_files.len(), 65);
    assert_eq!(report.probe.code, 2);
    assert_eq!(report.log_path, dir.path().join("probeId_2_singleRx.log"));

    // 64 lines of 8 samples at 2 bytes, 16 frames kept out of 24
    let frame_size = 64 * 8 * 2;
    for scanline in 0..65 {
        let path = dir.path().join(format!("probeId_2_singleRx_scanline_{}.raw", scanline));
        let metadata = fs::metadata(&path).unwrap();
        assert_eq!(metadata.len(), (16 * frame_size) as u64, "scanline {}", scanline);
    }

    let log = fs::read_to_string(&report.log_path).unwrap();
    assert!(log.starts_with("Date and time: "));
    assert!(log.contains("Probe ID: 2\nProbe name: L14-5/38\n\n"));
    assert!(log.contains("Acquisition configuration: singleRx\n\n"));
    assert_eq!(log.matches(" saved\n").count(), 65);
    assert!(log.contains("Data of scanline #0/64 saved\n"));
    assert!(log.contains("Data of scanline #64/64 saved\n"));
    assert!(log.contains("Parameters of scanline #64/64\n"));
    assert!(log.contains("tx.centerElement = 96.500000\n"));
    assert_eq!(log.matches("STOP - Acquired (24) frames").count(), 65);
    assert!(log.contains("Acquired frames: 24 Saved frames: 16\n"));
    assert!(log.contains("End of acquisition.\n\nDate and time: "));
}

#[test]
fn test_phased_array_session() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay);

    let report = orchestrator.run(AcquisitionMode::PhasedArray, &config_path).unwrap();
    assert_eq!(report.scanlines_saved, 64);
    assert!(dir.path().join("probeId_11_phasedArray_scanline_63.raw").exists());
    assert!(!dir.path().join("probeId_11_phasedArray_scanline_64.raw").exists());

    let sim = orchestrator.into_platform();
    let angles: Vec<i32> = sim
        .submitted_lines()
        .chunks(64)
        .map(|lines| lines[0].0.angle_mdeg)
        .collect();
    assert_eq!(angles.len(), 64);
    assert_eq!(angles[0], -45_000);
    assert_eq!(angles[63], 45_000);
    assert!(angles.windows(2).all(|w| w[0] <= w[1]));

    let log = fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("rx.angle = -45000\n"));
    assert!(log.contains("channel #63 -> rx.channelMask[1] = 80000000\n"));
}

#[test]
fn test_raw_file_matches_logged_crc() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay);

    let report = orchestrator.run(AcquisitionMode::PhasedArray, &config_path).unwrap();
    let data = fs::read(&report.raw_files[0]).unwrap();
    let crc = format!("Raw data CRC-32: {:08x}\n", crc32fast::hash(&data));

    let log = fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains(&crc));
}

#[test]
fn test_frames_saved_capped_at_sixteen() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let sim = PlatformSimulator::new(SimulatorConfig {
        frames_per_run: 40,
        ..SimulatorConfig::compact(ProbeProfile::phased_sa4_2())
    });
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay);

    let report = orchestrator.run(AcquisitionMode::PhasedArray, &config_path).unwrap();
    let len = fs::metadata(&report.raw_files[10]).unwrap().len();
    assert_eq!(len, 16 * 64 * 8 * 2);

    let log = fs::read_to_string(&report.log_path).unwrap();
    assert!(log.contains("Acquired frames: 40 Saved frames: 16\n"));
}

#[test]
fn test_fewer_frames_than_cap_saved_whole() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let sim = PlatformSimulator::new(SimulatorConfig {
        frames_per_run: 5,
        ..SimulatorConfig::compact(ProbeProfile::phased_sa4_2())
    });
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay);

    let report = orchestrator.run(AcquisitionMode::PhasedArray, &config_path).unwrap();
    let len = fs::metadata(&report.raw_files[10]).unwrap().len();
    assert_eq!(len, 5 * 64 * 8 * 2);
}

#[test]
fn test_default_settle_schedule() {
    let dir = TempDir::new().unwrap();
    let config: AcquisitionConfig = CONFIG.parse().unwrap();
    let delay = Arc::new(MockDelay::new());
    let settings = PlatformSettings {
        output_dir: dir.path().to_path_buf(),
        ..PlatformSettings::default()
    };
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::linear_l14_5()));
    let mut orchestrator = Orchestrator::new(sim, settings, delay.clone());

    orchestrator
        .run_with_config(AcquisitionMode::SingleChannelReceive, &config)
        .unwrap();

    assert_eq!(delay.waits().len(), 65 * 4);
    assert_eq!(delay.total(), Duration::from_secs(65 * 7));
}

#[test]
fn test_settings_file_drives_session() {
    let dir = TempDir::new().unwrap();
    let config_path = write_config(dir.path());
    let out_dir = dir.path().join("out");
    fs::create_dir(&out_dir).unwrap();

    let settings_path = dir.path().join("rf-acquire.toml");
    fs::write(
        &settings_path,
        format!(
            "output_dir = {:?}\npower = 8\ngain = 0.5\n\n[settle]\nafter_setup_ms = 0\nafter_run_ms = 0\nafter_stop_ms = 0\nafter_save_ms = 0\n",
            out_dir.to_string_lossy()
        ),
    )
    .unwrap();

    let settings = SettingsLoader::with_path(&settings_path)
        .with_env_vars(Vec::new())
        .load()
        .unwrap();
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
    let mut orchestrator = Orchestrator::new(sim, settings, NoDelay);

    let report = orchestrator.run(AcquisitionMode::PhasedArray, &config_path).unwrap();
    assert!(report.log_path.starts_with(&out_dir));

    let sim = orchestrator.into_platform();
    assert_eq!(sim.power(), Some((8, 8, 8)));
    assert_eq!(sim.tgc_gains(), &[0.5]);
}

struct CountingObserver(Arc<AtomicU32>);

impl FrameObserver for CountingObserver {
    fn on_frame(&mut self, _frame: &[u8], _frame_id: u32) -> bool {
        self.0.fetch_add(1, Ordering::Relaxed);
        true
    }
}

#[test]
fn test_custom_frame_observer_sees_every_frame() {
    let dir = TempDir::new().unwrap();
    let config: AcquisitionConfig = CONFIG.parse().unwrap();
    let frames = Arc::new(AtomicU32::new(0));
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay)
        .with_frame_observer(Box::new(CountingObserver(frames.clone())));

    orchestrator
        .run_with_config(AcquisitionMode::PhasedArray, &config)
        .unwrap();

    assert_eq!(frames.load(Ordering::Relaxed), 64 * 24);
    let sim = orchestrator.into_platform();
    assert_eq!(
        sim.journal().iter().filter(|c| **c == PlatformCall::Shutdown).count(),
        1
    );
}

#[test]
fn test_frame_observer_kept_across_sessions() {
    let dir = TempDir::new().unwrap();
    let config: AcquisitionConfig = CONFIG.parse().unwrap();
    let frames = Arc::new(AtomicU32::new(0));
    let sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
    let mut orchestrator = Orchestrator::new(sim, settings(dir.path()), NoDelay)
        .with_frame_observer(Box::new(CountingObserver(frames.clone())));

    for _ in 0..2 {
        orchestrator
            .run_with_config(AcquisitionMode::PhasedArray, &config)
            .unwrap();
    }

    assert_eq!(frames.load(Ordering::Relaxed), 2 * 64 * 24);
}
