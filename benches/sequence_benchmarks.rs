use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rf_acquire::acquisition::{
    build_sequence, receive_params, select_probe, transmit_params, SequenceOptions, SessionState,
};
use rf_acquire::config::{AcquisitionConfig, AcquisitionMode, PlatformSettings};
use rf_acquire::hal::simulation::ProbeProfile;
use rf_acquire::hal::simulator::{PlatformSimulator, SimulatorConfig};
use rf_acquire::hal::UltrasoundPlatform;
use rf_acquire::output::SessionLog;

const MODES: &[AcquisitionMode] = &[AcquisitionMode::PhasedArray, AcquisitionMode::SingleChannelReceive];

fn config() -> AcquisitionConfig {
    "50 0 0 +- 60 1".parse().expect("valid benchmark configuration")
}

fn benchmark_line_geometry(c: &mut Criterion) {
    let mut group = c.benchmark_group("line_geometry");
    let config = config();
    let options = SequenceOptions::default();
    let probe = rf_acquire::ProbeIdentity {
        code: 11,
        name: "SA4-2/24".to_string(),
        connector: 0,
        center_frequency_hz: 2_500_000,
        element_count: 64,
    };

    for &mode in MODES {
        group.throughput(Throughput::Elements(u64::from(mode.scanline_count())));
        group.bench_with_input(BenchmarkId::new("all_scanlines", mode.tag()), &mode, |b, &mode| {
            b.iter(|| {
                for scanline in 0..mode.scanline_count() {
                    let tx = transmit_params(mode, scanline, &config, &probe, &options);
                    let rx = receive_params(mode, scanline, &config, &probe, &options);
                    black_box((tx, rx));
                }
            });
        });
    }

    group.finish();
}

fn benchmark_sequence_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequence_build");
    let config = config();
    let options = SequenceOptions::default();

    for &mode in MODES {
        let mut sim = PlatformSimulator::new(SimulatorConfig::compact(ProbeProfile::phased_sa4_2()));
        sim.init(&PlatformSettings::default().platform_init())
            .expect("simulator init");
        let mut state = SessionState::new();
        select_probe(&mut sim, &mut state, 0).expect("probe selection");
        let mut log = SessionLog::discard();

        group.throughput(Throughput::Elements(u64::from(options.channels)));
        group.bench_function(BenchmarkId::new("64_lines", mode.tag()), |b| {
            b.iter(|| {
                let stats = build_sequence(&mut sim, &mut state, mode, black_box(7), &config, &options, &mut log)
                    .expect("sequence build");
                black_box(stats);
                sim.clear_journal();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_line_geometry, benchmark_sequence_build);
criterion_main!(benches);
