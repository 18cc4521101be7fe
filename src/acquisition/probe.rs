// src/acquisition/probe.rs
//! Probe selection on a single connector

use tracing::{error, info};

use crate::acquisition::SessionState;
use crate::config::constants::limits;
use crate::error::{AcqError, AcqResult, IntoAcqError};
use crate::hal::{ProbeIdentity, UltrasoundPlatform};
use crate::utils::bounded_name;

/// Select the probe plugged into `connector` and record its identity
///
/// The connector is only activated once the probe code has been accepted.
/// A session selects its probe once; a second call is rejected.
pub fn select_probe<P: UltrasoundPlatform>(
    platform: &mut P,
    state: &mut SessionState,
    connector: u32,
) -> AcqResult<ProbeIdentity> {
    if let Some(existing) = &state.probe {
        return Err(AcqError::ProbeSelection {
            connector,
            step: "select a second probe",
            source: Some(format!("probe {} already selected", existing.code).into()),
        });
    }

    let code = platform.probe_code(connector);

    platform.select_probe(code).acq_err(|source| {
        error!(connector, code, "could not select probe");
        AcqError::ProbeSelection {
            connector,
            step: "select probe",
            source: Some(source),
        }
    })?;

    platform.activate_probe_connector(connector).acq_err(|source| {
        error!(connector, "could not activate connector");
        AcqError::ProbeSelection {
            connector,
            step: "activate connector",
            source: Some(source),
        }
    })?;

    let probe = ProbeIdentity {
        code,
        name: bounded_name(&platform.probe_name(connector), limits::MAX_PROBE_NAME_LEN),
        connector,
        center_frequency_hz: platform.probe_center_frequency(),
        element_count: platform.probe_element_count(),
    };
    info!(code = probe.code, name = %probe.name, connector, "probe selected");

    state.probe = Some(probe.clone());
    Ok(probe)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlatformSettings;
    use crate::hal::simulation::{FaultPlan, ProbeProfile};
    use crate::hal::simulator::{PlatformCall, PlatformSimulator, SimulatorConfig};

    fn initialized(config: SimulatorConfig) -> PlatformSimulator {
        let mut sim = PlatformSimulator::new(config);
        sim.init(&PlatformSettings::default().platform_init()).unwrap();
        sim
    }

    #[test]
    fn test_select_records_identity() {
        let mut sim = initialized(SimulatorConfig::with_probe(ProbeProfile::linear_l14_5()));
        let mut state = SessionState::new();

        let probe = select_probe(&mut sim, &mut state, 0).unwrap();
        assert_eq!(probe.code, 2);
        assert_eq!(probe.element_count, 128);
        assert_eq!(state.probe, Some(probe));
    }

    #[test]
    fn test_select_failure_skips_activation() {
        let config = SimulatorConfig {
            faults: FaultPlan { fail_probe_select: true, ..FaultPlan::none() },
            ..SimulatorConfig::default()
        };
        let mut sim = initialized(config);
        let mut state = SessionState::new();

        let err = select_probe(&mut sim, &mut state, 0).unwrap_err();
        assert!(matches!(err, AcqError::ProbeSelection { step: "select probe", .. }));
        assert!(!sim
            .journal()
            .iter()
            .any(|call| matches!(call, PlatformCall::ActivateProbeConnector(_))));
        assert!(state.probe.is_none());
    }

    #[test]
    fn test_activation_failure() {
        let config = SimulatorConfig {
            faults: FaultPlan { fail_connector_activation: true, ..FaultPlan::none() },
            ..SimulatorConfig::default()
        };
        let mut sim = initialized(config);
        let mut state = SessionState::new();

        let err = select_probe(&mut sim, &mut state, 0).unwrap_err();
        assert!(matches!(err, AcqError::ProbeSelection { connector: 0, step: "activate connector", .. }));
    }

    #[test]
    fn test_empty_connector_fails() {
        let mut sim = initialized(SimulatorConfig::default());
        let mut state = SessionState::new();

        assert!(select_probe(&mut sim, &mut state, 2).is_err());
    }

    #[test]
    fn test_long_probe_name_bounded() {
        let profile = ProbeProfile {
            name: "XL-CUSTOM-PROBE/128".to_string(),
            ..ProbeProfile::linear_l14_5()
        };
        let mut sim = initialized(SimulatorConfig::with_probe(profile));
        let mut state = SessionState::new();

        let probe = select_probe(&mut sim, &mut state, 0).unwrap();
        assert_eq!(probe.name, "XL-CUSTOM-PROBE");
        assert_eq!(probe.name.len(), limits::MAX_PROBE_NAME_LEN);
    }

    #[test]
    fn test_second_selection_rejected() {
        let mut sim = initialized(SimulatorConfig::default());
        let mut state = SessionState::new();

        select_probe(&mut sim, &mut state, 0).unwrap();
        let calls = sim.journal().len();

        assert!(select_probe(&mut sim, &mut state, 0).is_err());
        assert_eq!(sim.journal().len(), calls);
    }
}
